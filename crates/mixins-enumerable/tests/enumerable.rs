//! Enumerable over collections and custom iterables.

use mixins::{Bag, Runtime, RuntimeError, Value};
use mixins_enumerable::{install, Enumerable};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn ints(values: impl IntoIterator<Item = i64>) -> Value {
    Value::list(values.into_iter().map(Value::Int))
}

fn setup(values: impl IntoIterator<Item = i64>) -> (Runtime, Enumerable, Value) {
    init_logger();
    let mut rt = Runtime::new();
    let enumerable = install(&mut rt).unwrap();
    let collection = enumerable.collection_of(&mut rt, values.into_iter().map(Value::Int)).unwrap();
    (rt, enumerable, collection)
}

fn block(f: impl Fn(&Value) -> Value + 'static) -> Value {
    Value::function(move |_, _, args| Ok(f(&args[0])))
}

fn int(value: &Value) -> i64 {
    value.as_int().unwrap_or_default()
}

/// `from..=to` through its own `for_each`, with `Enumerable` mixed in.
fn range_class(rt: &mut Runtime, enumerable: &Enumerable) -> mixins::ModuleId {
    let bag = Bag::new()
        .method("initialize", |_, this, args| {
            let object = this.as_object().ok_or(RuntimeError::Type { expected: "object", found: "nil" })?;
            object.set("from", args[0].clone());
            object.set("to", args[1].clone());
            Ok(Value::Nil)
        })
        .method("for_each", |rt, this, args| {
            let object = this.as_object().ok_or(RuntimeError::Type { expected: "object", found: "nil" })?;
            let from = object.get("from").and_then(|v| v.as_int()).unwrap_or(0);
            let to = object.get("to").and_then(|v| v.as_int()).unwrap_or(-1);
            for (i, n) in (from..=to).enumerate() {
                rt.invoke(&args[0], &Value::Nil, &[Value::Int(n), Value::Int(i as i64)])?;
            }
            Ok(Value::Nil)
        });
    let class = rt.derive_class(None, Some("Range"), Some(&Value::record(bag))).unwrap();
    rt.include(class, &Value::Module(enumerable.module)).unwrap();
    class
}

#[test]
fn predicates() {
    let (mut rt, _, numbers) = setup([1, 2, 3, 4]);
    let even = block(|v| Value::Bool(int(v) % 2 == 0));
    let positive = block(|v| Value::Bool(int(v) > 0));

    assert_eq!(rt.call(&numbers, "all", &[positive.clone()]).unwrap(), Value::Bool(true));
    assert_eq!(rt.call(&numbers, "all", &[even.clone()]).unwrap(), Value::Bool(false));
    assert_eq!(rt.call(&numbers, "any", &[even.clone()]).unwrap(), Value::Bool(true));
    assert_eq!(rt.call(&numbers, "none", &[even.clone()]).unwrap(), Value::Bool(false));
    assert_eq!(rt.call(&numbers, "one", &[block(|v| Value::Bool(int(v) == 3))]).unwrap(), Value::Bool(true));
    assert_eq!(rt.call(&numbers, "one", &[even]).unwrap(), Value::Bool(false));
    assert_eq!(rt.call(&numbers, "member", &[Value::Int(4)]).unwrap(), Value::Bool(true));
    assert_eq!(rt.call(&numbers, "member", &[Value::Int(5)]).unwrap(), Value::Bool(false));
}

#[test]
fn counting() {
    let (mut rt, _, numbers) = setup([1, 2, 2, 3]);

    assert_eq!(rt.call(&numbers, "count", &[]).unwrap(), Value::Int(4));
    assert_eq!(rt.call(&numbers, "count", &[Value::Int(2)]).unwrap(), Value::Int(2));
    assert_eq!(
        rt.call(&numbers, "count", &[block(|v| Value::Bool(int(v) > 1))]).unwrap(),
        Value::Int(3)
    );
}

#[test]
fn slicing() {
    let (mut rt, _, numbers) = setup([1, 2, 3, 4, 5]);
    let small = block(|v| Value::Bool(int(v) < 3));

    assert_eq!(rt.call(&numbers, "take", &[Value::Int(2)]).unwrap(), ints([1, 2]));
    assert_eq!(rt.call(&numbers, "drop", &[Value::Int(3)]).unwrap(), ints([4, 5]));
    assert_eq!(rt.call(&numbers, "take_while", &[small.clone()]).unwrap(), ints([1, 2]));
    assert_eq!(rt.call(&numbers, "drop_while", &[small]).unwrap(), ints([3, 4, 5]));
    assert_eq!(rt.call(&numbers, "first", &[]).unwrap(), Value::Int(1));
    assert_eq!(rt.call(&numbers, "first", &[Value::Int(2)]).unwrap(), ints([1, 2]));
    assert_eq!(rt.call(&numbers, "to_a", &[]).unwrap(), ints([1, 2, 3, 4, 5]));
    assert!(matches!(rt.call(&numbers, "take", &[Value::Int(-1)]), Err(RuntimeError::Raised(_))));
}

#[test]
fn transforming() {
    let (mut rt, _, numbers) = setup([1, 2, 3, 4]);
    let double = block(|v| Value::Int(int(v) * 2));
    let odd = block(|v| Value::Bool(int(v) % 2 == 1));

    assert_eq!(rt.call(&numbers, "map", &[double]).unwrap(), ints([2, 4, 6, 8]));
    assert_eq!(rt.call(&numbers, "select", &[odd.clone()]).unwrap(), ints([1, 3]));
    assert_eq!(rt.call(&numbers, "reject", &[odd.clone()]).unwrap(), ints([2, 4]));
    assert_eq!(
        rt.call(&numbers, "partition", &[odd]).unwrap(),
        Value::list([ints([1, 3]), ints([2, 4])])
    );
    assert_eq!(
        rt.call(&numbers, "find", &[block(|v| Value::Bool(int(v) > 2))]).unwrap(),
        Value::Int(3)
    );
    assert_eq!(rt.call(&numbers, "find", &[block(|_| Value::Bool(false))]).unwrap(), Value::Nil);
    assert_eq!(rt.call(&numbers, "find_index", &[Value::Int(3)]).unwrap(), Value::Int(2));
    assert_eq!(rt.call(&numbers, "find_index", &[Value::Int(9)]).unwrap(), Value::Nil);
}

#[test]
fn aliases_share_implementations() {
    let (mut rt, enumerable, numbers) = setup([1, 2, 3]);
    let double = block(|v| Value::Int(int(v) * 2));

    assert_eq!(rt.call(&numbers, "collect", &[double]).unwrap(), ints([2, 4, 6]));
    assert_eq!(rt.call(&numbers, "entries", &[]).unwrap(), ints([1, 2, 3]));
    assert_eq!(rt.call(&numbers, "some", &[block(|v| Value::Bool(int(v) == 2))]).unwrap(), Value::Bool(true));

    let registry = rt.registry();
    let map = registry.instance_method(enumerable.module, "map").unwrap();
    let collect = registry.instance_method(enumerable.module, "collect").unwrap();
    assert!(map.callable.ptr_eq(&collect.callable));
    assert_ne!(map.version, collect.version);
}

#[test]
fn folding() {
    let (mut rt, _, numbers) = setup([1, 2, 3, 4]);
    let sum = Value::function(|_, _, args| Ok(Value::Int(int(&args[0]) + int(&args[1]))));

    assert_eq!(rt.call(&numbers, "inject", &[sum.clone()]).unwrap(), Value::Int(10));
    assert_eq!(rt.call(&numbers, "inject", &[Value::Int(100), sum]).unwrap(), Value::Int(110));

    let (mut rt, _, empty) = setup(std::iter::empty());
    let sum = Value::function(|_, _, args| Ok(Value::Int(int(&args[0]) + int(&args[1]))));
    assert_eq!(rt.call(&empty, "inject", &[sum]).unwrap(), Value::Nil);
}

#[test]
fn ordering() {
    let (mut rt, _, numbers) = setup([3, 1, 4, 1, 5]);
    let descending = Value::function(|_, _, args| Ok(Value::Int(int(&args[1]) - int(&args[0]))));
    let distance_from_three = block(|v| Value::Int((int(v) - 3).abs()));

    assert_eq!(rt.call(&numbers, "sort", &[]).unwrap(), ints([1, 1, 3, 4, 5]));
    assert_eq!(rt.call(&numbers, "sort", &[descending]).unwrap(), ints([5, 4, 3, 1, 1]));
    assert_eq!(rt.call(&numbers, "min", &[]).unwrap(), Value::Int(1));
    assert_eq!(rt.call(&numbers, "max", &[]).unwrap(), Value::Int(5));
    assert_eq!(rt.call(&numbers, "minmax", &[]).unwrap(), ints([1, 5]));
    assert_eq!(
        rt.call(&numbers, "sort_by", &[distance_from_three.clone()]).unwrap(),
        ints([3, 4, 1, 1, 5])
    );
    assert_eq!(rt.call(&numbers, "min_by", &[distance_from_three.clone()]).unwrap(), Value::Int(3));
    assert_eq!(rt.call(&numbers, "max_by", &[distance_from_three]).unwrap(), Value::Int(5));
}

#[test]
fn incomparable_items_raise() {
    init_logger();
    let mut rt = Runtime::new();
    let enumerable = install(&mut rt).unwrap();
    let mixed = enumerable.collection_of(&mut rt, [Value::Int(1), Value::str("a")]).unwrap();

    assert!(matches!(rt.call(&mixed, "sort", &[]), Err(RuntimeError::Raised(_))));
}

#[test]
fn compare_to_orders_objects() {
    init_logger();
    let mut rt = Runtime::new();
    let enumerable = install(&mut rt).unwrap();
    let version = rt
        .derive_class(
            None,
            Some("Version"),
            Some(&Value::record(
                Bag::new()
                    .method("initialize", |_, this, args| {
                        if let Some(object) = this.as_object() {
                            object.set("n", args[0].clone());
                        }
                        Ok(Value::Nil)
                    })
                    .method("compare_to", |_, this, args| {
                        let n = |v: &Value| v.as_object().and_then(|o| o.get("n")).and_then(|n| n.as_int());
                        Ok(Value::Int(n(this).unwrap_or(0) - n(&args[0]).unwrap_or(0)))
                    }),
            )),
        )
        .unwrap();
    let v2 = rt.instantiate(version, &[Value::Int(2)]).unwrap();
    let v1 = rt.instantiate(version, &[Value::Int(1)]).unwrap();
    let versions = enumerable.collection_of(&mut rt, [v2.clone(), v1.clone()]).unwrap();

    assert_eq!(rt.call(&versions, "sort", &[]).unwrap(), Value::list([v1.clone(), v2]));
    assert_eq!(rt.call(&versions, "min", &[]).unwrap(), v1);
    let comparable = rt
        .call(&Value::Module(enumerable.module), "is_comparable", &[versions])
        .unwrap();
    assert_eq!(comparable, Value::Bool(true));
}

#[test]
fn grouping_and_windows() {
    let (mut rt, _, numbers) = setup([1, 2, 3, 4, 5]);
    let parity = block(|v| Value::str(if int(v) % 2 == 0 { "even" } else { "odd" }));

    assert_eq!(
        rt.call(&numbers, "group_by", &[parity]).unwrap(),
        Value::list([
            Value::list([Value::str("odd"), ints([1, 3, 5])]),
            Value::list([Value::str("even"), ints([2, 4])]),
        ])
    );

    let memo = memo_object(&mut rt);
    let push = Value::function(|_, _, args| {
        if let Some(memo) = args[2].as_object() {
            let mut seen = memo.get("seen").and_then(|v| v.as_list().map(|l| l.to_vec())).unwrap_or_default();
            seen.push(args[0].clone());
            memo.set("seen", Value::list(seen));
        }
        Ok(Value::Nil)
    });
    let returned = rt.call(&numbers, "each_with_object", &[memo.clone(), push]).unwrap();
    assert_eq!(returned.as_object().unwrap().get("seen"), Some(ints([1, 2, 3, 4, 5])));

    let slices = collect_calls(&mut rt, &numbers, "each_slice", Value::Int(2));
    assert_eq!(slices, vec![ints([1, 2]), ints([3, 4]), ints([5])]);
    let cons = collect_calls(&mut rt, &numbers, "each_cons", Value::Int(4));
    assert_eq!(cons, vec![ints([1, 2, 3, 4]), ints([2, 3, 4, 5])]);
}

fn memo_object(rt: &mut Runtime) -> Value {
    let class = rt.derive_class(None, Some("Memo"), None).unwrap();
    rt.instantiate(class, &[]).unwrap()
}

/// Run `name(arg, block)` and return the first argument of every block call.
fn collect_calls(rt: &mut Runtime, receiver: &Value, name: &str, arg: Value) -> Vec<Value> {
    let seen = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
    let sink = seen.clone();
    let block = Value::function(move |_, _, args| {
        sink.borrow_mut().push(args[0].clone());
        Ok(Value::Nil)
    });
    rt.call(receiver, name, &[arg, block]).unwrap();
    seen.take()
}

#[test]
fn zip_pads_with_nil() {
    let (mut rt, enumerable, numbers) = setup([1, 2, 3]);
    let letters = enumerable.collection_of(&mut rt, [Value::str("a"), Value::str("b")]).unwrap();

    assert_eq!(
        rt.call(&numbers, "zip", &[letters, ints([10])]).unwrap(),
        Value::list([
            Value::list([Value::Int(1), Value::str("a"), Value::Int(10)]),
            Value::list([Value::Int(2), Value::str("b"), Value::Nil]),
            Value::list([Value::Int(3), Value::Nil, Value::Nil]),
        ])
    );
}

#[test]
fn grep_matches_modules_functions_and_values() {
    init_logger();
    let mut rt = Runtime::new();
    let enumerable = install(&mut rt).unwrap();
    let inner = enumerable.collection_of(&mut rt, [Value::Int(1)]).unwrap();
    let items = enumerable
        .collection_of(&mut rt, [Value::Int(1), Value::str("x"), inner.clone(), Value::Int(1)])
        .unwrap();

    assert_eq!(
        rt.call(&items, "grep", &[Value::Module(enumerable.module)]).unwrap(),
        Value::list([inner])
    );
    assert_eq!(rt.call(&items, "grep", &[Value::Int(1)]).unwrap(), ints([1, 1]));
    assert_eq!(
        rt.call(&items, "grep", &[Value::Int(1), block(|v| Value::Int(int(v) + 1))]).unwrap(),
        ints([2, 2])
    );
}

#[test]
fn custom_iterables_get_every_method() {
    let (mut rt, enumerable, _) = setup(std::iter::empty());
    let range = range_class(&mut rt, &enumerable);
    let one_to_five = rt.instantiate(range, &[Value::Int(1), Value::Int(5)]).unwrap();

    assert_eq!(rt.call(&one_to_five, "to_a", &[]).unwrap(), ints([1, 2, 3, 4, 5]));
    assert_eq!(
        rt.call(&one_to_five, "select", &[block(|v| Value::Bool(int(v) > 3))]).unwrap(),
        ints([4, 5])
    );
    let copy = rt.instantiate(enumerable.collection, &[one_to_five]).unwrap();
    assert_eq!(rt.call(&copy, "count", &[]).unwrap(), Value::Int(5));
}

#[test]
fn later_definitions_reach_collections() {
    let (mut rt, enumerable, numbers) = setup([1, 2, 3]);
    assert!(!rt.respond_to(&numbers, "sum"));

    rt.define_fn(enumerable.module, "sum", |rt, this, _| {
        let items = mixins_enumerable::iter::entries(rt, this)?;
        Ok(Value::Int(items.iter().map(int).sum()))
    })
    .unwrap();

    assert_eq!(rt.call(&numbers, "sum", &[]).unwrap(), Value::Int(6));
}

#[test]
fn singleton_for_each_walks_plain_lists() {
    let (mut rt, enumerable, _) = setup(std::iter::empty());
    let seen = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
    let sink = seen.clone();
    let record = Value::function(move |_, _, args| {
        sink.borrow_mut().push(args[0].clone());
        Ok(Value::Nil)
    });

    rt.call(
        &Value::Module(enumerable.module),
        "for_each",
        &[Value::list([Value::Int(7), Value::Nil, Value::Int(8)]), record],
    )
    .unwrap();

    assert_eq!(*seen.borrow(), vec![Value::Int(7), Value::Int(8)]);
}
