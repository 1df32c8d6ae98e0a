//! The Enumerable methods.
//!
//! Instance methods receive the collection as their receiver and reach its
//! items only through [`entries`], i.e. through the receiver's `for_each`.
//! Blocks are called with `(item, index)`.

use mixins::{Bag, Runtime, RuntimeError, Value};
use crate::compare::{all_comparable, compare, ordering_of, sort_with};
use crate::iter::{
    array_items, block_arg, call_block, entries, for_each_in, optional_block, required, size_arg,
    test_block, truth, FOR_EACH,
};

type MethodResult = Result<Value, RuntimeError>;

const SIZE: &str = "size";
const MATCH: &str = "match";
const TO_A: &str = "to_a";

/// Alias name and the instance method it copies.
pub const ALIASES: &[(&str, &str)] = &[
    ("collect", "map"),
    ("detect", "find"),
    ("entries", "to_a"),
    ("every", "all"),
    ("find_all", "select"),
    ("filter", "select"),
    ("some", "any"),
];

/// Singleton methods plus every algorithm, ready for `create_module`.
pub fn module_bag() -> Bag {
    let singleton = Bag::new()
        .method(FOR_EACH, |rt, _, args| {
            let collection = required(FOR_EACH, args, 0)?;
            let block = block_arg(FOR_EACH, args, 1)?;
            for_each_in(rt, &collection, &block)?;
            Ok(Value::Nil)
        })
        .method("is_comparable", |rt, _, args| {
            let list = required("is_comparable", args, 0)?;
            let items = match array_items(&list) {
                Some(items) => items,
                None => entries(rt, &list)?,
            };
            Ok(Value::Bool(all_comparable(rt, &items)))
        })
        .method(MATCH, |rt, _, args| {
            let pattern = required(MATCH, args, 0)?;
            let object = required(MATCH, args, 1)?;
            pattern_match(rt, &pattern, &object)
        });

    Bag::new()
        .extend([Value::record(singleton)])
        .method("all", all)
        .method("any", any)
        .method("count", count)
        .method("cycle", cycle)
        .method("drop", drop_n)
        .method("drop_while", drop_while)
        .method("each_cons", each_cons)
        .method("each_slice", each_slice)
        .method("each_with_object", each_with_object)
        .method("find", find)
        .method("find_index", find_index)
        .method("first", first)
        .method("grep", grep)
        .method("group_by", group_by)
        .method("inject", inject)
        .method("map", map)
        .method("max", max)
        .method("max_by", max_by)
        .method("member", member)
        .method("min", min)
        .method("min_by", min_by)
        .method("minmax", minmax)
        .method("minmax_by", minmax_by)
        .method("none", none)
        .method("one", one)
        .method("partition", partition)
        .method("reject", reject)
        .method("reverse_each", reverse_each)
        .method("select", select)
        .method("sort", sort)
        .method("sort_by", sort_by)
        .method("take", take)
        .method("take_while", take_while)
        .method(TO_A, to_a)
        .method("zip", zip)
}

/// Instance-side `for_each` for array-like receivers.
pub fn for_each(rt: &mut Runtime, this: &Value, args: &[Value]) -> MethodResult {
    let block = block_arg(FOR_EACH, args, 0)?;
    for_each_in(rt, this, &block)?;
    Ok(Value::Nil)
}

/// Case-equality used by `grep`: module membership, a pattern's own
/// `match`, a predicate function, or plain equality.
pub fn pattern_match(rt: &mut Runtime, pattern: &Value, object: &Value) -> MethodResult {
    match pattern {
        Value::Module(module) => Ok(Value::Bool(rt.is_a(object, *module))),
        _ if rt.respond_to(pattern, MATCH) => rt.call(pattern, MATCH, &[object.clone()]),
        Value::Function(_) => rt.invoke(pattern, &Value::Nil, &[object.clone()]),
        _ => Ok(Value::Bool(pattern == object)),
    }
}

fn all(rt: &mut Runtime, this: &Value, args: &[Value]) -> MethodResult {
    let block = optional_block(args, 0)?;
    for (i, item) in entries(rt, this)?.iter().enumerate() {
        if !truth(rt, block.as_ref(), item, i)? {
            return Ok(Value::Bool(false));
        }
    }
    Ok(Value::Bool(true))
}

fn any(rt: &mut Runtime, this: &Value, args: &[Value]) -> MethodResult {
    let block = optional_block(args, 0)?;
    for (i, item) in entries(rt, this)?.iter().enumerate() {
        if truth(rt, block.as_ref(), item, i)? {
            return Ok(Value::Bool(true));
        }
    }
    Ok(Value::Bool(false))
}

/// Items equal to a value, items passing a block, or all items. A receiver
/// with its own `size` answers the last case.
fn count(rt: &mut Runtime, this: &Value, args: &[Value]) -> MethodResult {
    let filter = args.first().filter(|v| !v.is_nil());
    if filter.is_none() && rt.respond_to(this, SIZE) {
        return rt.call(this, SIZE, &[]);
    }
    let mut count = 0;
    for (i, item) in entries(rt, this)?.iter().enumerate() {
        let counted = match filter {
            None => true,
            Some(block @ Value::Function(_)) => test_block(rt, block, item, i)?,
            Some(needle) => needle == item,
        };
        if counted {
            count += 1;
        }
    }
    Ok(Value::Int(count))
}

fn cycle(rt: &mut Runtime, this: &Value, args: &[Value]) -> MethodResult {
    let times = size_arg("cycle", args, 0)?;
    let block = block_arg("cycle", args, 1)?;
    for _ in 0..times {
        rt.call(this, FOR_EACH, &[block.clone()])?;
    }
    Ok(Value::Nil)
}

fn drop_n(rt: &mut Runtime, this: &Value, args: &[Value]) -> MethodResult {
    let n = size_arg("drop", args, 0)?;
    Ok(Value::list(entries(rt, this)?.into_iter().skip(n)))
}

fn drop_while(rt: &mut Runtime, this: &Value, args: &[Value]) -> MethodResult {
    let block = block_arg("drop_while", args, 0)?;
    let mut dropping = true;
    let mut kept = Vec::new();
    for (i, item) in entries(rt, this)?.into_iter().enumerate() {
        if dropping {
            dropping = test_block(rt, &block, &item, i)?;
        }
        if !dropping {
            kept.push(item);
        }
    }
    Ok(Value::list(kept))
}

fn each_cons(rt: &mut Runtime, this: &Value, args: &[Value]) -> MethodResult {
    let n = positive_size("each_cons", args)?;
    let block = block_arg("each_cons", args, 1)?;
    let items = entries(rt, this)?;
    for (i, window) in items.windows(n).enumerate() {
        call_block(rt, &block, &Value::list(window.iter().cloned()), i)?;
    }
    Ok(Value::Nil)
}

fn each_slice(rt: &mut Runtime, this: &Value, args: &[Value]) -> MethodResult {
    let n = positive_size("each_slice", args)?;
    let block = block_arg("each_slice", args, 1)?;
    let items = entries(rt, this)?;
    for (i, chunk) in items.chunks(n).enumerate() {
        call_block(rt, &block, &Value::list(chunk.iter().cloned()), i)?;
    }
    Ok(Value::Nil)
}

fn positive_size(name: &str, args: &[Value]) -> Result<usize, RuntimeError> {
    match size_arg(name, args, 0)? {
        0 => Err(RuntimeError::Raised(format!("{name}: invalid size 0"))),
        n => Ok(n),
    }
}

/// Blocks get `(item, index, memo)`; the memo is returned.
fn each_with_object(rt: &mut Runtime, this: &Value, args: &[Value]) -> MethodResult {
    let memo = required("each_with_object", args, 0)?;
    let block = block_arg("each_with_object", args, 1)?;
    for (i, item) in entries(rt, this)?.into_iter().enumerate() {
        rt.invoke(&block, &Value::Nil, &[item, Value::Int(i as i64), memo.clone()])?;
    }
    Ok(memo)
}

fn find(rt: &mut Runtime, this: &Value, args: &[Value]) -> MethodResult {
    let block = block_arg("find", args, 0)?;
    for (i, item) in entries(rt, this)?.into_iter().enumerate() {
        if test_block(rt, &block, &item, i)? {
            return Ok(item);
        }
    }
    Ok(Value::Nil)
}

fn find_index(rt: &mut Runtime, this: &Value, args: &[Value]) -> MethodResult {
    let needle = required("find_index", args, 0)?;
    for (i, item) in entries(rt, this)?.iter().enumerate() {
        let found = match &needle {
            Value::Function(_) => test_block(rt, &needle, item, i)?,
            value => value == item,
        };
        if found {
            return Ok(Value::Int(i as i64));
        }
    }
    Ok(Value::Nil)
}

/// The first item, or a list of the first `n`.
fn first(rt: &mut Runtime, this: &Value, args: &[Value]) -> MethodResult {
    let items = entries(rt, this)?;
    match args.first() {
        None | Some(Value::Nil) => Ok(items.into_iter().next().unwrap_or_default()),
        Some(_) => {
            let n = size_arg("first", args, 0)?;
            Ok(Value::list(items.into_iter().take(n)))
        }
    }
}

fn grep(rt: &mut Runtime, this: &Value, args: &[Value]) -> MethodResult {
    let pattern = required("grep", args, 0)?;
    let block = optional_block(args, 1)?;
    let mut results = Vec::new();
    for (i, item) in entries(rt, this)?.into_iter().enumerate() {
        if !pattern_match(rt, &pattern, &item)?.is_truthy() {
            continue;
        }
        results.push(match &block {
            Some(block) => call_block(rt, block, &item, i)?,
            None => item,
        });
    }
    Ok(Value::list(results))
}

/// `[key, items]` pairs in order of first appearance.
fn group_by(rt: &mut Runtime, this: &Value, args: &[Value]) -> MethodResult {
    let block = block_arg("group_by", args, 0)?;
    let mut groups: Vec<(Value, Vec<Value>)> = Vec::new();
    for (i, item) in entries(rt, this)?.into_iter().enumerate() {
        let key = call_block(rt, &block, &item, i)?;
        match groups.iter_mut().find(|(k, _)| *k == key) {
            Some((_, members)) => members.push(item),
            None => groups.push((key, vec![item])),
        }
    }
    Ok(Value::list(
        groups.into_iter().map(|(key, members)| Value::list([key, Value::list(members)])),
    ))
}

/// `inject(block)` starts from the first item; `inject(memo, block)` from `memo`.
/// Blocks get `(memo, item, index)`.
fn inject(rt: &mut Runtime, this: &Value, args: &[Value]) -> MethodResult {
    let (mut memo, block) = match args.first() {
        Some(block @ Value::Function(_)) => (None, block.clone()),
        _ => (Some(required("inject", args, 0)?), block_arg("inject", args, 1)?),
    };
    for (i, item) in entries(rt, this)?.into_iter().enumerate() {
        memo = Some(match memo {
            None => item,
            Some(acc) => rt.invoke(&block, &Value::Nil, &[acc, item, Value::Int(i as i64)])?,
        });
    }
    Ok(memo.unwrap_or_default())
}

fn map(rt: &mut Runtime, this: &Value, args: &[Value]) -> MethodResult {
    let block = block_arg("map", args, 0)?;
    let mut mapped = Vec::new();
    for (i, item) in entries(rt, this)?.iter().enumerate() {
        mapped.push(call_block(rt, &block, item, i)?);
    }
    Ok(Value::list(mapped))
}

fn max(rt: &mut Runtime, this: &Value, args: &[Value]) -> MethodResult {
    Ok(bounds(sorted(rt, this, args)?).1)
}

fn max_by(rt: &mut Runtime, this: &Value, args: &[Value]) -> MethodResult {
    Ok(bounds(sorted_by(rt, this, args)?).1)
}

fn member(rt: &mut Runtime, this: &Value, args: &[Value]) -> MethodResult {
    let needle = required("member", args, 0)?;
    Ok(Value::Bool(entries(rt, this)?.contains(&needle)))
}

fn min(rt: &mut Runtime, this: &Value, args: &[Value]) -> MethodResult {
    Ok(bounds(sorted(rt, this, args)?).0)
}

fn min_by(rt: &mut Runtime, this: &Value, args: &[Value]) -> MethodResult {
    Ok(bounds(sorted_by(rt, this, args)?).0)
}

fn minmax(rt: &mut Runtime, this: &Value, args: &[Value]) -> MethodResult {
    let (low, high) = bounds(sorted(rt, this, args)?);
    Ok(Value::list([low, high]))
}

fn minmax_by(rt: &mut Runtime, this: &Value, args: &[Value]) -> MethodResult {
    let (low, high) = bounds(sorted_by(rt, this, args)?);
    Ok(Value::list([low, high]))
}

/// First and last of a sorted list; nil for an empty one.
fn bounds(sorted: Vec<Value>) -> (Value, Value) {
    let low = sorted.first().cloned().unwrap_or_default();
    let high = sorted.last().cloned().unwrap_or_default();
    (low, high)
}

fn none(rt: &mut Runtime, this: &Value, args: &[Value]) -> MethodResult {
    Ok(Value::Bool(!any(rt, this, args)?.is_truthy()))
}

fn one(rt: &mut Runtime, this: &Value, args: &[Value]) -> MethodResult {
    let block = optional_block(args, 0)?;
    let mut hits = 0;
    for (i, item) in entries(rt, this)?.iter().enumerate() {
        if truth(rt, block.as_ref(), item, i)? {
            hits += 1;
            if hits > 1 {
                break;
            }
        }
    }
    Ok(Value::Bool(hits == 1))
}

/// `[passing, failing]`.
fn partition(rt: &mut Runtime, this: &Value, args: &[Value]) -> MethodResult {
    let block = block_arg("partition", args, 0)?;
    let (mut ayes, mut noes) = (Vec::new(), Vec::new());
    for (i, item) in entries(rt, this)?.into_iter().enumerate() {
        if test_block(rt, &block, &item, i)? {
            ayes.push(item);
        } else {
            noes.push(item);
        }
    }
    Ok(Value::list([Value::list(ayes), Value::list(noes)]))
}

fn reject(rt: &mut Runtime, this: &Value, args: &[Value]) -> MethodResult {
    filter_items(rt, this, args, "reject", false)
}

fn select(rt: &mut Runtime, this: &Value, args: &[Value]) -> MethodResult {
    filter_items(rt, this, args, "select", true)
}

fn filter_items(rt: &mut Runtime, this: &Value, args: &[Value], name: &str, keep: bool) -> MethodResult {
    let block = block_arg(name, args, 0)?;
    let mut kept = Vec::new();
    for (i, item) in entries(rt, this)?.into_iter().enumerate() {
        if test_block(rt, &block, &item, i)? == keep {
            kept.push(item);
        }
    }
    Ok(Value::list(kept))
}

/// Last item first; each keeps its original index.
fn reverse_each(rt: &mut Runtime, this: &Value, args: &[Value]) -> MethodResult {
    let block = block_arg("reverse_each", args, 0)?;
    let items = entries(rt, this)?;
    for (i, item) in items.iter().enumerate().rev() {
        call_block(rt, &block, item, i)?;
    }
    Ok(Value::Nil)
}

fn sort(rt: &mut Runtime, this: &Value, args: &[Value]) -> MethodResult {
    Ok(Value::list(sorted(rt, this, args)?))
}

/// Sorted with a comparator block returning a negative, zero or positive
/// number, or with `compare` when there is none.
fn sorted(rt: &mut Runtime, this: &Value, args: &[Value]) -> Result<Vec<Value>, RuntimeError> {
    let block = optional_block(args, 0)?;
    let items = entries(rt, this)?;
    match block {
        Some(block) => sort_with(rt, items, &mut |rt, a, b| {
            ordering_of(&rt.invoke(&block, &Value::Nil, &[a.clone(), b.clone()])?)
        }),
        None => sort_with(rt, items, &mut compare),
    }
}

fn sort_by(rt: &mut Runtime, this: &Value, args: &[Value]) -> MethodResult {
    Ok(Value::list(sorted_by(rt, this, args)?))
}

/// Sorted by the keys the block computes, each computed once.
fn sorted_by(rt: &mut Runtime, this: &Value, args: &[Value]) -> Result<Vec<Value>, RuntimeError> {
    let block = block_arg("sort_by", args, 0)?;
    let mut keyed = Vec::new();
    for (i, item) in entries(rt, this)?.into_iter().enumerate() {
        keyed.push((call_block(rt, &block, &item, i)?, item));
    }
    let keyed = sort_with(rt, keyed, &mut |rt, a, b| compare(rt, &a.0, &b.0))?;
    Ok(keyed.into_iter().map(|(_, item)| item).collect())
}

fn take(rt: &mut Runtime, this: &Value, args: &[Value]) -> MethodResult {
    let n = size_arg("take", args, 0)?;
    Ok(Value::list(entries(rt, this)?.into_iter().take(n)))
}

fn take_while(rt: &mut Runtime, this: &Value, args: &[Value]) -> MethodResult {
    let block = block_arg("take_while", args, 0)?;
    let mut taken = Vec::new();
    for (i, item) in entries(rt, this)?.into_iter().enumerate() {
        if !test_block(rt, &block, &item, i)? {
            break;
        }
        taken.push(item);
    }
    Ok(Value::list(taken))
}

fn to_a(rt: &mut Runtime, this: &Value, _args: &[Value]) -> MethodResult {
    Ok(Value::list(entries(rt, this)?))
}

/// Pairs each item with the items at the same index in the other lists
/// (nil past their end). A trailing block receives each tuple instead.
fn zip(rt: &mut Runtime, this: &Value, args: &[Value]) -> MethodResult {
    let (others, block) = match args.split_last() {
        Some((block @ Value::Function(_), rest)) => (rest, Some(block)),
        _ => (args, None),
    };
    let mut columns = Vec::with_capacity(others.len());
    for other in others {
        if let Some(items) = other.as_list() {
            columns.push(items.to_vec());
        } else if rt.respond_to(other, TO_A) {
            let items = rt.call(other, TO_A, &[])?;
            columns.push(items.as_list().map(|l| l.to_vec()).unwrap_or_default());
        }
    }

    let mut rows = Vec::new();
    for (i, item) in entries(rt, this)?.into_iter().enumerate() {
        let row = std::iter::once(item)
            .chain(columns.iter().map(|column| column.get(i).cloned().unwrap_or_default()));
        rows.push(Value::list(row));
    }
    match block {
        Some(block) => {
            for (i, row) in rows.iter().enumerate() {
                call_block(rt, block, row, i)?;
            }
            Ok(Value::Nil)
        }
        None => Ok(Value::list(rows)),
    }
}
