//! Resolution and propagation through the module graph.

use mixins::{Bag, ModuleId, Registry, Value};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn constant(value: &'static str) -> Value {
    Value::function(move |_, _, _| Ok(Value::str(value)))
}

fn owner(registry: &Registry, id: ModuleId, name: &str) -> Option<ModuleId> {
    registry.resolve(id, name).map(|method| method.owner)
}

#[test]
fn later_inclusion_overrides_earlier() {
    init_logger();
    let mut registry = Registry::new();
    let m1 = registry.create_module(Some("M1"), None).unwrap();
    let m2 = registry.create_module(Some("M2"), None).unwrap();
    registry.define(m1, "name", constant("m1")).unwrap();
    registry.define(m2, "name", constant("m2")).unwrap();

    let a = registry.create_module(Some("A"), None).unwrap();
    registry
        .module(a)
        .include(&Value::Module(m1))
        .unwrap()
        .include(&Value::Module(m2))
        .unwrap();

    assert_eq!(owner(&registry, a, "name"), Some(m2));
}

#[test]
fn own_definition_wins_when_defined_first() {
    init_logger();
    let mut registry = Registry::new();
    let b = registry.create_module(Some("B"), None).unwrap();
    let a = registry.create_module(Some("A"), None).unwrap();

    registry.define(a, "m", constant("a")).unwrap();
    registry.define(b, "m", constant("b")).unwrap();
    registry.include(a, &Value::Module(b)).unwrap();

    assert_eq!(owner(&registry, a, "m"), Some(a));
}

#[test]
fn own_definition_wins_when_dependency_redefines_later() {
    init_logger();
    let mut registry = Registry::new();
    let b = registry.create_module(Some("B"), None).unwrap();
    let a = registry.create_module(Some("A"), Some(&Value::Module(b))).unwrap();

    registry.define(a, "m", constant("a")).unwrap();
    registry.define(b, "m", constant("b")).unwrap();

    assert_eq!(owner(&registry, a, "m"), Some(a));
    assert_eq!(owner(&registry, b, "m"), Some(b));
}

#[test]
fn definitions_reach_existing_dependents() {
    init_logger();
    let mut registry = Registry::new();
    let m = registry.create_module(Some("M"), None).unwrap();
    let a = registry.create_module(Some("A"), Some(&Value::Module(m))).unwrap();
    assert!(registry.resolve(a, "greet").is_none());

    registry.define(m, "greet", constant("hello")).unwrap();
    assert_eq!(owner(&registry, a, "greet"), Some(m));

    registry.define(m, "greet", constant("hello again")).unwrap();
    let version = registry.resolve(a, "greet").unwrap().version;
    assert_eq!(Some(version), registry.instance_method(m, "greet").map(|m| m.version));
}

#[test]
fn diamond_resolves_to_latest_definition() {
    init_logger();
    let mut registry = Registry::new();
    let m = registry.create_module(Some("M"), None).unwrap();
    let a = registry.create_module(Some("A"), Some(&Value::Module(m))).unwrap();
    let b = registry.create_module(Some("B"), Some(&Value::Module(m))).unwrap();
    let c = registry.create_module(Some("C"), None).unwrap();
    registry.module(c).include(&Value::Module(a)).unwrap().include(&Value::Module(b)).unwrap();

    registry.define(m, "size", constant("first")).unwrap();
    registry.define(m, "size", constant("second")).unwrap();

    let latest = registry.instance_method(m, "size").cloned().unwrap();
    for id in [a, b, c] {
        let resolved = registry.resolve(id, "size").unwrap();
        assert!(std::rc::Rc::ptr_eq(resolved, &latest), "stale method in {id}");
    }
}

#[test]
fn definitions_reach_every_depth() {
    init_logger();
    let mut registry = Registry::new();
    let root = registry.create_module(Some("Root"), None).unwrap();
    let mut chain = vec![root];
    for depth in 1..=12 {
        let parent = *chain.last().unwrap();
        let name = format!("Level{depth}");
        let id = registry.create_module(Some(&name), Some(&Value::Module(parent))).unwrap();
        chain.push(id);
    }

    registry.define(root, "deep", constant("x")).unwrap();

    for id in chain {
        assert_eq!(owner(&registry, id, "deep"), Some(root));
    }
}

#[test]
fn including_nothing_changes_nothing() {
    init_logger();
    let mut registry = Registry::new();
    let a = registry.create_module(Some("A"), None).unwrap();
    registry.define(a, "m", constant("a")).unwrap();
    let before = registry.snapshot();

    assert_eq!(registry.include(a, &Value::Nil), Ok(a));
    assert_eq!(registry.include(a, &Value::Int(4)), Ok(a));
    assert_eq!(registry.include(a, &Value::str("text")), Ok(a));

    assert_eq!(registry.snapshot(), before);
    assert!(registry.take_inclusions().is_empty());
}

#[test]
fn repeated_definition_keeps_tables_consistent() {
    init_logger();
    let mut registry = Registry::new();
    let m = registry.create_module(Some("M"), None).unwrap();
    let a = registry.create_module(Some("A"), Some(&Value::Module(m))).unwrap();
    let f = constant("same");

    registry.define(m, "f", f.clone()).unwrap();
    let once = registry.snapshot();
    registry.define(m, "f", f).unwrap();

    assert_eq!(registry.snapshot(), once);
    assert_eq!(registry.resolved_names(a).len(), 1);
}

#[test]
fn inclusion_brings_transitive_methods() {
    init_logger();
    let mut registry = Registry::new();
    let inner = registry.create_module(Some("Inner"), None).unwrap();
    registry.define(inner, "deep", constant("inner")).unwrap();
    let outer = registry.create_module(Some("Outer"), Some(&Value::Module(inner))).unwrap();
    registry.define(outer, "shallow", constant("outer")).unwrap();

    let host = registry.create_module(Some("Host"), Some(&Value::Module(outer))).unwrap();

    assert_eq!(owner(&registry, host, "deep"), Some(inner));
    assert_eq!(owner(&registry, host, "shallow"), Some(outer));
    assert!(registry.instance_method(host, "deep").is_none());
}

#[test]
fn outer_definition_shadows_nested_one() {
    init_logger();
    let mut registry = Registry::new();
    let inner = registry.create_module(Some("Inner"), None).unwrap();
    registry.define(inner, "m", constant("inner")).unwrap();
    let outer = registry.create_module(Some("Outer"), Some(&Value::Module(inner))).unwrap();
    registry.define(outer, "m", constant("outer")).unwrap();
    let host = registry.create_module(Some("Host"), Some(&Value::Module(outer))).unwrap();

    registry.define(inner, "m", constant("inner again")).unwrap();

    assert_eq!(owner(&registry, host, "m"), Some(outer));
}

#[test]
fn first_listed_nested_mixin_wins() {
    init_logger();
    let mut registry = Registry::new();
    let a = registry.create_module(Some("A"), None).unwrap();
    let b = registry.create_module(Some("B"), None).unwrap();
    registry.define(a, "m", constant("a")).unwrap();
    registry.define(b, "m", constant("b")).unwrap();
    let listed = [Value::Module(a), Value::Module(b)];

    let host = registry
        .create_module(Some("Host"), Some(&Value::record(Bag::new().include(listed.clone()))))
        .unwrap();
    assert_eq!(owner(&registry, host, "m"), Some(a));
    assert_eq!(registry.dependencies(host), &[b, a]);

    let extended = registry
        .create_module(Some("Extended"), Some(&Value::record(Bag::new().extend(listed))))
        .unwrap();
    let singleton = registry.singleton(extended).unwrap();
    assert_eq!(owner(&registry, singleton, "m"), Some(a));
    assert_eq!(owner(&registry, extended, "m"), None);
}

#[test]
fn nil_markers_change_nothing() {
    init_logger();
    let mut registry = Registry::new();
    let host = registry.create_module(Some("Host"), None).unwrap();
    let before = registry.len();

    let bag = Bag::new().with("extend", Value::Nil).with("include", Value::Nil);
    registry.include(host, &Value::record(bag)).unwrap();
    registry.extend(host, &Value::Nil).unwrap();

    assert_eq!(registry.len(), before);
    assert_eq!(registry.singleton(host), None);
    assert!(registry.dependencies(host).is_empty());
    assert!(registry.take_inclusions().is_empty());
}

#[test]
fn names_are_cosmetic() {
    let mut registry = Registry::new();
    let anonymous = registry.create_module(None, None).unwrap();
    assert_eq!(registry.name(anonymous), None);
    assert_eq!(registry.display_name(anonymous), format!("Module{anonymous}"));

    registry.set_name(anonymous, "Named").unwrap();
    assert_eq!(registry.display_name(anonymous), "Named");
}
