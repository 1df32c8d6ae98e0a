//! Graph shapes shared by the benchmarks and the timing binary.

use mixins::{EngineError, ModuleId, Registry, Value};

pub fn constant(value: i64) -> Value {
    Value::function(move |_, _, _| Ok(Value::Int(value)))
}

/// `depth` modules, each including the previous one. The root comes first.
pub fn chain(registry: &mut Registry, depth: usize) -> Result<Vec<ModuleId>, EngineError> {
    let mut modules: Vec<ModuleId> = Vec::with_capacity(depth);
    for level in 0..depth {
        let mixin = modules.last().map(|id| Value::Module(*id));
        let id = registry.create_module(Some(&format!("Level{level}")), mixin.as_ref())?;
        modules.push(id);
    }
    Ok(modules)
}

/// One root included by `width` modules. The root comes first.
pub fn fan_out(registry: &mut Registry, width: usize) -> Result<Vec<ModuleId>, EngineError> {
    let root = registry.create_module(Some("Root"), None)?;
    let mut modules = vec![root];
    for i in 0..width {
        modules.push(registry.create_module(Some(&format!("Leaf{i}")), Some(&Value::Module(root)))?);
    }
    Ok(modules)
}

/// `layers` diamonds stacked on top of each other. The base comes first.
pub fn diamonds(registry: &mut Registry, layers: usize) -> Result<Vec<ModuleId>, EngineError> {
    let mut top = registry.create_module(Some("Base"), None)?;
    let mut modules = vec![top];
    for _ in 0..layers {
        let left = registry.create_module(None, Some(&Value::Module(top)))?;
        let right = registry.create_module(None, Some(&Value::Module(top)))?;
        let join = registry.create_module(None, None)?;
        registry
            .module(join)
            .include(&Value::Module(left))?
            .include(&Value::Module(right))?;
        modules.extend([left, right, join]);
        top = join;
    }
    Ok(modules)
}
