//! Iteration primitives.
//!
//! Algorithms never look inside a receiver: they collect its items by
//! calling its `for_each` method with a block.

use std::cell::RefCell;
use std::rc::Rc;
use mixins::{Runtime, RuntimeError, Value};

pub const FOR_EACH: &str = "for_each";

/// Field holding a collection object's items.
pub const ITEMS_FIELD: &str = "items";

/// Items of an array-like value: a list, or an object with a list in `items`.
pub fn array_items(value: &Value) -> Option<Vec<Value>> {
    match value {
        Value::List(items) => Some(items.to_vec()),
        Value::Object(object) => match object.get(ITEMS_FIELD) {
            Some(Value::List(items)) => Some(items.to_vec()),
            _ => None,
        },
        _ => None,
    }
}

/// Call `block` with `(item, index)` for each non-nil item of an array-like value.
pub fn for_each_in(rt: &mut Runtime, collection: &Value, block: &Value) -> Result<(), RuntimeError> {
    let items = array_items(collection).ok_or(RuntimeError::Type {
        expected: "list",
        found: collection.type_name(),
    })?;
    for (index, item) in items.iter().enumerate() {
        if item.is_nil() {
            continue;
        }
        call_block(rt, block, item, index)?;
    }
    Ok(())
}

/// Everything the receiver's `for_each` yields, in order.
pub fn entries(rt: &mut Runtime, this: &Value) -> Result<Vec<Value>, RuntimeError> {
    let collected: Rc<RefCell<Vec<Value>>> = Rc::default();
    let sink = collected.clone();
    let block = Value::function(move |_, _, args| {
        sink.borrow_mut().push(args.first().cloned().unwrap_or_default());
        Ok(Value::Nil)
    });
    rt.call(this, FOR_EACH, &[block])?;
    Ok(collected.take())
}

pub fn call_block(rt: &mut Runtime, block: &Value, item: &Value, index: usize) -> Result<Value, RuntimeError> {
    rt.invoke(block, &Value::Nil, &[item.clone(), Value::Int(index as i64)])
}

pub fn test_block(rt: &mut Runtime, block: &Value, item: &Value, index: usize) -> Result<bool, RuntimeError> {
    Ok(call_block(rt, block, item, index)?.is_truthy())
}

/// The block's verdict, or the item's own truthiness when there is no block.
pub fn truth(rt: &mut Runtime, block: Option<&Value>, item: &Value, index: usize) -> Result<bool, RuntimeError> {
    match block {
        Some(block) => test_block(rt, block, item, index),
        None => Ok(item.is_truthy()),
    }
}

// --- Arguments ---

pub fn block_arg(name: &str, args: &[Value], at: usize) -> Result<Value, RuntimeError> {
    match args.get(at) {
        Some(block @ Value::Function(_)) => Ok(block.clone()),
        Some(other) => Err(RuntimeError::Type { expected: "function", found: other.type_name() }),
        None => Err(RuntimeError::Arity { name: name.to_string(), expected: at + 1, got: args.len() }),
    }
}

/// A block that may be left out or passed as nil.
pub fn optional_block(args: &[Value], at: usize) -> Result<Option<Value>, RuntimeError> {
    match args.get(at) {
        None | Some(Value::Nil) => Ok(None),
        Some(block @ Value::Function(_)) => Ok(Some(block.clone())),
        Some(other) => Err(RuntimeError::Type { expected: "function", found: other.type_name() }),
    }
}

pub fn size_arg(name: &str, args: &[Value], at: usize) -> Result<usize, RuntimeError> {
    match args.get(at) {
        Some(Value::Int(n)) if *n >= 0 => Ok(*n as usize),
        Some(Value::Int(n)) => Err(RuntimeError::Raised(format!("{name}: negative size {n}"))),
        Some(other) => Err(RuntimeError::Type { expected: "int", found: other.type_name() }),
        None => Err(RuntimeError::Arity { name: name.to_string(), expected: at + 1, got: args.len() }),
    }
}

pub fn required(name: &str, args: &[Value], at: usize) -> Result<Value, RuntimeError> {
    args.get(at).cloned().ok_or_else(|| RuntimeError::Arity {
        name: name.to_string(),
        expected: at + 1,
        got: args.len(),
    })
}
