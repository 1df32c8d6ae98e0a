//! Ordering of host values.
//!
//! A value that responds to `compare_to` orders itself (negative, zero or
//! positive result). Numbers and strings fall back to their natural order.
//! Anything else cannot be compared.

use std::cmp::Ordering;
use mixins::{Runtime, RuntimeError, Value};

pub const COMPARE_TO: &str = "compare_to";

pub fn compare(rt: &mut Runtime, a: &Value, b: &Value) -> Result<Ordering, RuntimeError> {
    if rt.respond_to(a, COMPARE_TO) {
        let result = rt.call(a, COMPARE_TO, &[b.clone()])?;
        return ordering_of(&result);
    }
    a.natural_cmp(b).ok_or_else(|| {
        RuntimeError::Raised(format!("comparison of {} with {} failed", rt.describe(a), rt.describe(b)))
    })
}

/// Read a comparator result.
pub fn ordering_of(value: &Value) -> Result<Ordering, RuntimeError> {
    match value {
        Value::Int(n) => Ok(n.cmp(&0)),
        Value::Float(f) => f
            .partial_cmp(&0.0)
            .ok_or_else(|| RuntimeError::Raised("comparator returned NaN".into())),
        other => Err(RuntimeError::Type { expected: "int", found: other.type_name() }),
    }
}

/// Whether every item orders itself through `compare_to`.
pub fn all_comparable(rt: &Runtime, items: &[Value]) -> bool {
    items.iter().all(|item| rt.respond_to(item, COMPARE_TO))
}

/// Stable merge sort with a comparator that may fail.
/// The first failure aborts the sort.
pub fn sort_with<T, F>(rt: &mut Runtime, items: Vec<T>, cmp: &mut F) -> Result<Vec<T>, RuntimeError>
where
    F: FnMut(&mut Runtime, &T, &T) -> Result<Ordering, RuntimeError>,
{
    if items.len() <= 1 {
        return Ok(items);
    }
    let mut left = items;
    let right = left.split_off(left.len() / 2);
    let left = sort_with(rt, left, cmp)?;
    let right = sort_with(rt, right, cmp)?;

    let mut merged = Vec::with_capacity(left.len() + right.len());
    let mut left = left.into_iter().peekable();
    let mut right = right.into_iter().peekable();
    while let (Some(l), Some(r)) = (left.peek(), right.peek()) {
        // Ties keep the left item first.
        let next = if cmp(rt, r, l)? == Ordering::Less { right.next() } else { left.next() };
        merged.extend(next);
    }
    merged.extend(left);
    merged.extend(right);
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_is_stable() {
        let mut rt = Runtime::new();
        let pairs = vec![(2, 'a'), (1, 'b'), (2, 'c'), (1, 'd')];

        let sorted = sort_with(&mut rt, pairs, &mut |_, a, b| Ok(a.0.cmp(&b.0))).unwrap();

        assert_eq!(sorted, vec![(1, 'b'), (1, 'd'), (2, 'a'), (2, 'c')]);
    }

    #[test]
    fn mixed_values_do_not_compare() {
        let mut rt = Runtime::new();
        assert_eq!(compare(&mut rt, &Value::Int(1), &Value::Float(1.5)), Ok(Ordering::Less));
        assert!(matches!(
            compare(&mut rt, &Value::Int(1), &Value::str("1")),
            Err(RuntimeError::Raised(_))
        ));
        assert_eq!(ordering_of(&Value::Int(-4)), Ok(Ordering::Less));
        assert!(ordering_of(&Value::Nil).is_err());
    }
}
