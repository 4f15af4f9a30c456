//! The standard reducers.
//!
//! Each function takes the two sides of one field, either of which may be
//! absent, and returns the merged value (or `None` when both are absent).
//! Malformed values never fail a merge: they read as the reducer's bottom
//! element (`false`, `[]`, "never written").

use std::cmp::Ordering;

use mera_model::{Reducer, Stamped};
use serde_json::Value;

/// Applies `reducer` to one field.
pub fn apply(reducer: &Reducer, a: Option<&Value>, b: Option<&Value>) -> Option<Value> {
    if a.is_none() && b.is_none() {
        return None;
    }
    let merged = match reducer {
        Reducer::BooleanOr => Value::Bool(boolean_or(a, b)),
        Reducer::ElementwiseOr => Value::Array(
            elementwise_or(&bool_list(a), &bool_list(b))
                .into_iter()
                .map(Value::Bool)
                .collect(),
        ),
        Reducer::LastWriteWins => last_write_wins(a, b),
        Reducer::Custom(custom) => match (a, b) {
            (Some(a), Some(b)) => custom.apply(a, b),
            (Some(only), None) | (None, Some(only)) => only.clone(),
            (None, None) => return None,
        },
    };
    Some(merged)
}

/// `a || b`; anything but `true` counts as false.
pub fn boolean_or(a: Option<&Value>, b: Option<&Value>) -> bool {
    let truthy = |v: Option<&Value>| v.and_then(Value::as_bool).unwrap_or(false);
    truthy(a) || truthy(b)
}

/// `r[i] = a[i] || b[i]` up to the longer length. A missing entry means
/// "not yet interacted with", never "cleared".
pub fn elementwise_or(a: &[bool], b: &[bool]) -> Vec<bool> {
    let len = a.len().max(b.len());
    (0..len)
        .map(|i| a.get(i).copied().unwrap_or(false) || b.get(i).copied().unwrap_or(false))
        .collect()
}

fn bool_list(value: Option<&Value>) -> Vec<bool> {
    value
        .and_then(Value::as_array)
        .map(|items| items.iter().map(|v| v.as_bool().unwrap_or(false)).collect())
        .unwrap_or_default()
}

/// Orders candidate values for last-writer-wins.
///
/// Stamped values beat unstamped ones; stamps compare by time, then by the
/// canonical JSON text of the value so ties resolve the same way on every
/// device.
fn lww_rank(value: &Value) -> (Option<Stamped>, String) {
    let stamped = serde_json::from_value::<Stamped>(value.clone()).ok();
    let canonical = match &stamped {
        Some(s) => s.value.to_string(),
        None => value.to_string(),
    };
    (stamped, canonical)
}

fn compare_lww(a: &Value, b: &Value) -> Ordering {
    let (sa, ca) = lww_rank(a);
    let (sb, cb) = lww_rank(b);
    let primary = match (sa, sb) {
        (Some(sa), Some(sb)) => sa.at.cmp(&sb.at).then_with(|| ca.cmp(&cb)),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => ca.cmp(&cb),
    };
    // Equal only for identical JSON, which keeps the choice order-free.
    primary.then_with(|| a.to_string().cmp(&b.to_string()))
}

/// The later of two stamped values.
pub fn last_write_wins(a: Option<&Value>, b: Option<&Value>) -> Value {
    match (a, b) {
        (Some(a), Some(b)) => match compare_lww(a, b) {
            Ordering::Less => b.clone(),
            _ => a.clone(),
        },
        (Some(only), None) | (None, Some(only)) => only.clone(),
        (None, None) => Value::Null,
    }
}
