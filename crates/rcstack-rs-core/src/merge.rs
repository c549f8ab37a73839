//! Deep merge of JSON values with array union semantics.
//!
//! Mappings merge key-wise and recursively, arrays combine according to an
//! [`ArrayPolicy`], and everything else is overwritten by the later value.
//! Inputs are never mutated; every container in the result is freshly built.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Keys that are never copied out of an overlay, at any depth.
pub const RESERVED_KEYS: &[&str] = &["__proto__", "constructor"];

/// How an overlay array combines with the value already at its key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArrayPolicy {
    /// Union of existing and overlay entries, first-seen order, dropping
    /// falsy entries (`null`, `false`, `0`, `""`).
    #[default]
    UnionDropFalsy,
    /// Union of existing and overlay entries, first-seen order, keeping all.
    UnionKeepAll,
    /// The overlay array replaces the existing value.
    Overwrite,
}

/// Stateless deep-merge engine parameterized by its array policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValueMerger {
    policy: ArrayPolicy,
}

impl ValueMerger {
    /// Create a merger using the given array policy.
    pub fn new(policy: ArrayPolicy) -> Self {
        Self { policy }
    }

    /// Array policy applied by this merger.
    pub fn policy(&self) -> ArrayPolicy {
        self.policy
    }

    /// Merge `overlays` over `base`, left to right, returning a new value.
    ///
    /// Non-mapping overlays contribute nothing. With no overlays the result is
    /// a copy of `base`. A non-mapping `base` is replaced by an empty mapping
    /// as soon as a mapping overlay arrives.
    pub fn merge<'a, I>(&self, base: &Value, overlays: I) -> Value
    where
        I: IntoIterator<Item = &'a Value>,
    {
        let mut acc = base.clone();
        for overlay in overlays {
            let Value::Object(overlay_map) = overlay else {
                continue;
            };
            if !acc.is_object() {
                acc = Value::Object(Map::new());
            }
            if let Value::Object(acc_map) = &mut acc {
                self.merge_into(acc_map, overlay_map);
            }
        }
        acc
    }

    /// Merge two values; shorthand for a single overlay.
    pub fn merge_pair(&self, base: &Value, overlay: &Value) -> Value {
        self.merge(base, std::iter::once(overlay))
    }

    fn merge_into(&self, target: &mut Map<String, Value>, overlay: &Map<String, Value>) {
        for (key, value) in overlay {
            if RESERVED_KEYS.contains(&key.as_str()) {
                continue;
            }
            let merged = match (target.get(key), value) {
                (Some(Value::Object(existing)), Value::Object(incoming)) => {
                    let mut nested = existing.clone();
                    self.merge_into(&mut nested, incoming);
                    Value::Object(nested)
                }
                (existing, Value::Array(incoming)) => self.merge_array(existing, incoming),
                (_, Value::Object(incoming)) => Value::Object(sanitize(incoming)),
                (_, other) => other.clone(),
            };
            target.insert(key.clone(), merged);
        }
    }

    fn merge_array(&self, existing: Option<&Value>, incoming: &[Value]) -> Value {
        let keep_all = match self.policy {
            ArrayPolicy::Overwrite => {
                return Value::Array(incoming.iter().map(sanitize_value).collect());
            }
            ArrayPolicy::UnionKeepAll => true,
            ArrayPolicy::UnionDropFalsy => false,
        };

        let leading: Vec<&Value> = match existing {
            Some(Value::Array(items)) => items.iter().collect(),
            // A scalar or mapping already at the key becomes the first element.
            Some(other) if !other.is_null() => vec![other],
            _ => Vec::new(),
        };

        let mut out: Vec<Value> = Vec::with_capacity(leading.len() + incoming.len());
        for item in leading.into_iter().chain(incoming.iter()) {
            if !keep_all && is_falsy(item) {
                continue;
            }
            let item = sanitize_value(item);
            if !out.iter().any(|seen| same_entry(seen, &item)) {
                out.push(item);
            }
        }
        Value::Array(out)
    }
}

/// Merge `overlays` over `base` with the default array policy.
pub fn merge_values<'a, I>(base: &Value, overlays: I) -> Value
where
    I: IntoIterator<Item = &'a Value>,
{
    ValueMerger::default().merge(base, overlays)
}

/// Whether a value counts as falsy for the drop-falsy union.
pub fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n == 0.0),
        Value::String(text) => text.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// Union membership test; numbers compare by value, so `1` and `1.0` collapse.
fn same_entry(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => match (a.as_f64(), b.as_f64()) {
            (Some(a), Some(b)) => a == b,
            _ => a == b,
        },
        _ => left == right,
    }
}

/// Copy a mapping, dropping reserved keys at every depth.
fn sanitize(map: &Map<String, Value>) -> Map<String, Value> {
    map.iter()
        .filter(|(key, _)| !RESERVED_KEYS.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), sanitize_value(value)))
        .collect()
}

fn sanitize_value(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(sanitize(map)),
        Value::Array(items) => Value::Array(items.iter().map(sanitize_value).collect()),
        other => other.clone(),
    }
}
