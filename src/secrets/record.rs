//! Normalized, string-valued view of a Vault record.
//!
//! Vault hands back arbitrary JSON. Everything downstream works on strings,
//! so type narrowing happens once, here.

use std::collections::BTreeMap;

use serde_json::{Map, Number, Value};

use super::error::Result;

/// Flat key/value record. Keys keep their stored case; lookups ignore it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecretRecord {
    entries: BTreeMap<String, String>,
}

impl SecretRecord {
    /// Normalize a raw Vault payload.
    ///
    /// Strings are kept, booleans and numbers are stringified, `null`,
    /// arrays and nested objects are dropped.
    pub fn from_json(data: &Map<String, Value>) -> Self {
        let entries = data
            .iter()
            .filter_map(|(key, value)| normalize_value(value).map(|v| (key.clone(), v)))
            .collect();
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Case-insensitive lookup. An exact match wins over a case-folded one;
    /// among case-folded matches the first key in sorted order wins.
    pub fn get_ignore_case(&self, key: &str) -> Option<&str> {
        if let Some(value) = self.entries.get(key) {
            return Some(value);
        }
        self.entries
            .iter()
            .find(|(candidate, _)| candidate.eq_ignore_ascii_case(key))
            .map(|(_, value)| value.as_str())
    }

    /// JSON object of the whole record, keys in sorted order.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.entries)?)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K, V> FromIterator<(K, V)> for SecretRecord
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self { entries: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect() }
    }
}

fn normalize_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(normalize_number(n)),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn normalize_number(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        // integral floats (`3.0`) come from JSON encoders that lost the int type
        Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => (f as i64).to_string(),
        Some(f) => f.to_string(),
        None => n.to_string(),
    }
}
