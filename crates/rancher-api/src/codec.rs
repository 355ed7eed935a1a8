//! Wire codec between JSON bytes and the generic object model.
//!
//! Decoding keeps the server's key order and builds objects bottom-up: by the
//! time a mapping is materialized its children already are. A mapping whose
//! `type` is a non-empty string has its `links`/`actions` lifted into the
//! record's link and action tables; a `"collection"` whose `data` is an array
//! becomes a [`Collection`] of its mapping members.
//!
//! Encoding writes keys sorted, skips `_`-prefixed fields, and never writes
//! the lifted link/action tables.

use std::fmt;

use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::Result;
use crate::object::{Collection, GenericObject, PRIVATE_PREFIX, Record, Value};

/// Serialize a value into a request body.
pub fn encode(value: &Value) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(value)?)
}

/// Parse a response body.
///
/// An empty body or a literal `null` decodes to `None`.
pub fn decode(body: &[u8]) -> Result<Option<Value>> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    match serde_json::from_slice::<Value>(body)? {
        Value::Null => Ok(None),
        value => Ok(Some(value)),
    }
}

/// Turn the ordered entries of one JSON mapping into an object.
pub(crate) fn materialize(entries: Vec<(String, Value)>) -> GenericObject {
    let mut record = Record::from_parts(entries, Vec::new(), Vec::new());
    record.lift_tables();
    if record.type_name() == Some("collection") {
        split_collection(record)
    } else {
        GenericObject::Record(record)
    }
}

fn split_collection(mut header: Record) -> GenericObject {
    if !matches!(header.get("data"), Some(Value::Array(_))) {
        return GenericObject::Record(header);
    }
    let Some(Value::Array(items)) = header.remove("data") else {
        return GenericObject::Record(header);
    };

    let total = items.len();
    let data: Vec<Record> = items
        .into_iter()
        .filter_map(|v| v.into_object().and_then(GenericObject::into_record))
        .collect();
    if data.len() < total {
        tracing::debug!(
            dropped = total - data.len(),
            "Skipping collection members that are not resources"
        );
    }
    GenericObject::Collection(Collection::new(header, data))
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Value::Object(materialize(
                map.into_iter().map(|(k, v)| (k, Value::from(v))).collect(),
            )),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Serialize
// ─────────────────────────────────────────────────────────────────────────────

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(n) => n.serialize(serializer),
            Value::String(s) => serializer.serialize_str(s),
            Value::Array(items) => serializer.collect_seq(items),
            Value::Object(obj) => obj.serialize(serializer),
        }
    }
}

impl Serialize for GenericObject {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            GenericObject::Record(r) => r.serialize(serializer),
            GenericObject::Collection(c) => c.serialize(serializer),
        }
    }
}

fn public_fields(record: &Record) -> Vec<(&str, &Value)> {
    let mut entries: Vec<_> = record
        .fields()
        .filter(|(k, _)| !k.starts_with(PRIVATE_PREFIX))
        .collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));
    entries
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(public_fields(self))
    }
}

impl Serialize for Collection {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut entries = public_fields(self.header());
        let at = entries
            .iter()
            .position(|(k, _)| *k > "data")
            .unwrap_or(entries.len());

        let mut map = serializer.serialize_map(Some(entries.len() + 1))?;
        for (k, v) in &entries[..at] {
            map.serialize_entry(k, v)?;
        }
        map.serialize_entry("data", self.data())?;
        for (k, v) in entries.drain(at..) {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Deserialize
// ─────────────────────────────────────────────────────────────────────────────

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(ValueVisitor)
    }
}

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("any JSON value")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> std::result::Result<Value, E> {
        Ok(Value::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<Value, E> {
        Ok(Value::from(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<Value, E> {
        Ok(Value::from(v))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<Value, E> {
        Ok(Value::from(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Value, E> {
        Ok(Value::from(v))
    }

    fn visit_string<E: de::Error>(self, v: String) -> std::result::Result<Value, E> {
        Ok(Value::String(v))
    }

    fn visit_unit<E: de::Error>(self) -> std::result::Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_none<E: de::Error>(self) -> std::result::Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, d: D) -> std::result::Result<Value, D::Error> {
        Value::deserialize(d)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> std::result::Result<Value, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element::<Value>()? {
            items.push(item);
        }
        Ok(Value::Array(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<Value, A::Error> {
        let mut entries: Vec<(String, Value)> = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((key, value)) = map.next_entry::<String, Value>()? {
            // duplicate keys: last one wins, first position kept
            match entries.iter_mut().find(|(k, _)| *k == key) {
                Some((_, slot)) => *slot = value,
                None => entries.push((key, value)),
            }
        }
        Ok(Value::Object(materialize(entries)))
    }
}
