//! Generic object model for server resources.
//!
//! The server describes its own types at runtime, so responses are not
//! deserialized into fixed structs. Every JSON mapping becomes a [`Record`]
//! (ordered fields plus the hyperlinks and actions the server advertised) and
//! every `"type": "collection"` mapping becomes a [`Collection`] of records.
//! Links and actions are plain name → URL tables; the client follows them
//! through [`crate::RancherClient::follow_link`] and
//! [`crate::RancherClient::action`].

use std::fmt;

/// Field names starting with this prefix are local-only and never encoded.
pub const PRIVATE_PREFIX: char = '_';

/// Fields that are never shown as data when a record is displayed.
const HIDDEN_FIELDS: [&str; 4] = ["links", "actions", "id", "type"];

/// Width after which table cells are cut short.
const TRIM_WIDTH: usize = 70;

/// A decoded JSON value whose mappings are [`GenericObject`]s.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    Array(Vec<Value>),
    Object(GenericObject),
}

impl Value {
    /// Whether this is JSON `null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The string, if this is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// The boolean, if this is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The number as `i64`, if it fits.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    /// The items, if this is an array.
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// The object, if this is a mapping.
    pub fn as_object(&self) -> Option<&GenericObject> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// The record, if this is a single-resource mapping.
    pub fn as_record(&self) -> Option<&Record> {
        self.as_object().and_then(GenericObject::as_record)
    }

    /// Take the object out, if this is a mapping.
    pub fn into_object(self) -> Option<GenericObject> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Scalars rendered as the plain text a query string or table cell wants.
    pub fn to_plain_string(&self) -> Option<String> {
        match self {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::String(s) => f.write_str(s),
            Value::Bool(_) | Value::Number(_) => {
                f.write_str(&self.to_plain_string().unwrap_or_default())
            }
            Value::Array(_) | Value::Object(_) => {
                let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
                f.write_str(&json)
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n.into())
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n.into())
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Value::Number(n.into())
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        serde_json::Number::from_f64(n).map_or(Value::Null, Value::Number)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Value::Object(GenericObject::Record(record))
    }
}

impl From<Collection> for Value {
    fn from(collection: Collection) -> Self {
        Value::Object(GenericObject::Collection(collection))
    }
}

impl From<GenericObject> for Value {
    fn from(obj: GenericObject) -> Self {
        Value::Object(obj)
    }
}

/// Any server resource: a single record or a collection of records.
#[derive(Debug, Clone, PartialEq)]
pub enum GenericObject {
    Record(Record),
    Collection(Collection),
}

impl GenericObject {
    /// The record itself, or the collection's own header fields.
    pub fn header(&self) -> &Record {
        match self {
            GenericObject::Record(r) => r,
            GenericObject::Collection(c) => c.header(),
        }
    }

    /// Resource kind of the record or collection header.
    pub fn type_name(&self) -> Option<&str> {
        self.header().type_name()
    }

    /// Whether this is a collection.
    pub fn is_collection(&self) -> bool {
        matches!(self, GenericObject::Collection(_))
    }

    /// The record, if this is not a collection.
    pub fn as_record(&self) -> Option<&Record> {
        match self {
            GenericObject::Record(r) => Some(r),
            GenericObject::Collection(_) => None,
        }
    }

    /// Take the record out, if this is not a collection.
    pub fn into_record(self) -> Option<Record> {
        match self {
            GenericObject::Record(r) => Some(r),
            GenericObject::Collection(_) => None,
        }
    }

    /// The collection, if this is one.
    pub fn as_collection(&self) -> Option<&Collection> {
        match self {
            GenericObject::Collection(c) => Some(c),
            GenericObject::Record(_) => None,
        }
    }

    /// Take the collection out, if this is one.
    pub fn into_collection(self) -> Option<Collection> {
        match self {
            GenericObject::Collection(c) => Some(c),
            GenericObject::Record(_) => None,
        }
    }
}

impl AsRef<Record> for GenericObject {
    fn as_ref(&self) -> &Record {
        self.header()
    }
}

impl AsRef<Record> for Record {
    fn as_ref(&self) -> &Record {
        self
    }
}

/// Pagination direction on a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Next,
    Prev,
}

impl Page {
    /// Key under `pagination` for this direction.
    pub fn as_str(self) -> &'static str {
        match self {
            Page::Next => "next",
            Page::Prev => "prev",
        }
    }
}

/// A single server resource (or any nested JSON mapping).
///
/// Fields keep the order the server sent them in. For records whose `type` is
/// a non-empty string, the `links` and `actions` mappings are lifted out of
/// the fields into their own tables and are never encoded back to the wire.
#[derive(Debug, Clone, Default)]
pub struct Record {
    fields: Vec<(String, Value)>,
    links: Vec<(String, String)>,
    actions: Vec<(String, String)>,
}

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_parts(
        fields: Vec<(String, Value)>,
        links: Vec<(String, String)>,
        actions: Vec<(String, String)>,
    ) -> Self {
        Self {
            fields,
            links,
            actions,
        }
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Get a field by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    /// Get a string field by name.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    /// Whether a field is present.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Set a field, keeping its position if it already exists.
    ///
    /// On a typed record a `links`/`actions` mapping goes to the link or
    /// action table instead, whichever of `type` and the mapping comes first.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let name = name.into();
        let value = value.into();
        let previous = match self.fields.iter_mut().find(|(k, _)| *k == name) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.fields.push((name, value));
                None
            }
        };
        self.lift_tables();
        previous
    }

    /// Move `links`/`actions` mappings out of the fields of a typed record.
    ///
    /// Entries whose value is not a string (a `null` link, say) are dropped.
    /// A `links`/`actions` field that is not a mapping stays a field.
    pub(crate) fn lift_tables(&mut self) {
        if self.type_name().is_none() {
            return;
        }
        for name in ["links", "actions"] {
            let Some(Value::Object(GenericObject::Record(_))) = self.get(name) else {
                continue;
            };
            let Some(Value::Object(GenericObject::Record(table))) = self.remove(name) else {
                continue;
            };
            let entries = table
                .fields
                .into_iter()
                .filter_map(|(k, v)| match v {
                    Value::String(url) => Some((k, url)),
                    _ => None,
                })
                .collect();
            if name == "links" {
                self.links = entries;
            } else {
                self.actions = entries;
            }
        }
    }

    /// Remove a field, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        let idx = self.fields.iter().position(|(k, _)| k == name)?;
        Some(self.fields.remove(idx).1)
    }

    /// All fields in server order, including reserved ones.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// User-visible data fields: no `id`/`type`/`links`/`actions`, nothing private.
    pub fn data_fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields()
            .filter(|(k, _)| !HIDDEN_FIELDS.contains(k) && !k.starts_with(PRIVATE_PREFIX))
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Resource kind, when `type` is a non-empty string.
    pub fn type_name(&self) -> Option<&str> {
        self.get_str("type").filter(|t| !t.is_empty())
    }

    /// Resource id as text; numeric ids are rendered in decimal.
    pub fn id(&self) -> Option<String> {
        self.get("id").and_then(Value::to_plain_string)
    }

    /// Declared links as (relation, URL).
    pub fn links(&self) -> impl Iterator<Item = (&str, &str)> {
        self.links.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Declared actions as (name, URL).
    pub fn actions(&self) -> impl Iterator<Item = (&str, &str)> {
        self.actions.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// URL of a link by its relation name.
    pub fn link(&self, relation: &str) -> Option<&str> {
        lookup(&self.links, relation)
    }

    /// URL of an action by its declared name.
    pub fn action(&self, name: &str) -> Option<&str> {
        lookup(&self.actions, name)
    }

    /// URL of the `self` link.
    pub fn self_link(&self) -> Option<&str> {
        self.link("self")
    }

    /// `pagination.next` / `pagination.prev` URL, if the server sent one.
    pub fn page_url(&self, page: Page) -> Option<&str> {
        self.get("pagination")
            .and_then(Value::as_record)
            .and_then(|p| p.get_str(page.as_str()))
    }

    /// Names a link or action cannot be bound under without shadowing data.
    fn is_taken(&self, name: &str) -> bool {
        if self.contains(name) {
            return true;
        }
        match name {
            "links" => !self.links.is_empty(),
            "actions" => !self.actions.is_empty(),
            "next" => self.page_url(Page::Next).is_some(),
            "prev" => self.page_url(Page::Prev).is_some(),
            _ => false,
        }
    }

    /// Links under the names callers use to follow them.
    ///
    /// A relation that collides with a field is bound as `<relation>_link`.
    pub fn link_bindings(&self) -> Vec<(String, &str)> {
        self.links
            .iter()
            .map(|(rel, url)| {
                let name = if self.is_taken(rel) {
                    format!("{}_link", rel)
                } else {
                    rel.clone()
                };
                (name, url.as_str())
            })
            .collect()
    }

    /// Actions under the names callers use to invoke them.
    ///
    /// An action that collides with a field or a bound link is bound as
    /// `<action>_action`.
    pub fn action_bindings(&self) -> Vec<(String, &str)> {
        let links = self.link_bindings();
        self.actions
            .iter()
            .map(|(action, url)| {
                let taken = self.is_taken(action) || links.iter().any(|(n, _)| n == action);
                let name = if taken {
                    format!("{}_action", action)
                } else {
                    action.clone()
                };
                (name, url.as_str())
            })
            .collect()
    }

    /// Link URL by its bound name.
    pub fn bound_link(&self, name: &str) -> Option<&str> {
        self.link_bindings()
            .into_iter()
            .find(|(n, _)| n == name)
            .map(|(_, url)| url)
    }

    /// Action URL by its bound name.
    pub fn bound_action(&self, name: &str) -> Option<&str> {
        self.action_bindings()
            .into_iter()
            .find(|(n, _)| n == name)
            .map(|(_, url)| url)
    }

    /// Render the data fields as a `Type | Id | Name | Value` table.
    ///
    /// Untyped records have no meaningful table and render as JSON.
    pub fn as_table(&self, trim: bool) -> String {
        let Some(type_name) = self.type_name() else {
            return self.to_string();
        };
        let id = self.id().unwrap_or_default();

        let mut rows: Vec<[String; 4]> = vec![[
            "Type".to_string(),
            "Id".to_string(),
            "Name".to_string(),
            "Value".to_string(),
        ]];
        for (name, value) in self.data_fields() {
            let mut cell = value.to_string();
            if trim && cell.chars().count() > TRIM_WIDTH {
                cell = cell.chars().take(TRIM_WIDTH).collect::<String>() + "...";
            }
            rows.push([type_name.to_string(), id.clone(), name.to_string(), cell]);
        }

        let mut widths = [0usize; 4];
        for row in &rows {
            for (w, cell) in widths.iter_mut().zip(row) {
                *w = (*w).max(cell.chars().count());
            }
        }

        let render = |row: &[String; 4]| {
            let cells: Vec<String> = row
                .iter()
                .zip(widths)
                .map(|(cell, w)| format!("{:<w$}", cell, w = w))
                .collect();
            format!("| {} |", cells.join(" | "))
        };

        let mut out = Vec::with_capacity(rows.len() + 1);
        out.push(render(&rows[0]));
        let total: usize = widths.iter().sum::<usize>() + 3 * 3 + 4;
        out.push("-".repeat(total));
        out.extend(rows[1..].iter().map(render));
        out.join("\n")
    }
}

fn lookup<'a>(entries: &'a [(String, String)], name: &str) -> Option<&'a str> {
    entries
        .iter()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.as_str())
}

fn same_entries<K: PartialEq, V: PartialEq>(a: &[(K, V)], b: &[(K, V)]) -> bool {
    a.len() == b.len()
        && a
            .iter()
            .all(|(k, v)| b.iter().any(|(k2, v2)| k == k2 && v == v2))
}

/// Field order is presentation only; equality compares contents.
impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        same_entries(&self.fields, &other.fields)
            && same_entries(&self.links, &other.links)
            && same_entries(&self.actions, &other.actions)
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (name, value)) in self.data_fields().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            let key = serde_json::to_string(name).map_err(|_| fmt::Error)?;
            let value = serde_json::to_string(value).map_err(|_| fmt::Error)?;
            write!(f, "{}: {}", key, value)?;
        }
        f.write_str("}")
    }
}

/// A `"type": "collection"` response: header fields plus member records.
#[derive(Debug, Clone, PartialEq)]
pub struct Collection {
    header: Record,
    data: Vec<Record>,
}

impl Collection {
    pub(crate) fn new(header: Record, data: Vec<Record>) -> Self {
        Self { header, data }
    }

    /// Collection-level fields (`resourceType`, `pagination`, `links`, ...).
    pub fn header(&self) -> &Record {
        &self.header
    }

    /// Member records, in server order.
    pub fn data(&self) -> &[Record] {
        &self.data
    }

    /// Take the member records.
    pub fn into_data(self) -> Vec<Record> {
        self.data
    }

    /// Iterate the member records.
    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.data.iter()
    }

    /// Number of member records.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether there are no member records.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Member record by position.
    pub fn get(&self, index: usize) -> Option<&Record> {
        self.data.get(index)
    }

    /// Kind of the member resources.
    pub fn resource_type(&self) -> Option<&str> {
        self.header.get_str("resourceType")
    }

    /// `pagination.next` / `pagination.prev` URL, if the server sent one.
    pub fn page_url(&self, page: Page) -> Option<&str> {
        self.header.page_url(page)
    }
}

impl AsRef<Record> for Collection {
    fn as_ref(&self) -> &Record {
        &self.header
    }
}

impl IntoIterator for Collection {
    type Item = Record;
    type IntoIter = std::vec::IntoIter<Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.into_iter()
    }
}

impl<'a> IntoIterator for &'a Collection {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.iter()
    }
}
