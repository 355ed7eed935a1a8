//! Schema registry: per-type capability records and the dynamic method table.
//!
//! A schema document is a collection of objects of type `"schema"`. Each one
//! names a resource type, its collection URL (`links.collection`), the HTTP
//! methods allowed on the collection and on single resources, and which
//! fields can be used as list filters.

use std::collections::BTreeMap;

use crate::object::{GenericObject, Record, Value};

const GET_METHOD: &str = "GET";
const POST_METHOD: &str = "POST";
const PUT_METHOD: &str = "PUT";
const DELETE_METHOD: &str = "DELETE";

/// Filter declaration for one collection field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSpec {
    /// Allowed suffixes such as `ne`, `gt`, `like`.
    pub modifiers: Vec<String>,
}

/// One resource type as described by the server.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaType {
    pub id: String,
    pub collection_url: Option<String>,
    pub collection_methods: Vec<String>,
    pub resource_methods: Vec<String>,
    pub collection_filters: BTreeMap<String, FilterSpec>,
    pub resource_actions: Vec<String>,
    pub creatable: bool,
    pub updatable: bool,
    pub deletable: bool,
    pub listable: bool,
}

impl SchemaType {
    /// Read a `"schema"` record. Missing method lists mean no capabilities.
    pub fn from_record(record: &Record) -> Option<Self> {
        if record.type_name() != Some("schema") {
            return None;
        }
        let id = record.id()?;

        let collection_methods = string_list(record.get("collectionMethods"));
        let resource_methods = string_list(record.get("resourceMethods"));

        let collection_filters = record
            .get("collectionFilters")
            .and_then(Value::as_record)
            .map(|filters| {
                filters
                    .fields()
                    .map(|(name, spec)| {
                        let modifiers = string_list(spec.as_record().and_then(|s| s.get("modifiers")));
                        (name.to_string(), FilterSpec { modifiers })
                    })
                    .collect()
            })
            .unwrap_or_default();

        let resource_actions = record
            .get("resourceActions")
            .and_then(Value::as_record)
            .map(|actions| actions.fields().map(|(name, _)| name.to_string()).collect())
            .unwrap_or_default();

        let has = |list: &[String], method: &str| list.iter().any(|m| m == method);
        Some(Self {
            creatable: has(&collection_methods, POST_METHOD),
            listable: has(&collection_methods, GET_METHOD),
            updatable: has(&resource_methods, PUT_METHOD),
            deletable: has(&resource_methods, DELETE_METHOD),
            collection_url: record.link("collection").map(str::to_string),
            id,
            collection_methods,
            resource_methods,
            collection_filters,
            resource_actions,
        })
    }

    /// Whether `key` is a filter this type declares.
    ///
    /// Accepts an exact field name or `<field>_<modifier>` for one of that
    /// field's declared modifiers.
    pub fn accepts_filter(&self, key: &str) -> bool {
        if self.collection_filters.contains_key(key) {
            return true;
        }
        self.collection_filters.iter().any(|(field, spec)| {
            key.strip_prefix(field.as_str())
                .and_then(|rest| rest.strip_prefix('_'))
                .is_some_and(|modifier| spec.modifiers.iter().any(|m| m == modifier))
        })
    }
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

/// Operation a dynamic method dispatches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodKind {
    List,
    ById,
    UpdateById,
    Create,
}

impl MethodKind {
    pub const ALL: [MethodKind; 4] = [
        MethodKind::List,
        MethodKind::ById,
        MethodKind::UpdateById,
        MethodKind::Create,
    ];

    /// Method name prefix for this kind.
    pub fn prefix(self) -> &'static str {
        match self {
            MethodKind::List => "list",
            MethodKind::ById => "by_id",
            MethodKind::UpdateById => "update_by_id",
            MethodKind::Create => "create",
        }
    }

    fn is_supported_by(self, ty: &SchemaType) -> bool {
        let (methods, required) = match self {
            MethodKind::List | MethodKind::ById => (&ty.collection_methods, GET_METHOD),
            MethodKind::Create => (&ty.collection_methods, POST_METHOD),
            MethodKind::UpdateById => (&ty.resource_methods, PUT_METHOD),
        };
        methods.iter().any(|m| m == required)
    }
}

/// A per-type convenience method such as `list_container`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundMethod {
    pub kind: MethodKind,
    pub type_name: String,
}

/// Names a type is reachable under: the raw id, plus a snake_case variant
/// when the id has lower→upper case boundaries.
pub fn type_name_variants(name: &str) -> Vec<String> {
    let mut snake = String::with_capacity(name.len() + 4);
    let mut prev_lower = false;
    for c in name.chars() {
        if prev_lower && c.is_ascii_uppercase() {
            snake.push('_');
        }
        prev_lower = c.is_ascii_lowercase();
        snake.push(c);
    }

    let mut variants = vec![name.to_string()];
    if snake != name {
        variants.push(snake.to_lowercase());
    }
    variants
}

/// Build the method table for a set of types.
pub fn bind_methods<'a>(
    types: impl IntoIterator<Item = &'a SchemaType>,
) -> BTreeMap<String, BoundMethod> {
    let mut methods = BTreeMap::new();
    for ty in types {
        for variant in type_name_variants(&ty.id) {
            for kind in MethodKind::ALL {
                if kind.is_supported_by(ty) {
                    methods.insert(
                        format!("{}_{}", kind.prefix(), variant),
                        BoundMethod {
                            kind,
                            type_name: ty.id.clone(),
                        },
                    );
                }
            }
        }
    }
    methods
}

/// A loaded schema: the raw document text plus everything derived from it.
///
/// Immutable once built; a reload builds a new one and swaps it in whole.
#[derive(Debug, Clone)]
pub struct Schema {
    text: String,
    types: BTreeMap<String, SchemaType>,
    methods: BTreeMap<String, BoundMethod>,
}

impl Schema {
    /// Classify every `"schema"` object in a decoded document.
    ///
    /// Returns `None` when no type was found, so callers keep whatever schema
    /// they already had.
    pub fn build(text: impl Into<String>, document: &Value) -> Option<Self> {
        let records: Vec<&Record> = match document {
            Value::Object(GenericObject::Collection(c)) => c.iter().collect(),
            Value::Object(GenericObject::Record(r)) => vec![r],
            Value::Array(items) => items.iter().filter_map(Value::as_record).collect(),
            _ => Vec::new(),
        };

        let types: BTreeMap<String, SchemaType> = records
            .into_iter()
            .filter_map(SchemaType::from_record)
            .map(|ty| (ty.id.clone(), ty))
            .collect();
        if types.is_empty() {
            return None;
        }

        let methods = bind_methods(types.values());
        Some(Self {
            text: text.into(),
            types,
            methods,
        })
    }

    /// The document exactly as fetched (what the cache stores).
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Look up a type by id.
    pub fn get(&self, type_name: &str) -> Option<&SchemaType> {
        self.types.get(type_name)
    }

    /// All types, ordered by id.
    pub fn types(&self) -> impl Iterator<Item = &SchemaType> {
        self.types.values()
    }

    /// Number of types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether the schema has no types.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Look up a bound method by name.
    pub fn method(&self, name: &str) -> Option<&BoundMethod> {
        self.methods.get(name)
    }

    /// All bound method names, sorted.
    pub fn method_names(&self) -> impl Iterator<Item = &str> {
        self.methods.keys().map(String::as_str)
    }
}
