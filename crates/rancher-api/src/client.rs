//! Main client implementation.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use reqwest::Method;
use url::Url;

use crate::cache::{DEFAULT_CACHE_TTL, SchemaCache, default_cache_dir};
use crate::codec;
use crate::config::ClientConfig;
use crate::error::{ApiError, ClientError, Error, Result};
use crate::object::{Collection, GenericObject, Page, Record, Value};
use crate::retry::{DEFAULT_ATTEMPTS, DEFAULT_RETRY_DELAY, with_conflict_retry};
use crate::schema::{MethodKind, Schema, SchemaType};
use crate::transport::{DEFAULT_TIMEOUT, RawResponse, Transport, TransportSettings};

/// Response header pointing at the schema document.
const SCHEMAS_HEADER: &str = "X-API-Schemas";

/// Query-string parameters, in order. Repeated keys are allowed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pairs: Vec<(String, String)>,
}

impl Query {
    /// Create an empty query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style append.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(key, value);
        self
    }

    /// Append a parameter.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((key.into(), value.into()));
    }

    /// Parameter names, in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.pairs.iter().map(|(k, _)| k.as_str())
    }

    /// All parameters as (key, value) pairs.
    pub fn as_slice(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// Whether there are no parameters.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Scalar fields as parameters; arrays repeat the key, null and nested
    /// objects are skipped.
    pub fn from_record(record: &Record) -> Self {
        let mut query = Self::new();
        for (key, value) in record.fields() {
            match value {
                Value::Array(items) => {
                    for item in items.iter().filter_map(Value::to_plain_string) {
                        query.push(key, item);
                    }
                }
                other => {
                    if let Some(text) = other.to_plain_string() {
                        query.push(key, text);
                    }
                }
            }
        }
        query
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Query {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            pairs: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

impl<K: Into<String>, V: Into<String>, const N: usize> From<[(K, V); N]> for Query {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

/// Arguments for a dynamic method invoked through [`RancherClient::call`].
#[derive(Debug, Clone, Default)]
pub struct CallArgs {
    /// Resource id, for `by_id_*` and `update_by_id_*`.
    pub id: Option<String>,
    /// Filters for `list_*`, extra parameters for `by_id_*`.
    pub query: Query,
    /// Request body for `create_*` and `update_by_id_*`. Defaults to `{}`.
    pub body: Option<Value>,
}

impl CallArgs {
    /// Create empty call arguments.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the resource id.
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Add a filter parameter.
    pub fn filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push(key, value);
        self
    }

    /// Set the request body.
    pub fn body(mut self, body: impl Into<Value>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// Where the client is in its schema lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaState {
    Unloaded,
    Loading,
    Loaded,
}

/// Schema-driven API client.
///
/// Nothing but [`load_schemas`](Self::load_schemas) works until a schema has
/// been loaded; every other operation fails with
/// [`ClientError::SchemaNotLoaded`].
///
/// # Example
///
/// ```no_run
/// use rancher_api::{Query, RancherClient};
///
/// # async fn example() -> rancher_api::Result<()> {
/// let client = RancherClient::builder()
///     .base_url("http://rancher.local:8080/v2-beta")
///     .credentials("ACCESS", "SECRET")
///     .build()?;
/// client.load_schemas().await?;
///
/// let running = client
///     .list("container", &Query::from([("state", "running")]))
///     .await?;
/// for container in &running {
///     println!("{}", container.as_table(true));
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct RancherClient {
    inner: Arc<ClientInner>,
}

/// Inner client state (shared across clones).
struct ClientInner {
    transport: Transport,
    base_url: String,
    access_key: Option<String>,
    strict: bool,
    cache: Option<SchemaCache>,
    retry_attempts: u32,
    retry_delay: Duration,
    /// Published schema; replaced whole, never edited in place.
    schema: RwLock<Option<Arc<Schema>>>,
    /// Serializes loads so concurrent callers share one fetch.
    load_lock: tokio::sync::Mutex<()>,
}

impl RancherClient {
    /// Create a new client builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Build a client from a resolved configuration.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        ClientBuilder::from_config(config).build()
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Whether filters are checked against the schema.
    pub fn is_strict(&self) -> bool {
        self.inner.strict
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Schema lifecycle
    // ─────────────────────────────────────────────────────────────────────────

    /// Current schema lifecycle state.
    pub fn state(&self) -> SchemaState {
        if self.inner.schema.read().is_some() {
            SchemaState::Loaded
        } else if self.inner.load_lock.try_lock().is_err() {
            SchemaState::Loading
        } else {
            SchemaState::Unloaded
        }
    }

    /// True once a schema is loaded.
    pub fn valid(&self) -> bool {
        self.state() == SchemaState::Loaded
    }

    /// Current schema snapshot.
    pub fn schema(&self) -> Option<Arc<Schema>> {
        self.inner.schema.read().clone()
    }

    /// Load the schema unless one is already loaded.
    ///
    /// Tries the on-disk cache first (when enabled), then the network.
    pub async fn load_schemas(&self) -> Result<()> {
        self.load(false).await
    }

    /// Fetch the schema again, skipping the cache read.
    ///
    /// The new schema replaces the old one only if it was built successfully;
    /// on failure the previous schema stays in use.
    pub async fn reload_schema(&self) -> Result<()> {
        self.load(true).await
    }

    async fn load(&self, force: bool) -> Result<()> {
        let _guard = self.inner.load_lock.lock().await;
        if !force && self.inner.schema.read().is_some() {
            return Ok(());
        }

        let base_url = self.inner.base_url.as_str();
        let access_key = self.inner.access_key.as_deref();

        if !force {
            if let Some(text) = self.inner.cache.as_ref().and_then(|c| c.load(base_url, access_key)) {
                let cached = codec::decode(text.as_bytes())
                    .ok()
                    .flatten()
                    .and_then(|doc| Schema::build(text.as_str(), &doc));
                match cached {
                    Some(schema) => {
                        self.publish(schema, "cache");
                        return Ok(());
                    }
                    None => tracing::warn!(url = base_url, "Cached schema is unusable, fetching"),
                }
            }
        }

        let text = self.fetch_schema_text().await?;
        if let Some(cache) = &self.inner.cache {
            if let Err(e) = cache.store(base_url, access_key, &text) {
                tracing::warn!(dir = %cache.dir().display(), error = %e, "Failed to cache schema");
            }
        }

        let document = codec::decode(text.as_bytes())?.unwrap_or(Value::Null);
        match Schema::build(text.as_str(), &document) {
            Some(schema) => {
                self.publish(schema, "network");
                Ok(())
            }
            None => {
                tracing::warn!(url = base_url, "Schema document declares no types");
                Err(ClientError::EmptySchema {
                    url: base_url.to_string(),
                }
                .into())
            }
        }
    }

    async fn fetch_schema_text(&self) -> Result<String> {
        let base_url = self.inner.base_url.as_str();
        let response = self.checked(Method::GET, base_url, &[], None).await?;
        match response.header(SCHEMAS_HEADER) {
            Some(schema_url) if schema_url != base_url => {
                let schema_url = schema_url.to_string();
                tracing::debug!(url = %schema_url, "Following schema link");
                self.checked(Method::GET, &schema_url, &[], None).await?.text()
            }
            _ => response.text(),
        }
    }

    fn publish(&self, schema: Schema, source: &str) {
        tracing::info!(types = schema.len(), source, "Loaded API schema");
        *self.inner.schema.write() = Some(Arc::new(schema));
    }

    fn require_schema(&self) -> Result<Arc<Schema>> {
        self.schema()
            .ok_or_else(|| ClientError::SchemaNotLoaded.into())
    }

    fn collection_url(&self, type_name: &str) -> Result<String> {
        let schema = self.require_schema()?;
        let ty = lookup_type(&schema, type_name)?;
        collection_url_of(ty)
    }

    /// Names of the per-type methods the current schema provides.
    pub fn method_names(&self) -> Vec<String> {
        self.schema()
            .map(|s| s.method_names().map(str::to_string).collect())
            .unwrap_or_default()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Generic operations
    // ─────────────────────────────────────────────────────────────────────────

    /// List a collection.
    ///
    /// In strict mode every filter key must be a declared filter field, or
    /// `<field>_<modifier>` with a modifier declared for that field.
    pub async fn list(&self, type_name: &str, filters: &Query) -> Result<Collection> {
        let url = {
            let schema = self.require_schema()?;
            let ty = lookup_type(&schema, type_name)?;
            if self.inner.strict {
                if let Some(field) = filters.keys().find(|k| !ty.accepts_filter(k)) {
                    return Err(ClientError::NotSearchable {
                        type_name: type_name.to_string(),
                        field: field.to_string(),
                    }
                    .into());
                }
            }
            collection_url_of(ty)?
        };
        self.get_collection(&url, filters.as_slice()).await
    }

    /// List a collection and follow `pagination.next` to the end.
    pub async fn list_all_pages(&self, type_name: &str, filters: &Query) -> Result<Vec<Record>> {
        let mut page = self.list(type_name, filters).await?;
        let mut records = Vec::new();
        loop {
            let next = page.page_url(Page::Next).map(str::to_string);
            records.extend(page.into_data());
            match next {
                Some(url) => page = self.get_collection(&url, &[]).await?,
                None => return Ok(records),
            }
        }
    }

    /// Fetch the following page of a listing, if there is one.
    ///
    /// Accepts a [`Collection`] or any object whose header carries
    /// `pagination.next`.
    pub async fn next_page(&self, listing: &impl AsRef<Record>) -> Result<Option<Collection>> {
        self.page(listing.as_ref(), Page::Next).await
    }

    /// Fetch the preceding page of a listing, if there is one.
    pub async fn prev_page(&self, listing: &impl AsRef<Record>) -> Result<Option<Collection>> {
        self.page(listing.as_ref(), Page::Prev).await
    }

    async fn page(&self, header: &Record, page: Page) -> Result<Option<Collection>> {
        self.require_schema()?;
        match header.page_url(page) {
            Some(url) => self.get_collection(url, &[]).await.map(Some),
            None => Ok(None),
        }
    }

    /// Fetch one resource. A 404 is `Ok(None)`.
    pub async fn by_id(&self, type_name: &str, id: &str) -> Result<Option<GenericObject>> {
        self.by_id_with(type_name, id, &Query::new()).await
    }

    /// [`by_id`](Self::by_id) with extra query parameters.
    pub async fn by_id_with(
        &self,
        type_name: &str,
        id: &str,
        query: &Query,
    ) -> Result<Option<GenericObject>> {
        let url = resource_url(&self.collection_url(type_name)?, id);
        match self.request(Method::GET, &url, query.as_slice(), None).await {
            Ok(value) => Ok(value.and_then(Value::into_object)),
            Err(e) if e.is_not_found() => {
                tracing::debug!(type_name, id, "Resource not found");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Fetch a fresh copy of a record by its `type` and `id`.
    pub async fn reload(&self, record: &Record) -> Result<Option<GenericObject>> {
        let (Some(type_name), Some(id)) = (record.type_name(), record.id()) else {
            return Err(ClientError::MissingArgument {
                method: "reload".to_string(),
                argument: "type and id".to_string(),
            }
            .into());
        };
        self.by_id(type_name, &id).await
    }

    /// Create a resource in a collection.
    pub async fn create(&self, type_name: &str, body: impl Into<Value>) -> Result<GenericObject> {
        let url = self.collection_url(type_name)?;
        let body = body.into();
        self.request_object(Method::POST, &url, &[], Some(&body)).await
    }

    /// Update a resource through its `self` link, retrying on conflict.
    pub async fn update(&self, record: &Record, body: impl Into<Value>) -> Result<GenericObject> {
        self.require_schema()?;
        let url = record.self_link().ok_or_else(|| ClientError::MissingLink {
            name: "self".to_string(),
        })?;
        self.put_with_retry(url, body.into()).await
    }

    /// Update a resource addressed as `<collection>/<id>`, retrying on conflict.
    pub async fn update_by_id(
        &self,
        type_name: &str,
        id: &str,
        body: impl Into<Value>,
    ) -> Result<GenericObject> {
        let url = resource_url(&self.collection_url(type_name)?, id);
        self.put_with_retry(&url, body.into()).await
    }

    /// Delete each object through its `self` link.
    ///
    /// Objects without a `self` link are skipped. Returns the response to the
    /// last delete sent, if any.
    pub async fn delete<'a>(
        &self,
        objects: impl IntoIterator<Item = &'a GenericObject>,
    ) -> Result<Option<GenericObject>> {
        self.require_schema()?;
        let mut last = None;
        for obj in objects {
            let Some(url) = obj.header().self_link() else {
                tracing::debug!(type_name = ?obj.type_name(), "Skipping delete of object without self link");
                continue;
            };
            last = self
                .request(Method::DELETE, url, &[], None)
                .await?
                .and_then(Value::into_object);
        }
        Ok(last)
    }

    /// Invoke an action advertised on a record, retrying on conflict.
    ///
    /// `name` may be the declared action name or its bound name
    /// (`<action>_action` when the action collides with a field).
    pub async fn action(
        &self,
        record: &Record,
        name: &str,
        body: impl Into<Value>,
    ) -> Result<GenericObject> {
        self.require_schema()?;
        let url = record
            .bound_action(name)
            .or_else(|| record.action(name))
            .ok_or_else(|| ClientError::MissingAction {
                name: name.to_string(),
            })?;
        let body = body.into();
        let client = self;
        let body = &body;
        with_conflict_retry(self.inner.retry_attempts, self.inner.retry_delay, url, move || {
            client.request_object(Method::POST, url, &[], Some(body))
        })
        .await
    }

    /// GET a link advertised on a record, with extra query parameters.
    ///
    /// `name` may be the relation or its bound name (`<relation>_link` when
    /// the relation collides with a field).
    pub async fn follow_link(
        &self,
        record: &Record,
        name: &str,
        query: &Query,
    ) -> Result<GenericObject> {
        self.require_schema()?;
        let url = record
            .bound_link(name)
            .or_else(|| record.link(name))
            .ok_or_else(|| ClientError::MissingLink {
                name: name.to_string(),
            })?;
        self.request_object(Method::GET, url, query.as_slice(), None)
            .await
    }

    /// Invoke a per-type method such as `list_container` or
    /// `update_by_id_service_consume_map` by name.
    pub async fn call(&self, name: &str, args: CallArgs) -> Result<Option<GenericObject>> {
        let schema = self.require_schema()?;
        let method = schema
            .method(name)
            .cloned()
            .ok_or_else(|| ClientError::UnknownMethod {
                name: name.to_string(),
            })?;
        drop(schema);

        let require_id = |id: Option<String>| {
            id.ok_or_else(|| ClientError::MissingArgument {
                method: name.to_string(),
                argument: "id".to_string(),
            })
        };
        let body = args.body.unwrap_or_else(|| Record::new().into());
        let type_name = method.type_name.as_str();

        match method.kind {
            MethodKind::List => self
                .list(type_name, &args.query)
                .await
                .map(|c| Some(GenericObject::Collection(c))),
            MethodKind::ById => {
                let id = require_id(args.id)?;
                self.by_id_with(type_name, &id, &args.query).await
            }
            MethodKind::UpdateById => {
                let id = require_id(args.id)?;
                self.update_by_id(type_name, &id, body).await.map(Some)
            }
            MethodKind::Create => self.create(type_name, body).await.map(Some),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internal HTTP methods
    // ─────────────────────────────────────────────────────────────────────────

    async fn put_with_retry(&self, url: &str, body: Value) -> Result<GenericObject> {
        let client = self;
        let body = &body;
        with_conflict_retry(self.inner.retry_attempts, self.inner.retry_delay, url, move || {
            client.request_object(Method::PUT, url, &[], Some(body))
        })
        .await
    }

    /// Send a request and turn a non-2xx status into [`Error::Api`].
    async fn checked(
        &self,
        method: Method,
        url: &str,
        query: &[(String, String)],
        body: Option<&Value>,
    ) -> Result<RawResponse> {
        let body = body.map(codec::encode).transpose()?;
        let response = self.inner.transport.send(method, url, query, body).await?;
        if response.is_success() {
            Ok(response)
        } else {
            Err(extract_error(&response).into())
        }
    }

    async fn request(
        &self,
        method: Method,
        url: &str,
        query: &[(String, String)],
        body: Option<&Value>,
    ) -> Result<Option<Value>> {
        let response = self.checked(method, url, query, body).await?;
        codec::decode(&response.body)
    }

    async fn request_object(
        &self,
        method: Method,
        url: &str,
        query: &[(String, String)],
        body: Option<&Value>,
    ) -> Result<GenericObject> {
        match self.request(method, url, query, body).await? {
            Some(Value::Object(obj)) => Ok(obj),
            _ => Err(Error::UnexpectedBody {
                url: url.to_string(),
            }),
        }
    }

    async fn get_collection(&self, url: &str, query: &[(String, String)]) -> Result<Collection> {
        self.request_object(Method::GET, url, query, None)
            .await?
            .into_collection()
            .ok_or_else(|| Error::UnexpectedBody {
                url: url.to_string(),
            })
    }
}

impl std::fmt::Debug for RancherClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RancherClient")
            .field("base_url", &self.inner.base_url)
            .field("strict", &self.inner.strict)
            .field("state", &self.state())
            .finish()
    }
}

fn lookup_type<'a>(schema: &'a Schema, type_name: &str) -> Result<&'a SchemaType> {
    schema.get(type_name).ok_or_else(|| {
        ClientError::UnknownType {
            type_name: type_name.to_string(),
        }
        .into()
    })
}

fn collection_url_of(ty: &SchemaType) -> Result<String> {
    ty.collection_url.clone().ok_or_else(|| {
        ClientError::MissingLink {
            name: "collection".to_string(),
        }
        .into()
    })
}

/// `<collection>/<id>`, without doubling a trailing slash.
fn resource_url(collection: &str, id: &str) -> String {
    if collection.ends_with('/') {
        format!("{}{}", collection, id)
    } else {
        format!("{}/{}", collection, id)
    }
}

/// Build an API error from a failed response, keeping the body if it parses.
fn extract_error(response: &RawResponse) -> ApiError {
    let body = codec::decode(&response.body)
        .ok()
        .flatten()
        .and_then(Value::into_object)
        .and_then(GenericObject::into_record);
    ApiError::from_body(response.status, body)
}

/// Builder for creating a RancherClient.
#[derive(Debug)]
pub struct ClientBuilder {
    base_url: Option<String>,
    access_key: Option<String>,
    secret_key: Option<String>,
    headers: Vec<(String, String)>,
    strict: bool,
    cache: bool,
    cache_dir: Option<PathBuf>,
    cache_ttl: Duration,
    connect_timeout: Duration,
    read_timeout: Duration,
    retry_attempts: u32,
    retry_delay: Duration,
    user_agent: Option<String>,
}

impl ClientBuilder {
    /// Create a new builder with defaults.
    pub fn new() -> Self {
        Self {
            base_url: None,
            access_key: None,
            secret_key: None,
            headers: Vec::new(),
            strict: false,
            cache: false,
            cache_dir: None,
            cache_ttl: DEFAULT_CACHE_TTL,
            connect_timeout: DEFAULT_TIMEOUT,
            read_timeout: DEFAULT_TIMEOUT,
            retry_attempts: DEFAULT_ATTEMPTS,
            retry_delay: DEFAULT_RETRY_DELAY,
            user_agent: None,
        }
    }

    /// Start from a resolved configuration.
    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            base_url: config.url.clone(),
            access_key: config.access_key.clone(),
            secret_key: config.secret_key.clone(),
            headers: config
                .headers
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            strict: config.strict,
            cache: config.cache.enabled,
            cache_dir: Some(config.cache.effective_dir()),
            cache_ttl: config.cache.ttl(),
            connect_timeout: config.connect_timeout(),
            read_timeout: config.read_timeout(),
            retry_attempts: config.retry.attempts,
            retry_delay: config.retry_delay(),
            user_agent: None,
        }
    }

    /// Set the API endpoint the schema is discovered from.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the access/secret key pair used for basic auth.
    pub fn credentials(mut self, access_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        self.access_key = Some(access_key.into());
        self.secret_key = Some(secret_key.into());
        self
    }

    /// Add a custom header. Once any header is set, the default
    /// `Accept: application/json` is no longer implied.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Validate list filters against the schema.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Enable the on-disk schema cache.
    pub fn cache(mut self, enabled: bool) -> Self {
        self.cache = enabled;
        self
    }

    /// Set the schema cache directory (default `~/.rancherapi`).
    pub fn cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(dir.into());
        self
    }

    /// Set how long a cached schema stays fresh.
    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Set both the connect and read timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self.read_timeout = timeout;
        self
    }

    /// Set the connect timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the read timeout.
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Set how many times a conflicting update or action is attempted.
    pub fn retries(mut self, attempts: u32) -> Self {
        self.retry_attempts = attempts;
        self
    }

    /// Set the pause between conflict retries.
    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Set a custom user agent.
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<RancherClient> {
        let base_url = self
            .base_url
            .ok_or_else(|| Error::Config("base_url is required".to_string()))?;
        let base_url = Url::parse(&base_url)?.to_string();

        let transport = Transport::new(TransportSettings {
            access_key: self.access_key.clone(),
            secret_key: self.secret_key,
            headers: self.headers,
            connect_timeout: self.connect_timeout,
            read_timeout: self.read_timeout,
            user_agent: self.user_agent,
        })?;

        let cache = self.cache.then(|| {
            SchemaCache::new(
                self.cache_dir.unwrap_or_else(default_cache_dir),
                self.cache_ttl,
            )
        });

        Ok(RancherClient {
            inner: Arc::new(ClientInner {
                transport,
                base_url,
                access_key: self.access_key,
                strict: self.strict,
                cache,
                retry_attempts: self.retry_attempts,
                retry_delay: self.retry_delay,
                schema: RwLock::new(None),
                load_lock: tokio::sync::Mutex::new(()),
            }),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
