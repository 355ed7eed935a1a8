//! Schema-driven client for Rancher-style hypermedia REST APIs.
//!
//! The server publishes a schema document describing every resource type it
//! serves. This crate fetches that document at runtime (optionally caching it
//! on disk), and exposes generic operations over whatever types it declares
//! instead of compiled-in bindings.
//!
//! # Example
//!
//! ```no_run
//! use rancher_api::{CallArgs, Query, RancherClient, Record, Result};
//!
//! # async fn example() -> Result<()> {
//! let client = RancherClient::builder()
//!     .base_url("http://rancher.local:8080/v2-beta")
//!     .credentials("ACCESS", "SECRET")
//!     .cache(true)
//!     .build()?;
//! client.load_schemas().await?;
//!
//! // Create a container and wait for it to show up
//! let body = Record::new()
//!     .with("name", "notebook")
//!     .with("imageUuid", "docker:jupyter/base-notebook");
//! let created = client.create("container", body).await?;
//! let id = created.header().id().unwrap_or_default();
//!
//! if let Some(container) = client.by_id("container", &id).await? {
//!     if let Some(record) = container.as_record() {
//!         client.action(record, "stop", Record::new()).await?;
//!     }
//! }
//!
//! // Per-type methods derived from the schema
//! let hosts = client.call("list_host", CallArgs::new().filter("state", "active")).await?;
//!
//! // Every page of a large collection
//! let all = client.list_all_pages("container", &Query::new()).await?;
//! println!("{} containers", all.len());
//! # let _ = hosts;
//! # Ok(())
//! # }
//! ```
//!
//! # Components
//!
//! - **Transport** ([`transport`]): one HTTP request, raw status/headers/body
//! - **Codec** ([`codec`]): JSON to [`Value`]/[`GenericObject`] and back
//! - **Schema cache** ([`cache`]): schema text on disk, keyed by URL and key
//! - **Schema registry** ([`schema`]): capabilities and per-type methods
//! - **Client** ([`RancherClient`]): schema lifecycle, CRUD, actions, retry

pub mod cache;
pub mod client;
pub mod codec;
pub mod config;
pub mod error;
pub mod object;
pub mod retry;
pub mod schema;
pub mod transport;

pub use cache::SchemaCache;
pub use client::{CallArgs, ClientBuilder, Query, RancherClient, SchemaState};
pub use config::ClientConfig;
pub use error::{ApiError, ClientError, Error, Result};
pub use object::{Collection, GenericObject, Page, Record, Value};
pub use schema::{BoundMethod, FilterSpec, MethodKind, Schema, SchemaType};
