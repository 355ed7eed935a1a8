//! End-to-end client tests against a mock Rancher API.

use std::time::Duration;

use rancher_api::{
    CallArgs, ClientError, Error, GenericObject, Query, RancherClient, Record, SchemaState, Value,
};
use serde_json::{Value as Json, json};
use tempfile::TempDir;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ─────────────────────────────────────────────────────────────────────────────
// Fixtures
// ─────────────────────────────────────────────────────────────────────────────

fn schema_doc(base: &str) -> Json {
    json!({
        "type": "collection",
        "resourceType": "schema",
        "links": {"self": format!("{base}/v2/schemas")},
        "data": [
            {
                "id": "container",
                "type": "schema",
                "links": {
                    "self": format!("{base}/v2/schemas/container"),
                    "collection": format!("{base}/v2/containers")
                },
                "collectionMethods": ["GET", "POST"],
                "resourceMethods": ["GET", "PUT", "DELETE"],
                "collectionFilters": {
                    "name": {"modifiers": ["eq", "ne", "like"]},
                    "state": {"modifiers": ["eq"]}
                }
            },
            {
                "id": "host",
                "type": "schema",
                "links": {"collection": format!("{base}/v2/hosts")},
                "collectionMethods": ["GET"],
                "resourceMethods": ["GET"]
            },
            {
                "id": "serviceConsumeMap",
                "type": "schema",
                "links": {"collection": format!("{base}/v2/serviceconsumemaps/")},
                "collectionMethods": ["GET"],
                "resourceMethods": ["GET", "PUT"]
            }
        ]
    })
}

fn container_json(base: &str, id: &str, name: &str) -> Json {
    json!({
        "id": id,
        "type": "container",
        "name": name,
        "state": "running",
        "links": {
            "self": format!("{base}/v2/containers/{id}"),
            "hosts": format!("{base}/v2/containers/{id}/hosts")
        },
        "actions": {
            "stop": format!("{base}/v2/containers/{id}/?action=stop")
        }
    })
}

fn error_json(status: u16, code: &str) -> Json {
    json!({"type": "error", "status": status, "code": code, "message": format!("{code} happened")})
}

async fn mount_schema(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/v2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(schema_doc(&server.uri())))
        .mount(server)
        .await;
}

fn builder(server: &MockServer) -> rancher_api::ClientBuilder {
    RancherClient::builder()
        .base_url(format!("{}/v2", server.uri()))
        .credentials("AK", "SK")
        .retry_delay(Duration::from_millis(1))
}

async fn loaded_client(server: &MockServer) -> RancherClient {
    mount_schema(server).await;
    let client = builder(server).build().unwrap();
    client.load_schemas().await.unwrap();
    client
}

async fn count_requests(server: &MockServer, verb: &str, url_path: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.method.as_str() == verb && r.url.path() == url_path)
        .count()
}

fn object(json: Json) -> GenericObject {
    Value::from(json).into_object().expect("expected an object")
}

fn record(obj: GenericObject) -> Record {
    obj.into_record().expect("expected a single resource")
}

// ─────────────────────────────────────────────────────────────────────────────
// Schema loading
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_load_schemas_from_base_url() {
    let server = MockServer::start().await;
    let client = loaded_client(&server).await;

    assert!(client.valid());
    assert_eq!(client.state(), SchemaState::Loaded);

    let schema = client.schema().unwrap();
    assert_eq!(schema.len(), 3);
    let container = schema.get("container").unwrap();
    assert!(container.creatable && container.listable && container.updatable && container.deletable);

    let names = client.method_names();
    assert!(names.contains(&"create_container".to_string()));
    assert!(names.contains(&"list_service_consume_map".to_string()));
    assert!(!names.contains(&"create_host".to_string()));
}

#[tokio::test]
async fn test_schema_request_uses_basic_auth_and_accept() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2"))
        .and(header("authorization", "Basic QUs6U0s="))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(schema_doc(&server.uri())))
        .expect(1)
        .mount(&server)
        .await;

    let client = builder(&server).build().unwrap();
    client.load_schemas().await.unwrap();
    // already loaded: no second fetch
    client.load_schemas().await.unwrap();
}

#[tokio::test]
async fn test_follows_schema_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("X-API-Schemas", format!("{}/v2/schemas", server.uri()).as_str())
                .set_body_json(json!({"type": "apiRoot", "id": "v2"})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/schemas"))
        .respond_with(ResponseTemplate::new(200).set_body_json(schema_doc(&server.uri())))
        .expect(1)
        .mount(&server)
        .await;

    let client = builder(&server).build().unwrap();
    client.load_schemas().await.unwrap();
    assert!(client.schema().unwrap().get("host").is_some());
}

#[tokio::test]
async fn test_document_without_types_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"type": "collection", "data": []})))
        .mount(&server)
        .await;

    let client = builder(&server).build().unwrap();
    let err = client.load_schemas().await.unwrap_err();
    assert!(matches!(err, Error::Client(ClientError::EmptySchema { .. })));
    assert!(!client.valid());
}

#[tokio::test]
async fn test_failed_reload_keeps_previous_schema() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(schema_doc(&server.uri())))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"type": "collection", "data": []})))
        .with_priority(2)
        .mount(&server)
        .await;

    let client = builder(&server).build().unwrap();
    client.load_schemas().await.unwrap();
    assert!(client.reload_schema().await.is_err());
    assert!(client.valid());
    assert_eq!(client.schema().unwrap().len(), 3);
}

#[tokio::test]
async fn test_schema_server_error_is_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2"))
        .respond_with(ResponseTemplate::new(401).set_body_json(error_json(401, "Unauthorized")))
        .mount(&server)
        .await;

    let client = builder(&server).build().unwrap();
    let err = client.load_schemas().await.unwrap_err();
    assert!(err.is_auth_error());
    assert_eq!(err.api_error().unwrap().code, "Unauthorized");
}

#[tokio::test]
async fn test_unreachable_server_is_transport_error() {
    let client = RancherClient::builder()
        .base_url("http://127.0.0.1:9/v2")
        .timeout(Duration::from_millis(200))
        .build()
        .unwrap();
    let err = client.load_schemas().await.unwrap_err();
    assert!(err.is_transport());
    assert_eq!(client.state(), SchemaState::Unloaded);
}

#[tokio::test]
async fn test_concurrent_loads_fetch_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(schema_doc(&server.uri()))
                .set_delay(Duration::from_millis(50)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = builder(&server).build().unwrap();
    let (a, b) = tokio::join!(client.load_schemas(), client.load_schemas());
    a.unwrap();
    b.unwrap();
    assert!(client.valid());
}

// ─────────────────────────────────────────────────────────────────────────────
// Schema cache
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_cached_schema_skips_network() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(schema_doc(&server.uri())))
        .expect(1)
        .mount(&server)
        .await;
    let tmp = TempDir::new().unwrap();

    let first = builder(&server).cache(true).cache_dir(tmp.path()).build().unwrap();
    first.load_schemas().await.unwrap();

    let second = builder(&server).cache(true).cache_dir(tmp.path()).build().unwrap();
    second.load_schemas().await.unwrap();
    assert_eq!(
        second.schema().unwrap().text(),
        first.schema().unwrap().text()
    );
}

#[tokio::test]
async fn test_stale_cache_refetches() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(schema_doc(&server.uri())))
        .expect(2)
        .mount(&server)
        .await;
    let tmp = TempDir::new().unwrap();

    for _ in 0..2 {
        let client = builder(&server)
            .cache(true)
            .cache_dir(tmp.path())
            .cache_ttl(Duration::ZERO)
            .build()
            .unwrap();
        client.load_schemas().await.unwrap();
    }
}

#[tokio::test]
async fn test_reload_bypasses_cache_read() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(schema_doc(&server.uri())))
        .expect(2)
        .mount(&server)
        .await;
    let tmp = TempDir::new().unwrap();

    let client = builder(&server).cache(true).cache_dir(tmp.path()).build().unwrap();
    client.load_schemas().await.unwrap();
    client.reload_schema().await.unwrap();
    assert!(client.valid());
}

#[tokio::test]
async fn test_corrupt_cache_falls_back_to_network() {
    let server = MockServer::start().await;
    mount_schema(&server).await;
    let tmp = TempDir::new().unwrap();

    let url = format!("{}/v2", server.uri());
    let cache = rancher_api::SchemaCache::new(tmp.path(), Duration::from_secs(60));
    cache.store(&url, Some("AK"), "not json at all").unwrap();

    let client = builder(&server).cache(true).cache_dir(tmp.path()).build().unwrap();
    client.load_schemas().await.unwrap();
    assert!(client.valid());
    assert_eq!(count_requests(&server, "GET", "/v2").await, 1);
    assert_ne!(cache.load(&url, Some("AK")).as_deref(), Some("not json at all"));
}

// ─────────────────────────────────────────────────────────────────────────────
// List
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_sends_filters() {
    let server = MockServer::start().await;
    let client = loaded_client(&server).await;
    let base = server.uri();
    Mock::given(method("GET"))
        .and(path("/v2/containers"))
        .and(query_param("name_like", "web%"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "type": "collection",
            "resourceType": "container",
            "data": [container_json(&base, "1i1", "web1"), container_json(&base, "1i2", "web2")]
        })))
        .mount(&server)
        .await;

    let containers = client
        .list("container", &Query::from([("name_like", "web%")]))
        .await
        .unwrap();
    assert_eq!(containers.len(), 2);
    let names: Vec<&str> = containers.iter().filter_map(|c| c.get_str("name")).collect();
    assert_eq!(names, vec!["web1", "web2"]);
}

#[tokio::test]
async fn test_list_unknown_type() {
    let server = MockServer::start().await;
    let client = loaded_client(&server).await;
    let err = client.list("volume", &Query::new()).await.unwrap_err();
    assert!(matches!(
        err,
        Error::Client(ClientError::UnknownType { ref type_name }) if type_name == "volume"
    ));
}

#[tokio::test]
async fn test_strict_list_validates_filters() {
    let server = MockServer::start().await;
    mount_schema(&server).await;
    Mock::given(method("GET"))
        .and(path("/v2/containers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"type": "collection", "data": []})))
        .mount(&server)
        .await;
    let client = builder(&server).strict(true).build().unwrap();
    client.load_schemas().await.unwrap();

    for ok in ["name", "name_like", "state_eq"] {
        let filters = Query::new().with(ok, "x");
        assert!(client.list("container", &filters).await.is_ok(), "{ok} should be accepted");
    }

    for bad in ["bogus_field", "state_like"] {
        let filters = Query::new().with("name", "x").with(bad, "y");
        let err = client.list("container", &filters).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Client(ClientError::NotSearchable { ref field, .. }) if field == bad
        ));
    }
    assert_eq!(count_requests(&server, "GET", "/v2/containers").await, 3);
}

#[tokio::test]
async fn test_lenient_list_passes_any_filter() {
    let server = MockServer::start().await;
    let client = loaded_client(&server).await;
    Mock::given(method("GET"))
        .and(path("/v2/containers"))
        .and(query_param("bogus_field", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"type": "collection", "data": []})))
        .expect(1)
        .mount(&server)
        .await;

    let page = client
        .list("container", &Query::new().with("bogus_field", "1"))
        .await
        .unwrap();
    assert!(page.is_empty());
}

#[tokio::test]
async fn test_pagination() {
    let server = MockServer::start().await;
    let client = loaded_client(&server).await;
    let base = server.uri();
    Mock::given(method("GET"))
        .and(path("/v2/containers"))
        .and(query_param("marker", "m2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "type": "collection",
            "pagination": {"next": null, "prev": format!("{base}/v2/containers")},
            "data": [container_json(&base, "1i3", "c")]
        })))
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/containers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "type": "collection",
            "pagination": {"next": format!("{base}/v2/containers?marker=m2")},
            "data": [container_json(&base, "1i1", "a"), container_json(&base, "1i2", "b")]
        })))
        .with_priority(2)
        .mount(&server)
        .await;

    let first = client.list("container", &Query::new()).await.unwrap();
    assert!(client.prev_page(&first).await.unwrap().is_none());
    let second = client.next_page(&first).await.unwrap().unwrap();
    assert_eq!(second.get(0).unwrap().id().as_deref(), Some("1i3"));
    assert!(client.next_page(&second).await.unwrap().is_none());
    assert_eq!(client.prev_page(&second).await.unwrap().unwrap().len(), 2);

    let all = client.list_all_pages("container", &Query::new()).await.unwrap();
    let ids: Vec<String> = all.iter().filter_map(Record::id).collect();
    assert_eq!(ids, vec!["1i1", "1i2", "1i3"]);
}

#[tokio::test]
async fn test_list_skips_non_resource_members() {
    let server = MockServer::start().await;
    let client = loaded_client(&server).await;
    let base = server.uri();
    Mock::given(method("GET"))
        .and(path("/v2/containers"))
        .and(query_param("marker", "m2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "type": "collection",
            "data": [container_json(&base, "1i3", "c")]
        })))
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/containers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "type": "collection",
            "pagination": {"next": format!("{base}/v2/containers?marker=m2")},
            "data": [container_json(&base, "1i1", "a"), null]
        })))
        .with_priority(2)
        .mount(&server)
        .await;

    let first = client.list("container", &Query::new()).await.unwrap();
    assert_eq!(first.len(), 1);
    let second = client.next_page(&first).await.unwrap().unwrap();
    assert_eq!(second.get(0).unwrap().id().as_deref(), Some("1i3"));
}

#[tokio::test]
async fn test_next_page_from_generic_object() {
    let server = MockServer::start().await;
    let client = loaded_client(&server).await;
    let base = server.uri();
    Mock::given(method("GET"))
        .and(path("/v2/containers"))
        .and(query_param("marker", "m2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "type": "collection",
            "data": [container_json(&base, "1i3", "c")]
        })))
        .mount(&server)
        .await;

    let listing = object(json!({
        "type": "collection",
        "pagination": {"next": format!("{base}/v2/containers?marker=m2")},
        "data": [container_json(&base, "1i1", "a")]
    }));
    let next = client.next_page(&listing).await.unwrap().unwrap();
    assert_eq!(next.len(), 1);
    assert!(client.prev_page(&listing).await.unwrap().is_none());
}

// ─────────────────────────────────────────────────────────────────────────────
// By id
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_by_id_found() {
    let server = MockServer::start().await;
    let client = loaded_client(&server).await;
    Mock::given(method("GET"))
        .and(path("/v2/containers/1i5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(container_json(&server.uri(), "1i5", "web")))
        .mount(&server)
        .await;

    let container = record(client.by_id("container", "1i5").await.unwrap().unwrap());
    assert_eq!(container.get_str("name"), Some("web"));
    assert!(container.bound_action("stop").is_some());
}

#[tokio::test]
async fn test_by_id_not_found_is_none() {
    let server = MockServer::start().await;
    let client = loaded_client(&server).await;
    Mock::given(method("GET"))
        .and(path("/v2/containers/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(error_json(404, "NotFound")))
        .mount(&server)
        .await;

    assert!(client.by_id("container", "missing").await.unwrap().is_none());
}

#[tokio::test]
async fn test_by_id_server_error_propagates() {
    let server = MockServer::start().await;
    let client = loaded_client(&server).await;
    Mock::given(method("GET"))
        .and(path("/v2/containers/broken"))
        .respond_with(ResponseTemplate::new(500).set_body_json(error_json(500, "ServerError")))
        .mount(&server)
        .await;

    let err = client.by_id("container", "broken").await.unwrap_err();
    assert_eq!(err.status(), Some(500));
    assert!(err.is_server_error());
    assert_eq!(err.api_error().unwrap().code, "ServerError");
}

#[tokio::test]
async fn test_reload_record() {
    let server = MockServer::start().await;
    let client = loaded_client(&server).await;
    Mock::given(method("GET"))
        .and(path("/v2/containers/1i5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(container_json(&server.uri(), "1i5", "renamed")))
        .mount(&server)
        .await;

    let stale = Record::new().with("id", "1i5").with("type", "container");
    let fresh = record(client.reload(&stale).await.unwrap().unwrap());
    assert_eq!(fresh.get_str("name"), Some("renamed"));

    let err = client.reload(&Record::new()).await.unwrap_err();
    assert!(matches!(err, Error::Client(ClientError::MissingArgument { .. })));
}

// ─────────────────────────────────────────────────────────────────────────────
// Create / update / delete
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_create_posts_encoded_body() {
    let server = MockServer::start().await;
    let client = loaded_client(&server).await;
    Mock::given(method("POST"))
        .and(path("/v2/containers"))
        .and(body_json(json!({"imageUuid": "docker:nginx", "name": "web"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(container_json(&server.uri(), "1i9", "web")))
        .expect(1)
        .mount(&server)
        .await;

    let body = Record::new()
        .with("name", "web")
        .with("imageUuid", "docker:nginx")
        .with("_draft", true);
    let created = record(client.create("container", body).await.unwrap());
    assert_eq!(created.id().as_deref(), Some("1i9"));
}

#[tokio::test]
async fn test_update_retries_conflicts() {
    let server = MockServer::start().await;
    let client = loaded_client(&server).await;
    let base = server.uri();
    Mock::given(method("PUT"))
        .and(path("/v2/containers/1i5"))
        .respond_with(ResponseTemplate::new(409).set_body_json(error_json(409, "Conflict")))
        .up_to_n_times(2)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/v2/containers/1i5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(container_json(&base, "1i5", "new")))
        .with_priority(2)
        .mount(&server)
        .await;

    let current = record(object(container_json(&base, "1i5", "old")));
    let updated = record(client.update(&current, json!({"name": "new"})).await.unwrap());
    assert_eq!(updated.get_str("name"), Some("new"));
    assert_eq!(count_requests(&server, "PUT", "/v2/containers/1i5").await, 3);
}

#[tokio::test]
async fn test_update_conflict_exhausts_retries() {
    let server = MockServer::start().await;
    let client = loaded_client(&server).await;
    Mock::given(method("PUT"))
        .and(path("/v2/containers/1i5"))
        .respond_with(ResponseTemplate::new(409).set_body_json(error_json(409, "Conflict")))
        .mount(&server)
        .await;

    let err = client
        .update_by_id("container", "1i5", json!({"name": "new"}))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Conflict { attempts: 3, .. }));
    assert_eq!(err.status(), Some(409));
    assert_eq!(count_requests(&server, "PUT", "/v2/containers/1i5").await, 3);
}

#[tokio::test]
async fn test_update_other_errors_are_not_retried() {
    let server = MockServer::start().await;
    mount_schema(&server).await;
    let client = builder(&server).retries(5).build().unwrap();
    client.load_schemas().await.unwrap();
    Mock::given(method("PUT"))
        .and(path("/v2/containers/1i5"))
        .respond_with(ResponseTemplate::new(422).set_body_json(error_json(422, "InvalidState")))
        .mount(&server)
        .await;

    let err = client
        .update_by_id("container", "1i5", json!({}))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(422));
    assert_eq!(count_requests(&server, "PUT", "/v2/containers/1i5").await, 1);
}

#[tokio::test]
async fn test_update_without_self_link() {
    let server = MockServer::start().await;
    let client = loaded_client(&server).await;
    let err = client
        .update(&Record::new().with("name", "x"), json!({}))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Client(ClientError::MissingLink { .. })));
}

#[tokio::test]
async fn test_delete_returns_last_result() {
    let server = MockServer::start().await;
    let client = loaded_client(&server).await;
    let base = server.uri();
    for id in ["1i1", "1i2"] {
        let mut removed = container_json(&base, id, id);
        removed["state"] = json!("removing");
        Mock::given(method("DELETE"))
            .and(path(format!("/v2/containers/{id}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(removed))
            .expect(1)
            .mount(&server)
            .await;
    }

    let objects = vec![
        object(container_json(&base, "1i1", "a")),
        GenericObject::Record(Record::new().with("name", "no links")),
        object(container_json(&base, "1i2", "b")),
    ];
    let last = record(client.delete(&objects).await.unwrap().unwrap());
    assert_eq!(last.id().as_deref(), Some("1i2"));
    assert_eq!(last.get_str("state"), Some("removing"));

    assert!(client.delete(Vec::<GenericObject>::new().iter()).await.unwrap().is_none());
}

// ─────────────────────────────────────────────────────────────────────────────
// Actions and links
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_action_posts_to_advertised_url() {
    let server = MockServer::start().await;
    let client = loaded_client(&server).await;
    let base = server.uri();
    Mock::given(method("POST"))
        .and(path("/v2/containers/1i5/"))
        .and(query_param("action", "stop"))
        .and(body_json(json!({"timeout": 10})))
        .respond_with(ResponseTemplate::new(409).set_body_json(error_json(409, "Conflict")))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v2/containers/1i5/"))
        .and(query_param("action", "stop"))
        .respond_with(ResponseTemplate::new(202).set_body_json(container_json(&base, "1i5", "web")))
        .with_priority(2)
        .mount(&server)
        .await;

    let container = record(object(container_json(&base, "1i5", "web")));
    let result = record(client.action(&container, "stop", json!({"timeout": 10})).await.unwrap());
    assert_eq!(result.id().as_deref(), Some("1i5"));
    assert_eq!(count_requests(&server, "POST", "/v2/containers/1i5/").await, 2);

    let err = client.action(&container, "explode", json!({})).await.unwrap_err();
    assert!(matches!(err, Error::Client(ClientError::MissingAction { .. })));
}

#[tokio::test]
async fn test_follow_link_with_query() {
    let server = MockServer::start().await;
    let client = loaded_client(&server).await;
    let base = server.uri();
    Mock::given(method("GET"))
        .and(path("/v2/containers/1i5/hosts"))
        .and(query_param("limit", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "type": "collection",
            "data": [{"id": "1h1", "type": "host", "hostname": "node-1"}]
        })))
        .mount(&server)
        .await;

    let container = record(object(container_json(&base, "1i5", "web")));
    let hosts = client
        .follow_link(&container, "hosts", &Query::new().with("limit", "1"))
        .await
        .unwrap()
        .into_collection()
        .unwrap();
    assert_eq!(hosts.get(0).unwrap().get_str("hostname"), Some("node-1"));

    let err = client
        .follow_link(&container, "volumes", &Query::new())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Client(ClientError::MissingLink { .. })));
}

// ─────────────────────────────────────────────────────────────────────────────
// Dynamic methods
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_call_dispatches_bound_methods() {
    let server = MockServer::start().await;
    let client = loaded_client(&server).await;
    let base = server.uri();
    Mock::given(method("GET"))
        .and(path("/v2/serviceconsumemaps/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"type": "collection", "data": []})))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/v2/serviceconsumemaps/1sc1"))
        .and(body_json(json!({"ports": ["80"]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "1sc1", "type": "serviceConsumeMap"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v2/containers"))
        .and(body_json(json!({})))
        .respond_with(ResponseTemplate::new(201).set_body_json(container_json(&base, "1i7", "anon")))
        .expect(1)
        .mount(&server)
        .await;

    for name in ["list_serviceConsumeMap", "list_service_consume_map"] {
        let listed = client.call(name, CallArgs::new()).await.unwrap().unwrap();
        assert!(listed.is_collection());
    }

    let updated = client
        .call(
            "update_by_id_service_consume_map",
            CallArgs::new().id("1sc1").body(json!({"ports": ["80"]})),
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.type_name(), Some("serviceConsumeMap"));

    let created = client.call("create_container", CallArgs::new()).await.unwrap().unwrap();
    assert_eq!(created.header().id().as_deref(), Some("1i7"));
}

#[tokio::test]
async fn test_call_errors() {
    let server = MockServer::start().await;
    let client = loaded_client(&server).await;

    let err = client.call("create_host", CallArgs::new()).await.unwrap_err();
    assert!(matches!(err, Error::Client(ClientError::UnknownMethod { .. })));

    let err = client.call("by_id_container", CallArgs::new()).await.unwrap_err();
    assert!(matches!(
        err,
        Error::Client(ClientError::MissingArgument { ref argument, .. }) if argument == "id"
    ));
}
