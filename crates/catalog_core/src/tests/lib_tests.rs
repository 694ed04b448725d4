use super::*;
use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::Mutex};

use crate::state::ActiveView;

const LISTED: [&str; 3] = ["bulbasaur", "ivysaur", "venusaur"];
const PAGE_SIZE: usize = 2;

#[derive(Clone)]
struct CatalogServerState {
    base_url: String,
    requests: Arc<Mutex<Vec<String>>>,
}

async fn list_handler(
    State(state): State<CatalogServerState>,
    Query(q): Query<HashMap<String, String>>,
) -> Json<Value> {
    let offset: usize = q
        .get("offset")
        .and_then(|v| v.parse().ok())
        .unwrap_or_default();
    state
        .requests
        .lock()
        .await
        .push(format!("list:{offset}"));

    let results: Vec<Value> = LISTED
        .iter()
        .enumerate()
        .skip(offset)
        .take(PAGE_SIZE)
        .map(|(idx, name)| {
            json!({ "name": name, "url": format!("{}/pokemon/{}/", state.base_url, idx + 1) })
        })
        .collect();
    let next = (offset + PAGE_SIZE < LISTED.len())
        .then(|| format!("{}/pokemon?offset={}", state.base_url, offset + PAGE_SIZE));

    Json(json!({ "count": LISTED.len(), "next": next, "previous": null, "results": results }))
}

async fn entity_handler(
    State(state): State<CatalogServerState>,
    Path(name): Path<String>,
) -> Result<Json<Value>, StatusCode> {
    state
        .requests
        .lock()
        .await
        .push(format!("entity:{name}"));

    match name.as_str() {
        "pikachu" => Ok(Json(json!({
            "name": "pikachu",
            "height": 4,
            "base_experience": 112,
            "abilities": [{ "ability": { "name": "static", "url": "a" }, "slot": 1 }],
            "held_items": [{ "item": { "name": "oran-berry", "url": "i" } }],
            "sprites": {
                "front_default": "front.png",
                "other": { "official-artwork": { "front_default": "artwork.png" } }
            }
        }))),
        "broken" => Ok(Json(json!({ "unexpected": true }))),
        "heightless" => Ok(Json(json!({ "name": "heightless", "sprites": {} }))),
        _ => Err(StatusCode::NOT_FOUND),
    }
}

async fn spawn_catalog_server() -> anyhow::Result<(String, CatalogServerState)> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let state = CatalogServerState {
        base_url: format!("http://{addr}"),
        requests: Arc::new(Mutex::new(Vec::new())),
    };
    let app = Router::new()
        .route("/pokemon", get(list_handler))
        .route("/pokemon/:name", get(entity_handler))
        .with_state(state.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok((format!("http://{addr}/pokemon"), state))
}

#[tokio::test]
async fn fetches_first_page_then_follows_cursor() {
    let (root, _server) = spawn_catalog_server().await.expect("spawn server");
    let api = HttpCatalogApi::new(format!("{root}/"));
    assert_eq!(api.root(), root);

    let first = api.fetch_first_page().await.expect("first page");
    let names: Vec<_> = first.entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["bulbasaur", "ivysaur"]);
    let cursor = first.next.expect("cursor");

    let second = api.fetch_page(&cursor).await.expect("second page");
    assert_eq!(second.entries.len(), 1);
    assert_eq!(second.entries[0].name, "venusaur");
    assert!(second.next.is_none());
}

#[tokio::test]
async fn lookup_and_detail_read_the_entity_endpoint() {
    let (root, server) = spawn_catalog_server().await.expect("spawn server");
    let api = HttpCatalogApi::new(root.clone());
    let key = EntityKey::from_query("PIKACHU").expect("key");

    let filtered = api.lookup_entry(&key).await.expect("lookup");
    assert_eq!(filtered.name(), "pikachu");
    assert_eq!(filtered.entry.reference, format!("{root}/pikachu"));
    assert_eq!(filtered.artwork_url.as_deref(), Some("artwork.png"));

    let detail = api.fetch_detail(&key).await.expect("detail");
    assert_eq!(detail.height, 4);
    assert_eq!(detail.base_experience, Some(112));
    assert_eq!(detail.primary_ability(), Some("static"));
    assert_eq!(detail.primary_held_item(), Some("oran-berry"));

    assert_eq!(
        server.requests.lock().await.clone(),
        vec!["entity:pikachu", "entity:pikachu"]
    );
}

#[tokio::test]
async fn unknown_entity_surfaces_not_found_status() {
    let (root, _server) = spawn_catalog_server().await.expect("spawn server");
    let api = HttpCatalogApi::new(root);

    let err = api
        .lookup_entry(&EntityKey("notarealentity".to_string()))
        .await
        .expect_err("must fail");
    assert!(err.is_not_found(), "unexpected error: {err}");
    assert!(err.url.ends_with("/pokemon/notarealentity"));
}

#[tokio::test]
async fn malformed_body_is_reported_as_fetch_error() {
    let (root, _server) = spawn_catalog_server().await.expect("spawn server");
    let api = HttpCatalogApi::new(root);

    let err = api
        .fetch_detail(&EntityKey("broken".to_string()))
        .await
        .expect_err("must fail");
    assert_eq!(err.status, None);
    assert!(err.reason.contains("malformed body"), "unexpected error: {err}");
}

#[tokio::test]
async fn detail_without_height_is_reported_as_fetch_error() {
    let (root, _server) = spawn_catalog_server().await.expect("spawn server");
    let api = HttpCatalogApi::new(root);
    let key = EntityKey("heightless".to_string());

    assert!(api.lookup_entry(&key).await.is_ok());
    let err = api.fetch_detail(&key).await.expect_err("must fail");
    assert_eq!(err.status, None);
    assert!(err.reason.contains("malformed body"), "unexpected error: {err}");
}

#[tokio::test]
async fn path_characters_in_query_stay_inside_one_segment() {
    let (root, server) = spawn_catalog_server().await.expect("spawn server");
    let api = HttpCatalogApi::new(root.clone());

    let key = EntityKey::from_query("zzz/../pikachu?x=1").expect("key");
    let err = api.lookup_entry(&key).await.expect_err("must fail");
    assert!(err.is_not_found(), "unexpected error: {err}");
    assert!(err.url.starts_with(&format!("{root}/zzz%2F..%2Fpikachu%3F")));

    let err = api
        .fetch_detail(&EntityKey("..".to_string()))
        .await
        .expect_err("must fail");
    assert_eq!(err.status, None);

    assert_eq!(
        server.requests.lock().await.clone(),
        vec!["entity:zzz/../pikachu?x=1"]
    );
}

#[tokio::test]
async fn unreachable_upstream_is_reported_as_fetch_error() {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let api = HttpCatalogApi::new(format!("http://{addr}/pokemon"));
    let err = api.fetch_first_page().await.expect_err("must fail");
    assert_eq!(err.status, None);
}

#[tokio::test]
async fn relative_cursor_is_rejected_without_panicking() {
    let api = HttpCatalogApi::new("http://127.0.0.1:9/pokemon");
    let err = api
        .fetch_page(&PageCursor("page2".to_string()))
        .await
        .expect_err("must fail");
    assert_eq!(err.url, "page2");
}

#[tokio::test]
async fn coordinator_pages_and_filters_against_http_upstream() {
    let (root, server) = spawn_catalog_server().await.expect("spawn server");
    let coordinator = CatalogCoordinator::new(root);

    coordinator.initialize().await;
    coordinator.load_more().await;
    coordinator.load_more().await;

    let state = coordinator.snapshot().await;
    let names: Vec<_> = state.catalog.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["bulbasaur", "ivysaur", "venusaur"]);
    assert!(!state.has_more_pages());

    coordinator.search("Pikachu").await;
    let state = coordinator.snapshot().await;
    assert_eq!(state.view(), ActiveView::Filtered);
    assert_eq!(state.detail.as_ref().map(|d| d.height), Some(4));

    coordinator.search("missingno").await;
    let state = coordinator.snapshot().await;
    assert_eq!(state.view(), ActiveView::List);
    assert!(state.notice.is_some());
    assert!(!state.is_loading);

    assert_eq!(
        server.requests.lock().await.clone(),
        vec![
            "list:0",
            "list:2",
            "entity:pikachu",
            "entity:pikachu",
            "entity:missingno",
        ]
    );
}

#[tokio::test]
async fn coordinator_treats_traversal_query_as_not_found() {
    let (root, server) = spawn_catalog_server().await.expect("spawn server");
    let coordinator = CatalogCoordinator::new(root);

    coordinator.search("zzz/../pikachu?x=1").await;

    let state = coordinator.snapshot().await;
    assert_eq!(state.view(), ActiveView::List);
    assert!(state.filter_result.is_none());
    assert!(state.detail.is_none());
    assert!(state.notice.is_some());
    assert!(!server
        .requests
        .lock()
        .await
        .iter()
        .any(|r| r == "entity:pikachu"));
}

#[tokio::test]
async fn coordinator_keeps_filter_without_detail_when_height_is_missing() {
    let (root, server) = spawn_catalog_server().await.expect("spawn server");
    let coordinator = CatalogCoordinator::new(root);

    coordinator.search("heightless").await;

    let state = coordinator.snapshot().await;
    assert_eq!(state.view(), ActiveView::Filtered);
    assert_eq!(
        state.filter_result.as_ref().map(|f| f.name()),
        Some("heightless")
    );
    assert!(state.detail.is_none());
    assert!(!state.is_loading);
    assert_eq!(
        server.requests.lock().await.clone(),
        vec!["entity:heightless", "entity:heightless"]
    );
}
