//! Property-Based Tests for the Feed Route
//!
//! Property: for any combination of caller-supplied offset and limit, the
//! feed route answers HTTP 200 with a well-formed envelope — the effective
//! limit stays inside the configured bounds and the served offset stays
//! inside the live eligible set.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use proptest::prelude::*;
use tower::ServiceExt;
use uuid::Uuid;

use carousel_api::{create_api_router, AppState};
use carousel_core::{CatalogEntry, EligibilityCriteria, EntryStatus, RotationConfig};
use carousel_rotation::{ContentWindowResolver, FeedService, RotationManager};
use carousel_storage::{InMemoryCatalog, InMemoryStateStore, WindowCache};
use chrono::Utc;

fn test_app(entry_count: i64) -> Router {
    let catalog = InMemoryCatalog::new();
    for i in 0..entry_count {
        catalog.upsert(CatalogEntry {
            entry_id: Uuid::now_v7(),
            title: format!("entry-{i}"),
            status: EntryStatus::Published,
            published_at: Utc::now() - chrono::Duration::minutes(i),
            unit_count: 1,
            metadata: None,
        });
    }

    let manager = Arc::new(RotationManager::with_defaults(Arc::new(
        InMemoryStateStore::new(),
    )));
    let resolver = Arc::new(ContentWindowResolver::new(
        Arc::new(catalog),
        EligibilityCriteria::default(),
    ));
    let feed = Arc::new(
        FeedService::new(
            Arc::clone(&manager),
            resolver,
            Arc::new(WindowCache::with_defaults()),
            RotationConfig::default(),
        )
        .unwrap(),
    );

    create_api_router(AppState {
        feed,
        manager,
        start_time: std::time::Instant::now(),
    })
}

async fn fetch(app: &Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_feed_envelope_is_well_formed(
        entry_count in 0i64..40,
        offset in proptest::option::of(-50i64..200),
        limit in proptest::option::of(-5i64..50),
    ) {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        runtime.block_on(async {
            let app = test_app(entry_count);

            let mut uri = "/api/v1/feed".to_string();
            let mut params = Vec::new();
            if let Some(offset) = offset {
                params.push(format!("offset={offset}"));
            }
            if let Some(limit) = limit {
                params.push(format!("limit={limit}"));
            }
            if !params.is_empty() {
                uri = format!("{uri}?{}", params.join("&"));
            }

            let (status, body) = fetch(&app, &uri).await;
            prop_assert_eq!(status, StatusCode::OK);
            prop_assert_eq!(body["success"].as_bool(), Some(true));

            let effective_limit = body["meta"]["limit"].as_i64().unwrap();
            prop_assert!(effective_limit >= 1);
            prop_assert!(effective_limit <= 12);

            let total = body["data"]["total"].as_i64().unwrap();
            prop_assert_eq!(total, entry_count);

            let served_offset = body["data"]["offset"].as_i64().unwrap();
            if total > 0 {
                prop_assert!(served_offset >= 0);
                prop_assert!(served_offset < total);
                prop_assert_eq!(
                    body["data"]["items"].as_array().unwrap().len() as i64,
                    effective_limit
                );
            } else {
                prop_assert!(body["data"]["items"].as_array().unwrap().is_empty());
            }
            Ok(())
        })?;
    }
}
