//! End-to-end specifications for the OSM import and upsert workflow,
//! driven through the public service facade and HTTP router with a
//! scripted fetcher and the in-memory repository.

mod common {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use campus_coffee::catalog::{InMemoryPosRepository, PosService};
    use campus_coffee::osm::{OsmNode, OsmNodeFetcher, OsmNodeNotFound};

    pub(super) const RADA_NODE_ID: i64 = 5_589_879_349;

    /// Fetcher stub returning pre-seeded nodes and recording every call.
    #[derive(Default)]
    pub(super) struct ScriptedFetcher {
        nodes: Mutex<HashMap<i64, OsmNode>>,
        calls: Mutex<Vec<i64>>,
    }

    impl ScriptedFetcher {
        pub(super) fn with_node(node: OsmNode) -> Self {
            let fetcher = Self::default();
            fetcher
                .nodes
                .lock()
                .expect("lock")
                .insert(node.node_id(), node);
            fetcher
        }

        pub(super) fn calls(&self) -> Vec<i64> {
            self.calls.lock().expect("lock").clone()
        }
    }

    #[async_trait]
    impl OsmNodeFetcher for ScriptedFetcher {
        async fn fetch_node(&self, node_id: i64) -> Result<OsmNode, OsmNodeNotFound> {
            self.calls.lock().expect("lock").push(node_id);
            self.nodes
                .lock()
                .expect("lock")
                .get(&node_id)
                .cloned()
                .ok_or(OsmNodeNotFound(node_id))
        }
    }

    pub(super) fn tags(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    pub(super) fn rada_node() -> OsmNode {
        OsmNode::new(
            RADA_NODE_ID,
            tags(&[
                ("name", "Rada Coffee & Rösterei"),
                ("amenity", "cafe"),
                ("addr:street", "Untere Straße"),
                ("addr:housenumber", "21"),
                ("addr:postcode", "69117"),
                ("addr:city", "Heidelberg"),
                ("description", "Caffé und Rösterei"),
            ]),
        )
    }

    pub(super) fn build_service(
        fetcher: ScriptedFetcher,
    ) -> (
        PosService<InMemoryPosRepository, ScriptedFetcher>,
        Arc<InMemoryPosRepository>,
        Arc<ScriptedFetcher>,
    ) {
        let repository = Arc::new(InMemoryPosRepository::default());
        let fetcher = Arc::new(fetcher);
        let service = PosService::new(repository.clone(), fetcher.clone());
        (service, repository, fetcher)
    }
}

mod import {
    use super::common::*;
    use campus_coffee::catalog::{CampusType, PosRepository, PosServiceError, PosType};
    use campus_coffee::osm::OsmNode;

    #[tokio::test]
    async fn imports_rada_coffee_end_to_end() {
        let (service, _, fetcher) = build_service(ScriptedFetcher::with_node(rada_node()));

        let imported = service
            .import_from_osm_node(RADA_NODE_ID)
            .await
            .expect("import succeeds");

        assert_eq!(imported.id, Some(1));
        assert_eq!(imported.name, "Rada Coffee & Rösterei");
        assert_eq!(imported.description, "Caffé und Rösterei");
        assert_eq!(imported.pos_type, PosType::Cafe);
        assert_eq!(imported.campus, CampusType::Altstadt);
        assert_eq!(imported.street, "Untere Straße");
        assert_eq!(imported.house_number, "21");
        assert_eq!(imported.postal_code, 69117);
        assert_eq!(imported.city, "Heidelberg");
        assert!(imported.created_at.is_some());
        assert!(imported.updated_at.is_some());
        assert_eq!(fetcher.calls(), vec![RADA_NODE_ID]);
    }

    #[tokio::test]
    async fn unknown_node_maps_to_source_not_found() {
        let (service, repository, _) = build_service(ScriptedFetcher::default());

        let error = service
            .import_from_osm_node(123)
            .await
            .expect_err("fetch fails");

        assert!(matches!(error, PosServiceError::Source(_)));
        assert!(repository.find_all().is_empty());
    }

    #[tokio::test]
    async fn missing_name_aborts_before_persistence() {
        let node = OsmNode::new(
            123_456,
            tags(&[
                ("amenity", "cafe"),
                ("addr:street", "Untere Straße"),
                ("addr:housenumber", "21"),
                ("addr:postcode", "69117"),
                ("addr:city", "Heidelberg"),
            ]),
        );
        let (service, repository, _) = build_service(ScriptedFetcher::with_node(node));

        let error = service
            .import_from_osm_node(123_456)
            .await
            .expect_err("conversion fails");

        assert!(matches!(error, PosServiceError::MissingFields(_)));
        assert!(repository.find_all().is_empty());
    }

    #[tokio::test]
    async fn invalid_postal_code_aborts_before_persistence() {
        let node = OsmNode::new(
            123_456,
            tags(&[
                ("name", "Test Cafe"),
                ("amenity", "cafe"),
                ("addr:street", "Untere Straße"),
                ("addr:housenumber", "21"),
                ("addr:postcode", "invalid"),
                ("addr:city", "Heidelberg"),
            ]),
        );
        let (service, repository, _) = build_service(ScriptedFetcher::with_node(node));

        let error = service
            .import_from_osm_node(123_456)
            .await
            .expect_err("conversion fails");

        assert!(matches!(error, PosServiceError::MissingFields(_)));
        assert!(repository.find_all().is_empty());
    }

    #[tokio::test]
    async fn bakery_import_is_classified_as_bakery() {
        let node = OsmNode::new(
            999_999,
            tags(&[
                ("name", "Test Bakery"),
                ("amenity", "bakery"),
                ("addr:street", "Main Street"),
                ("addr:housenumber", "10"),
                ("addr:postcode", "69115"),
                ("addr:city", "Heidelberg"),
            ]),
        );
        let (service, _, _) = build_service(ScriptedFetcher::with_node(node));

        let imported = service
            .import_from_osm_node(999_999)
            .await
            .expect("import succeeds");

        assert_eq!(imported.pos_type, PosType::Bakery);
        assert_eq!(imported.campus, CampusType::Altstadt);
        assert_eq!(imported.description, "bakery");
    }

    #[tokio::test]
    async fn importing_the_same_node_name_twice_conflicts() {
        let (service, _, _) = build_service(ScriptedFetcher::with_node(rada_node()));

        service
            .import_from_osm_node(RADA_NODE_ID)
            .await
            .expect("first import succeeds");

        // The candidate carries no id, so the second import is a create
        // that trips the unique-name constraint.
        let error = service
            .import_from_osm_node(RADA_NODE_ID)
            .await
            .expect_err("second import conflicts");
        assert!(matches!(
            error,
            PosServiceError::Repository(
                campus_coffee::catalog::RepositoryError::DuplicateName(_)
            )
        ));
    }
}

mod upsert {
    use super::common::*;
    use campus_coffee::catalog::{PosRepository, PosServiceError, RepositoryError};

    #[tokio::test]
    async fn update_with_unknown_id_fails_before_write() {
        let (service, repository, _) = build_service(ScriptedFetcher::with_node(rada_node()));

        let mut pos = service
            .import_from_osm_node(RADA_NODE_ID)
            .await
            .expect("import succeeds");
        service.clear();

        pos.id = Some(42);
        let error = service.upsert(pos).expect_err("update fails");

        assert!(matches!(
            error,
            PosServiceError::Repository(RepositoryError::NotFound(42))
        ));
        assert!(repository.find_all().is_empty());
    }

    #[tokio::test]
    async fn update_of_existing_record_keeps_its_id() {
        let (service, _, _) = build_service(ScriptedFetcher::with_node(rada_node()));

        let mut pos = service
            .import_from_osm_node(RADA_NODE_ID)
            .await
            .expect("import succeeds");
        pos.description = "Rösterei in der Altstadt".to_string();

        let updated = service.upsert(pos.clone()).expect("update succeeds");
        assert_eq!(updated.id, pos.id);
        assert_eq!(updated.description, "Rösterei in der Altstadt");
        assert_eq!(updated.created_at, pos.created_at);
    }
}

mod routing {
    use super::common::*;

    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use campus_coffee::catalog::pos_router;

    fn build_router(fetcher: ScriptedFetcher) -> axum::Router {
        let (service, _, _) = build_service(fetcher);
        pos_router(Arc::new(service))
    }

    #[tokio::test]
    async fn import_endpoint_returns_created_record() {
        let router = build_router(ScriptedFetcher::with_node(rada_node()));

        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(format!("/api/v1/pos/import/osm/{RADA_NODE_ID}"))
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router dispatch");

        assert_eq!(response.status(), StatusCode::CREATED);

        let body = to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("body");
        let payload: Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(payload.get("id"), Some(&json!(1)));
        assert_eq!(payload.get("name"), Some(&json!("Rada Coffee & Rösterei")));
        assert_eq!(payload.get("type"), Some(&json!("CAFE")));
        assert_eq!(payload.get("campus"), Some(&json!("ALTSTADT")));
    }

    #[tokio::test]
    async fn import_of_unknown_node_returns_not_found() {
        let router = build_router(ScriptedFetcher::default());

        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/pos/import/osm/123")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router dispatch");

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn missing_pos_lookup_returns_not_found() {
        let router = build_router(ScriptedFetcher::default());

        let response = router
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/api/v1/pos/7")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router dispatch");

        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("body");
        let payload: Value = serde_json::from_slice(&body).expect("json");
        assert!(payload.get("error").is_some());
    }

    #[tokio::test]
    async fn duplicate_upsert_returns_conflict() {
        let router = build_router(ScriptedFetcher::with_node(rada_node()));

        let import = Request::builder()
            .method("POST")
            .uri(format!("/api/v1/pos/import/osm/{RADA_NODE_ID}"))
            .body(Body::empty())
            .expect("request");
        let response = router.clone().oneshot(import).await.expect("dispatch");
        assert_eq!(response.status(), StatusCode::CREATED);

        let duplicate = json!({
            "id": null,
            "name": "Rada Coffee & Rösterei",
            "description": "another stand",
            "type": "CAFE",
            "campus": "ALTSTADT",
            "street": "Hauptstraße",
            "house_number": "1",
            "postal_code": 69117,
            "city": "Heidelberg"
        });

        let response = router
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri("/api/v1/pos")
                    .header("content-type", "application/json")
                    .body(Body::from(duplicate.to_string()))
                    .expect("request"),
            )
            .await
            .expect("router dispatch");

        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn list_and_clear_round_trip() {
        let router = build_router(ScriptedFetcher::with_node(rada_node()));

        let import = Request::builder()
            .method("POST")
            .uri(format!("/api/v1/pos/import/osm/{RADA_NODE_ID}"))
            .body(Body::empty())
            .expect("request");
        router.clone().oneshot(import).await.expect("dispatch");

        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/api/v1/pos")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router dispatch");
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("body");
        let listing: Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(listing.as_array().map(Vec::len), Some(1));

        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/api/v1/pos")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router dispatch");
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = router
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/api/v1/pos")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router dispatch");
        let body = to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("body");
        let listing: Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(listing.as_array().map(Vec::len), Some(0));
    }
}
