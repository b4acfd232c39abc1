use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use super::domain::Pos;
use super::repository::{PosRepository, RepositoryError};
use super::service::{PosService, PosServiceError};
use crate::osm::OsmNodeFetcher;

/// Router builder exposing the catalog over HTTP.
pub fn pos_router<R, F>(service: Arc<PosService<R, F>>) -> Router
where
    R: PosRepository + 'static,
    F: OsmNodeFetcher + 'static,
{
    Router::new()
        .route(
            "/api/v1/pos",
            get(list_handler::<R, F>)
                .put(upsert_handler::<R, F>)
                .delete(clear_handler::<R, F>),
        )
        .route("/api/v1/pos/:id", get(get_handler::<R, F>))
        .route(
            "/api/v1/pos/import/osm/:node_id",
            post(import_handler::<R, F>),
        )
        .with_state(service)
}

pub(crate) async fn list_handler<R, F>(
    State(service): State<Arc<PosService<R, F>>>,
) -> Response
where
    R: PosRepository + 'static,
    F: OsmNodeFetcher + 'static,
{
    (StatusCode::OK, Json(service.get_all())).into_response()
}

pub(crate) async fn get_handler<R, F>(
    State(service): State<Arc<PosService<R, F>>>,
    Path(id): Path<i64>,
) -> Response
where
    R: PosRepository + 'static,
    F: OsmNodeFetcher + 'static,
{
    match service.get_by_id(id) {
        Ok(pos) => (StatusCode::OK, Json(pos)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn upsert_handler<R, F>(
    State(service): State<Arc<PosService<R, F>>>,
    Json(pos): Json<Pos>,
) -> Response
where
    R: PosRepository + 'static,
    F: OsmNodeFetcher + 'static,
{
    match service.upsert(pos) {
        Ok(saved) => (StatusCode::OK, Json(saved)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn clear_handler<R, F>(
    State(service): State<Arc<PosService<R, F>>>,
) -> Response
where
    R: PosRepository + 'static,
    F: OsmNodeFetcher + 'static,
{
    service.clear();
    StatusCode::NO_CONTENT.into_response()
}

pub(crate) async fn import_handler<R, F>(
    State(service): State<Arc<PosService<R, F>>>,
    Path(node_id): Path<i64>,
) -> Response
where
    R: PosRepository + 'static,
    F: OsmNodeFetcher + 'static,
{
    match service.import_from_osm_node(node_id).await {
        Ok(pos) => (StatusCode::CREATED, Json(pos)).into_response(),
        Err(err) => error_response(err),
    }
}

fn error_response(error: PosServiceError) -> Response {
    let status = match &error {
        PosServiceError::MissingFields(_) => StatusCode::BAD_REQUEST,
        PosServiceError::Source(_) | PosServiceError::Repository(RepositoryError::NotFound(_)) => {
            StatusCode::NOT_FOUND
        }
        PosServiceError::Repository(RepositoryError::DuplicateName(_)) => StatusCode::CONFLICT,
    };

    let payload = json!({ "error": error.to_string() });
    (status, Json(payload)).into_response()
}
