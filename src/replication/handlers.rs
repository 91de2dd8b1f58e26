use super::protocol::{
    ENDPOINT_ENTITY, EntityParams, EntityRequest, EntityResponse, ErrorResponse,
    HEADER_INTERNAL_REPLICA, HEADER_RECORD_TIMESTAMP, HEADER_RECORD_TOMBSTONE,
    NOT_ENOUGH_REPLICAS, Origin,
};
use super::router::RequestRouter;
use super::types::Operation;
use crate::storage::types::Key;

use axum::{
    Extension, Json, Router,
    body::Bytes,
    extract::Query,
    http::{HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
};
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

/// Routes served by a node.
pub fn entity_routes(router: Arc<RequestRouter>) -> Router {
    Router::new()
        .route(
            ENDPOINT_ENTITY,
            get(handle_entity).put(handle_entity).delete(handle_entity),
        )
        .layer(Extension(router))
}

pub async fn handle_entity(
    Extension(router): Extension<Arc<RequestRouter>>,
    method: Method,
    Query(params): Query<EntityParams>,
    headers: HeaderMap,
    body: Bytes,
) -> EntityResponse {
    let request = match parse_request(&method, params, &headers, body) {
        Ok(request) => request,
        Err(reason) => {
            tracing::warn!("Malformed {} request: {}", method, reason);
            return EntityResponse::BadRequest(reason);
        }
    };

    let span = match &request.origin {
        Origin::Client { .. } => {
            tracing::info_span!("client", request_id = %Uuid::new_v4(), key = %request.key)
        }
        Origin::Replica { .. } => tracing::debug_span!("replica", key = %request.key),
    };

    router.route(request).instrument(span).await
}

/// Builds an `EntityRequest` from the HTTP pieces, rejecting malformed input.
pub fn parse_request(
    method: &Method,
    params: EntityParams,
    headers: &HeaderMap,
    body: Bytes,
) -> Result<EntityRequest, String> {
    let id = params.id.unwrap_or_default();
    if id.is_empty() {
        return Err("missing or empty id parameter".to_string());
    }

    let operation = match *method {
        Method::GET => Operation::Get,
        Method::PUT => Operation::Put {
            value: body.to_vec(),
        },
        Method::DELETE => Operation::Delete,
        ref other => return Err(format!("unsupported method {}", other)),
    };

    let internal = headers
        .get(HEADER_INTERNAL_REPLICA)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.trim().eq_ignore_ascii_case("true"))
        .unwrap_or(false);

    let origin = if internal {
        let timestamp = match headers.get(HEADER_RECORD_TIMESTAMP) {
            Some(raw) => Some(
                raw.to_str()
                    .ok()
                    .and_then(|value| value.trim().parse::<u64>().ok())
                    .ok_or_else(|| format!("invalid {} header", HEADER_RECORD_TIMESTAMP))?,
            ),
            None => None,
        };
        Origin::Replica { timestamp }
    } else {
        Origin::Client {
            quorum: params.replicas,
        }
    };

    Ok(EntityRequest {
        operation,
        key: Key(id),
        origin,
    })
}

impl IntoResponse for EntityResponse {
    fn into_response(self) -> Response {
        match self {
            EntityResponse::Found { value, timestamp } => (
                StatusCode::OK,
                [(HEADER_RECORD_TIMESTAMP, timestamp.to_string())],
                value,
            )
                .into_response(),
            EntityResponse::NotFound {
                tombstone: Some(timestamp),
            } => (
                StatusCode::NOT_FOUND,
                [
                    (HEADER_RECORD_TIMESTAMP, timestamp.to_string()),
                    (HEADER_RECORD_TOMBSTONE, "true".to_string()),
                ],
            )
                .into_response(),
            EntityResponse::NotFound { tombstone: None } => StatusCode::NOT_FOUND.into_response(),
            EntityResponse::Created => StatusCode::CREATED.into_response(),
            EntityResponse::Accepted => StatusCode::ACCEPTED.into_response(),
            EntityResponse::NotEnoughReplicas { .. } => {
                (StatusCode::GATEWAY_TIMEOUT, NOT_ENOUGH_REPLICAS).into_response()
            }
            EntityResponse::BadRequest(error) => {
                (StatusCode::BAD_REQUEST, Json(ErrorResponse { error })).into_response()
            }
            EntityResponse::Rejected(error) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse { error }),
            )
                .into_response(),
        }
    }
}
