use axum::{
	Json, Router,
	extract::State,
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::{Deserialize, Serialize};

use cgr_service::{
	CachedResultResponse, Collection, Error as ServiceError, SearchRequest, SearchResponse,
};

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CachedRequest {
	pub signature: Vec<u8>,
}

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/molecules/search", post(search_molecules))
		.route("/v1/reactions/search", post(search_reactions))
		.route("/v1/molecules/cached", post(cached_molecules))
		.route("/v1/reactions/cached", post(cached_reactions))
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn search_molecules(
	State(state): State<AppState>,
	Json(payload): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
	let response = state.service.search_molecules(payload).await?;

	Ok(Json(response))
}

async fn search_reactions(
	State(state): State<AppState>,
	Json(payload): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
	let response = state.service.search_reactions(payload).await?;

	Ok(Json(response))
}

async fn cached_molecules(
	State(state): State<AppState>,
	Json(payload): Json<CachedRequest>,
) -> Result<Json<CachedResultResponse>, ApiError> {
	fetch_cached(&state, Collection::Molecules, payload).await
}

async fn cached_reactions(
	State(state): State<AppState>,
	Json(payload): Json<CachedRequest>,
) -> Result<Json<CachedResultResponse>, ApiError> {
	fetch_cached(&state, Collection::Reactions, payload).await
}

async fn fetch_cached(
	state: &AppState,
	collection: Collection,
	payload: CachedRequest,
) -> Result<Json<CachedResultResponse>, ApiError> {
	match state.service.fetch_cached(collection, &payload.signature).await? {
		Some(entry) => Ok(Json(entry.into())),
		None => Err(json_error(
			StatusCode::NOT_FOUND,
			"CACHE_MISS",
			format!("No live {collection} result set is cached under this signature."),
		)),
	}
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
}
impl ApiError {
	fn new(status: StatusCode, error_code: impl Into<String>, message: impl Into<String>) -> Self {
		Self { status, error_code: error_code.into(), message: message.into() }
	}
}
impl From<ServiceError> for ApiError {
	fn from(err: ServiceError) -> Self {
		let (status, code) = match &err {
			ServiceError::InvalidFingerprint { .. } =>
				(StatusCode::BAD_REQUEST, "INVALID_FINGERPRINT"),
			ServiceError::UnknownOperator { .. } => (StatusCode::BAD_REQUEST, "UNKNOWN_OPERATOR"),
			ServiceError::StoreUnavailable { .. } =>
				(StatusCode::SERVICE_UNAVAILABLE, "STORE_UNAVAILABLE"),
			ServiceError::CacheWriteConflict { .. } =>
				(StatusCode::CONFLICT, "CACHE_WRITE_CONFLICT"),
			ServiceError::CacheWriteFailure { .. } =>
				(StatusCode::INTERNAL_SERVER_ERROR, "CACHE_WRITE_FAILURE"),
			ServiceError::CacheReadFailure { .. } =>
				(StatusCode::SERVICE_UNAVAILABLE, "CACHE_READ_FAILURE"),
			ServiceError::SweepFailure { .. } =>
				(StatusCode::INTERNAL_SERVER_ERROR, "SWEEP_FAILURE"),
			ServiceError::Timeout { .. } => (StatusCode::GATEWAY_TIMEOUT, "TIMEOUT"),
		};

		if status.is_server_error() {
			tracing::error!(error = %err, "Request failed.");
		}

		json_error(status, code, err.to_string())
	}
}
impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody { error_code: self.error_code, message: self.message };

		(self.status, Json(body)).into_response()
	}
}

pub fn json_error(status: StatusCode, code: &str, message: impl Into<String>) -> ApiError {
	ApiError::new(status, code, message)
}
