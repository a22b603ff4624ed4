//! HTTP error mapping
//!
//! The request boundary is the propagation barrier: below it errors carry
//! typed kinds, here they map to a status code and a JSON body. Storage
//! detail stays in the log; the client sees a generic message.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::error;

use atelier_pages::error::PageError;
use atelier_plugins::error::PluginError;
use atelier_registry::error::RegistryError;
use atelier_registry::usage::PageRef;

/// Error as surfaced to HTTP callers.
#[derive(Debug)]
pub enum ApiError {
	BadRequest(String),
	Unauthorized(String),
	Forbidden(String),
	NotFound(String),
	/// 400 carrying the referencing pages so the UI can prompt
	ComponentInUse(Vec<PageRef>),
	/// 5xx; detail is logged, not returned
	Internal(String),
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
	error: &'static str,
	message: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	affected_pages: Option<Vec<PageRef>>,
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let (status, error, message, affected_pages) = match self {
			ApiError::BadRequest(message) => {
				(StatusCode::BAD_REQUEST, "bad_request", message, None)
			}
			ApiError::Unauthorized(message) => {
				(StatusCode::UNAUTHORIZED, "unauthorized", message, None)
			}
			ApiError::Forbidden(message) => (StatusCode::FORBIDDEN, "forbidden", message, None),
			ApiError::NotFound(message) => (StatusCode::NOT_FOUND, "not_found", message, None),
			ApiError::ComponentInUse(pages) => (
				StatusCode::BAD_REQUEST,
				"component_in_use",
				format!("component is used by {} page(s)", pages.len()),
				Some(pages),
			),
			ApiError::Internal(detail) => {
				error!(detail = %detail, "internal error");
				(
					StatusCode::INTERNAL_SERVER_ERROR,
					"internal",
					"internal server error".to_string(),
					None,
				)
			}
		};
		(
			status,
			Json(ErrorBody {
				error,
				message,
				affected_pages,
			}),
		)
			.into_response()
	}
}

impl From<PageError> for ApiError {
	fn from(e: PageError) -> Self {
		match e {
			PageError::SiteNotFound(_) | PageError::PageNotFound(_) | PageError::VersionNotFound(_) => {
				ApiError::NotFound(e.to_string())
			}
			PageError::SiteSlugTaken(_)
			| PageError::ActiveVersionDelete(_)
			| PageError::InvalidTree(_) => ApiError::BadRequest(e.to_string()),
			PageError::Storage(detail) => ApiError::Internal(detail),
		}
	}
}

impl From<RegistryError> for ApiError {
	fn from(e: RegistryError) -> Self {
		match e {
			RegistryError::NotFound(_) => ApiError::NotFound(e.to_string()),
			RegistryError::ComponentInUse { pages } => ApiError::ComponentInUse(pages),
			RegistryError::InvalidManifest(_) => ApiError::BadRequest(e.to_string()),
			RegistryError::Storage(detail) => ApiError::Internal(detail),
		}
	}
}

impl From<PluginError> for ApiError {
	fn from(e: PluginError) -> Self {
		match e {
			PluginError::NotFound(_) => ApiError::NotFound(e.to_string()),
			PluginError::Registry(inner) => inner.into(),
			PluginError::Io(inner) => ApiError::Internal(inner.to_string()),
			PluginError::MalformedPackage(_)
			| PluginError::SchemaViolation(_)
			| PluginError::UnsupportedType(_)
			| PluginError::IsolationInitFailed { .. }
			| PluginError::LoadFailed { .. }
			| PluginError::ActivateFailed { .. }
			| PluginError::InvalidTransition { .. } => ApiError::BadRequest(e.to_string()),
		}
	}
}

/// Result alias for handlers.
pub type ApiResult<T> = Result<T, ApiError>;
