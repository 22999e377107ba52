//! Error-to-response mapping for the HTTP surface.

// crates.io
use axum::{
	Json,
	http::StatusCode,
	response::{IntoResponse, Response},
};
use serde_json::json;
// self
use crate::{_prelude::*, error::ValidationErrors};

const FORM_FIELDS: [&str; 3] = ["username", "email", "password"];

/// Handler error wrapper; converts any [`Error`] into a status and body.
///
/// | Error | Status | Body |
/// |---|---|---|
/// | `Validation`, `Auth` | 400 | `{"errors": {"username", "email", "password"}}` |
/// | `NotFound` | 404 | `Resource not found.` |
/// | `LookupFailed` | 500 | `{"error": "Song not found."}` |
/// | anything else | 500 | `Internal server error.` |
#[derive(Debug)]
pub struct ApiError(pub Error);
impl From<Error> for ApiError {
	fn from(e: Error) -> Self {
		Self(e)
	}
}
impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		match self.0 {
			Error::Validation(errors) =>
				(StatusCode::BAD_REQUEST, Json(json!({ "errors": form_errors(&errors) })))
					.into_response(),
			Error::Auth(auth) => {
				let errors = ValidationErrors::single(auth.field(), auth.message());

				tracing::debug!("login rejected: {auth}");

				(StatusCode::BAD_REQUEST, Json(json!({ "errors": form_errors(&errors) })))
					.into_response()
			},
			Error::NotFound { resource, id } => {
				tracing::debug!("{resource} `{id}` not found");

				(StatusCode::NOT_FOUND, "Resource not found.").into_response()
			},
			Error::LookupFailed { reason } => {
				tracing::warn!("song lookup failed: {reason}");

				(StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": "Song not found." })))
					.into_response()
			},
			other => {
				tracing::error!("request failed: {other}");

				(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error.").into_response()
			},
		}
	}
}

/// Expands field errors so every form field is present, empty when it passed.
fn form_errors(errors: &ValidationErrors) -> BTreeMap<String, String> {
	let mut map = FORM_FIELDS
		.iter()
		.map(|field| (field.to_string(), String::new()))
		.collect::<BTreeMap<_, _>>();

	for (field, reason) in errors.iter() {
		map.insert(field.to_owned(), reason.to_owned());
	}

	map
}
