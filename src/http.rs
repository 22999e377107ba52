//! Transport primitives shared by token exchanges and Web API calls.
//!
//! [`ReqwestHttpClient`] hands out [`InstrumentedHandle`]s for the `oauth2` facade and issues
//! bearer-authenticated API requests directly. Both paths record the HTTP status and any
//! `Retry-After` hint in a [`ResponseMetadataSlot`] so failures can be classified with the same
//! metadata.

// crates.io
use oauth2::{AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse};
use reqwest::{
	StatusCode,
	header::{HeaderMap, RETRY_AFTER},
};
use serde::de::DeserializeOwned;
use time::format_description::well_known::Rfc2822;
// self
use crate::{
	_prelude::*,
	error::{TransientError, TransportError},
};

/// Captures metadata from the most recent HTTP response for downstream error mapping.
#[derive(Clone, Debug, Default)]
pub struct ResponseMetadata {
	/// HTTP status code returned by the upstream, if available.
	pub status: Option<u16>,
	/// Retry-After hint expressed as a relative duration.
	pub retry_after: Option<Duration>,
}

/// Thread-safe slot for sharing [`ResponseMetadata`] between transport and error layers.
///
/// A fresh slot is created per request; the transport stores into it once headers arrive and the
/// caller takes the value right after the request resolves.
#[derive(Clone, Debug, Default)]
pub struct ResponseMetadataSlot(Arc<Mutex<Option<ResponseMetadata>>>);
impl ResponseMetadataSlot {
	/// Stores new metadata for the current request.
	pub fn store(&self, meta: ResponseMetadata) {
		*self.0.lock() = Some(meta);
	}

	/// Returns the captured metadata, if any, consuming it from the slot.
	pub fn take(&self) -> Option<ResponseMetadata> {
		self.0.lock().take()
	}
}

/// Buffered Web API response.
#[derive(Clone, Debug)]
pub struct ApiResponse {
	/// Status and retry metadata.
	pub metadata: ResponseMetadata,
	/// Raw response body.
	pub body: Vec<u8>,
}
impl ApiResponse {
	/// Returns the HTTP status code.
	pub fn status(&self) -> u16 {
		self.metadata.status.unwrap_or_default()
	}

	/// Returns true for `204 No Content`.
	pub fn is_no_content(&self) -> bool {
		self.status() == StatusCode::NO_CONTENT.as_u16()
	}

	/// Decodes a successful JSON body.
	///
	/// Non-2xx statuses become [`TransientError::Upstream`]; shape mismatches become
	/// [`TransientError::ResponseParse`] carrying the failing JSON path.
	pub fn json<T>(&self) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let status = self.metadata.status;

		if !(200..300).contains(&self.status()) {
			return Err(TransientError::Upstream {
				message: format!(
					"Web API returned status {}: {}",
					self.status(),
					String::from_utf8_lossy(&self.body).trim()
				),
				status,
				retry_after: self.metadata.retry_after,
			}
			.into());
		}

		let mut de = serde_json::Deserializer::from_slice(&self.body);

		serde_path_to_error::deserialize(&mut de)
			.map_err(|source| TransientError::ResponseParse { source, status }.into())
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// Token requests should not follow redirects; configure any custom client accordingly, because
/// it is handed straight to the `oauth2` crate.
#[derive(Clone, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Builds an instrumented handle that captures response metadata into `slot`.
	pub fn with_metadata(&self, slot: ResponseMetadataSlot) -> InstrumentedHandle {
		InstrumentedHandle::new(self.0.clone(), slot)
	}

	/// Issues `GET url` with a bearer token and buffers the response.
	pub async fn get_authorized(&self, url: Url, access_token: &str) -> Result<ApiResponse> {
		let response =
			self.0.get(url).bearer_auth(access_token).send().await.map_err(map_send_error)?;
		let status = response.status();
		let retry_after = parse_retry_after(response.headers());
		let body = response.bytes().await.map_err(TransportError::from)?.to_vec();

		Ok(ApiResponse {
			metadata: ResponseMetadata { status: Some(status.as_u16()), retry_after },
			body,
		})
	}
}
impl Debug for ReqwestHttpClient {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("ReqwestHttpClient(..)")
	}
}

struct InstrumentedHttpClient {
	client: ReqwestClient,
	slot: ResponseMetadataSlot,
}

/// [`AsyncHttpClient`] handle returned by [`ReqwestHttpClient::with_metadata`].
#[derive(Clone)]
pub struct InstrumentedHandle(Arc<InstrumentedHttpClient>);
impl InstrumentedHandle {
	fn new(client: ReqwestClient, slot: ResponseMetadataSlot) -> Self {
		Self(Arc::new(InstrumentedHttpClient { client, slot }))
	}
}
impl<'c> AsyncHttpClient<'c> for InstrumentedHandle {
	type Error = HttpClientError<ReqwestError>;
	type Future =
		Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'c + Send + Sync>>;

	fn call(&'c self, request: HttpRequest) -> Self::Future {
		let client = Arc::clone(&self.0);

		Box::pin(async move {
			client.slot.take();

			let response = client
				.client
				.execute(request.try_into().map_err(Box::new)?)
				.await
				.map_err(Box::new)?;
			let status = response.status();
			let headers = response.headers().to_owned();
			let retry_after = parse_retry_after(&headers);

			client.slot.store(ResponseMetadata { status: Some(status.as_u16()), retry_after });

			let mut response_new =
				HttpResponse::new(response.bytes().await.map_err(Box::new)?.to_vec());

			*response_new.status_mut() = status;
			*response_new.headers_mut() = headers;

			Ok(response_new)
		})
	}
}

fn map_send_error(err: ReqwestError) -> Error {
	if err.is_timeout() {
		return TransientError::Upstream {
			message: "Request timed out while calling the Web API".into(),
			status: err.status().map(|code| code.as_u16()),
			retry_after: None,
		}
		.into();
	}

	TransportError::from(err).into()
}

pub(crate) fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
	let value = headers.get(RETRY_AFTER)?;
	let raw = value.to_str().ok()?.trim();

	if let Ok(secs) = raw.parse::<u64>() {
		return i64::try_from(secs).ok().map(Duration::seconds);
	}
	if let Ok(moment) = OffsetDateTime::parse(raw, &Rfc2822) {
		let delta = moment - OffsetDateTime::now_utc();

		if delta.is_positive() {
			return Some(delta);
		}
	}

	None
}

#[cfg(test)]
mod tests {
	// crates.io
	use reqwest::header::HeaderValue;
	// self
	use super::*;

	#[test]
	fn retry_after_accepts_delta_seconds() {
		let mut headers = HeaderMap::new();

		headers.insert(RETRY_AFTER, HeaderValue::from_static("7"));

		assert_eq!(parse_retry_after(&headers), Some(Duration::seconds(7)));
		assert_eq!(parse_retry_after(&HeaderMap::new()), None);
	}

	#[test]
	fn retry_after_ignores_seconds_beyond_duration_range() {
		let mut headers = HeaderMap::new();

		headers.insert(RETRY_AFTER, HeaderValue::from_static("18446744073709551615"));

		assert_eq!(parse_retry_after(&headers), None);

		headers.insert(RETRY_AFTER, HeaderValue::from_static("9223372036854775807"));

		assert_eq!(parse_retry_after(&headers), Some(Duration::seconds(i64::MAX)));
	}

	#[test]
	fn api_response_rejects_error_statuses() {
		let response = ApiResponse {
			metadata: ResponseMetadata {
				status: Some(429),
				retry_after: Some(Duration::seconds(3)),
			},
			body: b"slow down".to_vec(),
		};
		let err = response.json::<serde_json::Value>().expect_err("429 should not decode.");

		assert!(matches!(
			err,
			Error::Transient(TransientError::Upstream {
				status: Some(429),
				retry_after: Some(_),
				..
			})
		));
	}

	#[test]
	fn api_response_reports_parse_path() {
		#[derive(Debug, Deserialize)]
		struct Shape {
			#[allow(dead_code)]
			tracks: Vec<u8>,
		}

		let response = ApiResponse {
			metadata: ResponseMetadata { status: Some(200), retry_after: None },
			body: br#"{"tracks":"nope"}"#.to_vec(),
		};
		let err = response.json::<Shape>().expect_err("Mismatched shape should fail.");

		match err {
			Error::Transient(TransientError::ResponseParse { source, status }) => {
				assert_eq!(source.path().to_string(), "tracks");
				assert_eq!(status, Some(200));
			},
			other => panic!("Unexpected error: {other:?}"),
		}
	}
}
