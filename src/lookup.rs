//! Song Lookup: resolves free-text title/artist input against the music catalog.
//!
//! A lookup fetches a `client_credentials` token, searches the catalog for the top ten track
//! matches, and normalizes the first hit into a [`PostDraft`]. Both outbound calls are scheduled
//! on the shared [`OutboundLimiter`]. Any failure (no match, token rejection, transport or parse
//! error) surfaces as [`Error::LookupFailed`] so callers can report "song not found" instead of a
//! generic server error.

// self
use crate::{
	_prelude::*,
	broker::Broker,
	http::ReqwestHttpClient,
	limiter::OutboundLimiter,
	model::PostDraft,
	obs::{self, UpstreamCall},
};

const SEARCH_PATH: &str = "search";
const CURRENTLY_PLAYING_PATH: &str = "me/player/currently-playing";
const SEARCH_LIMIT: u8 = 10;

#[derive(Debug, Deserialize)]
struct SearchResponse {
	tracks: TrackPage,
}

#[derive(Debug, Deserialize)]
struct TrackPage {
	#[serde(default)]
	items: Vec<Track>,
}

#[derive(Debug, Deserialize)]
struct Track {
	name: String,
	#[serde(default)]
	artists: Vec<ArtistRef>,
	#[serde(default)]
	external_urls: ExternalUrls,
	#[serde(default)]
	album: Option<Album>,
	#[serde(default)]
	uri: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ArtistRef {
	name: String,
}

#[derive(Debug, Default, Deserialize)]
struct ExternalUrls {
	#[serde(default)]
	spotify: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Album {
	#[serde(default)]
	images: Vec<Image>,
}

#[derive(Debug, Deserialize)]
struct Image {
	url: String,
	#[serde(default)]
	width: Option<u32>,
	#[serde(default)]
	height: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct CurrentlyPlaying {
	#[serde(default)]
	item: Option<PlayingItem>,
}

#[derive(Debug, Deserialize)]
struct PlayingItem {
	name: String,
}

/// Catalog lookups routed through the broker and the shared limiter.
#[derive(Clone, Debug)]
pub struct SongLookup {
	broker: Arc<Broker>,
	http_client: ReqwestHttpClient,
	limiter: Arc<OutboundLimiter>,
}
impl SongLookup {
	/// Creates a lookup service.
	///
	/// `limiter` must be the same instance the broker schedules on so token and search calls
	/// share one queue.
	pub fn new(
		broker: Arc<Broker>,
		http_client: ReqwestHttpClient,
		limiter: Arc<OutboundLimiter>,
	) -> Self {
		Self { broker, http_client, limiter }
	}

	/// Resolves `(title, artist)` to the catalog's top match.
	pub async fn lookup(
		&self,
		title: &str,
		artist: &str,
		location: Option<String>,
	) -> Result<PostDraft> {
		self.search(title, artist, location).await.map_err(|e| match e {
			Error::LookupFailed { .. } => e,
			other => Error::lookup_failed(other.to_string()),
		})
	}

	/// Returns the name of the track the token's owner is playing, or `None` when idle.
	pub async fn currently_playing(&self, access_token: &str) -> Result<Option<String>> {
		let url = self.broker.descriptor.api_url(CURRENTLY_PLAYING_PATH)?;
		let response = obs::observe(
			UpstreamCall::CurrentlyPlaying,
			"currently_playing",
			self.limiter.schedule(|| self.http_client.get_authorized(url, access_token)),
		)
		.await
		.map_err(|e| Error::lookup_failed(e.to_string()))?;

		let success = (200..300).contains(&response.status());

		if response.is_no_content() || (success && response.body.is_empty()) {
			return Ok(None);
		}

		let playing = response
			.json::<CurrentlyPlaying>()
			.map_err(|e| Error::lookup_failed(e.to_string()))?;

		Ok(playing.item.map(|item| item.name))
	}

	async fn search(
		&self,
		title: &str,
		artist: &str,
		location: Option<String>,
	) -> Result<PostDraft> {
		let token = self.broker.client_credentials_token().await?;
		let url = search_url(&self.broker.descriptor.api_url(SEARCH_PATH)?, title, artist);
		let response = obs::observe(
			UpstreamCall::Search,
			"search",
			self.limiter.schedule(|| self.http_client.get_authorized(url, token.expose())),
		)
		.await?;
		let found = response.json::<SearchResponse>()?;
		let track = found.tracks.items.into_iter().next().ok_or_else(|| {
			Error::lookup_failed(format!("no catalog match for `{title}` by `{artist}`"))
		})?;

		draft_from_track(track, location)
	}
}

/// Builds `search?q=track:<title>%20artist:<artist>&type=track&limit=10`.
///
/// Both terms are percent-encoded, so spaces become `%20`.
fn search_url(base: &Url, title: &str, artist: &str) -> Url {
	let mut url = base.clone();
	let query = format!(
		"q=track:{}%20artist:{}&type=track&limit={SEARCH_LIMIT}",
		urlencoding::encode(title),
		urlencoding::encode(artist),
	);

	url.set_query(Some(&query));

	url
}

fn draft_from_track(track: Track, location: Option<String>) -> Result<PostDraft> {
	let artist = track
		.artists
		.into_iter()
		.next()
		.map(|artist| artist.name)
		.ok_or_else(|| Error::lookup_failed(format!("track `{}` has no artist", track.name)))?;
	let url =
		track.external_urls.spotify.filter(|url| !url.is_empty()).ok_or_else(|| {
			Error::lookup_failed(format!("track `{}` has no external link", track.name))
		})?;
	let thumbnail = track.album.and_then(|album| {
		album
			.images
			.into_iter()
			.min_by_key(|image| {
				u64::from(image.width.unwrap_or(u32::MAX)) * u64::from(image.height.unwrap_or(1))
			})
			.map(|image| image.url)
	});

	Ok(PostDraft {
		title: track.name,
		artist,
		url,
		likes: 0,
		location: location.filter(|value| !value.trim().is_empty()),
		thumbnail,
		uri: track.uri,
	})
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn search_url_escapes_terms() {
		let base = Url::parse("https://api.spotify.com/v1/search").expect("URL should parse.");
		let url = search_url(&base, "Here Comes the Sun", "The Beatles");

		assert_eq!(
			url.as_str(),
			"https://api.spotify.com/v1/search?q=track:Here%20Comes%20the%20Sun%20artist:The%20Beatles&type=track&limit=10"
		);
	}

	#[test]
	fn draft_picks_smallest_thumbnail() {
		let track: Track = serde_json::from_value(serde_json::json!({
			"name": "Yesterday - Remastered",
			"artists": [{ "name": "The Beatles" }, { "name": "Someone Else" }],
			"external_urls": { "spotify": "https://open.spotify.com/track/3BQHpFgAp4l80e1XslIjNI" },
			"uri": "spotify:track:3BQHpFgAp4l80e1XslIjNI",
			"album": { "images": [
				{ "url": "https://i.scdn.co/640", "width": 640, "height": 640 },
				{ "url": "https://i.scdn.co/64", "width": 64, "height": 64 },
				{ "url": "https://i.scdn.co/300", "width": 300, "height": 300 }
			]}
		}))
		.expect("Track fixture should deserialize.");
		let draft = draft_from_track(track, Some("Liverpool".into())).expect("Draft should build.");

		assert_eq!(draft.title, "Yesterday - Remastered");
		assert_eq!(draft.artist, "The Beatles");
		assert_eq!(draft.likes, 0);
		assert_eq!(draft.thumbnail.as_deref(), Some("https://i.scdn.co/64"));
		assert_eq!(draft.uri.as_deref(), Some("spotify:track:3BQHpFgAp4l80e1XslIjNI"));
		assert_eq!(draft.location.as_deref(), Some("Liverpool"));
	}

	#[test]
	fn draft_requires_an_external_link() {
		let track: Track = serde_json::from_value(serde_json::json!({
			"name": "Untitled",
			"artists": [{ "name": "Nobody" }]
		}))
		.expect("Track fixture should deserialize.");

		assert!(matches!(draft_from_track(track, None), Err(Error::LookupFailed { .. })));
	}
}
