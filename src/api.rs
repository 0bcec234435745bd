use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

use crate::cache::EpisodeCache;
use crate::config::WatchLaterLookup;
use crate::errors::{PluginError, Result};
use crate::flex_id::FlexId;
use crate::session::Session;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Channel {
    pub title: String,
    /// Stable identifier used in stream and logo URLs
    pub url_friendly_name: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PlaylistSummary {
    #[serde(rename = "Id")]
    pub id: FlexId,
    #[serde(rename = "Type", default)]
    pub kind: String,
    #[serde(rename = "Title", default)]
    pub title: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "PascalCase")]
pub struct PlaylistItem {
    /// Stream identifier for the VOD handshake
    pub content_id: FlexId,
    #[serde(default)]
    pub program_title: Option<String>,
    #[serde(default)]
    pub episode_title: Option<String>,
    #[serde(default)]
    pub season_number: Option<i32>,
    #[serde(default)]
    pub broadcast_date: Option<String>,
    /// Seconds
    #[serde(default)]
    pub duration: Option<i64>,
    /// Image path as sent by the provider; use `image_path()` for display
    #[serde(default)]
    pub image: Option<String>,
}

impl PlaylistItem {
    /// The provider hands out `/thumbnail/` paths while its CDN serves them
    /// from `/thumbnails/`.
    pub fn image_path(&self) -> Option<String> {
        self.image
            .as_ref()
            .map(|path| path.replace("/thumbnail/", "/thumbnails/"))
    }

    pub fn display_title(&self) -> String {
        match (&self.program_title, &self.episode_title) {
            (Some(program), Some(episode)) if !episode.is_empty() => {
                format!("{} - {}", program, episode)
            }
            (Some(program), _) => program.clone(),
            (None, Some(episode)) => episode.clone(),
            (None, None) => self.content_id.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct FavoriteSeries {
    pub title: String,
    #[serde(default, alias = "Episodes")]
    pub items: Vec<PlaylistItem>,
}

/// The provider returns either a bare item list or a playlist object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PlaylistBody {
    Items(Vec<PlaylistItem>),
    Playlist {
        #[serde(rename = "Items", default)]
        items: Vec<PlaylistItem>,
    },
}

impl PlaylistBody {
    fn into_items(self) -> Vec<PlaylistItem> {
        match self {
            PlaylistBody::Items(items) => items,
            PlaylistBody::Playlist { items } => items,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WidevineConfig {
    pub drm_server_url: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DrmConfig {
    pub widevine: WidevineConfig,
}

/// Answer of a stream handshake: manifest plus license server
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StreamHandshake {
    pub uri: String,
    pub drm_config: DrmConfig,
}

impl StreamHandshake {
    pub fn license_server_url(&self) -> &str {
        &self.drm_config.widevine.drm_server_url
    }
}

/// Pick the playlist that plays the "watch later" role.
///
/// `Positional` trusts that the provider lists it first and ignores `Type`
/// entirely; this mirrors what the web player does and breaks silently if the
/// order ever changes.
pub fn select_watch_later(
    playlists: &[PlaylistSummary],
    lookup: WatchLaterLookup,
) -> Result<&PlaylistSummary> {
    let found = match lookup {
        WatchLaterLookup::Positional => playlists.first(),
        WatchLaterLookup::ByType => playlists.iter().find(|p| p.kind == "WatchLater"),
    };
    found.ok_or_else(|| PluginError::NotFound("watch later playlist".to_string()))
}

/// Read-only provider calls made with a logged-in session.
pub struct Catalog<'a> {
    session: &'a Session,
    watch_later: WatchLaterLookup,
}

impl<'a> Catalog<'a> {
    pub fn new(session: &'a Session) -> Result<Self> {
        if !session.is_logged_in() {
            return Err(PluginError::NotAuthenticated);
        }
        Ok(Self {
            session,
            watch_later: WatchLaterLookup::default(),
        })
    }

    pub fn with_watch_later_lookup(mut self, lookup: WatchLaterLookup) -> Self {
        self.watch_later = lookup;
        self
    }

    pub async fn list_channels(&self) -> Result<Vec<Channel>> {
        let url = self.session.endpoints().channels_url()?;
        let channels: Vec<Channel> = self.session.get_json(url).await?;
        info!(count = channels.len(), "channels listed");
        Ok(channels)
    }

    pub fn channel_logo_url(&self, channel: &Channel) -> Result<Url> {
        self.session
            .endpoints()
            .channel_logo_url(&channel.url_friendly_name)
    }

    pub async fn channel_stream(&self, url_friendly_name: &str) -> Result<StreamHandshake> {
        let url = self.session.endpoints().channel_stream_url(url_friendly_name)?;
        debug!(channel = url_friendly_name, "live handshake");
        self.session.get_json(url).await
    }

    pub async fn vod_stream(&self, content_id: &str) -> Result<StreamHandshake> {
        let url = self.session.endpoints().vod_stream_url(content_id)?;
        debug!(content_id, "vod handshake");
        self.session.get_json(url).await
    }

    pub async fn list_user_playlists(&self) -> Result<Vec<PlaylistSummary>> {
        let url = self.session.endpoints().user_playlists_url()?;
        self.session.get_json(url).await
    }

    pub async fn user_playlist(&self, id: &str) -> Result<Vec<PlaylistItem>> {
        let url = self.session.endpoints().user_playlist_url(id)?;
        let body: PlaylistBody = self.session.get_json(url).await?;
        Ok(body.into_items())
    }

    pub async fn watch_later(&self) -> Result<Vec<PlaylistItem>> {
        let playlists = self.list_user_playlists().await?;
        let chosen = select_watch_later(&playlists, self.watch_later)?;
        debug!(id = %chosen.id, kind = %chosen.kind, "watch later playlist chosen");
        self.user_playlist(&chosen.id.to_string()).await
    }

    /// Fetch favorite series and overwrite the episode cache with their episodes.
    pub async fn list_favorite_series(&self, cache: &EpisodeCache) -> Result<Vec<FavoriteSeries>> {
        let url = self.session.endpoints().favorite_series_url()?;
        let series: Vec<FavoriteSeries> = self.session.get_json(url).await?;
        let written = cache.write(&series)?;
        info!(series = series.len(), episodes = written, "favorite series listed");
        Ok(series)
    }
}
