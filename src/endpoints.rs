use serde::{Deserialize, Serialize};
use url::Url;

use crate::errors::{PluginError, Result};

const PLAYER_NAME_QUERY: &str = "playerName=NLZIET%20Meister%20Player%20Web";

/// Provider endpoints. Every field can be overridden from the config file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Endpoints {
    pub request_token: String,
    pub login: String,
    pub authorize: String,
    pub access_token: String,
    pub channels: String,
    pub user_playlists: String,
    pub favorite_series: String,
    /// Live handshake base; the channel id is appended as a path segment
    pub live_stream: String,
    /// VOD handshake base; the content id is appended as a path segment
    pub vod_stream: String,
    pub channel_logos: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            request_token: "https://www.nlziet.nl/OAuth/GetRequestToken".to_string(),
            login: "https://www.nlziet.nl/Account/AppLogin".to_string(),
            authorize: "https://www.nlziet.nl/OAuth/Authorize".to_string(),
            access_token: "http://www.nlziet.nl/OAuth/GetAccessToken".to_string(),
            channels: "https://api.nlziet.nl/v6/epg/channels".to_string(),
            user_playlists: "https://api.nlziet.nl/v6/userplaylists".to_string(),
            favorite_series: "https://api.nlziet.nl/v6/favorites/series".to_string(),
            live_stream: format!(
                "https://api.nlziet.nl/v6/stream/handshake/Widevine/dash/Live?{}",
                PLAYER_NAME_QUERY
            ),
            vod_stream: format!(
                "https://api.nlziet.nl/v6/stream/handshake/Widevine/dash/VOD?{}",
                PLAYER_NAME_QUERY
            ),
            channel_logos: "https://nlzietprodstorage.blob.core.windows.net/static/channel-logos"
                .to_string(),
        }
    }
}

/// Parse a base endpoint and append `segment` to its path, keeping any query.
///
/// The identifier is percent-encoded as a single segment, so ids containing
/// `/`, `?` or `{` can never alter the rest of the URL.
pub fn with_segment(base: &str, segment: &str) -> Result<Url> {
    let mut url = Url::parse(base)?;
    url.path_segments_mut()
        .map_err(|_| PluginError::Url(format!("{} cannot take path segments", base)))?
        .pop_if_empty()
        .push(segment);
    Ok(url)
}

impl Endpoints {
    pub fn request_token_url(&self) -> Result<Url> {
        Ok(Url::parse(&self.request_token)?)
    }

    pub fn login_url(&self) -> Result<Url> {
        Ok(Url::parse(&self.login)?)
    }

    pub fn authorize_url(&self, request_token: &str) -> Result<Url> {
        let mut url = Url::parse(&self.authorize)?;
        url.query_pairs_mut().append_pair("oauth_token", request_token);
        Ok(url)
    }

    pub fn access_token_url(&self) -> Result<Url> {
        Ok(Url::parse(&self.access_token)?)
    }

    pub fn channels_url(&self) -> Result<Url> {
        Ok(Url::parse(&self.channels)?)
    }

    pub fn user_playlists_url(&self) -> Result<Url> {
        Ok(Url::parse(&self.user_playlists)?)
    }

    pub fn user_playlist_url(&self, id: &str) -> Result<Url> {
        with_segment(&self.user_playlists, id)
    }

    pub fn favorite_series_url(&self) -> Result<Url> {
        Ok(Url::parse(&self.favorite_series)?)
    }

    pub fn channel_stream_url(&self, url_friendly_name: &str) -> Result<Url> {
        with_segment(&self.live_stream, url_friendly_name)
    }

    pub fn vod_stream_url(&self, content_id: &str) -> Result<Url> {
        with_segment(&self.vod_stream, content_id)
    }

    pub fn channel_logo_url(&self, url_friendly_name: &str) -> Result<Url> {
        with_segment(&self.channel_logos, &format!("{}.png", url_friendly_name))
    }
}
