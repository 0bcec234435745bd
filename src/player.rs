use crate::api::StreamHandshake;
use crate::transport::USER_AGENT;

pub const MANIFEST_TYPE: &str = "mpd";
pub const LICENSE_TYPE: &str = "com.widevine.alpha";
pub const INPUTSTREAM_ADDON: &str = "inputstream.adaptive";

/// License key in the adaptive-stream player's
/// `url|headers|challenge|response` notation.
pub fn license_key(license_server_url: &str) -> String {
    format!(
        "{}|Content-Type=&User-Agent={}|R{{SSM}}|",
        license_server_url, USER_AGENT
    )
}

/// What the host player needs to start a DRM stream
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackItem {
    pub manifest_url: String,
    pub license_key: String,
}

impl PlaybackItem {
    pub fn from_handshake(stream: &StreamHandshake) -> Self {
        Self {
            manifest_url: stream.uri.clone(),
            license_key: license_key(stream.license_server_url()),
        }
    }

    /// Player properties in the order the host expects them set
    pub fn properties(&self) -> Vec<(&'static str, String)> {
        vec![
            ("inputstreamaddon", INPUTSTREAM_ADDON.to_string()),
            ("inputstream.adaptive.manifest_type", MANIFEST_TYPE.to_string()),
            ("inputstream.adaptive.license_type", LICENSE_TYPE.to_string()),
            ("inputstream.adaptive.license_key", self.license_key.clone()),
        ]
    }
}
