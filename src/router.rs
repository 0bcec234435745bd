//! Plugin command surface: `action=<a>` plus one of `channel`, `vod` or
//! `menu_item`. An empty paramstring opens the root menu.

use std::collections::HashMap;

use crate::errors::{PluginError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    Channels,
    WatchLater,
    Favorites,
}

impl MenuItem {
    pub fn as_str(&self) -> &'static str {
        match self {
            MenuItem::Channels => "channels",
            MenuItem::WatchLater => "watch_later",
            MenuItem::Favorites => "favorites",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MenuItem::Channels => "Live TV",
            MenuItem::WatchLater => "Later kijken",
            MenuItem::Favorites => "Favoriete series",
        }
    }

    pub fn all() -> &'static [MenuItem] {
        &[MenuItem::Channels, MenuItem::WatchLater, MenuItem::Favorites]
    }

    fn parse(s: &str) -> Option<Self> {
        MenuItem::all().iter().copied().find(|m| m.as_str() == s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Root,
    Listing(MenuItem),
    /// Episodes of one favorite series, looked up in the episode cache by title
    Serie(String),
    PlayChannel(String),
    PlayVod(String),
}

impl Route {
    /// Parse a paramstring, with or without its leading `?`.
    pub fn parse(paramstring: &str) -> Result<Self> {
        let trimmed = paramstring.strip_prefix('?').unwrap_or(paramstring);
        let params: HashMap<String, String> = url::form_urlencoded::parse(trimmed.as_bytes())
            .into_owned()
            .collect();
        if params.is_empty() {
            return Ok(Route::Root);
        }

        let invalid = || PluginError::InvalidRoute(paramstring.to_string());
        let action = params.get("action").ok_or_else(invalid)?;
        let menu_item = params.get("menu_item");

        match action.as_str() {
            "play" => {
                if let Some(channel) = params.get("channel") {
                    Ok(Route::PlayChannel(channel.clone()))
                } else if let Some(vod) = params.get("vod") {
                    Ok(Route::PlayVod(vod.clone()))
                } else {
                    Err(invalid())
                }
            }
            "listing" => menu_item
                .and_then(|m| MenuItem::parse(m))
                .map(Route::Listing)
                .ok_or_else(invalid),
            "serie" => menu_item.cloned().map(Route::Serie).ok_or_else(invalid),
            _ => Err(invalid()),
        }
    }

    /// Paramstring that routes back here, without the leading `?`.
    pub fn to_query(&self) -> String {
        let mut query = url::form_urlencoded::Serializer::new(String::new());
        match self {
            Route::Root => {}
            Route::Listing(item) => {
                query.append_pair("action", "listing").append_pair("menu_item", item.as_str());
            }
            Route::Serie(title) => {
                query.append_pair("action", "serie").append_pair("menu_item", title);
            }
            Route::PlayChannel(channel) => {
                query.append_pair("action", "play").append_pair("channel", channel);
            }
            Route::PlayVod(vod) => {
                query.append_pair("action", "play").append_pair("vod", vod);
            }
        }
        query.finish()
    }

    /// Plugin URL for calling the plugin recursively.
    pub fn plugin_url(&self, base: &str) -> String {
        format!("{}?{}", base, self.to_query())
    }
}
