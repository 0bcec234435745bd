mod common;

use serde_json::json;

use common::{logged_in_session, FakeProvider};
use nlziet_lib::cache::EpisodeCache;
use nlziet_lib::config::WatchLaterLookup;
use nlziet_lib::player::PlaybackItem;
use nlziet_lib::{Catalog, PluginError};

fn handshake(uri: &str) -> serde_json::Value {
    json!({
        "uri": uri,
        "drmConfig": { "widevine": { "drmServerUrl": "https://license.nlziet.nl/widevine" } }
    })
}

#[tokio::test]
async fn test_channels_keep_provider_order_and_feed_the_stream_url() {
    let provider = FakeProvider::with_login();
    provider.respond_json(
        "/v6/epg/channels",
        json!([
            {"Title": "BBC", "UrlFriendlyName": "bbc"},
            {"Title": "NPO", "UrlFriendlyName": "npo"}
        ]),
    );
    provider.respond_json(
        "/v6/stream/handshake/Widevine/dash/Live/bbc",
        handshake("https://cdn.nlziet.nl/bbc/manifest.mpd"),
    );
    let session = logged_in_session(&provider).await;
    let catalog = Catalog::new(&session).unwrap();

    let channels = catalog.list_channels().await.unwrap();
    let names: Vec<&str> = channels.iter().map(|c| c.url_friendly_name.as_str()).collect();
    assert_eq!(names, vec!["bbc", "npo"]);
    assert_eq!(channels[0].title, "BBC");

    let stream = catalog.channel_stream(&channels[0].url_friendly_name).await.unwrap();
    assert_eq!(stream.uri, "https://cdn.nlziet.nl/bbc/manifest.mpd");

    let last = provider.requests().pop().unwrap();
    assert_eq!(
        last.url.as_str(),
        "https://api.nlziet.nl/v6/stream/handshake/Widevine/dash/Live/bbc?playerName=NLZIET%20Meister%20Player%20Web"
    );
    let auth = last.authorization.unwrap();
    assert!(auth.contains("oauth_token=\"acc\""), "catalog calls use the access token");

    let playback = PlaybackItem::from_handshake(&stream);
    assert!(playback
        .license_key
        .starts_with("https://license.nlziet.nl/widevine|Content-Type=&User-Agent=Mozilla/5.0"));
    assert!(playback.license_key.ends_with("|R{SSM}|"));
}

#[tokio::test]
async fn test_channel_logo_url() {
    let provider = FakeProvider::with_login();
    provider.respond_json("/v6/epg/channels", json!([{"Title": "NPO 1", "UrlFriendlyName": "npo1"}]));
    let session = logged_in_session(&provider).await;
    let catalog = Catalog::new(&session).unwrap();

    let channels = catalog.list_channels().await.unwrap();
    assert_eq!(
        catalog.channel_logo_url(&channels[0]).unwrap().as_str(),
        "https://nlzietprodstorage.blob.core.windows.net/static/channel-logos/npo1.png"
    );
}

#[tokio::test]
async fn test_vod_stream_uses_vod_handshake() {
    let provider = FakeProvider::with_login();
    provider.respond_json(
        "/v6/stream/handshake/Widevine/dash/VOD/AT_2098765",
        handshake("https://cdn.nlziet.nl/vod/manifest.mpd"),
    );
    let session = logged_in_session(&provider).await;
    let catalog = Catalog::new(&session).unwrap();

    let stream = catalog.vod_stream("AT_2098765").await.unwrap();
    assert_eq!(stream.uri, "https://cdn.nlziet.nl/vod/manifest.mpd");
    assert_eq!(stream.license_server_url(), "https://license.nlziet.nl/widevine");
}

fn playlists() -> serde_json::Value {
    json!([
        {"Id": 1, "Type": "WatchLater"},
        {"Id": 2, "Type": "Watched"}
    ])
}

#[tokio::test]
async fn test_watch_later_is_the_first_playlist() {
    let provider = FakeProvider::with_login();
    provider.respond_json("/v6/userplaylists", playlists());
    provider.respond_json("/v6/userplaylists/1", json!({"Items": [{"ContentId": "later-1"}]}));
    provider.respond_json("/v6/userplaylists/2", json!({"Items": [{"ContentId": "watched-1"}]}));
    let session = logged_in_session(&provider).await;
    let catalog = Catalog::new(&session).unwrap();

    let items = catalog.watch_later().await.unwrap();
    assert_eq!(items[0].content_id.to_string(), "later-1");
    assert!(provider.paths().contains(&"/v6/userplaylists/1".to_string()));
}

#[tokio::test]
async fn test_watch_later_ignores_type_when_positional() {
    // Positional lookup picks index 0 even when its Type says otherwise
    let provider = FakeProvider::with_login();
    provider.respond_json(
        "/v6/userplaylists",
        json!([
            {"Id": 1, "Type": "Watched"},
            {"Id": 2, "Type": "WatchLater"}
        ]),
    );
    provider.respond_json("/v6/userplaylists/1", json!([{"ContentId": "watched-1"}]));
    provider.respond_json("/v6/userplaylists/2", json!([{"ContentId": "later-1"}]));
    let session = logged_in_session(&provider).await;

    let positional = Catalog::new(&session).unwrap();
    assert_eq!(positional.watch_later().await.unwrap()[0].content_id.to_string(), "watched-1");

    let by_type = Catalog::new(&session)
        .unwrap()
        .with_watch_later_lookup(WatchLaterLookup::ByType);
    assert_eq!(by_type.watch_later().await.unwrap()[0].content_id.to_string(), "later-1");
}

#[tokio::test]
async fn test_watch_later_without_playlists() {
    let provider = FakeProvider::with_login();
    provider.respond_json("/v6/userplaylists", json!([]));
    let session = logged_in_session(&provider).await;
    let catalog = Catalog::new(&session).unwrap();

    assert!(matches!(catalog.watch_later().await, Err(PluginError::NotFound(_))));
}

#[tokio::test]
async fn test_favorite_series_rewrite_the_episode_cache() {
    let dir = tempfile::tempdir().unwrap();
    let cache = EpisodeCache::new(dir.path().join("episodes.json"));

    let provider = FakeProvider::with_login();
    provider.respond_json(
        "/v6/favorites/series",
        json!([
            {"Title": "Wie is de Mol?", "Items": [
                {"ContentId": "mol-1", "ProgramTitle": "Wie is de Mol?", "EpisodeTitle": "Aflevering 1", "SeasonNumber": 24, "Image": "/img/thumbnail/mol1.jpg"},
                {"ContentId": "mol-2", "ProgramTitle": "Wie is de Mol?", "EpisodeTitle": "Aflevering 2", "SeasonNumber": 24}
            ]},
            {"Title": "Zondag met Lubach", "Items": [
                {"ContentId": "zml-1", "ProgramTitle": "Zondag met Lubach"}
            ]}
        ]),
    );
    let session = logged_in_session(&provider).await;
    let catalog = Catalog::new(&session).unwrap();

    let series = catalog.list_favorite_series(&cache).await.unwrap();
    assert_eq!(series.len(), 2);

    let mol = cache.list_serie("Wie is de Mol?").unwrap();
    assert_eq!(mol.len(), 2);
    assert_eq!(mol[0].episode, series[0].items[0]);
    assert_eq!(mol[0].episode.image_path().as_deref(), Some("/img/thumbnails/mol1.jpg"));
    assert!(cache.list_serie("wie is de mol?").unwrap().is_empty(), "match is exact");

    // A second listing replaces, never appends
    provider.respond_json(
        "/v6/favorites/series",
        json!([{"Title": "Zondag met Lubach", "Items": [{"ContentId": "zml-2"}]}]),
    );
    catalog.list_favorite_series(&cache).await.unwrap();
    assert!(cache.list_serie("Wie is de Mol?").unwrap().is_empty());
    let zml = cache.list_serie("Zondag met Lubach").unwrap();
    assert_eq!(zml.len(), 1);
    assert_eq!(zml[0].episode.content_id.to_string(), "zml-2");
}

#[tokio::test]
async fn test_server_error_propagates() {
    let provider = FakeProvider::with_login();
    provider.respond("/v6/epg/channels", 503, "maintenance");
    let session = logged_in_session(&provider).await;
    let catalog = Catalog::new(&session).unwrap();

    assert!(matches!(catalog.list_channels().await, Err(PluginError::Status(503, _))));
}

#[tokio::test]
async fn test_malformed_json_is_a_parse_error() {
    let provider = FakeProvider::with_login();
    provider.respond("/v6/epg/channels", 200, "<html>login</html>");
    let session = logged_in_session(&provider).await;
    let catalog = Catalog::new(&session).unwrap();

    assert!(matches!(catalog.list_channels().await, Err(PluginError::Parse(_))));
}
