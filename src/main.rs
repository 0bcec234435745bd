use std::path::PathBuf;
use std::sync::Arc;

use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use nlziet_lib::cache::EpisodeCache;
use nlziet_lib::config::AppConfig;
use nlziet_lib::dialog::{ConsoleDialog, Dialog, ADDON_NAME, ALERT_SETUP};
use nlziet_lib::player::PlaybackItem;
use nlziet_lib::router::{MenuItem, Route};
use nlziet_lib::transport::ReqwestTransport;
use nlziet_lib::{Catalog, PluginError, Session};

const PLUGIN_BASE_URL: &str = "plugin://plugin.video.nlziet/";

#[derive(clap::Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Config file to use instead of the per-user one
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// List live channels
    Channels,
    /// Resolve a playable stream for a channel or on-demand item
    Play {
        #[arg(long, conflicts_with = "vod", required_unless_present = "vod")]
        channel: Option<String>,
        #[arg(long)]
        vod: Option<String>,
    },
    /// List the user's playlists
    Playlists,
    /// List the items of one playlist
    Playlist { id: String },
    /// List the "watch later" playlist
    WatchLater,
    /// List favorite series and refresh the episode cache
    Favorites,
    /// List cached episodes of a favorite series
    Series { title: String },
    /// Run a plugin paramstring, e.g. "action=play&channel=npo1"
    Route { params: String },
    /// Show where the config lives and whether an account is set
    Check,
}

impl Command {
    fn route(&self) -> Result<Option<Route>, PluginError> {
        let route = match self {
            Command::Channels => Route::Listing(MenuItem::Channels),
            Command::Play { channel: Some(channel), .. } => Route::PlayChannel(channel.clone()),
            Command::Play { vod: Some(vod), .. } => Route::PlayVod(vod.clone()),
            Command::WatchLater => Route::Listing(MenuItem::WatchLater),
            Command::Favorites => Route::Listing(MenuItem::Favorites),
            Command::Series { title } => Route::Serie(title.clone()),
            Command::Route { params } => Route::parse(params)?,
            Command::Play { .. } | Command::Playlists | Command::Playlist { .. } | Command::Check => {
                return Ok(None)
            }
        };
        Ok(Some(route))
    }
}

#[tokio::main]
async fn main() {
    use clap::Parser;
    let args = Args::parse();
    init_logging(args.verbose, args.quiet);

    if let Err(err) = run(args).await {
        match err.downcast_ref::<PluginError>() {
            Some(e) => eprintln!("{}", e.diagnostics()),
            None => eprintln!("{:?}", err),
        }
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}

/// The file `run` actually reads: `--config` when given, else the per-user one.
fn config_source(explicit: Option<&std::path::Path>) -> Option<PathBuf> {
    explicit.map(PathBuf::from).or_else(AppConfig::config_path)
}

async fn run(args: Args) -> Result<(), anyhow::Error> {
    let config = match &args.config {
        Some(path) => {
            let mut config = AppConfig::load_from(path)?;
            config.apply_env();
            config
        }
        None => AppConfig::load()?,
    };
    let dialog: Arc<dyn Dialog> = Arc::new(ConsoleDialog);

    if matches!(args.command, Some(Command::Check)) {
        match config_source(args.config.as_deref()) {
            Some(path) => println!("Config path: {}", path.display()),
            None => println!("Could not determine config path."),
        }
        println!("Account configured: {}", config.has_credentials());
        if let Some(path) = config.episode_cache_path() {
            println!("Episode cache: {}", EpisodeCache::new(path).path().display());
        }
        return Ok(());
    }

    if !config.has_credentials() {
        dialog.ok(ADDON_NAME, ALERT_SETUP);
        return Ok(());
    }

    // No token is kept between runs, so every invocation logs in again
    let mut session = Session::from_config(&config, Arc::new(ReqwestTransport::new()), dialog);
    if let Err(e) = session.login(&config.credentials()).await {
        if e.reported {
            return Ok(());
        }
        return Err(PluginError::from(e).into());
    }

    let catalog = Catalog::new(&session)?.with_watch_later_lookup(config.watch_later_lookup);
    let cache = EpisodeCache::new(
        config
            .episode_cache_path()
            .ok_or_else(|| anyhow::anyhow!("Cannot determine cache directory"))?,
    );

    match &args.command {
        Some(Command::Playlists) => {
            for playlist in catalog.list_user_playlists().await? {
                let title = playlist.title.as_deref().unwrap_or(&playlist.kind);
                println!("{}\t{}\t{}", playlist.id, playlist.kind, title);
            }
            Ok(())
        }
        Some(Command::Playlist { id }) => {
            for item in catalog.user_playlist(id).await? {
                print_item(&item);
            }
            Ok(())
        }
        Some(command) => match command.route()? {
            Some(route) => run_route(&catalog, &cache, route).await,
            None => Ok(()),
        },
        None => run_route(&catalog, &cache, Route::Root).await,
    }
}

async fn run_route(catalog: &Catalog<'_>, cache: &EpisodeCache, route: Route) -> Result<(), anyhow::Error> {
    match route {
        Route::Root => {
            for item in MenuItem::all() {
                println!("{}\t{}", item.label(), Route::Listing(*item).plugin_url(PLUGIN_BASE_URL));
            }
        }
        Route::Listing(MenuItem::Channels) => {
            for channel in catalog.list_channels().await? {
                println!(
                    "{}\t{}\t{}",
                    channel.title,
                    Route::PlayChannel(channel.url_friendly_name.clone()).plugin_url(PLUGIN_BASE_URL),
                    catalog.channel_logo_url(&channel)?
                );
            }
        }
        Route::Listing(MenuItem::WatchLater) => {
            for item in catalog.watch_later().await? {
                print_item(&item);
            }
        }
        Route::Listing(MenuItem::Favorites) => {
            for series in catalog.list_favorite_series(cache).await? {
                println!(
                    "{} ({} episodes)\t{}",
                    series.title,
                    series.items.len(),
                    Route::Serie(series.title.clone()).plugin_url(PLUGIN_BASE_URL)
                );
            }
        }
        Route::Serie(title) => {
            for cached in cache.list_serie(&title)? {
                print_item(&cached.episode);
            }
        }
        Route::PlayChannel(channel) => {
            print_playback(&PlaybackItem::from_handshake(&catalog.channel_stream(&channel).await?));
        }
        Route::PlayVod(content_id) => {
            print_playback(&PlaybackItem::from_handshake(&catalog.vod_stream(&content_id).await?));
        }
    }
    Ok(())
}

fn print_item(item: &nlziet_lib::api::PlaylistItem) {
    let season = item.season_number.map(|s| format!("S{:02}", s)).unwrap_or_default();
    println!(
        "{}\t{}\t{}\t{}\t{}",
        item.display_title(),
        season,
        item.broadcast_date.as_deref().unwrap_or(""),
        Route::PlayVod(item.content_id.to_string()).plugin_url(PLUGIN_BASE_URL),
        item.image_path().unwrap_or_default()
    );
}

fn print_playback(item: &PlaybackItem) {
    println!("{}", item.manifest_url);
    for (key, value) in item.properties() {
        println!("{}={}", key, value);
    }
}
