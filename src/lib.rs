pub mod api;
pub mod cache;
pub mod config;
pub mod dialog;
pub mod endpoints;
pub mod errors;
pub mod flex_id;
pub mod oauth;
pub mod player;
pub mod router;
pub mod session;
pub mod transport;

pub use api::Catalog;
pub use errors::{AuthError, PluginError};
pub use session::{AuthState, Session};
