pub const ADDON_NAME: &str = "NLZIET";

pub const ALERT_SETUP: &str =
    "Voor gebruik dien je eerst (via de configuratie) je accountgegevens in te stellen.";
pub const ALERT_LOGIN_ERROR: &str = "Fout opgetreden tijdens inloggen, controleer accountgegevens.";

/// Blocking "OK" dialog offered by whatever hosts the plugin.
pub trait Dialog: Send + Sync {
    fn ok(&self, heading: &str, text: &str);
}

/// Prints dialogs to stderr.
#[derive(Debug, Default)]
pub struct ConsoleDialog;

impl Dialog for ConsoleDialog {
    fn ok(&self, heading: &str, text: &str) {
        eprintln!("[{}] {}", heading, text);
    }
}
