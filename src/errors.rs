use thiserror::Error;

/// Login stage, in the order the provider expects them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStage {
    /// Fetching the unauthorized request token
    RequestToken,
    /// Posting the account form to the interactive login page
    AccountLogin,
    /// Following the authorize redirect to obtain the verifier
    Authorize,
    /// Exchanging request token and verifier for an access token
    AccessToken,
}

impl std::fmt::Display for AuthStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl AuthStage {
    pub fn display_name(&self) -> &'static str {
        match self {
            AuthStage::RequestToken => "Request Token",
            AuthStage::AccountLogin => "Account Login",
            AuthStage::Authorize => "Authorize",
            AuthStage::AccessToken => "Access Token",
        }
    }

    /// Get actionable suggestion for fixing the issue at this stage
    pub fn suggestion(&self) -> &'static str {
        match self {
            AuthStage::RequestToken => {
                "The provider did not hand out a request token. Check the consumer key and the internet connection."
            }
            AuthStage::AccountLogin => {
                "The login page could not be reached. Try again later."
            }
            AuthStage::Authorize => {
                "The authorize redirect did not carry a token. The login form may have changed."
            }
            AuthStage::AccessToken => {
                "Email or password is incorrect. Verify your account settings."
            }
        }
    }
}

/// Failure of one login stage.
#[derive(Debug, Error)]
#[error("login failed at {stage}: {reason}")]
pub struct AuthError {
    pub stage: AuthStage,
    pub reason: String,
    /// Set once the failure has been shown to the user through a dialog.
    pub reported: bool,
}

impl AuthError {
    pub fn new(stage: AuthStage, reason: impl std::fmt::Display) -> Self {
        Self {
            stage,
            reason: reason.to_string(),
            reported: false,
        }
    }

    /// Only the access-token exchange is recovered into a user alert.
    pub fn is_recoverable(&self) -> bool {
        self.stage == AuthStage::AccessToken
    }
}

/// Error type for provider and plugin operations
#[derive(Debug, Error)]
pub enum PluginError {
    /// Email or password not set
    #[error("No account configured")]
    Configuration,

    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Catalog used before the session holds an access token
    #[error("Session is not authenticated")]
    NotAuthenticated,

    #[error("Nothing found: {0}")]
    NotFound(String),

    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Server returned an error status
    #[error("Server returned {0} for {1}")]
    Status(u16, String),

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Invalid URL: {0}")]
    Url(String),

    #[error("Episode cache error: {0}")]
    Cache(String),

    #[error("Invalid paramstring: {0}!")]
    InvalidRoute(String),
}

impl From<reqwest::Error> for PluginError {
    fn from(e: reqwest::Error) -> Self {
        PluginError::Http(e.to_string())
    }
}

impl From<serde_json::Error> for PluginError {
    fn from(e: serde_json::Error) -> Self {
        PluginError::Parse(e.to_string())
    }
}

impl From<url::ParseError> for PluginError {
    fn from(e: url::ParseError) -> Self {
        PluginError::Url(e.to_string())
    }
}

impl From<std::io::Error> for PluginError {
    fn from(e: std::io::Error) -> Self {
        PluginError::Cache(e.to_string())
    }
}

impl PluginError {
    /// Get detailed diagnostic information about the error
    pub fn diagnostics(&self) -> String {
        match self {
            PluginError::Configuration => {
                "Configuration Error\nSuggestion: Set email and password in the config file".to_string()
            }
            PluginError::Auth(e) => {
                format!("Login Failed at {}\nError: {}\nSuggestion: {}", e.stage.display_name(), e.reason, e.stage.suggestion())
            }
            PluginError::NotAuthenticated => {
                "Not Logged In\nSuggestion: Log in before requesting streams".to_string()
            }
            PluginError::NotFound(what) => {
                format!("Not Found\nWhat: {}", what)
            }
            PluginError::Http(source) => {
                format!("HTTP Error\nError: {}\nSuggestion: Check the internet connection", source)
            }
            PluginError::Status(status, url) => {
                format!("Server Error\nStatus: {}\nURL: {}\nSuggestion: Try again later", status, url)
            }
            PluginError::Parse(source) => {
                format!("Parse Error\nError: {}\nSuggestion: Provider response is invalid", source)
            }
            PluginError::Url(source) => {
                format!("URL Error\nError: {}\nSuggestion: Check the endpoint overrides in the config", source)
            }
            PluginError::Cache(source) => {
                format!("Cache Error\nError: {}\nSuggestion: List favorite series again to rebuild the cache", source)
            }
            PluginError::InvalidRoute(params) => {
                format!("Invalid Route\nParams: {}\nSuggestion: Use action=play with channel or vod, or action=listing with menu_item", params)
            }
        }
    }
}

pub type Result<T, E = PluginError> = std::result::Result<T, E>;
