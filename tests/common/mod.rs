#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use url::Url;

use nlziet_lib::config::Credentials;
use nlziet_lib::dialog::Dialog;
use nlziet_lib::endpoints::Endpoints;
use nlziet_lib::errors::{PluginError, Result};
use nlziet_lib::oauth::ConsumerKey;
use nlziet_lib::transport::{HttpRequest, HttpResponse, Transport};
use nlziet_lib::Session;

pub const CALLBACK_URL: &str =
    "https://www.nlziet.nl/OAuth/Callback?oauth_token=req&oauth_verifier=ver";

#[derive(Clone)]
enum Reply {
    Respond {
        status: u16,
        body: String,
        final_url: Option<String>,
    },
    Fail(String),
}

/// Keeps every dialog that was shown.
#[derive(Debug, Default)]
pub struct RecordingDialog {
    shown: Mutex<Vec<String>>,
}

impl RecordingDialog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shown(&self) -> Vec<String> {
        self.shown
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

impl Dialog for RecordingDialog {
    fn ok(&self, _heading: &str, text: &str) {
        if let Ok(mut guard) = self.shown.lock() {
            guard.push(text.to_string());
        }
    }
}

/// Answers requests by URL path and remembers every request it saw.
#[derive(Default)]
pub struct FakeProvider {
    routes: Mutex<Vec<(String, Reply)>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl FakeProvider {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// A provider whose four login legs all succeed.
    pub fn with_login() -> Arc<Self> {
        let provider = Self::new();
        provider.respond("/OAuth/GetRequestToken", 200, "oauth_token=req&oauth_token_secret=reqsecret&oauth_callback_confirmed=true");
        provider.respond("/Account/AppLogin", 200, "<html>ok</html>");
        provider.redirect("/OAuth/Authorize", CALLBACK_URL);
        provider.respond("/OAuth/GetAccessToken", 200, "oauth_token=acc&oauth_token_secret=accsecret");
        provider
    }

    pub fn respond(&self, path: &str, status: u16, body: &str) {
        self.set(
            path,
            Reply::Respond {
                status,
                body: body.to_string(),
                final_url: None,
            },
        );
    }

    pub fn respond_json(&self, path: &str, body: serde_json::Value) {
        self.respond(path, 200, &body.to_string());
    }

    pub fn redirect(&self, path: &str, final_url: &str) {
        self.set(
            path,
            Reply::Respond {
                status: 200,
                body: String::new(),
                final_url: Some(final_url.to_string()),
            },
        );
    }

    pub fn fail(&self, path: &str, reason: &str) {
        self.set(path, Reply::Fail(reason.to_string()));
    }

    fn set(&self, path: &str, reply: Reply) {
        let mut routes = self.routes.lock().unwrap();
        routes.retain(|(p, _)| p != path);
        routes.push((path.to_string(), reply));
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn paths(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|r| r.url.path().to_string())
            .collect()
    }
}

#[async_trait]
impl Transport for FakeProvider {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.requests.lock().unwrap().push(request.clone());
        let reply = self
            .routes
            .lock()
            .unwrap()
            .iter()
            .find(|(path, _)| path == request.url.path())
            .map(|(_, reply)| reply.clone());

        match reply {
            Some(Reply::Respond {
                status,
                body,
                final_url,
            }) => Ok(HttpResponse {
                status,
                final_url: final_url
                    .map(|u| Url::parse(&u).unwrap())
                    .unwrap_or(request.url),
                body,
            }),
            Some(Reply::Fail(reason)) => Err(PluginError::Http(reason)),
            None => Ok(HttpResponse {
                status: 404,
                final_url: request.url,
                body: "not found".to_string(),
            }),
        }
    }
}

pub fn consumer() -> ConsumerKey {
    ConsumerKey {
        key: "key".to_string(),
        secret: "secret".to_string(),
    }
}

pub fn credentials() -> Credentials {
    Credentials::new("kijker@example.nl", "geheim")
}

pub fn session(provider: &Arc<FakeProvider>, dialog: &Arc<RecordingDialog>) -> Session {
    Session::new(
        provider.clone(),
        dialog.clone(),
        consumer(),
        Endpoints::default(),
    )
}

pub async fn logged_in_session(provider: &Arc<FakeProvider>) -> Session {
    let dialog = Arc::new(RecordingDialog::new());
    let mut session = session(provider, &dialog);
    session.login(&credentials()).await.unwrap();
    session
}
