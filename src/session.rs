//! Provider login and the signed session that results from it.
//!
//! The provider runs a three-legged OAuth1 variant where the "user
//! authorization" leg is a plain form login: fetch a request token, post the
//! account form (the login page expects the cookie from the first call),
//! follow the authorize redirect to learn the verifier, then trade everything
//! for an access token.

use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::{AppConfig, Credentials};
use crate::dialog::{Dialog, ADDON_NAME, ALERT_LOGIN_ERROR};
use crate::endpoints::Endpoints;
use crate::errors::{AuthError, AuthStage, PluginError, Result};
use crate::oauth::{self, ConsumerKey, Signer, Token};
use crate::transport::{HttpRequest, HttpResponse, Transport};

const OAUTH_CALLBACK: &str = "null";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    Unauthenticated,
    RequestTokenObtained {
        request_token: Token,
    },
    AuthorizationSubmitted {
        request_token: Token,
        verifier: Option<String>,
    },
    Authenticated {
        access_token: Token,
    },
    LoginFailed {
        stage: AuthStage,
    },
}

pub struct Session {
    transport: Arc<dyn Transport>,
    dialog: Arc<dyn Dialog>,
    consumer: ConsumerKey,
    endpoints: Endpoints,
    state: AuthState,
}

impl Session {
    pub fn new(
        transport: Arc<dyn Transport>,
        dialog: Arc<dyn Dialog>,
        consumer: ConsumerKey,
        endpoints: Endpoints,
    ) -> Self {
        Self {
            transport,
            dialog,
            consumer,
            endpoints,
            state: AuthState::Unauthenticated,
        }
    }

    pub fn from_config(
        config: &AppConfig,
        transport: Arc<dyn Transport>,
        dialog: Arc<dyn Dialog>,
    ) -> Self {
        Self::new(transport, dialog, config.consumer(), config.endpoints.clone())
    }

    pub fn state(&self) -> &AuthState {
        &self.state
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub fn is_logged_in(&self) -> bool {
        matches!(self.state, AuthState::Authenticated { .. })
    }

    pub fn access_token(&self) -> Option<&Token> {
        match &self.state {
            AuthState::Authenticated { access_token } => Some(access_token),
            _ => None,
        }
    }

    /// Run the full login flow.
    ///
    /// Only a failed access-token exchange is shown to the user (the returned
    /// error then has `reported` set). Failures in the earlier legs are
    /// returned as-is for the caller to abort on.
    pub async fn login(&mut self, credentials: &Credentials) -> Result<(), AuthError> {
        self.state = AuthState::Unauthenticated;
        info!(user = %credentials.username, "logging in");

        let request_token = match self.fetch_request_token().await {
            Ok(token) => token,
            Err(e) => return Err(self.fail(AuthStage::RequestToken, e)),
        };
        debug!("request token obtained");
        self.state = AuthState::RequestTokenObtained {
            request_token: request_token.clone(),
        };

        if let Err(e) = self.submit_account(&request_token, credentials).await {
            return Err(self.fail(AuthStage::AccountLogin, e));
        }

        let (request_token, verifier) = match self.authorize(&request_token).await {
            Ok(parts) => parts,
            Err(e) => return Err(self.fail(AuthStage::Authorize, e)),
        };
        debug!(has_verifier = verifier.is_some(), "authorization submitted");
        self.state = AuthState::AuthorizationSubmitted {
            request_token: request_token.clone(),
            verifier: verifier.clone(),
        };

        match self.fetch_access_token(&request_token, verifier).await {
            Ok(access_token) => {
                info!("logged in");
                self.state = AuthState::Authenticated { access_token };
                Ok(())
            }
            Err(e) => Err(self.fail(AuthStage::AccessToken, e)),
        }
    }

    fn fail(&mut self, stage: AuthStage, cause: PluginError) -> AuthError {
        warn!(%stage, error = %cause, "login failed");
        self.state = AuthState::LoginFailed { stage };
        let mut err = AuthError::new(stage, cause);
        if err.is_recoverable() {
            self.dialog.ok(ADDON_NAME, ALERT_LOGIN_ERROR);
            err.reported = true;
        }
        err
    }

    async fn fetch_request_token(&self) -> Result<Token> {
        let url = self.endpoints.request_token_url()?;
        let signer = Signer::new(&self.consumer, None).with_param("oauth_callback", OAUTH_CALLBACK);
        let resp = self
            .send_signed(HttpRequest::post(url), signer)
            .await?
            .error_for_status()?;
        oauth::parse_token_response(&resp.body)
            .ok_or_else(|| PluginError::Parse("request token response lacks oauth_token".to_string()))
    }

    async fn submit_account(&self, request_token: &Token, credentials: &Credentials) -> Result<()> {
        let url = self.endpoints.login_url()?;
        let request = HttpRequest::post(url).with_form(credentials.form());
        let resp = self
            .send_signed(request, Signer::new(&self.consumer, Some(request_token)))
            .await?;
        // The page answers 200 even for bad passwords; the access-token leg tells.
        if !resp.is_success() {
            warn!(status = resp.status, "login page returned an error status");
        }
        Ok(())
    }

    /// Returns the token named in the final redirect URL, paired with the
    /// request token secret, and the verifier if the provider sent one.
    async fn authorize(&self, request_token: &Token) -> Result<(Token, Option<String>)> {
        let url = self.endpoints.authorize_url(&request_token.key)?;
        let resp = self
            .send_signed(HttpRequest::get(url), Signer::new(&self.consumer, Some(request_token)))
            .await?;
        debug!(final_url = %resp.final_url, "authorize redirect resolved");
        parse_authorization_response(&resp.final_url, request_token)
    }

    async fn fetch_access_token(
        &self,
        request_token: &Token,
        verifier: Option<String>,
    ) -> Result<Token> {
        let verifier = verifier
            .ok_or_else(|| PluginError::Parse("authorize redirect lacks oauth_verifier".to_string()))?;
        let url = self.endpoints.access_token_url()?;
        let signer =
            Signer::new(&self.consumer, Some(request_token)).with_param("oauth_verifier", verifier);
        let resp = self
            .send_signed(HttpRequest::post(url), signer)
            .await?
            .error_for_status()?;
        oauth::parse_token_response(&resp.body)
            .ok_or_else(|| PluginError::Parse("access token response lacks oauth_token".to_string()))
    }

    async fn send_signed(&self, mut request: HttpRequest, signer: Signer<'_>) -> Result<HttpResponse> {
        let authorization = signer
            .authorization(request.method.as_str(), &request.url, &request.form)
            .map_err(|e| PluginError::Http(format!("cannot sign request: {}", e)))?;
        request.authorization = Some(authorization);
        self.transport.send(request).await
    }

    /// Signed GET with the access token, parsed as JSON.
    pub async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let token = self.access_token().ok_or(PluginError::NotAuthenticated)?;
        debug!(%url, "GET");
        let resp = self
            .send_signed(HttpRequest::get(url), Signer::new(&self.consumer, Some(token)))
            .await?
            .error_for_status()?;
        resp.json()
    }
}

fn parse_authorization_response(url: &Url, request_token: &Token) -> Result<(Token, Option<String>)> {
    let mut key = None;
    let mut verifier = None;
    for (k, v) in url.query_pairs() {
        match k.as_ref() {
            "oauth_token" => key = Some(v.into_owned()),
            "oauth_verifier" => verifier = Some(v.into_owned()),
            _ => {}
        }
    }
    let key = key.ok_or_else(|| PluginError::Parse(format!("no oauth_token in {}", url)))?;
    Ok((
        Token {
            key,
            secret: request_token.secret.clone(),
        },
        verifier,
    ))
}
