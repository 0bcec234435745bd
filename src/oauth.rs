//! OAuth 1.0a request signing (HMAC-SHA1).
//!
//! The provider's web login hands out OAuth1 tokens, and every API call after
//! that has to carry a signed `Authorization` header. Signature base strings
//! follow RFC 5849 §3.4.1: query and form parameters are included, the body
//! of any other content type is not.

use base64::prelude::*;
use hmac::{Hmac, Mac};
use rand::distributions::Alphanumeric;
use rand::Rng;
use sha1::Sha1;
use url::Url;

type HmacSha1 = Hmac<Sha1>;

pub const SIGNATURE_METHOD: &str = "HMAC-SHA1";
pub const OAUTH_VERSION: &str = "1.0";

/// Consumer key pair identifying the client application
#[derive(Debug, Clone)]
pub struct ConsumerKey {
    pub key: String,
    pub secret: String,
}

/// Request or access token issued by the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub key: String,
    pub secret: String,
}

/// Percent-encode per RFC 3986, leaving only unreserved characters.
pub fn encode(s: &str) -> String {
    urlencoding::encode(s).into_owned()
}

/// Scheme, authority and path with default ports dropped and no query.
pub fn base_url(url: &Url) -> String {
    let mut out = format!("{}://{}", url.scheme(), url.host_str().unwrap_or_default());
    if let Some(port) = url.port() {
        out.push(':');
        out.push_str(&port.to_string());
    }
    out.push_str(url.path());
    out
}

/// Build the signature base string for a request.
///
/// `params` holds the oauth_* protocol parameters and any form fields; the
/// query string is taken from `url` itself.
pub fn signature_base_string(method: &str, url: &Url, params: &[(String, String)]) -> String {
    let mut pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (encode(&k), encode(&v)))
        .chain(params.iter().map(|(k, v)| (encode(k), encode(v))))
        .collect();
    pairs.sort();

    let normalized = pairs
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    format!(
        "{}&{}&{}",
        method.to_uppercase(),
        encode(&base_url(url)),
        encode(&normalized)
    )
}

/// HMAC-SHA1 over the base string, base64 encoded.
pub fn sign(
    base_string: &str,
    consumer_secret: &str,
    token_secret: &str,
) -> Result<String, hmac::digest::InvalidLength> {
    let key = format!("{}&{}", encode(consumer_secret), encode(token_secret));
    let mut mac = HmacSha1::new_from_slice(key.as_bytes())?;
    mac.update(base_string.as_bytes());
    Ok(BASE64_STANDARD.encode(mac.finalize().into_bytes()))
}

pub fn nonce() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(30)
        .map(char::from)
        .collect()
}

pub fn timestamp() -> String {
    chrono::Utc::now().timestamp().to_string()
}

/// Everything needed to sign one request.
pub struct Signer<'a> {
    pub consumer: &'a ConsumerKey,
    pub token: Option<&'a Token>,
    /// Extra protocol parameters such as `oauth_callback` or `oauth_verifier`
    pub extra: Vec<(&'static str, String)>,
}

impl<'a> Signer<'a> {
    pub fn new(consumer: &'a ConsumerKey, token: Option<&'a Token>) -> Self {
        Self {
            consumer,
            token,
            extra: Vec::new(),
        }
    }

    pub fn with_param(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.extra.push((name, value.into()));
        self
    }

    /// Produce the `Authorization` header value for a request.
    pub fn authorization(
        &self,
        method: &str,
        url: &Url,
        form: &[(String, String)],
    ) -> Result<String, hmac::digest::InvalidLength> {
        self.authorization_with(method, url, form, &nonce(), &timestamp())
    }

    pub fn authorization_with(
        &self,
        method: &str,
        url: &Url,
        form: &[(String, String)],
        nonce: &str,
        timestamp: &str,
    ) -> Result<String, hmac::digest::InvalidLength> {
        let mut oauth: Vec<(String, String)> = vec![
            ("oauth_nonce".into(), nonce.into()),
            ("oauth_timestamp".into(), timestamp.into()),
            ("oauth_version".into(), OAUTH_VERSION.into()),
            ("oauth_signature_method".into(), SIGNATURE_METHOD.into()),
            ("oauth_consumer_key".into(), self.consumer.key.clone()),
        ];
        if let Some(token) = self.token {
            oauth.push(("oauth_token".into(), token.key.clone()));
        }
        for (name, value) in &self.extra {
            oauth.push(((*name).into(), value.clone()));
        }

        let mut all = oauth.clone();
        all.extend(form.iter().cloned());
        let base = signature_base_string(method, url, &all);
        let token_secret = self.token.map(|t| t.secret.as_str()).unwrap_or("");
        let signature = sign(&base, &self.consumer.secret, token_secret)?;
        oauth.push(("oauth_signature".into(), signature));

        let fields = oauth
            .iter()
            .map(|(k, v)| format!("{}=\"{}\"", encode(k), encode(v)))
            .collect::<Vec<_>>()
            .join(", ");
        Ok(format!("OAuth {}", fields))
    }
}

/// Parse a form-encoded token response (`oauth_token=..&oauth_token_secret=..`).
pub fn parse_token_response(body: &str) -> Option<Token> {
    let mut key = None;
    let mut secret = None;
    for (k, v) in url::form_urlencoded::parse(body.trim().as_bytes()) {
        match k.as_ref() {
            "oauth_token" => key = Some(v.into_owned()),
            "oauth_token_secret" => secret = Some(v.into_owned()),
            _ => {}
        }
    }
    Some(Token {
        key: key?,
        secret: secret?,
    })
}
