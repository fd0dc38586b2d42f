//! Configuration Types
//!
//! Enumerated configuration for the OAuth2 client: endpoint roles, client
//! auth methods, access token placements, and grant types. Each enum is
//! closed, so every dispatch site is checked exhaustively at compile time.

use serde::{Deserialize, Serialize};

/// Logical endpoint role in a provider's [`Endpoints`] set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndpointKind {
    /// Callback URL the provider redirects to after authorization.
    Callback,
    /// Authorization URL the user is sent to for the authorization code.
    Auth,
    /// Token URL where the authorization code is exchanged.
    Token,
    /// Base URL for protected resource fetches.
    Api,
}

impl EndpointKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Callback => "callback",
            Self::Auth => "auth",
            Self::Token => "token",
            Self::Api => "api",
        }
    }
}

impl std::fmt::Display for EndpointKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provider endpoint URL templates.
///
/// Templates may embed `{CLIENT_ID}`, `{CLIENT_SECRET}` and `{ACCESS_TOKEN}`
/// placeholders; substitution happens at lookup time and never mutates the
/// template itself.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Endpoints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api: Option<String>,
}

impl Endpoints {
    /// Create an empty endpoint set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the callback URL.
    pub fn callback(mut self, url: impl Into<String>) -> Self {
        self.callback = Some(url.into());
        self
    }

    /// Set the authorization URL template.
    pub fn auth(mut self, url: impl Into<String>) -> Self {
        self.auth = Some(url.into());
        self
    }

    /// Set the token URL template.
    pub fn token(mut self, url: impl Into<String>) -> Self {
        self.token = Some(url.into());
        self
    }

    /// Set the API base URL template.
    pub fn api(mut self, url: impl Into<String>) -> Self {
        self.api = Some(url.into());
        self
    }

    /// Raw template for a role, without placeholder substitution.
    pub fn get(&self, kind: EndpointKind) -> Option<&str> {
        match kind {
            EndpointKind::Callback => self.callback.as_deref(),
            EndpointKind::Auth => self.auth.as_deref(),
            EndpointKind::Token => self.token.as_deref(),
            EndpointKind::Api => self.api.as_deref(),
        }
    }
}

/// How client credentials are attached to the token-exchange request.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthType {
    /// `client_id` and `client_secret` as ordinary request parameters.
    #[default]
    Uri,
    /// `client_id` as a parameter plus an `Authorization: Basic` header
    /// carrying `base64(client_id:client_secret)`.
    Basic,
    /// Same parameter placement as [`AuthType::Uri`]; kept distinct because
    /// some providers document it as a separate method.
    Form,
}

/// How the access token is attached to a resource-fetch request.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessTokenType {
    /// `access_token` as a query/body parameter.
    #[default]
    Uri,
    /// `Authorization: Bearer <token>` header.
    Bearer,
    /// `Authorization: OAuth <token>` header.
    OAuth,
    /// RFC 6749 MAC tokens. Not implemented; `fetch` rejects this variant.
    Mac,
}

/// OAuth2 grant type sent in the token-exchange request.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantType {
    #[default]
    AuthorizationCode,
    Password,
    ClientCredentials,
    RefreshToken,
}

impl GrantType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AuthorizationCode => "authorization_code",
            Self::Password => "password",
            Self::ClientCredentials => "client_credentials",
            Self::RefreshToken => "refresh_token",
        }
    }
}

/// Client behaviour options applied at construction.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ClientOptions {
    /// Client credential placement for token exchange.
    pub auth_type: AuthType,
    /// Grant type sent on token exchange.
    pub grant_type: GrantType,
    /// Scope added to the authorization URL when non-empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    /// Provider quirk: fold every token-exchange parameter into the token
    /// URL's query string and send an empty POST body.
    pub append_params_to_token_url: bool,
}
