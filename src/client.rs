//! OAuth2 Client
//!
//! Drives the three-legged OAuth2 flow against heterogeneous providers:
//! authorization URL construction, authorization-code exchange, and
//! access-token-bearing resource fetches. All network I/O is delegated to
//! an owned request sender; provider differences (credential placement,
//! token placement, URL quirks) are configuration, not code paths.

use base64::Engine;
use secrecy::{ExposeSecret, SecretString};

use crate::error::{ConfigurationError, Error};
use crate::sender::{HttpRequestSender, Method, Params, SendRequest};
use crate::types::{AccessTokenType, AuthType, ClientOptions, EndpointKind, Endpoints};
use crate::urls;

/// Per-call overrides for token exchange and resource fetch.
#[derive(Clone, Debug, Default)]
pub struct RequestOptions {
    /// Extra request parameters; they win over the defaults on key
    /// collision.
    pub params: Vec<(String, String)>,
    /// Extra request headers, appended after any the client adds.
    pub headers: Vec<(String, String)>,
    /// Method override; token exchange defaults to POST, fetch to GET.
    pub method: Option<Method>,
}

/// OAuth2 client, generic over the request sender so tests can script one.
pub struct OAuth2Client<S: SendRequest = HttpRequestSender> {
    client_id: String,
    client_secret: SecretString,
    endpoints: Endpoints,
    options: ClientOptions,
    access_token: String,
    access_token_type: AccessTokenType,
    sender: S,
}

impl OAuth2Client<HttpRequestSender> {
    /// Create a client with default options and a default sender.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        endpoints: Endpoints,
    ) -> Result<Self, Error> {
        Self::with_options(client_id, client_secret, endpoints, ClientOptions::default())
    }

    /// Create a client with explicit options and a default sender.
    pub fn with_options(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        endpoints: Endpoints,
        options: ClientOptions,
    ) -> Result<Self, Error> {
        Ok(Self::with_sender(
            client_id,
            client_secret,
            endpoints,
            options,
            HttpRequestSender::new()?,
        ))
    }
}

impl<S: SendRequest> OAuth2Client<S> {
    /// Create a client around a caller-supplied sender.
    pub fn with_sender(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        endpoints: Endpoints,
        options: ClientOptions,
        sender: S,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: SecretString::new(client_secret.into()),
            endpoints,
            options,
            access_token: String::new(),
            access_token_type: AccessTokenType::default(),
            sender,
        }
    }

    /// The sender this client issues requests through.
    pub fn sender(&self) -> &S {
        &self.sender
    }

    /// Behaviour options the client was built with.
    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// The current access token; empty until [`Self::set_access_token`].
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// Build the URL to redirect the user to for authorization.
    ///
    /// Default parameters are `response_type=code` and `client_id`, plus
    /// `scope` when configured and `redirect_uri` when a callback endpoint
    /// exists. `extra_params` win on key collision.
    pub fn authorization_url(&self, extra_params: &[(String, String)]) -> Result<String, Error> {
        let auth_url = self.endpoint(EndpointKind::Auth).ok_or(
            ConfigurationError::MissingEndpoint {
                endpoint: EndpointKind::Auth,
            },
        )?;

        let mut params = vec![
            ("response_type".to_string(), "code".to_string()),
            ("client_id".to_string(), self.client_id.clone()),
        ];
        if let Some(scope) = &self.options.scope {
            if !scope.is_empty() {
                params.push(("scope".to_string(), scope.clone()));
            }
        }
        if let Some(callback) = self.endpoint(EndpointKind::Callback) {
            params.push(("redirect_uri".to_string(), callback));
        }
        merge_params(&mut params, extra_params);

        urls::compose(&auth_url, "", &urls::encode_pairs(&params))
    }

    /// Exchange an authorization code for an access token.
    ///
    /// The caller extracts the code from its own callback handling and
    /// passes it in; an empty code is sent to the provider rather than
    /// rejected locally. Returns the raw provider response body — parsing
    /// the token payload (and any provider error payload) is the caller's
    /// job.
    pub async fn exchange_code(
        &self,
        code: &str,
        options: RequestOptions,
    ) -> Result<String, Error> {
        let token_url = self.endpoint(EndpointKind::Token).ok_or(
            ConfigurationError::MissingEndpoint {
                endpoint: EndpointKind::Token,
            },
        )?;

        let mut params = vec![
            (
                "grant_type".to_string(),
                self.options.grant_type.as_str().to_string(),
            ),
            ("code".to_string(), code.to_string()),
        ];
        if let Some(callback) = self.endpoint(EndpointKind::Callback) {
            params.push(("redirect_uri".to_string(), callback));
        }

        let mut headers: Vec<(String, String)> = Vec::new();
        match self.options.auth_type {
            AuthType::Uri | AuthType::Form => {
                params.push(("client_id".to_string(), self.client_id.clone()));
                params.push((
                    "client_secret".to_string(),
                    self.client_secret.expose_secret().to_string(),
                ));
            }
            AuthType::Basic => {
                params.push(("client_id".to_string(), self.client_id.clone()));
                let credentials = format!(
                    "{}:{}",
                    self.client_id,
                    self.client_secret.expose_secret()
                );
                let encoded = base64::engine::general_purpose::STANDARD.encode(credentials);
                headers.push(("Authorization".to_string(), format!("Basic {encoded}")));
            }
        }

        merge_params(&mut params, &options.params);
        headers.extend(options.headers);

        let method = options.method.unwrap_or(Method::Post);
        if self.options.append_params_to_token_url {
            // Provider quirk: everything in the URL, empty body.
            let url = urls::compose(&token_url, "", &urls::encode_pairs(&params))?;
            self.sender.request(&url, method, Params::None, headers).await
        } else {
            self.sender
                .request(&token_url, method, Params::Pairs(params), headers)
                .await
        }
    }

    /// Fetch a protected resource, attaching the access token per the
    /// configured placement.
    ///
    /// When an `api` endpoint is configured, `path` is appended to it;
    /// otherwise `path` is used as the full URL.
    pub async fn fetch(&self, path: &str, options: RequestOptions) -> Result<String, Error> {
        let method = options.method.unwrap_or(Method::Get);
        let url = match self.endpoint(EndpointKind::Api) {
            Some(api) => urls::compose(&api, path, "")?,
            None => path.to_string(),
        };

        let mut params = options.params;
        let mut headers = options.headers;
        match self.access_token_type {
            AccessTokenType::Uri => {
                params.push(("access_token".to_string(), self.access_token.clone()));
            }
            AccessTokenType::Bearer => {
                headers.push((
                    "Authorization".to_string(),
                    format!("Bearer {}", self.access_token),
                ));
            }
            AccessTokenType::OAuth => {
                headers.push((
                    "Authorization".to_string(),
                    format!("OAuth {}", self.access_token),
                ));
            }
            AccessTokenType::Mac => {
                return Err(ConfigurationError::MacTokensUnsupported.into());
            }
        }

        let params = if params.is_empty() {
            Params::None
        } else {
            Params::Pairs(params)
        };
        self.sender.request(&url, method, params, headers).await
    }

    /// Set the access token and its placement together.
    ///
    /// No format validation is performed; repeated calls leave only the
    /// most recent pair effective.
    pub fn set_access_token(&mut self, token: impl Into<String>, token_type: AccessTokenType) {
        self.access_token = token.into();
        self.access_token_type = token_type;
    }

    /// Endpoint URL for a role, with `{CLIENT_ID}`, `{CLIENT_SECRET}` and
    /// `{ACCESS_TOKEN}` substituted literally. `None` when the role is not
    /// configured. An unset access token substitutes as the empty string.
    pub fn endpoint(&self, kind: EndpointKind) -> Option<String> {
        let template = self.endpoints.get(kind)?;
        Some(
            template
                .replace("{CLIENT_ID}", &self.client_id)
                .replace("{CLIENT_SECRET}", self.client_secret.expose_secret())
                .replace("{ACCESS_TOKEN}", &self.access_token),
        )
    }
}

/// Merge `extra` into `base`; `extra` wins on key collision and keeps the
/// colliding key's original position.
fn merge_params(base: &mut Vec<(String, String)>, extra: &[(String, String)]) {
    for (key, value) in extra {
        match base.iter_mut().find(|(existing, _)| existing == key) {
            Some(slot) => slot.1 = value.clone(),
            None => base.push((key.clone(), value.clone())),
        }
    }
}
