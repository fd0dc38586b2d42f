//! OAuth2 Provider Client
//!
//! A generic HTTP request sender paired with an OAuth2 client that drives
//! the three-legged authorization-code flow against heterogeneous providers.
//!
//! The sender abstracts method selection, parameter encoding, header
//! merging, cookie persistence and transport error capture; the client
//! composes endpoint templates, builds authorization URLs, exchanges codes
//! and fetches protected resources, delegating all I/O to the sender.
//! Provider differences — credential placement, token placement, URL
//! quirks — are configuration, not code paths.
//!
//! # Example
//!
//! ```rust,ignore
//! use oauth2_provider_client::{
//!     AccessTokenType, AuthType, ClientOptions, Endpoints, OAuth2Client, RequestOptions,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut client = OAuth2Client::with_options(
//!         "my-client-id",
//!         "my-client-secret",
//!         Endpoints::new()
//!             .callback("https://myapp.example/cb")
//!             .auth("https://provider.example/authorize")
//!             .token("https://provider.example/token")
//!             .api("https://provider.example/api/"),
//!         ClientOptions {
//!             auth_type: AuthType::Basic,
//!             ..ClientOptions::default()
//!         },
//!     )?;
//!
//!     // Redirect the user here and receive the code on your callback.
//!     let auth_url = client.authorization_url(&[])?;
//!     println!("visit: {auth_url}");
//!
//!     let body = client.exchange_code("code-from-callback", RequestOptions::default()).await?;
//!     let token = parse_token_from(&body); // provider-specific
//!     client.set_access_token(token, AccessTokenType::Bearer);
//!
//!     let profile = client.fetch("me", RequestOptions::default()).await?;
//!     println!("{profile}");
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - `sender`: the generic request sender and its transport configuration
//! - `client`: the OAuth2 client built on the sender
//! - `types`: enumerated configuration (auth types, token types, endpoints)
//! - `providers`: preset endpoint tables for known providers
//! - `urls`: the shared textual URL composition policy
//! - `error`: error hierarchy

pub mod client;
pub mod error;
pub mod providers;
pub mod sender;
pub mod types;
pub mod urls;

// Re-export the client
pub use client::{OAuth2Client, RequestOptions};

// Re-export the sender
pub use sender::{
    CookieMode, HttpRequestSender, Method, MockRequestSender, Params, RecordedRequest,
    RequestOutcome, SendRequest, TransportConfig, DEFAULT_USER_AGENT,
};

// Re-export errors
pub use error::{ConfigurationError, Error, Result, TransportError};

// Re-export types
pub use types::{
    AccessTokenType, AuthType, ClientOptions, EndpointKind, Endpoints, GrantType,
};
