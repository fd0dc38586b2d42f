//! Provider Presets
//!
//! Convenience factories pre-populating endpoint sets and quirk options for
//! known providers. Pure configuration data; all behaviour lives in
//! [`OAuth2Client`].

use crate::client::OAuth2Client;
use crate::error::Error;
use crate::types::{ClientOptions, Endpoints};

/// Tencent Weibo (open.t.qq.com).
///
/// The api endpoint embeds the client id as `oauth_consumer_key` through a
/// `{CLIENT_ID}` placeholder.
pub fn qq(
    client_id: impl Into<String>,
    client_secret: impl Into<String>,
    callback: impl Into<String>,
) -> Result<OAuth2Client, Error> {
    OAuth2Client::new(
        client_id,
        client_secret,
        Endpoints::new()
            .callback(callback)
            .auth("https://open.t.qq.com/cgi-bin/oauth2/authorize")
            .token("https://open.t.qq.com/cgi-bin/oauth2/access_token")
            .api("https://open.t.qq.com/api/?oauth_version=2.a&oauth_consumer_key={CLIENT_ID}"),
    )
}

/// Sina Weibo (api.weibo.com).
///
/// Requires an empty POST body on token exchange, with every parameter in
/// the URL.
pub fn weibo(
    client_id: impl Into<String>,
    client_secret: impl Into<String>,
    callback: impl Into<String>,
) -> Result<OAuth2Client, Error> {
    OAuth2Client::with_options(
        client_id,
        client_secret,
        Endpoints::new()
            .callback(callback)
            .auth("https://api.weibo.com/oauth2/authorize")
            .token("https://api.weibo.com/oauth2/access_token")
            .api("https://api.weibo.com/2/"),
        ClientOptions {
            append_params_to_token_url: true,
            ..ClientOptions::default()
        },
    )
}

/// Renren (graph.renren.com).
pub fn renren(
    client_id: impl Into<String>,
    client_secret: impl Into<String>,
    callback: impl Into<String>,
) -> Result<OAuth2Client, Error> {
    OAuth2Client::new(
        client_id,
        client_secret,
        Endpoints::new()
            .callback(callback)
            .auth("https://graph.renren.com/oauth/authorize")
            .token("https://graph.renren.com/oauth/token")
            .api("https://api.renren.com/v2/"),
    )
}
