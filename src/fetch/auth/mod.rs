//! Feed authentication.
//!
//! Most open-data feeds need no credentials. Providers that do either expect
//! the key as a query parameter ([`UrlParam`]) or as a header ([`ApiKey`]).

mod api_key;
mod url_param;

pub use api_key::ApiKey;
pub use url_param::{UrlParam, append_query_param};

use std::fmt;

use serde::Deserialize;

/// How the feed endpoints expect the API key, as written in the config file:
///
/// ```json
/// { "type": "url_param", "param_name": "api_key", "key": "..." }
/// { "type": "header", "header_name": "Authorization", "key": "Bearer ..." }
/// ```
#[derive(Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeedAuth {
    #[default]
    None,
    UrlParam {
        param_name: String,
        #[serde(default)]
        key: String,
    },
    Header {
        header_name: String,
        #[serde(default)]
        key: String,
    },
}

impl FeedAuth {
    /// Replaces the key of a configured scheme. No-op for [`FeedAuth::None`].
    pub fn set_key(&mut self, new_key: String) {
        match self {
            FeedAuth::None => {}
            FeedAuth::UrlParam { key, .. } | FeedAuth::Header { key, .. } => *key = new_key,
        }
    }
}

// Keys stay out of logs.
impl fmt::Debug for FeedAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedAuth::None => f.write_str("None"),
            FeedAuth::UrlParam { param_name, .. } => f
                .debug_struct("UrlParam")
                .field("param_name", param_name)
                .finish_non_exhaustive(),
            FeedAuth::Header { header_name, .. } => f
                .debug_struct("Header")
                .field("header_name", header_name)
                .finish_non_exhaustive(),
        }
    }
}
