//! Gateway route table.
//!
//! A route maps an inbound path prefix to a downstream base URL. Requests are
//! forwarded with their full path, so `/api/news/all` routed to
//! `http://news:5001` arrives at `http://news:5001/api/news/all`.
//!
//! The JSON file form is:
//!
//! ```json
//! {"routes": [{"prefix": "/api/news", "upstream": "http://news:5001"}]}
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One prefix-to-upstream mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    /// Inbound path prefix, matched on whole segments.
    pub prefix: String,
    /// Downstream base URL without a trailing path.
    pub upstream: String,
}

impl Route {
    /// Map `prefix` to `upstream`.
    pub fn new(prefix: impl Into<String>, upstream: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            upstream: upstream.into(),
        }
    }

    fn matches(&self, path: &str) -> bool {
        let prefix = self.prefix.trim_end_matches('/');
        if prefix.is_empty() {
            return true;
        }
        path.strip_prefix(prefix)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
    }

    /// Downstream URL for `path_and_query`.
    #[must_use]
    pub fn target(&self, path_and_query: &str) -> String {
        format!("{}{}", self.upstream.trim_end_matches('/'), path_and_query)
    }
}

/// Failure loading a route table from disk.
#[derive(Debug, Error)]
pub enum RouteTableError {
    /// The file could not be read.
    #[error("failed to read route table {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// The file is not a valid route table.
    #[error("invalid route table: {0}")]
    Parse(#[from] serde_json::Error),
    /// A route has an empty upstream.
    #[error("route {prefix} has no upstream")]
    MissingUpstream { prefix: String },
}

/// Ordered set of routes resolved by longest prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    /// Build a table from explicit routes.
    #[must_use]
    pub fn new(routes: Vec<Route>) -> Self {
        Self { routes }
    }

    /// `/api/news` and `/api/users` routed to the two services.
    #[must_use]
    pub fn defaults(news_upstream: &str, users_upstream: &str) -> Self {
        Self::new(vec![
            Route::new("/api/news", news_upstream),
            Route::new("/api/users", users_upstream),
        ])
    }

    /// Parse the JSON form shown in the module docs.
    ///
    /// # Errors
    ///
    /// Returns [`RouteTableError::Parse`] for malformed JSON and
    /// [`RouteTableError::MissingUpstream`] for a blank upstream.
    pub fn from_json(json: &str) -> Result<Self, RouteTableError> {
        let table: Self = serde_json::from_str(json)?;
        if let Some(route) = table
            .routes
            .iter()
            .find(|route| route.upstream.trim().is_empty())
        {
            return Err(RouteTableError::MissingUpstream {
                prefix: route.prefix.clone(),
            });
        }
        Ok(table)
    }

    /// Read and parse a JSON route table file.
    ///
    /// # Errors
    ///
    /// Returns [`RouteTableError`] when the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, RouteTableError> {
        let json = std::fs::read_to_string(path).map_err(|source| RouteTableError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Route with the longest prefix matching `path`, if any.
    #[must_use]
    pub fn resolve(&self, path: &str) -> Option<&Route> {
        self.routes
            .iter()
            .filter(|route| route.matches(path))
            .max_by_key(|route| route.prefix.trim_end_matches('/').len())
    }

    /// Configured routes in declaration order.
    #[must_use]
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }
}
