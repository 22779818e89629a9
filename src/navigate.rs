//! Navigation collaborator. Routes are client-side paths; a navigator performs
//! the redirect (router push in a browser, a log line in the CLI).

use std::fmt;
use tracing::info;

/// Named client routes used by the auth flows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    Login,
    Dashboard,
    Kyc,
    Other(String),
}

impl Route {
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::Login => "/login",
            Self::Dashboard => "/dashboard",
            Self::Kyc => "/kyc",
            Self::Other(path) => path,
        }
    }

    /// Maps a path to a known route, normalizing a missing leading slash.
    #[must_use]
    pub fn from_path(path: &str) -> Self {
        let trimmed = path.trim();
        let normalized = if trimmed.starts_with('/') {
            trimmed.to_string()
        } else {
            format!("/{trimmed}")
        };

        match normalized.as_str() {
            "/login" => Self::Login,
            "/dashboard" => Self::Dashboard,
            "/kyc" => Self::Kyc,
            _ => Self::Other(normalized),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.path())
    }
}

pub trait Navigator: Send + Sync {
    fn navigate(&self, route: &Route);
}

/// Navigator that records the redirect target in the log.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingNavigator;

impl Navigator for TracingNavigator {
    fn navigate(&self, route: &Route) {
        info!(route = %route, "navigate");
    }
}
