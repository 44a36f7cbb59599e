//! Navigator Port - the page location.

use reqwest::Url;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavigationError {
    #[error("invalid location '{0}'")]
    InvalidLocation(String),

    #[error("navigation failed: {0}")]
    Failed(String),
}

/// Port over the browser location and history.
pub trait Navigator: Send + Sync {
    fn current_location(&self) -> Url;

    /// Full-page navigation. The current page is torn down afterwards.
    fn redirect(&self, target: &Url) -> Result<(), NavigationError>;

    /// Rewrites the visible location without navigating (history replace).
    fn replace_location(&self, location: &Url) -> Result<(), NavigationError>;

    /// Scheme, host and port of the current location, e.g.
    /// `https://book.example`.
    fn origin(&self) -> String {
        self.current_location().origin().ascii_serialization()
    }
}
