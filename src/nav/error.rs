//! Navigation fetch errors.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

/// Why a page fetch did not produce a swappable payload.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NavError {
    /// The server answered with a non-success status.
    #[error("HTTP {status}")]
    FetchFailure { status: u16 },

    /// The response parsed but has no element matching the main selector.
    #[error("missing {selector} in response")]
    MissingFragment { selector: String },

    /// A newer navigation (or the prefetch timeout) aborted the request.
    #[error("request aborted")]
    Cancelled,

    /// Network or body-read failure below the HTTP layer.
    #[error("transport error: {0}")]
    Transport(String),
}

impl NavError {
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::FetchFailure { .. } => "E_FETCH_FAILURE",
            Self::MissingFragment { .. } => "E_MISSING_FRAGMENT",
            Self::Cancelled => "E_CANCELLED",
            Self::Transport(_) => "E_TRANSPORT",
        }
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Whether a failed navigation should fall back to a full page load.
    #[must_use]
    pub fn falls_back(&self) -> bool {
        !self.is_cancelled()
    }
}

/// `Ok` for 2xx statuses, [`NavError::FetchFailure`] otherwise.
///
/// # Errors
///
/// Returns [`NavError::FetchFailure`] carrying `status` when it is not 2xx.
pub fn check_status(status: u16) -> Result<(), NavError> {
    if (200..=299).contains(&status) { Ok(()) } else { Err(NavError::FetchFailure { status }) }
}
