use thiserror::Error;

/// Errors classified during the one-shot setup probe.
///
/// These map directly onto the validation messages shown to the user when a
/// new location is being configured; none of them is retried automatically.
#[derive(Debug, Error)]
pub enum SetupError {
    /// The provider rejected the API key (HTTP 401/403).
    #[error("the provider rejected the API key")]
    InvalidAuth,

    /// The location key could not be resolved (HTTP 404, AccuWeather only).
    #[error("the location key was not recognized by the provider")]
    InvalidLocation,

    /// Network failure, timeout, or an unexpected status during the probe.
    #[error("could not reach the provider: {0}")]
    CannotConnect(String),

    /// A configuration with the same unique id already exists.
    #[error("location '{0}' is already configured")]
    AlreadyConfigured(String),
}

/// A failed steady-state poll. The previous snapshot is always retained.
#[derive(Debug, Error)]
#[error("forecast update failed: {reason}")]
pub struct UpdateFailed {
    pub reason: String,
}

impl UpdateFailed {
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setup_error_messages_are_user_facing() {
        assert_eq!(
            SetupError::InvalidAuth.to_string(),
            "the provider rejected the API key"
        );
        assert_eq!(
            SetupError::AlreadyConfigured("326257".into()).to_string(),
            "location '326257' is already configured"
        );
    }

    #[test]
    fn update_failed_carries_reason() {
        let err = UpdateFailed::new("HTTP 500");
        assert!(err.to_string().contains("HTTP 500"));
    }
}
