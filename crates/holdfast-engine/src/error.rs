use holdfast_common::error::DriverError;

/// Failures that can escape an engine component.
///
/// `Intercepted` and transient `Stale` are normally recovered inside the
/// Action Executor and the Session; they only reach the orchestrator when
/// recovery itself was impossible.
#[derive(Debug, Clone, thiserror::Error)]
pub enum InteractionError {
    #[error("No query for '{target}' matched within {waited_ms} ms ({} queries tried)", .attempted.len())]
    NotFound {
        target: String,
        attempted: Vec<String>,
        waited_ms: u64,
    },

    #[error("Timed out after {waited_ms} ms waiting for {condition}")]
    Timeout { condition: String, waited_ms: u64 },

    #[error("Interaction with {target} was intercepted by another element")]
    Intercepted { target: String },

    #[error("Element {target} is stale (removed or re-rendered)")]
    Stale { target: String },

    #[error("{action} failed on {target}: {primary}{}", .fallback.as_ref().map(|f| format!("; fallback: {}", f)).unwrap_or_default())]
    ActionFailed {
        action: String,
        target: String,
        primary: String,
        fallback: Option<String>,
    },

    #[error("Precondition failed: {0}")]
    Precondition(String),

    #[error("UI profile has no entry for '{0}'")]
    NotConfigured(String),

    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),
}

impl InteractionError {
    pub fn code(&self) -> &'static str {
        match self {
            InteractionError::NotFound { .. } => "NOT_FOUND",
            InteractionError::Timeout { .. } => "TIMEOUT",
            InteractionError::Intercepted { .. } => "INTERCEPTED",
            InteractionError::Stale { .. } => "STALE",
            InteractionError::ActionFailed { .. } => "ACTION_FAILED",
            InteractionError::Precondition(_) => "PRECONDITION_FAILED",
            InteractionError::NotConfigured(_) => "NOT_CONFIGURED",
            InteractionError::Driver(e) => e.code(),
        }
    }

    pub fn is_stale(&self) -> bool {
        match self {
            InteractionError::Stale { .. } => true,
            InteractionError::Driver(e) => e.is_stale(),
            _ => false,
        }
    }

    /// Wraps a driver failure observed while acting on `target`, keeping
    /// staleness distinguishable for the caller.
    pub fn from_driver(target: &str, err: DriverError) -> Self {
        if err.is_stale() {
            InteractionError::Stale {
                target: target.to_string(),
            }
        } else if err.is_intercepted() {
            InteractionError::Intercepted {
                target: target.to_string(),
            }
        } else {
            InteractionError::Driver(err)
        }
    }
}
