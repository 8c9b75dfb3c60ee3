/// Errors reported by a browser driver.
///
/// Variants are grouped the way WebDriver reports them so the engine can
/// decide locally which ones are recoverable (stale, intercepted, invalid
/// query) and which ones end a step.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum DriverError {
    // ============================================================
    // Navigation Errors
    // ============================================================
    #[error("Navigation failed: {0}")]
    Navigation(String),

    // ============================================================
    // Element Errors
    // ============================================================
    #[error("Element {handle} is stale (removed from DOM)")]
    Stale { handle: String },

    #[error("Click on element {handle} was intercepted: {reason}")]
    Intercepted { handle: String, reason: String },

    #[error("Element {handle} is not interactable: {reason}")]
    NotInteractable { handle: String, reason: String },

    #[error("Invalid element state for {handle}: {reason}")]
    InvalidElementState { handle: String, reason: String },

    #[error("Invalid query '{query}': {reason}")]
    InvalidQuery { query: String, reason: String },

    // ============================================================
    // Execution Errors
    // ============================================================
    #[error("Script execution error: {0}")]
    Script(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    // ============================================================
    // System Errors
    // ============================================================
    #[error("Connection lost")]
    ConnectionLost,

    #[error("Not ready")]
    NotReady,

    #[error("IO error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Not supported: {0}")]
    NotSupported(String),

    #[error("Other: {0}")]
    Other(String),
}

impl From<std::io::Error> for DriverError {
    fn from(err: std::io::Error) -> Self {
        DriverError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for DriverError {
    fn from(err: serde_json::Error) -> Self {
        DriverError::Serialization(err.to_string())
    }
}

impl DriverError {
    /// Stable machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            DriverError::Navigation(_) => "NAVIGATION_ERROR",
            DriverError::Stale { .. } => "ELEMENT_STALE",
            DriverError::Intercepted { .. } => "CLICK_INTERCEPTED",
            DriverError::NotInteractable { .. } => "ELEMENT_NOT_INTERACTABLE",
            DriverError::InvalidElementState { .. } => "INVALID_ELEMENT_STATE",
            DriverError::InvalidQuery { .. } => "QUERY_INVALID",
            DriverError::Script(_) => "SCRIPT_ERROR",
            DriverError::Timeout(_) => "TIMEOUT",
            DriverError::ConnectionLost => "CONNECTION_LOST",
            DriverError::NotReady => "NOT_READY",
            DriverError::Io(_) => "IO_ERROR",
            DriverError::Serialization(_) => "SERIALIZATION_ERROR",
            DriverError::NotSupported(_) => "NOT_SUPPORTED",
            DriverError::Other(_) => "INTERNAL_ERROR",
        }
    }

    /// A query the driver could not evaluate. Locator resolution skips these.
    pub fn is_query_rejection(&self) -> bool {
        matches!(
            self,
            DriverError::InvalidQuery { .. } | DriverError::NotSupported(_)
        )
    }

    pub fn is_stale(&self) -> bool {
        matches!(self, DriverError::Stale { .. })
    }

    pub fn is_intercepted(&self) -> bool {
        matches!(self, DriverError::Intercepted { .. })
    }

    /// The control refused a primitive it does not implement (e.g. `clear`
    /// on a content-editable region).
    pub fn is_unsupported_primitive(&self) -> bool {
        matches!(
            self,
            DriverError::InvalidElementState { .. } | DriverError::NotSupported(_)
        )
    }

    /// The session itself is gone; nothing downstream can recover.
    pub fn is_fatal(&self) -> bool {
        matches!(self, DriverError::ConnectionLost | DriverError::NotReady)
    }
}
