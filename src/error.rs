use thiserror::Error;

/// Main error type for the wager importer and settlement engine
#[derive(Error, Debug)]
pub enum WagerError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Sport lookup table error: {0}")]
    LookupTable(#[from] toml::de::Error),

    // Serialization errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // Parsing errors
    #[error("Parse error: {0}")]
    Parse(String),

    // Validation errors
    #[error("Validation failed: {0}")]
    Validation(String),

    // Storage errors
    #[error("Wager not found: {0}")]
    WagerNotFound(String),

    // Results provider errors
    #[error("Results provider error: {0}")]
    Provider(String),

    #[error("Timed out after {elapsed_ms}ms: {operation}")]
    Timeout { operation: String, elapsed_ms: u64 },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Generic errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

/// Result type alias for WagerError
pub type Result<T> = std::result::Result<T, WagerError>;

/// Reasons a settlement run stops without recording a terminal result.
///
/// The wager is left untouched and picked up again on the next cycle.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SettlementAbort {
    #[error("leg {leg}: sport {sport} has no results feed")]
    UnsupportedSport { leg: usize, sport: String },

    #[error("leg {leg}: no event found for {participant}")]
    EventNotFound { leg: usize, participant: String },

    #[error("leg {leg}: pushed, needs manual resolution")]
    Push { leg: usize },

    #[error("leg {leg}: cannot be graded ({reason})")]
    Ungradable { leg: usize, reason: String },

    #[error("leg {leg}: provider call timed out")]
    Timeout { leg: usize },

    #[error("leg {leg}: provider failure: {message}")]
    Provider { leg: usize, message: String },

    #[error("wager has no legs to settle")]
    NoLegs,

    /// The legs are fine but the ticket as a whole cannot be priced
    #[error("wager cannot be graded: {reason}")]
    InvalidWager { reason: String },
}

impl SettlementAbort {
    pub(crate) fn from_provider_error(leg: usize, err: WagerError) -> Self {
        match err {
            WagerError::Timeout { .. } => SettlementAbort::Timeout { leg },
            other => SettlementAbort::Provider {
                leg,
                message: other.to_string(),
            },
        }
    }
}
