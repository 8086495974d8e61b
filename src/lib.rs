pub mod adapters;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod parser;
pub mod settlement;

pub use adapters::{InMemoryWagerStore, SnapshotResultsProvider, WagerStore};
pub use config::AppConfig;
pub use domain::{
    LegStatus, ParseWarning, ParsedLeg, SettlementDecision, Sport, WagerRecord, WagerStatus,
    WagerType,
};
pub use error::{Result, SettlementAbort, WagerError};
pub use parser::{import_text, ImportOptions, ImportReport, SportLookup};
pub use settlement::{
    GameResultsProvider, LegSettlementTracker, RoundRobinBreakdown, SettlementOptions,
    SettlementReport, Throttle, ThrottledProvider,
};
