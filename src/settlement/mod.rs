//! Settlement of imported wagers against an external results provider

pub mod grading;
pub mod lease;
pub mod provider;
pub mod round_robin;
pub mod throttle;
pub mod tracker;

pub use lease::WagerLeases;
pub use provider::{EventHandle, GameResultsProvider};
pub use round_robin::{combinations, RoundRobinBreakdown};
pub use throttle::{Throttle, ThrottledProvider};
pub use tracker::{LegSettlementTracker, SettlementOptions, SettlementReport};
