pub mod leg;
pub mod sport;
pub mod wager;

pub use leg::*;
pub use sport::*;
pub use wager::*;
