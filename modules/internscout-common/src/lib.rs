pub mod config;
pub mod error;
pub mod types;

pub use config::{Config, DelayRange, DelayRanges, Policy, SynonymGroup};
pub use error::OutreachError;
pub use types::*;
