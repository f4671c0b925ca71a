pub mod config;
pub mod error;
pub mod extract;
pub mod ledger;
pub mod matching;
pub mod models;
pub mod notify;
pub mod scout;
pub mod scrapers;

pub use config::{AppConfig, Criteria};
pub use error::{Result, ScoutError};
pub use models::{Category, LinkBuckets, Offer};
pub use scout::{CycleReport, Scout};
