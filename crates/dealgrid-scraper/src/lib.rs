pub mod client;
pub mod contract;
pub mod error;
pub mod parse;
mod retry;
pub mod sources;

pub use client::PageClient;
pub use contract::{DealScraper, ScrapeOutcome};
pub use error::ScraperError;
pub use sources::appsumo::AppSumoScraper;
pub use sources::default_scrapers;
