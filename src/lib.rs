// src/lib.rs
pub mod cli;
pub mod collector;
pub mod config;
pub mod engine;
pub mod error;
pub mod extractor;
pub mod output;
pub mod pipeline;
pub mod query;
pub mod session;
pub mod types;
pub mod utils;
pub mod verifier;
pub mod whois;

pub use cli::Args;
pub use engine::WhoxyFinderEngine;
pub use types::{Config, IdentityField, RunReport, Seed, WhoisError, WhoxyFinderError};
pub use whois::{WhoisClient, WhoisLookup, WhoisRecord};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
