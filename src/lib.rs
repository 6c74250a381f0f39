//! Chronological sanad validation.
//!
//! Given cleaned narrator records, checks whether each consecutive pair
//! in a transmission chain could plausibly have met, and resolves
//! free-text queries to canonical narrator names.

pub mod chain;
pub mod config;
pub mod error;
pub mod link;
pub mod loader;
pub mod repository;
pub mod resolver;

pub use chain::{ChainReport, ChainSummary, validate_chain};
pub use error::{Error, Result};
pub use link::evaluate;
pub use narrator_types::{
    DirectRelation, Grade, LinkEndpoint, LinkStatus, LinkVerdict, NarratorRecord,
};
pub use repository::NarratorRepository;
pub use resolver::{Resolver, ResolverConfig};
