//! # Council Core
//!
//! Shared building blocks for every Council crate: configuration, the error
//! taxonomy, wire types exchanged with the model service, the [`Provider`]
//! trait and the small text utilities (template substitution, key/value reply
//! parsing) used by the agents.

pub mod config;
pub mod error;
pub mod parse;
pub mod template;
pub mod traits;
pub mod types;

pub use config::{CouncilConfig, SpecialistProfile};
pub use error::{CouncilError, Result};
pub use traits::Provider;
pub use types::{Message, ReviewResult, Role};
