//! Trait seams between Council crates.

pub mod provider;

pub use provider::Provider;
