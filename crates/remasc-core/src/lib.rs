//! # remasc-core
//! Foundation types, collaborator traits, and network parameters shared by
//! the Remasc reward engine and its hosts.

pub mod config;
pub mod constants;
pub mod error;
pub mod memory;
pub mod traits;
pub mod types;
