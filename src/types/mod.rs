//! # types
//!
//! `types` is the module containing all the useful public structs of the crate

pub mod database;
pub mod errors;
pub mod message;
pub mod node;
pub mod signal;
