//! Shared constants for expression scanning

pub mod constants;

pub use constants::*;
