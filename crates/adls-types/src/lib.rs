//! ADLS Types - Pure type definitions
//!
//! This crate contains only plain data types shared by the repository core
//! and the CLI, with no async runtime or network dependencies.

pub mod artifact;
pub mod location;

pub use artifact::*;
pub use location::*;
