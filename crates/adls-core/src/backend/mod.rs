//! Data Lake backends

pub mod memory;
pub mod rest;

pub use memory::{InMemoryDataLake, ListingQuirks};
pub use rest::DataLakeRestService;
