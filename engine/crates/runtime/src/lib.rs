//! The normalized cache that cache updaters run against: the documents that
//! select data from it, how it identifies records, and the cache interface itself.

pub mod cache;
pub mod identity;
pub mod selection;

