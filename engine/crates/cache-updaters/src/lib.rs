//! Cache updaters for mutations.
//!
//! Each updater turns a mutation result into one or more sets of options with a
//! builder, then applies them to a [`NormalizedCache`](runtime::cache::NormalizedCache).
//! The modifying updaters read the cached data, reconcile it with a
//! [`Modifier`](cache_reconcile::Modifier) tree and write the result back.

mod error;
mod fragment;
mod updater;
pub mod updaters;

pub use error::{Error, Result};
pub use fragment::{build_fragment, select_fragment};
pub use updater::{combine, create_updater, GraphqlError, MutationResult, MutationUpdater, OptionsSet, UpdaterOptions};
pub use updaters::{
    evict, modify, modify_fragment, modify_query, write_fragment, write_query, DataBuilder, EvictOptions,
    ModifyFragmentOptions, ModifyOptions, ModifyQueryOptions, WriteFragmentOptions, WriteQueryOptions,
};
