use runtime::cache::{self, NormalizedCache};

use crate::{create_updater, MutationResult, MutationUpdater, OptionsSet, Result, UpdaterOptions};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct EvictOptions {
    /// The record to evict, the root query record when `None`
    pub id: Option<String>,
    /// Only evicts this field of the record
    pub field_name: Option<String>,
    /// Leaves records that are no longer reachable in the cache
    pub skip_garbage_collection: bool,
    pub skip: bool,
}

impl EvictOptions {
    pub fn record(id: impl Into<String>) -> Self {
        EvictOptions {
            id: Some(id.into()),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn field(mut self, field_name: impl Into<String>) -> Self {
        self.field_name = Some(field_name.into());
        self
    }
}

impl UpdaterOptions for EvictOptions {
    fn skip(&self) -> bool {
        self.skip
    }
}

/// Evicts a record or one of its fields, then collects the garbage left behind.
pub fn apply(cache: &mut dyn NormalizedCache, options: EvictOptions) -> Result<()> {
    let EvictOptions {
        id,
        field_name,
        skip_garbage_collection,
        ..
    } = options;

    let evicted = cache.evict(&cache::EvictOptions {
        id,
        field_name,
        skip_garbage_collection,
    });

    if evicted && !skip_garbage_collection {
        let removed = cache.gc();
        tracing::debug!(removed = removed.len(), "collected garbage after eviction");
    }

    Ok(())
}

pub fn evict<B>(builder: B) -> MutationUpdater
where
    B: Fn(&MutationResult, &dyn NormalizedCache) -> OptionsSet<EvictOptions> + 'static,
{
    create_updater(apply, builder)
}
