use normalized_value::DataNode;
use runtime::cache::{self, FieldDetails, FieldUpdate, NormalizedCache};

use crate::{create_updater, MutationResult, MutationUpdater, OptionsSet, Result, UpdaterOptions};

/// Modifies the stored fields of a record directly
#[derive(Debug, Default)]
pub struct ModifyOptions {
    pub options: cache::ModifyOptions,
    pub skip: bool,
}

impl ModifyOptions {
    /// Modifies the record `id`, or the root query record when `None`
    pub fn new(id: Option<String>) -> Self {
        cache::ModifyOptions::new(id).into()
    }

    #[must_use]
    pub fn field(
        mut self,
        name: impl Into<String>,
        modifier: impl FnMut(&DataNode, &FieldDetails<'_>) -> FieldUpdate + 'static,
    ) -> Self {
        self.options = self.options.field(name, modifier);
        self
    }

    #[must_use]
    pub fn skip(mut self, skip: bool) -> Self {
        self.skip = skip;
        self
    }
}

impl From<cache::ModifyOptions> for ModifyOptions {
    fn from(options: cache::ModifyOptions) -> Self {
        ModifyOptions { options, skip: false }
    }
}

impl UpdaterOptions for ModifyOptions {
    fn skip(&self) -> bool {
        self.skip
    }
}

pub fn apply(cache: &mut dyn NormalizedCache, options: ModifyOptions) -> Result<()> {
    let id = options.options.id.clone();

    if !cache.modify(options.options) {
        tracing::debug!(?id, "modify left the cache unchanged");
    }

    Ok(())
}

pub fn modify<B>(builder: B) -> MutationUpdater
where
    B: Fn(&MutationResult, &dyn NormalizedCache) -> OptionsSet<ModifyOptions> + 'static,
{
    create_updater(apply, builder)
}
