use cache_reconcile::Modifier;
use normalized_value::DataNode;
use runtime::{
    cache::{NormalizedCache, QuerySelector},
    selection::{QueryDocument, Variables},
};

use super::{reconcile_cached, DataBuilder};
use crate::{create_updater, MutationResult, MutationUpdater, OptionsSet, Result, UpdaterOptions};

/// Reads a query, reconciles it with the modifier built by `data` and writes the
/// result back. Queries that aren't cached are left alone.
pub struct ModifyQueryOptions {
    /// The record the query is rooted at, the root query record when `None`
    pub id: Option<String>,
    pub query: QueryDocument,
    pub variables: Variables,
    pub data: DataBuilder,
    /// Whether to read optimistic data, `true` by default
    pub optimistic: bool,
    pub skip: bool,
}

impl ModifyQueryOptions {
    pub fn new(query: QueryDocument, data: impl Fn(&DataNode) -> Modifier + 'static) -> Self {
        ModifyQueryOptions {
            id: None,
            query,
            variables: Variables::new(),
            data: Box::new(data),
            optimistic: true,
            skip: false,
        }
    }

    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn variables(mut self, variables: Variables) -> Self {
        self.variables = variables;
        self
    }

    #[must_use]
    pub fn optimistic(mut self, optimistic: bool) -> Self {
        self.optimistic = optimistic;
        self
    }

    #[must_use]
    pub fn skip(mut self, skip: bool) -> Self {
        self.skip = skip;
        self
    }
}

impl std::fmt::Debug for ModifyQueryOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModifyQueryOptions")
            .field("id", &self.id)
            .field("query", &self.query)
            .field("variables", &self.variables)
            .field("optimistic", &self.optimistic)
            .field("skip", &self.skip)
            .finish_non_exhaustive()
    }
}

impl UpdaterOptions for ModifyQueryOptions {
    fn skip(&self) -> bool {
        self.skip
    }
}

pub fn apply(cache: &mut dyn NormalizedCache, options: ModifyQueryOptions) -> Result<()> {
    let selector = QuerySelector::new(&options.query, &options.variables).id(options.id.as_deref());

    let Some(cached) = cache.read_query(&selector, options.optimistic)? else {
        tracing::debug!(
            query = ?options.query.name,
            root = selector.root(),
            "query is not cached, nothing to modify"
        );
        return Ok(());
    };

    let data = reconcile_cached(&*cache, &cached, &options.data);
    cache.write_query(&selector, data)?;

    Ok(())
}

pub fn modify_query<B>(builder: B) -> MutationUpdater
where
    B: Fn(&MutationResult, &dyn NormalizedCache) -> OptionsSet<ModifyQueryOptions> + 'static,
{
    create_updater(apply, builder)
}
