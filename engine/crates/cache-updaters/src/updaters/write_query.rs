use normalized_value::DataNode;
use runtime::{
    cache::{NormalizedCache, QuerySelector},
    selection::{QueryDocument, Variables},
};

use crate::{create_updater, MutationResult, MutationUpdater, OptionsSet, Result, UpdaterOptions};

#[derive(Clone, Debug)]
pub struct WriteQueryOptions {
    /// The record the query is rooted at, the root query record when `None`
    pub id: Option<String>,
    pub query: QueryDocument,
    pub variables: Variables,
    pub data: DataNode,
    pub skip: bool,
}

impl WriteQueryOptions {
    pub fn new(query: QueryDocument, data: impl Into<DataNode>) -> Self {
        WriteQueryOptions {
            id: None,
            query,
            variables: Variables::new(),
            data: data.into(),
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
}

impl UpdaterOptions for WriteQueryOptions {
    fn skip(&self) -> bool {
        self.skip
    }
}

pub fn apply(cache: &mut dyn NormalizedCache, options: WriteQueryOptions) -> Result<()> {
    let selector = QuerySelector::new(&options.query, &options.variables).id(options.id.as_deref());

    cache.write_query(&selector, options.data)?;

    Ok(())
}

pub fn write_query<B>(builder: B) -> MutationUpdater
where
    B: Fn(&MutationResult, &dyn NormalizedCache) -> OptionsSet<WriteQueryOptions> + 'static,
{
    create_updater(apply, builder)
}
