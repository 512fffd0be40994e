use normalized_value::DataNode;
use runtime::cache::NormalizedCache;

use crate::Result;

/// The response to a mutation, as handed to its updaters.
#[derive(Clone, Debug, Default, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct MutationResult {
    pub data: Option<DataNode>,
    pub errors: Vec<GraphqlError>,
}

impl MutationResult {
    pub fn with_data(data: impl Into<DataNode>) -> Self {
        MutationResult {
            data: Some(data.into()),
            errors: Vec::new(),
        }
    }

    /// A field of the response data
    pub fn get(&self, field: &str) -> Option<&DataNode> {
        self.data.as_ref()?.get(field)
    }
}

#[derive(Clone, Debug, Default, PartialEq, serde::Deserialize)]
pub struct GraphqlError {
    pub message: String,
    #[serde(default)]
    pub path: Vec<serde_json::Value>,
    #[serde(default)]
    pub extensions: serde_json::Map<String, serde_json::Value>,
}

/// Updates the cache after a mutation.
pub type MutationUpdater = Box<dyn Fn(&mut dyn NormalizedCache, &MutationResult) -> Result<()>>;

/// Options applied by an updater. Skipped options are left out entirely.
pub trait UpdaterOptions {
    fn skip(&self) -> bool;
}

/// The options built for a single mutation result
#[derive(Debug)]
pub enum OptionsSet<O> {
    Single(O),
    Batch(Vec<O>),
}

impl<O> From<O> for OptionsSet<O> {
    fn from(options: O) -> Self {
        OptionsSet::Single(options)
    }
}

impl<O> From<Vec<O>> for OptionsSet<O> {
    fn from(options: Vec<O>) -> Self {
        OptionsSet::Batch(options)
    }
}

impl<O> IntoIterator for OptionsSet<O> {
    type Item = O;
    type IntoIter = std::vec::IntoIter<O>;

    fn into_iter(self) -> Self::IntoIter {
        match self {
            OptionsSet::Single(options) => vec![options].into_iter(),
            OptionsSet::Batch(options) => options.into_iter(),
        }
    }
}

/// Creates an updater that builds options from the mutation result with `builder`
/// and applies them with `method`, in order.
///
/// The first error stops the batch. Options that were applied before it stay applied.
pub fn create_updater<O, M, B>(method: M, builder: B) -> MutationUpdater
where
    O: UpdaterOptions + 'static,
    M: Fn(&mut dyn NormalizedCache, O) -> Result<()> + 'static,
    B: Fn(&MutationResult, &dyn NormalizedCache) -> OptionsSet<O> + 'static,
{
    Box::new(move |cache: &mut dyn NormalizedCache, result: &MutationResult| {
        let options = builder(result, &*cache);

        for (index, options) in options.into_iter().enumerate() {
            if options.skip() {
                tracing::trace!(index, "skipping updater options");
                continue;
            }
            method(&mut *cache, options)?;
        }

        Ok(())
    })
}

/// Runs several updaters one after the other, stopping at the first error.
pub fn combine(updaters: impl IntoIterator<Item = MutationUpdater>) -> MutationUpdater {
    let updaters = updaters.into_iter().collect::<Vec<_>>();

    Box::new(move |cache: &mut dyn NormalizedCache, result: &MutationResult| {
        for updater in &updaters {
            updater(&mut *cache, result)?;
        }

        Ok(())
    })
}
