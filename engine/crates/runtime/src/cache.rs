#[cfg(any(test, feature = "test-utils"))]
mod test_utils;

use cache_reconcile::IdentityResolver;
use indexmap::IndexMap;
use normalized_value::DataNode;

use crate::selection::{Fragment, QueryDocument, Variables};

#[cfg(any(test, feature = "test-utils"))]
pub use test_utils::InMemoryCache;

/// The identity of the record holding the root query fields
pub const ROOT_QUERY: &str = "ROOT_QUERY";

/// The identity of the record holding the root mutation fields
pub const ROOT_MUTATION: &str = "ROOT_MUTATION";

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("the variable `{0}` was not provided")]
    MissingVariable(String),
    #[error("expected an object for the selection on `{field}`")]
    ShapeMismatch { field: String },
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Selects a fragment of a single cached record
#[derive(Clone, Copy, Debug)]
pub struct FragmentSelector<'a> {
    pub id: &'a str,
    pub fragment: &'a Fragment,
    pub variables: &'a Variables,
}

/// Selects the data of a query, rooted at the root query record unless `id` says otherwise
#[derive(Clone, Copy, Debug)]
pub struct QuerySelector<'a> {
    pub id: Option<&'a str>,
    pub query: &'a QueryDocument,
    pub variables: &'a Variables,
}

impl<'a> QuerySelector<'a> {
    pub fn new(query: &'a QueryDocument, variables: &'a Variables) -> Self {
        QuerySelector {
            id: None,
            query,
            variables,
        }
    }

    #[must_use]
    pub fn id(mut self, id: Option<&'a str>) -> Self {
        self.id = id;
        self
    }

    /// The record the query is read from and written to
    pub fn root(&self) -> &'a str {
        self.id.unwrap_or(ROOT_QUERY)
    }
}

/// What to do with a field passed to a [`FieldModifier`]
#[derive(Clone, Debug, PartialEq)]
pub enum FieldUpdate {
    Keep,
    Set(DataNode),
    Delete,
}

/// The field a [`FieldModifier`] is being called for
#[derive(Clone, Copy, Debug)]
pub struct FieldDetails<'a> {
    /// The identity of the record holding the field
    pub id: &'a str,
    pub field_name: &'a str,
    /// The name the field is stored under, including any arguments
    pub store_field_name: &'a str,
}

/// Modifies a single stored field. Called once per stored instance of the field.
pub type FieldModifier = Box<dyn FnMut(&DataNode, &FieldDetails<'_>) -> FieldUpdate>;

/// Field modifiers, keyed by field name
pub type FieldModifiers = IndexMap<String, FieldModifier>;

/// Modifies fields of a single record
#[derive(Default)]
pub struct ModifyOptions {
    /// The record to modify, the root query record when `None`
    pub id: Option<String>,
    pub fields: FieldModifiers,
    pub optimistic: bool,
}

impl ModifyOptions {
    pub fn new(id: Option<String>) -> Self {
        ModifyOptions {
            id,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn field(
        mut self,
        name: impl Into<String>,
        modifier: impl FnMut(&DataNode, &FieldDetails<'_>) -> FieldUpdate + 'static,
    ) -> Self {
        self.fields.insert(name.into(), Box::new(modifier));
        self
    }
}

impl std::fmt::Debug for ModifyOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModifyOptions")
            .field("id", &self.id)
            .field("fields", &self.fields.keys().collect::<Vec<_>>())
            .field("optimistic", &self.optimistic)
            .finish()
    }
}

/// Evicts a record, or a single field of it
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EvictOptions {
    /// The record to evict from, the root query record when `None`
    pub id: Option<String>,
    /// Evicts every stored instance of this field instead of the whole record
    pub field_name: Option<String>,
    pub skip_garbage_collection: bool,
}

/// A normalized cache, as needed by cache updaters.
///
/// Records are stored by identity, so the cache also decides how records are
/// identified. Reads return `None` when any of the selected data is missing.
pub trait NormalizedCache: IdentityResolver {
    fn read_fragment(&self, selector: &FragmentSelector<'_>, optimistic: bool) -> Result<Option<DataNode>>;

    fn write_fragment(&mut self, selector: &FragmentSelector<'_>, data: DataNode) -> Result<()>;

    fn read_query(&self, selector: &QuerySelector<'_>, optimistic: bool) -> Result<Option<DataNode>>;

    fn write_query(&mut self, selector: &QuerySelector<'_>, data: DataNode) -> Result<()>;

    /// Returns whether anything changed.
    fn modify(&mut self, options: ModifyOptions) -> bool;

    /// Returns whether anything was evicted. Garbage collection is left to the caller.
    fn evict(&mut self, options: &EvictOptions) -> bool;

    /// Removes every record that is no longer reachable from the root records,
    /// returning their identities.
    fn gc(&mut self) -> Vec<String>;
}
