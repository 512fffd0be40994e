//! The updaters, each as a function applying one set of options to a cache, and
//! as a [`MutationUpdater`](crate::MutationUpdater) built from an options builder.

pub mod evict;
pub mod modify;
pub mod modify_fragment;
pub mod modify_query;
pub mod write_fragment;
pub mod write_query;

use cache_reconcile::{reconcile, IdentityResolver, Modifier, ModifierRecord};
use normalized_value::{DataNode, Record};
use runtime::cache::NormalizedCache;

pub use evict::{evict, EvictOptions};
pub use modify::{modify, ModifyOptions};
pub use modify_fragment::{modify_fragment, ModifyFragmentOptions};
pub use modify_query::{modify_query, ModifyQueryOptions};
pub use write_fragment::{write_fragment, WriteFragmentOptions};
pub use write_query::{write_query, WriteQueryOptions};

use crate::{Error, Result};

/// Builds the modifier applied to cached data, given that data.
pub type DataBuilder = Box<dyn Fn(&DataNode) -> Modifier>;

/// What a data builder targets, worked out by calling it with an empty record.
#[derive(Debug, Default)]
struct DataShape {
    /// Every field the builder names. Fields that produce nothing without cached
    /// data are kept as `null`, so they are still selected.
    fields: Record,
    /// The fields that did produce a value
    values: Record,
}

impl DataShape {
    fn of(data: &DataBuilder) -> Self {
        let empty = DataNode::empty_record();
        Self::from_modifier(data(&empty), &empty)
    }

    fn from_modifier(modifier: Modifier, empty: &DataNode) -> Self {
        match modifier {
            Modifier::Record(fields) => Self::from_record(fields),
            Modifier::Fn(f) => f(Some(empty))
                .map(|produced| Self::from_modifier(produced, empty))
                .unwrap_or_default(),
            Modifier::Literal(DataNode::Record(record)) => DataShape {
                fields: record.clone(),
                values: record,
            },
            Modifier::Literal(_) | Modifier::List(_) => DataShape::default(),
        }
    }

    fn from_record(fields: ModifierRecord) -> Self {
        let mut shape = DataShape::default();

        for (name, modifier) in fields {
            match shape_of(modifier) {
                Some(value) => {
                    shape.values.insert(name.clone(), value.clone());
                    shape.fields.insert(name, value);
                }
                None => {
                    shape.fields.insert(name, DataNode::Null);
                }
            }
        }

        shape
    }

    fn data(&self) -> DataNode {
        DataNode::Record(self.fields.clone())
    }

    fn identify(&self, cache: &dyn NormalizedCache) -> Result<String> {
        cache.identify(&self.values).ok_or(Error::MissingIdentity)
    }
}

/// The value a modifier produces with nothing cached, keeping every record field
/// it names.
fn shape_of(modifier: Modifier) -> Option<DataNode> {
    match modifier {
        Modifier::Literal(value) => Some(value),
        Modifier::Record(fields) => Some(DataNode::Record(DataShape::from_record(fields).fields)),
        Modifier::List(entries) => Some(DataNode::List(entries.into_iter().filter_map(shape_of).collect())),
        Modifier::Fn(f) => f(None).and_then(shape_of),
    }
}

fn identify(cache: &dyn NormalizedCache, data: &DataNode) -> Result<String> {
    data.as_record()
        .and_then(|record| cache.identify(record))
        .ok_or(Error::MissingIdentity)
}

/// Applies the modifier built from the cached data.
fn reconcile_cached(cache: &dyn NormalizedCache, cached: &DataNode, data: &DataBuilder) -> DataNode {
    reconcile(cache, Some(cached), data(cached))
}
