use normalized_value::{DataNode, Record};

use crate::{
    identity::{find_by_identity, IdentityResolver},
    modifier::{Modifier, ModifierRecord},
};

/// Reconciles modifier trees against cached data, using `R` to line up list entries.
pub struct Reconciler<'a, R: ?Sized> {
    identity: &'a R,
}

impl<'a, R> Reconciler<'a, R>
where
    R: IdentityResolver + ?Sized,
{
    pub fn new(identity: &'a R) -> Self {
        Reconciler { identity }
    }

    /// Produces the data that results from applying `modifier` to `cached`.
    ///
    /// `cached` is only ever read: the result is always a new tree. If the modifier
    /// evaluates to nothing at all the cached value is returned, or `null` if there
    /// isn't one.
    pub fn reconcile(&self, cached: Option<&DataNode>, modifier: Modifier) -> DataNode {
        self.resolve(cached, modifier)
            .or_else(|| cached.cloned())
            .unwrap_or_default()
    }

    /// Resolves a single position in the tree. `None` means the modifier produced
    /// nothing and there was nothing cached to fall back to.
    fn resolve(&self, current: Option<&DataNode>, modifier: Modifier) -> Option<DataNode> {
        match modifier {
            Modifier::Literal(value) => Some(value),
            Modifier::Fn(f) => match f(current) {
                Some(produced) => self.resolve(current, produced),
                None => current.cloned(),
            },
            Modifier::Record(fields) => Some(DataNode::Record(self.merge_record(current, fields))),
            Modifier::List(entries) => Some(DataNode::List(self.merge_list(current, entries))),
        }
    }

    fn merge_record(&self, current: Option<&DataNode>, fields: ModifierRecord) -> Record {
        let cached = current.and_then(DataNode::as_record);

        // Fields the modifier doesn't mention keep their cached value & position
        let mut merged = cached.cloned().unwrap_or_default();

        for (name, modifier) in fields {
            let cached_field = cached.and_then(|record| record.get(&name));

            if let Some(value) = self.resolve(cached_field, modifier) {
                merged.insert(name, value);
            }
        }

        merged
    }

    fn merge_list(&self, current: Option<&DataNode>, entries: Vec<Modifier>) -> Vec<DataNode> {
        let cached = current.and_then(DataNode::as_list).unwrap_or_default();

        entries
            .into_iter()
            .filter_map(|entry| self.resolve_entry(cached, entry))
            .collect()
    }

    fn resolve_entry(&self, cached: &[DataNode], entry: Modifier) -> Option<DataNode> {
        match entry {
            Modifier::Record(fields) => {
                let counterpart = self.cached_counterpart(cached, &fields);

                Some(DataNode::Record(self.merge_record(counterpart, fields)))
            }
            // There's no way to tell which cached entry a function is meant for, so it
            // runs as if nothing was cached and whatever it produces is matched instead.
            Modifier::Fn(f) => f(None).and_then(|produced| self.resolve_entry(cached, produced)),
            Modifier::List(nested) => Some(DataNode::List(self.merge_list(None, nested))),
            Modifier::Literal(value) => Some(value),
        }
    }

    fn cached_counterpart<'c>(&self, cached: &'c [DataNode], fields: &ModifierRecord) -> Option<&'c DataNode> {
        let identity = self.identity.identify(&fields.literal_fields())?;

        let counterpart = find_by_identity(cached, &identity, self.identity);
        if counterpart.is_none() {
            tracing::trace!(%identity, "no cached list entry with this identity, treating it as new");
        }

        counterpart
    }
}

/// Produces the data that results from applying `modifier` to `cached`.
///
/// See [`Reconciler::reconcile`].
pub fn reconcile<R>(identity: &R, cached: Option<&DataNode>, modifier: Modifier) -> DataNode
where
    R: IdentityResolver + ?Sized,
{
    Reconciler::new(identity).reconcile(cached, modifier)
}
