use std::collections::HashSet;

use indexmap::IndexMap;
use normalized_value::{DataNode, Record};

use super::*;
use crate::{
    identity::{IdentityConfig, KeyFieldsIdentity},
    selection::{Field, SelectionSet},
};

/// The field of a record that only points to another record
const REFERENCE_FIELD: &str = "__ref";

/// A normalized cache that lives in memory, for testing cache updaters without
/// a real client cache behind them.
///
/// Optimistic layers are not modelled, reads ignore their `optimistic` flag.
#[derive(Debug, Default)]
pub struct InMemoryCache {
    identity: KeyFieldsIdentity,
    records: IndexMap<String, Record>,
}

impl InMemoryCache {
    pub fn new(config: IdentityConfig) -> Self {
        InMemoryCache {
            identity: KeyFieldsIdentity::new(config),
            records: IndexMap::new(),
        }
    }

    /// A snapshot of every stored record, keyed by identity
    pub fn extract(&self) -> DataNode {
        self.records
            .iter()
            .map(|(id, record)| (id.clone(), DataNode::Record(record.clone())))
            .collect::<Record>()
            .into()
    }

    pub fn get(&self, id: &str) -> Option<&Record> {
        self.records.get(id)
    }

    fn typename_field(&self) -> &str {
        &self.identity.config().typename_field
    }

    fn write_record(
        &mut self,
        id: &str,
        selection_set: &SelectionSet,
        data: &Record,
        variables: &Variables,
    ) -> Result<()> {
        let fields = self.normalize_fields(selection_set, data, variables)?;

        let record = self.records.entry(id.to_string()).or_default();
        for (name, value) in fields {
            record.insert(name, value);
        }

        Ok(())
    }

    fn normalize_fields(&mut self, selection_set: &SelectionSet, data: &Record, variables: &Variables) -> Result<Record> {
        let mut fields = Record::new();

        let typename_field = self.typename_field().to_string();
        if let Some(typename) = data.get(&typename_field) {
            fields.insert(typename_field, typename.clone());
        }

        for field in selection_set {
            let Some(value) = data.get(&field.name) else {
                tracing::debug!(field = %field.name, "missing field while writing to the cache");
                continue;
            };

            let store_name = field.store_name(variables)?;
            let value = self.normalize(field, value, variables)?;
            fields.insert(store_name, value);
        }

        Ok(fields)
    }

    fn normalize(&mut self, field: &Field, value: &DataNode, variables: &Variables) -> Result<DataNode> {
        if field.is_leaf() {
            return Ok(value.clone());
        }

        match value {
            DataNode::Null => Ok(DataNode::Null),
            DataNode::List(items) => items
                .iter()
                .map(|item| self.normalize(field, item, variables))
                .collect::<Result<Vec<_>>>()
                .map(DataNode::List),
            DataNode::Record(record) => match self.identity.identify(record) {
                Some(id) => {
                    self.write_record(&id, &field.selection_set, record, variables)?;
                    Ok(reference(id))
                }
                None => Ok(DataNode::Record(self.normalize_fields(
                    &field.selection_set,
                    record,
                    variables,
                )?)),
            },
            _ => Err(Error::ShapeMismatch {
                field: field.name.clone(),
            }),
        }
    }

    fn read_selection(
        &self,
        record: &Record,
        selection_set: &SelectionSet,
        variables: &Variables,
    ) -> Result<Option<Record>> {
        let mut result = Record::new();

        if let Some(typename) = record.get(self.typename_field()) {
            result.insert(self.typename_field().to_string(), typename.clone());
        }

        for field in selection_set {
            let store_name = field.store_name(variables)?;
            let Some(value) = record.get(&store_name) else {
                tracing::trace!(field = %store_name, "field is not in the cache");
                return Ok(None);
            };
            let Some(value) = self.denormalize(field, value, variables)? else {
                return Ok(None);
            };
            result.insert(field.name.clone(), value);
        }

        Ok(Some(result))
    }

    fn denormalize(&self, field: &Field, value: &DataNode, variables: &Variables) -> Result<Option<DataNode>> {
        if field.is_leaf() {
            return Ok(Some(value.clone()));
        }

        match value {
            DataNode::Null => Ok(Some(DataNode::Null)),
            DataNode::List(items) => {
                let mut list = Vec::with_capacity(items.len());
                for item in items {
                    // Entries pointing to evicted records are left out
                    if as_reference(item).is_some_and(|id| !self.records.contains_key(id)) {
                        continue;
                    }
                    let Some(item) = self.denormalize(field, item, variables)? else {
                        return Ok(None);
                    };
                    list.push(item);
                }
                Ok(Some(DataNode::List(list)))
            }
            DataNode::Record(record) => {
                let record = match as_reference(value) {
                    Some(id) => match self.records.get(id) {
                        Some(referenced) => referenced,
                        None => return Ok(None),
                    },
                    None => record,
                };

                Ok(self
                    .read_selection(record, &field.selection_set, variables)?
                    .map(DataNode::Record))
            }
            _ => Err(Error::ShapeMismatch {
                field: field.name.clone(),
            }),
        }
    }
}

impl IdentityResolver for InMemoryCache {
    fn identify(&self, record: &Record) -> Option<String> {
        self.identity.identify(record)
    }
}

impl NormalizedCache for InMemoryCache {
    fn read_fragment(&self, selector: &FragmentSelector<'_>, _optimistic: bool) -> Result<Option<DataNode>> {
        let Some(record) = self.records.get(selector.id) else {
            return Ok(None);
        };

        Ok(self
            .read_selection(record, &selector.fragment.selection_set, selector.variables)?
            .map(DataNode::Record))
    }

    fn write_fragment(&mut self, selector: &FragmentSelector<'_>, data: DataNode) -> Result<()> {
        let DataNode::Record(data) = data else {
            return Err(Error::ShapeMismatch {
                field: selector.fragment.name.clone(),
            });
        };

        self.write_record(selector.id, &selector.fragment.selection_set, &data, selector.variables)
    }

    fn read_query(&self, selector: &QuerySelector<'_>, _optimistic: bool) -> Result<Option<DataNode>> {
        let Some(root) = self.records.get(selector.root()) else {
            return Ok(None);
        };

        Ok(self
            .read_selection(root, &selector.query.selection_set, selector.variables)?
            .map(DataNode::Record))
    }

    fn write_query(&mut self, selector: &QuerySelector<'_>, data: DataNode) -> Result<()> {
        let DataNode::Record(data) = data else {
            return Err(Error::ShapeMismatch {
                field: selector.root().to_string(),
            });
        };

        self.write_record(selector.root(), &selector.query.selection_set, &data, selector.variables)
    }

    fn modify(&mut self, mut options: ModifyOptions) -> bool {
        let id = options.id.as_deref().unwrap_or(ROOT_QUERY);
        let Some(record) = self.records.get_mut(id) else {
            tracing::debug!(id, "nothing to modify");
            return false;
        };

        let mut changed = false;
        for (field_name, modifier) in &mut options.fields {
            let store_names = record
                .keys()
                .filter(|store_name| Field::stores_as(field_name, store_name))
                .cloned()
                .collect::<Vec<_>>();

            for store_name in store_names {
                let Some(value) = record.get(&store_name) else {
                    continue;
                };
                let details = FieldDetails {
                    id,
                    field_name,
                    store_field_name: &store_name,
                };

                match modifier(value, &details) {
                    FieldUpdate::Keep => {}
                    FieldUpdate::Set(updated) if &updated == value => {}
                    FieldUpdate::Set(updated) => {
                        record.insert(store_name, updated);
                        changed = true;
                    }
                    FieldUpdate::Delete => {
                        record.shift_remove(&store_name);
                        changed = true;
                    }
                }
            }
        }

        changed
    }

    fn evict(&mut self, options: &EvictOptions) -> bool {
        let id = options.id.as_deref().unwrap_or(ROOT_QUERY);

        let Some(field_name) = &options.field_name else {
            return self.records.shift_remove(id).is_some();
        };
        let Some(record) = self.records.get_mut(id) else {
            return false;
        };

        let before = record.len();
        record.retain(|store_name, _| !Field::stores_as(field_name, store_name));

        record.len() != before
    }

    fn gc(&mut self) -> Vec<String> {
        let mut reachable = HashSet::new();
        let mut pending = vec![ROOT_QUERY.to_string(), ROOT_MUTATION.to_string()];

        while let Some(id) = pending.pop() {
            let Some(record) = self.records.get(&id) else {
                continue;
            };
            if !reachable.insert(id) {
                continue;
            }
            for value in record.values() {
                collect_references(value, &mut pending);
            }
        }

        let removed = self
            .records
            .keys()
            .filter(|id| !reachable.contains(*id))
            .cloned()
            .collect::<Vec<_>>();

        if !removed.is_empty() {
            tracing::debug!(count = removed.len(), "removing unreachable records");
        }
        self.records.retain(|id, _| reachable.contains(id));

        removed
    }
}

fn reference(id: String) -> DataNode {
    DataNode::Record(Record::from([(REFERENCE_FIELD.to_string(), DataNode::String(id))]))
}

fn as_reference(value: &DataNode) -> Option<&str> {
    let record = value.as_record()?;
    if record.len() != 1 {
        return None;
    }

    record.get(REFERENCE_FIELD)?.as_str()
}

fn collect_references(value: &DataNode, references: &mut Vec<String>) {
    if let Some(id) = as_reference(value) {
        references.push(id.to_string());
        return;
    }

    match value {
        DataNode::List(items) => items.iter().for_each(|item| collect_references(item, references)),
        DataNode::Record(record) => record.values().for_each(|value| collect_references(value, references)),
        _ => {}
    }
}
