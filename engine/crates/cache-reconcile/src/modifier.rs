use std::fmt;

use indexmap::IndexMap;
use normalized_value::{DataNode, Record};

/// A function from the currently cached value to a new one.
///
/// The argument is `None` when nothing is cached at that position. Returning `None`
/// leaves the cached value in place.
pub type ModifierFn = Box<dyn FnOnce(Option<&DataNode>) -> Option<Modifier>>;

/// Describes how to transform a cached value.
///
/// Plain data converts into a modifier that merges into the cache: records become
/// [`Modifier::Record`], lists become [`Modifier::List`] and scalars become
/// [`Modifier::Literal`]. Use [`Modifier::replace`] to overwrite a value wholesale.
pub enum Modifier {
    /// A final value, written as is. Never merged with what's cached.
    Literal(DataNode),
    /// A partial update, merged field by field over the cached record.
    Record(ModifierRecord),
    /// A list of entries. Record entries are matched against the cached list by identity.
    List(Vec<Modifier>),
    /// Computes the value (or a further modifier) from the cached value.
    Fn(ModifierFn),
}

impl Modifier {
    /// Overwrites the value at this position, ignoring whatever is cached.
    pub fn replace(value: impl Into<DataNode>) -> Self {
        Modifier::Literal(value.into())
    }

    pub fn update<F>(f: F) -> Self
    where
        F: FnOnce(Option<&DataNode>) -> Option<Modifier> + 'static,
    {
        Modifier::Fn(Box::new(f))
    }

    /// Like [`Modifier::update`], for positions that hold a list.
    ///
    /// When nothing (or something other than a list) is cached, `f` sees an empty list.
    pub fn update_list<F>(f: F) -> Self
    where
        F: FnOnce(&[DataNode]) -> Option<Modifier> + 'static,
    {
        Modifier::update(move |current| f(current.and_then(DataNode::as_list).unwrap_or_default()))
    }
}

impl fmt::Debug for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Modifier::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            Modifier::Record(record) => f.debug_tuple("Record").field(record).finish(),
            Modifier::List(entries) => f.debug_tuple("List").field(entries).finish(),
            Modifier::Fn(_) => f.write_str("Fn(..)"),
        }
    }
}

impl From<DataNode> for Modifier {
    fn from(value: DataNode) -> Self {
        match value {
            DataNode::Record(record) => Modifier::Record(ModifierRecord::from_record(record)),
            DataNode::List(items) => Modifier::List(items.into_iter().map(Into::into).collect()),
            scalar => Modifier::Literal(scalar),
        }
    }
}

impl From<serde_json::Value> for Modifier {
    fn from(value: serde_json::Value) -> Self {
        DataNode::from(value).into()
    }
}

impl From<ModifierRecord> for Modifier {
    fn from(value: ModifierRecord) -> Self {
        Modifier::Record(value)
    }
}

impl From<Vec<Modifier>> for Modifier {
    fn from(value: Vec<Modifier>) -> Self {
        Modifier::List(value)
    }
}

impl From<&str> for Modifier {
    fn from(value: &str) -> Self {
        Modifier::Literal(value.into())
    }
}

impl From<String> for Modifier {
    fn from(value: String) -> Self {
        Modifier::Literal(value.into())
    }
}

impl From<i64> for Modifier {
    fn from(value: i64) -> Self {
        Modifier::Literal(value.into())
    }
}

impl From<bool> for Modifier {
    fn from(value: bool) -> Self {
        Modifier::Literal(value.into())
    }
}

/// The field modifiers of a partial update, in insertion order.
#[derive(Default)]
pub struct ModifierRecord {
    fields: IndexMap<String, Modifier>,
}

impl ModifierRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// A partial update that merges every field of `record`.
    pub fn from_record(record: Record) -> Self {
        record.into_iter().map(|(name, value)| (name, value.into())).collect()
    }

    /// Adds a field modifier, replacing any previous modifier for that field.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, modifier: impl Into<Modifier>) -> Self {
        self.insert(name, modifier);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, modifier: impl Into<Modifier>) -> Option<Modifier> {
        self.fields.insert(name.into(), modifier.into())
    }

    pub fn get(&self, name: &str) -> Option<&Modifier> {
        self.fields.get(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Modifier)> + '_ {
        self.fields.iter().map(|(name, modifier)| (name.as_str(), modifier))
    }

    /// The fields that are plain values, which is all we can use to identify a
    /// record before its functions have run.
    pub(crate) fn literal_fields(&self) -> Record {
        self.fields
            .iter()
            .filter_map(|(name, modifier)| match modifier {
                Modifier::Literal(value) => Some((name.clone(), value.clone())),
                _ => None,
            })
            .collect()
    }
}

impl fmt::Debug for ModifierRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.fields.iter()).finish()
    }
}

impl FromIterator<(String, Modifier)> for ModifierRecord {
    fn from_iter<T: IntoIterator<Item = (String, Modifier)>>(iter: T) -> Self {
        ModifierRecord {
            fields: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for ModifierRecord {
    type Item = (String, Modifier);
    type IntoIter = <IndexMap<String, Modifier> as IntoIterator>::IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}
