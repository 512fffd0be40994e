//! The documents that select data out of, or into, the cache.
//!
//! There is no parser here: documents are built programmatically (or synthesized
//! from a data shape) and printed as GraphQL when they need to be shown.

use std::{
    collections::BTreeMap,
    fmt::{self, Display, Formatter},
};

use serde::{Deserialize, Serialize};

use crate::cache::{Error, Result};

/// An ordered set of fields to select.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SelectionSet {
    fields: Vec<Field>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn field(mut self, field: impl Into<Field>) -> Self {
        self.push(field.into());
        self
    }

    /// Adds a field. A field that is already selected under the same name
    /// has the new sub-selection merged into it.
    pub fn push(&mut self, field: Field) {
        match self.fields.iter_mut().find(|existing| existing.name == field.name) {
            Some(existing) => {
                for nested in field.selection_set.fields {
                    existing.selection_set.push(nested);
                }
            }
            None => self.fields.push(field),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Field> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn indented(&self, indent_level: usize) -> IndentedSelectionSet<'_> {
        IndentedSelectionSet {
            selection_set: self,
            indent_level,
        }
    }
}

impl FromIterator<Field> for SelectionSet {
    fn from_iter<T: IntoIterator<Item = Field>>(iter: T) -> Self {
        let mut selection_set = SelectionSet::new();
        for field in iter {
            selection_set.push(field);
        }
        selection_set
    }
}

impl<'a> IntoIterator for &'a SelectionSet {
    type Item = &'a Field;
    type IntoIter = std::slice::Iter<'a, Field>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Display for SelectionSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.indented(0).fmt(f)
    }
}

/// A selected field, with its arguments and sub-selection.
#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    pub name: String,
    pub arguments: Vec<(String, Argument)>,
    pub selection_set: SelectionSet,
}

impl Field {
    pub fn new(name: impl Into<String>) -> Self {
        Field {
            name: name.into(),
            arguments: Vec::new(),
            selection_set: SelectionSet::new(),
        }
    }

    #[must_use]
    pub fn argument(mut self, name: impl Into<String>, argument: Argument) -> Self {
        self.arguments.push((name.into(), argument));
        self
    }

    #[must_use]
    pub fn selection_set(mut self, selection_set: SelectionSet) -> Self {
        self.selection_set = selection_set;
        self
    }

    /// Whether this field selects a scalar (or a list of them)
    pub fn is_leaf(&self) -> bool {
        self.selection_set.is_empty()
    }

    /// The name this field is stored under: the field name, followed by its
    /// arguments as sorted JSON when it has any. `{"id": $id}` is stored as
    /// `name({"id":"1"})` when `$id` is `"1"`.
    pub fn store_name(&self, variables: &Variables) -> Result<String> {
        if self.arguments.is_empty() {
            return Ok(self.name.clone());
        }

        let mut arguments = BTreeMap::new();
        for (name, argument) in &self.arguments {
            let value = match argument {
                Argument::Value(value) => value.clone(),
                Argument::Variable(variable) => variables
                    .get(variable)
                    .cloned()
                    .ok_or_else(|| Error::MissingVariable(variable.clone()))?,
            };
            arguments.insert(name.as_str(), value);
        }

        let arguments = serde_json::to_string(&arguments).map_err(|err| Error::Serialization(err.to_string()))?;

        Ok(format!("{}({arguments})", self.name))
    }

    /// Whether `store_name` is a stored instance of this field, with any arguments
    pub fn stores_as(name: &str, store_name: &str) -> bool {
        store_name
            .strip_prefix(name)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('('))
    }
}

impl From<&str> for Field {
    fn from(value: &str) -> Self {
        Field::new(value)
    }
}

impl From<String> for Field {
    fn from(value: String) -> Self {
        Field::new(value)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Argument {
    /// `$name`, resolved from the selector's variables
    Variable(String),
    Value(serde_json::Value),
}

impl Display for Argument {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Argument::Variable(name) => write!(f, "${name}"),
            Argument::Value(value) => write!(f, "{value}"),
        }
    }
}

/// A named selection on a single type.
#[derive(Clone, Debug, PartialEq)]
pub struct Fragment {
    pub name: String,
    pub type_condition: String,
    pub selection_set: SelectionSet,
}

impl Display for Fragment {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "fragment {} on {} {}", self.name, self.type_condition, self.selection_set)
    }
}

/// One or more fragment definitions.
#[derive(Clone, Debug, PartialEq)]
pub struct FragmentDocument {
    fragments: Vec<Fragment>,
}

impl FragmentDocument {
    pub fn new(fragment: Fragment) -> Self {
        FragmentDocument {
            fragments: vec![fragment],
        }
    }

    pub fn from_fragments(fragments: Vec<Fragment>) -> Self {
        FragmentDocument { fragments }
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    pub fn find(&self, name: &str) -> Option<&Fragment> {
        self.fragments.iter().find(|fragment| fragment.name == name)
    }
}

impl Display for FragmentDocument {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (index, fragment) in self.fragments.iter().enumerate() {
            let prefix = if index != 0 { "\n\n" } else { "" };
            write!(f, "{prefix}{fragment}")?;
        }

        Ok(())
    }
}

/// A query against the root query type.
#[derive(Clone, Debug, PartialEq)]
pub struct QueryDocument {
    pub name: Option<String>,
    pub selection_set: SelectionSet,
}

impl QueryDocument {
    pub fn new(selection_set: SelectionSet) -> Self {
        QueryDocument {
            name: None,
            selection_set,
        }
    }

    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl Display for QueryDocument {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "query {name} {}", self.selection_set),
            None => write!(f, "query {}", self.selection_set),
        }
    }
}

/// Variables of a query or fragment.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Variables(BTreeMap<String, serde_json::Value>);

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the variables from a JSON value.
    ///
    /// If the value is not an object then no variables are returned.
    pub fn from_json(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Object(object) => Variables(object.into_iter().collect()),
            _ => Self::default(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&serde_json::Value> {
        self.0.get(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<serde_json::Value>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Display for Variables {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (name, value)) in self.0.iter().enumerate() {
            write!(f, "{}{name}: {value}", if i == 0 { "" } else { ", " })?;
        }
        f.write_str("}")
    }
}

impl FromIterator<(String, serde_json::Value)> for Variables {
    fn from_iter<T: IntoIterator<Item = (String, serde_json::Value)>>(iter: T) -> Self {
        Variables(iter.into_iter().collect())
    }
}

macro_rules! write_indent {
    ($f:expr, $level:expr) => {
        write!($f, "{:indent$}", "", indent = $level * 2)
    };
}

struct IndentedSelectionSet<'a> {
    selection_set: &'a SelectionSet,
    indent_level: usize,
}

impl Display for IndentedSelectionSet<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "{{")?;

        for field in self.selection_set {
            write_indent!(f, self.indent_level + 1)?;
            write!(f, "{}", field.name)?;

            if !field.arguments.is_empty() {
                write!(f, "(")?;
                for (index, (name, argument)) in field.arguments.iter().enumerate() {
                    let prefix = if index != 0 { ", " } else { "" };
                    write!(f, "{prefix}{name}: {argument}")?;
                }
                write!(f, ")")?;
            }

            if !field.is_leaf() {
                write!(f, " {}", field.selection_set.indented(self.indent_level + 1))?;
            }

            writeln!(f)?;
        }

        write_indent!(f, self.indent_level)?;
        write!(f, "}}")
    }
}
