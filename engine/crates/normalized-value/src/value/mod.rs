use std::fmt;

use indexmap::IndexMap;
use serde_json::Number;

mod value_serde;

/// The field GraphQL uses to carry the concrete type of an object.
pub const TYPENAME_FIELD: &str = "__typename";

/// The fields of a record, in insertion order.
pub type Record = IndexMap<String, DataNode>;

/// A resolved value, for example `1`, `"Hello World!"` or `{"id": "1"}`.
///
/// There is deliberately no variant for "undefined": a value that is not
/// there is represented by its absence (a missing key, or `None`).
#[derive(Clone, Debug, Default, PartialEq)]
pub enum DataNode {
    /// `null`.
    #[default]
    Null,
    /// A boolean.
    Boolean(bool),
    /// A number.
    Number(Number),
    /// A string.
    String(String),
    /// A list of values.
    List(Vec<DataNode>),
    /// A keyed mapping of field names to values.
    Record(Record),
}

impl DataNode {
    pub fn empty_record() -> Self {
        DataNode::Record(Record::new())
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            DataNode::Record(record) => Some(record),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[DataNode]> {
        match self {
            DataNode::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            DataNode::String(string) => Some(string),
            _ => None,
        }
    }

    /// Looks up a field, if this is a record.
    pub fn get(&self, field: &str) -> Option<&DataNode> {
        self.as_record()?.get(field)
    }

    /// The `__typename` of this record, when there is one and it's a string.
    pub fn typename(&self) -> Option<&str> {
        self.get(TYPENAME_FIELD)?.as_str()
    }
}

impl From<bool> for DataNode {
    fn from(value: bool) -> Self {
        DataNode::Boolean(value)
    }
}

impl From<&str> for DataNode {
    fn from(value: &str) -> Self {
        DataNode::String(value.to_string())
    }
}

impl From<String> for DataNode {
    fn from(value: String) -> Self {
        DataNode::String(value)
    }
}

impl From<i64> for DataNode {
    fn from(value: i64) -> Self {
        DataNode::Number(value.into())
    }
}

impl From<Number> for DataNode {
    fn from(value: Number) -> Self {
        DataNode::Number(value)
    }
}

impl From<Record> for DataNode {
    fn from(value: Record) -> Self {
        DataNode::Record(value)
    }
}

impl From<Vec<DataNode>> for DataNode {
    fn from(value: Vec<DataNode>) -> Self {
        DataNode::List(value)
    }
}

impl From<serde_json::Value> for DataNode {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => DataNode::Null,
            serde_json::Value::Bool(boolean) => DataNode::Boolean(boolean),
            serde_json::Value::Number(num) => DataNode::Number(num),
            serde_json::Value::String(string) => DataNode::String(string),
            serde_json::Value::Array(list) => DataNode::List(list.into_iter().map(Into::into).collect()),
            serde_json::Value::Object(obj) => DataNode::Record(obj.into_iter().map(|(k, v)| (k, v.into())).collect()),
        }
    }
}

impl From<DataNode> for serde_json::Value {
    fn from(value: DataNode) -> Self {
        match value {
            DataNode::Null => serde_json::Value::Null,
            DataNode::Boolean(boolean) => serde_json::Value::Bool(boolean),
            DataNode::Number(num) => serde_json::Value::Number(num),
            DataNode::String(string) => serde_json::Value::String(string),
            DataNode::List(list) => serde_json::Value::Array(list.into_iter().map(Into::into).collect()),
            DataNode::Record(record) => {
                serde_json::Value::Object(record.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}

impl fmt::Display for DataNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}
