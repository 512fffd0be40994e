use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::DataNode;

impl Serialize for DataNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            DataNode::Null => serializer.serialize_unit(),
            DataNode::Boolean(boolean) => serializer.serialize_bool(*boolean),
            DataNode::Number(number) => number.serialize(serializer),
            DataNode::String(string) => serializer.serialize_str(string),
            DataNode::List(items) => serializer.collect_seq(items),
            DataNode::Record(record) => serializer.collect_map(record),
        }
    }
}

/// Goes through `serde_json::Value`, which keeps field order with `preserve_order`.
impl<'de> Deserialize<'de> for DataNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(DataNode::from)
    }
}
