use std::collections::BTreeMap;

use cache_reconcile::IdentityResolver;
use normalized_value::{DataNode, Record};

use crate::cache::{ROOT_MUTATION, ROOT_QUERY};

/// Configures how records are identified in the cache.
#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IdentityConfig {
    /// The field holding a record's type. Defaults to `__typename`
    pub typename_field: String,
    /// The fields tried, in order, to identify records of types without a policy.
    /// The first one present is used. Defaults to `id` then `_id`
    pub key_fields: Vec<String>,
    /// Per-type key fields. All of them are required to identify a record.
    pub type_policies: BTreeMap<String, TypePolicy>,
    /// Names of the root operation types
    pub root_types: RootTypes,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            typename_field: String::from("__typename"),
            key_fields: vec![String::from("id"), String::from("_id")],
            type_policies: Default::default(),
            root_types: Default::default(),
        }
    }
}

impl IdentityConfig {
    pub fn from_toml(input: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(input)
    }
}

#[derive(Clone, Debug, Default, PartialEq, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TypePolicy {
    /// An empty list makes the type a singleton
    pub key_fields: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RootTypes {
    pub query: String,
    pub mutation: String,
}

impl Default for RootTypes {
    fn default() -> Self {
        Self {
            query: String::from("Query"),
            mutation: String::from("Mutation"),
        }
    }
}

/// Identifies records by their typename & key fields, e.g. `User:1`
#[derive(Clone, Debug, Default)]
pub struct KeyFieldsIdentity {
    config: IdentityConfig,
}

impl KeyFieldsIdentity {
    pub fn new(config: IdentityConfig) -> Self {
        KeyFieldsIdentity { config }
    }

    pub fn config(&self) -> &IdentityConfig {
        &self.config
    }

    fn policy_identity(typename: &str, policy: &TypePolicy, record: &Record) -> Option<String> {
        let mut key = serde_json::Map::new();
        for field in &policy.key_fields {
            let Some(value) = record.get(field) else {
                tracing::trace!(typename, field = %field, "record is missing one of its key fields");
                return None;
            };
            key.insert(field.clone(), value.clone().into());
        }

        Some(format!("{typename}:{}", serde_json::Value::Object(key)))
    }

    fn default_identity(&self, typename: &str, record: &Record) -> Option<String> {
        let id = match self.config.key_fields.iter().find_map(|field| record.get(field))? {
            DataNode::Null => return None,
            DataNode::String(id) => id.clone(),
            DataNode::Number(id) => id.to_string(),
            other => other.to_string(),
        };

        Some(format!("{typename}:{id}"))
    }
}

impl IdentityResolver for KeyFieldsIdentity {
    fn identify(&self, record: &Record) -> Option<String> {
        let typename = record.get(&self.config.typename_field)?.as_str()?;

        if typename == self.config.root_types.query {
            return Some(ROOT_QUERY.to_string());
        }
        if typename == self.config.root_types.mutation {
            return Some(ROOT_MUTATION.to_string());
        }

        match self.config.type_policies.get(typename) {
            Some(policy) => Self::policy_identity(typename, policy, record),
            None => self.default_identity(typename, record),
        }
    }
}
