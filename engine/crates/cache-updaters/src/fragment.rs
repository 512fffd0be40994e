use std::borrow::Cow;

use normalized_value::{DataNode, Record, TYPENAME_FIELD};
use runtime::selection::{Field, Fragment, FragmentDocument, SelectionSet};

use crate::{Error, Result};

/// Builds a fragment selecting every field of `data`, named after its shape.
///
/// `{"__typename": "Test", "id": "1", "relation": {"__typename": "Nested", "id": "2"}}`
/// gives `fragment Testid_Nestedid on Test { ... }`. Lists are named after their field
/// and each of their entries, and selected by the union of the fields of their entries.
pub fn build_fragment(data: &DataNode) -> Result<FragmentDocument> {
    let typename = data
        .typename()
        .filter(|typename| !typename.is_empty())
        .ok_or(Error::MissingTypename)?;

    let record = data.as_record().ok_or(Error::MissingTypename)?;

    Ok(FragmentDocument::new(Fragment {
        name: format!("{typename}{}", field_names(data)),
        type_condition: typename.to_string(),
        selection_set: selection_set(record),
    }))
}

/// Picks a fragment from a document. A document with a single fragment doesn't
/// need a name.
pub fn select_fragment<'a>(document: &'a FragmentDocument, fragment_name: Option<&str>) -> Result<&'a Fragment> {
    match fragment_name {
        Some(name) => document
            .find(name)
            .ok_or_else(|| Error::UnknownFragment(name.to_string())),
        None => match document.fragments() {
            [fragment] => Ok(fragment),
            fragments => Err(Error::AmbiguousFragment {
                count: fragments.len(),
            }),
        },
    }
}

/// The fields of a record, or the indices of a list, each followed by the names of
/// whatever they nest.
fn field_names(value: &DataNode) -> String {
    let fields: Vec<(Cow<'_, str>, &DataNode)> = match value {
        DataNode::Record(record) => record
            .iter()
            .filter(|(field, _)| field.as_str() != TYPENAME_FIELD)
            .map(|(field, value)| (Cow::Borrowed(field.as_str()), value))
            .collect(),
        DataNode::List(items) => items
            .iter()
            .enumerate()
            .map(|(index, value)| (Cow::Owned(index.to_string()), value))
            .collect(),
        _ => Vec::new(),
    };

    let mut name = String::new();
    for (field, value) in fields {
        match value {
            DataNode::Record(_) | DataNode::List(_) => {
                name.push('_');
                name.push_str(value.typename().unwrap_or(&*field));
                name.push_str(&field_names(value));
            }
            _ => name.push_str(field.trim()),
        }
    }

    name
}

fn selection_set(record: &Record) -> SelectionSet {
    record
        .iter()
        .map(|(name, value)| {
            let field = Field::new(name.trim());
            match nested_record(value) {
                Some(nested) => field.selection_set(selection_set(&nested)),
                None => field,
            }
        })
        .collect()
}

/// The record a field selects into, if any. Empty records are selected as leaves.
fn nested_record(value: &DataNode) -> Option<Cow<'_, Record>> {
    let nested = match value {
        DataNode::Record(record) => Cow::Borrowed(record),
        DataNode::List(items) => Cow::Owned(aggregate_fields(items)),
        _ => return None,
    };

    (!nested.is_empty()).then_some(nested)
}

/// Merges the fields of every record in a list, later entries winning.
fn aggregate_fields(items: &[DataNode]) -> Record {
    let mut aggregate = Record::new();

    for record in items.iter().filter_map(DataNode::as_record) {
        for (name, value) in record {
            aggregate.insert(name.clone(), value.clone());
        }
    }

    aggregate
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    fn build(value: serde_json::Value) -> Result<FragmentDocument> {
        build_fragment(&value.into())
    }

    #[rstest]
    #[case::empty(json!({}))]
    #[case::empty_typename(json!({"__typename": "", "id": "1"}))]
    #[case::non_string_typename(json!({"__typename": 1, "id": "1"}))]
    #[case::not_a_record(json!("Test"))]
    fn fails_without_a_typename(#[case] data: serde_json::Value) {
        let error = build(data).unwrap_err();

        assert_eq!(error.to_string(), "Unable to build a fragment without a typename");
    }

    #[test]
    fn simple_data() {
        let document = build(json!({"__typename": "Test", "id": "test"})).unwrap();

        insta::assert_snapshot!(document, @r###"
        fragment Testid on Test {
          __typename
          id
        }
        "###);
    }

    #[test]
    fn nested_data() {
        let document = build(json!({
            "__typename": "Test",
            "id": "test",
            "relation": {"__typename": "Nested", "id": "nested"},
        }))
        .unwrap();

        insta::assert_snapshot!(document, @r###"
        fragment Testid_Nestedid on Test {
          __typename
          id
          relation {
            __typename
            id
          }
        }
        "###);
    }

    #[test]
    fn lists_select_the_union_of_their_entries() {
        let document = build(json!({
            "__typename": "Test",
            "things": [
                {"__typename": "Thing", "id": "1"},
                {"__typename": "Thing", "name": "second", "tags": ["a"]},
                "not a record",
            ],
            "empty": [],
            "settings": {},
        }))
        .unwrap();

        insta::assert_snapshot!(document, @r###"
        fragment Test_things_Thingid_Thingname_tags02_empty_settings on Test {
          __typename
          things {
            __typename
            id
            name
            tags
          }
          empty
          settings
        }
        "###);
    }

    #[rstest]
    #[case::list(json!({"__typename": "Test", "things": [{"__typename": "Thing", "id": "1"}]}), "Test_things_Thingid")]
    #[case::empty_list(json!({"__typename": "Test", "things": []}), "Test_things")]
    #[case::empty_record(json!({"__typename": "Test", "settings": {}}), "Test_settings")]
    #[case::null(json!({"__typename": "Test", "settings": null}), "Testsettings")]
    fn nested_values_are_prefixed_in_names(#[case] data: serde_json::Value, #[case] name: &str) {
        let document = build(data).unwrap();

        assert_eq!(document.fragments()[0].name, name);
    }

    #[test]
    fn nested_records_without_typename_are_named_after_their_field() {
        let document = build(json!({"__typename": "Test", "author": {"name": "Jane"}})).unwrap();

        assert_eq!(document.fragments()[0].name, "Test_authorname");
    }

    #[test]
    fn selecting_fragments() {
        let first = build(json!({"__typename": "Test", "id": "1"})).unwrap().fragments()[0].clone();
        let second = build(json!({"__typename": "Test", "name": "x"})).unwrap().fragments()[0].clone();
        let single = FragmentDocument::new(first.clone());
        let several = FragmentDocument::from_fragments(vec![first, second]);

        assert_eq!(select_fragment(&single, None).unwrap().name, "Testid");
        assert_eq!(select_fragment(&several, Some("Testname")).unwrap().name, "Testname");
        assert_eq!(
            select_fragment(&several, None).unwrap_err().to_string(),
            "Found 2 fragments, a fragment name must be provided to choose between them"
        );
        assert_eq!(
            select_fragment(&single, Some("Other")).unwrap_err().to_string(),
            "No fragment named `Other` in the document"
        );
    }
}
