#![allow(unused_crate_dependencies)]

use cache_reconcile::{Modifier, ModifierRecord};
use cache_updaters::{
    combine, evict, modify, modify_query, write_fragment, write_query, Error, EvictOptions, ModifyOptions,
    ModifyQueryOptions, MutationResult, WriteFragmentOptions, WriteQueryOptions,
};
use normalized_value::DataNode;
use runtime::{
    cache::{FieldUpdate, FragmentSelector, InMemoryCache, NormalizedCache, QuerySelector},
    selection::{Argument, Field, Fragment, FragmentDocument, QueryDocument, SelectionSet, Variables},
};
use serde_json::json;

fn data(value: serde_json::Value) -> DataNode {
    value.into()
}

/// `query GetTest($id: String) { test(id: $id) { __typename id relation { __typename id } } }`
fn test_query() -> QueryDocument {
    QueryDocument::new(
        SelectionSet::new().field(
            Field::new("test")
                .argument("id", Argument::Variable("id".into()))
                .selection_set(
                    SelectionSet::new()
                        .field("__typename")
                        .field("id")
                        .field(Field::new("relation").selection_set(SelectionSet::new().field("__typename").field("id"))),
                ),
        ),
    )
    .named("GetTest")
}

fn id_variables(id: &str) -> Variables {
    Variables::from_json(json!({"id": id}))
}

fn read_query(cache: &InMemoryCache, query: &QueryDocument, variables: &Variables) -> Option<DataNode> {
    cache.read_query(&QuerySelector::new(query, variables), false).unwrap()
}

fn list_query() -> QueryDocument {
    QueryDocument::new(
        SelectionSet::new().field(
            Field::new("tests").selection_set(SelectionSet::new().field("__typename").field("id").field("name")),
        ),
    )
    .named("ListTests")
}

fn cache_with_list() -> InMemoryCache {
    let mut cache = InMemoryCache::default();
    let query = list_query();
    cache
        .write_query(
            &QuerySelector::new(&query, &Variables::new()),
            data(json!({"tests": [
                {"__typename": "Test", "id": "one", "name": "One"},
                {"__typename": "Test", "id": "two", "name": "Two"},
            ]})),
        )
        .unwrap();
    cache
}

#[test]
fn combined_updaters_write_one_after_the_other() {
    let mut cache = InMemoryCache::default();
    let query = test_query();
    let writes = ["thingy", "other-thingy"].map(|id| {
        let query = query.clone();
        write_query(move |result, _| {
            let mut test = json!({"__typename": "Test", "id": id});
            if let Some(nested) = result.get("nested") {
                test["relation"] = nested.clone().into();
            }

            WriteQueryOptions::new(query.clone(), json!({"test": test}))
                .variables(id_variables(id))
                .into()
        })
    });
    let nested = json!({"__typename": "Nested", "id": "nested"});

    combine(writes)(&mut cache, &MutationResult::with_data(json!({"nested": nested.clone()}))).unwrap();

    for id in ["thingy", "other-thingy"] {
        assert_eq!(
            read_query(&cache, &query, &id_variables(id)),
            Some(data(json!({"test": {"__typename": "Test", "id": id, "relation": nested.clone()}})))
        );
    }
}

#[test]
fn combined_updaters_run_in_order() {
    let mut cache = InMemoryCache::default();
    let query = QueryDocument::new(
        SelectionSet::new().field(Field::new("test").selection_set(SelectionSet::new().field("__typename").field("id"))),
    );
    let write = |id: &'static str| {
        let query = query.clone();
        write_query(move |_, _| {
            WriteQueryOptions::new(query.clone(), json!({"test": {"__typename": "Test", "id": id}})).into()
        })
    };

    combine([write("thingy"), write("other-thingy")])(&mut cache, &MutationResult::default()).unwrap();

    assert_eq!(
        read_query(&cache, &query, &Variables::new()),
        Some(data(json!({"test": {"__typename": "Test", "id": "other-thingy"}})))
    );
}

#[test]
fn write_fragment_builds_its_fragment_and_id_from_the_data() {
    let mut cache = InMemoryCache::default();
    let update = write_fragment(|result, _| WriteFragmentOptions::new(result.data.clone().unwrap_or_default()).into());

    update(
        &mut cache,
        &MutationResult::with_data(json!({
            "__typename": "Test",
            "id": "thingy",
            "relation": {"__typename": "Nested", "id": "nested"},
        })),
    )
    .unwrap();

    assert_eq!(
        cache.extract(),
        data(json!({
            "Nested:nested": {"__typename": "Nested", "id": "nested"},
            "Test:thingy": {"__typename": "Test", "id": "thingy", "relation": {"__ref": "Nested:nested"}},
        }))
    );
}

#[test]
fn write_fragment_requires_an_identity() {
    let mut cache = InMemoryCache::default();
    let fragment = FragmentDocument::new(Fragment {
        name: "Anonymous".into(),
        type_condition: "Test".into(),
        selection_set: SelectionSet::new().field("name"),
    });
    let update = write_fragment(move |_, _| {
        WriteFragmentOptions::new(json!({"name": "nameless"}))
            .fragment(fragment.clone())
            .into()
    });

    let error = update(&mut cache, &MutationResult::default()).unwrap_err();

    assert!(matches!(error, Error::MissingIdentity));
    assert_eq!(cache.extract(), data(json!({})));
}

#[test]
fn write_fragment_with_an_explicit_id() {
    let mut cache = InMemoryCache::default();
    let fragment = FragmentDocument::new(Fragment {
        name: "Settings".into(),
        type_condition: "Settings".into(),
        selection_set: SelectionSet::new().field("theme"),
    });
    let update = write_fragment(move |_, _| {
        WriteFragmentOptions::new(json!({"theme": "dark"}))
            .id("Settings:{}")
            .fragment(fragment.clone())
            .into()
    });

    update(&mut cache, &MutationResult::default()).unwrap();

    assert_eq!(cache.extract(), data(json!({"Settings:{}": {"theme": "dark"}})));
}

#[test]
fn modify_query_appends_to_a_cached_list() {
    let mut cache = cache_with_list();
    let update = modify_query(|result, _| {
        let created = result.get("createTest").cloned();

        ModifyQueryOptions::new(list_query(), move |_| {
            let created = created.clone();
            ModifierRecord::new()
                .field(
                    "tests",
                    Modifier::update_list(move |tests| {
                        let mut tests = tests.iter().cloned().map(Modifier::from).collect::<Vec<_>>();
                        tests.extend(created.map(Modifier::from));
                        Some(tests.into())
                    }),
                )
                .into()
        })
        .into()
    });

    update(
        &mut cache,
        &MutationResult::with_data(json!({"createTest": {"__typename": "Test", "id": "three", "name": "Three"}})),
    )
    .unwrap();

    assert_eq!(
        read_query(&cache, &list_query(), &Variables::new()),
        Some(data(json!({"tests": [
            {"__typename": "Test", "id": "one", "name": "One"},
            {"__typename": "Test", "id": "two", "name": "Two"},
            {"__typename": "Test", "id": "three", "name": "Three"},
        ]})))
    );
}

#[test]
fn modify_query_merges_list_entries_by_identity() {
    let mut cache = cache_with_list();
    let update = modify_query(|_, _| {
        ModifyQueryOptions::new(list_query(), |_| {
            ModifierRecord::new()
                .field(
                    "tests",
                    Modifier::List(vec![
                        ModifierRecord::new()
                            .field("__typename", "Test")
                            .field("id", "two")
                            .field(
                                "name",
                                Modifier::update(|name| Some(format!("{} renamed", name?.as_str()?).into())),
                            )
                            .into(),
                        ModifierRecord::new()
                            .field("__typename", "Test")
                            .field("id", "one")
                            .into(),
                    ]),
                )
                .into()
        })
        .optimistic(false)
        .into()
    });

    update(&mut cache, &MutationResult::default()).unwrap();

    assert_eq!(
        read_query(&cache, &list_query(), &Variables::new()),
        Some(data(json!({"tests": [
            {"__typename": "Test", "id": "two", "name": "Two renamed"},
            {"__typename": "Test", "id": "one", "name": "One"},
        ]})))
    );
}

#[test]
fn modify_query_does_nothing_when_the_query_is_not_cached() {
    let mut cache = InMemoryCache::default();
    let query = QueryDocument::new(
        SelectionSet::new().field(Field::new("test").selection_set(SelectionSet::new().field("__typename").field("id"))),
    );
    let update = {
        let query = query.clone();
        modify_query(move |result, _| {
            let data = result.data.clone().unwrap_or_default();
            ModifyQueryOptions::new(query.clone(), move |_| data.clone().into()).into()
        })
    };

    update(
        &mut cache,
        &MutationResult::with_data(json!({"test": {"__typename": "Test", "id": "thingy"}})),
    )
    .unwrap();

    assert_eq!(read_query(&cache, &query, &Variables::new()), None);
    assert_eq!(cache.extract(), data(json!({})));
}

#[test]
fn modify_query_does_nothing_when_the_variables_do_not_match() {
    let mut cache = InMemoryCache::default();
    let query = test_query();
    cache
        .write_query(
            &QuerySelector::new(&query, &id_variables("other")),
            data(json!({"test": {
                "__typename": "Test",
                "id": "other",
                "relation": {"__typename": "Nested", "id": "nested"},
            }})),
        )
        .unwrap();
    let before = cache.extract();

    let update = modify_query(|result, _| {
        let data = result.data.clone().unwrap_or_default();
        ModifyQueryOptions::new(test_query(), move |_| data.clone().into())
            .variables(id_variables("thingy"))
            .into()
    });
    update(
        &mut cache,
        &MutationResult::with_data(json!({"test": {"__typename": "Test", "id": "thingy"}})),
    )
    .unwrap();

    assert_eq!(read_query(&cache, &query, &id_variables("thingy")), None);
    assert_eq!(cache.extract(), before);
}

/// `query { test { __typename firstName } }`
fn first_name_query() -> QueryDocument {
    QueryDocument::new(
        SelectionSet::new().field(
            Field::new("test").selection_set(SelectionSet::new().field("__typename").field("firstName")),
        ),
    )
}

fn cache_with_session() -> InMemoryCache {
    let mut cache = InMemoryCache::default();
    let query = first_name_query();
    cache
        .write_query(
            &QuerySelector::new(&query, &Variables::new()).id(Some("Session:1")),
            data(json!({"test": {"__typename": "Test", "firstName": "Initial firstName"}})),
        )
        .unwrap();
    cache
}

fn read_session(cache: &InMemoryCache) -> Option<DataNode> {
    let query = first_name_query();
    let variables = Variables::new();
    cache
        .read_query(&QuerySelector::new(&query, &variables).id(Some("Session:1")), false)
        .unwrap()
}

#[test]
fn write_query_can_be_rooted_at_another_record() {
    let mut cache = cache_with_session();
    let update = write_query(|result, _| {
        WriteQueryOptions::new(first_name_query(), result.data.clone().unwrap_or_default())
            .id("Session:1")
            .into()
    });

    update(
        &mut cache,
        &MutationResult::with_data(json!({"test": {"__typename": "Test", "firstName": "Test"}})),
    )
    .unwrap();

    assert_eq!(
        read_session(&cache),
        Some(data(json!({"test": {"__typename": "Test", "firstName": "Test"}})))
    );
    assert_eq!(read_query(&cache, &first_name_query(), &Variables::new()), None);
}

#[test]
fn modify_query_can_be_rooted_at_another_record() {
    let mut cache = cache_with_session();
    let update = modify_query(|_, _| {
        ModifyQueryOptions::new(first_name_query(), |_| json!({"test": {"firstName": "Test"}}).into())
            .id("Session:1")
            .into()
    });

    update(&mut cache, &MutationResult::default()).unwrap();

    assert_eq!(
        read_session(&cache),
        Some(data(json!({"test": {"__typename": "Test", "firstName": "Test"}})))
    );
    assert_eq!(cache.get("ROOT_QUERY"), None);
}

#[test]
fn skipped_modify_query_leaves_the_cache_alone() {
    let mut cache = cache_with_list();
    let before = cache.extract();
    let update = modify_query(|_, _| {
        ModifyQueryOptions::new(list_query(), |_| json!({"tests": []}).into())
            .skip(true)
            .into()
    });

    update(&mut cache, &MutationResult::default()).unwrap();

    assert_eq!(cache.extract(), before);
}

#[test]
fn evict_collects_unreachable_records() {
    let mut cache = cache_with_list();
    let update = evict(|_, _| EvictOptions::default().field("tests").into());

    update(&mut cache, &MutationResult::default()).unwrap();

    assert_eq!(cache.extract(), data(json!({"ROOT_QUERY": {}})));
}

#[test]
fn evict_can_skip_garbage_collection() {
    let mut cache = cache_with_list();
    let update = evict(|_, _| {
        EvictOptions {
            skip_garbage_collection: true,
            ..EvictOptions::default().field("tests")
        }
        .into()
    });

    update(&mut cache, &MutationResult::default()).unwrap();

    assert!(cache.get("Test:one").is_some());
    assert!(cache.get("Test:two").is_some());
}

#[test]
fn evict_a_batch_of_records() {
    let mut cache = cache_with_list();
    let update = evict(|result, _| {
        result
            .get("deleted")
            .and_then(DataNode::as_list)
            .unwrap_or_default()
            .iter()
            .filter_map(|id| Some(EvictOptions::record(format!("Test:{}", id.as_str()?))))
            .collect::<Vec<_>>()
            .into()
    });

    update(&mut cache, &MutationResult::with_data(json!({"deleted": ["one", "two"]}))).unwrap();

    assert_eq!(cache.get("Test:one"), None);
    assert_eq!(cache.get("Test:two"), None);
    assert_eq!(
        read_query(&cache, &list_query(), &Variables::new()),
        Some(data(json!({"tests": []})))
    );
}

#[test]
fn modify_updates_stored_fields() {
    let mut cache = cache_with_list();
    let update = modify(|_, _| {
        ModifyOptions::new(Some("Test:one".into()))
            .field("name", |name, _| match name.as_str() {
                Some(name) => FieldUpdate::Set(name.to_uppercase().into()),
                None => FieldUpdate::Keep,
            })
            .into()
    });

    update(&mut cache, &MutationResult::default()).unwrap();

    assert_eq!(
        cache.get("Test:one").and_then(|record| record.get("name")),
        Some(&data(json!("ONE")))
    );
}

#[test]
fn modify_can_drop_list_entries() {
    let mut cache = cache_with_list();
    let update = modify(|_, _| {
        ModifyOptions::new(None)
            .field("tests", |tests, _| {
                let tests = tests
                    .as_list()
                    .unwrap_or_default()
                    .iter()
                    .filter(|test| test.get("__ref").and_then(DataNode::as_str) != Some("Test:one"))
                    .cloned()
                    .collect::<Vec<_>>();
                FieldUpdate::Set(tests.into())
            })
            .into()
    });

    update(&mut cache, &MutationResult::default()).unwrap();

    assert_eq!(
        read_query(&cache, &list_query(), &Variables::new()),
        Some(data(json!({"tests": [{"__typename": "Test", "id": "two", "name": "Two"}]})))
    );
}

#[test]
fn fragment_writes_read_back_through_a_selector() {
    let mut cache = InMemoryCache::default();
    let document = FragmentDocument::new(Fragment {
        name: "Testname".into(),
        type_condition: "Test".into(),
        selection_set: SelectionSet::new().field("__typename").field("id").field("name"),
    });
    let update = {
        let document = document.clone();
        write_fragment(move |_, _| {
            WriteFragmentOptions::new(json!({"__typename": "Test", "id": "thingy", "name": "Thing"}))
                .fragment(document.clone())
                .into()
        })
    };

    update(&mut cache, &MutationResult::default()).unwrap();

    let read = cache
        .read_fragment(
            &FragmentSelector {
                id: "Test:thingy",
                fragment: &document.fragments()[0],
                variables: &Variables::new(),
            },
            true,
        )
        .unwrap();
    assert_eq!(read, Some(data(json!({"__typename": "Test", "id": "thingy", "name": "Thing"}))));
}

