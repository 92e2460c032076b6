mod common;

use docbind::{memory::InMemoryStore, prelude::*};

use common::{TestResource, memory_store, seed};

type Collection<'a> = LazyCollection<'a, InMemoryStore, TestResource>;

fn explicit_pair() -> (Collection<'static>, Collection<'static>) {
    (
        LazyCollection::from_resources(vec![TestResource::new(
            fields! { "first" => "first", "second" => "second", "third" => "third" },
        )]),
        LazyCollection::from_resources(vec![TestResource::new(
            fields! { "first" => "1st", "second" => "2nd", "third" => "3rd" },
        )]),
    )
}

#[tokio::test]
async fn collections_serialize_to_json_arrays() {
    let store = memory_store();
    let resources = store.resources::<TestResource>();
    seed(&resources, 5).await;

    let mut collection = resources.all(FindOptions::default()).await.unwrap();
    assert_eq!(collection.size().await.unwrap(), 5);

    let json: serde_json::Value = serde_json::from_str(&collection.to_json().await.unwrap()).unwrap();
    let array = json.as_array().unwrap();

    assert_eq!(array.len(), 5);
    assert_eq!(array[1]["first"], "1_first");
    assert!(array[1]["_id"].is_string());
}

#[tokio::test]
async fn converting_to_an_array_is_repeatable() {
    let store = memory_store();
    let resources = store.resources::<TestResource>();
    seed(&resources, 5).await;

    let mut collection = TestResource::find_by_first(&resources, "1_first").await.unwrap();
    assert!(!collection.is_materialized());

    for resource in collection.each().await.unwrap() {
        assert_eq!(resource.first(), Some(&Value::from("1_first")));
    }

    let first = collection.to_a().await.unwrap().to_vec();
    let second = collection.to_a().await.unwrap().to_vec();

    assert_eq!(first.len(), 1);
    assert_eq!(first, second);
}

#[tokio::test]
async fn partial_iteration_does_not_consume_the_collection() {
    let store = memory_store();
    let resources = store.resources::<TestResource>();
    seed(&resources, 5).await;

    let mut collection = resources.all(FindOptions::default()).await.unwrap();

    assert_eq!(collection.each().await.unwrap().take(2).count(), 2);
    assert_eq!(collection.to_a().await.unwrap().len(), 5);
    assert_eq!(collection.each().await.unwrap().count(), 5);
}

#[tokio::test]
async fn size_matches_the_array_length() {
    let store = memory_store();
    let resources = store.resources::<TestResource>();
    seed(&resources, 5).await;

    let mut collection = TestResource::find_by_first(&resources, "1_first").await.unwrap();
    let size = collection.size().await.unwrap();

    assert_eq!(collection.to_a().await.unwrap().len(), size);

    let mut skipped = resources.all(FindOptions::new().skip(1).limit(3)).await.unwrap();
    assert_eq!(skipped.size().await.unwrap(), 3);
}

#[tokio::test]
async fn counts_honor_pagination_by_default() {
    let store = memory_store();
    let resources = store.resources::<TestResource>();
    seed(&resources, 5).await;

    let cases = [
        (FindOptions::new().limit(3), 3),
        (FindOptions::new().skip(2), 3),
        (FindOptions::new().skip(1).limit(3), 3),
    ];

    for (options, expected) in cases {
        let collection = resources.find(fields! {}, options).await.unwrap();

        assert_eq!(collection.count().await.unwrap(), expected);
        assert_eq!(collection.count_with_pagination(true).await.unwrap(), expected);
        assert_eq!(collection.count_with_pagination(false).await.unwrap(), 5);
    }
}

#[tokio::test]
async fn merging_leaves_the_operands_untouched() {
    let (mut first, mut second) = explicit_pair();
    let first_size = first.size().await.unwrap();
    let second_size = second.size().await.unwrap();

    let mut merged = first.merge(&second).await.unwrap();

    assert_eq!(merged.size().await.unwrap(), first_size + second_size);
    assert_eq!(first.size().await.unwrap(), first_size);
    assert_eq!(second.size().await.unwrap(), second_size);

    for element in first.snapshot().await.unwrap().iter().chain(&second.snapshot().await.unwrap()) {
        assert!(merged.contains(element).await.unwrap());
    }
}

#[tokio::test]
async fn addition_is_an_alias_for_merge() {
    let (mut first, mut second) = explicit_pair();
    let expected = first.size().await.unwrap() + second.size().await.unwrap();
    let elements = [first.snapshot().await.unwrap(), second.snapshot().await.unwrap()].concat();

    let mut merged = (first + second).await.unwrap();

    assert_eq!(merged.size().await.unwrap(), expected);

    for element in &elements {
        assert!(merged.contains(element).await.unwrap());
    }
}

#[tokio::test]
async fn merging_in_place_extends_the_receiver() {
    let (mut first, mut second) = explicit_pair();
    let first_size = first.size().await.unwrap();
    let second_size = second.size().await.unwrap();

    first.merge_in_place(&second).await.unwrap();

    assert_eq!(first.size().await.unwrap(), first_size + second_size);
    assert_eq!(second.size().await.unwrap(), second_size);

    for element in second.to_a().await.unwrap() {
        assert!(first.contains(element).await.unwrap());
    }
}

#[tokio::test]
async fn query_backed_collections_merge_with_explicit_ones() {
    let store = memory_store();
    let resources = store.resources::<TestResource>();
    seed(&resources, 5).await;

    let (explicit, _) = explicit_pair();
    let mut queried = TestResource::find_by_first(&resources, "2_first").await.unwrap();
    let stored = queried.first().await.unwrap().cloned().unwrap();

    let mut union = (queried.clone() + explicit.clone()).await.unwrap();
    assert_eq!(union.size().await.unwrap(), 2);
    assert!(union.contains(&stored).await.unwrap());

    let mut merged = explicit.merge(&queried).await.unwrap();
    assert_eq!(merged.size().await.unwrap(), 2);
    assert_eq!(merged.first().await.unwrap().and_then(TestResource::first), Some(&Value::from("first")));

    let mut receiver = resources.all(FindOptions::new().limit(2)).await.unwrap();
    receiver.merge_in_place(&explicit).await.unwrap();
    assert_eq!(receiver.size().await.unwrap(), 3);
    assert_eq!(receiver.count().await.unwrap(), 2);
}

#[tokio::test]
async fn addition_agrees_with_merge_on_paginated_queries() {
    let store = memory_store();
    let resources = store.resources::<TestResource>();
    seed(&resources, 5).await;

    let (explicit, _) = explicit_pair();
    let limited = resources.all(FindOptions::new().limit(3)).await.unwrap();

    let mut merged = limited.merge(&explicit).await.unwrap();
    let mut added = (limited.clone() + explicit.clone()).await.unwrap();

    for collection in [&merged, &added] {
        assert_eq!(collection.count().await.unwrap(), 4);
        assert_eq!(collection.count_with_pagination(false).await.unwrap(), 4);
    }

    resources.create(fields! { "first" => "late" }).await.unwrap();

    assert_eq!(added.count_with_pagination(false).await.unwrap(), 4);
    assert_eq!(added.size().await.unwrap(), 4);
    assert_eq!(merged.size().await.unwrap(), 4);
    assert_eq!(added.to_a().await.unwrap(), merged.to_a().await.unwrap());
}
