mod common;

use bson::oid::ObjectId;
use chrono::{DateTime, NaiveDate, Utc};
use docbind::{index::IndexKey, prelude::*};
use rust_decimal::Decimal;
use std::str::FromStr;

use common::{CountingBackend, TestResource, TestTimedResource, memory_store};

#[derive(Debug, Clone, PartialEq, Resource)]
#[attribute(first, index)]
#[attribute(first, finder = "lookup_first")]
struct RedeclaredResource(Entity);

#[test]
fn accessors_read_and_write_attributes() {
    let mut resource = TestResource::new(fields! { "first" => "first" });

    assert_eq!(resource.first(), Some(&Value::from("first")));
    assert_eq!(resource.second(), None);

    resource.set_second("second");
    resource.set_third(3);

    assert_eq!(resource.second().and_then(Value::as_str), Some("second"));
    assert_eq!(resource.third().and_then(Value::as_i64), Some(3));
}

#[test]
fn indexed_attributes_are_registered_in_declaration_order() {
    let registry = TestResource::registry();

    assert_eq!(registry.indices(), vec!["first", "second"]);
    assert_eq!(
        registry.index_keys(),
        vec![
            IndexKey::new("first", IndexOrder::Ascending),
            IndexKey::new("second", IndexOrder::Ascending),
        ]
    );
    assert_eq!(registry.finder_name_for("first").as_deref(), Some("find_by_first"));
    assert_eq!(registry.finder_name_for("third").as_deref(), Some("find_by_third_attribute"));
    assert!(TestTimedResource::registry().indices().is_empty());
}

#[test]
fn redeclared_attributes_keep_the_last_declaration() {
    let registry = RedeclaredResource::registry();

    assert_eq!(registry.len(), 1);
    assert!(registry.indices().is_empty());
    assert_eq!(registry.finder_name_for("first").as_deref(), Some("lookup_first"));
}

#[test]
fn collection_names_derive_from_the_type_name() {
    assert_eq!(TestResource::collection_name(), "testresources");
    assert_eq!(TestTimedResource::collection_name(), "testtimedresources");
    assert_eq!(RedeclaredResource::collection_name(), "redeclaredresources");
}

#[test]
fn parameters_are_sanitized_and_coerced() {
    let resource = TestResource::new(fields! {
        "o*p#t>i_o@n)s" => "test",
        "option" => Utc::now().date_naive(),
        "another" => Utc::now().naive_utc(),
        "amount" => Decimal::from_str("1.00").unwrap(),
    });
    let hash = resource.to_hash();

    assert_eq!(hash.keys().next().map(String::as_str), Some("o_p_t_i_o_n_s"));
    assert!(matches!(hash["option"], Value::Timestamp(_)));
    assert!(matches!(hash["another"], Value::Timestamp(_)));
    assert_eq!(hash["amount"], Value::Float(1.0));
}

#[test]
fn to_hash_holds_the_given_fields() {
    let resource = TestResource::new(fields! { "first" => "first", "second" => "second", "third" => "third" });
    let hash = resource.to_hash();

    assert_eq!(hash.len(), 3);
    assert_eq!(hash["first"], Value::from("first"));
    assert_eq!(hash["second"], Value::from("second"));
    assert_eq!(hash["third"], Value::from("third"));
}

#[tokio::test]
async fn indices_are_ensured_once_per_type() {
    let store = ResourceStore::new(CountingBackend::new());
    let resources = store.resources::<TestResource>();

    resources
        .create(fields! { "first" => "first", "second" => "second", "third" => "third" })
        .await
        .unwrap();
    resources.all(FindOptions::default()).await.unwrap();
    resources.find(fields! { "first" => "first" }, FindOptions::default()).await.unwrap();
    TestResource::find_by_second(&resources, "second").await.unwrap();

    assert_eq!(store.backend().ensure_calls(), 1);
    assert!(store.index_manager().is_ensured::<TestResource>().await);
}

#[tokio::test]
async fn failed_index_creation_is_retried_by_the_next_query() {
    let store = ResourceStore::new(CountingBackend::failing(1));
    let resources = store.resources::<TestResource>();

    let mut resource = resources.new(fields! { "first" => "first" });
    assert!(matches!(resources.save(&mut resource).await, Err(StoreError::Backend(_))));
    assert!(!resource.is_persisted());
    assert!(resource.id().is_none());

    resources.all(FindOptions::default()).await.unwrap();
    resources.save(&mut resource).await.unwrap();

    assert_eq!(store.backend().ensure_calls(), 2);
    assert!(resource.is_persisted());
}

#[tokio::test]
async fn dropping_a_collection_starts_over() {
    let store = ResourceStore::new(CountingBackend::new());
    let resources = store.resources::<TestResource>();
    resources.create(fields! { "first" => "first" }).await.unwrap();

    store.drop_collection::<TestResource>().await.unwrap();

    let mut all = resources.all(FindOptions::default()).await.unwrap();
    assert_eq!(all.size().await.unwrap(), 0);
    assert_eq!(store.backend().ensure_calls(), 2);
}

#[tokio::test]
async fn created_resources_can_be_retrieved() {
    let store = memory_store();
    let resources = store.resources::<TestResource>();

    let resource = resources
        .create(fields! { "first" => "first", "second" => "second", "third" => "third" })
        .await
        .unwrap();
    assert!(resource.is_persisted());

    let found = resources.get(resource.id().unwrap()).await.unwrap().unwrap();

    assert_eq!(found.id(), resource.id());
    assert_eq!(found.first(), resource.first());
    assert_eq!(found.second(), resource.second());
    assert_eq!(found.third(), resource.third());
}

#[tokio::test]
async fn saving_twice_updates_in_place() {
    let store = memory_store();
    let resources = store.resources::<TestResource>();

    let mut resource = resources.new(fields! { "first" => "first", "second" => "second" });
    resources.save(&mut resource).await.unwrap();
    let original_id = resource.id().copied().unwrap();

    let mut all = resources.all(FindOptions::default()).await.unwrap();
    assert_eq!(all.count().await.unwrap(), 1);
    assert_eq!(all.first().await.unwrap().and_then(Resource::id), Some(&original_id));

    resource.set_first("third");
    resources.save(&mut resource).await.unwrap();

    assert_eq!(resource.id(), Some(&original_id));

    let mut all = resources.all(FindOptions::default()).await.unwrap();
    assert_eq!(all.count().await.unwrap(), 1);
    assert_eq!(
        all.first().await.unwrap().and_then(TestResource::first),
        Some(&Value::from("third"))
    );
}

#[tokio::test]
async fn resources_are_found_by_native_and_string_ids() {
    let store = memory_store();
    let resources = store.resources::<TestResource>();
    let resource = resources
        .create(fields! { "first" => "first", "second" => "second" })
        .await
        .unwrap();
    let id = resource.id().copied().unwrap();

    let by_native = resources.find_by_id(id).await.unwrap().unwrap();
    let by_string = resources.find_by_id(id.to_hex()).await.unwrap().unwrap();

    for found in [by_native, by_string] {
        assert_eq!(found.id(), Some(&id));
        assert_eq!(found.first(), resource.first());
        assert_eq!(found.second(), resource.second());
    }
}

#[tokio::test]
async fn unknown_or_malformed_ids_find_nothing() {
    let store = memory_store();
    let resources = store.resources::<TestResource>();
    resources.create(fields! { "first" => "first" }).await.unwrap();

    assert!(resources.find_by_id("4eb8f3570e02e10cce000002").await.unwrap().is_none());
    assert!(resources.find_by_id(ObjectId::new()).await.unwrap().is_none());
    assert!(resources.get("not an id").await.unwrap().is_none());
}

#[tokio::test]
async fn queries_filter_and_limit() {
    let store = memory_store();
    let resources = store.resources::<TestResource>();
    resources.create(fields! { "first" => "first", "second" => "second" }).await.unwrap();
    resources.create(fields! { "first" => "first", "second" => "2nd" }).await.unwrap();

    let mut firsts = resources.find(fields! { "first" => "first" }, FindOptions::default()).await.unwrap();
    assert_eq!(firsts.size().await.unwrap(), 2);

    let mut seconds = resources.find(fields! { "second" => "2nd" }, FindOptions::default()).await.unwrap();
    assert_eq!(seconds.size().await.unwrap(), 1);

    let mut limited = resources.find(fields! { "first" => "first" }, FindOptions::new().limit(1)).await.unwrap();
    assert_eq!(limited.size().await.unwrap(), 1);
}

#[tokio::test]
async fn all_returns_every_resource_up_to_the_limit() {
    let store = memory_store();
    let resources = store.resources::<TestResource>();

    let mut empty = resources.all(FindOptions::default()).await.unwrap();
    assert_eq!(empty.size().await.unwrap(), 0);

    for _ in 0..2 {
        resources.create(fields! { "first" => "first", "second" => "second" }).await.unwrap();
    }

    let mut all = resources.all(FindOptions::default()).await.unwrap();
    assert_eq!(all.size().await.unwrap(), 2);

    let mut limited = resources.all(FindOptions::new().limit(1)).await.unwrap();
    assert_eq!(limited.size().await.unwrap(), 1);
}

#[tokio::test]
async fn generated_finders_query_by_attribute() {
    let store = memory_store();
    let resources = store.resources::<TestResource>();
    resources
        .create(fields! { "first" => "first", "second" => "second", "third" => "third" })
        .await
        .unwrap();

    let mut by_first = TestResource::find_by_first(&resources, "first").await.unwrap();
    let mut by_third = TestResource::find_by_third_attribute(&resources, "third").await.unwrap();
    let mut by_name = resources.call_finder("find_by_third_attribute", "third").await.unwrap();
    let mut missing = TestResource::find_by_second(&resources, "nothing").await.unwrap();

    assert_eq!(by_first.size().await.unwrap(), 1);
    assert_eq!(by_third.size().await.unwrap(), 1);
    assert_eq!(by_name.size().await.unwrap(), 1);
    assert_eq!(missing.size().await.unwrap(), 0);

    assert!(matches!(
        resources.call_finder("find_by_third", "third").await,
        Err(StoreError::UnknownFinder(..))
    ));
}

#[tokio::test]
async fn resources_are_found_by_day() {
    let store = memory_store();
    let resources = store.resources::<TestTimedResource>();
    let at = NaiveDate::from_ymd_opt(2011, 11, 11)
        .unwrap()
        .and_hms_opt(11, 11, 0)
        .unwrap();
    resources.create(fields! { "first" => "hallo", "at" => at }).await.unwrap();

    let mut same_day = resources.find_by_day(NaiveDate::from_ymd_opt(2011, 11, 11).unwrap()).await.unwrap();
    assert_eq!(same_day.size().await.unwrap(), 1);
    assert_eq!(
        same_day.first().await.unwrap().and_then(TestTimedResource::first),
        Some(&Value::from("hallo"))
    );

    let mut day_before = resources.find_by_day(NaiveDate::from_ymd_opt(2011, 11, 10).unwrap()).await.unwrap();
    assert_eq!(day_before.size().await.unwrap(), 0);

    let mut from_timestamp = resources.find_by_day(at.and_utc()).await.unwrap();
    assert_eq!(from_timestamp.size().await.unwrap(), 1);
}

#[tokio::test]
async fn day_windows_include_midnight_and_exclude_the_next_one() {
    let store = memory_store();
    let resources = store.resources::<TestTimedResource>();
    let day = NaiveDate::from_ymd_opt(2011, 11, 11).unwrap();
    let next = NaiveDate::from_ymd_opt(2011, 11, 12).unwrap();

    resources.create(fields! { "first" => "start", "at" => day.and_hms_opt(0, 0, 0).unwrap() }).await.unwrap();
    resources.create(fields! { "first" => "next", "at" => next.and_hms_opt(0, 0, 0).unwrap() }).await.unwrap();

    let mut found = resources.find_by_day(day).await.unwrap();
    let names = found
        .each()
        .await
        .unwrap()
        .filter_map(TestTimedResource::first)
        .cloned()
        .collect::<Vec<_>>();

    assert_eq!(names, vec![Value::from("start")]);
}

#[tokio::test]
async fn zoned_days_are_matched_in_utc() {
    let store = memory_store();
    let resources = store.resources::<TestTimedResource>();
    let day = NaiveDate::from_ymd_opt(2011, 11, 11).unwrap();

    resources.create(fields! { "first" => "late", "at" => day.and_hms_opt(23, 0, 0).unwrap() }).await.unwrap();
    resources
        .create(fields! { "first" => "next", "at" => NaiveDate::from_ymd_opt(2011, 11, 12).unwrap() })
        .await
        .unwrap();

    let zoned = DateTime::parse_from_rfc3339("2011-11-12T01:00:00+02:00").unwrap();
    let mut found = resources.find_by_day(zoned).await.unwrap();

    assert_eq!(found.size().await.unwrap(), 1);
    assert_eq!(
        found.first().await.unwrap().and_then(TestTimedResource::first),
        Some(&Value::from("late"))
    );
}

#[tokio::test]
async fn empty_days_yield_empty_collections() {
    let store = memory_store();
    let resources = store.resources::<TestResource>();

    let mut collection = resources.find_by_day(NaiveDate::from_ymd_opt(2011, 11, 8).unwrap()).await.unwrap();

    assert!(collection.is_empty().await.unwrap());
}
