//! End-to-end tests driving the full stack: token compilation, collection
//! lifecycle, CRUD with soft deletes, and query execution against the real
//! SQLite backend.

use futures::executor::block_on;
use serde::{Deserialize, Serialize};
use serde_json::json;

use silt::prelude::*;
use silt::sqlite::SqliteStore;

fn store() -> DocumentStore<SqliteStore> {
    DocumentStore::new(SqliteStore::in_memory().unwrap())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Pet {
    name: String,
    age: i64,
}

impl Record for Pet {
    fn collection_name() -> &'static str {
        "pets"
    }
}

#[test]
fn collections_appear_on_ensure_and_stay() {
    let store = store();
    block_on(async {
        assert!(!store.collection_exists("pets").await.unwrap());

        store.ensure_collection("pets").await.unwrap();
        assert!(store.collection_exists("pets").await.unwrap());

        // Ensuring again is a no-op, not an error.
        store.ensure_collection("pets").await.unwrap();
        assert!(store.collection_exists("pets").await.unwrap());
    });
}

#[test]
fn insert_then_fetch_round_trips_the_payload() {
    let store = store();
    block_on(async {
        let pets = store.collection("pets");
        let payload = json!({"name": "Milo", "age": 3, "details": {"gender": "M"}});

        let id = pets.insert(payload.clone()).await.unwrap();
        let doc = pets.get(id).await.unwrap();

        assert_eq!(doc.id, id);
        assert!(!doc.deleted);
        assert_eq!(doc.payload, payload);
    });
}

#[test]
fn soft_deleted_documents_leave_default_reads() {
    let store = store();
    block_on(async {
        let pets = store.collection("pets");
        let id = pets.insert(json!({"name": "Milo"})).await.unwrap();

        pets.soft_delete(id).await.unwrap();

        assert!(matches!(
            pets.get(id).await,
            Err(StoreError::DocumentNotFound(_, _))
        ));
        assert_eq!(pets.count(false).await.unwrap(), 0);
        assert_eq!(pets.count(true).await.unwrap(), 1);
        assert!(pets.list(false).await.unwrap().is_empty());
        assert_eq!(pets.list(true).await.unwrap().len(), 1);
    });
}

#[test]
fn modify_creates_with_the_exact_identity_when_absent() {
    let store = store();
    block_on(async {
        let pets = store.collection("pets");

        let outcome = pets.modify(42, json!({"name": "Milo"})).await.unwrap();
        assert_eq!(outcome, UpsertOutcome::Created);

        let doc = pets.get(42).await.unwrap();
        assert_eq!(doc.id, 42);
        assert_eq!(doc.payload, json!({"name": "Milo"}));
    });
}

#[test]
fn modify_replaces_the_payload_and_preserves_everything_else() {
    let store = store();
    block_on(async {
        let pets = store.collection("pets");
        let id = pets.insert(json!({"name": "Milo", "age": 3})).await.unwrap();

        let outcome = pets.modify(id, json!({"name": "Milo", "age": 4})).await.unwrap();
        assert_eq!(outcome, UpsertOutcome::Updated);

        let doc = pets.get(id).await.unwrap();
        assert_eq!(doc.id, id);
        assert!(!doc.deleted);
        assert_eq!(doc.payload, json!({"name": "Milo", "age": 4}));
    });
}

#[test]
fn type_mismatch_is_caught_at_compile_time_not_in_the_query() {
    let result = Query::compile(
        [("filter__age__gt__int", "abc")],
        QueryOptions::default(),
    );
    assert!(matches!(
        result,
        Err(StoreError::TypeMismatch { expected: "int", .. })
    ));
}

#[test]
fn invalid_sort_direction_fails_before_touching_storage() {
    let result = Query::compile(
        [],
        QueryOptions {
            sort_field: Some("id"),
            sort_direction: Some("UP"),
            ..QueryOptions::default()
        },
    );
    assert!(matches!(
        result,
        Err(StoreError::InvalidSortDirection(d)) if d == "UP"
    ));
}

#[test]
fn and_intersects_and_or_unions() {
    let store = store();
    block_on(async {
        let pets = store.collection("pets");
        pets.insert(json!({"name": "Milo", "age": 3})).await.unwrap();
        pets.insert(json!({"name": "Luna", "age": 7})).await.unwrap();
        pets.insert(json!({"name": "Max", "age": 9})).await.unwrap();

        let tokens = [
            ("filter__age__gt__int", "5"),
            ("filter__name__eq", "Milo"),
        ];

        let and = Query::compile(
            tokens,
            QueryOptions {
                filter_combination: Some("AND"),
                ..QueryOptions::default()
            },
        )
        .unwrap();
        assert!(pets.query(and).await.unwrap().is_empty());

        let or = Query::compile(
            tokens,
            QueryOptions {
                filter_combination: Some("OR"),
                sort_field: Some("id"),
                sort_direction: Some("ASC"),
                ..QueryOptions::default()
            },
        )
        .unwrap();
        let names: Vec<_> = pets
            .query(or)
            .await
            .unwrap()
            .into_iter()
            .map(|doc| doc.payload["name"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["Milo", "Luna", "Max"]);
    });
}

#[test]
fn query_scenario_filters_sorts_and_caps() {
    let store = store();
    block_on(async {
        let pets = store.collection("pets");
        let milo = pets.insert(json!({"name": "Milo", "age": 3})).await.unwrap();
        let luna = pets.insert(json!({"name": "Luna", "age": 7})).await.unwrap();
        assert_eq!((milo, luna), (1, 2));

        let query = Query::compile(
            [("filter__age__gt__int", "5")],
            QueryOptions {
                sort_field: Some("id"),
                sort_direction: Some("DESC"),
                filter_combination: Some("AND"),
                limit: Some(10),
                include_deleted: false,
            },
        )
        .unwrap();

        let docs = pets.query(query).await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].id, 2);
        assert_eq!(docs[0].payload, json!({"name": "Luna", "age": 7}));
    });
}

#[test]
fn query_reaches_nested_paths_and_deleted_scope() {
    let store = store();
    block_on(async {
        let pets = store.collection("pets");
        let a = pets
            .insert(json!({"name": "Milo", "details": {"gender": "M"}}))
            .await
            .unwrap();
        let b = pets
            .insert(json!({"name": "Luna", "details": {"gender": "F"}}))
            .await
            .unwrap();
        pets.soft_delete(a).await.unwrap();

        let by_gender = |include_deleted| {
            Query::compile(
                [("filter__$.details.gender__eq", "M")],
                QueryOptions { include_deleted, ..QueryOptions::default() },
            )
            .unwrap()
        };

        // The matching document is soft-deleted, so the default scope hides it.
        assert!(pets.query(by_gender(false)).await.unwrap().is_empty());

        let docs = pets.query(by_gender(true)).await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].id, a);
        assert_ne!(docs[0].id, b);
    });
}

#[test]
fn query_limit_caps_the_result() {
    let store = store();
    block_on(async {
        let pets = store.collection("pets");
        for age in 0..15 {
            pets.insert(json!({"age": age})).await.unwrap();
        }

        // Compile applies the default cap when the caller supplies none.
        let query = Query::compile([], QueryOptions::default()).unwrap();
        assert_eq!(pets.query(query).await.unwrap().len(), 10);

        let query = Query::compile(
            [],
            QueryOptions { limit: Some(3), ..QueryOptions::default() },
        )
        .unwrap();
        assert_eq!(pets.query(query).await.unwrap().len(), 3);
    });
}

#[test]
fn typed_collections_round_trip_records() {
    let store = store();
    block_on(async {
        let pets = store.typed_collection::<Pet>();

        let id = pets.insert(&Pet { name: "Milo".into(), age: 3 }).await.unwrap();
        let doc = pets.get(id).await.unwrap();
        assert_eq!(doc.payload, Pet { name: "Milo".into(), age: 3 });

        let outcome = pets
            .modify(id, &Pet { name: "Milo".into(), age: 4 })
            .await
            .unwrap();
        assert_eq!(outcome, UpsertOutcome::Updated);

        let adults = pets
            .query(Query::builder().filter(Filter::gte("age", 4).unwrap()).build())
            .await
            .unwrap();
        assert_eq!(adults.len(), 1);
        assert_eq!(adults[0].payload.age, 4);
    });
}

#[test]
fn dynamic_stores_expose_the_same_surface() {
    let store = store().into_dyn();
    block_on(async {
        let pets = store.collection("pets");
        let id = pets.insert(json!({"name": "Milo"})).await.unwrap();
        assert_eq!(pets.get(id).await.unwrap().payload, json!({"name": "Milo"}));

        assert_eq!(store.list_collections().await.unwrap(), vec!["pets"]);
        store.shutdown().await.unwrap();
    });
}

#[test]
fn documents_survive_reopening_the_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pets.db");

    block_on(async {
        let store = DocumentStore::new(
            SqliteStore::builder(&path).build().await.unwrap(),
        );
        let pets = store.collection("pets");
        pets.insert(json!({"name": "Milo", "age": 3})).await.unwrap();
        pets.insert(json!({"name": "Luna", "age": 7})).await.unwrap();
        pets.soft_delete(1).await.unwrap();
        store.shutdown().await.unwrap();

        let store = DocumentStore::new(
            SqliteStore::builder(&path).build().await.unwrap(),
        );
        let pets = store.collection("pets");
        assert_eq!(pets.count(false).await.unwrap(), 1);
        assert_eq!(pets.count(true).await.unwrap(), 2);
        assert_eq!(
            pets.get(2).await.unwrap().payload,
            json!({"name": "Luna", "age": 7})
        );
    });
}
