use fieldguard::testing::{ref_schema, refarray_schema, test_document, test_schema};
use fieldguard::{
    Context, Document, DocumentStore, MemoryStore, Patch, ProjectionOptions, Reference,
};
use serde_json::{json, Value};

async fn read(doc: &Document, context: Context) -> Value {
    doc.read(&context, &ProjectionOptions::default())
        .await
        .expect("read should succeed")
}

async fn saved_target(store: &MemoryStore, values: Value) -> String {
    let saved = store
        .save(Document::from_json(test_schema(), values).unwrap())
        .await
        .unwrap();
    saved.id().unwrap().to_string()
}

#[tokio::test]
async fn test_unpopulated_references_pass_ids_through() {
    let doc = Document::from_json(
        ref_schema(),
        json!({"implicit": "id-1", "truthy": "id-2", "falsy": "id-3", "func": "id-4"}),
    )
    .unwrap();

    assert_eq!(
        read(&doc, Context::none()).await,
        json!({"implicit": "id-1", "truthy": "id-2"})
    );
    assert_eq!(
        read(&doc, Context::from(true)).await,
        json!({"implicit": "id-1", "truthy": "id-2", "func": "id-4"})
    );
}

#[tokio::test]
async fn test_populated_reference_is_projected_recursively() {
    let store = MemoryStore::new();
    let target = store.save(test_document()).await.unwrap();
    let target_id = target.id().unwrap().to_string();

    let mut doc = Document::new(ref_schema());
    doc.set("truthy", Reference::id(target_id.clone())).unwrap();
    doc.set("func", Reference::id(target_id)).unwrap();
    store.populate(&mut doc, "truthy").await.unwrap();
    store.populate(&mut doc, "func").await.unwrap();

    assert_eq!(
        read(&doc, Context::none()).await,
        json!({"truthy": {"implicit": "a", "truthy": "b"}})
    );
    assert_eq!(
        read(&doc, Context::from(true)).await,
        json!({
            "truthy": {"implicit": "a", "truthy": "b", "func": "d"},
            "func": {"implicit": "a", "truthy": "b", "func": "d"},
        })
    );
}

#[tokio::test]
async fn test_populated_reference_with_no_readable_fields_is_empty_object() {
    let store = MemoryStore::new();
    let target_id = saved_target(&store, json!({"falsy": "secret"})).await;

    let mut doc = Document::new(ref_schema());
    doc.set("implicit", Reference::id(target_id)).unwrap();
    store.populate(&mut doc, "implicit").await.unwrap();

    assert_eq!(
        read(&doc, Context::from(true)).await,
        json!({"implicit": {}})
    );
}

#[tokio::test]
async fn test_reference_array_mixes_populated_and_unresolved() {
    let store = MemoryStore::new();
    let first = saved_target(&store, json!({"truthy": "one", "falsy": "x"})).await;
    let second = saved_target(&store, json!({"implicit": "two"})).await;

    let mut doc = Document::from_json(
        refarray_schema(),
        json!({"truthy": [first, "missing", second]}),
    )
    .unwrap();
    store.populate(&mut doc, "truthy").await.unwrap();

    assert_eq!(
        read(&doc, Context::none()).await,
        json!({"truthy": [{"truthy": "one"}, "missing", {"implicit": "two"}]})
    );
}

#[tokio::test]
async fn test_denied_reference_array_is_absent() {
    let store = MemoryStore::new();
    let target_id = saved_target(&store, json!({"truthy": "t"})).await;

    let mut doc = Document::from_json(refarray_schema(), json!({"falsy": [target_id]})).unwrap();
    store.populate(&mut doc, "falsy").await.unwrap();
    assert_eq!(read(&doc, Context::from(true)).await, json!({}));
}

#[tokio::test]
async fn test_write_reference_is_stored_as_id() {
    let store = MemoryStore::new();
    let target_id = saved_target(&store, json!({"truthy": "t"})).await;
    let target = store.get("Test", &target_id).await.unwrap();

    let mut doc = Document::new(ref_schema());
    let saved = doc
        .write(
            &store,
            &Context::none(),
            Patch::new().set("truthy", Reference::populated(target)),
        )
        .await
        .unwrap();
    assert!(saved.is_populated("truthy"));

    let stored = store.get("Ref", saved.id().unwrap()).await.unwrap();
    assert!(!stored.is_populated("truthy"));
    assert_eq!(
        read(&stored, Context::none()).await,
        json!({"truthy": target_id})
    );
}

#[tokio::test]
async fn test_write_reference_respects_field_rule() {
    let store = MemoryStore::new();
    let mut doc = Document::new(refarray_schema());

    let err = doc
        .write(
            &store,
            &Context::from(false),
            Patch::new().set("func", vec![Reference::id("abc")]),
        )
        .await
        .unwrap_err();
    assert!(err.is_permission_denied());

    doc.write(
        &store,
        &Context::from(true),
        Patch::new().set("func", vec![Reference::id("abc")]),
    )
    .await
    .unwrap();
    assert_eq!(
        read(&doc, Context::from(true)).await,
        json!({"func": ["abc"]})
    );
}
