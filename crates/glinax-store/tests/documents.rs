use glinax_store::{Collection, DocumentSink, DocumentStore, PersistenceError, StoreConfig};
use serde_json::json;

fn rows() -> Vec<(String, serde_json::Value)> {
    vec![
        (
            "KNUST".to_string(),
            json!({"status": "fallback", "full_name": "Kwame Nkrumah University of Science and Technology"}),
        ),
        (
            "UG".to_string(),
            json!({"status": "scraped", "url_accessible": true, "programs": ["Bachelor of Arts"]}),
        ),
    ]
}

#[tokio::test]
async fn upsert_is_keyed_and_idempotent() {
    let store = DocumentStore::new(StoreConfig::in_memory());

    store.upsert_all(Collection::UNIVERSITIES, rows()).await.unwrap();
    let first = store.documents(Collection::UNIVERSITIES).await.unwrap();

    store.upsert_all(Collection::UNIVERSITIES, rows()).await.unwrap();
    let second = store.documents(Collection::UNIVERSITIES).await.unwrap();

    assert_eq!(second.len(), 2);
    assert_eq!(
        second.iter().map(|d| d.key.as_str()).collect::<Vec<_>>(),
        vec!["KNUST", "UG"]
    );
    for (a, b) in first.iter().zip(&second) {
        assert_eq!(a.key, b.key);
        assert_eq!(a.data, b.data);
        assert!(b.last_updated >= a.last_updated);
    }
}

#[tokio::test]
async fn upsert_replaces_previous_content() {
    let store = DocumentStore::new(StoreConfig::in_memory());
    store.upsert_all(Collection::UNIVERSITIES, rows()).await.unwrap();

    let replacement = json!({"status": "scraped", "url_accessible": false});
    store
        .upsert_all(
            Collection::UNIVERSITIES,
            vec![("UG".to_string(), replacement.clone())],
        )
        .await
        .unwrap();

    let ug = store
        .document(Collection::UNIVERSITIES, "UG")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(ug.data, replacement);
    assert_eq!(store.documents(Collection::UNIVERSITIES).await.unwrap().len(), 2);
}

#[tokio::test]
async fn collections_are_separate() {
    let store = DocumentStore::new(StoreConfig::in_memory());
    store
        .upsert_all(
            Collection::CUT_OFF_POINTS,
            vec![("2024_2025".to_string(), json!({"UG": {"Law": 10}}))],
        )
        .await
        .unwrap();

    assert!(store.documents(Collection::SCHOLARSHIPS).await.unwrap().is_empty());
    let cut_offs = store.documents(Collection::CUT_OFF_POINTS).await.unwrap();
    assert_eq!(cut_offs[0].key, "2024_2025");
    assert_eq!(cut_offs[0].data["UG"]["Law"], 10);
    assert!(store
        .document(Collection::CUT_OFF_POINTS, "2023_2024")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn empty_upsert_does_not_connect() {
    let store = DocumentStore::new(StoreConfig::new("ws://127.0.0.1:1"));
    store
        .upsert_all(Collection::SCHOLARSHIPS, vec![])
        .await
        .unwrap();
}

#[tokio::test]
async fn unknown_scheme_is_a_connection_error() {
    let store = DocumentStore::new(StoreConfig::new("nosuchengine://nowhere"));
    let err = store
        .upsert_all(Collection::SCHOLARSHIPS, rows())
        .await
        .unwrap_err();
    assert!(matches!(err, PersistenceError::Connection(_)));
}

#[tokio::test]
async fn batch_spans_every_collection() {
    let store = DocumentStore::new(StoreConfig::in_memory());
    store
        .upsert_batch(vec![
            (Collection::UNIVERSITIES, rows()),
            (
                Collection::SCHOLARSHIPS,
                vec![("getfund".to_string(), json!({"type": "government"}))],
            ),
            (Collection::CUT_OFF_POINTS, vec![]),
        ])
        .await
        .unwrap();

    assert_eq!(store.documents(Collection::UNIVERSITIES).await.unwrap().len(), 2);
    let getfund = store
        .document(Collection::SCHOLARSHIPS, "getfund")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(getfund.data["type"], "government");
    assert!(store.documents(Collection::CUT_OFF_POINTS).await.unwrap().is_empty());
}
