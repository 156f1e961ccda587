use objstore_demo::{Store, StoreError};

#[test]
fn test_empty_bucket() {
    let mut store = Store::new();
    store.create_bucket("empty");
    assert!(store.list("empty").unwrap().is_empty());
}

#[test]
fn test_missing_bucket() {
    let store = Store::new();
    assert_eq!(store.list("nope").unwrap_err(), StoreError::NoSuchBucket("nope".to_string()));
}

#[test]
fn test_sorted_listing() {
    let mut store = Store::new();
    store.create_bucket("b");
    for key in ["c", "a", "b"] {
        store.put("b", key, b"").unwrap();
    }
    assert_eq!(store.list("b").unwrap(), vec!["a", "b", "c"]);
}
