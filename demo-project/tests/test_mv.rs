use objstore_demo::{Store, StoreError};

#[test]
fn test_moving() {
    let mut store = Store::new();
    store.create_bucket("one");
    store.create_bucket("two");
    store.put("one", "a", b"1").unwrap();
    store.put("one", "b", b"2").unwrap();

    store.rename(("one", "a"), ("two", "a")).unwrap();
    store.rename(("one", "b"), ("two", "b")).unwrap();
    assert!(store.list("one").unwrap().is_empty());
    assert_eq!(store.list("two").unwrap(), vec!["a", "b"]);

    store.remove("two", "a").unwrap();
    store.rename(("two", "b"), ("one", "b")).unwrap();
    assert_eq!(store.list("one").unwrap(), vec!["b"]);
    assert!(store.list("two").unwrap().is_empty());
}

#[test]
fn test_move_onto_itself() {
    let mut store = Store::new();
    store.create_bucket("one");
    store.put("one", "a", b"1").unwrap();
    let err = store.rename(("one", "a"), ("one", "a")).unwrap_err();
    assert_eq!(err, StoreError::AlreadyExists("one/a".to_string()));
    assert_eq!(store.get("one", "a").unwrap(), b"1");
}
