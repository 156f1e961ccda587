use objstore_demo::{unit_only, Store, StoreError};

fn store_with(objects: &[(&str, &str)]) -> Store {
    let mut store = Store::new();
    store.create_bucket("src");
    store.create_bucket("dst");
    for (key, data) in objects {
        store.put("src", key, data.as_bytes()).unwrap();
    }
    store
}

mod copy {
    use super::*;

    #[test]
    fn test_streaming() {
        let mut store = store_with(&[("a.txt", "hello")]);
        assert!(store.copy(("src", "a.txt"), ("dst", "a.txt"), false).unwrap());
        assert_eq!(store.get("dst", "a.txt").unwrap(), b"hello");
        assert_eq!(store.list("src").unwrap(), vec!["a.txt"]);
    }

    #[test]
    fn test_noclobber() {
        let mut store = store_with(&[("a.txt", "new")]);
        store.put("dst", "a.txt", b"old").unwrap();
        assert!(!store.copy(("src", "a.txt"), ("dst", "a.txt"), true).unwrap());
        assert_eq!(store.get("dst", "a.txt").unwrap(), b"old");
    }

    #[test]
    fn test_missing_source() {
        let mut store = store_with(&[]);
        let err = store.copy(("src", "nope"), ("dst", "nope"), false).unwrap_err();
        assert_eq!(err, StoreError::NoSuchObject("src/nope".to_string()));
    }
}

mod remote {
    use super::*;

    #[test]
    fn test_many_objects() {
        if unit_only() {
            return;
        }
        let names: Vec<String> = (0..100).map(|i| format!("obj-{i:03}")).collect();
        let objects: Vec<(&str, &str)> = names.iter().map(|n| (n.as_str(), "x")).collect();
        let mut store = store_with(&objects);
        for name in &names {
            store.copy(("src", name.as_str()), ("dst", name.as_str()), false).unwrap();
        }
        assert_eq!(store.list("dst").unwrap().len(), 100);
    }

    #[test]
    #[ignore = "needs a real bucket"]
    fn test_upload() {}
}
