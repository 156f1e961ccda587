//! Object Store Demo
//!
//! A tiny in-memory bucket store whose copy and move behaviour is tested by
//! `tests/test_*.rs`, for trying out `suitectl test` by hand.

use std::collections::BTreeMap;

/// Set to `1` by `suitectl test -u`
pub const UNIT_ONLY_ENV: &str = "SUITECTL_UNIT_ONLY";

/// Whether integration-style tests should skip themselves
pub fn unit_only() -> bool {
    std::env::var(UNIT_ONLY_ENV).map(|v| v == "1").unwrap_or(false)
}

#[derive(Debug, Default)]
pub struct Store {
    buckets: BTreeMap<String, BTreeMap<String, Vec<u8>>>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum StoreError {
    NoSuchBucket(String),
    NoSuchObject(String),
    AlreadyExists(String),
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_bucket(&mut self, name: &str) {
        self.buckets.entry(name.to_string()).or_default();
    }

    pub fn put(&mut self, bucket: &str, key: &str, data: &[u8]) -> Result<(), StoreError> {
        self.bucket_mut(bucket)?.insert(key.to_string(), data.to_vec());
        Ok(())
    }

    pub fn get(&self, bucket: &str, key: &str) -> Result<&[u8], StoreError> {
        self.buckets
            .get(bucket)
            .ok_or_else(|| StoreError::NoSuchBucket(bucket.to_string()))?
            .get(key)
            .map(Vec::as_slice)
            .ok_or_else(|| StoreError::NoSuchObject(format!("{bucket}/{key}")))
    }

    pub fn list(&self, bucket: &str) -> Result<Vec<&str>, StoreError> {
        let objects = self
            .buckets
            .get(bucket)
            .ok_or_else(|| StoreError::NoSuchBucket(bucket.to_string()))?;
        Ok(objects.keys().map(String::as_str).collect())
    }

    /// Copy an object; with `no_clobber` an existing destination is kept
    pub fn copy(&mut self, src: (&str, &str), dst: (&str, &str), no_clobber: bool) -> Result<bool, StoreError> {
        let data = self.get(src.0, src.1)?.to_vec();
        let target = self.bucket_mut(dst.0)?;
        if no_clobber && target.contains_key(dst.1) {
            return Ok(false);
        }
        target.insert(dst.1.to_string(), data);
        Ok(true)
    }

    /// Copy then remove the source
    pub fn rename(&mut self, src: (&str, &str), dst: (&str, &str)) -> Result<(), StoreError> {
        if src == dst {
            return Err(StoreError::AlreadyExists(format!("{}/{}", dst.0, dst.1)));
        }
        self.copy(src, dst, false)?;
        self.bucket_mut(src.0)?.remove(src.1);
        Ok(())
    }

    pub fn remove(&mut self, bucket: &str, key: &str) -> Result<(), StoreError> {
        self.bucket_mut(bucket)?
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| StoreError::NoSuchObject(format!("{bucket}/{key}")))
    }

    fn bucket_mut(&mut self, name: &str) -> Result<&mut BTreeMap<String, Vec<u8>>, StoreError> {
        self.buckets
            .get_mut(name)
            .ok_or_else(|| StoreError::NoSuchBucket(name.to_string()))
    }
}
