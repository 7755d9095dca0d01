//! HTTP implementation of `ObjectStore`.
//!
//! Requests are issued with `reqwest` on a private Tokio runtime and awaited
//! with `Runtime::block_on`, because the FUSE session drives the filesystem
//! from a plain synchronous thread. Never call into `HttpStore` from inside
//! another runtime.

use crate::cache::ObjectCache;
use crate::config::{Config, Credentials};
use crate::path::parent_of;
use crate::remote::{
    AccountUsage, ObjectRecord, ObjectStore, RemoteObject, StorageError, StorageResult, UsageRecord,
};
use bytes::Bytes;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::runtime::Runtime;
use tracing::debug;
use url::Url;

pub struct HttpStore {
    client: Client,
    runtime: Runtime,
    base: Url,
    credentials: Credentials,
    cache: Mutex<ObjectCache>,
}

impl HttpStore {
    pub fn new(config: &Config, credentials: Credentials) -> StorageResult<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(|e| StorageError::Malformed(format!("cannot start runtime: {}", e)))?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            runtime,
            base: Url::parse(&config.server_url)?,
            credentials,
            cache: Mutex::new(ObjectCache::new(config)),
        })
    }

    /// Builds `{base}/{route}/{path segments}` with every segment percent-encoded.
    fn endpoint(&self, route: &str, path: &str) -> StorageResult<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| StorageError::Malformed(format!("{} cannot be a base URL", self.base)))?
            .pop_if_empty()
            .push(route)
            .extend(path.split('/').filter(|s| !s.is_empty()));
        Ok(url)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.basic_auth(&self.credentials.username, Some(&self.credentials.password))
    }

    /// Sends `request` and maps 404 to `NotFound` and any other failure
    /// status to `Status`.
    fn send(&self, request: RequestBuilder, path: &str) -> StorageResult<Response> {
        // reqwest arms its timeout when the request is sent, which needs the runtime's timer.
        let response = self
            .runtime
            .block_on(async { self.authorized(request).send().await })?;
        match response.status() {
            StatusCode::NOT_FOUND => Err(StorageError::NotFound(path.to_string())),
            status if !status.is_success() => Err(StorageError::Status {
                status: status.as_u16(),
                path: path.to_string(),
            }),
            _ => Ok(response),
        }
    }

    fn with_cache<T>(&self, f: impl FnOnce(&mut ObjectCache) -> T) -> T {
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut cache)
    }

    /// Drops the cached copies a mutation of `path` makes stale.
    fn evict(&self, path: &str) {
        let parent = parent_of(path);
        self.with_cache(|cache| {
            cache.remove(path);
            cache.remove(parent);
        });
    }
}

impl ObjectStore for HttpStore {
    fn lookup(&self, path: &str, use_cache: bool) -> StorageResult<RemoteObject> {
        if use_cache {
            if let Some(object) = self.with_cache(|cache| cache.get(path)) {
                return Ok(object);
            }
        }

        debug!(path, use_cache, "fetching object metadata");
        let url = self.endpoint("meta", path)?;
        let record = match self.send(self.client.get(url), path) {
            Ok(response) => self.runtime.block_on(async { response.json::<ObjectRecord>().await })?,
            Err(StorageError::NotFound(p)) => {
                self.with_cache(|cache| cache.remove(path));
                return Err(StorageError::NotFound(p));
            }
            Err(e) => return Err(e),
        };

        let object = RemoteObject::from(record);
        self.with_cache(|cache| cache.put(path, object.clone()));
        Ok(object)
    }

    /// Reads the *entire* file into memory. Callers slice the window they need.
    fn read_content(&self, path: &str) -> StorageResult<Bytes> {
        let url = self.endpoint("files", path)?;
        let response = self.send(self.client.get(url), path)?;
        Ok(self.runtime.block_on(async { response.bytes().await })?)
    }

    fn write_content(&self, path: &str, data: Bytes) -> StorageResult<()> {
        debug!(path, len = data.len(), "uploading content");
        let url = self.endpoint("files", path)?;
        self.send(self.client.put(url).body(data), path)?;
        self.evict(path);
        Ok(())
    }

    fn mkdir(&self, path: &str) -> StorageResult<()> {
        let url = self.endpoint("mkdir", path)?;
        self.send(self.client.post(url), path)?;
        self.evict(path);
        Ok(())
    }

    fn delete(&self, path: &str) -> StorageResult<()> {
        let url = self.endpoint("files", path)?;
        self.send(self.client.delete(url), path)?;
        self.evict(path);
        // The remote side tombstones the whole subtree.
        self.with_cache(|cache| cache.remove_tree(path));
        Ok(())
    }

    fn devices(&self) -> StorageResult<Vec<String>> {
        let url = self.endpoint("devices", "")?;
        let response = self.send(self.client.get(url), "/")?;
        Ok(self.runtime.block_on(async { response.json::<Vec<String>>().await })?)
    }

    fn account(&self) -> StorageResult<AccountUsage> {
        let url = self.endpoint("usage", "")?;
        let response = self.send(self.client.get(url), "/")?;
        let record = self.runtime.block_on(async { response.json::<UsageRecord>().await })?;
        Ok(record.into())
    }
}
