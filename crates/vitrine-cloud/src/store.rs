//! Object store client
//!
//! Speaks the Firebase Storage REST dialect: objects are addressed as
//! `{base}/b/{bucket}/o/{url-encoded name}`, listed with `?prefix=` and
//! uploaded with `POST ?name=`.

use crate::config::StorageConfig;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::Mutex;
use std::time::Duration;
use vitrine_core::{Result, VitrineError};

/// A model stored in the cloud
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteModel {
    /// File name without the folder, e.g. `1718000000000_scene.glb`
    pub name: String,
    /// Full object name, e.g. `models/glb/1718000000000_scene.glb`
    pub object_name: String,
    pub download_url: String,
}

impl RemoteModel {
    fn from_object(object_name: &str, download_url: String) -> Self {
        let name = object_name
            .rsplit('/')
            .next()
            .unwrap_or(object_name)
            .to_string();
        Self {
            name,
            object_name: object_name.to_string(),
            download_url,
        }
    }
}

/// Remote storage for exported models
pub trait ObjectStore: Send + Sync {
    /// Objects directly under `prefix`, sorted by name
    fn list(&self, prefix: &str) -> Result<Vec<RemoteModel>>;

    fn upload(&self, object_name: &str, bytes: &[u8], content_type: &str) -> Result<RemoteModel>;

    fn download(&self, url: &str) -> Result<Vec<u8>>;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse {
    #[serde(default)]
    items: Vec<ListItem>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListItem {
    name: String,
}

/// HTTP client for a Firebase-Storage-compatible bucket
pub struct HttpObjectStore {
    base_url: String,
    bucket: String,
    token: Option<String>,
    agent: ureq::Agent,
}

impl HttpObjectStore {
    pub fn from_config(config: &StorageConfig) -> Result<Self> {
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            bucket: config.bucket()?.to_string(),
            token: config.token.clone(),
            agent: build_agent(config.timeout_secs),
        })
    }

    fn objects_url(&self) -> String {
        format!("{}/b/{}/o", self.base_url, percent_encode(&self.bucket))
    }

    /// Public media URL for an object
    pub fn download_url(&self, object_name: &str) -> String {
        format!("{}/{}?alt=media", self.objects_url(), percent_encode(object_name))
    }

    fn authorization(&self) -> Option<String> {
        self.token.as_ref().map(|t| format!("Bearer {}", t))
    }
}

impl ObjectStore for HttpObjectStore {
    fn list(&self, prefix: &str) -> Result<Vec<RemoteModel>> {
        let folder = format!("{}/", prefix.trim_matches('/'));
        let mut models = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let mut url = format!(
                "{}?prefix={}&delimiter=%2F",
                self.objects_url(),
                percent_encode(&folder)
            );
            if let Some(token) = &page_token {
                url.push_str("&pageToken=");
                url.push_str(&percent_encode(token));
            }

            let mut request = self.agent.get(&url);
            if let Some(auth) = self.authorization() {
                request = request.header("Authorization", &auth);
            }
            let mut response = request
                .call()
                .map_err(|e| VitrineError::Network(format!("List {} failed: {}", folder, e)))?;
            let page: ListResponse = response.body_mut().read_json().map_err(|e| {
                VitrineError::Network(format!("Failed to parse listing: {}", e))
            })?;

            models.extend(
                page.items
                    .iter()
                    .map(|item| RemoteModel::from_object(&item.name, self.download_url(&item.name))),
            );
            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }
        models.sort_by(|a, b| a.name.cmp(&b.name));
        log::debug!("Listed {} objects under {}", models.len(), folder);
        Ok(models)
    }

    fn upload(&self, object_name: &str, bytes: &[u8], content_type: &str) -> Result<RemoteModel> {
        let url = format!("{}?name={}", self.objects_url(), percent_encode(object_name));
        let mut request = self.agent.post(&url).header("Content-Type", content_type);
        if let Some(auth) = self.authorization() {
            request = request.header("Authorization", &auth);
        }
        request
            .send(bytes)
            .map_err(|e| VitrineError::Network(format!("Upload of {} failed: {}", object_name, e)))?;
        log::info!("Uploaded {} ({} bytes)", object_name, bytes.len());
        Ok(RemoteModel::from_object(
            object_name,
            self.download_url(object_name),
        ))
    }

    fn download(&self, url: &str) -> Result<Vec<u8>> {
        let mut request = self.agent.get(url);
        if let Some(auth) = self.authorization() {
            request = request.header("Authorization", &auth);
        }
        let response = request
            .call()
            .map_err(|e| VitrineError::Network(format!("Download of {} failed: {}", url, e)))?;
        let mut reader = response.into_body().into_reader();
        let mut bytes = Vec::new();
        std::io::Read::read_to_end(&mut reader, &mut bytes)
            .map_err(|e| VitrineError::Network(format!("Failed to read {}: {}", url, e)))?;
        Ok(bytes)
    }
}

fn build_agent(timeout_secs: u64) -> ureq::Agent {
    let config = ureq::Agent::config_builder()
        .timeout_global(Some(Duration::from_secs(timeout_secs)))
        .build();
    config.into()
}

/// Percent-encode everything but RFC 3986 unreserved characters
pub fn percent_encode(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

const MEMORY_SCHEME: &str = "memory://";

/// In-process store for tests and offline use
#[derive(Default)]
pub struct MemoryStore {
    objects: Mutex<BTreeMap<String, Vec<u8>>>,
    offline: Mutex<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call fail with a network error
    pub fn set_offline(&self, offline: bool) {
        if let Ok(mut flag) = self.offline.lock() {
            *flag = offline;
        }
    }

    pub fn object(&self, object_name: &str) -> Option<Vec<u8>> {
        self.objects.lock().ok()?.get(object_name).cloned()
    }

    fn check_online(&self) -> Result<()> {
        match self.offline.lock() {
            Ok(flag) if !*flag => Ok(()),
            _ => Err(VitrineError::Network("store is offline".to_string())),
        }
    }

    fn objects(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, Vec<u8>>>> {
        self.objects
            .lock()
            .map_err(|_| VitrineError::Network("store lock poisoned".to_string()))
    }
}

impl ObjectStore for MemoryStore {
    fn list(&self, prefix: &str) -> Result<Vec<RemoteModel>> {
        self.check_online()?;
        let folder = format!("{}/", prefix.trim_matches('/'));
        Ok(self
            .objects()?
            .keys()
            .filter(|name| {
                name.strip_prefix(&folder)
                    .is_some_and(|rest| !rest.is_empty() && !rest.contains('/'))
            })
            .map(|name| RemoteModel::from_object(name, format!("{}{}", MEMORY_SCHEME, name)))
            .collect())
    }

    fn upload(&self, object_name: &str, bytes: &[u8], _content_type: &str) -> Result<RemoteModel> {
        self.check_online()?;
        self.objects()?
            .insert(object_name.to_string(), bytes.to_vec());
        Ok(RemoteModel::from_object(
            object_name,
            format!("{}{}", MEMORY_SCHEME, object_name),
        ))
    }

    fn download(&self, url: &str) -> Result<Vec<u8>> {
        self.check_online()?;
        let name = url.strip_prefix(MEMORY_SCHEME).unwrap_or(url);
        self.objects()?
            .get(name)
            .cloned()
            .ok_or_else(|| VitrineError::Network(format!("404 Not Found: {}", url)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_object_names() {
        assert_eq!(percent_encode("models/glb/a b.glb"), "models%2Fglb%2Fa%20b.glb");
        assert_eq!(percent_encode("plain-name_1.glb"), "plain-name_1.glb");
    }

    #[test]
    fn http_urls() {
        let config = StorageConfig {
            base_url: "https://storage.example.com/v0/".to_string(),
            bucket: Some("demo.appspot.com".to_string()),
            ..Default::default()
        };
        let store = HttpObjectStore::from_config(&config).unwrap();
        assert_eq!(
            store.download_url("models/glb/x.glb"),
            "https://storage.example.com/v0/b/demo.appspot.com/o/models%2Fglb%2Fx.glb?alt=media"
        );
    }

    #[test]
    fn http_store_needs_bucket() {
        assert!(HttpObjectStore::from_config(&StorageConfig::default()).is_err());
    }

    #[test]
    fn list_response_parses_without_items() {
        let page: ListResponse = serde_json::from_str(r#"{"prefixes": []}"#).unwrap();
        assert!(page.items.is_empty());
        assert!(page.next_page_token.is_none());
    }

    #[test]
    fn memory_store_lists_one_level() {
        let store = MemoryStore::new();
        store.upload("models/glb/b.glb", b"b", "model/gltf-binary").unwrap();
        store.upload("models/glb/a.gltf", b"a", "model/gltf+json").unwrap();
        store.upload("models/glb/old/c.glb", b"c", "model/gltf-binary").unwrap();
        store.upload("textures/d.png", b"d", "image/png").unwrap();

        let listed = store.list("models/glb").unwrap();
        let names: Vec<&str> = listed.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["a.gltf", "b.glb"]);
        assert_eq!(store.download(&listed[1].download_url).unwrap(), b"b");
    }

    #[test]
    fn offline_store_fails() {
        let store = MemoryStore::new();
        store.set_offline(true);
        assert!(matches!(store.list("models/glb"), Err(VitrineError::Network(_))));
        store.set_offline(false);
        assert!(store.list("models/glb").unwrap().is_empty());
    }
}
