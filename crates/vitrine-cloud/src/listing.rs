//! Periodic refresh of the remote model list

use crate::store::{ObjectStore, RemoteModel};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Cached listing of one storage folder, refreshed at most once per interval.
///
/// A failed refresh logs a warning and leaves the listing empty.
pub struct CloudListing {
    store: Arc<dyn ObjectStore>,
    prefix: String,
    interval: Duration,
    last_refresh: Option<Instant>,
    models: Vec<RemoteModel>,
}

impl CloudListing {
    pub fn new(store: Arc<dyn ObjectStore>, prefix: impl Into<String>, interval: Duration) -> Self {
        Self {
            store,
            prefix: prefix.into(),
            interval,
            last_refresh: None,
            models: Vec::new(),
        }
    }

    pub fn models(&self) -> &[RemoteModel] {
        &self.models
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn find(&self, name: &str) -> Option<&RemoteModel> {
        self.models
            .iter()
            .find(|m| m.name == name || m.object_name == name)
    }

    /// Refresh now. Returns true when the list changed.
    pub fn refresh(&mut self) -> bool {
        self.refresh_at(Instant::now())
    }

    /// Refresh if the interval has elapsed since the last refresh. Returns
    /// true when the list changed.
    pub fn poll(&mut self, now: Instant) -> bool {
        let due = self
            .last_refresh
            .map_or(true, |last| now.saturating_duration_since(last) >= self.interval);
        due && self.refresh_at(now)
    }

    fn refresh_at(&mut self, now: Instant) -> bool {
        self.last_refresh = Some(now);
        let models = match self.store.list(&self.prefix) {
            Ok(models) => models,
            Err(e) => {
                log::warn!("Listing {} failed: {}", self.prefix, e);
                Vec::new()
            }
        };
        if models == self.models {
            return false;
        }
        log::debug!("{} now has {} models", self.prefix, models.len());
        self.models = models;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn listing(store: &Arc<MemoryStore>) -> CloudListing {
        CloudListing::new(store.clone(), "models/glb", Duration::from_secs(5))
    }

    #[test]
    fn polls_only_when_due() {
        let store = Arc::new(MemoryStore::new());
        store.upload("models/glb/a.glb", b"a", "model/gltf-binary").unwrap();
        let mut listing = listing(&store);

        let start = Instant::now();
        assert!(listing.poll(start));
        assert_eq!(listing.models().len(), 1);

        store.upload("models/glb/b.glb", b"b", "model/gltf-binary").unwrap();
        assert!(!listing.poll(start + Duration::from_secs(1)));
        assert_eq!(listing.models().len(), 1);

        assert!(listing.poll(start + Duration::from_secs(5)));
        assert_eq!(listing.models().len(), 2);
        assert!(listing.find("b.glb").is_some());
        assert!(listing.find("models/glb/a.glb").is_some());
    }

    #[test]
    fn unchanged_listing_reports_no_change() {
        let store = Arc::new(MemoryStore::new());
        store.upload("models/glb/a.glb", b"a", "model/gltf-binary").unwrap();
        let mut listing = listing(&store);
        assert!(listing.refresh());
        assert!(!listing.refresh());
    }

    #[test]
    fn failure_yields_empty_list() {
        let store = Arc::new(MemoryStore::new());
        store.upload("models/glb/a.glb", b"a", "model/gltf-binary").unwrap();
        let mut listing = listing(&store);
        listing.refresh();
        assert_eq!(listing.models().len(), 1);

        store.set_offline(true);
        assert!(listing.refresh());
        assert!(listing.models().is_empty());
    }
}
