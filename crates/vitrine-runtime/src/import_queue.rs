//! Background asset decoding

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::time::{Duration, Instant};
use vitrine_core::Result;
use vitrine_import::{import_with, Fetch, ImportOptions, ImportResult, ImportSource};
use vitrine_scene::ReplaceTicket;

/// A finished decode, tagged with the ticket it was requested under
pub struct ImportCompletion {
    pub ticket: ReplaceTicket,
    /// Display name of the source
    pub source: String,
    pub result: Result<ImportResult>,
}

/// Decodes imports on worker threads and hands results back over a channel.
///
/// Results are only applied by the owner when polled; there is no
/// cancellation, stale results are filtered by ticket.
pub struct ImportQueue {
    sender: Sender<ImportCompletion>,
    receiver: Receiver<ImportCompletion>,
    fetcher: Arc<dyn Fetch>,
    options: ImportOptions,
    in_flight: usize,
}

impl ImportQueue {
    pub fn new(fetcher: Arc<dyn Fetch>, options: ImportOptions) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            sender,
            receiver,
            fetcher,
            options,
            in_flight: 0,
        }
    }

    pub fn fetcher(&self) -> &Arc<dyn Fetch> {
        &self.fetcher
    }

    pub fn options(&self) -> &ImportOptions {
        &self.options
    }

    /// Imports requested but not yet polled
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Start decoding `source` on a new worker thread
    pub fn request(&mut self, ticket: ReplaceTicket, source: ImportSource) -> Result<()> {
        let sender = self.sender.clone();
        let fetcher = Arc::clone(&self.fetcher);
        let options = self.options.clone();
        let name = source.display_name();
        log::debug!("Queueing import {} ({:?})", name, ticket);

        std::thread::Builder::new()
            .name(format!("vitrine-import-{}", ticket.raw()))
            .spawn(move || {
                let result = import_with(&source, fetcher.as_ref(), &options);
                // The receiver is gone when the controller was dropped
                let _ = sender.send(ImportCompletion {
                    ticket,
                    source: name,
                    result,
                });
            })?;
        self.in_flight += 1;
        Ok(())
    }

    /// Completions that have arrived, without blocking
    pub fn poll(&mut self) -> Vec<ImportCompletion> {
        let completions: Vec<ImportCompletion> = self.receiver.try_iter().collect();
        self.in_flight = self.in_flight.saturating_sub(completions.len());
        completions
    }

    /// Block until every in-flight import finished or `timeout` elapsed
    pub fn wait_all(&mut self, timeout: Duration) -> Vec<ImportCompletion> {
        let deadline = Instant::now() + timeout;
        let mut completions = Vec::new();
        while self.in_flight > 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.receiver.recv_timeout(remaining) {
                Ok(completion) => {
                    self.in_flight -= 1;
                    completions.push(completion);
                }
                Err(_) => break,
            }
        }
        completions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vitrine_core::VitrineError;

    struct NoNetwork;

    impl Fetch for NoNetwork {
        fn fetch(&self, url: &str) -> Result<Vec<u8>> {
            Err(VitrineError::Network(format!("offline: {}", url)))
        }
    }

    #[test]
    fn failures_come_back_tagged() {
        let mut queue = ImportQueue::new(Arc::new(NoNetwork), ImportOptions::default());
        let mut session = vitrine_scene::SceneSession::new();
        let ticket = session.begin_replace();
        queue
            .request(ticket, ImportSource::Url("https://example.com/a.glb".into()))
            .unwrap();
        assert_eq!(queue.in_flight(), 1);

        let done = queue.wait_all(Duration::from_secs(10));
        assert_eq!(done.len(), 1);
        assert_eq!(done[0].ticket, ticket);
        assert_eq!(done[0].source, "a");
        assert!(matches!(done[0].result, Err(VitrineError::Network(_))));
        assert_eq!(queue.in_flight(), 0);
        assert!(queue.poll().is_empty());
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        let mut queue = ImportQueue::new(Arc::new(NoNetwork), ImportOptions::default());
        let mut session = vitrine_scene::SceneSession::new();
        queue
            .request(
                session.begin_replace(),
                ImportSource::Bytes {
                    name: "junk".into(),
                    data: b"not a gltf".to_vec(),
                },
            )
            .unwrap();
        let done = queue.wait_all(Duration::from_secs(10));
        assert!(matches!(done[0].result, Err(VitrineError::Decode(_))));
    }
}
