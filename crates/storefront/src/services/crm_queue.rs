//! Background CRM sync queue.
//!
//! Handlers hand contacts to [`CrmSyncQueue::enqueue`], which never waits: a
//! full queue drops the job. A single worker task drains the channel and
//! attempts each contact exactly once. Delivery is at-most-once; every
//! outcome is logged and counted.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use super::sendpulse::{CrmContact, SendPulseClient, SendPulseError, SyncOutcome};

/// Something contacts can be synced to.
pub trait ContactSink: Send + Sync + 'static {
    /// Sync one contact.
    fn sync(
        &self,
        contact: &CrmContact,
    ) -> impl Future<Output = Result<SyncOutcome, SendPulseError>> + Send;
}

impl ContactSink for SendPulseClient {
    fn sync(
        &self,
        contact: &CrmContact,
    ) -> impl Future<Output = Result<SyncOutcome, SendPulseError>> + Send {
        self.sync_contact(contact)
    }
}

/// Queue counters, as reported by the readiness endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CrmQueueStats {
    pub enqueued: u64,
    pub dropped: u64,
    pub synced: u64,
    pub fallback: u64,
    pub failed: u64,
}

#[derive(Default)]
struct Counters {
    enqueued: AtomicU64,
    dropped: AtomicU64,
    synced: AtomicU64,
    fallback: AtomicU64,
    failed: AtomicU64,
}

impl Counters {
    fn snapshot(&self) -> CrmQueueStats {
        CrmQueueStats {
            enqueued: self.enqueued.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            synced: self.synced.load(Ordering::Relaxed),
            fallback: self.fallback.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

/// Producer side of the CRM queue.
#[derive(Clone)]
pub struct CrmSyncQueue {
    sender: mpsc::Sender<CrmContact>,
    counters: Arc<Counters>,
}

/// Consumer side of the CRM queue.
pub struct CrmSyncWorker<S> {
    receiver: mpsc::Receiver<CrmContact>,
    sink: S,
    counters: Arc<Counters>,
}

impl CrmSyncQueue {
    /// Create a queue holding at most `capacity` pending contacts.
    ///
    /// The worker must be run (see [`Self::spawn`]) for jobs to be processed.
    #[must_use]
    pub fn new<S: ContactSink>(capacity: usize, sink: S) -> (Self, CrmSyncWorker<S>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let counters = Arc::new(Counters::default());

        let queue = Self {
            sender,
            counters: Arc::clone(&counters),
        };
        let worker = CrmSyncWorker {
            receiver,
            sink,
            counters,
        };
        (queue, worker)
    }

    /// Create a queue and run its worker on the current tokio runtime.
    #[must_use]
    pub fn spawn<S: ContactSink>(capacity: usize, sink: S) -> Self {
        let (queue, worker) = Self::new(capacity, sink);
        tokio::spawn(worker.run());
        queue
    }

    /// Queue a contact for sync. Returns whether it was accepted.
    pub fn enqueue(&self, contact: CrmContact) -> bool {
        match self.sender.try_send(contact) {
            Ok(()) => {
                self.counters.enqueued.fetch_add(1, Ordering::Relaxed);
                true
            }
            Err(mpsc::error::TrySendError::Full(contact)) => {
                self.counters.dropped.fetch_add(1, Ordering::Relaxed);
                warn!(contact_email = %contact.email, "CRM queue full, dropping contact");
                false
            }
            Err(mpsc::error::TrySendError::Closed(contact)) => {
                self.counters.dropped.fetch_add(1, Ordering::Relaxed);
                warn!(contact_email = %contact.email, "CRM worker stopped, dropping contact");
                false
            }
        }
    }

    /// Current counters.
    #[must_use]
    pub fn stats(&self) -> CrmQueueStats {
        self.counters.snapshot()
    }
}

impl<S: ContactSink> CrmSyncWorker<S> {
    /// Process contacts until every queue handle is dropped.
    pub async fn run(mut self) -> CrmQueueStats {
        info!("CRM sync worker started");

        while let Some(contact) = self.receiver.recv().await {
            match self.sink.sync(&contact).await {
                Ok(SyncOutcome::Contact(id)) => {
                    self.counters.synced.fetch_add(1, Ordering::Relaxed);
                    info!(contact_email = %contact.email, contact_id = %id, "CRM sync succeeded");
                }
                Ok(SyncOutcome::AddressBook(book_id)) => {
                    self.counters.fallback.fetch_add(1, Ordering::Relaxed);
                    info!(contact_email = %contact.email, book_id, "CRM sync fell back to address book");
                }
                Err(e) => {
                    self.counters.failed.fetch_add(1, Ordering::Relaxed);
                    error!(contact_email = %contact.email, error = %e, "CRM sync failed");
                }
            }
        }

        info!("CRM sync worker stopped");
        self.counters.snapshot()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use lemanshop_core::{ContactId, Email, Language};

    use super::*;
    use crate::services::sendpulse::ContactSource;

    /// Syncs `ok@` addresses, falls back for `book@`, fails everything else.
    struct ScriptedSink;

    impl ContactSink for ScriptedSink {
        async fn sync(&self, contact: &CrmContact) -> Result<SyncOutcome, SendPulseError> {
            match contact.email.as_str().split('@').next() {
                Some("ok") => Ok(SyncOutcome::Contact(ContactId::new("42"))),
                Some("book") => Ok(SyncOutcome::AddressBook(7)),
                _ => Err(SendPulseError::NoAddressBook),
            }
        }
    }

    fn contact(email: &str) -> CrmContact {
        CrmContact {
            email: Email::parse(email).unwrap(),
            first_name: None,
            last_name: None,
            phone: None,
            language: Language::Fr,
            source: ContactSource::Checkout,
        }
    }

    #[tokio::test]
    async fn test_full_queue_drops_jobs() {
        let (queue, _worker) = CrmSyncQueue::new(1, ScriptedSink);

        assert!(queue.enqueue(contact("ok@example.ch")));
        assert!(!queue.enqueue(contact("ok@example.ch")));

        let stats = queue.stats();
        assert_eq!(stats.enqueued, 1);
        assert_eq!(stats.dropped, 1);
    }

    #[tokio::test]
    async fn test_closed_queue_drops_jobs() {
        let (queue, worker) = CrmSyncQueue::new(4, ScriptedSink);
        drop(worker);

        assert!(!queue.enqueue(contact("ok@example.ch")));
        assert_eq!(queue.stats().dropped, 1);
    }

    #[tokio::test]
    async fn test_worker_counts_each_outcome() {
        let (queue, worker) = CrmSyncQueue::new(8, ScriptedSink);

        queue.enqueue(contact("ok@example.ch"));
        queue.enqueue(contact("book@example.ch"));
        queue.enqueue(contact("broken@example.ch"));
        queue.enqueue(contact("ok@example.ch"));
        drop(queue);

        let stats = worker.run().await;
        assert_eq!(stats.enqueued, 4);
        assert_eq!(stats.synced, 2);
        assert_eq!(stats.fallback, 1);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.dropped, 0);
    }
}
