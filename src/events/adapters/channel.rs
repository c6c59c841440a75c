//! In-process broker backed by bounded per-topic logs.
//!
//! Each topic is an append-only record log with one committed offset per
//! consumer group. A subscription cursor starts at its group's committed
//! offset, so records that were delivered but never acknowledged are
//! redelivered when the group resubscribes. Records below every group's
//! committed offset are trimmed. A single log per topic preserves the
//! relative order of records sharing a key.
//!
//! One consumer loop per group is assumed; concurrent subscriptions in the
//! same group would each observe all uncommitted records.

use crate::events::ports::{BrokerError, BrokerResult, Delivery, MessageBroker, MessageStream};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::Notify;

/// In-process publish/subscribe broker.
#[derive(Debug, Clone)]
pub struct ChannelBroker {
    inner: Arc<BrokerInner>,
}

#[derive(Debug)]
struct BrokerInner {
    state: Mutex<BrokerState>,
    notify: Notify,
    capacity: usize,
}

#[derive(Debug, Default)]
struct BrokerState {
    closed: bool,
    topics: HashMap<String, TopicLog>,
}

#[derive(Debug, Default)]
struct TopicLog {
    /// Offset of the first retained record.
    base: u64,
    records: VecDeque<StoredRecord>,
    /// Committed offset per consumer group.
    committed: HashMap<String, u64>,
}

#[derive(Debug, Clone)]
struct StoredRecord {
    key: String,
    payload: Vec<u8>,
}

impl TopicLog {
    fn next_offset(&self) -> u64 {
        self.base + u64::try_from(self.records.len()).unwrap_or(u64::MAX)
    }

    /// Offset below which every group has committed.
    fn committed_floor(&self) -> u64 {
        self.committed.values().min().copied().unwrap_or(self.base)
    }

    fn trim(&mut self) {
        let floor = self.committed_floor();
        while self.base < floor {
            if self.records.pop_front().is_none() {
                break;
            }
            self.base += 1;
        }
    }
}

impl ChannelBroker {
    /// Creates a broker whose per-topic backlog is bounded by `capacity`.
    ///
    /// The backlog is measured against the slowest consumer group, so a
    /// stalled group eventually pushes back on publishers.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(BrokerInner {
                state: Mutex::new(BrokerState::default()),
                notify: Notify::new(),
                capacity,
            }),
        }
    }

    /// Shuts the broker down.
    ///
    /// Pending records remain deliverable; subscriptions return `None`
    /// once drained, and further publishes fail with
    /// [`BrokerError::Closed`].
    pub fn close(&self) {
        if let Ok(mut state) = self.inner.state.lock() {
            state.closed = true;
        }
        self.inner.notify.notify_waiters();
    }
}

fn lock_state(inner: &BrokerInner) -> BrokerResult<MutexGuard<'_, BrokerState>> {
    inner
        .state
        .lock()
        .map_err(|err| BrokerError::transport(std::io::Error::other(err.to_string())))
}

#[async_trait]
impl MessageBroker for ChannelBroker {
    async fn publish(&self, topic: &str, key: &str, payload: Vec<u8>) -> BrokerResult<()> {
        let mut state = lock_state(&self.inner)?;
        if state.closed {
            return Err(BrokerError::Closed);
        }

        let log = state.topics.entry(topic.to_owned()).or_default();
        let backlog = log.next_offset() - log.committed_floor();
        if usize::try_from(backlog).unwrap_or(usize::MAX) >= self.inner.capacity {
            return Err(BrokerError::QueueFull {
                topic: topic.to_owned(),
            });
        }

        log.records.push_back(StoredRecord {
            key: key.to_owned(),
            payload,
        });
        drop(state);
        self.inner.notify.notify_waiters();
        Ok(())
    }

    async fn subscribe(&self, topic: &str, group: &str) -> BrokerResult<Box<dyn MessageStream>> {
        // Subscribing stays possible after close so a restarted group can
        // drain its uncommitted records.
        let mut state = lock_state(&self.inner)?;
        let log = state.topics.entry(topic.to_owned()).or_default();
        let base = log.base;
        let cursor = *log.committed.entry(group.to_owned()).or_insert(base);

        Ok(Box::new(ChannelSubscription {
            inner: Arc::clone(&self.inner),
            topic: topic.to_owned(),
            group: group.to_owned(),
            cursor,
        }))
    }
}

/// A consumer-group subscription on a [`ChannelBroker`] topic.
struct ChannelSubscription {
    inner: Arc<BrokerInner>,
    topic: String,
    group: String,
    cursor: u64,
}

impl ChannelSubscription {
    /// Returns the next record if one is retained, or whether the broker
    /// has closed.
    fn poll_record(&mut self) -> BrokerResult<PollOutcome> {
        let mut state = lock_state(&self.inner)?;
        let closed = state.closed;
        let log = state.topics.entry(self.topic.clone()).or_default();

        // Trimming can advance past a stale cursor; skip forward rather
        // than redelivering records this group already committed.
        if self.cursor < log.base {
            self.cursor = log.base;
        }

        if self.cursor < log.next_offset() {
            let index = usize::try_from(self.cursor - log.base)
                .map_err(|err| BrokerError::transport(std::io::Error::other(err.to_string())))?;
            if let Some(record) = log.records.get(index) {
                let delivery = Delivery {
                    key: record.key.clone(),
                    payload: record.payload.clone(),
                    offset: self.cursor,
                };
                self.cursor += 1;
                return Ok(PollOutcome::Ready(delivery));
            }
        }

        if closed {
            return Ok(PollOutcome::Drained);
        }
        Ok(PollOutcome::Pending)
    }
}

enum PollOutcome {
    Ready(Delivery),
    Drained,
    Pending,
}

#[async_trait]
impl MessageStream for ChannelSubscription {
    async fn next(&mut self) -> BrokerResult<Option<Delivery>> {
        loop {
            let inner = Arc::clone(&self.inner);
            let notified = inner.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            match self.poll_record()? {
                PollOutcome::Ready(delivery) => return Ok(Some(delivery)),
                PollOutcome::Drained => return Ok(None),
                PollOutcome::Pending => notified.await,
            }
        }
    }

    async fn commit(&mut self, delivery: &Delivery) -> BrokerResult<()> {
        let mut state = lock_state(&self.inner)?;
        let log = state.topics.entry(self.topic.clone()).or_default();
        let committed = log.committed.entry(self.group.clone()).or_insert(log.base);
        if delivery.offset + 1 > *committed {
            *committed = delivery.offset + 1;
        }
        log.trim();
        drop(state);
        // Committing frees backlog capacity; wake any blocked publisher
        // waiters observing state changes.
        self.inner.notify.notify_waiters();
        Ok(())
    }
}
