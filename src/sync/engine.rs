//! Poll scheduler and reconciliation cycle
//!
//! Simulates near-real-time delivery without a persistent channel: while a
//! user session is active, a repeating timer fetches the conversation list,
//! diffs it against the previous snapshot, routes the surviving events to the
//! notification handler, and commits the new snapshot.
//!
//! The fetch is the only suspension point in a cycle; everything after it
//! runs inside a commit critical section. Each cycle carries a sequence
//! number assigned at fetch-issue time, and a cycle that is no longer the
//! newest at commit time discards its result entirely: a slow fetch can never
//! regress the snapshot or re-fire already-delivered notifications. Session
//! teardown raises the same watermark past any in-flight fetch.

use crate::{
    Result,
    config::Config,
    model::ConversationSummary,
    notify::{LocalNotification, NotificationEvent, NotificationHandler},
    sync::{
        diff::diff,
        gate::{ForegroundLocation, ForegroundQuery, should_notify},
        snapshot::SnapshotStore,
    },
};
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Source of conversation-list snapshots
///
/// Implemented by [`crate::api::ApiClient`] for the real backend; tests
/// substitute scripted sources. The engine depends only on two snapshots, not
/// on how they were obtained, so a streaming transport could implement this
/// trait without touching the diff or gate logic.
pub trait ConversationSource: Send + Sync + 'static {
    /// Fetch the full conversation list for a user
    fn fetch_conversations(
        &self,
        user_id: &str,
    ) -> impl Future<Output = Result<Vec<ConversationSummary>>> + Send;
}

/// Conversation synchronization engine
///
/// Owns the snapshot store, the poll timer, and the sequence watermarks.
/// Cheap to clone; clones share state, and independent instances can be
/// created freely (nothing here is ambient or global).
///
/// # Example
/// ```rust,no_run
/// use pocketchat::api::ApiClient;
/// use pocketchat::config::Config;
/// use pocketchat::sync::{ForegroundLocation, SyncEngine};
///
/// # async fn example() {
/// let config = Config::default();
/// let engine = SyncEngine::new(ApiClient::new(config.api_url.as_str()), &config);
///
/// engine
///     .set_foreground_query(|| ForegroundLocation::Other)
///     .await;
/// engine
///     .set_notification_handler(|note| {
///         println!("{}: {}", note.title, note.body);
///         Ok(())
///     })
///     .await;
///
/// // Login established: one immediate cycle, then the repeating timer
/// engine.start("u1").await;
///
/// // Logout: cancel the timer and drop the per-user snapshot
/// engine.stop().await;
/// # }
/// ```
pub struct SyncEngine<S: ConversationSource> {
    /// Conversation-list source (backend API or a test double)
    source: Arc<S>,
    /// Last reconciled snapshot
    store: SnapshotStore,
    /// Poll cadence while a session is active
    poll_interval: Duration,
    /// When false, events are diffed and committed but never dispatched
    notifications_enabled: bool,
    /// Sequence number handed to each cycle at fetch-issue time
    issued: Arc<AtomicU64>,
    /// Highest sequence number that has committed
    committed: Arc<AtomicU64>,
    /// Serializes the commit step (stale check through snapshot replace)
    commit_lock: Arc<Mutex<()>>,
    /// Navigation callback for the foreground screen
    foreground: Arc<Mutex<Option<ForegroundQuery>>>,
    /// Platform notification scheduler callback
    notifier: Arc<Mutex<Option<NotificationHandler>>>,
    /// Running poll loop, if a session is active
    poll_task: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl<S: ConversationSource> Clone for SyncEngine<S> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            store: self.store.clone(),
            poll_interval: self.poll_interval,
            notifications_enabled: self.notifications_enabled,
            issued: self.issued.clone(),
            committed: self.committed.clone(),
            commit_lock: self.commit_lock.clone(),
            foreground: self.foreground.clone(),
            notifier: self.notifier.clone(),
            poll_task: self.poll_task.clone(),
        }
    }
}

impl<S: ConversationSource> SyncEngine<S> {
    /// Create a new engine over a conversation source
    pub fn new(source: S, config: &Config) -> Self {
        Self {
            source: Arc::new(source),
            store: SnapshotStore::new(),
            poll_interval: config.poll_interval(),
            notifications_enabled: config.enable_notifications,
            issued: Arc::new(AtomicU64::new(0)),
            committed: Arc::new(AtomicU64::new(0)),
            commit_lock: Arc::new(Mutex::new(())),
            foreground: Arc::new(Mutex::new(None)),
            notifier: Arc::new(Mutex::new(None)),
            poll_task: Arc::new(Mutex::new(None)),
        }
    }

    /// Set the foreground-location query callback
    ///
    /// Queried once per cycle, at decision time. Without a callback every
    /// event is treated as arriving on an unrelated screen and emitted.
    pub async fn set_foreground_query<F>(&self, query: F)
    where
        F: Fn() -> ForegroundLocation + Send + Sync + 'static,
    {
        let mut guard = self.foreground.lock().await;
        *guard = Some(Arc::new(query));
    }

    /// Set the local-notification handler callback
    ///
    /// The handler receives the presentation payload for each event that
    /// survives the foreground gate. Errors it returns are logged only.
    pub async fn set_notification_handler<F>(&self, handler: F)
    where
        F: Fn(LocalNotification) -> Result<()> + Send + Sync + 'static,
    {
        let mut guard = self.notifier.lock().await;
        *guard = Some(Arc::new(handler));
    }

    /// Get a copy of the current conversation snapshot
    pub async fn conversations(&self) -> Vec<ConversationSummary> {
        self.store.current().await
    }

    /// True iff any conversation has unread messages (drives the UI badge)
    pub async fn has_unread(&self) -> bool {
        self.store.has_unread().await
    }

    /// Start polling for a user session
    ///
    /// Runs one reconciliation cycle immediately, then repeats at the
    /// configured interval until [`stop`](Self::stop) is called. Starting
    /// while already active tears the previous session down first.
    pub async fn start(&self, user_id: impl Into<String>) {
        let user_id = user_id.into();
        self.stop().await;

        info!("Starting conversation sync for user {}", user_id);

        let engine = self.clone();
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(engine.poll_interval);
            // The first tick completes immediately, giving the login-time
            // reconciliation before the steady cadence begins.
            loop {
                ticker.tick().await;
                engine.run_cycle(&user_id).await;
            }
        });

        let mut guard = self.poll_task.lock().await;
        *guard = Some(handle);
    }

    /// Stop polling and clear the per-user snapshot
    ///
    /// Cancels the timer, makes any in-flight fetch's eventual resolution a
    /// no-op, and resets the store so no stale data leaks into a subsequent
    /// session for a different user.
    pub async fn stop(&self) {
        let handle = {
            let mut guard = self.poll_task.lock().await;
            guard.take()
        };
        if let Some(handle) = handle {
            handle.abort();
            info!("Stopped conversation sync");
        }

        let _commit = self.commit_lock.lock().await;
        self.committed
            .fetch_max(self.issued.load(Ordering::SeqCst), Ordering::SeqCst);
        self.store.clear().await;
    }

    /// Run one reconciliation cycle outside the timer (pull-to-refresh)
    pub async fn refresh(&self, user_id: &str) {
        self.run_cycle(user_id).await;
    }

    /// One fetch-diff-gate-dispatch-commit pass
    async fn run_cycle(&self, user_id: &str) {
        let seq = self.issued.fetch_add(1, Ordering::SeqCst) + 1;

        let current = match self.source.fetch_conversations(user_id).await {
            Ok(list) => list,
            Err(e) => {
                // Snapshot stays untouched; the next tick retries.
                warn!("Failed to fetch conversations: {}", e);
                return;
            }
        };

        let _commit = self.commit_lock.lock().await;
        if seq <= self.committed.load(Ordering::SeqCst) {
            debug!("Discarding stale reconciliation cycle {}", seq);
            return;
        }
        self.committed.store(seq, Ordering::SeqCst);

        let previous = self.store.current().await;
        let events = diff(&previous, &current);

        if !events.is_empty() {
            let location = self.current_location().await;
            for event in &events {
                if should_notify(event, &location) {
                    self.dispatch(event).await;
                } else {
                    debug!(
                        "Suppressing notification for {} while {:?} is in the foreground",
                        event.peer_id, location
                    );
                }
            }
        }

        self.store.replace(current).await;
    }

    /// Read the foreground screen from the navigation callback
    async fn current_location(&self) -> ForegroundLocation {
        let guard = self.foreground.lock().await;
        match guard.as_ref() {
            Some(query) => query(),
            None => ForegroundLocation::Other,
        }
    }

    /// Hand one event to the notification handler, fire-and-forget
    async fn dispatch(&self, event: &NotificationEvent) {
        if !self.notifications_enabled {
            debug!("Notifications disabled, dropping event for {}", event.peer_id);
            return;
        }

        let payload = LocalNotification::from_event(event);
        let guard = self.notifier.lock().await;
        match guard.as_ref() {
            Some(handler) => {
                if let Err(e) = handler(payload) {
                    warn!("Failed to schedule notification for {}: {}", event.peer_id, e);
                } else {
                    info!("Scheduled notification for message from {}", event.peer_id);
                }
            }
            None => {
                warn!("No notification handler set, event dropped");
            }
        }
    }
}
