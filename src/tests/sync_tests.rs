//! Reconciliation-engine tests
//!
//! These drive the full fetch-diff-gate-dispatch-commit cycle against
//! scripted conversation sources and a recording notification handler.

use crate::config::Config;
use crate::model::ConversationSummary;
use crate::notify::LocalNotification;
use crate::sync::{ConversationSource, ForegroundLocation, SyncEngine};
use crate::{Error, Result};
use std::collections::VecDeque;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;
use tokio::sync::Notify;

/// Helper to build a conversation summary
fn summary(id: &str, time: i64, unread: u32) -> ConversationSummary {
    ConversationSummary {
        id: id.to_string(),
        peer_id: id.to_string(),
        peer_name: format!("peer {}", id),
        peer_avatar: String::new(),
        last_message: format!("message at {}", time),
        last_message_time: time,
        unread_count: unread,
    }
}

/// Helper to build a test config with a given poll cadence
fn test_config(poll_interval_ms: u64) -> Config {
    Config {
        api_url: "http://localhost:8080/api".to_string(),
        poll_interval_ms,
        enable_notifications: true,
    }
}

/// Source that replays a scripted sequence of fetch results
struct ScriptedSource {
    responses: StdMutex<VecDeque<Result<Vec<ConversationSummary>>>>,
}

impl ScriptedSource {
    fn new(responses: Vec<Result<Vec<ConversationSummary>>>) -> Self {
        Self {
            responses: StdMutex::new(responses.into_iter().collect()),
        }
    }
}

impl ConversationSource for ScriptedSource {
    fn fetch_conversations(
        &self,
        _user_id: &str,
    ) -> impl Future<Output = Result<Vec<ConversationSummary>>> + Send {
        let next = self
            .responses
            .lock()
            .expect("responses lock poisoned")
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()));
        async move { next }
    }
}

/// Source that counts fetches and always returns the same list
struct CountingSource {
    calls: Arc<AtomicU64>,
    conversations: Vec<ConversationSummary>,
}

impl ConversationSource for CountingSource {
    fn fetch_conversations(
        &self,
        _user_id: &str,
    ) -> impl Future<Output = Result<Vec<ConversationSummary>>> + Send {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let conversations = self.conversations.clone();
        async move { Ok(conversations) }
    }
}

/// Source whose first fetch blocks until released, returning stale data
struct SlowFirstSource {
    calls: Arc<AtomicU64>,
    release: Arc<Notify>,
    stale: Vec<ConversationSummary>,
    fresh: Vec<ConversationSummary>,
}

impl ConversationSource for SlowFirstSource {
    fn fetch_conversations(
        &self,
        _user_id: &str,
    ) -> impl Future<Output = Result<Vec<ConversationSummary>>> + Send {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        let release = self.release.clone();
        let stale = self.stale.clone();
        let fresh = self.fresh.clone();
        async move {
            if call == 1 {
                release.notified().await;
                Ok(stale)
            } else {
                Ok(fresh)
            }
        }
    }
}

/// Attach a recording notification handler and return the shared log
async fn record_notifications<S: ConversationSource>(
    engine: &SyncEngine<S>,
) -> Arc<StdMutex<Vec<LocalNotification>>> {
    let recorded = Arc::new(StdMutex::new(Vec::new()));
    let sink = recorded.clone();
    engine
        .set_notification_handler(move |note| {
            sink.lock().expect("recorded lock poisoned").push(note);
            Ok(())
        })
        .await;
    recorded
}

#[tokio::test]
async fn test_cycle_dispatches_for_new_unread() {
    let source = ScriptedSource::new(vec![Ok(vec![summary("u2", 1000, 2)])]);
    let engine = SyncEngine::new(source, &test_config(5_000));
    let recorded = record_notifications(&engine).await;
    engine
        .set_foreground_query(|| ForegroundLocation::Moments)
        .await;

    engine.refresh("u1").await;

    let notes = recorded.lock().expect("recorded lock poisoned");
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].title, "peer u2");
    assert_eq!(notes[0].body, "message at 1000");
    assert_eq!(notes[0].data.peer_id, "u2");
    drop(notes);

    assert_eq!(engine.conversations().await.len(), 1);
    assert!(engine.has_unread().await);
}

#[tokio::test]
async fn test_repeat_poll_does_not_renotify() {
    let list = vec![summary("u2", 1000, 2)];
    let source = ScriptedSource::new(vec![Ok(list.clone()), Ok(list)]);
    let engine = SyncEngine::new(source, &test_config(5_000));
    let recorded = record_notifications(&engine).await;
    engine
        .set_foreground_query(|| ForegroundLocation::Profile)
        .await;

    engine.refresh("u1").await;
    engine.refresh("u1").await;

    assert_eq!(recorded.lock().expect("recorded lock poisoned").len(), 1);
}

#[tokio::test]
async fn test_suppressed_while_chat_list_visible() {
    let source = ScriptedSource::new(vec![Ok(vec![summary("u2", 1000, 1)])]);
    let engine = SyncEngine::new(source, &test_config(5_000));
    let recorded = record_notifications(&engine).await;
    engine
        .set_foreground_query(|| ForegroundLocation::ChatList)
        .await;

    engine.refresh("u1").await;

    // Suppressed, but the snapshot still commits
    assert!(recorded.lock().expect("recorded lock poisoned").is_empty());
    assert_eq!(engine.conversations().await.len(), 1);
}

#[tokio::test]
async fn test_suppressed_while_chatting_with_sender() {
    let source = ScriptedSource::new(vec![
        Ok(vec![summary("u2", 1000, 1), summary("u3", 1000, 1)]),
    ]);
    let engine = SyncEngine::new(source, &test_config(5_000));
    let recorded = record_notifications(&engine).await;
    engine
        .set_foreground_query(|| ForegroundLocation::Chat {
            peer_id: "u2".to_string(),
        })
        .await;

    engine.refresh("u1").await;

    // u2's event is suppressed, u3's still goes through
    let notes = recorded.lock().expect("recorded lock poisoned");
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].data.peer_id, "u3");
}

#[tokio::test]
async fn test_no_foreground_query_emits() {
    let source = ScriptedSource::new(vec![Ok(vec![summary("u2", 1000, 1)])]);
    let engine = SyncEngine::new(source, &test_config(5_000));
    let recorded = record_notifications(&engine).await;

    engine.refresh("u1").await;

    assert_eq!(recorded.lock().expect("recorded lock poisoned").len(), 1);
}

#[tokio::test]
async fn test_notifications_disabled_still_commits() {
    let mut config = test_config(5_000);
    config.enable_notifications = false;

    let source = ScriptedSource::new(vec![Ok(vec![summary("u2", 1000, 1)])]);
    let engine = SyncEngine::new(source, &config);
    let recorded = record_notifications(&engine).await;

    engine.refresh("u1").await;

    assert!(recorded.lock().expect("recorded lock poisoned").is_empty());
    assert!(engine.has_unread().await);
}

#[tokio::test]
async fn test_handler_error_does_not_disturb_commit() {
    let source = ScriptedSource::new(vec![Ok(vec![summary("u2", 1000, 1)])]);
    let engine = SyncEngine::new(source, &test_config(5_000));
    engine
        .set_notification_handler(|_| Err(Error::Notification("scheduler unavailable".to_string())))
        .await;

    engine.refresh("u1").await;

    assert_eq!(engine.conversations().await.len(), 1);
}

#[tokio::test]
async fn test_fetch_error_leaves_snapshot_untouched() {
    let source = ScriptedSource::new(vec![
        Ok(vec![summary("u2", 1000, 1)]),
        Err(Error::Api("backend unavailable".to_string())),
    ]);
    let engine = SyncEngine::new(source, &test_config(5_000));
    let recorded = record_notifications(&engine).await;

    engine.refresh("u1").await;
    engine.refresh("u1").await;

    let conversations = engine.conversations().await;
    assert_eq!(conversations.len(), 1);
    assert_eq!(conversations[0].id, "u2");
    assert_eq!(recorded.lock().expect("recorded lock poisoned").len(), 1);
}

#[tokio::test]
async fn test_stale_cycle_is_discarded() {
    let calls = Arc::new(AtomicU64::new(0));
    let release = Arc::new(Notify::new());
    let source = SlowFirstSource {
        calls: calls.clone(),
        release: release.clone(),
        stale: vec![summary("u2", 1000, 1)],
        fresh: vec![summary("u2", 2000, 2)],
    };
    let engine = SyncEngine::new(source, &test_config(5_000));
    let recorded = record_notifications(&engine).await;

    // Cycle A issues its fetch first, then blocks inside it
    let slow = {
        let engine = engine.clone();
        tokio::spawn(async move {
            engine.refresh("u1").await;
        })
    };
    while calls.load(Ordering::SeqCst) < 1 {
        tokio::task::yield_now().await;
    }

    // Cycle B issues later but commits first
    engine.refresh("u1").await;
    assert_eq!(engine.conversations().await[0].last_message_time, 2000);
    assert_eq!(recorded.lock().expect("recorded lock poisoned").len(), 1);

    // Cycle A resolves late; its commit and events must be a no-op
    release.notify_one();
    slow.await.expect("refresh task panicked");

    let conversations = engine.conversations().await;
    assert_eq!(conversations[0].last_message_time, 2000);
    assert_eq!(conversations[0].unread_count, 2);
    assert_eq!(recorded.lock().expect("recorded lock poisoned").len(), 1);
}

#[tokio::test]
async fn test_start_polls_until_stopped() {
    let calls = Arc::new(AtomicU64::new(0));
    let source = CountingSource {
        calls: calls.clone(),
        conversations: vec![summary("u2", 1000, 1)],
    };
    let engine = SyncEngine::new(source, &test_config(20));
    let _recorded = record_notifications(&engine).await;

    engine.start("u1").await;
    tokio::time::sleep(Duration::from_millis(90)).await;

    let polled = calls.load(Ordering::SeqCst);
    assert!(polled >= 2, "expected repeated polls, got {}", polled);
    assert!(engine.has_unread().await);

    engine.stop().await;
    let after_stop = calls.load(Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(80)).await;

    // The timer issues no further fetches and the snapshot is gone
    assert_eq!(calls.load(Ordering::SeqCst), after_stop);
    assert!(engine.conversations().await.is_empty());
    assert!(!engine.has_unread().await);
}

#[tokio::test]
async fn test_stop_without_start_is_harmless() {
    let source = ScriptedSource::new(vec![]);
    let engine = SyncEngine::new(source, &test_config(5_000));

    engine.stop().await;

    assert!(engine.conversations().await.is_empty());
}
