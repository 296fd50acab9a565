//! Logging profiles and their propagation to a child process.

use std::fmt;
use std::io::{self, Write};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock, Weak};

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Logger-wide settings a producer may change at runtime.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// Level patterns such as `*:INFO,network:DEBUG`.
    pub log_level_patterns: String,
    pub with_correlation: bool,
    pub with_logger_name: bool,
}

impl Profile {
    pub fn new(log_level_patterns: impl Into<String>) -> Self {
        Self {
            log_level_patterns: log_level_patterns.into(),
            ..Self::default()
        }
    }
}

/// Single-line JSON.
impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

/// Notified after the current profile of a [`ProfileSource`] changes.
pub trait ProfileObserver: Send + Sync {
    fn on_profile_changed(&self, profile: &Profile);
}

/// Identifies a subscription for [`ProfileSource::unsubscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Holds the current profile and notifies subscribers when it changes.
///
/// Subscribers are held weakly; dropping an observer implicitly ends its
/// subscription.
#[derive(Default)]
pub struct ProfileSource {
    current: RwLock<Profile>,
    subscribers: Mutex<Vec<(SubscriptionId, Weak<dyn ProfileObserver>)>>,
    next_id: AtomicU64,
}

impl ProfileSource {
    pub fn new(initial: Profile) -> Self {
        Self {
            current: RwLock::new(initial),
            ..Self::default()
        }
    }

    /// Snapshot of the current profile.
    pub fn current(&self) -> Profile {
        match self.current.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Replace the current profile and notify every live subscriber.
    ///
    /// Observers run on the caller's thread, after internal locks are
    /// released.
    pub fn set_profile(&self, profile: Profile) {
        match self.current.write() {
            Ok(mut guard) => *guard = profile.clone(),
            Err(poisoned) => *poisoned.into_inner() = profile.clone(),
        }

        let observers: Vec<Arc<dyn ProfileObserver>> = {
            let mut subscribers = self.lock_subscribers();
            subscribers.retain(|(_, weak)| weak.strong_count() > 0);
            subscribers
                .iter()
                .filter_map(|(_, weak)| weak.upgrade())
                .collect()
        };
        debug!(subscribers = observers.len(), "log profile changed");

        for observer in observers {
            observer.on_profile_changed(&profile);
        }
    }

    pub fn subscribe(&self, observer: &Arc<dyn ProfileObserver>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.lock_subscribers().push((id, Arc::downgrade(observer)));
        id
    }

    /// Returns false if `id` was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.lock_subscribers();
        let before = subscribers.len();
        subscribers.retain(|(sub, _)| *sub != id);
        subscribers.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock_subscribers()
            .iter()
            .filter(|(_, weak)| weak.strong_count() > 0)
            .count()
    }

    fn lock_subscribers(
        &self,
    ) -> std::sync::MutexGuard<'_, Vec<(SubscriptionId, Weak<dyn ProfileObserver>)>> {
        self.subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl fmt::Debug for ProfileSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProfileSource")
            .field("current", &self.current())
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

/// Prints the current profile, one line per change, so a parent process
/// reading the output can follow it.
///
/// Write failures are ignored: a profile that cannot be printed is simply
/// not propagated.
pub struct PipeProfileForwarder<W> {
    source: Arc<ProfileSource>,
    out: Mutex<W>,
    subscription: Mutex<Option<SubscriptionId>>,
}

impl<W: Write + Send + 'static> PipeProfileForwarder<W> {
    pub fn new(source: Arc<ProfileSource>, out: W) -> Arc<Self> {
        Arc::new(Self {
            source,
            out: Mutex::new(out),
            subscription: Mutex::new(None),
        })
    }

    /// Subscribe to changes and print the current profile once.
    pub fn start_forwarding(self: &Arc<Self>) {
        let observer: Arc<dyn ProfileObserver> = self.clone();
        let id = self.source.subscribe(&observer);
        let previous = self
            .subscription
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .replace(id);
        if let Some(previous) = previous {
            self.source.unsubscribe(previous);
        }
        self.forward_profile(&self.source.current());
    }

    /// Stop receiving profile changes.
    pub fn close(&self) {
        let id = self
            .subscription
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        if let Some(id) = id {
            self.source.unsubscribe(id);
        }
    }

    fn forward_profile(&self, profile: &Profile) {
        let mut out = self.out.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let _ = writeln!(out, "{profile}").and_then(|()| out.flush());
    }
}

impl PipeProfileForwarder<io::Stdout> {
    pub fn stdout(source: Arc<ProfileSource>) -> Arc<Self> {
        Self::new(source, io::stdout())
    }
}

impl<W: Write + Send + 'static> ProfileObserver for PipeProfileForwarder<W> {
    fn on_profile_changed(&self, profile: &Profile) {
        self.forward_profile(profile);
    }
}

impl<W> fmt::Debug for PipeProfileForwarder<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipeProfileForwarder")
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}
