//! Revalidating page cache
//!
//! Each generated page is kept as a [`CacheEntry`] stamped with the time it
//! was built and the staleness tolerance of its route.
//!
//! - Fresh hit: served as is.
//! - Stale hit: the stale page is served and one background rebuild starts.
//!   Later requests get the rebuilt page once it lands.
//! - Miss: the caller waits while the page is built. Concurrent callers for
//!   the same key share one build.
//!
//! Not-found results and failed builds are never stored.

use async_trait::async_trait;
use podcast_common::Result;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Builds one kind of page
#[async_trait]
pub trait PageBuilder: Send + Sync + 'static {
    type Key: Clone + Eq + Hash + Debug + Send + Sync + 'static;
    type Page: Send + Sync + 'static;

    /// Route name used in logs
    fn name(&self) -> &'static str;

    /// Generate the page for `key`; `Ok(None)` means the key does not exist
    async fn build(&self, key: &Self::Key) -> Result<Option<Self::Page>>;
}

/// A generated page with its freshness stamp
pub struct CacheEntry<P> {
    pub value: Arc<P>,
    pub generated_at: Instant,
    pub ttl: Duration,
}

impl<P> CacheEntry<P> {
    pub fn new(value: P, ttl: Duration) -> Self {
        Self {
            value: Arc::new(value),
            generated_at: Instant::now(),
            ttl,
        }
    }

    pub fn is_stale(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.generated_at) > self.ttl
    }
}

impl<P> Clone for CacheEntry<P> {
    fn clone(&self) -> Self {
        Self {
            value: Arc::clone(&self.value),
            generated_at: self.generated_at,
            ttl: self.ttl,
        }
    }
}

/// Per-key state
struct Slot<P> {
    entry: RwLock<Option<CacheEntry<P>>>,
    /// Held for the whole of a blocking build
    build_lock: Mutex<()>,
    refreshing: AtomicBool,
}

impl<P> Slot<P> {
    fn empty() -> Self {
        Self {
            entry: RwLock::new(None),
            build_lock: Mutex::new(()),
            refreshing: AtomicBool::new(false),
        }
    }
}

/// Cache of pages produced by one [`PageBuilder`]
pub struct RevalidatingCache<B: PageBuilder> {
    builder: Arc<B>,
    ttl: Duration,
    slots: Mutex<HashMap<B::Key, Arc<Slot<B::Page>>>>,
}

impl<B: PageBuilder> RevalidatingCache<B> {
    pub fn new(builder: B, ttl: Duration) -> Self {
        Self {
            builder: Arc::new(builder),
            ttl,
            slots: Mutex::new(HashMap::new()),
        }
    }

    pub fn builder(&self) -> &B {
        &self.builder
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Number of keys with a stored page
    pub async fn len(&self) -> usize {
        let slots: Vec<_> = self.slots.lock().await.values().cloned().collect();
        let mut count = 0;
        for slot in slots {
            if slot.entry.read().await.is_some() {
                count += 1;
            }
        }
        count
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// When the stored page for `key` was generated
    pub async fn generated_at(&self, key: &B::Key) -> Option<Instant> {
        let slot = self.slots.lock().await.get(key).cloned()?;
        let entry = slot.entry.read().await;
        entry.as_ref().map(|e| e.generated_at)
    }

    /// Resolve the page for `key`.
    ///
    /// `Ok(None)` is a not-found outcome.
    pub async fn get(&self, key: &B::Key) -> Result<Option<Arc<B::Page>>> {
        let slot = self.slot(key).await;

        if let Some(page) = self.serve_stored(key, &slot).await {
            return Ok(Some(page));
        }

        let _build = slot.build_lock.lock().await;

        // Another caller may have finished the build while we waited
        if let Some(page) = self.serve_stored(key, &slot).await {
            return Ok(Some(page));
        }

        debug!(page = self.builder.name(), key = ?key, "Building page on demand");
        self.build_into(key, &slot).await
    }

    /// Build and store the page for `key` ahead of any request
    pub async fn prime(&self, key: &B::Key) -> Result<bool> {
        let slot = self.slot(key).await;
        let _build = slot.build_lock.lock().await;
        Ok(self.build_into(key, &slot).await?.is_some())
    }

    async fn slot(&self, key: &B::Key) -> Arc<Slot<B::Page>> {
        let mut slots = self.slots.lock().await;
        Arc::clone(
            slots
                .entry(key.clone())
                .or_insert_with(|| Arc::new(Slot::empty())),
        )
    }

    /// Stored page if any, kicking off a refresh when it is stale
    async fn serve_stored(&self, key: &B::Key, slot: &Arc<Slot<B::Page>>) -> Option<Arc<B::Page>> {
        let entry = slot.entry.read().await.clone()?;
        if entry.is_stale(Instant::now()) {
            self.spawn_refresh(key, slot);
        } else {
            debug!(page = self.builder.name(), key = ?key, "Serving cached page");
        }
        Some(entry.value)
    }

    /// Blocking build; caller holds the slot's build lock
    async fn build_into(&self, key: &B::Key, slot: &Arc<Slot<B::Page>>) -> Result<Option<Arc<B::Page>>> {
        match self.builder.build(key).await {
            Ok(Some(page)) => {
                let entry = CacheEntry::new(page, self.ttl);
                let value = Arc::clone(&entry.value);
                *slot.entry.write().await = Some(entry);
                info!(page = self.builder.name(), key = ?key, "Page generated");
                Ok(Some(value))
            }
            Ok(None) => {
                debug!(page = self.builder.name(), key = ?key, "Page not found");
                self.forget(key, slot).await;
                Ok(None)
            }
            Err(e) => {
                self.forget(key, slot).await;
                Err(e)
            }
        }
    }

    /// Drop an empty slot so unknown keys do not accumulate
    async fn forget(&self, key: &B::Key, slot: &Arc<Slot<B::Page>>) {
        if slot.entry.read().await.is_some() {
            return;
        }
        let mut slots = self.slots.lock().await;
        if slots.get(key).is_some_and(|current| Arc::ptr_eq(current, slot)) {
            slots.remove(key);
        }
    }

    fn spawn_refresh(&self, key: &B::Key, slot: &Arc<Slot<B::Page>>) {
        if slot
            .refreshing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return;
        }

        let builder = Arc::clone(&self.builder);
        let slot = Arc::clone(slot);
        let key = key.clone();
        let ttl = self.ttl;

        debug!(page = builder.name(), key = ?key, "Page stale, revalidating in background");
        tokio::spawn(async move {
            let _refreshing = RefreshGuard(Arc::clone(&slot));
            match builder.build(&key).await {
                Ok(Some(page)) => {
                    *slot.entry.write().await = Some(CacheEntry::new(page, ttl));
                    info!(page = builder.name(), key = ?key, "Page revalidated");
                }
                Ok(None) => {
                    *slot.entry.write().await = None;
                    info!(page = builder.name(), key = ?key, "Page no longer exists, entry dropped");
                }
                Err(e) => {
                    warn!(page = builder.name(), key = ?key, "Revalidation failed, keeping stale page: {}", e);
                }
            }
        });
    }
}

/// Clears the slot's refresh flag when the refresh task ends, even by panic
struct RefreshGuard<P>(Arc<Slot<P>>);

impl<P> Drop for RefreshGuard<P> {
    fn drop(&mut self) {
        self.0.refreshing.store(false, Ordering::Release);
    }
}
