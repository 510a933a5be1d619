//! In-memory [`ObjectStore`] implementation with operation tracing.
//!
//! Records all operations for later assertion in tests, and supports
//! injecting failures, panics, delays or silently dropped writes for
//! chosen keys.

use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use mr_error::{StoreError, StoreErrorKind};
use mr_traits::{ListPage, ObjectStore, StoredObject};
use parking_lot::Mutex;

/// Default listing page size, matching S3's ListObjectsV2 maximum.
pub const DEFAULT_PAGE_SIZE: usize = 1000;

/// Which store operation an injected fault applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpKind {
    /// `list_page`
    List,
    /// `copy` (matched against the source key)
    Copy,
    /// `delete`
    Delete,
    /// `put`
    Put,
}

/// Record of a store operation for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOp {
    /// List operation.
    List {
        /// Prefix that was listed.
        prefix: String,
        /// Whether the call succeeded.
        ok: bool,
    },
    /// Copy operation.
    Copy {
        /// Key copied from.
        source: String,
        /// Key copied to.
        dest: String,
        /// Whether the call succeeded.
        ok: bool,
    },
    /// Delete operation.
    Delete {
        /// Key that was deleted.
        key: String,
        /// Whether the call succeeded.
        ok: bool,
    },
    /// Put operation.
    Put {
        /// Key that was written.
        key: String,
        /// Size of data written.
        size: usize,
        /// Whether the call succeeded.
        ok: bool,
    },
}

impl StoreOp {
    /// The operation kind.
    pub fn kind(&self) -> OpKind {
        match self {
            StoreOp::List { .. } => OpKind::List,
            StoreOp::Copy { .. } => OpKind::Copy,
            StoreOp::Delete { .. } => OpKind::Delete,
            StoreOp::Put { .. } => OpKind::Put,
        }
    }
}

#[derive(Debug, Clone)]
struct InjectedFault {
    op: OpKind,
    key_prefix: String,
    action: FaultAction,
    /// Remaining triggers; `None` fires forever.
    remaining: Option<u32>,
}

#[derive(Debug, Clone, Copy)]
enum FaultAction {
    Fail(StoreErrorKind),
    Panic,
    Delay(Duration),
    /// Report success without changing any object.
    Silent,
}

/// What a mutating operation should do after fault injection.
enum Effect {
    Apply,
    Skip,
}

/// In-memory object store with operation tracing.
///
/// Cloning shares the underlying state, so a test can keep a handle while
/// the code under test owns another.
#[derive(Debug, Clone)]
pub struct MemoryObjectStore {
    objects: Arc<Mutex<BTreeMap<String, Vec<u8>>>>,
    operations: Arc<Mutex<Vec<StoreOp>>>,
    faults: Arc<Mutex<Vec<InjectedFault>>>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
    page_size: usize,
    latency: Option<Duration>,
}

impl Default for MemoryObjectStore {
    fn default() -> Self {
        Self {
            objects: Arc::default(),
            operations: Arc::default(),
            faults: Arc::default(),
            in_flight: Arc::default(),
            max_in_flight: Arc::default(),
            page_size: DEFAULT_PAGE_SIZE,
            latency: None,
        }
    }
}

impl MemoryObjectStore {
    /// Creates a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the listing page size.
    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Adds simulated latency to every operation.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Seeds an object without recording an operation.
    pub fn insert(&self, key: impl Into<String>, body: impl Into<Vec<u8>>) {
        self.objects.lock().insert(key.into(), body.into());
    }

    /// Checks whether a key is present.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.objects.lock().contains_key(key)
    }

    /// Returns the body stored at a key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.lock().get(key).cloned()
    }

    /// Returns all stored keys in order.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.objects.lock().keys().cloned().collect()
    }

    /// Number of stored objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.lock().len()
    }

    /// Whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.lock().is_empty()
    }

    /// Returns all recorded operations.
    #[must_use]
    pub fn operations(&self) -> Vec<StoreOp> {
        self.operations.lock().clone()
    }

    /// Counts recorded operations of one kind.
    #[must_use]
    pub fn count(&self, kind: OpKind) -> usize {
        self.operations.lock().iter().filter(|op| op.kind() == kind).count()
    }

    /// Clears recorded operations.
    pub fn clear_operations(&self) {
        self.operations.lock().clear();
    }

    /// Highest number of operations observed running at once.
    #[must_use]
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Fails every `op` on keys starting with `key_prefix`.
    pub fn inject_failure(&self, op: OpKind, key_prefix: impl Into<String>, kind: StoreErrorKind) {
        self.push_fault(op, key_prefix.into(), FaultAction::Fail(kind), None);
    }

    /// Fails the next `times` matching `op` calls, then lets them through.
    pub fn inject_failures(
        &self,
        op: OpKind,
        key_prefix: impl Into<String>,
        kind: StoreErrorKind,
        times: u32,
    ) {
        self.push_fault(op, key_prefix.into(), FaultAction::Fail(kind), Some(times));
    }

    /// Panics inside every `op` on keys starting with `key_prefix`.
    pub fn inject_panic(&self, op: OpKind, key_prefix: impl Into<String>) {
        self.push_fault(op, key_prefix.into(), FaultAction::Panic, None);
    }

    /// Delays every `op` on keys starting with `key_prefix` before it runs.
    pub fn inject_delay(&self, op: OpKind, key_prefix: impl Into<String>, delay: Duration) {
        self.push_fault(op, key_prefix.into(), FaultAction::Delay(delay), None);
    }

    /// Makes every `op` on keys starting with `key_prefix` report success
    /// without writing or removing anything.
    pub fn inject_silent(&self, op: OpKind, key_prefix: impl Into<String>) {
        self.push_fault(op, key_prefix.into(), FaultAction::Silent, None);
    }

    /// Clears all injected faults.
    pub fn clear_failures(&self) {
        self.faults.lock().clear();
    }

    fn push_fault(&self, op: OpKind, key_prefix: String, action: FaultAction, remaining: Option<u32>) {
        self.faults.lock().push(InjectedFault {
            op,
            key_prefix,
            action,
            remaining,
        });
    }

    fn record(&self, op: StoreOp) {
        self.operations.lock().push(op);
    }

    async fn check_fault(&self, op: OpKind, key: &str) -> Result<Effect, StoreError> {
        let action = {
            let mut faults = self.faults.lock();
            let hit = faults.iter_mut().find(|f| {
                f.op == op && key.starts_with(&f.key_prefix) && f.remaining != Some(0)
            });
            match hit {
                Some(fault) => {
                    if let Some(remaining) = fault.remaining.as_mut() {
                        *remaining -= 1;
                    }
                    Some(fault.action)
                }
                None => None,
            }
        };

        match action {
            Some(FaultAction::Fail(kind)) => Err(StoreError::new(
                kind,
                key,
                format!("Injected {kind} failure"),
            )),
            Some(FaultAction::Panic) => panic!("Injected panic for {op:?} on {key}"),
            Some(FaultAction::Delay(delay)) => {
                tokio::time::sleep(delay).await;
                Ok(Effect::Apply)
            }
            Some(FaultAction::Silent) => Ok(Effect::Skip),
            None => Ok(Effect::Apply),
        }
    }

    async fn enter(&self) -> InFlight<'_> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        InFlight(&self.in_flight)
    }
}

/// Decrements the in-flight counter when an operation finishes.
struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn list_page(
        &self,
        prefix: &str,
        continuation_token: Option<&str>,
    ) -> Result<ListPage, StoreError> {
        let _guard = self.enter().await;
        if let Err(e) = self.check_fault(OpKind::List, prefix).await {
            self.record(StoreOp::List {
                prefix: prefix.to_string(),
                ok: false,
            });
            return Err(e);
        }

        // The continuation token is the last key of the previous page.
        let start = match continuation_token {
            Some(token) => Bound::Excluded(token.to_string()),
            None => Bound::Included(prefix.to_string()),
        };

        let page = {
            let objects = self.objects.lock();
            let mut matching = objects
                .range((start, Bound::Unbounded))
                .take_while(|(key, _)| key.starts_with(prefix))
                .map(|(key, body)| StoredObject::new(key.clone(), body.len() as u64));

            let page: Vec<StoredObject> = matching.by_ref().take(self.page_size).collect();
            let more = matching.next().is_some();
            let next_token = if more {
                page.last().map(|obj| obj.key.clone())
            } else {
                None
            };
            ListPage {
                objects: page,
                next_token,
            }
        };

        self.record(StoreOp::List {
            prefix: prefix.to_string(),
            ok: true,
        });
        Ok(page)
    }

    async fn copy(&self, source_key: &str, dest_key: &str) -> Result<(), StoreError> {
        let _guard = self.enter().await;
        let result = self
            .check_fault(OpKind::Copy, source_key)
            .await
            .and_then(|effect| {
                let mut objects = self.objects.lock();
                let body = objects.get(source_key).cloned().ok_or_else(|| {
                    StoreError::new(StoreErrorKind::NotFound, source_key, "NoSuchKey")
                })?;
                if let Effect::Apply = effect {
                    objects.insert(dest_key.to_string(), body);
                }
                Ok(())
            });

        self.record(StoreOp::Copy {
            source: source_key.to_string(),
            dest: dest_key.to_string(),
            ok: result.is_ok(),
        });
        result
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let _guard = self.enter().await;
        // Deleting an absent key succeeds, as it does on S3.
        let result = self.check_fault(OpKind::Delete, key).await.map(|effect| {
            if let Effect::Apply = effect {
                self.objects.lock().remove(key);
            }
        });

        self.record(StoreOp::Delete {
            key: key.to_string(),
            ok: result.is_ok(),
        });
        result
    }

    async fn put(&self, key: &str, body: &[u8]) -> Result<(), StoreError> {
        let _guard = self.enter().await;
        let result = self.check_fault(OpKind::Put, key).await.map(|effect| {
            if let Effect::Apply = effect {
                self.objects.lock().insert(key.to_string(), body.to_vec());
            }
        });

        self.record(StoreOp::Put {
            key: key.to_string(),
            size: body.len(),
            ok: result.is_ok(),
        });
        result
    }

    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        let _guard = self.enter().await;
        Ok(self.contains(key))
    }
}
