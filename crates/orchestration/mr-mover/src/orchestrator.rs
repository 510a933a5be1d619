//! Batch orchestration over the whole object population.

use std::sync::Arc;

use futures::{StreamExt, pin_mut};
use mr_error::{MrError, Result};
use mr_resolver::resolve_key;
use mr_traits::ObjectStore;
use mr_types::{CanonicalRoot, is_canonical};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::config::MigrationConfig;
use crate::executor::{MoveExecutor, MoveOutcome};
use crate::folder::FolderEnsurer;
use crate::listing::list_pages;
use crate::router::{WorkReceiver, WorkRouter};
use crate::stats::{MigrationStats, StatsSnapshot};

/// Moves every flat key under the configured prefix into the canonical
/// layout.
///
/// Listing is sequential. Each eligible key goes onto one shared queue that
/// a fixed pool of workers pulls from. Each worker handles one object at a
/// time, so the pool size bounds concurrent store requests and a slow object
/// holds up only its own worker. A failure or panic while handling one
/// object is recorded against that object and never stops the batch.
pub struct BatchOrchestrator<S: ObjectStore + ?Sized + 'static> {
    config: MigrationConfig,
    store: Arc<S>,
    stats: Arc<MigrationStats>,
}

impl<S: ObjectStore + ?Sized + 'static> BatchOrchestrator<S> {
    /// Create an orchestrator over a shared store.
    pub fn new(config: MigrationConfig, store: Arc<S>) -> Self {
        Self {
            config,
            store,
            stats: Arc::new(MigrationStats::new()),
        }
    }

    /// Get a reference to the live statistics.
    pub fn stats(&self) -> &Arc<MigrationStats> {
        &self.stats
    }

    /// Run the migration until every dispatched object has been handled.
    ///
    /// Only invalid configuration is returned as an error; per-object and
    /// listing failures are reported in the snapshot.
    pub async fn run(&self) -> Result<StatsSnapshot> {
        self.config.validate().map_err(MrError::Config)?;

        info!(
            workers = self.config.workers,
            prefix = %self.config.prefix,
            dry_run = self.config.dry_run,
            verify_copy = self.config.verify_copy,
            "Starting migration"
        );

        let folders = FolderEnsurer::new(self.store.clone(), self.config.retry.clone());
        if self.config.ensure_root_folders && !self.config.dry_run {
            self.ensure_root_folders(&folders).await;
        }

        let processor = Arc::new(ObjectProcessor {
            executor: MoveExecutor::new(self.store.clone(), self.config.retry.clone())
                .with_verify_copy(self.config.verify_copy),
            folders,
            ensure_parent_folders: self.config.ensure_parent_folders,
            dry_run: self.config.dry_run,
        });

        let (router, receiver) = WorkRouter::new(self.config.channel_buffer);

        let worker_handles: Vec<JoinHandle<()>> = (0..self.config.workers)
            .map(|worker_id| {
                tokio::spawn(worker_loop(
                    worker_id,
                    receiver.clone(),
                    processor.clone(),
                    self.stats.clone(),
                ))
            })
            .collect();
        drop(receiver);

        self.dispatch(&router).await;

        router.shutdown();

        // Every dispatched object is finished before the batch reports.
        let results = futures::future::join_all(worker_handles).await;
        for (i, result) in results.into_iter().enumerate() {
            if let Err(e) = result {
                error!(worker = i, error = %e, "Worker task panicked");
                self.stats.record_error(format!("worker {i} panicked: {e}"));
            }
        }

        self.stats.complete();
        let snapshot = self.stats.snapshot();

        info!(
            discovered = snapshot.discovered,
            skipped = snapshot.skipped,
            resolved = snapshot.resolved,
            errored = snapshot.errored,
            moved = snapshot.moved,
            failed_copy = snapshot.failed_copy,
            failed_delete = snapshot.failed_delete,
            "Migration completed"
        );

        Ok(snapshot)
    }

    async fn ensure_root_folders(&self, folders: &FolderEnsurer<S>) {
        for root in CanonicalRoot::ALL {
            if let Err(e) = folders.ensure(root.prefix()).await {
                warn!(folder = root.prefix(), error = %e, "Failed to ensure root folder");
                self.stats
                    .record_error(format!("root folder {}: {e}", root.prefix()));
            }
        }
    }

    /// List every page and route each eligible key to the pool.
    async fn dispatch(&self, router: &WorkRouter<String>) {
        let pages = list_pages(self.store.as_ref(), &self.config.prefix, &self.config.retry);
        pin_mut!(pages);

        while let Some(page) = pages.next().await {
            let page = match page {
                Ok(page) => page,
                Err(e) => {
                    error!(prefix = %self.config.prefix, error = %e, "Listing failed, stopping discovery");
                    self.stats.record_listing_failure(&e);
                    return;
                }
            };

            self.stats.record_page();
            debug!(objects = page.objects.len(), "Listed page");

            for obj in page.objects {
                self.stats.record_discovered();

                if is_canonical(&obj.key) {
                    debug!(key = %obj.key, "Skipping already-migrated object");
                    self.stats.record_skipped();
                    continue;
                }

                match router.route(obj.key).await {
                    Ok(()) => self.stats.record_dispatched(),
                    Err(key) => {
                        error!(key = %key, "Worker pool closed, object not dispatched");
                        self.stats.record_errored(&key, "worker pool closed");
                    }
                }
            }
        }
    }
}

/// Per-object pipeline shared by all workers: resolve, ensure folders, move.
struct ObjectProcessor<S: ObjectStore + ?Sized> {
    executor: MoveExecutor<S>,
    folders: FolderEnsurer<S>,
    ensure_parent_folders: bool,
    dry_run: bool,
}

impl<S: ObjectStore + ?Sized> ObjectProcessor<S> {
    /// Returns `None` in dry-run mode.
    async fn process(&self, key: &str) -> Result<Option<MoveOutcome>> {
        let dest = resolve_key(key);

        if self.dry_run {
            info!(source = %key, dest = %dest, "Planned move");
            return Ok(None);
        }

        if self.ensure_parent_folders {
            if let Some(parent) = dest.parent_prefix() {
                self.folders.ensure(parent).await?;
            }
        }

        Ok(Some(self.executor.move_object(key, dest.as_str()).await))
    }
}

async fn worker_loop<S: ObjectStore + ?Sized + 'static>(
    worker_id: usize,
    rx: WorkReceiver<String>,
    processor: Arc<ObjectProcessor<S>>,
    stats: Arc<MigrationStats>,
) {
    debug!(worker = worker_id, "Worker started");

    while let Some(key) = rx.recv().await {
        // A separate task per object turns a panic into a JoinError for
        // that object alone.
        let task = {
            let processor = processor.clone();
            let key = key.clone();
            tokio::spawn(async move { processor.process(&key).await })
        };

        match task.await {
            Ok(Ok(Some(outcome))) => stats.record_outcome(&outcome),
            Ok(Ok(None)) => stats.record_planned(),
            Ok(Err(e)) => {
                error!(worker = worker_id, key = %key, error = %e, "Object errored");
                stats.record_errored(&key, &e);
            }
            Err(e) => {
                error!(worker = worker_id, key = %key, error = %e, "Object task panicked");
                stats.record_errored(&key, &e);
            }
        }
    }

    debug!(worker = worker_id, "Worker finished");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retry::RetryConfig;
    use mr_error::StoreErrorKind;
    use mr_memstore::{MemoryObjectStore, OpKind, StoreOp};
    use std::collections::HashSet;
    use std::time::Duration;

    fn config() -> MigrationConfig {
        MigrationConfig::new()
            .with_workers(4)
            .with_channel_buffer(2)
            .with_retry(RetryConfig::disabled())
    }

    fn orchestrator(
        store: &MemoryObjectStore,
        config: MigrationConfig,
    ) -> BatchOrchestrator<MemoryObjectStore> {
        BatchOrchestrator::new(config, Arc::new(store.clone()))
    }

    fn seed(store: &MemoryObjectStore, count: usize) -> Vec<String> {
        (0..count)
            .map(|i| {
                let key = format!("USTR/USTR-2015-{i:04}/file.json");
                store.insert(key.clone(), format!("{i}"));
                key
            })
            .collect()
    }

    #[tokio::test]
    async fn test_moves_every_flat_key() {
        let store = MemoryObjectStore::new().with_page_size(3);
        let keys = seed(&store, 10);
        store.insert(
            "FDA/FDA-2017-D-2335/extracted_text/a.txt".to_string(),
            "text",
        );

        let snapshot = orchestrator(&store, config()).run().await.unwrap();

        assert_eq!(snapshot.resolved, 11);
        assert_eq!(snapshot.moved, 11);
        assert_eq!(snapshot.errored, 0);
        assert!(!snapshot.has_failures());
        for (i, key) in keys.iter().enumerate() {
            assert!(!store.contains(key));
            assert_eq!(
                store.get(&format!("raw-data/{key}")),
                Some(format!("{i}").into_bytes())
            );
        }
        assert!(store.contains(
            "derived-data/FDA/FDA-2017-D-2335/Mirrulations/extracted_txt/extracted_text/a.txt"
        ));
    }

    #[tokio::test]
    async fn test_creates_root_folders() {
        let store = MemoryObjectStore::new();

        orchestrator(&store, config()).run().await.unwrap();

        assert!(store.contains("raw-data/"));
        assert!(store.contains("raw-data/placeholder"));
        assert!(store.contains("derived-data/"));
        assert!(store.contains("derived-data/placeholder"));
    }

    #[tokio::test]
    async fn test_skips_already_migrated_keys() {
        let store = MemoryObjectStore::new();
        store.insert("raw-data/USTR/USTR-2015-0010/file.json", "{}");
        store.insert("derived-data/USTR/USTR-2015-0010/Mirrulations/extracted_txt/x.txt", "t");

        let snapshot = orchestrator(&store, config().with_ensure_root_folders(false))
            .run()
            .await
            .unwrap();

        assert_eq!(snapshot.discovered, 2);
        assert_eq!(snapshot.skipped, 2);
        assert_eq!(snapshot.resolved, 0);
        assert_eq!(store.count(OpKind::Copy), 0);
        assert_eq!(store.count(OpKind::Delete), 0);
    }

    #[tokio::test]
    async fn test_partial_failure_isolation() {
        let store = MemoryObjectStore::new();
        let keys = seed(&store, 9);
        store.insert("BOOM/BOOM-1/file.json", "x");
        store.inject_panic(OpKind::Copy, "BOOM/");

        let snapshot = orchestrator(&store, config()).run().await.unwrap();

        assert_eq!(snapshot.dispatched, 10);
        assert_eq!(snapshot.resolved, 9);
        assert_eq!(snapshot.errored, 1);
        assert!(snapshot.errors.iter().any(|e| e.contains("BOOM/BOOM-1/file.json")));
        assert!(store.contains("BOOM/BOOM-1/file.json"));
        for key in &keys {
            assert!(store.contains(&format!("raw-data/{key}")));
        }
    }

    #[tokio::test]
    async fn test_failed_moves_still_resolve() {
        let store = MemoryObjectStore::new();
        seed(&store, 4);
        store.inject_failure(
            OpKind::Copy,
            "USTR/USTR-2015-0001/",
            StoreErrorKind::AccessDenied,
        );
        store.inject_failure(
            OpKind::Delete,
            "USTR/USTR-2015-0002/",
            StoreErrorKind::AccessDenied,
        );

        let snapshot = orchestrator(&store, config()).run().await.unwrap();

        assert_eq!(snapshot.resolved, 4);
        assert_eq!(snapshot.errored, 0);
        assert_eq!(snapshot.moved, 2);
        assert_eq!(snapshot.failed_copy, 1);
        assert_eq!(snapshot.failed_delete, 1);
        assert!(snapshot.has_failures());

        assert!(store.contains("USTR/USTR-2015-0001/file.json"));
        assert!(!store.contains("raw-data/USTR/USTR-2015-0001/file.json"));
        assert!(store.contains("USTR/USTR-2015-0002/file.json"));
        assert!(store.contains("raw-data/USTR/USTR-2015-0002/file.json"));
    }

    #[tokio::test]
    async fn test_no_delete_without_prior_copy() {
        let store = MemoryObjectStore::new().with_page_size(4);
        seed(&store, 20);
        store.inject_failure(
            OpKind::Copy,
            "USTR/USTR-2015-0007/",
            StoreErrorKind::TransientProvider,
        );

        orchestrator(&store, config()).run().await.unwrap();

        let mut copied = HashSet::new();
        for op in store.operations() {
            match op {
                StoreOp::Copy {
                    source, ok: true, ..
                } => {
                    copied.insert(source);
                }
                StoreOp::Delete { key, .. } => {
                    assert!(copied.contains(&key), "deleted {key} before copying it");
                }
                _ => {}
            }
        }
        // Every object is at its source, its destination, or both.
        for i in 0..20 {
            let key = format!("USTR/USTR-2015-{i:04}/file.json");
            assert!(store.contains(&key) || store.contains(&format!("raw-data/{key}")));
        }
    }

    #[tokio::test]
    async fn test_dry_run_touches_nothing() {
        let store = MemoryObjectStore::new();
        let keys = seed(&store, 3);

        let snapshot = orchestrator(&store, config().with_dry_run(true))
            .run()
            .await
            .unwrap();

        assert_eq!(snapshot.planned, 3);
        assert_eq!(snapshot.resolved, 3);
        assert_eq!(snapshot.moved, 0);
        assert_eq!(store.count(OpKind::Copy), 0);
        assert_eq!(store.count(OpKind::Delete), 0);
        assert_eq!(store.count(OpKind::Put), 0);
        assert_eq!(store.keys(), {
            let mut sorted = keys.clone();
            sorted.sort();
            sorted
        });
    }

    #[tokio::test]
    async fn test_parent_folders_are_ensured() {
        let store = MemoryObjectStore::new();
        store.insert("USTR/USTR-2015-0010/file.json", "{}");

        orchestrator(
            &store,
            config()
                .with_ensure_root_folders(false)
                .with_ensure_parent_folders(true),
        )
        .run()
        .await
        .unwrap();

        assert!(store.contains("raw-data/USTR/USTR-2015-0010/"));
        assert!(store.contains("raw-data/USTR/USTR-2015-0010/placeholder"));
        assert!(store.contains("raw-data/USTR/USTR-2015-0010/file.json"));
    }

    #[tokio::test]
    async fn test_parent_folder_failure_errors_object_only() {
        let store = MemoryObjectStore::new();
        store.insert("USTR/USTR-2015-0010/file.json", "{}");
        store.insert("FDA/FDA-2017-D-2335/file.json", "{}");
        store.inject_failure(OpKind::Put, "raw-data/USTR/", StoreErrorKind::AccessDenied);

        let snapshot = orchestrator(
            &store,
            config()
                .with_ensure_root_folders(false)
                .with_ensure_parent_folders(true),
        )
        .run()
        .await
        .unwrap();

        assert_eq!(snapshot.errored, 1);
        assert_eq!(snapshot.moved, 1);
        assert!(store.contains("USTR/USTR-2015-0010/file.json"));
        assert!(store.contains("raw-data/FDA/FDA-2017-D-2335/file.json"));
    }

    #[tokio::test]
    async fn test_worker_pool_bounds_concurrency() {
        let store = MemoryObjectStore::new().with_latency(Duration::from_millis(5));
        seed(&store, 12);

        let config = config()
            .with_workers(2)
            .with_ensure_root_folders(false);
        orchestrator(&store, config).run().await.unwrap();

        assert!(store.max_in_flight() <= 2);
        assert_eq!(store.count(OpKind::Delete), 12);
    }

    #[tokio::test]
    async fn test_slow_object_blocks_only_its_worker() {
        let store = MemoryObjectStore::new();
        store.insert("A/slow/big.pdf", "big");
        let fast: Vec<String> = (0..10)
            .map(|i| {
                let key = format!("B/D-{i}/f.json");
                store.insert(key.clone(), "{}");
                key
            })
            .collect();
        store.inject_delay(OpKind::Copy, "A/slow/", Duration::from_millis(500));

        let config = config()
            .with_workers(2)
            .with_channel_buffer(1)
            .with_ensure_root_folders(false);
        let snapshot = orchestrator(&store, config).run().await.unwrap();
        assert_eq!(snapshot.moved, 11);

        // Operations are logged as they finish; every fast object must be
        // fully moved before the slow copy returns.
        let ops = store.operations();
        let slow_copy = ops
            .iter()
            .position(|op| matches!(op, StoreOp::Copy { source, .. } if source == "A/slow/big.pdf"))
            .unwrap();
        for key in &fast {
            let deleted = ops
                .iter()
                .position(|op| matches!(op, StoreOp::Delete { key: k, .. } if k == key))
                .unwrap();
            assert!(deleted < slow_copy, "{key} waited for the slow copy");
        }
    }

    #[tokio::test]
    async fn test_run_waits_for_every_dispatched_object() {
        let store = MemoryObjectStore::new().with_latency(Duration::from_millis(5));
        seed(&store, 100);

        let snapshot = orchestrator(&store, config().with_ensure_root_folders(false))
            .run()
            .await
            .unwrap();

        assert_eq!(snapshot.dispatched, 100);
        assert_eq!(snapshot.resolved, 100);
        assert_eq!(snapshot.moved, 100);
        assert_eq!(store.count(OpKind::Delete), 100);
        assert!(store.keys().iter().all(|k| k.starts_with("raw-data/")));
    }

    #[tokio::test]
    async fn test_failed_verification_keeps_source() {
        let store = MemoryObjectStore::new();
        seed(&store, 3);
        store.inject_silent(OpKind::Copy, "USTR/USTR-2015-0001/");

        let snapshot = orchestrator(
            &store,
            config()
                .with_ensure_root_folders(false)
                .with_verify_copy(true),
        )
        .run()
        .await
        .unwrap();

        assert_eq!(snapshot.moved, 2);
        assert_eq!(snapshot.failed_copy, 1);
        assert!(store.contains("USTR/USTR-2015-0001/file.json"));
        assert_eq!(store.count(OpKind::Delete), 2);
    }

    #[tokio::test]
    async fn test_listing_failure_is_reported() {
        let store = MemoryObjectStore::new();
        seed(&store, 2);
        store.inject_failure(OpKind::List, "", StoreErrorKind::AccessDenied);

        let snapshot = orchestrator(&store, config().with_ensure_root_folders(false))
            .run()
            .await
            .unwrap();

        assert!(!snapshot.listing_complete);
        assert!(snapshot.has_failures());
        assert_eq!(snapshot.discovered, 0);
    }

    #[tokio::test]
    async fn test_prefix_restricts_listing() {
        let store = MemoryObjectStore::new();
        store.insert("USTR/USTR-2015-0010/a.json", "{}");
        store.insert("FDA/FDA-2017-D-2335/b.json", "{}");

        let snapshot = orchestrator(
            &store,
            config()
                .with_prefix("USTR/")
                .with_ensure_root_folders(false),
        )
        .run()
        .await
        .unwrap();

        assert_eq!(snapshot.moved, 1);
        assert!(store.contains("FDA/FDA-2017-D-2335/b.json"));
    }

    #[tokio::test]
    async fn test_unparseable_key_goes_to_raw_data() {
        let store = MemoryObjectStore::new();
        store.insert("README", "hello");

        orchestrator(&store, config().with_ensure_root_folders(false))
            .run()
            .await
            .unwrap();

        assert_eq!(store.keys(), vec!["raw-data/README".to_string()]);
    }

    #[tokio::test]
    async fn test_invalid_config_is_rejected() {
        let store = MemoryObjectStore::new();
        let err = orchestrator(&store, config().with_workers(0))
            .run()
            .await
            .unwrap_err();
        assert!(matches!(err, MrError::Config(_)));
    }
}
