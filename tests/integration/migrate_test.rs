//! End-to-end migration tests using LocalStack.

use std::sync::Arc;

use crate::common::LocalStackTestContext;
use mr_mover::{BatchOrchestrator, MigrationConfig, RetryConfig};

fn config() -> MigrationConfig {
    MigrationConfig::new()
        .with_workers(4)
        .with_retry(RetryConfig::new().with_initial_backoff_ms(10))
}

#[tokio::test]
#[ignore = "requires LocalStack"]
async fn test_migrate_bucket() {
    let ctx = LocalStackTestContext::new().await;

    if !ctx.is_available().await {
        eprintln!("LocalStack not available, skipping test");
        return;
    }

    let bucket = "mr-migrate-bucket";
    ctx.create_bucket(bucket).await.unwrap();

    ctx.put(bucket, "USTR/USTR-2015-0010/text-USTR-2015-0010/docket/USTR-2015-0010.json", "{}")
        .await
        .unwrap();
    ctx.put(
        bucket,
        "USTR/USTR-2015-0010/some_subfolder_extracted_text/foo/bar.txt",
        "text",
    )
    .await
    .unwrap();
    ctx.put(bucket, "raw-data/FDA/FDA-2017-D-2335/already.json", "{}")
        .await
        .unwrap();
    ctx.put(bucket, "README", "top level").await.unwrap();

    let store = ctx.store(bucket).await;
    let snapshot = BatchOrchestrator::new(config(), Arc::new(store))
        .run()
        .await
        .unwrap();

    assert_eq!(snapshot.moved, 3);
    assert_eq!(snapshot.errored, 0);
    assert!(!snapshot.has_failures());

    let keys = ctx.list_keys(bucket, None).await.unwrap();
    assert_eq!(
        keys,
        vec![
            "derived-data/".to_string(),
            "derived-data/USTR/USTR-2015-0010/Mirrulations/extracted_txt/some_subfolder_extracted_text/foo/bar.txt".to_string(),
            "derived-data/placeholder".to_string(),
            "raw-data/".to_string(),
            "raw-data/FDA/FDA-2017-D-2335/already.json".to_string(),
            "raw-data/README".to_string(),
            "raw-data/USTR/USTR-2015-0010/text-USTR-2015-0010/docket/USTR-2015-0010.json".to_string(),
            "raw-data/placeholder".to_string(),
        ]
    );
    assert_eq!(
        ctx.get(bucket, "derived-data/placeholder").await.as_deref(),
        Some("This is a placeholder file.")
    );
}

#[tokio::test]
#[ignore = "requires LocalStack"]
async fn test_migrate_is_rerunnable() {
    let ctx = LocalStackTestContext::new().await;

    if !ctx.is_available().await {
        eprintln!("LocalStack not available, skipping test");
        return;
    }

    let bucket = "mr-migrate-rerun";
    ctx.create_bucket(bucket).await.unwrap();
    ctx.put(bucket, "USTR/USTR-2015-0010/file.json", "{}").await.unwrap();

    let first = BatchOrchestrator::new(config(), Arc::new(ctx.store(bucket).await))
        .run()
        .await
        .unwrap();
    assert_eq!(first.moved, 1);

    let keys_after_first = ctx.list_keys(bucket, None).await.unwrap();

    let second = BatchOrchestrator::new(config(), Arc::new(ctx.store(bucket).await))
        .run()
        .await
        .unwrap();
    assert_eq!(second.moved, 0);
    assert_eq!(second.skipped, second.discovered);
    assert_eq!(ctx.list_keys(bucket, None).await.unwrap(), keys_after_first);
}

#[tokio::test]
#[ignore = "requires LocalStack"]
async fn test_dry_run_leaves_bucket_unchanged() {
    let ctx = LocalStackTestContext::new().await;

    if !ctx.is_available().await {
        eprintln!("LocalStack not available, skipping test");
        return;
    }

    let bucket = "mr-migrate-dry-run";
    ctx.create_bucket(bucket).await.unwrap();
    ctx.put(bucket, "USTR/USTR-2015-0010/file.json", "{}").await.unwrap();

    let snapshot = BatchOrchestrator::new(
        config().with_dry_run(true),
        Arc::new(ctx.store(bucket).await),
    )
    .run()
    .await
    .unwrap();

    assert_eq!(snapshot.planned, 1);
    assert_eq!(
        ctx.list_keys(bucket, None).await.unwrap(),
        vec!["USTR/USTR-2015-0010/file.json".to_string()]
    );
}
