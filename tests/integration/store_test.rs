//! S3 object store tests using LocalStack.
//!
//! Verify that SDK errors map onto the store taxonomy and that keys with
//! reserved characters survive a server-side copy.

use crate::common::LocalStackTestContext;
use mr_error::StoreErrorKind;
use mr_traits::ObjectStore;

#[tokio::test]
#[ignore = "requires LocalStack"]
async fn test_copy_missing_source_is_not_found() {
    let ctx = LocalStackTestContext::new().await;

    if !ctx.is_available().await {
        eprintln!("LocalStack not available, skipping test");
        return;
    }

    let bucket = "mr-store-not-found";
    ctx.create_bucket(bucket).await.unwrap();
    let store = ctx.store(bucket).await;

    let err = store
        .copy("USTR/USTR-2015-0010/missing.json", "raw-data/x.json")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), StoreErrorKind::NotFound);
    assert_eq!(err.key(), "USTR/USTR-2015-0010/missing.json");
}

#[tokio::test]
#[ignore = "requires LocalStack"]
async fn test_missing_bucket_is_not_found() {
    let ctx = LocalStackTestContext::new().await;

    if !ctx.is_available().await {
        eprintln!("LocalStack not available, skipping test");
        return;
    }

    let store = ctx.store("mr-bucket-that-does-not-exist").await;
    let err = store.list_page("", None).await.unwrap_err();
    assert_eq!(err.kind(), StoreErrorKind::NotFound);
}

#[tokio::test]
#[ignore = "requires LocalStack"]
async fn test_exists_and_folder_checks() {
    let ctx = LocalStackTestContext::new().await;

    if !ctx.is_available().await {
        eprintln!("LocalStack not available, skipping test");
        return;
    }

    let bucket = "mr-store-exists";
    ctx.create_bucket(bucket).await.unwrap();
    ctx.put(bucket, "raw-data/USTR/file.json", "{}").await.unwrap();
    let store = ctx.store(bucket).await;

    assert!(store.exists("raw-data/USTR/file.json").await.unwrap());
    assert!(!store.exists("raw-data/USTR/other.json").await.unwrap());
    assert!(store.any_with_prefix("raw-data/").await.unwrap());
    assert!(!store.any_with_prefix("derived-data/").await.unwrap());
}

#[tokio::test]
#[ignore = "requires LocalStack"]
async fn test_copy_key_with_reserved_characters() {
    let ctx = LocalStackTestContext::new().await;

    if !ctx.is_available().await {
        eprintln!("LocalStack not available, skipping test");
        return;
    }

    let bucket = "mr-store-encoding";
    ctx.create_bucket(bucket).await.unwrap();

    let source = "FDA/FDA-2017-D-2335/comment 1+draft (ñ).pdf";
    let dest = "raw-data/FDA/FDA-2017-D-2335/comment 1+draft (ñ).pdf";
    ctx.put(bucket, source, "pdf").await.unwrap();

    let store = ctx.store(bucket).await;
    store.copy(source, dest).await.unwrap();
    store.delete(source).await.unwrap();

    assert_eq!(ctx.get(bucket, dest).await.as_deref(), Some("pdf"));
    assert!(ctx.get(bucket, source).await.is_none());
}

#[tokio::test]
#[ignore = "requires LocalStack"]
async fn test_list_page_follows_continuation() {
    let ctx = LocalStackTestContext::new().await;

    if !ctx.is_available().await {
        eprintln!("LocalStack not available, skipping test");
        return;
    }

    let bucket = "mr-store-pages";
    ctx.create_bucket(bucket).await.unwrap();
    for i in 0..5 {
        ctx.put(bucket, &format!("USTR/D-{i}/f.json"), "{}").await.unwrap();
    }

    let store = ctx.store(bucket).await;
    let page = store.list_page("USTR/", None).await.unwrap();
    assert_eq!(page.objects.len(), 5);
    assert!(!page.has_more());
}
