//! LocalStack test context and utilities.

use aws_sdk_s3::Client as S3Client;
use mr_mover::{S3Config, S3ObjectStore};

/// LocalStack test context providing an S3 client.
pub struct LocalStackTestContext {
    pub s3: S3Client,
    pub endpoint: String,
    pub region: String,
}

impl LocalStackTestContext {
    /// Create a new LocalStack test context.
    ///
    /// Uses the `LOCALSTACK_ENDPOINT` environment variable if set,
    /// otherwise defaults to `http://localhost:4566`.
    pub async fn new() -> Self {
        let endpoint = std::env::var("LOCALSTACK_ENDPOINT")
            .unwrap_or_else(|_| "http://localhost:4566".to_string());
        let region = "us-east-1".to_string();

        let config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_sdk_s3::config::Region::new(region.clone()))
            .endpoint_url(&endpoint)
            .load()
            .await;

        let s3_config = aws_sdk_s3::config::Builder::from(&config)
            .force_path_style(true)
            .build();

        Self {
            s3: S3Client::from_conf(s3_config),
            endpoint,
            region,
        }
    }

    /// Check if LocalStack is available and healthy.
    pub async fn is_available(&self) -> bool {
        self.s3.list_buckets().send().await.is_ok()
    }

    /// An object store over `bucket`, built the way the CLI builds it.
    pub async fn store(&self, bucket: &str) -> S3ObjectStore {
        let config = S3Config::new(bucket)
            .with_endpoint(&self.endpoint)
            .with_region(&self.region)
            .with_credentials("test", "test");
        S3ObjectStore::from_config(&config)
            .await
            .expect("Failed to create S3 object store")
    }

    /// Create an empty S3 bucket for testing, clearing any previous contents.
    pub async fn create_bucket(&self, name: &str) -> Result<(), aws_sdk_s3::Error> {
        let buckets = self.s3.list_buckets().send().await?;
        let exists = buckets
            .buckets()
            .iter()
            .any(|b| b.name().unwrap_or_default() == name);

        if exists {
            for key in self.list_keys(name, None).await? {
                self.s3.delete_object().bucket(name).key(key).send().await?;
            }
        } else {
            self.s3.create_bucket().bucket(name).send().await?;
        }
        Ok(())
    }

    /// Upload an object.
    pub async fn put(&self, bucket: &str, key: &str, body: &str) -> Result<(), aws_sdk_s3::Error> {
        self.s3
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(body.as_bytes().to_vec().into())
            .send()
            .await?;
        Ok(())
    }

    /// Download an object body as a string.
    pub async fn get(&self, bucket: &str, key: &str) -> Option<String> {
        let resp = self.s3.get_object().bucket(bucket).key(key).send().await.ok()?;
        let bytes = resp.body.collect().await.ok()?.into_bytes();
        String::from_utf8(bytes.to_vec()).ok()
    }

    /// List every key in a bucket with optional prefix.
    pub async fn list_keys(
        &self,
        bucket: &str,
        prefix: Option<&str>,
    ) -> Result<Vec<String>, aws_sdk_s3::Error> {
        let mut keys = Vec::new();
        let mut token: Option<String> = None;

        loop {
            let resp = self
                .s3
                .list_objects_v2()
                .bucket(bucket)
                .set_prefix(prefix.map(String::from))
                .set_continuation_token(token.take())
                .send()
                .await?;

            keys.extend(
                resp.contents()
                    .iter()
                    .filter_map(|o| o.key().map(String::from)),
            );

            match resp.next_continuation_token {
                Some(next) if resp.is_truncated == Some(true) => token = Some(next),
                _ => break,
            }
        }

        keys.sort();
        Ok(keys)
    }
}
