//! Object store construction from a storage DSN.
//!
//! Supported schemes: `memory://` (tests, local runs),
//! `file:///path`, and `s3://[key:secret@]host[:port]/bucket` for
//! both AWS and S3-compatible stores such as MinIO.

use anyhow::{Result, bail};
use object_store::{ObjectStore, aws::AmazonS3Builder, local::LocalFileSystem, memory::InMemory};
use std::sync::Arc;
use url::Url;

use crate::config::StorageConfig;

/// Create an object store from storage configuration.
pub fn create_object_store(storage_config: &StorageConfig) -> Result<Arc<dyn ObjectStore>> {
    create_object_store_from_dsn(&storage_config.dsn)
}

/// Create an object store from a DSN string.
pub fn create_object_store_from_dsn(dsn: &str) -> Result<Arc<dyn ObjectStore>> {
    let url =
        Url::parse(dsn).map_err(|e| anyhow::anyhow!("invalid storage DSN '{dsn}': {e}"))?;

    match url.scheme() {
        "memory" => Ok(Arc::new(InMemory::new())),
        "file" => {
            let path = url.path();
            if path.is_empty() || path == "/" {
                bail!("file DSN must specify a path: file:///path/to/storage");
            }
            Ok(Arc::new(LocalFileSystem::new_with_prefix(path)?))
        }
        "s3" => Ok(Arc::new(s3_store_from_dsn(&url)?)),
        scheme => bail!("unsupported storage scheme '{scheme}', expected memory, file, or s3"),
    }
}

/// Build an S3 store from `s3://[access_key:secret_key@]host[:port]/bucket`.
fn s3_store_from_dsn(dsn: &Url) -> Result<object_store::aws::AmazonS3> {
    let host = dsn
        .host_str()
        .ok_or_else(|| anyhow::anyhow!("missing S3 host in DSN"))?;
    let bucket = dsn.path().trim_start_matches('/');
    if bucket.is_empty() {
        bail!("S3 DSN must specify a bucket: s3://host/bucket");
    }

    let mut builder = AmazonS3Builder::from_env()
        .with_bucket_name(bucket)
        .with_region(
            std::env::var("AWS_DEFAULT_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
        );

    let access_key = dsn.username();
    if !access_key.is_empty() {
        builder = builder
            .with_access_key_id(access_key)
            .with_secret_access_key(dsn.password().unwrap_or(""));
    }

    // Anything that is not AWS proper is an S3-compatible endpoint and
    // needs an explicit URL plus path-style requests (MinIO)
    if !host.contains("amazonaws.com") {
        let port = dsn.port();
        let scheme = if port == Some(443) { "https" } else { "http" };
        let endpoint = match port {
            Some(p) => format!("{scheme}://{host}:{p}"),
            None => format!("{scheme}://{host}"),
        };
        builder = builder
            .with_endpoint(endpoint)
            .with_allow_http(true)
            .with_virtual_hosted_style_request(false);
    }

    Ok(builder.build()?)
}
