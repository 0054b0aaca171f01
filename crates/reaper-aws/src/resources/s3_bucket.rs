//! `S3Bucket`: S3 is a global service — bucket listing is filtered down to
//! the region each bucket actually lives in so the scanner's per-region
//! fan-out still produces one item per bucket, not one per region.

use reaper_core::{BoxFuture, Lister, PropertyError, ReaperError, ResourceInstance};

pub struct S3Bucket {
    client: aws_sdk_s3::Client,
    name: String,
}

impl ResourceInstance for S3Bucket {
    fn remove(&self) -> BoxFuture<'_, Result<(), ReaperError>> {
        Box::pin(async move {
            let mut continuation_token = None;
            loop {
                let mut list = self.client.list_object_versions().bucket(&self.name);
                if let Some(token) = &continuation_token {
                    list = list.key_marker(token);
                }
                let resp = list
                    .send()
                    .await
                    .map_err(|e| ReaperError::RemoveFailed(format!("s3:ListObjectVersions: {e}")))?;

                for version in resp.versions() {
                    if let Some(key) = version.key() {
                        self.client
                            .delete_object()
                            .bucket(&self.name)
                            .key(key)
                            .set_version_id(version.version_id().map(str::to_string))
                            .send()
                            .await
                            .map_err(|e| ReaperError::RemoveFailed(format!("s3:DeleteObject: {e}")))?;
                    }
                }
                for marker in resp.delete_markers() {
                    if let Some(key) = marker.key() {
                        self.client
                            .delete_object()
                            .bucket(&self.name)
                            .key(key)
                            .set_version_id(marker.version_id().map(str::to_string))
                            .send()
                            .await
                            .map_err(|e| ReaperError::RemoveFailed(format!("s3:DeleteObject: {e}")))?;
                    }
                }

                if resp.is_truncated() == Some(true) {
                    continuation_token = resp.next_key_marker().map(String::from);
                } else {
                    break;
                }
            }

            self.client
                .delete_bucket()
                .bucket(&self.name)
                .send()
                .await
                .map_err(|e| ReaperError::RemoveFailed(format!("s3:DeleteBucket: {e}")))?;

            tracing::info!(bucket = %self.name, "S3 bucket deleted");
            Ok(())
        })
    }

    fn identity(&self) -> String {
        self.name.clone()
    }

    fn get_property(&self, name: &str) -> Result<serde_json::Value, PropertyError> {
        match name {
            "Name" => Ok(serde_json::json!(self.name)),
            _ => Err(PropertyError::Unsupported),
        }
    }
}

pub struct S3BucketLister {
    client: aws_sdk_s3::Client,
}

impl S3BucketLister {
    pub fn new(client: aws_sdk_s3::Client) -> Self {
        Self { client }
    }
}

impl Lister for S3BucketLister {
    fn kind(&self) -> &'static str {
        "S3Bucket"
    }

    fn list(&self, region: &str) -> BoxFuture<'_, Result<Vec<Box<dyn ResourceInstance>>, ReaperError>> {
        let region = region.to_string();
        Box::pin(async move {
            let resp = self
                .client
                .list_buckets()
                .send()
                .await
                .map_err(|e| ReaperError::ListFailed(format!("s3:ListBuckets: {e}")))?;

            let mut buckets = Vec::new();
            for bucket in resp.buckets() {
                let Some(name) = bucket.name() else { continue };

                let location = self
                    .client
                    .get_bucket_location()
                    .bucket(name)
                    .send()
                    .await
                    .map_err(|e| ReaperError::ListFailed(format!("s3:GetBucketLocation: {e}")))?;

                let bucket_region = location
                    .location_constraint()
                    .map(|c| c.as_str().to_string())
                    .filter(|s| !s.is_empty())
                    .unwrap_or_else(|| "us-east-1".to_string());

                if bucket_region != region {
                    continue;
                }

                buckets.push(Box::new(S3Bucket {
                    client: self.client.clone(),
                    name: name.to_string(),
                }) as Box<dyn ResourceInstance>);
            }
            Ok(buckets)
        })
    }
}
