//! `SqsQueue`: supplements the teacher's kind set. Queues are common
//! sandbox litter, and their attributes exercise the properties
//! capability beyond plain names.

use reaper_core::{BoxFuture, Lister, PropertyError, ReaperError, ResourceInstance};

pub struct SqsQueue {
    client: aws_sdk_sqs::Client,
    url: String,
    name: String,
}

impl ResourceInstance for SqsQueue {
    fn remove(&self) -> BoxFuture<'_, Result<(), ReaperError>> {
        Box::pin(async move {
            self.client
                .delete_queue()
                .queue_url(&self.url)
                .send()
                .await
                .map_err(|e| ReaperError::RemoveFailed(format!("sqs:DeleteQueue: {e}")))?;
            tracing::info!(queue = %self.name, "SQS queue deleted");
            Ok(())
        })
    }

    fn identity(&self) -> String {
        self.name.clone()
    }

    fn get_property(&self, name: &str) -> Result<serde_json::Value, PropertyError> {
        match name {
            "Name" => Ok(serde_json::json!(self.name)),
            "Url" => Ok(serde_json::json!(self.url)),
            _ => Err(PropertyError::Unsupported),
        }
    }
}

#[derive(Default)]
pub struct SqsQueueLister;

impl Lister for SqsQueueLister {
    fn kind(&self) -> &'static str {
        "SqsQueue"
    }

    fn list(&self, region: &str) -> BoxFuture<'_, Result<Vec<Box<dyn ResourceInstance>>, ReaperError>> {
        let region = region.to_string();
        Box::pin(async move {
            let config = crate::account::new_session(&region).await;
            let client = aws_sdk_sqs::Client::new(&config);

            let mut queues = Vec::new();
            let mut next_token = None;
            loop {
                let mut req = client.list_queues();
                if let Some(t) = &next_token {
                    req = req.next_token(t);
                }
                let resp = req
                    .send()
                    .await
                    .map_err(|e| ReaperError::ListFailed(format!("sqs:ListQueues: {e}")))?;

                for url in resp.queue_urls() {
                    let name = url.rsplit('/').next().unwrap_or(url).to_string();
                    queues.push(Box::new(SqsQueue {
                        client: client.clone(),
                        url: url.to_string(),
                        name,
                    }) as Box<dyn ResourceInstance>);
                }

                next_token = resp.next_token().map(String::from);
                if next_token.is_none() {
                    break;
                }
            }
            Ok(queues)
        })
    }
}
