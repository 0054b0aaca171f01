//! `DynamodbTable`: supplements the teacher's kind set for the same
//! reason as `SqsQueue` — common sandbox litter left behind by demos.

use reaper_core::{BoxFuture, Lister, PropertyError, ReaperError, ResourceInstance};

pub struct DynamodbTable {
    client: aws_sdk_dynamodb::Client,
    name: String,
}

impl ResourceInstance for DynamodbTable {
    fn remove(&self) -> BoxFuture<'_, Result<(), ReaperError>> {
        Box::pin(async move {
            self.client
                .delete_table()
                .table_name(&self.name)
                .send()
                .await
                .map_err(|e| ReaperError::RemoveFailed(format!("dynamodb:DeleteTable: {e}")))?;
            tracing::info!(table = %self.name, "DynamoDB table deleted");
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

#[derive(Default)]
pub struct DynamodbTableLister;

impl Lister for DynamodbTableLister {
    fn kind(&self) -> &'static str {
        "DynamodbTable"
    }

    fn list(&self, region: &str) -> BoxFuture<'_, Result<Vec<Box<dyn ResourceInstance>>, ReaperError>> {
        let region = region.to_string();
        Box::pin(async move {
            let config = crate::account::new_session(&region).await;
            let client = aws_sdk_dynamodb::Client::new(&config);

            let mut tables = Vec::new();
            let mut start_table = None;
            loop {
                let mut req = client.list_tables();
                if let Some(t) = &start_table {
                    req = req.exclusive_start_table_name(t);
                }
                let resp = req
                    .send()
                    .await
                    .map_err(|e| ReaperError::ListFailed(format!("dynamodb:ListTables: {e}")))?;

                for name in resp.table_names() {
                    tables.push(Box::new(DynamodbTable {
                        client: client.clone(),
                        name: name.to_string(),
                    }) as Box<dyn ResourceInstance>);
                }

                start_table = resp.last_evaluated_table_name().map(String::from);
                if start_table.is_none() {
                    break;
                }
            }
            Ok(tables)
        })
    }
}
