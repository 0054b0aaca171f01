use reaper_core::{BoxFuture, Lister, PropertyError, ReaperError, ResourceInstance};

pub struct LambdaFunction {
    client: aws_sdk_lambda::Client,
    name: String,
}

impl ResourceInstance for LambdaFunction {
    fn remove(&self) -> BoxFuture<'_, Result<(), ReaperError>> {
        Box::pin(async move {
            self.client
                .delete_function()
                .function_name(&self.name)
                .send()
                .await
                .map_err(|e| ReaperError::RemoveFailed(format!("lambda:DeleteFunction: {e}")))?;
            tracing::info!(function = %self.name, "Lambda function deleted");
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

/// Lambda is a per-region service: unlike `S3BucketLister`/`IamRoleLister`,
/// this lister builds a fresh regional client on every call instead of
/// holding one pinned at construction, since the same registered instance
/// is asked to list every configured region in turn.
#[derive(Default)]
pub struct LambdaFunctionLister;

impl Lister for LambdaFunctionLister {
    fn kind(&self) -> &'static str {
        "LambdaFunction"
    }

    fn list(&self, region: &str) -> BoxFuture<'_, Result<Vec<Box<dyn ResourceInstance>>, ReaperError>> {
        let region = region.to_string();
        Box::pin(async move {
            let config = crate::account::new_session(&region).await;
            let client = aws_sdk_lambda::Client::new(&config);

            let mut functions = Vec::new();
            let mut marker = None;
            loop {
                let mut req = client.list_functions();
                if let Some(m) = &marker {
                    req = req.marker(m);
                }
                let resp = req
                    .send()
                    .await
                    .map_err(|e| ReaperError::ListFailed(format!("lambda:ListFunctions: {e}")))?;

                for function in resp.functions() {
                    if let Some(name) = function.function_name() {
                        functions.push(Box::new(LambdaFunction {
                            client: client.clone(),
                            name: name.to_string(),
                        }) as Box<dyn ResourceInstance>);
                    }
                }

                marker = resp.next_marker().map(String::from);
                if marker.is_none() {
                    break;
                }
            }
            Ok(functions)
        })
    }
}
