use reaper_core::{BoxFuture, Lister, PropertyError, ReaperError, ResourceInstance};

pub struct ApiGatewayV2Api {
    client: aws_sdk_apigatewayv2::Client,
    id: String,
    name: String,
}

impl ResourceInstance for ApiGatewayV2Api {
    fn remove(&self) -> BoxFuture<'_, Result<(), ReaperError>> {
        Box::pin(async move {
            self.client
                .delete_api()
                .api_id(&self.id)
                .send()
                .await
                .map_err(|e| ReaperError::RemoveFailed(format!("apigateway:DeleteApi: {e}")))?;
            tracing::info!(api_id = %self.id, "API Gateway HTTP API deleted");
            Ok(())
        })
    }

    fn identity(&self) -> String {
        self.id.clone()
    }

    fn get_property(&self, name: &str) -> Result<serde_json::Value, PropertyError> {
        match name {
            "Name" => Ok(serde_json::json!(self.name)),
            "Id" => Ok(serde_json::json!(self.id)),
            _ => Err(PropertyError::Unsupported),
        }
    }
}

#[derive(Default)]
pub struct ApiGatewayV2ApiLister;

impl Lister for ApiGatewayV2ApiLister {
    fn kind(&self) -> &'static str {
        "ApiGatewayV2Api"
    }

    fn list(&self, region: &str) -> BoxFuture<'_, Result<Vec<Box<dyn ResourceInstance>>, ReaperError>> {
        let region = region.to_string();
        Box::pin(async move {
            let config = crate::account::new_session(&region).await;
            let client = aws_sdk_apigatewayv2::Client::new(&config);

            let mut apis = Vec::new();
            let mut next_token = None;
            loop {
                let mut req = client.get_apis();
                if let Some(t) = &next_token {
                    req = req.next_token(t);
                }
                let resp = req
                    .send()
                    .await
                    .map_err(|e| ReaperError::ListFailed(format!("apigateway:GetApis: {e}")))?;

                for api in resp.items() {
                    if let Some(id) = api.api_id() {
                        apis.push(Box::new(ApiGatewayV2Api {
                            client: client.clone(),
                            id: id.to_string(),
                            name: api.name().unwrap_or_default().to_string(),
                        }) as Box<dyn ResourceInstance>);
                    }
                }

                next_token = resp.next_token().map(String::from);
                if next_token.is_none() {
                    break;
                }
            }
            Ok(apis)
        })
    }
}
