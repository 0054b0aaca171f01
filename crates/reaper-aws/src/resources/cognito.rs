use reaper_core::{BoxFuture, Lister, PropertyError, ReaperError, ResourceInstance};

pub struct CognitoUserPool {
    client: aws_sdk_cognitoidentityprovider::Client,
    id: String,
    name: String,
}

impl ResourceInstance for CognitoUserPool {
    fn remove(&self) -> BoxFuture<'_, Result<(), ReaperError>> {
        Box::pin(async move {
            self.client
                .delete_user_pool()
                .user_pool_id(&self.id)
                .send()
                .await
                .map_err(|e| ReaperError::RemoveFailed(format!("cognito-idp:DeleteUserPool: {e}")))?;
            tracing::info!(pool_id = %self.id, "Cognito user pool deleted");
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
pub struct CognitoUserPoolLister;

impl Lister for CognitoUserPoolLister {
    fn kind(&self) -> &'static str {
        "CognitoUserPool"
    }

    fn list(&self, region: &str) -> BoxFuture<'_, Result<Vec<Box<dyn ResourceInstance>>, ReaperError>> {
        let region = region.to_string();
        Box::pin(async move {
            let config = crate::account::new_session(&region).await;
            let client = aws_sdk_cognitoidentityprovider::Client::new(&config);

            let mut pools = Vec::new();
            let mut next_token = None;
            loop {
                let mut req = client.list_user_pools().max_results(60);
                if let Some(t) = &next_token {
                    req = req.next_token(t);
                }
                let resp = req
                    .send()
                    .await
                    .map_err(|e| ReaperError::ListFailed(format!("cognito-idp:ListUserPools: {e}")))?;

                for pool in resp.user_pools() {
                    if let Some(id) = pool.id() {
                        pools.push(Box::new(CognitoUserPool {
                            client: client.clone(),
                            id: id.to_string(),
                            name: pool.name().unwrap_or_default().to_string(),
                        }) as Box<dyn ResourceInstance>);
                    }
                }

                next_token = resp.next_token().map(String::from);
                if next_token.is_none() {
                    break;
                }
            }
            Ok(pools)
        })
    }
}
