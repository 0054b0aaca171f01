//! `IamUser`: global service, same home-region convention as `IamRole`.

use reaper_core::{BoxFuture, Lister, PropertyError, ReaperError, ResourceInstance};

pub struct IamUser {
    client: aws_sdk_iam::Client,
    name: String,
}

impl ResourceInstance for IamUser {
    fn remove(&self) -> BoxFuture<'_, Result<(), ReaperError>> {
        Box::pin(async move {
            let attached = self
                .client
                .list_attached_user_policies()
                .user_name(&self.name)
                .send()
                .await
                .map_err(|e| ReaperError::RemoveFailed(format!("iam:ListAttachedUserPolicies: {e}")))?;
            for policy in attached.attached_policies() {
                if let Some(arn) = policy.policy_arn() {
                    self.client
                        .detach_user_policy()
                        .user_name(&self.name)
                        .policy_arn(arn)
                        .send()
                        .await
                        .map_err(|e| ReaperError::RemoveFailed(format!("iam:DetachUserPolicy: {e}")))?;
                }
            }

            let keys = self
                .client
                .list_access_keys()
                .user_name(&self.name)
                .send()
                .await
                .map_err(|e| ReaperError::RemoveFailed(format!("iam:ListAccessKeys: {e}")))?;
            for meta in keys.access_key_metadata() {
                if let Some(key_id) = meta.access_key_id() {
                    self.client
                        .delete_access_key()
                        .user_name(&self.name)
                        .access_key_id(key_id)
                        .send()
                        .await
                        .map_err(|e| ReaperError::RemoveFailed(format!("iam:DeleteAccessKey: {e}")))?;
                }
            }

            self.client
                .delete_user()
                .user_name(&self.name)
                .send()
                .await
                .map_err(|e| ReaperError::RemoveFailed(format!("iam:DeleteUser: {e}")))?;

            tracing::info!(user = %self.name, "IAM user deleted");
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

pub struct IamUserLister {
    client: aws_sdk_iam::Client,
}

impl IamUserLister {
    pub fn new(client: aws_sdk_iam::Client) -> Self {
        Self { client }
    }
}

impl Lister for IamUserLister {
    fn kind(&self) -> &'static str {
        "IamUser"
    }

    fn list(&self, _region: &str) -> BoxFuture<'_, Result<Vec<Box<dyn ResourceInstance>>, ReaperError>> {
        Box::pin(async move {
            let mut users = Vec::new();
            let mut marker = None;
            loop {
                let mut req = self.client.list_users();
                if let Some(m) = &marker {
                    req = req.marker(m);
                }
                let resp = req
                    .send()
                    .await
                    .map_err(|e| ReaperError::ListFailed(format!("iam:ListUsers: {e}")))?;

                for user in resp.users() {
                    users.push(Box::new(IamUser {
                        client: self.client.clone(),
                        name: user.user_name().to_string(),
                    }) as Box<dyn ResourceInstance>);
                }

                if resp.is_truncated() {
                    marker = resp.marker().map(String::from);
                } else {
                    break;
                }
            }
            Ok(users)
        })
    }
}
