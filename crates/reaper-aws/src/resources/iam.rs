//! `IamRole`: IAM is a global service, enumerated once per run (bound to
//! `us-east-1` as a nominal home region by the registry — see
//! [`crate::registry`]).

use reaper_core::{BoxFuture, Lister, PropertyError, ReaperError, ResourceInstance};

/// AWS creates these for its own managed features (e.g. Organizations,
/// Elastic Beanstalk). They cannot be deleted by the account owner and
/// must never be attempted.
const SERVICE_LINKED_PATH_PREFIX: &str = "/aws-service-role/";

pub struct IamRole {
    client: aws_sdk_iam::Client,
    name: String,
    path: String,
}

impl ResourceInstance for IamRole {
    fn remove(&self) -> BoxFuture<'_, Result<(), ReaperError>> {
        Box::pin(async move {
            let attached = self
                .client
                .list_attached_role_policies()
                .role_name(&self.name)
                .send()
                .await
                .map_err(|e| ReaperError::RemoveFailed(format!("iam:ListAttachedRolePolicies: {e}")))?;
            for policy in attached.attached_policies() {
                if let Some(arn) = policy.policy_arn() {
                    self.client
                        .detach_role_policy()
                        .role_name(&self.name)
                        .policy_arn(arn)
                        .send()
                        .await
                        .map_err(|e| ReaperError::RemoveFailed(format!("iam:DetachRolePolicy: {e}")))?;
                }
            }

            let inline = self
                .client
                .list_role_policies()
                .role_name(&self.name)
                .send()
                .await
                .map_err(|e| ReaperError::RemoveFailed(format!("iam:ListRolePolicies: {e}")))?;
            for policy_name in inline.policy_names() {
                self.client
                    .delete_role_policy()
                    .role_name(&self.name)
                    .policy_name(policy_name)
                    .send()
                    .await
                    .map_err(|e| ReaperError::RemoveFailed(format!("iam:DeleteRolePolicy: {e}")))?;
            }

            self.client
                .delete_role()
                .role_name(&self.name)
                .send()
                .await
                .map_err(|e| ReaperError::RemoveFailed(format!("iam:DeleteRole: {e}")))?;

            tracing::info!(role = %self.name, "IAM role deleted");
            Ok(())
        })
    }

    fn identity(&self) -> String {
        self.name.clone()
    }

    fn self_filter(&self) -> BoxFuture<'_, Result<(), String>> {
        let protected = self.path.starts_with(SERVICE_LINKED_PATH_PREFIX);
        Box::pin(async move {
            if protected {
                Err("AWS-managed service-linked role".to_string())
            } else {
                Ok(())
            }
        })
    }

    fn get_property(&self, name: &str) -> Result<serde_json::Value, PropertyError> {
        match name {
            "Name" => Ok(serde_json::json!(self.name)),
            "Path" => Ok(serde_json::json!(self.path)),
            _ => Err(PropertyError::Unsupported),
        }
    }
}

pub struct IamRoleLister {
    client: aws_sdk_iam::Client,
}

impl IamRoleLister {
    pub fn new(client: aws_sdk_iam::Client) -> Self {
        Self { client }
    }
}

impl Lister for IamRoleLister {
    fn kind(&self) -> &'static str {
        "IamRole"
    }

    fn list(&self, _region: &str) -> BoxFuture<'_, Result<Vec<Box<dyn ResourceInstance>>, ReaperError>> {
        Box::pin(async move {
            let mut roles = Vec::new();
            let mut marker = None;
            loop {
                let mut req = self.client.list_roles();
                if let Some(m) = &marker {
                    req = req.marker(m);
                }
                let resp = req
                    .send()
                    .await
                    .map_err(|e| ReaperError::ListFailed(format!("iam:ListRoles: {e}")))?;

                for role in resp.roles() {
                    roles.push(Box::new(IamRole {
                        client: self.client.clone(),
                        name: role.role_name().to_string(),
                        path: role.path().to_string(),
                    }) as Box<dyn ResourceInstance>);
                }

                if resp.is_truncated() {
                    marker = resp.marker().map(String::from);
                } else {
                    break;
                }
            }
            Ok(roles)
        })
    }
}
