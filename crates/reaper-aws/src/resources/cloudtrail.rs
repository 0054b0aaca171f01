use reaper_core::{BoxFuture, Lister, PropertyError, ReaperError, ResourceInstance};

pub struct CloudtrailTrail {
    client: aws_sdk_cloudtrail::Client,
    name: String,
    is_organization_trail: bool,
}

impl ResourceInstance for CloudtrailTrail {
    fn remove(&self) -> BoxFuture<'_, Result<(), ReaperError>> {
        Box::pin(async move {
            self.client
                .delete_trail()
                .name(&self.name)
                .send()
                .await
                .map_err(|e| ReaperError::RemoveFailed(format!("cloudtrail:DeleteTrail: {e}")))?;
            tracing::info!(trail = %self.name, "CloudTrail trail deleted");
            Ok(())
        })
    }

    fn identity(&self) -> String {
        self.name.clone()
    }

    fn self_filter(&self) -> BoxFuture<'_, Result<(), String>> {
        let org_trail = self.is_organization_trail;
        Box::pin(async move {
            if org_trail {
                Err("organization trail — not deletable from a member account".to_string())
            } else {
                Ok(())
            }
        })
    }

    fn get_property(&self, name: &str) -> Result<serde_json::Value, PropertyError> {
        match name {
            "Name" => Ok(serde_json::json!(self.name)),
            _ => Err(PropertyError::Unsupported),
        }
    }
}

#[derive(Default)]
pub struct CloudtrailTrailLister;

impl Lister for CloudtrailTrailLister {
    fn kind(&self) -> &'static str {
        "CloudtrailTrail"
    }

    fn list(&self, region: &str) -> BoxFuture<'_, Result<Vec<Box<dyn ResourceInstance>>, ReaperError>> {
        let region = region.to_string();
        Box::pin(async move {
            let config = crate::account::new_session(&region).await;
            let client = aws_sdk_cloudtrail::Client::new(&config);

            let resp = client
                .describe_trails()
                .send()
                .await
                .map_err(|e| ReaperError::ListFailed(format!("cloudtrail:DescribeTrails: {e}")))?;

            let trails = resp
                .trail_list()
                .iter()
                .filter(|t| t.home_region() == Some(region.as_str()))
                .filter_map(|t| {
                    t.name().map(|name| {
                        Box::new(CloudtrailTrail {
                            client: client.clone(),
                            name: name.to_string(),
                            is_organization_trail: t.is_organization_trail().unwrap_or(false),
                        }) as Box<dyn ResourceInstance>
                    })
                })
                .collect();
            Ok(trails)
        })
    }
}
