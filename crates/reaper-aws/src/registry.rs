//! The concrete, process-wide kind registry: maps kind names to listers
//! and tracks which AWS service backs each kind.

use std::collections::HashMap;
use std::sync::Arc;

use reaper_core::{KindRegistry, Lister, ServiceAvailability};

use crate::resources::{
    api_gateway::ApiGatewayV2ApiLister, cloudtrail::CloudtrailTrailLister, cognito::CognitoUserPoolLister,
    dynamodb::DynamodbTableLister, iam::IamRoleLister, iam_user::IamUserLister, lambda::LambdaFunctionLister,
    s3_bucket::S3BucketLister, sqs::SqsQueueLister,
};

/// Kinds whose `Lister::list` ignores its `region` argument entirely and
/// always returns the full account-wide set (IAM has no regional
/// partitioning). These must only be scanned once — against
/// `home_region` — or the same resource would be enumerated, and raced
/// on for deletion, once per configured region.
const GLOBAL_SINGLE_PASS_KINDS: &[&str] = &["IamRole", "IamUser"];

pub struct AwsRegistry {
    listers: HashMap<&'static str, Arc<dyn Lister>>,
    services: HashMap<&'static str, &'static str>,
    home_region: String,
}

impl AwsRegistry {
    /// Build the registry. `home_region` is the region IAM (a global
    /// service) is scanned against — any one region works since IAM has
    /// no regional partitioning — and the region S3's shared client is
    /// constructed from, though S3 bucket listing is scanned in every
    /// configured region since each bucket belongs to exactly one.
    pub async fn new(home_region: &str) -> Self {
        let home_config = crate::account::new_session(home_region).await;

        let mut listers: HashMap<&'static str, Arc<dyn Lister>> = HashMap::new();
        listers.insert(
            "S3Bucket",
            Arc::new(S3BucketLister::new(aws_sdk_s3::Client::new(&home_config))),
        );
        listers.insert(
            "IamRole",
            Arc::new(IamRoleLister::new(aws_sdk_iam::Client::new(&home_config))),
        );
        listers.insert(
            "IamUser",
            Arc::new(IamUserLister::new(aws_sdk_iam::Client::new(&home_config))),
        );
        listers.insert("LambdaFunction", Arc::new(LambdaFunctionLister));
        listers.insert("CognitoUserPool", Arc::new(CognitoUserPoolLister));
        listers.insert("CloudtrailTrail", Arc::new(CloudtrailTrailLister));
        listers.insert("ApiGatewayV2Api", Arc::new(ApiGatewayV2ApiLister));
        listers.insert("SqsQueue", Arc::new(SqsQueueLister));
        listers.insert("DynamodbTable", Arc::new(DynamodbTableLister));

        let mut services: HashMap<&'static str, &'static str> = HashMap::new();
        services.insert("S3Bucket", "s3");
        services.insert("IamRole", "iam");
        services.insert("IamUser", "iam");
        services.insert("LambdaFunction", "lambda");
        services.insert("CognitoUserPool", "cognito-idp");
        services.insert("CloudtrailTrail", "cloudtrail");
        services.insert("ApiGatewayV2Api", "apigateway");
        services.insert("SqsQueue", "sqs");
        services.insert("DynamodbTable", "dynamodb");

        Self {
            listers,
            services,
            home_region: home_region.to_string(),
        }
    }
}

impl KindRegistry for AwsRegistry {
    fn get_lister_names(&self) -> Vec<String> {
        self.listers.keys().map(|k| k.to_string()).collect()
    }

    fn lister_for(&self, name: &str) -> Option<Arc<dyn Lister>> {
        self.listers.get(name).cloned()
    }
}

impl ServiceAvailability for AwsRegistry {
    fn service_for(&self, kind: &str) -> Option<&str> {
        self.services.get(kind).copied()
    }

    fn available_in(&self, kind: &str, region: &str) -> bool {
        if GLOBAL_SINGLE_PASS_KINDS.contains(&kind) {
            return region == self.home_region;
        }
        self.service_for(kind).is_some()
    }
}
