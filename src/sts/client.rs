use super::{AssumeRoleRequest, IdentityClient, SessionTokenRequest};
use crate::creds::{CallerIdentity, Creds};
use crate::error::{Result, SpeculateError};
use aws_config::meta::region::RegionProviderChain;
use aws_config::BehaviorVersion;
use aws_sdk_sts::config::Credentials as SdkCredentials;
use aws_sdk_sts::Client as StsClient;
use aws_smithy_types::error::display::DisplayErrorContext;
use aws_types::region::Region;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

/// Region used for STS when neither the credentials nor the environment name one
pub const DEFAULT_STS_REGION: &str = "us-east-1";

/// Talks to AWS STS through the SDK
///
/// The SDK client for the most recent credential set is kept, so the AWS
/// config chain is loaded once per set rather than once per call.
#[derive(Debug, Default)]
pub struct StsIdentityClient {
    cached: Mutex<Option<(Creds, StsClient)>>,
}

impl StsIdentityClient {
    pub fn new() -> Self {
        Self::default()
    }

    async fn client_for(&self, creds: &Creds) -> StsClient {
        let mut cached = self.cached.lock().await;
        if let Some((cached_creds, client)) = cached.as_ref() {
            if cached_creds == creds {
                return client.clone();
            }
        }

        let client = build_client(creds).await;
        *cached = Some((creds.clone(), client.clone()));
        client
    }
}

/// Build an STS client signed with `creds`
///
/// Region priority: the credential set, then the ambient AWS config
/// chain, then `DEFAULT_STS_REGION`.
async fn build_client(creds: &Creds) -> StsClient {
    tracing::debug!("Loading AWS config for STS client");
    let provider = SdkCredentials::new(
        creds.access_key(),
        creds.secret_key(),
        Some(creds.session_token().to_string()),
        None,
        "speculate",
    );

    let region = RegionProviderChain::first_try(creds.region().map(|r| Region::new(r.to_string())))
        .or_default_provider()
        .or_else(Region::new(DEFAULT_STS_REGION));

    let config = aws_config::defaults(BehaviorVersion::latest())
        .credentials_provider(provider)
        .region(region)
        .load()
        .await;

    StsClient::new(&config)
}

fn duration(seconds: i64) -> Result<i32> {
    i32::try_from(seconds).map_err(|_| SpeculateError::LifetimeOutOfRange(seconds))
}

fn api_error<E>(operation: &str, err: E) -> SpeculateError
where
    E: std::error::Error,
{
    SpeculateError::IdentityApi(format!("{} failed: {}", operation, DisplayErrorContext(err)))
}

fn to_creds(operation: &str, sts_creds: Option<&aws_sdk_sts::types::Credentials>) -> Result<Creds> {
    let sts_creds = sts_creds
        .ok_or_else(|| SpeculateError::IdentityApi(format!("{} returned no credentials", operation)))?;

    let expiration = sts_creds.expiration();
    let expiration = DateTime::<Utc>::from_timestamp(expiration.secs(), expiration.subsec_nanos());

    Creds::issued(
        sts_creds.access_key_id(),
        sts_creds.secret_access_key(),
        sts_creds.session_token(),
        expiration,
    )
}

impl IdentityClient for StsIdentityClient {
    async fn get_caller_identity(&self, creds: &Creds) -> Result<CallerIdentity> {
        let client = self.client_for(creds).await;
        let out = client
            .get_caller_identity()
            .send()
            .await
            .map_err(|e| api_error("GetCallerIdentity", e))?;

        let account = out
            .account()
            .ok_or_else(|| SpeculateError::IdentityApi("GetCallerIdentity missing Account".to_string()))?;
        let arn = out
            .arn()
            .ok_or_else(|| SpeculateError::IdentityApi("GetCallerIdentity missing Arn".to_string()))?;

        tracing::debug!("Caller identity: {}", arn);

        Ok(CallerIdentity {
            account: account.to_string(),
            arn: arn.to_string(),
        })
    }

    async fn get_session_token(
        &self,
        creds: &Creds,
        request: &SessionTokenRequest,
    ) -> Result<Creds> {
        tracing::info!("Calling AWS STS GetSessionToken");
        tracing::debug!("Duration: {} seconds", request.duration_seconds);

        let client = self.client_for(creds).await;
        let out = client
            .get_session_token()
            .duration_seconds(duration(request.duration_seconds)?)
            .set_serial_number(request.serial_number.clone())
            .set_token_code(request.token_code.clone())
            .send()
            .await
            .map_err(|e| api_error("GetSessionToken", e))?;

        to_creds("GetSessionToken", out.credentials())
    }

    async fn assume_role(&self, creds: &Creds, request: &AssumeRoleRequest) -> Result<Creds> {
        tracing::info!("Calling AWS STS AssumeRole");
        tracing::debug!("Role ARN: {}", request.role_arn);
        tracing::debug!("Session name: {}", request.role_session_name);
        tracing::debug!("Duration: {} seconds", request.duration_seconds);

        let client = self.client_for(creds).await;
        let out = client
            .assume_role()
            .role_arn(&request.role_arn)
            .role_session_name(&request.role_session_name)
            .duration_seconds(duration(request.duration_seconds)?)
            .set_policy(request.policy.clone())
            .set_serial_number(request.serial_number.clone())
            .set_token_code(request.token_code.clone())
            .send()
            .await
            .map_err(|e| api_error("AssumeRole", e))?;

        to_creds("AssumeRole", out.credentials())
    }
}
