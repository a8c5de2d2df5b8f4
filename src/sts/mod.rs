// STS identity API seam
mod client;

pub use client::StsIdentityClient;

use crate::creds::{CallerIdentity, Creds};
use crate::error::Result;

/// Parameters for STS GetSessionToken
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionTokenRequest {
    pub duration_seconds: i64,
    pub serial_number: Option<String>,
    pub token_code: Option<String>,
}

/// Parameters for STS AssumeRole
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssumeRoleRequest {
    pub role_arn: String,
    pub role_session_name: String,
    pub duration_seconds: i64,
    pub policy: Option<String>,
    pub serial_number: Option<String>,
    pub token_code: Option<String>,
}

/// Request shapes that can carry an MFA device and one-time code
pub trait MfaRequest {
    fn set_mfa(&mut self, serial_number: String, token_code: String);
}

impl MfaRequest for SessionTokenRequest {
    fn set_mfa(&mut self, serial_number: String, token_code: String) {
        self.serial_number = Some(serial_number);
        self.token_code = Some(token_code);
    }
}

impl MfaRequest for AssumeRoleRequest {
    fn set_mfa(&mut self, serial_number: String, token_code: String) {
        self.serial_number = Some(serial_number);
        self.token_code = Some(token_code);
    }
}

/// The STS operations used to look up and issue credentials
///
/// Every call is signed with the given credentials. Errors come back as
/// `SpeculateError::IdentityApi` and are never retried.
#[allow(async_fn_in_trait)]
pub trait IdentityClient {
    async fn get_caller_identity(&self, creds: &Creds) -> Result<CallerIdentity>;

    async fn get_session_token(
        &self,
        creds: &Creds,
        request: &SessionTokenRequest,
    ) -> Result<Creds>;

    async fn assume_role(&self, creds: &Creds, request: &AssumeRoleRequest) -> Result<Creds>;
}
