use super::{account_id_regex, iam_entity_regex, Executor, Lifetime, Mfa};
use crate::creds::{CallerLookup, Creds};
use crate::error::{Result, SpeculateError};
use crate::sts::{AssumeRoleRequest, IdentityClient, StsIdentityClient};

/// Issues credentials with STS AssumeRole
#[derive(Debug)]
pub struct AssumeRoleExecutor<C = StsIdentityClient> {
    client: C,
    lifetime: Lifetime,
    mfa: Mfa,
    account_id: Option<String>,
    role_name: Option<String>,
    session_name: Option<String>,
    policy: Option<String>,
}

impl AssumeRoleExecutor {
    pub fn new() -> Self {
        Self::with_client(StsIdentityClient::new())
    }
}

impl Default for AssumeRoleExecutor {
    fn default() -> Self {
        Self::new()
    }
}

/// Store a validated value; empty input clears it
fn set_checked(
    slot: &mut Option<String>,
    value: &str,
    valid: bool,
    err: impl FnOnce(String) -> SpeculateError,
) -> Result<()> {
    if value.is_empty() {
        *slot = None;
        return Ok(());
    }
    if !valid {
        return Err(err(value.to_string()));
    }
    *slot = Some(value.to_string());
    Ok(())
}

impl<C: IdentityClient> AssumeRoleExecutor<C> {
    pub fn with_client(client: C) -> Self {
        Self {
            client,
            lifetime: Lifetime::default(),
            mfa: Mfa::default(),
            account_id: None,
            role_name: None,
            session_name: None,
            policy: None,
        }
    }

    /// Account that owns the target role; the caller's own when unset
    pub fn set_account_id(&mut self, account_id: &str) -> Result<()> {
        let valid = account_id_regex().is_match(account_id);
        set_checked(
            &mut self.account_id,
            account_id,
            valid,
            SpeculateError::InvalidAccountId,
        )?;
        tracing::debug!("Setting account ID: {}", account_id);
        Ok(())
    }

    pub fn set_role_name(&mut self, role_name: &str) -> Result<()> {
        let valid = iam_entity_regex().is_match(role_name);
        set_checked(
            &mut self.role_name,
            role_name,
            valid,
            SpeculateError::InvalidRoleName,
        )?;
        tracing::debug!("Setting role name: {}", role_name);
        Ok(())
    }

    pub fn set_session_name(&mut self, session_name: &str) -> Result<()> {
        let valid = iam_entity_regex().is_match(session_name);
        set_checked(
            &mut self.session_name,
            session_name,
            valid,
            SpeculateError::InvalidSessionName,
        )?;
        tracing::debug!("Setting session name: {}", session_name);
        Ok(())
    }

    /// Inline IAM policy further restricting the issued credentials
    pub fn set_policy(&mut self, policy: &str) {
        tracing::debug!("Setting policy: {}", policy);
        self.policy = Some(policy.to_string()).filter(|p| !p.is_empty());
    }

    pub fn account_id(&self) -> Option<&str> {
        self.account_id.as_deref()
    }

    pub fn role_name(&self) -> Option<&str> {
        self.role_name.as_deref()
    }

    pub fn session_name(&self) -> Option<&str> {
        self.session_name.as_deref()
    }

    pub fn policy(&self) -> Option<&str> {
        self.policy.as_deref()
    }

    /// Resolve defaults into an AssumeRole request
    ///
    /// At most one identity lookup is made, shared by the role ARN, the
    /// session name and the MFA serial.
    pub async fn build_request(&mut self, creds: &Creds) -> Result<AssumeRoleRequest> {
        let role_name = self.role_name.clone().ok_or(SpeculateError::EmptyRole)?;
        let mut caller = CallerLookup::new(&self.client, creds);

        let identity = caller.identity().await?;
        let role_arn = identity.next_role_arn(&role_name, self.account_id.as_deref())?;
        let role_session_name = match self.session_name.clone() {
            Some(name) => name,
            None => {
                let name = identity.session_name().to_string();
                tracing::info!("Using default value for session name: {}", name);
                self.session_name = Some(name.clone());
                name
            }
        };

        let mut request = AssumeRoleRequest {
            role_arn,
            role_session_name,
            duration_seconds: self.lifetime.lifetime(),
            policy: self.policy.clone(),
            ..Default::default()
        };
        self.mfa.configure_request(&mut request, &mut caller).await?;
        Ok(request)
    }
}

impl<C: IdentityClient> Executor for AssumeRoleExecutor<C> {
    fn lifetime_config(&self) -> &Lifetime {
        &self.lifetime
    }

    fn lifetime_config_mut(&mut self) -> &mut Lifetime {
        &mut self.lifetime
    }

    fn mfa_config(&self) -> &Mfa {
        &self.mfa
    }

    fn mfa_config_mut(&mut self) -> &mut Mfa {
        &mut self.mfa
    }

    async fn execute_with_creds(&mut self, creds: &Creds) -> Result<Creds> {
        let request = self.build_request(creds).await?;
        let issued = self.client.assume_role(creds, &request).await?;
        tracing::info!("Assumed role {}", request.role_arn);
        Ok(issued.with_region(creds.region().map(|r| r.to_string())))
    }
}
