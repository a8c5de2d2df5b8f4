use super::{Executor, Lifetime, Mfa};
use crate::creds::{CallerLookup, Creds};
use crate::error::Result;
use crate::sts::{IdentityClient, SessionTokenRequest, StsIdentityClient};

/// Issues credentials with STS GetSessionToken
#[derive(Debug)]
pub struct SessionTokenExecutor<C = StsIdentityClient> {
    client: C,
    lifetime: Lifetime,
    mfa: Mfa,
}

impl SessionTokenExecutor {
    pub fn new() -> Self {
        Self::with_client(StsIdentityClient::new())
    }
}

impl Default for SessionTokenExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: IdentityClient> SessionTokenExecutor<C> {
    pub fn with_client(client: C) -> Self {
        Self {
            client,
            lifetime: Lifetime::default(),
            mfa: Mfa::default(),
        }
    }

    /// Resolve defaults into a GetSessionToken request
    pub async fn build_request(&mut self, creds: &Creds) -> Result<SessionTokenRequest> {
        let mut request = SessionTokenRequest {
            duration_seconds: self.lifetime.lifetime(),
            ..Default::default()
        };
        let mut caller = CallerLookup::new(&self.client, creds);
        self.mfa.configure_request(&mut request, &mut caller).await?;
        Ok(request)
    }
}

impl<C: IdentityClient> Executor for SessionTokenExecutor<C> {
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
        let issued = self.client.get_session_token(creds, &request).await?;
        tracing::info!("Issued session credentials");
        Ok(issued.with_region(creds.region().map(|r| r.to_string())))
    }
}
