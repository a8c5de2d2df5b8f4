use super::Creds;
use crate::error::{Result, SpeculateError};
use crate::sts::IdentityClient;

/// Console web namespace for each known partition
static NAMESPACES: &[(&str, &str)] = &[("aws", "aws.amazon"), ("aws-us-gov", "amazonaws-us-gov")];

/// Map a partition to its console namespace
pub fn namespace_for(partition: &str) -> Result<&'static str> {
    NAMESPACES
        .iter()
        .find(|(p, _)| *p == partition)
        .map(|(_, namespace)| *namespace)
        .ok_or_else(|| SpeculateError::UnknownPartition(partition.to_string()))
}

/// Result of STS GetCallerIdentity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    pub account: String,
    pub arn: String,
}

impl CallerIdentity {
    #[cfg(test)]
    pub(crate) fn new(account: impl Into<String>, arn: impl Into<String>) -> Self {
        Self {
            account: account.into(),
            arn: arn.into(),
        }
    }

    /// Second segment of `arn:<partition>:...`
    pub fn partition(&self) -> Result<&str> {
        let mut pieces = self.arn.split(':');
        match (pieces.next(), pieces.next()) {
            (Some("arn"), Some(partition)) if !partition.is_empty() => Ok(partition),
            _ => Err(SpeculateError::MalformedArn(self.arn.clone())),
        }
    }

    pub fn namespace(&self) -> Result<&'static str> {
        namespace_for(self.partition()?)
    }

    /// Virtual MFA device ARN for an IAM user
    pub fn mfa_arn(&self) -> Result<String> {
        if !self.arn.contains(":user/") {
            return Err(SpeculateError::NotAUser(self.arn.clone()));
        }
        Ok(self.arn.replacen(":user/", ":mfa/", 1))
    }

    /// Last path segment of the ARN; the user name or role session name
    pub fn session_name(&self) -> &str {
        self.arn.rsplit('/').next().unwrap_or(&self.arn)
    }

    pub fn next_role_arn(&self, role: &str, account: Option<&str>) -> Result<String> {
        if role.is_empty() {
            return Err(SpeculateError::EmptyRole);
        }
        let partition = self.partition()?;
        let account = account
            .filter(|a| !a.is_empty())
            .unwrap_or(&self.account);
        Ok(format!("arn:{}:iam::{}:role/{}", partition, account, role))
    }
}

/// Lazily fetched caller identity, shared by every default resolved
/// during a single execution
pub struct CallerLookup<'a, C> {
    client: &'a C,
    creds: &'a Creds,
    identity: Option<CallerIdentity>,
}

impl<'a, C: IdentityClient> CallerLookup<'a, C> {
    pub fn new(client: &'a C, creds: &'a Creds) -> Self {
        Self {
            client,
            creds,
            identity: None,
        }
    }

    /// Fetch the identity on first use; later calls reuse it
    pub async fn identity(&mut self) -> Result<&CallerIdentity> {
        let identity = match self.identity.take() {
            Some(identity) => identity,
            None => {
                tracing::debug!("Looking up caller identity");
                self.creds.identity(self.client).await?
            }
        };
        Ok(self.identity.insert(identity))
    }
}
