// Credential sets and their field translations
mod identity;

pub use identity::{CallerIdentity, CallerLookup};

use crate::error::{Result, SpeculateError};
use crate::sts::IdentityClient;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};

pub const ACCESS_KEY: &str = "AccessKey";
pub const SECRET_KEY: &str = "SecretKey";
pub const SESSION_TOKEN: &str = "SessionToken";
pub const REGION: &str = "Region";

const REQUIRED_FIELDS: [&str; 3] = [ACCESS_KEY, SECRET_KEY, SESSION_TOKEN];

/// Environment variables read into credential fields.
///
/// Order matters: when several variables feed the same field, the first
/// non-empty one wins.
pub const ENV_VAR_SOURCES: &[(&str, &str)] = &[
    ("AWS_ACCESS_KEY_ID", ACCESS_KEY),
    ("AWS_SECRET_ACCESS_KEY", SECRET_KEY),
    ("AWS_SESSION_TOKEN", SESSION_TOKEN),
    ("AWS_SECURITY_TOKEN", SESSION_TOKEN),
    ("AWS_DEFAULT_REGION", REGION),
];

/// Environment variables written for shell export
pub const ENV_VAR_EXPORTS: &[(&str, &str)] = &[
    ("AWS_ACCESS_KEY_ID", ACCESS_KEY),
    ("AWS_SECRET_ACCESS_KEY", SECRET_KEY),
    ("AWS_SESSION_TOKEN", SESSION_TOKEN),
    ("AWS_DEFAULT_REGION", REGION),
];

/// Session fields expected by the console federation endpoint
pub const CONSOLE_FIELDS: &[(&str, &str)] = &[
    ("sessionId", ACCESS_KEY),
    ("sessionKey", SECRET_KEY),
    ("sessionToken", SESSION_TOKEN),
];

/// A set of temporary AWS credentials
///
/// Values are immutable once built; new sets come from translation of a
/// field map, the environment, or an STS response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Creds {
    access_key: String,
    secret_key: String,
    session_token: String,
    region: Option<String>,
    expiration: Option<DateTime<Utc>>,
}

impl Creds {
    /// Build credentials from a field map keyed by `AccessKey`, `SecretKey`,
    /// `SessionToken` and the optional `Region`
    pub fn new(fields: &HashMap<String, String>) -> Result<Self> {
        for key in REQUIRED_FIELDS {
            match fields.get(key) {
                Some(value) if !value.is_empty() => {}
                _ => return Err(SpeculateError::MissingCredentialField(key.to_string())),
            }
        }

        let field = |key: &str| fields.get(key).cloned().unwrap_or_default();

        Ok(Self {
            access_key: field(ACCESS_KEY),
            secret_key: field(SECRET_KEY),
            session_token: field(SESSION_TOKEN),
            region: fields.get(REGION).filter(|r| !r.is_empty()).cloned(),
            expiration: None,
        })
    }

    /// Build credentials from an STS response
    pub fn issued(
        access_key: &str,
        secret_key: &str,
        session_token: &str,
        expiration: Option<DateTime<Utc>>,
    ) -> Result<Self> {
        let fields = HashMap::from([
            (ACCESS_KEY.to_string(), access_key.to_string()),
            (SECRET_KEY.to_string(), secret_key.to_string()),
            (SESSION_TOKEN.to_string(), session_token.to_string()),
        ]);
        let mut creds = Self::new(&fields)?;
        creds.expiration = expiration;
        Ok(creds)
    }

    /// Load credentials from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load credentials through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut fields: HashMap<String, String> = HashMap::new();
        for &(var, field) in ENV_VAR_SOURCES {
            let seen = fields.get(field).is_some_and(|v| !v.is_empty());
            if seen {
                continue;
            }
            if let Some(value) = lookup(var) {
                fields.insert(field.to_string(), value);
            }
        }
        Self::new(&fields)
    }

    pub fn access_key(&self) -> &str {
        &self.access_key
    }

    pub fn secret_key(&self) -> &str {
        &self.secret_key
    }

    pub fn session_token(&self) -> &str {
        &self.session_token
    }

    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    pub fn expiration(&self) -> Option<&DateTime<Utc>> {
        self.expiration.as_ref()
    }

    /// Same credentials, scoped to another region
    pub fn with_region(mut self, region: Option<String>) -> Self {
        self.region = region.filter(|r| !r.is_empty());
        self
    }

    pub fn to_map(&self) -> BTreeMap<&'static str, String> {
        BTreeMap::from([
            (ACCESS_KEY, self.access_key.clone()),
            (SECRET_KEY, self.secret_key.clone()),
            (SESSION_TOKEN, self.session_token.clone()),
            (REGION, self.region.clone().unwrap_or_default()),
        ])
    }

    /// Rename fields through a `(destination, source field)` dictionary
    ///
    /// Unknown source fields translate to an empty string.
    pub fn translate(&self, dictionary: &[(&str, &str)]) -> BTreeMap<String, String> {
        let old = self.to_map();
        dictionary
            .iter()
            .map(|&(dest, source)| {
                let value = old.get(source).cloned().unwrap_or_default();
                (dest.to_string(), value)
            })
            .collect()
    }

    /// Shell `export` lines, sorted, skipping empty values
    pub fn to_env_vars(&self) -> Vec<String> {
        let mut lines: Vec<String> = self
            .translate(ENV_VAR_EXPORTS)
            .into_iter()
            .filter(|(_, value)| !value.is_empty())
            .map(|(key, value)| format!("export {}={}", key, value))
            .collect();
        lines.sort();
        lines
    }

    /// Look up who these credentials belong to. Each call is a round-trip.
    pub async fn identity<C: IdentityClient>(&self, client: &C) -> Result<CallerIdentity> {
        client.get_caller_identity(self).await
    }

    pub async fn partition<C: IdentityClient>(&self, client: &C) -> Result<String> {
        let identity = self.identity(client).await?;
        Ok(identity.partition()?.to_string())
    }

    pub async fn namespace<C: IdentityClient>(&self, client: &C) -> Result<&'static str> {
        self.identity(client).await?.namespace()
    }

    pub async fn account_id<C: IdentityClient>(&self, client: &C) -> Result<String> {
        Ok(self.identity(client).await?.account)
    }

    pub async fn mfa_arn<C: IdentityClient>(&self, client: &C) -> Result<String> {
        self.identity(client).await?.mfa_arn()
    }

    pub async fn session_name<C: IdentityClient>(&self, client: &C) -> Result<String> {
        Ok(self.identity(client).await?.session_name().to_string())
    }

    /// ARN of `role` in `account`, or in the caller's own account when none is given
    pub async fn next_role_arn<C: IdentityClient>(
        &self,
        client: &C,
        role: &str,
        account: Option<&str>,
    ) -> Result<String> {
        if role.is_empty() {
            return Err(SpeculateError::EmptyRole);
        }
        self.identity(client).await?.next_role_arn(role, account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sts::testing::{base_creds, FakeIdentityClient};

    fn fields(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_new_with_all_fields() {
        let creds = Creds::new(&fields(&[
            ("AccessKey", "AK"),
            ("SecretKey", "SK"),
            ("SessionToken", "ST"),
            ("Region", "eu-west-1"),
        ]))
        .unwrap();
        assert_eq!(creds.access_key(), "AK");
        assert_eq!(creds.secret_key(), "SK");
        assert_eq!(creds.session_token(), "ST");
        assert_eq!(creds.region(), Some("eu-west-1"));
        assert!(creds.expiration().is_none());
    }

    #[test]
    fn test_new_region_is_optional() {
        let creds = Creds::new(&fields(&[
            ("AccessKey", "AK"),
            ("SecretKey", "SK"),
            ("SessionToken", "ST"),
            ("Region", ""),
        ]))
        .unwrap();
        assert_eq!(creds.region(), None);
    }

    #[test]
    fn test_new_names_missing_field() {
        let full = [
            ("AccessKey", "AK"),
            ("SecretKey", "SK"),
            ("SessionToken", "ST"),
        ];
        for missing in REQUIRED_FIELDS {
            let partial: Vec<(&str, &str)> =
                full.iter().copied().filter(|(k, _)| *k != missing).collect();
            match Creds::new(&fields(&partial)) {
                Err(SpeculateError::MissingCredentialField(name)) => assert_eq!(name, missing),
                other => panic!("expected missing {}, got {:?}", missing, other),
            }
        }
    }

    #[test]
    fn test_new_rejects_empty_required_value() {
        let err = Creds::new(&fields(&[
            ("AccessKey", "AK"),
            ("SecretKey", ""),
            ("SessionToken", "ST"),
        ]))
        .unwrap_err();
        assert!(matches!(err, SpeculateError::MissingCredentialField(ref k) if k == "SecretKey"));
    }

    #[test]
    fn test_translate_identity_round_trip() {
        let creds = base_creds().with_region(Some("us-west-2".to_string()));
        let identity: Vec<(&str, &str)> = creds.to_map().keys().map(|k| (*k, *k)).collect();
        let translated: HashMap<String, String> =
            creds.translate(&identity).into_iter().collect();
        assert_eq!(Creds::new(&translated).unwrap(), creds);
    }

    #[test]
    fn test_translate_unknown_field_is_empty() {
        let translated = base_creds().translate(&[("x", "Nope"), ("id", "AccessKey")]);
        assert_eq!(translated["x"], "");
        assert_eq!(translated["id"], "AKIDBASE");
    }

    #[test]
    fn test_to_env_vars_without_region() {
        let creds = Creds::new(&fields(&[
            ("AccessKey", "AK"),
            ("SecretKey", "SK"),
            ("SessionToken", "ST"),
            ("Region", ""),
        ]))
        .unwrap();
        assert_eq!(
            creds.to_env_vars(),
            vec![
                "export AWS_ACCESS_KEY_ID=AK",
                "export AWS_SECRET_ACCESS_KEY=SK",
                "export AWS_SESSION_TOKEN=ST",
            ]
        );
    }

    #[test]
    fn test_to_env_vars_with_region_sorted() {
        let creds = Creds::issued("AK", "SK", "ST", None)
            .unwrap()
            .with_region(Some("us-east-2".to_string()));
        assert_eq!(
            creds.to_env_vars(),
            vec![
                "export AWS_ACCESS_KEY_ID=AK",
                "export AWS_DEFAULT_REGION=us-east-2",
                "export AWS_SECRET_ACCESS_KEY=SK",
                "export AWS_SESSION_TOKEN=ST",
            ]
        );
    }

    #[test]
    fn test_from_lookup_reads_standard_variables() {
        let env = fields(&[
            ("AWS_ACCESS_KEY_ID", "AK"),
            ("AWS_SECRET_ACCESS_KEY", "SK"),
            ("AWS_SESSION_TOKEN", "ST"),
            ("AWS_DEFAULT_REGION", "ap-south-1"),
        ]);
        let creds = Creds::from_lookup(|k| env.get(k).cloned()).unwrap();
        assert_eq!(creds.session_token(), "ST");
        assert_eq!(creds.region(), Some("ap-south-1"));
    }

    #[test]
    fn test_from_lookup_session_token_wins_over_security_token() {
        let env = fields(&[
            ("AWS_ACCESS_KEY_ID", "AK"),
            ("AWS_SECRET_ACCESS_KEY", "SK"),
            ("AWS_SESSION_TOKEN", "session"),
            ("AWS_SECURITY_TOKEN", "security"),
        ]);
        let creds = Creds::from_lookup(|k| env.get(k).cloned()).unwrap();
        assert_eq!(creds.session_token(), "session");
    }

    #[test]
    fn test_from_lookup_falls_back_to_security_token() {
        let env = fields(&[
            ("AWS_ACCESS_KEY_ID", "AK"),
            ("AWS_SECRET_ACCESS_KEY", "SK"),
            ("AWS_SESSION_TOKEN", ""),
            ("AWS_SECURITY_TOKEN", "security"),
        ]);
        let creds = Creds::from_lookup(|k| env.get(k).cloned()).unwrap();
        assert_eq!(creds.session_token(), "security");
    }

    #[test]
    fn test_from_lookup_missing_variables() {
        let err = Creds::from_lookup(|_| None).unwrap_err();
        assert!(matches!(err, SpeculateError::MissingCredentialField(ref k) if k == "AccessKey"));
    }

    #[tokio::test]
    async fn test_derived_identity_values() {
        let client = FakeIdentityClient::for_user("111111111111", "alice");
        let creds = base_creds();

        assert_eq!(creds.account_id(&client).await.unwrap(), "111111111111");
        assert_eq!(creds.partition(&client).await.unwrap(), "aws");
        assert_eq!(creds.namespace(&client).await.unwrap(), "aws.amazon");
        assert_eq!(
            creds.mfa_arn(&client).await.unwrap(),
            "arn:aws:iam::111111111111:mfa/alice"
        );
        assert_eq!(creds.session_name(&client).await.unwrap(), "alice");
        // no caching across derived calls
        assert_eq!(client.identity_calls(), 5);
    }

    #[tokio::test]
    async fn test_next_role_arn_defaults_to_own_account() {
        let client = FakeIdentityClient::for_user("222222222222", "bob");
        let arn = base_creds()
            .next_role_arn(&client, "deploy", None)
            .await
            .unwrap();
        assert_eq!(arn, "arn:aws:iam::222222222222:role/deploy");
    }

    #[tokio::test]
    async fn test_next_role_arn_empty_role_skips_lookup() {
        let client = FakeIdentityClient::for_user("222222222222", "bob");
        let err = base_creds()
            .next_role_arn(&client, "", Some("333333333333"))
            .await
            .unwrap_err();
        assert!(matches!(err, SpeculateError::EmptyRole));
        assert_eq!(client.identity_calls(), 0);
    }

    #[tokio::test]
    async fn test_identity_error_is_surfaced() {
        let client = FakeIdentityClient::failing("ExpiredToken: token expired");
        let err = base_creds().account_id(&client).await.unwrap_err();
        match err {
            SpeculateError::IdentityApi(msg) => assert_eq!(msg, "ExpiredToken: token expired"),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
