// Credential issuance: validation, defaults, and the STS call
mod assume_role;
mod lifetime;
mod mfa;
mod session;

pub use assume_role::AssumeRoleExecutor;
pub use lifetime::Lifetime;
pub use mfa::{Mfa, MfaPrompt};
pub use session::SessionTokenExecutor;

use crate::creds::Creds;
use crate::error::Result;
use regex::Regex;
use std::sync::OnceLock;

static ACCOUNT_ID_REGEX: OnceLock<Regex> = OnceLock::new();
static IAM_ENTITY_REGEX: OnceLock<Regex> = OnceLock::new();
static MFA_SERIAL_REGEX: OnceLock<Regex> = OnceLock::new();
static MFA_CODE_REGEX: OnceLock<Regex> = OnceLock::new();

/// Twelve-digit AWS account ID
fn account_id_regex() -> &'static Regex {
    ACCOUNT_ID_REGEX
        .get_or_init(|| Regex::new(r"^\d{12}$").expect("Invalid ACCOUNT_ID_REGEX pattern"))
}

/// Characters IAM allows in role and session names
fn iam_entity_regex() -> &'static Regex {
    IAM_ENTITY_REGEX
        .get_or_init(|| Regex::new(r"^[\w+=,.@-]+$").expect("Invalid IAM_ENTITY_REGEX pattern"))
}

/// Virtual MFA device ARN in the commercial or GovCloud partition
fn mfa_serial_regex() -> &'static Regex {
    MFA_SERIAL_REGEX.get_or_init(|| {
        Regex::new(r"^arn:aws(-us-gov)?:iam::\d{12}:mfa/[\w+=,.@-]+$")
            .expect("Invalid MFA_SERIAL_REGEX pattern")
    })
}

fn mfa_code_regex() -> &'static Regex {
    MFA_CODE_REGEX.get_or_init(|| Regex::new(r"^\d{6}$").expect("Invalid MFA_CODE_REGEX pattern"))
}

/// Requests a new set of AWS credentials
///
/// Setters validate eagerly, so malformed input is reported when it is
/// assigned. Execution only resolves defaults and talks to STS.
#[allow(async_fn_in_trait)]
pub trait Executor {
    fn lifetime_config(&self) -> &Lifetime;

    fn lifetime_config_mut(&mut self) -> &mut Lifetime;

    fn mfa_config(&self) -> &Mfa;

    fn mfa_config_mut(&mut self) -> &mut Mfa;

    /// Issue credentials starting from an explicit credential set
    async fn execute_with_creds(&mut self, creds: &Creds) -> Result<Creds>;

    /// Issue credentials starting from the environment
    async fn execute(&mut self) -> Result<Creds> {
        self.execute_from_lookup(|name| std::env::var(name).ok()).await
    }

    /// Issue credentials starting from variables read through `lookup`
    async fn execute_from_lookup<F>(&mut self, lookup: F) -> Result<Creds>
    where
        F: Fn(&str) -> Option<String>,
    {
        let creds = Creds::from_lookup(lookup)?;
        self.execute_with_creds(&creds).await
    }

    fn set_lifetime(&mut self, seconds: i64) -> Result<()> {
        self.lifetime_config_mut().set_lifetime(seconds)
    }

    fn lifetime(&self) -> i64 {
        self.lifetime_config().lifetime()
    }

    fn set_mfa(&mut self, enabled: bool) {
        self.mfa_config_mut().set_use_mfa(enabled)
    }

    fn set_mfa_serial(&mut self, serial: &str) -> Result<()> {
        self.mfa_config_mut().set_serial(serial)
    }

    fn set_mfa_code(&mut self, code: &str) -> Result<()> {
        self.mfa_config_mut().set_code(code)
    }

    fn set_mfa_prompt(&mut self, prompt: Box<dyn MfaPrompt>) {
        self.mfa_config_mut().set_prompt(prompt)
    }

    fn use_mfa(&self) -> bool {
        self.mfa_config().use_mfa()
    }
}
