pub mod completions;
pub mod config;
pub mod console;
pub mod env;
pub mod exec;

use crate::cli::IssueArgs;
use crate::config::Config;
use crate::creds::Creds;
use crate::error::Result;
use crate::executor::{AssumeRoleExecutor, Executor, SessionTokenExecutor};

/// Issue credentials from the environment's credentials, as the flags describe
///
/// With a role the AssumeRole executor is used, otherwise GetSessionToken.
/// Values are validated in order: account, role, session, lifetime, MFA.
pub async fn issue_creds(issue: &IssueArgs, config: &Config) -> Result<Creds> {
    match &issue.role {
        Some(role) => {
            let mut executor = AssumeRoleExecutor::new();
            if let Some(account) = &issue.account {
                executor.set_account_id(account)?;
            }
            executor.set_role_name(role)?;
            if let Some(session) = &issue.session {
                executor.set_session_name(session)?;
            }
            configure(&mut executor, issue, config)?;
            if let Some(policy) = &issue.policy {
                executor.set_policy(policy);
            }
            executor.execute().await
        }
        None => {
            let mut executor = SessionTokenExecutor::new();
            configure(&mut executor, issue, config)?;
            executor.execute().await
        }
    }
}

/// Apply lifetime and MFA settings, flags taking precedence over config
fn configure<E: Executor>(executor: &mut E, issue: &IssueArgs, config: &Config) -> Result<()> {
    if let Some(lifetime) = issue.lifetime.or(config.defaults.lifetime) {
        executor.set_lifetime(lifetime)?;
    }
    executor.set_mfa(issue.mfa || config.defaults.mfa);
    let serial = issue
        .mfa_serial
        .as_deref()
        .or(config.defaults.mfa_serial.as_deref());
    if let Some(serial) = serial {
        executor.set_mfa_serial(serial)?;
    }
    if let Some(code) = &issue.mfa_code {
        executor.set_mfa_code(code)?;
    }
    Ok(())
}
