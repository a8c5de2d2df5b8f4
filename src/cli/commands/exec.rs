use crate::cli::IssueArgs;
use crate::config::Config;
use crate::creds::ENV_VAR_EXPORTS;
use crate::error::{Result, SpeculateError};
use std::process::Command;

pub async fn execute(issue: IssueArgs, command: Vec<String>) -> Result<()> {
    let (program, args) = command
        .split_first()
        .ok_or_else(|| SpeculateError::ConfigError("No command specified".to_string()))?;

    let config = Config::load()?;
    let creds = super::issue_creds(&issue, &config).await?;

    let env: Vec<(String, String)> = creds
        .translate(ENV_VAR_EXPORTS)
        .into_iter()
        .filter(|(_, value)| !value.is_empty())
        .collect();

    tracing::debug!("Running {} with issued credentials", program);
    let status = Command::new(program)
        .args(args)
        .env_remove("AWS_SECURITY_TOKEN")
        .envs(env)
        .status()?;

    // Exit with same code as the command
    if !status.success() {
        std::process::exit(status.code().unwrap_or(1));
    }

    Ok(())
}
