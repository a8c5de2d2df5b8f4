use crate::cli::IssueArgs;
use crate::config::Config;
use crate::error::Result;
use crate::expiry;

pub async fn execute(issue: IssueArgs) -> Result<()> {
    let config = Config::load()?;
    let creds = super::issue_creds(&issue, &config).await?;

    // stdout is meant for eval
    for line in creds.to_env_vars() {
        println!("{}", line);
    }
    if let Some(expiration) = creds.expiration() {
        eprintln!("# Credentials {}", expiry::expiry_note(expiration));
    }

    Ok(())
}
