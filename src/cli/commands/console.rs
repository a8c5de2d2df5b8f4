use crate::cli::IssueArgs;
use crate::config::Config;
use crate::console::{self, ConsoleUrlBuilder};
use crate::creds::Creds;
use crate::error::Result;
use crate::sts::StsIdentityClient;

pub async fn execute(
    issue: IssueArgs,
    path: Option<String>,
    signout: bool,
    open: bool,
) -> Result<()> {
    let config = Config::load()?;

    let creds = if issue.wants_issuance(&config.defaults) && !signout {
        super::issue_creds(&issue, &config).await?
    } else {
        tracing::debug!("Using credentials from the environment");
        Creds::from_env()?
    };

    let client = StsIdentityClient::new();
    let builder = ConsoleUrlBuilder::new();
    let url = if signout {
        builder.signout_url(&client, &creds).await?
    } else {
        let path = path.or(config.console.path).unwrap_or_default();
        builder.custom_console_url(&client, &creds, &path).await?
    };

    if (open || config.console.open) && console::open_in_browser(&url)? {
        eprintln!("✓ Console opened in browser");
    } else {
        println!("{}", url);
    }

    Ok(())
}
