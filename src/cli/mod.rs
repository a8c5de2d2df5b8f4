// CLI interface
pub mod commands;

use crate::config::IssueDefaults;
use crate::error::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "speculate")]
#[command(about = "Issue temporary AWS credentials via STS", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose/debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Never try to open a browser
    #[arg(long, global = true)]
    pub headless: bool,
}

/// What to issue and how
#[derive(Args, Debug, Clone, Default)]
pub struct IssueArgs {
    /// Role to assume; without one a plain session token is issued
    pub role: Option<String>,

    /// Account ID that owns the role (defaults to your own account)
    #[arg(long, requires = "role")]
    pub account: Option<String>,

    /// Role session name (defaults to your current user or session name)
    #[arg(long, requires = "role")]
    pub session: Option<String>,

    /// Inline IAM policy JSON restricting the issued credentials
    #[arg(long, requires = "role")]
    pub policy: Option<String>,

    /// Session lifetime in seconds (900-3600)
    #[arg(long)]
    pub lifetime: Option<i64>,

    /// Send an MFA code with the request
    #[arg(long)]
    pub mfa: bool,

    /// MFA device ARN (defaults to your own virtual MFA device)
    #[arg(long)]
    pub mfa_serial: Option<String>,

    /// Six-digit MFA code; implies --mfa
    #[arg(long)]
    pub mfa_code: Option<String>,
}

impl IssueArgs {
    /// Whether flags or configured defaults ask for new credentials rather
    /// than the current ones
    pub fn wants_issuance(&self, defaults: &IssueDefaults) -> bool {
        self.role.is_some()
            || self.lifetime.is_some()
            || self.mfa
            || self.mfa_serial.is_some()
            || self.mfa_code.is_some()
            || defaults.mfa
            || defaults.lifetime.is_some()
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print shell exports for new credentials
    ///
    /// Usage: eval "$(speculate env my-role)"
    Env {
        #[command(flatten)]
        issue: IssueArgs,
    },

    /// Print (or open) an AWS Console sign-in URL
    ///
    /// Without a role, MFA or lifetime (from flags or config) the credentials
    /// in the environment are used as-is.
    Console {
        #[command(flatten)]
        issue: IssueArgs,

        /// Console path to land on, e.g. "ec2/home"
        #[arg(long)]
        path: Option<String>,

        /// Print the console sign-out URL instead
        #[arg(long)]
        signout: bool,

        /// Open the URL in the default browser
        #[arg(long)]
        open: bool,
    },

    /// Execute a command with new credentials in its environment
    Exec {
        #[command(flatten)]
        issue: IssueArgs,

        /// Command to execute
        #[arg(last = true, required = true)]
        command: Vec<String>,
    },

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Generate shell completion scripts
    ///
    /// INSTALLATION:
    ///
    /// Bash:
    ///   eval "$(speculate completions bash)"    # Add to ~/.bashrc
    ///
    /// Zsh:
    ///   eval "$(speculate completions zsh)"     # Add to ~/.zshrc
    ///
    /// Fish:
    ///   speculate completions fish > ~/.config/fish/completions/speculate.fish
    Completions {
        /// Shell type to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Write a commented sample config file
    Init,
    /// Show the config file location and effective settings
    Show,
}

#[derive(Debug, Clone, ValueEnum)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

pub async fn execute(args: Cli) -> Result<()> {
    match args.command {
        Commands::Env { issue } => commands::env::execute(issue).await,
        Commands::Console {
            issue,
            path,
            signout,
            open,
        } => commands::console::execute(issue, path, signout, open).await,
        Commands::Exec { issue, command } => commands::exec::execute(issue, command).await,
        Commands::Config { command } => commands::config::execute(command),
        Commands::Completions { shell } => {
            commands::completions::execute(shell);
            Ok(())
        }
    }
}
