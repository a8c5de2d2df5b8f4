use crate::cli::ConfigCommand;
use crate::config::Config;
use crate::error::Result;

pub fn execute(command: ConfigCommand) -> Result<()> {
    match command {
        ConfigCommand::Init => {
            let path = Config::create_sample()?;
            println!("Created sample config file at: {}", path.display());
        }
        ConfigCommand::Show => {
            let config_path = Config::config_file_path()?;
            println!("Config file path: {}", config_path.display());
            if config_path.exists() {
                println!("Status: File exists");
            } else {
                println!("Status: File does not exist (run `speculate config init`)");
            }

            match Config::load() {
                Ok(config) => {
                    println!("\nEffective configuration:\n");
                    print!("{}", config.to_toml()?);
                }
                Err(e) => {
                    println!("Valid: No");
                    println!("Error: {}", e);
                }
            }
        }
    }

    Ok(())
}
