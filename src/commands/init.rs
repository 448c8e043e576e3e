use std::io::{self, Write};

use gh_query::config::{Config, DEFAULT_ENDPOINT};
use gh_query::{GhQueryError, Result};

fn prompt(message: &str) -> Result<String> {
    print!("{message}");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

pub async fn run() -> Result<()> {
    let config_path = Config::config_path()?;

    if config_path.exists() {
        let answer = prompt(&format!(
            "Config file already exists at {}. Overwrite? [y/N] ",
            config_path.display()
        ))?;

        if !answer.eq_ignore_ascii_case("y") {
            println!("Aborted.");
            return Ok(());
        }
    }

    println!("ghq Configuration");
    println!("=================\n");

    let token = prompt(
        "Enter a GitHub token (create one at https://github.com/settings/tokens): ",
    )?;
    if token.is_empty() {
        return Err(GhQueryError::MissingToken);
    }

    let endpoint = prompt(&format!("GraphQL endpoint [{DEFAULT_ENDPOINT}]: "))?;

    let mut config_content = format!("token = \"{token}\"\n");
    if !endpoint.is_empty() {
        let candidate = Config {
            endpoint: Some(endpoint.clone()),
            ..Default::default()
        };
        candidate.endpoint()?;
        config_content.push_str(&format!("endpoint = \"{endpoint}\"\n"));
    }

    // Create config directory if it doesn't exist
    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| GhQueryError::ConfigRead {
            path: config_path.clone(),
            source: e,
        })?;
    }

    std::fs::write(&config_path, config_content).map_err(|e| GhQueryError::ConfigRead {
        path: config_path.clone(),
        source: e,
    })?;

    println!("\nConfig saved to {}", config_path.display());
    println!("You can now use 'ghq' commands!");

    Ok(())
}
