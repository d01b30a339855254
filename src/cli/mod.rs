pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "lawdir")]
#[command(about = "lawdir - administration tool for the lawyer directory")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Apply database migrations")]
    Migrate,

    #[command(about = "Create an admin account")]
    CreateAdmin {
        #[arg(long, help = "Login email")]
        email: String,

        #[arg(long, help = "Password (at least 6 characters)")]
        password: String,

        #[arg(long, default_value = "Admin", help = "First name")]
        first_name: String,

        #[arg(long, default_value = "", help = "Last name")]
        last_name: String,
    },

    #[command(about = "Search the directory, or list every lawyer")]
    Lawyers {
        #[arg(long, short, help = "Text matched against name, commune and specialty")]
        query: Option<String>,

        #[arg(long, help = "Include disabled lawyers and ignore --query")]
        all: bool,
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Migrate => commands::migrate::handle(output_format).await,
        Commands::CreateAdmin {
            email,
            password,
            first_name,
            last_name,
        } => commands::admin::handle(email, password, first_name, last_name, output_format).await,
        Commands::Lawyers { query, all } => commands::lawyers::handle(query, all, output_format).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_create_admin() {
        let cli = Cli::try_parse_from([
            "lawdir",
            "--json",
            "create-admin",
            "--email",
            "admin@example.cl",
            "--password",
            "cambiame",
        ])
        .unwrap();

        assert!(matches!(OutputFormat::from_cli(&cli), OutputFormat::Json));
        match cli.command {
            Commands::CreateAdmin { email, first_name, last_name, .. } => {
                assert_eq!(email, "admin@example.cl");
                assert_eq!(first_name, "Admin");
                assert_eq!(last_name, "");
            }
            _ => panic!("expected create-admin"),
        }
    }

    #[test]
    fn lawyers_defaults_to_enabled_search() {
        let cli = Cli::try_parse_from(["lawdir", "lawyers", "-q", "Rancagua"]).unwrap();
        match cli.command {
            Commands::Lawyers { query, all } => {
                assert_eq!(query.as_deref(), Some("Rancagua"));
                assert!(!all);
            }
            _ => panic!("expected lawyers"),
        }
    }
}
