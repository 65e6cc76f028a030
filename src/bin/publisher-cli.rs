use std::path::PathBuf;
use std::process::ExitCode;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use clap::{Parser, Subcommand};
use serde_json::Value;

use vmess_publisher::config::load_config;
use vmess_publisher::publish::decode_share_link;

#[derive(Parser)]
#[command(name = "publisher-cli")]
#[command(about = "Management CLI for the VMess publisher", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:3000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load and validate a config file without serving it
    Check {
        #[arg(long, default_value = "config.json")]
        config: PathBuf,
    },
    /// Fetch a subscriber's server list and print its share links
    Servers {
        #[arg(short, long)]
        key: String,

        /// Also print each link's decoded JSON
        #[arg(long)]
        decode: bool,
    },
    /// Fetch a routing rule set
    Rules {
        #[arg(short, long)]
        key: String,

        #[arg(long)]
        id: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Check { config } => match load_config(&config) {
            Ok(snapshot) => {
                println!(
                    "OK: {} servers, {} routing rule sets, {} subscribers",
                    snapshot.server_count(),
                    snapshot.rule_set_count(),
                    snapshot.subscribers().len()
                );
                Ok(ExitCode::SUCCESS)
            }
            Err(e) => {
                eprintln!("Invalid config: {}", e);
                Ok(ExitCode::FAILURE)
            }
        },
        Commands::Servers { key, decode } => {
            let res = client
                .get(format!("{}/publish/{}/servers", cli.url, key))
                .send()
                .await?;
            let Some(body) = success_body(res).await? else {
                return Ok(ExitCode::FAILURE);
            };

            let links = String::from_utf8(STANDARD.decode(body.trim())?)?;
            for link in links.lines() {
                println!("{}", link);
                if decode {
                    let json = decode_share_link(link)?;
                    println!("{}", serde_json::to_string_pretty(&json)?);
                }
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Rules { key, id } => {
            let res = client
                .get(format!("{}/publish/{}/routingRules/{}", cli.url, key, id))
                .send()
                .await?;
            let Some(body) = success_body(res).await? else {
                return Ok(ExitCode::FAILURE);
            };

            let json: Value = serde_json::from_str(&body)?;
            println!("{}", serde_json::to_string_pretty(&json)?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn success_body(res: reqwest::Response) -> Result<Option<String>, reqwest::Error> {
    let status = res.status();
    let text = res.text().await?;
    if status.is_success() {
        Ok(Some(text))
    } else {
        eprintln!("Error: publisher returned status {}", status);
        eprintln!("Response: {}", text);
        Ok(None)
    }
}
