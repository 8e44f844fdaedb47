//! carbon-tags CLI
//!
//! Command-line client for a running carbon-tags server:
//! - List tags and per-value counts
//! - Resolve seriesByTag expressions
//! - Register tagged series
//! - Check status

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "carbon-tags-cli")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Client for the carbon-tags tag index")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// API server URL
    #[arg(long, default_value = "http://localhost:8080", global = true)]
    pub api_url: String,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List tag names
    Tags {
        /// Maximum number of tags
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show value counts for a tag
    Stat {
        /// Tag name
        tag: String,
        /// Only values starting with this prefix
        #[arg(long)]
        filter: Option<String>,
        /// Maximum number of values
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Resolve tag expressions (e.g. dc=ams rack!=2)
    Series {
        /// Tag expressions
        #[arg(required = true)]
        expressions: Vec<String>,
        /// Expression applied to metric names
        #[arg(long)]
        metric_expr: Option<String>,
        /// Render targets passed through to the server
        #[arg(short, long)]
        target: Vec<String>,
    },

    /// Register tagged series paths (metric;tag=value;...)
    Add {
        /// Series paths
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Show server status
    Status,

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Tags { limit } => {
            let mut query = vec![("format", "json".to_string())];
            if let Some(limit) = limit {
                query.push(("limit", limit.to_string()));
            }

            let response = client
                .get(format!("{}/tags/", cli.api_url))
                .query(&query)
                .send()
                .await?;
            let data = expect_json(response).await?;

            if cli.format == "json" {
                println!("{}", serde_json::to_string_pretty(&data)?);
            } else {
                let tags = data["Tags"].as_array().cloned().unwrap_or_default();
                if tags.is_empty() {
                    println!("No tags indexed yet.");
                    println!();
                    println!("Register a series with:");
                    println!("  carbon-tags-cli add 'cpu.load;dc=ams;host=web1'");
                }
                for tag in tags {
                    println!("{}", tag["Tag"].as_str().unwrap_or("-"));
                }
            }
        }

        Commands::Stat { tag, filter, limit } => {
            let mut query = vec![("format", "json".to_string())];
            if let Some(filter) = filter {
                query.push(("filter", filter));
            }
            if let Some(limit) = limit {
                query.push(("limit", limit.to_string()));
            }

            let response = client
                .get(format!("{}/tags/{}", cli.api_url, urlencoding::encode(&tag)))
                .query(&query)
                .send()
                .await?;
            let data = expect_json(response).await?;

            if cli.format == "json" {
                println!("{}", serde_json::to_string_pretty(&data)?);
            } else {
                match data["Values"].as_array() {
                    None => println!("Tag '{}' not found", tag),
                    Some(values) => {
                        println!("{:<30} {}", "Value", "Metrics");
                        println!("{}", "-".repeat(40));
                        for value in values {
                            println!(
                                "{:<30} {}",
                                value["Value"].as_str().unwrap_or("-"),
                                value["Count"].as_u64().unwrap_or(0)
                            );
                        }
                    }
                }
            }
        }

        Commands::Series {
            expressions,
            metric_expr,
            target,
        } => {
            let mut query: Vec<(&str, String)> = vec![("format", "json".to_string())];
            query.extend(expressions.into_iter().map(|e| ("tagValues", e)));
            query.extend(target.into_iter().map(|t| ("target", t)));
            if let Some(expr) = metric_expr {
                query.push(("metricExpr", expr));
            }

            let response = client
                .get(format!("{}/seriesByTag", cli.api_url))
                .query(&query)
                .send()
                .await?;
            let data = expect_json(response).await?;

            println!("{}", serde_json::to_string_pretty(&data)?);
        }

        Commands::Add { paths } => {
            let form: Vec<(&str, &str)> = paths.iter().map(|p| ("path", p.as_str())).collect();

            let response = client
                .post(format!("{}/tags/tagMultiSeries", cli.api_url))
                .form(&form)
                .send()
                .await?;
            let data = expect_json(response).await?;

            let accepted = data.as_array().map(Vec::len).unwrap_or(0);
            println!("Registered {} of {} series", accepted, paths.len());
            if accepted < paths.len() {
                println!("(paths without tag=value segments are ignored)");
            }
        }

        Commands::Status => {
            let response = client.get(format!("{}/health", cli.api_url)).send().await;

            match response {
                Ok(resp) if resp.status().is_success() => {
                    let health: serde_json::Value = resp.json().await?;

                    println!(
                        "carbon-tags v{}",
                        health["version"].as_str().unwrap_or("unknown")
                    );
                    println!();
                    println!(
                        "API Status: {}",
                        health["status"].as_str().unwrap_or("unknown")
                    );

                    if let Some(index) = health.get("index") {
                        println!();
                        println!("Index:");
                        for field in ["tags", "tag_values", "metrics", "paths"] {
                            if let Some(n) = index[field].as_u64() {
                                println!("  {}: {}", field, n);
                            }
                        }
                    }

                    if let Some(uptime) = health["uptime_seconds"].as_u64() {
                        println!();
                        println!("Uptime: {}", format_duration(uptime));
                    }
                }
                Ok(resp) => {
                    eprintln!("API returned error: {}", resp.status());
                    std::process::exit(1);
                }
                Err(e) => {
                    eprintln!("Cannot connect to carbon-tags at {}", cli.api_url);
                    eprintln!("Error: {}", e);
                    eprintln!();
                    eprintln!("Make sure the server is running:");
                    eprintln!("  cargo run --bin carbon-tags");
                    std::process::exit(1);
                }
            }
        }

        Commands::Config { output } => {
            let config = carbon_tags::config::generate_default_config();

            match output {
                Some(path) => {
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, &config)?;
                    println!("Config written to {:?}", path);
                }
                None => {
                    print!("{}", config);
                }
            }
        }
    }

    Ok(())
}

/// Decode a JSON body, exiting with the server's message on failure
async fn expect_json(
    response: reqwest::Response,
) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
    let status = response.status();
    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        eprintln!("Request failed ({}): {}", status, text);
        std::process::exit(1);
    }

    let text = response.text().await?;
    Ok(serde_json::from_str(&text)?)
}

fn format_duration(seconds: u64) -> String {
    if seconds < 60 {
        format!("{}s", seconds)
    } else if seconds < 3600 {
        format!("{}m {}s", seconds / 60, seconds % 60)
    } else if seconds < 86400 {
        format!("{}h {}m", seconds / 3600, (seconds % 3600) / 60)
    } else {
        format!("{}d {}h", seconds / 86400, (seconds % 86400) / 3600)
    }
}
