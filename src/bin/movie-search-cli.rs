use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "movie-search-cli")]
#[command(about = "Command line client for the movie-search service", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search trailers for a movie
    Trailers {
        movie_name: String,
        #[arg(long)]
        page_size: Option<u32>,
        #[arg(long)]
        page_token: Option<String>,
        /// Only trailers published at or after this RFC 3339 time
        #[arg(long)]
        published_after: Option<DateTime<Utc>>,
        /// Only trailers published at or before this RFC 3339 time
        #[arg(long)]
        published_before: Option<DateTime<Utc>>,
    },
    /// Check service health
    Health,
    /// Show circuit breaker and bulkhead state
    Resilience,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let res = match cli.command {
        Commands::Trailers {
            movie_name,
            page_size,
            page_token,
            published_after,
            published_before,
        } => {
            let mut query = vec![("movie_name", movie_name)];
            if let Some(page_size) = page_size {
                query.push(("page_size", page_size.to_string()));
            }
            if let Some(page_token) = page_token {
                query.push(("page_token", page_token));
            }
            if let Some(after) = published_after {
                query.push(("published_after", after.to_rfc3339()));
            }
            if let Some(before) = published_before {
                query.push(("published_before", before.to_rfc3339()));
            }
            client
                .get(format!("{}/api/v1/videos/trailers", base))
                .query(&query)
                .send()
                .await?
        }
        Commands::Health => client.get(format!("{}/health", base)).send().await?,
        Commands::Resilience => {
            client
                .get(format!("{}/api/v1/resilience", base))
                .send()
                .await?
        }
    };
    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: service returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        std::process::exit(1);
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
