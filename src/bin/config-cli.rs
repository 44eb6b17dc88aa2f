use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "config-cli")]
#[command(about = "Management CLI for the remote-config service", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[arg(short, long, default_value = "CHANGE_ME_IN_PRODUCTION")]
    key: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show poller status and the active source entity
    Status,
    /// Dump effective configuration values
    Properties,
    /// Poll the source immediately
    Refresh,
    /// Show the demo properties as the service reads them
    Get,
    /// Write the demo properties back to the source entity
    Set {
        #[arg(long)]
        foo: String,
        #[arg(long)]
        bar: i64,
        #[arg(long, default_value_t = false)]
        baz: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", cli.key))?,
    );

    match cli.command {
        Commands::Status => {
            let res = client.get(format!("{}/admin/status", cli.url))
                .headers(headers)
                .send()
                .await?;
            print_json(res).await?;
        }
        Commands::Properties => {
            let res = client.get(format!("{}/admin/properties", cli.url))
                .headers(headers)
                .send()
                .await?;
            print_json(res).await?;
        }
        Commands::Refresh => {
            let res = client.post(format!("{}/admin/refresh", cli.url))
                .headers(headers)
                .send()
                .await?;
            print_json(res).await?;
        }
        Commands::Get => {
            let res = client.get(format!("{}/config", cli.url)).send().await?;
            print_text(res).await?;
        }
        Commands::Set { foo, bar, baz } => {
            let form = [
                ("foo", foo),
                ("foo.bar", bar.to_string()),
                ("baz", baz.to_string()),
            ];
            let res = client.post(format!("{}/config", cli.url))
                .form(&form)
                .send()
                .await?;
            print_text(res).await?;
        }
    }

    Ok(())
}

async fn print_json(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if status == reqwest::StatusCode::UNAUTHORIZED {
        eprintln!("Error: admin API rejected the key");
        return Ok(());
    }

    // refresh failures still carry a JSON body
    let json: Value = res.json().await?;
    if !status.is_success() {
        eprintln!("Error: service returned status {}", status);
    }
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

async fn print_text(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;
    if !status.is_success() {
        eprintln!("Error: service returned status {}", status);
        eprintln!("Response: {}", text);
        return Ok(());
    }
    print!("{}", text);
    Ok(())
}
