use clap::{Parser, Subcommand};
use url::Url;

use web_gateway::api::{ApiClient, ApiError, StartPipelineRequest};

#[derive(Parser)]
#[command(name = "gateway-cli")]
#[command(about = "Client CLI for the web gateway", long_about = None)]
struct Cli {
    /// Gateway base URL.
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the deployed build's version manifest
    Version,
    /// Start a pipeline through the gateway
    StartPipeline {
        /// ID of the pipeline task to start
        #[arg(short, long)]
        task: String,

        /// Execution queue (server default when omitted)
        #[arg(short, long)]
        queue: Option<String>,

        /// Parameter override, NAME=VALUE or NAME for a null value.
        /// Repeatable; order is preserved.
        #[arg(long = "arg", value_name = "NAME[=VALUE]")]
        args: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let base_url: Url = cli.url.parse()?;
    let client = ApiClient::new(base_url);

    match cli.command {
        Commands::Version => match client.site_version().await {
            Ok(manifest) => println!("{}", serde_json::to_string_pretty(&manifest)?),
            Err(error) => fail(error),
        },
        Commands::StartPipeline { task, queue, args } => {
            let mut request = StartPipelineRequest::new(task);
            if let Some(queue) = queue {
                request = request.with_queue(queue);
            }
            for raw in &args {
                let (name, value) = parse_arg(raw);
                request = request.with_arg(name, value);
            }

            match client.start_pipeline(&request).await {
                Ok(response) => println!("{}", serde_json::to_string_pretty(&response)?),
                Err(error) => fail(error),
            }
        }
    }

    Ok(())
}

fn fail(error: ApiError) -> ! {
    match error {
        ApiError::Status { status, body } => {
            eprintln!("Error: gateway returned status {status}");
            if !body.is_empty() {
                eprintln!("Response: {body}");
            }
        }
        other => eprintln!("Error: {other}"),
    }
    std::process::exit(1);
}

/// Split a `NAME=VALUE` override; a bare `NAME` means a null value.
fn parse_arg(raw: &str) -> (String, Option<String>) {
    match raw.split_once('=') {
        Some((name, value)) => (name.to_string(), Some(value.to_string())),
        None => (raw.to_string(), None),
    }
}
