//! Modelrelay CLI - run model requests through the bridge

use anyhow::Context;
use clap::{Parser, Subcommand};
use modelrelay_bridge::{build_store, BridgeConfig, RequestProcessor};
use modelrelay_inference::{format_error, InferenceClient, ModelType, Response};
use serde_json::{json, Map, Value};
use std::path::PathBuf;
use tokio::io::AsyncReadExt;
use tracing_subscriber::EnvFilter;

/// Modelrelay CLI - validate models and run inference requests
#[derive(Parser)]
#[command(name = "modelrelay")]
#[command(about = "Bridge model requests to a hosted inference API", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single request built from arguments
    Invoke {
        /// Request record id
        #[arg(long)]
        id: String,
        /// Remote model id
        #[arg(long)]
        model: String,
        /// Prompt or input text
        #[arg(long)]
        input: String,
        /// Generation type
        #[arg(long = "type", value_enum, default_value = "text-to-text")]
        model_type: TypeArg,
        /// Parameter override as key=value (value parsed as JSON when possible)
        #[arg(long = "param", value_parser = parse_param)]
        params: Vec<(String, Value)>,
    },
    /// Run a raw JSON request body from a file, or stdin when omitted
    Process {
        file: Option<PathBuf>,
    },
    /// Check that a model exists and has a pipeline tag
    Validate {
        model: String,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum TypeArg {
    TextToText,
    TextToImage,
}

impl From<TypeArg> for ModelType {
    fn from(arg: TypeArg) -> Self {
        match arg {
            TypeArg::TextToText => ModelType::TextToText,
            TypeArg::TextToImage => ModelType::TextToImage,
        }
    }
}

fn parse_param(raw: &str) -> Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got `{raw}`"))?;
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = BridgeConfig::from_env()?;

    let client = match InferenceClient::huggingface(&config.inference.client_config()) {
        Ok(client) => client,
        Err(failure) => return emit(format_error(&failure)),
    };

    let response = match cli.command {
        Commands::Validate { model } => match client.validate_model(&model).await {
            Ok(()) => Response {
                status_code: 200,
                body: json!({"model": model, "status": "success"}),
            },
            Err(failure) => format_error(&failure),
        },
        Commands::Invoke {
            id,
            model,
            input,
            model_type,
            params,
        } => {
            let mut body = json!({
                "id": id,
                "input": input,
                "modelId": model,
                "type": ModelType::from(model_type),
            });
            if !params.is_empty() {
                body["parameters"] = Value::Object(params.into_iter().collect::<Map<_, _>>());
            }
            let processor = RequestProcessor::new(client, build_store(&config.store));
            processor.process(&serde_json::to_vec(&body)?).await
        }
        Commands::Process { file } => {
            let payload = read_payload(file).await?;
            let processor = RequestProcessor::new(client, build_store(&config.store));
            processor.process(&payload).await
        }
    };

    emit(response)
}

async fn read_payload(file: Option<PathBuf>) -> anyhow::Result<Vec<u8>> {
    match file {
        Some(path) => tokio::fs::read(&path)
            .await
            .with_context(|| format!("failed to read {}", path.display())),
        None => {
            let mut buf = Vec::new();
            tokio::io::stdin().read_to_end(&mut buf).await?;
            Ok(buf)
        }
    }
}

fn emit(response: Response) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(&response.body)?);
    if !response.is_success() {
        std::process::exit(exit_code(response.status_code));
    }
    Ok(())
}

fn exit_code(status_code: u16) -> i32 {
    match status_code {
        400..=499 => 2,
        _ => 1,
    }
}
