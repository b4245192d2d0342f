use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    config::{load_settings, MiniAppConfig},
    embeds::normalize_embeds,
};
use serde_json::json;
use shared::{
    domain::{ActionKind, TxHash},
    protocol::AssetMetadata,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Operator tooling for the HelloBase mini-app.
#[derive(Parser, Debug)]
#[command(name = "hellobase")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the merged settings and whether they resolve.
    Config,
    /// Show the embed list a cast with these embeds would carry.
    Embeds {
        #[arg(long = "embed")]
        embeds: Vec<String>,
    },
    /// Render the cast composed after a confirmed transaction.
    CastMessage {
        #[arg(long)]
        kind: ActionKind,
        #[arg(long)]
        hash: TxHash,
    },
    /// Print the collectible metadata document.
    Metadata {
        #[arg(long, default_value = "https://hellobase.vercel.app")]
        public_url: String,
    },
    /// Check a cast text the way the compose form does.
    CheckText { text: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();
    debug!(?args, "parsed arguments");

    let output = run(args.command)?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn run(command: Command) -> Result<serde_json::Value> {
    match command {
        Command::Config => {
            let settings = load_settings();
            let resolved = MiniAppConfig::from_settings(&settings);
            Ok(json!({
                "settings": settings,
                "valid": resolved.is_ok(),
                "error": resolved.err().map(|err| format!("{err:#}")),
            }))
        }
        Command::Embeds { embeds } => {
            let settings = load_settings();
            let normalized = normalize_embeds(&settings.canonical_url, &embeds);
            Ok(json!({
                "embeds": normalized.as_slice(),
                "dropped": normalized.dropped(),
            }))
        }
        Command::CastMessage { kind, hash } => {
            let config = MiniAppConfig::load().context("client configuration is incomplete")?;
            let cast = config.target(kind).render_cast(&hash);
            let normalized = normalize_embeds(&config.canonical_url, &cast.embeds);
            Ok(json!({
                "kind": kind,
                "text": cast.text,
                "embeds": normalized.as_slice(),
            }))
        }
        Command::Metadata { public_url } => {
            Ok(serde_json::to_value(AssetMetadata::early_supporter(&public_url))?)
        }
        Command::CheckText { text } => {
            if text.trim().is_empty() {
                bail!("Please enter some text.");
            }
            Ok(json!({ "text": text, "chars": text.chars().count() }))
        }
    }
}
