use std::path::PathBuf;

use anyhow::{bail, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use rand::Rng;
use tracing_subscriber::EnvFilter;

mod api;
mod config;
mod dedupe;
mod events;
mod generator;
mod io;
mod links;
mod manifest;
mod prompts;
mod templates;

use config::RunCfg;
use generator::BatchGenerator;
use manifest::{ManifestRecord, ManifestWriter};
use templates::TemplateSet;

#[derive(Parser)]
#[command(name = "briefgen", version, about = "Templated design-brief generator")]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Generate a batch of design briefs for a topic
    Generate {
        /// Marketing topic or campaign description
        topic: String,
        /// How many briefs to produce
        #[arg(short, long, default_value_t = 3)]
        count: usize,
        /// RNG seed for a reproducible batch
        #[arg(long)]
        seed: Option<u64>,
        /// Save briefs and a JSONL manifest into this directory
        #[arg(long)]
        out: Option<PathBuf>,
        /// Print a share URL under each brief
        #[arg(long)]
        links: bool,
        /// Template table YAML (defaults to the builtin table)
        #[arg(long)]
        templates: Option<PathBuf>,
    },
    /// Run the HTTP API the browser front end talks to
    Serve {
        /// Address to listen on (overrides the config file)
        #[arg(long)]
        bind: Option<String>,
        #[arg(long, default_value = "briefgen.yaml")]
        config: PathBuf,
        /// Template table YAML (created with the builtin table if missing)
        #[arg(long)]
        templates: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().cmd {
        Cmd::Generate { topic, count, seed, out, links, templates } => {
            generate_once(topic, count, seed, out, links, templates).await
        }
        Cmd::Serve { bind, config, templates } => {
            let cfg = RunCfg::load(&config).await?;
            let bind = bind.unwrap_or_else(|| cfg.api.bind.clone());
            let templates = templates
                .or_else(|| cfg.template_path.clone())
                .unwrap_or_else(|| PathBuf::from("templates.yaml"));
            api::serve(bind, cfg, templates).await
        }
    }
}

async fn generate_once(
    topic: String,
    count: usize,
    seed: Option<u64>,
    out: Option<PathBuf>,
    links: bool,
    templates: Option<PathBuf>,
) -> Result<()> {
    let topic = topic.trim().to_string();
    if topic.is_empty() {
        bail!("topic must not be blank");
    }

    let set = TemplateSet::load(templates.as_deref()).await?;
    let seed = seed.unwrap_or_else(|| rand::rng().random());
    tracing::debug!(seed, "batch seed");

    let mut generator = BatchGenerator::new(set, seed);
    let batch = generator.generate_many(&topic, count);

    for (i, brief) in batch.prompts.iter().enumerate() {
        println!("=== Brief {} ===", i + 1);
        println!("{brief}");
        if links {
            println!("Share: {}", links::share_url(brief));
        }
        println!();
    }

    if let Some(out_dir) = out {
        let run_id = format!("cli-{}", Utc::now().timestamp());
        let manifest = ManifestWriter::open(out_dir.join("manifest.jsonl")).await?;
        for (i, brief) in batch.prompts.iter().enumerate() {
            let id = (i + 1) as u64;
            io::save_brief(&out_dir, id, &run_id, &topic, brief).await?;
            manifest
                .append(&ManifestRecord {
                    id,
                    run_id: &run_id,
                    topic: &topic,
                    text: brief,
                    chars: brief.chars().count(),
                    created_at: Utc::now().to_rfc3339(),
                })
                .await?;
        }
        tracing::info!(dir = %out_dir.display(), briefs = batch.prompts.len(), "batch saved");
    }

    println!(
        "Generated {} brief(s) (requested {}). Skipped dupes: {}",
        batch.prompts.len(),
        batch.requested,
        batch.duplicates_skipped,
    );
    Ok(())
}
