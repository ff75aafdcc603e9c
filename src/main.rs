use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};

use mailgen::backend::OllamaClient;
use mailgen::config;
use mailgen::generator::Generator;
use mailgen::journal::Journal;
use mailgen::prompt::{PromptTemplate, Vocabulary};
use mailgen::stop::StopSignal;
use mailgen::table::TableFile;

#[derive(Debug, Parser)]
#[command(author, version, about = "Generate a synthetic email dataset with a local model")]
struct Args {
    /// Path to YAML config file
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,

    /// Prompt preset (recruiting_invite, job_application, onboarding)
    #[arg(long)]
    preset: Option<String>,

    /// Final id to generate up to, overriding app.target_count
    #[arg(long)]
    target: Option<u64>,

    /// Seed for role/adjective selection, overriding app.seed
    #[arg(long)]
    seed: Option<u64>,

    /// Print an example config and exit
    #[arg(long)]
    print_example_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    mailgen::logging::init();

    let args = Args::parse();
    if args.print_example_config {
        print!("{}", config::example());
        return Ok(());
    }

    let mut cfg = config::load(Some(&args.config))
        .with_context(|| format!("failed to load {}", args.config.display()))?;
    if let Some(preset) = args.preset {
        cfg.prompt.preset = preset;
    }
    if let Some(target) = args.target {
        cfg.app.target_count = target;
    }
    if args.seed.is_some() {
        cfg.app.seed = args.seed;
    }
    config::validate(&cfg)?;
    cfg.ensure_dirs()?;

    let template = PromptTemplate::from_config(&cfg)?;
    let vocabulary = Vocabulary::from_config(&cfg)?;
    let backend = OllamaClient::from_config(&cfg)?;

    // Fatal before any generation if the table cannot be opened.
    let (table, resume) = TableFile::initialize(cfg.output_path())?;
    info!(
        next_id = resume.next_id,
        existing = resume.existing_rows,
        output = %table.path().display(),
        log = %cfg.app.log_path,
        "resuming"
    );

    let stop = StopSignal::new(&cfg.app.stop_file);
    let on_ctrl_c = stop.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("ctrl-c received; stopping after the current item");
                on_ctrl_c.interrupt();
            }
            Err(err) => error!(?err, "failed to listen for ctrl-c"),
        }
    });

    let journal = Journal::new(&cfg.app.log_path, &cfg.app.debug_dir);
    let mut generator = Generator::new(
        &backend,
        template,
        vocabulary,
        cfg.generator_settings(),
        table,
        resume,
        journal,
        stop,
    );
    if let Some(seed) = cfg.app.seed {
        generator = generator.with_seed(seed);
    }

    let summary = generator.run().await?;

    println!("{}", "=".repeat(50));
    if summary.stopped {
        println!("Stopped before ID {}.", summary.next_id);
    }
    println!(
        "Generation complete. Successful: {}/{}  Failed: {}/{}",
        summary.succeeded, summary.requested, summary.failed, summary.requested
    );
    if summary.unparsable > 0 {
        println!("Unparsable responses kept in {}", cfg.app.debug_dir);
    }
    println!("{}", "=".repeat(50));
    Ok(())
}
