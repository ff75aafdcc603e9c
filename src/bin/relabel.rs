use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use mailgen::relabel::{relabel, TextMode};

#[derive(Debug, Parser)]
#[command(author, version, about = "Convert a generated table into a label,text dataset")]
struct Args {
    /// Generated CSV with subject and body columns
    #[arg(long)]
    input: PathBuf,

    /// Destination CSV
    #[arg(long)]
    output: PathBuf,

    /// Label written on every row
    #[arg(long)]
    label: String,

    /// Which columns make up the text column
    #[arg(long, value_enum, default_value_t = TextMode::Body)]
    mode: TextMode,
}

fn main() -> Result<()> {
    mailgen::logging::init();

    let args = Args::parse();
    let rows = relabel(&args.input, &args.output, &args.label, args.mode)?;
    info!(rows, output = %args.output.display(), "dataset labeled");
    println!("Labeled {} rows into {}", rows, args.output.display());
    Ok(())
}
