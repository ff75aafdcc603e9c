use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use mailgen::export::export_json;

#[derive(Debug, Parser)]
#[command(author, version, about = "Write each row of a generated table as its own JSON file")]
struct Args {
    /// Generated CSV table
    #[arg(long)]
    input: PathBuf,

    /// Directory for email_<id>.json files
    #[arg(long, default_value = "emails")]
    out_dir: PathBuf,
}

fn main() -> Result<()> {
    mailgen::logging::init();

    let args = Args::parse();
    let files = export_json(&args.input, &args.out_dir)?;
    println!("Exported {} records to {}", files.len(), args.out_dir.display());
    Ok(())
}
