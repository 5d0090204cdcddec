use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about = "Upload report files in chunks")]
pub struct CliOptions {
    /// Report date, YYYY-MM-DD
    #[arg(short, long)]
    pub date: Option<NaiveDate>,

    /// Assign a file to a report slot, as KEY=PATH (repeatable)
    #[arg(short, long = "file", value_name = "KEY=PATH", value_parser = parse_assignment)]
    pub files: Vec<(String, PathBuf)>,

    /// Upload endpoint (overrides config)
    #[arg(long)]
    pub url: Option<String>,

    /// Chunk size in bytes (overrides config)
    #[arg(long)]
    pub chunk_size: Option<u64>,

    /// Send each file in a single request instead of chunks
    #[arg(long)]
    pub whole_file: bool,

    /// Optional path to config file (JSON)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Print the configured report types and exit
    #[arg(long)]
    pub list_types: bool,
}

fn parse_assignment(s: &str) -> Result<(String, PathBuf), String> {
    let (key, path) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=PATH, got `{s}`"))?;
    if key.is_empty() || path.is_empty() {
        return Err(format!("expected KEY=PATH, got `{s}`"));
    }
    Ok((key.to_string(), PathBuf::from(path)))
}
