use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use tracing::debug;

use super::logging::init_logging;
use crate::export::ExportFormat;
use crate::models::{Hit, format_iso};
use crate::pipeline::{ExportOptions, SearchOutcome, open_vault, search_vault};
use crate::search::{Query, ScanObserver};

const DEFAULT_CODE_DIR: &str = "recovered_code";

#[derive(Parser)]
#[command(name = "chat-vault-search")]
#[command(version = "0.1.0")]
#[command(about = "Search and recover content from a chat data export (ZIP/folder)", long_about = None)]
pub struct Cli {
    /// Export ZIP, extracted folder, or conversations.json
    #[arg(env = "CHAT_VAULT_INPUT")]
    pub input: Option<PathBuf>,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search titles/messages for a query
    Search(SearchArgs),
    /// Show statistics about the export
    Stats,
}

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Search query (plain text by default; use --regex for regex)
    pub query: String,

    /// Treat the query as a regular expression
    #[arg(long)]
    pub regex: bool,

    /// Case-sensitive matching
    #[arg(long)]
    pub case_sensitive: bool,

    /// Do not search conversation titles
    #[arg(long)]
    pub no_titles: bool,

    /// Do not search message bodies
    #[arg(long)]
    pub no_messages: bool,

    /// Only conversations whose title contains this (plain text)
    #[arg(long)]
    pub title_contains: Option<String>,

    /// Only return hits that contain fenced code blocks
    #[arg(long)]
    pub only_with_code: bool,

    /// Only messages on or after this date (YYYY-MM-DD or ISO 8601)
    #[arg(long)]
    pub start_date: Option<String>,

    /// Only messages on or before this date (YYYY-MM-DD or ISO 8601)
    #[arg(long)]
    pub end_date: Option<String>,

    /// How many hits to preview in the terminal
    #[arg(long, default_value_t = 10)]
    pub preview: usize,

    /// Print the full text of hit N
    #[arg(long)]
    pub show: Option<usize>,

    /// Export hits to this file
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Export format: md, json or txt
    #[arg(long, default_value = "md")]
    pub format: String,

    /// Extract fenced code blocks into files
    #[arg(long)]
    pub extract_code: bool,

    /// Directory for extracted code (default: recovered_code)
    #[arg(long)]
    pub code_dir: Option<PathBuf>,
}

impl SearchArgs {
    fn build_query(&self) -> Result<Query> {
        let mut builder = Query::builder(&self.query)
            .regex(self.regex)
            .case_sensitive(self.case_sensitive)
            .search_titles(!self.no_titles)
            .search_messages(!self.no_messages)
            .only_with_code(self.only_with_code);
        if let Some(needle) = &self.title_contains {
            builder = builder.title_contains(needle);
        }
        if let Some(start) = &self.start_date {
            builder = builder.start_date(start);
        }
        if let Some(end) = &self.end_date {
            builder = builder.end_date(end);
        }
        Ok(builder.build()?)
    }

    fn export_options(&self) -> Result<ExportOptions> {
        let format: ExportFormat = self.format.parse()?;
        Ok(ExportOptions {
            export_path: self.export.clone(),
            format,
            extract_code_dir: self.extraction_dir(),
        })
    }

    /// `--code-dir` implies `--extract-code`.
    fn extraction_dir(&self) -> Option<PathBuf> {
        (self.extract_code || self.code_dir.is_some())
            .then(|| self.code_dir.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_CODE_DIR)))
    }
}

/// Logs scan progress roughly every tenth of the archive.
struct LogProgress;

impl ScanObserver for LogProgress {
    fn on_progress(&mut self, processed: usize, total: usize) {
        let step = (total / 10).max(1);
        if processed % step == 0 || processed == total {
            debug!("Scanned {}/{} conversations", processed, total);
        }
    }
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match &cli.command {
        Some(Commands::Search(args)) => {
            let input = require_input(&cli)?;
            run_search_command(input, args)?;
        }
        Some(Commands::Stats) => {
            let input = require_input(&cli)?;
            show_stats(input)?;
        }
        None => {
            println!("Use --help for usage information");
        }
    }

    Ok(())
}

fn require_input(cli: &Cli) -> Result<&PathBuf> {
    match &cli.input {
        Some(input) => Ok(input),
        None => bail!("No input given: pass an export path or set CHAT_VAULT_INPUT"),
    }
}

fn run_search_command(input: &Path, args: &SearchArgs) -> Result<()> {
    // Validate everything before touching the archive
    let query = args.build_query()?;
    let options = args.export_options()?;

    let vault = open_vault(input).with_context(|| format!("Failed to load {}", input.display()))?;
    let outcome = search_vault(vault, &query, &options, &mut LogProgress)?;

    print_summary(&outcome, args);
    Ok(())
}

fn print_summary(outcome: &SearchOutcome, args: &SearchArgs) {
    let hits = outcome.hits();
    let stats = &outcome.stats;

    println!();
    println!("Found {} match(es).", hits.len());
    println!(
        "Scanned {} conversations ({} messages); {} skipped as malformed, {} filtered by title",
        stats.conversations_scanned,
        stats.messages_scanned,
        stats.conversations_skipped,
        stats.conversations_filtered
    );
    if stats.cancelled {
        println!("Search was cancelled; results are partial.");
    }
    println!();

    for (i, hit) in hits.iter().take(args.preview).enumerate() {
        print_preview(i + 1, hit);
    }

    if let Some(path) = &outcome.exported_to {
        println!("Exported results to: {}", path.display());
    }
    if let Some(dir) = args.extraction_dir() {
        println!(
            "Extracted {} code block file(s) into: {}",
            outcome.extracted_files.len(),
            dir.display()
        );
    }

    if let Some(n) = args.show {
        match n.checked_sub(1).and_then(|idx| hits.get(idx)) {
            Some(hit) => {
                let rule = "=".repeat(80);
                println!("\n{}", rule);
                println!("FULL MESSAGE [{}] - {}", n, hit.conversation.title);
                println!("{}\n", rule);
                println!("{}", hit.full_text());
                println!("\n{}", rule);
            }
            None => eprintln!("No hit number {} (found {})", n, hits.len()),
        }
    }
}

fn print_preview(n: usize, hit: &Hit<'_>) {
    let when = hit
        .message
        .timestamp
        .or(hit.conversation.create_time)
        .map(format_iso)
        .unwrap_or_else(|| "unknown-time".to_string());
    println!("[{}] {}  ({}, {})", n, hit.conversation.title, when, hit.message.author_role);
    println!("     conv_id={} msg_id={}", hit.conversation.id, hit.message.id);
    println!("     {}\n", hit.snippet);
}

fn show_stats(input: &Path) -> Result<()> {
    let vault = open_vault(input).with_context(|| format!("Failed to load {}", input.display()))?;

    let mut roles: BTreeMap<&str, usize> = BTreeMap::new();
    let mut code_blocks = 0;
    for message in vault.conversations.iter().flat_map(|c| &c.messages) {
        *roles.entry(message.author_role.as_str()).or_default() += 1;
        code_blocks += message.code_blocks().len();
    }

    println!("Chat Export Statistics");
    println!("================================");
    println!("Conversations: {}", vault.conversations.len());
    println!("  Skipped (malformed): {}", vault.skipped);
    println!("Messages: {}", vault.message_count());
    for (role, count) in &roles {
        println!("  {}: {}", role, count);
    }
    println!("Code blocks: {}", code_blocks);
    println!();
    println!("Input: {}", input.display());

    let created = vault.conversations.iter().filter_map(|c| c.create_time);
    if let Some(oldest) = created.clone().min() {
        println!("Oldest conversation: {}", oldest.format("%Y-%m-%d %H:%M:%S"));
    }
    if let Some(newest) = created.max() {
        println!("Newest conversation: {}", newest.format("%Y-%m-%d %H:%M:%S"));
    }

    Ok(())
}
