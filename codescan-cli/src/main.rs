use clap::{Parser, ValueEnum};
use codescan::{search, ScanResult, SearchConfig};
use colored::Colorize;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod format;

#[derive(Parser)]
#[command(author, version, about = "Search a codebase for patterns with structured output")]
struct Cli {
    /// The pattern to search for
    pattern: String,

    /// The path to search in
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Perform case-insensitive search
    #[arg(short = 'i', long)]
    ignore_case: bool,

    /// Match whole words only
    #[arg(short = 'w', long)]
    word: bool,

    /// Interpret the pattern as a regular expression
    #[arg(short = 'r', long)]
    regex: bool,

    /// File extensions to search (e.g. py,txt)
    #[arg(short = 'e', long, value_delimiter = ',')]
    extensions: Option<Vec<String>>,

    /// Glob patterns to exclude (e.g. '*.git*,*node_modules*')
    #[arg(short = 'x', long, value_delimiter = ',')]
    exclude: Vec<String>,

    /// Maximum directory depth to search (0 = files directly in the root)
    #[arg(short = 'd', long)]
    max_depth: Option<usize>,

    /// Number of context lines to include before and after matches
    #[arg(short = 'c', long, default_value_t = 0)]
    context: usize,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Write output to a file instead of stdout
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Use compact output format (one line per match)
    #[arg(long)]
    compact: bool,

    /// Group results by file
    #[arg(short = 'g', long)]
    group_by_file: bool,

    /// Include summary information in output
    #[arg(short = 's', long)]
    summary: bool,

    /// Number of threads to use
    #[arg(short = 'j', long)]
    threads: Option<NonZeroUsize>,

    /// Load settings from a YAML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short = 'v', long)]
    verbose: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum OutputFormat {
    Text,
    Json,
}

impl Cli {
    fn to_search_config(&self) -> SearchConfig {
        SearchConfig {
            pattern: self.pattern.clone(),
            root_path: self.path.clone(),
            case_sensitive: !self.ignore_case,
            whole_word: self.word,
            use_regex: self.regex,
            file_extensions: self.extensions.clone(),
            exclude_patterns: self.exclude.clone(),
            max_depth: self.max_depth,
            context_lines: self.context,
            ..SearchConfig::default()
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        // A clean scan with zero matches is distinct from a failure
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("{} {e}", "Error:".red().bold());
            ExitCode::from(2)
        }
    }
}

fn run(cli: &Cli) -> ScanResult<bool> {
    let mut config =
        SearchConfig::load_from(cli.config.as_deref())?.merge_with_cli(cli.to_search_config());
    if let Some(threads) = cli.threads {
        config.thread_count = threads;
    }

    init_logging(cli.verbose, &config.log_level);
    debug!("Resolved configuration: {config:?}");

    let result = search(&config)?;

    if cli.output.is_some() {
        // Never write escape codes into an output file
        colored::control::set_override(false);
    }

    let rendered = match cli.format {
        OutputFormat::Json => format::format_json(&result),
        OutputFormat::Text => {
            format::format_text(&result, cli.compact, cli.group_by_file, cli.summary)
        }
    };

    match &cli.output {
        Some(path) => std::fs::write(path, format!("{rendered}\n"))?,
        None => println!("{rendered}"),
    }

    Ok(result.total_matches > 0)
}

fn init_logging(verbose: bool, log_level: &str) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
