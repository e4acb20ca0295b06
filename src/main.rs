//! CLI entry point for `patchroll`.

use std::path::{Path, PathBuf};

use clap::{Args, CommandFactory, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use patchroll::config::Config;
use patchroll::export::archive::{self, ExportOptions};
use patchroll::git::range::{self, RangeSelector};
use patchroll::git::Git;
use patchroll::parser::patch::{extract_record, ExtractOptions};

/// Export git format-patch messages into size-limited text files.
#[derive(Parser)]
#[command(name = "patchroll", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

/// Commit selection shared by `list` and `export`.
#[derive(Args)]
struct SelectArgs {
    /// Path to the target git repository
    #[arg(long, default_value = ".")]
    repo: PathBuf,

    /// Git date expression, e.g. 2025-01-01
    #[arg(long)]
    since: Option<String>,

    /// Git date expression, e.g. 2025-02-01
    #[arg(long)]
    until: Option<String>,

    /// Git revision range, e.g. A..B
    #[arg(long = "range", value_name = "RANGE")]
    rev_range: Option<String>,
}

impl SelectArgs {
    fn selector(&self) -> RangeSelector {
        RangeSelector {
            since: self.since.clone(),
            until: self.until.clone(),
            range: self.rev_range.clone(),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List commits in the selected range
    List {
        #[command(flatten)]
        select: SelectArgs,
        /// Print a JSON array instead of one line per commit
        #[arg(long)]
        json: bool,
    },
    /// Export patch bodies and dates into size-capped txt file(s)
    Export {
        #[command(flatten)]
        select: SelectArgs,
        /// Output directory
        #[arg(short, long)]
        out_dir: Option<PathBuf>,
        /// Output filename prefix date (YYYY-MM-DD); defaults to the first commit date
        #[arg(long, value_name = "DATE")]
        prefix_date: Option<String>,
        /// Max size per output txt file, in MiB [default: 64]
        #[arg(long, value_name = "MIB")]
        max_mib: Option<f64>,
    },
    /// Turn one patch file into its own {date}_{subject}.txt file
    Extract {
        /// Patch file to read
        #[arg(short = 'i', long = "file", value_name = "FILE")]
        file: PathBuf,
        /// Output directory
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
    /// Generate a man page
    Manpage,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = patchroll::config::load_config();

    let log_level = match cli.verbose {
        0 => config.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    setup_logging(log_level, &config);

    let git = Git::new(config.git.program.as_str());
    let extract = ExtractOptions {
        decode_subject: config.export.decode_subject,
    };

    match cli.command {
        Commands::List { select, json } => cmd_list(&git, &select, json),
        Commands::Export {
            select,
            out_dir,
            prefix_date,
            max_mib,
        } => {
            let out_dir = out_dir
                .or_else(|| config.export.default_output_dir.clone())
                .ok_or_else(|| {
                    anyhow::anyhow!("--out-dir is required (or set export.default_output_dir)")
                })?;
            let max_mib = max_mib.unwrap_or(config.export.max_mib);
            cmd_export(&git, &select, out_dir, prefix_date, max_mib, extract)
        }
        Commands::Extract { file, output } => cmd_extract(&file, &output, &extract),
        Commands::Completions { shell } => cmd_completions(shell),
        Commands::Manpage => cmd_manpage(),
    }
}

/// Install the tracing subscriber: stderr always, plus `patchroll.log` in
/// the cache directory when that directory can be created.
fn setup_logging(level: &str, config: &Config) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    // RUST_LOG wins over -v and the config file
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let log_dir = patchroll::config::cache_dir(config);
    let file_layer = std::fs::create_dir_all(&log_dir).is_ok().then(|| {
        tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(tracing_appender::rolling::never(&log_dir, "patchroll.log"))
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        // None when the log dir is unusable: stderr only
        .with(file_layer)
        .init();
}

/// Print a completion script for `shell` to stdout.
fn cmd_completions(shell: clap_complete::Shell) -> anyhow::Result<()> {
    clap_complete::generate(
        shell,
        &mut Cli::command(),
        env!("CARGO_PKG_NAME"),
        &mut std::io::stdout(),
    );
    Ok(())
}

/// Render the roff man page for every subcommand to stdout.
fn cmd_manpage() -> anyhow::Result<()> {
    let man = clap_mangen::Man::new(Cli::command());
    man.render(&mut std::io::stdout().lock())?;
    Ok(())
}

/// Print the selected commits, oldest first.
fn cmd_list(git: &Git, select: &SelectArgs, json: bool) -> anyhow::Result<()> {
    let commits = range::list_commits(git, &select.repo, &select.selector())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&commits)?);
        return Ok(());
    }

    for commit in &commits {
        println!(
            "{} {} {}",
            commit.date.format("%Y-%m-%d"),
            commit.short_id,
            commit.subject
        );
    }
    Ok(())
}

/// Export the selected range into rolling output files.
fn cmd_export(
    git: &Git,
    select: &SelectArgs,
    out_dir: PathBuf,
    prefix_date: Option<String>,
    max_mib: f64,
    extract: ExtractOptions,
) -> anyhow::Result<()> {
    let max_bytes = archive::max_bytes_from_mib(max_mib)?;
    let options = ExportOptions {
        repo: select.repo.clone(),
        selector: select.selector(),
        output_dir: out_dir,
        prefix_date,
        max_bytes,
        extract,
    };

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} Exporting [{bar:40.cyan/blue}] {pos}/{len}")
            .expect("valid template")
            .progress_chars("#>-"),
    );

    let summary = archive::export_range(
        git,
        &options,
        Some(&|current, total| {
            pb.set_length(total as u64);
            pb.set_position(current as u64);
        }),
    )?;
    pb.finish_and_clear();

    use humansize::{format_size, BINARY};
    println!();
    println!("  Export complete:");
    println!("  {:<25} {}", "Commits selected", summary.commits);
    println!("  {:<25} {}", "Messages exported", summary.records.exported);
    if !summary.records.skipped.is_empty() {
        println!("  {:<25} {}", "Messages skipped", summary.records.skipped.len());
    }
    println!("  {:<25} {}", "Output files", summary.files.len());
    println!(
        "  {:<25} {}",
        "Total size",
        format_size(summary.records.bytes, BINARY)
    );
    println!("  {:<25} {}", "Output directory", options.output_dir.display());
    println!();

    eprintln!(
        "exported {} messages into {} file(s)",
        summary.records.exported,
        summary.files.len()
    );
    Ok(())
}

/// Extract one patch file into its own record file and print the path.
fn cmd_extract(file: &Path, output: &Path, options: &ExtractOptions) -> anyhow::Result<()> {
    let record = extract_record(file, options)?;
    let path = patchroll::export::single::export_single(&record, output)?;
    println!("{}", path.display());
    Ok(())
}
