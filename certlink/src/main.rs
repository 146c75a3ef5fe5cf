//! certlink: Command-line tool for checking certificate files and chains.

use anyhow::{Context, Result};
use certlink_lib::{
    AnalyzeOptions, BatchEntry, BatchInput, BatchSummary, ChainStatus, NameMatcher, SourceFormat,
    DEFAULT_PARTIAL_MATCH_THRESHOLD,
};
use clap::{Parser, Subcommand, ValueEnum};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

#[derive(Parser)]
#[command(
    name = "certlink",
    about = "Check certificate files and report whether they form a complete chain",
    long_about = "certlink reads PEM bundles, DER certificates and PKCS#12 archives,\n\
                  summarizes each certificate, and classifies whether the supplied\n\
                  material forms a complete chain of trust.\n\n\
                  Chains are checked by issuer/subject name linkage only. Signatures,\n\
                  trust stores and revocation are not consulted.",
    after_help = "EXAMPLES:\n\
                  \n  certlink analyze fullchain.pem\
                  \n  certlink analyze --password secret server.pfx\
                  \n  certlink analyze --json --details bundle.crt\
                  \n  certlink analyze --recurse --failures-only /etc/ssl/mine\
                  \n  certlink match \"CN=Issuing CA, O=Example\" \"O=Example, CN=Issuing CA\"\
                  \n  cat chain.pem | certlink analyze"
)]
struct Cli {
    /// Log decoding details to stderr (RUST_LOG takes precedence otherwise)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze certificate files (exit 0 = ok, 1 = a file failed, 2 = --strict and a chain is not complete)
    #[command(after_help = "Input format is taken from the file extension:\n\
                      \n  .pem .crt .cer   text bundle (one or more certificates, leaf first)\
                      \n  .der             single binary certificate\
                      \n  .pfx .p12        PKCS#12 archive (uses --password)\
                      \n\nDirectories are scanned for files with these extensions.\
                      \nStandard input is read when no file is given (default format: pem).\
                      \n\nEXAMPLES:\n\
                      \n  certlink analyze chain.pem\
                      \n  certlink analyze --attime 1700000000 chain.pem\
                      \n  certlink analyze --warn-within 60d chain.pem\
                      \n  certlink analyze --parallel --recurse certs/\
                      \n  CERTLINK_PASSWORD=secret certlink analyze server.p12")]
    Analyze {
        /// Certificate files or directories. Reads from stdin if omitted.
        files: Vec<PathBuf>,
        /// Passphrase for PKCS#12 archives (empty when omitted)
        #[arg(long, env = "CERTLINK_PASSWORD", hide_env_values = true)]
        password: Option<String>,
        /// Input format, overriding the file extension
        #[arg(long, value_enum)]
        format: Option<InputFormat>,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
        /// List every certificate in full, with extensions
        #[arg(long)]
        details: bool,
        /// Evaluate validity at a specific Unix timestamp instead of current time
        #[arg(long, value_name = "EPOCH")]
        attime: Option<i64>,
        /// Report certificates expiring within this window as expiring soon
        #[arg(long, value_name = "DURATION", default_value = "30d")]
        warn_within: String,
        /// Shared name attributes required for a partial issuer match
        #[arg(long, value_name = "N", default_value_t = DEFAULT_PARTIAL_MATCH_THRESHOLD)]
        partial_threshold: usize,
        /// Recurse into subdirectories
        #[arg(short, long)]
        recurse: bool,
        /// Analyze files in parallel
        #[arg(long)]
        parallel: bool,
        /// Only print files that failed or whose chain is not complete
        #[arg(long)]
        failures_only: bool,
        /// Exit with status 2 when any analyzed chain is not complete
        #[arg(long)]
        strict: bool,
    },
    /// Show which name-matching rule links an issuer to a subject (exit 0 = linked, 1 = not)
    #[command(after_help = "Rules, strongest first: exact, normalized (attribute order ignored),\n\
                      common name, partial (shared attributes), broken.\n\
                      \nEXAMPLES:\n\
                      \n  certlink match \"CN=CA, O=Example\" \"O=Example, CN=CA\"\
                      \n  certlink match --partial-threshold 3 \"CN=A, O=X, C=US\" \"CN=B, O=X, C=US\"")]
    Match {
        /// Issuer summary of the issued certificate
        issuer: String,
        /// Subject summary of the candidate issuer certificate
        subject: String,
        /// Shared name attributes required for a partial match
        #[arg(long, value_name = "N", default_value_t = DEFAULT_PARTIAL_MATCH_THRESHOLD)]
        partial_threshold: usize,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum InputFormat {
    Pem,
    Der,
    #[value(alias = "pfx")]
    P12,
}

impl From<InputFormat> for SourceFormat {
    fn from(format: InputFormat) -> Self {
        match format {
            InputFormat::Pem => SourceFormat::TextBundle,
            InputFormat::Der => SourceFormat::BinarySingle,
            InputFormat::P12 => SourceFormat::Pkcs12,
        }
    }
}

/// Maximum file size for certificate inputs (10 MiB).
const MAX_INPUT_BYTES: u64 = 10 * 1024 * 1024;

fn read_input(file: Option<&Path>) -> Result<Vec<u8>> {
    match file {
        Some(path) => {
            let meta = std::fs::metadata(path)
                .with_context(|| format!("Failed to stat file: {}", path.display()))?;
            if meta.len() > MAX_INPUT_BYTES {
                anyhow::bail!(
                    "File too large ({} bytes, max {} bytes): {}",
                    meta.len(),
                    MAX_INPUT_BYTES,
                    path.display()
                );
            }
            std::fs::read(path).with_context(|| format!("Failed to read file: {}", path.display()))
        }
        None => {
            let mut buf = Vec::new();
            std::io::stdin()
                .take(MAX_INPUT_BYTES)
                .read_to_end(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

/// Parse a duration string using humantime format.
///
/// Plain numbers (e.g. "3600") default to seconds.
fn parse_duration(s: &str) -> Result<Duration> {
    if s.chars().all(|c| c.is_ascii_digit()) {
        let secs: u64 = s.parse().context("Invalid duration value")?;
        return Ok(Duration::from_secs(secs));
    }
    humantime::parse_duration(s).with_context(|| format!("Invalid duration: '{s}'"))
}

/// Whole days in a duration, for the expiring-soon window.
fn whole_days(duration: Duration) -> i64 {
    i64::try_from(duration.as_secs() / 86_400).unwrap_or(i64::MAX)
}

/// Check if a path has a certificate file extension.
fn is_cert_file(path: &Path) -> bool {
    SourceFormat::from_path(path).is_some()
}

/// Find all certificate files in a directory, sorted.
fn find_cert_files(dir: &Path, recurse: bool) -> Vec<PathBuf> {
    let walker = if recurse {
        walkdir::WalkDir::new(dir)
    } else {
        walkdir::WalkDir::new(dir).max_depth(1)
    };
    let mut files: Vec<PathBuf> = walker
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && is_cert_file(e.path()))
        .map(|e| e.into_path())
        .collect();
    files.sort();
    files
}

/// Expand directory arguments into the certificate files they contain.
fn expand_paths(paths: &[PathBuf], recurse: bool) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            files.extend(find_cert_files(path, recurse));
        } else {
            files.push(path.clone());
        }
    }
    files
}

fn load_input(
    path: &Path,
    format: Option<InputFormat>,
    password: Option<&str>,
) -> Result<BatchInput> {
    let format = match format {
        Some(f) => f.into(),
        None => SourceFormat::from_path(path).with_context(|| {
            format!(
                "Unrecognized certificate file extension (use --format): {}",
                path.display()
            )
        })?,
    };
    Ok(BatchInput {
        path: path.to_path_buf(),
        data: read_input(Some(path))?,
        format,
        passphrase: password.map(str::to_string),
    })
}

/// Analyze the loaded inputs and return one entry per slot, in slot order.
/// Slots that failed to load keep their error entry.
fn run_batch(
    slots: Vec<Result<BatchInput, BatchEntry>>,
    options: &AnalyzeOptions,
    parallel: bool,
) -> Vec<BatchEntry> {
    let mut inputs = Vec::new();
    let mut positions: Vec<Option<BatchEntry>> = Vec::with_capacity(slots.len());
    for slot in slots {
        match slot {
            Ok(input) => {
                inputs.push(input);
                positions.push(None);
            }
            Err(entry) => positions.push(Some(entry)),
        }
    }

    let analyzed = if parallel {
        certlink_lib::analyze_many_parallel(&inputs, options)
    } else {
        certlink_lib::analyze_many_with_progress(&inputs, options, |progress| {
            debug!(
                completed = progress.completed,
                total = progress.total,
                path = %progress.entry.path.display(),
                "batch progress"
            );
        })
    };

    let mut analyzed = analyzed.into_iter();
    positions
        .into_iter()
        .filter_map(|slot| slot.or_else(|| analyzed.next()))
        .collect()
}

/// True when an entry should be shown under `--failures-only`.
fn needs_attention(entry: &BatchEntry) -> bool {
    match &entry.outcome {
        Ok(result) => matches!(
            result.chain.status,
            ChainStatus::Incomplete | ChainStatus::Failed
        ),
        Err(_) => true,
    }
}

fn print_entry(entry: &BatchEntry, details: bool, with_header: bool) {
    match &entry.outcome {
        Ok(result) => {
            if with_header {
                println!("==> {} <==", entry.path.display());
            }
            print!("{}", certlink_lib::render_text(result, details));
        }
        Err(e) => {
            eprint!("{}: {}", entry.path.display(), certlink_lib::render_error(e));
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        tracing_subscriber::EnvFilter::new("debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Analyze {
            files,
            password,
            format,
            json,
            details,
            attime,
            warn_within,
            partial_threshold,
            recurse,
            parallel,
            failures_only,
            strict,
        } => {
            let options = AnalyzeOptions {
                at_time: *attime,
                expiring_soon_days: whole_days(parse_duration(warn_within)?),
                partial_match_threshold: *partial_threshold,
            };

            // Stdin mode
            if files.is_empty() {
                let input = read_input(None)?;
                let format = format.unwrap_or(InputFormat::Pem).into();
                let result = match certlink_lib::analyze_with_options(
                    &input,
                    format,
                    password.as_deref(),
                    &options,
                ) {
                    Ok(r) => r,
                    Err(e) => {
                        eprint!("{}", certlink_lib::render_error(&e));
                        std::process::exit(1);
                    }
                };
                if *json {
                    println!("{}", certlink_lib::to_json(&result)?);
                } else {
                    print!("{}", certlink_lib::render_text(&result, *details));
                }
                if *strict && !result.is_complete() {
                    std::process::exit(2);
                }
                return Ok(());
            }

            let paths = expand_paths(files, *recurse);
            let slots = paths
                .iter()
                .map(|path| {
                    load_input(path, *format, password.as_deref()).map_err(|e| {
                        let reason = format!("{e:#}");
                        debug!(path = %path.display(), %reason, "input not loaded");
                        BatchEntry::unreadable(path, std::io::Error::other(reason))
                    })
                })
                .collect();
            let entries = run_batch(slots, &options, *parallel);

            let shown: Vec<&BatchEntry> = entries
                .iter()
                .filter(|e| !*failures_only || needs_attention(e))
                .collect();

            if *json {
                println!("{}", serde_json::to_string_pretty(&shown)?);
            } else {
                let with_header = paths.len() > 1;
                for (i, entry) in shown.iter().enumerate() {
                    if with_header && i > 0 {
                        println!();
                    }
                    print_entry(entry, *details, with_header);
                }
            }

            let summary = BatchSummary::from_entries(&entries);
            if !*json && paths.len() > 1 {
                println!();
                println!("{}", summary);
            }

            if summary.failed > 0 {
                std::process::exit(1);
            }
            if *strict && summary.complete_chains < summary.succeeded {
                std::process::exit(2);
            }
        }
        Commands::Match {
            issuer,
            subject,
            partial_threshold,
            json,
        } => {
            let strength = NameMatcher::new(*partial_threshold).classify(issuer, subject);
            if *json {
                let out = serde_json::json!({
                    "strength": strength,
                    "linked": strength.is_strong(),
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                println!("{}", strength);
            }
            if !strength.is_strong() {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
