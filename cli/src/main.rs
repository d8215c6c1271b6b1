//! cpr - Clone or copy
//!
//! Clone a file, or stitch a byte range of one file into another, sharing
//! extents where the filesystem allows it. Powered by the cpr library.

use clap::{ArgAction, Parser, ValueEnum};
use cpr::{
    CloneMode, CloneRequest, CopyOptions, DEFAULT_BLOCK_SIZE, Error as CprError, ErrorCode,
    Outcome, Preserve, clone_or_copy, preserve_attributes,
};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::{Value, json};
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// cpr - Clone a file or a byte range, optionally falling back to a copy
///
/// Usage:
///   cpr [-aotp] [-f] [-c] [-b BLOCK_SIZE] SOURCE DEST
///   cpr [-s SRC_OFFSET] [-d DST_OFFSET] [-l LENGTH] [-aotp] [-c] SOURCE DEST
///
/// Giving any of -s, -d or -l selects range mode. Numbers may be decimal,
/// 0x-prefixed hexadecimal or 0-prefixed octal.
#[derive(Parser, Debug)]
#[command(name = "cpr", version, about, long_about = None)]
struct Args {
    /// Source file
    source: PathBuf,

    /// Destination file
    destination: PathBuf,

    /// Preserve ownership, timestamps and permissions (same as -otp)
    #[arg(short = 'a', long = "archive")]
    all: bool,

    /// Preserve ownership
    #[arg(short = 'o', long = "owner")]
    owner: bool,

    /// Preserve timestamps
    #[arg(short = 't', long = "times")]
    times: bool,

    /// Preserve permissions
    #[arg(short = 'p', long = "perms")]
    permissions: bool,

    /// Overwrite an existing destination (whole-file mode)
    #[arg(short = 'f', long)]
    force: bool,

    /// Fall back to a read/write copy if cloning fails
    #[arg(short = 'c', long = "copy")]
    fallback: bool,

    /// Offset into the source (range mode)
    #[arg(short = 's', long = "src-offset", value_name = "OFFSET", value_parser = parse_number)]
    src_offset: Option<u64>,

    /// Offset into the destination (range mode)
    #[arg(short = 'd', long = "dst-offset", value_name = "OFFSET", value_parser = parse_number)]
    dst_offset: Option<u64>,

    /// Number of bytes, 0 meaning to the end of the source (range mode)
    #[arg(short = 'l', long = "length", value_name = "LENGTH", value_parser = parse_number)]
    length: Option<u64>,

    /// Buffer size for the fallback copy
    #[arg(
        short = 'b',
        long = "block-size",
        value_name = "BYTES",
        default_value_t = DEFAULT_BLOCK_SIZE,
        value_parser = parse_block_size
    )]
    block_size: usize,

    /// Output format
    #[arg(long, value_enum, default_value = "human")]
    output: OutputMode,

    /// Disable the spinner
    #[arg(short = 'q', long)]
    quiet: bool,

    /// Verbose output (-v summary, -vv debug logging)
    #[arg(short = 'v', long, action = ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn mode(&self) -> CloneMode {
        if self.src_offset.is_none() && self.dst_offset.is_none() && self.length.is_none() {
            return CloneMode::WholeFile;
        }
        CloneMode::range(
            self.src_offset.unwrap_or(0),
            self.dst_offset.unwrap_or(0),
            self.length.unwrap_or(0),
        )
    }

    fn preserve(&self) -> Preserve {
        if self.all {
            return Preserve::ALL;
        }
        Preserve {
            owner: self.owner,
            times: self.times,
            permissions: self.permissions,
        }
    }

    fn copy_options(&self) -> CopyOptions {
        let options = CopyOptions::default().with_block_size(self.block_size);
        if self.fallback {
            options.with_fallback()
        } else {
            options
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
enum OutputMode {
    Human,
    Json,
}

type CliResult<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
enum CliError {
    #[error("Failed to open source: {path}: {source}")]
    OpenSource { path: PathBuf, source: io::Error },

    #[error("Failed to open destination: {path}: {source}")]
    OpenDestination { path: PathBuf, source: io::Error },

    #[error("Failed to clone {from} into {path}: {source}")]
    Clone {
        from: PathBuf,
        path: PathBuf,
        source: CprError,
    },

    #[error("Failed to preserve attributes on {path}: {source}")]
    Preserve { path: PathBuf, source: CprError },

    #[error("Failed to sync destination: {path}: {source}")]
    Sync { path: PathBuf, source: io::Error },

    #[error("Failed to serialize JSON output: {source}")]
    JsonSerialize { source: serde_json::Error },
}

impl CliError {
    fn code(&self) -> ErrorCode {
        match self {
            Self::OpenSource { source, .. }
            | Self::OpenDestination { source, .. }
            | Self::Sync { source, .. } => io_error_code(source),
            Self::Clone { source, .. } | Self::Preserve { source, .. } => source.code(),
            Self::JsonSerialize { .. } => ErrorCode::IoError,
        }
    }
}

fn io_error_code(error: &io::Error) -> ErrorCode {
    if error.kind() == io::ErrorKind::PermissionDenied {
        return ErrorCode::PermissionDenied;
    }
    ErrorCode::IoError
}

fn exit_code_for(code: ErrorCode) -> i32 {
    match code {
        ErrorCode::InvalidArgument => 2,
        _ => 1,
    }
}

fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    if let Err(error) = run(&args) {
        eprintln!("error[{}]: {}", error.code(), error);
        std::process::exit(exit_code_for(error.code()));
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run(args: &Args) -> CliResult<()> {
    let mode = args.mode();
    let result = execute(args, mode);

    match args.output {
        OutputMode::Human => {
            if let Ok(outcome) = &result {
                if args.verbose > 0 {
                    print_summary(args, *outcome);
                }
            }
        }
        OutputMode::Json => emit_json(args, mode, &result)?,
    }

    result.map(|_| ())
}

fn execute(args: &Args, mode: CloneMode) -> CliResult<Outcome> {
    let src = File::open(&args.source).map_err(|source| CliError::OpenSource {
        path: args.source.clone(),
        source,
    })?;
    let dst = open_destination(&args.destination, mode, args.force).map_err(|source| {
        CliError::OpenDestination {
            path: args.destination.clone(),
            source,
        }
    })?;

    tracing::debug!(
        source = %args.source.display(),
        destination = %args.destination.display(),
        mode = mode.as_str(),
        "opened files"
    );

    let spinner = if args.output == OutputMode::Human && !args.quiet {
        create_spinner(&args.source)
    } else {
        None
    };

    let request = CloneRequest {
        src: &src,
        dst: &dst,
        mode,
    };
    let result = clone_or_copy(request, &args.copy_options());

    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    let outcome = result.map_err(|source| CliError::Clone {
        from: args.source.clone(),
        path: args.destination.clone(),
        source,
    })?;

    preserve_attributes(&src, &dst, args.preserve()).map_err(|source| CliError::Preserve {
        path: args.destination.clone(),
        source,
    })?;

    dst.sync_all().map_err(|source| CliError::Sync {
        path: args.destination.clone(),
        source,
    })?;

    tracing::info!(outcome = outcome.as_str(), "done");

    Ok(outcome)
}

/// Open the destination the way the mode requires.
///
/// Whole-file destinations must be new unless `force` is given, in which
/// case an existing file is truncated. Range destinations are created if
/// missing and never truncated.
fn open_destination(path: &Path, mode: CloneMode, force: bool) -> io::Result<File> {
    let mut options = OpenOptions::new();
    options.write(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o666);
    }

    match mode {
        CloneMode::Range { .. } => options.create(true).open(path),
        CloneMode::WholeFile => match options.clone().create_new(true).open(path) {
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists && force => {
                options.truncate(true).open(path)
            }
            other => other,
        },
    }
}

fn create_spinner(source: &Path) -> Option<ProgressBar> {
    let style = ProgressStyle::default_spinner()
        .template("{spinner:.green} {msg}")
        .ok()?;
    let pb = ProgressBar::new_spinner();
    pb.set_style(style);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(format!("Cloning {}...", source.display()));
    Some(pb)
}

fn print_summary(args: &Args, outcome: Outcome) {
    match outcome {
        Outcome::Cloned => println!(
            "Cloned {} -> {}",
            args.source.display(),
            args.destination.display()
        ),
        Outcome::Copied { bytes } => println!(
            "Copied {} {} -> {}",
            format_bytes(bytes),
            args.source.display(),
            args.destination.display()
        ),
    }
}

fn emit_json(args: &Args, mode: CloneMode, result: &CliResult<Outcome>) -> CliResult<()> {
    let mut obj = serde_json::Map::new();
    obj.insert("schema_version".to_owned(), Value::String("1.0".to_owned()));
    obj.insert("source".to_owned(), json!(display_path(&args.source)));
    obj.insert(
        "destination".to_owned(),
        json!(display_path(&args.destination)),
    );
    obj.insert("mode".to_owned(), json!(mode.as_str()));

    match result {
        Ok(outcome) => {
            obj.insert("outcome".to_owned(), json!(outcome.as_str()));
            let bytes = match outcome {
                Outcome::Cloned => Value::Null,
                Outcome::Copied { bytes } => Value::Number((*bytes).into()),
            };
            obj.insert("bytes_copied".to_owned(), bytes);
        }
        Err(error) => {
            obj.insert("outcome".to_owned(), json!("failed"));
            obj.insert("bytes_copied".to_owned(), Value::Null);
            obj.insert("error_code".to_owned(), json!(error.code().as_str()));
            obj.insert("error_message".to_owned(), json!(error.to_string()));
        }
    }

    print_json_value(&Value::Object(obj))
}

fn print_json_value(value: &Value) -> CliResult<()> {
    let serialized =
        serde_json::to_string(value).map_err(|source| CliError::JsonSerialize { source })?;
    println!("{serialized}");
    Ok(())
}

fn display_path(path: &Path) -> String {
    path.display().to_string()
}

fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;
    const TB: u64 = GB * 1024;

    if bytes >= TB {
        format!("{:.2} TB", bytes as f64 / TB as f64)
    } else if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Parse a decimal, `0x` hexadecimal or `0`-prefixed octal number.
fn parse_number(value: &str) -> Result<u64, String> {
    let (digits, radix) = if let Some(hex) = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
    {
        (hex, 16)
    } else if value.len() > 1 && value.starts_with('0') {
        (&value[1..], 8)
    } else {
        (value, 10)
    };

    // from_str_radix tolerates a leading sign
    if digits.is_empty() || digits.starts_with(['+', '-']) {
        return Err(format!("invalid number '{value}'"));
    }
    u64::from_str_radix(digits, radix).map_err(|e| format!("invalid number '{value}': {e}"))
}

fn parse_block_size(value: &str) -> Result<usize, String> {
    let size = parse_number(value)?;
    let size = usize::try_from(size).map_err(|_| format!("block size {size} is too large"))?;
    if size == 0 {
        return Err("block size must be greater than zero".to_owned());
    }
    Ok(size)
}
