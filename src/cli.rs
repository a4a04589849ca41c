// Command-line interface for bookcoder.
//
// `map` turns an input stream into a book code against a book file;
// `extract` reverses it. Either side of the transform can ride stdin or
// stdout, so the code stream pipes cleanly into and out of a compressor.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::PathBuf;
use std::process;

use clap::{ArgAction, Args, Parser, Subcommand, ValueHint};

use crate::codec::DEFAULT_BUFFER_SIZE;
use crate::codec::decoder::DecodeOptions;
use crate::codec::encoder::EncodeOptions;
use crate::engine;

const BUF_SIZE: usize = 64 * 1024;

// ---------------------------------------------------------------------------
// Byte size parsing (supports B, K, M, G suffixes)
// ---------------------------------------------------------------------------

fn parse_byte_size(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty size string".into());
    }
    let (num_part, multiplier) = match s.as_bytes().last() {
        Some(b'b' | b'B') => (&s[..s.len() - 1], 1u64),
        Some(b'k' | b'K') => (&s[..s.len() - 1], 1024u64),
        Some(b'm' | b'M') => (&s[..s.len() - 1], 1024 * 1024),
        Some(b'g' | b'G') => (&s[..s.len() - 1], 1024 * 1024 * 1024),
        _ => (s, 1u64),
    };
    let num: u64 = num_part
        .trim()
        .parse()
        .map_err(|e| format!("invalid size '{s}': {e}"))?;
    num.checked_mul(multiplier)
        .ok_or_else(|| format!("size overflow: '{s}'"))
}

// ---------------------------------------------------------------------------
// Clap CLI definition
// ---------------------------------------------------------------------------

/// Digital book cipher: map file bytes to book offsets and back.
#[derive(Parser, Debug)]
#[command(
    name = "bookcoder",
    version,
    about = "Digital book cipher: map file bytes to book offsets and back",
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Cmd,

    /// Force overwrite existing output files.
    #[arg(short = 'f', long, global = true)]
    force: bool,

    /// Quiet mode (suppress non-error output).
    #[arg(short = 'q', long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Verbose mode (use multiple times for more detail).
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Output stats as JSON to stderr.
    #[arg(long = "json", global = true)]
    json_output: bool,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Map input bytes to offsets in the book file, producing a book code.
    Map(MapArgs),
    /// Extract the original bytes from a book code.
    Extract(ExtractArgs),
}

#[derive(Args, Debug)]
struct MapArgs {
    /// Book file serving as the offset corpus.
    #[arg(long, short = 'b', value_hint = ValueHint::FilePath)]
    book: PathBuf,

    /// Input file (default: stdin).
    #[arg(long, value_hint = ValueHint::FilePath, conflicts_with = "input_pos")]
    input: Option<PathBuf>,

    /// Output file for the book code (default: stdout).
    #[arg(long, value_hint = ValueHint::FilePath, conflicts_with = "output_pos")]
    output: Option<PathBuf>,

    /// Write the book code to stdout.
    #[arg(short = 'c', long)]
    stdout: bool,

    /// Allow an offset to repeat the last one used for the same byte value.
    #[arg(short = 'd', long)]
    duplicates: bool,

    /// Restart the book scan at offset 0 at every window end. Keeps
    /// offsets small and the code stream compressible, but only the first
    /// window's entropy is ever used.
    #[arg(short = 'r', long = "reset-at-window-end")]
    reset_at_window_end: bool,

    /// Book window size (supports B/K/M/G suffix).
    #[arg(long = "book-window-size", value_parser = parse_byte_size, default_value_t = DEFAULT_BUFFER_SIZE as u64)]
    book_window_size: u64,

    /// Input chunk size (supports B/K/M/G suffix).
    #[arg(long = "input-chunk-size", value_parser = parse_byte_size, default_value_t = DEFAULT_BUFFER_SIZE as u64)]
    input_chunk_size: u64,

    /// Input file (positional form).
    #[arg(value_hint = ValueHint::FilePath)]
    input_pos: Option<PathBuf>,

    /// Output file (positional form).
    #[arg(value_hint = ValueHint::FilePath)]
    output_pos: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ExtractArgs {
    /// Book file serving as the offset corpus.
    #[arg(long, short = 'b', value_hint = ValueHint::FilePath)]
    book: PathBuf,

    /// Book code file (default: stdin).
    #[arg(long, value_hint = ValueHint::FilePath, conflicts_with = "input_pos")]
    input: Option<PathBuf>,

    /// Output file (default: stdout).
    #[arg(long, value_hint = ValueHint::FilePath, conflicts_with = "output_pos")]
    output: Option<PathBuf>,

    /// Write the extracted bytes to stdout.
    #[arg(short = 'c', long)]
    stdout: bool,

    /// Code chunk size (supports B/K/M/G suffix).
    #[arg(long = "code-chunk-size", value_parser = parse_byte_size, default_value_t = DEFAULT_BUFFER_SIZE as u64)]
    code_chunk_size: u64,

    /// Output chunk size (supports B/K/M/G suffix).
    #[arg(long = "output-chunk-size", value_parser = parse_byte_size, default_value_t = DEFAULT_BUFFER_SIZE as u64)]
    output_chunk_size: u64,

    /// Book code file (positional form).
    #[arg(value_hint = ValueHint::FilePath)]
    input_pos: Option<PathBuf>,

    /// Output file (positional form).
    #[arg(value_hint = ValueHint::FilePath)]
    output_pos: Option<PathBuf>,
}

#[cfg(any(test, feature = "fuzzing"))]
pub fn fuzz_try_parse_args(args: &[String]) {
    let argv: Vec<String> = std::iter::once("bookcoder".to_string())
        .chain(args.iter().cloned())
        .collect();
    let _ = Cli::try_parse_from(argv);
}

// ---------------------------------------------------------------------------
// Stream selection
// ---------------------------------------------------------------------------

fn open_input(path: &Option<PathBuf>) -> Result<Box<dyn Read>, i32> {
    match path {
        Some(path) => match File::open(path) {
            Ok(f) => Ok(Box::new(BufReader::with_capacity(BUF_SIZE, f))),
            Err(e) => {
                eprintln!("bookcoder: input file: {}: {e}", path.display());
                Err(1)
            }
        },
        None => Ok(Box::new(BufReader::new(io::stdin()))),
    }
}

fn open_output(
    use_stdout: bool,
    path: &Option<PathBuf>,
    force: bool,
) -> Result<Box<dyn Write>, i32> {
    match (use_stdout, path) {
        (true, _) | (_, None) => Ok(Box::new(BufWriter::with_capacity(
            BUF_SIZE,
            io::stdout().lock(),
        ))),
        (false, Some(path)) => {
            if path.exists() && !force {
                eprintln!(
                    "bookcoder: output file exists, use -f to overwrite: {}",
                    path.display()
                );
                return Err(1);
            }
            match File::create(path) {
                Ok(f) => Ok(Box::new(BufWriter::with_capacity(BUF_SIZE, f))),
                Err(e) => {
                    eprintln!("bookcoder: output file: {}: {e}", path.display());
                    Err(1)
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Map command
// ---------------------------------------------------------------------------

fn cmd_map(cli: &Cli, args: &MapArgs) -> i32 {
    let opts = EncodeOptions {
        window_size: args.book_window_size as usize,
        input_chunk_size: args.input_chunk_size as usize,
        allow_duplicates: args.duplicates,
        reset_at_window_end: args.reset_at_window_end,
    };

    let book = match File::open(&args.book) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("bookcoder: book file: {}: {e}", args.book.display());
            return 1;
        }
    };

    let input_file = args.input.clone().or(args.input_pos.clone());
    let output_file = args.output.clone().or(args.output_pos.clone());

    let input = match open_input(&input_file) {
        Ok(r) => r,
        Err(code) => return code,
    };
    let mut output = match open_output(args.stdout, &output_file, cli.force) {
        Ok(w) => w,
        Err(code) => return code,
    };

    let summary = match engine::run_encode(book, input, &mut output, &opts) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("bookcoder: map error: {e}");
            return 1;
        }
    };
    if let Err(e) = output.flush() {
        eprintln!("bookcoder: write flush error: {e}");
        return 1;
    }

    if !cli.quiet {
        eprintln!(
            "bookcoder: book code created ({} codes, {} window loads)",
            summary.codes_written, summary.windows_loaded
        );
    }
    if cli.json_output {
        let json = serde_json::json!({
            "command": "map",
            "input_bytes": summary.input_bytes,
            "codes_written": summary.codes_written,
            "windows_loaded": summary.windows_loaded,
        });
        eprintln!("{}", serde_json::to_string_pretty(&json).unwrap());
    }

    0
}

// ---------------------------------------------------------------------------
// Extract command
// ---------------------------------------------------------------------------

fn cmd_extract(cli: &Cli, args: &ExtractArgs) -> i32 {
    let opts = DecodeOptions {
        code_chunk_size: args.code_chunk_size as usize,
        output_chunk_size: args.output_chunk_size as usize,
    };

    let book = match File::open(&args.book) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("bookcoder: book file: {}: {e}", args.book.display());
            return 1;
        }
    };

    let input_file = args.input.clone().or(args.input_pos.clone());
    let output_file = args.output.clone().or(args.output_pos.clone());

    let codes = match open_input(&input_file) {
        Ok(r) => r,
        Err(code) => return code,
    };
    let mut output = match open_output(args.stdout, &output_file, cli.force) {
        Ok(w) => w,
        Err(code) => return code,
    };

    let summary = match engine::run_decode(book, codes, &mut output, &opts) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("bookcoder: extract error: {e}");
            return 1;
        }
    };
    if let Err(e) = output.flush() {
        eprintln!("bookcoder: write flush error: {e}");
        return 1;
    }

    if !cli.quiet {
        eprintln!(
            "bookcoder: extracted {} bytes from the book code",
            summary.output_bytes
        );
    }
    if cli.json_output {
        let json = serde_json::json!({
            "command": "extract",
            "code_bytes": summary.code_bytes,
            "output_bytes": summary.output_bytes,
        });
        eprintln!("{}", serde_json::to_string_pretty(&json).unwrap());
    }

    0
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Main CLI entry point. Parses arguments via clap, dispatches commands.
pub fn run() -> ! {
    let cli = Cli::parse();

    // Verbosity maps onto the log filter: warnings by default, then
    // info/debug/trace as -v accumulates.
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter))
        .format_timestamp(None)
        .format_target(false)
        .init();

    let exit_code = match &cli.command {
        Cmd::Map(args) => cmd_map(&cli, args),
        Cmd::Extract(args) => cmd_extract(&cli, args),
    };

    process::exit(exit_code);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
