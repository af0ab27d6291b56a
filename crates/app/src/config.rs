//! Configuration for the bytecodec application.
//!
//! Handles parsing command-line arguments and generating sensible defaults
//! (including a time-based seed that is printed so runs are reproducible).
//!
//! # Philosophy
//!
//! The tool should work with ZERO arguments: it generates a sample, frames it
//! with the default codec, writes it, reads it back and checks the result.

use std::path::PathBuf;
use std::str::FromStr;

use bytecodec_core::framing::DEFAULT_MAX_RAW_LEN;
use bytecodec_core::CodecKind;
use tracing::warn;

/// Sample size used when no input file is given
pub const DEFAULT_SAMPLE_BYTES: usize = 4096;

/// Largest sample the generator produces
pub const MAX_SAMPLE_BYTES: usize = 8192;

/// What a run does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Compress, write the frame, read it back, decompress, compare
    RoundTrip,
    /// Compress the input into a frame file
    Compress,
    /// Restore a frame file
    Decompress,
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "roundtrip" | "round-trip" => Ok(Mode::RoundTrip),
            "compress" | "c" => Ok(Mode::Compress),
            "decompress" | "d" => Ok(Mode::Decompress),
            _ => Err(format!(
                "unknown mode: {s}. Available: roundtrip, compress, decompress"
            )),
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::RoundTrip => write!(f, "roundtrip"),
            Mode::Compress => write!(f, "compress"),
            Mode::Decompress => write!(f, "decompress"),
        }
    }
}

/// Complete configuration for a run.
#[derive(Debug, Clone)]
pub struct Config {
    // === Operation ===
    pub mode: Mode,

    /// Codec used for compression (decompression reads it from the frame)
    pub codec: CodecKind,

    // === Files ===
    /// Input file path (None = generate sample)
    pub input_file: Option<PathBuf>,

    /// Output file path
    pub output_file: PathBuf,

    // === Sample ===
    /// Seed for the sample generator
    pub seed: u64,

    /// Size of the generated sample
    pub sample_bytes: usize,

    // === Limits ===
    /// Largest raw size accepted for compression or restored from a frame
    pub max_raw_bytes: usize,

    // === Behavior ===
    /// Whether to print detailed config
    pub print_config: bool,

    /// Whether to print detailed metrics summary
    pub print_metrics: bool,

    /// Whether to preview input and restored bytes
    pub dump: bool,

    /// `--help` was given; nothing else should run
    pub help: bool,
}

/// Fetch the value following a flag.
fn value<'a>(args: &'a [String], i: &mut usize, what: &str) -> Result<&'a str, String> {
    *i += 1;
    args.get(*i)
        .map(String::as_str)
        .ok_or_else(|| format!("{} requires {what}", args[*i - 1]))
}

impl Config {
    /// Parse configuration from command-line arguments.
    ///
    /// If no seed is provided, a time-based one is used; either way it is
    /// recorded in the config so the sample can be regenerated.
    pub fn from_args(args: &[String]) -> Result<Self, String> {
        let mut mode = Mode::RoundTrip;
        let mut codec = CodecKind::default();
        let mut input_file: Option<PathBuf> = None;
        let mut output_file: Option<PathBuf> = None;
        let mut seed: Option<u64> = None;
        let mut sample_bytes: Option<usize> = None;
        let mut max_raw_bytes = DEFAULT_MAX_RAW_LEN;
        let mut print_config = false;
        let mut print_metrics = true;
        let mut dump = false;
        let mut help = false;

        let mut i = 0;
        while i < args.len() {
            match args[i].as_str() {
                "--mode" => {
                    mode = value(args, &mut i, "a mode")?.parse()?;
                }
                "--codec" => {
                    codec = value(args, &mut i, "a codec name")?.parse()?;
                }
                "--in" => {
                    input_file = Some(PathBuf::from(value(args, &mut i, "a path")?));
                }
                "--out" => {
                    output_file = Some(PathBuf::from(value(args, &mut i, "a path")?));
                }
                "--seed" => {
                    let raw = value(args, &mut i, "a number")?;
                    seed = Some(raw.parse().map_err(|_| format!("invalid seed: {raw}"))?);
                }
                "--sample-bytes" => {
                    let raw = value(args, &mut i, "a number")?;
                    sample_bytes =
                        Some(raw.parse().map_err(|_| format!("invalid sample-bytes: {raw}"))?);
                }
                "--max-raw-bytes" => {
                    let raw = value(args, &mut i, "a number")?;
                    max_raw_bytes =
                        raw.parse().map_err(|_| format!("invalid max-raw-bytes: {raw}"))?;
                }
                "--print-config" => {
                    print_config = true;
                }
                "--dump" => {
                    dump = true;
                }
                "--no-metrics" => {
                    print_metrics = false;
                }
                "--help" | "-h" => {
                    help = true;
                }
                other => {
                    return Err(format!("unknown argument: {other}"));
                }
            }
            i += 1;
        }

        if mode == Mode::Decompress && input_file.is_none() && !help {
            return Err("--mode decompress requires --in <FRAME>".to_string());
        }

        // Determine seed (explicit or time-based)
        let seed = seed.unwrap_or_else(|| {
            use std::time::{SystemTime, UNIX_EPOCH};
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map_or(0, |t| t.as_millis() as u64)
        });

        let mut sample_bytes = sample_bytes.unwrap_or(DEFAULT_SAMPLE_BYTES);
        if sample_bytes > MAX_SAMPLE_BYTES {
            warn!(
                requested = sample_bytes,
                max = MAX_SAMPLE_BYTES,
                "sample size capped"
            );
            sample_bytes = MAX_SAMPLE_BYTES;
        }

        let output_file = output_file.unwrap_or_else(|| match mode {
            Mode::Decompress => PathBuf::from("./out.bin"),
            Mode::RoundTrip | Mode::Compress => PathBuf::from("./out.bcdc"),
        });

        Ok(Config {
            mode,
            codec,
            input_file,
            output_file,
            seed,
            sample_bytes,
            max_raw_bytes,
            print_config,
            print_metrics,
            dump,
            help,
        })
    }

    /// Print the configuration in human-readable form.
    pub fn print(&self) {
        println!("=== Configuration ===");
        println!("Mode:        {}", self.mode);
        println!("Codec:       {}", self.codec);
        match &self.input_file {
            Some(path) => println!("Input file:  {}", path.display()),
            None => println!("Input file:  (generate sample)"),
        }
        println!("Output file: {}", self.output_file.display());
        println!("Raw limit:   {} bytes", self.max_raw_bytes);
        println!();
        if self.input_file.is_none() {
            println!("=== Sample ===");
            println!("Seed: {}", self.seed);
            println!("Size: {} bytes", self.sample_bytes);
            println!();
        }
    }
}

pub fn print_help() {
    println!("bytecodec: Fixed-buffer RLE, Huffman and LZ77 byte codecs");
    println!();
    println!("USAGE:");
    println!("    bytecodec [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    --mode <MODE>           roundtrip | compress | decompress (default: roundtrip)");
    println!("    --codec <CODEC>         rle | huffman | lz77 | lz77-tagged | stored");
    println!("                            (default: huffman)");
    println!("    --in <PATH>             Input file (default: generate sample)");
    println!("    --out <PATH>            Output file (default: ./out.bcdc;");
    println!("                            ./out.bin when decompressing)");
    println!();
    println!("    --seed <N>              Sample generator seed (default: time-based)");
    println!("    --sample-bytes <N>      Generated sample size (default: 4096, max: 8192)");
    println!();
    println!("    --max-raw-bytes <N>     Largest raw size to compress or restore");
    println!("                            (default: 64 MiB)");
    println!();
    println!("    --dump                  Preview input and restored bytes as hex/ASCII");
    println!("    --print-config          Print resolved configuration");
    println!("    --no-metrics            Don't print metrics summary");
    println!("    --help, -h              Print this help");
    println!();
    println!("EXAMPLES:");
    println!("    bytecodec                                       # Round-trip a random sample");
    println!("    bytecodec --seed 42 --codec lz77                # Deterministic LZ77 run");
    println!("    bytecodec --mode compress --in notes.txt --out notes.bcdc");
    println!("    bytecodec --mode decompress --in notes.bcdc --out notes.txt");
    println!();
}
