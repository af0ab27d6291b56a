//! bytecodec: compress, decompress or round-trip a file with one codec.
//!
//! With no arguments, a seeded sample is generated, framed with the default
//! codec, written to disk, read back, restored and compared.

mod config;
mod dump;
mod input_gen;

use std::fs;
use std::process::ExitCode;
use std::time::Instant;

use bytecodec_core::error::FramingError;
use bytecodec_core::framing::{compress_and_frame, decompress_frame_with_limit, parse_frame};
use bytecodec_core::metrics::Metrics;
use bytecodec_core::Result;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::config::{print_help, Config, Mode};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = match Config::from_args(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("Run with --help for usage");
            return ExitCode::FAILURE;
        }
    };

    if config.help {
        print_help();
        return ExitCode::SUCCESS;
    }

    if config.print_config {
        config.print();
    }

    let outcome = match config.mode {
        Mode::RoundTrip => round_trip(&config),
        Mode::Compress => compress(&config),
        Mode::Decompress => decompress(&config),
    };

    match outcome {
        Ok(metrics) => {
            if config.print_metrics {
                metrics.print_summary();
            }
            metrics.print_result();
            if metrics.verified == Some(false) {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            error!(code = e.code(), "{} failed", config.mode);
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Read the input file, or generate a sample when none was given.
fn load_input(config: &Config) -> Result<Vec<u8>> {
    match &config.input_file {
        Some(path) => {
            let data = fs::read(path)?;
            info!(path = %path.display(), bytes = data.len(), "read input");
            Ok(data)
        }
        None => {
            let data = input_gen::generate_sample_data(config.seed, config.sample_bytes);
            info!(seed = config.seed, bytes = data.len(), "generated sample");
            Ok(data)
        }
    }
}

/// Load raw data to compress, refusing anything a frame could not be
/// restored from under the configured limit.
fn load_raw(config: &Config) -> Result<Vec<u8>> {
    let data = load_input(config)?;
    if data.len() > config.max_raw_bytes {
        return Err(FramingError::RawLengthOverLimit {
            raw_len: data.len(),
            limit: config.max_raw_bytes,
        }
        .into());
    }
    if config.dump {
        dump::print_dump("Input", &data);
    }
    Ok(data)
}

/// Compress and write the frame, filling in the compress half of `metrics`.
fn compress_to_file(config: &Config, data: &[u8], metrics: &mut Metrics) -> Result<Vec<u8>> {
    metrics.input_bytes = data.len() as u64;

    let started = Instant::now();
    let bytes = compress_and_frame(config.codec, data)?;
    metrics.compress_time = started.elapsed();
    metrics.frame_bytes = bytes.len() as u64;

    fs::write(&config.output_file, &bytes)?;
    info!(
        path = %config.output_file.display(),
        bytes = bytes.len(),
        "wrote frame"
    );
    Ok(bytes)
}

fn round_trip(config: &Config) -> Result<Metrics> {
    let data = load_raw(config)?;
    let mut metrics = Metrics::new(config.codec);

    compress_to_file(config, &data, &mut metrics)?;

    let read_back = fs::read(&config.output_file)?;

    let started = Instant::now();
    let frame = parse_frame(&read_back)?;
    metrics.frame_codec = Some(frame.codec);
    let restored = decompress_frame_with_limit(&frame, config.max_raw_bytes)?;
    metrics.decompress_time = started.elapsed();

    if config.dump {
        dump::print_dump("Restored", &restored);
    }

    metrics.output_bytes = restored.len() as u64;
    metrics.verified = Some(restored == data);
    metrics.complete();
    Ok(metrics)
}

fn compress(config: &Config) -> Result<Metrics> {
    let data = load_raw(config)?;
    let mut metrics = Metrics::new(config.codec);

    let bytes = compress_to_file(config, &data, &mut metrics)?;
    metrics.frame_codec = Some(parse_frame(&bytes)?.codec);
    metrics.complete();
    Ok(metrics)
}

fn decompress(config: &Config) -> Result<Metrics> {
    let bytes = load_input(config)?;

    let started = Instant::now();
    let frame = parse_frame(&bytes)?;
    let restored = decompress_frame_with_limit(&frame, config.max_raw_bytes)?;
    let elapsed = started.elapsed();

    if config.dump {
        dump::print_dump("Restored", &restored);
    }

    fs::write(&config.output_file, &restored)?;
    info!(
        path = %config.output_file.display(),
        bytes = restored.len(),
        codec = %frame.codec,
        "restored"
    );

    let mut metrics = Metrics::new(frame.codec);
    metrics.frame_codec = Some(frame.codec);
    metrics.input_bytes = restored.len() as u64;
    metrics.frame_bytes = bytes.len() as u64;
    metrics.output_bytes = restored.len() as u64;
    metrics.decompress_time = elapsed;
    metrics.complete();
    Ok(metrics)
}
