//! Metrics collection and reporting for a compression run.
//!
//! Tracks sizes and timings across the three stages of a round trip
//! (compress, frame, decompress) and renders them for humans or for parsing.
//!
//! # Thread Safety
//!
//! The `Metrics` struct is NOT thread-safe. It is filled in by one run and
//! read at the end.

use std::time::{Duration, Instant};

use crate::codec::CodecKind;

/// Metrics for a single compress / decompress run.
#[derive(Debug, Clone)]
pub struct Metrics {
    // === Timing ===
    /// When the run started
    pub start_time: Instant,

    /// When the run ended (set on completion)
    pub end_time: Option<Instant>,

    /// Time spent compressing and framing
    pub compress_time: Duration,

    /// Time spent parsing and decompressing
    pub decompress_time: Duration,

    // === Codec ===
    /// Codec requested by the caller
    pub requested_codec: CodecKind,

    /// Codec recorded in the frame (differs on stored fallback)
    pub frame_codec: Option<CodecKind>,

    // === Sizes ===
    /// Bytes read from the input
    pub input_bytes: u64,

    /// Bytes of the serialized frame, header included
    pub frame_bytes: u64,

    /// Bytes restored by decompression
    pub output_bytes: u64,

    /// Whether restored bytes matched the input
    pub verified: Option<bool>,
}

impl Metrics {
    /// Create new metrics with start time set to now.
    pub fn new(requested_codec: CodecKind) -> Self {
        Self {
            start_time: Instant::now(),
            end_time: None,
            compress_time: Duration::ZERO,
            decompress_time: Duration::ZERO,
            requested_codec,
            frame_codec: None,
            input_bytes: 0,
            frame_bytes: 0,
            output_bytes: 0,
            verified: None,
        }
    }

    /// Mark the run as complete.
    pub fn complete(&mut self) {
        self.end_time = Some(Instant::now());
    }

    /// Get total duration (or current elapsed if not complete).
    pub fn duration(&self) -> Duration {
        match self.end_time {
            Some(end) => end.duration_since(self.start_time),
            None => self.start_time.elapsed(),
        }
    }

    /// Compute compression ratio (frame / input).
    ///
    /// Returns 0.0 if nothing was read.
    pub fn compression_ratio(&self) -> f64 {
        if self.input_bytes == 0 {
            0.0
        } else {
            self.frame_bytes as f64 / self.input_bytes as f64
        }
    }

    /// Whether the frame ended up with another codec than requested
    /// (stored raw, or untagged LZ77 retried as tagged).
    pub fn fell_back(&self) -> bool {
        self.frame_codec
            .is_some_and(|codec| codec != self.requested_codec)
    }

    /// Compress throughput in bytes/second.
    pub fn compress_throughput_bps(&self) -> f64 {
        let secs = self.compress_time.as_secs_f64();
        if secs == 0.0 {
            0.0
        } else {
            self.input_bytes as f64 / secs
        }
    }

    /// Print a human-readable summary to stdout.
    pub fn print_summary(&self) {
        println!("\n=== Run Summary ===");
        println!("Duration: {} ms", self.duration().as_millis());
        println!();

        println!("=== Codec ===");
        println!("Requested: {}", self.requested_codec);
        match self.frame_codec {
            Some(codec) if self.fell_back() => println!("Framed as: {codec} (fallback)"),
            Some(codec) => println!("Framed as: {codec}"),
            None => println!("Framed as: -"),
        }
        println!();

        println!("=== Sizes ===");
        println!("Input:  {} bytes", self.input_bytes);
        println!("Frame:  {} bytes", self.frame_bytes);
        println!("Output: {} bytes", self.output_bytes);
        println!("Ratio:  {:.1}%", self.compression_ratio() * 100.0);
        println!();

        println!("=== Performance ===");
        println!("Compress:   {} us", self.compress_time.as_micros());
        println!("Decompress: {} us", self.decompress_time.as_micros());
        println!(
            "Throughput: {:.2} MB/s",
            self.compress_throughput_bps() / 1_000_000.0
        );
        println!();
    }

    /// Print just the final result (pass/fail).
    pub fn print_result(&self) {
        match self.verified {
            Some(true) => {
                println!("✓ Round trip passed");
                println!(
                    "  {} bytes -> {} byte frame in {} ms",
                    self.input_bytes,
                    self.frame_bytes,
                    self.duration().as_millis()
                );
            }
            Some(false) => println!(
                "✗ Round trip failed: restored data differs ({} != {} bytes)",
                self.input_bytes, self.output_bytes
            ),
            None => println!(
                "✓ Done: {} bytes in, {} bytes out",
                self.input_bytes,
                self.output_bytes.max(self.frame_bytes)
            ),
        }
    }

    /// Export metrics as a simple text format (for parsing/testing).
    pub fn export_text(&self) -> String {
        format!(
            "duration_ms={}\n\
             codec={}\n\
             frame_codec={}\n\
             input_bytes={}\n\
             frame_bytes={}\n\
             output_bytes={}\n\
             compression_ratio={:.4}\n\
             compress_us={}\n\
             decompress_us={}\n\
             verified={}\n",
            self.duration().as_millis(),
            self.requested_codec,
            self.frame_codec.map_or_else(|| "-".to_string(), |c| c.to_string()),
            self.input_bytes,
            self.frame_bytes,
            self.output_bytes,
            self.compression_ratio(),
            self.compress_time.as_micros(),
            self.decompress_time.as_micros(),
            self.verified.map_or("-", |v| if v { "yes" } else { "no" }),
        )
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new(CodecKind::default())
    }
}
