//! Sample input generation.
//!
//! When no input file is specified, we generate a sample whose sections each
//! favour a different codec, so the choice of `--codec` shows in the metrics.
//!
//! # Design
//!
//! Generated data alternates between:
//! - Runs of one byte (RLE territory)
//! - Text-like data over a small alphabet, newlines included (Huffman)
//! - Short repeating patterns (LZ77)
//! - Random bytes (nothing helps; exercises the stored fallback)

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Longest section of a single kind.
const MAX_SECTION: usize = 1024;

/// Generate a sample with mixed compressibility.
///
/// # Arguments
/// - `seed`: random seed for determinism
/// - `size_bytes`: exact size of generated data
pub fn generate_sample_data(seed: u64, size_bytes: usize) -> Vec<u8> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut data = Vec::with_capacity(size_bytes);

    while data.len() < size_bytes {
        let section = rng.gen_range(16..=MAX_SECTION).min(size_bytes - data.len());

        match rng.gen_range(0..10) {
            // 30% runs of the same byte
            0..=2 => {
                let byte_value: u8 = rng.gen();
                data.extend(std::iter::repeat(byte_value).take(section));
            }

            // 30% limited alphabet, text-like
            3..=5 => {
                let alphabet = b"abcdefghijklmnopqrstuvwxyz .!,\n";
                for _ in 0..section {
                    data.push(alphabet[rng.gen_range(0..alphabet.len())]);
                }
            }

            // 30% repeating patterns
            6..=8 => {
                let pattern = generate_pattern(&mut rng);
                data.extend(pattern.iter().cycle().take(section));
            }

            // 10% random bytes
            _ => {
                for _ in 0..section {
                    data.push(rng.gen());
                }
            }
        }
    }

    data
}

/// Generate a small repeating pattern.
fn generate_pattern(rng: &mut ChaCha8Rng) -> Vec<u8> {
    let pattern_len = rng.gen_range(3..=24);
    (0..pattern_len).map(|_| rng.gen()).collect()
}
