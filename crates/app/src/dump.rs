//! Hex + ASCII preview of a byte buffer, for `--dump`.

use std::fmt::Write;

/// Bytes shown per line
const LINE_BYTES: usize = 16;

/// Bytes shown by `--dump` before eliding the rest
pub const DUMP_BYTES: usize = 64;

/// Render up to `limit` bytes of `data` as offset / hex / ASCII lines.
///
/// ```text
/// 0000: 68 65 6c 6c 6f 0a                                 hello.
/// ```
pub fn hex_dump(data: &[u8], limit: usize) -> String {
    let shown = &data[..data.len().min(limit)];
    let mut out = String::new();

    for (line, chunk) in shown.chunks(LINE_BYTES).enumerate() {
        let _ = write!(out, "{:04x}:", line * LINE_BYTES);
        for byte in chunk {
            let _ = write!(out, " {byte:02x}");
        }
        // Pad short lines so the ASCII column lines up
        for _ in chunk.len()..LINE_BYTES {
            out.push_str("   ");
        }
        out.push_str("  ");
        out.extend(chunk.iter().map(|&b| {
            if (0x20..=0x7e).contains(&b) {
                b as char
            } else {
                '.'
            }
        }));
        out.push('\n');
    }

    if data.len() > shown.len() {
        let _ = writeln!(out, "... {} more bytes", data.len() - shown.len());
    }
    out
}

/// Print a labelled preview to stdout.
pub fn print_dump(label: &str, data: &[u8]) {
    println!("=== {label} ({} bytes) ===", data.len());
    print!("{}", hex_dump(data, DUMP_BYTES));
    println!();
}
