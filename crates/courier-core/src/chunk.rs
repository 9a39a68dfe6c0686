//! Payload shaping: bounded message chunks and bounded file parts.
//!
//! `split_message` is pure; `split_file` touches only the filesystem.
//! Endpoint limits arrive via arguments, so callers decide policy.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

/// Split a text message into chunks of at most `max_chars` characters.
///
/// Prefers to split at the last newline inside the window, falling back to
/// a hard cut at the limit. Leading whitespace on each continuation is
/// trimmed. An empty message yields no chunks.
///
/// `max_chars` must be at least 1; the config layer guarantees this.
pub fn split_message(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut rest = text;

    loop {
        let window_end = match byte_of_char(rest, max_chars) {
            Some(i) => i,
            None => {
                // Remainder fits in one chunk.
                if !rest.is_empty() {
                    chunks.push(rest.to_string());
                }
                return chunks;
            }
        };

        let window = &rest[..window_end];
        let cut = window.rfind('\n').unwrap_or(window_end);
        chunks.push(rest[..cut].to_string());
        rest = rest[cut..].trim_start();
    }
}

/// Byte offset of character number `n`, or None when the text holds `n`
/// characters or fewer. Keeps all slicing on char boundaries.
fn byte_of_char(text: &str, n: usize) -> Option<usize> {
    text.char_indices().nth(n).map(|(i, _)| i)
}

/// Split a file into parts of at most `max_size` bytes.
///
/// A file already within the limit comes back as its own path, no copies
/// made. Larger files are read sequentially and written out as sibling
/// part files named `<original>.1`, `<original>.2`, …, returned in order.
/// The original file is never modified.
pub fn split_file(path: &Path, max_size: u64) -> io::Result<Vec<PathBuf>> {
    let size = fs::metadata(path)?.len();
    if size <= max_size {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut source = fs::File::open(path)?;
    let mut parts = Vec::new();
    let mut buf = Vec::new();
    let mut part_num = 1u32;

    loop {
        buf.clear();
        (&mut source).take(max_size).read_to_end(&mut buf)?;
        if buf.is_empty() {
            break;
        }
        let part = part_path(path, part_num);
        fs::write(&part, &buf)?;
        parts.push(part);
        part_num += 1;
    }

    Ok(parts)
}

/// `<original>.<n>`, alongside the original.
fn part_path(path: &Path, n: u32) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(format!(".{n}"));
    PathBuf::from(name)
}
