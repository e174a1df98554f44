use std::fs;
use std::path::Path;

use crate::error::JudgeCoreError;

/// Bytes that make a line count as blank: `" \t\n\v\f\r"`.
const BLANK_BYTES: &[u8] = b" \t\n\x0b\x0c\r";

/// Split captured output into lines the way a line reader would.
///
/// Only `\n` separates lines; a `\r` before it stays part of the line content.
/// Lines are kept as raw bytes, nothing is decoded.
pub fn split_lines(bytes: &[u8]) -> Vec<&[u8]> {
    bytes.split(|&b| b == b'\n').collect()
}

pub fn read_lines(path: &Path) -> Result<Vec<Vec<u8>>, JudgeCoreError> {
    let bytes = fs::read(path)?;
    Ok(split_lines(&bytes).into_iter().map(<[u8]>::to_vec).collect())
}

/// Drop every line made only of ASCII blanks, keep the rest untouched.
///
/// Trailing spaces on a content line are still significant, so two outputs only
/// compare equal after normalization when their content-bearing lines are
/// byte-for-byte identical. Non-ASCII spaces such as U+3000 are content.
pub fn normalize_lines<L: AsRef<[u8]>>(lines: &[L]) -> Vec<&[u8]> {
    lines
        .iter()
        .map(AsRef::as_ref)
        .filter(|line| line.iter().any(|b| !BLANK_BYTES.contains(b)))
        .collect()
}

pub fn compare_lines<A: AsRef<[u8]>, B: AsRef<[u8]>>(expected: &[A], actual: &[B]) -> bool {
    normalize_lines(expected) == normalize_lines(actual)
}
