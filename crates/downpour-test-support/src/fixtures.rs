//! Torrent file fixtures.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Declared size of the main payload file in the sample torrent.
pub const SAMPLE_PAYLOAD_LENGTH: u64 = 4 * 1024 * 1024;
/// Declared size of the README file in the sample torrent.
pub const SAMPLE_README_LENGTH: u64 = 1024;

/// Write a minimal multi-file torrent named `<stem>.torrent` into `dir`.
///
/// The metainfo declares two files under a `<stem>` directory: a payload of
/// [`SAMPLE_PAYLOAD_LENGTH`] bytes and a README of [`SAMPLE_README_LENGTH`]
/// bytes. The piece hashes are placeholders, which is enough for metadata
/// parsing and dry-run registration.
///
/// # Errors
///
/// Propagates the I/O error when the file cannot be written.
pub fn write_sample_torrent(dir: &Path, stem: &str) -> io::Result<PathBuf> {
    let path = dir.join(format!("{stem}.torrent"));
    fs::write(&path, sample_torrent_bytes(stem))?;
    Ok(path)
}

fn sample_torrent_bytes(stem: &str) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(b"d");
    bencode_str(&mut out, "announce");
    bencode_str(&mut out, "udp://tracker.invalid:6969/announce");
    bencode_str(&mut out, "info");
    out.extend_from_slice(b"d");

    bencode_str(&mut out, "files");
    out.extend_from_slice(b"l");
    bencode_file(&mut out, SAMPLE_PAYLOAD_LENGTH, "payload.bin");
    bencode_file(&mut out, SAMPLE_README_LENGTH, "README.md");
    out.extend_from_slice(b"e");

    bencode_str(&mut out, "name");
    bencode_str(&mut out, stem);
    bencode_str(&mut out, "piece length");
    out.extend_from_slice(b"i262144e");
    bencode_str(&mut out, "pieces");
    out.extend_from_slice(b"20:");
    out.extend_from_slice(&[0u8; 20]);

    out.extend_from_slice(b"ee");
    out
}

fn bencode_str(out: &mut Vec<u8>, value: &str) {
    out.extend_from_slice(value.len().to_string().as_bytes());
    out.push(b':');
    out.extend_from_slice(value.as_bytes());
}

fn bencode_file(out: &mut Vec<u8>, length: u64, name: &str) {
    out.extend_from_slice(b"d");
    bencode_str(out, "length");
    out.extend_from_slice(format!("i{length}e").as_bytes());
    bencode_str(out, "path");
    out.extend_from_slice(b"l");
    bencode_str(out, name);
    out.extend_from_slice(b"ee");
}
