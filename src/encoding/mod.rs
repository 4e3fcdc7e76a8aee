// ── Encoding detection ────────────────────────────────────────────────────────
//
// Classifies a file's text encoding from its first few bytes.  The editor
// calls this when opening a file; no Win32 imports, pure Rust.

use std::{
    fs::File,
    io::{self, Read},
    path::Path,
};

/// How many leading bytes are inspected.  Enough for every BOM plus the
/// four-byte UTF-16 heuristic.
const SNIFF_LEN: usize = 5;

/// Display name the editor gives buffers that have never been saved,
/// optionally followed by a space and a counter (`Untitled 2`).
const UNTITLED_NAME: &str = "Untitled";

// ── TextEncoding ──────────────────────────────────────────────────────────────

/// The character encoding of a document on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextEncoding {
    /// UTF-8 with the `EF BB BF` byte-order mark.
    Utf8Bom,
    /// UTF-8 without a BOM.  Also the default for anything unrecognised.
    #[default]
    Utf8,
    /// UTF-16 Little-Endian with the `FF FE` BOM.
    Utf16Le,
    /// UTF-16 Big-Endian with the `FE FF` BOM.
    Utf16Be,
    /// UTF-7 (`2B 2F 76` signature).
    Utf7,
    /// UTF-16 Little-Endian without a BOM, guessed from alternating zero
    /// bytes.  Legacy files only; new files should never be written this way.
    Utf16LeNoBom,
}

impl TextEncoding {
    /// Short display string shown in the status bar.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Utf8Bom => "UTF-8 BOM",
            Self::Utf8 => "UTF-8",
            Self::Utf16Le => "UTF-16 LE",
            Self::Utf16Be => "UTF-16 BE",
            Self::Utf7 => "UTF-7",
            Self::Utf16LeNoBom => "UTF-16 LE (no BOM)",
        }
    }

    /// The byte-order mark written in front of the text, if any.
    pub fn bom(self) -> &'static [u8] {
        match self {
            Self::Utf8Bom => &[0xEF, 0xBB, 0xBF],
            Self::Utf16Le => &[0xFF, 0xFE],
            Self::Utf16Be => &[0xFE, 0xFF],
            Self::Utf7 => &[0x2B, 0x2F, 0x76],
            Self::Utf8 | Self::Utf16LeNoBom => &[],
        }
    }
}

// ── Detection ─────────────────────────────────────────────────────────────────

/// Detect the encoding of the file at `path`.
///
/// `None`, an empty path, or an untitled placeholder short-circuit to
/// [`TextEncoding::Utf8`] without touching the filesystem: a new buffer has
/// no bytes to sniff.  Otherwise at most the first five bytes are read and
/// handed to [`classify`].
///
/// The file is expected to exist; open/read errors are returned as-is.
pub fn detect_encoding(path: Option<&Path>) -> io::Result<TextEncoding> {
    let Some(path) = path else {
        return Ok(TextEncoding::Utf8);
    };
    if is_placeholder(path) {
        return Ok(TextEncoding::Utf8);
    }

    let mut head = Vec::with_capacity(SNIFF_LEN);
    File::open(path)?
        .take(SNIFF_LEN as u64)
        .read_to_end(&mut head)?;

    let encoding = classify(&head);
    tracing::debug!(path = %path.display(), encoding = encoding.as_str(), "detected encoding");
    Ok(encoding)
}

/// Classify leading bytes.
///
/// Check order:
/// 1. UTF-8 BOM (`EF BB BF`)
/// 2. UTF-16 LE BOM (`FF FE`)
/// 3. UTF-16 BE BOM (`FE FF`)
/// 4. UTF-7 signature (`2B 2F 76`)
/// 5. Heuristic: `x 00 x 00` pattern → UTF-16 LE without BOM
/// 6. Fallback: UTF-8 without BOM
///
/// The heuristic is weak and must never win over a real BOM, so it runs last.
pub fn classify(bytes: &[u8]) -> TextEncoding {
    if bytes.starts_with(&[0xEF, 0xBB, 0xBF]) {
        return TextEncoding::Utf8Bom;
    }
    if bytes.starts_with(&[0xFF, 0xFE]) {
        return TextEncoding::Utf16Le;
    }
    if bytes.starts_with(&[0xFE, 0xFF]) {
        return TextEncoding::Utf16Be;
    }
    if bytes.starts_with(&[0x2B, 0x2F, 0x76]) {
        return TextEncoding::Utf7;
    }
    if let [b0, 0, b2, 0, ..] = bytes {
        if *b0 != 0 && *b2 != 0 {
            tracing::debug!("BOM-less UTF-16 LE guessed from zero-byte pattern");
            return TextEncoding::Utf16LeNoBom;
        }
    }
    TextEncoding::Utf8
}

/// `true` for paths that name an unsaved buffer rather than a real file:
/// empty, `Untitled`, or `Untitled <n>`.  Anything else, including a real
/// `Untitled notes.md` in the current directory, is sniffed.
fn is_placeholder(path: &Path) -> bool {
    let Some(name) = path.to_str() else {
        return false;
    };
    if name.is_empty() {
        return true;
    }
    match name.strip_prefix(UNTITLED_NAME) {
        Some("") => true,
        Some(rest) => rest
            .strip_prefix(' ')
            .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit())),
        None => false,
    }
}

// ── Decoding ──────────────────────────────────────────────────────────────────

/// Convert file bytes in `encoding` to UTF-8 text for the editor buffer.
///
/// Strips the BOM and transcodes UTF-16; malformed sequences are replaced
/// with U+FFFD.  UTF-7 is not transcoded: its bytes are ASCII-safe and are
/// loaded as-is.
pub fn decode_to_utf8(bytes: &[u8], encoding: TextEncoding) -> String {
    let payload = bytes.strip_prefix(encoding.bom()).unwrap_or(bytes);
    match encoding {
        TextEncoding::Utf16Le | TextEncoding::Utf16LeNoBom => {
            let units: Vec<u16> = payload
                .chunks_exact(2)
                .map(|c| u16::from_le_bytes([c[0], c[1]]))
                .collect();
            String::from_utf16_lossy(&units)
        }
        TextEncoding::Utf16Be => {
            let units: Vec<u16> = payload
                .chunks_exact(2)
                .map(|c| u16::from_be_bytes([c[0], c[1]]))
                .collect();
            String::from_utf16_lossy(&units)
        }
        TextEncoding::Utf8Bom | TextEncoding::Utf8 | TextEncoding::Utf7 => {
            String::from_utf8_lossy(payload).into_owned()
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn file_with(bytes: &[u8]) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().expect("temp file");
        std::io::Write::write_all(&mut f, bytes).expect("write");
        f
    }

    #[test]
    fn utf8_bom_wins_regardless_of_tail() {
        for tail in [&b""[..], b"\x00", b"A\x00B\x00", b"\xFF\xFE", b"+/v"] {
            let mut bytes = vec![0xEF, 0xBB, 0xBF];
            bytes.extend_from_slice(tail);
            assert_eq!(classify(&bytes), TextEncoding::Utf8Bom, "tail {tail:?}");
        }
    }

    #[test]
    fn utf16_boms() {
        assert_eq!(classify(b"\xFF\xFEh\x00"), TextEncoding::Utf16Le);
        assert_eq!(classify(b"\xFE\xFF\x00h"), TextEncoding::Utf16Be);
    }

    #[test]
    fn utf7_signature() {
        assert_eq!(classify(b"+/v8-"), TextEncoding::Utf7);
    }

    #[test]
    fn bomless_utf16_heuristic() {
        assert_eq!(classify(b"h\x00i\x00"), TextEncoding::Utf16LeNoBom);
        // A zero in the wrong slot does not match.
        assert_eq!(classify(b"\x00\x00i\x00"), TextEncoding::Utf8);
        // Too short for the pattern.
        assert_eq!(classify(b"h\x00i"), TextEncoding::Utf8);
    }

    #[test]
    fn bom_preempts_heuristic() {
        // FF FE followed by an x 00 x 00 shape is still a real BOM.
        assert_eq!(classify(b"\xFF\xFEa\x00b"), TextEncoding::Utf16Le);
    }

    #[test]
    fn plain_ascii_and_empty_are_utf8() {
        assert_eq!(classify(b"hello"), TextEncoding::Utf8);
        assert_eq!(classify(b""), TextEncoding::Utf8);
    }

    #[test]
    fn none_empty_and_untitled_skip_the_filesystem() {
        assert_eq!(detect_encoding(None).unwrap(), TextEncoding::Utf8);
        assert_eq!(detect_encoding(Some(Path::new(""))).unwrap(), TextEncoding::Utf8);
        // These paths do not exist; reaching the filesystem would be an error.
        assert_eq!(
            detect_encoding(Some(Path::new("Untitled"))).unwrap(),
            TextEncoding::Utf8
        );
        assert_eq!(
            detect_encoding(Some(Path::new("Untitled 3"))).unwrap(),
            TextEncoding::Utf8
        );
    }

    #[test]
    fn relative_file_named_like_untitled_is_sniffed() {
        let dir = tempfile::tempdir().expect("temp dir");
        std::fs::write(dir.path().join("Untitled notes.md"), b"\xFF\xFEh\x00").expect("write");

        // Relative to the directory, as an editor would pass a file opened
        // from its current directory.
        let rel = dir.path().join("Untitled notes.md");
        let rel = rel.strip_prefix(dir.path()).expect("relative");
        assert!(!is_placeholder(rel));
        assert!(!is_placeholder(Path::new("Untitled 2.txt")));
        assert!(!is_placeholder(Path::new("Untitledness")));
        assert!(is_placeholder(Path::new("Untitled 12")));

        let file = dir.path().join("Untitled notes.md");
        assert_eq!(detect_encoding(Some(&file)).unwrap(), TextEncoding::Utf16Le);
    }

    #[test]
    fn untitled_inside_a_directory_is_a_real_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("Untitled.txt");
        assert!(detect_encoding(Some(&path)).is_err());
    }

    #[test]
    fn reads_file_head() {
        let f = file_with(b"\xFE\xFF\x00h\x00i\x00!");
        assert_eq!(
            detect_encoding(Some(f.path())).unwrap(),
            TextEncoding::Utf16Be
        );
    }

    #[test]
    fn short_file_is_classified_from_what_exists() {
        let f = file_with(b"\xFF\xFE");
        assert_eq!(
            detect_encoding(Some(f.path())).unwrap(),
            TextEncoding::Utf16Le
        );
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let missing = PathBuf::from("/definitely/not/here.txt");
        assert!(detect_encoding(Some(&missing)).is_err());
    }

    #[test]
    fn decode_strips_bom_and_transcodes() {
        assert_eq!(decode_to_utf8(b"\xEF\xBB\xBFhello", TextEncoding::Utf8Bom), "hello");
        assert_eq!(decode_to_utf8(b"\xFF\xFEh\x00i\x00", TextEncoding::Utf16Le), "hi");
        assert_eq!(decode_to_utf8(b"\xFE\xFF\x00h\x00i", TextEncoding::Utf16Be), "hi");
        assert_eq!(decode_to_utf8(b"h\x00i\x00", TextEncoding::Utf16LeNoBom), "hi");
    }

    #[test]
    fn encoding_display() {
        assert_eq!(TextEncoding::Utf8.as_str(), "UTF-8");
        assert_eq!(TextEncoding::Utf8Bom.as_str(), "UTF-8 BOM");
        assert_eq!(TextEncoding::Utf16Le.as_str(), "UTF-16 LE");
        assert_eq!(TextEncoding::Utf16Be.as_str(), "UTF-16 BE");
        assert_eq!(TextEncoding::Utf7.as_str(), "UTF-7");
    }
}
