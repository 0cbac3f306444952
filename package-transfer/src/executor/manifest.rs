//! Package descriptor ("manifest") parsing.
//!
//! A descriptor is an INI document shipped inside each package. Its `[ФАЙЛЫ]`
//! section lists the package files as path-like values; an optional `[ТЕКСТ]`
//! section may name one more file under the `файл` key. Only basenames are
//! kept, since packages are flat folders by the time they reach us.
//!
//! Descriptors produced by some senders carry indented lines, which INI
//! parsers read as continuation lines. Every line is left-trimmed before
//! parsing.

use crate::utils::errors::ManifestError;
use encoding_rs::Encoding;
use ini::{Ini, ParseOption};
use std::borrow::Cow;
use std::collections::HashSet;
use std::path::Path;

/// Section listing the package files.
pub const FILES_SECTION: &str = "ФАЙЛЫ";

/// Free-text section that may reference one extra file.
pub const TEXT_SECTION: &str = "ТЕКСТ";

/// Key inside [`TEXT_SECTION`] naming the extra file (matched case-insensitively).
pub const TEXT_FILE_KEY: &str = "файл";

/// File name suffixes that mark a descriptor.
pub const DESCRIPTOR_EXTENSIONS: [&str; 2] = [".ini", ".ltr"];

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Declared contents of a package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    /// Basenames in declaration order; may contain duplicates.
    pub files: Vec<String>,
}

/// Whether a file name marks a package descriptor.
pub fn is_descriptor(name: &str) -> bool {
    DESCRIPTOR_EXTENSIONS.iter().any(|ext| name.ends_with(ext))
}

/// Reads descriptor files from disk.
#[derive(Debug, Clone, Copy)]
pub struct ManifestReader {
    fallback: &'static Encoding,
}

impl ManifestReader {
    /// `fallback` is tried when the descriptor is not valid UTF-8.
    pub fn new(fallback: &'static Encoding) -> Self {
        Self { fallback }
    }

    pub fn read(&self, path: &Path) -> Result<Manifest, ManifestError> {
        let bytes = std::fs::read(path).map_err(|source| ManifestError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let text = self.decode(&bytes).ok_or_else(|| ManifestError::Decode {
            path: path.to_path_buf(),
            fallback: self.fallback.name(),
        })?;

        parse_manifest(&text)
    }

    fn decode<'a>(&self, bytes: &'a [u8]) -> Option<Cow<'a, str>> {
        let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
        match std::str::from_utf8(bytes) {
            Ok(text) => Some(Cow::Borrowed(text)),
            Err(_) => self
                .fallback
                .decode_without_bom_handling_and_without_replacement(bytes),
        }
    }
}

impl Default for ManifestReader {
    fn default() -> Self {
        Self::new(encoding_rs::WINDOWS_1251)
    }
}

/// Strip leading whitespace from every line.
pub fn clean_indentation(text: &str) -> String {
    text.lines().map(str::trim_start).collect::<Vec<_>>().join("\n")
}

/// Parse descriptor text into the declared file list.
pub fn parse_manifest(text: &str) -> Result<Manifest, ManifestError> {
    let cleaned = clean_indentation(text);

    // Values are Windows paths more often than not: no escapes, no quote stripping.
    let options = ParseOption {
        enabled_quote: false,
        enabled_escape: false,
        ..ParseOption::default()
    };
    let ini = Ini::load_from_str_opt(&cleaned, options)
        .map_err(|e| ManifestError::Parse(e.to_string()))?;

    let files_section = ini
        .section(Some(FILES_SECTION))
        .ok_or(ManifestError::MissingSection(FILES_SECTION))?;

    // Keys are case-insensitive; a repeated key makes the list ambiguous.
    let mut keys = HashSet::new();
    let mut files = Vec::new();
    for (key, value) in files_section.iter() {
        if !keys.insert(key.trim().to_lowercase()) {
            return Err(ManifestError::Parse(format!(
                "duplicate key '{}' in section [{}]",
                key.trim(),
                FILES_SECTION
            )));
        }
        files.push(basename(value).to_string());
    }

    if let Some(text_section) = ini.section(Some(TEXT_SECTION)) {
        let extra = text_section
            .iter()
            .find(|(key, _)| key.trim().to_lowercase() == TEXT_FILE_KEY)
            .map(|(_, value)| basename(value))
            .filter(|name| !name.is_empty());

        if let Some(name) = extra {
            files.push(name.to_string());
        }
    }

    Ok(Manifest { files })
}

/// Final component of a `/` or `\` separated path.
pub fn basename(value: &str) -> &str {
    let value = value.trim();
    value.rsplit(['/', '\\']).next().unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const PLAIN: &str = "[ОБЩИЕ]\nотправитель=Филиал 12\n\n[ФАЙЛЫ]\nфайл1=a.txt\nфайл2=b.txt\n";

    #[test]
    fn test_parse_files_section() {
        let manifest = parse_manifest(PLAIN).unwrap();
        assert_eq!(manifest.files, ["a.txt", "b.txt"]);
    }

    #[test]
    fn test_directory_components_are_dropped() {
        let text = "[ФАЙЛЫ]\n1=C:\\outgoing\\2024\\scan.pdf\n2=/var/spool/out/data.xml\n3=plain.txt\n";
        let manifest = parse_manifest(text).unwrap();
        assert_eq!(manifest.files, ["scan.pdf", "data.xml", "plain.txt"]);
    }

    #[test]
    fn test_indented_lines_are_cleaned() {
        let indented = "  [ФАЙЛЫ]\n\tфайл1=a.txt\n    файл2=b.txt\n";
        let manifest = parse_manifest(indented).unwrap();
        assert_eq!(manifest.files, ["a.txt", "b.txt"]);
    }

    #[test]
    fn test_cleanup_is_neutral_for_clean_input() {
        let direct = parse_manifest(PLAIN).unwrap();
        let recleaned = parse_manifest(&clean_indentation(PLAIN)).unwrap();
        assert_eq!(direct, recleaned);
    }

    #[test]
    fn test_text_section_adds_one_file() {
        let text = "[ФАЙЛЫ]\n1=a.txt\n[ТЕКСТ]\nтема=Отчет\nФайл=D:\\docs\\letter.txt\n";
        let manifest = parse_manifest(text).unwrap();
        assert_eq!(manifest.files, ["a.txt", "letter.txt"]);
    }

    #[test]
    fn test_text_section_without_file_key() {
        let text = "[ФАЙЛЫ]\n1=a.txt\n[ТЕКСТ]\nтема=Отчет\n";
        let manifest = parse_manifest(text).unwrap();
        assert_eq!(manifest.files, ["a.txt"]);
    }

    #[test]
    fn test_missing_files_section() {
        let err = parse_manifest("[ТЕКСТ]\nфайл=a.txt\n").unwrap_err();
        assert!(matches!(err, ManifestError::MissingSection(FILES_SECTION)));
    }

    #[test]
    fn test_unparseable_document() {
        let err = parse_manifest("[ФАЙЛЫ]\n1=a.txt\norphan").unwrap_err();
        assert!(matches!(err, ManifestError::Parse(_)));
    }

    #[test]
    fn test_duplicate_file_key_is_rejected() {
        let err = parse_manifest("[ФАЙЛЫ]\n1: a.txt\n1=b.txt\n").unwrap_err();
        assert!(matches!(err, ManifestError::Parse(_)));
    }

    #[test]
    fn test_file_keys_collide_ignoring_case() {
        let err = parse_manifest("[ФАЙЛЫ]\nФайл1=a.txt\nфайл1=b.txt\n").unwrap_err();
        assert!(err.to_string().contains("duplicate key"));
    }

    #[test]
    fn test_empty_files_section_parses() {
        let manifest = parse_manifest("[ФАЙЛЫ]\n").unwrap();
        assert!(manifest.files.is_empty());
    }

    #[test]
    fn test_read_legacy_encoding() -> std::io::Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("package.ltr");
        let (bytes, _, _) = encoding_rs::WINDOWS_1251.encode("[ФАЙЛЫ]\nфайл1=отчет.txt\n");
        std::fs::write(&path, &bytes)?;

        let manifest = ManifestReader::default().read(&path).unwrap();
        assert_eq!(manifest.files, ["отчет.txt"]);
        Ok(())
    }

    #[test]
    fn test_read_utf8_with_bom() -> std::io::Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("package.ini");
        let mut bytes = UTF8_BOM.to_vec();
        bytes.extend_from_slice(PLAIN.as_bytes());
        std::fs::write(&path, &bytes)?;

        let manifest = ManifestReader::default().read(&path).unwrap();
        assert_eq!(manifest.files, ["a.txt", "b.txt"]);
        Ok(())
    }

    #[test]
    fn test_undecodable_bytes() -> std::io::Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("package.ini");
        std::fs::write(&path, [0xFF, 0xFE, 0xFD])?;

        let err = ManifestReader::new(encoding_rs::UTF_8).read(&path).unwrap_err();
        assert!(matches!(err, ManifestError::Decode { .. }));
        Ok(())
    }

    #[test]
    fn test_descriptor_extensions() {
        assert!(is_descriptor("manifest.ini"));
        assert!(is_descriptor("letter.ltr"));
        assert!(!is_descriptor("manifest.ini.bak"));
        assert!(!is_descriptor("a.txt"));
    }
}
