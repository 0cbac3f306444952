//! Package integrity validation.
//!
//! A package is valid when it holds exactly one descriptor and its entries
//! are exactly the declared files plus the descriptor itself. Names are
//! compared as sets; file contents are not inspected.

use super::manifest::{is_descriptor, ManifestReader};
use crate::fs::walker::{entry_name, list_entries};
use crate::utils::errors::{Result, TransferError};
use std::collections::BTreeSet;
use std::path::Path;

/// Summary of a package that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validation {
    /// Descriptor file name
    pub descriptor: String,

    /// Number of distinct entries the package was checked against
    pub entries: usize,
}

/// Checks package folders against their descriptors. Holds no state between
/// calls, so repeated validation of an unchanged folder gives the same answer.
#[derive(Debug, Clone, Copy, Default)]
pub struct PackageValidator {
    reader: ManifestReader,
}

impl PackageValidator {
    pub fn new(reader: ManifestReader) -> Self {
        Self { reader }
    }

    pub fn validate(&self, package: &Path) -> Result<Validation> {
        let name = entry_name(package);
        let entries = list_entries(package)?;

        let descriptors: Vec<&String> = entries.iter().filter(|e| is_descriptor(e)).collect();
        let descriptor = match descriptors.as_slice() {
            [single] => (*single).clone(),
            _ => {
                return Err(TransferError::ManifestCount {
                    package: name,
                    found: descriptors.len(),
                })
            }
        };

        let manifest = self
            .reader
            .read(&package.join(&descriptor))
            .map_err(|source| TransferError::ManifestContent {
                package: name.clone(),
                source,
            })?;

        if manifest.files.is_empty() {
            return Err(TransferError::EmptyManifest { package: name });
        }

        let mut expected: BTreeSet<String> = manifest.files.into_iter().collect();
        expected.insert(descriptor.clone());

        if expected.len() == entries.len() && expected == entries {
            return Ok(Validation {
                descriptor,
                entries: entries.len(),
            });
        }

        Err(TransferError::Integrity {
            package: name,
            missing: expected.difference(&entries).cloned().collect(),
            unexpected: entries.difference(&expected).cloned().collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn package_with(files: &[(&str, &str)]) -> std::io::Result<TempDir> {
        let temp_dir = TempDir::new()?;
        for (name, content) in files {
            fs::write(temp_dir.path().join(name), content)?;
        }
        Ok(temp_dir)
    }

    const AB_MANIFEST: &str = "[ФАЙЛЫ]\n1=a.txt\n2=b.txt\n";

    #[test]
    fn test_matching_package_is_valid() -> std::io::Result<()> {
        let pkg = package_with(&[("a.txt", "a"), ("b.txt", "b"), ("manifest.ini", AB_MANIFEST)])?;

        let validation = PackageValidator::default().validate(pkg.path()).unwrap();
        assert_eq!(validation.descriptor, "manifest.ini");
        assert_eq!(validation.entries, 3);
        Ok(())
    }

    #[test]
    fn test_validation_is_repeatable() -> std::io::Result<()> {
        let pkg = package_with(&[("a.txt", "a"), ("b.txt", "b"), ("manifest.ini", AB_MANIFEST)])?;
        let validator = PackageValidator::default();

        let first = validator.validate(pkg.path()).unwrap();
        let second = validator.validate(pkg.path()).unwrap();
        assert_eq!(first, second);
        Ok(())
    }

    #[test]
    fn test_duplicate_declarations_collapse() -> std::io::Result<()> {
        let manifest = "[ФАЙЛЫ]\n1=a.txt\n2=in\\a.txt\n3=manifest.ini\n";
        let pkg = package_with(&[("a.txt", "a"), ("manifest.ini", manifest)])?;

        assert!(PackageValidator::default().validate(pkg.path()).is_ok());
        Ok(())
    }

    #[test]
    fn test_missing_file_is_integrity_error() -> std::io::Result<()> {
        let pkg = package_with(&[("a.txt", "a"), ("manifest.ini", AB_MANIFEST)])?;

        match PackageValidator::default().validate(pkg.path()) {
            Err(TransferError::Integrity { missing, unexpected, .. }) => {
                assert_eq!(missing, ["b.txt"]);
                assert!(unexpected.is_empty());
            }
            other => panic!("expected integrity error, got {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn test_same_count_different_names_fails() -> std::io::Result<()> {
        let pkg = package_with(&[("a.txt", "a"), ("c.txt", "c"), ("manifest.ini", AB_MANIFEST)])?;

        match PackageValidator::default().validate(pkg.path()) {
            Err(TransferError::Integrity { missing, unexpected, .. }) => {
                assert_eq!(missing, ["b.txt"]);
                assert_eq!(unexpected, ["c.txt"]);
            }
            other => panic!("expected integrity error, got {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn test_subfolder_counts_as_entry() -> std::io::Result<()> {
        let pkg = package_with(&[("a.txt", "a"), ("b.txt", "b"), ("manifest.ini", AB_MANIFEST)])?;
        fs::create_dir(pkg.path().join("extra"))?;

        let err = PackageValidator::default().validate(pkg.path()).unwrap_err();
        assert_eq!(err.kind(), "IntegrityError");
        Ok(())
    }

    #[test]
    fn test_no_descriptor() -> std::io::Result<()> {
        let pkg = package_with(&[("a.txt", "a")])?;

        match PackageValidator::default().validate(pkg.path()) {
            Err(TransferError::ManifestCount { found, .. }) => assert_eq!(found, 0),
            other => panic!("expected manifest count error, got {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn test_two_descriptors() -> std::io::Result<()> {
        let pkg = package_with(&[
            ("a.txt", "a"),
            ("manifest.ini", AB_MANIFEST),
            ("letter.ltr", AB_MANIFEST),
        ])?;

        match PackageValidator::default().validate(pkg.path()) {
            Err(TransferError::ManifestCount { found, .. }) => assert_eq!(found, 2),
            other => panic!("expected manifest count error, got {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn test_descriptor_without_files_section() -> std::io::Result<()> {
        let pkg = package_with(&[("a.txt", "a"), ("manifest.ini", "[ТЕКСТ]\nтема=x\n")])?;

        let err = PackageValidator::default().validate(pkg.path()).unwrap_err();
        assert!(matches!(err, TransferError::ManifestContent { .. }));
        assert_eq!(err.kind(), "ManifestContentError");
        Ok(())
    }

    #[test]
    fn test_empty_declared_list() -> std::io::Result<()> {
        let pkg = package_with(&[("manifest.ini", "[ФАЙЛЫ]\n")])?;

        let err = PackageValidator::default().validate(pkg.path()).unwrap_err();
        assert!(matches!(err, TransferError::EmptyManifest { .. }));
        assert_eq!(err.kind(), "ManifestContentError");
        Ok(())
    }
}
