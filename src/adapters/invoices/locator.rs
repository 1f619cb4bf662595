//! Filesystem invoice locator
//!
//! Equivalent to the shell glob `<root>/<reference>/*.<extension>`: one
//! directory level, case-sensitive extension, dotfiles excluded.

use super::InvoiceLocator;
use crate::config::InvoiceConfig;
use crate::domain::{InvoiceFile, ReferenceNumber, Result, UploaderError};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Locates invoices under a root directory
#[derive(Debug, Clone)]
pub struct FsInvoiceLocator {
    root: PathBuf,
    extension: String,
}

impl FsInvoiceLocator {
    /// Create a locator from configuration
    pub fn new(config: &InvoiceConfig) -> Self {
        Self {
            root: PathBuf::from(&config.root),
            extension: config.extension.clone(),
        }
    }

    /// Root of the invoice tree
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn matches(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        if name.starts_with('.') {
            return false;
        }
        path.extension().and_then(|e| e.to_str()) == Some(self.extension.as_str())
    }
}

impl InvoiceLocator for FsInvoiceLocator {
    fn invoices_for(&self, reference: &ReferenceNumber) -> Result<Vec<InvoiceFile>> {
        if !reference.is_single_path_component() {
            tracing::warn!(
                reference = %reference,
                "Reference number is not a plain directory name, skipping"
            );
            return Ok(Vec::new());
        }

        let dir = self.root.join(reference.as_str());
        if dir.exists() && !dir.is_dir() {
            tracing::debug!(path = %dir.display(), "Reference path is not a directory");
            return Ok(Vec::new());
        }

        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(dir = %dir.display(), "No invoice directory");
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(UploaderError::InvoiceStore(format!(
                    "Failed to read invoice directory {}: {}",
                    dir.display(),
                    e
                )))
            }
        };

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                UploaderError::InvoiceStore(format!(
                    "Failed to read entry in {}: {}",
                    dir.display(),
                    e
                ))
            })?;
            let path = entry.path();
            // fs::metadata follows symlinks, as a glob would
            let is_file = fs::metadata(&path).map(|m| m.is_file()).unwrap_or(false);
            if is_file && self.matches(&path) {
                paths.push(path);
            }
        }

        paths.sort();
        Ok(paths.into_iter().map(InvoiceFile::new).collect())
    }

    fn check_root(&self) -> Result<()> {
        match fs::read_dir(&self.root) {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::warn!(root = %self.root.display(), "Invoice root does not exist");
                Ok(())
            }
            Err(e) => Err(UploaderError::InvoiceStore(format!(
                "Failed to read invoice root {}: {}",
                self.root.display(),
                e
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn locator(root: &Path) -> FsInvoiceLocator {
        FsInvoiceLocator::new(&InvoiceConfig {
            root: root.display().to_string(),
            extension: "pdf".to_string(),
        })
    }

    fn reference(raw: &str) -> ReferenceNumber {
        ReferenceNumber::new(raw).unwrap()
    }

    #[test]
    fn test_finds_pdfs_sorted() {
        let root = TempDir::new().unwrap();
        let dir = root.path().join("R1");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("b.pdf"), b"B").unwrap();
        fs::write(dir.join("a.pdf"), b"A").unwrap();

        let files = locator(root.path()).invoices_for(&reference("R1")).unwrap();
        let names: Vec<String> = files.iter().map(|f| f.file_name()).collect();
        assert_eq!(names, vec!["a.pdf", "b.pdf"]);
    }

    #[test]
    fn test_extension_is_case_sensitive() {
        let root = TempDir::new().unwrap();
        let dir = root.path().join("R1");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("upper.PDF"), b"X").unwrap();
        fs::write(dir.join("notes.txt"), b"X").unwrap();
        fs::write(dir.join("lower.pdf"), b"X").unwrap();

        let files = locator(root.path()).invoices_for(&reference("R1")).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].file_name(), "lower.pdf");
    }

    #[test]
    fn test_single_level_and_no_hidden_files() {
        let root = TempDir::new().unwrap();
        let dir = root.path().join("R1");
        fs::create_dir_all(dir.join("nested")).unwrap();
        fs::write(dir.join("nested").join("deep.pdf"), b"X").unwrap();
        fs::write(dir.join(".hidden.pdf"), b"X").unwrap();
        fs::create_dir_all(dir.join("folder.pdf")).unwrap();

        let files = locator(root.path()).invoices_for(&reference("R1")).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_missing_directory_is_empty() {
        let root = TempDir::new().unwrap();
        let files = locator(root.path()).invoices_for(&reference("R404")).unwrap();
        assert!(files.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_unlistable_reference_directory_is_error() {
        let root = TempDir::new().unwrap();
        let looped = root.path().join("R2");
        std::os::unix::fs::symlink(&looped, &looped).unwrap();

        let result = locator(root.path()).invoices_for(&reference("R2"));
        assert!(matches!(result, Err(UploaderError::InvoiceStore(_))));
    }

    #[test]
    fn test_check_root() {
        let root = TempDir::new().unwrap();
        assert!(locator(root.path()).check_root().is_ok());
        assert!(locator(&root.path().join("missing")).check_root().is_ok());

        let file = root.path().join("not-a-dir");
        fs::write(&file, b"X").unwrap();
        assert!(matches!(
            locator(&file).check_root(),
            Err(UploaderError::InvoiceStore(_))
        ));
    }

    #[test]
    fn test_traversal_reference_is_rejected() {
        let root = TempDir::new().unwrap();
        fs::write(root.path().join("top.pdf"), b"X").unwrap();

        let files = locator(root.path()).invoices_for(&reference("..")).unwrap();
        assert!(files.is_empty());
    }
}
