//! Document host boundary
//!
//! The chat reads the user's current selection from a document and writes
//! generated text back over it. [`DocumentHost`] is that boundary;
//! [`FileDocument`] backs it with a plain-text file and a line-range
//! selection, and [`MemoryDocument`] keeps everything in memory.

use crate::error::{DocchatError, Result};
use async_trait::async_trait;
use std::ops::Range;
use std::path::{Path, PathBuf};

/// Maximum number of characters shown in a selection preview
pub const PREVIEW_CHARS: usize = 200;

/// Read and replace the current selection of a document
#[async_trait]
pub trait DocumentHost: Send + Sync {
    /// Text of the current selection; empty when nothing is selected
    ///
    /// # Errors
    ///
    /// Returns `DocchatError::HostIntegration` when the document cannot be read.
    async fn selected_text(&self) -> Result<String>;

    /// Replace the current selection with `text`
    ///
    /// # Errors
    ///
    /// Returns `DocchatError::HostIntegration` when there is no selection or
    /// the document rejects the write.
    async fn replace_selection(&mut self, text: &str) -> Result<()>;

    /// Short human-readable name of the document
    fn describe(&self) -> String;
}

/// Preview of a selection for display
///
/// Returns `None` for blank selections. Longer selections are cut to
/// [`PREVIEW_CHARS`] characters followed by `...`.
///
/// # Examples
///
/// ```
/// use docchat::document::selection_preview;
///
/// assert_eq!(selection_preview("  "), None);
/// assert_eq!(selection_preview("short").as_deref(), Some("short"));
/// let long = "a".repeat(250);
/// assert_eq!(selection_preview(&long).unwrap().len(), 203);
/// ```
pub fn selection_preview(text: &str) -> Option<String> {
    if text.trim().is_empty() {
        return None;
    }
    if text.chars().count() > PREVIEW_CHARS {
        let head: String = text.chars().take(PREVIEW_CHARS).collect();
        Some(format!("{}...", head))
    } else {
        Some(text.to_string())
    }
}

/// A plain-text file with an inclusive, 1-based line-range selection
#[derive(Debug, Clone)]
pub struct FileDocument {
    path: PathBuf,
    selection: Option<(usize, usize)>,
}

impl FileDocument {
    /// Open a document; the file must exist
    ///
    /// # Errors
    ///
    /// Returns `DocchatError::HostIntegration` when the path is not a file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.is_file() {
            return Err(DocchatError::HostIntegration(format!(
                "Document not found: {}",
                path.display()
            ))
            .into());
        }
        Ok(Self {
            path,
            selection: None,
        })
    }

    /// Path of the underlying file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current selection as `(first_line, last_line)`
    pub fn selection(&self) -> Option<(usize, usize)> {
        self.selection
    }

    /// Select an inclusive, 1-based range of lines
    ///
    /// # Errors
    ///
    /// Returns `DocchatError::HostIntegration` when the range is empty,
    /// reversed or past the end of the document.
    pub fn select_lines(&mut self, first: usize, last: usize) -> Result<()> {
        let line_count = self.read_lines()?.len();
        if first == 0 || last < first || last > line_count {
            return Err(DocchatError::HostIntegration(format!(
                "Invalid selection {}-{} (document has {} lines)",
                first, last, line_count
            ))
            .into());
        }
        self.selection = Some((first, last));
        tracing::debug!(first, last, "Selection changed");
        Ok(())
    }

    /// Drop the selection
    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    fn read_lines(&self) -> Result<Vec<String>> {
        let contents = std::fs::read_to_string(&self.path).map_err(|e| {
            DocchatError::HostIntegration(format!("Failed to read {}: {}", self.path.display(), e))
        })?;
        Ok(contents.lines().map(str::to_string).collect())
    }
}

#[async_trait]
impl DocumentHost for FileDocument {
    async fn selected_text(&self) -> Result<String> {
        let Some((first, last)) = self.selection else {
            return Ok(String::new());
        };
        let lines = self.read_lines()?;
        if last > lines.len() {
            return Err(DocchatError::HostIntegration(
                "Selection is outside the document; select again".to_string(),
            )
            .into());
        }
        Ok(lines[first - 1..last].join("\n"))
    }

    async fn replace_selection(&mut self, text: &str) -> Result<()> {
        let (first, last) = self
            .selection
            .ok_or_else(|| DocchatError::HostIntegration("No active selection".to_string()))?;

        let mut lines = self.read_lines()?;
        if last > lines.len() {
            return Err(DocchatError::HostIntegration(
                "Selection is outside the document; select again".to_string(),
            )
            .into());
        }

        let mut replacement: Vec<String> = text.lines().map(str::to_string).collect();
        if replacement.is_empty() {
            replacement.push(String::new());
        }
        let inserted = replacement.len();
        lines.splice(first - 1..last, replacement);

        let mut contents = lines.join("\n");
        contents.push('\n');
        std::fs::write(&self.path, contents).map_err(|e| {
            DocchatError::HostIntegration(format!("Failed to write {}: {}", self.path.display(), e))
        })?;

        self.selection = Some((first, first + inserted - 1));
        tracing::info!(path = %self.path.display(), first, "Replaced selection");
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// An in-memory document with a byte-range selection
#[derive(Debug, Clone, Default)]
pub struct MemoryDocument {
    text: String,
    selection: Option<Range<usize>>,
    reject_writes: bool,
}

impl MemoryDocument {
    /// Create a document with no selection
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            selection: None,
            reject_writes: false,
        }
    }

    /// Select the first occurrence of `needle`; returns false if absent
    pub fn select_text(&mut self, needle: &str) -> bool {
        match self.text.find(needle) {
            Some(start) => {
                self.selection = Some(start..start + needle.len());
                true
            }
            None => false,
        }
    }

    /// Make every write fail, as a host without an active document would
    pub fn reject_writes(&mut self, reject: bool) {
        self.reject_writes = reject;
    }

    /// Full document text
    pub fn text(&self) -> &str {
        &self.text
    }
}

#[async_trait]
impl DocumentHost for MemoryDocument {
    async fn selected_text(&self) -> Result<String> {
        Ok(self
            .selection
            .clone()
            .and_then(|range| self.text.get(range))
            .unwrap_or_default()
            .to_string())
    }

    async fn replace_selection(&mut self, text: &str) -> Result<()> {
        if self.reject_writes {
            return Err(DocchatError::HostIntegration("Document is not active".to_string()).into());
        }
        let range = self
            .selection
            .clone()
            .ok_or_else(|| DocchatError::HostIntegration("No active selection".to_string()))?;
        self.text.replace_range(range.clone(), text);
        self.selection = Some(range.start..range.start + text.len());
        Ok(())
    }

    fn describe(&self) -> String {
        "in-memory document".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{create_test_file, temp_dir};
    use tempfile::TempDir;

    fn document(contents: &str) -> (TempDir, FileDocument) {
        let dir = temp_dir();
        let path = create_test_file(&dir, "doc.txt", contents);
        let doc = FileDocument::open(&path).unwrap();
        (dir, doc)
    }

    #[test]
    fn test_preview_truncates_by_characters() {
        let text = "é".repeat(201);
        let preview = selection_preview(&text).unwrap();
        assert!(preview.ends_with("..."));
        assert_eq!(preview.chars().count(), PREVIEW_CHARS + 3);
    }

    #[test]
    fn test_preview_exactly_at_limit_is_untouched() {
        let text = "b".repeat(PREVIEW_CHARS);
        assert_eq!(selection_preview(&text), Some(text));
    }

    #[test]
    fn test_open_missing_file() {
        let err = FileDocument::open("/definitely/not/here.txt").unwrap_err();
        assert!(err.to_string().contains("Document not found"));
    }

    #[tokio::test]
    async fn test_no_selection_reads_empty() {
        let (_dir, doc) = document("one\ntwo\n");
        assert_eq!(doc.selected_text().await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_select_and_read_lines() {
        let (_dir, mut doc) = document("one\ntwo\nthree\nfour\n");
        doc.select_lines(2, 3).unwrap();
        assert_eq!(doc.selected_text().await.unwrap(), "two\nthree");
    }

    #[test]
    fn test_select_out_of_range() {
        let (_dir, mut doc) = document("one\ntwo\n");
        assert!(doc.select_lines(0, 1).is_err());
        assert!(doc.select_lines(2, 1).is_err());
        assert!(doc.select_lines(1, 3).is_err());
        assert_eq!(doc.selection(), None);
    }

    #[tokio::test]
    async fn test_replace_selection_rewrites_file() {
        let (_dir, mut doc) = document("one\ntwo\nthree\n");
        doc.select_lines(2, 2).unwrap();
        doc.replace_selection("TWO\nand a half").await.unwrap();

        let contents = std::fs::read_to_string(doc.path()).unwrap();
        assert_eq!(contents, "one\nTWO\nand a half\nthree\n");
        assert_eq!(doc.selection(), Some((2, 3)));
        assert_eq!(doc.selected_text().await.unwrap(), "TWO\nand a half");
    }

    #[tokio::test]
    async fn test_replace_without_selection_is_host_error() {
        let (_dir, mut doc) = document("one\n");
        let err = doc.replace_selection("x").await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DocchatError>(),
            Some(DocchatError::HostIntegration(_))
        ));
    }

    #[tokio::test]
    async fn test_memory_document_replace() {
        let mut doc = MemoryDocument::new("The quick brown fox");
        assert!(doc.select_text("quick"));
        assert_eq!(doc.selected_text().await.unwrap(), "quick");

        doc.replace_selection("slow").await.unwrap();
        assert_eq!(doc.text(), "The slow brown fox");
        assert_eq!(doc.selected_text().await.unwrap(), "slow");
    }

    #[tokio::test]
    async fn test_memory_document_rejects_writes() {
        let mut doc = MemoryDocument::new("abc");
        doc.select_text("b");
        doc.reject_writes(true);
        assert!(doc.replace_selection("x").await.is_err());
        assert_eq!(doc.text(), "abc");
    }
}
