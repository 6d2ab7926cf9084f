use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::process::Command;

/// Resolution of the rendered preview image.
const PREVIEW_DPI: u32 = 110;

pub const READ_FAILED_MESSAGE: &str = "Could not read this file. Try another PDF.";
pub const RENDER_FAILED_MESSAGE: &str = "Failed to load PDF. Try a different (non-password) PDF.";

#[derive(Debug, Error)]
pub enum PreviewError {
    #[error("failed to run {program}: {source}; is poppler-utils installed?")]
    Spawn {
        program: &'static str,
        source: std::io::Error,
    },
    #[error("{program} failed: {stderr}")]
    Failed {
        program: &'static str,
        stderr: String,
    },
    #[error("no page count in pdfinfo output")]
    NoPageCount,
    #[error("cache directory unavailable: {0}")]
    Cache(std::io::Error),
}

/// Directory for rendered pages: ~/.cache/easy-reader/preview/
fn cache_dir() -> PathBuf {
    let mut p = dirs::cache_dir().unwrap_or_else(std::env::temp_dir);
    p.push("easy-reader");
    p.push("preview");
    p
}

async fn run(program: &'static str, command: &mut Command) -> Result<String, PreviewError> {
    let output = command
        .output()
        .await
        .map_err(|source| PreviewError::Spawn { program, source })?;
    if !output.status.success() {
        return Err(PreviewError::Failed {
            program,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Number of pages in the document.
pub async fn page_count(pdf: &Path) -> Result<u32, PreviewError> {
    let stdout = run("pdfinfo", Command::new("pdfinfo").arg(pdf)).await?;
    parse_page_count(&stdout).ok_or(PreviewError::NoPageCount)
}

fn parse_page_count(pdfinfo: &str) -> Option<u32> {
    pdfinfo
        .lines()
        .find_map(|line| line.strip_prefix("Pages:"))
        .and_then(|rest| rest.trim().parse().ok())
}

fn render_prefix(token: u64) -> String {
    format!("doc{token}-")
}

/// Whether a cached file belongs to a document other than `token`.
fn is_stale_render(file_name: &str, token: u64) -> bool {
    !file_name.starts_with(&render_prefix(token))
}

/// Remove rendered pages of every document except `token`, including
/// leftovers from earlier runs.
pub async fn prune_cache(token: u64) -> Result<usize, PreviewError> {
    let mut entries = match tokio::fs::read_dir(cache_dir()).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(PreviewError::Cache(e)),
    };
    let mut removed = 0;
    while let Some(entry) = entries.next_entry().await.map_err(PreviewError::Cache)? {
        let name = entry.file_name();
        if !is_stale_render(&name.to_string_lossy(), token) {
            continue;
        }
        match tokio::fs::remove_file(entry.path()).await {
            Ok(()) => removed += 1,
            Err(e) => log::debug!("Could not remove {}: {e}", entry.path().display()),
        }
    }
    Ok(removed)
}

/// Rasterize one page (1-based) to a PNG and return its path.
/// `token` keeps renders of different documents apart in the cache.
pub async fn render_page(pdf: &Path, page: u32, token: u64) -> Result<PathBuf, PreviewError> {
    let dir = cache_dir();
    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(PreviewError::Cache)?;

    let prefix = dir.join(format!("{}page{page}", render_prefix(token)));
    run(
        "pdftoppm",
        Command::new("pdftoppm")
            .arg("-png")
            .arg("-r")
            .arg(PREVIEW_DPI.to_string())
            .arg("-f")
            .arg(page.to_string())
            .arg("-l")
            .arg(page.to_string())
            .arg("-singlefile")
            .arg(pdf)
            .arg(&prefix),
    )
    .await?;

    let image = prefix.with_extension("png");
    log::debug!("Rendered page {page} to {}", image.display());
    Ok(image)
}

/// Page navigation for the original-document pane.
#[derive(Debug, Clone, PartialEq)]
pub struct Pager {
    page: u32,
    /// Unknown until the page count arrives.
    count: Option<u32>,
}

impl Default for Pager {
    fn default() -> Self {
        Self { page: 1, count: None }
    }
}

impl Pager {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn set_count(&mut self, count: u32) {
        self.count = Some(count);
        if count > 0 {
            self.page = self.page.min(count);
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn can_prev(&self) -> bool {
        self.page > 1
    }

    pub fn can_next(&self) -> bool {
        self.count.is_some_and(|count| self.page < count)
    }

    /// Returns whether the page changed.
    pub fn prev(&mut self) -> bool {
        if !self.can_prev() {
            return false;
        }
        self.page -= 1;
        true
    }

    /// Returns whether the page changed.
    pub fn next(&mut self) -> bool {
        if !self.can_next() {
            return false;
        }
        self.page += 1;
        true
    }

    pub fn label(&self) -> String {
        match self.count {
            Some(count) if count > 0 => format!("Page {} of {count}", self.page),
            _ => format!("Page {}", self.page),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_pdfinfo_pages_line() {
        let out = "Title:          Sample\nProducer:       pdfTeX\nPages:          12\nEncrypted:      no\n";
        assert_eq!(parse_page_count(out), Some(12));
        assert_eq!(parse_page_count("Title: x\n"), None);
    }

    #[test]
    fn only_other_documents_are_pruned() {
        assert!(!is_stale_render("doc3-page1.png", 3));
        assert!(!is_stale_render("doc3-page12.png", 3));
        assert!(is_stale_render("doc2-page1.png", 3));
        assert!(is_stale_render("doc33-page1.png", 3));
        assert!(is_stale_render("notes.txt", 3));
    }

    #[test]
    fn pager_bounds() {
        let mut pager = Pager::default();
        assert!(!pager.can_prev());
        assert!(!pager.next(), "next is disabled until the count is known");

        pager.set_count(2);
        assert!(pager.next());
        assert!(!pager.next());
        assert_eq!(pager.label(), "Page 2 of 2");
        assert!(pager.prev());
        assert!(!pager.prev());

        pager.reset();
        assert_eq!(pager.page(), 1);
        assert_eq!(pager.label(), "Page 1");
    }
}
