use std::path::{Path, PathBuf};

use super::{DocumentId, ReadingMode};

pub const NO_TEXT_PLACEHOLDER: &str = "No text found (scanned PDF?)";
pub const UPLOAD_FAILED_PLACEHOLDER: &str = "Upload failed. Check backend is running.";

/// Async work the glue layer must start after a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Upload {
        request: u64,
        path: PathBuf,
    },
    Convert {
        request: u64,
        doc_id: DocumentId,
        mode: ReadingMode,
    },
}

/// Upload/convert lifecycle for the current document.
///
/// Requests are numbered as they are issued. A response is applied only if
/// it answers the most recent request of its kind; anything older has been
/// superseded by a later file or mode change and is dropped.
#[derive(Debug)]
pub struct ReaderSession {
    file: Option<PathBuf>,
    mode: ReadingMode,
    doc_id: Option<DocumentId>,
    units: Vec<String>,
    loading: bool,
    error: Option<String>,
    next_request: u64,
    latest_upload: Option<u64>,
    latest_convert: Option<u64>,
}

impl ReaderSession {
    pub fn new(mode: ReadingMode) -> Self {
        Self {
            file: None,
            mode,
            doc_id: None,
            units: Vec::new(),
            loading: false,
            error: None,
            next_request: 1,
            latest_upload: None,
            latest_convert: None,
        }
    }

    pub fn select_file(&mut self, path: PathBuf) -> Effect {
        let request = self.allocate_request();
        self.file = Some(path.clone());
        self.doc_id = None;
        self.latest_upload = Some(request);
        self.latest_convert = None;
        self.loading = true;
        self.error = None;
        Effect::Upload { request, path }
    }

    pub fn upload_succeeded(&mut self, request: u64, doc_id: DocumentId) -> Option<Effect> {
        if self.latest_upload != Some(request) {
            log::debug!("Dropping superseded upload response #{request}");
            return None;
        }
        self.latest_upload = None;
        self.doc_id = Some(doc_id);
        self.convert()
    }

    /// Returns whether the failure was applied.
    pub fn upload_failed(&mut self, request: u64, message: String) -> bool {
        if self.latest_upload != Some(request) {
            log::debug!("Dropping superseded upload failure #{request}");
            return false;
        }
        self.latest_upload = None;
        self.loading = false;
        self.error = Some(message);
        self.units = vec![UPLOAD_FAILED_PLACEHOLDER.to_string()];
        true
    }

    /// Switch reading mode. Reconverts when a document is already uploaded.
    pub fn select_mode(&mut self, mode: ReadingMode) -> Option<Effect> {
        if mode == self.mode {
            return None;
        }
        self.mode = mode;
        self.convert()
    }

    /// Returns whether the result was applied.
    pub fn conversion_succeeded(&mut self, request: u64, units: Vec<String>) -> bool {
        if self.latest_convert != Some(request) {
            log::debug!("Dropping superseded conversion #{request}");
            return false;
        }
        self.latest_convert = None;
        self.loading = false;
        self.units = if units.is_empty() {
            vec![NO_TEXT_PLACEHOLDER.to_string()]
        } else {
            units
        };
        true
    }

    /// Returns whether the failure was applied. Units already shown stay.
    pub fn conversion_failed(&mut self, request: u64, message: String) -> bool {
        if self.latest_convert != Some(request) {
            log::debug!("Dropping superseded conversion failure #{request}");
            return false;
        }
        self.latest_convert = None;
        self.loading = false;
        self.error = Some(message);
        true
    }

    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    pub fn mode(&self) -> ReadingMode {
        self.mode
    }

    pub fn doc_id(&self) -> Option<&DocumentId> {
        self.doc_id.as_ref()
    }

    pub fn units(&self) -> &[String] {
        &self.units
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn convert(&mut self) -> Option<Effect> {
        let doc_id = self.doc_id.clone()?;
        let request = self.allocate_request();
        self.latest_convert = Some(request);
        self.loading = true;
        self.error = None;
        Some(Effect::Convert {
            request,
            doc_id,
            mode: self.mode,
        })
    }

    fn allocate_request(&mut self) -> u64 {
        let request = self.next_request;
        self.next_request += 1;
        request
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn convert_request(effect: Option<Effect>) -> u64 {
        match effect {
            Some(Effect::Convert { request, .. }) => request,
            other => panic!("expected conversion, got {other:?}"),
        }
    }

    fn upload(session: &mut ReaderSession, name: &str) -> u64 {
        match session.select_file(PathBuf::from(name)) {
            Effect::Upload { request, .. } => request,
            other => panic!("expected upload, got {other:?}"),
        }
    }

    #[test]
    fn upload_then_convert_shows_units() {
        let mut s = ReaderSession::new(ReadingMode::Dyslexia);
        let up = upload(&mut s, "book.pdf");
        assert!(s.is_loading());

        let effect = s.upload_succeeded(up, DocumentId::from("doc-1"));
        match &effect {
            Some(Effect::Convert { doc_id, mode, .. }) => {
                assert_eq!(doc_id.as_str(), "doc-1");
                assert_eq!(*mode, ReadingMode::Dyslexia);
            }
            other => panic!("unexpected {other:?}"),
        }
        let conv = convert_request(effect);
        assert!(s.conversion_succeeded(conv, vec!["Hello there.".into()]));
        assert_eq!(s.units(), ["Hello there."]);
        assert!(!s.is_loading());
    }

    #[test]
    fn empty_conversion_shows_placeholder() {
        let mut s = ReaderSession::new(ReadingMode::Dyslexia);
        let up = upload(&mut s, "scan.pdf");
        let conv = convert_request(s.upload_succeeded(up, DocumentId::from("d")));
        s.conversion_succeeded(conv, Vec::new());
        assert_eq!(s.units(), [NO_TEXT_PLACEHOLDER]);
    }

    #[test]
    fn upload_failure_sets_error_and_placeholder() {
        let mut s = ReaderSession::new(ReadingMode::Adhd);
        let up = upload(&mut s, "book.pdf");
        assert!(s.upload_failed(up, "Only PDF supported.".into()));
        assert_eq!(s.error(), Some("Only PDF supported."));
        assert_eq!(s.units(), [UPLOAD_FAILED_PLACEHOLDER]);
        assert!(!s.is_loading());
    }

    #[test]
    fn mode_change_without_document_does_not_convert() {
        let mut s = ReaderSession::new(ReadingMode::Dyslexia);
        assert!(s.select_mode(ReadingMode::Adhd).is_none());
        assert_eq!(s.mode(), ReadingMode::Adhd);
    }

    #[test]
    fn same_mode_is_noop() {
        let mut s = ReaderSession::new(ReadingMode::Dyslexia);
        let up = upload(&mut s, "book.pdf");
        s.upload_succeeded(up, DocumentId::from("d"));
        assert!(s.select_mode(ReadingMode::Dyslexia).is_none());
    }

    #[test]
    fn rapid_mode_changes_keep_latest_result() {
        let mut s = ReaderSession::new(ReadingMode::Dyslexia);
        let up = upload(&mut s, "book.pdf");
        let first = convert_request(s.upload_succeeded(up, DocumentId::from("d")));
        let second = convert_request(s.select_mode(ReadingMode::Adhd));

        assert!(s.conversion_succeeded(second, vec!["adhd page".into()]));
        // The older dyslexia conversion resolves last and must not win.
        assert!(!s.conversion_succeeded(first, vec!["dyslexia para".into()]));
        assert_eq!(s.units(), ["adhd page"]);
    }

    #[test]
    fn new_file_supersedes_pending_upload_and_conversion() {
        let mut s = ReaderSession::new(ReadingMode::Dyslexia);
        let up1 = upload(&mut s, "one.pdf");
        let conv1 = convert_request(s.upload_succeeded(up1, DocumentId::from("one")));
        let up2 = upload(&mut s, "two.pdf");

        assert!(s.doc_id().is_none());
        assert!(!s.conversion_succeeded(conv1, vec!["from one".into()]));
        assert!(s.upload_succeeded(up1, DocumentId::from("one")).is_none());

        let conv2 = convert_request(s.upload_succeeded(up2, DocumentId::from("two")));
        assert!(s.conversion_succeeded(conv2, vec!["from two".into()]));
        assert_eq!(s.units(), ["from two"]);
        assert_eq!(s.file(), Some(Path::new("two.pdf")));
    }

    #[test]
    fn conversion_failure_keeps_previous_units() {
        let mut s = ReaderSession::new(ReadingMode::Dyslexia);
        let up = upload(&mut s, "book.pdf");
        let conv = convert_request(s.upload_succeeded(up, DocumentId::from("d")));
        s.conversion_succeeded(conv, vec!["kept".into()]);

        let again = convert_request(s.select_mode(ReadingMode::Adhd));
        assert!(s.conversion_failed(again, "mode must be dyslexia or adhd".into()));
        assert_eq!(s.error(), Some("mode must be dyslexia or adhd"));
        assert_eq!(s.units(), ["kept"]);
    }
}
