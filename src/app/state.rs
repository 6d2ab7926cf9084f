use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use crate::backend::BackendClient;
use crate::config::Config;
use crate::preview::Pager;
use crate::reader::{DocumentId, PaneAction, PlaybackSequencer, ReaderSession, ReadingMode, ReadingPane};
use crate::speech::ProcessSpeech;
use crate::ui::window::MainWindow;

/// Direction for the original-document pager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageStep {
    Prev,
    Next,
}

/// Events delivered to the GTK main thread, from widgets and from work
/// running on the tokio runtime.
#[derive(Debug, Clone)]
pub enum BackendEvent {
    FileChosen(PathBuf),
    UploadComplete { request: u64, doc_id: DocumentId },
    UploadFailed { request: u64, message: String },
    ConversionComplete { request: u64, units: Vec<String> },
    ConversionFailed { request: u64, message: String },
    ModeSelected(ReadingMode),
    PageCountLoaded { token: u64, count: u32 },
    PageRendered { token: u64, page: u32, image: PathBuf },
    PreviewFailed { token: u64, message: String },
    PreviewStep(PageStep),
    Pane(PaneAction),
    UtteranceFinished(u64),
}

/// What the original-document pane currently shows.
#[derive(Debug, Clone, PartialEq)]
pub enum PreviewStatus {
    Empty,
    Loading,
    Image(PathBuf),
    Failed(String),
}

/// Central application state. Lives on the GTK main thread inside Rc<RefCell<>>.
pub struct AppState {
    pub config: Config,
    pub session: ReaderSession,
    pub pane: ReadingPane<ProcessSpeech>,
    pub tokio_rt: tokio::runtime::Runtime,
    pub backend: BackendClient,
    pub backend_sender: async_channel::Sender<BackendEvent>,

    // Original-document preview
    pub pager: Pager,
    /// Bumped per file so renders of a previous document are discarded.
    pub preview_token: u64,
    pub preview_status: PreviewStatus,

    // UI handles
    pub window: Option<MainWindow>,
}

impl AppState {
    pub fn new(sender: async_channel::Sender<BackendEvent>) -> Self {
        let config = Config::load();
        let tokio_rt = tokio::runtime::Runtime::new()
            .expect("Failed to create tokio runtime");
        let backend = BackendClient::new(&config.backend_url);

        let speech = ProcessSpeech::new(
            config.speech_command.as_deref(),
            tokio_rt.handle().clone(),
            sender.clone(),
        );
        let playback = PlaybackSequencer::new(speech, config.speech_rate);

        Self {
            session: ReaderSession::new(config.mode),
            pane: ReadingPane::new(config.mode, playback),
            config,
            tokio_rt,
            backend,
            backend_sender: sender,
            pager: Pager::default(),
            preview_token: 0,
            preview_status: PreviewStatus::Empty,
            window: None,
        }
    }

    pub fn save_config(&self) {
        if let Err(e) = self.config.save() {
            log::warn!("Failed to save config: {e}");
        }
    }
}

/// Redraw the header: mode toggle, loading indicator and error text.
pub fn refresh_header(state: &Rc<RefCell<AppState>>) {
    let s = state.borrow();
    if let Some(ref window) = s.window {
        crate::ui::window::update_header(window, &s.session);
    }
}

/// Redraw the converted pane from the pane state.
pub fn refresh_converted(state: &Rc<RefCell<AppState>>) {
    redraw_converted(state, true);
}

/// Redraw after a slider moved, leaving the sliders where the user put them.
pub fn refresh_converted_keep_sliders(state: &Rc<RefCell<AppState>>) {
    redraw_converted(state, false);
}

fn redraw_converted(state: &Rc<RefCell<AppState>>, sync_sliders: bool) {
    let s = state.borrow();
    if let Some(ref window) = s.window {
        crate::ui::converted::render(&window.converted, &s.pane, sync_sliders);
    }
}

/// Redraw only the ruler overlay. Pointer motion lands here.
pub fn refresh_ruler(state: &Rc<RefCell<AppState>>) {
    let s = state.borrow();
    if let Some(ref window) = s.window {
        crate::ui::converted::render_ruler(&window.converted, &s.pane);
    }
}

pub fn refresh_preview(state: &Rc<RefCell<AppState>>) {
    let s = state.borrow();
    if let Some(ref window) = s.window {
        crate::ui::preview_pane::render(&window.preview, &s.pager, &s.preview_status);
    }
}

pub fn refresh_all(state: &Rc<RefCell<AppState>>) {
    refresh_header(state);
    refresh_preview(state);
    refresh_converted(state);
}
