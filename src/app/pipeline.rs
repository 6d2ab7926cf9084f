use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use super::state::{AppState, BackendEvent};
use crate::preview::{READ_FAILED_MESSAGE, RENDER_FAILED_MESSAGE};
use crate::reader::Effect;

/// Start the HTTP request a session transition asked for. Nothing waits on
/// it: the result comes back as a `BackendEvent` tagged with its request id.
pub fn dispatch_effect(state: &Rc<RefCell<AppState>>, effect: Effect) {
    let s = state.borrow();
    let client = s.backend.clone();
    let sender = s.backend_sender.clone();

    match effect {
        Effect::Upload { request, path } => {
            s.tokio_rt.spawn(async move {
                let event = match client.upload(&path).await {
                    Ok(doc_id) => BackendEvent::UploadComplete { request, doc_id },
                    Err(e) => BackendEvent::UploadFailed {
                        request,
                        message: e.to_string(),
                    },
                };
                let _ = sender.send(event).await;
            });
        }
        Effect::Convert {
            request,
            doc_id,
            mode,
        } => {
            s.tokio_rt.spawn(async move {
                let event = match client.convert(&doc_id, mode).await {
                    Ok(units) => BackendEvent::ConversionComplete { request, units },
                    Err(e) => BackendEvent::ConversionFailed {
                        request,
                        message: e.to_string(),
                    },
                };
                let _ = sender.send(event).await;
            });
        }
    }
}

/// Read the page count of a freshly chosen file. Pages rendered for
/// earlier files are dropped from the cache first.
pub fn dispatch_page_count(state: &Rc<RefCell<AppState>>, path: PathBuf, token: u64) {
    let s = state.borrow();
    let sender = s.backend_sender.clone();

    s.tokio_rt.spawn(async move {
        match crate::preview::prune_cache(token).await {
            Ok(0) => {}
            Ok(removed) => log::debug!("Removed {removed} cached preview pages"),
            Err(e) => log::warn!("Could not prune preview cache: {e}"),
        }
        let event = match crate::preview::page_count(&path).await {
            Ok(count) => BackendEvent::PageCountLoaded { token, count },
            Err(e) => {
                log::error!("Preview of {} failed: {e}", path.display());
                BackendEvent::PreviewFailed {
                    token,
                    message: READ_FAILED_MESSAGE.into(),
                }
            }
        };
        let _ = sender.send(event).await;
    });
}

/// Render the pager's current page of the selected file.
pub fn dispatch_render(state: &Rc<RefCell<AppState>>) {
    let s = state.borrow();
    let Some(path) = s.session.file().map(|p| p.to_path_buf()) else {
        return;
    };
    let page = s.pager.page();
    let token = s.preview_token;
    let sender = s.backend_sender.clone();

    s.tokio_rt.spawn(async move {
        let event = match crate::preview::render_page(&path, page, token).await {
            Ok(image) => BackendEvent::PageRendered { token, page, image },
            Err(e) => {
                log::error!("Rendering page {page} failed: {e}");
                BackendEvent::PreviewFailed {
                    token,
                    message: RENDER_FAILED_MESSAGE.into(),
                }
            }
        };
        let _ = sender.send(event).await;
    });
}
