use std::cell::RefCell;
use std::rc::Rc;

use super::pipeline::{dispatch_effect, dispatch_page_count, dispatch_render};
use super::state::{
    AppState, BackendEvent, PageStep, PreviewStatus, refresh_all, refresh_converted,
    refresh_converted_keep_sliders, refresh_header, refresh_preview, refresh_ruler,
};
use crate::reader::PaneAction;

/// Handle an event on the main thread. This is the orchestrator: it applies
/// the matching transition, starts any async work it calls for, then
/// redraws what changed.
pub fn handle_backend_event(state: &Rc<RefCell<AppState>>, event: BackendEvent) {
    match event {
        BackendEvent::FileChosen(path) => {
            log::info!("Selected {}", path.display());
            let (effect, token) = {
                let mut s = state.borrow_mut();
                s.pane.document_changed();
                let effect = s.session.select_file(path.clone());
                s.pager.reset();
                s.preview_token += 1;
                s.preview_status = PreviewStatus::Loading;
                (effect, s.preview_token)
            };
            dispatch_effect(state, effect);
            dispatch_page_count(state, path, token);
            refresh_all(state);
        }
        BackendEvent::UploadComplete { request, doc_id } => {
            let effect = state.borrow_mut().session.upload_succeeded(request, doc_id);
            if let Some(effect) = effect {
                dispatch_effect(state, effect);
            }
            refresh_header(state);
        }
        BackendEvent::UploadFailed { request, message } => {
            let applied = {
                let mut s = state.borrow_mut();
                let applied = s.session.upload_failed(request, message.clone());
                if applied {
                    let units = s.session.units().to_vec();
                    s.pane.replace_units(units);
                }
                applied
            };
            if applied {
                log::error!("Upload failed: {message}");
                refresh_header(state);
                refresh_converted(state);
            }
        }
        BackendEvent::ConversionComplete { request, units } => {
            let applied = {
                let mut s = state.borrow_mut();
                let applied = s.session.conversion_succeeded(request, units);
                if applied {
                    let units = s.session.units().to_vec();
                    s.pane.replace_units(units);
                }
                applied
            };
            if applied {
                refresh_header(state);
                refresh_converted(state);
            }
        }
        BackendEvent::ConversionFailed { request, message } => {
            let applied = state.borrow_mut().session.conversion_failed(request, message.clone());
            if applied {
                log::error!("Conversion failed: {message}");
                refresh_header(state);
            }
        }
        BackendEvent::ModeSelected(mode) => {
            let effect = {
                let mut s = state.borrow_mut();
                if s.session.mode() == mode {
                    return;
                }
                log::info!("Switching to {} mode", mode.as_query());
                s.pane.set_mode(mode);
                s.config.mode = mode;
                s.save_config();
                s.session.select_mode(mode)
            };
            if let Some(effect) = effect {
                dispatch_effect(state, effect);
            }
            refresh_header(state);
            refresh_converted(state);
        }
        BackendEvent::PageCountLoaded { token, count } => {
            {
                let mut s = state.borrow_mut();
                if token != s.preview_token {
                    return;
                }
                s.pager.set_count(count);
            }
            dispatch_render(state);
            refresh_preview(state);
        }
        BackendEvent::PageRendered { token, page, image } => {
            {
                let mut s = state.borrow_mut();
                if token != s.preview_token || page != s.pager.page() {
                    log::debug!("Dropping stale render of page {page}");
                    return;
                }
                s.preview_status = PreviewStatus::Image(image);
            }
            refresh_preview(state);
        }
        BackendEvent::PreviewFailed { token, message } => {
            {
                let mut s = state.borrow_mut();
                if token != s.preview_token {
                    return;
                }
                s.preview_status = PreviewStatus::Failed(message);
            }
            refresh_preview(state);
        }
        BackendEvent::PreviewStep(step) => {
            let moved = {
                let mut s = state.borrow_mut();
                match step {
                    PageStep::Prev => s.pager.prev(),
                    PageStep::Next => s.pager.next(),
                }
            };
            if moved {
                dispatch_render(state);
                refresh_preview(state);
            }
        }
        BackendEvent::Pane(action) => {
            {
                let mut s = state.borrow_mut();
                s.pane.apply(action);
                let rate = s.pane.playback().rate();
                if matches!(action, PaneAction::SpeechRate(_)) && rate != s.config.speech_rate {
                    s.config.speech_rate = rate;
                    s.save_config();
                }
            }
            match action {
                PaneAction::MoveRuler { .. } => refresh_ruler(state),
                _ if action.is_slider() => refresh_converted_keep_sliders(state),
                _ => refresh_converted(state),
            }
        }
        BackendEvent::UtteranceFinished(id) => {
            state.borrow_mut().pane.on_utterance_finished(id);
            refresh_converted(state);
        }
    }
}
