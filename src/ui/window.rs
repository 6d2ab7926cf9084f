use gtk4::prelude::*;
use libadwaita::prelude::*;

use crate::app::BackendEvent;
use crate::reader::{ReaderSession, ReadingMode};
use crate::ui::converted::{build_converted, ConvertedWidgets};
use crate::ui::preview_pane::{build_preview, PreviewWidgets};

/// Handles returned from building the main window.
pub struct MainWindow {
    pub window: libadwaita::ApplicationWindow,
    pub mode_buttons: Vec<(ReadingMode, gtk4::Button)>,
    pub loading_label: gtk4::Label,
    pub error_label: gtk4::Label,
    pub stack: gtk4::Stack,
    pub preview: PreviewWidgets,
    pub converted: ConvertedWidgets,
}

/// Build the split-screen reader window.
pub fn build_window(
    app: &libadwaita::Application,
    sender: async_channel::Sender<BackendEvent>,
) -> MainWindow {
    let window = libadwaita::ApplicationWindow::builder()
        .application(app)
        .title("Easy Reader")
        .default_width(1280)
        .default_height(820)
        .build();

    let toolbar_view = libadwaita::ToolbarView::new();
    let header = libadwaita::HeaderBar::new();

    // --- Mode toggle ---
    let toggle = gtk4::Box::new(gtk4::Orientation::Horizontal, 0);
    toggle.add_css_class("linked");
    let mode_buttons: Vec<(ReadingMode, gtk4::Button)> = ReadingMode::ALL
        .iter()
        .map(|&mode| {
            let button = gtk4::Button::with_label(mode.label());
            let sender = sender.clone();
            button.connect_clicked(move |_| {
                let _ = sender.try_send(BackendEvent::ModeSelected(mode));
            });
            toggle.append(&button);
            (mode, button)
        })
        .collect();
    header.pack_start(&toggle);

    let loading_label = gtk4::Label::new(Some("Converting\u{2026}"));
    loading_label.add_css_class("loading-label");
    loading_label.set_visible(false);
    header.pack_start(&loading_label);

    let error_label = gtk4::Label::new(None);
    error_label.add_css_class("error-label");
    error_label.set_ellipsize(gtk4::pango::EllipsizeMode::End);
    error_label.set_max_width_chars(60);
    error_label.set_visible(false);
    header.pack_start(&error_label);

    // --- Upload ---
    let upload_button = gtk4::Button::with_label("Upload PDF");
    upload_button.add_css_class("suggested-action");
    {
        let sender = sender.clone();
        upload_button.connect_clicked(move |button| {
            let parent = button
                .root()
                .and_then(|root| root.downcast::<gtk4::Window>().ok());
            choose_pdf(parent.as_ref(), sender.clone());
        });
    }
    header.pack_end(&upload_button);

    toolbar_view.add_top_bar(&header);

    // --- Content ---
    let empty = gtk4::Label::new(Some("Upload a PDF to generate converted text."));
    empty.add_css_class("dim-label");
    empty.set_vexpand(true);
    empty.set_valign(gtk4::Align::Center);

    let preview = build_preview(sender.clone());
    let converted = build_converted(sender);

    let paned = gtk4::Paned::new(gtk4::Orientation::Horizontal);
    paned.set_start_child(Some(&preview.root));
    paned.set_end_child(Some(&converted.root));
    paned.set_position(560);
    paned.set_wide_handle(true);

    let stack = gtk4::Stack::new();
    stack.add_named(&empty, Some("empty"));
    stack.add_named(&paned, Some("reader"));
    stack.set_visible_child_name("empty");

    toolbar_view.set_content(Some(&stack));
    window.set_content(Some(&toolbar_view));

    MainWindow {
        window,
        mode_buttons,
        loading_label,
        error_label,
        stack,
        preview,
        converted,
    }
}

/// Open a file chooser limited to PDFs and report the pick.
fn choose_pdf(parent: Option<&gtk4::Window>, sender: async_channel::Sender<BackendEvent>) {
    let filter = gtk4::FileFilter::new();
    filter.set_name(Some("PDF documents"));
    filter.add_mime_type("application/pdf");
    filter.add_suffix("pdf");

    let dialog = gtk4::FileDialog::builder()
        .title("Upload PDF")
        .modal(true)
        .default_filter(&filter)
        .build();

    dialog.open(parent, None::<&gtk4::gio::Cancellable>, move |result| match result {
        Ok(file) => match file.path() {
            Some(path) => {
                let _ = sender.try_send(BackendEvent::FileChosen(path));
            }
            None => log::warn!("Selected file has no local path"),
        },
        Err(e) => log::debug!("File chooser closed: {e}"),
    });
}

pub fn update_header(window: &MainWindow, session: &ReaderSession) {
    for (mode, button) in &window.mode_buttons {
        if *mode == session.mode() {
            button.add_css_class("suggested-action");
        } else {
            button.remove_css_class("suggested-action");
        }
    }

    window.loading_label.set_visible(session.is_loading());

    match session.error() {
        Some(message) => {
            window.error_label.set_text(message);
            window.error_label.set_tooltip_text(Some(message));
            window.error_label.set_visible(true);
        }
        None => window.error_label.set_visible(false),
    }

    let page = if session.file().is_some() { "reader" } else { "empty" };
    window.stack.set_visible_child_name(page);
}
