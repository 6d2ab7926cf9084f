use gtk4::prelude::*;

use crate::app::{BackendEvent, PageStep, PreviewStatus};
use crate::preview::Pager;

/// Handles for the original-document pane.
pub struct PreviewWidgets {
    pub root: gtk4::Box,
    pub prev_button: gtk4::Button,
    pub next_button: gtk4::Button,
    pub page_label: gtk4::Label,
    pub stack: gtk4::Stack,
    pub picture: gtk4::Picture,
    pub message: gtk4::Label,
}

/// Build the left pane: pager header above the rendered page.
pub fn build_preview(sender: async_channel::Sender<BackendEvent>) -> PreviewWidgets {
    let root = gtk4::Box::new(gtk4::Orientation::Vertical, 8);
    root.set_margin_start(12);
    root.set_margin_end(12);
    root.set_margin_top(12);
    root.set_margin_bottom(12);

    let header = gtk4::Box::new(gtk4::Orientation::Horizontal, 8);
    let title = gtk4::Label::new(Some("Original Book"));
    title.add_css_class("heading");
    title.set_hexpand(true);
    title.set_xalign(0.0);

    let prev_button = gtk4::Button::with_label("Prev");
    let page_label = gtk4::Label::new(Some("Page -"));
    page_label.add_css_class("dim-label");
    let next_button = gtk4::Button::with_label("Next");

    header.append(&title);
    header.append(&prev_button);
    header.append(&page_label);
    header.append(&next_button);

    {
        let sender = sender.clone();
        prev_button.connect_clicked(move |_| {
            let _ = sender.try_send(BackendEvent::PreviewStep(PageStep::Prev));
        });
    }
    next_button.connect_clicked(move |_| {
        let _ = sender.try_send(BackendEvent::PreviewStep(PageStep::Next));
    });

    let picture = gtk4::Picture::new();
    picture.set_can_shrink(true);
    picture.set_vexpand(true);

    let message = gtk4::Label::new(Some("Upload a PDF to preview it here."));
    message.add_css_class("dim-label");
    message.set_wrap(true);
    message.set_vexpand(true);
    message.set_valign(gtk4::Align::Center);

    let stack = gtk4::Stack::new();
    stack.add_named(&picture, Some("page"));
    stack.add_named(&message, Some("message"));
    stack.set_visible_child_name("message");

    root.append(&header);
    root.append(&stack);

    PreviewWidgets {
        root,
        prev_button,
        next_button,
        page_label,
        stack,
        picture,
        message,
    }
}

pub fn render(widgets: &PreviewWidgets, pager: &Pager, status: &PreviewStatus) {
    let has_file = *status != PreviewStatus::Empty;
    widgets.prev_button.set_sensitive(has_file && pager.can_prev());
    widgets.next_button.set_sensitive(has_file && pager.can_next());
    widgets.page_label.set_text(&if has_file {
        pager.label()
    } else {
        "Page -".to_string()
    });

    match status {
        PreviewStatus::Empty => show_message(widgets, "Upload a PDF to preview it here."),
        PreviewStatus::Loading => show_message(widgets, "Loading PDF\u{2026}"),
        PreviewStatus::Failed(message) => show_message(widgets, message),
        PreviewStatus::Image(path) => {
            widgets.picture.set_filename(Some(path));
            widgets.stack.set_visible_child_name("page");
        }
    }
}

fn show_message(widgets: &PreviewWidgets, text: &str) {
    widgets.message.set_text(text);
    widgets.stack.set_visible_child_name("message");
}
