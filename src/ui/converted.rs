use std::cell::Cell;
use std::rc::Rc;

use gtk4::glib;
use gtk4::prelude::*;

use crate::app::BackendEvent;
use crate::reader::{
    HighlightColor, PaneAction, ReadingMode, ReadingPane, Ruler, SpeechEngine,
    RULER_BAND_HALF_HEIGHT,
};
use crate::ui::style::ReaderStyle;

/// Handles returned from building the converted pane.
pub struct ConvertedWidgets {
    pub root: gtk4::Box,
    pub title: gtk4::Label,
    pub hint: gtk4::Label,
    // Low-distraction page flipper
    pub page_bar: gtk4::Box,
    pub prev_page: gtk4::Button,
    pub next_page: gtk4::Button,
    pub progress: gtk4::Label,
    // Aid toggles
    pub swatches: Vec<(HighlightColor, gtk4::Button)>,
    pub ruler_button: gtk4::Button,
    pub focus_button: gtk4::Button,
    // Typography
    pub font_scale: Slider,
    pub line_scale: Slider,
    pub letter_scale: Slider,
    // Focus view
    pub focus_bar: gtk4::Box,
    pub prev_unit: gtk4::Button,
    pub next_unit: gtk4::Button,
    pub unit_label: gtk4::Label,
    pub read_button: gtk4::Button,
    pub stop_button: gtk4::Button,
    pub speed_scale: Slider,
    // Text area
    pub content: gtk4::Box,
    pub ruler_area: gtk4::DrawingArea,
    pub ruler: Rc<Cell<Ruler>>,
    pub style: ReaderStyle,
    pub sender: async_channel::Sender<BackendEvent>,
}

fn action_button(
    label: &str,
    sender: &async_channel::Sender<BackendEvent>,
    action: PaneAction,
) -> gtk4::Button {
    let button = gtk4::Button::with_label(label);
    let sender = sender.clone();
    button.connect_clicked(move |_| {
        let _ = sender.try_send(BackendEvent::Pane(action));
    });
    button
}

/// A scale plus its `value-changed` handler, so redraws can set the value
/// without posting the change back as user input.
pub struct Slider {
    pub scale: gtk4::Scale,
    changed: glib::SignalHandlerId,
}

impl Slider {
    fn sync(&self, value: f64) {
        if (self.scale.value() - value).abs() <= f64::EPSILON {
            return;
        }
        self.scale.block_signal(&self.changed);
        self.scale.set_value(value);
        self.scale.unblock_signal(&self.changed);
    }
}

fn slider(
    title: &str,
    (min, max): (f64, f64),
    step: f64,
    digits: i32,
    sender: &async_channel::Sender<BackendEvent>,
    action: fn(f64) -> PaneAction,
) -> (gtk4::Box, Slider) {
    let row = gtk4::Box::new(gtk4::Orientation::Horizontal, 6);
    let label = gtk4::Label::new(Some(title));
    label.add_css_class("dim-label");

    let scale = gtk4::Scale::with_range(gtk4::Orientation::Horizontal, min, max, step);
    scale.set_digits(digits);
    scale.set_round_digits(digits);
    scale.set_hexpand(true);
    scale.set_width_request(110);

    let sender = sender.clone();
    let changed = scale.connect_value_changed(move |scale| {
        let _ = sender.try_send(BackendEvent::Pane(action(scale.value())));
    });

    row.append(&label);
    row.append(&scale);
    (row, Slider { scale, changed })
}

/// Build the right pane with every control for both modes. `render` decides
/// what is visible.
pub fn build_converted(sender: async_channel::Sender<BackendEvent>) -> ConvertedWidgets {
    let root = gtk4::Box::new(gtk4::Orientation::Vertical, 8);
    root.set_margin_start(12);
    root.set_margin_end(12);
    root.set_margin_top(12);
    root.set_margin_bottom(12);

    let title = gtk4::Label::new(None);
    title.add_css_class("heading");
    title.set_xalign(0.0);
    root.append(&title);

    // --- Top bar ---
    let top_bar = gtk4::Box::new(gtk4::Orientation::Horizontal, 8);

    let hint = gtk4::Label::new(Some(
        "Dyslexia: readable spacing \u{2022} Click paragraph to highlight",
    ));
    hint.add_css_class("dim-label");
    hint.set_hexpand(true);
    hint.set_xalign(0.0);
    hint.set_wrap(true);
    top_bar.append(&hint);

    let page_bar = gtk4::Box::new(gtk4::Orientation::Horizontal, 8);
    page_bar.set_hexpand(true);
    let prev_page = action_button("\u{25C0}", &sender, PaneAction::PrevPage);
    let progress = gtk4::Label::new(None);
    let next_page = action_button("\u{25B6}", &sender, PaneAction::NextPage);
    page_bar.append(&prev_page);
    page_bar.append(&progress);
    page_bar.append(&next_page);
    top_bar.append(&page_bar);

    let swatch_box = gtk4::Box::new(gtk4::Orientation::Horizontal, 4);
    let swatches: Vec<(HighlightColor, gtk4::Button)> = HighlightColor::ALL
        .iter()
        .map(|&color| {
            let button = action_button("", &sender, PaneAction::Highlight(color));
            button.set_tooltip_text(Some(color.name()));
            button.add_css_class("swatch");
            button.add_css_class(&format!("swatch-{}", color.name().to_lowercase()));
            button.set_valign(gtk4::Align::Center);
            swatch_box.append(&button);
            (color, button)
        })
        .collect();
    top_bar.append(&swatch_box);

    let ruler_button = action_button("Ruler: OFF", &sender, PaneAction::ToggleRuler);
    ruler_button.set_tooltip_text(Some("Reading Ruler"));
    let focus_button = action_button("Focus: OFF", &sender, PaneAction::ToggleFocus);
    focus_button.set_tooltip_text(Some("Toggle Focus Mode"));
    top_bar.append(&ruler_button);
    top_bar.append(&focus_button);
    root.append(&top_bar);

    // --- Typography ---
    let typography_bar = gtk4::Box::new(gtk4::Orientation::Horizontal, 12);
    let (font_row, font_scale) = slider(
        "Font",
        crate::reader::FONT_SIZE_RANGE,
        1.0,
        0,
        &sender,
        PaneAction::FontSize,
    );
    let (line_row, line_scale) = slider(
        "Line",
        crate::reader::LINE_HEIGHT_RANGE,
        0.1,
        1,
        &sender,
        PaneAction::LineHeight,
    );
    let (letter_row, letter_scale) = slider(
        "Letter",
        crate::reader::LETTER_SPACING_RANGE,
        0.1,
        1,
        &sender,
        PaneAction::LetterSpacing,
    );
    typography_bar.append(&font_row);
    typography_bar.append(&line_row);
    typography_bar.append(&letter_row);
    root.append(&typography_bar);

    // --- Focus controls ---
    let focus_bar = gtk4::Box::new(gtk4::Orientation::Horizontal, 8);
    let prev_unit = action_button("\u{25C0} Prev", &sender, PaneAction::PrevUnit);
    let unit_label = gtk4::Label::new(None);
    unit_label.set_hexpand(true);
    let next_unit = action_button("Next \u{25B6}", &sender, PaneAction::NextUnit);
    let read_button = action_button("Read Aloud", &sender, PaneAction::ReadAloud);
    read_button.add_css_class("suggested-action");
    let stop_button = action_button("Stop", &sender, PaneAction::StopReading);
    let (speed_row, speed_scale) = slider(
        "Speed",
        crate::reader::SPEECH_RATE_RANGE,
        0.1,
        1,
        &sender,
        PaneAction::SpeechRate,
    );
    speed_row.set_hexpand(false);
    focus_bar.append(&prev_unit);
    focus_bar.append(&unit_label);
    focus_bar.append(&next_unit);
    focus_bar.append(&read_button);
    focus_bar.append(&stop_button);
    focus_bar.append(&speed_row);
    root.append(&focus_bar);

    // --- Text area with ruler overlay ---
    let content = gtk4::Box::new(gtk4::Orientation::Vertical, 10);
    content.set_margin_top(8);
    content.set_margin_bottom(8);
    let scrolled = gtk4::ScrolledWindow::builder()
        .hscrollbar_policy(gtk4::PolicyType::Never)
        .vexpand(true)
        .child(&content)
        .build();

    let ruler = Rc::new(Cell::new(Ruler::default()));
    let ruler_area = gtk4::DrawingArea::new();
    ruler_area.set_can_target(false);
    let ruler_for_draw = ruler.clone();
    ruler_area.set_draw_func(move |_area, cr, width, height| {
        draw_ruler(cr, width, height, ruler_for_draw.get());
    });

    let overlay = gtk4::Overlay::new();
    overlay.set_child(Some(&scrolled));
    overlay.add_overlay(&ruler_area);

    let motion = gtk4::EventControllerMotion::new();
    {
        let sender = sender.clone();
        let ruler = ruler.clone();
        let overlay_for_motion = overlay.clone();
        motion.connect_motion(move |_, _x, y| {
            if !ruler.get().enabled {
                return;
            }
            let viewport_height = overlay_for_motion.height() as f64;
            let _ = sender.try_send(BackendEvent::Pane(PaneAction::MoveRuler {
                y,
                viewport_height,
            }));
        });
    }
    overlay.add_controller(motion);
    root.append(&overlay);

    ConvertedWidgets {
        root,
        title,
        hint,
        page_bar,
        prev_page,
        next_page,
        progress,
        swatches,
        ruler_button,
        focus_button,
        font_scale,
        line_scale,
        letter_scale,
        focus_bar,
        prev_unit,
        next_unit,
        unit_label,
        read_button,
        stop_button,
        speed_scale,
        content,
        ruler_area,
        ruler,
        style: ReaderStyle::install(),
        sender,
    }
}

/// Shade everything outside the ruler band.
fn draw_ruler(cr: &gtk4::cairo::Context, width: i32, height: i32, ruler: Ruler) {
    if !ruler.enabled {
        return;
    }
    let w = width as f64;
    let h = height as f64;
    let band_top = (ruler.offset - RULER_BAND_HALF_HEIGHT).max(0.0);
    let band_bottom = (ruler.offset + RULER_BAND_HALF_HEIGHT).min(h);

    cr.set_source_rgba(0.0, 0.0, 0.0, 0.35);
    cr.rectangle(0.0, 0.0, w, band_top);
    cr.rectangle(0.0, band_bottom, w, (h - band_bottom).max(0.0));
    let _ = cr.fill();

    cr.set_source_rgba(0.0, 0.0, 0.0, 0.6);
    cr.set_line_width(1.0);
    cr.rectangle(0.5, band_top + 0.5, w - 1.0, band_bottom - band_top - 1.0);
    let _ = cr.stroke();
}

fn clear(container: &gtk4::Box) {
    while let Some(child) = container.first_child() {
        container.remove(&child);
    }
}

fn text_label(text: &str) -> gtk4::Label {
    let label = gtk4::Label::new(Some(text));
    label.set_wrap(true);
    label.set_xalign(0.0);
    label.set_selectable(false);
    label.add_css_class("reader-text");
    label
}

/// Pango markup for the focus card: the sentence being read is emphasized.
pub fn sentence_markup(sentences: &[String], spoken: Option<usize>) -> String {
    sentences
        .iter()
        .enumerate()
        .map(|(i, sentence)| {
            let escaped = glib::markup_escape_text(sentence);
            if spoken == Some(i) {
                format!("<span weight=\"bold\" underline=\"single\">{escaped}</span>")
            } else {
                escaped.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Bring every widget in line with the pane state. Sliders are left alone
/// when `sync_sliders` is false: during a drag the scale is ahead of the
/// queued values being applied.
pub fn render<E: SpeechEngine>(
    widgets: &ConvertedWidgets,
    pane: &ReadingPane<E>,
    sync_sliders: bool,
) {
    widgets.style.apply(&pane.typography, pane.highlight);

    let mode = pane.mode();
    let dyslexia = mode == ReadingMode::Dyslexia;
    let focus = dyslexia && pane.focus();
    widgets
        .title
        .set_text(&format!("Converted View ({})", mode.as_query()));

    widgets.hint.set_visible(dyslexia);
    widgets.page_bar.set_visible(!dyslexia);
    widgets.ruler_button.set_visible(dyslexia);
    widgets.focus_button.set_visible(dyslexia);
    widgets.focus_bar.set_visible(focus);

    let (page, total, percent) = pane.progress();
    widgets
        .progress
        .set_text(&format!("Page {page} / {total} \u{2022} {percent}%"));
    widgets.prev_page.set_sensitive(pane.page_index() > 0);
    widgets.next_page.set_sensitive(pane.page_index() + 1 < total);

    for (color, button) in &widgets.swatches {
        if *color == pane.highlight {
            button.add_css_class("selected");
        } else {
            button.remove_css_class("selected");
        }
    }

    let on_off = |on: bool| if on { "ON" } else { "OFF" };
    widgets
        .ruler_button
        .set_label(&format!("Ruler: {}", on_off(pane.ruler.enabled)));
    widgets
        .focus_button
        .set_label(&format!("Focus: {}", on_off(pane.focus())));

    if sync_sliders {
        widgets.font_scale.sync(pane.typography.font_size);
        widgets.line_scale.sync(pane.typography.line_height);
        widgets.letter_scale.sync(pane.typography.letter_spacing);
        widgets.speed_scale.sync(pane.playback().rate());
    }

    let unit_count = pane.units().len();
    let reading = pane.is_reading();
    widgets.unit_label.set_text(&format!(
        "Paragraph {} / {unit_count}",
        (pane.active_index() + 1).min(unit_count)
    ));
    widgets.prev_unit.set_sensitive(pane.active_index() > 0);
    widgets
        .next_unit
        .set_sensitive(pane.active_index() + 1 < unit_count);
    widgets
        .read_button
        .set_label(if reading { "Reading..." } else { "Read Aloud" });
    widgets
        .read_button
        .set_sensitive(!reading && !pane.playback().sentences().is_empty());
    widgets.stop_button.set_sensitive(reading);

    clear(&widgets.content);
    if !dyslexia {
        let card = text_label(pane.current_page().unwrap_or_default());
        card.add_css_class("reader-card");
        card.add_css_class("reader-active");
        widgets.content.append(&card);
    } else if focus {
        let sentences = pane.playback().sentences();
        let card = if sentences.is_empty() {
            text_label(pane.active_unit().unwrap_or_default())
        } else {
            let label = text_label("");
            label.set_markup(&sentence_markup(sentences, pane.playback().spoken_index()));
            label
        };
        card.add_css_class("reader-card");
        card.add_css_class("reader-active");
        widgets.content.append(&card);
    } else {
        for (index, unit) in pane.units().iter().enumerate() {
            let row = text_label(unit);
            row.add_css_class("reader-paragraph");
            if index == pane.active_index() {
                row.add_css_class("reader-active");
            }
            let click = gtk4::GestureClick::new();
            let sender = widgets.sender.clone();
            click.connect_released(move |_, _, _, _| {
                let _ = sender.try_send(BackendEvent::Pane(PaneAction::SelectUnit(index)));
            });
            row.add_controller(click);
            widgets.content.append(&row);
        }
    }

    render_ruler(widgets, pane);
}

/// The ruler only exists in decoding-support mode.
pub fn render_ruler<E: SpeechEngine>(widgets: &ConvertedWidgets, pane: &ReadingPane<E>) {
    let mut ruler = pane.ruler;
    ruler.enabled &= pane.mode() == ReadingMode::Dyslexia;
    widgets.ruler.set(ruler);
    widgets.ruler_area.queue_draw();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sentences(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn spoken_sentence_is_emphasized() {
        let markup = sentence_markup(&sentences(&["Stop.", "Go now!", "Really?"]), Some(1));
        assert_eq!(
            markup,
            "Stop. <span weight=\"bold\" underline=\"single\">Go now!</span> Really?"
        );
    }

    #[test]
    fn idle_markup_is_plain_and_escaped() {
        let markup = sentence_markup(&sentences(&["Fish & chips.", "1 < 2."]), None);
        assert_eq!(markup, "Fish &amp; chips. 1 &lt; 2.");
    }
}
