use crate::reader::{HighlightColor, Typography};

/// Rules that never change: palette swatches and the card look.
const BASE_CSS: &str = r#"
.reader-card {
    border-radius: 8px;
    padding: 12px 16px;
}
.reader-paragraph {
    border-radius: 6px;
    padding: 6px 10px;
}
.swatch {
    min-width: 22px;
    min-height: 22px;
    border-radius: 11px;
    padding: 0;
    border: 1px solid #ddd;
}
.swatch.selected {
    border: 2px solid #111;
}
.error-label {
    color: crimson;
    font-size: 12px;
}
.loading-label {
    color: #666;
    font-size: 12px;
}
"#;

/// Stylesheet for the user-adjustable reading aids.
pub fn reader_css(typography: &Typography, highlight: HighlightColor) -> String {
    let mut css = String::from(BASE_CSS);
    for color in HighlightColor::ALL {
        css.push_str(&format!(
            ".swatch-{} {{ background: {}; }}\n",
            color.name().to_lowercase(),
            color.css()
        ));
    }
    css.push_str(&format!(
        ".reader-text {{ font-size: {:.0}px; line-height: {:.1}; letter-spacing: {:.1}px; }}\n",
        typography.font_size, typography.line_height, typography.letter_spacing
    ));
    css.push_str(&format!(
        ".reader-active {{ background: {}; }}\n",
        highlight.css()
    ));
    css
}

/// Owns the CSS provider backing the converted pane.
pub struct ReaderStyle {
    provider: gtk4::CssProvider,
    applied: std::cell::RefCell<String>,
}

impl ReaderStyle {
    pub fn install() -> Self {
        let provider = gtk4::CssProvider::new();
        match gtk4::gdk::Display::default() {
            Some(display) => gtk4::style_context_add_provider_for_display(
                &display,
                &provider,
                gtk4::STYLE_PROVIDER_PRIORITY_APPLICATION,
            ),
            None => log::warn!("No display; reader styles not installed"),
        }
        Self {
            provider,
            applied: std::cell::RefCell::new(String::new()),
        }
    }

    /// Reload only when the generated stylesheet changed.
    pub fn apply(&self, typography: &Typography, highlight: HighlightColor) {
        let css = reader_css(typography, highlight);
        if *self.applied.borrow() == css {
            return;
        }
        self.provider.load_from_string(&css);
        *self.applied.borrow_mut() = css;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_typography_rules() {
        let css = reader_css(&Typography::default(), HighlightColor::Yellow);
        assert!(css.contains(".reader-text { font-size: 22px; line-height: 1.8; letter-spacing: 0.5px; }"));
        assert!(css.contains(".reader-active { background: rgba(255, 235, 59, 0.55); }"));
    }

    #[test]
    fn every_swatch_gets_a_rule() {
        let css = reader_css(&Typography::default(), HighlightColor::Blue);
        for name in ["yellow", "green", "pink", "blue"] {
            assert!(css.contains(&format!(".swatch-{name} ")), "{name}");
        }
        assert!(css.contains(".reader-active { background: rgba(33, 150, 243, 0.28); }"));
    }
}
