pub const FONT_SIZE_RANGE: (f64, f64) = (16.0, 34.0);
pub const LINE_HEIGHT_RANGE: (f64, f64) = (1.3, 2.4);
pub const LETTER_SPACING_RANGE: (f64, f64) = (0.0, 2.0);

/// Margin kept between the ruler band and the viewport edges.
const RULER_EDGE_MARGIN: f64 = 60.0;
const RULER_INITIAL_OFFSET: f64 = 180.0;
pub const RULER_BAND_HALF_HEIGHT: f64 = 36.0;

/// User-adjustable text metrics for the converted pane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Typography {
    /// Pixels.
    pub font_size: f64,
    /// Multiple of the font size.
    pub line_height: f64,
    /// Pixels.
    pub letter_spacing: f64,
}

impl Default for Typography {
    fn default() -> Self {
        Self {
            font_size: 22.0,
            line_height: 1.8,
            letter_spacing: 0.5,
        }
    }
}

impl Typography {
    pub fn set_font_size(&mut self, px: f64) {
        self.font_size = px.clamp(FONT_SIZE_RANGE.0, FONT_SIZE_RANGE.1);
    }

    pub fn set_line_height(&mut self, factor: f64) {
        self.line_height = factor.clamp(LINE_HEIGHT_RANGE.0, LINE_HEIGHT_RANGE.1);
    }

    pub fn set_letter_spacing(&mut self, px: f64) {
        self.letter_spacing = px.clamp(LETTER_SPACING_RANGE.0, LETTER_SPACING_RANGE.1);
    }
}

/// Fixed highlight palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HighlightColor {
    #[default]
    Yellow,
    Green,
    Pink,
    Blue,
}

impl HighlightColor {
    pub const ALL: [HighlightColor; 4] = [
        HighlightColor::Yellow,
        HighlightColor::Green,
        HighlightColor::Pink,
        HighlightColor::Blue,
    ];

    pub fn name(self) -> &'static str {
        match self {
            HighlightColor::Yellow => "Yellow",
            HighlightColor::Green => "Green",
            HighlightColor::Pink => "Pink",
            HighlightColor::Blue => "Blue",
        }
    }

    /// CSS color value.
    pub fn css(self) -> &'static str {
        match self {
            HighlightColor::Yellow => "rgba(255, 235, 59, 0.55)",
            HighlightColor::Green => "rgba(76, 175, 80, 0.35)",
            HighlightColor::Pink => "rgba(233, 30, 99, 0.25)",
            HighlightColor::Blue => "rgba(33, 150, 243, 0.28)",
        }
    }
}

/// Reading ruler overlay: a clear band following the pointer with the rest
/// of the pane shaded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ruler {
    pub enabled: bool,
    /// Band center, in pane coordinates.
    pub offset: f64,
}

impl Default for Ruler {
    fn default() -> Self {
        Self {
            enabled: false,
            offset: RULER_INITIAL_OFFSET,
        }
    }
}

impl Ruler {
    pub fn toggle(&mut self) {
        self.enabled = !self.enabled;
    }

    /// Follow the pointer. Ignored while the ruler is hidden.
    pub fn follow(&mut self, y: f64, viewport_height: f64) {
        if !self.enabled {
            return;
        }
        let low = RULER_EDGE_MARGIN;
        let high = (viewport_height - RULER_EDGE_MARGIN).max(low);
        self.offset = y.clamp(low, high);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typography_setters_clamp() {
        let mut t = Typography::default();
        t.set_font_size(80.0);
        t.set_line_height(0.5);
        t.set_letter_spacing(-3.0);
        assert_eq!(t.font_size, 34.0);
        assert_eq!(t.line_height, 1.3);
        assert_eq!(t.letter_spacing, 0.0);
    }

    #[test]
    fn ruler_ignores_pointer_when_off() {
        let mut r = Ruler::default();
        r.follow(400.0, 800.0);
        assert_eq!(r.offset, 180.0);
    }

    #[test]
    fn ruler_stays_inside_viewport() {
        let mut r = Ruler::default();
        r.toggle();
        r.follow(5.0, 800.0);
        assert_eq!(r.offset, 60.0);
        r.follow(790.0, 800.0);
        assert_eq!(r.offset, 740.0);
        r.follow(300.0, 800.0);
        assert_eq!(r.offset, 300.0);
    }

    #[test]
    fn tiny_viewport_does_not_panic() {
        let mut r = Ruler::default();
        r.toggle();
        r.follow(50.0, 90.0);
        assert_eq!(r.offset, 60.0);
    }
}
