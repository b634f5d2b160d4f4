//! Fill and border colors for the quintile styles.
//!
//! KML packs colors as `aabbggrr` hex, the reverse of the usual HTML order.

use std::fmt;

/// An 8-hex-digit KML color, alpha then blue, green, red.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KmlColor(&'static str);

impl KmlColor {
    pub const fn new(hex: &'static str) -> Self {
        Self(hex)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }

    /// HTML `#rrggbb` for the same color, alpha dropped.
    pub fn to_html(&self) -> String {
        let hex = self.0;
        let bb = &hex[2..4];
        let gg = &hex[4..6];
        let rr = &hex[6..8];
        format!("#{}{}{}", rr, gg, bb)
    }
}

impl fmt::Display for KmlColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

// Lowest population bucket first.
//   #81ABC6 blue, #4471B1 blue-purple, #8A367D purple, #AC2448 red-purple, #E66855 red
const QUINTILE_COLORS: [KmlColor; 5] = [
    KmlColor::new("bfc6ab81"),
    KmlColor::new("bfb17144"),
    KmlColor::new("bf7d368a"),
    KmlColor::new("bf4824ac"),
    KmlColor::new("bf5568e6"),
];

const BORDER_COLOR: KmlColor = KmlColor::new("ff000000");
const BORDER_WIDTH: u32 = 2;

#[derive(Clone, Copy, Debug)]
pub struct ColorPalette {
    fills: &'static [KmlColor],
    pub border: KmlColor,
    pub border_width: u32,
}

impl Default for ColorPalette {
    fn default() -> Self {
        Self::quintiles()
    }
}

impl ColorPalette {
    pub const fn quintiles() -> Self {
        Self { fills: &QUINTILE_COLORS, border: BORDER_COLOR, border_width: BORDER_WIDTH }
    }

    pub fn len(&self) -> usize {
        self.fills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fills.is_empty()
    }

    pub fn fills(&self) -> &'static [KmlColor] {
        self.fills
    }

    pub fn fill(&self, class: usize) -> Option<KmlColor> {
        self.fills.get(class).copied()
    }

    /// First `len` fills, for when the top classes went unused.
    pub fn truncated(&self, len: usize) -> Self {
        Self { fills: &self.fills[..len.min(self.fills.len())], ..*self }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn html_color_swaps_byte_order() {
        assert_eq!(KmlColor::new("bf5568e6").to_html(), "#e66855");
        assert_eq!(KmlColor::new("bfc6ab81").to_html(), "#81abc6");
    }

    #[test]
    fn quintile_palette_shape() {
        let palette = ColorPalette::quintiles();
        assert_eq!(palette.len(), 5);
        assert_eq!(palette.fill(0).map(|c| c.as_str()), Some("bfc6ab81"));
        assert_eq!(palette.fill(4).map(|c| c.as_str()), Some("bf5568e6"));
        assert_eq!(palette.fill(5), None);
        assert_eq!(palette.border.as_str(), "ff000000");
        assert_eq!(palette.border_width, 2);
    }

    #[test]
    fn truncation_keeps_lowest_classes() {
        let palette = ColorPalette::quintiles().truncated(3);
        assert_eq!(palette.len(), 3);
        assert_eq!(palette.fill(2).map(|c| c.as_str()), Some("bf7d368a"));
        assert_eq!(palette.fill(3), None);
        assert_eq!(ColorPalette::quintiles().truncated(9).len(), 5);
    }
}
