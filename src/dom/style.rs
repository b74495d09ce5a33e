//! Typed inline styles
//!
//! Covers the small CSS subset the page uses for overlays. `css_text()`
//! renders the declaration block exactly as a browser's `style.cssText`
//! would have been written by hand.

use std::fmt;

/// Where an element is laid out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Position {
    /// Normal document flow
    #[default]
    Static,
    /// Pinned to the viewport, offset from its top and right edges (px)
    Fixed { top: u16, right: u16 },
}

/// CSS color value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CssColor {
    /// `#RRGGBB`
    Hex(u8, u8, u8),
    /// `white`
    White,
    /// `rgba(r,g,b,a)`
    Rgba(u8, u8, u8, f32),
}

impl fmt::Display for CssColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hex(r, g, b) => write!(f, "#{r:02X}{g:02X}{b:02X}"),
            Self::White => f.write_str("white"),
            Self::Rgba(r, g, b, a) => write!(f, "rgba({r},{g},{b},{a})"),
        }
    }
}

/// `box-shadow: <x> <y> <blur> <color>`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxShadow {
    pub offset_x: i16,
    pub offset_y: i16,
    pub blur: u16,
    pub color: CssColor,
}

impl fmt::Display for BoxShadow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            px(i32::from(self.offset_x)),
            px(i32::from(self.offset_y)),
            px(i32::from(self.blur)),
            self.color
        )
    }
}

/// CSS length: bare `0`, otherwise `<n>px`
fn px(value: i32) -> String {
    if value == 0 {
        "0".to_string()
    } else {
        format!("{value}px")
    }
}

/// Inline presentation attributes of an element
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InlineStyle {
    pub position: Position,
    pub background: Option<CssColor>,
    pub color: Option<CssColor>,
    /// Padding on all sides (px)
    pub padding: u16,
    /// Corner rounding (px)
    pub border_radius: u16,
    pub box_shadow: Option<BoxShadow>,
}

impl InlineStyle {
    /// Render as a CSS declaration block, skipping unset properties
    pub fn css_text(&self) -> String {
        let mut decls: Vec<String> = Vec::new();

        if let Position::Fixed { top, right } = self.position {
            decls.push("position: fixed".to_string());
            decls.push(format!("top: {}", px(i32::from(top))));
            decls.push(format!("right: {}", px(i32::from(right))));
        }
        if let Some(background) = self.background {
            decls.push(format!("background: {background}"));
        }
        if let Some(color) = self.color {
            decls.push(format!("color: {color}"));
        }
        if self.padding > 0 {
            decls.push(format!("padding: {}", px(i32::from(self.padding))));
        }
        if self.border_radius > 0 {
            decls.push(format!("border-radius: {}", px(i32::from(self.border_radius))));
        }
        if let Some(shadow) = self.box_shadow {
            decls.push(format!("box-shadow: {shadow}"));
        }

        decls.iter().map(|d| format!("{d};")).collect::<Vec<_>>().join(" ")
    }

    pub fn is_fixed(&self) -> bool {
        matches!(self.position, Position::Fixed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_color_is_uppercase() {
        assert_eq!(CssColor::Hex(0x4c, 0xaf, 0x50).to_string(), "#4CAF50");
        assert_eq!(CssColor::Hex(0, 0, 0).to_string(), "#000000");
    }

    #[test]
    fn test_rgba_color() {
        assert_eq!(CssColor::Rgba(0, 0, 0, 0.2).to_string(), "rgba(0,0,0,0.2)");
    }

    #[test]
    fn test_box_shadow_zero_offset_has_no_unit() {
        let shadow = BoxShadow {
            offset_x: 0,
            offset_y: 2,
            blur: 4,
            color: CssColor::Rgba(0, 0, 0, 0.2),
        };
        assert_eq!(shadow.to_string(), "0 2px 4px rgba(0,0,0,0.2)");
    }

    #[test]
    fn test_default_style_is_empty() {
        let style = InlineStyle::default();
        assert_eq!(style.css_text(), "");
        assert!(!style.is_fixed());
    }

    #[test]
    fn test_css_text_skips_unset_properties() {
        let style = InlineStyle {
            color: Some(CssColor::White),
            padding: 8,
            ..Default::default()
        };
        assert_eq!(style.css_text(), "color: white; padding: 8px;");
    }
}
