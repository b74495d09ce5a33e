//! Fixed-position elements
//!
//! Maps an element's inline style onto terminal cells and draws it above the
//! page. Pixel lengths are converted with a nominal cell size; any non-zero
//! shadow offset moves the shadow by at least one cell so it stays visible.

use crate::config::colors;
use crate::dom::style::{CssColor, InlineStyle, Position};
use crate::dom::Element;
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::Span,
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
    Frame,
};

/// Nominal cell width in CSS pixels
const PX_PER_COL: u16 = 10;

/// Nominal cell height in CSS pixels
const PX_PER_ROW: u16 = 20;

fn cols(px: u16) -> u16 {
    px / PX_PER_COL
}

fn rows(px: u16) -> u16 {
    px / PX_PER_ROW
}

/// Cell offset of a shadow, rounding any non-zero pixel offset away from zero
fn shadow_cells(px: i16, per_cell: u16) -> i32 {
    let px = i32::from(px);
    let per_cell = i32::from(per_cell);
    match px.signum() {
        0 => 0,
        sign => sign * ((px.abs() + per_cell - 1) / per_cell),
    }
}

/// Where a fixed element lands inside `area`, or None for flowing elements
pub fn overlay_rect(area: Rect, element: &Element) -> Option<Rect> {
    let style = element.style();
    let Position::Fixed { top, right } = style.position else {
        return None;
    };

    let text_width = u16::try_from(Span::raw(element.text_content()).width()).unwrap_or(u16::MAX);
    let border = u16::from(style.border_radius > 0) * 2;
    let width = text_width
        .saturating_add(cols(style.padding) * 2)
        .saturating_add(border)
        .min(area.width);
    let height = (1 + rows(style.padding) * 2 + border).min(area.height);

    let x = area
        .right()
        .saturating_sub(cols(right))
        .saturating_sub(width)
        .max(area.x);
    let y = (area.y + rows(top)).min(area.bottom().saturating_sub(height));

    Some(Rect::new(x, y, width, height))
}

/// Terminal color for a CSS color; alpha is blended over the page background
pub fn to_color(color: CssColor) -> Color {
    match color {
        CssColor::Hex(r, g, b) => Color::Rgb(r, g, b),
        CssColor::White => Color::White,
        CssColor::Rgba(r, g, b, a) => {
            let Color::Rgb(br, bg, bb) = colors::BG else {
                return Color::Rgb(r, g, b);
            };
            let a = a.clamp(0.0, 1.0);
            let mix = |fg: u8, base: u8| {
                (f32::from(fg) * a + f32::from(base) * (1.0 - a)).round() as u8
            };
            Color::Rgb(mix(r, br), mix(g, bg), mix(b, bb))
        }
    }
}

fn element_style(style: &InlineStyle) -> Style {
    let mut out = Style::default();
    if let Some(bg) = style.background {
        out = out.bg(to_color(bg));
    }
    if let Some(fg) = style.color {
        out = out.fg(to_color(fg));
    }
    out
}

/// Draw every fixed-position element, later siblings on top
pub fn render_fixed(f: &mut Frame, area: Rect, elements: &[Element]) {
    for element in elements {
        let Some(rect) = overlay_rect(area, element) else {
            continue;
        };
        let style = element.style();

        if let Some(shadow) = style.box_shadow {
            let dx = shadow_cells(shadow.offset_x, PX_PER_COL);
            let dy = shadow_cells(shadow.offset_y, PX_PER_ROW);
            let shifted = Rect::new(
                (i32::from(rect.x) + dx).max(0) as u16,
                (i32::from(rect.y) + dy).max(0) as u16,
                rect.width,
                rect.height,
            );
            let shadow_area = shifted.intersection(area);
            if (dx, dy) != (0, 0) && !shadow_area.is_empty() {
                f.render_widget(
                    Block::default().style(Style::default().bg(colors::SHADOW)),
                    shadow_area,
                );
            }
        }

        let paint = element_style(style);
        let mut block = Block::default().style(paint);
        if style.border_radius > 0 {
            block = block
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(paint);
        }
        let inner_padding = cols(style.padding);
        let block = block.padding(ratatui::widgets::Padding::new(
            inner_padding,
            inner_padding,
            rows(style.padding),
            rows(style.padding),
        ));

        f.render_widget(Clear, rect);
        f.render_widget(
            Paragraph::new(element.text_content().to_string())
                .style(paint)
                .block(block),
            rect,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Document;
    use crate::toast::ToastMessage;

    fn toast_element() -> Element {
        let doc = Document::new();
        let msg = ToastMessage::url_added();
        let mut el = doc.create_element("div");
        el.set_text_content(msg.text());
        el.set_style(msg.style().clone());
        el
    }

    #[test]
    fn test_flowing_element_has_no_overlay() {
        let doc = Document::new();
        let el = doc.create_element("h1");
        assert!(overlay_rect(Rect::new(0, 0, 80, 24), &el).is_none());
    }

    #[test]
    fn test_toast_is_anchored_top_right() {
        let rect = overlay_rect(Rect::new(0, 0, 80, 24), &toast_element()).unwrap();
        // 27 chars + 1 col padding each side + rounded border
        assert_eq!(rect.width, 31);
        assert_eq!(rect.height, 3);
        // 20px from the right edge = 2 cols, 20px from the top = 1 row
        assert_eq!(rect.right(), 78);
        assert_eq!(rect.y, 1);
    }

    #[test]
    fn test_toast_is_clamped_to_small_area() {
        let area = Rect::new(0, 0, 20, 2);
        let rect = overlay_rect(area, &toast_element()).unwrap();
        assert_eq!(rect.width, 20);
        assert_eq!(rect.x, 0);
        assert!(rect.bottom() <= area.bottom());
    }

    #[test]
    fn test_shadow_offset_rounds_away_from_zero() {
        assert_eq!(shadow_cells(0, PX_PER_ROW), 0);
        assert_eq!(shadow_cells(2, PX_PER_ROW), 1);
        assert_eq!(shadow_cells(-2, PX_PER_ROW), -1);
        assert_eq!(shadow_cells(40, PX_PER_ROW), 2);
    }

    #[test]
    fn test_color_mapping() {
        assert_eq!(to_color(CssColor::Hex(0x4C, 0xAF, 0x50)), Color::Rgb(76, 175, 80));
        assert_eq!(to_color(CssColor::White), Color::White);
        assert_eq!(to_color(CssColor::Rgba(0, 0, 0, 1.0)), Color::Rgb(0, 0, 0));
        assert_eq!(to_color(CssColor::Rgba(0, 0, 0, 0.0)), colors::BG);
    }
}
