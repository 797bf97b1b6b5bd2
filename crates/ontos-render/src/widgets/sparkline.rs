#![forbid(unsafe_code)]

//! Sparkline: a compact trend chart built from block characters.
//!
//! Data is resampled to the area width (linear interpolation between
//! points), then each column is filled from the bottom with eighth-height
//! blocks (▁▂▃▄▅▆▇█). Taller areas stack full blocks, so a 4-row sparkline
//! has 32 levels of resolution.
//!
//! Individual data points can be highlighted with a marker color; the
//! column nearest to each marked point is drawn in that color.

use ontos_core::geometry::Rect;

use super::Widget;
use crate::cell::PackedRgba;
use crate::frame::Frame;
use crate::style::Style;

/// Block characters for sparkline rendering (9 levels: empty + 8 bars).
const SPARK_CHARS: [char; 9] = [' ', '▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// A trend chart over `data`.
#[derive(Debug, Clone)]
pub struct Sparkline<'a> {
    data: &'a [f64],
    min: Option<f64>,
    max: Option<f64>,
    style: Style,
    markers: Vec<(usize, PackedRgba)>,
}

impl<'a> Sparkline<'a> {
    /// Chart over `data`, auto-scaled.
    pub fn new(data: &'a [f64]) -> Self {
        Self {
            data,
            min: None,
            max: None,
            style: Style::new(),
            markers: Vec::new(),
        }
    }

    /// Fix the value range instead of auto-scaling.
    #[must_use]
    pub fn bounds(mut self, min: f64, max: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    /// Style for the bars.
    #[must_use]
    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Highlight the column closest to data point `index`.
    #[must_use]
    pub fn marker(mut self, index: usize, color: PackedRgba) -> Self {
        self.markers.push((index, color));
        self
    }

    fn compute_bounds(&self) -> (f64, f64) {
        let data_min = self
            .min
            .unwrap_or_else(|| self.data.iter().copied().fold(f64::INFINITY, f64::min));
        let data_max = self
            .max
            .unwrap_or_else(|| self.data.iter().copied().fold(f64::NEG_INFINITY, f64::max));
        let min = if data_min.is_finite() { data_min } else { 0.0 };
        let max = if data_max.is_finite() { data_max } else { 1.0 };
        if min >= max {
            (min - 0.5, max + 0.5)
        } else {
            (min, max)
        }
    }

    /// Value at column `col` of `width`, interpolated between data points.
    fn sample(&self, col: u16, width: u16) -> f64 {
        match self.data.len() {
            0 => 0.0,
            1 => self.data[0],
            n => {
                let span = f64::from(width.saturating_sub(1).max(1));
                let pos = f64::from(col) / span * (n - 1) as f64;
                let i = (pos.floor() as usize).min(n - 2);
                let frac = pos - i as f64;
                self.data[i] + (self.data[i + 1] - self.data[i]) * frac
            }
        }
    }

    /// Column showing data point `index` at `width`.
    pub fn column_of(&self, index: usize, width: u16) -> u16 {
        let n = self.data.len();
        if n < 2 || width == 0 {
            return 0;
        }
        let span = f64::from(width - 1);
        (index.min(n - 1) as f64 / (n - 1) as f64 * span).round() as u16
    }

    /// Single-row rendering as a string (one glyph per data point).
    pub fn render_to_string(&self) -> String {
        let (min, max) = self.compute_bounds();
        self.data
            .iter()
            .map(|&v| {
                let t = ((v - min) / (max - min)).clamp(0.0, 1.0);
                SPARK_CHARS[(t * 8.0).round() as usize]
            })
            .collect()
    }
}

impl Widget for Sparkline<'_> {
    fn render(&self, area: Rect, frame: &mut Frame) {
        if area.is_empty() || self.data.is_empty() {
            return;
        }
        let (min, max) = self.compute_bounds();
        let levels = u32::from(area.height) * 8;

        for col in 0..area.width {
            let v = self.sample(col, area.width);
            let t = ((v - min) / (max - min)).clamp(0.0, 1.0);
            // Keep at least one eighth so the baseline stays visible.
            let height = ((t * f64::from(levels)).round() as u32).max(1);

            let style = self
                .markers
                .iter()
                .find(|(i, _)| self.column_of(*i, area.width) == col)
                .map_or(self.style, |(_, color)| self.style.fg(*color));

            for row in 0..area.height {
                let from_bottom = u32::from(area.height - 1 - row);
                let fill = height.saturating_sub(from_bottom * 8).min(8) as usize;
                if fill == 0 {
                    continue;
                }
                let mut buf = [0u8; 4];
                let glyph = SPARK_CHARS[fill].encode_utf8(&mut buf);
                frame
                    .buffer
                    .set_stringn(area.x + col, area.y + row, glyph, area.right(), style);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_form_scales() {
        let data = [0.0, 4.0, 8.0];
        assert_eq!(Sparkline::new(&data).render_to_string(), " ▄█");
    }

    #[test]
    fn flat_data_renders_mid() {
        let data = [5.0, 5.0];
        assert_eq!(Sparkline::new(&data).render_to_string(), "▄▄");
    }

    #[test]
    fn multi_row_fills_from_bottom() {
        let data = [0.0, 1.0];
        let mut f = Frame::new(2, 2);
        Sparkline::new(&data).render(f.bounds(), &mut f);
        assert_eq!(f.buffer.row_text(0), " █");
        assert_eq!(f.buffer.row_text(1), "▁█");
    }

    #[test]
    fn marker_columns_map_to_points() {
        let data = [1.0; 17];
        let s = Sparkline::new(&data);
        assert_eq!(s.column_of(0, 49), 0);
        assert_eq!(s.column_of(16, 49), 48);
        assert_eq!(s.column_of(8, 49), 24);
    }

    #[test]
    fn marker_recolors_column() {
        let data = [0.0, 1.0, 0.5];
        let red = PackedRgba::hex(0xF85149);
        let mut f = Frame::new(3, 1);
        Sparkline::new(&data).marker(1, red).render(f.bounds(), &mut f);
        assert_eq!(f.buffer.get(1, 0).map(|c| c.fg), Some(red));
    }
}
