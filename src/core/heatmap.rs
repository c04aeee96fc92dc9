//! Frequency-to-color mapping for the keyboard heatmap.
//!
//! A finished histogram is turned into a gradient with one color per integer
//! count between the lowest and highest observed count, inclusive. Each key
//! gets the gradient entry at `count - lowest`. Interpolation happens in HSL
//! space between a "low" and a "high" base color.

use crate::collector::types::KeyId;
use crate::core::histogram::Histogram;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// An RGB color with channels normalized to `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

/// Error returned when a hex color string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorParseError(String);

impl std::fmt::Display for ColorParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invalid color '{}': expected #rrggbb or #rgb", self.0)
    }
}

impl std::error::Error for ColorParseError {}

impl Color {
    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: f64::from(r) / 255.0,
            g: f64::from(g) / 255.0,
            b: f64::from(b) / 255.0,
        }
    }

    pub fn to_rgb8(&self) -> [u8; 3] {
        let channel = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        [channel(self.r), channel(self.g), channel(self.b)]
    }

    /// Parse `#rrggbb` or `#rgb` (the leading `#` is optional).
    pub fn from_hex(s: &str) -> Result<Self, ColorParseError> {
        let err = || ColorParseError(s.to_string());
        let hex = s.trim().trim_start_matches('#');
        if !hex.is_ascii() {
            return Err(err());
        }

        let digits: Vec<u8> = match hex.len() {
            6 => (0..3)
                .map(|i| u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16))
                .collect::<Result<_, _>>()
                .map_err(|_| err())?,
            3 => hex
                .chars()
                .map(|c| c.to_digit(16).map(|d| (d * 17) as u8))
                .collect::<Option<_>>()
                .ok_or_else(err)?,
            _ => return Err(err()),
        };

        Ok(Self::from_rgb8(digits[0], digits[1], digits[2]))
    }

    pub fn to_hex(&self) -> String {
        let [r, g, b] = self.to_rgb8();
        format!("#{r:02x}{g:02x}{b:02x}")
    }

    /// Convert to (hue in degrees, saturation, lightness).
    fn to_hsl(self) -> (f64, f64, f64) {
        let max = self.r.max(self.g).max(self.b);
        let min = self.r.min(self.g).min(self.b);
        let lightness = (max + min) / 2.0;
        let delta = max - min;

        if delta == 0.0 {
            return (0.0, 0.0, lightness);
        }

        let saturation = if lightness < 0.5 {
            delta / (max + min)
        } else {
            delta / (2.0 - max - min)
        };

        let hue = if max == self.r {
            ((self.g - self.b) / delta).rem_euclid(6.0)
        } else if max == self.g {
            (self.b - self.r) / delta + 2.0
        } else {
            (self.r - self.g) / delta + 4.0
        };

        (hue * 60.0, saturation, lightness)
    }

    fn from_hsl(hue: f64, saturation: f64, lightness: f64) -> Self {
        if saturation == 0.0 {
            return Self {
                r: lightness,
                g: lightness,
                b: lightness,
            };
        }

        let chroma = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
        let h = hue.rem_euclid(360.0) / 60.0;
        let x = chroma * (1.0 - (h.rem_euclid(2.0) - 1.0).abs());
        let (r, g, b) = match h as u32 {
            0 => (chroma, x, 0.0),
            1 => (x, chroma, 0.0),
            2 => (0.0, chroma, x),
            3 => (0.0, x, chroma),
            4 => (x, 0.0, chroma),
            _ => (chroma, 0.0, x),
        };
        let m = lightness - chroma / 2.0;

        Self {
            r: (r + m).clamp(0.0, 1.0),
            g: (g + m).clamp(0.0, 1.0),
            b: (b + m).clamp(0.0, 1.0),
        }
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl TryFrom<String> for Color {
    type Error = ColorParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::from_hex(&s)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Base color for the least pressed keys (muted gray).
pub const DEFAULT_LOW_COLOR: &str = "#929693";

/// Base color for the most pressed keys (saturated green).
pub const DEFAULT_HIGH_COLOR: &str = "#32a852";

/// The two base colors a gradient runs between.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Palette {
    pub low: Color,
    pub high: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            low: Color::from_rgb8(0x92, 0x96, 0x93),
            high: Color::from_rgb8(0x32, 0xa8, 0x52),
        }
    }
}

/// Build `steps` colors running from `low` to `high`, both inclusive.
///
/// A single step yields just `low`. Intermediate colors are linear in HSL,
/// with hue interpolated directly rather than around the short arc.
pub fn gradient(low: Color, high: Color, steps: usize) -> Vec<Color> {
    match steps {
        0 => Vec::new(),
        1 => vec![low],
        _ => {
            let (h0, s0, l0) = low.to_hsl();
            let (h1, s1, l1) = high.to_hsl();
            let last = steps - 1;

            (0..steps)
                .map(|i| {
                    if i == 0 {
                        return low;
                    }
                    if i == last {
                        return high;
                    }
                    let t = i as f64 / last as f64;
                    Color::from_hsl(
                        h0 + (h1 - h0) * t,
                        s0 + (s1 - s0) * t,
                        l0 + (l1 - l0) * t,
                    )
                })
                .collect()
        }
    }
}

/// One gradient entry and the press count it stands for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorStop {
    pub count: u64,
    pub color: Color,
}

/// Color given to one key, with its position in the gradient.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyColor {
    pub index: usize,
    pub color: Color,
}

/// Colors for the keys present in a histogram. Keys never pressed have no
/// entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeyColorAssignment(BTreeMap<KeyId, KeyColor>);

impl KeyColorAssignment {
    pub fn get(&self, key: &KeyId) -> Option<Color> {
        self.0.get(key).map(|entry| entry.color)
    }

    /// Gradient position assigned to `key`.
    pub fn index_of(&self, key: &KeyId) -> Option<usize> {
        self.0.get(key).map(|entry| entry.index)
    }

    pub fn contains(&self, key: &KeyId) -> bool {
        self.0.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&KeyId, &KeyColor)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Gradient plus per-key assignment for one histogram.
#[derive(Debug, Clone, PartialEq)]
pub struct Heatmap {
    pub lowest: u64,
    pub highest: u64,
    pub stops: Vec<ColorStop>,
    pub assignment: KeyColorAssignment,
}

impl Heatmap {
    /// Number of gradient entries (`highest - lowest + 1`).
    pub fn range_size(&self) -> usize {
        self.stops.len()
    }

    /// Color for an arbitrary count inside the observed range.
    pub fn color_for_count(&self, count: u64) -> Option<Color> {
        let index = count.checked_sub(self.lowest)?;
        self.stops.get(index as usize).map(|stop| stop.color)
    }
}

/// Largest gradient `colorize` will build. Counts spread wider than this
/// are rejected with [`HeatmapError::RangeTooLarge`].
pub const MAX_RANGE_SIZE: usize = 4_000_000;

/// Errors from colorizing a histogram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeatmapError {
    EmptyHistogram,
    /// `highest - lowest + 1` exceeds [`MAX_RANGE_SIZE`]
    RangeTooLarge(u64),
}

impl std::fmt::Display for HeatmapError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HeatmapError::EmptyHistogram => write!(f, "No data to colorize: histogram is empty"),
            HeatmapError::RangeTooLarge(size) => {
                write!(f, "Count range of {size} values is too large to colorize")
            }
        }
    }
}

impl std::error::Error for HeatmapError {}

/// Assign every key in `histogram` a color from the palette's gradient.
///
/// The result depends only on the (key, count) pairs, so calling this twice
/// on the same histogram yields the same heatmap.
pub fn colorize(histogram: &Histogram, palette: &Palette) -> Result<Heatmap, HeatmapError> {
    let (lowest, highest) = histogram.extent().ok_or(HeatmapError::EmptyHistogram)?;

    let span = highest - lowest;
    let range_size = usize::try_from(span)
        .ok()
        .and_then(|span| span.checked_add(1))
        .filter(|size| *size <= MAX_RANGE_SIZE)
        .ok_or(HeatmapError::RangeTooLarge(span.saturating_add(1)))?;

    let colors = gradient(palette.low, palette.high, range_size);

    let assignment = histogram
        .iter()
        .map(|(key, count)| {
            let index = (count - lowest) as usize;
            (
                key.clone(),
                KeyColor {
                    index,
                    color: colors[index],
                },
            )
        })
        .collect();

    let stops = colors
        .into_iter()
        .zip(lowest..)
        .map(|(color, count)| ColorStop { count, color })
        .collect();

    Ok(Heatmap {
        lowest,
        highest,
        stops,
        assignment: KeyColorAssignment(assignment),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(id: &str) -> KeyId {
        KeyId::from(id)
    }

    #[test]
    fn test_hex_parsing() {
        let color = Color::from_hex("#32a852").unwrap();
        assert_eq!(color.to_rgb8(), [0x32, 0xa8, 0x52]);
        assert_eq!(color.to_hex(), "#32a852");

        assert_eq!(Color::from_hex("fff").unwrap().to_rgb8(), [255, 255, 255]);
        assert!(Color::from_hex("#12345").is_err());
        assert!(Color::from_hex("#gg0000").is_err());
        assert!("#ééé".parse::<Color>().is_err());
    }

    #[test]
    fn test_hsl_conversion_preserves_color() {
        for hex in ["#929693", "#32a852", "#bebebe", "#ff0000", "#0000ff", "#ffff00"] {
            let color = Color::from_hex(hex).unwrap();
            let (h, s, l) = color.to_hsl();
            assert_eq!(Color::from_hsl(h, s, l).to_hex(), hex);
        }
    }

    #[test]
    fn test_gradient_endpoints() {
        let palette = Palette::default();
        let colors = gradient(palette.low, palette.high, 5);

        assert_eq!(colors.len(), 5);
        assert_eq!(colors[0], palette.low);
        assert_eq!(colors[4], palette.high);
        assert!(gradient(palette.low, palette.high, 0).is_empty());
        assert_eq!(gradient(palette.low, palette.high, 1), vec![palette.low]);
    }

    #[test]
    fn test_gradient_is_ordered() {
        // Black to white only moves lightness, so each step must be brighter.
        let colors = gradient(
            Color::from_rgb8(0, 0, 0),
            Color::from_rgb8(255, 255, 255),
            6,
        );
        for pair in colors.windows(2) {
            assert!(pair[1].r > pair[0].r);
        }
    }

    #[test]
    fn test_colorize_example() {
        let histogram: Histogram = [("a", 3), ("b", 7), ("c", 5)].into_iter().collect();
        let palette = Palette::default();
        let heatmap = colorize(&histogram, &palette).unwrap();

        assert_eq!(heatmap.lowest, 3);
        assert_eq!(heatmap.highest, 7);
        assert_eq!(heatmap.range_size(), 5);

        let colors = gradient(palette.low, palette.high, 5);
        assert_eq!(heatmap.assignment.get(&key("a")), Some(colors[0]));
        assert_eq!(heatmap.assignment.get(&key("c")), Some(colors[2]));
        assert_eq!(heatmap.assignment.get(&key("b")), Some(colors[4]));
        assert_eq!(heatmap.assignment.index_of(&key("c")), Some(2));
        assert_eq!(heatmap.color_for_count(4), Some(colors[1]));
        assert_eq!(heatmap.color_for_count(8), None);
        assert_eq!(heatmap.stops[3].count, 6);
    }

    #[test]
    fn test_single_key_degenerate() {
        let histogram: Histogram = [("x", 5)].into_iter().collect();
        let palette = Palette::default();
        let heatmap = colorize(&histogram, &palette).unwrap();

        assert_eq!(heatmap.range_size(), 1);
        assert_eq!(heatmap.assignment.get(&key("x")), Some(palette.low));
    }

    #[test]
    fn test_equal_counts_share_low_color() {
        let histogram: Histogram = [("a", 4), ("b", 4), ("c", 4)].into_iter().collect();
        let palette = Palette::default();
        let heatmap = colorize(&histogram, &palette).unwrap();

        assert_eq!(heatmap.range_size(), 1);
        for id in ["a", "b", "c"] {
            assert_eq!(heatmap.assignment.get(&key(id)), Some(palette.low));
        }
    }

    #[test]
    fn test_empty_histogram_is_error() {
        let result = colorize(&Histogram::new(), &Palette::default());
        assert_eq!(result, Err(HeatmapError::EmptyHistogram));
    }

    #[test]
    fn test_huge_range_is_error() {
        let histogram: Histogram = [("a", 1), ("b", 1u64 << 62)].into_iter().collect();
        let result = colorize(&histogram, &Palette::default());
        assert_eq!(result, Err(HeatmapError::RangeTooLarge(1u64 << 62)));

        let just_over = MAX_RANGE_SIZE as u64 + 1;
        let histogram: Histogram = [("a", 1), ("b", just_over)].into_iter().collect();
        assert!(matches!(
            colorize(&histogram, &Palette::default()),
            Err(HeatmapError::RangeTooLarge(size)) if size == just_over
        ));
    }

    #[test]
    fn test_unseen_keys_unassigned() {
        let histogram: Histogram = [("a", 1), ("b", 2)].into_iter().collect();
        let heatmap = colorize(&histogram, &Palette::default()).unwrap();

        assert_eq!(heatmap.assignment.len(), 2);
        assert!(!heatmap.assignment.contains(&key("z")));
    }

    #[test]
    fn test_colorize_is_idempotent_and_order_independent() {
        let forward: Histogram = [("a", 2), ("b", 9), ("c", 4), ("d", 9)]
            .into_iter()
            .collect();
        let reverse: Histogram = [("d", 9), ("c", 4), ("b", 9), ("a", 2)]
            .into_iter()
            .collect();
        let palette = Palette::default();

        let first = colorize(&forward, &palette).unwrap();
        assert_eq!(first, colorize(&forward, &palette).unwrap());
        assert_eq!(first, colorize(&reverse, &palette).unwrap());
    }

    #[test]
    fn test_higher_count_has_higher_index() {
        let histogram: Histogram = [("a", 1), ("b", 3), ("c", 3), ("d", 10), ("e", 6)]
            .into_iter()
            .collect();
        let heatmap = colorize(&histogram, &Palette::default()).unwrap();

        for (a, count_a) in histogram.iter() {
            for (b, count_b) in histogram.iter() {
                let ia = heatmap.assignment.index_of(a).unwrap();
                let ib = heatmap.assignment.index_of(b).unwrap();
                if count_a > count_b {
                    assert!(ia > ib);
                } else if count_a == count_b {
                    assert_eq!(ia, ib);
                    assert_eq!(heatmap.assignment.get(a), heatmap.assignment.get(b));
                }
            }
        }
    }
}
