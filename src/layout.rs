//! Keyboard layout and heatmap painting.
//!
//! The layout is the display side of the heatmap: it knows where keys sit
//! and which identifier each one answers to. Painting looks up each layout
//! key in a [`KeyColorAssignment`]; keys with no assignment get the unseen
//! color, and assigned identifiers that are not on the layout are skipped.

use crate::collector::types::KeyId;
use crate::core::heatmap::{Color, KeyColorAssignment};
use std::fmt::Write as _;

/// Color for keys that were never pressed.
pub const DEFAULT_UNSEEN_COLOR: &str = "#bebebe";

/// One key cap: display label, identifier, width in key units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutKey {
    pub label: &'static str,
    pub id: &'static str,
    pub width: f32,
}

const fn k(label: &'static str, id: &'static str, width: f32) -> LayoutKey {
    LayoutKey { label, id, width }
}

// US QWERTY. Identifiers follow the key-id scheme: lowercase character for
// printable keys, lowercase name otherwise.
const ROW_F: &[LayoutKey] = &[
    k("Esc", "esc", 1.0),
    k("F1", "f1", 1.0),
    k("F2", "f2", 1.0),
    k("F3", "f3", 1.0),
    k("F4", "f4", 1.0),
    k("F5", "f5", 1.0),
    k("F6", "f6", 1.0),
    k("F7", "f7", 1.0),
    k("F8", "f8", 1.0),
    k("F9", "f9", 1.0),
    k("F10", "f10", 1.0),
    k("F11", "f11", 1.0),
    k("F12", "f12", 1.0),
];
const ROW_NUM: &[LayoutKey] = &[
    k("`", "`", 1.0),
    k("1", "1", 1.0),
    k("2", "2", 1.0),
    k("3", "3", 1.0),
    k("4", "4", 1.0),
    k("5", "5", 1.0),
    k("6", "6", 1.0),
    k("7", "7", 1.0),
    k("8", "8", 1.0),
    k("9", "9", 1.0),
    k("0", "0", 1.0),
    k("-", "-", 1.0),
    k("=", "=", 1.0),
    k("Bksp", "backspace", 2.0),
];
const ROW_TOP: &[LayoutKey] = &[
    k("Tab", "tab", 1.5),
    k("Q", "q", 1.0),
    k("W", "w", 1.0),
    k("E", "e", 1.0),
    k("R", "r", 1.0),
    k("T", "t", 1.0),
    k("Y", "y", 1.0),
    k("U", "u", 1.0),
    k("I", "i", 1.0),
    k("O", "o", 1.0),
    k("P", "p", 1.0),
    k("[", "[", 1.0),
    k("]", "]", 1.0),
    k("\\", "\\", 1.5),
];
const ROW_HOME: &[LayoutKey] = &[
    k("Caps", "caps_lock", 1.75),
    k("A", "a", 1.0),
    k("S", "s", 1.0),
    k("D", "d", 1.0),
    k("F", "f", 1.0),
    k("G", "g", 1.0),
    k("H", "h", 1.0),
    k("J", "j", 1.0),
    k("K", "k", 1.0),
    k("L", "l", 1.0),
    k(";", ";", 1.0),
    k("'", "'", 1.0),
    k("Enter", "enter", 2.25),
];
const ROW_SHIFT: &[LayoutKey] = &[
    k("Shift", "shift", 2.25),
    k("Z", "z", 1.0),
    k("X", "x", 1.0),
    k("C", "c", 1.0),
    k("V", "v", 1.0),
    k("B", "b", 1.0),
    k("N", "n", 1.0),
    k("M", "m", 1.0),
    k(",", ",", 1.0),
    k(".", ".", 1.0),
    k("/", "/", 1.0),
    k("Shift", "shift_r", 2.75),
];
const ROW_BOTTOM: &[LayoutKey] = &[
    k("Ctrl", "ctrl_l", 1.5),
    k("Cmd", "cmd", 1.25),
    k("Alt", "alt_l", 1.25),
    k("Space", "space", 6.25),
    k("AltGr", "alt_gr", 1.25),
    k("Menu", "menu", 1.25),
    k("Ctrl", "ctrl_r", 1.5),
];

/// A physical keyboard as rows of keys.
#[derive(Debug, Clone)]
pub struct KeyboardLayout {
    pub name: &'static str,
    pub rows: Vec<&'static [LayoutKey]>,
}

impl KeyboardLayout {
    /// Full-size US QWERTY main block with the function row.
    pub fn qwerty() -> Self {
        Self {
            name: "qwerty",
            rows: vec![ROW_F, ROW_NUM, ROW_TOP, ROW_HOME, ROW_SHIFT, ROW_BOTTOM],
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &LayoutKey> {
        self.rows.iter().flat_map(|row| row.iter())
    }

    pub fn contains(&self, id: &KeyId) -> bool {
        self.keys().any(|key| key.id == id.as_str())
    }
}

/// A layout key with the color it should be drawn in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaintedKey {
    pub key: LayoutKey,
    pub color: Color,
    /// False when the key kept the unseen color
    pub pressed: bool,
}

/// A layout after painting.
#[derive(Debug, Clone)]
pub struct PaintedLayout {
    pub rows: Vec<Vec<PaintedKey>>,
    /// Assigned identifiers that have no position on the layout
    pub skipped: Vec<KeyId>,
}

/// Paint `layout` with `assignment`, using `unseen` for keys never pressed.
pub fn paint(layout: &KeyboardLayout, assignment: &KeyColorAssignment, unseen: Color) -> PaintedLayout {
    let rows = layout
        .rows
        .iter()
        .map(|row| {
            row.iter()
                .map(|key| match assignment.get(&KeyId::from(key.id)) {
                    Some(color) => PaintedKey {
                        key: *key,
                        color,
                        pressed: true,
                    },
                    None => PaintedKey {
                        key: *key,
                        color: unseen,
                        pressed: false,
                    },
                })
                .collect()
        })
        .collect();

    let skipped: Vec<KeyId> = assignment
        .iter()
        .map(|(id, _)| id)
        .filter(|id| !layout.contains(id))
        .cloned()
        .collect();
    for id in &skipped {
        tracing::debug!(key = %id, layout = layout.name, "key not on layout, skipped");
    }

    PaintedLayout { rows, skipped }
}

/// Character cells per key unit when rendering to a terminal.
const CELLS_PER_UNIT: f32 = 5.0;

/// Render a painted layout as 24-bit ANSI colored text.
pub fn render_ansi(painted: &PaintedLayout) -> String {
    let mut out = String::new();
    for row in &painted.rows {
        for painted_key in row {
            let cells = (painted_key.key.width * CELLS_PER_UNIT).round() as usize - 1;
            let [r, g, b] = painted_key.color.to_rgb8();
            let _ = write!(
                out,
                "\x1b[48;2;{r};{g};{b}m\x1b[38;2;0;0;0m{:^cells$}\x1b[0m ",
                painted_key.key.label
            );
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::heatmap::{colorize, Palette};
    use crate::core::histogram::Histogram;

    fn unseen() -> Color {
        Color::from_hex(DEFAULT_UNSEEN_COLOR).unwrap()
    }

    #[test]
    fn test_qwerty_ids_are_unique() {
        let layout = KeyboardLayout::qwerty();
        let mut ids: Vec<&str> = layout.keys().map(|k| k.id).collect();
        let total = ids.len();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), total);
        assert!(layout.contains(&KeyId::from("esc")));
        assert!(layout.contains(&KeyId::from("space")));
    }

    #[test]
    fn test_paint_assigned_and_unseen() {
        let histogram: Histogram = [("a", 1), ("space", 4)].into_iter().collect();
        let palette = Palette::default();
        let heatmap = colorize(&histogram, &palette).unwrap();
        let painted = paint(&KeyboardLayout::qwerty(), &heatmap.assignment, unseen());

        let find = |id: &str| {
            painted
                .rows
                .iter()
                .flatten()
                .find(|p| p.key.id == id)
                .copied()
                .unwrap()
        };

        assert_eq!(find("a").color, palette.low);
        assert!(find("a").pressed);
        assert_eq!(find("space").color, palette.high);
        assert_eq!(find("q").color, unseen());
        assert!(!find("q").pressed);
        assert!(painted.skipped.is_empty());
    }

    #[test]
    fn test_unknown_keys_skipped() {
        let histogram: Histogram = [("a", 2), ("media_play_pause", 9), ("<65437>", 1)]
            .into_iter()
            .collect();
        let heatmap = colorize(&histogram, &Palette::default()).unwrap();
        let painted = paint(&KeyboardLayout::qwerty(), &heatmap.assignment, unseen());

        assert_eq!(painted.skipped.len(), 2);
        let pressed = painted.rows.iter().flatten().filter(|p| p.pressed).count();
        assert_eq!(pressed, 1);
    }

    #[test]
    fn test_render_ansi_rows() {
        let painted = paint(
            &KeyboardLayout::qwerty(),
            &KeyColorAssignment::default(),
            unseen(),
        );
        let text = render_ansi(&painted);

        assert_eq!(text.lines().count(), 6);
        assert!(text.contains("Space"));
        assert!(text.contains("\x1b[48;2;190;190;190m"));
    }
}
