//! Shape definitions for the seven standard tetrominoes
//!
//! Each kind is a tagged variant mapped to its initial boolean mask;
//! rotation is derived at runtime by the piece, not stored here.

use ratatui::style::Color;

/// The 7 tetromino kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    I, // Cyan - long bar
    O, // Yellow - square
    T, // Purple - T-shape
    L, // Orange - L-shape
    J, // Blue - mirrored L
    S, // Green - S-shape
    Z, // Red - Z-shape
}

impl ShapeKind {
    /// Get the color for this shape
    pub fn color(&self) -> Color {
        match self {
            ShapeKind::I => Color::Cyan,
            ShapeKind::O => Color::Yellow,
            ShapeKind::T => Color::Magenta,
            ShapeKind::L => Color::Rgb(255, 165, 0), // Orange
            ShapeKind::J => Color::Blue,
            ShapeKind::S => Color::Green,
            ShapeKind::Z => Color::Red,
        }
    }

    /// All kinds, for uniform random selection
    pub fn all() -> [ShapeKind; 7] {
        [
            ShapeKind::I,
            ShapeKind::O,
            ShapeKind::T,
            ShapeKind::L,
            ShapeKind::J,
            ShapeKind::S,
            ShapeKind::Z,
        ]
    }

    /// Initial occupancy mask (rows x cols) in spawn orientation
    pub fn mask(&self) -> Vec<Vec<bool>> {
        let rows: &[&[bool]] = match self {
            ShapeKind::I => &[&[true], &[true], &[true], &[true]],
            ShapeKind::O => &[&[true, true], &[true, true]],
            ShapeKind::T => &[&[true, false], &[true, true], &[true, false]],
            ShapeKind::L => &[&[true, false], &[true, false], &[true, true]],
            ShapeKind::J => &[&[false, true], &[false, true], &[true, true]],
            ShapeKind::S => &[&[false, true, true], &[true, true, false]],
            ShapeKind::Z => &[&[true, true, false], &[false, true, true]],
        };
        rows.iter().map(|r| r.to_vec()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_masks_have_four_cells() {
        for kind in ShapeKind::all() {
            let mask = kind.mask();
            let count: usize = mask
                .iter()
                .map(|row| row.iter().filter(|&&b| b).count())
                .sum();
            assert_eq!(count, 4, "{:?} should occupy 4 cells", kind);
        }
    }

    #[test]
    fn test_masks_are_rectangular() {
        for kind in ShapeKind::all() {
            let mask = kind.mask();
            let width = mask[0].len();
            assert!(mask.iter().all(|row| row.len() == width));
        }
    }
}
