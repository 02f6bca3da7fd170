//! Active falling piece logic
//!
//! A piece is a boolean mask plus a grid anchor; all of its cells live in
//! the grid as `Moving` and every mutation is erase-update-rewrite within a
//! single call, so the grid is consistent whenever control returns.

use crate::grid::{CellState, Grid};
use crate::tetromino::ShapeKind;

/// The currently falling piece
#[derive(Debug, Clone)]
pub struct Piece {
    /// Which tetromino this is
    pub kind: ShapeKind,
    /// Occupancy mask, rows x cols, mutated on rotation
    mask: Vec<Vec<bool>>,
    /// Grid row of the mask's top-left corner; negative while the piece is
    /// still above the visible grid
    pub row: i32,
    /// Grid column of the mask's top-left corner
    pub col: i32,
    /// Rotation state in degrees: 0, 90, 180 or 270
    rotation: u16,
}

impl Piece {
    /// Spawn at the top centre of the grid, fully above the visible area,
    /// writing the piece's Moving cells immediately
    pub fn spawn(kind: ShapeKind, grid: &mut Grid) -> Self {
        let mask = kind.mask();
        let cols = mask[0].len() as i32;
        let col = grid.width() as i32 / 2 - cols / 2;
        Self::spawn_at(kind, grid, col)
    }

    /// Spawn at a specific column (top centre is the default path)
    pub fn spawn_at(kind: ShapeKind, grid: &mut Grid, col: i32) -> Self {
        let mask = kind.mask();
        let rows = mask.len() as i32;
        let mut piece = Self {
            kind,
            mask,
            row: -rows,
            col,
            rotation: 0,
        };
        piece.write(grid);
        piece
    }

    /// Mask height in rows
    pub fn row_count(&self) -> i32 {
        self.mask.len() as i32
    }

    /// Mask width in columns
    pub fn col_count(&self) -> i32 {
        self.mask[0].len() as i32
    }

    /// Current rotation state in degrees
    pub fn rotation(&self) -> u16 {
        self.rotation
    }

    /// Grid coordinates of every occupied cell, including ones above row 0
    pub fn cells(&self) -> Vec<(i32, i32)> {
        let mut out = Vec::with_capacity(4);
        for (r, row) in self.mask.iter().enumerate() {
            for (c, &occupied) in row.iter().enumerate() {
                if occupied {
                    out.push((self.row + r as i32, self.col + c as i32));
                }
            }
        }
        out
    }

    fn write(&self, grid: &mut Grid) {
        for (r, c) in self.cells() {
            grid.set(r, c, CellState::Moving);
        }
    }

    fn erase(&self, grid: &mut Grid) {
        for (r, c) in self.cells() {
            grid.set(r, c, CellState::Empty);
        }
    }

    /// Directional scan for a horizontal step. Checks only the shifted
    /// footprint: off-grid in the movement direction rejects, as does any
    /// in-bounds destination that is Filled or Clearing. The piece's own
    /// Moving cells never conflict.
    fn scan_horizontal(&self, grid: &Grid, dx: i32) -> bool {
        if dx < 0 && self.col <= 0 {
            return false;
        }
        if dx > 0 && self.col + self.col_count() >= grid.width() as i32 {
            return false;
        }
        self.cells().into_iter().all(|(r, c)| {
            grid.get(r, c + dx)
                .map(|cell| !cell.is_solid())
                .unwrap_or(true)
        })
    }

    /// Directional scan for a vertical step of `dy` rows
    fn scan_vertical(&self, grid: &Grid, dy: i32) -> bool {
        if dy < 0 && self.row <= 0 {
            return false;
        }
        if dy > 0 && self.row + self.row_count() + dy > grid.height() as i32 {
            return false;
        }
        self.cells().into_iter().all(|(r, c)| {
            grid.get(r + dy, c)
                .map(|cell| !cell.is_solid())
                .unwrap_or(true)
        })
    }

    /// Try to move one column left
    pub fn move_left(&mut self, grid: &mut Grid) -> bool {
        if !self.scan_horizontal(grid, -1) {
            return false;
        }
        self.erase(grid);
        self.col -= 1;
        self.write(grid);
        true
    }

    /// Try to move one column right
    pub fn move_right(&mut self, grid: &mut Grid) -> bool {
        if !self.scan_horizontal(grid, 1) {
            return false;
        }
        self.erase(grid);
        self.col += 1;
        self.write(grid);
        true
    }

    /// Try to move down one row
    pub fn move_down(&mut self, grid: &mut Grid) -> bool {
        self.move_down_by(grid, 1)
    }

    /// Try to move down `by` rows in one step
    pub fn move_down_by(&mut self, grid: &mut Grid, by: i32) -> bool {
        if by <= 0 || !self.scan_vertical(grid, by) {
            return false;
        }
        self.erase(grid);
        self.row += by;
        self.write(grid);
        true
    }

    /// Try to move up one row
    pub fn move_up(&mut self, grid: &mut Grid) -> bool {
        if !self.scan_vertical(grid, -1) {
            return false;
        }
        self.erase(grid);
        self.row -= 1;
        self.write(grid);
        true
    }

    /// Rotate 90 degrees clockwise. The rotation is always applied
    /// geometrically, the anchor re-centred and clamped into the walls and
    /// floor; it is only rejected (and rolled back) if the clamped footprint
    /// would overlap Filled or Clearing cells.
    pub fn rotate(&mut self, grid: &mut Grid) -> bool {
        self.erase(grid);

        let saved_mask = self.mask.clone();
        let saved_row = self.row;
        let saved_col = self.col;

        let old_rows = self.mask.len();
        let old_cols = self.mask[0].len();

        // Transpose plus row reversal
        let mut rotated = vec![vec![false; old_rows]; old_cols];
        for (i, row) in rotated.iter_mut().enumerate() {
            for (j, cell) in row.iter_mut().enumerate() {
                *cell = self.mask[old_rows - 1 - j][i];
            }
        }
        self.mask = rotated;

        // Preserve the midpoint as closely as integer arithmetic allows,
        // alternating floor and ceil by half-turn parity
        let new_rows = self.row_count();
        let new_cols = self.col_count();
        let half = (new_rows - new_cols) as f32 / 2.0;
        let (dc, dr) = if self.rotation % 180 == 0 {
            (half.floor() as i32, (-half).floor() as i32)
        } else {
            (half.ceil() as i32, (-half).ceil() as i32)
        };
        self.col += dc;
        self.row += dr;

        // Clamp into the frame
        if self.col + new_cols > grid.width() as i32 {
            self.col = grid.width() as i32 - new_cols;
        }
        if self.col < 0 {
            self.col = 0;
        }
        if self.row + new_rows > grid.height() as i32 {
            self.row = grid.height() as i32 - new_rows;
        }

        let conflict = self.cells().into_iter().any(|(r, c)| {
            grid.get(r, c).map(|cell| cell.is_solid()).unwrap_or(false)
        });
        if conflict {
            self.mask = saved_mask;
            self.row = saved_row;
            self.col = saved_col;
            self.write(grid);
            return false;
        }

        self.rotation = (self.rotation + 90) % 360;
        self.write(grid);
        true
    }

    /// Lock the piece: its cells become Filled, except cells that were
    /// already marked Clearing by a simultaneous row clear
    pub fn freeze(&self, grid: &mut Grid) {
        for (r, c) in self.cells() {
            if grid.get(r, c) != Some(CellState::Clearing) {
                grid.set(r, c, CellState::Filled);
            }
        }
    }

    /// Pixel-space hit test for the pointer drag channel
    pub fn intersects_point(&self, x: f32, y: f32, cell_px: f32, offset_y: f32) -> bool {
        if cell_px <= 0.0 {
            return false;
        }
        let col = (x / cell_px).floor() as i32;
        let row = ((y - offset_y) / cell_px).floor() as i32;
        let local_r = row - self.row;
        let local_c = col - self.col;
        if local_r < 0 || local_r >= self.row_count() || local_c < 0 || local_c >= self.col_count()
        {
            return false;
        }
        self.mask[local_r as usize][local_c as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_10x20() -> Grid {
        Grid::new(10, 20).unwrap()
    }

    fn snapshot(grid: &Grid) -> Vec<CellState> {
        let mut cells = Vec::new();
        let mut g = grid.clone();
        g.for_each_cell(|state, _, _| {
            cells.push(state);
            None
        });
        cells
    }

    #[test]
    fn test_spawn_centred_above_grid() {
        let mut grid = grid_10x20();
        let o = Piece::spawn(ShapeKind::O, &mut grid);
        assert_eq!(o.col, 4);
        assert_eq!(o.row, -2);
        // Fully above the grid: no cells written yet
        assert!(snapshot(&grid).iter().all(|c| c.is_empty()));
    }

    #[test]
    fn test_spawn_centred_i_piece() {
        let mut grid = grid_10x20();
        let i = Piece::spawn(ShapeKind::I, &mut grid);
        assert_eq!(i.col, 5);
        assert_eq!(i.row, -4);
    }

    #[test]
    fn test_move_down_writes_moving_cells() {
        let mut grid = grid_10x20();
        let mut o = Piece::spawn(ShapeKind::O, &mut grid);
        assert!(o.move_down(&mut grid));
        assert!(o.move_down(&mut grid));
        // 2x2 block now occupies rows 0-1, cols 4-5
        for r in 0..2 {
            for c in 4..6 {
                assert_eq!(grid.get(r, c), Some(CellState::Moving));
            }
        }
    }

    #[test]
    fn test_move_left_at_wall_rejected_without_mutation() {
        let mut grid = grid_10x20();
        let mut o = Piece::spawn(ShapeKind::O, &mut grid);
        for _ in 0..4 {
            o.move_down(&mut grid);
        }
        while o.move_left(&mut grid) {}
        assert_eq!(o.col, 0);
        let before = snapshot(&grid);
        assert!(!o.move_left(&mut grid));
        assert_eq!(snapshot(&grid), before);
    }

    #[test]
    fn test_move_blocked_by_filled_cell() {
        let mut grid = grid_10x20();
        grid.set(5, 3, CellState::Filled);
        let mut o = Piece::spawn_at(ShapeKind::O, &mut grid, 4);
        for _ in 0..6 {
            o.move_down(&mut grid);
        }
        // O occupies rows 4-5, cols 4-5; (5,3) blocks the left step
        assert!(!o.move_left(&mut grid));
        assert_eq!(o.col, 4);
    }

    #[test]
    fn test_move_blocked_by_clearing_cell() {
        let mut grid = grid_10x20();
        grid.set(5, 6, CellState::Clearing);
        let mut o = Piece::spawn_at(ShapeKind::O, &mut grid, 4);
        for _ in 0..6 {
            o.move_down(&mut grid);
        }
        assert!(!o.move_right(&mut grid));
    }

    #[test]
    fn test_move_down_stops_on_floor() {
        let mut grid = grid_10x20();
        let mut o = Piece::spawn(ShapeKind::O, &mut grid);
        let mut steps = 0;
        while o.move_down(&mut grid) {
            steps += 1;
        }
        assert_eq!(o.row, 18);
        assert_eq!(steps, 20);
        assert!(!o.move_down(&mut grid));
    }

    #[test]
    fn test_move_down_by_rejects_overshoot() {
        let mut grid = grid_10x20();
        let mut o = Piece::spawn(ShapeKind::O, &mut grid);
        assert!(!o.move_down_by(&mut grid, 21));
        assert!(o.move_down_by(&mut grid, 20));
        assert_eq!(o.row, 18);
    }

    #[test]
    fn test_rotation_round_trip_in_open_grid() {
        let mut grid = grid_10x20();
        let mut t = Piece::spawn(ShapeKind::T, &mut grid);
        for _ in 0..10 {
            t.move_down(&mut grid);
        }
        let (row0, col0) = (t.row, t.col);
        for _ in 0..4 {
            assert!(t.rotate(&mut grid));
        }
        assert_eq!(t.rotation(), 0);
        assert_eq!(t.mask, ShapeKind::T.mask());
        // Anchor drift from integer re-centring must stay bounded
        assert!((t.row - row0).abs() <= 1, "row drift {}", t.row - row0);
        assert!((t.col - col0).abs() <= 1, "col drift {}", t.col - col0);
    }

    #[test]
    fn test_rotation_clamped_at_right_wall() {
        let mut grid = grid_10x20();
        let mut i = Piece::spawn(ShapeKind::I, &mut grid);
        for _ in 0..10 {
            i.move_down(&mut grid);
        }
        while i.move_right(&mut grid) {}
        assert_eq!(i.col, 9);
        // Vertical bar against the wall rotates to horizontal: clamped
        // back inside instead of rejected
        assert!(i.rotate(&mut grid));
        assert_eq!(i.col_count(), 4);
        assert!(i.col >= 0);
        assert!(i.col + i.col_count() <= 10);
    }

    #[test]
    fn test_rotation_rejected_on_overlap() {
        let mut grid = grid_10x20();
        let mut i = Piece::spawn(ShapeKind::I, &mut grid);
        for _ in 0..14 {
            i.move_down(&mut grid);
        }
        // Wall of filled cells beside the vertical bar blocks the
        // horizontal footprint
        for col in 0..10 {
            if col != i.col {
                for row in 10..14 {
                    grid.set(row, col, CellState::Filled);
                }
            }
        }
        let before = snapshot(&grid);
        let (row0, col0) = (i.row, i.col);
        assert!(!i.rotate(&mut grid));
        assert_eq!(i.row, row0);
        assert_eq!(i.col, col0);
        assert_eq!(i.rotation(), 0);
        assert_eq!(snapshot(&grid), before);
    }

    #[test]
    fn test_freeze_locks_cells_and_keeps_clearing() {
        let mut grid = grid_10x20();
        let mut o = Piece::spawn(ShapeKind::O, &mut grid);
        while o.move_down(&mut grid) {}
        // Pretend the bottom row completed and was marked
        grid.mark_rows_clearing(&[19]);
        o.freeze(&mut grid);
        assert_eq!(grid.get(18, 4), Some(CellState::Filled));
        assert_eq!(grid.get(19, 4), Some(CellState::Clearing));
    }

    #[test]
    fn test_intersects_point() {
        let mut grid = grid_10x20();
        let mut o = Piece::spawn(ShapeKind::O, &mut grid);
        for _ in 0..6 {
            o.move_down(&mut grid);
        }
        // O at rows 4-5, cols 4-5, 30px cells, no offset
        assert!(o.intersects_point(135.0, 150.0, 30.0, 0.0));
        assert!(!o.intersects_point(15.0, 150.0, 30.0, 0.0));
    }
}
