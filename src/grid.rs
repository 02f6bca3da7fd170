//! Playfield matrix and row-clear bookkeeping
//!
//! The grid is the sole owner of cell storage; the active piece only reads
//! and writes through it.

use std::fmt;

/// State of a single playfield cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CellState {
    #[default]
    Empty,
    /// Occupied by the currently falling piece
    Moving,
    /// Part of a full row, displayed briefly before collapse
    Clearing,
    /// Locked in place
    Filled,
}

impl CellState {
    pub fn is_empty(&self) -> bool {
        matches!(self, CellState::Empty)
    }

    /// Blocks movement: locked or mid-clear, but not the piece's own cells
    pub fn is_solid(&self) -> bool {
        matches!(self, CellState::Filled | CellState::Clearing)
    }
}

/// The playfield
#[derive(Debug, Clone)]
pub struct Grid {
    width: usize,
    height: usize,
    /// Row-major, row 0 at the top
    cells: Vec<CellState>,
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.height {
            for col in 0..self.width {
                let ch = match self.cells[row * self.width + col] {
                    CellState::Empty => '.',
                    CellState::Moving => 'm',
                    CellState::Clearing => 'c',
                    CellState::Filled => '#',
                };
                write!(f, "{}", ch)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl Grid {
    /// Create an empty grid; dimensions must be positive
    pub fn new(width: usize, height: usize) -> Result<Self, String> {
        if width == 0 || height == 0 {
            return Err(format!(
                "grid dimensions must be positive, got {}x{}",
                width, height
            ));
        }
        Ok(Self {
            width,
            height,
            cells: vec![CellState::Empty; width * height],
        })
    }

    /// Derive dimensions from a square pixel surface and a cell size
    pub fn from_pixel_size(size_px: u32, cell_px: u32) -> Result<Self, String> {
        if cell_px == 0 {
            return Err("cell size must be positive".to_string());
        }
        let side = (size_px / cell_px) as usize;
        Self::new(side, side)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// True iff the coordinate lies inside the playfield
    pub fn is_legal_cell(&self, row: i32, col: i32) -> bool {
        row >= 0 && (row as usize) < self.height && col >= 0 && (col as usize) < self.width
    }

    /// Get the cell at (row, col), None if out of bounds
    pub fn get(&self, row: i32, col: i32) -> Option<CellState> {
        if !self.is_legal_cell(row, col) {
            return None;
        }
        Some(self.cells[row as usize * self.width + col as usize])
    }

    /// Set the cell at (row, col); returns false if out of bounds
    pub fn set(&mut self, row: i32, col: i32, state: CellState) -> bool {
        if !self.is_legal_cell(row, col) {
            return false;
        }
        self.cells[row as usize * self.width + col as usize] = state;
        true
    }

    /// Clear every cell back to Empty
    pub fn reset(&mut self) {
        self.cells.fill(CellState::Empty);
    }

    /// Row-major traversal; the visitor may return a replacement state,
    /// applied immediately
    pub fn for_each_cell<F>(&mut self, mut visitor: F)
    where
        F: FnMut(CellState, usize, usize) -> Option<CellState>,
    {
        for row in 0..self.height {
            for col in 0..self.width {
                let idx = row * self.width + col;
                if let Some(next) = visitor(self.cells[idx], row, col) {
                    self.cells[idx] = next;
                }
            }
        }
    }

    /// Indices of full rows, ascending (top to bottom). A row is full iff
    /// no cell in it is Empty; Moving cells count as occupied so a
    /// just-landed piece completes rows before it is frozen.
    pub fn find_full_rows(&self) -> Vec<usize> {
        let mut indices = Vec::new();
        for row in (0..self.height).rev() {
            let full = (0..self.width)
                .all(|col| !self.cells[row * self.width + col].is_empty());
            if full {
                indices.push(row);
            }
        }
        indices.reverse();
        indices
    }

    /// Mark every cell of the given rows as Clearing; removal happens later
    pub fn mark_rows_clearing(&mut self, rows: &[usize]) {
        for &row in rows {
            if row >= self.height {
                continue;
            }
            for col in 0..self.width {
                self.cells[row * self.width + col] = CellState::Clearing;
            }
        }
    }

    /// Collapse a batch of cleared rows. Each cleared row pulls everything
    /// above it down by one, so a batch of n rows shifts survivors down by
    /// exactly n. Moving cells are left untouched on both sides of the
    /// shift; the top row becomes Empty.
    pub fn collapse_rows(&mut self, rows: &[usize]) {
        for &cleared in rows {
            if cleared >= self.height {
                continue;
            }
            for row in (0..=cleared).rev() {
                for col in 0..self.width {
                    let idx = row * self.width + col;
                    if self.cells[idx] == CellState::Moving {
                        continue;
                    }
                    if row == 0 {
                        self.cells[idx] = CellState::Empty;
                    } else {
                        let above = self.cells[(row - 1) * self.width + col];
                        if above != CellState::Moving {
                            self.cells[idx] = above;
                        }
                    }
                }
            }
        }
    }
}
