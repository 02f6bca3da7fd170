//! Presentation adapter: interpolated draw position for the active piece
//!
//! Pure visual state chasing the logical anchor; collision and scoring
//! never consult it. A horizontal slide takes ~100ms, a vertical drop one
//! fall interval, and a rotation eases in over nine frames.

use crate::piece::Piece;
use std::time::Duration;

/// Horizontal slide duration in milliseconds
const SLIDE_MS: f32 = 100.0;
/// Rotation eases in over this many animation frames
const ROTATION_FRAMES: f32 = 9.0;

/// Interpolated visual position and rotation of the active piece
#[derive(Debug, Clone)]
pub struct VisualPiece {
    /// Current draw position in pixels
    pub x: f32,
    pub y: f32,
    /// Current draw rotation in degrees, chasing `target_rotation`
    pub rotation: f32,
    target_x: f32,
    target_y: f32,
    target_rotation: f32,
    /// Pixels per millisecond
    vx: f32,
    vy: f32,
    /// Degrees per frame
    rotation_speed: f32,
    cell_px: f32,
}

impl VisualPiece {
    /// Start tracking a freshly spawned piece, snapped to its anchor
    pub fn new(piece: &Piece, cell_px: f32) -> Self {
        let x = piece.col as f32 * cell_px;
        let y = piece.row as f32 * cell_px;
        let rotation = piece.rotation() as f32;
        Self {
            x,
            y,
            rotation,
            target_x: x,
            target_y: y,
            target_rotation: rotation,
            vx: 0.0,
            vy: 0.0,
            rotation_speed: 0.0,
            cell_px,
        }
    }

    /// Re-aim at the piece's logical anchor after a move or rotation
    pub fn retarget(&mut self, piece: &Piece, fall_interval: Duration) {
        self.target_x = piece.col as f32 * self.cell_px;
        self.target_y = piece.row as f32 * self.cell_px;
        self.vx = (self.x - self.target_x).abs() / SLIDE_MS;
        let fall_ms = (fall_interval.as_millis() as f32).max(1.0);
        self.vy = (self.y - self.target_y).abs() / fall_ms;

        // Rotation accumulates in quarter turns so the draw angle always
        // winds forward to catch up
        let piece_rotation = piece.rotation() as f32;
        while self.target_rotation.rem_euclid(360.0) != piece_rotation {
            self.target_rotation += 90.0;
        }
        self.rotation_speed = (self.target_rotation - self.rotation) / ROTATION_FRAMES;
    }

    /// Advance the interpolation by one frame of `delta` wall time
    pub fn update(&mut self, delta: Duration) {
        let ms = delta.as_secs_f32() * 1000.0;

        if self.x != self.target_x {
            let v = if self.target_x < self.x { -self.vx } else { self.vx };
            self.x += v * ms;
            if (v > 0.0 && self.x > self.target_x) || (v < 0.0 && self.x < self.target_x) {
                self.x = self.target_x;
            }
        }

        if self.y != self.target_y {
            let v = if self.target_y < self.y { -self.vy } else { self.vy };
            self.y += v * ms;
            if (v > 0.0 && self.y > self.target_y) || (v < 0.0 && self.y < self.target_y) {
                self.y = self.target_y;
            }
        }

        if self.rotation < self.target_rotation {
            self.rotation += self.rotation_speed;
            if self.rotation > self.target_rotation {
                self.rotation = self.target_rotation;
            }
        }
    }

    /// Degrees still to turn before the draw rotation matches the logical one
    pub fn rotation_lag(&self) -> f32 {
        self.target_rotation - self.rotation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;
    use crate::tetromino::ShapeKind;

    #[test]
    fn test_converges_to_target_without_overshoot() {
        let mut grid = Grid::new(10, 20).unwrap();
        let mut piece = Piece::spawn(ShapeKind::O, &mut grid);
        let mut visual = VisualPiece::new(&piece, 30.0);

        piece.move_down(&mut grid);
        piece.move_right(&mut grid);
        visual.retarget(&piece, Duration::from_millis(500));

        for _ in 0..100 {
            visual.update(Duration::from_millis(16));
            assert!(visual.x <= piece.col as f32 * 30.0);
            assert!(visual.y <= piece.row as f32 * 30.0);
        }
        assert_eq!(visual.x, piece.col as f32 * 30.0);
        assert_eq!(visual.y, piece.row as f32 * 30.0);
    }

    #[test]
    fn test_rotation_eases_toward_logical_state() {
        let mut grid = Grid::new(10, 20).unwrap();
        let mut piece = Piece::spawn(ShapeKind::T, &mut grid);
        for _ in 0..10 {
            piece.move_down(&mut grid);
        }
        let mut visual = VisualPiece::new(&piece, 30.0);
        piece.rotate(&mut grid);
        visual.retarget(&piece, Duration::from_millis(500));

        assert_eq!(visual.rotation_lag(), 90.0);
        for _ in 0..20 {
            visual.update(Duration::from_millis(16));
        }
        assert_eq!(visual.rotation_lag(), 0.0);
    }

    #[test]
    fn test_snap_on_new_piece() {
        let mut grid = Grid::new(10, 20).unwrap();
        let piece = Piece::spawn(ShapeKind::I, &mut grid);
        let visual = VisualPiece::new(&piece, 30.0);
        assert_eq!(visual.x, piece.col as f32 * 30.0);
        assert_eq!(visual.rotation_lag(), 0.0);
    }
}
