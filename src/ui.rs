//! Terminal UI rendering with ratatui
//!
//! Draws the playfield from the session's exposed state: the cell matrix,
//! the active piece at its interpolated visual position, score and the
//! speed multiplier.

use crate::animate::VisualPiece;
use crate::game::{Session, SessionState};
use crate::grid::CellState;
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

const FILLED: &str = "██";
const CLEARING: &str = "▓▓";
const MOVING: &str = "██";
const EMPTY: &str = "░░";

/// Background tint cycled per level
const LEVEL_TINTS: [Color; 10] = [
    Color::Rgb(0x5d, 0x5d, 0x5d),
    Color::Rgb(0x59, 0x61, 0x6e),
    Color::Rgb(0x59, 0x5c, 0x6e),
    Color::Rgb(0x5c, 0x59, 0x6e),
    Color::Rgb(0x63, 0x59, 0x6e),
    Color::Rgb(0x6c, 0x59, 0x6e),
    Color::Rgb(0x6e, 0x59, 0x6b),
    Color::Rgb(0x6e, 0x59, 0x60),
    Color::Rgb(0x6e, 0x64, 0x59),
    Color::Rgb(0x6e, 0x6e, 0x59),
];

/// Render the whole game screen
pub fn render_game(frame: &mut Frame, session: &Session, visual: Option<&VisualPiece>) {
    let grid = session.grid();
    let width = grid.width() as u16;
    let height = grid.height() as u16;

    let area = center_rect(frame.area(), width * 2 + 2, height + 2);

    let multiplier = 500.0 / session.fall_interval().as_millis().max(1) as f64;
    let title = format!(" quadfall — score {} ", session.score());
    let footer = format!(" level {}  speed {:.1}x ", session.level(), multiplier);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .title_bottom(Line::from(footer).alignment(Alignment::Right))
        .border_style(Style::default().fg(Color::Gray));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let tint = LEVEL_TINTS[(session.level() as usize - 1) % LEVEL_TINTS.len()];
    let piece_cells = visual_cells(session, visual);

    let mut lines = Vec::with_capacity(grid.height());
    for row in 0..grid.height() as i32 {
        let mut spans = Vec::with_capacity(grid.width());
        for col in 0..grid.width() as i32 {
            let span = if let Some(color) = piece_cells
                .iter()
                .find(|&&(r, c, _)| r == row && c == col)
                .map(|&(_, _, color)| color)
            {
                Span::styled(MOVING, Style::default().fg(color))
            } else {
                match grid.get(row, col) {
                    Some(CellState::Filled) => {
                        Span::styled(FILLED, Style::default().fg(Color::Red))
                    }
                    Some(CellState::Clearing) => {
                        Span::styled(CLEARING, Style::default().fg(Color::Green))
                    }
                    // Moving cells are drawn via the visual position instead
                    _ => Span::styled(EMPTY, Style::default().fg(tint)),
                }
            };
            spans.push(span);
        }
        lines.push(Line::from(spans));
    }
    frame.render_widget(Paragraph::new(lines), inner);

    match session.state() {
        SessionState::Paused => render_banner(frame, area, "PAUSED", "p to resume"),
        SessionState::GameOver => {
            render_banner(frame, area, "GAME OVER", "enter to restart, q to quit")
        }
        _ => {}
    }
}

/// The active piece's draw cells: logical footprint shifted to the
/// interpolated anchor when a visual tracker is supplied
fn visual_cells(session: &Session, visual: Option<&VisualPiece>) -> Vec<(i32, i32, Color)> {
    let Some(piece) = session.current_piece() else {
        return Vec::new();
    };
    let color = piece.kind.color();
    let (dr, dc) = match visual {
        Some(v) => {
            let cell = session.cell_px();
            let draw_row = (v.y / cell).round() as i32;
            let draw_col = (v.x / cell).round() as i32;
            (draw_row - piece.row, draw_col - piece.col)
        }
        None => (0, 0),
    };
    piece
        .cells()
        .into_iter()
        .map(|(r, c)| (r + dr, c + dc, color))
        .collect()
}

fn render_banner(frame: &mut Frame, board: Rect, title: &str, hint: &str) {
    let area = center_rect(board, (hint.len() as u16 + 6).max(16), 4);
    frame.render_widget(Clear, area);
    let lines = vec![
        Line::styled(title.to_string(), Style::default().fg(Color::Yellow).bold()),
        Line::styled(hint.to_string(), Style::default().fg(Color::DarkGray)),
    ];
    let banner = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(banner, area);
}

/// Inner playfield rect for a given terminal area, used by the host to map
/// mouse positions back to board pixels
pub fn playfield_rect(area: Rect, session: &Session) -> Rect {
    let grid = session.grid();
    let outer = center_rect(area, grid.width() as u16 * 2 + 2, grid.height() as u16 + 2);
    Rect {
        x: outer.x + 1,
        y: outer.y + 1,
        width: outer.width.saturating_sub(2),
        height: outer.height.saturating_sub(2),
    }
}

/// Centre a w x h rect inside the given area, clamped to fit
fn center_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
