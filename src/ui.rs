//! Layout and drawing: title, board, sliding tokens, sidebar, result and pause overlays, quit menu.

use crate::app::{QuitOption, Screen};
use crate::board::{BOARD_HEIGHT, BOARD_WIDTH, Board, Cell, HOLE, Overlap, Pos, Token};
use crate::motion::{CELL_PX, Fixed2, Sprite};
use crate::session::{Phase, Session};
use crate::theme::Theme;
use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Widget};
use std::time::Instant;
use tachyonfx::{Duration as TfxDuration, Effect, EffectRenderer, Interpolation, fx};

/// Terminal columns and rows per board cell.
const CELL_COLS: u16 = 6;
const CELL_ROWS: u16 = 3;
/// Token drawing inset: one column of margin each side.
const TOKEN_INSET: u16 = 1;
const SIDEBAR_WIDTH: u16 = 26;
const HOLE_FADE_MS: u32 = 450;

/// Board size in terminal cells including the border.
fn board_outer_size() -> (u16, u16) {
    (
        u16::from(BOARD_WIDTH) * CELL_COLS + 2,
        u16::from(BOARD_HEIGHT) * CELL_ROWS + 2,
    )
}

/// Fade played over the hole when tokens drop in.
#[derive(Default)]
pub struct HoleFade {
    effect: Option<Effect>,
    last_process: Option<Instant>,
}

impl HoleFade {
    /// Restart the fade; called on the frame a token falls in.
    pub fn trigger(&mut self, theme: &Theme) {
        self.effect = Some(fx::fade_to(
            theme.hole,
            theme.hole,
            (HOLE_FADE_MS, Interpolation::QuadOut),
        ));
        self.last_process = None;
    }

    pub fn clear(&mut self) {
        self.effect = None;
        self.last_process = None;
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, now: Instant) {
        let Some(effect) = &mut self.effect else {
            return;
        };
        let delta = self
            .last_process
            .map(|t| now.saturating_duration_since(t))
            .unwrap_or(std::time::Duration::ZERO);
        let delta_ms = delta.as_millis().min(u128::from(u32::MAX)) as u32;
        self.last_process = Some(now);
        frame.render_effect(effect, area, TfxDuration::from_millis(delta_ms));
        if effect.done() {
            self.clear();
        }
    }
}

/// Draw the current screen with optional pause overlay and quit menu.
pub fn draw(
    frame: &mut Frame,
    screen: Screen,
    session: &Session,
    theme: &Theme,
    paused: bool,
    quit_selected: QuitOption,
    hole_fade: &mut HoleFade,
    now: Instant,
) {
    let area = frame.area();
    match screen {
        Screen::Title => draw_title(frame, theme, area),
        Screen::Playing | Screen::QuitMenu => {
            let board_area = draw_game(frame, session, theme, area);
            hole_fade.render(frame, cell_rect(board_area, HOLE), now);
            match session.phase() {
                Phase::Won => draw_result(frame, theme, area, true, session.tilts()),
                Phase::Lost => draw_result(frame, theme, area, false, session.tilts()),
                Phase::Idle | Phase::Animating(_) => {}
            }
            if paused && screen == Screen::Playing {
                draw_pause_overlay(frame, theme, area);
            }
            if screen == Screen::QuitMenu {
                draw_quit_menu(frame, theme, quit_selected);
            }
        }
    }
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    Rect {
        x: area.x + area.width.saturating_sub(width) / 2,
        y: area.y + area.height.saturating_sub(height) / 2,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

fn fill(buf: &mut Buffer, rect: Rect, style: Style) {
    let rect = rect.intersection(buf.area);
    for y in rect.y..rect.y + rect.height {
        for x in rect.x..rect.x + rect.width {
            buf[(x, y)].set_symbol(" ").set_style(style);
        }
    }
}

const HOW_TO_PLAY: [&str; 7] = [
    "Tilt the board to slide every token",
    "as far as it will go.",
    "",
    "Drop all green tokens into the hole.",
    "A blue token in the hole loses the level.",
    "",
    "Stoppers never move.",
];

fn draw_title(frame: &mut Frame, theme: &Theme, area: Rect) {
    let popup = centered(area, 48, 19);
    let title_style = Style::default()
        .fg(theme.title)
        .add_modifier(Modifier::BOLD);
    let fg = Style::default().fg(theme.main_fg);
    let hint = Style::default().fg(theme.inactive_fg);

    let mut lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled(" ▐█▌ ", Style::default().fg(theme.green)),
            Span::styled(" T I L T ", title_style),
            Span::styled(" ▐█▌ ", Style::default().fg(theme.blue)),
        ]),
        Line::from(""),
    ];
    lines.extend(HOW_TO_PLAY.iter().map(|l| Line::from(Span::styled(*l, fg))));
    lines.extend([
        Line::from(""),
        Line::from(Span::styled("←↑↓→ / hjkl  tilt", hint)),
        Line::from(Span::styled("n / b  next / previous level", hint)),
        Line::from(Span::styled("r  restart   p  pause   q  quit", hint)),
        Line::from(""),
        Line::from(Span::styled(
            " Enter to start ",
            Style::default().fg(Color::Black).bg(theme.title),
        )),
    ]);
    fill(frame.buffer_mut(), popup, Style::default().bg(theme.bg));
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.div_line).bg(theme.bg)),
        )
        .render(popup, frame.buffer_mut());
}

/// Board + sidebar centred in `area`. Returns the board's inner rect.
fn draw_game(frame: &mut Frame, session: &Session, theme: &Theme, area: Rect) -> Rect {
    let (bw, bh) = board_outer_size();
    let total_w = bw + SIDEBAR_WIDTH;

    let horiz = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(total_w),
            Constraint::Fill(1),
        ])
        .split(area);
    let vert = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(bh),
            Constraint::Fill(1),
        ])
        .split(horiz[1]);
    let inner = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(bw), Constraint::Length(SIDEBAR_WIDTH)])
        .split(vert[1]);

    let board_area = draw_board(frame, session, theme, inner[0]);
    draw_sidebar(frame, session, theme, inner[1]);
    board_area
}

fn cell_rect(board: Rect, pos: Pos) -> Rect {
    Rect {
        x: board.x + u16::from(pos.x) * CELL_COLS,
        y: board.y + u16::from(pos.y) * CELL_ROWS,
        width: CELL_COLS,
        height: CELL_ROWS,
    }
}

/// Top-left terminal cell of a sprite, relative to the board's inner origin.
fn sprite_offset(pos: Fixed2) -> (u16, u16) {
    let (px, py) = pos.to_pixels();
    let scale = |p: i32, cells: u16| {
        let v = (p.max(0) * i32::from(cells) + CELL_PX / 2) / CELL_PX;
        v as u16
    };
    (scale(px, CELL_COLS), scale(py, CELL_ROWS))
}

/// Glyph for one terminal cell of a token (`col`, `row` within its 4×3 body), and whether
/// the hole shows through as background.
fn token_glyph(overlap: Overlap, col: u16, row: u16) -> (&'static str, bool) {
    let last_col = CELL_COLS - 2 * TOKEN_INSET - 1;
    let last_row = CELL_ROWS - 1;
    match overlap {
        Overlap::Center => ("░", true),
        Overlap::Top if row == last_row => ("▀", true),
        Overlap::Bottom if row == 0 => ("▄", true),
        Overlap::Left if col == last_col => ("▌", true),
        Overlap::Right if col == 0 => ("▐", true),
        _ => ("█", false),
    }
}

fn token_color(theme: &Theme, token: Token) -> Color {
    match token {
        Token::Green => theme.green,
        Token::Blue => theme.blue,
    }
}

fn draw_token(
    buf: &mut Buffer,
    clip: Rect,
    origin: (u16, u16),
    color: Color,
    overlap: Overlap,
    theme: &Theme,
) {
    let width = CELL_COLS - 2 * TOKEN_INSET;
    for row in 0..CELL_ROWS {
        for col in 0..width {
            let x = origin.0 + TOKEN_INSET + col;
            let y = origin.1 + row;
            if !clip.contains((x, y).into()) {
                continue;
            }
            let (symbol, hole_bg) = token_glyph(overlap, col, row);
            let bg = if hole_bg { theme.hole } else { theme.bg };
            buf[(x, y)]
                .set_symbol(symbol)
                .set_style(Style::default().fg(color).bg(bg));
        }
    }
}

fn sprite_overlap(sprite: &Sprite) -> Overlap {
    if sprite.in_hole {
        Overlap::Center
    } else if sprite.settled {
        Overlap::at(sprite.end)
    } else {
        Overlap::None
    }
}

/// Board with border, stoppers, hole and tokens. Returns the inner rect.
fn draw_board(frame: &mut Frame, session: &Session, theme: &Theme, area: Rect) -> Rect {
    let title = format!(" Level {} ", session.level());
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
        .title(Span::styled(title, Style::default().fg(theme.title)));
    let inner = block.inner(area);
    block.render(area, frame.buffer_mut());

    let buf = frame.buffer_mut();
    fill(buf, inner, Style::default().bg(theme.bg));
    let board = session.board();

    for pos in Board::positions() {
        let rect = cell_rect(inner, pos).intersection(inner);
        if pos.is_hole() {
            fill(buf, rect, Style::default().bg(theme.hole));
            continue;
        }
        match board.get(pos) {
            Cell::Stopper => {
                for y in rect.y..rect.y + rect.height {
                    for x in rect.x..rect.x + rect.width {
                        buf[(x, y)]
                            .set_symbol("▓")
                            .set_style(Style::default().fg(theme.stopper).bg(theme.bg));
                    }
                }
            }
            _ if rect.width == CELL_COLS && rect.height == CELL_ROWS => {
                buf[(rect.x + CELL_COLS / 2, rect.y + CELL_ROWS / 2)]
                    .set_symbol("·")
                    .set_style(Style::default().fg(theme.div_line).bg(theme.bg));
            }
            _ => {}
        }
    }

    match session.animator() {
        Some(animator) => {
            // Tokens left out of the move set stay put on the board.
            for (pos, cell, overlap) in board.draw_cells() {
                if let Some(token) = cell.token().filter(|_| !animator.lands_on(pos)) {
                    let rect = cell_rect(inner, pos);
                    let color = token_color(theme, token);
                    draw_token(buf, inner, (rect.x, rect.y), color, overlap, theme);
                }
            }
            for sprite in &animator.sprites() {
                let (dx, dy) = sprite_offset(sprite.pos);
                let origin = (inner.x + dx, inner.y + dy);
                let color = token_color(theme, sprite.piece);
                draw_token(buf, inner, origin, color, sprite_overlap(sprite), theme);
            }
        }
        None => {
            for (pos, cell, overlap) in board.draw_cells() {
                if let Some(token) = cell.token() {
                    let rect = cell_rect(inner, pos);
                    let color = token_color(theme, token);
                    draw_token(buf, inner, (rect.x, rect.y), color, overlap, theme);
                }
            }
        }
    }
    inner
}

fn draw_sidebar(frame: &mut Frame, session: &Session, theme: &Theme, area: Rect) {
    let title_style = Style::default().fg(theme.title);
    let fg_style = Style::default().fg(theme.main_fg);
    let hint_style = Style::default().fg(theme.inactive_fg);
    let border_style = Style::default().fg(theme.div_line).bg(theme.bg);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(7), // Stats
            Constraint::Length(1), // gap
            Constraint::Fill(1),   // Controls
        ])
        .split(area);

    let status = match session.phase() {
        Phase::Idle => "Ready",
        Phase::Animating(_) => "Sliding",
        Phase::Won => "Solved",
        Phase::Lost => "Lost",
    };
    let greens = session.board().count(Cell::Green);
    let mut stats = vec![
        Line::from(vec![
            Span::styled("Level: ", title_style),
            Span::styled(
                format!("{} / {}", session.level(), session.level_count()),
                fg_style,
            ),
        ]),
        Line::from(vec![
            Span::styled("Tilts: ", title_style),
            Span::styled(session.tilts().to_string(), fg_style),
        ]),
        Line::from(vec![
            Span::styled("Green left: ", title_style),
            Span::styled(greens.to_string(), Style::default().fg(theme.green)),
        ]),
        Line::from(vec![
            Span::styled("Status: ", title_style),
            Span::styled(status, fg_style),
        ]),
    ];
    if session.held_back() {
        stats.push(Line::from(Span::styled(
            "Extra tokens held back",
            Style::default().fg(theme.stopper),
        )));
    }
    Paragraph::new(stats)
        .block(Block::default().borders(Borders::ALL).border_style(border_style))
        .render(chunks[0], frame.buffer_mut());

    let controls: Vec<Line> = [
        ("←↑↓→ hjkl", "tilt"),
        ("n / b", "next / prev"),
        ("r", "restart"),
        ("Enter", "continue"),
        ("p", "pause"),
        ("q / Esc", "quit"),
    ]
    .into_iter()
    .map(|(key, what)| {
        Line::from(vec![
            Span::styled(format!("{key:<10}"), fg_style),
            Span::styled(what, hint_style),
        ])
    })
    .collect();
    Paragraph::new(controls)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style)
                .title(Span::styled(" Controls ", title_style)),
        )
        .render(chunks[2], frame.buffer_mut());
}

fn draw_result(frame: &mut Frame, theme: &Theme, area: Rect, won: bool, tilts: u32) {
    let popup = centered(area, 34, 7);
    let (banner, color, detail, next) = if won {
        (
            " Solved! ",
            theme.green,
            format!("All greens in after {tilts} tilts"),
            "Enter  next level",
        )
    } else {
        (
            " A blue fell in ",
            theme.blue,
            "Blue tokens must stay out".to_string(),
            "Enter  try again",
        )
    };
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            banner,
            Style::default()
                .fg(Color::Black)
                .bg(color)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(detail, Style::default().fg(theme.main_fg))),
        Line::from(""),
        Line::from(Span::styled(next, Style::default().fg(theme.inactive_fg))),
    ];
    fill(frame.buffer_mut(), popup, Style::default().bg(theme.bg));
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color).bg(theme.bg)),
        )
        .render(popup, frame.buffer_mut());
}

fn draw_pause_overlay(frame: &mut Frame, theme: &Theme, area: Rect) {
    let popup = centered(area, 28, 5);
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            " Paused ",
            Style::default().fg(Color::Black).bg(Color::Yellow),
        )),
        Line::from(""),
        Line::from(Span::styled(
            " P  Resume    Q  Quit ",
            Style::default().fg(theme.main_fg),
        )),
    ];
    fill(frame.buffer_mut(), popup, Style::default().bg(theme.bg));
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.div_line).bg(theme.bg)),
        )
        .render(popup, frame.buffer_mut());
}

fn draw_quit_menu(frame: &mut Frame, theme: &Theme, selected: QuitOption) {
    let quit_rect = centered(frame.area(), 24, 8);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.title))
        .title(" Quit? ");

    fill(frame.buffer_mut(), quit_rect, Style::default().bg(theme.bg));
    let inner = block.inner(quit_rect);
    block.render(quit_rect, frame.buffer_mut());

    let options = [
        (QuitOption::Resume, " Resume "),
        (QuitOption::Restart, " Restart level "),
        (QuitOption::Exit, " Exit "),
    ];
    for (i, (opt, label)) in options.iter().enumerate() {
        let style = if *opt == selected {
            Style::default()
                .fg(theme.bg)
                .bg(theme.title)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.title)
        };
        let rx = inner.x + inner.width.saturating_sub(label.len() as u16) / 2;
        let ry = inner.y + 1 + i as u16 * 2;
        if ry < inner.y + inner.height {
            frame.buffer_mut().set_string(rx, ry, label, style);
        }
    }
}
