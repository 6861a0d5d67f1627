//! Level packs: the built-in 40 levels and custom pack files in the same text format.
//!
//! A pack is plain text. `;` starts a comment line, blank lines separate levels, and each
//! level is five rows of five symbols: `.` empty, `S` stopper, `G` green, `B` blue and `O`
//! for the hole, which must appear exactly once, in the centre.

use crate::board::{BOARD_CELLS, BOARD_HEIGHT, BOARD_WIDTH, Board, Cell, Pos};
use std::path::Path;
use thiserror::Error;

const BUILTIN: &str = include_str!("../levels/builtin.txt");

const HOLE_SYMBOL: char = 'O';

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("level {level}: expected 5 rows, found {found}")]
    RowCount { level: usize, found: usize },
    #[error("level {level}, row {row}: expected 5 cells, found {found}")]
    RowWidth {
        level: usize,
        row: usize,
        found: usize,
    },
    #[error("level {level}, row {row}: unknown cell {symbol:?}")]
    UnknownCell {
        level: usize,
        row: usize,
        symbol: char,
    },
    #[error("level {level}: the hole must be the centre cell")]
    MisplacedHole { level: usize },
    #[error("level {level}: the centre cell must be the hole")]
    MissingHole { level: usize },
    #[error("level pack contains no levels")]
    Empty,
    #[error("level {requested} does not exist (the pack has {available})")]
    OutOfRange { requested: usize, available: usize },
}

/// An ordered, non-empty list of levels, numbered from 1.
#[derive(Debug, Clone)]
pub struct LevelPack {
    levels: Vec<Board>,
}

impl LevelPack {
    pub fn builtin() -> Result<Self, LevelError> {
        Self::parse(BUILTIN)
    }

    pub fn load(path: &Path) -> Result<Self, LevelError> {
        let text = std::fs::read_to_string(path)?;
        let pack = Self::parse(&text)?;
        log::info!("loaded {} levels from {}", pack.len(), path.display());
        Ok(pack)
    }

    pub fn parse(text: &str) -> Result<Self, LevelError> {
        let levels = level_blocks(text)
            .iter()
            .enumerate()
            .map(|(i, rows)| parse_rows(i + 1, rows))
            .collect::<Result<Vec<_>, _>>()?;
        if levels.is_empty() {
            return Err(LevelError::Empty);
        }
        Ok(Self { levels })
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Level `number` (1-based).
    pub fn level(&self, number: usize) -> Result<&Board, LevelError> {
        number
            .checked_sub(1)
            .and_then(|i| self.levels.get(i))
            .ok_or(LevelError::OutOfRange {
                requested: number,
                available: self.len(),
            })
    }

    /// The level after `number`, wrapping from the last back to 1.
    pub fn next_number(&self, number: usize) -> usize {
        if number >= self.len() { 1 } else { number + 1 }
    }

    /// The level before `number`, wrapping from 1 to the last.
    pub fn previous_number(&self, number: usize) -> usize {
        if number <= 1 || number > self.len() {
            self.len()
        } else {
            number - 1
        }
    }
}

/// Parse a single level (five rows, optional comments).
#[cfg(test)]
pub fn parse_level(text: &str) -> Result<Board, LevelError> {
    let blocks = level_blocks(text);
    match blocks.as_slice() {
        [] => Err(LevelError::Empty),
        [rows, ..] => parse_rows(1, rows),
    }
}

/// Split pack text into per-level row lists, dropping comments.
fn level_blocks(text: &str) -> Vec<Vec<&str>> {
    let mut blocks = Vec::new();
    let mut current = Vec::new();
    for line in text.lines().map(str::trim) {
        if line.starts_with(';') {
            continue;
        }
        if line.is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
            continue;
        }
        current.push(line);
    }
    if !current.is_empty() {
        blocks.push(current);
    }
    blocks
}

fn parse_rows(level: usize, rows: &[&str]) -> Result<Board, LevelError> {
    if rows.len() != BOARD_HEIGHT as usize {
        return Err(LevelError::RowCount {
            level,
            found: rows.len(),
        });
    }
    let mut cells = [Cell::Empty; BOARD_CELLS];
    let mut saw_hole = false;
    for (y, row) in rows.iter().enumerate() {
        let symbols: Vec<char> = row.chars().collect();
        if symbols.len() != BOARD_WIDTH as usize {
            return Err(LevelError::RowWidth {
                level,
                row: y + 1,
                found: symbols.len(),
            });
        }
        for (x, &symbol) in symbols.iter().enumerate() {
            let pos = Pos::new(x as u8, y as u8);
            let cell = if symbol == HOLE_SYMBOL {
                if !pos.is_hole() {
                    return Err(LevelError::MisplacedHole { level });
                }
                saw_hole = true;
                Cell::Empty
            } else {
                if pos.is_hole() {
                    return Err(LevelError::MissingHole { level });
                }
                Cell::from_symbol(symbol).ok_or(LevelError::UnknownCell {
                    level,
                    row: y + 1,
                    symbol,
                })?
            };
            cells[y * BOARD_WIDTH as usize + x] = cell;
        }
    }
    debug_assert!(saw_hole);
    Ok(Board::from_cells(cells))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Token;
    use crate::tilt::{Direction, MAX_MOVABLE_PIECES, resolve};

    /// Shortest known solution for each built-in level, in order.
    const SOLUTIONS: [&str; 40] = [
        "DL", "DR", "DLU", "LDR", "URD", "RULD", "URDL", "RDLU", "RULD", "RDLUR", "ULDRU",
        "LUDRD", "DRULD", "RULDLU", "RDLURD", "DULULU", "UDRDRU", "DRURULD", "URULDRD",
        "LDRULUR", "DLURULDR", "RULULDRU", "RULDRDLU", "LDRDLURUL", "ULURULDRD", "URDRULRDL",
        "RDLURDLDLU", "DLULDRULDR", "LDLURULULDR", "ULDRDLURLUR", "DLURURULDULD",
        "LRDLULDRURUL", "ULDLURURDLULD", "LDRURDRULDRDR", "RDLDRDLURDLULD", "LURULDURULDRUL",
        "LDRURDRULDRULUR", "RDLURDLDLUDLUDRU", "ULULDLDRLURULDLDR", "URULURDLURULDRULDR",
    ];

    fn direction(c: char) -> Direction {
        match c {
            'L' => Direction::Left,
            'U' => Direction::Up,
            'R' => Direction::Right,
            'D' => Direction::Down,
            other => panic!("bad direction {other}"),
        }
    }

    #[test]
    fn test_builtin_pack_has_forty_levels() {
        let pack = LevelPack::builtin().unwrap();
        assert_eq!(pack.len(), 40);
        for n in 1..=pack.len() {
            let level = pack.level(n).unwrap();
            assert!(level.count(Cell::Green) >= 1, "level {n} has no green");
            assert!(level.token_count() <= MAX_MOVABLE_PIECES, "level {n} overflows");
        }
    }

    #[test]
    fn test_every_builtin_level_is_solvable() {
        let pack = LevelPack::builtin().unwrap();
        for (i, solution) in SOLUTIONS.iter().enumerate() {
            let mut board = pack.level(i + 1).unwrap().clone();
            let mut won = false;
            for (step, c) in solution.chars().enumerate() {
                let moves = resolve(&board, direction(c), MAX_MOVABLE_PIECES);
                let done = board.commit(&moves);
                assert!(!done.you_lose, "level {}: lost at tilt {}", i + 1, step + 1);
                board = done.board;
                won = done.you_win;
                if won {
                    assert_eq!(step + 1, solution.len(), "level {}: won early", i + 1);
                }
            }
            assert!(won, "level {} not solved by {solution}", i + 1);
        }
    }

    #[test]
    fn test_level_numbers_wrap() {
        let pack = LevelPack::builtin().unwrap();
        assert_eq!(pack.next_number(40), 1);
        assert_eq!(pack.next_number(7), 8);
        assert_eq!(pack.previous_number(1), 40);
        assert_eq!(pack.previous_number(8), 7);
    }

    #[test]
    fn test_level_out_of_range() {
        let pack = LevelPack::builtin().unwrap();
        assert!(matches!(
            pack.level(0),
            Err(LevelError::OutOfRange { requested: 0, available: 40 })
        ));
        assert!(matches!(pack.level(41), Err(LevelError::OutOfRange { .. })));
    }

    #[test]
    fn test_parse_with_comments_and_spacing() {
        let text = "; two levels\n\nS...G\n.....\n..O..\n.....\n.....\n\n\n; second\n.....\n.B...\n..O..\n...G.\n.....\n";
        let pack = LevelPack::parse(text).unwrap();
        assert_eq!(pack.len(), 2);
        let second = pack.level(2).unwrap();
        assert_eq!(second.get(Pos::new(1, 1)).token(), Some(Token::Blue));
        assert_eq!(second.get(Pos::new(3, 3)).token(), Some(Token::Green));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(LevelPack::parse("; nothing\n"), Err(LevelError::Empty)));
        assert!(matches!(
            parse_level(".....\n.....\n..O..\n....."),
            Err(LevelError::RowCount { level: 1, found: 4 })
        ));
        assert!(matches!(
            parse_level(".....\n......\n..O..\n.....\n....."),
            Err(LevelError::RowWidth { row: 2, found: 6, .. })
        ));
        assert!(matches!(
            parse_level(".....\n.....\n..O..\n..x..\n....."),
            Err(LevelError::UnknownCell { row: 4, symbol: 'x', .. })
        ));
        assert!(matches!(
            parse_level("O....\n.....\n..O..\n.....\n....."),
            Err(LevelError::MisplacedHole { .. })
        ));
        assert!(matches!(
            parse_level(".....\n.....\n..S..\n.....\n....."),
            Err(LevelError::MissingHole { .. })
        ));
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = LevelPack::load(Path::new("/nonexistent/tilt/levels.txt")).unwrap_err();
        assert!(matches!(err, LevelError::Io(_)));
    }
}
