//! Board model: the fixed 5×5 grid, its cells and the commit step that applies a move set.

use crate::tilt::MoveSet;
use std::fmt;

pub const BOARD_WIDTH: u8 = 5;
pub const BOARD_HEIGHT: u8 = 5;
/// Number of cells on the board.
pub const BOARD_CELLS: usize = (BOARD_WIDTH as usize) * (BOARD_HEIGHT as usize);

/// The sink at the centre of the board.
pub const HOLE: Pos = Pos::new(2, 2);

/// Board coordinate. `y = 0` is the top row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pos {
    pub x: u8,
    pub y: u8,
}

impl Pos {
    pub const fn new(x: u8, y: u8) -> Self {
        Self { x, y }
    }

    /// Neighbour `(dx, dy)` steps away, or `None` past the board edge.
    pub fn offset(self, dx: i8, dy: i8) -> Option<Self> {
        let x = self.x as i8 + dx;
        let y = self.y as i8 + dy;
        if (0..BOARD_WIDTH as i8).contains(&x) && (0..BOARD_HEIGHT as i8).contains(&y) {
            Some(Self::new(x as u8, y as u8))
        } else {
            None
        }
    }

    #[inline]
    pub fn is_hole(self) -> bool {
        self == HOLE
    }

    /// Chebyshev (king-move) distance.
    pub fn chebyshev(self, other: Self) -> u8 {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }

    #[inline]
    fn index(self) -> usize {
        debug_assert!(self.x < BOARD_WIDTH && self.y < BOARD_HEIGHT);
        self.y as usize * BOARD_WIDTH as usize + self.x as usize
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A movable piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
    Green,
    Blue,
}

/// Contents of one board cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Cell {
    #[default]
    Empty,
    Stopper,
    Green,
    Blue,
}

impl Cell {
    /// The token in this cell, if any.
    pub fn token(self) -> Option<Token> {
        match self {
            Self::Green => Some(Token::Green),
            Self::Blue => Some(Token::Blue),
            Self::Empty | Self::Stopper => None,
        }
    }

    /// Level-file symbol. The hole is written `O` by the level parser, not here.
    pub fn symbol(self) -> char {
        match self {
            Self::Empty => '.',
            Self::Stopper => 'S',
            Self::Green => 'G',
            Self::Blue => 'B',
        }
    }

    pub fn from_symbol(c: char) -> Option<Self> {
        match c {
            '.' => Some(Self::Empty),
            'S' => Some(Self::Stopper),
            'G' => Some(Self::Green),
            'B' => Some(Self::Blue),
            _ => None,
        }
    }
}

impl From<Token> for Cell {
    fn from(token: Token) -> Self {
        match token {
            Token::Green => Self::Green,
            Token::Blue => Self::Blue,
        }
    }
}

/// How a piece drawn at a position overlaps the hole graphic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlap {
    None,
    /// Directly above the hole; the hole shows along the piece's bottom edge.
    Top,
    Left,
    Right,
    Bottom,
    /// Squarely on the hole (a token that has fallen in).
    Center,
}

impl Overlap {
    pub fn at(pos: Pos) -> Self {
        match (pos.x, pos.y) {
            (2, 1) => Self::Top,
            (1, 2) => Self::Left,
            (3, 2) => Self::Right,
            (2, 3) => Self::Bottom,
            (2, 2) => Self::Center,
            _ => Self::None,
        }
    }
}

/// Result of [`Board::commit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Committed {
    pub board: Board,
    pub you_win: bool,
    pub you_lose: bool,
}

/// The 5×5 playing board, row-major.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct Board {
    cells: [Cell; BOARD_CELLS],
}

impl Board {
    pub fn from_cells(cells: [Cell; BOARD_CELLS]) -> Self {
        Self { cells }
    }

    #[inline]
    pub fn get(&self, pos: Pos) -> Cell {
        self.cells[pos.index()]
    }

    #[inline]
    pub fn set(&mut self, pos: Pos, cell: Cell) {
        self.cells[pos.index()] = cell;
    }

    /// Number of cells holding `cell`.
    pub fn count(&self, cell: Cell) -> usize {
        self.cells.iter().filter(|&&c| c == cell).count()
    }

    pub fn token_count(&self) -> usize {
        self.cells.iter().filter(|c| c.token().is_some()).count()
    }

    /// All positions, row by row.
    pub fn positions() -> impl Iterator<Item = Pos> {
        (0..BOARD_HEIGHT).flat_map(|y| (0..BOARD_WIDTH).map(move |x| Pos::new(x, y)))
    }

    /// Occupied cells with their hole-overlap variant, for static drawing between tilts.
    pub fn draw_cells(&self) -> impl Iterator<Item = (Pos, Cell, Overlap)> + '_ {
        Self::positions()
            .map(|pos| (pos, self.get(pos)))
            .filter(|(_, cell)| *cell != Cell::Empty)
            .map(|(pos, cell)| (pos, cell, Overlap::at(pos)))
    }

    /// Apply a resolved move set: clear every start cell, then place every token that
    /// did not fall into the hole. An empty move set changes nothing and never wins or loses.
    pub fn commit(mut self, moves: &MoveSet) -> Committed {
        if moves.is_empty() {
            return Committed {
                board: self,
                you_win: false,
                you_lose: false,
            };
        }
        for mv in moves {
            self.set(mv.start, Cell::Empty);
        }
        for mv in moves.iter().filter(|mv| !mv.fell_in_hole) {
            self.set(mv.end, mv.piece.into());
        }
        let you_lose = moves
            .iter()
            .any(|mv| mv.piece == Token::Blue && mv.fell_in_hole);
        let you_win = !you_lose && self.count(Cell::Green) == 0;
        Committed {
            board: self,
            you_win,
            you_lose,
        }
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..BOARD_HEIGHT {
            for x in 0..BOARD_WIDTH {
                let pos = Pos::new(x, y);
                let c = match self.get(pos) {
                    Cell::Empty if pos.is_hole() => 'O',
                    cell => cell.symbol(),
                };
                write!(f, "{c}")?;
            }
            if y + 1 < BOARD_HEIGHT {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Board(\n{self}\n)")
    }
}
