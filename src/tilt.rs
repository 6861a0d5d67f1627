//! Tilt resolution: where every token ends up when the board is tilted one way.
//!
//! Resolution is a pure function of the board. Tokens are discovered starting from the
//! edge the board tilts toward; each one probes toward that edge, stepping over other
//! tokens and counting them, until a stopper, the hole or the edge stops it. The counted
//! tokens queue up behind the obstruction, so a token's destination is the probe's stop
//! cell moved back by that count. Discovery order is the move set order.

use crate::board::{BOARD_CELLS, BOARD_HEIGHT, BOARD_WIDTH, Board, Cell, HOLE, Pos, Token};
use arrayvec::ArrayVec;
use std::fmt;

/// Move set capacity used by the shipped levels.
pub const MAX_MOVABLE_PIECES: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Left,
    Up,
    Right,
    Down,
}

impl Direction {
    /// Unit step `(dx, dy)` in the direction of travel.
    pub const fn step(self) -> (i8, i8) {
        match self {
            Self::Left => (-1, 0),
            Self::Up => (0, -1),
            Self::Right => (1, 0),
            Self::Down => (0, 1),
        }
    }

    /// Cells in discovery order: lanes nearest the target edge first, and within a lane
    /// top to bottom (horizontal tilts) or left to right (vertical tilts).
    fn discovery_order(self) -> impl Iterator<Item = Pos> {
        let (dx, dy) = self.step();
        let lanes: [u8; 5] = if dx + dy < 0 {
            [0, 1, 2, 3, 4]
        } else {
            [4, 3, 2, 1, 0]
        };
        let horizontal = dx != 0;
        lanes.into_iter().flat_map(move |lane| {
            let len = if horizontal { BOARD_HEIGHT } else { BOARD_WIDTH };
            (0..len).map(move |i| {
                if horizontal {
                    Pos::new(lane, i)
                } else {
                    Pos::new(i, lane)
                }
            })
        })
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Left => "left",
            Self::Up => "up",
            Self::Right => "right",
            Self::Down => "down",
        };
        f.write_str(name)
    }
}

/// One token's transition for a tilt. `start == end` is a legal no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
    pub piece: Token,
    pub start: Pos,
    /// Resting cell, or [`HOLE`] when the token fell in.
    pub end: Pos,
    pub fell_in_hole: bool,
}

impl Move {
    pub fn is_noop(&self) -> bool {
        self.start == self.end
    }

    pub fn distance(&self) -> u8 {
        self.start.chebyshev(self.end)
    }
}

/// Moves for one tilt, in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MoveSet {
    moves: ArrayVec<Move, BOARD_CELLS>,
    truncated: bool,
}

impl MoveSet {
    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Move> {
        self.as_slice().iter()
    }

    pub fn as_slice(&self) -> &[Move] {
        &self.moves
    }

    /// True when more tokens were on the board than the resolver's capacity; the extra
    /// tokens are absent from the set and stay where they are.
    pub fn truncated(&self) -> bool {
        self.truncated
    }

    /// Largest start→end distance in cells (0 for an empty set).
    pub fn max_distance(&self) -> u8 {
        self.moves.iter().map(Move::distance).max().unwrap_or(0)
    }
}

impl<'a> IntoIterator for &'a MoveSet {
    type Item = &'a Move;
    type IntoIter = std::slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Resolve a tilt. At most `capacity` tokens (clamped to the board size) are discovered;
/// any further ones are dropped and the set is flagged as truncated.
pub fn resolve(board: &Board, direction: Direction, capacity: usize) -> MoveSet {
    let capacity = capacity.min(BOARD_CELLS);
    let step = direction.step();
    let mut set = MoveSet::default();
    for start in direction.discovery_order() {
        let Some(piece) = board.get(start).token() else {
            continue;
        };
        if set.moves.len() == capacity {
            set.truncated = true;
            break;
        }
        let (end, fell_in_hole) = probe(board, start, step);
        set.moves.push(Move {
            piece,
            start,
            end,
            fell_in_hole,
        });
    }
    if set.truncated {
        log::warn!(
            "tilt {direction}: {} tokens on the board, only the first {capacity} move",
            board.token_count()
        );
    }
    log::debug!(
        "tilt {direction}: {} moves, {} into the hole, longest slide {} cells",
        set.len(),
        set.iter().filter(|mv| mv.fell_in_hole).count(),
        set.max_distance()
    );
    set
}

/// Walk from `start` toward the edge. Returns the destination and whether it is the hole.
fn probe(board: &Board, start: Pos, (dx, dy): (i8, i8)) -> (Pos, bool) {
    let mut at = start;
    let mut seen: i8 = 0;
    while let Some(next) = at.offset(dx, dy) {
        match board.get(next) {
            Cell::Stopper => break,
            _ if next == HOLE => return (HOLE, true),
            Cell::Green | Cell::Blue => seen += 1,
            Cell::Empty => {}
        }
        at = next;
    }
    // Every token counted lies between `start` and `at`, so backing off stays on the board.
    let end = at.offset(-dx * seen, -dy * seen).unwrap_or(start);
    (end, false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::levels::parse_level;
    use proptest::prelude::*;

    fn board(text: &str) -> Board {
        parse_level(text).unwrap()
    }

    fn mv(piece: Token, start: (u8, u8), end: (u8, u8), fell_in_hole: bool) -> Move {
        Move {
            piece,
            start: Pos::new(start.0, start.1),
            end: Pos::new(end.0, end.1),
            fell_in_hole,
        }
    }

    #[test]
    fn test_discovery_order_left_is_column_major() {
        let order: Vec<_> = Direction::Left.discovery_order().take(6).collect();
        assert_eq!(order[0], Pos::new(0, 0));
        assert_eq!(order[4], Pos::new(0, 4));
        assert_eq!(order[5], Pos::new(1, 0));
    }

    #[test]
    fn test_discovery_order_down_starts_at_bottom_row() {
        let order: Vec<_> = Direction::Down.discovery_order().take(6).collect();
        assert_eq!(order[0], Pos::new(0, 4));
        assert_eq!(order[4], Pos::new(4, 4));
        assert_eq!(order[5], Pos::new(0, 3));
    }

    #[test]
    fn test_single_green_falls_into_hole() {
        let b = board(".....\n.....\n..O.G\n.....\n.....");
        let set = resolve(&b, Direction::Left, MAX_MOVABLE_PIECES);
        assert_eq!(set.as_slice(), &[mv(Token::Green, (4, 2), (2, 2), true)]);
    }

    #[test]
    fn test_single_blue_falls_into_hole() {
        let b = board(".....\n.....\n..O.B\n.....\n.....");
        let set = resolve(&b, Direction::Left, MAX_MOVABLE_PIECES);
        assert_eq!(set.as_slice(), &[mv(Token::Blue, (4, 2), (2, 2), true)]);
    }

    #[test]
    fn test_stopper_shields_one_token_while_other_falls() {
        let b = board(".....\n.....\nSGOG.\n.....\n.....");
        let set = resolve(&b, Direction::Left, MAX_MOVABLE_PIECES);
        assert_eq!(
            set.as_slice(),
            &[
                mv(Token::Green, (1, 2), (1, 2), false),
                mv(Token::Green, (3, 2), (2, 2), true),
            ]
        );
    }

    #[test]
    fn test_tokens_queue_against_stopper_in_discovery_order() {
        let b = board("..S.G\n.....\n..O..\n.....\n.....");
        let set = resolve(&b, Direction::Left, MAX_MOVABLE_PIECES);
        assert_eq!(set.as_slice(), &[mv(Token::Green, (4, 0), (3, 0), false)]);

        let b = board("S.B.G\n.....\n..O..\n.....\n.....");
        let set = resolve(&b, Direction::Left, MAX_MOVABLE_PIECES);
        assert_eq!(
            set.as_slice(),
            &[
                mv(Token::Blue, (2, 0), (1, 0), false),
                mv(Token::Green, (4, 0), (2, 0), false),
            ]
        );
    }

    #[test]
    fn test_queue_against_edge_each_direction() {
        let b = board(".G.B.\n.....\n..O..\n.....\n.....");
        let right = resolve(&b, Direction::Right, MAX_MOVABLE_PIECES);
        assert_eq!(
            right.as_slice(),
            &[
                mv(Token::Blue, (3, 0), (4, 0), false),
                mv(Token::Green, (1, 0), (3, 0), false),
            ]
        );

        let b = board("....G\n.....\n..O.B\n.....\n....G");
        let down = resolve(&b, Direction::Down, MAX_MOVABLE_PIECES);
        assert_eq!(
            down.as_slice(),
            &[
                mv(Token::Green, (4, 4), (4, 4), false),
                mv(Token::Blue, (4, 2), (4, 3), false),
                mv(Token::Green, (4, 0), (4, 2), false),
            ]
        );
        let up = resolve(&b, Direction::Up, MAX_MOVABLE_PIECES);
        assert_eq!(
            up.as_slice(),
            &[
                mv(Token::Green, (4, 0), (4, 0), false),
                mv(Token::Blue, (4, 2), (4, 1), false),
                mv(Token::Green, (4, 4), (4, 2), false),
            ]
        );
    }

    #[test]
    fn test_queue_behind_falling_token_falls_too() {
        let b = board("..G..\n..B..\n..O..\n.....\n.....");
        let set = resolve(&b, Direction::Down, MAX_MOVABLE_PIECES);
        assert_eq!(
            set.as_slice(),
            &[
                mv(Token::Blue, (2, 1), (2, 2), true),
                mv(Token::Green, (2, 0), (2, 2), true),
            ]
        );
    }

    #[test]
    fn test_stopper_between_token_and_hole() {
        let b = board(".....\n.....\n..OSG\n.....\n.....");
        let set = resolve(&b, Direction::Left, MAX_MOVABLE_PIECES);
        assert_eq!(set.as_slice(), &[mv(Token::Green, (4, 2), (4, 2), false)]);
    }

    #[test]
    fn test_no_tokens_gives_empty_set() {
        let b = board("S...S\n.....\n..O..\n.....\nS...S");
        for dir in [Direction::Left, Direction::Up, Direction::Right, Direction::Down] {
            assert!(resolve(&b, dir, MAX_MOVABLE_PIECES).is_empty());
        }
    }

    #[test]
    fn test_capacity_truncates_and_flags() {
        let b = board("GGG..\nBB...\n..O..\nG....\n.....");
        let set = resolve(&b, Direction::Left, MAX_MOVABLE_PIECES);
        assert_eq!(set.len(), MAX_MOVABLE_PIECES);
        assert!(set.truncated());
        // Column 0 first (rows 0, 1, 3), then column 1 (rows 0, 1); (2, 0) is dropped.
        assert!(set.iter().all(|mv| mv.start != Pos::new(2, 0)));

        let wide = resolve(&b, Direction::Left, 10);
        assert_eq!(wide.len(), 6);
        assert!(!wide.truncated());
    }

    #[test]
    fn test_max_distance() {
        let b = board("G....\n.....\n..O..\n.....\n....B");
        let set = resolve(&b, Direction::Right, MAX_MOVABLE_PIECES);
        assert_eq!(set.max_distance(), 4);
        assert_eq!(resolve(&b, Direction::Left, MAX_MOVABLE_PIECES).max_distance(), 4);
    }

    fn arb_cell() -> impl Strategy<Value = Cell> {
        prop_oneof![
            6 => Just(Cell::Empty),
            2 => Just(Cell::Stopper),
            1 => Just(Cell::Green),
            1 => Just(Cell::Blue),
        ]
    }

    /// Any board with an empty hole; token count is not limited.
    fn arb_board() -> impl Strategy<Value = Board> {
        proptest::array::uniform25(arb_cell()).prop_map(|mut cells| {
            cells[12] = Cell::Empty;
            Board::from_cells(cells)
        })
    }

    fn arb_direction() -> impl Strategy<Value = Direction> {
        prop_oneof![
            Just(Direction::Left),
            Just(Direction::Up),
            Just(Direction::Right),
            Just(Direction::Down),
        ]
    }

    proptest! {
        #[test]
        fn prop_resolve_is_pure_and_deterministic(b in arb_board(), dir in arb_direction()) {
            let before = b.clone();
            let first = resolve(&b, dir, BOARD_CELLS);
            prop_assert_eq!(&b, &before);
            prop_assert_eq!(first, resolve(&b, dir, BOARD_CELLS));
        }

        #[test]
        fn prop_every_token_gets_exactly_one_move(b in arb_board(), dir in arb_direction()) {
            let set = resolve(&b, dir, BOARD_CELLS);
            prop_assert_eq!(set.len(), b.token_count());
            prop_assert!(!set.truncated());
            for mv in &set {
                prop_assert_eq!(Cell::from(mv.piece), b.get(mv.start));
            }
        }

        #[test]
        fn prop_moves_stay_on_axis_and_in_travel_direction(b in arb_board(), dir in arb_direction()) {
            let (dx, dy) = dir.step();
            for mv in &resolve(&b, dir, BOARD_CELLS) {
                let mx = mv.end.x as i8 - mv.start.x as i8;
                let my = mv.end.y as i8 - mv.start.y as i8;
                if dx == 0 { prop_assert_eq!(mx, 0); } else { prop_assert!(mx * dx >= 0); }
                if dy == 0 { prop_assert_eq!(my, 0); } else { prop_assert!(my * dy >= 0); }
                if mv.fell_in_hole {
                    prop_assert_eq!(mv.end, HOLE);
                } else {
                    prop_assert_ne!(mv.end, HOLE);
                    prop_assert_ne!(b.get(mv.end), Cell::Stopper);
                }
            }
        }

        #[test]
        fn prop_resting_tokens_never_overlap(b in arb_board(), dir in arb_direction()) {
            let set = resolve(&b, dir, BOARD_CELLS);
            let ends: Vec<_> = set.iter().filter(|mv| !mv.fell_in_hole).map(|mv| mv.end).collect();
            for (i, a) in ends.iter().enumerate() {
                prop_assert!(!ends[i + 1..].contains(a), "two tokens resolved to {}", a);
            }
        }

        #[test]
        fn prop_no_passing_within_a_lane(b in arb_board(), dir in arb_direction()) {
            // Earlier-discovered tokens in the same lane stay at least as close to the edge.
            let (dx, dy) = dir.step();
            let set = resolve(&b, dir, BOARD_CELLS);
            let key = |p: Pos| -(p.x as i8 * dx + p.y as i8 * dy);
            for (i, a) in set.iter().enumerate() {
                for later in &set.as_slice()[i + 1..] {
                    let same_lane = if dx != 0 { a.start.y == later.start.y } else { a.start.x == later.start.x };
                    if same_lane && !a.fell_in_hole && !later.fell_in_hole {
                        prop_assert!(key(a.end) < key(later.end));
                    }
                }
            }
        }

        #[test]
        fn prop_second_tilt_same_way_is_noop(b in arb_board(), dir in arb_direction()) {
            let once = b.clone().commit(&resolve(&b, dir, BOARD_CELLS)).board;
            let again = resolve(&once, dir, BOARD_CELLS);
            prop_assert!(again.iter().all(Move::is_noop));
            let twice = once.clone().commit(&again);
            prop_assert_eq!(&twice.board, &once);
            prop_assert!(!twice.you_lose);
        }

        #[test]
        fn prop_win_and_loss_flags(b in arb_board(), dir in arb_direction()) {
            let set = resolve(&b, dir, BOARD_CELLS);
            let done = b.clone().commit(&set);
            let blue_fell = set.iter().any(|mv| mv.piece == Token::Blue && mv.fell_in_hole);
            prop_assert_eq!(done.you_lose, blue_fell);
            if !set.is_empty() {
                prop_assert_eq!(done.you_win, !blue_fell && done.board.count(Cell::Green) == 0);
            }
            prop_assert_eq!(done.board.get(HOLE), Cell::Empty);
            let fallen = set.iter().filter(|mv| mv.fell_in_hole).count();
            prop_assert_eq!(done.board.token_count() + fallen, b.token_count());
        }
    }
}
