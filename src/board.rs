use std::fmt;
use std::sync::OnceLock;

/// A direction to slide/merge tiles.
///
/// Declaration order is the fixed priority order used for tie-breaking and
/// legality fallbacks: Left, Up, Right, Down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Move {
    Left,
    Up,
    Right,
    Down,
}

impl Move {
    /// All four directions in priority order.
    pub const ALL: [Move; 4] = [Move::Left, Move::Up, Move::Right, Move::Down];

    #[inline]
    pub fn index(self) -> usize {
        match self {
            Move::Left => 0,
            Move::Up => 1,
            Move::Right => 2,
            Move::Down => 3,
        }
    }
}

const LINE_TABLE_SIZE: usize = 0x1_0000; // 65,536 possible 16-bit lines

struct Stores {
    slide_left: Box<[u16]>,
    slide_right: Box<[u16]>,
    reward_left: Box<[i32]>,
    reward_right: Box<[i32]>,
}

type BoardRaw = u64;
type Line = u16;

/// Packed 4x4 Threes! board: 16 4-bit tile ranks in a `u64`, row-major with
/// cell 0 in the most-significant nibble, plus placement bookkeeping.
///
/// Ranks map to tile values 0, 1, 2, 3, 6, 12, ... (`3 << (rank - 3)` for
/// rank >= 3). Besides the cells, a board carries the pending hint tile, the
/// remaining per-rank bag counts, and the direction of the last slide, which
/// together drive the environment agent's placements.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Board {
    raw: BoardRaw,
    hint: u8,
    bag: [u8; 3],
    last: Option<Move>,
}

impl Board {
    /// A constant empty board with a full one-of-each tile bag.
    pub const EMPTY: Board = Board {
        raw: 0,
        hint: 0,
        bag: [1, 1, 1],
        last: None,
    };

    /// Construct a `Board` from its raw packed cell representation.
    ///
    /// Hint, bag, and last-slide state are reset as for a fresh board.
    #[inline]
    pub fn from_raw(raw: BoardRaw) -> Self {
        Board { raw, ..Board::EMPTY }
    }

    /// Borrow the raw packed `u64` for this `Board`.
    #[inline]
    pub fn raw(&self) -> BoardRaw {
        self.raw
    }

    /// Rank of the cell at flat position `pos` (0..16, row-major).
    #[inline]
    pub fn cell(&self, pos: usize) -> u8 {
        debug_assert!(pos < 16);
        ((self.raw >> (60 - 4 * pos)) & 0xf) as u8
    }

    /// Rank of the cell at `(row, col)`.
    #[inline]
    pub fn at(&self, row: usize, col: usize) -> u8 {
        self.cell(row * 4 + col)
    }

    #[inline]
    pub(crate) fn set_cell(&mut self, pos: usize, rank: u8) {
        debug_assert!(pos < 16 && rank <= 0xf);
        let shift = 60 - 4 * pos;
        self.raw = (self.raw & !(0xf_u64 << shift)) | ((rank as u64) << shift);
    }

    /// Direction of the most recent slide, `None` before the first one.
    ///
    /// The placer uses this to select the emptied edge for the next tile.
    #[inline]
    pub fn last(&self) -> Option<Move> {
        self.last
    }

    /// Pending hint tile rank, 0 if none has been announced yet.
    #[inline]
    pub fn hint(&self) -> u8 {
        self.hint
    }

    /// Remaining bag count for tile rank 1..=3.
    #[inline]
    pub fn bag(&self, rank: u8) -> u8 {
        match rank {
            1..=3 => self.bag[rank as usize - 1],
            _ => 0,
        }
    }

    /// Slide/merge tiles in the given direction.
    ///
    /// Returns the merge reward (>= 0) and records the direction if the board
    /// changed; returns the sentinel `-1` and leaves the board untouched if
    /// the slide has no effect.
    pub fn slide(&mut self, dir: Move) -> i32 {
        let (raw, reward) = match dir {
            Move::Left => slide_rows(self.raw, false),
            Move::Right => slide_rows(self.raw, true),
            Move::Up => {
                let (t, reward) = slide_rows(transpose_raw(self.raw), false);
                (transpose_raw(t), reward)
            }
            Move::Down => {
                let (t, reward) = slide_rows(transpose_raw(self.raw), true);
                (transpose_raw(t), reward)
            }
        };
        if raw == self.raw {
            return -1;
        }
        self.raw = raw;
        self.last = Some(dir);
        reward
    }

    /// Swap rows and columns in place.
    pub fn transpose(&mut self) {
        self.raw = transpose_raw(self.raw);
    }

    /// Place `tile` at the empty cell `pos` and announce `hint` as the next
    /// tile, consuming bag slots to mirror the placer's draws.
    ///
    /// Returns 0 on success, `-1` if the cell is occupied or the ranks are out
    /// of the placeable 1..=3 range.
    pub fn place(&mut self, pos: usize, tile: u8, hint: u8) -> i32 {
        if pos >= 16 || self.cell(pos) != 0 {
            return -1;
        }
        if !(1..=3).contains(&tile) || !(1..=3).contains(&hint) {
            return -1;
        }
        self.set_cell(pos, tile);
        if self.hint == 0 {
            // no pending hint: the placed tile itself came out of the bag
            self.draw(tile);
        }
        self.draw(hint);
        self.hint = hint;
        0
    }

    fn draw(&mut self, rank: u8) {
        let slot = &mut self.bag[rank as usize - 1];
        *slot = slot.saturating_sub(1);
        if self.bag == [0, 0, 0] {
            self.bag = [1, 1, 1];
        }
    }

    /// True if no slide in any direction changes the board.
    pub fn is_full_locked(&self) -> bool {
        Move::ALL.iter().all(|&dir| {
            let mut probe = *self;
            probe.slide(dir) == -1
        })
    }

    /// Highest tile rank present on the board.
    pub fn highest_rank(&self) -> u8 {
        (0..16).map(|pos| self.cell(pos)).max().unwrap_or(0)
    }

    /// Total score: each tile of rank k >= 3 is worth 3^(k-2).
    pub fn score(&self) -> u64 {
        (0..16).fold(0, |acc, pos| {
            let rank = self.cell(pos);
            if rank >= 3 {
                acc + 3u64.pow(rank as u32 - 2)
            } else {
                acc
            }
        })
    }

    /// Actual value of a tile rank: 0, 1, 2, 3, 6, 12, 24, ...
    pub fn tile_value(rank: u8) -> u32 {
        match rank {
            0 => 0,
            1 => 1,
            2 => 2,
            k => 3 << (k - 3),
        }
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Board({:#018x})", self.raw)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..4 {
            for col in 0..4 {
                let value = Board::tile_value(self.at(row, col));
                if value == 0 {
                    write!(f, "{:>6}", ".")?;
                } else {
                    write!(f, "{:>6}", value)?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

// Credit to Nneonneo for the nibble-transpose trick
pub(crate) fn transpose_raw(x: BoardRaw) -> BoardRaw {
    let a1 = x & 0xF0F00F0FF0F00F0F;
    let a2 = x & 0x0000F0F00000F0F0;
    let a3 = x & 0x0F0F00000F0F0000;
    let a = a1 | (a2 << 12) | (a3 >> 12);
    let b1 = a & 0xFF00FF0000FF00FF;
    let b2 = a & 0x00FF00FF00000000;
    let b3 = a & 0x00000000FF00FF00;
    b1 | (b2 >> 24) | (b3 << 24)
}

#[inline]
fn extract_line(board: BoardRaw, line_idx: usize) -> Line {
    ((board >> ((3 - line_idx) * 16)) & 0xffff) as Line
}

fn slide_rows(board: BoardRaw, toward_right: bool) -> (BoardRaw, i32) {
    let s = stores();
    let (table, rewards) = if toward_right {
        (&s.slide_right, &s.reward_right)
    } else {
        (&s.slide_left, &s.reward_left)
    };
    (0..4).fold((0u64, 0i32), |(raw, reward), row_idx| {
        let row_val = extract_line(board, row_idx) as usize;
        let new_row = table[row_val] as u64;
        (
            raw | (new_row << (48 - 16 * row_idx)),
            reward + rewards[row_val],
        )
    })
}

static STORES: OnceLock<Stores> = OnceLock::new();

#[inline]
fn stores() -> &'static Stores {
    STORES.get_or_init(create_stores)
}

fn create_stores() -> Stores {
    // Heap-allocated to avoid large stack frames
    let mut slide_left = vec![0u16; LINE_TABLE_SIZE];
    let mut slide_right = vec![0u16; LINE_TABLE_SIZE];
    let mut reward_left = vec![0i32; LINE_TABLE_SIZE];
    let mut reward_right = vec![0i32; LINE_TABLE_SIZE];

    for val in 0..LINE_TABLE_SIZE {
        let line = val as Line;
        let (shifted, reward) = slide_line(line, false);
        slide_left[val] = shifted;
        reward_left[val] = reward;
        let (shifted, reward) = slide_line(line, true);
        slide_right[val] = shifted;
        reward_right[val] = reward;
    }

    Stores {
        slide_left: slide_left.into_boxed_slice(),
        slide_right: slide_right.into_boxed_slice(),
        reward_left: reward_left.into_boxed_slice(),
        reward_right: reward_right.into_boxed_slice(),
    }
}

fn slide_line(line: Line, toward_right: bool) -> (Line, i32) {
    let mut cells = line_to_cells(line);
    if toward_right {
        cells.reverse();
    }
    let reward = slide_cells_left(&mut cells);
    if toward_right {
        cells.reverse();
    }
    (cells_to_line(cells), reward)
}

/// One Threes! slide step over a line: every tile past the first gap moves
/// exactly one cell, and a tile moving onto a compatible neighbor merges
/// (1 + 2 -> 3; equal ranks >= 3 -> rank + 1).
fn slide_cells_left(cells: &mut [u8; 4]) -> i32 {
    let mut reward = 0;
    for i in 0..3 {
        let (a, b) = (cells[i], cells[i + 1]);
        if a == 0 {
            cells[i] = b;
            cells[i + 1] = 0;
        } else if let Some(merged) = merge_ranks(a, b) {
            cells[i] = merged;
            cells[i + 1] = 0;
            reward += 3i32.pow(merged as u32 - 2);
        }
    }
    reward
}

#[inline]
fn merge_ranks(a: u8, b: u8) -> Option<u8> {
    if a != 0 && b != 0 && a + b == 3 {
        Some(3)
    } else if a >= 3 && a == b && a < 0xf {
        Some(a + 1)
    } else {
        None
    }
}

fn line_to_cells(line: Line) -> [u8; 4] {
    [
        ((line >> 12) & 0xf) as u8,
        ((line >> 8) & 0xf) as u8,
        ((line >> 4) & 0xf) as u8,
        (line & 0xf) as u8,
    ]
}

fn cells_to_line(cells: [u8; 4]) -> Line {
    ((cells[0] as Line) << 12)
        | ((cells[1] as Line) << 8)
        | ((cells[2] as Line) << 4)
        | (cells[3] as Line)
}
