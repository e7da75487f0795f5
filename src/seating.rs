//! Day 11: seating system.
//!
//! The ferry's waiting area is a grid of floor, empty seats and occupied
//! seats. Every round all seats are re-evaluated at once from the previous
//! layout; the layout eventually stops changing and the answer is the number
//! of occupied seats at that point.

use std::fmt;
use std::ops::Index;
use std::str::FromStr;

use arrayvec::ArrayVec;
use itertools::{iproduct, Itertools};
use tracing::{debug, trace, warn};

/// Rounds allowed before a layout is declared non-converging.
pub const DEFAULT_MAX_ROUNDS: usize = 10_000;

/// (dx, dy) for the eight compass directions.
const DIRECTIONS: [(isize, isize); 8] = [
    (-1, -1), (0, -1), (1, -1),
    (-1,  0),          (1,  0),
    (-1,  1), (0,  1), (1,  1),
];

/// A single position of the seat layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cell {
    /// Floor, nobody ever sits here.
    Floor,
    /// An empty seat.
    Empty,
    /// An occupied seat.
    Occupied,
}

/// An error converting [`char`] to [`Cell`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("invalid seat character: {0:?}")]
pub struct InvalidCell(pub char);

impl TryFrom<char> for Cell {
    type Error = InvalidCell;

    fn try_from(value: char) -> Result<Self, Self::Error> {
        match value {
            '.' => Ok(Cell::Floor),
            'L' => Ok(Cell::Empty),
            '#' => Ok(Cell::Occupied),
            _ => Err(InvalidCell(value)),
        }
    }
}

impl From<Cell> for char {
    fn from(cell: Cell) -> char {
        match cell {
            Cell::Floor => '.',
            Cell::Empty => 'L',
            Cell::Occupied => '#',
        }
    }
}

impl Cell {
    /// The state of this cell next round, given how many of its neighbors
    /// are occupied now.
    pub fn next(self, occupied_neighbors: usize, tolerance: usize) -> Cell {
        match self {
            Cell::Empty if occupied_neighbors == 0 => Cell::Occupied,
            Cell::Occupied if occupied_neighbors >= tolerance => Cell::Empty,
            cell => cell,
        }
    }
}

/// An error parsing input into a [`Grid`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseGridError {
    #[error("unexpected character {found:?} at line {line}, column {column}")]
    InvalidCell { found: char, line: usize, column: usize },
    #[error("line {line} has {found} cells, expected {expected}")]
    RaggedRow { line: usize, expected: usize, found: usize },
    #[error("seat layout is empty")]
    Empty,
}

/// Which cells count as a seat's neighbors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Neighborhood {
    /// The eight cells immediately around the seat.
    Adjacent,
    /// The first seat visible in each of the eight directions, looking
    /// past floor.
    LineOfSight,
}

/// The seating rule: a neighborhood plus how many occupied neighbors it
/// takes for someone to leave their seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rules {
    pub neighborhood: Neighborhood,
    pub tolerance: usize,
}

impl Rules {
    /// Part 1.
    pub const ADJACENT: Rules = Rules { neighborhood: Neighborhood::Adjacent, tolerance: 4 };
    /// Part 2.
    pub const LINE_OF_SIGHT: Rules = Rules { neighborhood: Neighborhood::LineOfSight, tolerance: 5 };
}

/// A rectangular, non-empty seat layout stored row-major.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Builds a grid from typed rows. All rows must have the same, non-zero
    /// length.
    pub fn from_rows(rows: Vec<Vec<Cell>>) -> Result<Self, ParseGridError> {
        let width = rows.first().map_or(0, Vec::len);
        if width == 0 {
            return Err(ParseGridError::Empty);
        }
        if let Some((ri, row)) = rows.iter().find_position(|row| row.len() != width) {
            return Err(ParseGridError::RaggedRow { line: ri + 1, expected: width, found: row.len() });
        }

        let height = rows.len();
        let cells = rows.into_iter().flatten().collect();
        Ok(Grid { width, height, cells })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, x: usize, y: usize) -> Option<Cell> {
        (x < self.width && y < self.height).then(|| self.cells[y * self.width + x])
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks_exact(self.width)
    }

    /// All (x, y) coordinates in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = (usize, usize)> {
        iproduct!(0 .. self.height, 0 .. self.width).map(|(y, x)| (x, y))
    }

    pub fn count(&self, cell: Cell) -> usize {
        self.cells.iter().filter(|&&c| c == cell).count()
    }

    pub fn count_occupied(&self) -> usize {
        self.count(Cell::Occupied)
    }

    fn offset(&self, (x, y): (usize, usize), (dx, dy): (isize, isize)) -> Option<(usize, usize)> {
        let x = x.checked_add_signed(dx).filter(|&x| x < self.width)?;
        let y = y.checked_add_signed(dy).filter(|&y| y < self.height)?;
        Some((x, y))
    }

    fn first_seat(&self, from: (usize, usize), dir: (isize, isize)) -> Option<(usize, usize)> {
        let mut at = from;
        loop {
            at = self.offset(at, dir)?;
            if self[at] != Cell::Floor {
                return Some(at);
            }
        }
    }

    /// Positions that count as neighbors of (x, y). Never contains (x, y)
    /// itself; cells on the edge simply have fewer.
    pub fn neighbors(&self, x: usize, y: usize, neighborhood: Neighborhood) -> ArrayVec<(usize, usize), 8> {
        DIRECTIONS.iter().filter_map(|&dir| match neighborhood {
            Neighborhood::Adjacent => self.offset((x, y), dir),
            Neighborhood::LineOfSight => self.first_seat((x, y), dir),
        }).collect()
    }

    pub fn occupied_neighbors(&self, x: usize, y: usize, neighborhood: Neighborhood) -> usize {
        self.neighbors(x, y, neighborhood).into_iter()
            .filter(|&at| self[at] == Cell::Occupied)
            .count()
    }

    /// Writes the next round into `next`, whatever shape it had before.
    /// Only `self` is read, so every seat sees the same previous round.
    pub fn step_into(&self, rules: Rules, next: &mut Grid) {
        next.width = self.width;
        next.height = self.height;
        next.cells.clear();
        next.cells.extend(self.positions().map(|(x, y)| match self[(x, y)] {
            Cell::Floor => Cell::Floor,
            seat => seat.next(self.occupied_neighbors(x, y, rules.neighborhood), rules.tolerance),
        }));
    }

    pub fn step(&self, rules: Rules) -> Grid {
        let mut next = Grid { width: 0, height: 0, cells: Vec::with_capacity(self.cells.len()) };
        self.step_into(rules, &mut next);
        next
    }
}

impl Index<(usize, usize)> for Grid {
    type Output = Cell;

    fn index(&self, (x, y): (usize, usize)) -> &Cell {
        assert!(x < self.width && y < self.height, "({}, {}) outside {}x{} grid", x, y, self.width, self.height);
        &self.cells[y * self.width + x]
    }
}

impl FromStr for Grid {
    type Err = ParseGridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rows = s.lines().enumerate().map(|(ri, line)| {
            line.chars().enumerate().map(|(ci, c)| {
                Cell::try_from(c).map_err(|InvalidCell(found)| {
                    ParseGridError::InvalidCell { found, line: ri + 1, column: ci + 1 }
                })
            }).collect::<Result<Vec<_>, _>>()
        }).collect::<Result<Vec<_>, _>>()?;

        let grid = Grid::from_rows(rows)?;
        debug!(
            width = grid.width,
            height = grid.height,
            seats = grid.cells.len() - grid.count(Cell::Floor),
            "parsed seat layout"
        );
        Ok(grid)
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = self.rows()
            .map(|row| row.iter().map(|&cell| char::from(cell)).collect::<String>())
            .join("\n");
        f.write_str(&text)
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SimulationError {
    #[error("seat layout did not stabilize within {rounds} rounds")]
    DidNotConverge { rounds: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Running,
    Stable,
}

/// A layout that no longer changes, and how many rounds it took to get
/// there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stabilized {
    pub grid: Grid,
    pub rounds: usize,
}

/// Runs the seating rule round after round over two swapped buffers until
/// a round changes nothing.
#[derive(Debug, Clone)]
pub struct Simulation {
    current: Grid,
    scratch: Grid,
    rules: Rules,
    rounds: usize,
    state: State,
}

impl Simulation {
    pub fn new(grid: Grid, rules: Rules) -> Self {
        Simulation { scratch: grid.clone(), current: grid, rules, rounds: 0, state: State::Running }
    }

    pub fn grid(&self) -> &Grid {
        &self.current
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Rounds so far that actually changed the layout.
    pub fn rounds(&self) -> usize {
        self.rounds
    }

    /// Computes one round. A stable simulation stays put.
    pub fn advance(&mut self) -> State {
        if self.state == State::Stable {
            return State::Stable;
        }

        self.current.step_into(self.rules, &mut self.scratch);
        if self.scratch == self.current {
            self.state = State::Stable;
            debug!(rounds = self.rounds, occupied = self.current.count_occupied(), "seat layout stabilized");
        } else {
            std::mem::swap(&mut self.current, &mut self.scratch);
            self.rounds += 1;
            trace!(round = self.rounds, occupied = self.current.count_occupied(), "round done");
        }
        self.state
    }

    /// Advances until stable, giving up once more than `max_rounds` rounds
    /// have changed the layout.
    pub fn run(mut self, max_rounds: usize) -> Result<Stabilized, SimulationError> {
        while self.advance() == State::Running {
            if self.rounds > max_rounds {
                warn!(max_rounds, "seat layout still changing, giving up");
                return Err(SimulationError::DidNotConverge { rounds: max_rounds });
            }
        }
        Ok(Stabilized { grid: self.current, rounds: self.rounds })
    }
}

pub fn stabilize(grid: Grid, rules: Rules, max_rounds: usize) -> Result<Stabilized, SimulationError> {
    Simulation::new(grid, rules).run(max_rounds)
}
