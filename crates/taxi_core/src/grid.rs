//! Grid graph: the navigable map the taxis drive on.
//!
//! The map is given as text rows framed by a border row at the top and bottom
//! and a border column on each side. Interior cells sit at odd character
//! offsets; the character right of a cell is `:` when the passage east is
//! open, and a `-` in the cell position of the row below blocks the passage
//! south. Each cell becomes one node, indexed row-major.
//!
//! Shortest paths use breadth-first search (all edges cost one hop) and are
//! memoised in a bounded LRU cache; the graph never changes after `build`,
//! so cached routes stay valid for its whole lifetime.

use std::fmt;
use std::num::NonZeroUsize;
use std::sync::Mutex;

use lru::LruCache;
use pathfinding::prelude::bfs;
use serde::{Deserialize, Serialize};

use crate::action::Direction;
use crate::error::{GridError, GridResult};

const ROUTE_CACHE_CAPACITY: NonZeroUsize = match NonZeroUsize::new(4_096) {
    Some(capacity) => capacity,
    None => panic!("route cache capacity must be non-zero"),
};

/// A cell on the grid, zero-based over interior cells only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Coord {
    pub row: usize,
    pub col: usize,
}

impl Coord {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// The neighbouring cell in `direction`, if it does not underflow.
    /// Upper bounds are checked by the graph.
    pub fn offset(self, direction: Direction) -> Option<Coord> {
        let (dr, dc) = direction.offset();
        Some(Coord {
            row: self.row.checked_add_signed(dr)?,
            col: self.col.checked_add_signed(dc)?,
        })
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

impl From<(usize, usize)> for Coord {
    fn from((row, col): (usize, usize)) -> Self {
        Coord::new(row, col)
    }
}

/// Shortest-path result: the cells visited after the origin, and the
/// direction taken to enter each of them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub coords: Vec<Coord>,
    pub directions: Vec<Direction>,
}

impl Route {
    pub fn len(&self) -> usize {
        self.coords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    /// Final cell of the route, `None` for the empty route.
    pub fn destination(&self) -> Option<Coord> {
        self.coords.last().copied()
    }

    pub fn steps(&self) -> impl Iterator<Item = (Coord, Direction)> + '_ {
        self.coords.iter().copied().zip(self.directions.iter().copied())
    }

    pub fn action_codes(&self) -> Vec<u32> {
        self.directions.iter().map(|d| d.code()).collect()
    }

    /// Append `other`, which must start where this route ends.
    pub fn extend(&mut self, other: Route) {
        self.coords.extend(other.coords);
        self.directions.extend(other.directions);
    }
}

/// Node-per-cell, edge-per-open-passage view of a grid description.
pub struct GridGraph {
    rows: usize,
    cols: usize,
    /// Sorted neighbour lists; ascending order keeps BFS tie-breaks stable.
    adjacency: Vec<Vec<usize>>,
    route_cache: Mutex<LruCache<(usize, usize), Route>>,
}

impl GridGraph {
    /// Parse a framed grid description into a graph.
    pub fn build<S: AsRef<str>>(description: &[S]) -> GridResult<Self> {
        let lines: Vec<Vec<char>> = description
            .iter()
            .map(|line| line.as_ref().chars().collect())
            .collect();

        if lines.len() < 3 {
            return Err(malformed(format!(
                "expected at least 3 rows (two framing rows plus one cell row), got {}",
                lines.len()
            )));
        }
        let width = lines[0].len();
        if let Some((index, line)) = lines.iter().enumerate().find(|(_, l)| l.len() != width) {
            return Err(malformed(format!(
                "row {} has width {}, expected {}",
                index,
                line.len(),
                width
            )));
        }
        if width < 3 || width % 2 == 0 {
            return Err(malformed(format!(
                "row width must be odd and at least 3, got {}",
                width
            )));
        }

        let rows = lines.len() - 2;
        let cols = width / 2;
        let mut adjacency = vec![Vec::new(); rows * cols];

        for row in 0..rows {
            for col in 0..cols {
                let node = row * cols + col;
                if row + 1 < rows && lines[row + 2][col * 2 + 1] != '-' {
                    connect(&mut adjacency, node, node + cols);
                }
                if col + 1 < cols && lines[row + 1][col * 2 + 2] == ':' {
                    connect(&mut adjacency, node, node + 1);
                }
            }
        }
        for neighbours in &mut adjacency {
            neighbours.sort_unstable();
            neighbours.dedup();
        }

        Ok(Self {
            rows,
            cols,
            adjacency,
            route_cache: Mutex::new(LruCache::new(ROUTE_CACHE_CAPACITY)),
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn node_count(&self) -> usize {
        self.rows * self.cols
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum::<usize>() / 2
    }

    pub fn contains(&self, coord: Coord) -> bool {
        coord.row < self.rows && coord.col < self.cols
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = Coord> + '_ {
        (0..self.node_count()).map(|node| self.coord_of(node))
    }

    pub fn node_of(&self, coord: Coord) -> GridResult<usize> {
        if self.contains(coord) {
            Ok(coord.row * self.cols + coord.col)
        } else {
            Err(GridError::OutOfBounds { coord })
        }
    }

    pub fn coord_of(&self, node: usize) -> Coord {
        Coord::new(node / self.cols, node % self.cols)
    }

    pub fn neighbours(&self, coord: Coord) -> GridResult<Vec<Coord>> {
        let node = self.node_of(coord)?;
        Ok(self.adjacency[node]
            .iter()
            .map(|&n| self.coord_of(n))
            .collect())
    }

    pub fn has_edge(&self, a: Coord, b: Coord) -> bool {
        match (self.node_of(a), self.node_of(b)) {
            (Ok(a), Ok(b)) => self.adjacency[a].binary_search(&b).is_ok(),
            _ => false,
        }
    }

    /// Cell reached by moving one step in `direction`, or `None` when the
    /// passage is blocked or leaves the grid.
    pub fn step(&self, from: Coord, direction: Direction) -> Option<Coord> {
        let to = from.offset(direction)?;
        self.has_edge(from, to).then_some(to)
    }

    /// Breadth-first shortest path from `origin` to `dest`.
    ///
    /// Returns the empty route when `origin == dest` and
    /// [`GridError::NoPath`] when the two cells are in different components.
    pub fn shortest_path(&self, origin: Coord, dest: Coord) -> GridResult<Route> {
        let start = self.node_of(origin)?;
        let goal = self.node_of(dest)?;
        if start == goal {
            return Ok(Route::default());
        }

        if let Ok(mut cache) = self.route_cache.lock() {
            if let Some(route) = cache.get(&(start, goal)) {
                return Ok(route.clone());
            }
        }

        let nodes = bfs(
            &start,
            |&node| self.adjacency[node].iter().copied(),
            |&node| node == goal,
        )
        .ok_or(GridError::NoPath {
            from: origin,
            to: dest,
        })?;

        let mut route = Route {
            coords: Vec::with_capacity(nodes.len() - 1),
            directions: Vec::with_capacity(nodes.len() - 1),
        };
        for pair in nodes.windows(2) {
            route.directions.push(self.direction_between(pair[0], pair[1]));
            route.coords.push(self.coord_of(pair[1]));
        }

        if let Ok(mut cache) = self.route_cache.lock() {
            cache.put((start, goal), route.clone());
        }
        Ok(route)
    }

    /// Number of hops on the shortest path between two cells.
    pub fn distance(&self, origin: Coord, dest: Coord) -> GridResult<usize> {
        self.shortest_path(origin, dest).map(|route| route.len())
    }

    /// Direction of the edge between two consecutive path nodes.
    ///
    /// Only index deltas of ±1 within a row and ±cols are edges; anything else
    /// means a path crossed a row boundary or skipped a cell.
    fn direction_between(&self, from: usize, to: usize) -> Direction {
        let delta = to as isize - from as isize;
        let cols = self.cols as isize;
        let same_row = from / self.cols == to / self.cols;
        match delta {
            d if d == cols => Direction::South,
            d if d == -cols => Direction::North,
            1 if same_row => Direction::East,
            -1 if same_row => Direction::West,
            _ => panic!(
                "path step from node {} to node {} (delta {}) is not a grid edge",
                from, to, delta
            ),
        }
    }
}

impl Clone for GridGraph {
    fn clone(&self) -> Self {
        Self {
            rows: self.rows,
            cols: self.cols,
            adjacency: self.adjacency.clone(),
            route_cache: Mutex::new(LruCache::new(ROUTE_CACHE_CAPACITY)),
        }
    }
}

impl fmt::Debug for GridGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GridGraph")
            .field("rows", &self.rows)
            .field("cols", &self.cols)
            .field("edges", &self.edge_count())
            .finish()
    }
}

fn connect(adjacency: &mut [Vec<usize>], a: usize, b: usize) {
    adjacency[a].push(b);
    adjacency[b].push(a);
}

fn malformed(reason: String) -> GridError {
    GridError::MalformedGrid { reason }
}
