use crate::adjacency::neighborhood_points;
use crate::dijkstra::FxIndexMap;
use crate::error::{CellKind, LevelError};
use crate::Cell;
use fxhash::FxHashSet;
use itertools::{Itertools, MinMaxResult};
use log::{debug, info};
use petgraph::unionfind::UnionFind;

/// A level made up of walls, weighted spaces and named waypoints.
///
/// Every cell known to the level plays exactly one of these roles. Walls are impassable; spaces
/// and waypoints carry a strictly positive traversal weight. Cells which are in none of the three
/// collections are outside the level and must never be adjacent to a passable cell when searching,
/// which [seal_boundary](Self::seal_boundary) can guarantee.
///
/// In addition to the raw cell data, [Level] maintains connected components of the passable cells
/// in a [UnionFind] structure so that unreachable queries can be answered without a search.
#[derive(Clone, Debug)]
pub struct Level {
    walls: FxHashSet<Cell>,
    spaces: FxIndexMap<Cell, f64>,
    waypoints: FxIndexMap<Cell, f64>,
    waypoint_names: FxIndexMap<char, Cell>,
    components: UnionFind<usize>,
    components_dirty: bool,
    closed: bool,
}

impl Default for Level {
    fn default() -> Level {
        Level {
            walls: FxHashSet::default(),
            spaces: FxIndexMap::default(),
            waypoints: FxIndexMap::default(),
            waypoint_names: FxIndexMap::default(),
            components: UnionFind::new(0),
            components_dirty: false,
            closed: true,
        }
    }
}

fn check_weight(cell: Cell, weight: f64) -> Result<(), LevelError> {
    if weight.is_finite() && weight > 0.0 {
        Ok(())
    } else {
        Err(LevelError::InvalidWeight { cell, weight })
    }
}

impl Level {
    pub fn new() -> Level {
        Level::default()
    }

    /// The role of a cell, or [None] if the cell is outside the level.
    pub fn kind(&self, cell: &Cell) -> Option<CellKind> {
        if self.walls.contains(cell) {
            Some(CellKind::Wall)
        } else if self.spaces.contains_key(cell) {
            Some(CellKind::Space)
        } else if self.waypoints.contains_key(cell) {
            Some(CellKind::Waypoint)
        } else {
            None
        }
    }

    fn ensure_vacant(&self, cell: Cell) -> Result<(), LevelError> {
        match self.kind(&cell) {
            Some(existing) => Err(LevelError::Overlap { cell, existing }),
            None => Ok(()),
        }
    }

    pub fn add_wall(&mut self, cell: Cell) -> Result<(), LevelError> {
        self.ensure_vacant(cell)?;
        self.walls.insert(cell);
        self.components_dirty = true;
        Ok(())
    }

    pub fn add_space(&mut self, cell: Cell, weight: f64) -> Result<(), LevelError> {
        self.ensure_vacant(cell)?;
        check_weight(cell, weight)?;
        self.spaces.insert(cell, weight);
        self.components_dirty = true;
        Ok(())
    }

    /// Adds a passable cell which can be looked up by `name`.
    pub fn add_waypoint(&mut self, name: char, cell: Cell, weight: f64) -> Result<(), LevelError> {
        if self.waypoint_names.contains_key(&name) {
            return Err(LevelError::DuplicateWaypoint(name));
        }
        self.ensure_vacant(cell)?;
        check_weight(cell, weight)?;
        self.waypoints.insert(cell, weight);
        self.waypoint_names.insert(name, cell);
        self.components_dirty = true;
        Ok(())
    }

    pub fn is_wall(&self, cell: &Cell) -> bool {
        self.walls.contains(cell)
    }

    /// Traversal weight of a passable cell. Spaces are checked before waypoints. Walls and cells
    /// outside the level have no weight.
    pub fn weight(&self, cell: &Cell) -> Option<f64> {
        self.spaces
            .get(cell)
            .or_else(|| self.waypoints.get(cell))
            .copied()
    }

    /// Looks up the cell of a named waypoint.
    pub fn waypoint(&self, name: char) -> Option<Cell> {
        self.waypoint_names.get(&name).copied()
    }

    /// The name of the waypoint at `cell`, if any.
    pub fn waypoint_name(&self, cell: &Cell) -> Option<char> {
        if !self.waypoints.contains_key(cell) {
            return None;
        }
        self.waypoint_names
            .iter()
            .find(|(_, c)| *c == cell)
            .map(|(name, _)| *name)
    }

    pub fn walls(&self) -> &FxHashSet<Cell> {
        &self.walls
    }

    pub fn spaces(&self) -> &FxIndexMap<Cell, f64> {
        &self.spaces
    }

    pub fn waypoints(&self) -> &FxIndexMap<Cell, f64> {
        &self.waypoints
    }

    /// Waypoint names in insertion order.
    pub fn waypoint_names(&self) -> &FxIndexMap<char, Cell> {
        &self.waypoint_names
    }

    /// Iterates over every cell known to the level, walls included.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> + '_ {
        self.walls
            .iter()
            .chain(self.spaces.keys())
            .chain(self.waypoints.keys())
    }

    pub fn is_empty(&self) -> bool {
        self.walls.is_empty() && self.spaces.is_empty() && self.waypoints.is_empty()
    }

    /// The smallest and largest corner of the rectangle containing all cells of the level.
    pub fn bounding_box(&self) -> Option<(Cell, Cell)> {
        let bounds = |r: MinMaxResult<i32>| match r {
            MinMaxResult::NoElements => None,
            MinMaxResult::OneElement(v) => Some((v, v)),
            MinMaxResult::MinMax(lo, hi) => Some((lo, hi)),
        };
        let (min_x, max_x) = bounds(self.cells().map(|c| c.x).minmax())?;
        let (min_y, max_y) = bounds(self.cells().map(|c| c.y).minmax())?;
        Some((Cell::new(min_x, min_y), Cell::new(max_x, max_y)))
    }

    /// Turns every cell outside the level that borders a passable cell into a wall, which makes
    /// the level closed for searching. Returns the number of walls added.
    pub fn seal_boundary(&mut self) -> usize {
        let open_cells = self
            .spaces
            .keys()
            .chain(self.waypoints.keys())
            .flat_map(neighborhood_points)
            .filter(|p| self.kind(p).is_none())
            .collect::<FxHashSet<Cell>>();
        let added = open_cells.len();
        if added > 0 {
            debug!("Sealing level boundary with {} walls", added);
            self.walls.extend(open_cells);
            self.components_dirty = true;
        }
        added
    }

    /// Index of a passable cell in the component structure: spaces first, then waypoints.
    fn get_ix(&self, cell: &Cell) -> Option<usize> {
        self.spaces.get_index_of(cell).or_else(|| {
            self.waypoints
                .get_index_of(cell)
                .map(|ix| ix + self.spaces.len())
        })
    }

    pub fn components_dirty(&self) -> bool {
        self.components_dirty
    }

    /// Whether every neighbour of every passable cell is known to the level, as found by the last
    /// [generate_components](Self::generate_components). Always false while the components are
    /// dirty. Searches over a closed level never leave it.
    pub fn is_closed(&self) -> bool {
        !self.components_dirty && self.closed
    }

    /// Retrieves the component id a given passable cell belongs to. Returns [None] for walls,
    /// unknown cells and while the components are dirty.
    pub fn get_component(&self, cell: &Cell) -> Option<usize> {
        if self.components_dirty {
            return None;
        }
        self.get_ix(cell).map(|ix| self.components.find(ix))
    }

    /// Checks if start and goal are passable and on the same component.
    pub fn reachable(&self, start: &Cell, goal: &Cell) -> bool {
        !self.unreachable(start, goal)
    }

    /// Checks if start and goal are not on the same component. Walls and cells outside the level
    /// are unreachable from anywhere. While the components are dirty, any two passable cells are
    /// assumed to be connected.
    pub fn unreachable(&self, start: &Cell, goal: &Cell) -> bool {
        match (self.get_ix(start), self.get_ix(goal)) {
            (Some(start_ix), Some(goal_ix)) => {
                !self.components_dirty && !self.components.equiv(start_ix, goal_ix)
            }
            _ => true,
        }
    }

    /// Regenerates the components if they are marked as dirty.
    pub fn update(&mut self) {
        if self.components_dirty {
            info!("Components are dirty: regenerating components");
            self.generate_components();
        }
    }

    /// Generates a new [UnionFind] structure and links up 8-connected passable cells to the same
    /// components.
    pub fn generate_components(&mut self) {
        let n = self.spaces.len() + self.waypoints.len();
        info!("Generating connected components for {} passable cells", n);
        let mut components = UnionFind::new(n);
        let mut closed = true;
        for (ix, cell) in self
            .spaces
            .keys()
            .chain(self.waypoints.keys())
            .enumerate()
        {
            for p in neighborhood_points(cell) {
                if let Some(p_ix) = self.get_ix(&p) {
                    components.union(ix, p_ix);
                } else if !self.walls.contains(&p) {
                    closed = false;
                }
            }
        }
        if !closed {
            debug!("Level is open: some passable cells border cells outside the level");
        }
        self.components = components;
        self.components_dirty = false;
        self.closed = closed;
    }
}
