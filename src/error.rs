use crate::Cell;

/// Errors raised while building or querying a [Level](crate::level::Level).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LevelError {
    /// A cell adjacent to an expanded cell is neither a wall nor has a weight. The level is not
    /// closed off; see [Level::seal_boundary](crate::level::Level::seal_boundary).
    #[error("cell {0} is neither a wall nor has a traversal weight")]
    UnknownCell(Cell),

    /// A cell was added in a second role (wall, space or waypoint).
    #[error("cell {cell} is already a {existing}")]
    Overlap { cell: Cell, existing: CellKind },

    /// Traversal weights must be finite and strictly positive.
    #[error("invalid traversal weight {weight} for cell {cell}")]
    InvalidWeight { cell: Cell, weight: f64 },

    /// An edge was requested between two cells that are not 8-neighbours.
    #[error("cells {0} and {1} are not adjacent")]
    NotAdjacent(Cell, Cell),

    /// An edge was requested to or from a wall.
    #[error("cell {0} is a wall")]
    Blocked(Cell),

    #[error("waypoint '{0}' is defined more than once")]
    DuplicateWaypoint(char),

    #[error("no waypoint named '{0}'")]
    UnknownWaypoint(char),
}

/// The role a cell plays in a level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellKind {
    Wall,
    Space,
    Waypoint,
}

impl std::fmt::Display for CellKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CellKind::Wall => "wall",
            CellKind::Space => "space",
            CellKind::Waypoint => "waypoint",
        };
        f.write_str(name)
    }
}
