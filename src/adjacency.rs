use crate::error::LevelError;
use crate::level::Level;
use crate::{Cell, N_SMALLVEC_SIZE};
use smallvec::SmallVec;

/// Distance factor of a step along one of the axes.
pub const ORTHOGONAL_FACTOR: f64 = 1.0;
/// Distance factor of a diagonal step.
pub const DIAGONAL_FACTOR: f64 = std::f64::consts::SQRT_2;

/// The eight moves out of a cell together with their distance factor.
pub const NEIGHBOR_OFFSETS: [((i32, i32), f64); 8] = [
    ((-1, -1), DIAGONAL_FACTOR),
    ((-1, 0), ORTHOGONAL_FACTOR),
    ((0, -1), ORTHOGONAL_FACTOR),
    ((-1, 1), DIAGONAL_FACTOR),
    ((1, -1), DIAGONAL_FACTOR),
    ((1, 0), ORTHOGONAL_FACTOR),
    ((0, 1), ORTHOGONAL_FACTOR),
    ((1, 1), DIAGONAL_FACTOR),
];

/// Outgoing edges of a cell as `(cost, neighbour)` pairs.
pub type Edges = SmallVec<[(f64, Cell); N_SMALLVEC_SIZE]>;

/// The 8 cells surrounding `cell`, in the order of [NEIGHBOR_OFFSETS].
pub fn neighborhood_points(cell: &Cell) -> SmallVec<[Cell; N_SMALLVEC_SIZE]> {
    NEIGHBOR_OFFSETS
        .iter()
        .map(|&((dx, dy), _)| Cell::new(cell.x + dx, cell.y + dy))
        .collect()
}

fn weight_of(level: &Level, cell: &Cell) -> Result<f64, LevelError> {
    level.weight(cell).ok_or(LevelError::UnknownCell(*cell))
}

/// Cost of moving between two cells, the distance factor times the mean of both weights. The
/// formula is symmetric, so moving back costs the same.
#[inline]
fn step_cost(factor: f64, w1: f64, w2: f64) -> f64 {
    factor * (w1 + w2) / 2.0
}

/// Lists the legal moves out of `cell` and their costs. Walls have no outgoing edges and are
/// never moved into.
///
/// Returns [LevelError::UnknownCell] if `cell` or one of its non-wall neighbours has no
/// weight, meaning the level is not closed around `cell`.
pub fn navigation_edges(level: &Level, cell: &Cell) -> Result<Edges, LevelError> {
    if level.is_wall(cell) {
        return Ok(Edges::new());
    }
    let weight = weight_of(level, cell)?;
    let mut edges = Edges::new();
    for &((dx, dy), factor) in &NEIGHBOR_OFFSETS {
        let neighbour = Cell::new(cell.x + dx, cell.y + dy);
        if level.is_wall(&neighbour) {
            continue;
        }
        let neighbour_weight = weight_of(level, &neighbour)?;
        edges.push((step_cost(factor, weight, neighbour_weight), neighbour));
    }
    Ok(edges)
}

/// Cost of the single edge between two adjacent passable cells.
pub fn edge_cost(level: &Level, from: &Cell, to: &Cell) -> Result<f64, LevelError> {
    let (dx, dy) = (to.x - from.x, to.y - from.y);
    let factor = NEIGHBOR_OFFSETS
        .iter()
        .find(|(offset, _)| *offset == (dx, dy))
        .map(|&(_, factor)| factor)
        .ok_or(LevelError::NotAdjacent(*from, *to))?;
    for cell in [from, to] {
        if level.is_wall(cell) {
            return Err(LevelError::Blocked(*cell));
        }
    }
    Ok(step_cost(
        factor,
        weight_of(level, from)?,
        weight_of(level, to)?,
    ))
}
