//! # grid_dijkstra
//!
//! Shortest-cost paths over weighted grids using
//! [Dijkstra's algorithm](https://en.wikipedia.org/wiki/Dijkstra%27s_algorithm).
//!
//! A [Level] consists of walls, spaces with a traversal weight and named waypoints. Movement is
//! 8-connected; the cost of a step is the mean weight of the two cells involved, multiplied by √2
//! for diagonal steps. The search engine in [dijkstra] is generic over an adjacency closure and
//! never materialises the graph, [navigation_edges] being the adjacency used for levels.
//!
//! Two queries are supported: the path between two cells (or named waypoints via [Pathfinder]),
//! and the cost of reaching every reachable cell from a single origin.
pub mod adjacency;
pub mod dijkstra;
pub mod error;
pub mod level;

pub use crate::adjacency::{edge_cost, navigation_edges};
pub use crate::dijkstra::{shortest_path, shortest_path_costs, shortest_path_with_cost, FxIndexMap};
pub use crate::error::{CellKind, LevelError};
pub use crate::level::Level;

use log::{info, warn};

/// An integer grid coordinate.
pub type Cell = grid_util::point::Point;

/// Inline capacity used for neighbourhoods, which never exceed 8 cells.
pub const N_SMALLVEC_SIZE: usize = 8;

/// Sums the edge costs along a path of adjacent cells. A path consisting of a single cell costs
/// nothing.
pub fn path_cost(level: &Level, path: &[Cell]) -> Result<f64, LevelError> {
    path.windows(2)
        .map(|w| edge_cost(level, &w[0], &w[1]))
        .sum()
}

/// [Pathfinder] answers queries between named waypoints of a [Level]. It keeps the connected
/// components of the level up to date so that queries between disconnected waypoints are rejected
/// without flood-filling the level.
#[derive(Clone, Debug, Default)]
pub struct Pathfinder {
    level: Level,
}

impl Pathfinder {
    pub fn new(mut level: Level) -> Pathfinder {
        level.update();
        Pathfinder { level }
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    /// Mutable access to the level. Changes may invalidate the connected components, which are
    /// regenerated by [update](Self::update).
    pub fn level_mut(&mut self) -> &mut Level {
        &mut self.level
    }

    pub fn into_level(self) -> Level {
        self.level
    }

    /// Regenerates the components if they are marked as dirty.
    pub fn update(&mut self) {
        self.level.update();
    }

    /// Resolves a waypoint name to its cell.
    pub fn waypoint(&self, name: char) -> Result<Cell, LevelError> {
        self.level
            .waypoint(name)
            .ok_or(LevelError::UnknownWaypoint(name))
    }

    /// Computes a minimal cost path between two cells together with its cost. Returns `Ok(None)`
    /// if no path exists.
    ///
    /// The components only answer for passable cells of a closed level. Anything else is left to
    /// the search, so an open level fails with [LevelError::UnknownCell] as it would without them.
    pub fn path_between(
        &self,
        start: Cell,
        destination: Cell,
    ) -> Result<Option<(Vec<Cell>, f64)>, LevelError> {
        let connected = match (
            self.level.get_component(&start),
            self.level.get_component(&destination),
        ) {
            (Some(a), Some(b)) if self.level.is_closed() => Some(a == b),
            _ => None,
        };
        if connected == Some(false) {
            info!("{} is not reachable from {}", destination, start);
            return Ok(None);
        }
        let result = shortest_path_with_cost(&start, &destination, &self.level, navigation_edges)?;
        if result.is_none() && connected == Some(true) {
            warn!(
                "Reachable destination {} could not be pathed to from {}, is the reachable graph correct?",
                destination, start
            );
        }
        Ok(result)
    }

    /// Computes a minimal cost path between two named waypoints.
    pub fn route(&self, source: char, destination: char) -> Result<Option<Vec<Cell>>, LevelError> {
        Ok(self
            .route_with_cost(source, destination)?
            .map(|(path, _cost)| path))
    }

    /// Computes a minimal cost path between two named waypoints together with its cost.
    pub fn route_with_cost(
        &self,
        source: char,
        destination: char,
    ) -> Result<Option<(Vec<Cell>, f64)>, LevelError> {
        let start = self.waypoint(source)?;
        let goal = self.waypoint(destination)?;
        self.path_between(start, goal)
    }

    /// Computes the cost of reaching every reachable cell from a named waypoint.
    pub fn costs_from(&self, source: char) -> Result<FxIndexMap<Cell, f64>, LevelError> {
        let start = self.waypoint(source)?;
        shortest_path_costs(&start, &self.level, navigation_edges)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::tests::level_from_rows;
    use std::f64::consts::SQRT_2;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{a} != {b}");
    }

    /// Asserts that the case in which start and goal are equal is handled correctly.
    #[test]
    fn equal_start_goal() {
        let pathfinder = Pathfinder::new(level_from_rows(&["###", "#a#", "###"]));
        let (path, cost) = pathfinder.route_with_cost('a', 'a').unwrap().unwrap();
        assert_eq!(path, vec![Cell::new(1, 1)]);
        assert_eq!(cost, 0.0);
    }

    /// On a uniform open grid the diagonal is strictly cheaper than any detour.
    #[test]
    fn diagonal_route() {
        let mut level = level_from_rows(&["a..", "...", "..b"]);
        level.seal_boundary();
        let pathfinder = Pathfinder::new(level);
        let (path, cost) = pathfinder.route_with_cost('a', 'b').unwrap().unwrap();
        assert_eq!(path, vec![Cell::new(0, 0), Cell::new(1, 1), Cell::new(2, 2)]);
        assert_close(cost, 2.0 * SQRT_2);
        assert_close(path_cost(pathfinder.level(), &path).unwrap(), cost);
    }

    /// Heavy terrain is avoided when walking around it is cheaper.
    #[test]
    fn avoids_heavy_terrain() {
        let level = level_from_rows(&[
            "#######", //
            "#.....#", //
            "#a999b#", //
            "#######",
        ]);
        let pathfinder = Pathfinder::new(level);
        let (path, cost) = pathfinder.route_with_cost('a', 'b').unwrap().unwrap();
        assert!(path.iter().all(|c| c.y != 2 || c.x == 1 || c.x == 5));
        // Two diagonal steps and two straight steps over weight 1 cells
        assert_close(cost, 2.0 * SQRT_2 + 2.0);
    }

    #[test]
    fn enclosed_start() {
        let level = level_from_rows(&[
            "#####", //
            "#a#.#", //
            "###b#", //
            "#####",
        ]);
        let mut pathfinder = Pathfinder::new(level);
        assert_eq!(pathfinder.route('a', 'b').unwrap(), None);
        let costs = pathfinder.costs_from('a').unwrap();
        assert_eq!(costs.len(), 1);
        assert_eq!(costs[&Cell::new(1, 1)], 0.0);

        // The same answers without the component shortcut
        pathfinder.level_mut().add_wall(Cell::new(0, 5)).unwrap();
        assert!(pathfinder.level().components_dirty());
        assert_eq!(pathfinder.route('a', 'b').unwrap(), None);
        pathfinder.update();
        assert!(!pathfinder.level().components_dirty());
    }

    #[test]
    fn wall_destination() {
        let pathfinder = Pathfinder::new(level_from_rows(&["####", "#a.#", "####"]));
        let start = pathfinder.waypoint('a').unwrap();
        assert_eq!(pathfinder.path_between(start, Cell::new(3, 1)).unwrap(), None);
        let engine_only =
            shortest_path(&start, &Cell::new(3, 1), pathfinder.level(), navigation_edges).unwrap();
        assert_eq!(engine_only, None);
    }

    #[test]
    fn unknown_waypoint() {
        let pathfinder = Pathfinder::new(level_from_rows(&["###", "#a#", "###"]));
        assert_eq!(
            pathfinder.route('a', 'z'),
            Err(LevelError::UnknownWaypoint('z'))
        );
        assert_eq!(
            pathfinder.costs_from('q'),
            Err(LevelError::UnknownWaypoint('q'))
        );
    }

    /// An unsealed level fails instead of silently defaulting weights.
    #[test]
    fn open_level_is_an_error() {
        let pathfinder = Pathfinder::new(level_from_rows(&["a.b"]));
        assert!(matches!(
            pathfinder.route('a', 'b'),
            Err(LevelError::UnknownCell(_))
        ));
        assert!(matches!(
            pathfinder.costs_from('a'),
            Err(LevelError::UnknownCell(_))
        ));
    }

    /// Disconnected waypoints of an open level are not answered from the components.
    #[test]
    fn open_level_with_disconnected_waypoints() {
        let pathfinder = Pathfinder::new(level_from_rows(&["a#b"]));
        assert!(pathfinder.level().unreachable(
            &pathfinder.waypoint('a').unwrap(),
            &pathfinder.waypoint('b').unwrap()
        ));
        assert!(matches!(
            pathfinder.route('a', 'b'),
            Err(LevelError::UnknownCell(_))
        ));
        assert!(matches!(
            pathfinder.costs_from('a'),
            Err(LevelError::UnknownCell(_))
        ));

        let mut level = pathfinder.into_level();
        level.seal_boundary();
        let pathfinder = Pathfinder::new(level);
        assert!(pathfinder.level().is_closed());
        assert_eq!(pathfinder.route('a', 'b').unwrap(), None);
    }

    /// A search starting on a wall never leaves it, so its cost table holds the wall alone.
    #[test]
    fn costs_from_wall() {
        let pathfinder = Pathfinder::new(level_from_rows(&["####", "#a.#", "####"]));
        let wall = Cell::new(0, 1);
        let costs = shortest_path_costs(&wall, pathfinder.level(), navigation_edges).unwrap();
        assert_eq!(costs.len(), 1);
        assert_eq!(costs[&wall], 0.0);
        let waypoint_costs = pathfinder.costs_from('a').unwrap();
        assert!(waypoint_costs.keys().all(|c| !pathfinder.level().is_wall(c)));
    }

    #[test]
    fn loaded_components_are_kept() {
        let mut level = level_from_rows(&["###", "#a#", "###"]);
        level.generate_components();
        let pathfinder = Pathfinder::new(level);
        assert!(!pathfinder.level().components_dirty());
        assert!(pathfinder.level().is_closed());
    }

    #[test]
    fn shareable_between_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Level>();
        assert_send_sync::<Pathfinder>();
    }

    #[test]
    fn costs_match_paths() {
        let mut level = level_from_rows(&[
            "a..3#..", //
            ".#.9#.b", //
            ".#....2", //
            "..5#...",
        ]);
        level.seal_boundary();
        let pathfinder = Pathfinder::new(level);
        let costs = pathfinder.costs_from('a').unwrap();
        let level = pathfinder.level();
        assert!(costs.keys().all(|c| !level.is_wall(c)));
        assert_eq!(costs.len(), level.spaces().len() + level.waypoints().len());
        let start = pathfinder.waypoint('a').unwrap();
        for (cell, cost) in &costs {
            let (path, path_cost_found) = pathfinder.path_between(start, *cell).unwrap().unwrap();
            assert_close(*cost, path_cost_found);
            assert_close(path_cost(level, &path).unwrap(), path_cost_found);
            assert_eq!(path.first(), Some(&start));
            assert_eq!(path.last(), Some(cell));
        }
    }

    #[test]
    fn route_is_symmetric() {
        let mut level = level_from_rows(&["a.2.", "3#.1", "..7b"]);
        level.seal_boundary();
        let pathfinder = Pathfinder::new(level);
        let (_, there) = pathfinder.route_with_cost('a', 'b').unwrap().unwrap();
        let (_, back) = pathfinder.route_with_cost('b', 'a').unwrap().unwrap();
        assert_close(there, back);
    }
}
