//! Loading, rendering and cost export for [grid_dijkstra] levels.
//!
//! Levels are stored as plain text with one character per cell, the column giving x and the line
//! giving y:
//! - `#` or any uppercase letter: wall
//! - `.`: space of weight 1
//! - `1` to `9`: space of that weight
//! - lowercase letter: waypoint with that name
//! - ` `: no cell
use fxhash::FxHashSet;
use grid_dijkstra::{Cell, CellKind, FxIndexMap, Level, LevelError};
use log::info;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::Path;
use walkdir::WalkDir;

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("could not walk level directory: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("unrecognized tile {ch:?} at ({x}, {y})")]
    UnrecognizedTile { ch: char, x: i32, y: i32 },

    #[error(transparent)]
    Level(#[from] LevelError),
}

/// Settings for turning level text into a [Level].
#[derive(Clone, Debug)]
pub struct LoadOptions {
    /// Traversal weight given to every waypoint.
    pub waypoint_weight: f64,
    /// Surround the level with walls so that searches never leave it.
    pub seal_boundary: bool,
}

impl Default for LoadOptions {
    fn default() -> LoadOptions {
        LoadOptions {
            waypoint_weight: 1.0,
            seal_boundary: true,
        }
    }
}

pub fn parse_level(text: &str) -> Result<Level, LoadError> {
    parse_level_with(text, &LoadOptions::default())
}

pub fn parse_level_with(text: &str, options: &LoadOptions) -> Result<Level, LoadError> {
    let mut level = Level::new();
    for (y, line) in text.lines().enumerate() {
        for (x, ch) in line.chars().enumerate() {
            let (x, y) = (x as i32, y as i32);
            let cell = Cell::new(x, y);
            match ch {
                ' ' => {}
                '#' | 'A'..='Z' => level.add_wall(cell)?,
                '.' => level.add_space(cell, 1.0)?,
                '1'..='9' => level.add_space(cell, f64::from(ch as u8 - b'0'))?,
                'a'..='z' => level.add_waypoint(ch, cell, options.waypoint_weight)?,
                _ => return Err(LoadError::UnrecognizedTile { ch, x, y }),
            }
        }
    }
    if options.seal_boundary {
        level.seal_boundary();
    }
    level.generate_components();
    Ok(level)
}

pub fn load_level<P: AsRef<Path>>(path: P) -> Result<Level, LoadError> {
    load_level_with(path, &LoadOptions::default())
}

pub fn load_level_with<P: AsRef<Path>>(path: P, options: &LoadOptions) -> Result<Level, LoadError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    let level = parse_level_with(&text, options)?;
    info!(
        "Loaded level {}: {} walls, {} spaces, {} waypoints",
        path.display(),
        level.walls().len(),
        level.spaces().len(),
        level.waypoints().len()
    );
    Ok(level)
}

/// Names of the level files (`*.txt`) below `root`, relative to it and without extension.
pub fn level_names<P: AsRef<Path>>(root: P) -> Result<Vec<String>, LoadError> {
    let root = root.as_ref().canonicalize()?;
    let mut names = Vec::new();
    for entry in WalkDir::new(&root) {
        let entry = entry?;
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().map_or(true, |ext| ext != "txt") {
            continue;
        }
        if let Ok(rel_path) = path.strip_prefix(&root) {
            names.push(rel_path.with_extension("").to_string_lossy().into_owned());
        }
    }
    names.sort();
    Ok(names)
}

fn weight_char(weight: f64) -> char {
    if weight == 1.0 {
        '.'
    } else if weight.fract() == 0.0 && (1.0..=9.0).contains(&weight) {
        char::from(b'0' + weight as u8)
    } else {
        '~'
    }
}

/// Draws the level as text in the format it is loaded from, marking the cells of `path` with `*`.
/// Waypoints are always drawn by name. Spaces whose weight has no single digit are drawn as `~`.
pub fn render_level(level: &Level, path: Option<&[Cell]>) -> String {
    let Some((min, max)) = level.bounding_box() else {
        return String::new();
    };
    let on_path = path
        .unwrap_or_default()
        .iter()
        .copied()
        .collect::<FxHashSet<Cell>>();
    let mut out = String::new();
    for y in min.y..=max.y {
        let line = (min.x..=max.x)
            .map(|x| {
                let cell = Cell::new(x, y);
                match level.kind(&cell) {
                    Some(CellKind::Wall) => '#',
                    Some(CellKind::Waypoint) => level.waypoint_name(&cell).unwrap_or('?'),
                    Some(CellKind::Space) if on_path.contains(&cell) => '*',
                    Some(CellKind::Space) => level.weight(&cell).map_or('?', weight_char),
                    None => ' ',
                }
            })
            .collect::<String>();
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

#[derive(Debug, Serialize)]
struct CostRecord {
    row: i32,
    column: i32,
    cost: f64,
}

/// Writes a cost table as CSV with a `row,column,cost` header, ordered by row and column.
pub fn write_level_costs<W: io::Write>(
    costs: &FxIndexMap<Cell, f64>,
    writer: W,
) -> Result<(), LoadError> {
    let mut records = costs
        .iter()
        .map(|(cell, &cost)| CostRecord {
            row: cell.y,
            column: cell.x,
            cost,
        })
        .collect::<Vec<_>>();
    records.sort_by_key(|r| (r.row, r.column));
    let mut csv_writer = csv::Writer::from_writer(writer);
    for record in &records {
        csv_writer.serialize(record)?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn save_level_costs<P: AsRef<Path>>(
    costs: &FxIndexMap<Cell, f64>,
    path: P,
) -> Result<(), LoadError> {
    let path = path.as_ref();
    let file = fs::File::create(path)?;
    write_level_costs(costs, io::BufWriter::new(file))?;
    info!("Saved {} costs to {}", costs.len(), path.display());
    Ok(())
}
