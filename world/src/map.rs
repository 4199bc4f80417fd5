//! Tile grid and the zig-zag path carved through it.

use castle_defence_core::{tuning::GridTuning, TileCoord, TileKind, TurretId};
use glam::Vec2;

/// Single grid cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Tile {
    pub(crate) kind: TileKind,
    pub(crate) occupant: Option<TurretId>,
}

/// Read-only description of a tile exposed through queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TileInfo {
    /// Location of the tile.
    pub coord: TileCoord,
    /// Role the tile plays in the map.
    pub kind: TileKind,
    /// Turret standing on the tile, if any.
    pub occupant: Option<TurretId>,
    /// Centre of the tile in world units.
    pub center: Vec2,
}

/// Tile grid together with the waypoint path derived from it.
#[derive(Clone, Debug)]
pub(crate) struct Map {
    columns: u32,
    rows: u32,
    tile_size: f32,
    tiles: Vec<Tile>,
    waypoints: Vec<Vec2>,
    steering_targets: Vec<Vec2>,
    start: Vec2,
}

impl Map {
    /// Lays out the path for the provided grid dimensions.
    ///
    /// Vertical runs start on column one and repeat every `segment_spacing`
    /// columns, alternating between descending and climbing. Consecutive runs
    /// are joined along the second or the penultimate row. The entry sits
    /// above the first run and the exit below the last.
    pub(crate) fn generate(grid: &GridTuning) -> Self {
        let columns = grid.columns;
        let rows = grid.rows;
        let spacing = grid.segment_spacing.max(1);
        let bottom = rows.saturating_sub(2);
        let top = 1;

        let mut map = Self {
            columns,
            rows,
            tile_size: grid.tile_size,
            tiles: vec![
                Tile {
                    kind: TileKind::Buildable,
                    occupant: None,
                };
                (columns as usize) * (rows as usize)
            ],
            waypoints: Vec::new(),
            steering_targets: Vec::new(),
            start: Vec2::ZERO,
        };

        let run_columns: Vec<u32> = (0..grid.vertical_runs())
            .map(|run| 1 + run * spacing)
            .collect();

        let mut path_tiles = Vec::new();
        let mut waypoints = Vec::new();
        for (run, &column) in run_columns.iter().enumerate() {
            let descending = run % 2 == 0;
            let turn_row = if descending { bottom } else { top };
            for row in top..=bottom {
                path_tiles.push(TileCoord::new(column, row));
            }
            waypoints.push(TileCoord::new(column, turn_row));

            if let Some(&next) = run_columns.get(run + 1) {
                for connector in column..next {
                    path_tiles.push(TileCoord::new(connector, turn_row));
                }
                waypoints.push(TileCoord::new(next, turn_row));
            }
        }

        let entry = TileCoord::new(1, 0);
        let exit_column = run_columns.last().copied().unwrap_or(1);
        let exit = TileCoord::new(exit_column, rows.saturating_sub(1));
        path_tiles.push(entry);
        path_tiles.push(exit);
        waypoints.push(exit);

        for coord in path_tiles {
            if let Some(tile) = map.tile_mut(coord) {
                tile.kind = TileKind::Path;
            }
        }

        map.start = map.tile_center(entry);
        map.waypoints = waypoints
            .into_iter()
            .map(|coord| map.tile_center(coord))
            .collect();
        map.steering_targets = map.waypoints.clone();
        if let Some(last) = map.steering_targets.last_mut() {
            last.y += map.tile_size;
        }
        map
    }

    pub(crate) const fn columns(&self) -> u32 {
        self.columns
    }

    pub(crate) const fn rows(&self) -> u32 {
        self.rows
    }

    pub(crate) const fn tile_size(&self) -> f32 {
        self.tile_size
    }

    pub(crate) fn width(&self) -> f32 {
        self.columns as f32 * self.tile_size
    }

    pub(crate) fn height(&self) -> f32 {
        self.rows as f32 * self.tile_size
    }

    /// Centre of the entry tile, where every enemy appears.
    pub(crate) const fn start(&self) -> Vec2 {
        self.start
    }

    /// Tile centres of the path's corners, ending on the exit tile.
    pub(crate) fn waypoints(&self) -> &[Vec2] {
        &self.waypoints
    }

    /// Waypoints as steered toward by enemies.
    ///
    /// The final entry sits one tile below the exit so walkers cross the
    /// bottom edge instead of stopping on the last tile.
    pub(crate) fn steering_targets(&self) -> &[Vec2] {
        &self.steering_targets
    }

    pub(crate) fn contains(&self, coord: TileCoord) -> bool {
        coord.column() < self.columns && coord.row() < self.rows
    }

    pub(crate) fn tile_center(&self, coord: TileCoord) -> Vec2 {
        Vec2::new(
            (coord.column() as f32 + 0.5) * self.tile_size,
            (coord.row() as f32 + 0.5) * self.tile_size,
        )
    }

    /// Tile under the provided world position, if it lies on the grid.
    pub(crate) fn tile_at(&self, position: Vec2) -> Option<TileCoord> {
        if !position.is_finite() || position.x < 0.0 || position.y < 0.0 {
            return None;
        }
        let column = (position.x / self.tile_size).floor() as u32;
        let row = (position.y / self.tile_size).floor() as u32;
        let coord = TileCoord::new(column, row);
        self.contains(coord).then_some(coord)
    }

    pub(crate) fn tile(&self, coord: TileCoord) -> Option<&Tile> {
        self.index(coord).and_then(|index| self.tiles.get(index))
    }

    pub(crate) fn tile_mut(&mut self, coord: TileCoord) -> Option<&mut Tile> {
        self.index(coord).and_then(|index| self.tiles.get_mut(index))
    }

    pub(crate) fn info(&self, coord: TileCoord) -> Option<TileInfo> {
        self.tile(coord).map(|tile| TileInfo {
            coord,
            kind: tile.kind,
            occupant: tile.occupant,
            center: self.tile_center(coord),
        })
    }

    pub(crate) fn clear_occupants(&mut self) {
        for tile in &mut self.tiles {
            tile.occupant = None;
        }
    }

    fn index(&self, coord: TileCoord) -> Option<usize> {
        if !self.contains(coord) {
            return None;
        }
        let row = usize::try_from(coord.row()).ok()?;
        let column = usize::try_from(coord.column()).ok()?;
        let width = usize::try_from(self.columns).ok()?;
        Some(row * width + column)
    }
}
