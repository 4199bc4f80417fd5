#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure build-mode system that turns cursor input into turret commands.
//!
//! The builder remembers which turret kind the player selected. Confirming on
//! an empty tile requests a placement of that kind, while sell and upgrade
//! requests act on the turret occupying the hovered tile. The world remains the
//! sole judge of affordability and tile rules; rejected requests surface as
//! `*Rejected` events.

use castle_defence_core::{
    Command, Event, PlacementError, TileCoord, TurretId, TurretKind, TurretView, Tuning,
};
use glam::Vec2;

/// Input snapshot distilled from adapter-provided frame input data.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BuilderInput {
    /// Tile currently hovered by the cursor, if it lies on the grid.
    pub cursor_tile: Option<TileCoord>,
    /// Indicates whether the player confirmed a placement on this frame.
    pub confirm_action: bool,
    /// Indicates whether the player asked to sell the hovered turret.
    pub sell_action: bool,
    /// Indicates whether the player asked to upgrade the hovered turret.
    pub upgrade_action: bool,
}

/// Range circle shown under the cursor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RangePreview {
    /// Turret kind whose range is drawn.
    pub kind: TurretKind,
    /// Centre of the circle in world units.
    pub center: Vec2,
    /// Radius of the circle in world units.
    pub radius: f32,
    /// Existing turret being inspected, if any.
    pub turret: Option<TurretId>,
    /// Whether confirming would place a turret.
    pub placeable: bool,
}

/// Build-mode system that translates selection and input into turret commands.
#[derive(Debug, Clone, Default)]
pub struct Builder {
    selection: Option<TurretKind>,
    locked: bool,
}

impl Builder {
    /// Creates a new builder system instance with nothing selected.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            selection: None,
            locked: false,
        }
    }

    /// Selects the turret kind subsequent confirmations will place.
    pub fn select(&mut self, kind: Option<TurretKind>) {
        self.selection = kind;
    }

    /// Turret kind currently selected for placement.
    #[must_use]
    pub const fn selection(&self) -> Option<TurretKind> {
        self.selection
    }

    /// Consumes world events and adapter-derived input to emit builder commands.
    ///
    /// Once the player has been defeated the builder drops its selection and
    /// ignores further input.
    pub fn handle(
        &mut self,
        events: &[Event],
        input: BuilderInput,
        turrets: &TurretView,
        out: &mut Vec<Command>,
    ) {
        if events
            .iter()
            .any(|event| matches!(event, Event::PlayerDefeated))
        {
            self.locked = true;
            self.selection = None;
        }
        if self.locked {
            return;
        }

        let Some(tile) = input.cursor_tile else {
            return;
        };

        match turret_on(turrets, tile) {
            Some(turret) => {
                if input.upgrade_action {
                    out.push(Command::UpgradeTurret { turret });
                } else if input.sell_action {
                    out.push(Command::SellTurret { turret });
                }
            }
            None => {
                if input.confirm_action {
                    if let Some(kind) = self.selection {
                        out.push(Command::PlaceTurret { kind, tile });
                    }
                }
            }
        }
    }

    /// Describes the range circle to draw for the hovered tile.
    ///
    /// A hovered turret shows its own range. Otherwise the selected kind's
    /// range is centred on the tile and `placement_error` mirrors
    /// `query::placement_error` to decide whether the placement would succeed.
    pub fn range_preview<F>(
        &self,
        cursor_tile: TileCoord,
        turrets: &TurretView,
        tuning: &Tuning,
        mut placement_error: F,
    ) -> Option<RangePreview>
    where
        F: FnMut(TurretKind, TileCoord) -> Option<PlacementError>,
    {
        if let Some(turret) = turrets.iter().find(|turret| turret.tile == cursor_tile) {
            return Some(RangePreview {
                kind: turret.kind,
                center: turret.position,
                radius: turret.range,
                turret: Some(turret.id),
                placeable: false,
            });
        }

        let kind = self.selection?;
        let size = tuning.grid.tile_size;
        Some(RangePreview {
            kind,
            center: Vec2::new(
                (cursor_tile.column() as f32 + 0.5) * size,
                (cursor_tile.row() as f32 + 0.5) * size,
            ),
            radius: tuning.turret(kind).range,
            turret: None,
            placeable: placement_error(kind, cursor_tile).is_none(),
        })
    }
}

fn turret_on(turrets: &TurretView, tile: TileCoord) -> Option<TurretId> {
    turrets
        .iter()
        .find(|turret| turret.tile == tile)
        .map(|turret| turret.id)
}
