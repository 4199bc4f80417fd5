//! Turret placements scripted on the command line as `kind@column,row`.

use std::str::FromStr;

use castle_defence_core::{TileCoord, TurretKind};
use thiserror::Error;

const KIND_DELIMITER: char = '@';
const COORD_DELIMITER: char = ',';

/// Turret the session places before the first frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct BuildOrder {
    /// Kind of turret to place.
    pub(crate) kind: TurretKind,
    /// Tile hosting the turret.
    pub(crate) tile: TileCoord,
}

/// Errors that can occur while parsing a build order.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub(crate) enum BuildOrderError {
    /// The order did not separate the kind from the tile.
    #[error("build order '{0}' must look like kind@column,row")]
    MissingDelimiter(String),
    /// The kind did not name a turret.
    #[error("'{0}' is not a turret kind")]
    UnknownTurret(String),
    /// The tile could not be parsed.
    #[error("could not parse tile '{0}'")]
    InvalidTile(String),
}

impl FromStr for BuildOrder {
    type Err = BuildOrderError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let (kind, tile) = trimmed
            .split_once(KIND_DELIMITER)
            .ok_or_else(|| BuildOrderError::MissingDelimiter(trimmed.to_owned()))?;

        let name = kind.trim().to_ascii_lowercase();
        let kind =
            TurretKind::from_name(&name).ok_or(BuildOrderError::UnknownTurret(name))?;

        Ok(Self {
            kind,
            tile: parse_tile(tile)?,
        })
    }
}

fn parse_tile(tile: &str) -> Result<TileCoord, BuildOrderError> {
    let invalid = || BuildOrderError::InvalidTile(tile.to_owned());
    let (column, row) = tile.split_once(COORD_DELIMITER).ok_or_else(invalid)?;
    let column = column.trim().parse::<u32>().map_err(|_| invalid())?;
    let row = row.trim().parse::<u32>().map_err(|_| invalid())?;
    Ok(TileCoord::new(column, row))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_kind_and_tile() {
        let order: BuildOrder = " Lancer@5, 6 ".parse().expect("order parses");
        assert_eq!(
            order,
            BuildOrder {
                kind: TurretKind::Lancer,
                tile: TileCoord::new(5, 6),
            }
        );
    }

    #[test]
    fn rejects_malformed_orders() {
        assert_eq!(
            "duo".parse::<BuildOrder>(),
            Err(BuildOrderError::MissingDelimiter("duo".to_owned()))
        );
        assert_eq!(
            "tesla@1,2".parse::<BuildOrder>(),
            Err(BuildOrderError::UnknownTurret("tesla".to_owned()))
        );
        assert_eq!(
            "duo@1;2".parse::<BuildOrder>(),
            Err(BuildOrderError::InvalidTile("1;2".to_owned()))
        );
        assert_eq!(
            "duo@-1,2".parse::<BuildOrder>(),
            Err(BuildOrderError::InvalidTile("-1,2".to_owned()))
        );
    }
}
