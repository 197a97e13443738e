use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Half-unit band inside each wall in which a particle is reflected.
pub const WALL_MARGIN: f64 = 0.5;

/// One of the four walls of the rectangular container.
///
/// Integer identifiers follow the layout
///
/// ```text
///   +---------1---------+
///   |       (top)       |
///   4 (left)  (right)   2
///   |     (bottom)      |
///   +---------3---------+
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Wall {
    Top,
    Right,
    Bottom,
    Left,
}

impl Wall {
    /// All walls, ordered by identifier.
    pub const ALL: [Wall; 4] = [Wall::Top, Wall::Right, Wall::Bottom, Wall::Left];

    /// Integer identifier in `1..=4`.
    #[inline]
    pub fn id(self) -> u32 {
        match self {
            Wall::Top => 1,
            Wall::Right => 2,
            Wall::Bottom => 3,
            Wall::Left => 4,
        }
    }

    /// Axis of the velocity component this wall negates (0 = x, 1 = y).
    #[inline]
    pub fn normal_axis(self) -> usize {
        match self {
            Wall::Left | Wall::Right => 0,
            Wall::Top | Wall::Bottom => 1,
        }
    }

    /// Index into per-wall tables (`id() - 1`).
    #[inline]
    pub(crate) fn index(self) -> usize {
        (self.id() - 1) as usize
    }

    /// Length of this wall in a container of the given bounds.
    pub fn length(self, bounds: [u32; 2]) -> f64 {
        match self {
            Wall::Top | Wall::Bottom => f64::from(bounds[0]),
            Wall::Left | Wall::Right => f64::from(bounds[1]),
        }
    }
}

impl TryFrom<u32> for Wall {
    type Error = Error;

    fn try_from(id: u32) -> Result<Self> {
        match id {
            1 => Ok(Wall::Top),
            2 => Ok(Wall::Right),
            3 => Ok(Wall::Bottom),
            4 => Ok(Wall::Left),
            other => Err(Error::InvalidWall(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_round_trip() -> Result<()> {
        for wall in Wall::ALL {
            assert_eq!(Wall::try_from(wall.id())?, wall);
        }
        Ok(())
    }

    #[test]
    fn out_of_range_ids_rejected() {
        for id in [0, 5, 6, u32::MAX] {
            let err = Wall::try_from(id).unwrap_err();
            assert!(matches!(err, Error::InvalidWall(x) if x == id));
        }
    }

    #[test]
    fn normal_axes() {
        assert_eq!(Wall::Left.normal_axis(), 0);
        assert_eq!(Wall::Right.normal_axis(), 0);
        assert_eq!(Wall::Top.normal_axis(), 1);
        assert_eq!(Wall::Bottom.normal_axis(), 1);
    }

    #[test]
    fn lengths_follow_bounds() {
        assert_eq!(Wall::Top.length([300, 200]), 300.0);
        assert_eq!(Wall::Left.length([300, 200]), 200.0);
    }
}
