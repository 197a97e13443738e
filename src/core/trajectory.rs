use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::btree_map;
use std::collections::BTreeMap;
use std::io::{Read, Write};

/// Integer grid point `[x, y]`, truncated toward zero from the float position.
pub type Point = [i64; 2];

/// Recorded positions per particle index, one point per simulation step.
///
/// Serializes as a JSON object keyed by the particle index as a string:
/// `{"0": [[x, y], ...], "1": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Trajectory {
    paths: BTreeMap<usize, Vec<Point>>,
}

impl Trajectory {
    /// Empty trajectory with a path for each of `num_particles` particles,
    /// each pre-sized for `steps` points.
    pub fn with_particles(num_particles: usize, steps: usize) -> Self {
        let paths = (0..num_particles)
            .map(|i| (i, Vec::with_capacity(steps)))
            .collect();
        Self { paths }
    }

    /// Append the truncated position of particle `i`.
    #[inline]
    pub fn record(&mut self, i: usize, r: [f64; 2]) {
        self.paths
            .entry(i)
            .or_default()
            .push([r[0] as i64, r[1] as i64]);
    }

    /// Path of particle `i`.
    pub fn path(&self, i: usize) -> Option<&[Point]> {
        self.paths.get(&i).map(Vec::as_slice)
    }

    /// Number of particles with a path.
    pub fn num_particles(&self) -> usize {
        self.paths.len()
    }

    /// Number of recorded steps (length of the longest path).
    pub fn num_steps(&self) -> usize {
        self.paths.values().map(Vec::len).max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.paths.values().all(Vec::is_empty)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, usize, Vec<Point>> {
        self.paths.iter()
    }

    /// Pretty-printed JSON text.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write pretty-printed JSON to `writer`.
    pub fn write_json<W: Write>(&self, writer: W) -> Result<()> {
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Read a trajectory previously written by [`Trajectory::write_json`].
    pub fn from_json<R: Read>(reader: R) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }
}

impl<'a> IntoIterator for &'a Trajectory {
    type Item = (&'a usize, &'a Vec<Point>);
    type IntoIter = btree_map::Iter<'a, usize, Vec<Point>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_truncates_toward_zero() {
        let mut t = Trajectory::with_particles(1, 2);
        t.record(0, [10.9, -4.7]);
        t.record(0, [-0.2, 299.99]);
        assert_eq!(t.path(0), Some(&[[10, -4], [0, 299]][..]));
    }

    #[test]
    fn json_uses_string_keys_and_pairs() -> Result<()> {
        let mut t = Trajectory::with_particles(2, 1);
        t.record(0, [1.5, 2.5]);
        t.record(1, [3.0, 4.0]);
        let value: serde_json::Value = serde_json::from_str(&t.to_json_pretty()?)?;
        assert_eq!(value["0"], serde_json::json!([[1, 2]]));
        assert_eq!(value["1"], serde_json::json!([[3, 4]]));
        Ok(())
    }

    #[test]
    fn read_back_matches() -> Result<()> {
        let mut t = Trajectory::with_particles(3, 2);
        for step in 0..2 {
            for i in 0..3 {
                t.record(i, [i as f64, step as f64]);
            }
        }
        let mut buf = Vec::new();
        t.write_json(&mut buf)?;
        let back = Trajectory::from_json(buf.as_slice())?;
        assert_eq!(back, t);
        assert_eq!(back.num_steps(), 2);
        Ok(())
    }
}
