//! Code for working with years and the simulation window.
use anyhow::{Result, ensure};
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// The years covered by a simulation run, from `start` (inclusive) to `end` (exclusive).
///
/// All per-year vectors in the model are indexed relative to `start`, so that index `i` refers to
/// year `start + i`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearRange {
    start: u32,
    end: u32,
}

impl YearRange {
    /// Create a new simulation window.
    ///
    /// Returns an error if the window contains no years.
    pub fn new(start: u32, end: u32) -> Result<Self> {
        ensure!(
            end > start,
            "Simulation end year ({end}) must be after start year ({start})"
        );

        Ok(Self { start, end })
    }

    /// The first simulated year
    pub fn start(&self) -> u32 {
        self.start
    }

    /// The year after the last simulated year
    pub fn end(&self) -> u32 {
        self.end
    }

    /// The number of simulated years
    pub fn len(&self) -> usize {
        (self.end - self.start) as usize
    }

    /// Always false, as an empty window cannot be constructed
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Whether `year` falls inside the window
    pub fn contains(&self, year: u32) -> bool {
        (self.start..self.end).contains(&year)
    }

    /// Iterate over the simulated years in order
    pub fn iter(&self) -> Range<u32> {
        self.into_iter()
    }

    /// Get the vector index for `year`, if it falls inside the window
    pub fn index_of(&self, year: u32) -> Option<usize> {
        self.contains(year).then(|| (year - self.start) as usize)
    }

    /// Get the year at vector index `idx`
    pub fn year_at(&self, idx: usize) -> u32 {
        self.start + idx as u32
    }

    /// Build a per-year boolean vector which is true at exactly one year, if it is in the window
    pub fn one_hot(&self, year: Option<u32>) -> Vec<bool> {
        let idx = year.and_then(|year| self.index_of(year));
        (0..self.len()).map(|i| Some(i) == idx).collect()
    }
}

impl IntoIterator for &YearRange {
    type Item = u32;
    type IntoIter = Range<u32>;

    fn into_iter(self) -> Self::IntoIter {
        self.start..self.end
    }
}
