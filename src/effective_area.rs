//! # Effective-area tables
//!
//! An effective area is a geometry-dependent scalar used to subtract the ambient
//! (pileup) contribution from a raw isolation sum:
//!
//! ```text
//! corrected = raw - EA(|η|) × ρ
//! ```
//!
//! [`EffectiveAreaTable`] stores an ordered list of `(threshold, area)` pairs partitioning
//! the `|η|` axis. A lookup returns the area of the first threshold that `|η|` does not
//! exceed; anything above every finite threshold falls into the last entry. There is no
//! error path at lookup time.
//!
//! ## File format
//!
//! Tables are read from plain text files with one row per `|η|` bin:
//!
//! ```text
//! # |eta| min   |eta| max   effective area
//! 0.0000        1.0000      0.1440
//! 1.0000        1.4790      0.1562
//! 1.4790        5.0000      0.1032
//! ```
//!
//! The upper edge of each row becomes its threshold; the lower edge is only used to
//! check that rows are ordered. Blank lines and `#` comments are ignored.
use std::str::FromStr;

use camino::Utf8Path;
use nom::{
    character::complete::{space0, space1},
    number::complete::double,
    sequence::preceded,
    IResult, Parser,
};

use crate::fill_errors::FillError;

#[derive(Debug, Clone, PartialEq)]
pub struct EffectiveAreaTable {
    thresholds: Vec<f64>,
    areas: Vec<f64>,
}

fn parse_area_row(input: &str) -> IResult<&str, (f64, f64, f64)> {
    (
        preceded(space0, double),
        preceded(space1, double),
        preceded(space1, double),
    )
        .parse(input)
}

impl EffectiveAreaTable {
    /// Build a table from `(threshold, area)` pairs.
    ///
    /// Arguments
    /// -----------------
    /// * `bins`: pairs ordered by strictly increasing threshold. The last pair catches every
    ///   coordinate above the previous threshold, whatever its own threshold is.
    ///
    /// Return
    /// ----------
    /// * The table, or [`FillError::EffectiveAreaOrder`] if `bins` is empty or the
    ///   thresholds are not strictly increasing.
    pub fn new(bins: Vec<(f64, f64)>) -> Result<Self, FillError> {
        if bins.is_empty() {
            return Err(FillError::EffectiveAreaOrder(
                "table has no entries".to_string(),
            ));
        }

        let (thresholds, areas): (Vec<f64>, Vec<f64>) = bins.into_iter().unzip();

        if let Some(w) = thresholds.windows(2).find(|w| !(w[0] < w[1])) {
            return Err(FillError::EffectiveAreaOrder(format!(
                "threshold {} does not follow {}",
                w[1], w[0]
            )));
        }

        Ok(EffectiveAreaTable { thresholds, areas })
    }

    /// Read a table from a text file (see the module documentation for the format).
    pub fn from_file(path: &Utf8Path) -> Result<Self, FillError> {
        let content = std::fs::read_to_string(path)?;
        content.parse()
    }

    /// Effective area for a coordinate.
    ///
    /// The sign of `coordinate` is ignored. A coordinate equal to a threshold belongs to
    /// the bin that threshold closes.
    pub fn lookup(&self, coordinate: f64) -> f64 {
        let abs = coordinate.abs();
        let last = self.areas.len() - 1;
        let bin = self.thresholds[..last]
            .iter()
            .position(|&t| abs <= t)
            .unwrap_or(last);
        self.areas[bin]
    }

    pub fn len(&self) -> usize {
        self.areas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }
}

impl FromStr for EffectiveAreaTable {
    type Err = FillError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rows = s
            .lines()
            .map(|line| line.split('#').next().unwrap_or_default().trim())
            .filter(|line| !line.is_empty())
            .map(|line| match parse_area_row(line) {
                Ok((rest, row)) if rest.trim().is_empty() => Ok(row),
                _ => Err(FillError::EffectiveAreaParse(line.to_string())),
            })
            .collect::<Result<Vec<_>, FillError>>()?;

        if let Some(w) = rows.windows(2).find(|w| w[1].0 < w[0].0) {
            return Err(FillError::EffectiveAreaOrder(format!(
                "bin starting at {} listed after bin starting at {}",
                w[1].0, w[0].0
            )));
        }

        EffectiveAreaTable::new(rows.into_iter().map(|(_, max, area)| (max, area)).collect())
    }
}
