//! Descriptive statistics over the cleaned dataset.
//!
//! Produces the figures a charting front-end renders: most frequent winning
//! parties, turnout trend by year, victory margin distribution and the most
//! represented states.

use crate::core::constants::{
    DEFAULT_HISTOGRAM_BINS, DEFAULT_SUMMARY_TOP_N, LABEL_COLUMN, MARGIN_COLUMN, STATE_COLUMN,
    TURNOUT_COLUMN, YEAR_COLUMN,
};
use crate::core::error::{PipelineError, Result};
use crate::dataset::table::{parse_numeric, Table};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// A category with its row count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub name: String,
    pub count: usize,
}

/// Mean turnout for one election year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearTurnout {
    pub year: i64,
    pub mean_turnout: f64,
}

/// One histogram bin covering `[lower, upper)`, the last bin closed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Summary statistics of a cleaned dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSummary {
    /// Total rows
    pub num_rows: usize,
    /// Parties with the most wins
    pub top_parties: Vec<CategoryCount>,
    /// Mean turnout per year, ascending by year
    pub turnout_by_year: Vec<YearTurnout>,
    /// Distribution of victory margins
    pub margin_histogram: Vec<HistogramBin>,
    /// States with the most rows
    pub top_states: Vec<CategoryCount>,
}

/// Options for [`DatasetSummary::compute_with`].
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryOptions {
    /// Entries in the top parties and top states lists
    pub top_n: usize,
    /// Bins of the margin histogram
    pub histogram_bins: usize,
}

impl Default for SummaryOptions {
    fn default() -> Self {
        SummaryOptions {
            top_n: DEFAULT_SUMMARY_TOP_N,
            histogram_bins: DEFAULT_HISTOGRAM_BINS,
        }
    }
}

impl DatasetSummary {
    /// Compute the summary with default options.
    pub fn compute(table: &Table) -> Result<Self> {
        Self::compute_with(table, &SummaryOptions::default())
    }

    /// Compute the summary.
    pub fn compute_with(table: &Table, options: &SummaryOptions) -> Result<Self> {
        if options.histogram_bins == 0 {
            return Err(PipelineError::invalid_parameter(
                "histogram_bins",
                "0",
                "must be at least 1",
            ));
        }

        let parties = table.require_column(LABEL_COLUMN)?;
        let states = table.require_column(STATE_COLUMN)?;
        let years = table.require_column(YEAR_COLUMN)?;
        let turnout = table.require_column(TURNOUT_COLUMN)?;
        let margin = table.require_column(MARGIN_COLUMN)?;

        Ok(DatasetSummary {
            num_rows: table.num_rows(),
            top_parties: top_counts(parties.values(), options.top_n),
            turnout_by_year: mean_by_year(years.values(), turnout.values()),
            margin_histogram: histogram(&margin.present_numeric_values(), options.histogram_bins),
            top_states: top_counts(states.values(), options.top_n),
        })
    }

    /// Render as pretty JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Most frequent non-empty values, ties broken by first appearance.
fn top_counts(values: &[String], top_n: usize) -> Vec<CategoryCount> {
    let mut counts: Vec<CategoryCount> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();

    for value in values.iter().map(|v| v.trim()).filter(|v| !v.is_empty()) {
        match positions.get(value) {
            Some(&position) => counts[position].count += 1,
            None => {
                positions.insert(value, counts.len());
                counts.push(CategoryCount {
                    name: value.to_string(),
                    count: 1,
                });
            }
        }
    }

    // stable sort keeps first-seen order among equal counts
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(top_n);
    counts
}

fn mean_by_year(years: &[String], turnout: &[String]) -> Vec<YearTurnout> {
    let mut sums: BTreeMap<i64, (f64, usize)> = BTreeMap::new();

    for (year, value) in years.iter().zip(turnout) {
        let (Some(year), Some(value)) = (parse_numeric(year), parse_numeric(value)) else {
            continue;
        };
        let entry = sums.entry(year as i64).or_insert((0.0, 0));
        entry.0 += value;
        entry.1 += 1;
    }

    sums.into_iter()
        .map(|(year, (sum, count))| YearTurnout {
            year,
            mean_turnout: sum / count as f64,
        })
        .collect()
}

fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return Vec::new();
    }

    let min = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let (lower, upper) = if max > min { (min, max) } else { (min - 0.5, max + 0.5) };
    let width = (upper - lower) / bins as f64;

    let mut result: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            lower: lower + width * i as f64,
            upper: lower + width * (i + 1) as f64,
            count: 0,
        })
        .collect();

    for value in finite {
        let index = (((value - lower) / width) as usize).min(bins - 1);
        result[index].count += 1;
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::loader::CsvLoader;
    use approx::assert_relative_eq;

    fn table() -> Table {
        CsvLoader::default()
            .parse_bytes(
                b"state,year,Turnout,margin,party\n\
                  Goa,1977,60,10,INC\n\
                  Assam,1977,50,20,BJP\n\
                  Goa,1980,70,,BJP\n\
                  Kerala,1980,,30,INC\n\
                  Kerala,1980,80,40,CPM\n",
            )
            .unwrap()
    }

    #[test]
    fn test_top_counts_break_ties_by_first_seen() {
        let summary = DatasetSummary::compute(&table()).unwrap();
        let parties: Vec<(&str, usize)> = summary
            .top_parties
            .iter()
            .map(|c| (c.name.as_str(), c.count))
            .collect();
        assert_eq!(parties, vec![("INC", 2), ("BJP", 2), ("CPM", 1)]);

        let states: Vec<&str> = summary.top_states.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(states, vec!["Goa", "Kerala", "Assam"]);
    }

    #[test]
    fn test_turnout_by_year_ignores_nulls() {
        let summary = DatasetSummary::compute(&table()).unwrap();
        assert_eq!(summary.turnout_by_year.len(), 2);
        assert_eq!(summary.turnout_by_year[0].year, 1977);
        assert_relative_eq!(summary.turnout_by_year[0].mean_turnout, 55.0);
        assert_relative_eq!(summary.turnout_by_year[1].mean_turnout, 75.0);
    }

    #[test]
    fn test_margin_histogram() {
        let options = SummaryOptions {
            top_n: 2,
            histogram_bins: 3,
        };
        let summary = DatasetSummary::compute_with(&table(), &options).unwrap();
        assert_eq!(summary.top_parties.len(), 2);

        let counts: Vec<usize> = summary.margin_histogram.iter().map(|b| b.count).collect();
        assert_eq!(counts, vec![1, 1, 2]);
        assert_relative_eq!(summary.margin_histogram[0].lower, 10.0);
        assert_relative_eq!(summary.margin_histogram[2].upper, 40.0);
    }

    #[test]
    fn test_histogram_single_value() {
        let bins = histogram(&[5.0, 5.0], 4);
        assert_eq!(bins.len(), 4);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 2);
        assert!(histogram(&[], 4).is_empty());
    }

    #[test]
    fn test_summary_serializes_to_json() {
        let summary = DatasetSummary::compute(&table()).unwrap();
        let json = summary.to_json().unwrap();
        assert!(json.contains("top_parties"));
        let parsed: DatasetSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, summary);
    }
}
