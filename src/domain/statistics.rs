//! Grouped summary statistics over leg measurements.

use crate::domain::legs::LegMeasurement;
use crate::domain::topology::Leg;
use statrs::statistics::{Data, Distribution, Max, Median, Min};
use std::collections::BTreeMap;

/// Summary of the defined values of one (provider, leg) cell.
#[derive(Debug, Clone, PartialEq)]
pub struct LegSummary {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    /// Sample standard deviation; NaN with fewer than two values.
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub negative_count: usize,
}

impl LegSummary {
    /// Returns `None` ("no data") for an empty sample.
    pub fn from_values(values: Vec<f64>) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        let count = values.len();
        let negative_count = values.iter().filter(|v| **v < 0.0).count();
        let data = Data::new(values);

        let mean = data.mean().unwrap_or(f64::NAN);
        let std_dev = if count < 2 {
            f64::NAN
        } else {
            data.std_dev().unwrap_or(f64::NAN)
        };

        Some(Self {
            count,
            mean,
            median: data.median(),
            std_dev,
            min: data.min(),
            max: data.max(),
            negative_count,
        })
    }
}

/// One cell of the grouped statistics table.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateRow {
    pub csp: String,
    pub leg: Leg,
    pub summary: Option<LegSummary>,
}

/// Statistics for every (provider, leg) pair of a run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateStatistics {
    pub rows: Vec<AggregateRow>,
}

impl AggregateStatistics {
    /// Groups rows by provider and summarises each leg.
    ///
    /// Every provider in `providers` or appearing in `measurements` gets a row
    /// for all legs, ordered by provider name then leg number. A provider that
    /// contributed no records reports "no data" on every leg.
    pub fn compute(providers: &[String], measurements: &[LegMeasurement]) -> Self {
        let mut grouped: BTreeMap<&str, Vec<&LegMeasurement>> = providers
            .iter()
            .map(|name| (name.as_str(), Vec::new()))
            .collect();
        for m in measurements {
            grouped.entry(m.csp.as_str()).or_default().push(m);
        }

        let rows = grouped
            .into_iter()
            .flat_map(|(csp, group)| {
                Leg::ALL.into_iter().map(move |leg| {
                    let values: Vec<f64> = group.iter().filter_map(|m| m.leg(leg)).collect();
                    AggregateRow {
                        csp: csp.to_string(),
                        leg,
                        summary: LegSummary::from_values(values),
                    }
                })
            })
            .collect();

        Self { rows }
    }

    pub fn get(&self, csp: &str, leg: Leg) -> Option<&AggregateRow> {
        self.rows.iter().find(|r| r.csp == csp && r.leg == leg)
    }

    pub fn providers(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.rows.iter().map(|r| r.csp.as_str()).collect();
        names.dedup();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::topology::LEG_COUNT;

    fn row(csp: &str, legs: [Option<f64>; LEG_COUNT]) -> LegMeasurement {
        LegMeasurement {
            csp: csp.to_string(),
            log_id: None,
            source_key: format!("{}-x.json", csp.to_lowercase()),
            legs,
        }
    }

    #[test]
    fn test_summary_of_several_values() {
        let s = LegSummary::from_values(vec![10.0, 20.0, 30.0, 40.0, 50.0]).unwrap();
        assert_eq!(s.count, 5);
        assert!((s.mean - 30.0).abs() < 1e-9);
        assert!((s.median - 30.0).abs() < 1e-9);
        // Sample std dev (n - 1)
        assert!((s.std_dev - 250.0_f64.sqrt()).abs() < 1e-9);
        assert_eq!(s.min, 10.0);
        assert_eq!(s.max, 50.0);
        assert_eq!(s.negative_count, 0);
    }

    #[test]
    fn test_single_value_has_nan_std() {
        let s = LegSummary::from_values(vec![42.5]).unwrap();
        assert_eq!(s.mean, 42.5);
        assert_eq!(s.median, 42.5);
        assert!(s.std_dev.is_nan());
        assert_eq!(s.min, 42.5);
        assert_eq!(s.max, 42.5);
    }

    #[test]
    fn test_empty_is_no_data() {
        assert!(LegSummary::from_values(vec![]).is_none());
    }

    #[test]
    fn test_grouping_by_provider() {
        let rows = vec![
            row("AWS", [Some(100.0), Some(150.0), Some(150.0), Some(500.0), None]),
            row("AWS", [Some(300.0), None, Some(-50.0), Some(700.0), None]),
            row("IBM", [Some(80.0), None, None, Some(20.0), Some(5.0)]),
        ];

        let stats = AggregateStatistics::compute(&[], &rows);
        assert_eq!(stats.rows.len(), 2 * LEG_COUNT);
        assert_eq!(stats.providers(), vec!["AWS", "IBM"]);

        let aws_leg1 = stats.get("AWS", Leg::ALL[0]).unwrap().summary.clone().unwrap();
        assert_eq!(aws_leg1.count, 2);
        assert_eq!(aws_leg1.mean, 200.0);

        let aws_leg3 = stats.get("AWS", Leg::ALL[2]).unwrap().summary.clone().unwrap();
        assert_eq!(aws_leg3.negative_count, 1);
        assert_eq!(aws_leg3.min, -50.0);

        // No AWS record carries leg 5
        assert!(stats.get("AWS", Leg::ALL[4]).unwrap().summary.is_none());

        // IBM legs 2 and 3 are "no data"
        assert!(stats.get("IBM", Leg::ALL[1]).unwrap().summary.is_none());
        assert!(stats.get("IBM", Leg::ALL[2]).unwrap().summary.is_none());
        let ibm_leg5 = stats.get("IBM", Leg::ALL[4]).unwrap().summary.clone().unwrap();
        assert!(ibm_leg5.std_dev.is_nan());
    }

    #[test]
    fn test_no_measurements_no_rows() {
        assert!(AggregateStatistics::compute(&[], &[]).rows.is_empty());
    }

    #[test]
    fn test_provider_without_records_reports_no_data() {
        let providers = vec!["AWS".to_string(), "IBM".to_string()];
        let rows = vec![row("IBM", [Some(80.0), None, None, Some(20.0), Some(5.0)])];

        let stats = AggregateStatistics::compute(&providers, &rows);
        assert_eq!(stats.providers(), vec!["AWS", "IBM"]);
        assert_eq!(stats.rows.len(), 2 * LEG_COUNT);
        for leg in Leg::ALL {
            assert!(stats.get("AWS", leg).unwrap().summary.is_none());
        }
        assert_eq!(stats.get("IBM", Leg::ALL[0]).unwrap().summary.as_ref().unwrap().count, 1);

        let empty = AggregateStatistics::compute(&providers, &[]);
        assert_eq!(empty.rows.len(), 2 * LEG_COUNT);
    }
}
