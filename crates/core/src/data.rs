//! Wire types returned by the perf API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Project visibility
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    #[default]
    Public,
    Private,
}

/// Project metadata, also returned on its own for the metadata-only request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JsonProject {
    pub uuid: String,
    #[serde(default)]
    pub organization: Option<String>,
    pub name: String,
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default)]
    pub visibility: Visibility,
}

/// A named dimension resource (branch, testbed or benchmark)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JsonDimension {
    pub uuid: String,
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
}

pub type JsonBranch = JsonDimension;
pub type JsonTestbed = JsonDimension;
pub type JsonBenchmark = JsonDimension;

/// A measure, carrying the raw units its metric values are recorded in
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JsonMeasure {
    pub uuid: String,
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub units: Option<String>,
}

/// Top level perf response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JsonPerf {
    pub project: JsonProject,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    pub results: Vec<JsonPerfMetrics>,
}

/// All metrics for one branch × testbed × benchmark × measure combination
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JsonPerfMetrics {
    pub branch: JsonBranch,
    pub testbed: JsonTestbed,
    pub benchmark: JsonBenchmark,
    pub measure: JsonMeasure,
    pub metrics: Vec<JsonPerfMetric>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JsonPerfMetric {
    pub report: String,
    pub iteration: u32,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub version: JsonVersion,
    pub metric: JsonMetric,
    /// The threshold model in effect when this metric was recorded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<JsonThresholdModel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boundary: Option<JsonBoundary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alert: Option<JsonPerfAlert>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JsonVersion {
    pub number: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JsonMetric {
    pub uuid: String,
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lower_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upper_value: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JsonThresholdModel {
    pub uuid: String,
    #[serde(default)]
    pub project: Option<String>,
    pub model: JsonModel,
}

/// Statistical model of a threshold. Only the configured boundaries matter here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JsonModel {
    pub uuid: String,
    #[serde(default)]
    pub test: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lower_boundary: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upper_boundary: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct JsonBoundary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baseline: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lower_limit: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upper_limit: Option<f64>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryLimit {
    Lower,
    Upper,
}

impl BoundaryLimit {
    pub fn label(self) -> &'static str {
        match self {
            Self::Lower => "Lower",
            Self::Upper => "Upper",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AlertStatus {
    /// The alert is active
    Active,
    /// The alert has been dismissed by a user
    Dismissed,
    /// The alert has been silenced by the system
    Silenced,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JsonPerfAlert {
    pub uuid: String,
    pub limit: BoundaryLimit,
    pub status: AlertStatus,
    #[serde(default)]
    pub modified: Option<DateTime<Utc>>,
}

/// A report as listed by the reports tab
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JsonReport {
    pub uuid: String,
    pub branch: JsonBranch,
    pub testbed: JsonTestbed,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Results per iteration
    #[serde(default)]
    pub results: Vec<Vec<JsonReportResult>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JsonReportResult {
    pub iteration: u32,
    pub benchmark: JsonBenchmark,
    pub measures: Vec<JsonReportMeasure>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JsonReportMeasure {
    pub measure: JsonMeasure,
}

impl JsonReport {
    /// Benchmarks of the first iteration that recorded the given measure, in report order
    pub fn benchmarks_for_measure(&self, measure_uuid: &str) -> Vec<String> {
        let mut benchmarks = Vec::new();
        let Some(first_iteration) = self.results.first() else {
            return benchmarks;
        };
        for result in first_iteration {
            let has_measure = result
                .measures
                .iter()
                .any(|m| m.measure.uuid == measure_uuid);
            if has_measure && !benchmarks.contains(&result.benchmark.uuid) {
                benchmarks.push(result.benchmark.uuid.clone());
            }
        }
        benchmarks
    }

    /// The first measure of the first result, used to auto-select a report
    pub fn first_measure(&self) -> Option<&str> {
        self.results
            .first()
            .and_then(|iteration| iteration.first())
            .and_then(|result| result.measures.first())
            .map(|m| m.measure.uuid.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PERF_JSON: &str = r#"{
        "project": {
            "uuid": "p1", "organization": "o1", "name": "Project", "slug": "project",
            "visibility": "private", "created": "2024-01-01T00:00:00Z", "modified": "2024-01-01T00:00:00Z"
        },
        "results": [{
            "branch": {"uuid": "b1", "name": "main", "slug": "main"},
            "testbed": {"uuid": "t1", "name": "localhost"},
            "benchmark": {"uuid": "bm1", "name": "bench"},
            "measure": {"uuid": "m1", "name": "Latency", "units": "nanoseconds (ns)"},
            "metrics": [{
                "report": "r1",
                "iteration": 0,
                "start_time": "2024-01-02T03:04:05Z",
                "end_time": "2024-01-02T03:04:06Z",
                "version": {"number": 7, "hash": "abc123"},
                "metric": {"uuid": "x1", "value": 120.0, "lower_value": 110.0},
                "threshold": {"uuid": "th1", "model": {"uuid": "md1", "test": "t_test", "lower_boundary": 0.98}},
                "boundary": {"baseline": 118.0, "lower_limit": 100.0},
                "alert": {"uuid": "a1", "limit": "lower", "status": "dismissed", "modified": "2024-01-03T00:00:00Z"}
            }]
        }]
    }"#;

    #[test]
    fn test_deserialize_perf() {
        let perf: JsonPerf = serde_json::from_str(PERF_JSON).unwrap();
        assert_eq!(perf.project.visibility, Visibility::Private);
        assert_eq!(perf.results.len(), 1);

        let metric = &perf.results[0].metrics[0];
        assert_eq!(metric.version.number, 7);
        assert_eq!(metric.metric.lower_value, Some(110.0));
        assert_eq!(metric.metric.upper_value, None);
        assert_eq!(metric.boundary.as_ref().unwrap().lower_limit, Some(100.0));
        let alert = metric.alert.as_ref().unwrap();
        assert_eq!(alert.limit, BoundaryLimit::Lower);
        assert_eq!(alert.status, AlertStatus::Dismissed);
    }

    #[test]
    fn test_report_benchmarks_for_measure() {
        let bench = |uuid: &str| JsonDimension {
            uuid: uuid.to_string(),
            name: uuid.to_string(),
            slug: None,
        };
        let measure = |uuid: &str| JsonReportMeasure {
            measure: JsonMeasure {
                uuid: uuid.to_string(),
                name: uuid.to_string(),
                slug: None,
                units: None,
            },
        };
        let report = JsonReport {
            uuid: "r1".to_string(),
            branch: bench("b1"),
            testbed: bench("t1"),
            start_time: Utc::now(),
            end_time: Utc::now(),
            results: vec![vec![
                JsonReportResult {
                    iteration: 0,
                    benchmark: bench("bm1"),
                    measures: vec![measure("m1"), measure("m2")],
                },
                JsonReportResult {
                    iteration: 0,
                    benchmark: bench("bm2"),
                    measures: vec![measure("m2")],
                },
            ]],
        };

        assert_eq!(report.benchmarks_for_measure("m1"), vec!["bm1"]);
        assert_eq!(report.benchmarks_for_measure("m2"), vec!["bm1", "bm2"]);
        assert!(report.benchmarks_for_measure("m3").is_empty());
        assert_eq!(report.first_measure(), Some("m1"));
    }
}
