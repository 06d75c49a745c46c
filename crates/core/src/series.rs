//! Normalized perf series
//!
//! One [`PerfResult`] per branch × testbed × benchmark × measure combination,
//! in response order. Plot colours and the active mask index into this order.

use crate::data::{
    AlertStatus, BoundaryLimit, JsonBenchmark, JsonBranch, JsonMeasure, JsonPerf,
    JsonPerfMetric, JsonPerfMetrics, JsonProject, JsonTestbed,
};
use crate::query::XAxis;
use chrono::{DateTime, Utc};

/// Units shown for measures that do not declare any
pub const DEFAULT_UNITS: &str = "units";

#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdRef {
    pub uuid: String,
    pub model_uuid: String,
    pub lower_boundary: bool,
    pub upper_boundary: bool,
}

impl ThresholdRef {
    pub fn configures(&self, limit: BoundaryLimit) -> bool {
        match limit {
            BoundaryLimit::Lower => self.lower_boundary,
            BoundaryLimit::Upper => self.upper_boundary,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PerfAlert {
    pub uuid: String,
    pub status: AlertStatus,
    pub limit: BoundaryLimit,
}

impl PerfAlert {
    pub fn is_active(&self) -> bool {
        self.status == AlertStatus::Active
    }
}

/// Position of a point on the x axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum XValue {
    DateTime(DateTime<Utc>),
    Version(u32),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PerfPoint {
    pub report: String,
    pub metric: String,
    pub iteration: u32,
    pub start_time: DateTime<Utc>,
    pub version_number: u32,
    pub version_hash: Option<String>,
    pub value: f64,
    pub lower_value: Option<f64>,
    pub upper_value: Option<f64>,
    pub lower_limit: Option<f64>,
    pub upper_limit: Option<f64>,
    pub threshold: Option<ThresholdRef>,
    pub alert: Option<PerfAlert>,
}

impl PerfPoint {
    pub fn x(&self, x_axis: XAxis) -> XValue {
        match x_axis {
            XAxis::DateTime => XValue::DateTime(self.start_time),
            XAxis::Version => XValue::Version(self.version_number),
        }
    }

    pub fn limit(&self, limit: BoundaryLimit) -> Option<f64> {
        match limit {
            BoundaryLimit::Lower => self.lower_limit,
            BoundaryLimit::Upper => self.upper_limit,
        }
    }

    /// The active alert raised at `limit`, if any
    pub fn active_alert(&self, limit: BoundaryLimit) -> Option<&PerfAlert> {
        self.alert
            .as_ref()
            .filter(|alert| alert.is_active() && alert.limit == limit)
    }

    /// The threshold configures `limit` but no limit value was calculated.
    ///
    /// A limit of zero was calculated: it is drawn as a boundary, not skipped.
    pub fn is_skipped(&self, limit: BoundaryLimit) -> bool {
        self.limit(limit).is_none()
            && self
                .threshold
                .as_ref()
                .is_some_and(|threshold| threshold.configures(limit))
    }

    /// Placeholder height of a skipped limit, offset from the value
    pub fn skipped_y(&self, limit: BoundaryLimit, offset: f64) -> Option<f64> {
        if !self.is_skipped(limit) {
            return None;
        }
        Some(match limit {
            BoundaryLimit::Lower => self.value * (1.0 - offset),
            BoundaryLimit::Upper => self.value * (1.0 + offset),
        })
    }
}

impl From<JsonPerfMetric> for PerfPoint {
    fn from(json: JsonPerfMetric) -> Self {
        let boundary = json.boundary.unwrap_or_default();
        Self {
            report: json.report,
            metric: json.metric.uuid,
            iteration: json.iteration,
            start_time: json.start_time,
            version_number: json.version.number,
            version_hash: json.version.hash,
            value: json.metric.value,
            lower_value: json.metric.lower_value,
            upper_value: json.metric.upper_value,
            lower_limit: boundary.lower_limit,
            upper_limit: boundary.upper_limit,
            threshold: json.threshold.map(|threshold| ThresholdRef {
                uuid: threshold.uuid,
                model_uuid: threshold.model.uuid,
                lower_boundary: threshold.model.lower_boundary.is_some(),
                upper_boundary: threshold.model.upper_boundary.is_some(),
            }),
            alert: json.alert.map(|alert| PerfAlert {
                uuid: alert.uuid,
                status: alert.status,
                limit: alert.limit,
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PerfResult {
    pub branch: JsonBranch,
    pub testbed: JsonTestbed,
    pub benchmark: JsonBenchmark,
    pub measure: JsonMeasure,
    pub points: Vec<PerfPoint>,
}

impl PerfResult {
    /// Raw units of the measure
    pub fn units(&self) -> &str {
        self.measure
            .units
            .as_deref()
            .filter(|units| !units.is_empty())
            .unwrap_or(DEFAULT_UNITS)
    }
}

impl From<JsonPerfMetrics> for PerfResult {
    fn from(json: JsonPerfMetrics) -> Self {
        Self {
            branch: json.branch,
            testbed: json.testbed,
            benchmark: json.benchmark,
            measure: json.measure,
            points: json.metrics.into_iter().map(PerfPoint::from).collect(),
        }
    }
}

/// A fetched result set with its project
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PerfData {
    pub project: Option<JsonProject>,
    pub results: Vec<PerfResult>,
}

impl PerfData {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn project_only(project: JsonProject) -> Self {
        Self {
            project: Some(project),
            results: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.results.iter().all(|result| result.points.is_empty())
    }
}

impl From<JsonPerf> for PerfData {
    fn from(json: JsonPerf) -> Self {
        Self {
            project: Some(json.project),
            results: json.results.into_iter().map(PerfResult::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{JsonBoundary, JsonMetric, JsonModel, JsonPerfAlert, JsonThresholdModel, JsonVersion};
    use chrono::TimeZone;

    fn metric() -> JsonPerfMetric {
        JsonPerfMetric {
            report: "r1".to_string(),
            iteration: 0,
            start_time: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            end_time: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 1).unwrap(),
            version: JsonVersion {
                number: 3,
                hash: None,
            },
            metric: JsonMetric {
                uuid: "x1".to_string(),
                value: 120.0,
                lower_value: None,
                upper_value: None,
            },
            threshold: Some(JsonThresholdModel {
                uuid: "th1".to_string(),
                project: None,
                model: JsonModel {
                    uuid: "md1".to_string(),
                    test: None,
                    lower_boundary: Some(0.95),
                    upper_boundary: None,
                },
            }),
            boundary: Some(JsonBoundary {
                baseline: Some(118.0),
                lower_limit: None,
                upper_limit: Some(130.0),
            }),
            alert: Some(JsonPerfAlert {
                uuid: "a1".to_string(),
                limit: BoundaryLimit::Upper,
                status: AlertStatus::Active,
                modified: None,
            }),
        }
    }

    #[test]
    fn test_point_from_metric() {
        let point = PerfPoint::from(metric());
        assert_eq!(point.value, 120.0);
        assert_eq!(point.upper_limit, Some(130.0));
        assert_eq!(point.x(XAxis::Version), XValue::Version(3));

        // Lower is configured but was not calculated
        assert!(point.is_skipped(BoundaryLimit::Lower));
        assert!(!point.is_skipped(BoundaryLimit::Upper));

        let skipped = point.skipped_y(BoundaryLimit::Lower, 0.1).unwrap();
        assert!((skipped - 108.0).abs() < 1e-9);
        assert_eq!(point.skipped_y(BoundaryLimit::Upper, 0.1), None);

        assert!(point.active_alert(BoundaryLimit::Upper).is_some());
        assert!(point.active_alert(BoundaryLimit::Lower).is_none());
    }

    #[test]
    fn test_zero_limit_is_calculated() {
        let mut metric = metric();
        if let Some(boundary) = metric.boundary.as_mut() {
            boundary.lower_limit = Some(0.0);
        }
        let point = PerfPoint::from(metric);

        assert_eq!(point.lower_limit, Some(0.0));
        assert!(!point.is_skipped(BoundaryLimit::Lower));
        assert_eq!(point.skipped_y(BoundaryLimit::Lower, 0.1), None);
    }

    #[test]
    fn test_dismissed_alert_is_not_active() {
        let mut json = metric();
        if let Some(alert) = json.alert.as_mut() {
            alert.status = AlertStatus::Dismissed;
        }
        let point = PerfPoint::from(json);
        assert!(point.active_alert(BoundaryLimit::Upper).is_none());
    }

    #[test]
    fn test_units_fallback() {
        let dimension = crate::data::JsonDimension {
            uuid: "d".to_string(),
            name: "d".to_string(),
            slug: None,
        };
        let result = PerfResult {
            branch: dimension.clone(),
            testbed: dimension.clone(),
            benchmark: dimension,
            measure: JsonMeasure {
                uuid: "m".to_string(),
                name: "Throughput".to_string(),
                slug: None,
                units: None,
            },
            points: Vec::new(),
        };
        assert_eq!(result.units(), DEFAULT_UNITS);
    }
}
