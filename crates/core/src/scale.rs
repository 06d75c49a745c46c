//! Unit scaling
//!
//! A single display magnitude is chosen across every active series so the
//! plotted values stay comparable. Time measures step through time units,
//! everything else through powers of a thousand.

use crate::data::BoundaryLimit;
use crate::query::Toggles;
use crate::series::{PerfResult, DEFAULT_UNITS};

pub const NANOSECONDS: &str = "nanoseconds (ns)";

/// Time units, as multiples of a nanosecond
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TimeScale {
    Nanos,
    Micros,
    Millis,
    Seconds,
    Minutes,
    Hours,
}

impl TimeScale {
    /// Largest first
    const DESCENDING: [TimeScale; 6] = [
        TimeScale::Hours,
        TimeScale::Minutes,
        TimeScale::Seconds,
        TimeScale::Millis,
        TimeScale::Micros,
        TimeScale::Nanos,
    ];

    pub fn factor(self) -> f64 {
        match self {
            Self::Nanos => 1.0,
            Self::Micros => 1e3,
            Self::Millis => 1e6,
            Self::Seconds => 1e9,
            Self::Minutes => 6e10,
            Self::Hours => 3.6e12,
        }
    }

    pub fn units(self) -> &'static str {
        match self {
            Self::Nanos => NANOSECONDS,
            Self::Micros => "microseconds (µs)",
            Self::Millis => "milliseconds (ms)",
            Self::Seconds => "seconds (s)",
            Self::Minutes => "minutes (m)",
            Self::Hours => "hours (h)",
        }
    }
}

/// Powers of a thousand
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DecadeScale {
    One,
    Thousand,
    Million,
    Billion,
    Trillion,
    Quadrillion,
}

impl DecadeScale {
    const DESCENDING: [DecadeScale; 6] = [
        DecadeScale::Quadrillion,
        DecadeScale::Trillion,
        DecadeScale::Billion,
        DecadeScale::Million,
        DecadeScale::Thousand,
        DecadeScale::One,
    ];

    pub fn factor(self) -> f64 {
        match self {
            Self::One => 1.0,
            Self::Thousand => 1e3,
            Self::Million => 1e6,
            Self::Billion => 1e9,
            Self::Trillion => 1e12,
            Self::Quadrillion => 1e15,
        }
    }

    fn exponent(self) -> u8 {
        match self {
            Self::One => 0,
            Self::Thousand => 3,
            Self::Million => 6,
            Self::Billion => 9,
            Self::Trillion => 12,
            Self::Quadrillion => 15,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scale {
    Time(TimeScale),
    Decade(DecadeScale),
}

impl Default for Scale {
    fn default() -> Self {
        Self::Decade(DecadeScale::One)
    }
}

pub fn is_time_units(units: &str) -> bool {
    units == NANOSECONDS
}

impl Scale {
    /// Pick the largest scale whose magnitude does not exceed `min`
    pub fn select(raw_units: &str, min: f64) -> Self {
        if is_time_units(raw_units) {
            let scale = TimeScale::DESCENDING
                .into_iter()
                .find(|scale| scale.factor() <= min)
                .unwrap_or(TimeScale::Nanos);
            Self::Time(scale)
        } else {
            let scale = DecadeScale::DESCENDING
                .into_iter()
                .find(|scale| scale.factor() <= min)
                .unwrap_or(DecadeScale::One);
            Self::Decade(scale)
        }
    }

    pub fn factor(&self) -> f64 {
        match self {
            Self::Time(scale) => scale.factor(),
            Self::Decade(scale) => scale.factor(),
        }
    }

    /// Display label of the scaled values
    pub fn units(&self, raw_units: &str) -> String {
        match self {
            Self::Time(scale) => scale.units().to_string(),
            Self::Decade(DecadeScale::One) => raw_units.to_string(),
            Self::Decade(scale) => format!("1e{} x {raw_units}", scale.exponent()),
        }
    }

    pub fn scale(&self, value: f64) -> f64 {
        value / self.factor()
    }
}

fn is_active(active: &[bool], index: usize) -> bool {
    active.get(index).copied().unwrap_or(true)
}

/// Minimum over every visible numeric field of the active series.
///
/// Absent fields do not constrain the minimum, so no data yields +∞.
pub fn data_min(results: &[PerfResult], active: &[bool], toggles: &Toggles, skipped_offset: f64) -> f64 {
    let mut min = f64::INFINITY;
    for (index, result) in results.iter().enumerate() {
        if !is_active(active, index) {
            continue;
        }
        for point in &result.points {
            let candidates = [
                Some(point.value),
                point.lower_value.filter(|_| toggles.lower_value),
                point.upper_value.filter(|_| toggles.upper_value),
                point.lower_limit.filter(|_| toggles.lower_boundary),
                point.upper_limit.filter(|_| toggles.upper_boundary),
                point
                    .skipped_y(BoundaryLimit::Lower, skipped_offset)
                    .filter(|_| toggles.lower_boundary),
                point
                    .skipped_y(BoundaryLimit::Upper, skipped_offset)
                    .filter(|_| toggles.upper_boundary),
                // Active alerts are always drawn at their limit
                point
                    .alert
                    .as_ref()
                    .filter(|alert| alert.is_active())
                    .and_then(|alert| point.limit(alert.limit)),
            ];
            for candidate in candidates.into_iter().flatten() {
                min = min.min(candidate);
            }
        }
    }
    min
}

/// Raw units of the plot, taken from the first active series
pub fn raw_units<'a>(results: &'a [PerfResult], active: &[bool]) -> &'a str {
    results
        .iter()
        .enumerate()
        .find(|(index, _)| is_active(active, *index))
        .map(|(_, result)| result.units())
        .unwrap_or(DEFAULT_UNITS)
}

/// Numeric fields of a point divided by the scale factor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaledPoint {
    pub value: f64,
    pub lower_value: Option<f64>,
    pub upper_value: Option<f64>,
    pub lower_limit: Option<f64>,
    pub upper_limit: Option<f64>,
}

/// An active result with its scaled points. `points[i]` scales `result.points[i]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaledSeries {
    /// Position in the fetched result set
    pub index: usize,
    pub result: PerfResult,
    pub points: Vec<ScaledPoint>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScaledPlot {
    pub scale: Scale,
    pub raw_units: String,
    /// Display label shared by every series
    pub units: String,
    pub series: Vec<ScaledSeries>,
}

impl ScaledPlot {
    pub fn factor(&self) -> f64 {
        self.scale.factor()
    }

    pub fn has_data(&self) -> bool {
        self.series.iter().any(|series| !series.points.is_empty())
    }
}

/// Choose a scale for the active series and divide every numeric field by it
pub fn scale_results(
    results: &[PerfResult],
    active: &[bool],
    toggles: &Toggles,
    skipped_offset: f64,
) -> ScaledPlot {
    let raw_units = raw_units(results, active).to_string();
    let min = data_min(results, active, toggles, skipped_offset);
    let scale = if min.is_finite() {
        Scale::select(&raw_units, min)
    } else if is_time_units(&raw_units) {
        Scale::Time(TimeScale::Nanos)
    } else {
        Scale::default()
    };
    tracing::debug!(min, factor = scale.factor(), "Selected plot scale");

    let series = results
        .iter()
        .enumerate()
        .filter(|(index, _)| is_active(active, *index))
        .map(|(index, result)| ScaledSeries {
            index,
            points: result
                .points
                .iter()
                .map(|point| ScaledPoint {
                    value: scale.scale(point.value),
                    lower_value: point.lower_value.map(|v| scale.scale(v)),
                    upper_value: point.upper_value.map(|v| scale.scale(v)),
                    lower_limit: point.lower_limit.map(|v| scale.scale(v)),
                    upper_limit: point.upper_limit.map(|v| scale.scale(v)),
                })
                .collect(),
            result: result.clone(),
        })
        .collect();

    ScaledPlot {
        units: scale.units(&raw_units),
        scale,
        raw_units,
        series,
    }
}

/// Thousands separated with two decimals, dropping a `.00` suffix
pub fn format_number(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let fixed = format!("{:.2}", value.abs());
    let (integer, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (i, digit) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
    if fraction == "00" {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{fraction}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{AlertStatus, JsonDimension, JsonMeasure};
    use crate::series::{PerfAlert, PerfPoint};
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    fn point(value: f64) -> PerfPoint {
        PerfPoint {
            report: "r".to_string(),
            metric: "x".to_string(),
            iteration: 0,
            start_time: Utc::now(),
            version_number: 1,
            version_hash: None,
            value,
            lower_value: None,
            upper_value: None,
            lower_limit: None,
            upper_limit: None,
            threshold: None,
            alert: None,
        }
    }

    fn result(units: Option<&str>, points: Vec<PerfPoint>) -> PerfResult {
        let dimension = JsonDimension {
            uuid: "d".to_string(),
            name: "d".to_string(),
            slug: None,
        };
        PerfResult {
            branch: dimension.clone(),
            testbed: dimension.clone(),
            benchmark: dimension,
            measure: JsonMeasure {
                uuid: "m".to_string(),
                name: "m".to_string(),
                slug: None,
                units: units.map(str::to_string),
            },
            points,
        }
    }

    #[test]
    fn test_nanoseconds_to_millis() {
        let results = vec![result(Some(NANOSECONDS), vec![point(2_500_000.0), point(4_000_000.0)])];
        let plot = scale_results(&results, &[], &Toggles::default(), 0.1);

        assert_eq!(plot.scale, Scale::Time(TimeScale::Millis));
        assert_eq!(plot.units, "milliseconds (ms)");
        assert_eq!(plot.series[0].points[0].value, 2.5);
    }

    #[test]
    fn test_decade_scale() {
        assert_eq!(Scale::select("units", 120.0), Scale::Decade(DecadeScale::One));
        let scale = Scale::select("ops/s", 4_200.0);
        assert_eq!(scale, Scale::Decade(DecadeScale::Thousand));
        assert_eq!(scale.units("ops/s"), "1e3 x ops/s");
        assert_eq!(Scale::Decade(DecadeScale::One).units("ops/s"), "ops/s");
    }

    #[test]
    fn test_scale_is_monotonic() {
        let mins = [0.5, 1.0, 999.0, 1e3, 5e7, 6e10, 3.6e12, 1e16];
        for units in [NANOSECONDS, DEFAULT_UNITS] {
            let factors: Vec<f64> = mins.iter().map(|m| Scale::select(units, *m).factor()).collect();
            assert!(factors.windows(2).all(|w| w[0] <= w[1]), "{units}: {factors:?}");
        }
    }

    #[test]
    fn test_no_points_uses_factor_one() {
        let plot = scale_results(&[result(None, Vec::new())], &[], &Toggles::default(), 0.1);
        assert_eq!(plot.factor(), 1.0);
        assert_eq!(plot.units, DEFAULT_UNITS);
        assert!(!plot.has_data());
    }

    #[test]
    fn test_hidden_overlays_do_not_constrain_min() {
        let mut p = point(5_000.0);
        p.lower_value = Some(10.0);
        p.lower_limit = Some(20.0);
        let results = vec![result(None, vec![p])];

        let off = Toggles::default();
        assert_eq!(data_min(&results, &[], &off, 0.1), 5_000.0);

        let values = Toggles {
            lower_value: true,
            ..Toggles::default()
        };
        assert_eq!(data_min(&results, &[], &values, 0.1), 10.0);

        let boundary = Toggles {
            lower_boundary: true,
            ..Toggles::default()
        };
        assert_eq!(data_min(&results, &[], &boundary, 0.1), 20.0);
    }

    #[test]
    fn test_active_alert_limit_always_constrains_min() {
        let mut p = point(5_000.0);
        p.upper_limit = Some(4_000.0);
        p.alert = Some(PerfAlert {
            uuid: "a".to_string(),
            status: AlertStatus::Active,
            limit: BoundaryLimit::Upper,
        });
        let results = vec![result(None, vec![p])];
        assert_eq!(data_min(&results, &[], &Toggles::default(), 0.1), 4_000.0);
    }

    #[test]
    fn test_inactive_series_excluded() {
        let results = vec![
            result(None, vec![point(1.0)]),
            result(None, vec![point(2e6)]),
        ];
        let plot = scale_results(&results, &[false, true], &Toggles::default(), 0.1);
        assert_eq!(plot.scale, Scale::Decade(DecadeScale::Million));
        assert_eq!(plot.series.len(), 1);
        assert_eq!(plot.series[0].index, 1);
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0.0), "0");
        assert_eq!(format_number(2.5), "2.50");
        assert_eq!(format_number(1234.0), "1,234");
        assert_eq!(format_number(1234567.891), "1,234,567.89");
        assert_eq!(format_number(-1000.5), "-1,000.50");
        assert_eq!(format_number(-0.001), "0");
    }
}
