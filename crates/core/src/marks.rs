//! Series mark builder
//!
//! Turns scaled series into declarative chart marks: lines, symbol dots and
//! image glyphs, each dot carrying its tooltip text and click-through target.

use crate::data::BoundaryLimit;
use crate::query::{Toggles, XAxis};
use crate::scale::{format_number, ScaledPlot, ScaledPoint, ScaledSeries};
use crate::series::{PerfPoint, XValue};
use url::form_urlencoded;

/// d3 Tableau10
pub const TABLEAU10: [&str; 10] = [
    "#4e79a7", "#f28e2c", "#e15759", "#76b7b2", "#59a14f", "#edc949", "#af7aa1", "#ff9da7",
    "#9c755f", "#bab0ab",
];

pub const CONSOLE_ROOT: &str = "/console/projects";
pub const PUBLIC_ROOT: &str = "/perf";

pub const WARNING_URL: &str = "https://s3.amazonaws.com/public.bencher.dev/perf/warning.png";
pub const SIREN_URL: &str = "https://s3.amazonaws.com/public.bencher.dev/perf/siren.png";

const SKIPPED_TITLE: &str = "Boundary Limit was not calculated\nThis can happen for a couple of reasons:\n- There is not enough data yet (n < 2) (Most Common)\n- All the metric values are the same (variance == 0)";

pub fn series_color(index: usize) -> &'static str {
    TABLEAU10[index % TABLEAU10.len()]
}

/// Styling constants of the generated marks
#[derive(Debug, Clone, PartialEq)]
pub struct MarkConfig {
    /// Relative offset of skipped-boundary warnings from the value
    pub skipped_offset: f64,
    pub line_width: f64,
    pub value_bound_width: f64,
    pub value_bound_dash: f64,
    pub value_bound_opacity: f64,
    pub boundary_width: f64,
    pub boundary_dash: f64,
    pub boundary_opacity: f64,
    pub image_width: f64,
}

impl Default for MarkConfig {
    fn default() -> Self {
        Self {
            skipped_offset: 0.1,
            line_width: 1.5,
            value_bound_width: 2.0,
            value_bound_dash: 3.0,
            value_bound_opacity: 0.9,
            boundary_width: 4.0,
            boundary_dash: 8.0,
            boundary_opacity: 0.666,
            image_width: 18.0,
        }
    }
}

/// Where click-through links point
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkContext {
    pub root: String,
    pub project_slug: String,
    /// Location of the plot, forwarded so detail pages can link back
    pub back: Option<String>,
}

impl LinkContext {
    pub fn console(project_slug: impl Into<String>) -> Self {
        Self {
            root: CONSOLE_ROOT.to_string(),
            project_slug: project_slug.into(),
            back: None,
        }
    }

    pub fn public(project_slug: impl Into<String>) -> Self {
        Self {
            root: PUBLIC_ROOT.to_string(),
            project_slug: project_slug.into(),
            back: None,
        }
    }

    pub fn with_back(mut self, back: Option<String>) -> Self {
        self.back = back;
        self
    }

    fn url(&self, resource: &str, uuid: &str, params: &[(&str, &str)]) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in params {
            serializer.append_pair(key, value);
        }
        if let Some(back) = &self.back {
            serializer.append_pair("back", back);
        }
        let query = serializer.finish();
        let base = format!("{}/{}/{resource}/{uuid}", self.root, self.project_slug);
        if query.is_empty() {
            base
        } else {
            format!("{base}?{query}")
        }
    }

    pub fn metric_url(&self, metric: &str) -> String {
        self.url("metrics", metric, &[])
    }

    pub fn threshold_url(&self, threshold: &str, model: &str) -> String {
        self.url("thresholds", threshold, &[("model", model)])
    }

    pub fn alert_url(&self, alert: &str) -> String {
        self.url("alerts", alert, &[])
    }
}

/// What a mark depicts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkKind {
    Value,
    ValueBound(BoundaryLimit),
    Boundary(BoundaryLimit),
    Skipped(BoundaryLimit),
    Alert(BoundaryLimit),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbol {
    Circle,
    Diamond,
    Square,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Glyph {
    Warning,
    Siren,
}

impl Glyph {
    pub fn src(self) -> &'static str {
        match self {
            Self::Warning => WARNING_URL,
            Self::Siren => SIREN_URL,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    pub color: &'static str,
    pub width: f64,
    pub opacity: f64,
    pub dash: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotPoint {
    pub x: XValue,
    pub y: f64,
}

/// A positioned, titled and optionally linked datum
#[derive(Debug, Clone, PartialEq)]
pub struct Datum {
    pub x: XValue,
    pub y: f64,
    pub title: String,
    pub href: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Mark {
    /// Polyline, broken into segments where the y value is absent
    Line {
        kind: MarkKind,
        series: usize,
        stroke: Stroke,
        segments: Vec<Vec<PlotPoint>>,
    },
    Dot {
        kind: MarkKind,
        series: usize,
        symbol: Symbol,
        stroke: Stroke,
        data: Vec<Datum>,
    },
    Image {
        kind: MarkKind,
        series: usize,
        glyph: Glyph,
        width: f64,
        data: Vec<Datum>,
    },
}

impl Mark {
    pub fn kind(&self) -> MarkKind {
        match self {
            Self::Line { kind, .. } | Self::Dot { kind, .. } | Self::Image { kind, .. } => *kind,
        }
    }

    pub fn series(&self) -> usize {
        match self {
            Self::Line { series, .. } | Self::Dot { series, .. } | Self::Image { series, .. } => {
                *series
            }
        }
    }

    /// Every y value the mark draws
    pub fn y_values(&self) -> Vec<f64> {
        match self {
            Self::Line { segments, .. } => segments.iter().flatten().map(|p| p.y).collect(),
            Self::Dot { data, .. } | Self::Image { data, .. } => data.iter().map(|d| d.y).collect(),
        }
    }

    pub fn x_values(&self) -> Vec<XValue> {
        match self {
            Self::Line { segments, .. } => segments.iter().flatten().map(|p| p.x).collect(),
            Self::Dot { data, .. } | Self::Image { data, .. } => data.iter().map(|d| d.x).collect(),
        }
    }
}

/// Build the marks of every active series.
///
/// Warnings and then alerts are appended after all line and dot marks so
/// they draw on top.
pub fn build_marks(
    plot: &ScaledPlot,
    toggles: &Toggles,
    x_axis: XAxis,
    links: &LinkContext,
    config: &MarkConfig,
) -> Vec<Mark> {
    let mut marks = Vec::new();
    let mut warnings = Vec::new();
    let mut alerts = Vec::new();

    for series in &plot.series {
        let builder = SeriesMarks {
            series,
            raw_units: &plot.raw_units,
            x_axis,
            links,
            config,
            color: series_color(series.index),
        };

        marks.extend(builder.values());

        for (limit, on) in [
            (BoundaryLimit::Lower, toggles.lower_value),
            (BoundaryLimit::Upper, toggles.upper_value),
        ] {
            if on {
                marks.extend(builder.value_bounds(limit));
            }
        }

        for (limit, on) in [
            (BoundaryLimit::Lower, toggles.lower_boundary),
            (BoundaryLimit::Upper, toggles.upper_boundary),
        ] {
            if on {
                marks.extend(builder.boundaries(limit));
                warnings.extend(builder.skipped(limit));
            }
            alerts.extend(builder.alerts(limit));
        }
    }

    marks.extend(warnings);
    marks.extend(alerts);
    marks
}

struct SeriesMarks<'a> {
    series: &'a ScaledSeries,
    raw_units: &'a str,
    x_axis: XAxis,
    links: &'a LinkContext,
    config: &'a MarkConfig,
    color: &'static str,
}

impl SeriesMarks<'_> {
    fn points(&self) -> impl Iterator<Item = (&PerfPoint, &ScaledPoint)> + '_ {
        self.series.result.points.iter().zip(self.series.points.iter())
    }

    fn segments<F>(&self, y: F) -> Vec<Vec<PlotPoint>>
    where
        F: Fn(&ScaledPoint) -> Option<f64>,
    {
        let mut segments = Vec::new();
        let mut current = Vec::new();
        for (raw, scaled) in self.points() {
            match y(scaled) {
                Some(y) => current.push(PlotPoint {
                    x: raw.x(self.x_axis),
                    y,
                }),
                None if !current.is_empty() => segments.push(std::mem::take(&mut current)),
                None => {}
            }
        }
        if !current.is_empty() {
            segments.push(current);
        }
        segments
    }

    fn title(&self, prefix: &str, point: &PerfPoint, suffix: &str) -> String {
        let result = &self.series.result;
        let mut title = format!(
            "{prefix}\n{}\nIteration: {}\nBranch: {}\nVersion Number: {}",
            point.start_time.format("%a, %b %d, %Y, %H:%M:%S UTC"),
            point.iteration,
            result.branch.name,
            point.version_number,
        );
        if let Some(hash) = &point.version_hash {
            title.push_str(&format!("\nVersion Hash: {hash}"));
        }
        title.push_str(&format!(
            "\nTestbed: {}\nBenchmark: {}\nMeasure: {}{suffix}",
            result.testbed.name, result.benchmark.name, result.measure.name,
        ));
        title
    }

    fn raw(&self, value: f64) -> String {
        format!("{} {}", format_number(value), self.raw_units)
    }

    fn line(&self, kind: MarkKind, stroke: Stroke, segments: Vec<Vec<PlotPoint>>) -> Option<Mark> {
        if segments.is_empty() {
            return None;
        }
        Some(Mark::Line {
            kind,
            series: self.series.index,
            stroke,
            segments,
        })
    }

    fn values(&self) -> Vec<Mark> {
        let stroke = Stroke {
            color: self.color,
            width: self.config.line_width,
            opacity: 1.0,
            dash: None,
        };
        let data = self
            .points()
            .map(|(raw, scaled)| Datum {
                x: raw.x(self.x_axis),
                y: scaled.value,
                title: self.title(&self.raw(raw.value), raw, "\nClick to view Metric"),
                href: Some(self.links.metric_url(&raw.metric)),
            })
            .collect();

        let mut marks = Vec::new();
        marks.extend(self.line(MarkKind::Value, stroke.clone(), self.segments(|p| Some(p.value))));
        marks.push(Mark::Dot {
            kind: MarkKind::Value,
            series: self.series.index,
            symbol: Symbol::Circle,
            stroke,
            data,
        });
        marks
    }

    fn value_bounds(&self, limit: BoundaryLimit) -> Vec<Mark> {
        let pick = move |p: &ScaledPoint| match limit {
            BoundaryLimit::Lower => p.lower_value,
            BoundaryLimit::Upper => p.upper_value,
        };
        let pick_raw = move |p: &PerfPoint| match limit {
            BoundaryLimit::Lower => p.lower_value,
            BoundaryLimit::Upper => p.upper_value,
        };
        let stroke = Stroke {
            color: self.color,
            width: self.config.value_bound_width,
            opacity: self.config.value_bound_opacity,
            dash: Some(self.config.value_bound_dash),
        };
        let kind = MarkKind::ValueBound(limit);

        let data: Vec<Datum> = self
            .points()
            .filter_map(|(raw, scaled)| {
                let y = pick(scaled)?;
                let value = pick_raw(raw)?;
                let prefix = format!("{} Value: {}", limit.label(), self.raw(value));
                Some(Datum {
                    x: raw.x(self.x_axis),
                    y,
                    title: self.title(&prefix, raw, "\nClick to view Metric"),
                    href: Some(self.links.metric_url(&raw.metric)),
                })
            })
            .collect();

        let mut marks = Vec::new();
        marks.extend(self.line(kind, stroke.clone(), self.segments(pick)));
        if !data.is_empty() {
            marks.push(Mark::Dot {
                kind,
                series: self.series.index,
                symbol: Symbol::Diamond,
                stroke,
                data,
            });
        }
        marks
    }

    fn boundaries(&self, limit: BoundaryLimit) -> Vec<Mark> {
        let pick = move |p: &ScaledPoint| match limit {
            BoundaryLimit::Lower => p.lower_limit,
            BoundaryLimit::Upper => p.upper_limit,
        };
        let stroke = Stroke {
            color: self.color,
            width: self.config.boundary_width,
            opacity: self.config.boundary_opacity,
            dash: Some(self.config.boundary_dash),
        };
        let kind = MarkKind::Boundary(limit);

        // Points with an active alert at this limit are drawn as sirens instead
        let data: Vec<Datum> = self
            .points()
            .filter(|(raw, _)| raw.active_alert(limit).is_none())
            .filter_map(|(raw, scaled)| {
                let y = pick(scaled)?;
                let value = raw.limit(limit)?;
                let prefix = format!("{} Limit: {}", limit.label(), self.raw(value));
                let (suffix, href) = match &raw.threshold {
                    Some(threshold) => (
                        "\nClick to view Threshold",
                        Some(self.links.threshold_url(&threshold.uuid, &threshold.model_uuid)),
                    ),
                    None => ("", None),
                };
                Some(Datum {
                    x: raw.x(self.x_axis),
                    y,
                    title: self.title(&prefix, raw, suffix),
                    href,
                })
            })
            .collect();

        let mut marks = Vec::new();
        marks.extend(self.line(kind, stroke.clone(), self.segments(pick)));
        if !data.is_empty() {
            marks.push(Mark::Dot {
                kind,
                series: self.series.index,
                symbol: Symbol::Square,
                stroke,
                data,
            });
        }
        marks
    }

    fn skipped(&self, limit: BoundaryLimit) -> Option<Mark> {
        let data: Vec<Datum> = self
            .points()
            .filter_map(|(raw, scaled)| {
                let threshold = raw.threshold.as_ref().filter(|_| raw.is_skipped(limit))?;
                let y = match limit {
                    BoundaryLimit::Lower => scaled.value * (1.0 - self.config.skipped_offset),
                    BoundaryLimit::Upper => scaled.value * (1.0 + self.config.skipped_offset),
                };
                let prefix = format!("{} {SKIPPED_TITLE}", limit.label());
                Some(Datum {
                    x: raw.x(self.x_axis),
                    y,
                    title: self.title(&prefix, raw, "\nClick to view Threshold"),
                    href: Some(self.links.threshold_url(&threshold.uuid, &threshold.model_uuid)),
                })
            })
            .collect();

        (!data.is_empty()).then(|| Mark::Image {
            kind: MarkKind::Skipped(limit),
            series: self.series.index,
            glyph: Glyph::Warning,
            width: self.config.image_width,
            data,
        })
    }

    fn alerts(&self, limit: BoundaryLimit) -> Option<Mark> {
        let data: Vec<Datum> = self
            .points()
            .filter_map(|(raw, scaled)| {
                let alert = raw.active_alert(limit)?;
                let y = match limit {
                    BoundaryLimit::Lower => scaled.lower_limit,
                    BoundaryLimit::Upper => scaled.upper_limit,
                }?;
                let value = raw.limit(limit)?;
                let prefix = format!("{} Limit: {}", limit.label(), self.raw(value));
                Some(Datum {
                    x: raw.x(self.x_axis),
                    y,
                    title: self.title(&prefix, raw, "\nClick to view Alert"),
                    href: Some(self.links.alert_url(&alert.uuid)),
                })
            })
            .collect();

        (!data.is_empty()).then(|| Mark::Image {
            kind: MarkKind::Alert(limit),
            series: self.series.index,
            glyph: Glyph::Siren,
            width: self.config.image_width,
            data,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::data::{AlertStatus, JsonDimension, JsonMeasure};
    use crate::scale::scale_results;
    use crate::series::{PerfAlert, PerfResult, ThresholdRef};
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    pub(crate) fn point(value: f64) -> PerfPoint {
        PerfPoint {
            report: "r1".to_string(),
            metric: "x1".to_string(),
            iteration: 0,
            start_time: Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap(),
            version_number: 12,
            version_hash: Some("deadbeef".to_string()),
            value,
            lower_value: None,
            upper_value: None,
            lower_limit: None,
            upper_limit: None,
            threshold: Some(ThresholdRef {
                uuid: "th1".to_string(),
                model_uuid: "md1".to_string(),
                lower_boundary: true,
                upper_boundary: false,
            }),
            alert: None,
        }
    }

    pub(crate) fn result(points: Vec<PerfPoint>) -> PerfResult {
        let dimension = |name: &str| JsonDimension {
            uuid: name.to_string(),
            name: name.to_string(),
            slug: None,
        };
        PerfResult {
            branch: dimension("main"),
            testbed: dimension("localhost"),
            benchmark: dimension("bench"),
            measure: JsonMeasure {
                uuid: "m1".to_string(),
                name: "Latency".to_string(),
                slug: None,
                units: None,
            },
            points,
        }
    }

    fn marks_for(results: &[PerfResult], toggles: Toggles) -> Vec<Mark> {
        marks_with_mask(results, &[], toggles)
    }

    fn marks_with_mask(results: &[PerfResult], active: &[bool], toggles: Toggles) -> Vec<Mark> {
        let config = MarkConfig::default();
        let plot = scale_results(results, active, &toggles, config.skipped_offset);
        build_marks(
            &plot,
            &toggles,
            XAxis::DateTime,
            &LinkContext::console("project"),
            &config,
        )
    }

    fn kinds(marks: &[Mark]) -> Vec<(MarkKind, &'static str)> {
        marks
            .iter()
            .map(|mark| {
                let shape = match mark {
                    Mark::Line { .. } => "line",
                    Mark::Dot { .. } => "dot",
                    Mark::Image { .. } => "image",
                };
                (mark.kind(), shape)
            })
            .collect()
    }

    fn lower_boundary() -> Toggles {
        Toggles {
            lower_boundary: true,
            ..Toggles::default()
        }
    }

    #[test]
    fn test_boundary_marks() {
        let mut p = point(120.0);
        p.lower_limit = Some(100.0);
        let marks = marks_for(&[result(vec![p])], lower_boundary());

        assert_eq!(
            kinds(&marks),
            vec![
                (MarkKind::Value, "line"),
                (MarkKind::Value, "dot"),
                (MarkKind::Boundary(BoundaryLimit::Lower), "line"),
                (MarkKind::Boundary(BoundaryLimit::Lower), "dot"),
            ]
        );
        assert_eq!(marks[1].y_values(), vec![120.0]);
        assert_eq!(marks[3].y_values(), vec![100.0]);
        if let Mark::Dot { data, .. } = &marks[3] {
            assert_eq!(
                data[0].href.as_deref(),
                Some("/console/projects/project/thresholds/th1?model=md1")
            );
        }
    }

    #[test]
    fn test_skipped_boundary_warning() {
        let marks = marks_for(&[result(vec![point(120.0)])], lower_boundary());

        assert_eq!(
            kinds(&marks),
            vec![
                (MarkKind::Value, "line"),
                (MarkKind::Value, "dot"),
                (MarkKind::Skipped(BoundaryLimit::Lower), "image"),
            ]
        );
        let y = marks[2].y_values()[0];
        assert!((y - 108.0).abs() < 1e-9);
        if let Mark::Image { data, glyph, .. } = &marks[2] {
            assert_eq!(*glyph, Glyph::Warning);
            assert_eq!(
                glyph.src(),
                "https://s3.amazonaws.com/public.bencher.dev/perf/warning.png"
            );
            assert!(data[0].title.starts_with("Lower Boundary Limit was not calculated"));
        }
    }

    #[test]
    fn test_warnings_hidden_without_toggle() {
        let marks = marks_for(&[result(vec![point(120.0)])], Toggles::default());
        assert_eq!(marks.len(), 2);
    }

    #[test]
    fn test_active_alert_replaces_boundary_dot() {
        let mut alerted = point(90.0);
        alerted.lower_limit = Some(100.0);
        alerted.alert = Some(PerfAlert {
            uuid: "a1".to_string(),
            status: AlertStatus::Active,
            limit: BoundaryLimit::Lower,
        });
        let mut normal = point(120.0);
        normal.lower_limit = Some(100.0);

        let marks = marks_for(&[result(vec![normal, alerted])], lower_boundary());
        let boundary_dots: Vec<&Mark> = marks
            .iter()
            .filter(|m| matches!(m, Mark::Dot { kind: MarkKind::Boundary(_), .. }))
            .collect();
        assert_eq!(boundary_dots.len(), 1);
        assert_eq!(boundary_dots[0].y_values(), vec![100.0]);

        let last = marks.last().unwrap();
        assert_eq!(last.kind(), MarkKind::Alert(BoundaryLimit::Lower));
        if let Mark::Image { data, glyph, .. } = last {
            assert_eq!(glyph.src(), "https://s3.amazonaws.com/public.bencher.dev/perf/siren.png");
            assert_eq!(data.len(), 1);
            assert_eq!(data[0].href.as_deref(), Some("/console/projects/project/alerts/a1"));
            assert!(data[0].title.ends_with("Click to view Alert"));
        }
    }

    #[test]
    fn test_alerts_drawn_without_boundary_toggle() {
        let mut p = point(130.0);
        p.upper_limit = Some(125.0);
        p.alert = Some(PerfAlert {
            uuid: "a2".to_string(),
            status: AlertStatus::Active,
            limit: BoundaryLimit::Upper,
        });
        let marks = marks_for(&[result(vec![p])], Toggles::default());
        assert_eq!(marks.last().map(Mark::kind), Some(MarkKind::Alert(BoundaryLimit::Upper)));
    }

    #[test]
    fn test_value_bounds_and_colors() {
        let mut p = point(50.0);
        p.lower_value = Some(45.0);
        p.upper_value = Some(55.0);
        let toggles = Toggles {
            lower_value: true,
            upper_value: true,
            ..Toggles::default()
        };
        let marks = marks_for(&[result(vec![point(1.0)]), result(vec![p])], toggles);

        let bounds: Vec<&Mark> = marks
            .iter()
            .filter(|m| matches!(m.kind(), MarkKind::ValueBound(_)))
            .collect();
        assert_eq!(bounds.len(), 4);
        if let Mark::Dot { symbol, stroke, .. } = bounds[1] {
            assert_eq!(*symbol, Symbol::Diamond);
            assert_eq!(stroke.color, TABLEAU10[1]);
            assert_eq!(stroke.dash, Some(3.0));
        }
    }

    #[test]
    fn test_hidden_series_leaves_others_unchanged() {
        let mut bounded = point(120.0);
        bounded.lower_limit = Some(100.0);
        let first = result(vec![bounded, point(140.0)]);
        // Smaller values would change the shared scale if they were counted
        let second = result(vec![point(0.5), point(0.25)]);
        let toggles = Toggles {
            lower_boundary: true,
            upper_boundary: true,
            ..Toggles::default()
        };

        let hidden = marks_with_mask(&[first.clone(), second.clone()], &[true, false], toggles);
        let alone = marks_with_mask(&[first.clone()], &[true], toggles);
        assert_eq!(hidden, alone);

        let both = marks_with_mask(&[first, second], &[true, true], toggles);
        assert_ne!(both, alone);
    }

    #[test]
    fn test_dot_title() {
        let marks = marks_for(&[result(vec![point(1234.5)])], Toggles::default());
        let Mark::Dot { data, .. } = &marks[1] else {
            panic!("expected dot mark");
        };
        assert_eq!(
            data[0].title,
            "1,234.50 units\nMon, May 06, 2024, 07:08:09 UTC\nIteration: 0\nBranch: main\nVersion Number: 12\nVersion Hash: deadbeef\nTestbed: localhost\nBenchmark: bench\nMeasure: Latency\nClick to view Metric"
        );
    }

    #[test]
    fn test_back_link() {
        let links = LinkContext::public("project").with_back(Some("/perf/project?key=true".to_string()));
        assert_eq!(
            links.metric_url("x1"),
            "/perf/project/metrics/x1?back=%2Fperf%2Fproject%3Fkey%3Dtrue"
        );
    }
}
