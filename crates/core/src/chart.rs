//! Chart layout and SVG rendering
//!
//! The left margin depends on the widest y tick label, which is only known
//! once the ticks have been laid out. The renderer lays out once with the
//! current margin, measures, and re-lays out at most once per change of the
//! layout inputs.

use crate::marks::{Datum, Mark, PlotPoint, Symbol};
use crate::query::{Toggles, XAxis};
use crate::scale::{format_number, ScaledPlot};
use crate::series::XValue;
use chrono::{DateTime, Utc};

/// Applied to the estimated label width to leave some slack
pub const SCALE_FACTOR: f64 = 1.12;
/// Average glyph width of the 10px tick font
pub const CHAR_WIDTH: f64 = 6.0;
pub const DEFAULT_MARGIN_LEFT: f64 = 40.0;
pub const DATE_TIME_LABEL: &str = "Report Date and Time";
pub const VERSION_LABEL: &str = "Branch Version Number →";
pub const NO_DATA: &str = "No data found";

const Y_TICKS: usize = 6;
const X_TICKS: usize = 8;
pub const DOT_RADIUS: f64 = 3.0;
const HOUR_MS: i64 = 3_600_000;
const DAY_MS: i64 = 24 * HOUR_MS;
/// Candidate time tick intervals in milliseconds
const TIME_INTERVALS: [i64; 20] = [
    1_000,
    5_000,
    15_000,
    30_000,
    60_000,
    5 * 60_000,
    15 * 60_000,
    30 * 60_000,
    HOUR_MS,
    3 * HOUR_MS,
    6 * HOUR_MS,
    12 * HOUR_MS,
    DAY_MS,
    2 * DAY_MS,
    7 * DAY_MS,
    14 * DAY_MS,
    30 * DAY_MS,
    90 * DAY_MS,
    180 * DAY_MS,
    365 * DAY_MS,
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartOptions {
    pub width: f64,
    pub height: f64,
    pub x_axis: XAxis,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            width: 1000.0,
            height: 400.0,
            x_axis: XAxis::DateTime,
        }
    }
}

/// Round a raw step to 1, 2 or 5 times a power of ten
pub fn nice_step(raw: f64) -> f64 {
    if !raw.is_finite() || raw <= 0.0 {
        return 1.0;
    }
    let magnitude = 10f64.powi(raw.log10().floor() as i32);
    let normalized = raw / magnitude;
    let fraction = if normalized <= 1.0 {
        1.0
    } else if normalized <= 2.0 {
        2.0
    } else if normalized <= 5.0 {
        5.0
    } else {
        10.0
    };
    fraction * magnitude
}

/// Linear y scale with a niced domain
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YScale {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl YScale {
    pub fn nice(min: f64, max: f64, count: usize) -> Self {
        let (min, max) = if (max - min).abs() < f64::EPSILON {
            let pad = if min == 0.0 { 1.0 } else { min.abs() * 0.1 };
            (min - pad, max + pad)
        } else {
            (min, max)
        };
        let step = nice_step((max - min) / count.max(1) as f64);
        Self {
            min: (min / step).floor() * step,
            max: (max / step).ceil() * step,
            step,
        }
    }

    pub fn ticks(&self) -> Vec<f64> {
        let count = ((self.max - self.min) / self.step).round() as usize;
        (0..=count)
            .map(|k| {
                let tick = self.min + k as f64 * self.step;
                // Snap away accumulated float error
                (tick / self.step).round() * self.step
            })
            .collect()
    }

    /// Pixel position between `bottom` (min) and `top` (max)
    pub fn position(&self, y: f64, top: f64, bottom: f64) -> f64 {
        let span = self.max - self.min;
        if span <= 0.0 {
            return (top + bottom) / 2.0;
        }
        bottom - (y - self.min) / span * (bottom - top)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum XScale {
    /// Continuous time in epoch milliseconds
    Time { start: i64, end: i64 },
    /// Ordinal version numbers, ascending
    Point { versions: Vec<u32> },
}

impl XScale {
    pub fn from_values(x_axis: XAxis, values: &[XValue]) -> Self {
        match x_axis {
            XAxis::DateTime => {
                let millis = values.iter().filter_map(|x| match x {
                    XValue::DateTime(dt) => Some(dt.timestamp_millis()),
                    XValue::Version(_) => None,
                });
                let start = millis.clone().min().unwrap_or_default();
                let end = millis.max().unwrap_or_default();
                if start == end {
                    Self::Time {
                        start: start - 12 * HOUR_MS,
                        end: end + 12 * HOUR_MS,
                    }
                } else {
                    Self::Time { start, end }
                }
            }
            XAxis::Version => {
                let mut versions: Vec<u32> = values
                    .iter()
                    .filter_map(|x| match x {
                        XValue::Version(v) => Some(*v),
                        XValue::DateTime(_) => None,
                    })
                    .collect();
                versions.sort_unstable();
                versions.dedup();
                Self::Point { versions }
            }
        }
    }

    pub fn position(&self, x: XValue, left: f64, right: f64) -> f64 {
        match (self, x) {
            (Self::Time { start, end }, XValue::DateTime(dt)) => {
                let span = (end - start).max(1) as f64;
                left + (dt.timestamp_millis() - start) as f64 / span * (right - left)
            }
            (Self::Point { versions }, XValue::Version(v)) => {
                let index = versions.binary_search(&v).unwrap_or_else(|i| i);
                let band = (right - left) / versions.len().max(1) as f64;
                left + (index as f64 + 0.5) * band
            }
            _ => left,
        }
    }

    /// Tick positions with their labels
    pub fn ticks(&self) -> Vec<(XValue, String)> {
        match self {
            Self::Time { start, end } => {
                let span = end - start;
                let interval = TIME_INTERVALS
                    .into_iter()
                    .find(|interval| span / interval <= X_TICKS as i64)
                    .unwrap_or(365 * DAY_MS);
                let format = if interval < DAY_MS {
                    "%H:%M"
                } else if interval < 90 * DAY_MS {
                    "%b %d"
                } else {
                    "%b %Y"
                };
                let first = start.div_euclid(interval) * interval + interval;
                (0..)
                    .map(|k| first + k * interval)
                    .take_while(|tick| tick <= end)
                    .filter_map(|tick| DateTime::<Utc>::from_timestamp_millis(tick))
                    .map(|dt| (XValue::DateTime(dt), dt.format(format).to_string()))
                    .collect()
            }
            Self::Point { versions } => {
                let every = versions.len().div_ceil(X_TICKS * 2).max(1);
                versions
                    .iter()
                    .step_by(every)
                    .map(|v| (XValue::Version(*v), v.to_string()))
                    .collect()
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Margins {
    pub fn with_left(left: f64) -> Self {
        Self {
            top: 24.0,
            right: 24.0,
            bottom: 36.0,
            left,
        }
    }
}

pub fn estimate_label_width(label: &str) -> f64 {
    label.chars().count() as f64 * CHAR_WIDTH * SCALE_FACTOR
}

/// A laid out chart
#[derive(Debug, Clone, PartialEq)]
pub struct ChartLayout {
    pub options: ChartOptions,
    pub margins: Margins,
    pub x: XScale,
    pub y: YScale,
    pub units: String,
}

impl ChartLayout {
    /// Lay out the marks, or `None` when there is nothing to draw
    pub fn new(plot: &ScaledPlot, marks: &[Mark], options: ChartOptions, margin_left: f64) -> Option<Self> {
        if !plot.has_data() || marks.is_empty() {
            return None;
        }
        let ys: Vec<f64> = marks
            .iter()
            .flat_map(Mark::y_values)
            .filter(|y| y.is_finite())
            .collect();
        let xs: Vec<XValue> = marks.iter().flat_map(Mark::x_values).collect();
        let min = ys.iter().copied().fold(f64::INFINITY, f64::min);
        let max = ys.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if !min.is_finite() || !max.is_finite() {
            return None;
        }

        Some(Self {
            options,
            margins: Margins::with_left(margin_left),
            x: XScale::from_values(options.x_axis, &xs),
            y: YScale::nice(min, max, Y_TICKS),
            units: plot.units.clone(),
        })
    }

    pub fn left(&self) -> f64 {
        self.margins.left
    }

    pub fn right(&self) -> f64 {
        self.options.width - self.margins.right
    }

    pub fn top(&self) -> f64 {
        self.margins.top
    }

    pub fn bottom(&self) -> f64 {
        self.options.height - self.margins.bottom
    }

    pub fn x_px(&self, x: XValue) -> f64 {
        self.x.position(x, self.left(), self.right())
    }

    pub fn y_px(&self, y: f64) -> f64 {
        self.y.position(y, self.top(), self.bottom())
    }

    pub fn y_labels(&self) -> Vec<(f64, String)> {
        self.y
            .ticks()
            .into_iter()
            .map(|tick| (tick, format_number(tick)))
            .collect()
    }

    /// Margin needed to fit the widest y tick label
    pub fn measured_margin(&self) -> f64 {
        let widest = self
            .y_labels()
            .iter()
            .map(|(_, label)| estimate_label_width(label))
            .fold(0.0, f64::max);
        (widest + 10.0).max(DEFAULT_MARGIN_LEFT).ceil()
    }

    pub fn x_label(&self) -> &'static str {
        match self.options.x_axis {
            XAxis::DateTime => DATE_TIME_LABEL,
            XAxis::Version => VERSION_LABEL,
        }
    }

    pub fn y_label(&self) -> String {
        format!("↑ {}", self.units)
    }
}

/// Inputs whose change schedules a re-layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutInputs {
    pub x_axis: XAxis,
    pub toggles: Toggles,
    pub active: Vec<bool>,
}

/// Tracks the measured left margin across renders
#[derive(Debug, Clone)]
pub struct LayoutTracker {
    inputs: Option<LayoutInputs>,
    margin_left: f64,
    measured: bool,
    relayouts: usize,
}

impl Default for LayoutTracker {
    fn default() -> Self {
        Self {
            inputs: None,
            margin_left: DEFAULT_MARGIN_LEFT,
            measured: false,
            relayouts: 0,
        }
    }
}

impl LayoutTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn margin_left(&self) -> f64 {
        self.margin_left
    }

    /// Total re-layouts performed
    pub fn relayouts(&self) -> usize {
        self.relayouts
    }

    /// Record the inputs of a render. A measurement is due when they changed by value.
    pub fn observe(&mut self, inputs: LayoutInputs) {
        if self.inputs.as_ref() != Some(&inputs) {
            self.inputs = Some(inputs);
            self.measured = false;
        }
    }

    /// Report the margin measured after a layout pass.
    ///
    /// Returns true when the chart must be laid out once more.
    pub fn measure(&mut self, margin_left: f64) -> bool {
        if self.measured {
            return false;
        }
        self.measured = true;
        if (margin_left - self.margin_left).abs() < 0.5 {
            return false;
        }
        tracing::debug!(from = self.margin_left, to = margin_left, "Re-laying out chart");
        self.margin_left = margin_left;
        self.relayouts += 1;
        true
    }
}

/// The outcome of a render
#[derive(Debug, Clone, PartialEq)]
pub enum Rendered {
    NoData,
    Svg(String),
}

/// Lays out and renders charts, remembering the measured margin
#[derive(Debug, Clone, Default)]
pub struct ChartRenderer {
    pub options: ChartOptions,
    tracker: LayoutTracker,
}

impl ChartRenderer {
    pub fn new(options: ChartOptions) -> Self {
        Self {
            options,
            tracker: LayoutTracker::new(),
        }
    }

    pub fn tracker(&self) -> &LayoutTracker {
        &self.tracker
    }

    /// Lay out with the tracked margin, re-laying out once if it is stale
    pub fn layout(&mut self, plot: &ScaledPlot, marks: &[Mark], inputs: LayoutInputs) -> Option<ChartLayout> {
        self.options.x_axis = inputs.x_axis;
        self.tracker.observe(inputs);
        let layout = ChartLayout::new(plot, marks, self.options, self.tracker.margin_left())?;
        if self.tracker.measure(layout.measured_margin()) {
            return ChartLayout::new(plot, marks, self.options, self.tracker.margin_left());
        }
        Some(layout)
    }

    pub fn render(&mut self, plot: &ScaledPlot, marks: &[Mark], inputs: LayoutInputs) -> Rendered {
        match self.layout(plot, marks, inputs) {
            Some(layout) => Rendered::Svg(render_svg(&layout, marks)),
            None => Rendered::NoData,
        }
    }
}

/// Find the datum nearest to a pointer, within `radius` pixels
pub fn hit_test<'a>(layout: &ChartLayout, marks: &'a [Mark], px: f64, py: f64, radius: f64) -> Option<&'a Datum> {
    let mut best: Option<(f64, &Datum)> = None;
    for mark in marks {
        let data = match mark {
            Mark::Dot { data, .. } | Mark::Image { data, .. } => data,
            Mark::Line { .. } => continue,
        };
        for datum in data {
            let dx = layout.x_px(datum.x) - px;
            let dy = layout.y_px(datum.y) - py;
            let distance = (dx * dx + dy * dy).sqrt();
            if distance <= radius && best.map_or(true, |(d, _)| distance < d) {
                best = Some((distance, datum));
            }
        }
    }
    best.map(|(_, datum)| datum)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tooltip {
    pub text: String,
    pub x: f64,
    pub y: f64,
}

impl Tooltip {
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text.lines()
    }
}

pub fn estimate_tooltip_width(text: &str) -> f64 {
    text.lines()
        .map(|line| line.chars().count() as f64 * CHAR_WIDTH)
        .fold(0.0, f64::max)
        + 16.0
}

/// Keep a tooltip of `width` horizontally inside a chart of `chart_width`
pub fn clamp_tooltip_x(pointer_x: f64, width: f64, chart_width: f64) -> f64 {
    pointer_x.min(chart_width - width).max(0.0)
}

#[derive(Debug, Clone, PartialEq)]
pub enum PointerEvent {
    /// Mouse moved, over a datum with `title` or over nothing
    Move { x: f64, y: f64, title: Option<String> },
    /// Pointer left the chart
    Out,
    /// Touch tap, on a datum with `title` or anywhere else
    Tap { x: f64, y: f64, title: Option<String> },
}

/// Hover tooltip state
#[derive(Debug, Clone, Default)]
pub struct TooltipState {
    tooltip: Option<Tooltip>,
}

impl TooltipState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&Tooltip> {
        self.tooltip.as_ref()
    }

    fn show(&mut self, x: f64, y: f64, title: String, chart_width: f64) {
        let width = estimate_tooltip_width(&title);
        self.tooltip = Some(Tooltip {
            x: clamp_tooltip_x(x, width, chart_width),
            y,
            text: title,
        });
    }

    pub fn handle(&mut self, event: PointerEvent, chart_width: f64) {
        match event {
            PointerEvent::Move { x, y, title: Some(title) } => self.show(x, y, title, chart_width),
            PointerEvent::Move { title: None, .. } | PointerEvent::Out => self.tooltip = None,
            PointerEvent::Tap { x, y, title } => {
                // Any tap dismisses an open tooltip
                if self.tooltip.take().is_none() {
                    if let Some(title) = title {
                        self.show(x, y, title, chart_width);
                    }
                }
            }
        }
    }
}

pub fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// SVG path data of one line segment
pub fn segment_path(layout: &ChartLayout, points: &[PlotPoint]) -> String {
    let mut path = String::new();
    for (i, point) in points.iter().enumerate() {
        let x = layout.x_px(point.x);
        let y = layout.y_px(point.y);
        if i == 0 {
            path.push_str(&format!("M {:.1} {:.1}", x, y));
        } else {
            path.push_str(&format!(" L {:.1} {:.1}", x, y));
        }
    }
    path
}

fn symbol_element(symbol: Symbol, x: f64, y: f64, attrs: &str) -> String {
    match symbol {
        Symbol::Circle => format!(r#"<circle cx="{x:.1}" cy="{y:.1}" r="{DOT_RADIUS}" {attrs}>"#),
        Symbol::Square => {
            let side = DOT_RADIUS * 2.0;
            format!(
                r#"<rect x="{:.1}" y="{:.1}" width="{side}" height="{side}" {attrs}>"#,
                x - DOT_RADIUS,
                y - DOT_RADIUS
            )
        }
        Symbol::Diamond => {
            let r = DOT_RADIUS * 1.3;
            format!(
                r#"<polygon points="{:.1},{:.1} {:.1},{:.1} {:.1},{:.1} {:.1},{:.1}" {attrs}>"#,
                x,
                y - r,
                x + r,
                y,
                x,
                y + r,
                x - r,
                y
            )
        }
    }
}

fn close_tag(symbol: Symbol) -> &'static str {
    match symbol {
        Symbol::Circle => "</circle>",
        Symbol::Square => "</rect>",
        Symbol::Diamond => "</polygon>",
    }
}

fn push_linked(svg: &mut String, href: Option<&str>, element: &str) {
    match href {
        Some(href) => svg.push_str(&format!(
            r#"<a href="{}" target="_blank">{element}</a>"#,
            escape_xml(href)
        )),
        None => svg.push_str(element),
    }
}

/// Render a laid out chart as a standalone SVG document
pub fn render_svg(layout: &ChartLayout, marks: &[Mark]) -> String {
    let width = layout.options.width;
    let height = layout.options.height;
    let mut svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}" font-family="system-ui, sans-serif" font-size="10">"#
    );

    // Grid and y axis
    svg.push_str(r#"<g class="y-axis" fill="currentColor">"#);
    for (tick, label) in layout.y_labels() {
        let y = layout.y_px(tick);
        svg.push_str(&format!(
            r#"<line x1="{:.1}" x2="{:.1}" y1="{y:.1}" y2="{y:.1}" stroke="currentColor" stroke-opacity="0.1"/>"#,
            layout.left(),
            layout.right()
        ));
        svg.push_str(&format!(
            r#"<text x="{:.1}" y="{y:.1}" dy="0.32em" text-anchor="end">{}</text>"#,
            layout.left() - 6.0,
            escape_xml(&label)
        ));
    }
    svg.push_str(&format!(
        r#"<text x="0" y="{:.1}" text-anchor="start">{}</text></g>"#,
        layout.top() - 10.0,
        escape_xml(&layout.y_label())
    ));

    // X axis
    svg.push_str(r#"<g class="x-axis" fill="currentColor">"#);
    for (tick, label) in layout.x.ticks() {
        let x = layout.x_px(tick);
        svg.push_str(&format!(
            r#"<line x1="{x:.1}" x2="{x:.1}" y1="{:.1}" y2="{:.1}" stroke="currentColor" stroke-opacity="0.1"/>"#,
            layout.top(),
            layout.bottom()
        ));
        svg.push_str(&format!(
            r#"<text x="{x:.1}" y="{:.1}" dy="0.71em" text-anchor="middle">{}</text>"#,
            layout.bottom() + 6.0,
            escape_xml(&label)
        ));
    }
    svg.push_str(&format!(
        r#"<text x="{:.1}" y="{:.1}" text-anchor="end">{}</text></g>"#,
        layout.right(),
        height - 4.0,
        escape_xml(layout.x_label())
    ));

    for mark in marks {
        match mark {
            Mark::Line { stroke, segments, .. } => {
                let dash = stroke
                    .dash
                    .map(|dash| format!(r#" stroke-dasharray="{dash}""#))
                    .unwrap_or_default();
                for segment in segments {
                    svg.push_str(&format!(
                        r#"<path d="{}" fill="none" stroke="{}" stroke-width="{}" stroke-opacity="{}"{dash}/>"#,
                        segment_path(layout, segment),
                        stroke.color,
                        stroke.width,
                        stroke.opacity
                    ));
                }
            }
            Mark::Dot { symbol, stroke, data, .. } => {
                let attrs = format!(
                    r#"fill="{0}" stroke="{0}" fill-opacity="{1}" stroke-opacity="{1}""#,
                    stroke.color, stroke.opacity
                );
                for datum in data {
                    let element = format!(
                        "{}<title>{}</title>{}",
                        symbol_element(*symbol, layout.x_px(datum.x), layout.y_px(datum.y), &attrs),
                        escape_xml(&datum.title),
                        close_tag(*symbol)
                    );
                    push_linked(&mut svg, datum.href.as_deref(), &element);
                }
            }
            Mark::Image { glyph, width, data, .. } => {
                for datum in data {
                    let element = format!(
                        r#"<image href="{}" x="{:.1}" y="{:.1}" width="{width}" height="{width}"><title>{}</title></image>"#,
                        glyph.src(),
                        layout.x_px(datum.x) - width / 2.0,
                        layout.y_px(datum.y) - width / 2.0,
                        escape_xml(&datum.title)
                    );
                    push_linked(&mut svg, datum.href.as_deref(), &element);
                }
            }
        }
    }

    svg.push_str("</svg>");
    svg
}
