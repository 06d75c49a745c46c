//! Dioxus-based perf panel for perf-console
//!
//! A pure Rust frontend that compiles to WebAssembly.
//! 100% Rust - no manually written JS/TS/CSS.
//! All styling is inline in Rust code.
//!
//! The query lives in the browser location: every selection is written back
//! to the URL, so the page can be shared or reloaded as is. The panel is
//! mounted at `/perf/{slug}`, `/perf/{slug}/embed` or
//! `/console/projects/{slug}/perf`.

use dioxus::prelude::*;
use perf_console_core::chart::{hit_test, segment_path, PointerEvent as ChartPointer, DOT_RADIUS};
use perf_console_core::key::KeyEntry;
use perf_console_core::marks::{Datum, Stroke, Symbol};
use perf_console_core::query::{Dimension, QueryKey};
use perf_console_core::{
    ChartLayout, ChartOptions, DimensionBrowser, FetchContext, JsonReport, LinkContext, Mark,
    PanelState, PerfFetcher, PerfPipeline, PerfQuery, PerfTab, PlotKey, QueryState, Sanitized,
    TabRows, Toggle, TooltipState, XAxis,
};
use std::cell::RefCell;
use std::rc::Rc;

mod auth;
mod history;
mod styles;
mod transport;

use history::{HistoryStore, PageLocation};
use styles::*;
use transport::GlooTransport;

/// Global theme context - true = dark mode
#[derive(Clone, Copy)]
struct ThemeCtx(Signal<bool>);

const API_URL: &str = "https://api.bencher.dev";

struct Console {
    /// Token and project visibility, updated as data resolves
    context: FetchContext,
    state: QueryState<HistoryStore>,
    pipeline: PerfPipeline,
    /// Inputs of the last browser listing
    listing: Option<(PanelState, QueryKey)>,
    listings: u64,
}

/// Everything the panel shares between renders and spawned requests
#[derive(Clone)]
struct Session {
    location: PageLocation,
    fetcher: Rc<PerfFetcher<GlooTransport>>,
    console: Rc<RefCell<Console>>,
}

impl PartialEq for Session {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.console, &other.console)
    }
}

impl Session {
    fn from_window() -> Result<Self, String> {
        let store =
            HistoryStore::from_window().ok_or("Unable to read the browser location")?;
        let location = PageLocation::from_url(store.url())
            .ok_or_else(|| format!("Not a perf page: {}", store.url()))?;

        let links = if location.console {
            LinkContext::console(location.project_slug.as_str())
        } else {
            LinkContext::public(location.project_slug.as_str())
        }
        .with_back(Some(store.location()));
        let context = FetchContext::new(location.project_slug.as_str())
            .with_token(auth::stored_token())
            .console(location.console);
        let state = QueryState::new(store).map_err(|e| e.to_string())?;

        Ok(Self {
            location,
            fetcher: Rc::new(PerfFetcher::new(GlooTransport::new(API_URL))),
            console: Rc::new(RefCell::new(Console {
                context,
                state,
                pipeline: PerfPipeline::new(links, ChartOptions::default()),
                listing: None,
                listings: 0,
            })),
        })
    }
}

/// Apply a query change and publish the healed result
fn update(
    session: &Session,
    mut sanitized: Signal<Sanitized>,
    change: impl FnOnce(&mut QueryState<HistoryStore>),
) {
    let next = {
        let mut console = session.console.borrow_mut();
        change(&mut console.state);
        console.state.read()
    };
    sanitized.set(next);
}

fn main() {
    tracing_wasm::set_as_global_default();
    launch(App);
}

#[component]
fn App() -> Element {
    // Theme state - default to dark mode
    let dark_mode = use_signal(|| true);
    use_context_provider(|| ThemeCtx(dark_mode));

    let session = use_hook(Session::from_window);
    let dark = *dark_mode.read();
    let embed = session.as_ref().map_or(false, |s| s.location.embed);

    rsx! {
        div { style: "{app_style(dark)}",
            if !embed {
                Header {}
            }
            {match session {
                Ok(session) => rsx! { Panel { session: session } },
                Err(message) => rsx! { ErrorState { message: message } },
            }}
        }
    }
}

#[component]
fn Header() -> Element {
    let ThemeCtx(mut dark_mode) = use_context::<ThemeCtx>();
    let dark = *dark_mode.read();

    rsx! {
        header { style: "{header_style(dark)}",
            h1 { style: "{title_style(dark)}", "perf-console" }
            button {
                style: "{button_style(dark, false)}",
                onclick: move |_| {
                    let current = *dark_mode.read();
                    dark_mode.set(!current);
                },
                if dark { "☀ light" } else { "☾ dark" }
            }
        }
    }
}

#[component]
fn LoadingState() -> Element {
    let ThemeCtx(dark_mode) = use_context::<ThemeCtx>();
    let dark = *dark_mode.read();

    rsx! {
        div { style: "{loading_style(dark)}",
            "Loading..."
        }
    }
}

#[component]
fn ErrorState(message: String) -> Element {
    let ThemeCtx(dark_mode) = use_context::<ThemeCtx>();
    let dark = *dark_mode.read();

    rsx! {
        div { style: "{error_style(dark)}",
            strong { "Error: " }
            "{message}"
        }
    }
}

#[component]
fn EmptyState() -> Element {
    let ThemeCtx(dark_mode) = use_context::<ThemeCtx>();
    let dark = *dark_mode.read();

    rsx! {
        div { style: "{empty_style(dark)}",
            p { "No data found" }
            p { style: "{muted_style(dark)}", "Select a report, or a branch, testbed, benchmark and measure." }
        }
    }
}

/// A row interaction in the dimension browser
#[derive(Debug, Clone, PartialEq)]
enum BrowserAction {
    Tab(PerfTab),
    Check { index: usize, checked: bool },
    Page(u32),
    Search(String),
}

fn check_row(
    session: &Session,
    sanitized: Signal<Sanitized>,
    rows: &TabRows,
    tab: PerfTab,
    index: usize,
    checked: bool,
) {
    match rows {
        TabRows::Reports(reports) => {
            // Reports select, they never deselect
            let Some(report) = reports.get(index).map(|row| row.resource.clone()) else {
                return;
            };
            let Some(measure) = report.first_measure().map(str::to_string) else {
                tracing::warn!(report = %report.uuid, "Report has no measures");
                return;
            };
            update(session, sanitized, |state| {
                state.select_report(&report, &measure);
            });
        }
        TabRows::Measures(measures) => {
            let Some(uuid) = measures.get(index).map(|row| row.resource.uuid.clone()) else {
                return;
            };
            // A plot shows a single measure
            update(session, sanitized, |state| {
                if checked {
                    state.set_measure(&uuid);
                } else {
                    state.set_dimension(Dimension::Measures, &uuid, false);
                }
            });
        }
        TabRows::Dimensions(dimensions) => {
            let (Some(dimension), Some(uuid)) = (
                tab.dimension(),
                dimensions.get(index).map(|row| row.resource.uuid.clone()),
            ) else {
                return;
            };
            update(session, sanitized, |state| {
                state.set_dimension(dimension, &uuid, checked);
            });
        }
    }
}

#[component]
fn Panel(session: Session) -> Element {
    let ThemeCtx(dark_mode) = use_context::<ThemeCtx>();
    let dark = *dark_mode.read();

    let initial = session.clone();
    let mut sanitized = use_signal(move || initial.console.borrow_mut().state.read());
    // Bumped whenever the pipeline changes outside of the query
    let mut revision = use_signal(|| 0u64);
    let mut rows = use_signal(|| TabRows::empty(PerfTab::Reports));

    // Perf data, last resolved wins
    let data_session = session.clone();
    use_effect(move || {
        let query = sanitized.read().query.clone();
        let (context, key) = {
            let mut console = data_session.console.borrow_mut();
            let context = console.context.clone();
            let key = context.fetch_key(&query);
            if !console.pipeline.request(key.clone()) {
                return;
            }
            (context, key)
        };
        *revision.write() += 1;

        let session = data_session.clone();
        spawn(async move {
            let data = session.fetcher.fetch(&context, &query).await;
            let accepted = {
                let mut console = session.console.borrow_mut();
                console.context.observe(&data);
                console.pipeline.resolve(&key, data)
            };
            if accepted {
                *revision.write() += 1;
            }
        });
    });

    // Browser listing for the open tab
    let list_session = session.clone();
    use_effect(move || {
        let Sanitized { query, panel, .. } = sanitized.read().clone();
        let listing = (panel.clone(), query.fetch_key());
        let (context, generation) = {
            let mut console = list_session.console.borrow_mut();
            if console.listing.as_ref() == Some(&listing) {
                return;
            }
            console.listing = Some(listing);
            console.listings += 1;
            (console.context.clone(), console.listings)
        };

        let session = list_session.clone();
        spawn(async move {
            let browser = DimensionBrowser::new(&session.fetcher, &context)
                .embed(session.location.embed);
            let tab_rows = browser.tab(panel.tab, &panel, &query).await;
            if session.console.borrow().listings != generation {
                return;
            }

            if let TabRows::Reports(reports) = &tab_rows {
                let reports: Vec<JsonReport> =
                    reports.iter().map(|row| row.resource.clone()).collect();
                let selected = {
                    let mut console = session.console.borrow_mut();
                    console
                        .state
                        .auto_select_first_report(&reports)
                        .map(|_| console.state.read())
                };
                if let Some(next) = selected {
                    sanitized.set(next);
                }
            }
            rows.set(tab_rows);
        });
    });

    let on_toggle = {
        let session = session.clone();
        move |(toggle, on): (Toggle, bool)| {
            update(&session, sanitized, |state| {
                state.set_toggle(toggle, on);
            })
        }
    };
    let on_x_axis = {
        let session = session.clone();
        move |x_axis: XAxis| {
            update(&session, sanitized, |state| {
                state.set_x_axis(x_axis);
            })
        }
    };
    let on_clear = {
        let session = session.clone();
        move |_: ()| {
            update(&session, sanitized, |state| {
                state.clear_all();
            })
        }
    };
    let on_series = {
        let session = session.clone();
        move |index: usize| {
            session.console.borrow_mut().pipeline.toggle(index);
            *revision.write() += 1;
        }
    };
    let on_all_series = {
        let session = session.clone();
        move |_: ()| {
            session.console.borrow_mut().pipeline.toggle_all();
            *revision.write() += 1;
        }
    };
    let on_expand = {
        let session = session.clone();
        move |expanded: bool| {
            update(&session, sanitized, |state| {
                state.set_key(expanded);
            })
        }
    };
    let on_action = {
        let session = session.clone();
        move |action: BrowserAction| {
            let tab = sanitized.peek().panel.tab;
            match action {
                BrowserAction::Tab(tab) => update(&session, sanitized, |state| {
                    state.set_tab(tab);
                }),
                BrowserAction::Page(page) => update(&session, sanitized, |state| {
                    state.set_page(tab, page);
                }),
                BrowserAction::Search(text) => update(&session, sanitized, |state| {
                    state.set_search(tab, &text);
                }),
                BrowserAction::Check { index, checked } => {
                    let current = rows.peek().clone();
                    check_row(&session, sanitized, &current, tab, index, checked);
                }
            }
        }
    };

    let _revision = *revision.read();
    let Sanitized { query, panel, .. } = sanitized.read().clone();
    let (marks, layout, plot_key, loading, project) = {
        let mut console = session.console.borrow_mut();
        let marks = console
            .pipeline
            .plot(query.toggles, query.x_axis)
            .map(|(_, marks)| marks.to_vec())
            .unwrap_or_default();
        let layout = console.pipeline.layout(query.toggles, query.x_axis);
        (
            marks,
            layout,
            console.pipeline.plot_key(panel.key),
            console.pipeline.resource().is_loading(),
            console.pipeline.data().project.as_ref().map(|p| p.name.clone()),
        )
    };

    let embed = session.location.embed;
    let show_header = !embed || panel.embed.header;
    let show_key = (!embed || panel.embed.key) && !plot_key.entries.is_empty();
    let title = panel
        .embed
        .title
        .clone()
        .or(project)
        .unwrap_or_else(|| session.location.project_slug.clone());

    rsx! {
        div { style: "{panel_style()}",
            main { style: "{main_content_style(dark)}",
                div { style: "{chart_card_style(dark)}",
                    if show_header {
                        div { style: "{chart_header_style(dark)}",
                            span { style: "{chart_title_style(dark)}", "{title}" }
                            Toolbar {
                                query: query.clone(),
                                on_toggle: on_toggle,
                                on_x_axis: on_x_axis,
                                on_clear: on_clear
                            }
                        }
                    }

                    if let Some(layout) = layout {
                        PerfChart { layout: layout, marks: marks }
                    } else if loading {
                        LoadingState {}
                    } else {
                        EmptyState {}
                    }

                    if show_key {
                        PlotKeyView {
                            plot_key: plot_key,
                            on_toggle: on_series,
                            on_toggle_all: on_all_series,
                            on_expand: on_expand
                        }
                    }
                }
            }

            if !embed {
                Browser {
                    panel: panel.clone(),
                    rows: rows.read().clone(),
                    on_action: on_action
                }
            }
        }
    }
}

fn toggle_label(toggle: Toggle) -> &'static str {
    match toggle {
        Toggle::LowerValue => "Lower Value",
        Toggle::UpperValue => "Upper Value",
        Toggle::LowerBoundary => "Lower Boundary",
        Toggle::UpperBoundary => "Upper Boundary",
    }
}

#[component]
fn Toolbar(
    query: PerfQuery,
    on_toggle: EventHandler<(Toggle, bool)>,
    on_x_axis: EventHandler<XAxis>,
    on_clear: EventHandler<()>,
) -> Element {
    let ThemeCtx(dark_mode) = use_context::<ThemeCtx>();
    let dark = *dark_mode.read();
    let x_axis = query.x_axis;

    rsx! {
        button {
            style: "{button_style(dark, x_axis == XAxis::DateTime)}",
            onclick: move |_| on_x_axis.call(XAxis::DateTime),
            "Date and Time"
        }
        button {
            style: "{button_style(dark, x_axis == XAxis::Version)}",
            onclick: move |_| on_x_axis.call(XAxis::Version),
            "Version"
        }
        for toggle in Toggle::ALL {
            {
                let on = query.toggles.get(toggle);
                rsx! {
                    button {
                        key: "{toggle.param()}",
                        style: "{button_style(dark, on)}",
                        onclick: move |_| on_toggle.call((toggle, !on)),
                        "{toggle_label(toggle)}"
                    }
                }
            }
        }
        button {
            style: "{button_style(dark, false)}",
            onclick: move |_| on_clear.call(()),
            "Clear"
        }
    }
}

/// Scale a pointer position to chart units and find the datum under it
fn locate(
    layout: &ChartLayout,
    marks: &[Mark],
    div_width: f64,
    x: f64,
    y: f64,
) -> (f64, f64, Option<Datum>) {
    let scale = if div_width > 0.0 {
        layout.options.width / div_width
    } else {
        1.0
    };
    let (x, y) = (x * scale, y * scale);
    let hit = hit_test(layout, marks, x, y, DOT_RADIUS * 2.0).cloned();
    (x, y, hit)
}

fn open_link(href: &str) {
    let opened = web_sys::window().and_then(|w| w.open_with_url_and_target(href, "_blank").ok());
    if opened.is_none() {
        tracing::warn!(href = %href, "Unable to open link");
    }
}

fn symbol_view(symbol: Symbol, x: f64, y: f64, stroke: &Stroke) -> Element {
    let color = stroke.color;
    let opacity = stroke.opacity;
    match symbol {
        Symbol::Circle => rsx! {
            circle {
                cx: "{x:.1}", cy: "{y:.1}", r: "{DOT_RADIUS}",
                fill: "{color}", stroke: "{color}",
                "fill-opacity": "{opacity}", "stroke-opacity": "{opacity}"
            }
        },
        Symbol::Square => {
            let side = DOT_RADIUS * 2.0;
            rsx! {
                rect {
                    x: "{x - DOT_RADIUS:.1}", y: "{y - DOT_RADIUS:.1}",
                    width: "{side}", height: "{side}",
                    fill: "{color}", stroke: "{color}",
                    "fill-opacity": "{opacity}", "stroke-opacity": "{opacity}"
                }
            }
        }
        Symbol::Diamond => {
            let r = DOT_RADIUS * 1.3;
            let points = format!(
                "{x:.1},{:.1} {:.1},{y:.1} {x:.1},{:.1} {:.1},{y:.1}",
                y - r,
                x + r,
                y + r,
                x - r
            );
            rsx! {
                polygon {
                    points: "{points}",
                    fill: "{color}", stroke: "{color}",
                    "fill-opacity": "{opacity}", "stroke-opacity": "{opacity}"
                }
            }
        }
    }
}

fn mark_view(layout: &ChartLayout, mark: &Mark) -> Element {
    match mark {
        Mark::Line { stroke, segments, .. } => {
            let dash = stroke
                .dash
                .map(|dash| dash.to_string())
                .unwrap_or_else(|| "none".to_string());
            rsx! {
                for segment in segments.iter() {
                    path {
                        d: "{segment_path(layout, segment)}",
                        fill: "none",
                        stroke: "{stroke.color}",
                        "stroke-width": "{stroke.width}",
                        "stroke-opacity": "{stroke.opacity}",
                        "stroke-dasharray": "{dash}"
                    }
                }
            }
        }
        Mark::Dot { symbol, stroke, data, .. } => rsx! {
            for datum in data.iter() {
                {symbol_view(*symbol, layout.x_px(datum.x), layout.y_px(datum.y), stroke)}
            }
        },
        Mark::Image { glyph, width, data, .. } => rsx! {
            for datum in data.iter() {
                image {
                    "href": "{glyph.src()}",
                    "x": "{layout.x_px(datum.x) - width / 2.0:.1}",
                    "y": "{layout.y_px(datum.y) - width / 2.0:.1}",
                    "width": "{width}",
                    "height": "{width}"
                }
            }
        },
    }
}

/// Interactive chart with hover tooltips and click-through links
#[component]
fn PerfChart(layout: ChartLayout, marks: Vec<Mark>) -> Element {
    let ThemeCtx(dark_mode) = use_context::<ThemeCtx>();
    let dark = *dark_mode.read();

    let mut tooltip = use_signal(TooltipState::new);
    // Store the element width when mounted
    let mut chart_div_width = use_signal(|| 0.0f64);

    let width = layout.options.width;
    let height = layout.options.height;
    let grid_c = grid_color(dark);
    let axis_c = axis_color(dark);

    let (move_layout, move_marks) = (layout.clone(), marks.clone());
    let (up_layout, up_marks) = (layout.clone(), marks.clone());

    rsx! {
        div {
            style: "padding: 0.5rem; position: relative; cursor: crosshair;",
            onmounted: move |evt| {
                let mounted_data = evt.data().clone();
                spawn(async move {
                    if let Ok(rect) = mounted_data.get_client_rect().await {
                        chart_div_width.set(rect.width());
                    }
                });
            },
            onmouseleave: move |_| tooltip.write().handle(ChartPointer::Out, width),
            onmousemove: move |e| {
                let coords = e.data().element_coordinates();
                let (x, y, hit) = locate(&move_layout, &move_marks, *chart_div_width.read(), coords.x, coords.y);
                let title = hit.map(|datum| datum.title);
                tooltip.write().handle(ChartPointer::Move { x, y, title }, width);
            },
            onpointerup: move |e| {
                let coords = e.data().element_coordinates();
                let (x, y, hit) = locate(&up_layout, &up_marks, *chart_div_width.read(), coords.x, coords.y);
                if e.data().pointer_type() == "touch" {
                    let title = hit.map(|datum| datum.title);
                    tooltip.write().handle(ChartPointer::Tap { x, y, title }, width);
                } else if let Some(href) = hit.and_then(|datum| datum.href) {
                    open_link(&href);
                }
            },

            svg {
                style: "width: 100%; height: auto; pointer-events: none;",
                view_box: "0 0 {width} {height}",
                "preserveAspectRatio": "xMidYMid meet",
                "font-size": "10",

                for (tick, label) in layout.y_labels() {
                    {
                        let y = layout.y_px(tick);
                        rsx! {
                            line {
                                x1: "{layout.left():.1}", x2: "{layout.right():.1}",
                                y1: "{y:.1}", y2: "{y:.1}",
                                stroke: "{grid_c}", "stroke-width": "1"
                            }
                            text {
                                x: "{layout.left() - 6.0:.1}", y: "{y:.1}",
                                "dy": "0.32em", fill: "{axis_c}", "text-anchor": "end",
                                "{label}"
                            }
                        }
                    }
                }
                text {
                    x: "0", y: "{layout.top() - 10.0:.1}",
                    fill: "{axis_c}", "text-anchor": "start",
                    "{layout.y_label()}"
                }

                for (tick, label) in layout.x.ticks() {
                    {
                        let x = layout.x_px(tick);
                        rsx! {
                            line {
                                x1: "{x:.1}", x2: "{x:.1}",
                                y1: "{layout.top():.1}", y2: "{layout.bottom():.1}",
                                stroke: "{grid_c}", "stroke-width": "1"
                            }
                            text {
                                x: "{x:.1}", y: "{layout.bottom() + 6.0:.1}",
                                "dy": "0.71em", fill: "{axis_c}", "text-anchor": "middle",
                                "{label}"
                            }
                        }
                    }
                }
                text {
                    x: "{layout.right():.1}", y: "{height - 4.0:.1}",
                    fill: "{axis_c}", "text-anchor": "end",
                    "{layout.x_label()}"
                }

                for mark in marks.iter() {
                    {mark_view(&layout, mark)}
                }
            }

            if let Some(tip) = tooltip.read().current() {
                div {
                    style: "{hover_tooltip_style(dark)} left: {tip.x / width * 100.0:.2}%; top: {tip.y / height * 100.0:.2}%;",
                    "{tip.text}"
                }
            }
        }
    }
}

fn key_entry_view(entry: &KeyEntry, expanded: bool, on_toggle: EventHandler<usize>) -> Element {
    let index = entry.index;
    rsx! {
        div {
            key: "{index}",
            style: "{key_item_style(entry.active)}",
            title: "{entry.label()}",
            onclick: move |_| on_toggle.call(index),
            span { style: "{swatch_style(entry.color)}" }
            if expanded {
                span { "{entry.label()}" }
            }
        }
    }
}

#[component]
fn PlotKeyView(
    plot_key: PlotKey,
    on_toggle: EventHandler<usize>,
    on_toggle_all: EventHandler<()>,
    on_expand: EventHandler<bool>,
) -> Element {
    let ThemeCtx(dark_mode) = use_context::<ThemeCtx>();
    let dark = *dark_mode.read();
    let expanded = plot_key.expanded;

    rsx! {
        div { style: "{key_style(dark)}",
            button {
                style: "{button_style(dark, false)}",
                onclick: move |_| on_expand.call(!expanded),
                if expanded { "Minimize" } else { "Expand" }
            }
            button {
                style: "{button_style(dark, false)}",
                onclick: move |_| on_toggle_all.call(()),
                if plot_key.all_active() { "Hide all" } else { "Show all" }
            }
            for entry in plot_key.entries.iter() {
                {key_entry_view(entry, expanded, on_toggle)}
            }
        }
    }
}

fn tab_label(tab: PerfTab) -> &'static str {
    match tab {
        PerfTab::Reports => "Reports",
        PerfTab::Branches => "Branches",
        PerfTab::Testbeds => "Testbeds",
        PerfTab::Benchmarks => "Benchmarks",
        PerfTab::Measures => "Measures",
    }
}

/// Paginated, searchable listing of the open tab
#[component]
fn Browser(panel: PanelState, rows: TabRows, on_action: EventHandler<BrowserAction>) -> Element {
    let ThemeCtx(dark_mode) = use_context::<ThemeCtx>();
    let dark = *dark_mode.read();

    let tab = panel.tab;
    let pagination = panel.pagination(tab);
    let page = pagination.page;
    let has_next = rows.len() >= usize::from(pagination.per_page);
    let search = pagination.search.unwrap_or_default();
    let input_type = match tab {
        PerfTab::Reports | PerfTab::Measures => "radio",
        _ => "checkbox",
    };

    rsx! {
        aside { style: "{browser_style(dark)}",
            div { style: "{tab_strip_style(dark)}",
                for t in PerfTab::ALL {
                    button {
                        key: "{t}",
                        style: "{button_style(dark, t == tab)}",
                        onclick: move |_| on_action.call(BrowserAction::Tab(t)),
                        "{tab_label(t)}"
                    }
                }
            }

            div { style: "padding: 0.5rem;",
                input {
                    style: "{search_input_style(dark)}",
                    r#type: "search",
                    placeholder: "Search {tab}",
                    value: "{search}",
                    onchange: move |e| on_action.call(BrowserAction::Search(e.value())),
                }
            }

            div { style: "overflow-y: auto;",
                if rows.is_empty() {
                    div { style: "{empty_style(dark)}", "No {tab} found" }
                }
                for (index, (uuid, name, checked)) in rows.summary().into_iter().enumerate() {
                    label {
                        key: "{uuid}",
                        style: "{row_style(dark, checked)}",
                        input {
                            r#type: "{input_type}",
                            checked: checked,
                            onchange: move |_| on_action.call(BrowserAction::Check { index, checked: !checked }),
                        }
                        span { "{name}" }
                    }
                }
            }

            div { style: "{pager_style(dark)}",
                button {
                    style: "{button_style(dark, false)}",
                    disabled: page <= 1,
                    onclick: move |_| on_action.call(BrowserAction::Page(page.saturating_sub(1))),
                    "← Prev"
                }
                span { style: "{muted_style(dark)}", "Page {page}" }
                button {
                    style: "{button_style(dark, false)}",
                    disabled: !has_next,
                    onclick: move |_| on_action.call(BrowserAction::Page(page + 1)),
                    "Next →"
                }
            }
        }
    }
}
