//! Inline styles for the perf panel
//!
//! Every component asks for its style string with the current theme; there
//! are no stylesheets.

/// Theme colors
#[derive(Debug, Clone, Copy)]
struct Palette {
    page: &'static str,
    surface: &'static str,
    raised: &'static str,
    border: &'static str,
    text: &'static str,
    muted: &'static str,
    accent: &'static str,
    danger: &'static str,
}

const DARK: Palette = Palette {
    page: "#0d1117",
    surface: "#161b22",
    raised: "#21262d",
    border: "#30363d",
    text: "#c9d1d9",
    muted: "#6e7681",
    accent: "#1f6feb",
    danger: "#f85149",
};

const LIGHT: Palette = Palette {
    page: "#ffffff",
    surface: "#f6f8fa",
    raised: "#eaeef2",
    border: "#d0d7de",
    text: "#1a1a1a",
    muted: "#6e7681",
    accent: "#0969da",
    danger: "#cf222e",
};

fn palette(dark: bool) -> Palette {
    if dark {
        DARK
    } else {
        LIGHT
    }
}

const FONT_STACK: &str =
    "-apple-system, BlinkMacSystemFont, 'Segoe UI', 'Noto Sans', Helvetica, Arial, sans-serif";

pub fn app_style(dark: bool) -> String {
    let p = palette(dark);
    format!(
        "min-height: 100vh; display: flex; flex-direction: column; margin: 0; \
         font-family: {FONT_STACK}; font-size: 14px; line-height: 1.5; \
         background: {}; color: {};",
        p.page, p.text
    )
}

pub fn header_style(dark: bool) -> String {
    let p = palette(dark);
    format!(
        "display: flex; justify-content: space-between; align-items: center; \
         padding: 0.6rem 1rem; background: {}; border-bottom: 1px solid {};",
        p.surface, p.border
    )
}

pub fn title_style(_dark: bool) -> &'static str {
    "margin: 0; font-size: 1.1rem; font-weight: 600; letter-spacing: 0.02em;"
}

/// Toolbar and tab buttons, filled with the accent when active
pub fn button_style(dark: bool, active: bool) -> String {
    let p = palette(dark);
    let (bg, fg, border) = if active {
        (p.accent, "#ffffff", p.accent)
    } else {
        (p.raised, p.text, p.border)
    };
    format!(
        "padding: 0.3rem 0.7rem; border-radius: 6px; cursor: pointer; \
         font-family: inherit; font-size: 0.8rem; \
         background: {bg}; color: {fg}; border: 1px solid {border};"
    )
}

/// Plot and browser side by side
pub fn panel_style() -> &'static str {
    "display: flex; flex: 1; min-height: 0;"
}

pub fn main_content_style(_dark: bool) -> &'static str {
    "flex: 1; min-width: 0; padding: 1rem; overflow: auto;"
}

pub fn browser_style(dark: bool) -> String {
    let p = palette(dark);
    format!(
        "width: 320px; min-width: 320px; display: flex; flex-direction: column; \
         overflow: hidden; background: {}; border-left: 1px solid {};",
        p.surface, p.border
    )
}

pub fn tab_strip_style(dark: bool) -> String {
    format!(
        "display: flex; flex-wrap: wrap; gap: 0.25rem; padding: 0.5rem; \
         border-bottom: 1px solid {};",
        palette(dark).border
    )
}

pub fn search_input_style(dark: bool) -> String {
    let p = palette(dark);
    format!(
        "width: 100%; box-sizing: border-box; padding: 0.45rem 0.7rem; outline: none; \
         border-radius: 6px; font-family: inherit; font-size: 0.85rem; \
         background: {}; color: {}; border: 1px solid {};",
        p.page, p.text, p.border
    )
}

/// One listing row, marked on the left edge when checked
pub fn row_style(dark: bool, checked: bool) -> String {
    let p = palette(dark);
    let (bg, edge) = if checked {
        (p.raised, p.accent)
    } else {
        ("transparent", "transparent")
    };
    format!(
        "display: flex; align-items: center; gap: 0.5rem; padding: 0.4rem 0.75rem; \
         cursor: pointer; font-size: 0.85rem; background: {bg}; border-left: 3px solid {edge};"
    )
}

pub fn pager_style(dark: bool) -> String {
    format!(
        "display: flex; justify-content: space-between; align-items: center; \
         margin-top: auto; padding: 0.5rem 0.75rem; border-top: 1px solid {};",
        palette(dark).border
    )
}

pub fn chart_card_style(dark: bool) -> String {
    let p = palette(dark);
    format!(
        "margin-bottom: 1rem; border-radius: 8px; overflow: hidden; \
         background: {}; border: 1px solid {};",
        p.surface, p.border
    )
}

pub fn chart_header_style(dark: bool) -> String {
    let p = palette(dark);
    format!(
        "display: flex; flex-wrap: wrap; align-items: center; gap: 0.5rem; \
         padding: 0.6rem 1rem; background: {}; border-bottom: 1px solid {};",
        p.raised, p.border
    )
}

pub fn chart_title_style(dark: bool) -> String {
    format!(
        "margin-right: auto; font-size: 1rem; font-weight: 600; color: {};",
        palette(dark).text
    )
}

pub fn key_style(dark: bool) -> String {
    format!(
        "display: flex; flex-wrap: wrap; align-items: center; gap: 0.5rem 1.25rem; \
         padding: 0.6rem 1rem; font-size: 0.85rem; border-top: 1px solid {};",
        palette(dark).border
    )
}

/// Plot key entry, faded while its series is hidden
pub fn key_item_style(active: bool) -> String {
    let opacity = if active { 1.0 } else { 0.4 };
    format!("display: flex; align-items: center; gap: 0.4rem; cursor: pointer; opacity: {opacity};")
}

pub fn swatch_style(color: &str) -> String {
    format!("width: 12px; height: 12px; flex-shrink: 0; border-radius: 2px; background: {color};")
}

/// Positioned by the caller with `left`/`top`
pub fn hover_tooltip_style(dark: bool) -> String {
    let p = palette(dark);
    format!(
        "position: absolute; z-index: 100; pointer-events: none; white-space: pre; \
         padding: 0.5rem 0.75rem; border-radius: 6px; font-size: 0.8rem; \
         background: {}; color: {}; border: 1px solid {}; \
         box-shadow: 0 4px 12px rgba(0, 0, 0, 0.3);",
        p.surface, p.text, p.border
    )
}

pub fn muted_style(dark: bool) -> String {
    format!("color: {};", palette(dark).muted)
}

pub fn loading_style(dark: bool) -> String {
    format!("padding: 3rem 2rem; text-align: center; color: {};", palette(dark).muted)
}

pub fn error_style(dark: bool) -> String {
    format!(
        "margin: 1rem; padding: 1rem; border-radius: 8px; border: 1px solid {};",
        palette(dark).danger
    )
}

/// "No data found" placeholder, also used for empty listings
pub fn empty_style(_dark: bool) -> &'static str {
    "padding: 3rem 2rem; text-align: center; opacity: 0.7;"
}

pub fn grid_color(dark: bool) -> &'static str {
    palette(dark).raised
}

pub fn axis_color(dark: bool) -> &'static str {
    palette(dark).muted
}
