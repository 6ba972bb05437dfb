use owo_colors::{OwoColorize, Style};
use std::sync::OnceLock;

static THEME: OnceLock<Theme> = OnceLock::new();

/// Width of the widest detail label ("Street")
const LABEL_WIDTH: usize = 6;

/// Styles and layout for contact screens
#[derive(Debug, Clone)]
pub struct Theme {
    pub title: Style,
    pub done: Style,
    pub failed: Style,
    pub caution: Style,
    pub field_label: Style,
    pub locator: Style,
    /// Detail labels are padded to this many columns so values line up
    pub label_width: usize,
}

impl Theme {
    /// Pick colors for stdout
    pub fn detect() -> Self {
        Self::for_terminal(console::Term::stdout().is_term(), console::colors_enabled())
    }

    /// Colored only when writing to a terminal with colors enabled
    pub fn for_terminal(is_term: bool, colors: bool) -> Self {
        let pick = |style: Style| if is_term && colors { style } else { Style::new() };
        Self {
            title: pick(Style::new().cyan().bold()),
            done: pick(Style::new().green().bold()),
            failed: pick(Style::new().red().bold()),
            caution: pick(Style::new().yellow().bold()),
            field_label: pick(Style::new().white().dimmed()),
            locator: pick(Style::new().bright_black()),
            label_width: LABEL_WIDTH,
        }
    }

    /// A detail label padded to `label_width`, then styled
    pub fn label(&self, text: &str) -> String {
        let padded = format!("{:<width$}", text, width = self.label_width);
        padded.style(self.field_label.clone()).to_string()
    }

    /// Apply `style` to `text`
    pub fn paint(&self, style: &Style, text: &str) -> String {
        text.style(style.clone()).to_string()
    }
}

pub fn theme() -> &'static Theme {
    THEME.get_or_init(Theme::detect)
}
