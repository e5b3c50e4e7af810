use owo_colors::Style;
use std::sync::OnceLock;

static THEME: OnceLock<Theme> = OnceLock::new();

/// Styles for human-readable CLI output.
#[derive(Debug, Clone)]
pub struct Theme {
    pub header: Style,
    pub found: Style,
    pub missing: Style,
    pub warn: Style,
    pub label: Style,
    pub dim: Style,
}

impl Theme {
    /// Colors only when stdout is a terminal and colors are not disabled
    /// (`NO_COLOR`, `CLICOLOR=0`).
    pub fn detect() -> Self {
        if console::Term::stdout().is_term() && console::colors_enabled() {
            Self::colored()
        } else {
            Self::plain()
        }
    }

    pub fn colored() -> Self {
        Self {
            header: Style::new().cyan().bold(),
            found: Style::new().green().bold(),
            missing: Style::new().red().bold(),
            warn: Style::new().yellow().bold(),
            label: Style::new().magenta(),
            dim: Style::new().white().dimmed(),
        }
    }

    pub fn plain() -> Self {
        Self {
            header: Style::new(),
            found: Style::new(),
            missing: Style::new(),
            warn: Style::new(),
            label: Style::new(),
            dim: Style::new(),
        }
    }
}

pub fn theme() -> &'static Theme {
    THEME.get_or_init(Theme::detect)
}
