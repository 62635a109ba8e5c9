use owo_colors::Style;
use std::sync::OnceLock;

static THEME: OnceLock<Theme> = OnceLock::new();

/// Distances below this read as a strong match
const STRONG_MATCH_DISTANCE: f64 = 0.3;
/// Distances below this read as a fair match
const FAIR_MATCH_DISTANCE: f64 = 0.5;

/// How close a search hit is to the query, bucketed by cosine distance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStrength {
    Strong,
    Fair,
    Weak,
}

impl MatchStrength {
    pub fn from_distance(distance: f64) -> Self {
        if distance < STRONG_MATCH_DISTANCE {
            Self::Strong
        } else if distance < FAIR_MATCH_DISTANCE {
            Self::Fair
        } else {
            Self::Weak
        }
    }
}

#[derive(Debug, Clone)]
pub struct Theme {
    pub header: Style,
    pub success: Style,
    pub error: Style,
    pub warn: Style,
    /// Labels and file names next to results
    pub label: Style,
    /// Full document paths
    pub path: Style,
    pub strong_match: Style,
    pub fair_match: Style,
    pub weak_match: Style,
}

impl Theme {
    /// Colors only when stdout is a terminal
    pub fn detect() -> Self {
        if !console::Term::stdout().is_term() {
            return Self::plain();
        }
        Self::colored()
    }

    pub fn colored() -> Self {
        Self {
            header: Style::new().cyan().bold(),
            success: Style::new().green().bold(),
            error: Style::new().red().bold(),
            warn: Style::new().yellow().bold(),
            label: Style::new().white().dimmed(),
            path: Style::new().blue().underline(),
            strong_match: Style::new().green(),
            fair_match: Style::new().yellow(),
            weak_match: Style::new().bright_black(),
        }
    }

    pub fn plain() -> Self {
        Self {
            header: Style::new(),
            success: Style::new(),
            error: Style::new(),
            warn: Style::new(),
            label: Style::new(),
            path: Style::new(),
            strong_match: Style::new(),
            fair_match: Style::new(),
            weak_match: Style::new(),
        }
    }

    /// Style for a result at `distance` from the query
    pub fn for_distance(&self, distance: f64) -> &Style {
        match MatchStrength::from_distance(distance) {
            MatchStrength::Strong => &self.strong_match,
            MatchStrength::Fair => &self.fair_match,
            MatchStrength::Weak => &self.weak_match,
        }
    }
}

pub fn theme() -> &'static Theme {
    THEME.get_or_init(Theme::detect)
}
