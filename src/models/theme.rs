//! Day/night theme mode.

use std::fmt;

/// The two display themes. Night is the default when nothing is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    Day,
    #[default]
    Night,
}

impl Theme {
    /// Value persisted in the state store (`day` / `night`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Day => "day",
            Theme::Night => "night",
        }
    }

    /// Parse a persisted value. Anything unrecognized falls back to night.
    pub fn from_stored(value: Option<&str>) -> Self {
        match value {
            Some("day") => Theme::Day,
            _ => Theme::Night,
        }
    }

    /// Capitalized name for the status line.
    pub fn display_name(&self) -> &'static str {
        match self {
            Theme::Day => "Day",
            Theme::Night => "Night",
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            Theme::Day => Theme::Night,
            Theme::Night => Theme::Day,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_stored_defaults_to_night() {
        assert_eq!(Theme::from_stored(None), Theme::Night);
        assert_eq!(Theme::from_stored(Some("sepia")), Theme::Night);
        assert_eq!(Theme::from_stored(Some("day")), Theme::Day);
        assert_eq!(Theme::from_stored(Some("night")), Theme::Night);
    }

    #[test]
    fn test_toggle_round_trip() {
        assert_eq!(Theme::Day.toggled(), Theme::Night);
        assert_eq!(Theme::Night.toggled().toggled(), Theme::Night);
    }
}
