use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::window::DrawWindow;

/// Which list a drawn registrant lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrawCategory {
    Winner,
    Reserve,
}

impl DrawCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Winner => "winner",
            Self::Reserve => "reserve",
        }
    }
}

impl fmt::Display for DrawCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DrawCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "winner" => Ok(Self::Winner),
            "reserve" => Ok(Self::Reserve),
            other => Err(format!("Unknown draw category: {}", other)),
        }
    }
}

/// A persisted winner or reserve entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawResult {
    pub id: i64,
    pub student_id: String,
    pub first_name: String,
    pub last_name: String,
    pub draw_window: DrawWindow,
    pub category: DrawCategory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDrawResult {
    pub student_id: String,
    pub first_name: String,
    pub last_name: String,
    pub draw_window: DrawWindow,
    pub category: DrawCategory,
}

/// Upper bounds on the number of winners and reserves per window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawCaps {
    pub winners: usize,
    pub reserves: usize,
}

impl Default for DrawCaps {
    fn default() -> Self {
        Self {
            winners: 15,
            reserves: 10,
        }
    }
}

/// Positions in a registration pool picked by a draw.
///
/// Indices refer to the pool slice handed to the selector, so two registrants
/// with identical details are still distinct entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrawSelection {
    pub winners: Vec<usize>,
    pub reserves: Vec<usize>,
}

/// What a draw attempt did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DrawOutcome {
    /// Nothing registered for the window.
    NoRegistrations { window: DrawWindow },
    /// The window's cutoff has not passed yet.
    WindowOpen { window: DrawWindow },
    /// Results already exist for the window.
    AlreadyDrawn { window: DrawWindow },
    /// This call ran the draw.
    Drawn(DrawSummary),
}

impl DrawOutcome {
    pub fn window(&self) -> DrawWindow {
        match self {
            Self::NoRegistrations { window }
            | Self::WindowOpen { window }
            | Self::AlreadyDrawn { window } => *window,
            Self::Drawn(summary) => summary.window,
        }
    }

    pub fn is_drawn(&self) -> bool {
        matches!(self, Self::Drawn(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DrawSummary {
    pub window: DrawWindow,
    pub winners: Vec<DrawResult>,
    pub reserves: Vec<DrawResult>,
    /// Registrants dropped without being selected.
    pub discarded: usize,
}
