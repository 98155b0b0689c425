use serde::{Deserialize, Serialize};

/// The seven days a schedule covers, in display and record order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Weekday {
    Monday,
    Tues,
    Wed,
    Thur,
    Fri,
    Sat,
    Sun,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Self::Monday,
        Self::Tues,
        Self::Wed,
        Self::Thur,
        Self::Fri,
        Self::Sat,
        Self::Sun,
    ];

    /// Canonical label used in record files, reports and cards.
    pub fn as_label(&self) -> &'static str {
        match self {
            Self::Monday => "Monday",
            Self::Tues => "Tues",
            Self::Wed => "Wed",
            Self::Thur => "Thur",
            Self::Fri => "Fri",
            Self::Sat => "Sat",
            Self::Sun => "Sun",
        }
    }

    pub fn from_label(s: &str) -> Option<Self> {
        match s {
            "Monday" => Some(Self::Monday),
            "Tues" => Some(Self::Tues),
            "Wed" => Some(Self::Wed),
            "Thur" => Some(Self::Thur),
            "Fri" => Some(Self::Fri),
            "Sat" => Some(Self::Sat),
            "Sun" => Some(Self::Sun),
            _ => None,
        }
    }

    pub fn default_study_time(&self) -> &'static str {
        match self {
            Self::Sun => "12:00-2:00",
            _ => "11:00-3:00",
        }
    }

    /// Accent color for this day's HTML card.
    pub fn card_color(&self) -> &'static str {
        match self {
            Self::Monday => "#3b82f6",
            Self::Tues => "#8b5cf6",
            Self::Wed => "#10b981",
            Self::Thur => "#f59e0b",
            Self::Fri => "#ef4444",
            Self::Sat => "#6366f1",
            Self::Sun => "#ec4899",
        }
    }

    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl std::fmt::Display for Weekday {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_label())
    }
}
