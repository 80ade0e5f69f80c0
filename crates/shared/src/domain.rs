use std::{collections::BTreeMap, fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

id_newtype!(OfficeId);
id_newtype!(ProjectId);
id_newtype!(SpeakerId);

/// Name of the project record that backs the pinned absents column.
pub const ABSENTS_COLUMN_NAME: &str = "Absents";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Weekday {
    #[serde(rename = "LUNDI")]
    Monday,
    #[serde(rename = "MARDI")]
    Tuesday,
    #[serde(rename = "MERCREDI")]
    Wednesday,
    #[serde(rename = "JEUDI")]
    Thursday,
    #[serde(rename = "VENDREDI")]
    Friday,
}

impl Weekday {
    pub const ALL: [Weekday; 5] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
    ];

    /// Key used by the remote store and shown as the day heading.
    pub fn wire_name(self) -> &'static str {
        match self {
            Weekday::Monday => "LUNDI",
            Weekday::Tuesday => "MARDI",
            Weekday::Wednesday => "MERCREDI",
            Weekday::Thursday => "JEUDI",
            Weekday::Friday => "VENDREDI",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown weekday `{0}`")]
pub struct ParseWeekdayError(pub String);

impl FromStr for Weekday {
    type Err = ParseWeekdayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LUNDI" | "MONDAY" | "MON" => Ok(Weekday::Monday),
            "MARDI" | "TUESDAY" | "TUE" => Ok(Weekday::Tuesday),
            "MERCREDI" | "WEDNESDAY" | "WED" => Ok(Weekday::Wednesday),
            "JEUDI" | "THURSDAY" | "THU" => Ok(Weekday::Thursday),
            "VENDREDI" | "FRIDAY" | "FRI" => Ok(Weekday::Friday),
            _ => Err(ParseWeekdayError(s.to_string())),
        }
    }
}

/// Attendance subdivision of one weekday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slice {
    #[default]
    FullDay,
    Morning,
    Afternoon,
}

impl Slice {
    pub const ALL: [Slice; 3] = [Slice::FullDay, Slice::Morning, Slice::Afternoon];

    /// `(on_morning, on_afternoon)` flag pair stored for this slice.
    pub fn flags(self) -> (bool, bool) {
        match self {
            Slice::FullDay => (true, true),
            Slice::Morning => (true, false),
            Slice::Afternoon => (false, true),
        }
    }

    pub fn from_flags(on_morning: bool, on_afternoon: bool) -> Option<Self> {
        match (on_morning, on_afternoon) {
            (true, true) => Some(Slice::FullDay),
            (true, false) => Some(Slice::Morning),
            (false, true) => Some(Slice::Afternoon),
            (false, false) => None,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Slice::FullDay => "Journée",
            Slice::Morning => "Matin",
            Slice::Afternoon => "Après-midi",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfficeWorker {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    pub on_morning: bool,
    pub on_afternoon: bool,
}

impl OfficeWorker {
    pub fn new(name: impl Into<String>, photo_url: Option<String>, slice: Slice) -> Self {
        let (on_morning, on_afternoon) = slice.flags();
        Self {
            name: name.into(),
            photo_url,
            on_morning,
            on_afternoon,
        }
    }

    /// `None` for a `(false, false)` entry, which a well-formed store never holds.
    pub fn slice(&self) -> Option<Slice> {
        Slice::from_flags(self.on_morning, self.on_afternoon)
    }

    /// Identity used when toggling: name plus the exact flag pair.
    pub fn same_attendance(&self, other: &OfficeWorker) -> bool {
        self.name == other.name
            && self.on_morning == other.on_morning
            && self.on_afternoon == other.on_afternoon
    }
}

/// Weekday -> attendance list. Unknown weekdays read as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Presence(BTreeMap<Weekday, Vec<OfficeWorker>>);

impl Presence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn day(&self, day: Weekday) -> &[OfficeWorker] {
        self.0.get(&day).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn day_mut(&mut self, day: Weekday) -> &mut Vec<OfficeWorker> {
        self.0.entry(day).or_default()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.0.values().all(Vec::is_empty)
    }
}

impl FromIterator<(Weekday, Vec<OfficeWorker>)> for Presence {
    fn from_iter<T: IntoIterator<Item = (Weekday, Vec<OfficeWorker>)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Office {
    pub id: OfficeId,
    pub name: String,
    #[serde(default)]
    pub presence: Presence,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub index: i64,
}

impl Project {
    pub fn is_absents(&self) -> bool {
        self.name == ABSENTS_COLUMN_NAME
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Speaker {
    pub id: SpeakerId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<ProjectId>,
    #[serde(default)]
    pub is_absent: bool,
    #[serde(default)]
    pub index: i64,
}

/// Signed-in actor, as returned by the external user accessor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub username: String,
    pub photo_url: Option<String>,
}

#[cfg(test)]
#[path = "tests/domain_tests.rs"]
mod tests;
