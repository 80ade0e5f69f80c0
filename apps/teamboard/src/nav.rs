//! Route table and the stand-up navigation bar. No business state lives here.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use url::{ParseError, Url};

pub const STANDUP: &str = "/standup";
pub const STANDUP_GOALS: &str = "/standup/goals";
pub const STANDUP_SPEAKING: &str = "/standup/speaking";
pub const STANDUP_THANKS: &str = "/standup/thanks";
pub const OFFICES: &str = "/offices";
pub const CRA: &str = "/cra";

pub const ROUTES: [&str; 6] = [
    STANDUP,
    STANDUP_GOALS,
    STANDUP_SPEAKING,
    STANDUP_THANKS,
    OFFICES,
    CRA,
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavLink {
    pub label: &'static str,
    pub route: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StandupNav {
    pub links: Vec<NavLink>,
    pub date_label: String,
    pub meet_url: Url,
}

impl StandupNav {
    pub fn new(today: NaiveDate, meet_url: &str) -> Result<Self> {
        Ok(Self {
            links: vec![
                NavLink {
                    label: "Objectifs",
                    route: STANDUP_GOALS,
                },
                NavLink {
                    label: "Stand-up",
                    route: STANDUP_SPEAKING,
                },
                NavLink {
                    label: "Remerciements",
                    route: STANDUP_THANKS,
                },
            ],
            date_label: long_date(today),
            meet_url: format_external_url(meet_url)?,
        })
    }
}

pub fn offices_links() -> Vec<NavLink> {
    vec![
        NavLink {
            label: "Stand-up",
            route: STANDUP,
        },
        NavLink {
            label: "Bureaux",
            route: OFFICES,
        },
        NavLink {
            label: "CRA",
            route: CRA,
        },
    ]
}

/// e.g. `October 18, 2026`.
pub fn long_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

/// Absolute URL for an external link; a missing scheme becomes `https://`.
pub fn format_external_url(raw: &str) -> Result<Url> {
    let raw = raw.trim();
    let parsed = match Url::parse(raw) {
        Err(ParseError::RelativeUrlWithoutBase) => {
            Url::parse(&format!("https://{}", raw.trim_start_matches('/')))
        }
        parsed => parsed,
    };
    parsed.with_context(|| format!("invalid external url: {raw}"))
}

#[cfg(test)]
#[path = "tests/nav_tests.rs"]
mod tests;
