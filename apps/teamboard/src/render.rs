//! Plain-text presentation of the view-models.

use std::fmt::Write as _;

use client_core::{Board, FeedState, Notification, PresenceBoard};
use shared::domain::{OfficeWorker, Project, Slice, Speaker};

use crate::nav::{NavLink, StandupNav};

const EMPTY_SLOT: &str = "-";

fn names(workers: &[OfficeWorker]) -> String {
    if workers.is_empty() {
        return EMPTY_SLOT.to_string();
    }
    workers
        .iter()
        .map(|worker| worker.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn presence(board: &PresenceBoard) -> String {
    let mut out = String::new();
    if board.is_empty() {
        out.push_str("Aucun bureau n'est créé\n");
        out.push_str("  teamboard offices add <nom>\n");
        return out;
    }

    let offices = board
        .offices
        .iter()
        .map(|(id, name)| format!("{name} [{id}]"))
        .collect::<Vec<_>>()
        .join(", ");
    let _ = writeln!(out, "Liste des bureaux : {offices}");

    for day in &board.days {
        let _ = writeln!(out, "\n== {} ==", day.day);
        for office in &day.offices {
            let _ = writeln!(out, "{} ({})", office.office_name, office.headcount);
            for slice in Slice::ALL {
                let _ = writeln!(
                    out,
                    "  {:<11} {}",
                    slice.title(),
                    names(office.slices.slice(slice))
                );
            }
        }
    }
    out
}

fn speaker_lines(out: &mut String, speakers: &[Speaker]) {
    if speakers.is_empty() {
        let _ = writeln!(out, "    {EMPTY_SLOT}");
    }
    for (slot, speaker) in speakers.iter().enumerate() {
        let _ = writeln!(out, "    {slot}. {} [{}]", speaker.name, speaker.id);
    }
}

/// Columns in display order, then the pinned absents column.
pub fn board(projects: &[Project], speakers: &FeedState<Vec<Speaker>>) -> String {
    let mut out = String::new();
    let loaded: &[Speaker] = speakers.ready().map(Vec::as_slice).unwrap_or_default();
    let board = Board::new(projects, loaded);

    let status = match speakers {
        FeedState::Loading => Some("(chargement...)".to_string()),
        FeedState::Failed(err) => Some(format!("(erreur : {err})")),
        FeedState::Ready(_) => None,
    };

    if board.columns().is_empty() {
        out.push_str("Aucun projet\n");
        out.push_str("  teamboard standup add-project <nom>\n");
        return out;
    }

    for (position, column) in board.project_columns() {
        let project = &column.project;
        let _ = writeln!(out, "[{position}] {} ({})", project.name, project.id);
        match &status {
            Some(status) => {
                let _ = writeln!(out, "    {status}");
            }
            None => speaker_lines(&mut out, &column.speakers),
        }
    }

    if let Some(absents) = board.absents() {
        let _ = writeln!(out, "\n--- {} ({}) ---", absents.project.name, absents.project.id);
        match &status {
            Some(status) => {
                let _ = writeln!(out, "    {status}");
            }
            None => speaker_lines(&mut out, &absents.speakers),
        }
    }
    out
}

fn link_bar(links: &[NavLink]) -> String {
    links
        .iter()
        .map(|link| format!("{} <{}>", link.label, link.route))
        .collect::<Vec<_>>()
        .join("  |  ")
}

pub fn standup_nav(nav: &StandupNav) -> String {
    format!(
        "{}    {}    Meet: {}\n",
        link_bar(&nav.links),
        nav.date_label,
        nav.meet_url
    )
}

pub fn offices_nav(links: &[NavLink]) -> String {
    format!("{}\n", link_bar(links))
}

pub fn notification(notification: &Notification) -> String {
    format!("[ok] {}", notification.title)
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
