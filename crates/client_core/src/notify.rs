//! User-facing acknowledgements ("toasts") for mutations that succeeded.

use tokio::sync::broadcast;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
}

#[derive(Clone)]
pub struct Notifier {
    tx: broadcast::Sender<Notification>,
}

impl Notifier {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(64);
        Self { tx }
    }

    pub fn success(&self, title: impl Into<String>) {
        // No subscriber just means nobody is showing toasts.
        let _ = self.tx.send(Notification {
            title: title.into(),
        });
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.tx.subscribe()
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

pub fn project_created(name: &str) -> String {
    format!("Le projet {name} a été créé avec succès")
}

pub fn project_moved(name: &str) -> String {
    format!("Le projet {name} a été déplacé avec succès")
}

pub fn speaker_moved(name: &str) -> String {
    format!("{name} a été déplacée avec succès")
}

pub fn office_created(name: &str) -> String {
    format!("Le bureau {name} a été créé avec succès")
}

pub fn office_deleted() -> String {
    "Le bureau a été supprimé".to_string()
}

pub fn presence_added(office: &str, day: &str) -> String {
    format!("Présence ajoutée : {office}, {day}")
}

pub fn presence_removed(office: &str, day: &str) -> String {
    format!("Présence retirée : {office}, {day}")
}

pub fn presences_cleared() -> String {
    "Les présences de tous les bureaux ont été supprimées".to_string()
}
