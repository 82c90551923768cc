//! Process-wide storage: the append-only incident store, the user
//! directory, and the seeded public alert feed.
//!
//! The incident store sits behind a trait so the orchestrator never learns
//! which engine backs it; the in-memory implementation serializes appends
//! with a write lock. Readers may observe pre- or post-append state of an
//! in-flight write, never a partially-constructed record.

use chrono::{Duration, Utc};
use nereus_core::{Alert, AlertSeverity, Incident, User};
use std::sync::RwLock;
use thiserror::Error;
use uuid::Uuid;

// ============================================================================
// Incident Store
// ============================================================================

pub trait IncidentStore: Send + Sync {
    /// Append one incident, assigning an id if the draft carries none.
    /// No update or delete: incidents are immutable once stored.
    fn append(&self, incident: Incident) -> Incident;

    /// All incidents owned by `owner_id`, newest first.
    fn list_by_owner(&self, owner_id: &str) -> Vec<Incident>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Default)]
pub struct MemoryStore {
    incidents: RwLock<Vec<Incident>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IncidentStore for MemoryStore {
    fn append(&self, mut incident: Incident) -> Incident {
        if incident.id.is_empty() {
            incident.id = Uuid::new_v4().to_string();
        }
        self.incidents.write().unwrap().push(incident.clone());
        incident
    }

    fn list_by_owner(&self, owner_id: &str) -> Vec<Incident> {
        let mut items: Vec<Incident> = self
            .incidents
            .read()
            .unwrap()
            .iter()
            .filter(|i| i.owner_id == owner_id)
            .cloned()
            .collect();
        items.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
        items
    }

    fn len(&self) -> usize {
        self.incidents.read().unwrap().len()
    }
}

// ============================================================================
// User Directory
// ============================================================================

#[derive(Debug, Error)]
pub enum RegisterError {
    #[error("Email already registered")]
    EmailTaken,
}

pub struct UserDirectory {
    users: RwLock<Vec<User>>,
}

impl UserDirectory {
    /// Starts with the demo account the original fixtures ship.
    pub fn with_demo_user() -> Self {
        Self {
            users: RwLock::new(vec![User::new(
                "u_demo",
                "Demo User",
                "demo@nereus.app",
                "demo123",
            )]),
        }
    }

    pub fn empty() -> Self {
        Self {
            users: RwLock::new(Vec::new()),
        }
    }

    pub fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<User, RegisterError> {
        let mut users = self.users.write().unwrap();
        if users.iter().any(|u| u.email == email) {
            return Err(RegisterError::EmailTaken);
        }
        let user = User::new(format!("u_{}", users.len() + 1), name, email, password);
        users.push(user.clone());
        Ok(user)
    }

    pub fn authenticate(&self, email: &str, password: &str) -> Option<User> {
        self.users
            .read()
            .unwrap()
            .iter()
            .find(|u| u.email == email && u.verify_password(password))
            .cloned()
    }
}

// ============================================================================
// Alert Feed
// ============================================================================

/// Startup advisories for the public feed, mirroring the original fixtures.
pub fn seed_alerts() -> Vec<Alert> {
    let now = Utc::now();
    vec![
        Alert {
            id: Uuid::new_v4().to_string(),
            title: "High Tide Advisory".to_string(),
            description: "Tide expected +0.9m above MSL near Marine Drive.".to_string(),
            location: "Mumbai, IN".to_string(),
            severity: AlertSeverity::Moderate,
            timestamp: now - Duration::minutes(30),
        },
        Alert {
            id: Uuid::new_v4().to_string(),
            title: "Storm Surge Risk".to_string(),
            description: "IMD bulletin indicates possible surge in next 12h.".to_string(),
            location: "Kolkata, IN".to_string(),
            severity: AlertSeverity::High,
            timestamp: now - Duration::minutes(90),
        },
        Alert {
            id: Uuid::new_v4().to_string(),
            title: "Algal Bloom Watch".to_string(),
            description: "Chlorophyll-a spike detected in satellite pass.".to_string(),
            location: "Panaji, IN".to_string(),
            severity: AlertSeverity::Low,
            timestamp: now - Duration::minutes(180),
        },
    ]
}
