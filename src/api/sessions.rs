//! In-memory API sessions with idle expiry and a size cap

use std::collections::HashMap;
use std::time::{Duration, Instant};

use rand::RngExt;
use tracing::debug;

use crate::session::TripSession;

struct Entry {
    session: TripSession,
    last_used: Instant,
}

/// Sessions keyed by a random id. Idle entries are dropped on every access;
/// when full, opening a session drops the least recently used one.
pub struct SessionRegistry {
    entries: HashMap<String, Entry>,
    ttl: Duration,
    capacity: usize,
}

impl SessionRegistry {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
            capacity: capacity.max(1),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn open(&mut self, now: Instant) -> String {
        self.evict_idle(now);

        while self.entries.len() >= self.capacity {
            let Some(oldest) = self
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.last_used)
                .map(|(id, _)| id.clone())
            else {
                break;
            };
            debug!("Dropping least recently used session {}", oldest);
            self.entries.remove(&oldest);
        }

        let id = format!("{:032x}", rand::rng().random::<u128>());
        self.entries.insert(
            id.clone(),
            Entry {
                session: TripSession::new(),
                last_used: now,
            },
        );
        id
    }

    /// The live session for `id`, marked as used at `now`
    pub fn get_mut(&mut self, id: &str, now: Instant) -> Option<&mut TripSession> {
        self.evict_idle(now);
        let entry = self.entries.get_mut(id)?;
        entry.last_used = now;
        Some(&mut entry.session)
    }

    pub fn remove(&mut self, id: &str) -> bool {
        self.entries.remove(id).is_some()
    }

    fn evict_idle(&mut self, now: Instant) {
        let ttl = self.ttl;
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| now.saturating_duration_since(entry.last_used) < ttl);

        let expired = before - self.entries.len();
        if expired > 0 {
            debug!("Expired {} idle sessions", expired);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RouteSummary;

    const TTL: Duration = Duration::from_secs(60);

    #[test]
    fn test_open_and_touch() {
        let start = Instant::now();
        let mut registry = SessionRegistry::new(TTL, 10);
        let id = registry.open(start);

        let session = registry.get_mut(&id, start + Duration::from_secs(30)).unwrap();
        session.update(RouteSummary {
            distance_km: 15,
            duration_min: 30,
            waypoints: Vec::new(),
        });

        // Last use was at +30s, so +80s is still within the idle window
        let session = registry.get_mut(&id, start + Duration::from_secs(80)).unwrap();
        assert!(session.route_available());
    }

    #[test]
    fn test_idle_session_expires() {
        let start = Instant::now();
        let mut registry = SessionRegistry::new(TTL, 10);
        let id = registry.open(start);

        assert!(registry.get_mut(&id, start + TTL).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_opening_expires_idle_sessions() {
        let start = Instant::now();
        let mut registry = SessionRegistry::new(TTL, 10);
        for _ in 0..5 {
            registry.open(start);
        }

        registry.open(start + TTL + Duration::from_secs(1));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_capacity_drops_least_recently_used() {
        let start = Instant::now();
        let mut registry = SessionRegistry::new(TTL, 2);
        let first = registry.open(start);
        let second = registry.open(start + Duration::from_secs(1));
        registry.get_mut(&first, start + Duration::from_secs(2)).unwrap();

        let third = registry.open(start + Duration::from_secs(3));

        assert_eq!(registry.len(), 2);
        let now = start + Duration::from_secs(4);
        assert!(registry.get_mut(&second, now).is_none());
        assert!(registry.get_mut(&first, now).is_some());
        assert!(registry.get_mut(&third, now).is_some());
    }

    #[test]
    fn test_remove() {
        let start = Instant::now();
        let mut registry = SessionRegistry::new(TTL, 10);
        let id = registry.open(start);

        assert!(registry.remove(&id));
        assert!(!registry.remove(&id));
        assert!(registry.get_mut(&id, start).is_none());
    }
}
