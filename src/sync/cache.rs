use std::collections::HashSet;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::api::ClassifiedMessage;

pub const CACHE_LIMIT: usize = 200;
pub const FRESHNESS_WINDOW: Duration = Duration::from_secs(6 * 60 * 60);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheRecord {
    // unix millis
    #[serde(rename = "cachedAt")]
    pub cached_at: u64,
    #[serde(default)]
    pub emails: Vec<ClassifiedMessage>,
}

impl CacheRecord {
    pub fn new(cached_at: u64, emails: Vec<ClassifiedMessage>) -> Self {
        Self { cached_at, emails }
    }

    pub fn stamped(now: SystemTime, emails: Vec<ClassifiedMessage>) -> Self {
        Self::new(unix_millis(now), emails)
    }

    pub fn is_fresh(&self, now: SystemTime, window: Duration) -> bool {
        let age = unix_millis(now).saturating_sub(self.cached_at);
        u128::from(age) <= window.as_millis()
    }
}

pub fn unix_millis(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH)
        .map(|elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}

pub fn merge(
    fresh: Vec<ClassifiedMessage>,
    known: Vec<ClassifiedMessage>,
    limit: usize,
) -> Vec<ClassifiedMessage> {
    let mut seen = HashSet::new();
    let mut merged = Vec::with_capacity((fresh.len() + known.len()).min(limit));

    for message in fresh.into_iter().chain(known) {
        if merged.len() == limit {
            break;
        }
        if seen.insert(message.id.clone()) {
            merged.push(message);
        }
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(id: &str) -> ClassifiedMessage {
        ClassifiedMessage {
            id: id.to_string(),
            subject: format!("subject {id}"),
            from: "someone@example.com".to_string(),
            snippet: String::new(),
            important: false,
            reason: String::new(),
        }
    }

    fn ids(messages: &[ClassifiedMessage]) -> Vec<&str> {
        messages.iter().map(|m| m.id.as_str()).collect()
    }

    #[test]
    fn new_messages_go_in_front_in_fetch_order() {
        let merged = merge(
            vec![message("C"), message("D")],
            vec![message("B"), message("A")],
            CACHE_LIMIT,
        );
        assert_eq!(ids(&merged), ["C", "D", "B", "A"]);
    }

    #[test]
    fn truncates_oldest_entries() {
        let known = (0..CACHE_LIMIT).map(|i| message(&format!("old-{i}"))).collect();
        let merged = merge(vec![message("new")], known, CACHE_LIMIT);

        assert_eq!(merged.len(), CACHE_LIMIT);
        assert_eq!(merged[0].id, "new");
        assert_eq!(merged[CACHE_LIMIT - 1].id, format!("old-{}", CACHE_LIMIT - 2));
    }

    #[test]
    fn drops_duplicate_ids() {
        let merged = merge(
            vec![message("A"), message("A")],
            vec![message("A"), message("B")],
            CACHE_LIMIT,
        );
        assert_eq!(ids(&merged), ["A", "B"]);
    }

    #[test]
    fn freshness_window_boundaries() {
        let now = UNIX_EPOCH + Duration::from_secs(100_000);
        let six_hours_ago = now - FRESHNESS_WINDOW;
        let seven_hours_ago = now - Duration::from_secs(7 * 60 * 60);

        assert!(CacheRecord::stamped(six_hours_ago, Vec::new()).is_fresh(now, FRESHNESS_WINDOW));
        assert!(!CacheRecord::stamped(seven_hours_ago, Vec::new()).is_fresh(now, FRESHNESS_WINDOW));
        assert!(
            CacheRecord::stamped(now + Duration::from_secs(60), Vec::new())
                .is_fresh(now, FRESHNESS_WINDOW)
        );
    }

    #[test]
    fn persists_with_cached_at_key() {
        let record = CacheRecord::new(1_700_000_000_000, vec![message("A")]);
        let value = serde_json::to_value(&record).expect("serialize");
        assert_eq!(value["cachedAt"], 1_700_000_000_000_u64);
        assert_eq!(value["emails"][0]["id"], "A");
    }
}
