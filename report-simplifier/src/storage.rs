use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::{error::StorageError, report::SimplifiedReport, view::ReportView};

/// One analyzed report and its language state
#[derive(Debug, Clone)]
pub struct ReportSession {
    pub id: String,
    pub view: ReportView,
    pub created_at: DateTime<Utc>,
}

impl ReportSession {
    pub fn new(report: SimplifiedReport, cache_translations: bool) -> Self {
        let view = ReportView::new(report);
        let view = if cache_translations {
            view.with_translation_cache()
        } else {
            view
        };

        Self {
            id: Uuid::new_v4().to_string(),
            view,
            created_at: Utc::now(),
        }
    }
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// Trait for storing and retrieving report sessions
#[async_trait]
pub trait ReportStorage: Send + Sync {
    async fn save(&self, session: ReportSession) -> Result<()>;
    async fn get(&self, id: &str) -> Result<Option<ReportSession>>;
    /// Returns whether a session was removed
    async fn delete(&self, id: &str) -> Result<bool>;
}

pub const DEFAULT_REPORT_TTL_SECS: i64 = 60 * 60;
pub const DEFAULT_MAX_REPORTS: usize = 10_000;

/// Bounds on how long and how many reports are kept in memory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageLimits {
    pub ttl: Duration,
    pub max_sessions: usize,
}

impl Default for StorageLimits {
    fn default() -> Self {
        Self {
            ttl: Duration::seconds(DEFAULT_REPORT_TTL_SECS),
            max_sessions: DEFAULT_MAX_REPORTS,
        }
    }
}

/// Process-local storage; nothing outlives the process.
///
/// Sessions older than the TTL are dropped, and the oldest sessions are
/// evicted once `max_sessions` is reached.
#[derive(Default)]
pub struct InMemoryReportStorage {
    sessions: Arc<DashMap<String, ReportSession>>,
    limits: StorageLimits,
}

impl InMemoryReportStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(limits: StorageLimits) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            limits: StorageLimits {
                max_sessions: limits.max_sessions.max(1),
                ..limits
            },
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    fn is_expired(&self, session: &ReportSession, now: DateTime<Utc>) -> bool {
        now - session.created_at > self.limits.ttl
    }

    /// Drop every expired session, returning how many were removed
    pub fn evict_expired(&self) -> usize {
        let now = Utc::now();
        let before = self.sessions.len();
        self.sessions
            .retain(|_, session| !self.is_expired(session, now));
        before.saturating_sub(self.sessions.len())
    }

    fn make_room(&self) {
        while self.sessions.len() >= self.limits.max_sessions {
            let oldest = self
                .sessions
                .iter()
                .min_by_key(|entry| entry.created_at)
                .map(|entry| entry.key().clone());

            match oldest {
                Some(id) => {
                    debug!(report_id = %id, "Evicting oldest report to stay within capacity");
                    self.sessions.remove(&id);
                }
                None => break,
            }
        }
    }
}

#[async_trait]
impl ReportStorage for InMemoryReportStorage {
    async fn save(&self, session: ReportSession) -> Result<()> {
        let expired = self.evict_expired();
        if expired > 0 {
            debug!(expired, "Evicted expired reports");
        }

        if !self.sessions.contains_key(&session.id) {
            self.make_room();
        }
        self.sessions.insert(session.id.clone(), session);
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<ReportSession>> {
        let session = self.sessions.get(id).map(|entry| entry.clone());

        match session {
            Some(session) if self.is_expired(&session, Utc::now()) => {
                self.sessions.remove(id);
                Ok(None)
            }
            other => Ok(other),
        }
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        Ok(self.sessions.remove(id).is_some())
    }
}
