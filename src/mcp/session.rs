//! Session/Capability Negotiator
//!
//! One record per client connection. Created by `initialize`, read by every
//! later call on that connection, destroyed when the connection ends.

use super::error::{McpError, McpResult};
use super::models::{
    Implementation, InitializeParams, LATEST_PROTOCOL_VERSION, SUPPORTED_PROTOCOL_VERSIONS,
};
use chrono::{DateTime, Duration, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde_json::{Map, Value};
use uuid::Uuid;

/// State negotiated for one client connection
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub session_id: String,
    pub negotiated_protocol_version: String,
    pub declared_capabilities: Map<String, Value>,
    pub client_info: Implementation,
    /// Set once the client sends `notifications/initialized`
    pub initialized: bool,
    pub created_at: DateTime<Utc>,
    /// Last time a request arrived on this session
    pub last_seen: DateTime<Utc>,
}

/// Picks the protocol revision for a client: its own when we support it,
/// otherwise our latest.
pub fn negotiate_version(requested: &str) -> &'static str {
    match SUPPORTED_PROTOCOL_VERSIONS
        .iter()
        .find(|v| **v == requested)
    {
        Some(version) => version,
        None => {
            tracing::warn!(
                requested,
                offered = LATEST_PROTOCOL_VERSION,
                "Unsupported protocol version requested, offering latest"
            );
            LATEST_PROTOCOL_VERSION
        }
    }
}

/// Live sessions keyed by id. Each entry is only mutated by its owning
/// connection, so per-key locking from DashMap is all that is needed.
#[derive(Default)]
pub struct SessionManager {
    sessions: DashMap<String, Session>,
}

impl SessionManager {
    /// Creates an empty session table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the session for an `initialize` call. `session_id` is the id
    /// the transport already associates with the connection, if any; a fresh
    /// one is generated otherwise. Re-initializing a live session is rejected.
    pub fn initialize(
        &self,
        session_id: Option<&str>,
        params: InitializeParams,
    ) -> McpResult<Session> {
        let session_id = session_id
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let session = match self.sessions.entry(session_id.clone()) {
            Entry::Occupied(_) => {
                return Err(McpError::InvalidRequest(format!(
                    "Session {session_id} is already initialized"
                )))
            }
            Entry::Vacant(slot) => {
                let now = Utc::now();
                let session = Session {
                    session_id,
                    negotiated_protocol_version: negotiate_version(&params.protocol_version)
                        .to_string(),
                    declared_capabilities: params.capabilities,
                    client_info: params.client_info,
                    initialized: false,
                    created_at: now,
                    last_seen: now,
                };
                slot.insert(session.clone());
                session
            }
        };

        tracing::info!(
            session = %session.session_id,
            client = %session.client_info.name,
            client_version = %session.client_info.version,
            protocol = %session.negotiated_protocol_version,
            "Session created"
        );
        Ok(session)
    }

    /// Snapshot of a live session.
    pub fn get(&self, session_id: &str) -> Option<Session> {
        self.sessions.get(session_id).map(|s| s.clone())
    }

    /// Records the client's `notifications/initialized`. Returns false for
    /// an unknown session.
    pub fn mark_initialized(&self, session_id: &str) -> bool {
        match self.sessions.get_mut(session_id) {
            Some(mut session) => {
                session.initialized = true;
                tracing::debug!(session = %session_id, "Handshake complete");
                true
            }
            None => false,
        }
    }

    /// Drops a session. Returns false when it did not exist.
    pub fn destroy(&self, session_id: &str) -> bool {
        let removed = self.sessions.remove(session_id).is_some();
        if removed {
            tracing::info!(session = %session_id, "Session destroyed");
        }
        removed
    }

    /// Records activity on a session. Returns false for an unknown session.
    pub fn touch(&self, session_id: &str) -> bool {
        match self.sessions.get_mut(session_id) {
            Some(mut session) => {
                session.last_seen = Utc::now();
                true
            }
            None => false,
        }
    }

    /// Drops every session idle for longer than `max_idle` as of `now` and
    /// returns their ids.
    pub fn evict_idle(&self, max_idle: Duration, now: DateTime<Utc>) -> Vec<String> {
        let mut evicted = Vec::new();
        self.sessions.retain(|id, session| {
            let keep = now - session.last_seen <= max_idle;
            if !keep {
                evicted.push(id.clone());
            }
            keep
        });

        if !evicted.is_empty() {
            tracing::info!(count = evicted.len(), "Evicted idle sessions");
        }
        evicted
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// True when no session is live.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
