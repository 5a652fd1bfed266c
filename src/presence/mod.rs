use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use uuid::Uuid;


/// A connected participant
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    /// Display name, unique among present participants
    pub identity: String,
    /// Connection that owns this identity
    pub connection_id: Uuid,
    pub joined_at: DateTime<Utc>,
}

/// Presence registry tracks who is currently connected
pub struct PresenceRegistry {
    /// Primary storage in join order: join_seq -> Participant
    participants: BTreeMap<u64, Participant>,
    /// Secondary index: identity -> join_seq (for uniqueness)
    identities: HashMap<String, u64>,
    next_seq: u64,
}

impl PresenceRegistry {
    pub fn new() -> Self {
        Self {
            participants: BTreeMap::new(),
            identities: HashMap::new(),
            next_seq: 0,
        }
    }

    /// Normalize and check a requested identity.
    ///
    /// Rules: trimmed, non-empty, at most `max_len` characters, no control
    /// characters.
    pub fn validate_identity(raw: &str, max_len: usize) -> Result<String, IdentityError> {
        let identity = raw.trim();

        if identity.is_empty() {
            return Err(IdentityError::Empty);
        }
        if identity.chars().count() > max_len {
            return Err(IdentityError::TooLong(max_len));
        }
        if let Some(c) = identity.chars().find(|c| c.is_control()) {
            return Err(IdentityError::InvalidCharacters(format!(
                "control character {:?} not allowed",
                c
            )));
        }

        Ok(identity.to_string())
    }

    /// Add a participant. Fails if the identity is already present.
    pub fn join(
        &mut self,
        identity: &str,
        connection_id: Uuid,
    ) -> Result<Participant, PresenceError> {
        if self.identities.contains_key(identity) {
            return Err(PresenceError::Duplicate(identity.to_string()));
        }

        let participant = Participant {
            identity: identity.to_string(),
            connection_id,
            joined_at: Utc::now(),
        };

        let seq = self.next_seq;
        self.next_seq += 1;
        self.participants.insert(seq, participant.clone());
        self.identities.insert(identity.to_string(), seq);

        Ok(participant)
    }

    /// Remove a participant. Returns None if the identity was not present.
    pub fn leave(&mut self, identity: &str) -> Option<Participant> {
        let seq = self.identities.remove(identity)?;
        self.participants.remove(&seq)
    }

    /// Present identities in join order
    pub fn list(&self) -> Vec<String> {
        self.participants
            .values()
            .map(|p| p.identity.clone())
            .collect()
    }

    pub fn get(&self, identity: &str) -> Option<&Participant> {
        let seq = self.identities.get(identity)?;
        self.participants.get(seq)
    }

    pub fn contains(&self, identity: &str) -> bool {
        self.identities.contains_key(identity)
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }
}

impl Default for PresenceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Join errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresenceError {
    Duplicate(String),
}

impl fmt::Display for PresenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PresenceError::Duplicate(identity) => {
                write!(f, "identity '{}' is already in use", identity)
            }
        }
    }
}

impl std::error::Error for PresenceError {}

/// Identity validation errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    Empty,
    TooLong(usize),
    InvalidCharacters(String),
}

impl fmt::Display for IdentityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentityError::Empty => write!(f, "identity is required"),
            IdentityError::TooLong(max) => {
                write!(f, "identity must be at most {} characters", max)
            }
            IdentityError::InvalidCharacters(msg) => write!(f, "invalid identity: {}", msg),
        }
    }
}

impl std::error::Error for IdentityError {}
