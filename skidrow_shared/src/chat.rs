//! Room chat and combat log.
//!
//! # Message kinds
//! - **Chat**: player-authored text
//! - **Kill**: combat log line generated when an enemy dies
//! - **System**: server announcements (level changes, departures)
//!
//! All kinds share one bounded FIFO buffer; the oldest entry is evicted first.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::{
    model::{EntityId, Identity, PlayerId},
    tables::WeaponKind,
};

/// Maximum player message length in characters.
pub const MAX_MESSAGE_LENGTH: usize = 200;

/// Entries retained per room.
pub const CHAT_HISTORY: usize = 50;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ChatBody {
    #[serde(rename_all = "camelCase")]
    Chat {
        player_id: PlayerId,
        player_name: String,
        player_color: u32,
        text: String,
    },
    #[serde(rename_all = "camelCase")]
    Kill {
        text: String,
        killer: String,
        victim: Identity,
        weapon: WeaponKind,
        is_headshot: bool,
    },
    System {
        text: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: EntityId,
    /// Simulation milliseconds.
    pub timestamp: u64,
    #[serde(flatten)]
    pub body: ChatBody,
}

impl ChatMessage {
    pub fn text(&self) -> &str {
        match &self.body {
            ChatBody::Chat { text, .. } | ChatBody::Kill { text, .. } | ChatBody::System { text } => {
                text
            }
        }
    }
}

/// Trims and length-limits player text. Returns `None` for blank input.
pub fn sanitize(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.chars().take(MAX_MESSAGE_LENGTH).collect())
}

/// Kill line shown in the combat log.
pub fn kill_line(victim: &Identity, killer: &str, headshot: bool) -> String {
    format!(
        "{}, Age {}, net worth ${:.2} - Killed by {}{}",
        victim.full_name,
        victim.age,
        victim.net_worth,
        killer,
        if headshot { " (HEADSHOT)" } else { "" }
    )
}

/// Bounded chat/combat log.
#[derive(Debug, Clone)]
pub struct ChatLog {
    entries: VecDeque<ChatMessage>,
    capacity: usize,
}

impl ChatLog {
    pub fn new(capacity: usize) -> Self {
        ChatLog {
            entries: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    /// Appends a message, evicting the oldest when full.
    pub fn push(&mut self, msg: ChatMessage) {
        self.entries.push_back(msg);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChatMessage> {
        self.entries.iter()
    }

    pub fn to_vec(&self) -> Vec<ChatMessage> {
        self.entries.iter().cloned().collect()
    }
}

impl Default for ChatLog {
    fn default() -> Self {
        ChatLog::new(CHAT_HISTORY)
    }
}
