//! # Outcome Events
//!
//! Every action, player or monster, produces a batch of [`GameEvent`]s that the
//! reducer applies in order. Events live for exactly one reduce pass.

use crate::game::EntityId;
use log::debug;
use serde::{Deserialize, Serialize};

/// How a message should be emphasized by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Notice,
    Warning,
    Danger,
    Good,
}

/// A line of text for the message log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub text: String,
    pub severity: Severity,
}

impl Message {
    pub fn new(text: impl Into<String>, severity: Severity) -> Self {
        Self {
            text: text.into(),
            severity,
        }
    }
}

/// A single outcome of resolving an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    /// Append to the message log
    Message(Message),
    /// A fighter reached zero hit points
    Died { entity: EntityId },
    /// An item went into an inventory and must leave the floor
    ItemAdded { item: EntityId },
    /// An item was used up
    ItemConsumed { item: EntityId },
    /// An item left an inventory and must return to the floor
    ItemDropped { item: EntityId },
    /// An item needs a target before it can be used
    TargetingRequested { item: EntityId },
    TargetingCancelled,
    /// Experience awarded to `recipient`
    ExperienceGained { recipient: EntityId, amount: u32 },
}

impl GameEvent {
    pub fn message(text: impl Into<String>, severity: Severity) -> Self {
        GameEvent::Message(Message::new(text, severity))
    }
}

/// Append-only record of everything the player has been told.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageLog {
    messages: Vec<Message>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, message: Message) {
        debug!("[{:?}] {}", message.severity, message.text);
        self.messages.push(message);
    }

    /// The last `count` messages, oldest first.
    ///
    /// # Examples
    ///
    /// ```
    /// use yarg::{Message, MessageLog, Severity};
    ///
    /// let mut log = MessageLog::new();
    /// for text in ["one", "two", "three"] {
    ///     log.add(Message::new(text, Severity::Info));
    /// }
    /// let recent: Vec<_> = log.recent(2).iter().map(|m| m.text.as_str()).collect();
    /// assert_eq!(recent, vec!["two", "three"]);
    /// ```
    pub fn recent(&self, count: usize) -> &[Message] {
        let start = self.messages.len().saturating_sub(count);
        &self.messages[start..]
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
