// Message types exchanged with the language model

use std::fmt;

use serde::{Deserialize, Serialize};

/// Speaker of a chat turn
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One {role, content} turn of a chat request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Directional command polled by the continuous controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Forward,
    Left,
    Right,
    Back,
    // Anything else the model says, kept verbatim for logging
    Unrecognized(String),
}

impl Action {
    /// Parse a raw completion: trimmed and upper-cased, then matched exactly
    pub fn from_reply(reply: &str) -> Self {
        let token = reply.trim().to_uppercase();
        match token.as_str() {
            "FORWARD" => Action::Forward,
            "LEFT" => Action::Left,
            "RIGHT" => Action::Right,
            "BACK" => Action::Back,
            _ => Action::Unrecognized(token),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Forward => f.write_str("FORWARD"),
            Action::Left => f.write_str("LEFT"),
            Action::Right => f.write_str("RIGHT"),
            Action::Back => f.write_str("BACK"),
            Action::Unrecognized(token) => f.write_str(token),
        }
    }
}

/// One tile move on the 1-D line
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Move {
    #[serde(rename = "F")]
    Forward,
    #[serde(rename = "B")]
    Back,
}

impl Move {
    /// Change in line position caused by this move
    pub fn delta(self) -> i32 {
        match self {
            Move::Forward => 1,
            Move::Back => -1,
        }
    }

    pub fn token(self) -> &'static str {
        match self {
            Move::Forward => "F",
            Move::Back => "B",
        }
    }
}

/// Planner answer document: `{"path": ["F", "B", ...]}`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PathPlan {
    #[serde(default)]
    pub path: Vec<Move>,
}
