//! Outbound notification message

use serde::{Deserialize, Serialize};

/// An email queued for the background sender
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MailData {
    pub to: String,
    pub from: String,
    pub subject: String,
    /// HTML body
    pub content: String,
}
