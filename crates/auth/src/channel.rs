//! Communication channels.

use serde::{Deserialize, Serialize};

/// Channel an actor can be reached on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommunicationChannel {
    Email,
    Whatsapp,
}

impl CommunicationChannel {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommunicationChannel::Email => "email",
            CommunicationChannel::Whatsapp => "whatsapp",
        }
    }
}

impl core::fmt::Display for CommunicationChannel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
