//! Bot capabilities required by the relay

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// A channel-scoped permission the relay may need
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    ViewChannel,
    SendMessages,
    SendMessagesInThreads,
    CreatePublicThreads,
    ManageMessages,
    ReadMessageHistory,
}

/// Everything the relay needs, in the order missing capabilities are reported.
pub const REQUIRED_CAPABILITIES: [Capability; 6] = [
    Capability::ViewChannel,
    Capability::SendMessages,
    Capability::SendMessagesInThreads,
    Capability::CreatePublicThreads,
    Capability::ManageMessages,
    Capability::ReadMessageHistory,
];

impl Capability {
    /// Name as shown in the Discord permission UI.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::ViewChannel => "View Channels",
            Self::SendMessages => "Send Messages",
            Self::SendMessagesInThreads => "Send Messages in Threads",
            Self::CreatePublicThreads => "Create Public Threads",
            Self::ManageMessages => "Manage Messages",
            Self::ReadMessageHistory => "Read Message History",
        }
    }
}

/// Capabilities granted to the bot in one channel
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionSet {
    granted: BTreeSet<Capability>,
}

impl PermissionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every capability the relay knows about.
    pub fn all() -> Self {
        REQUIRED_CAPABILITIES.into_iter().collect()
    }

    pub fn revoke(&mut self, capability: Capability) {
        self.granted.remove(&capability);
    }

    pub fn contains(&self, capability: Capability) -> bool {
        self.granted.contains(&capability)
    }

    /// Capabilities from `required` that are not granted, in `required` order.
    pub fn missing(&self, required: &[Capability]) -> Vec<Capability> {
        required
            .iter()
            .copied()
            .filter(|c| !self.contains(*c))
            .collect()
    }
}

impl FromIterator<Capability> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        Self {
            granted: iter.into_iter().collect(),
        }
    }
}
