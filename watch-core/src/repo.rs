use serde::{Deserialize, Serialize};

/// Viewer's watch relationship to a repository, spelled the way the
/// GitHub API spells it on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubscriptionState {
    Subscribed,
    Unsubscribed,
}

impl SubscriptionState {
    pub fn is_watching(self) -> bool {
        matches!(self, Self::Subscribed)
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Subscribed => Self::Unsubscribed,
            Self::Unsubscribed => Self::Subscribed,
        }
    }

    /// Caption for the watch button: the action a click performs.
    pub fn action_label(self) -> &'static str {
        if self.is_watching() {
            "Unwatch"
        } else {
            "Watch"
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Repository {
    pub id: String,
    pub name: String,
    pub url: String,
    pub watcher_count: i64,
    pub viewer_subscription: SubscriptionState,
}

/// Input to the subscription mutation, and also the shape of its result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubscriptionChange {
    pub repository_id: String,
    pub state: SubscriptionState,
}
