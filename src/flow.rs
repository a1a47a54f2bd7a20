//! Flow directory
//!
//! Static description of the guided conversation: which flow states exist,
//! which selection key an answer given in each state populates, and the
//! display labels for selection values. Everything here is pure lookup.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Prefix that marks a quick-reply selection on the chat transport
pub const FLOW_SELECTION_PREFIX: &str = "_flow:";

/// Selection value that wipes all accumulated selections
pub const RESTART_VALUE: &str = "restart";

/// Phase of the guided conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowState {
    #[default]
    Greeting,
    Destination,
    TripType,
    Duration,
    Budget,
    GroupSize,
    ShowPackages,
    AiChat,
}

impl FlowState {
    /// State every fresh session starts in
    pub const INITIAL: FlowState = FlowState::Greeting;

    pub const ALL: [FlowState; 8] = [
        FlowState::Greeting,
        FlowState::Destination,
        FlowState::TripType,
        FlowState::Duration,
        FlowState::Budget,
        FlowState::GroupSize,
        FlowState::ShowPackages,
        FlowState::AiChat,
    ];

    /// Wire name of the state
    pub fn as_str(self) -> &'static str {
        match self {
            FlowState::Greeting => "greeting",
            FlowState::Destination => "destination",
            FlowState::TripType => "trip_type",
            FlowState::Duration => "duration",
            FlowState::Budget => "budget",
            FlowState::GroupSize => "group_size",
            FlowState::ShowPackages => "show_packages",
            FlowState::AiChat => "ai_chat",
        }
    }
}

impl fmt::Display for FlowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown flow state: {0}")]
pub struct UnknownFlowState(pub String);

impl FromStr for FlowState {
    type Err = UnknownFlowState;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FlowState::ALL
            .into_iter()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| UnknownFlowState(s.to_string()))
    }
}

/// Structured answer slot filled during the guided flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionKey {
    Destination,
    TripType,
    Duration,
    Budget,
    GroupSize,
}

impl SelectionKey {
    fn heading(self) -> &'static str {
        match self {
            SelectionKey::Destination => "Region",
            SelectionKey::TripType => "Type",
            SelectionKey::Duration => "Duration",
            SelectionKey::Budget => "Budget",
            SelectionKey::GroupSize => "Group",
        }
    }
}

/// Accumulated selections, keyed by the state the answer was given in
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Selections(BTreeMap<SelectionKey, String>);

impl Selections {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: SelectionKey) -> Option<&str> {
        self.0.get(&key).map(String::as_str)
    }

    pub fn insert(&mut self, key: SelectionKey, value: impl Into<String>) {
        self.0.insert(key, value.into());
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SelectionKey, &str)> {
        self.0.iter().map(|(key, value)| (*key, value.as_str()))
    }
}

impl<V: Into<String>> FromIterator<(SelectionKey, V)> for Selections {
    fn from_iter<I: IntoIterator<Item = (SelectionKey, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}

/// Which selection key an answer given in `state` populates.
///
/// `greeting`, `show_packages` and `ai_chat` answers are not stored.
pub fn selection_key_for(state: FlowState) -> Option<SelectionKey> {
    match state {
        FlowState::Destination => Some(SelectionKey::Destination),
        FlowState::TripType => Some(SelectionKey::TripType),
        FlowState::Duration => Some(SelectionKey::Duration),
        FlowState::Budget => Some(SelectionKey::Budget),
        FlowState::GroupSize => Some(SelectionKey::GroupSize),
        FlowState::Greeting | FlowState::ShowPackages | FlowState::AiChat => None,
    }
}

/// Human-readable label for a selection or option value
pub fn label_for(value: &str) -> Option<&'static str> {
    let label = match value {
        // Destinations
        "north" => "North Island",
        "south" => "South Island",
        "both" => "Both Islands",
        "recommend" => "Recommended",

        // Trip types
        "adventure" => "Adventure & Outdoors",
        "culture" => "Culture & Heritage",
        "nature" => "Nature & Wildlife",
        "food" => "Food & Wine",
        "mixed" => "Mixed Experience",

        // Duration
        "short" => "3-5 Days",
        "week" => "1 Week",
        "two_weeks" => "2 Weeks",
        "flexible" => "Flexible",

        // Budget
        "budget" => "Budget ($500-$1,500)",
        "mid" => "Mid-Range ($1,500-$3,000)",
        "premium" => "Premium ($3,000-$5,000)",
        "luxury" => "Luxury ($5,000+)",

        // Group size
        "solo" => "Solo Traveler",
        "couple" => "Couple",
        "small" => "Small Group (3-5)",
        "large" => "Large Group (6+)",

        _ => return None,
    };
    Some(label)
}

/// One display line per populated selection, e.g. `Region: South Island`.
/// Unknown values are shown raw.
pub fn selections_summary(selections: &Selections) -> Vec<String> {
    selections
        .iter()
        .map(|(key, value)| {
            format!("{}: {}", key.heading(), label_for(value).unwrap_or(value))
        })
        .collect()
}
