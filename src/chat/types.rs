//! Wire types for the chat service

use crate::flow::{FlowState, Selections};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Outbound chat turn
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub message: String,
    pub flow_state: FlowState,
    pub selections: Selections,
}

/// Service reply for one turn
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChatResponse {
    pub message: String,
    #[serde(default)]
    pub flow_state: Option<FlowState>,
    #[serde(default)]
    pub options: Option<Vec<FlowOption>>,
    #[serde(default)]
    pub packages: Option<Vec<Package>>,
    #[serde(default)]
    pub is_ai_response: bool,
}

impl ChatResponse {
    pub fn new(message: impl Into<String>, flow_state: FlowState) -> Self {
        Self {
            message: message.into(),
            flow_state: Some(flow_state),
            options: None,
            packages: None,
            is_ai_response: false,
        }
    }

    pub fn with_options(mut self, options: Vec<FlowOption>) -> Self {
        self.options = Some(options);
        self
    }

    pub fn with_packages(mut self, packages: Vec<Package>) -> Self {
        self.packages = Some(packages);
        self
    }
}

/// Quick-reply option offered by the service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowOption {
    pub label: String,
    pub value: String,
    /// Hint only; the next response decides the actual state
    #[serde(default)]
    pub next_state: Option<FlowState>,
}

impl FlowOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>, next_state: FlowState) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            next_state: Some(next_state),
        }
    }
}

/// Tour package as listed by the service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Package {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub region: String,
    #[serde(default, rename = "type")]
    pub package_type: String,
    /// Days
    #[serde(default)]
    pub duration: u32,
    /// Per person, NZD
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub group_size_min: u32,
    #[serde(default)]
    pub group_size_max: u32,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub highlights: Vec<String>,
    #[serde(default)]
    pub itinerary: Vec<String>,
    #[serde(default)]
    pub inclusions: Vec<String>,
    #[serde(default)]
    pub exclusions: Vec<String>,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub gallery: Vec<String>,
    #[serde(default)]
    pub season: Vec<String>,
    #[serde(default)]
    pub status: String,
}

/// Custom trip request submitted from the trip planner
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomTripRequest {
    /// Planner answers (destination, tripType, duration, budget, groupSize, interests)
    pub selections: Map<String, Value>,
    pub name: String,
    pub phone: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CustomTripResponse {
    pub success: bool,
    pub message: String,
    #[serde(default)]
    pub request_id: Option<String>,
}
