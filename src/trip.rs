//! Custom trip submission
//!
//! Validates the contact step of the trip planner and submits the request.
//! A failed submission is reported as a failure, never as a success screen.
//! The terminal front end reaches this through its `/plan` command.

use crate::chat::{ChatError, ChatService, CustomTripRequest};
use crate::flow::{SelectionKey, Selections};
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;
use thiserror::Error;

/// Contact details entered on the planner's last step
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactDetails {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub notes: Option<String>,
}

/// Field-level problems with the contact details
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContactError {
    #[error("Please enter your name")]
    MissingName,
    #[error("Please enter your phone number")]
    MissingPhone,
    #[error("Please enter a valid phone number")]
    InvalidPhone,
    #[error("Please enter your email")]
    MissingEmail,
    #[error("Please enter a valid email address")]
    InvalidEmail,
}

#[derive(Debug, Error)]
pub enum TripSubmitError {
    #[error("Invalid contact details: {}", join_errors(.0))]
    Invalid(Vec<ContactError>),
    #[error("Failed to submit custom trip request: {0}")]
    Service(#[from] ChatError),
    #[error("Custom trip request was not accepted: {0}")]
    Rejected(String),
}

fn join_errors(errors: &[ContactError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Accepted submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripReceipt {
    pub message: String,
    pub request_id: Option<String>,
}

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\d\s\-+()]{8,}$").expect("Invalid phone regex"));

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Invalid email regex"));

impl ContactDetails {
    /// All problems with the details, in form order. Empty when valid.
    pub fn validate(&self) -> Vec<ContactError> {
        let mut errors = Vec::new();

        if self.name.trim().is_empty() {
            errors.push(ContactError::MissingName);
        }

        if self.phone.trim().is_empty() {
            errors.push(ContactError::MissingPhone);
        } else if !PHONE_RE.is_match(&self.phone) {
            errors.push(ContactError::InvalidPhone);
        }

        if self.email.trim().is_empty() {
            errors.push(ContactError::MissingEmail);
        } else if !EMAIL_RE.is_match(&self.email) {
            errors.push(ContactError::InvalidEmail);
        }

        errors
    }
}

/// Planner answers prefilled from the guided flow, keyed by question id
pub fn answers_from_selections(selections: &Selections) -> Map<String, Value> {
    selections
        .iter()
        .map(|(key, value)| {
            let id = match key {
                SelectionKey::Destination => "destination",
                SelectionKey::TripType => "tripType",
                SelectionKey::Duration => "duration",
                SelectionKey::Budget => "budget",
                SelectionKey::GroupSize => "groupSize",
            };
            (id.to_string(), Value::String(value.to_string()))
        })
        .collect()
}

/// Validate and submit a custom trip request.
///
/// `answers` holds the planner's answers keyed by question id.
pub async fn submit_custom_trip<S>(
    service: &S,
    answers: Map<String, Value>,
    contact: ContactDetails,
) -> Result<TripReceipt, TripSubmitError>
where
    S: ChatService + ?Sized,
{
    let errors = contact.validate();
    if !errors.is_empty() {
        return Err(TripSubmitError::Invalid(errors));
    }

    let request = CustomTripRequest {
        selections: answers,
        name: contact.name,
        phone: contact.phone,
        email: contact.email,
        notes: contact.notes.filter(|n| !n.trim().is_empty()),
    };

    let response = service.submit_custom_trip(&request).await?;
    if !response.success {
        tracing::warn!(message = %response.message, "Custom trip request rejected");
        return Err(TripSubmitError::Rejected(response.message));
    }

    tracing::info!(request_id = ?response.request_id, "Custom trip request accepted");
    Ok(TripReceipt {
        message: response.message,
        request_id: response.request_id,
    })
}
