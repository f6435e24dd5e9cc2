use crate::validation::Violation;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Runtime side of a generated response envelope.
///
/// Every generated `{Operation}Response` implements this trait. An envelope
/// carries a status code plus one optional slot per declared status; a well
/// formed envelope has exactly one populated slot and it matches the status
/// code.
pub trait ResponseEnvelope {
    /// Status the handler chose
    fn status_code(&self) -> u16;

    /// Statuses whose slot is populated, ascending
    fn populated(&self) -> Vec<u16>;

    /// Check the single-populated-slot contract
    ///
    /// # Errors
    ///
    /// Returns a [`ContractViolation`] when zero or several slots are
    /// populated, or when the populated slot differs from the status code.
    fn check(&self) -> Result<u16, ContractViolation> {
        let status_code = self.status_code();
        let populated = self.populated();
        if populated.as_slice() == [status_code] {
            Ok(status_code)
        } else {
            Err(ContractViolation {
                status_code,
                populated,
            })
        }
    }
}

/// Implemented by request records whose annotations a validation runtime
/// evaluates
pub trait Validate {
    /// # Errors
    ///
    /// Returns every failed rule.
    fn validate(&self) -> Result<(), Vec<Violation>>;
}

/// A handler returned an envelope that breaks the single-slot contract
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractViolation {
    pub status_code: u16,
    pub populated: Vec<u16>,
}

impl fmt::Display for ContractViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.populated.as_slice() {
            [] => write!(f, "status {} returned with no populated slot", self.status_code),
            [one] => write!(
                f,
                "status {} returned with slot {} populated",
                self.status_code, one
            ),
            many => write!(
                f,
                "status {} returned with {} populated slots {:?}",
                self.status_code,
                many.len(),
                many
            ),
        }
    }
}

impl std::error::Error for ContractViolation {}

/// Body and headers of one status slot
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResponsePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
}

impl ResponsePayload {
    #[must_use]
    pub fn json(body: Value) -> Self {
        ResponsePayload {
            body: Some(body),
            headers: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

/// Envelope built at run time from an operation's declared statuses.
///
/// Holds the same invariants as a generated envelope: one slot per declared
/// status, at most one of which a [`respond`](Self::respond)-built envelope
/// populates. Slots for undeclared statuses do not exist, so populating one
/// leaves every slot empty and fails [`ResponseEnvelope::check`].
#[derive(Debug, Clone, PartialEq)]
pub struct DynamicEnvelope {
    status_code: u16,
    slots: BTreeMap<u16, Option<ResponsePayload>>,
}

impl DynamicEnvelope {
    /// Envelope with every slot empty
    pub fn empty(declared: impl IntoIterator<Item = u16>, status_code: u16) -> Self {
        DynamicEnvelope {
            status_code,
            slots: declared.into_iter().map(|s| (s, None)).collect(),
        }
    }

    /// Envelope populating exactly the `status` slot
    pub fn respond(
        declared: impl IntoIterator<Item = u16>,
        status: u16,
        payload: ResponsePayload,
    ) -> Self {
        let mut envelope = Self::empty(declared, status);
        envelope.populate(status, payload);
        envelope
    }

    /// Fill the `status` slot; returns `false` when the status is not declared
    pub fn populate(&mut self, status: u16, payload: ResponsePayload) -> bool {
        match self.slots.get_mut(&status) {
            Some(slot) => {
                *slot = Some(payload);
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn with_status_code(mut self, status_code: u16) -> Self {
        self.status_code = status_code;
        self
    }

    /// Declared statuses, ascending
    pub fn declared(&self) -> impl Iterator<Item = u16> + '_ {
        self.slots.keys().copied()
    }

    /// Payload of the slot matching the status code
    #[must_use]
    pub fn payload(&self) -> Option<&ResponsePayload> {
        self.slots.get(&self.status_code).and_then(Option::as_ref)
    }
}

impl ResponseEnvelope for DynamicEnvelope {
    fn status_code(&self) -> u16 {
        self.status_code
    }

    fn populated(&self) -> Vec<u16> {
        self.slots
            .iter()
            .filter(|(_, slot)| slot.is_some())
            .map(|(status, _)| *status)
            .collect()
    }
}
