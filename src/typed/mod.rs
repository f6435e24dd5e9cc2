//! # Typed Module
//!
//! Runtime contracts shared by generated code and the in-process dispatcher.
//!
//! A generated operation gets an envelope type with a status code and one
//! `Option` slot per declared status:
//!
//! ```rust,ignore
//! pub struct GetPetResponse {
//!     pub status_code: u16,
//!     pub status_200: Option<GetPetResponse200>,
//!     pub status_404: Option<GetPetResponse404>,
//! }
//! ```
//!
//! The generated constructors (`GetPetResponse::status_200(payload)`)
//! populate exactly one slot. Every envelope implements
//! [`ResponseEnvelope`], whose [`check`](ResponseEnvelope::check) rejects an
//! envelope with zero or several populated slots; the dispatcher turns that
//! into a 500.
//!
//! [`DynamicEnvelope`] is the same model keyed by status at run time, for
//! handlers registered with the dispatcher without generated types.
//!
//! ```rust
//! use brrtgen::typed::{DynamicEnvelope, ResponseEnvelope, ResponsePayload};
//! use serde_json::json;
//!
//! let ok = DynamicEnvelope::respond([200, 404], 200, ResponsePayload::json(json!({"id": 1})));
//! assert_eq!(ok.check(), Ok(200));
//!
//! let broken = DynamicEnvelope::empty([200, 404], 200);
//! assert!(broken.check().is_err());
//! ```

mod core;

pub use core::{ContractViolation, DynamicEnvelope, ResponseEnvelope, ResponsePayload, Validate};
