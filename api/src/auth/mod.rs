//! Authentication
//!
//! API-key middleware and the acting-person extractor.

mod acting_person;
mod api_key;

pub use acting_person::{ActingPerson, PERSON_HEADER};
pub use api_key::auth_middleware;
