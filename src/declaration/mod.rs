//! Declaration data: canonical model, payload normalization and validation.

pub mod model;
pub mod normalizer;
pub mod validation;

pub use model::{DeclarationRecord, Purchaser, RawPayload};
pub use normalizer::{normalize, normalize_on};
pub use validation::{validate, MissingField, MissingFieldsError, RequiredField};
