/// Input validation for free text sent to external collaborators

pub mod validation;

pub use validation::{validate_input, ValidationError};
