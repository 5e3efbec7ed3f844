//! HTTP Response domain types

mod spec;

pub use spec::{identifier_of, unwrap_envelope, ResponseSpec};
