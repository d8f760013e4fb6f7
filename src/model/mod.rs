//! Core data model types for parsed address fields.

pub mod address;
