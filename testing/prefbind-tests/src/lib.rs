//! Preference declarations exercised by the integration and UI tests.

pub mod schema;
