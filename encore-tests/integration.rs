//! Integration tests for Encore
//!
//! Exercise the search crate through its public API: the fixture backend
//! behind `EventSearch`, the HTTP backend against a stub event API, and
//! pagination properties over generated inputs.

#[path = "style/naming_conventions.rs"]
mod naming_conventions;

#[path = "integration/fixture_backend.rs"]
mod fixture_backend;
#[path = "integration/http_backend.rs"]
mod http_backend;
#[path = "integration/pagination_properties.rs"]
mod pagination_properties;
