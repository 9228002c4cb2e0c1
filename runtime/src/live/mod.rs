//! Live interaction with a discovered API.

pub mod try_request;
