//! Shared helpers for unit tests.

pub mod chunked_server;
pub mod fake_directory;
pub mod socket_guard;
