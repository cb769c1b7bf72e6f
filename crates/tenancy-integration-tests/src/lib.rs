//! Host crate for the Tenancy Stack integration test suite. See `tests/`.
