//! Cross-crate integration tests for CRID live under `tests/`.
