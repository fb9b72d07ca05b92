//! Integration tests for caskit-rs live under `tests/`.
