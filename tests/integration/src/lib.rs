//! End-to-end tests for the Warden token endpoint live under `tests/`.
