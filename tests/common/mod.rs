//! Shared helpers for workspace integration tests.

#![allow(dead_code)]

pub mod mock_provider;
