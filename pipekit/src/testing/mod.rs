//! Testing utilities for pipeline components.
//!
//! This module provides:
//! - The result validator for output messages
//! - Mock components
//! - Message builders and a component harness
//! - Assertion helpers for custom checks

mod assertions;
mod fixtures;
#[cfg(test)]
mod integration_tests;
mod mocks;
mod validator;

pub use assertions::{
    assert_body_part, assert_has_error_info, assert_part_names, assert_part_text,
    assert_property_absent, assert_property_eq, assert_property_kind, ensure_eq, fail,
};
pub use fixtures::{ComponentHarness, MessageBuilder};
pub use mocks::{FailingComponent, PassThroughComponent, RecordedExecution, RecordingComponent};
pub use validator::{PipelineResultValidator, StreamCheck, ValueCheck};
