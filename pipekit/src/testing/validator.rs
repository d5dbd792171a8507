//! Declarative validation of a component's output message.
//!
//! A [`PipelineResultValidator`] is configured with chained builder calls and
//! then run against a message:
//!
//! ```rust,ignore
//! PipelineResultValidator::new()
//!     .assert_part_count(1)
//!     .assert_part_content_type("body", "text/xml")?
//!     .assert_part_stream("body", expected)?
//!     .assert_unexpected_parts()
//!     .validate(&mut output)?;
//! ```
//!
//! Checks run in a fixed order and stop at the first failure:
//! part count, content types, part order, context properties, part streams,
//! part properties, unexpected parts.

use crate::config::ValidatorConfig;
use crate::document::{
    decode_text, normalize_part_name, DataStream, Message, MessageSnapshot, PropertyKey,
    PropertyStore, PropertyValue,
};
use crate::errors::{ConfigurationError, ValidationAspect, ValidationFailure};
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::io::SeekFrom;
use tracing::{debug, warn};

/// Custom check run against a part's data stream.
pub type StreamCheck = Box<dyn Fn(&mut dyn DataStream) -> anyhow::Result<()> + Send + Sync>;

/// Custom check run against a property value, `None` when the property is absent.
pub type ValueCheck = Box<dyn Fn(Option<&PropertyValue>) -> anyhow::Result<()> + Send + Sync>;

const NONE: &str = "(none)";

enum StreamExpectation {
    Text(String),
    Pattern(Regex),
    Custom(StreamCheck),
}

enum ValueExpectation {
    Equals(PropertyValue),
    Custom(ValueCheck),
}

enum Mismatch {
    Values { expected: String, actual: String },
    Check(String),
}

impl ValueExpectation {
    fn check(&self, actual: Option<&PropertyValue>) -> Result<(), Mismatch> {
        match self {
            Self::Equals(expected) if actual == Some(expected) => Ok(()),
            Self::Equals(expected) => Err(Mismatch::Values {
                expected: display_value(Some(expected)),
                actual: display_value(actual),
            }),
            Self::Custom(check) => check(actual).map_err(|e| Mismatch::Check(format!("{e:#}"))),
        }
    }
}

/// Builder-style assertion engine for pipeline output messages.
///
/// Part names are compared case-insensitively on every surface.
#[derive(Default)]
pub struct PipelineResultValidator {
    config: ValidatorConfig,
    part_count: Option<usize>,
    part_order: Option<Vec<String>>,
    content_types: BTreeMap<String, String>,
    context_properties: Vec<(PropertyKey, ValueExpectation)>,
    part_streams: BTreeMap<String, StreamExpectation>,
    part_properties: BTreeMap<String, Vec<(PropertyKey, ValueExpectation)>>,
    check_unexpected_parts: bool,
}

impl PipelineResultValidator {
    /// Creates a validator with no checks configured.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the validator configuration.
    #[must_use]
    pub fn with_config(mut self, config: ValidatorConfig) -> Self {
        self.config = config;
        self
    }

    /// Expects the message to hold exactly `count` parts.
    ///
    /// A later call replaces the expectation.
    #[must_use]
    pub const fn assert_part_count(mut self, count: usize) -> Self {
        self.part_count = Some(count);
        self
    }

    /// Expects the parts to appear in exactly this order.
    ///
    /// # Errors
    ///
    /// Fails if `part_names` is empty, names a part twice, or if an order was
    /// already configured.
    pub fn assert_part_order(mut self, part_names: &[&str]) -> Result<Self, ConfigurationError> {
        if part_names.is_empty() {
            return Err(ConfigurationError::invalid(
                "part_names",
                "Part names must be specified when checking order",
            ));
        }
        if self.part_order.is_some() {
            return Err(ConfigurationError::duplicate(
                "part order",
                "Part order can only be defined once",
            ));
        }

        let mut order = Vec::with_capacity(part_names.len());
        for name in part_names {
            let normalized = normalized_part(name)?;
            if order.contains(&normalized) {
                return Err(ConfigurationError::invalid(
                    "part_names",
                    format!("part '{name}' appears more than once"),
                ));
            }
            order.push(normalized);
        }

        self.part_order = Some(order);
        Ok(self)
    }

    /// Expects the named part to have the given content type.
    ///
    /// # Errors
    ///
    /// Fails on an empty argument or if the part already has a content type
    /// expectation.
    pub fn assert_part_content_type(
        mut self,
        part_name: &str,
        content_type: &str,
    ) -> Result<Self, ConfigurationError> {
        let part = normalized_part(part_name)?;
        if content_type.is_empty() {
            return Err(ConfigurationError::missing("content_type"));
        }
        if self.content_types.contains_key(&part) {
            return Err(ConfigurationError::duplicate(
                format!("part '{part}'"),
                "Only one content type can be applied to a part",
            ));
        }

        self.content_types.insert(part, content_type.to_string());
        Ok(self)
    }

    /// Expects the named part's stream to decode to exactly `content`.
    ///
    /// # Errors
    ///
    /// Fails on an empty part name or if the part already has a stream check.
    pub fn assert_part_stream(
        self,
        part_name: &str,
        content: impl Into<String>,
    ) -> Result<Self, ConfigurationError> {
        self.add_stream_check(part_name, StreamExpectation::Text(content.into()))
    }

    /// Expects the named part's decoded stream to match `pattern`.
    ///
    /// # Errors
    ///
    /// Fails on an empty part name, an invalid pattern, or if the part
    /// already has a stream check.
    pub fn assert_part_stream_matches(
        self,
        part_name: &str,
        pattern: &str,
    ) -> Result<Self, ConfigurationError> {
        let regex =
            Regex::new(pattern).map_err(|e| ConfigurationError::invalid("pattern", e.to_string()))?;
        self.add_stream_check(part_name, StreamExpectation::Pattern(regex))
    }

    /// Runs a custom check against the named part's stream.
    ///
    /// # Errors
    ///
    /// Fails on an empty part name or if the part already has a stream check.
    pub fn assert_part_stream_with<F>(self, part_name: &str, check: F) -> Result<Self, ConfigurationError>
    where
        F: Fn(&mut dyn DataStream) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.add_stream_check(part_name, StreamExpectation::Custom(Box::new(check)))
    }

    /// Expects a property of the named part to equal `value`.
    ///
    /// # Errors
    ///
    /// Fails on an empty argument or if this part property is already checked.
    pub fn assert_part_property(
        self,
        part_name: &str,
        name: &str,
        namespace: &str,
        value: PropertyValue,
    ) -> Result<Self, ConfigurationError> {
        self.add_part_property_check(part_name, name, namespace, ValueExpectation::Equals(value))
    }

    /// Runs a custom check against a property of the named part.
    ///
    /// # Errors
    ///
    /// Fails on an empty argument or if this part property is already checked.
    pub fn assert_part_property_with<F>(
        self,
        part_name: &str,
        name: &str,
        namespace: &str,
        check: F,
    ) -> Result<Self, ConfigurationError>
    where
        F: Fn(Option<&PropertyValue>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.add_part_property_check(
            part_name,
            name,
            namespace,
            ValueExpectation::Custom(Box::new(check)),
        )
    }

    /// Expects a context property to equal `value`.
    ///
    /// # Errors
    ///
    /// Fails on an empty argument or if the property is already checked.
    pub fn assert_property(
        self,
        name: &str,
        namespace: &str,
        value: PropertyValue,
    ) -> Result<Self, ConfigurationError> {
        self.add_context_check(name, namespace, ValueExpectation::Equals(value))
    }

    /// Runs a custom check against a context property.
    ///
    /// # Errors
    ///
    /// Fails on an empty argument or if the property is already checked.
    pub fn assert_property_with<F>(
        self,
        name: &str,
        namespace: &str,
        check: F,
    ) -> Result<Self, ConfigurationError>
    where
        F: Fn(Option<&PropertyValue>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.add_context_check(name, namespace, ValueExpectation::Custom(Box::new(check)))
    }

    /// Fails validation if the message holds a part that no content type,
    /// stream or part property check names.
    #[must_use]
    pub const fn assert_unexpected_parts(mut self) -> Self {
        self.check_unexpected_parts = true;
        self
    }

    /// Runs every configured check against `message`.
    ///
    /// Streams are read during validation; with the default configuration
    /// they are left rewound.
    ///
    /// # Errors
    ///
    /// Returns the first failure encountered.
    pub fn validate(&self, message: &mut Message) -> Result<(), ValidationFailure> {
        debug!(message_id = %message.id(), parts = message.part_count(), "Validating message");

        let result = self.run_checks(message);

        match &result {
            Ok(()) => debug!(message_id = %message.id(), "Message passed validation"),
            Err(failure) => warn!(
                message_id = %message.id(),
                aspect = %failure.aspect,
                target = ?failure.target,
                "Validation failed: {}",
                failure.message
            ),
        }
        result
    }

    /// Validates `message` and panics with the failure and a message
    /// snapshot if any check fails.
    pub fn assert_valid(&self, message: &mut Message) {
        if let Err(failure) = self.validate(message) {
            let snapshot = MessageSnapshot::capture(message).map_or_else(
                |e| format!("<unavailable: {e}>"),
                |s| s.to_json().to_string(),
            );
            panic!("{failure}\nMessage: {snapshot}");
        }
    }

    fn run_checks(&self, message: &mut Message) -> Result<(), ValidationFailure> {
        self.validate_part_count(message)?;
        self.validate_content_types(message)?;
        self.validate_part_order(message)?;
        self.validate_context_properties(message)?;
        self.validate_part_streams(message)?;
        self.validate_part_properties(message)?;
        self.validate_unexpected_parts(message)
    }

    fn add_stream_check(
        mut self,
        part_name: &str,
        expectation: StreamExpectation,
    ) -> Result<Self, ConfigurationError> {
        let part = normalized_part(part_name)?;
        if self.part_streams.contains_key(&part) {
            return Err(ConfigurationError::duplicate(
                format!("part '{part}'"),
                "Only one stream check can exist per named part",
            ));
        }

        self.part_streams.insert(part, expectation);
        Ok(self)
    }

    fn add_part_property_check(
        mut self,
        part_name: &str,
        name: &str,
        namespace: &str,
        expectation: ValueExpectation,
    ) -> Result<Self, ConfigurationError> {
        let part = normalized_part(part_name)?;
        let key = property_key(name, namespace)?;
        let checks = self.part_properties.entry(part.clone()).or_default();
        if checks.iter().any(|(k, _)| *k == key) {
            return Err(ConfigurationError::duplicate(
                format!("part '{part}' property {key}"),
                "Only one check allowed per property, per part",
            ));
        }

        checks.push((key, expectation));
        Ok(self)
    }

    fn add_context_check(
        mut self,
        name: &str,
        namespace: &str,
        expectation: ValueExpectation,
    ) -> Result<Self, ConfigurationError> {
        let key = property_key(name, namespace)?;
        if self.context_properties.iter().any(|(k, _)| *k == key) {
            return Err(ConfigurationError::duplicate(
                format!("property {key}"),
                "Only one check can exist per property",
            ));
        }

        self.context_properties.push((key, expectation));
        Ok(self)
    }

    fn validate_part_count(&self, message: &Message) -> Result<(), ValidationFailure> {
        let Some(expected) = self.part_count else {
            return Ok(());
        };
        debug!(phase = %ValidationAspect::PartCount, "Running validation phase");

        let actual = message.part_count();
        if actual == expected {
            return Ok(());
        }
        Err(
            ValidationFailure::new(
                ValidationAspect::PartCount,
                format!("Part count mismatch. Expected: <{expected}>. Actual: <{actual}>."),
            )
            .with_values(expected.to_string(), actual.to_string()),
        )
    }

    fn validate_content_types(&self, message: &Message) -> Result<(), ValidationFailure> {
        if self.content_types.is_empty() {
            return Ok(());
        }
        debug!(phase = %ValidationAspect::PartContentType, "Running validation phase");

        for (name, part) in message.parts() {
            let Some(expected) = self.content_types.get(&normalize_part_name(name)) else {
                continue;
            };
            let actual = part.content_type();
            if actual != Some(expected.as_str()) {
                let actual = actual.unwrap_or(NONE);
                return Err(ValidationFailure::new(
                    ValidationAspect::PartContentType,
                    format!(
                        "Content type mismatch for part {name}. Expected: <{expected}>. Actual: <{actual}>."
                    ),
                )
                .with_target(name)
                .with_values(expected.as_str(), actual));
            }
        }

        self.require_parts(message, self.content_types.keys())
    }

    fn validate_part_order(&self, message: &Message) -> Result<(), ValidationFailure> {
        let Some(order) = &self.part_order else {
            return Ok(());
        };
        debug!(phase = %ValidationAspect::PartOrder, "Running validation phase");

        let names = message.part_names();
        for index in 0..order.len().max(names.len()) {
            let expected = order.get(index).map(String::as_str);
            let actual = names.get(index).copied();
            if expected == actual.map(normalize_part_name).as_deref() {
                continue;
            }

            let expected = expected.unwrap_or(NONE);
            let mut failure = ValidationFailure::new(
                ValidationAspect::PartOrder,
                format!(
                    "Unexpected part name at index {index}. Expected: <{expected}>. Actual: <{}>.",
                    actual.unwrap_or(NONE)
                ),
            )
            .with_values(expected, actual.unwrap_or(NONE));
            if let Some(actual) = actual {
                failure = failure.with_target(actual);
            }
            return Err(failure);
        }
        Ok(())
    }

    fn validate_context_properties(&self, message: &Message) -> Result<(), ValidationFailure> {
        if self.context_properties.is_empty() {
            return Ok(());
        }
        debug!(phase = %ValidationAspect::ContextProperty, "Running validation phase");

        check_properties(
            message.context(),
            &self.context_properties,
            ValidationAspect::ContextProperty,
            "Context property",
        )
    }

    fn validate_part_streams(&self, message: &mut Message) -> Result<(), ValidationFailure> {
        if self.part_streams.is_empty() {
            return Ok(());
        }
        debug!(phase = %ValidationAspect::PartStream, "Running validation phase");

        for (name, part) in message.parts_mut() {
            let Some(expectation) = self.part_streams.get(&normalize_part_name(name)) else {
                continue;
            };
            let Some(stream) = part.data() else {
                return Err(ValidationFailure::new(
                    ValidationAspect::PartStream,
                    format!("Part {name} has no data stream."),
                )
                .with_target(name));
            };
            self.check_stream(name, stream, expectation)?;
        }

        self.require_parts(message, self.part_streams.keys())
    }

    fn check_stream(
        &self,
        name: &str,
        stream: &mut dyn DataStream,
        expectation: &StreamExpectation,
    ) -> Result<(), ValidationFailure> {
        let stream_failure = |message: String| {
            ValidationFailure::new(ValidationAspect::PartStream, message).with_target(name)
        };
        let io_failure =
            |e: std::io::Error| stream_failure(format!("Part {name} stream could not be read: {e}"));

        if self.config.rewind_streams {
            stream.seek(SeekFrom::Start(0)).map_err(io_failure)?;
        }

        let outcome = match expectation {
            StreamExpectation::Text(expected) => {
                let actual = read_stream_text(stream).map_err(io_failure)?;
                if actual == *expected {
                    Ok(())
                } else {
                    let expected = self.config.preview(expected);
                    let actual = self.config.preview(&actual);
                    Err(stream_failure(format!(
                        "Stream content does not match for part {name}. Expected: <{expected}>. Actual: <{actual}>."
                    ))
                    .with_values(expected, actual))
                }
            }
            StreamExpectation::Pattern(regex) => {
                let actual = read_stream_text(stream).map_err(io_failure)?;
                if regex.is_match(&actual) {
                    Ok(())
                } else {
                    let actual = self.config.preview(&actual);
                    Err(stream_failure(format!(
                        "Stream content of part {name} does not match pattern <{regex}>. Actual: <{actual}>."
                    ))
                    .with_values(regex.as_str(), actual))
                }
            }
            StreamExpectation::Custom(check) => check(&mut *stream)
                .map_err(|e| stream_failure(format!("Stream check failed for part {name}: {e:#}"))),
        };

        if self.config.rewind_streams {
            stream.seek(SeekFrom::Start(0)).map_err(io_failure)?;
        }
        outcome
    }

    fn validate_part_properties(&self, message: &Message) -> Result<(), ValidationFailure> {
        if self.part_properties.is_empty() {
            return Ok(());
        }
        debug!(phase = %ValidationAspect::PartProperty, "Running validation phase");

        for (name, part) in message.parts() {
            let Some(checks) = self.part_properties.get(&normalize_part_name(name)) else {
                continue;
            };
            check_properties(
                part.properties(),
                checks,
                ValidationAspect::PartProperty,
                &format!("Part {name} property"),
            )?;
        }

        self.require_parts(message, self.part_properties.keys())
    }

    fn validate_unexpected_parts(&self, message: &Message) -> Result<(), ValidationFailure> {
        if !self.check_unexpected_parts {
            return Ok(());
        }
        debug!(phase = %ValidationAspect::UnexpectedPart, "Running validation phase");

        let expected: BTreeSet<&String> = self
            .part_streams
            .keys()
            .chain(self.part_properties.keys())
            .chain(self.content_types.keys())
            .collect();

        for name in message.part_names() {
            if !expected.contains(&normalize_part_name(name)) {
                return Err(ValidationFailure::new(
                    ValidationAspect::UnexpectedPart,
                    format!("Unexpected part {name} found."),
                )
                .with_target(name));
            }
        }
        Ok(())
    }

    fn require_parts<'a>(
        &self,
        message: &Message,
        configured: impl Iterator<Item = &'a String>,
    ) -> Result<(), ValidationFailure> {
        if !self.config.require_configured_parts {
            return Ok(());
        }

        for name in configured {
            if message.get_part(name).is_none() {
                return Err(ValidationFailure::new(
                    ValidationAspect::MissingPart,
                    format!("Expected part {name} not found."),
                )
                .with_target(name.as_str()));
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for PipelineResultValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineResultValidator")
            .field("config", &self.config)
            .field("part_count", &self.part_count)
            .field("part_order", &self.part_order)
            .field("content_types", &self.content_types)
            .field("context_properties", &self.context_properties.len())
            .field("part_streams", &self.part_streams.keys().collect::<Vec<_>>())
            .field("part_properties", &self.part_properties.keys().collect::<Vec<_>>())
            .field("check_unexpected_parts", &self.check_unexpected_parts)
            .finish()
    }
}

fn normalized_part(part_name: &str) -> Result<String, ConfigurationError> {
    if part_name.is_empty() {
        return Err(ConfigurationError::missing("part_name"));
    }
    Ok(normalize_part_name(part_name))
}

fn property_key(name: &str, namespace: &str) -> Result<PropertyKey, ConfigurationError> {
    if name.is_empty() {
        return Err(ConfigurationError::missing("name"));
    }
    if namespace.is_empty() {
        return Err(ConfigurationError::missing("namespace"));
    }
    Ok(PropertyKey::new(name, namespace))
}

fn check_properties(
    store: &PropertyStore,
    checks: &[(PropertyKey, ValueExpectation)],
    aspect: ValidationAspect,
    label: &str,
) -> Result<(), ValidationFailure> {
    for (key, expectation) in checks {
        let actual = store.read(&key.name, &key.namespace);
        if let Err(mismatch) = expectation.check(actual) {
            let failure = match mismatch {
                Mismatch::Values { expected, actual } => ValidationFailure::new(
                    aspect,
                    format!("{label} {key} mismatch. Expected: <{expected}>. Actual: <{actual}>."),
                )
                .with_values(expected, actual),
                Mismatch::Check(reason) => {
                    ValidationFailure::new(aspect, format!("{label} {key} check failed: {reason}"))
                }
            };
            return Err(failure.with_target(key.to_string()));
        }
    }
    Ok(())
}

fn read_stream_text(stream: &mut dyn DataStream) -> std::io::Result<String> {
    let mut bytes = Vec::new();
    stream.read_to_end(&mut bytes)?;
    decode_text(bytes)
}

fn display_value(value: Option<&PropertyValue>) -> String {
    match value {
        None | Some(PropertyValue::Null) => "(null)".to_string(),
        Some(PropertyValue::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
