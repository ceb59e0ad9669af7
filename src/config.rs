//! Pipeline configuration.
//!
//! Per-method [`ExecutionDirectives`] are usually declared in code by an
//! [`Action`](crate::Action), but every configuration type also
//! deserializes from JSON so they can be kept next to routing tables.

use std::env;

use serde::Deserialize;

use crate::error::Error;

/// Default name of a form's reset method.
pub const DEFAULT_RESET_METHOD: &str = "reset";

/// Form processing directives for one handler method.
///
/// # Examples
///
/// ```
/// use action_pipeline::ExecutionDirectives;
///
/// let directives = ExecutionDirectives::from_json(
///     r#"{ "validation_steps": ["checkAge", "@"], "stop_on_first_error": false }"#,
/// )
/// .unwrap();
///
/// assert_eq!(directives.validation_steps, vec!["checkAge", "@"]);
/// assert!(directives.validate);
/// assert_eq!(directives.reset_method, "reset");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ExecutionDirectives {
    /// Ordered validation step names; `"@"` marks the constraint step
    pub validation_steps: Vec<String>,
    /// Whether validation runs at all
    pub validate: bool,
    /// Evict the form from the registry after a successful handler call
    pub remove_form_on_success: bool,
    /// Reset method invoked before binding; empty skips the reset
    pub reset_method: String,
    /// Stop at the first step that produced messages
    pub stop_on_first_error: bool,
}

impl Default for ExecutionDirectives {
    fn default() -> Self {
        Self {
            validation_steps: Vec::new(),
            validate: true,
            remove_form_on_success: false,
            reset_method: DEFAULT_RESET_METHOD.to_string(),
            stop_on_first_error: true,
        }
    }
}

impl ExecutionDirectives {
    /// Creates directives with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the validation step names.
    pub fn steps<I, S>(mut self, steps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.validation_steps = steps.into_iter().map(Into::into).collect();
        self
    }

    /// Enables or disables validation.
    pub fn validate(mut self, enabled: bool) -> Self {
        self.validate = enabled;
        self
    }

    /// Evicts the form after a successful handler call.
    pub fn remove_form_on_success(mut self, remove: bool) -> Self {
        self.remove_form_on_success = remove;
        self
    }

    /// Sets the reset method name. An empty name disables the reset.
    pub fn reset_method(mut self, name: impl Into<String>) -> Self {
        self.reset_method = name.into();
        self
    }

    /// Sets whether validation stops at the first failing step.
    pub fn stop_on_first_error(mut self, stop: bool) -> Self {
        self.stop_on_first_error = stop;
        self
    }

    /// Returns `true` if the reset method was explicitly renamed.
    pub fn has_custom_reset(&self) -> bool {
        !self.reset_method.is_empty() && self.reset_method != DEFAULT_RESET_METHOD
    }

    /// Parses directives from JSON. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] on malformed input.
    pub fn from_json(text: &str) -> Result<Self, Error> {
        serde_json::from_str(text)
            .map_err(|e| Error::configuration(format!("invalid execution directives: {}", e)))
    }
}

/// Maps forward designators to view paths.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Prepended to relative designators
    pub prefix: String,
    /// Appended to relative designators
    pub suffix: String,
}

/// Top-level pipeline configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// View resolution settings
    pub view: ViewConfig,
}

impl PipelineConfig {
    /// Loads configuration from environment variables.
    ///
    /// - `ACTION_PIPELINE_VIEW_PREFIX` (default: empty)
    /// - `ACTION_PIPELINE_VIEW_SUFFIX` (default: empty)
    pub fn from_env() -> Self {
        let prefix = env::var("ACTION_PIPELINE_VIEW_PREFIX").unwrap_or_default();
        let suffix = env::var("ACTION_PIPELINE_VIEW_SUFFIX").unwrap_or_default();

        tracing::debug!(prefix = %prefix, suffix = %suffix, "pipeline configuration loaded");

        Self {
            view: ViewConfig { prefix, suffix },
        }
    }

    /// Parses configuration from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] on malformed input.
    pub fn from_json(text: &str) -> Result<Self, Error> {
        serde_json::from_str(text)
            .map_err(|e| Error::configuration(format!("invalid pipeline config: {}", e)))
    }
}
