//! Transform configuration
//!
//! # Examples
//!
//! ```rust
//! use framefx_transform::TransformConfig;
//!
//! // Using builder pattern
//! let config = TransformConfig::builder()
//!     .copy_sample_metadata(false)
//!     .max_dimension(4096)
//!     .build();
//! assert!(config.validate().is_ok());
//!
//! // Using struct literal with defaults
//! let config = TransformConfig {
//!     attribute_capacity: 8,
//!     ..Default::default()
//! };
//! assert!(config.copy_sample_metadata);
//! ```

/// Configuration for an [`EffectTransform`](crate::EffectTransform)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformConfig {
    /// Copy sample time and duration from input to output (default: true)
    ///
    /// Copy failures are ignored; the metadata is optional.
    pub copy_sample_metadata: bool,

    /// Initial capacity of the attribute store (default: 3)
    pub attribute_capacity: usize,

    /// Largest width or height accepted for an input type (default: 16384)
    ///
    /// Larger frames are rejected as an invalid media type when the input
    /// type is committed.
    pub max_dimension: u32,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            copy_sample_metadata: true,
            attribute_capacity: 3,
            max_dimension: 16384,
        }
    }
}

impl TransformConfig {
    /// Create a builder
    #[must_use]
    pub fn builder() -> TransformConfigBuilder {
        TransformConfigBuilder::default()
    }

    /// Validate configuration and return any issues
    ///
    /// Returns `Ok(())` if configuration is valid, or a list of issues.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut issues = Vec::new();

        if self.attribute_capacity == 0 {
            issues.push("attribute_capacity must be at least 1".to_string());
        }

        if self.max_dimension == 0 {
            issues.push("max_dimension must be at least 1".to_string());
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(issues)
        }
    }
}

/// Builder for [`TransformConfig`]
#[derive(Debug, Default)]
pub struct TransformConfigBuilder {
    copy_sample_metadata: Option<bool>,
    attribute_capacity: Option<usize>,
    max_dimension: Option<u32>,
}

impl TransformConfigBuilder {
    /// Set whether sample time and duration are copied
    #[must_use]
    pub fn copy_sample_metadata(mut self, enable: bool) -> Self {
        self.copy_sample_metadata = Some(enable);
        self
    }

    /// Set attribute store capacity
    #[must_use]
    pub fn attribute_capacity(mut self, capacity: usize) -> Self {
        self.attribute_capacity = Some(capacity);
        self
    }

    /// Set the largest accepted frame dimension
    #[must_use]
    pub fn max_dimension(mut self, max: u32) -> Self {
        self.max_dimension = Some(max);
        self
    }

    /// Build configuration, filling unset fields from defaults
    #[must_use]
    pub fn build(self) -> TransformConfig {
        let defaults = TransformConfig::default();

        TransformConfig {
            copy_sample_metadata: self
                .copy_sample_metadata
                .unwrap_or(defaults.copy_sample_metadata),
            attribute_capacity: self
                .attribute_capacity
                .unwrap_or(defaults.attribute_capacity),
            max_dimension: self.max_dimension.unwrap_or(defaults.max_dimension),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TransformConfig::default();
        assert!(config.copy_sample_metadata);
        assert_eq!(config.attribute_capacity, 3);
        assert_eq!(config.max_dimension, 16384);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = TransformConfig::builder()
            .copy_sample_metadata(false)
            .attribute_capacity(1)
            .build();

        assert!(!config.copy_sample_metadata);
        assert_eq!(config.attribute_capacity, 1);
        assert_eq!(config.max_dimension, 16384);
    }

    #[test]
    fn test_validation() {
        let config = TransformConfig {
            attribute_capacity: 0,
            max_dimension: 0,
            ..Default::default()
        };

        let issues = config.validate().expect_err("both fields invalid");
        assert_eq!(issues.len(), 2);
        assert!(issues[0].contains("attribute_capacity"));
        assert!(issues[1].contains("max_dimension"));
    }
}
