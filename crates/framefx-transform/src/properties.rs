//! Configuration properties and the attribute store
//!
//! [`PropertySet`] is what a host hands the transform at configure time. The
//! processing chain is looked up under [`IMAGE_PROVIDERS_KEY`].
//! [`Attributes`] is an opaque key/value store the transform exposes to the
//! host and never interprets.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use framefx_format::ProcessingChain;

use crate::error::{Result, TransformError};

/// Property key carrying the processing chain
pub const IMAGE_PROVIDERS_KEY: &str = "image_providers";

/// Value stored in a [`PropertySet`]
#[derive(Debug, Clone)]
pub enum PropertyValue {
    Chain(ProcessingChain),
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
}

impl PropertyValue {
    fn kind(&self) -> &'static str {
        match self {
            Self::Chain(_) => "chain",
            Self::Text(_) => "text",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::Bool(_) => "bool",
        }
    }
}

impl From<ProcessingChain> for PropertyValue {
    fn from(chain: ProcessingChain) -> Self {
        Self::Chain(chain)
    }
}

impl From<&str> for PropertyValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// Host-supplied configuration properties
///
/// # Examples
///
/// ```rust
/// use framefx_format::ProcessingChain;
/// use framefx_stages::Grayscale;
/// use framefx_transform::{PropertySet, IMAGE_PROVIDERS_KEY};
///
/// let properties = PropertySet::new()
///     .with(IMAGE_PROVIDERS_KEY, ProcessingChain::new().with_stage(Grayscale));
///
/// assert_eq!(properties.image_providers()?.len(), 1);
/// # Ok::<(), framefx_transform::TransformError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct PropertySet {
    values: HashMap<String, PropertyValue>,
}

impl PropertySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a property, builder style
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert a property, returning the previous value
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<PropertyValue>,
    ) -> Option<PropertyValue> {
        self.values.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        self.values.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<PropertyValue> {
        self.values.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The processing chain stored under [`IMAGE_PROVIDERS_KEY`]
    ///
    /// Fails if the key is missing, holds another kind of value, or holds an
    /// empty chain.
    pub fn image_providers(&self) -> Result<&ProcessingChain> {
        match self.values.get(IMAGE_PROVIDERS_KEY) {
            None => Err(TransformError::config(format!(
                "property '{IMAGE_PROVIDERS_KEY}' is missing"
            ))),
            Some(PropertyValue::Chain(chain)) if chain.is_empty() => Err(TransformError::config(
                format!("property '{IMAGE_PROVIDERS_KEY}' holds an empty chain"),
            )),
            Some(PropertyValue::Chain(chain)) => Ok(chain),
            Some(other) => Err(TransformError::config(format!(
                "property '{IMAGE_PROVIDERS_KEY}' must be a chain, got {}",
                other.kind()
            ))),
        }
    }
}

/// Value stored in an [`Attributes`] store
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    U32(u32),
    U64(u64),
    F64(f64),
    Text(String),
    Bytes(Vec<u8>),
}

/// Shared attribute store
///
/// Clones share the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct Attributes {
    inner: Arc<RwLock<HashMap<String, AttributeValue>>>,
}

impl Attributes {
    /// Create a store with room for `capacity` entries
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::with_capacity(capacity))),
        }
    }

    /// Set an attribute, returning the previous value
    pub fn set(&self, key: impl Into<String>, value: AttributeValue) -> Option<AttributeValue> {
        self.inner.write().insert(key.into(), value)
    }

    pub fn get(&self, key: &str) -> Option<AttributeValue> {
        self.inner.read().get(key).cloned()
    }

    pub fn remove(&self, key: &str) -> Option<AttributeValue> {
        self.inner.write().remove(key)
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    pub fn clear(&self) {
        self.inner.write().clear();
    }

    /// Keys currently set, sorted
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.inner.read().keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Whether two handles refer to the same store
    pub fn shares_store_with(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

#[cfg(test)]
mod tests {
    use framefx_stages::Identity;

    use super::*;

    #[test]
    fn test_image_providers() {
        let properties = PropertySet::new().with(
            IMAGE_PROVIDERS_KEY,
            ProcessingChain::new().with_stage(Identity),
        );
        let chain = properties.image_providers().expect("chain present");
        assert_eq!(chain.names(), vec!["identity"]);
    }

    #[test]
    fn test_image_providers_errors() {
        let missing = PropertySet::new();
        assert!(matches!(missing.image_providers(), Err(TransformError::Config(_))));

        let wrong_type = PropertySet::new().with(IMAGE_PROVIDERS_KEY, "grayscale");
        let err = wrong_type.image_providers().expect_err("text is not a chain");
        assert!(err.to_string().contains("got text"));

        let empty = PropertySet::new().with(IMAGE_PROVIDERS_KEY, ProcessingChain::new());
        assert!(matches!(empty.image_providers(), Err(TransformError::Config(_))));
    }

    #[test]
    fn test_property_set_basics() {
        let mut properties = PropertySet::new().with("quality", 3i64);
        assert!(properties.contains_key("quality"));
        assert!(properties.insert("quality", true).is_some());
        assert_eq!(properties.len(), 1);
        assert!(matches!(properties.remove("quality"), Some(PropertyValue::Bool(true))));
        assert!(properties.is_empty());
    }

    #[test]
    fn test_attributes_shared() {
        let attributes = Attributes::with_capacity(3);
        let handle = attributes.clone();

        handle.set("frames", AttributeValue::U64(7));
        assert_eq!(attributes.get("frames"), Some(AttributeValue::U64(7)));
        assert!(attributes.shares_store_with(&handle));
        assert!(!attributes.shares_store_with(&Attributes::default()));

        attributes.set("name", AttributeValue::Text("fx".into()));
        assert_eq!(handle.keys(), vec!["frames", "name"]);

        handle.clear();
        assert!(attributes.is_empty());
    }
}
