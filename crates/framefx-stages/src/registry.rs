//! Named stage factories and textual chain lists
//!
//! Hosts describe a chain as a comma separated list of stage names, each
//! optionally followed by `:` and its parameters. Parameters of one stage
//! are also comma separated, so a bare number continues the previous stage:
//!
//! ```text
//! grayscale, brightness:0.25, tint:255,200,150
//! ```
//!
//! # Examples
//!
//! ```rust
//! use framefx_stages::StageRegistry;
//!
//! let registry = StageRegistry::with_builtin();
//! let chain = registry.parse_chain("grayscale, brightness:0.25, tint:255,200,150")?;
//!
//! assert_eq!(chain.names(), vec!["grayscale", "brightness", "tint"]);
//! # Ok::<(), framefx_stages::RegistryError>(())
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use framefx_format::{ProcessingChain, ProcessingStage};

use crate::error::{RegistryError, Result};
use crate::stages::{Brightness, FrameProbe, Grayscale, Identity, Negative, Tint};

/// Builds a stage from its textual parameters
pub type StageFactory =
    Arc<dyn Fn(&[&str]) -> Result<Arc<dyn ProcessingStage>> + Send + Sync + 'static>;

/// One parsed entry of a stage list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageSpec {
    /// Lowercased stage name
    pub name: String,
    /// Raw parameter strings in order
    pub params: Vec<String>,
}

/// Split a stage list into names and parameters
pub fn parse_stage_list(list: &str) -> Result<Vec<StageSpec>> {
    let mut specs: Vec<StageSpec> = Vec::new();

    for token in list.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        let starts_name = token
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic());

        if starts_name {
            let (name, param) = match token.split_once(':') {
                Some((name, param)) => (name.trim(), Some(param.trim())),
                None => (token, None),
            };
            specs.push(StageSpec {
                name: name.to_ascii_lowercase(),
                params: param
                    .filter(|p| !p.is_empty())
                    .map(str::to_owned)
                    .into_iter()
                    .collect(),
            });
        } else {
            match specs.last_mut() {
                Some(spec) => spec.params.push(token.to_owned()),
                None => {
                    return Err(RegistryError::invalid(
                        token,
                        "parameter before any stage name",
                    ))
                }
            }
        }
    }

    if specs.is_empty() {
        return Err(RegistryError::EmptyList);
    }
    Ok(specs)
}

fn expect_params<'p>(stage: &str, params: &'p [&str], count: usize) -> Result<&'p [&'p str]> {
    if params.len() != count {
        return Err(RegistryError::invalid(
            stage,
            format!("expected {count} parameter(s), got {}", params.len()),
        ));
    }
    Ok(params)
}

fn parse_param<T: std::str::FromStr>(stage: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| RegistryError::invalid(stage, format!("cannot parse '{value}'")))
}

/// Registry of named stage factories
///
/// Lookups are case-insensitive. The registry can be shared and extended at
/// runtime; registering an existing name replaces its factory.
pub struct StageRegistry {
    factories: RwLock<HashMap<String, StageFactory>>,
}

impl StageRegistry {
    /// Registry with no stages
    pub fn new() -> Self {
        Self {
            factories: RwLock::new(HashMap::new()),
        }
    }

    /// Registry with the built-in stages
    ///
    /// | Name | Parameters |
    /// |------|------------|
    /// | `identity` | none |
    /// | `grayscale` | none |
    /// | `negative` | none |
    /// | `brightness` | amount in `[-1, 1]` |
    /// | `tint` | `r,g,b` |
    /// | `probe` | none |
    pub fn with_builtin() -> Self {
        let registry = Self::new();

        registry.register("identity", |p| {
            expect_params("identity", p, 0)?;
            Ok(Arc::new(Identity) as Arc<dyn ProcessingStage>)
        });
        registry.register("grayscale", |p| {
            expect_params("grayscale", p, 0)?;
            Ok(Arc::new(Grayscale) as Arc<dyn ProcessingStage>)
        });
        registry.register("negative", |p| {
            expect_params("negative", p, 0)?;
            Ok(Arc::new(Negative) as Arc<dyn ProcessingStage>)
        });
        registry.register("brightness", |p| {
            let p = expect_params("brightness", p, 1)?;
            let amount = parse_param("brightness", p[0])?;
            Ok(Arc::new(Brightness::new(amount)?) as Arc<dyn ProcessingStage>)
        });
        registry.register("tint", |p| {
            let p = expect_params("tint", p, 3)?;
            let r = parse_param("tint", p[0])?;
            let g = parse_param("tint", p[1])?;
            let b = parse_param("tint", p[2])?;
            Ok(Arc::new(Tint::new(r, g, b)) as Arc<dyn ProcessingStage>)
        });
        registry.register("probe", |p| {
            expect_params("probe", p, 0)?;
            Ok(Arc::new(FrameProbe::new()) as Arc<dyn ProcessingStage>)
        });

        registry
    }

    /// Register a factory under `name`
    pub fn register<F>(&self, name: &str, factory: F)
    where
        F: Fn(&[&str]) -> Result<Arc<dyn ProcessingStage>> + Send + Sync + 'static,
    {
        let key = name.to_ascii_lowercase();
        debug!("Registering stage '{}'", key);
        self.factories.write().insert(key, Arc::new(factory));
    }

    /// Whether a stage is registered under `name`
    pub fn contains(&self, name: &str) -> bool {
        self.factories.read().contains_key(&name.to_ascii_lowercase())
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.factories.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Build one stage
    pub fn build(&self, name: &str, params: &[&str]) -> Result<Arc<dyn ProcessingStage>> {
        let key = name.to_ascii_lowercase();
        // Clone the factory out so user factories run without the lock held.
        let factory = self
            .factories
            .read()
            .get(&key)
            .cloned()
            .ok_or(RegistryError::UnknownStage(key))?;
        factory(params)
    }

    /// Build a chain from a textual stage list
    pub fn parse_chain(&self, list: &str) -> Result<ProcessingChain> {
        let specs = parse_stage_list(list)?;

        let chain = specs
            .iter()
            .map(|spec| {
                let params: Vec<&str> = spec.params.iter().map(String::as_str).collect();
                self.build(&spec.name, &params)
            })
            .collect::<Result<ProcessingChain>>()?;

        debug!("Parsed chain {:?} from '{}'", chain.names(), list);
        Ok(chain)
    }
}

impl Default for StageRegistry {
    fn default() -> Self {
        Self::with_builtin()
    }
}

impl fmt::Debug for StageRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StageRegistry")
            .field("stages", &self.names())
            .finish()
    }
}
