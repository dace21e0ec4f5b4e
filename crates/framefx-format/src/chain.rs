//! Processing stage contract and ordered chains
//!
//! A stage consumes a source image and, unless it is consume-only, renders
//! into a destination image. Rendering is asynchronous: stages return a
//! boxed future and the caller decides how to drive it.

use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;

use crate::error::StageError;
use crate::image::{ImageView, ImageViewMut};

/// Future returned by [`ProcessingStage::render`]
pub type StageFuture<'a> = BoxFuture<'a, Result<(), StageError>>;

/// One step of an image-processing chain
///
/// `render` receives the current image as `source`. Producing stages get a
/// destination of the same geometry and must fill it; consume-only stages
/// get `None` and only observe.
pub trait ProcessingStage: Send + Sync + fmt::Debug {
    /// Short name used in logs and errors
    fn name(&self) -> &str;

    /// Whether the stage writes a destination image
    fn produces_output(&self) -> bool {
        true
    }

    /// Render `source`, writing into `dest` when present
    fn render<'a>(
        &'a self,
        source: &'a ImageView<'_>,
        dest: Option<&'a mut ImageViewMut<'_>>,
    ) -> StageFuture<'a>;
}

/// Ordered, cheaply cloneable list of processing stages
///
/// The first stage receives the decoded input; the last producing stage
/// renders into the destination.
#[derive(Clone, Default)]
pub struct ProcessingChain {
    stages: Vec<Arc<dyn ProcessingStage>>,
}

impl ProcessingChain {
    /// Empty chain
    pub fn new() -> Self {
        Self::default()
    }

    /// Chain from an ordered list of stages
    pub fn from_stages(stages: Vec<Arc<dyn ProcessingStage>>) -> Self {
        Self { stages }
    }

    /// Append a stage, builder style
    #[must_use]
    pub fn with_stage(mut self, stage: impl ProcessingStage + 'static) -> Self {
        self.stages.push(Arc::new(stage));
        self
    }

    /// Append a shared stage
    pub fn push(&mut self, stage: Arc<dyn ProcessingStage>) {
        self.stages.push(stage);
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn first(&self) -> Option<&Arc<dyn ProcessingStage>> {
        self.stages.first()
    }

    pub fn last(&self) -> Option<&Arc<dyn ProcessingStage>> {
        self.stages.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Arc<dyn ProcessingStage>> {
        self.stages.iter()
    }

    /// Stage names in order
    pub fn names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name()).collect()
    }
}

impl FromIterator<Arc<dyn ProcessingStage>> for ProcessingChain {
    fn from_iter<I: IntoIterator<Item = Arc<dyn ProcessingStage>>>(iter: I) -> Self {
        Self {
            stages: iter.into_iter().collect(),
        }
    }
}

impl fmt::Debug for ProcessingChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessingChain")
            .field("stages", &self.names())
            .finish()
    }
}
