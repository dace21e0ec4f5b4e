//! Reference processing stages
//!
//! All producing stages work sample by sample on the YUV data and support
//! both YUY2 and NV12 views. They finish synchronously; the returned future
//! is ready on first poll.

use futures::FutureExt;
use parking_lot::Mutex;
use tracing::trace;

use framefx_format::{ImageView, ImageViewMut, ProcessingStage, StageError, StageFuture};

use crate::error::{RegistryError, Result};
use crate::yuv::{map_samples, mean_luma, mean_rgb, rgb_to_yuv, Sample};

/// Mid-scale chroma (no color)
const NEUTRAL_CHROMA: u8 = 128;

fn render_mapped<'a, F>(
    name: &'a str,
    source: &'a ImageView<'_>,
    dest: Option<&'a mut ImageViewMut<'_>>,
    f: F,
) -> StageFuture<'a>
where
    F: Fn(Sample, u8) -> u8 + Send + 'a,
{
    async move {
        let dest = dest.ok_or_else(|| StageError::failed(name, "no destination image"))?;
        map_samples(source, dest, f)?;
        Ok::<(), StageError>(())
    }
    .boxed()
}

/// Copies the source unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl ProcessingStage for Identity {
    fn name(&self) -> &str {
        "identity"
    }

    fn render<'a>(
        &'a self,
        source: &'a ImageView<'_>,
        dest: Option<&'a mut ImageViewMut<'_>>,
    ) -> StageFuture<'a> {
        async move {
            let dest = dest.ok_or_else(|| StageError::failed("identity", "no destination image"))?;
            dest.copy_from(source)?;
            Ok::<(), StageError>(())
        }
        .boxed()
    }
}

/// Drops all color, keeping luma
#[derive(Debug, Clone, Copy, Default)]
pub struct Grayscale;

impl ProcessingStage for Grayscale {
    fn name(&self) -> &str {
        "grayscale"
    }

    fn render<'a>(
        &'a self,
        source: &'a ImageView<'_>,
        dest: Option<&'a mut ImageViewMut<'_>>,
    ) -> StageFuture<'a> {
        render_mapped(self.name(), source, dest, |kind, value| match kind {
            Sample::Y => value,
            Sample::U | Sample::V => NEUTRAL_CHROMA,
        })
    }
}

/// Inverts every sample
#[derive(Debug, Clone, Copy, Default)]
pub struct Negative;

impl ProcessingStage for Negative {
    fn name(&self) -> &str {
        "negative"
    }

    fn render<'a>(
        &'a self,
        source: &'a ImageView<'_>,
        dest: Option<&'a mut ImageViewMut<'_>>,
    ) -> StageFuture<'a> {
        render_mapped(self.name(), source, dest, |_, value| 255 - value)
    }
}

/// Shifts luma by a fraction of full scale
#[derive(Debug, Clone, Copy)]
pub struct Brightness {
    amount: f32,
    offset: i32,
}

impl Brightness {
    /// Create a brightness stage; `amount` must be within `[-1.0, 1.0]`
    pub fn new(amount: f32) -> Result<Self> {
        if !amount.is_finite() || !(-1.0..=1.0).contains(&amount) {
            return Err(RegistryError::invalid(
                "brightness",
                format!("amount {amount} outside [-1, 1]"),
            ));
        }
        Ok(Self {
            amount,
            offset: (amount * 255.0).round() as i32,
        })
    }

    pub fn amount(&self) -> f32 {
        self.amount
    }
}

impl ProcessingStage for Brightness {
    fn name(&self) -> &str {
        "brightness"
    }

    fn render<'a>(
        &'a self,
        source: &'a ImageView<'_>,
        dest: Option<&'a mut ImageViewMut<'_>>,
    ) -> StageFuture<'a> {
        let offset = self.offset;
        render_mapped(self.name(), source, dest, move |kind, value| match kind {
            Sample::Y => (i32::from(value) + offset).clamp(0, 255) as u8,
            Sample::U | Sample::V => value,
        })
    }
}

/// Replaces chroma with that of a fixed RGB color
#[derive(Debug, Clone, Copy)]
pub struct Tint {
    rgb: (u8, u8, u8),
    u: u8,
    v: u8,
}

impl Tint {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        let (_, u, v) = rgb_to_yuv(r, g, b);
        Self { rgb: (r, g, b), u, v }
    }

    /// Tint color as RGB
    pub fn rgb(&self) -> (u8, u8, u8) {
        self.rgb
    }
}

impl ProcessingStage for Tint {
    fn name(&self) -> &str {
        "tint"
    }

    fn render<'a>(
        &'a self,
        source: &'a ImageView<'_>,
        dest: Option<&'a mut ImageViewMut<'_>>,
    ) -> StageFuture<'a> {
        let (u, v) = (self.u, self.v);
        render_mapped(self.name(), source, dest, move |kind, value| match kind {
            Sample::Y => value,
            Sample::U => u,
            Sample::V => v,
        })
    }
}

/// Snapshot of what a [`FrameProbe`] has observed
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ProbeStats {
    /// Frames rendered through the probe
    pub frames: u64,
    /// Mean luma of the most recent frame
    pub last_mean_luma: Option<f64>,
    /// Mean color of the most recent frame
    pub last_mean_rgb: Option<(u8, u8, u8)>,
}

/// Consume-only stage recording frame statistics
#[derive(Debug, Default)]
pub struct FrameProbe {
    stats: Mutex<ProbeStats>,
}

impl FrameProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> ProbeStats {
        *self.stats.lock()
    }

    pub fn frames(&self) -> u64 {
        self.stats.lock().frames
    }

    pub fn reset(&self) {
        *self.stats.lock() = ProbeStats::default();
    }
}

impl ProcessingStage for FrameProbe {
    fn name(&self) -> &str {
        "probe"
    }

    fn produces_output(&self) -> bool {
        false
    }

    fn render<'a>(
        &'a self,
        source: &'a ImageView<'_>,
        _dest: Option<&'a mut ImageViewMut<'_>>,
    ) -> StageFuture<'a> {
        let luma = mean_luma(source);
        let rgb = mean_rgb(source);
        let mut stats = self.stats.lock();
        stats.frames += 1;
        stats.last_mean_luma = luma;
        stats.last_mean_rgb = rgb;
        trace!("Probe frame {} mean luma {:?} rgb {:?}", stats.frames, luma, rgb);
        futures::future::ready(Ok(())).boxed()
    }
}
