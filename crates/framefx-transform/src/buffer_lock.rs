//! Scoped video buffer locks
//!
//! A [`VideoBufferLock`] holds a buffer lock for as long as it lives and
//! exposes the top row and stride of the frame it covers. The lock is
//! released when the value drops, including on early returns.

use tracing::trace;

use framefx_format::{default_stride, FrameBuffer, FrameBufferMut, StreamFormat};

use crate::error::{Result, TransformError};
use crate::sample::{BufferGuard, MediaBuffer};

/// Intended access to a locked buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockMode {
    Read,
    Write,
}

/// Lock over one frame of a [`MediaBuffer`]
pub struct VideoBufferLock<'a> {
    guard: BufferGuard<'a>,
    stride: i32,
    mode: LockMode,
}

impl<'a> VideoBufferLock<'a> {
    /// Lock `buffer` for a frame described by `format`
    ///
    /// The stride is the format's default stride. Fails if the buffer is
    /// already locked or is too short to hold the frame.
    pub fn lock(buffer: &'a dyn MediaBuffer, mode: LockMode, format: &StreamFormat) -> Result<Self> {
        let stride = default_stride(format)?;
        let needed = usize::try_from(format.image_size()?)
            .map_err(|_| TransformError::buffer("frame size exceeds the address space"))?;

        if stride <= 0 {
            return Err(TransformError::buffer(format!(
                "unsupported stride {stride} for contiguous buffer"
            )));
        }

        let guard = buffer.lock()?;
        if guard.len() < needed {
            return Err(TransformError::buffer(format!(
                "buffer holds {} bytes, frame needs {needed}",
                guard.len()
            )));
        }

        trace!("Locked {:?} buffer: {} bytes, stride {}", mode, guard.len(), stride);
        Ok(Self {
            guard,
            stride,
            mode,
        })
    }

    /// Byte distance between rows
    pub fn stride(&self) -> i32 {
        self.stride
    }

    pub fn mode(&self) -> LockMode {
        self.mode
    }

    /// Frame bytes starting at the top row
    pub fn top_row(&self) -> &[u8] {
        &self.guard
    }

    /// Read view for a conversion function
    pub fn frame(&self) -> FrameBuffer<'_> {
        FrameBuffer {
            data: &self.guard,
            stride: self.stride,
        }
    }

    /// Write view for a conversion function; fails for read locks
    pub fn frame_mut(&mut self) -> Result<FrameBufferMut<'_>> {
        if self.mode != LockMode::Write {
            return Err(TransformError::buffer("buffer was locked for reading"));
        }
        Ok(FrameBufferMut {
            data: &mut self.guard,
            stride: self.stride,
        })
    }
}

impl std::fmt::Debug for VideoBufferLock<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoBufferLock")
            .field("len", &self.guard.len())
            .field("stride", &self.stride)
            .field("mode", &self.mode)
            .finish()
    }
}
