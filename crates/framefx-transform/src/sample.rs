//! Media samples and buffers
//!
//! The transform sees samples through the [`MediaSample`] and
//! [`MediaBuffer`] traits so hosts can plug in their own memory. Buffer
//! access is scoped: [`MediaBuffer::lock`] returns a guard and the buffer
//! is unlocked when the guard drops, on every path.
//!
//! [`MemorySample`] is a heap-backed implementation for hosts without their
//! own buffer type, and for tests.

use std::ops::DerefMut;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::{Mutex, MutexGuard};

use crate::error::{Result, TransformError};

/// Scoped access to buffer bytes, released on drop
pub type BufferGuard<'a> = Box<dyn DerefMut<Target = [u8]> + 'a>;

/// Contiguous frame memory
pub trait MediaBuffer: Send + Sync {
    /// Lock the buffer for access
    ///
    /// Fails if the buffer is already locked.
    fn lock(&self) -> Result<BufferGuard<'_>>;

    /// Allocated size in bytes
    fn max_length(&self) -> usize;

    /// Bytes of valid data
    fn current_length(&self) -> usize;

    /// Set the valid data length; fails if it exceeds [`max_length`](Self::max_length)
    fn set_current_length(&self, len: usize) -> Result<()>;
}

/// One unit of frame data exchanged with the host
///
/// Times are in 100-nanosecond units.
pub trait MediaSample: Send + Sync {
    /// The sample's memory as one contiguous buffer
    fn buffer(&self) -> Result<&dyn MediaBuffer>;

    fn sample_time(&self) -> Option<i64>;

    fn sample_duration(&self) -> Option<i64>;

    fn set_sample_time(&self, time: i64) -> Result<()>;

    fn set_sample_duration(&self, duration: i64) -> Result<()>;
}

/// Heap-backed [`MediaBuffer`]
#[derive(Debug)]
pub struct MemoryBuffer {
    data: Mutex<Vec<u8>>,
    capacity: usize,
    current_length: AtomicUsize,
}

impl MemoryBuffer {
    /// Zeroed buffer of `len` bytes with no valid data
    pub fn new(len: usize) -> Self {
        Self {
            data: Mutex::new(vec![0; len]),
            capacity: len,
            current_length: AtomicUsize::new(0),
        }
    }

    /// Buffer holding `bytes`, all of them valid
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        let len = bytes.len();
        Self {
            data: Mutex::new(bytes),
            capacity: len,
            current_length: AtomicUsize::new(len),
        }
    }

    /// Copy of the valid bytes
    pub fn to_vec(&self) -> Vec<u8> {
        let data = self.data.lock();
        data[..self.current_length()].to_vec()
    }
}

impl MediaBuffer for MemoryBuffer {
    fn lock(&self) -> Result<BufferGuard<'_>> {
        let guard = self
            .data
            .try_lock()
            .ok_or_else(|| TransformError::buffer("buffer is already locked"))?;
        Ok(Box::new(MutexGuard::map(guard, |data| data.as_mut_slice())))
    }

    fn max_length(&self) -> usize {
        self.capacity
    }

    fn current_length(&self) -> usize {
        self.current_length.load(Ordering::Acquire)
    }

    fn set_current_length(&self, len: usize) -> Result<()> {
        let max = self.max_length();
        if len > max {
            return Err(TransformError::buffer(format!(
                "length {len} exceeds buffer size {max}"
            )));
        }
        self.current_length.store(len, Ordering::Release);
        Ok(())
    }
}

/// Heap-backed [`MediaSample`] with a single buffer
#[derive(Debug)]
pub struct MemorySample {
    buffer: MemoryBuffer,
    time: Mutex<Option<i64>>,
    duration: Mutex<Option<i64>>,
}

impl MemorySample {
    /// Sample with a zeroed buffer of `len` bytes
    pub fn new(len: usize) -> Self {
        Self::with_buffer(MemoryBuffer::new(len))
    }

    /// Sample holding `bytes`
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self::with_buffer(MemoryBuffer::from_bytes(bytes))
    }

    fn with_buffer(buffer: MemoryBuffer) -> Self {
        Self {
            buffer,
            time: Mutex::new(None),
            duration: Mutex::new(None),
        }
    }

    /// Set the sample time, builder style
    #[must_use]
    pub fn with_time(self, time: i64) -> Self {
        *self.time.lock() = Some(time);
        self
    }

    /// Set the sample duration, builder style
    #[must_use]
    pub fn with_duration(self, duration: i64) -> Self {
        *self.duration.lock() = Some(duration);
        self
    }

    /// Copy of the valid bytes
    pub fn to_vec(&self) -> Vec<u8> {
        self.buffer.to_vec()
    }

    /// The backing buffer
    pub fn memory(&self) -> &MemoryBuffer {
        &self.buffer
    }
}

impl MediaSample for MemorySample {
    fn buffer(&self) -> Result<&dyn MediaBuffer> {
        Ok(&self.buffer)
    }

    fn sample_time(&self) -> Option<i64> {
        *self.time.lock()
    }

    fn sample_duration(&self) -> Option<i64> {
        *self.duration.lock()
    }

    fn set_sample_time(&self, time: i64) -> Result<()> {
        *self.time.lock() = Some(time);
        Ok(())
    }

    fn set_sample_duration(&self, duration: i64) -> Result<()> {
        *self.duration.lock() = Some(duration);
        Ok(())
    }
}
