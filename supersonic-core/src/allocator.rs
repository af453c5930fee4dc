//! Buffer ownership for evaluation outputs.
//!
//! `allocate`/`reallocate` return an owned `Buffer`; freeing is handled by
//! `Buffer`'s `Drop` impl rather than a separate call, so an allocator that
//! tracks bytes in flight sees a charge released the moment its `Buffer`
//! goes out of scope.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use supersonic_types::{ErrorCode, Exception, FailureOr};

/// An owned, heap-allocated byte buffer handed out by an `Allocator`.
/// `actual_bytes` may exceed the requested size (e.g. rounded up to the
/// allocator's granularity); `Drop` releases the memory and, if the
/// allocator that issued it tracks usage, reports the bytes back.
#[derive(Debug)]
pub struct Buffer {
    data: Vec<u8>,
    usage: Option<Arc<AtomicUsize>>,
}

impl Buffer {
    fn new(bytes: usize) -> Self {
        Self {
            data: vec![0u8; bytes],
            usage: None,
        }
    }

    fn tracked(bytes: usize, usage: Arc<AtomicUsize>) -> Self {
        Self {
            data: vec![0u8; bytes],
            usage: Some(usage),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }

    fn resize(&mut self, bytes: usize) {
        self.data.resize(bytes, 0);
    }
}

impl Drop for Buffer {
    fn drop(&mut self) {
        if let Some(usage) = &self.usage {
            usage.fetch_sub(self.data.len(), Ordering::SeqCst);
        }
    }
}

/// A narrow allocation interface buffers for evaluation outputs go through,
/// so hosts can enforce memory ceilings on arenas.
pub trait Allocator: std::fmt::Debug + Send + Sync {
    /// Allocates at least `bytes` bytes. Never panics or aborts on failure:
    /// returns `MEMORY_EXCEEDED` through the `FailureOr` discipline instead.
    fn allocate(&self, bytes: usize) -> FailureOr<Buffer>;

    /// Grows (or shrinks) `buffer` to at least `bytes` bytes, preserving its
    /// existing contents up to `min(old_len, bytes)`.
    fn reallocate(&self, buffer: Buffer, bytes: usize) -> FailureOr<Buffer>;
}

/// The plain heap allocator: never refuses a request (bounded only by the
/// process's actual memory).
#[derive(Debug, Default, Clone, Copy)]
pub struct HeapAllocator;

impl HeapAllocator {
    pub fn new() -> Self {
        Self
    }
}

impl Allocator for HeapAllocator {
    fn allocate(&self, bytes: usize) -> FailureOr<Buffer> {
        Ok(Buffer::new(bytes))
    }

    fn reallocate(&self, mut buffer: Buffer, bytes: usize) -> FailureOr<Buffer> {
        buffer.resize(bytes);
        Ok(buffer)
    }
}

/// An allocator that enforces a total-bytes-in-flight ceiling, so evaluation
/// arenas fail fast instead of growing the process without bound.
#[derive(Debug)]
pub struct BoundedAllocator {
    limit_bytes: usize,
    used_bytes: Arc<AtomicUsize>,
}

impl BoundedAllocator {
    pub fn new(limit_bytes: usize) -> Self {
        Self {
            limit_bytes,
            used_bytes: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn used_bytes(&self) -> usize {
        self.used_bytes.load(Ordering::SeqCst)
    }

    fn try_reserve(&self, additional: usize) -> FailureOr<()> {
        let mut current = self.used_bytes.load(Ordering::SeqCst);
        loop {
            let new_total = current.checked_add(additional).ok_or_else(|| {
                Exception::new(ErrorCode::MemoryExceeded, "allocation size overflowed")
            })?;
            if new_total > self.limit_bytes {
                return Err(Exception::new(
                    ErrorCode::MemoryExceeded,
                    format!(
                        "allocation of {additional} bytes would exceed the {} byte ceiling ({current} already in use)",
                        self.limit_bytes
                    ),
                ));
            }
            match self.used_bytes.compare_exchange_weak(
                current,
                new_total,
                Ordering::SeqCst,
                Ordering::SeqCst,
            ) {
                Ok(_) => return Ok(()),
                Err(observed) => current = observed,
            }
        }
    }
}

impl Allocator for BoundedAllocator {
    fn allocate(&self, bytes: usize) -> FailureOr<Buffer> {
        self.try_reserve(bytes)?;
        Ok(Buffer::tracked(bytes, self.used_bytes.clone()))
    }

    fn reallocate(&self, mut buffer: Buffer, bytes: usize) -> FailureOr<Buffer> {
        if bytes > buffer.len() {
            self.try_reserve(bytes - buffer.len())?;
        } else {
            self.used_bytes.fetch_sub(buffer.len() - bytes, Ordering::SeqCst);
        }
        buffer.resize(bytes);
        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heap_allocator_never_refuses() {
        let a = HeapAllocator::new();
        let buf = a.allocate(4096).unwrap();
        assert_eq!(buf.len(), 4096);
    }

    #[test]
    fn bounded_allocator_refuses_past_ceiling() {
        let a = BoundedAllocator::new(1024);
        assert!(a.allocate(512).is_ok());
        let err = a.allocate(1024).unwrap_err();
        assert_eq!(err.code, ErrorCode::MemoryExceeded);
    }

    #[test]
    fn bounded_allocator_tracks_reallocation() {
        let a = BoundedAllocator::new(1024);
        let buf = a.allocate(100).unwrap();
        assert_eq!(a.used_bytes(), 100);
        let buf = a.reallocate(buf, 50).unwrap();
        assert_eq!(a.used_bytes(), 50);
        assert_eq!(buf.len(), 50);
    }

    #[test]
    fn dropping_a_buffer_releases_its_charge() {
        let a = BoundedAllocator::new(1024);
        {
            let buf = a.allocate(512).unwrap();
            assert_eq!(a.used_bytes(), 512);
            drop(buf);
        }
        assert_eq!(a.used_bytes(), 0);
    }

    #[test]
    fn repeated_allocate_and_drop_does_not_leak_capacity() {
        let a = BoundedAllocator::new(512);
        for _ in 0..100 {
            let _buf = a.allocate(512).unwrap();
        }
        assert_eq!(a.used_bytes(), 0);
    }
}
