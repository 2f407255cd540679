//! Low-level circular byte store.
//!
//! [`ByteRing`] is the storage layer under the time-indexed ring: a
//! fixed-capacity, zero-initialized byte array addressed by an unbounded
//! position that wraps modulo the capacity. It has no time or sample
//! semantics of its own.
//!
//! # Design
//!
//! - Position `p` maps to physical offset `p % capacity`; a span that
//!   crosses the end splits into a tail copy and a head copy.
//! - Any request longer than the capacity is a caller error
//!   ([`RingError::SizeExceeded`]), never a wraparound case, and fails
//!   without mutating the store.
//! - An optional opaque metadata blob rides along, replaced wholesale and
//!   independent of the ring contents.

use crate::error::RingError;

/// A fixed-capacity byte store with wraparound addressing.
///
/// # Thread Safety
///
/// ByteRing is not internally synchronized. It assumes at most one writer
/// and no concurrent reader during a write, enforced by the caller (see
/// [`SharedTimeRing`](crate::SharedTimeRing)).
#[derive(Debug)]
pub struct ByteRing {
    /// The backing store, exactly `capacity` bytes, zero-initialized.
    store: Vec<u8>,
    /// Optional opaque metadata blob, replaced wholesale.
    meta: Option<Vec<u8>>,
}

impl ByteRing {
    /// Allocates a zero-filled ring of `capacity` bytes.
    pub fn new(capacity: usize) -> Self {
        Self {
            store: vec![0; capacity],
            meta: None,
        }
    }

    /// Returns the fixed capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.store.len()
    }

    /// Copies `dst.len()` bytes out of the ring starting at `position`.
    ///
    /// # Errors
    ///
    /// Returns [`RingError::SizeExceeded`] if `dst.len()` exceeds the
    /// capacity; the destination is left untouched.
    pub fn read(&self, dst: &mut [u8], position: u64) -> Result<(), RingError> {
        let capacity = self.capacity();
        let len = dst.len();
        if len > capacity {
            return Err(RingError::SizeExceeded {
                requested: len,
                capacity,
            });
        }
        self.copy_out(dst, position);
        Ok(())
    }

    /// Copies out without the size check; callers must have validated
    /// `dst.len() <= capacity`.
    pub(crate) fn copy_out(&self, dst: &mut [u8], position: u64) {
        let capacity = self.capacity();
        let len = dst.len();
        debug_assert!(len <= capacity);
        if len == 0 {
            return;
        }

        let begin = (position % capacity as u64) as usize;
        if begin + len <= capacity {
            dst.copy_from_slice(&self.store[begin..begin + len]);
        } else {
            let tail = capacity - begin;
            dst[..tail].copy_from_slice(&self.store[begin..]);
            dst[tail..].copy_from_slice(&self.store[..len - tail]);
        }
    }

    /// Copies `src.len()` bytes into the ring starting at `position`.
    ///
    /// # Errors
    ///
    /// Returns [`RingError::SizeExceeded`] if `src.len()` exceeds the
    /// capacity; the store is left untouched.
    pub fn write(&mut self, src: &[u8], position: u64) -> Result<(), RingError> {
        let capacity = self.capacity();
        let len = src.len();
        if len > capacity {
            return Err(RingError::SizeExceeded {
                requested: len,
                capacity,
            });
        }
        self.copy_in(src, position);
        Ok(())
    }

    /// Copies in without the size check; callers must have validated
    /// `src.len() <= capacity`.
    pub(crate) fn copy_in(&mut self, src: &[u8], position: u64) {
        let capacity = self.capacity();
        let len = src.len();
        debug_assert!(len <= capacity);
        if len == 0 {
            return;
        }

        let begin = (position % capacity as u64) as usize;
        if begin + len <= capacity {
            self.store[begin..begin + len].copy_from_slice(src);
        } else {
            let tail = capacity - begin;
            self.store[begin..].copy_from_slice(&src[..tail]);
            self.store[..len - tail].copy_from_slice(&src[tail..]);
        }
    }

    /// Zero-fills `len` bytes of the ring starting at `position`.
    ///
    /// # Errors
    ///
    /// Returns [`RingError::SizeExceeded`] if `len` exceeds the capacity;
    /// the store is left untouched.
    pub fn write_zeros(&mut self, position: u64, len: usize) -> Result<(), RingError> {
        let capacity = self.capacity();
        if len > capacity {
            return Err(RingError::SizeExceeded {
                requested: len,
                capacity,
            });
        }
        self.fill_zeros(position, len);
        Ok(())
    }

    /// Zero-fills without the size check; callers must have validated
    /// `len <= capacity`.
    pub(crate) fn fill_zeros(&mut self, position: u64, len: usize) {
        let capacity = self.capacity();
        debug_assert!(len <= capacity);
        if len == 0 {
            return;
        }

        let begin = (position % capacity as u64) as usize;
        if begin + len <= capacity {
            self.store[begin..begin + len].fill(0);
        } else {
            let tail = capacity - begin;
            self.store[begin..].fill(0);
            self.store[..len - tail].fill(0);
        }
    }

    /// Replaces the metadata blob wholesale.
    pub fn set_meta(&mut self, meta: Vec<u8>) {
        self.meta = Some(meta);
    }

    /// Borrows the metadata blob, if any.
    pub fn meta(&self) -> Option<&[u8]> {
        self.meta.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_zero_filled() {
        let ring = ByteRing::new(16);
        let mut buf = [0xffu8; 16];
        ring.read(&mut buf, 0).unwrap();
        assert_eq!(buf, [0u8; 16]);
    }

    #[test]
    fn test_contiguous_round_trip() {
        let mut ring = ByteRing::new(8);
        ring.write(&[1, 2, 3], 2).unwrap();

        let mut buf = [0u8; 3];
        ring.read(&mut buf, 2).unwrap();
        assert_eq!(buf, [1, 2, 3]);
    }

    #[test]
    fn test_wraparound_round_trip() {
        let mut ring = ByteRing::new(8);
        // Begins at offset 6, so two bytes land at the tail and three at the head.
        ring.write(&[10, 11, 12, 13, 14], 6).unwrap();

        let mut buf = [0u8; 5];
        ring.read(&mut buf, 6).unwrap();
        assert_eq!(buf, [10, 11, 12, 13, 14]);

        // Physical layout check: head holds the spill.
        let mut head = [0u8; 3];
        ring.read(&mut head, 8).unwrap();
        assert_eq!(head, [12, 13, 14]);
    }

    #[test]
    fn test_position_is_modular() {
        let mut ring = ByteRing::new(4);
        ring.write(&[9], 0).unwrap();

        let mut buf = [0u8; 1];
        ring.read(&mut buf, 4).unwrap();
        assert_eq!(buf, [9]);
        ring.read(&mut buf, 400).unwrap();
        assert_eq!(buf, [9]);
    }

    #[test]
    fn test_full_capacity_span() {
        let mut ring = ByteRing::new(4);
        ring.write(&[1, 2, 3, 4], 3).unwrap();

        let mut buf = [0u8; 4];
        ring.read(&mut buf, 3).unwrap();
        assert_eq!(buf, [1, 2, 3, 4]);
    }

    #[test]
    fn test_size_exceeded_does_not_mutate() {
        let mut ring = ByteRing::new(4);
        ring.write(&[5, 6, 7, 8], 0).unwrap();

        assert!(matches!(
            ring.write(&[0u8; 5], 0),
            Err(RingError::SizeExceeded {
                requested: 5,
                capacity: 4
            })
        ));
        assert!(ring.write_zeros(1, 5).is_err());

        let mut buf = [0u8; 4];
        ring.read(&mut buf, 0).unwrap();
        assert_eq!(buf, [5, 6, 7, 8]);

        let mut big = [0u8; 5];
        assert!(ring.read(&mut big, 0).is_err());
    }

    #[test]
    fn test_write_zeros_wraparound() {
        let mut ring = ByteRing::new(4);
        ring.write(&[1, 2, 3, 4], 0).unwrap();
        ring.write_zeros(3, 2).unwrap();

        let mut buf = [0u8; 4];
        ring.read(&mut buf, 0).unwrap();
        assert_eq!(buf, [0, 2, 3, 0]);
    }

    #[test]
    fn test_meta_blob() {
        let mut ring = ByteRing::new(4);
        assert!(ring.meta().is_none());

        ring.set_meta(vec![1, 2, 3]);
        assert_eq!(ring.meta(), Some(&[1u8, 2, 3][..]));

        // Whole-blob replace, not partial update.
        ring.set_meta(vec![9]);
        assert_eq!(ring.meta(), Some(&[9u8][..]));
    }

    #[test]
    fn test_zero_capacity_ring() {
        let ring = ByteRing::new(0);
        let mut empty: [u8; 0] = [];
        assert!(ring.read(&mut empty, 0).is_ok());
    }
}
