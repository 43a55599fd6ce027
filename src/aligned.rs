// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Cache-line aligned storage.  Buffers are carved out of whole 64-byte
//! lines so every slice handed to the kernel starts on a vector
//! boundary, and allocation failures come back as errors instead of
//! aborting the process.

use bytemuck::{Pod, Zeroable};
use log::debug;
use std::marker::PhantomData;
use std::mem;

use crate::error::CalcError;

/// Width of the alignment unit, in bytes.
pub const CACHE_LINE: usize = 64;

#[repr(C, align(64))]
#[derive(Pod, Zeroable, Clone, Copy)]
struct CacheLine([u8; CACHE_LINE]);

/// A fixed-length run of `T` whose first element sits on a cache-line
/// boundary.  Zero-initialised.
pub struct AlignedBuf<T> {
    lines: Vec<CacheLine>,
    len: usize,
    _element: PhantomData<T>,
}

impl<T: Pod> AlignedBuf<T> {
    /// Allocates room for `len` elements.
    pub fn new(len: usize) -> Result<Self, CalcError> {
        let bytes = len
            .checked_mul(mem::size_of::<T>())
            .ok_or(CalcError::Allocation { bytes: usize::MAX })?;
        let count = bytes / CACHE_LINE + (bytes % CACHE_LINE != 0) as usize;

        let mut lines = Vec::new();
        lines
            .try_reserve_exact(count)
            .map_err(|_| CalcError::Allocation {
                bytes: count.saturating_mul(CACHE_LINE),
            })?;
        lines.resize(count, CacheLine::zeroed());
        debug!("allocated {} aligned bytes for {} elements", count * CACHE_LINE, len);

        Ok(AlignedBuf {
            lines,
            len,
            _element: PhantomData,
        })
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the buffer holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The elements as a slice.
    pub fn as_slice(&self) -> &[T] {
        &bytemuck::cast_slice::<CacheLine, T>(&self.lines)[..self.len]
    }

    /// The elements as a mutable slice.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut bytemuck::cast_slice_mut::<CacheLine, T>(&mut self.lines)[..self.len]
    }
}
