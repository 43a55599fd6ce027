// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The escape-iteration kernel shared by every vector driver.
//!
//! A *group* is a contiguous run of pixels on one row: a whole row for
//! the line driver, one inner block for the batch driver.  Each pixel
//! is a lane.  All lanes advance z ← z² + c in lock step; a lane that
//! has already escaped keeps being stepped, it just never has its count
//! rewritten.  That keeps the inner loop free of per-lane control flow
//! so the compiler can turn it into straight vector code.
//!
//! Counting starts from z₀ = 0.  The value stored for a lane is the
//! first `k` with |z_k|² > 4, or `limit` when no such `k < limit`
//! exists.

use crate::aligned::AlignedBuf;
use crate::error::CalcError;
use crate::planes::LaneMapping;

/// Squared modulus past which an orbit is known to diverge.
pub const ESCAPE_RADIUS_SQ: f32 = 4.0;

/// Per-lane z state for one group.  Reused group after group; nothing
/// in it survives from one `resolve` call to the next.
pub struct Scratch {
    z_re: AlignedBuf<f32>,
    z_im: AlignedBuf<f32>,
}

impl Scratch {
    /// Scratch wide enough for groups of up to `lanes` pixels.
    pub fn new(lanes: usize) -> Result<Self, CalcError> {
        Ok(Scratch {
            z_re: AlignedBuf::new(lanes)?,
            z_im: AlignedBuf::new(lanes)?,
        })
    }

    /// The widest group this scratch can hold.
    pub fn lanes(&self) -> usize {
        self.z_re.len()
    }
}

/// Resolves one group.  `counts` are the raster slots of the group,
/// whose first pixel sits in column `x_base` of a row with imaginary
/// coordinate `c_im`.  Returns the number of iterations run.
pub fn resolve(
    scratch: &mut Scratch,
    counts: &mut [u32],
    mapping: &LaneMapping,
    x_base: usize,
    c_im: f32,
    limit: u32,
) -> u32 {
    let lanes = counts.len();
    let z_re = &mut scratch.z_re.as_mut_slice()[..lanes];
    let z_im = &mut scratch.z_im.as_mut_slice()[..lanes];

    prime(z_re, z_im, counts, limit);

    let mut escaped = 0;
    let mut iter = 0;
    while escaped < lanes && iter < limit {
        escaped += step(z_re, z_im, counts, mapping, x_base, c_im, iter, limit);
        iter += 1;
    }
    iter
}

#[inline(always)]
fn prime(z_re: &mut [f32], z_im: &mut [f32], counts: &mut [u32], limit: u32) {
    for ((re, im), count) in z_re.iter_mut().zip(z_im.iter_mut()).zip(counts.iter_mut()) {
        *re = 0.0;
        *im = 0.0;
        *count = limit;
    }
}

/// One lock-step iteration over every lane.  Tests |z|² against the
/// threshold with the old z, then overwrites the imaginary part before
/// the real part, both from the old values.  Returns how many lanes
/// escaped on this iteration.
#[inline(always)]
#[allow(clippy::too_many_arguments)]
fn step(
    z_re: &mut [f32],
    z_im: &mut [f32],
    counts: &mut [u32],
    mapping: &LaneMapping,
    x_base: usize,
    c_im: f32,
    iter: u32,
    limit: u32,
) -> usize {
    let mut escaped = 0;
    for (x, ((re, im), count)) in z_re
        .iter_mut()
        .zip(z_im.iter_mut())
        .zip(counts.iter_mut())
        .enumerate()
    {
        let (zr, zi) = (*re, *im);
        let zr_sq = zr * zr;
        let zi_sq = zi * zi;

        let fresh = (zr_sq + zi_sq > ESCAPE_RADIUS_SQ) & (*count == limit);
        *count = if fresh { iter } else { *count };
        escaped += fresh as usize;

        *im = 2.0 * zr * zi + c_im;
        // c_re is rebuilt from the column index; carrying it in a
        // running sum would chain every lane to its neighbour.
        *re = zr_sq - zi_sq + mapping.c_re(x_base + x);
    }
    escaped
}
