#![deny(missing_docs)]
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Mandelbrot escape-time calculators
//!
//! Every pixel of the output raster holds the number of iterations of
//! z ← z² + c, starting from z = 0, before |z| exceeds 2, where c is
//! the point of the complex plane under that pixel.  Points that stay
//! bounded for the whole iteration limit hold the limit itself.
//!
//! Two calculators do the real work.  The line calculator runs the
//! recurrence across a whole row at a time; the batch calculator cuts
//! each row into blocks sized for the L3 and L2 caches.  Both keep all
//! lanes of a group in lock step so the inner loop vectorizes, and both
//! compute only the upper half of the image, mirroring it into the
//! lower half.  The escape test is carried out exactly, so the two
//! produce identical rasters whatever the block sizes.
//!
//! A per-pixel reference calculator and a threaded variant of the line
//! calculator round out the set.

extern crate bytemuck;
extern crate crossbeam;
extern crate itertools;
extern crate num;
extern crate num_cpus;

pub mod aligned;
pub mod batch;
pub mod error;
pub mod kernel;
pub mod line;
pub mod naive;
pub mod planes;
pub mod raster;
pub mod threaded;

pub use batch::{BatchCalculator, BlockSizes};
pub use error::CalcError;
pub use line::LineCalculator;
pub use naive::NaiveCalculator;
pub use planes::Viewport;
pub use threaded::ThreadedCalculator;

/// The contract every calculator shares.  A calculator owns its raster
/// for its whole lifetime; `calculate` overwrites it from scratch.
pub trait MandelCalculator {
    /// Human-readable name, used in logs and benchmark output.
    fn name(&self) -> &'static str;

    /// Pixels per row.
    fn width(&self) -> usize;

    /// Number of rows.
    fn height(&self) -> usize;

    /// The iteration cap, which doubles as the "never escaped" value.
    fn limit(&self) -> u32;

    /// The pixel to complex-plane mapping in use.
    fn viewport(&self) -> Viewport;

    /// Computes the upper half of the image, mirrors it into the lower
    /// half and returns the `width * height` counts, row by row.
    fn calculate(&mut self) -> &[u32];
}
