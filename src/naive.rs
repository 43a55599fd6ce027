// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A "naive" calculator: every pixel of the upper half is iterated on
//! its own, with an early exit as soon as it escapes.  Nothing about it
//! is vectorizable, but it is short enough to trust, which makes it the
//! yardstick the line and batch calculators are measured against.

use itertools::iproduct;
use log::debug;
use num::Complex;

use crate::error::CalcError;
use crate::kernel::ESCAPE_RADIUS_SQ;
use crate::planes::Viewport;
use crate::raster::Raster;
use crate::MandelCalculator;

/// Iterates z ← z² + c from z = 0 and returns the first iteration whose
/// z lies outside the escape radius, or `limit` if none does.  Uses the
/// same operation order as the vector kernel, so the two agree bit for
/// bit.
pub fn escape_time(c: Complex<f32>, limit: u32) -> u32 {
    let mut z: Complex<f32> = Complex::new(0.0, 0.0);
    for i in 0..limit {
        let re_sq = z.re * z.re;
        let im_sq = z.im * z.im;
        if re_sq + im_sq > ESCAPE_RADIUS_SQ {
            return i;
        }
        z = Complex::new(re_sq - im_sq + c.re, 2.0 * z.re * z.im + c.im);
    }
    limit
}

/// Computes the set one pixel at a time.
pub struct NaiveCalculator {
    viewport: Viewport,
    limit: u32,
    raster: Raster,
}

impl NaiveCalculator {
    /// A square calculator of `size` pixels over the default region.
    pub fn new(size: usize, limit: u32) -> Result<Self, CalcError> {
        NaiveCalculator::with_viewport(size, limit, Viewport::default_for(size))
    }

    /// A square calculator of `size` pixels over `viewport`.
    pub fn with_viewport(size: usize, limit: u32, viewport: Viewport) -> Result<Self, CalcError> {
        let raster = Raster::new(size, size)?;
        debug!("naive calculator ready: {}x{}, limit {}", size, size, limit);
        Ok(NaiveCalculator {
            viewport,
            limit,
            raster,
        })
    }
}

impl MandelCalculator for NaiveCalculator {
    fn name(&self) -> &'static str {
        "NaiveMandelCalculator"
    }

    fn width(&self) -> usize {
        self.raster.width()
    }

    fn height(&self) -> usize {
        self.raster.height()
    }

    fn limit(&self) -> u32 {
        self.limit
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn calculate(&mut self) -> &[u32] {
        let mapping = self.viewport.lanes();
        let width = self.raster.width();
        let rows = self.raster.upper_rows();
        let limit = self.limit;
        let cells = self.raster.upper_half_mut();
        for (y, x) in iproduct!(0..rows, 0..width) {
            cells[y * width + x] = escape_time(mapping.point(x, y), limit);
        }
        self.raster.mirror_lower_half();
        self.raster.as_slice()
    }
}
