// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The line calculator vectorizes across a whole image row: each row of
//! the upper half is a single kernel group.

use log::{debug, trace};

use crate::error::CalcError;
use crate::kernel::{self, Scratch};
use crate::planes::{LaneMapping, Viewport};
use crate::raster::Raster;
use crate::MandelCalculator;

/// Resolves a band of consecutive rows, one kernel group per row.
/// `rows` holds whole rows of `width` pixels, the first of which is
/// image row `first_row`.  The scratch must be at least `width` lanes.
pub fn compute_rows(
    rows: &mut [u32],
    first_row: usize,
    width: usize,
    scratch: &mut Scratch,
    mapping: &LaneMapping,
    limit: u32,
) {
    if width == 0 {
        return;
    }
    for (offset, row) in rows.chunks_exact_mut(width).enumerate() {
        let y = first_row + offset;
        let iters = kernel::resolve(scratch, row, mapping, 0, mapping.c_im(y), limit);
        trace!("row {} settled after {} iterations", y, iters);
    }
}

/// Computes the set one row at a time.
pub struct LineCalculator {
    viewport: Viewport,
    limit: u32,
    raster: Raster,
    scratch: Scratch,
}

impl LineCalculator {
    /// A square calculator of `size` pixels over the default region.
    pub fn new(size: usize, limit: u32) -> Result<Self, CalcError> {
        LineCalculator::with_viewport(size, limit, Viewport::default_for(size))
    }

    /// A square calculator of `size` pixels over `viewport`.
    pub fn with_viewport(size: usize, limit: u32, viewport: Viewport) -> Result<Self, CalcError> {
        let raster = Raster::new(size, size)?;
        let scratch = Scratch::new(size)?;
        debug!("line calculator ready: {}x{}, limit {}", size, size, limit);
        Ok(LineCalculator {
            viewport,
            limit,
            raster,
            scratch,
        })
    }
}

impl MandelCalculator for LineCalculator {
    fn name(&self) -> &'static str {
        "LineMandelCalculator"
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
        compute_rows(
            self.raster.upper_half_mut(),
            0,
            width,
            &mut self.scratch,
            &mapping,
            self.limit,
        );
        self.raster.mirror_lower_half();
        self.raster.as_slice()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_pixel_at_origin_stays_at_limit() {
        let mut calc = LineCalculator::with_viewport(1, 1, Viewport::new(0.0, 0.0, 0.0, 0.0)).unwrap();
        assert_eq!(calc.calculate(), &[1]);
    }

    #[test]
    fn empty_image_yields_empty_raster() {
        let mut calc = LineCalculator::new(0, 10).unwrap();
        assert!(calc.calculate().is_empty());
    }

    #[test]
    fn far_point_escapes_everywhere() {
        let mut calc = LineCalculator::with_viewport(8, 10, Viewport::new(3.0, 0.0, 0.0, 0.0)).unwrap();
        assert!(calc.calculate().iter().all(|v| *v == 1));
    }

    #[test]
    fn lower_half_mirrors_upper_half() {
        let mut calc = LineCalculator::new(32, 64).unwrap();
        let raster = calc.calculate().to_vec();
        for y in 16..32 {
            assert_eq!(raster[y * 32..(y + 1) * 32], raster[(31 - y) * 32..(32 - y) * 32]);
        }
    }

    #[test]
    fn repeated_calculations_agree() {
        let mut calc = LineCalculator::new(16, 50).unwrap();
        let first = calc.calculate().to_vec();
        assert_eq!(calc.calculate(), &first[..]);
    }

    #[test]
    fn interior_of_the_default_view_hits_the_limit() {
        // Pixel (8, 8) of a 16 pixel default view maps to -0.5 + 0i.
        let mut calc = LineCalculator::new(16, 100).unwrap();
        let raster = calc.calculate();
        assert_eq!(raster[8 * 16 + 8], 100);
        assert!(raster[0] < 100);
    }
}
