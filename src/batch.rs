// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The batch calculator splits every row into blocks sized for the
//! cache hierarchy.  An outer block bounds the stretch of raster that a
//! row revisits while it is being resolved; each outer block is cut
//! into inner blocks whose z state fits in the fastest cache, and each
//! inner block is one kernel group.

use log::{debug, trace, warn};

use crate::error::CalcError;
use crate::kernel::{self, Scratch};
use crate::planes::{LaneMapping, Viewport};
use crate::raster::Raster;
use crate::MandelCalculator;

/// Outer block width the calculator was tuned with.
pub const L3_BLOCK_SIZE: usize = 512;
/// Inner block width the calculator was tuned with.
pub const L2_BLOCK_SIZE: usize = 64;

/// Widths, in pixels, of the two block levels.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BlockSizes {
    outer: usize,
    inner: usize,
}

impl BlockSizes {
    /// Both sizes must be non-zero and `inner` must divide `outer`.
    pub fn new(outer: usize, inner: usize) -> Result<Self, CalcError> {
        if outer == 0 || inner == 0 || outer % inner != 0 {
            return Err(CalcError::InvalidBlockSizes { outer, inner });
        }
        Ok(BlockSizes { outer, inner })
    }

    /// Outer ("L3") block width.
    pub fn outer(&self) -> usize {
        self.outer
    }

    /// Inner ("L2") block width.
    pub fn inner(&self) -> usize {
        self.inner
    }

    /// Whether a row of `width` pixels splits into whole blocks.
    pub fn tiles(&self, width: usize) -> bool {
        width % self.outer == 0
    }
}

impl Default for BlockSizes {
    fn default() -> Self {
        BlockSizes {
            outer: L3_BLOCK_SIZE,
            inner: L2_BLOCK_SIZE,
        }
    }
}

/// Computes the set block by block.
pub struct BatchCalculator {
    viewport: Viewport,
    limit: u32,
    blocks: BlockSizes,
    raster: Raster,
    scratch: Scratch,
}

impl BatchCalculator {
    /// A square calculator of `size` pixels over the default region with
    /// the default block sizes.
    pub fn new(size: usize, limit: u32) -> Result<Self, CalcError> {
        BatchCalculator::with_viewport(size, limit, Viewport::default_for(size))
    }

    /// A square calculator of `size` pixels over `viewport`.
    pub fn with_viewport(size: usize, limit: u32, viewport: Viewport) -> Result<Self, CalcError> {
        BatchCalculator::with_block_sizes(size, limit, viewport, BlockSizes::default())
    }

    /// A square calculator with explicit block sizes.  `size` has to be
    /// a multiple of `blocks.outer()`; pixels past the last whole block
    /// of a row are left untouched otherwise.
    pub fn with_block_sizes(
        size: usize,
        limit: u32,
        viewport: Viewport,
        blocks: BlockSizes,
    ) -> Result<Self, CalcError> {
        if !blocks.tiles(size) {
            warn!(
                "a row of {} pixels does not split into {}-pixel blocks",
                size, blocks.outer
            );
        }
        let raster = Raster::new(size, size)?;
        let scratch = Scratch::new(blocks.inner)?;
        debug!(
            "batch calculator ready: {}x{}, limit {}, blocks {}/{}",
            size, size, limit, blocks.outer, blocks.inner
        );
        Ok(BatchCalculator {
            viewport,
            limit,
            blocks,
            raster,
            scratch,
        })
    }

    /// The block sizes in use.
    pub fn block_sizes(&self) -> BlockSizes {
        self.blocks
    }
}

fn compute_row(
    row: &mut [u32],
    y: usize,
    blocks: BlockSizes,
    scratch: &mut Scratch,
    mapping: &LaneMapping,
    limit: u32,
) {
    let c_im = mapping.c_im(y);
    for (outer_index, outer) in row.chunks_exact_mut(blocks.outer).enumerate() {
        for (inner_index, inner) in outer.chunks_exact_mut(blocks.inner).enumerate() {
            let x_base = outer_index * blocks.outer + inner_index * blocks.inner;
            kernel::resolve(scratch, inner, mapping, x_base, c_im, limit);
        }
    }
}

impl MandelCalculator for BatchCalculator {
    fn name(&self) -> &'static str {
        "BatchMandelCalculator"
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
        if width > 0 {
            for (y, row) in self.raster.upper_half_mut().chunks_exact_mut(width).enumerate() {
                compute_row(row, y, self.blocks, &mut self.scratch, &mapping, self.limit);
                trace!("row {} settled", y);
            }
        }
        self.raster.mirror_lower_half();
        self.raster.as_slice()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_sizes_reject_bad_nesting() {
        assert!(BlockSizes::new(0, 16).is_err());
        assert!(BlockSizes::new(64, 0).is_err());
        assert_eq!(
            BlockSizes::new(64, 48),
            Err(CalcError::InvalidBlockSizes {
                outer: 64,
                inner: 48
            })
        );
        assert!(BlockSizes::new(64, 16).is_ok());
    }

    #[test]
    fn default_block_sizes() {
        let blocks = BlockSizes::default();
        assert_eq!((blocks.outer(), blocks.inner()), (512, 64));
        assert!(blocks.tiles(1024));
        assert!(!blocks.tiles(100));
    }

    #[test]
    fn far_point_escapes_everywhere() {
        let blocks = BlockSizes::new(32, 8).unwrap();
        let mut calc =
            BatchCalculator::with_block_sizes(64, 10, Viewport::new(3.0, 0.0, 0.0, 0.0), blocks)
                .unwrap();
        assert!(calc.calculate().iter().all(|v| *v == 1));
    }

    #[test]
    fn origin_stays_at_limit() {
        let blocks = BlockSizes::new(16, 16).unwrap();
        let mut calc =
            BatchCalculator::with_block_sizes(16, 1, Viewport::new(0.0, 0.0, 0.0, 0.0), blocks)
                .unwrap();
        assert!(calc.calculate().iter().all(|v| *v == 1));
    }

    #[test]
    fn empty_image_yields_empty_raster() {
        let mut calc = BatchCalculator::new(0, 10).unwrap();
        assert!(calc.calculate().is_empty());
    }

    #[test]
    fn untiled_columns_are_left_alone() {
        let blocks = BlockSizes::new(16, 8).unwrap();
        let mut calc =
            BatchCalculator::with_block_sizes(20, 5, Viewport::new(3.0, 0.0, 0.0, 0.0), blocks)
                .unwrap();
        let raster = calc.calculate();
        assert_eq!(&raster[..16], &[1; 16][..]);
        assert_eq!(&raster[16..20], &[0; 4][..]);
    }

    #[test]
    fn lower_half_mirrors_upper_half() {
        let blocks = BlockSizes::new(32, 16).unwrap();
        let mut calc =
            BatchCalculator::with_block_sizes(64, 80, Viewport::default_for(64), blocks).unwrap();
        assert_eq!(calc.block_sizes(), blocks);
        let raster = calc.calculate().to_vec();
        for y in 32..64 {
            assert_eq!(raster[y * 64..(y + 1) * 64], raster[(63 - y) * 64..(64 - y) * 64]);
        }
    }
}
