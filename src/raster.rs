// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The output raster: one `u32` escape count per pixel, row-major,
//! aligned to a cache line.  Only the upper half is ever computed; the
//! lower half is a mirror image of it.

use log::trace;

use crate::aligned::AlignedBuf;
use crate::error::CalcError;

/// Row-major iteration counts for a `width` by `height` image.
pub struct Raster {
    width: usize,
    height: usize,
    cells: AlignedBuf<u32>,
}

impl Raster {
    /// Allocates a zeroed raster.
    pub fn new(width: usize, height: usize) -> Result<Self, CalcError> {
        let len = width
            .checked_mul(height)
            .ok_or(CalcError::Allocation { bytes: usize::MAX })?;
        Ok(Raster {
            width,
            height,
            cells: AlignedBuf::new(len)?,
        })
    }

    /// Pixels per row.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Rows that are computed directly.  With an odd height the middle
    /// row has no partner, so it belongs to the computed half.
    pub fn upper_rows(&self) -> usize {
        (self.height + 1) / 2
    }

    /// The computed half as one contiguous slice.
    pub fn upper_half_mut(&mut self) -> &mut [u32] {
        let end = self.upper_rows() * self.width;
        &mut self.cells.as_mut_slice()[..end]
    }

    /// Copies row `height - 1 - y` into row `y` for every row below the
    /// computed half.  Must run after the upper half is complete.
    pub fn mirror_lower_half(&mut self) {
        let (width, height, upper) = (self.width, self.height, self.upper_rows());
        let cells = self.cells.as_mut_slice();
        for y in upper..height {
            let source = (height - 1 - y) * width;
            cells.copy_within(source..source + width, y * width);
        }
        trace!("mirrored {} rows", height - upper);
    }

    /// The whole raster.
    pub fn as_slice(&self) -> &[u32] {
        self.cells.as_slice()
    }

    /// One row of the raster.
    pub fn row(&self, y: usize) -> &[u32] {
        &self.as_slice()[y * self.width..(y + 1) * self.width]
    }

    /// The count stored for pixel (x, y).
    pub fn get(&self, x: usize, y: usize) -> u32 {
        self.as_slice()[y * self.width + x]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(width: usize, height: usize) -> Raster {
        let mut raster = Raster::new(width, height).unwrap();
        for (i, cell) in raster.upper_half_mut().iter_mut().enumerate() {
            *cell = i as u32 + 1;
        }
        raster
    }

    #[test]
    fn upper_rows_rounds_up() {
        assert_eq!(Raster::new(4, 4).unwrap().upper_rows(), 2);
        assert_eq!(Raster::new(4, 5).unwrap().upper_rows(), 3);
        assert_eq!(Raster::new(1, 1).unwrap().upper_rows(), 1);
    }

    #[test]
    fn mirror_copies_rows_in_reverse() {
        let mut raster = numbered(3, 4);
        raster.mirror_lower_half();
        assert_eq!(raster.row(0), &[1, 2, 3]);
        assert_eq!(raster.row(1), &[4, 5, 6]);
        assert_eq!(raster.row(2), &[4, 5, 6]);
        assert_eq!(raster.row(3), &[1, 2, 3]);
    }

    #[test]
    fn mirror_keeps_the_odd_middle_row() {
        let mut raster = numbered(2, 5);
        raster.mirror_lower_half();
        assert_eq!(raster.row(2), &[5, 6]);
        assert_eq!(raster.row(3), raster.row(1));
        assert_eq!(raster.row(4), raster.row(0));
        assert_eq!(raster.get(1, 4), 2);
    }
}
