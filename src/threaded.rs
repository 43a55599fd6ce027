// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Row-band parallelism layered over the line kernel.  The computed
//! half of the raster is cut into contiguous, disjoint bands of rows;
//! each band goes to its own worker, and each worker owns one scratch
//! buffer from a fixed arena.  The result is byte-identical to the line
//! calculator.

use log::{debug, error, trace};

use crate::error::CalcError;
use crate::kernel::Scratch;
use crate::line;
use crate::planes::Viewport;
use crate::raster::Raster;
use crate::MandelCalculator;

/// One full-row scratch buffer per worker, allocated up front.
pub struct ScratchArena {
    slots: Vec<Scratch>,
}

impl ScratchArena {
    /// Room for `workers` concurrent rows of `width` lanes each.
    pub fn new(workers: usize, width: usize) -> Result<Self, CalcError> {
        let slots = (0..workers.max(1))
            .map(|_| Scratch::new(width))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ScratchArena { slots })
    }

    /// Number of workers the arena can serve.
    pub fn workers(&self) -> usize {
        self.slots.len()
    }

    fn slots_mut(&mut self) -> &mut [Scratch] {
        &mut self.slots
    }
}

/// Computes the set with several threads, one band of rows each.
pub struct ThreadedCalculator {
    viewport: Viewport,
    limit: u32,
    raster: Raster,
    arena: ScratchArena,
}

impl ThreadedCalculator {
    /// A square calculator of `size` pixels over the default region,
    /// using one worker per CPU.
    pub fn new(size: usize, limit: u32) -> Result<Self, CalcError> {
        ThreadedCalculator::with_viewport(size, limit, Viewport::default_for(size), num_cpus::get())
    }

    /// A square calculator of `size` pixels over `viewport` with
    /// `threads` workers.
    pub fn with_viewport(
        size: usize,
        limit: u32,
        viewport: Viewport,
        threads: usize,
    ) -> Result<Self, CalcError> {
        let raster = Raster::new(size, size)?;
        let arena = ScratchArena::new(threads, size)?;
        debug!(
            "threaded calculator ready: {}x{}, limit {}, {} workers",
            size,
            size,
            limit,
            arena.workers()
        );
        Ok(ThreadedCalculator {
            viewport,
            limit,
            raster,
            arena,
        })
    }

    /// Number of workers.
    pub fn threads(&self) -> usize {
        self.arena.workers()
    }

    /// Computes the upper half across the workers, then mirrors it.
    pub fn try_calculate(&mut self) -> Result<&[u32], CalcError> {
        let mapping = self.viewport.lanes();
        let limit = self.limit;
        let width = self.raster.width();
        let rows = self.raster.upper_rows();
        let workers = self.arena.workers();
        let band_rows = (rows + workers - 1) / workers;

        if rows > 0 && width > 0 {
            let bands = self.raster.upper_half_mut().chunks_mut(band_rows * width);
            let slots = self.arena.slots_mut().iter_mut();
            crossbeam::scope(|spawner| {
                for (index, (band, scratch)) in bands.zip(slots).enumerate() {
                    let mapping = &mapping;
                    spawner.spawn(move |_| {
                        let first_row = index * band_rows;
                        line::compute_rows(band, first_row, width, scratch, mapping, limit);
                        trace!("worker {} finished rows from {}", index, first_row);
                    });
                }
            })
            .map_err(|_| CalcError::Worker)?;
        }

        self.raster.mirror_lower_half();
        Ok(self.raster.as_slice())
    }
}

impl MandelCalculator for ThreadedCalculator {
    fn name(&self) -> &'static str {
        "ThreadedMandelCalculator"
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
        if let Err(e) = self.try_calculate() {
            error!("threaded calculation failed: {}", e);
        }
        self.raster.as_slice()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::line::LineCalculator;

    #[test]
    fn arena_has_at_least_one_slot() {
        assert_eq!(ScratchArena::new(0, 8).unwrap().workers(), 1);
        assert_eq!(ScratchArena::new(3, 8).unwrap().workers(), 3);
    }

    #[test]
    fn matches_line_calculator() {
        for threads in 1..6 {
            let mut threaded =
                ThreadedCalculator::with_viewport(48, 120, Viewport::default_for(48), threads)
                    .unwrap();
            let mut line = LineCalculator::new(48, 120).unwrap();
            assert_eq!(threaded.try_calculate().unwrap(), line.calculate());
        }
    }

    #[test]
    fn worker_panic_is_reported() {
        // Scratch narrower than a row makes every worker panic.
        let mut calc = ThreadedCalculator {
            viewport: Viewport::default_for(8),
            limit: 10,
            raster: Raster::new(8, 8).unwrap(),
            arena: ScratchArena::new(2, 4).unwrap(),
        };
        assert_eq!(calc.try_calculate().err(), Some(CalcError::Worker));
        assert_eq!(calc.calculate().len(), 64);
    }

    #[test]
    fn more_workers_than_rows() {
        let mut threaded =
            ThreadedCalculator::with_viewport(3, 20, Viewport::default_for(3), 8).unwrap();
        let mut line = LineCalculator::new(3, 20).unwrap();
        assert_eq!(threaded.calculate(), line.calculate());
        assert_eq!(threaded.threads(), 8);
    }
}
