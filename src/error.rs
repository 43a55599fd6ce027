// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Everything that can go wrong before the first iteration runs.  The
//! kernel itself has no failure modes.

use failure::Fail;

/// Errors raised while building or driving a calculator.
#[derive(Debug, Fail, PartialEq)]
pub enum CalcError {
    /// The raster or a scratch buffer could not be obtained at 64-byte
    /// alignment.
    #[fail(display = "could not allocate {} bytes of aligned storage", bytes)]
    Allocation {
        /// Size of the rejected request.
        bytes: usize,
    },

    /// The requested complex region does not describe a plane.
    #[fail(display = "invalid plane: {}", _0)]
    InvalidPlane(String),

    /// A batch block size of zero, or an inner block that does not
    /// tile the outer one.
    #[fail(display = "invalid block sizes: outer {}, inner {}", outer, inner)]
    InvalidBlockSizes {
        /// Outer ("L3") chunk width in pixels.
        outer: usize,
        /// Inner ("L2") chunk width in pixels.
        inner: usize,
    },

    /// A worker thread panicked before finishing its rows.
    #[fail(display = "a worker thread panicked")]
    Worker,
}
