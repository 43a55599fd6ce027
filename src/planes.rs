// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Contains the Viewport struct, which describes the affine
//! relationship between a rectangle on the integral plane with an
//! origin at 0,0 and a rectangle on the complex plane.  Pixel (x, y)
//! maps to the point (x_start + x·dx) + i·(y_start + y·dy).
use num::Complex;

use crate::error::CalcError;

/// The region rendered when the caller does not supply one: real part
/// in [-2, 1], imaginary part in [-1.5, 1.5].
pub const DEFAULT_LEFTLOWER: Complex<f64> = Complex { re: -2.0, im: -1.5 };
/// See `DEFAULT_LEFTLOWER`.
pub const DEFAULT_RIGHTUPPER: Complex<f64> = Complex { re: 1.0, im: 1.5 };

/// The four scalars of the pixel to complex-plane mapping.  Immutable
/// for the lifetime of one calculation.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Viewport {
    /// Real part of pixel column 0.
    pub x_start: f64,
    /// Imaginary part of pixel row 0.
    pub y_start: f64,
    /// Real distance between neighbouring columns.
    pub dx: f64,
    /// Imaginary distance between neighbouring rows.
    pub dy: f64,
}

impl Viewport {
    /// A viewport from its raw scalars.
    pub fn new(x_start: f64, y_start: f64, dx: f64, dy: f64) -> Viewport {
        Viewport {
            x_start,
            y_start,
            dx,
            dy,
        }
    }

    /// Constructor.  Takes the size of the integral plane and the two
    /// corners describing the complex plane, and derives the per-pixel
    /// steps.
    pub fn fit(
        width: usize,
        height: usize,
        leftlower: Complex<f64>,
        rightupper: Complex<f64>,
    ) -> Result<Viewport, CalcError> {
        if width == 0 || height == 0 {
            return Err(CalcError::InvalidPlane(
                "The integral plane has no pixels.".to_string(),
            ));
        }

        if rightupper.re < leftlower.re {
            return Err(CalcError::InvalidPlane(
                "The left lower corner is not to the left of the right upper corner.".to_string(),
            ));
        }

        if rightupper.im < leftlower.im {
            return Err(CalcError::InvalidPlane(
                "The left lower corner is not lower than the right upper corner.".to_string(),
            ));
        }

        Ok(Viewport {
            x_start: leftlower.re,
            y_start: leftlower.im,
            dx: (rightupper.re - leftlower.re) / (width as f64),
            dy: (rightupper.im - leftlower.im) / (height as f64),
        })
    }

    /// The standard full-set view for a square image of `size` pixels.
    pub fn default_for(size: usize) -> Viewport {
        let size = size.max(1) as f64;
        Viewport {
            x_start: DEFAULT_LEFTLOWER.re,
            y_start: DEFAULT_LEFTLOWER.im,
            dx: (DEFAULT_RIGHTUPPER.re - DEFAULT_LEFTLOWER.re) / size,
            dy: (DEFAULT_RIGHTUPPER.im - DEFAULT_LEFTLOWER.im) / size,
        }
    }

    /// Narrows the scalars to the single precision the kernel runs in.
    pub fn lanes(&self) -> LaneMapping {
        LaneMapping {
            x_start: self.x_start as f32,
            y_start: self.y_start as f32,
            dx: self.dx as f32,
            dy: self.dy as f32,
        }
    }
}

/// Single-precision form of a `Viewport`.  Every calculator derives its
/// lane coordinates through `c_re` and `c_im`, so two calculators given
/// the same pixel always see the same bits.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LaneMapping {
    /// Real part of column 0.
    pub x_start: f32,
    /// Imaginary part of row 0.
    pub y_start: f32,
    /// Column step.
    pub dx: f32,
    /// Row step.
    pub dy: f32,
}

impl LaneMapping {
    /// Real coordinate of column `x`.
    #[inline(always)]
    pub fn c_re(&self, x: usize) -> f32 {
        self.x_start + (x as f32) * self.dx
    }

    /// Imaginary coordinate of row `y`.
    #[inline(always)]
    pub fn c_im(&self, y: usize) -> f32 {
        self.y_start + (y as f32) * self.dy
    }

    /// The complex point under pixel (x, y).
    pub fn point(&self, x: usize, y: usize) -> Complex<f32> {
        Complex::new(self.c_re(x), self.c_im(y))
    }
}
