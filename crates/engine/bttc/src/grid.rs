//! Read-only views over square sample grids
//!
//! A [`Grid`] borrows a row-major buffer of `f64` samples and addresses it as
//! `samples[pitch * x + y]`, so the first coordinate selects the row. The pitch
//! decouples the logical side length from the physical row length, which lets a
//! caller subdivide a window of a larger buffer without copying it.

use glam::IVec2;
use serde::Deserialize;

use crate::error::{BttcError, Result};

/// Check that `size` is of the form `2^m + 1` with `m >= 1`
#[inline]
pub fn is_valid_size(size: usize) -> bool {
    size >= 3 && (size - 1).is_power_of_two() && size <= i32::MAX as usize
}

/// Borrowed square grid of samples
#[derive(Debug, Clone, Copy)]
pub struct Grid<'a> {
    samples: &'a [f64],
    pitch: usize,
    size: usize,
}

impl<'a> Grid<'a> {
    /// Create a grid view over `samples` with row stride `pitch`
    ///
    /// Fails without allocating if `size` is not `2^m + 1`, if the pitch is
    /// shorter than a row, if the buffer is too short, or if any addressed
    /// sample is NaN or infinite.
    pub fn new(samples: &'a [f64], pitch: usize, size: usize) -> Result<Self> {
        if !is_valid_size(size) {
            return Err(BttcError::InvalidSize { size });
        }
        if pitch < size {
            return Err(BttcError::InvalidPitch { pitch, size });
        }

        // The last row does not need to be padded out to the full pitch
        let required = pitch
            .checked_mul(size - 1)
            .and_then(|rows| rows.checked_add(size))
            .unwrap_or(usize::MAX);
        if samples.len() < required {
            return Err(BttcError::GridTooSmall {
                required,
                actual: samples.len(),
            });
        }

        for x in 0..size {
            let row = &samples[pitch * x..pitch * x + size];
            if let Some(y) = row.iter().position(|value| !value.is_finite()) {
                return Err(BttcError::NonFiniteSample { x, y });
            }
        }

        Ok(Self {
            samples,
            pitch,
            size,
        })
    }

    /// Create a grid whose pitch equals its size
    pub fn square(samples: &'a [f64], size: usize) -> Result<Self> {
        Self::new(samples, size, size)
    }

    /// View a `size x size` window of a larger buffer starting at row `x`, column `y`
    pub fn window(
        samples: &'a [f64],
        pitch: usize,
        x: usize,
        y: usize,
        size: usize,
    ) -> Result<Self> {
        let out_of_bounds = BttcError::WindowOutOfBounds { x, y, size, pitch };
        match y.checked_add(size) {
            Some(end) if end <= pitch => {}
            _ => return Err(out_of_bounds),
        }
        let offset = pitch
            .checked_mul(x)
            .and_then(|start| start.checked_add(y))
            .ok_or(out_of_bounds)?;
        let tail = samples.get(offset..).ok_or(BttcError::GridTooSmall {
            required: offset.saturating_add(1),
            actual: samples.len(),
        })?;
        Self::new(tail, pitch, size).map_err(|err| match err {
            BttcError::GridTooSmall { required, .. } => BttcError::GridTooSmall {
                required: offset.saturating_add(required),
                actual: samples.len(),
            },
            BttcError::NonFiniteSample { x: row, y: col } => BttcError::NonFiniteSample {
                x: x + row,
                y: y + col,
            },
            other => other,
        })
    }

    /// Side length in samples
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Row stride in samples
    #[inline]
    pub fn pitch(&self) -> usize {
        self.pitch
    }

    /// The exponent `m` in `size = 2^m + 1`
    #[inline]
    pub fn levels(&self) -> u32 {
        (self.size - 1).trailing_zeros()
    }

    /// Largest lattice coordinate, `size - 1`
    #[inline]
    pub fn extent(&self) -> i32 {
        (self.size - 1) as i32
    }

    /// Sample at row `x`, column `y`
    ///
    /// # Panics
    /// Panics if the point lies outside the grid.
    #[inline]
    pub fn sample(&self, x: usize, y: usize) -> f64 {
        assert!(x < self.size && y < self.size, "({x}, {y}) outside grid");
        self.samples[self.pitch * x + y]
    }

    /// Sample at a lattice point
    #[inline]
    pub fn sample_at(&self, point: IVec2) -> f64 {
        self.sample(point.x as usize, point.y as usize)
    }

    /// Iterate the rows of the grid, each `size` samples long
    pub fn rows(&self) -> impl Iterator<Item = &'a [f64]> + '_ {
        let samples = self.samples;
        (0..self.size).map(move |x| &samples[self.pitch * x..self.pitch * x + self.size])
    }
}

/// Owned row-major grid, typically loaded from a file
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "Vec<Vec<f64>>")]
pub struct GridBuf {
    size: usize,
    samples: Vec<f64>,
}

impl GridBuf {
    /// Build from a list of rows, rejecting ragged or non-square input
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let size = rows.len();
        if let Some((row, values)) = rows.iter().enumerate().find(|(_, r)| r.len() != size) {
            return Err(BttcError::NotSquare {
                rows: size,
                row,
                len: values.len(),
            });
        }

        Ok(Self {
            size,
            samples: rows.into_iter().flatten().collect(),
        })
    }

    /// Build a `size x size` grid by evaluating `f(x, y)` at every point
    pub fn from_fn(size: usize, mut f: impl FnMut(usize, usize) -> f64) -> Self {
        let mut samples = Vec::with_capacity(size * size);
        for x in 0..size {
            for y in 0..size {
                samples.push(f(x, y));
            }
        }
        Self { size, samples }
    }

    /// Side length in samples
    pub fn size(&self) -> usize {
        self.size
    }

    /// Flat row-major samples
    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    /// Borrow as a validated [`Grid`]
    pub fn as_grid(&self) -> Result<Grid<'_>> {
        Grid::square(&self.samples, self.size)
    }

    /// Borrow a validated sub-window
    pub fn window(&self, x: usize, y: usize, size: usize) -> Result<Grid<'_>> {
        Grid::window(&self.samples, self.size, x, y, size)
    }
}

impl TryFrom<Vec<Vec<f64>>> for GridBuf {
    type Error = BttcError;

    fn try_from(rows: Vec<Vec<f64>>) -> Result<Self> {
        Self::from_rows(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_sizes() {
        for size in [3, 5, 9, 17, 33, 65, 129, 257, 513, 1025] {
            assert!(is_valid_size(size), "{size} should be valid");
        }
    }

    #[test]
    fn test_invalid_sizes() {
        for size in [0, 1, 2, 4, 6, 7, 8, 10, 16, 100, 512] {
            assert!(!is_valid_size(size), "{size} should be invalid");
        }
    }

    #[test]
    fn test_new_rejects_invalid_size() {
        let samples = vec![0.0; 16];
        let err = Grid::square(&samples, 4).unwrap_err();
        assert!(matches!(err, BttcError::InvalidSize { size: 4 }));
        assert!(err.is_invalid_input());
    }

    #[test]
    fn test_new_rejects_short_pitch() {
        let samples = vec![0.0; 25];
        let err = Grid::new(&samples, 4, 5).unwrap_err();
        assert!(matches!(err, BttcError::InvalidPitch { pitch: 4, size: 5 }));
    }

    #[test]
    fn test_new_rejects_short_buffer() {
        let samples = vec![0.0; 8];
        let err = Grid::square(&samples, 3).unwrap_err();
        assert!(matches!(
            err,
            BttcError::GridTooSmall {
                required: 9,
                actual: 8
            }
        ));
    }

    #[test]
    fn test_last_row_needs_no_padding() {
        // pitch 4, size 3: rows start at 0, 4, 8 -> needs 11 values
        let samples = vec![1.0; 11];
        let grid = Grid::new(&samples, 4, 3).unwrap();
        assert_eq!(grid.sample(2, 2), 1.0);
    }

    #[test]
    fn test_new_rejects_nan() {
        let mut samples = vec![0.0; 9];
        samples[5] = f64::NAN;
        let err = Grid::square(&samples, 3).unwrap_err();
        assert!(matches!(err, BttcError::NonFiniteSample { x: 1, y: 2 }));
    }

    #[test]
    fn test_padding_is_not_validated() {
        // Values in the padding columns are never addressed
        let mut samples = vec![0.0; 4 * 3];
        samples[3] = f64::INFINITY;
        assert!(Grid::new(&samples, 4, 3).is_ok());
    }

    #[test]
    fn test_sample_addressing_is_row_major() {
        let buf = GridBuf::from_fn(3, |x, y| (x * 10 + y) as f64);
        let grid = buf.as_grid().unwrap();
        assert_eq!(grid.sample(0, 2), 2.0);
        assert_eq!(grid.sample(2, 0), 20.0);
        assert_eq!(grid.sample_at(IVec2::new(1, 2)), 12.0);
        assert_eq!(grid.levels(), 1);
        assert_eq!(grid.extent(), 2);
    }

    #[test]
    fn test_window_reads_sub_region() {
        let buf = GridBuf::from_fn(9, |x, y| (x * 100 + y) as f64);
        let window = buf.window(2, 4, 5).unwrap();
        assert_eq!(window.size(), 5);
        assert_eq!(window.pitch(), 9);
        assert_eq!(window.sample(0, 0), 204.0);
        assert_eq!(window.sample(4, 4), 608.0);
    }

    #[test]
    fn test_window_out_of_bounds() {
        let buf = GridBuf::from_fn(9, |_, _| 0.0);
        assert!(matches!(
            buf.window(0, 5, 5),
            Err(BttcError::WindowOutOfBounds { .. })
        ));
        assert!(matches!(
            buf.window(5, 0, 5),
            Err(BttcError::GridTooSmall { .. })
        ));
    }

    #[test]
    fn test_huge_pitch_reports_grid_too_small() {
        let samples = [0.0; 9];
        let err = Grid::new(&samples, usize::MAX / 2, 3).unwrap_err();
        assert!(matches!(
            err,
            BttcError::GridTooSmall {
                required: usize::MAX,
                actual: 9
            }
        ));
        assert!(matches!(
            crate::subdivide::subdivide_raw(&samples, usize::MAX, 3, 0.0),
            Err(BttcError::GridTooSmall { .. })
        ));
    }

    #[test]
    fn test_window_with_huge_offsets() {
        let buf = GridBuf::from_fn(5, |x, y| (x + y) as f64);
        assert!(matches!(
            buf.window(0, usize::MAX, 3),
            Err(BttcError::WindowOutOfBounds { .. })
        ));
        assert!(matches!(
            buf.window(usize::MAX, 0, 3),
            Err(BttcError::WindowOutOfBounds { .. })
        ));
        assert!(matches!(
            buf.window(usize::MAX / 10, 1, 3),
            Err(BttcError::GridTooSmall { .. })
        ));
    }

    #[test]
    fn test_window_reports_parent_coordinates() {
        let buf = GridBuf::from_fn(9, |x, y| if (x, y) == (3, 6) { f64::NAN } else { 0.0 });
        assert!(matches!(
            buf.window(2, 4, 5),
            Err(BttcError::NonFiniteSample { x: 3, y: 6 })
        ));
    }

    #[test]
    fn test_from_rows_rejects_ragged() {
        let err = GridBuf::from_rows(vec![vec![0.0; 3], vec![0.0; 2], vec![0.0; 3]]).unwrap_err();
        assert!(matches!(
            err,
            BttcError::NotSquare {
                rows: 3,
                row: 1,
                len: 2
            }
        ));
    }

    #[test]
    fn test_deserialize_rows() {
        let buf: GridBuf = serde_json::from_str("[[0,1,2],[3,4,5],[6,7,8]]").unwrap();
        assert_eq!(buf.size(), 3);
        assert_eq!(buf.as_grid().unwrap().sample(2, 1), 7.0);

        let bad: std::result::Result<GridBuf, _> = serde_json::from_str("[[0,1],[2]]");
        assert!(bad.is_err());
    }

    #[test]
    fn test_rows_iterator_skips_padding() {
        let samples = [1.0, 2.0, 3.0, -1.0, 4.0, 5.0, 6.0, -1.0, 7.0, 8.0, 9.0];
        let grid = Grid::new(&samples, 4, 3).unwrap();
        let rows: Vec<&[f64]> = grid.rows().collect();
        assert_eq!(rows[1], &[4.0, 5.0, 6.0]);
        assert_eq!(rows.len(), 3);
    }
}
