//! Axis

use std::ops::Add;

/// Axis enumeration
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum Axis {
    #[default]
    X = 0,
    Y = 1,
    Z = 2,
}

impl From<usize> for Axis {
    /// Maps an index to an axis; indices wrap around modulo 3.
    ///
    /// * `i` - The index.
    fn from(i: usize) -> Self {
        match i % 3 {
            0 => Axis::X,
            1 => Axis::Y,
            _ => Axis::Z,
        }
    }
}

impl From<Axis> for usize {
    fn from(axis: Axis) -> usize {
        axis as usize
    }
}

impl Add<usize> for Axis {
    type Output = Axis;

    fn add(self, i: usize) -> Self::Output {
        Axis::from(self as usize + i)
    }
}
