/// A subpixel position in `(row, col)` order.
///
/// `row` runs down the image (the `y` axis of [`crate::Image`]) and `col`
/// runs across it (`x`).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub row: f32,
    pub col: f32,
}

impl Point {
    pub const ZERO: Self = Self { row: 0.0, col: 0.0 };

    pub const fn new(row: f32, col: f32) -> Self {
        Self { row, col }
    }
}
