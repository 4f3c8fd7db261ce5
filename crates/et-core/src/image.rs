use crate::{Error, Pixel};

/// Owned, contiguous, x-fastest grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Image<T> {
    width: usize,
    height: usize,
    data: Vec<T>,
}

impl<T> Image<T> {
    pub fn from_vec(width: usize, height: usize, data: Vec<T>) -> Result<Self, Error> {
        let expected = width.checked_mul(height).ok_or(Error::SizeMismatch {
            expected: usize::MAX,
            actual: data.len(),
        })?;

        if data.len() != expected {
            return Err(Error::SizeMismatch {
                expected,
                actual: data.len(),
            });
        }

        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Builds an image by evaluating `f(x, y)` in raster order.
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut data = Vec::with_capacity(width.saturating_mul(height));
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            data,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// `(width, height)`.
    pub fn dims(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn get(&self, x: usize, y: usize) -> Option<&T> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get(y * self.width + x)
    }

    pub fn get_mut(&mut self, x: usize, y: usize) -> Option<&mut T> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get_mut(y * self.width + x)
    }

    /// Elementwise map into a new image of the same shape.
    pub fn map<U>(&self, f: impl FnMut(&T) -> U) -> Image<U> {
        Image {
            width: self.width,
            height: self.height,
            data: self.data.iter().map(f).collect(),
        }
    }

    pub fn as_view(&self) -> ImageView<'_, T> {
        ImageView {
            width: self.width,
            height: self.height,
            stride: self.width,
            data: &self.data,
        }
    }

    pub fn as_view_mut(&mut self) -> ImageViewMut<'_, T> {
        ImageViewMut {
            width: self.width,
            height: self.height,
            stride: self.width,
            data: &mut self.data,
        }
    }
}

impl<T: Clone> Image<T> {
    pub fn new_fill(width: usize, height: usize, value: T) -> Self {
        let len = width.checked_mul(height).expect("image size overflow");
        Self {
            width,
            height,
            data: vec![value; len],
        }
    }

    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }
}

/// Borrowed grid with an element stride between row starts.
#[derive(Debug, Clone, Copy)]
pub struct ImageView<'a, T> {
    width: usize,
    height: usize,
    stride: usize,
    data: &'a [T],
}

impl<'a, T> ImageView<'a, T> {
    pub fn from_slice(
        width: usize,
        height: usize,
        stride: usize,
        data: &'a [T],
    ) -> Result<Self, Error> {
        check_layout(width, height, stride, data.len())?;
        Ok(Self {
            width,
            height,
            stride,
            data,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn dims(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn row(&self, y: usize) -> &'a [T] {
        assert!(y < self.height, "row index out of bounds");
        let start = y * self.stride;
        &self.data[start..start + self.width]
    }

    pub fn get(&self, x: usize, y: usize) -> Option<&'a T> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get(y * self.stride + x)
    }

    pub fn subview(
        &self,
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    ) -> Result<ImageView<'a, T>, Error> {
        let start = subview_start(self.dims(), self.stride, x, y, width, height)?;
        let tail = self.data.get(start..).ok_or(Error::OutOfBounds)?;
        check_layout(width, height, self.stride, tail.len()).map_err(|_| Error::OutOfBounds)?;

        Ok(ImageView {
            width,
            height,
            stride: self.stride,
            data: tail,
        })
    }
}

#[derive(Debug)]
pub struct ImageViewMut<'a, T> {
    width: usize,
    height: usize,
    stride: usize,
    data: &'a mut [T],
}

impl<'a, T> ImageViewMut<'a, T> {
    pub fn from_slice_mut(
        width: usize,
        height: usize,
        stride: usize,
        data: &'a mut [T],
    ) -> Result<Self, Error> {
        check_layout(width, height, stride, data.len())?;
        Ok(Self {
            width,
            height,
            stride,
            data,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn dims(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn row(&self, y: usize) -> &[T] {
        assert!(y < self.height, "row index out of bounds");
        let start = y * self.stride;
        &self.data[start..start + self.width]
    }

    pub fn row_mut(&mut self, y: usize) -> &mut [T] {
        assert!(y < self.height, "row index out of bounds");
        let start = y * self.stride;
        &mut self.data[start..start + self.width]
    }

    /// Raw backing slice and stride, for splitting rows across threads.
    ///
    /// Row `y` occupies `[y * stride, y * stride + width)`.
    pub fn as_strided_mut(&mut self) -> (&mut [T], usize) {
        (&mut *self.data, self.stride)
    }

    pub fn get(&self, x: usize, y: usize) -> Option<&T> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get(y * self.stride + x)
    }

    pub fn get_mut(&mut self, x: usize, y: usize) -> Option<&mut T> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get_mut(y * self.stride + x)
    }

    pub fn fill(&mut self, value: T)
    where
        T: Clone,
    {
        for y in 0..self.height {
            self.row_mut(y).fill(value.clone());
        }
    }

    pub fn subview_mut(
        &mut self,
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    ) -> Result<ImageViewMut<'_, T>, Error> {
        let start = subview_start(self.dims(), self.stride, x, y, width, height)?;
        if start > self.data.len() {
            return Err(Error::OutOfBounds);
        }
        let (_, tail) = self.data.split_at_mut(start);
        check_layout(width, height, self.stride, tail.len()).map_err(|_| Error::OutOfBounds)?;

        Ok(ImageViewMut {
            width,
            height,
            stride: self.stride,
            data: tail,
        })
    }

    pub fn as_view(&self) -> ImageView<'_, T> {
        ImageView {
            width: self.width,
            height: self.height,
            stride: self.stride,
            data: self.data,
        }
    }
}

fn check_layout(width: usize, height: usize, stride: usize, len: usize) -> Result<(), Error> {
    if stride < width {
        return Err(Error::InvalidStride);
    }
    let min_len = min_required_len(width, height, stride).ok_or(Error::SizeMismatch {
        expected: usize::MAX,
        actual: len,
    })?;
    if len < min_len {
        return Err(Error::SizeMismatch {
            expected: min_len,
            actual: len,
        });
    }
    Ok(())
}

fn subview_start(
    (parent_w, parent_h): (usize, usize),
    stride: usize,
    x: usize,
    y: usize,
    width: usize,
    height: usize,
) -> Result<usize, Error> {
    if x > parent_w || y > parent_h || width > parent_w - x || height > parent_h - y {
        return Err(Error::OutOfBounds);
    }
    y.checked_mul(stride)
        .and_then(|v| v.checked_add(x))
        .ok_or(Error::OutOfBounds)
}

fn min_required_len(width: usize, height: usize, stride: usize) -> Option<usize> {
    if width == 0 || height == 0 {
        return Some(0);
    }

    let rows_before_last = height.checked_sub(1)?;
    let base = rows_before_last.checked_mul(stride)?;
    base.checked_add(width)
}

/// Raw numeric copy into `f32`.
pub fn to_f32<T: Pixel>(img: &ImageView<'_, T>) -> Image<f32> {
    convert_rows(img, Pixel::to_f32)
}

/// Copy into `f32` with integer types scaled to `[0, 1]`.
pub fn to_intensity<T: Pixel>(img: &ImageView<'_, T>) -> Image<f32> {
    convert_rows(img, Pixel::to_intensity)
}

fn convert_rows<T: Copy>(img: &ImageView<'_, T>, f: impl Fn(T) -> f32) -> Image<f32> {
    let mut out = Vec::with_capacity(img.width() * img.height());
    for y in 0..img.height() {
        out.extend(img.row(y).iter().map(|&px| f(px)));
    }

    Image {
        width: img.width(),
        height: img.height(),
        data: out,
    }
}

/// Interleaved 8-bit RGB to `[0, 1]` luma with Rec. 601 weights.
pub fn rgb_to_gray(width: usize, height: usize, rgb: &[u8]) -> Result<Image<f32>, Error> {
    let expected = width
        .checked_mul(height)
        .and_then(|n| n.checked_mul(3))
        .ok_or(Error::SizeMismatch {
            expected: usize::MAX,
            actual: rgb.len(),
        })?;
    if rgb.len() != expected {
        return Err(Error::SizeMismatch {
            expected,
            actual: rgb.len(),
        });
    }

    let data = rgb
        .chunks_exact(3)
        .map(|px| {
            (0.299 * f32::from(px[0]) + 0.587 * f32::from(px[1]) + 0.114 * f32::from(px[2]))
                / 255.0
        })
        .collect();

    Ok(Image {
        width,
        height,
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::{Image, ImageView, ImageViewMut, rgb_to_gray, to_f32, to_intensity};
    use crate::Error;

    #[test]
    fn view_indexing_with_stride() {
        let data = vec![1u8, 2, 3, 99, 4, 5, 6, 88];
        let view = ImageView::from_slice(3, 2, 4, &data).expect("valid view");

        assert_eq!(view.row(0), &[1, 2, 3]);
        assert_eq!(view.row(1), &[4, 5, 6]);
        assert_eq!(view.get(0, 1), Some(&4));
        assert_eq!(view.get(3, 1), None);
    }

    #[test]
    fn subview_non_contiguous_parent() {
        let data = vec![
            10u8, 11, 12, 13, 99, // row 0
            20, 21, 22, 23, 98, // row 1
            30, 31, 32, 33, 97, // row 2
        ];
        let parent = ImageView::from_slice(4, 3, 5, &data).expect("valid parent");
        let sub = parent.subview(1, 1, 3, 2).expect("valid subview");

        assert_eq!(sub.dims(), (3, 2));
        assert_eq!(sub.row(1), &[31, 32, 33]);
        assert!(parent.subview(2, 2, 3, 1).is_err());
    }

    #[test]
    fn mutable_view_fill_respects_stride() {
        let mut data = vec![0u8; 10];
        let mut view = ImageViewMut::from_slice_mut(3, 2, 5, &mut data).expect("valid view");
        let mut sub = view.subview_mut(1, 0, 2, 2).expect("valid subview");
        sub.fill(7);
        *sub.get_mut(0, 1).expect("in bounds") = 9;

        assert_eq!(data, vec![0, 7, 7, 0, 0, 0, 9, 7, 0, 0]);
    }

    #[test]
    fn from_vec_rejects_wrong_length() {
        assert_eq!(
            Image::from_vec(2, 2, vec![0u8; 3]),
            Err(Error::SizeMismatch {
                expected: 4,
                actual: 3
            })
        );
    }

    #[test]
    fn from_fn_and_map_keep_shape() {
        let img = Image::from_fn(3, 2, |x, y| (10 * y + x) as u16);
        assert_eq!(img.get(2, 1), Some(&12));
        let doubled = img.map(|&v| f32::from(v) * 2.0);
        assert_eq!(doubled.dims(), (3, 2));
        assert_eq!(doubled.data()[5], 24.0);
    }

    #[test]
    fn conversions_to_f32() {
        let img8 = Image::from_vec(2, 1, vec![0u8, 255]).expect("valid image");
        assert_eq!(to_f32(&img8.as_view()).data(), &[0.0, 255.0]);
        assert_eq!(to_intensity(&img8.as_view()).data(), &[0.0, 1.0]);

        let gray = rgb_to_gray(1, 1, &[255, 255, 255]).expect("valid rgb");
        assert!((gray.data()[0] - 1.0).abs() < 1e-5);
        assert!(rgb_to_gray(2, 1, &[0; 3]).is_err());
    }
}
