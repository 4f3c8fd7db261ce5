use core::str::FromStr;

use crate::Error;

/// Policy for resolving coordinates that fall outside a grid axis.
///
/// For an axis of length 5 (`abcde`) the modes extend it as:
/// - `Clamp` (replicate): `aaa|abcde|eee`
/// - `Symmetric`: `cba|abcde|edc`
/// - `Reflect101`: `dcb|abcde|dcb`
/// - `Circular`: `cde|abcde|abc`
/// - `Constant(v)`: `vvv|abcde|vvv`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BorderMode<T> {
    Clamp,
    Constant(T),
    Reflect101,
    Symmetric,
    Circular,
}

impl<T> BorderMode<T> {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Clamp => "replicate",
            Self::Constant(_) => "constant",
            Self::Reflect101 => "reflect",
            Self::Symmetric => "symmetric",
            Self::Circular => "circular",
        }
    }

    /// The same policy with the fill value dropped.
    pub fn without_fill(&self) -> BorderMode<()> {
        match self {
            Self::Clamp => BorderMode::Clamp,
            Self::Constant(_) => BorderMode::Constant(()),
            Self::Reflect101 => BorderMode::Reflect101,
            Self::Symmetric => BorderMode::Symmetric,
            Self::Circular => BorderMode::Circular,
        }
    }

    /// The fill value, if this mode has one.
    pub fn fill(&self) -> Option<&T> {
        match self {
            Self::Constant(v) => Some(v),
            _ => None,
        }
    }
}

/// Accepts the usual boundary names. `constant`/`fill` use `T::default()`.
impl<T: Default> FromStr for BorderMode<T> {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "clamp" | "replicate" => Ok(Self::Clamp),
            "reflect" | "reflect101" => Ok(Self::Reflect101),
            "symmetric" => Ok(Self::Symmetric),
            "circular" | "wrap" => Ok(Self::Circular),
            "constant" | "fill" => Ok(Self::Constant(T::default())),
            _ => Err(Error::UnknownBorderMode(s.to_string())),
        }
    }
}

/// Maps a possibly out-of-range index onto `[0, len)`.
///
/// Returns `None` for `Constant` (the caller substitutes the fill value) and
/// for empty axes.
pub fn map_index<T>(i: isize, len: usize, mode: &BorderMode<T>) -> Option<usize> {
    if len == 0 {
        return None;
    }
    if i >= 0 && (i as usize) < len {
        return Some(i as usize);
    }

    let n = len as isize;
    match mode {
        BorderMode::Constant(_) => None,
        BorderMode::Clamp => Some(i.clamp(0, n - 1) as usize),
        BorderMode::Reflect101 => {
            if len == 1 {
                return Some(0);
            }
            let period = 2 * n - 2;
            let r = i.rem_euclid(period);
            Some(if r < n { r } else { period - r } as usize)
        }
        BorderMode::Symmetric => {
            let period = 2 * n;
            let r = i.rem_euclid(period);
            Some(if r < n { r } else { period - 1 - r } as usize)
        }
        BorderMode::Circular => Some(i.rem_euclid(n) as usize),
    }
}

/// Precomputed index remapping for one axis.
///
/// Coordinates in `[-pad, len + pad)` resolve through a table. Coordinates
/// outside that window fall back to [`map_index`], so `pad` only trades memory
/// for speed and never changes the result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BorderIndex {
    len: usize,
    pad: usize,
    mode: BorderMode<()>,
    lut: Vec<Option<usize>>,
}

impl BorderIndex {
    pub fn new<T>(len: usize, pad: usize, mode: &BorderMode<T>) -> Self {
        let lut = (0..len + 2 * pad)
            .map(|k| map_index(k as isize - pad as isize, len, mode))
            .collect();
        Self {
            len,
            pad,
            mode: mode.without_fill(),
            lut,
        }
    }

    #[inline]
    pub fn get(&self, i: isize) -> Option<usize> {
        let k = i.saturating_add(self.pad as isize);
        match usize::try_from(k).ok().and_then(|k| self.lut.get(k)) {
            Some(&idx) => idx,
            None => map_index(i, self.len, &self.mode),
        }
    }
}
