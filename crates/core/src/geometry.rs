//! Box dimensions and axis-permutation orientations.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Identifier of an item.
pub type ItemId = u32;

/// Identifier of a carrier (pallet).
pub type CarrierId = u32;

/// Numerical tolerance for geometric comparisons.
pub const EPSILON: f64 = 1e-9;

/// Axis-aligned box dimensions (length along x, width along y, height along z).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Dimensions {
    /// Extent along x.
    pub length: f64,
    /// Extent along y.
    pub width: f64,
    /// Extent along z.
    pub height: f64,
}

impl Dimensions {
    /// Creates new dimensions.
    pub fn new(length: f64, width: f64, height: f64) -> Self {
        Self {
            length,
            width,
            height,
        }
    }

    /// Returns the volume.
    pub fn volume(&self) -> f64 {
        self.length * self.width * self.height
    }

    /// Returns the base (footprint) area.
    pub fn base_area(&self) -> f64 {
        self.length * self.width
    }

    /// Returns true if all sides are finite and strictly positive.
    pub fn is_valid(&self) -> bool {
        [self.length, self.width, self.height]
            .iter()
            .all(|v| v.is_finite() && *v > 0.0)
    }

    /// Returns true if this box fits inside `length × width × height`.
    pub fn fits_within(&self, length: f64, width: f64, height: f64) -> bool {
        self.length <= length + EPSILON
            && self.width <= width + EPSILON
            && self.height <= height + EPSILON
    }

    fn axis(&self, index: usize) -> f64 {
        match index {
            0 => self.length,
            1 => self.width,
            _ => self.height,
        }
    }
}

/// One of the six axis permutations of an item's (length, width, height).
///
/// The variant name lists which original side ends up along x, y and z.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Orientation {
    /// Identity: (l, w, h).
    #[default]
    Lwh,
    /// (l, h, w): rotated 90° around x.
    Lhw,
    /// (w, l, h): rotated 90° around z.
    Wlh,
    /// (w, h, l)
    Whl,
    /// (h, l, w)
    Hlw,
    /// (h, w, l): rotated 90° around y.
    Hwl,
}

impl Orientation {
    /// All six orientations, identity first.
    pub const ALL: [Orientation; 6] = [
        Orientation::Lwh,
        Orientation::Lhw,
        Orientation::Wlh,
        Orientation::Whl,
        Orientation::Hlw,
        Orientation::Hwl,
    ];

    /// Returns the index into [`Orientation::ALL`].
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Returns the source axis (0 = length, 1 = width, 2 = height) placed on
    /// x, y and z.
    pub fn axes(&self) -> (usize, usize, usize) {
        match self {
            Self::Lwh => (0, 1, 2),
            Self::Lhw => (0, 2, 1),
            Self::Wlh => (1, 0, 2),
            Self::Whl => (1, 2, 0),
            Self::Hlw => (2, 0, 1),
            Self::Hwl => (2, 1, 0),
        }
    }

    /// Returns true for the identity permutation.
    pub fn is_identity(&self) -> bool {
        matches!(self, Self::Lwh)
    }

    /// Applies this permutation to `dims`.
    pub fn apply(&self, dims: &Dimensions) -> Dimensions {
        let (x, y, z) = self.axes();
        Dimensions::new(dims.axis(x), dims.axis(y), dims.axis(z))
    }
}

impl std::fmt::Display for Orientation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Lwh => "LWH",
            Self::Lhw => "LHW",
            Self::Wlh => "WLH",
            Self::Whl => "WHL",
            Self::Hlw => "HLW",
            Self::Hwl => "HWL",
        };
        write!(f, "{}", s)
    }
}
