//! Linear-index ↔ coordinate bijection.
//!
//! Generation walks a single `u64` counter; everything else (directory
//! layout, file names, subtree boundaries) is derived from it through the
//! pure mappings in this module.

use std::fmt;

/// A point in the 3-channel space. Channel values are bounded by the
/// configured base, which never exceeds 256.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Coord {
    /// First channel; selects the subtree.
    pub c0: u8,
    /// Second channel; selects the directory inside the subtree.
    pub c1: u8,
    /// Third channel.
    pub c2: u8,
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:03}_{:03}_{:03}", self.c0, self.c1, self.c2)
    }
}

/// Total number of points for a per-channel cardinality.
#[inline]
#[must_use]
pub fn total_points(base: u32) -> u64 {
    u64::from(base).pow(3)
}

/// Number of points sharing one `c0` value.
#[inline]
#[must_use]
pub fn subtree_len(base: u32) -> u64 {
    u64::from(base).pow(2)
}

/// Decodes a linear index into its coordinate. Defined for `index` in
/// `[0, base^3)`.
#[inline]
#[must_use]
pub fn index_to_coord(index: u64, base: u32) -> Coord {
    let base = u64::from(base);
    let sq = base * base;
    Coord {
        c0: (index / sq) as u8,
        c1: ((index % sq) / base) as u8,
        c2: (index % base) as u8,
    }
}

/// Encodes a coordinate back into its linear index.
#[inline]
#[must_use]
pub fn coord_to_index(coord: Coord, base: u32) -> u64 {
    let base = u64::from(base);
    u64::from(coord.c0) * base * base + u64::from(coord.c1) * base + u64::from(coord.c2)
}

/// True when `index` is the last member of its subtree.
#[inline]
#[must_use]
pub fn closes_subtree(index: u64, base: u32) -> bool {
    (index + 1) % subtree_len(base) == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn first_and_last_index() {
        assert_eq!(index_to_coord(0, 256), Coord { c0: 0, c1: 0, c2: 0 });
        assert_eq!(
            index_to_coord(16_777_215, 256),
            Coord { c0: 255, c1: 255, c2: 255 }
        );
        assert_eq!(total_points(256), 16_777_216);
    }

    #[test]
    fn small_base_mapping() {
        assert_eq!(total_points(4), 64);
        assert_eq!(subtree_len(4), 16);
        assert_eq!(index_to_coord(15, 4), Coord { c0: 0, c1: 3, c2: 3 });
        assert_eq!(index_to_coord(16, 4), Coord { c0: 1, c1: 0, c2: 0 });
    }

    #[test]
    fn subtree_boundaries() {
        assert!(closes_subtree(15, 4));
        assert!(!closes_subtree(14, 4));
        assert!(!closes_subtree(16, 4));
        assert!(closes_subtree(65_535, 256));
        assert!(closes_subtree(16_777_215, 256));
    }

    #[test]
    fn coord_display_is_zero_padded() {
        let coord = Coord { c0: 8, c1: 0, c2: 255 };
        assert_eq!(coord.to_string(), "008_000_255");
    }

    proptest! {
        #[test]
        fn roundtrip_from_index(index in 0u64..16_777_216) {
            let coord = index_to_coord(index, 256);
            prop_assert_eq!(coord_to_index(coord, 256), index);
        }

        #[test]
        fn roundtrip_from_coord(c0: u8, c1: u8, c2: u8) {
            let coord = Coord { c0, c1, c2 };
            prop_assert_eq!(index_to_coord(coord_to_index(coord, 256), 256), coord);
        }
    }
}
