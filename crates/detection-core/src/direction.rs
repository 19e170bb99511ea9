//! Coarse movement direction from a moved-diff map.
//!
//! The frame is split into four overlapping bands: the left and right
//! thirds by column, the top and bottom thirds by row. A corner pixel
//! belongs to one vertical and one horizontal band. The band with the
//! largest moved-diff sum wins; ties resolve in the order
//! left, right, up, down.

use wakesight_motion_model::MotionDirection;

use crate::diff::DiffMap;

/// Moved-diff totals per band.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegionSums {
    pub left: u64,
    pub right: u64,
    pub up: u64,
    pub down: u64,
}

impl RegionSums {
    /// Accumulate band totals over the whole map.
    pub fn from_map(map: &DiffMap) -> Self {
        let width = map.width() as u64;
        let height = map.height() as u64;
        let mut sums = Self::default();

        for (x, y, value) in map.iter() {
            if value == 0 {
                continue;
            }
            let (x, y, value) = (x as u64, y as u64, value as u64);

            if 3 * x < width {
                sums.left += value;
            }
            if 3 * x > 2 * width {
                sums.right += value;
            }
            if 3 * y < height {
                sums.up += value;
            }
            if 3 * y > 2 * height {
                sums.down += value;
            }
        }

        sums
    }

    /// Band with the largest sum, first in tie-break order on equality.
    /// `None` when every band is empty.
    pub fn dominant(&self) -> MotionDirection {
        let ordered = [
            (MotionDirection::Left, self.left),
            (MotionDirection::Right, self.right),
            (MotionDirection::Up, self.up),
            (MotionDirection::Down, self.down),
        ];

        let mut best = (MotionDirection::None, 0u64);
        for (direction, sum) in ordered {
            if sum > best.1 {
                best = (direction, sum);
            }
        }
        best.0
    }
}

/// Classify the dominant direction of a moved-diff map.
pub fn classify_direction(map: &DiffMap) -> MotionDirection {
    if map.total() == 0 {
        return MotionDirection::None;
    }
    RegionSums::from_map(map).dominant()
}

#[cfg(test)]
mod tests {
    use wakesight_motion_model::PixelBuffer;

    use super::*;
    use crate::diff::diff_frames;

    const BASE: [u8; 4] = [50, 50, 50, 255];
    const MOVED: [u8; 4] = [150, 50, 50, 255];

    fn map_with_changes(width: u32, height: u32, changed: impl Fn(u32, u32) -> bool) -> DiffMap {
        let previous = PixelBuffer::filled(width, height, BASE);
        let current = PixelBuffer::from_fn(width, height, |x, y| {
            if changed(x, y) {
                MOVED
            } else {
                BASE
            }
        });
        diff_frames(&current, &previous, 15).unwrap().map
    }

    #[test]
    fn empty_map_has_no_direction() {
        let map = map_with_changes(30, 30, |_, _| false);
        assert_eq!(classify_direction(&map), MotionDirection::None);
    }

    #[test]
    fn band_membership_uses_strict_thirds() {
        // 9 columns: left band is x 0..=2, right band is x 7..=8.
        let map = map_with_changes(9, 9, |x, y| y == 4 && matches!(x, 2 | 3 | 6 | 7));
        let sums = RegionSums::from_map(&map);
        assert_eq!(sums.left, 100);
        assert_eq!(sums.right, 100);
        assert_eq!(sums.up, 0);
        assert_eq!(sums.down, 0);
    }

    #[test]
    fn each_band_can_dominate() {
        let cases: [(fn(u32, u32) -> bool, MotionDirection); 4] = [
            (|x, _| x < 5, MotionDirection::Left),
            (|x, _| x > 25, MotionDirection::Right),
            (|_, y| y < 5, MotionDirection::Up),
            (|_, y| y > 25, MotionDirection::Down),
        ];
        for (changed, expected) in cases {
            let map = map_with_changes(30, 30, changed);
            assert_eq!(classify_direction(&map), expected);
        }
    }

    #[test]
    fn corner_pixel_counts_twice_and_ties_prefer_left() {
        // Top-left corner contributes equally to the left and up bands.
        let map = map_with_changes(30, 30, |x, y| x == 0 && y == 0);
        let sums = RegionSums::from_map(&map);
        assert_eq!(sums.left, sums.up);
        assert_eq!(classify_direction(&map), MotionDirection::Left);
    }

    #[test]
    fn tie_break_order_is_left_right_up_down() {
        let sums = RegionSums {
            left: 0,
            right: 7,
            up: 7,
            down: 7,
        };
        assert_eq!(sums.dominant(), MotionDirection::Right);

        let sums = RegionSums {
            left: 0,
            right: 0,
            up: 3,
            down: 3,
        };
        assert_eq!(sums.dominant(), MotionDirection::Up);
    }

    #[test]
    fn centre_only_motion_has_no_direction() {
        let map = map_with_changes(30, 30, |x, y| (10..20).contains(&x) && (10..20).contains(&y));
        assert!(map.total() > 0);
        assert_eq!(classify_direction(&map), MotionDirection::None);
    }
}
