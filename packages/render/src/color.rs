//! Continuous fill colours for the choropleth.
//!
//! Counts are mapped onto a reversed red-yellow-green ramp: the highest
//! count in the visible subset is deep red, the lowest deep green.

/// `RdYlGn` stops from red to green.
const RD_YL_GN: [(u8, u8, u8); 11] = [
    (0xa5, 0x00, 0x26),
    (0xd7, 0x30, 0x27),
    (0xf4, 0x6d, 0x43),
    (0xfd, 0xae, 0x61),
    (0xfe, 0xe0, 0x8b),
    (0xff, 0xff, 0xbf),
    (0xd9, 0xef, 0x8b),
    (0xa6, 0xd9, 0x6a),
    (0x66, 0xbd, 0x63),
    (0x1a, 0x98, 0x50),
    (0x00, 0x68, 0x37),
];

/// Linear colour scale over a range of accident counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorScale {
    min: u64,
    max: u64,
}

impl ColorScale {
    /// Builds a scale spanning the smallest and largest count.
    #[must_use]
    pub fn from_counts<I: IntoIterator<Item = u64>>(counts: I) -> Self {
        let (min, max) = counts
            .into_iter()
            .fold(None, |acc: Option<(u64, u64)>, c| match acc {
                None => Some((c, c)),
                Some((lo, hi)) => Some((lo.min(c), hi.max(c))),
            })
            .unwrap_or((0, 0));
        Self { min, max }
    }

    /// Returns the `#rrggbb` fill for `count`.
    ///
    /// Counts outside the range are clamped. When every count is equal the
    /// midpoint colour is used.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn color(&self, count: u64) -> String {
        let t = if self.max > self.min {
            let c = count.clamp(self.min, self.max);
            (c - self.min) as f64 / (self.max - self.min) as f64
        } else {
            0.5
        };
        ramp(1.0 - t)
    }
}

/// Interpolates the ramp at `pos` in `0.0..=1.0` (0 is red).
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn ramp(pos: f64) -> String {
    let segments = RD_YL_GN.len() - 1;
    let scaled = pos.clamp(0.0, 1.0) * segments as f64;
    let i = (scaled.floor() as usize).min(segments - 1);
    let frac = scaled - i as f64;

    let (a, b) = (RD_YL_GN[i], RD_YL_GN[i + 1]);
    let lerp = |x: u8, y: u8| -> u8 {
        let (x, y) = (f64::from(x), f64::from(y));
        (x + (y - x) * frac).round() as u8
    };

    format!("#{:02x}{:02x}{:02x}", lerp(a.0, b.0), lerp(a.1, b.1), lerp(a.2, b.2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn highest_count_is_red_lowest_is_green() {
        let scale = ColorScale::from_counts([2, 40, 17]);
        assert_eq!(scale.color(40), "#a50026");
        assert_eq!(scale.color(2), "#006837");
    }

    #[test]
    fn middle_of_range_is_pale_yellow() {
        let scale = ColorScale::from_counts([0, 100]);
        assert_eq!(scale.color(50), "#ffffbf");
    }

    #[test]
    fn equal_counts_use_midpoint() {
        let scale = ColorScale::from_counts([7, 7]);
        assert_eq!(scale.color(7), "#ffffbf");
        assert_eq!(ColorScale::from_counts([]).color(3), "#ffffbf");
    }

    #[test]
    fn out_of_range_counts_are_clamped() {
        let scale = ColorScale::from_counts([10, 20]);
        assert_eq!(scale.color(500), scale.color(20));
        assert_eq!(scale.color(0), scale.color(10));
    }

    #[test]
    fn interpolates_between_stops() {
        // Halfway between the first two stops.
        assert_eq!(ramp(0.05), "#be1827");
    }
}
