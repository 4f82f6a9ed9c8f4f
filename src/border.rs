//! Removes foreground components that are not reachable from outside the
//! document border.

use std::collections::VecDeque;

use image::{GrayImage, Luma};
use tracing::*;

use crate::ShredError;

/// Pixels of the foreground mask valued at or below this count as outside the
/// true document content.
const OUTSIDE_THRESHOLD: u8 = 254;

const NEIGHBORS_4: [(i64, i64); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// Only keeps the foreground components of `image` that touch the outside of
/// the document.
///
/// `foreground_mask` marks the document's true extent: pixels valued 255 are
/// inside, everything else is outside (margin, scanner background). The
/// outside region is forced to foreground, a flood fill is seeded at the
/// first outside pixel in row-major scan order, and only the foreground
/// components the fill reaches survive. Applying the filter twice yields the
/// same result as once.
///
/// # Errors
/// [`ShredError::ShapeMismatch`] when the two images disagree in dimensions,
/// and [`ShredError::InvalidMask`] when the mask marks no pixel as outside,
/// leaving the fill without a seed.
///
/// # Example
/// ```
/// use image::{GrayImage, Luma};
/// use shredsim::border::preserve_outermost;
///
/// // The outer ring is outside the document; the 3x3 interior is inside.
/// let mask = GrayImage::from_fn(5, 5, |x, y| {
///     if x == 0 || y == 0 || x == 4 || y == 4 {
///         Luma([0])
///     } else {
///         Luma([255])
///     }
/// });
///
/// let mut img = GrayImage::new(5, 5);
/// img.put_pixel(1, 1, Luma([255])); // touches the ring
/// img.put_pixel(2, 2, Luma([255])); // isolated in the center
///
/// let kept = preserve_outermost(&img, &mask).unwrap();
/// assert_eq!(*kept.get_pixel(1, 1), Luma([255]));
/// assert_eq!(*kept.get_pixel(2, 2), Luma([0]));
/// ```
pub fn preserve_outermost(
    image: &GrayImage,
    foreground_mask: &GrayImage,
) -> Result<GrayImage, ShredError> {
    if image.dimensions() != foreground_mask.dimensions() {
        return Err(ShredError::ShapeMismatch {
            expected: image.dimensions(),
            actual: foreground_mask.dimensions(),
        });
    }
    let (width, height) = image.dimensions();

    let outside = |x: u32, y: u32| foreground_mask.get_pixel(x, y).0[0] <= OUTSIDE_THRESHOLD;
    // Outside pixels are forced to foreground so the fill always has a path
    // from the seed into the image, whatever the original content there.
    let fillable = |x: u32, y: u32| image.get_pixel(x, y).0[0] != 0 || outside(x, y);

    let seed = seed_point(foreground_mask).ok_or(ShredError::InvalidMask)?;
    trace!("Flood fill seeded at {:?}", seed);

    let reachable = flood_fill(width, height, seed, fillable);

    let kept = GrayImage::from_fn(width, height, |x, y| {
        if reachable[(y as usize) * width as usize + x as usize] {
            *image.get_pixel(x, y)
        } else {
            Luma([0])
        }
    });
    debug!(
        "Border filter kept {} of {} foreground pixels",
        kept.as_raw().iter().filter(|&&v| v != 0).count(),
        image.as_raw().iter().filter(|&&v| v != 0).count()
    );
    Ok(kept)
}

/// The first outside pixel in row-major scan order, as (x, y).
fn seed_point(foreground_mask: &GrayImage) -> Option<(u32, u32)> {
    let (width, height) = foreground_mask.dimensions();
    (0..height)
        .flat_map(|y| (0..width).map(move |x| (x, y)))
        .find(|&(x, y)| foreground_mask.get_pixel(x, y).0[0] <= OUTSIDE_THRESHOLD)
}

/// 4-connected flood fill over the pixels `fillable` accepts, into a scratch
/// visited buffer that the caller owns afterwards.
fn flood_fill(
    width: u32,
    height: u32,
    seed: (u32, u32),
    fillable: impl Fn(u32, u32) -> bool,
) -> Vec<bool> {
    let mut visited = vec![false; width as usize * height as usize];
    let mut queue = VecDeque::new();

    visited[(seed.1 as usize) * width as usize + seed.0 as usize] = true;
    queue.push_back(seed);

    while let Some((x, y)) = queue.pop_front() {
        for (dx, dy) in NEIGHBORS_4 {
            let nx = i64::from(x) + dx;
            let ny = i64::from(y) + dy;
            if nx < 0 || ny < 0 || nx >= i64::from(width) || ny >= i64::from(height) {
                continue;
            }
            let (nx, ny) = (nx as u32, ny as u32);
            let idx = (ny as usize) * width as usize + nx as usize;

            if !visited[idx] && fillable(nx, ny) {
                visited[idx] = true;
                queue.push_back((nx, ny));
            }
        }
    }

    visited
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::{prelude::*, proptest};

    /// A mask whose outer ring of the given width is outside and whose
    /// interior is document content.
    fn ring_mask(width: u32, height: u32, margin: u32) -> GrayImage {
        GrayImage::from_fn(width, height, |x, y| {
            let inside = x >= margin && y >= margin && x < width - margin && y < height - margin;
            if inside {
                Luma([255])
            } else {
                Luma([0])
            }
        })
    }

    #[test]
    fn mismatched_shapes_are_rejected() {
        let img = GrayImage::new(4, 4);
        let mask = GrayImage::new(5, 4);
        let err = preserve_outermost(&img, &mask).unwrap_err();
        assert!(matches!(err, ShredError::ShapeMismatch { .. }));
    }

    #[test]
    fn mask_without_outside_pixels_is_rejected() {
        let img = GrayImage::new(4, 4);
        let mask = GrayImage::from_pixel(4, 4, Luma([255]));
        let err = preserve_outermost(&img, &mask).unwrap_err();
        assert!(matches!(err, ShredError::InvalidMask));
    }

    #[test]
    fn interior_component_is_dropped() {
        let mask = ring_mask(10, 10, 1);
        let mut img = GrayImage::new(10, 10);
        // Touches the outside ring through (1, 1) -- (0, 1) is outside.
        img.put_pixel(1, 1, Luma([255]));
        img.put_pixel(2, 1, Luma([255]));
        // Isolated in the middle of the document.
        img.put_pixel(5, 5, Luma([255]));
        img.put_pixel(5, 6, Luma([255]));

        let kept = preserve_outermost(&img, &mask).unwrap();

        assert_eq!(*kept.get_pixel(1, 1), Luma([255]));
        assert_eq!(*kept.get_pixel(2, 1), Luma([255]));
        assert_eq!(*kept.get_pixel(5, 5), Luma([0]));
        assert_eq!(*kept.get_pixel(5, 6), Luma([0]));
    }

    #[test]
    fn fill_reaches_components_through_blank_margins() {
        // No foreground anywhere near the ring; the forced outside region
        // still carries the fill to the component at the interior edge.
        let mask = ring_mask(8, 8, 2);
        let mut img = GrayImage::new(8, 8);
        img.put_pixel(2, 4, Luma([255]));

        let kept = preserve_outermost(&img, &mask).unwrap();
        assert_eq!(*kept.get_pixel(2, 4), Luma([255]));
    }

    #[test]
    fn fill_spreads_from_a_single_outside_pocket() {
        // Two disconnected outside pockets: only the one holding the
        // row-major-first seed feeds the fill, so a component touching the
        // far pocket alone is dropped.
        let mut mask = GrayImage::from_pixel(9, 9, Luma([255]));
        mask.put_pixel(0, 0, Luma([0]));
        mask.put_pixel(8, 8, Luma([0]));

        let mut img = GrayImage::new(9, 9);
        img.put_pixel(7, 8, Luma([255]));

        let kept = preserve_outermost(&img, &mask).unwrap();
        assert_eq!(*kept.get_pixel(7, 8), Luma([0]));
    }

    #[test]
    fn grayscale_values_survive_unchanged() {
        let mask = ring_mask(6, 6, 1);
        let mut img = GrayImage::new(6, 6);
        img.put_pixel(1, 1, Luma([77]));

        let kept = preserve_outermost(&img, &mask).unwrap();
        assert_eq!(*kept.get_pixel(1, 1), Luma([77]));
    }

    proptest! {
        #[test]
        fn filter_never_introduces_foreground(width in 4..24u32, height in 4..24u32) {
            let img = GrayImage::from_fn(width, height, |_, _| {
                if rand::random::<bool>() {
                    Luma([255])
                } else {
                    Luma([0])
                }
            });
            let mask = ring_mask(width, height, 1);

            let kept = preserve_outermost(&img, &mask).unwrap();

            for (x, y, pixel) in kept.enumerate_pixels() {
                if pixel.0[0] != 0 {
                    assert_eq!(pixel, img.get_pixel(x, y));
                }
            }
        }

        #[test]
        fn filter_is_idempotent(width in 4..24u32, height in 4..24u32) {
            let img = GrayImage::from_fn(width, height, |_, _| {
                if rand::random::<bool>() {
                    Luma([255])
                } else {
                    Luma([0])
                }
            });
            let mask = ring_mask(width, height, 1);

            let once = preserve_outermost(&img, &mask).unwrap();
            let twice = preserve_outermost(&once, &mask).unwrap();
            assert_eq!(once, twice);
        }
    }
}
