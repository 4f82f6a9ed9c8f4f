//! Primitives for analyzing the content of individual shred slices.

use std::collections::{HashMap, HashSet};

use image::{GrayImage, Luma};
use tracing::*;

use crate::BasePoint;

/// An adjacency structure mapping each base point to its recorded neighbors.
pub type Adjacency = HashMap<BasePoint, HashSet<BasePoint>>;

/// The fraction of nonzero pixels in `img`, in `[0.0, 1.0]`.
///
/// An empty image has a ratio of `0.0`.
pub fn content_ratio(img: &GrayImage) -> f32 {
    let total = img.as_raw().len();
    if total == 0 {
        return 0.0;
    }
    let nonzero = img.as_raw().iter().filter(|&&value| value != 0).count();
    nonzero as f32 / total as f32
}

/// Whether `img` holds enough content to be useful: more than 5% of its
/// pixels are foreground.
///
/// # Example
/// ```
/// use image::{GrayImage, Luma};
/// use shredsim::content::is_good_node;
///
/// let blank = GrayImage::new(10, 10);
/// assert!(!is_good_node(&blank));
///
/// let mut img = GrayImage::new(10, 10);
/// for x in 0..10 {
///     img.put_pixel(x, 0, Luma([255]));
/// }
/// assert!(is_good_node(&img));
/// ```
pub fn is_good_node(img: &GrayImage) -> bool {
    content_ratio(img) > crate::DEFAULT_MIN_CONTENT_RATIO
}

/// Returns `shred` with every pixel outside `mask`'s nonzero region zeroed
/// out. The input is not mutated.
///
/// Pixels beyond the mask's bounds count as outside the footprint, so a mask
/// smaller than the shred never panics; it simply drops the uncovered region
/// to background.
pub fn masked_shred(shred: &GrayImage, mask: &GrayImage) -> GrayImage {
    trace!(
        "Masking {}x{} shred with {}x{} footprint",
        shred.height(),
        shred.width(),
        mask.height(),
        mask.width()
    );
    GrayImage::from_fn(shred.width(), shred.height(), |x, y| {
        let inside = mask
            .get_pixel_checked(x, y)
            .is_some_and(|pixel| pixel.0[0] != 0);
        if inside {
            *shred.get_pixel(x, y)
        } else {
            Luma([0])
        }
    })
}

/// Ground-truth distance between two shreds: `0` when `key2` is a recorded
/// neighbor of `key1` in `edges`, else `1`.
///
/// A `key1` absent from `edges` has no neighbors, so the distance is `1`.
/// This is a coarse proxy metric for scoring candidate reconstruction
/// orderings, not a spatial distance.
pub fn real_distance(key1: BasePoint, key2: BasePoint, edges: &Adjacency) -> u32 {
    match edges.get(&key1) {
        Some(neighbors) if neighbors.contains(&key2) => 0,
        _ => 1,
    }
}
