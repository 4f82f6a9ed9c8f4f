//! This module provides functionality for drawing a shred graph on an image:
//! every node's extraction window is outlined and every adjacency is drawn as
//! a segment between window centers.
//! It is feature-gated under the `drawing` feature and requires the `image`
//! and `imageproc` crates.
//!
//! # Examples
//!
//! ```rust
//! use image::{GrayImage, Luma, RgbaImage};
//! use shredsim::{cut_to_shreds, drawing::*, DocSize, Offset, ShredConfig};
//!
//! let mask = GrayImage::from_pixel(100, 100, Luma([255]));
//! let config = ShredConfig::new(mask, Offset::new(0, 110), Offset::new(110, 0));
//! let graph = cut_to_shreds(DocSize::new(220, 220), &config).unwrap();
//!
//! let mut canvas = RgbaImage::new(220, 220);
//! graph.draw(&mut canvas, &GraphDrawingConfig::default()).unwrap();
//! ```

use std::fmt;

use crate::{ShredError, ShredGraph, Slice};
use image::*;
use imageproc::drawing::{draw_hollow_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;

/// Configuration for drawing shred slices and adjacency edges.
///
/// Users can specify a uniform slice color or provide a custom color provider
/// keyed by the node's index in sorted base-point order.
pub struct GraphDrawingConfig {
    /// Color for slice outlines.
    pub slice_color: Rgba<u8>,
    /// Color for adjacency edges.
    pub edge_color: Rgba<u8>,
    /// Optional function to provide custom slice colors based on node index.
    pub slice_color_provider: Option<Box<dyn Fn(usize) -> Rgba<u8>>>,
    /// Thickness of slice outlines.
    pub line_thickness: u32,
}
// Manually implement Debug for GraphDrawingConfig
impl fmt::Debug for GraphDrawingConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphDrawingConfig")
            .field("slice_color", &self.slice_color)
            .field("edge_color", &self.edge_color)
            .field("slice_color_provider", &"<function>")
            .field("line_thickness", &self.line_thickness)
            .finish()
    }
}
impl Default for GraphDrawingConfig {
    fn default() -> Self {
        GraphDrawingConfig {
            slice_color: Rgba([0, 200, 0, 255]),  // Green
            edge_color: Rgba([255, 0, 0, 255]),   // Red
            slice_color_provider: None,
            line_thickness: 2,
        }
    }
}

/// Trait for types that can be drawn on an image.
pub trait Drawable {
    /// Draws the object on the provided image using the given configuration.
    ///
    /// # Errors
    /// Returns [`ShredError`] if drawing fails.
    fn draw(&self, image: &mut RgbaImage, config: &GraphDrawingConfig) -> Result<(), ShredError>;
}

impl Drawable for Slice {
    fn draw(&self, image: &mut RgbaImage, config: &GraphDrawingConfig) -> Result<(), ShredError> {
        let rect = Rect::from(self);

        // Shrink the outline inward to fake thickness.
        for inset in 0..config.line_thickness as i32 {
            let width = rect.width() as i32 - 2 * inset;
            let height = rect.height() as i32 - 2 * inset;
            if width <= 0 || height <= 0 {
                break;
            }
            let inner = Rect::at(rect.left() + inset, rect.top() + inset)
                .of_size(width as u32, height as u32);
            draw_hollow_rect_mut(image, inner, config.slice_color);
        }

        Ok(())
    }
}

impl Drawable for ShredGraph {
    fn draw(&self, image: &mut RgbaImage, config: &GraphDrawingConfig) -> Result<(), ShredError> {
        // Draw adjacency edges first so outlines stay visible on top.
        for (a, b, _) in self.graph.all_edges() {
            let (Some(from), Some(to)) = (self.slice(a), self.slice(b)) else {
                continue;
            };
            draw_line_segment_mut(image, center(&from), center(&to), config.edge_color);
        }

        let mut nodes: Vec<_> = self.nodes().collect();
        nodes.sort_unstable();
        for (index, base) in nodes.into_iter().enumerate() {
            let Some(slice) = self.slice(base) else {
                continue;
            };
            let color = if let Some(ref provider) = config.slice_color_provider {
                provider(index)
            } else {
                config.slice_color
            };
            let node_config = GraphDrawingConfig {
                slice_color: color,
                edge_color: config.edge_color,
                slice_color_provider: None,
                line_thickness: config.line_thickness,
            };
            slice.draw(image, &node_config)?;
        }

        Ok(())
    }
}

fn center(slice: &Slice) -> (f32, f32) {
    (
        slice.left as f32 + slice.width as f32 / 2.0,
        slice.top as f32 + slice.height as f32 / 2.0,
    )
}
