use drawing::*;
use image::DynamicImage;

use super::*;
/// Saves the image with the shred graph drawn on it.
///
/// Outlines every shred's extraction window and draws the adjacency edges,
/// then saves the result to the specified path. With the `drawing` feature
/// disabled, the image is saved untouched.
///
/// # Errors
/// Returns [`ShredError`] if drawing or saving fails.
///
/// # Examples
///
/// ```rust
/// use image::{DynamicImage, GrayImage, Luma};
/// use shredsim::{cut_to_shreds, debug, drawing::GraphDrawingConfig, DocSize, Offset, ShredConfig};
///
/// let doc = GrayImage::new(220, 220);
/// let mask = GrayImage::from_pixel(100, 100, Luma([255]));
/// let config = ShredConfig::new(mask, Offset::new(0, 110), Offset::new(110, 0));
/// let graph = cut_to_shreds(DocSize::from(&doc), &config).unwrap();
///
/// let path = std::env::temp_dir().join("shreds_doc_example.png");
/// debug::save_image_with_graph(
///     &DynamicImage::ImageLuma8(doc),
///     &graph,
///     path.to_str().unwrap(),
///     &GraphDrawingConfig::default(),
/// )
/// .unwrap();
/// # std::fs::remove_file(path).unwrap();
/// ```
pub fn save_image_with_graph(
    image: &DynamicImage,
    graph: &ShredGraph,
    output_path: &str,
    config: &GraphDrawingConfig,
) -> Result<(), ShredError> {
    let mut rgba_img = image.to_rgba8();
    #[cfg(feature = "drawing")]
    graph.draw(&mut rgba_img, config)?;
    rgba_img
        .save(output_path)
        .map_err(|e| ShredError::ImageConversionError(e.to_string()))
}
