//! This crate simulates cutting a document image into rectangular shreds laid out
//! on a regular offset grid, and builds the ground-truth adjacency graph that a
//! shred-reassembly algorithm can be scored against. It uses the `image` and
//! `imageproc` crates for image manipulation and `petgraph` for the graph.
//!
//! The document convention throughout is white foreground on black background,
//! 8-bit intensity.
//!
//! # Example
//! ```
//! use image::{GrayImage, Luma};
//! use shredsim::{cut_to_shreds, DocSize, Offset, ShredConfig};
//!
//! let mask = GrayImage::from_pixel(100, 100, Luma([255]));
//! let config = ShredConfig::new(mask, Offset::new(0, 110), Offset::new(110, 0));
//!
//! let graph = cut_to_shreds(DocSize::new(220, 220), &config).unwrap();
//! assert_eq!(graph.node_count(), 4);
//! assert_eq!(graph.edge_count(), 4);
//! ```

/// Border-connected component filter for shred images.
pub mod border;
/// Shred content primitives: masking, content density, graph distance.
pub mod content;
/// Debug module for saving a rendering of the shred layout.
pub mod debug;
/// Drawing the shred graph (slices and adjacencies) on an image.
/// Feature-gated under the `drawing` feature.
pub mod drawing;

use std::collections::{HashMap, HashSet, VecDeque};
use std::ops::{Add, Sub};

use image::*;
use imageproc::rect::Rect;
use petgraph::graphmap::UnGraphMap;
use rayon::prelude::*;
use smallvec::SmallVec;
use thiserror::Error;
use tracing::*;

// Fraction of nonzero pixels a shred needs before it is worth feeding to a
// classifier.
const DEFAULT_MIN_CONTENT_RATIO: f32 = 0.05;

#[derive(Error, Debug)]
pub enum ShredError {
    #[error("Invalid shred configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Invalid document dimensions: width={width}, height={height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Foreground mask marks no pixel as outside the document")]
    InvalidMask,

    #[error("Image dimensions {actual:?} do not match {expected:?}")]
    ShapeMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },

    #[error("Failed to convert image: {0}")]
    ImageConversionError(String),
}

/// A 2D integer displacement between the base points of neighboring shreds.
///
/// Coordinates are (row, col) ordered; conversion to the image crate's (x, y)
/// happens only when pixels are touched.
///
/// # Example
/// ```
/// use shredsim::Offset;
///
/// let right = Offset::new(0, 110);
/// assert_eq!(right.row, 0);
/// assert_eq!(right.col, 110);
/// assert_ne!(right, Offset::ZERO);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Offset {
    pub row: i64,
    pub col: i64,
}

impl Offset {
    /// The degenerate displacement that makes no progress across the grid.
    pub const ZERO: Offset = Offset { row: 0, col: 0 };

    pub fn new(row: i64, col: i64) -> Self {
        Self { row, col }
    }
}

/// Top-left anchor of a shred in document space.
///
/// Base points are the node identities of the adjacency graph; two shreds are
/// the same node exactly when their coordinates match.
///
/// # Example
/// ```
/// use shredsim::{BasePoint, Offset};
///
/// let base = BasePoint::ORIGIN + Offset::new(110, 0);
/// assert_eq!(base, BasePoint::new(110, 0));
/// assert_eq!(base - Offset::new(110, 0), BasePoint::ORIGIN);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct BasePoint {
    pub row: i64,
    pub col: i64,
}

impl BasePoint {
    /// Where the cut traversal starts.
    pub const ORIGIN: BasePoint = BasePoint { row: 0, col: 0 };

    pub fn new(row: i64, col: i64) -> Self {
        Self { row, col }
    }
}

impl Add<Offset> for BasePoint {
    type Output = BasePoint;

    fn add(self, offset: Offset) -> BasePoint {
        BasePoint::new(self.row + offset.row, self.col + offset.col)
    }
}

impl Sub<Offset> for BasePoint {
    type Output = BasePoint;

    fn sub(self, offset: Offset) -> BasePoint {
        BasePoint::new(self.row - offset.row, self.col - offset.col)
    }
}

/// Bounding size of the document image, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DocSize {
    pub height: u32,
    pub width: u32,
}

impl DocSize {
    pub fn new(height: u32, width: u32) -> Self {
        Self { height, width }
    }

    /// Whether the slice lies entirely within `[0, size)` in both axes.
    pub fn contains(&self, slice: &Slice) -> bool {
        slice.top >= 0
            && slice.left >= 0
            && slice.top + i64::from(slice.height) <= i64::from(self.height)
            && slice.left + i64::from(slice.width) <= i64::from(self.width)
    }
}

impl From<&GrayImage> for DocSize {
    fn from(img: &GrayImage) -> Self {
        DocSize::new(img.height(), img.width())
    }
}

/// The rectangular extraction window of one shred.
///
/// A slice is pure geometry: it carries no bounds guarantee of its own.
/// [`cut_to_shreds`] only ever emits slices that fit the document, so cropping
/// a graph node's slice out of the document it was cut from cannot go out of
/// range.
///
/// # Example
/// ```
/// use shredsim::{BasePoint, Slice};
///
/// let slice = Slice::anchored(BasePoint::new(110, 0), 100, 100);
/// assert_eq!(slice.top, 110);
/// assert_eq!(slice.left, 0);
/// assert_eq!(slice.height, 100);
/// assert_eq!(slice.width, 100);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Slice {
    pub top: i64,
    pub left: i64,
    pub height: u32,
    pub width: u32,
}

impl Slice {
    /// The window of the given shape whose top-left corner is `base`.
    pub fn anchored(base: BasePoint, height: u32, width: u32) -> Self {
        Self {
            top: base.row,
            left: base.col,
            height,
            width,
        }
    }

    /// Extracts this window from `img` as a fresh image.
    ///
    /// Callers are responsible for validating bounds before extracting from
    /// real image data; slices taken from a [`ShredGraph`] are always valid
    /// for the document they were cut from.
    pub fn crop(&self, img: &GrayImage) -> GrayImage {
        imageops::crop_imm(img, self.left as u32, self.top as u32, self.width, self.height)
            .to_image()
    }
}

impl From<&Slice> for Rect {
    fn from(slice: &Slice) -> Self {
        Rect::at(slice.left as i32, slice.top as i32).of_size(slice.width, slice.height)
    }
}

/// Parameters of a shred cut: the footprint mask and the two lattice offsets.
///
/// The mask's dimensions define the extraction window anchored at each base
/// point; its nonzero pixels define the shred's footprint shape. `right` and
/// `bottom` are the displacements from a shred's base point to its right and
/// bottom neighbors' base points.
///
/// # Example
/// ```
/// use image::{GrayImage, Luma};
/// use shredsim::{Offset, ShredConfig};
///
/// let mask = GrayImage::from_pixel(100, 100, Luma([255]));
/// let config = ShredConfig::new(mask, Offset::new(0, 110), Offset::new(110, 0));
/// assert_eq!(config.mask_shape(), (100, 100));
/// ```
#[derive(Debug, Clone)]
pub struct ShredConfig {
    pub mask: GrayImage,
    pub right: Offset,
    pub bottom: Offset,
}

impl ShredConfig {
    pub fn new(mask: GrayImage, right: Offset, bottom: Offset) -> Self {
        Self {
            mask,
            right,
            bottom,
        }
    }

    /// The mask's (height, width).
    pub fn mask_shape(&self) -> (u32, u32) {
        (self.mask.height(), self.mask.width())
    }

    /// The four lattice neighbor candidates of `base`, in left, right, top,
    /// bottom order. Candidates are not bounds-checked here.
    pub fn neighbor_candidates(&self, base: BasePoint) -> NeighborVec {
        let mut candidates = NeighborVec::new();
        candidates.push(base - self.right);
        candidates.push(base + self.right);
        candidates.push(base - self.bottom);
        candidates.push(base + self.bottom);
        candidates
    }
}

/// A type alias for the fixed-capacity list of a shred's lattice neighbors.
pub type NeighborVec = SmallVec<[BasePoint; 4]>;

/// Configuration for the per-shred content analysis pass.
///
/// # Example
/// ```
/// use shredsim::AnalysisConfig;
///
/// let config = AnalysisConfig::default();
/// assert_eq!(config.min_content_ratio, 0.05);
/// assert_eq!(config.enable_parallel, true);
/// ```
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Fraction of nonzero pixels a masked shred must exceed (default: 0.05)
    pub min_content_ratio: f32,
    /// Enable parallel processing (default: true)
    pub enable_parallel: bool,
}

impl AnalysisConfig {
    /// Creates a new `AnalysisConfig` with the specified parameters.
    ///
    /// # Example
    /// ```
    /// use shredsim::AnalysisConfig;
    ///
    /// let config = AnalysisConfig::new(0.2, false);
    /// assert_eq!(config.min_content_ratio, 0.2);
    /// assert_eq!(config.enable_parallel, false);
    /// ```
    pub fn new(min_content_ratio: f32, enable_parallel: bool) -> Self {
        Self {
            min_content_ratio: min_content_ratio.clamp(0.0, 1.0), // A ratio of pixels
            enable_parallel,
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig::new(DEFAULT_MIN_CONTENT_RATIO, true)
    }
}

/// The undirected adjacency graph of a shred cut.
///
/// Nodes are shred base points; an edge connects two base points whenever one
/// lattice offset separates them and both extraction windows fit the document.
/// Every node carries its extraction [`Slice`] in `slices`.
#[derive(Debug, Clone)]
pub struct ShredGraph {
    pub graph: UnGraphMap<BasePoint, ()>,
    pub slices: HashMap<BasePoint, Slice>,
}

impl ShredGraph {
    /// Returns an iterator over all base points in the graph.
    pub fn nodes(&self) -> impl Iterator<Item = BasePoint> + '_ {
        self.graph.nodes()
    }

    /// Looks up the extraction window of `base`, if it is a node.
    pub fn slice(&self, base: BasePoint) -> Option<Slice> {
        self.slices.get(&base).copied()
    }

    /// Returns an iterator over the recorded neighbors of `base`.
    pub fn neighbors(&self, base: BasePoint) -> impl Iterator<Item = BasePoint> + '_ {
        self.graph.neighbors(base)
    }

    /// Whether `a` and `b` were cut as physical neighbors.
    pub fn contains_edge(&self, a: BasePoint, b: BasePoint) -> bool {
        self.graph.contains_edge(a, b)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Exports the edge set as a map from base point to its neighbor set,
    /// the shape [`content::real_distance`] consumes.
    ///
    /// # Example
    /// ```
    /// use image::{GrayImage, Luma};
    /// use shredsim::{content::real_distance, cut_to_shreds, BasePoint, DocSize, Offset, ShredConfig};
    ///
    /// let mask = GrayImage::from_pixel(100, 100, Luma([255]));
    /// let config = ShredConfig::new(mask, Offset::new(0, 110), Offset::new(110, 0));
    /// let graph = cut_to_shreds(DocSize::new(220, 220), &config).unwrap();
    ///
    /// let edges = graph.adjacency();
    /// assert_eq!(real_distance(BasePoint::ORIGIN, BasePoint::new(0, 110), &edges), 0);
    /// assert_eq!(real_distance(BasePoint::ORIGIN, BasePoint::new(110, 110), &edges), 1);
    /// ```
    pub fn adjacency(&self) -> HashMap<BasePoint, HashSet<BasePoint>> {
        self.graph
            .nodes()
            .map(|node| (node, self.graph.neighbors(node).collect()))
            .collect()
    }

    /// Selects the base points whose masked slice of `doc` holds enough
    /// content to be useful, per the analysis configuration.
    ///
    /// `doc` must be the document the graph was cut from (or one of the same
    /// size). The result is sorted, so the parallel and sequential passes
    /// agree exactly.
    ///
    /// # Example
    /// ```
    /// use image::{GrayImage, Luma};
    /// use shredsim::{cut_to_shreds, AnalysisConfig, DocSize, Offset, ShredConfig};
    ///
    /// let doc = GrayImage::from_pixel(220, 220, Luma([255]));
    /// let mask = GrayImage::from_pixel(100, 100, Luma([255]));
    /// let config = ShredConfig::new(mask, Offset::new(0, 110), Offset::new(110, 0));
    /// let graph = cut_to_shreds(DocSize::from(&doc), &config).unwrap();
    ///
    /// let good = graph.good_nodes(&doc, &config, &AnalysisConfig::default());
    /// assert_eq!(good.len(), 4);
    /// ```
    pub fn good_nodes(
        &self,
        doc: &GrayImage,
        config: &ShredConfig,
        analysis: &AnalysisConfig,
    ) -> Vec<BasePoint> {
        debug!(
            "Scoring {} shreds against ratio {}",
            self.node_count(),
            analysis.min_content_ratio
        );
        let keep = |base: &BasePoint| {
            let Some(slice) = self.slice(*base) else {
                return false;
            };
            let masked = content::masked_shred(&slice.crop(doc), &config.mask);
            content::content_ratio(&masked) > analysis.min_content_ratio
        };

        let nodes: Vec<BasePoint> = self.graph.nodes().collect();
        let mut good: Vec<BasePoint> = if analysis.enable_parallel {
            nodes.par_iter().copied().filter(keep).collect()
        } else {
            nodes.iter().copied().filter(keep).collect()
        };
        good.sort_unstable();
        good
    }
}

/// Cuts a document of the given size into shreds and builds their adjacency
/// graph.
///
/// The traversal starts at [`BasePoint::ORIGIN`] and discovers every base
/// point reachable by in-bounds steps of `config.right` and `config.bottom`.
/// A neighbor candidate whose extraction window leaves the document is skipped
/// silently; a candidate that was already discovered is still edge-connected,
/// which is what closes the lattice's cycles. Traversal order is unspecified
/// and does not affect the resulting graph.
///
/// # Errors
/// [`ShredError::InvalidDimensions`] when `size` has a zero component, and
/// [`ShredError::InvalidConfiguration`] when either offset is zero (the cut
/// would make no progress), the mask is empty, or the mask does not fit the
/// document (no base point would ever be valid).
///
/// # Example
/// ```
/// use image::{GrayImage, Luma};
/// use shredsim::{cut_to_shreds, BasePoint, DocSize, Offset, ShredConfig};
///
/// let mask = GrayImage::from_pixel(100, 100, Luma([255]));
/// let config = ShredConfig::new(mask, Offset::new(0, 110), Offset::new(110, 0));
///
/// let graph = cut_to_shreds(DocSize::new(220, 220), &config).unwrap();
/// assert!(graph.contains_edge(BasePoint::ORIGIN, BasePoint::new(0, 110)));
/// assert!(graph.contains_edge(BasePoint::ORIGIN, BasePoint::new(110, 0)));
/// ```
pub fn cut_to_shreds(size: DocSize, config: &ShredConfig) -> Result<ShredGraph, ShredError> {
    trace!(
        "Cutting {}x{} document, right={:?}, bottom={:?}",
        size.height,
        size.width,
        config.right,
        config.bottom
    );
    if size.width == 0 || size.height == 0 {
        error!(
            "Invalid document dimensions: width={}, height={}",
            size.width, size.height
        );
        return Err(ShredError::InvalidDimensions {
            width: size.width,
            height: size.height,
        });
    }

    let (mask_height, mask_width) = config.mask_shape();
    if config.right == Offset::ZERO || config.bottom == Offset::ZERO {
        return Err(ShredError::InvalidConfiguration(
            "offsets must be nonzero for the cut to make progress".to_string(),
        ));
    }
    if mask_height == 0 || mask_width == 0 {
        return Err(ShredError::InvalidConfiguration(
            "shred mask is empty".to_string(),
        ));
    }
    if mask_height > size.height || mask_width > size.width {
        return Err(ShredError::InvalidConfiguration(format!(
            "shred mask {}x{} does not fit in a {}x{} document",
            mask_height, mask_width, size.height, size.width
        )));
    }

    let mut graph = UnGraphMap::new();
    let mut slices = HashMap::new();

    let mut seen = HashSet::from([BasePoint::ORIGIN]);
    let mut worklist = VecDeque::from([BasePoint::ORIGIN]);

    while let Some(base) = worklist.pop_front() {
        graph.add_node(base);
        slices.insert(base, Slice::anchored(base, mask_height, mask_width));

        for neighbor in config.neighbor_candidates(base) {
            let window = Slice::anchored(neighbor, mask_height, mask_width);
            if !size.contains(&window) {
                continue;
            }

            graph.add_edge(base, neighbor, ());

            if seen.insert(neighbor) {
                worklist.push_back(neighbor);
            }
        }
    }

    debug!(
        "Cut produced {} shreds with {} adjacencies",
        graph.node_count(),
        graph.edge_count()
    );
    Ok(ShredGraph { graph, slices })
}
