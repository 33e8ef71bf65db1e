//! Skyline rectangle packing.
//!
//! The packer tracks the upper envelope of everything placed so far as a list
//! of horizontal levels ("skyline nodes"). Each node covers `[x, x + width)`
//! at height `y`; together the nodes span the full atlas width, left to
//! right, with no gaps or overlaps.
//!
//! A new rectangle is placed bottom-left: every node is tried as the left
//! edge of the rectangle, the rectangle rests on the highest node it spans,
//! and the candidate with the lowest resulting top edge wins. Ties go to the
//! narrower starting node, then to the left-most one. The heuristic is greedy
//! and fully deterministic: the same sequence of requests always produces the
//! same layout.
//!
//! # Example
//!
//! ```
//! use horizon_lattice_fontstash::SkylinePacker;
//!
//! let mut packer = SkylinePacker::new(64, 64);
//! assert_eq!(packer.add_rect(32, 10), Some((0, 0)));
//! assert_eq!(packer.add_rect(32, 20), Some((32, 0)));
//! assert_eq!(packer.add_rect(40, 5), Some((0, 20)));
//! ```

/// One level of the skyline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SkylineNode {
    /// Left edge of the level.
    pub x: u32,
    /// Height of the occupied space below this level.
    pub y: u32,
    /// Width of the level.
    pub width: u32,
}

impl SkylineNode {
    fn right(&self) -> u32 {
        self.x + self.width
    }
}

/// Skyline bin-packer for one rectangular atlas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkylinePacker {
    width: u32,
    height: u32,
    nodes: Vec<SkylineNode>,
}

impl SkylinePacker {
    /// Initial capacity of the node list; it grows on demand.
    const INITIAL_NODES: usize = 256;

    /// Create an empty packer covering `width` x `height` pixels.
    pub fn new(width: u32, height: u32) -> Self {
        let mut nodes = Vec::with_capacity(Self::INITIAL_NODES);
        nodes.push(SkylineNode {
            x: 0,
            y: 0,
            width,
        });
        Self {
            width,
            height,
            nodes,
        }
    }

    /// Atlas width covered by the skyline.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Atlas height available to the skyline.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Current skyline levels, left to right.
    pub fn nodes(&self) -> &[SkylineNode] {
        &self.nodes
    }

    /// Forget all placements.
    pub fn reset(&mut self) {
        self.nodes.clear();
        self.nodes.push(SkylineNode {
            x: 0,
            y: 0,
            width: self.width,
        });
    }

    /// Fraction of the atlas lying below the skyline, in `0.0..=1.0`.
    pub fn usage(&self) -> f32 {
        let total = self.width as f64 * self.height as f64;
        if total == 0.0 {
            return 0.0;
        }
        let used: f64 = self
            .nodes
            .iter()
            .map(|n| n.width as f64 * n.y as f64)
            .sum();
        (used / total) as f32
    }

    /// Find room for a `width` x `height` rectangle.
    ///
    /// Returns the top-left corner of the placed rectangle, or `None` if the
    /// rectangle does not fit. Degenerate (zero-sized) rectangles and
    /// rectangles larger than the atlas are never placed.
    pub fn add_rect(&mut self, width: u32, height: u32) -> Option<(u32, u32)> {
        if width == 0 || height == 0 || width > self.width || height > self.height {
            return None;
        }

        let mut best_top = u32::MAX;
        let mut best_width = u32::MAX;
        let mut best: Option<(u32, u32)> = None;

        for (index, node) in self.nodes.iter().enumerate() {
            let Some(y) = self.rect_fits(index, width, height) else {
                continue;
            };
            let top = y + height;
            if top < best_top || (top == best_top && node.width < best_width) {
                best_top = top;
                best_width = node.width;
                best = Some((node.x, y));
            }
        }

        let (x, y) = best?;
        self.insert_level(x, y, width, height);
        tracing::trace!(
            target: "horizon_lattice_fontstash::atlas",
            x, y, width, height, nodes = self.nodes.len(),
            "placed rect"
        );
        Some((x, y))
    }

    /// Raise the skyline over `[x, x + width)` to `y + height`.
    ///
    /// This integrates a region into the skyline exactly as a placement would,
    /// without checking it against earlier placements. It is used to reserve
    /// space that is already occupied, such as prior content of an existing
    /// texture. Returns `false` if the region is empty or leaves the atlas.
    pub fn add_skyline_level(&mut self, x: u32, y: u32, width: u32, height: u32) -> bool {
        let in_bounds = x
            .checked_add(width)
            .is_some_and(|right| right <= self.width)
            && y.checked_add(height).is_some_and(|top| top <= self.height);
        if width == 0 || height == 0 || !in_bounds {
            return false;
        }

        self.insert_level(x, y, width, height);
        true
    }

    /// Check whether a rectangle whose left edge sits on node `index` fits.
    ///
    /// Returns the y coordinate the rectangle would rest at.
    fn rect_fits(&self, index: usize, width: u32, height: u32) -> Option<u32> {
        let x = self.nodes[index].x;
        if x + width > self.width {
            return None;
        }

        let mut y = 0;
        let mut space_left = width as i64;
        for node in &self.nodes[index..] {
            if space_left <= 0 {
                break;
            }
            y = y.max(node.y);
            if y + height > self.height {
                return None;
            }
            space_left -= node.width as i64;
        }

        // The nodes always span the full width, so the loop can only run out
        // of nodes when `x + width` exceeds it, which is rejected above.
        (space_left <= 0).then_some(y)
    }

    /// Replace the span `[x, x + width)` with a single level at `y + height`.
    fn insert_level(&mut self, x: u32, y: u32, width: u32, height: u32) {
        let right = x + width;
        let level = SkylineNode {
            x,
            y: y + height,
            width,
        };

        let mut nodes = Vec::with_capacity(self.nodes.len() + 2);
        let mut inserted = false;
        for node in &self.nodes {
            if node.right() <= x {
                nodes.push(*node);
                continue;
            }
            if node.x >= right {
                if !inserted {
                    nodes.push(level);
                    inserted = true;
                }
                nodes.push(*node);
                continue;
            }

            // The node overlaps the new level; keep whatever sticks out.
            if node.x < x {
                nodes.push(SkylineNode {
                    x: node.x,
                    y: node.y,
                    width: x - node.x,
                });
            }
            if !inserted {
                nodes.push(level);
                inserted = true;
            }
            if node.right() > right {
                nodes.push(SkylineNode {
                    x: right,
                    y: node.y,
                    width: node.right() - right,
                });
            }
        }
        if !inserted {
            nodes.push(level);
        }

        // Merge neighbours of equal height.
        nodes.dedup_by(|next, prev| {
            if prev.y == next.y {
                prev.width += next.width;
                true
            } else {
                false
            }
        });

        self.nodes = nodes;
    }
}
