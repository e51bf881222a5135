//! Static region index.
//!
//! A [`Quadtree`] is subdivided all the way down to its maximum depth when it
//! is built; nodes never split or merge afterwards. Entries live in the
//! deepest node that fully contains them, so boxes straddling a quadrant
//! boundary stay higher up the tree.
//!
//! ```
//! use ltl_ecs::quadtree::{Quadtree, Region};
//!
//! let mut tree = Quadtree::new(Region::new(0, 0, 100, 100), 4);
//! assert!(tree.add(1, Region::new(10, 10, 30, 30)));
//! assert!(!tree.add(2, Region::new(80, 16, 64, 32)));
//!
//! assert_eq!(tree.query(Region::new(0, 0, 50, 50)), vec![1]);
//! ```

use serde::{Deserialize, Serialize};

use crate::deque::Deque;

// ---------------------------------------------------------------------------
// Region
// ---------------------------------------------------------------------------

/// An integer rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Region {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[inline]
    fn right(&self) -> i64 {
        i64::from(self.x) + i64::from(self.width)
    }

    #[inline]
    fn bottom(&self) -> i64 {
        i64::from(self.y) + i64::from(self.height)
    }

    /// Strict overlap: shared edges do not count.
    pub fn intersects(&self, other: &Region) -> bool {
        i64::from(self.x) < other.right()
            && self.right() > i64::from(other.x)
            && i64::from(self.y) < other.bottom()
            && self.bottom() > i64::from(other.y)
    }

    /// Whether `other` lies entirely inside `self`.
    pub fn contains(&self, other: &Region) -> bool {
        self.x <= other.x
            && self.y <= other.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Top-left, top-right, bottom-left and bottom-right quadrants. Odd sizes
    /// give the extra unit to the right and bottom quadrants.
    fn quadrants(&self) -> [Region; 4] {
        let left_width = self.width / 2;
        let top_height = self.height / 2;
        let right_width = self.width - left_width;
        let bottom_height = self.height - top_height;
        let mid_x = self.x + left_width as i32;
        let mid_y = self.y + top_height as i32;

        [
            Region::new(self.x, self.y, left_width, top_height),
            Region::new(mid_x, self.y, right_width, top_height),
            Region::new(self.x, mid_y, left_width, bottom_height),
            Region::new(mid_x, mid_y, right_width, bottom_height),
        ]
    }
}

// ---------------------------------------------------------------------------
// Quadtree
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
struct Entry {
    id: usize,
    region: Region,
}

/// A fully subdivided quadtree of `(id, region)` entries.
#[derive(Debug, Clone)]
pub struct Quadtree {
    region: Region,
    entries: Deque<Entry>,
    children: Option<Box<[Quadtree; 4]>>,
}

impl Quadtree {
    /// Build a tree over `region` with `max_depth` levels below the root.
    pub fn new(region: Region, max_depth: u8) -> Self {
        let children = (max_depth > 0).then(|| {
            Box::new(
                region
                    .quadrants()
                    .map(|quadrant| Quadtree::new(quadrant, max_depth - 1)),
            )
        });

        Self {
            region,
            entries: Deque::with_capacity(4),
            children,
        }
    }

    #[inline]
    pub fn region(&self) -> Region {
        self.region
    }

    /// Insert `id` at the deepest node fully containing `region`. Returns
    /// `false`, storing nothing, if the tree's region does not contain it.
    pub fn add(&mut self, id: usize, region: Region) -> bool {
        if !self.region.contains(&region) {
            return false;
        }

        if let Some(children) = self.children.as_deref_mut() {
            for child in children.iter_mut() {
                if child.region.contains(&region) {
                    return child.add(id, region);
                }
            }
        }

        self.entries.push_back(Entry { id, region });
        true
    }

    /// Ids of every entry intersecting `region`.
    pub fn query(&self, region: Region) -> Vec<usize> {
        let mut result = Vec::new();
        self.query_into(&region, &mut result);
        result
    }

    fn query_into(&self, region: &Region, result: &mut Vec<usize>) {
        if !self.region.intersects(region) {
            return;
        }

        if region.contains(&self.region) {
            self.collect_all(result);
            return;
        }

        for entry in self.entries.iter() {
            if entry.region.intersects(region) {
                result.push(entry.id);
            }
        }

        if let Some(children) = self.children.as_deref() {
            for child in children {
                child.query_into(region, result);
            }
        }
    }

    fn collect_all(&self, result: &mut Vec<usize>) {
        result.extend(self.entries.iter().map(|entry| entry.id));
        if let Some(children) = self.children.as_deref() {
            for child in children {
                child.collect_all(result);
            }
        }
    }

    /// Total entries stored in the tree.
    pub fn len(&self) -> usize {
        let nested = self
            .children
            .as_deref()
            .map_or(0, |children| children.iter().map(Quadtree::len).sum());
        self.entries.len() + nested
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Empty every bucket. The node structure is kept.
    pub fn clear(&mut self) {
        self.entries.clear();
        if let Some(children) = self.children.as_deref_mut() {
            for child in children.iter_mut() {
                child.clear();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hundred() -> Quadtree {
        Quadtree::new(Region::new(0, 0, 100, 100), 4)
    }

    #[test]
    fn add_requires_full_containment() {
        let mut tree = hundred();
        let added = [
            tree.add(1, Region::new(8, 8, 4, 8)),
            tree.add(1, Region::new(15, 75, 60, 10)),
            tree.add(2, Region::new(80, 16, 64, 32)),
            tree.add(3, Region::new(58008, 1337, 42, 42)),
        ];
        assert_eq!(added, [true, true, false, false]);
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn query_counts_overlapping_entries() {
        let mut tree = hundred();
        tree.add(1, Region::new(10, 10, 30, 30));
        tree.add(2, Region::new(60, 10, 30, 30));
        tree.add(3, Region::new(10, 60, 30, 30));
        tree.add(4, Region::new(5, 5, 80, 30));
        for i in 0..5 {
            tree.add(5 + i, Region::new(80 + i as i32, 80 + i as i32, 1, 1));
        }

        let mut single = tree.query(Region::new(50, 0, 50, 50));
        single.sort_unstable();
        assert_eq!(single, vec![2, 4]);

        let mut multiple = tree.query(Region::new(0, 0, 100, 50));
        multiple.sort_unstable();
        assert_eq!(multiple, vec![1, 2, 4]);

        assert!(tree.query(Region::new(0, 90, 100, 200)).is_empty());
        assert!(tree.query(Region::new(111111, 101110, 500, 500)).is_empty());
    }

    #[test]
    fn clear_keeps_the_tree_usable() {
        let mut tree = hundred();
        let everything = Region::new(-100, -100, 12345, 12345);
        for i in 0..50 {
            tree.add(i, Region::new(i as i32, 0, 16, 16));
        }
        assert_eq!(tree.query(everything).len(), 50);

        tree.clear();
        assert!(tree.query(everything).is_empty());
        assert!(tree.is_empty());

        for i in 0..50 {
            tree.add(100 + i, Region::new(25 + i as i32, 60, 16, 16));
            tree.add(200 + i, Region::new(25 + i as i32, 0, 16, 16));
        }
        assert_eq!(tree.query(Region::new(0, 50, 100, 100)).len(), 50);
    }

    #[test]
    fn straddling_entries_stay_at_the_root() {
        let mut tree = Quadtree::new(Region::new(0, 0, 64, 64), 1);
        tree.add(7, Region::new(30, 30, 4, 4));
        assert_eq!(tree.entries.len(), 1);

        tree.add(8, Region::new(0, 0, 4, 4));
        assert_eq!(tree.entries.len(), 1);
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn odd_sizes_cover_the_parent() {
        let quadrants = Region::new(0, 0, 5, 7).quadrants();
        let area: u32 = quadrants.iter().map(|q| q.width * q.height).sum();
        assert_eq!(area, 35);
        assert_eq!(quadrants[3], Region::new(2, 3, 3, 4));
    }
}
