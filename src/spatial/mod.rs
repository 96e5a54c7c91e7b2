//! Uniform grid for neighbour candidate lookup.
//!
//! With the cell size at least the query radius, the 3x3 block around a
//! point holds every index within that radius.

use std::collections::HashMap;

use crate::types::Vec2;

#[derive(Debug)]
pub struct SpatialHash {
    cell_size: f32,
    cells: HashMap<(i32, i32), Vec<usize>>,
}

impl SpatialHash {
    pub fn new(cell_size: f32) -> Self {
        assert!(
            cell_size.is_finite() && cell_size > 0.0,
            "cell_size must be positive and finite"
        );
        Self {
            cell_size,
            cells: HashMap::new(),
        }
    }

    pub fn build(cell_size: f32, positions: &[Vec2]) -> Self {
        let mut hash = Self::new(cell_size);
        hash.rebuild(positions);
        hash
    }

    pub fn rebuild(&mut self, positions: &[Vec2]) {
        self.cells.clear();
        for (idx, pos) in positions.iter().enumerate() {
            let key = self.cell_key(*pos);
            self.cells.entry(key).or_default().push(idx);
        }
    }

    /// Indices in the 3x3 block of cells around `pos`, including any index at `pos` itself.
    pub fn query_block(&self, pos: Vec2, out: &mut Vec<usize>) {
        out.clear();
        let (cx, cy) = self.cell_key(pos);
        for dy in -1..=1 {
            for dx in -1..=1 {
                if let Some(indices) = self.cells.get(&(cx + dx, cy + dy)) {
                    out.extend_from_slice(indices);
                }
            }
        }
    }

    /// Every other index within `radius` of `positions[i]`, nearest first.
    ///
    /// `radius` must not exceed the cell size.
    pub fn within(&self, positions: &[Vec2], i: usize, radius: f32, out: &mut Vec<(usize, f32)>) {
        debug_assert!(radius <= self.cell_size, "radius exceeds cell size");
        out.clear();
        let origin = positions[i];
        let (cx, cy) = self.cell_key(origin);
        for dy in -1..=1 {
            for dx in -1..=1 {
                let Some(indices) = self.cells.get(&(cx + dx, cy + dy)) else {
                    continue;
                };
                for &j in indices {
                    if j == i {
                        continue;
                    }
                    let dist = origin.distance(positions[j]);
                    if dist < radius {
                        out.push((j, dist));
                    }
                }
            }
        }
        // Ties broken by index so the order does not depend on hash iteration.
        out.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
    }

    fn cell_key(&self, pos: Vec2) -> (i32, i32) {
        let cx = (pos.x / self.cell_size).floor() as i32;
        let cy = (pos.y / self.cell_size).floor() as i32;
        (cx, cy)
    }
}
