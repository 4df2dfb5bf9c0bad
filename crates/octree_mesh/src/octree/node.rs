//! OctreeNode - immutable value type representing a cell in the tree.
//!
//! Nodes are identified by their grid coordinates at their own level.
//! Higher levels are finer; `max_level` is a single base cell.

/// Octree node - immutable value type.
///
/// Grid coordinates are at the node's own level, not the finest level.
/// This keeps parent/child calculations to a shift.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct OctreeNode {
  /// Grid X position at this node's level
  pub x: i32,
  /// Grid Y position at this node's level
  pub y: i32,
  /// Grid Z position at this node's level (bottom-up)
  pub z: i32,
  /// Tree level (0 = coarsest, higher = finer)
  pub level: u32,
}

impl OctreeNode {
  /// Create a new node at the given position and level.
  pub fn new(x: i32, y: i32, z: i32, level: u32) -> Self {
    Self { x, y, z, level }
  }

  /// Get child node (finer detail: level + 1).
  ///
  /// Octant: 0-7 where bits represent +X, +Y, +Z offsets:
  /// - bit 0: X offset (0 or 1)
  /// - bit 1: Y offset (0 or 1)
  /// - bit 2: Z offset (0 or 1)
  ///
  /// Returns None if already at `max_level` (cannot subdivide further).
  pub fn get_child(&self, octant: u8, max_level: u32) -> Option<Self> {
    if self.level >= max_level {
      return None;
    }
    let cx = (octant & 1) as i32;
    let cy = ((octant >> 1) & 1) as i32;
    let cz = ((octant >> 2) & 1) as i32;
    Some(Self {
      x: self.x * 2 + cx,
      y: self.y * 2 + cy,
      z: self.z * 2 + cz,
      level: self.level + 1,
    })
  }

  /// Get parent node (coarser: level - 1).
  ///
  /// Returns None if already at `root_level` (cannot go coarser).
  pub fn get_parent(&self, root_level: u32) -> Option<Self> {
    if self.level <= root_level {
      return None;
    }
    Some(Self {
      x: self.x.div_euclid(2),
      y: self.y.div_euclid(2),
      z: self.z.div_euclid(2),
      level: self.level - 1,
    })
  }

  /// Ancestor of this node at a coarser `level`.
  ///
  /// Also accepts out-of-grid (negative) coordinates so neighbour probes can
  /// be lifted before bounds checking.
  pub fn ancestor_at(&self, level: u32) -> Self {
    debug_assert!(level <= self.level);
    let scale = 1i32 << (self.level - level);
    Self {
      x: self.x.div_euclid(scale),
      y: self.y.div_euclid(scale),
      z: self.z.div_euclid(scale),
      level,
    }
  }

  /// Node at the same level shifted by a grid offset.
  #[inline]
  pub fn offset(&self, dx: i32, dy: i32, dz: i32) -> Self {
    Self {
      x: self.x + dx,
      y: self.y + dy,
      z: self.z + dz,
      level: self.level,
    }
  }

  /// Interleaved-bit (Morton / Z-order) key of the node's minimum corner in
  /// base-cell units.
  ///
  /// Leaves never overlap, so the key is unique among leaves of one tree.
  pub fn morton_key(&self, max_level: u32) -> u64 {
    let shift = max_level - self.level;
    let x = (self.x as u64) << shift;
    let y = (self.y as u64) << shift;
    let z = (self.z as u64) << shift;
    spread_bits(x) | (spread_bits(y) << 1) | (spread_bits(z) << 2)
  }
}

/// Spread the low 21 bits of `v` so that two zero bits separate each one.
fn spread_bits(v: u64) -> u64 {
  let mut v = v & 0x1f_ffff;
  v = (v | (v << 32)) & 0x1f00000000ffff;
  v = (v | (v << 16)) & 0x1f0000ff0000ff;
  v = (v | (v << 8)) & 0x100f00f00f00f00f;
  v = (v | (v << 4)) & 0x10c30c30c30c30c3;
  v = (v | (v << 2)) & 0x1249249249249249;
  v
}

#[cfg(test)]
#[path = "node_test.rs"]
mod node_test;
