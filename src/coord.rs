//! Mapping between continuous world space and the integer chunk grid.

use std::iter::FusedIterator;

use glam::DVec3;


/// Calculate the chunk coordinate containing the given world position, for the given
/// chunk size. Only the horizontal X and Z components are relevant. Positions exactly
/// on a chunk boundary belong to the chunk whose origin is at the position.
#[inline]
pub fn calc_chunk_pos(pos: DVec3, size: f64) -> (i32, i32) {
    ((pos.x / size).floor() as i32, (pos.z / size).floor() as i32)
}

/// Calculate the world-space origin (lower corner) of the given chunk.
#[inline]
pub fn chunk_origin(ix: i32, iz: i32, size: f64) -> DVec3 {
    DVec3::new(ix as f64 * size, 0.0, iz as f64 * size)
}


/// A square (Chebyshev) neighborhood of chunk coordinates around a center chunk,
/// inclusive of the boundary, containing exactly `(2 * radius + 1)²` coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkArea {
    cx: i32,
    cz: i32,
    radius: i32,
}

impl ChunkArea {

    #[inline]
    pub fn new(cx: i32, cz: i32, radius: u32) -> Self {
        Self { cx, cz, radius: radius as i32 }
    }

    /// Return true if the given chunk coordinate lies within this area.
    #[inline]
    pub fn contains(self, ix: i32, iz: i32) -> bool {
        (ix - self.cx).abs() <= self.radius && (iz - self.cz).abs() <= self.radius
    }

    /// Number of chunk coordinates in this area.
    #[inline]
    pub fn count(self) -> usize {
        let side = self.radius as usize * 2 + 1;
        side * side
    }

}

impl IntoIterator for ChunkArea {

    type Item = (i32, i32);
    type IntoIter = ChunkAreaIter;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        ChunkAreaIter {
            area: self,
            dx: -self.radius,
            dz: -self.radius,
        }
    }

}

/// Iterator over all chunk coordinates of a [`ChunkArea`], in row order.
#[derive(Debug, Clone)]
pub struct ChunkAreaIter {
    area: ChunkArea,
    dx: i32,
    dz: i32,
}

impl FusedIterator for ChunkAreaIter {}
impl Iterator for ChunkAreaIter {

    type Item = (i32, i32);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {

        if self.dz > self.area.radius {
            return None;
        }

        let ret = (self.area.cx + self.dx, self.area.cz + self.dz);

        self.dx += 1;
        if self.dx > self.area.radius {
            self.dx = -self.area.radius;
            self.dz += 1;
        }

        Some(ret)

    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.dz > self.area.radius {
            return (0, Some(0));
        }
        let side = self.area.radius as usize * 2 + 1;
        let remaining = (self.area.radius - self.dz) as usize * side
            + (self.area.radius - self.dx) as usize + 1;
        (remaining, Some(remaining))
    }

}


#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn chunk_pos_boundary() {
        assert_eq!(calc_chunk_pos(DVec3::new(49.999, 0.0, 0.0), 50.0), (0, 0));
        assert_eq!(calc_chunk_pos(DVec3::new(50.0, 0.0, 0.0), 50.0), (1, 0));
        assert_eq!(calc_chunk_pos(DVec3::new(-0.001, 0.0, -50.0), 50.0), (-1, -1));
        assert_eq!(calc_chunk_pos(DVec3::new(0.0, 123.0, 0.0), 50.0), (0, 0));
    }

    #[test]
    fn origin_roundtrip() {
        let origin = chunk_origin(-2, 3, 200.0);
        assert_eq!(origin, DVec3::new(-400.0, 0.0, 600.0));
        assert_eq!(calc_chunk_pos(origin, 200.0), (-2, 3));
    }

    #[test]
    fn area_square() {
        let area = ChunkArea::new(0, 0, 2);
        let coords: Vec<_> = area.into_iter().collect();
        assert_eq!(coords.len(), 25);
        assert_eq!(area.count(), 25);
        assert!(coords.contains(&(2, 2)));
        assert!(coords.contains(&(-2, -2)));
        assert!(!coords.contains(&(3, 0)));
        assert!(area.contains(2, 2));
        assert!(area.contains(-2, -2));
        assert!(!area.contains(3, 0));
    }

    #[test]
    fn area_offset_center() {
        let area = ChunkArea::new(10, -5, 1);
        let coords: Vec<_> = area.into_iter().collect();
        assert_eq!(coords.len(), 9);
        assert_eq!(coords[0], (9, -6));
        assert_eq!(coords[8], (11, -4));
        assert_eq!(area.into_iter().size_hint(), (9, Some(9)));
    }

}
