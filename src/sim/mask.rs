//! Occupancy mask for the obstacle
//!
//! A fixed grid of booleans, one per scene pixel. Anything off the grid is
//! empty space, so particles can leave the scene without hitting an invisible
//! wall.

use glam::Vec2;

use crate::error::BitmapError;

/// Immutable point-in-obstacle test
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccupancyMask {
    width: u32,
    height: u32,
    /// Row-major, `width * height` cells
    cells: Vec<bool>,
}

impl OccupancyMask {
    /// Build a mask from row-major cells
    pub fn new(width: u32, height: u32, cells: Vec<bool>) -> Result<Self, BitmapError> {
        let expected = width as usize * height as usize;
        if cells.len() != expected {
            return Err(BitmapError::SizeMismatch {
                expected,
                actual: cells.len(),
            });
        }
        Ok(Self {
            width,
            height,
            cells,
        })
    }

    /// Build a mask by evaluating `f(x, y)` for every cell
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> bool) -> Self {
        let mut cells = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                cells.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            cells,
        }
    }

    /// A mask with no obstacle at all
    pub fn empty(width: u32, height: u32) -> Self {
        Self::from_fn(width, height, |_, _| false)
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Whether the cell at (x, y) is solid. Off-grid cells are never solid.
    #[inline]
    pub fn occupied(&self, x: i32, y: i32) -> bool {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return false;
        }
        self.cells[y as usize * self.width as usize + x as usize]
    }

    /// Whether the cell containing a continuous point is solid
    #[inline]
    pub fn occupied_at(&self, p: Vec2) -> bool {
        if !p.is_finite() {
            return false;
        }
        // Saturating float->int casts keep huge coordinates off-grid
        self.occupied(p.x.floor() as i32, p.y.floor() as i32)
    }

    /// Number of solid cells
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }
}
