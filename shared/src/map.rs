//! In-memory spatial tile index.
//!
//! # Model
//! - A `width x height` rectangle of [`TileColumn`]s anchored at `(0, 0)`.
//! - Columns are stored in a single vector, linearized row-major:
//!   `index = y * width + x`.
//! - Coordinates outside the rectangle have no column; the resolver treats them as
//!   unreachable.
//!
//! The grid is a read-mostly resource. Mutators (item placement, map streaming) must
//! run on the same tick as movement so the resolver never observes a partial update.

use thiserror::Error;

use crate::tile::{LandTile, TileColumn, TileObject, TileSource};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MapError {
    #[error("tile grid dimensions must be non-zero (got {width}x{height})")]
    EmptyGrid { width: u16, height: u16 },
    #[error("tile ({x}, {y}) is outside the {width}x{height} grid")]
    OutOfBounds {
        x: u16,
        y: u16,
        width: u16,
        height: u16,
    },
}

#[derive(Clone, Debug)]
pub struct TileGrid {
    width: u16,
    height: u16,
    columns: Vec<TileColumn>,
}

impl TileGrid {
    /// A grid of flat land at height 0.
    pub fn new(width: u16, height: u16) -> Result<Self, MapError> {
        Self::flat(width, height, 0)
    }

    /// A grid of flat, walkable land at height `z`.
    pub fn flat(width: u16, height: u16, z: i32) -> Result<Self, MapError> {
        if width == 0 || height == 0 {
            return Err(MapError::EmptyGrid { width, height });
        }
        let len = width as usize * height as usize;
        Ok(Self {
            width,
            height,
            columns: vec![TileColumn::new(LandTile::flat(z)); len],
        })
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    #[inline]
    pub fn contains(&self, x: u16, y: u16) -> bool {
        x < self.width && y < self.height
    }

    #[inline]
    fn index(&self, x: u16, y: u16) -> Option<usize> {
        self.contains(x, y)
            .then(|| y as usize * self.width as usize + x as usize)
    }

    fn checked_index(&self, x: u16, y: u16) -> Result<usize, MapError> {
        self.index(x, y).ok_or(MapError::OutOfBounds {
            x,
            y,
            width: self.width,
            height: self.height,
        })
    }

    pub fn column_mut(&mut self, x: u16, y: u16) -> Result<&mut TileColumn, MapError> {
        let i = self.checked_index(x, y)?;
        Ok(&mut self.columns[i])
    }

    pub fn set_land(&mut self, x: u16, y: u16, land: LandTile) -> Result<(), MapError> {
        self.column_mut(x, y)?.land = land;
        Ok(())
    }

    pub fn push_object(&mut self, x: u16, y: u16, object: TileObject) -> Result<(), MapError> {
        self.column_mut(x, y)?.objects.push(object);
        Ok(())
    }

    pub fn clear_objects(&mut self, x: u16, y: u16) -> Result<(), MapError> {
        self.column_mut(x, y)?.objects.clear();
        Ok(())
    }

    /// Iterate every column with its coordinate, row by row.
    pub fn iter(&self) -> impl Iterator<Item = ((u16, u16), &TileColumn)> {
        let width = self.width as usize;
        self.columns.iter().enumerate().map(move |(i, column)| {
            (((i % width) as u16, (i / width) as u16), column)
        })
    }
}

impl TileSource for TileGrid {
    fn tile(&self, x: u16, y: u16) -> Option<&TileColumn> {
        self.index(x, y).map(|i| &self.columns[i])
    }
}
