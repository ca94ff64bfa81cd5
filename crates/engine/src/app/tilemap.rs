use thiserror::Error;

use super::geometry::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tile(pub u16);

/// Read-only collision layer consumed by movement validation.
///
/// `tile` returns `None` for an empty (passable) cell. Coordinates are tile
/// indices and may be negative or past the map edge; implementors return
/// `None` there and callers go through [`TileCollision::is_passable`], which
/// fails closed.
pub trait TileCollision {
    fn tile(&self, x: i32, y: i32) -> Option<Tile>;
    fn width_tiles(&self) -> u32;
    fn height_tiles(&self) -> u32;
    fn tile_size(&self) -> f32;

    fn world_size_px(&self) -> Vec2 {
        Vec2::new(
            self.width_tiles() as f32 * self.tile_size(),
            self.height_tiles() as f32 * self.tile_size(),
        )
    }

    fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width_tiles() && (y as u32) < self.height_tiles()
    }

    fn is_passable(&self, x: i32, y: i32) -> bool {
        self.in_bounds(x, y) && self.tile(x, y).is_none()
    }

    fn tile_coord(&self, pixel: f32) -> i32 {
        (pixel / self.tile_size()).floor() as i32
    }
}

/// Row-major collision grid. Tile id `0` is empty.
#[derive(Debug, Clone, PartialEq)]
pub struct Tilemap {
    width: u32,
    height: u32,
    tile_size: f32,
    tiles: Vec<u16>,
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum TilemapError {
    #[error("tile count mismatch: expected {expected}, got {actual}")]
    TileCountMismatch { expected: usize, actual: usize },
    #[error("tile size must be positive and finite, got {tile_size}")]
    InvalidTileSize { tile_size: f32 },
}

impl Tilemap {
    pub fn new(
        width: u32,
        height: u32,
        tile_size: f32,
        tiles: Vec<u16>,
    ) -> Result<Self, TilemapError> {
        if !tile_size.is_finite() || tile_size <= 0.0 {
            return Err(TilemapError::InvalidTileSize { tile_size });
        }
        let expected = width as usize * height as usize;
        let actual = tiles.len();
        if expected != actual {
            return Err(TilemapError::TileCountMismatch { expected, actual });
        }
        Ok(Self {
            width,
            height,
            tile_size,
            tiles,
        })
    }

    pub fn empty(width: u32, height: u32, tile_size: f32) -> Result<Self, TilemapError> {
        Self::new(
            width,
            height,
            tile_size,
            vec![0; width as usize * height as usize],
        )
    }

    /// Map with a solid one-tile border around an empty interior.
    pub fn walled(width: u32, height: u32, tile_size: f32) -> Result<Self, TilemapError> {
        let mut tiles = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                let edge = x == 0 || y == 0 || x + 1 == width || y + 1 == height;
                tiles.push(u16::from(edge));
            }
        }
        Self::new(width, height, tile_size, tiles)
    }

    pub fn index_of(&self, x: u32, y: u32) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    pub fn set_tile(&mut self, x: u32, y: u32, id: u16) -> bool {
        match self.index_of(x, y) {
            Some(index) => {
                self.tiles[index] = id;
                true
            }
            None => false,
        }
    }
}

impl TileCollision for Tilemap {
    fn tile(&self, x: i32, y: i32) -> Option<Tile> {
        if x < 0 || y < 0 {
            return None;
        }
        self.index_of(x as u32, y as u32)
            .and_then(|index| self.tiles.get(index).copied())
            .filter(|id| *id != 0)
            .map(Tile)
    }

    fn width_tiles(&self) -> u32 {
        self.width
    }

    fn height_tiles(&self) -> u32 {
        self.height
    }

    fn tile_size(&self) -> f32 {
        self.tile_size
    }
}
