//! Tile compositing.
//!
//! Places decoded tile rasters into one canvas per map. The manifest's
//! coordinate system has Z along the horizontal image axis and X along the
//! vertical one, with X increasing upward - the canvas is laid out
//! top-left-origin, so X is inverted during placement.

use std::collections::HashMap;

use zorya_common::Raster;

use crate::manifest::Map;
use crate::{Error, Result};

/// Resolver from tile name to a decoded raster.
///
/// Supplied by the file-system glue that located and decoded the texture
/// files; the compositor only ever borrows rasters read-only.
pub trait RasterSource: Sync {
    /// Look up the raster for a tile name.
    fn raster(&self, name: &str) -> Option<&Raster>;
}

impl RasterSource for HashMap<String, Raster> {
    fn raster(&self, name: &str) -> Option<&Raster> {
        self.get(name)
    }
}

/// Compose a map's tiles into a single canvas.
///
/// Tiles are drawn in list order; later tiles paint over earlier ones
/// wherever they overlap. Pixels are copied directly, transparent samples
/// included - there is no blending at tile boundaries.
pub fn compose<S: RasterSource>(map: &Map, source: &S) -> Result<Raster> {
    let tiles = map.tiles();
    if tiles.is_empty() {
        return Err(Error::EmptyMap(map.name().to_string()));
    }

    let mut min_x = i32::MAX;
    let mut min_z = i32::MAX;
    let mut max_x = i32::MIN;
    let mut max_z = i32::MIN;
    for tile in tiles {
        min_x = min_x.min(tile.x);
        min_z = min_z.min(tile.z);
        max_x = max_x.max(tile.x + tile.width);
        max_z = max_z.max(tile.z + tile.height);
    }

    // Axes are transposed: Z spans columns, X spans rows
    let canvas_w = (max_z - min_z).max(0) as u32;
    let canvas_h = (max_x - min_x).max(0) as u32;
    let mut canvas = Raster::new(canvas_w, canvas_h);

    for tile in tiles {
        let raster = source.raster(&tile.name).ok_or_else(|| Error::MissingTexture {
            map: map.name().to_string(),
            tile: tile.name.clone(),
        })?;

        let dest_x = tile.z - min_z;
        // X increases upward in world space; invert for a top-left origin
        let dest_y = canvas_h as i32 - tile.x + min_x - tile.height;
        blit(&mut canvas, raster, dest_x, dest_y);
    }

    Ok(canvas)
}

/// Copy `src` into `canvas` at (dest_x, dest_y), clipped to the canvas.
fn blit(canvas: &mut Raster, src: &Raster, dest_x: i32, dest_y: i32) {
    let canvas_w = canvas.width() as i32;
    let canvas_h = canvas.height() as i32;
    let src_w = src.width() as i32;
    let src_h = src.height() as i32;

    let x0 = dest_x.max(0);
    let x1 = (dest_x + src_w).min(canvas_w);
    if x0 >= x1 {
        return;
    }
    let run = (x1 - x0) as usize;

    for src_y in 0..src_h {
        let canvas_y = dest_y + src_y;
        if canvas_y < 0 || canvas_y >= canvas_h {
            continue;
        }

        let src_start = (src_y * src_w + (x0 - dest_x)) as usize;
        let dst_start = (canvas_y * canvas_w + x0) as usize;
        canvas.pixels_mut()[dst_start..dst_start + run]
            .copy_from_slice(&src.pixels()[src_start..src_start + run]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::Tile;

    fn tile(name: &str, x: i32, z: i32, w: i32, h: i32) -> Tile {
        Tile {
            name: name.to_string(),
            x,
            y: 0,
            z,
            width: w,
            height: h,
        }
    }

    fn solid(width: u32, height: u32, argb: u32) -> Raster {
        let mut raster = Raster::new(width, height);
        for p in raster.pixels_mut() {
            *p = argb;
        }
        raster
    }

    #[test]
    fn test_empty_map_rejected() {
        let map = Map::new("void", vec![]);
        let source: HashMap<String, Raster> = HashMap::new();

        assert!(matches!(
            compose(&map, &source),
            Err(Error::EmptyMap(name)) if name == "void"
        ));
    }

    #[test]
    fn test_missing_texture_rejected() {
        let map = Map::new("m", vec![tile("ghost", 0, 0, 4, 4)]);
        let source: HashMap<String, Raster> = HashMap::new();

        assert!(matches!(
            compose(&map, &source),
            Err(Error::MissingTexture { tile, .. }) if tile == "ghost"
        ));
    }

    #[test]
    fn test_bounding_box_and_placement() {
        let map = Map::new(
            "m",
            vec![tile("a", 0, 0, 10, 10), tile("b", 5, 20, 10, 10)],
        );
        let mut source = HashMap::new();
        source.insert("a".to_string(), solid(10, 10, 0xFF0000AA));
        source.insert("b".to_string(), solid(10, 10, 0xFF0000BB));

        let canvas = compose(&map, &source).unwrap();
        assert_eq!(canvas.width(), 30);
        assert_eq!(canvas.height(), 15);

        // a draws at (0, 5), b at (20, 0)
        assert_eq!(canvas.pixel(0, 5), 0xFF0000AA);
        assert_eq!(canvas.pixel(9, 14), 0xFF0000AA);
        assert_eq!(canvas.pixel(20, 0), 0xFF0000BB);
        assert_eq!(canvas.pixel(29, 9), 0xFF0000BB);

        // untouched corners stay transparent
        assert_eq!(canvas.pixel(0, 0), 0);
        assert_eq!(canvas.pixel(29, 14), 0);
    }

    #[test]
    fn test_last_writer_wins() {
        let map = Map::new(
            "m",
            vec![tile("under", 0, 0, 8, 8), tile("over", 0, 0, 8, 8)],
        );
        let mut source = HashMap::new();
        source.insert("under".to_string(), solid(8, 8, 0xFF111111));
        source.insert("over".to_string(), solid(8, 8, 0xFF222222));

        let canvas = compose(&map, &source).unwrap();
        for &p in canvas.pixels() {
            assert_eq!(p, 0xFF222222);
        }
    }

    #[test]
    fn test_transparent_pixels_copied_verbatim() {
        let map = Map::new(
            "m",
            vec![tile("opaque", 0, 0, 4, 4), tile("clear", 0, 0, 4, 4)],
        );
        let mut source = HashMap::new();
        source.insert("opaque".to_string(), solid(4, 4, 0xFFFFFFFF));
        source.insert("clear".to_string(), solid(4, 4, 0x00000000));

        // No blending: the transparent tile overwrites the opaque one
        let canvas = compose(&map, &source).unwrap();
        assert_eq!(canvas.pixel(2, 2), 0);
    }

    #[test]
    fn test_single_tile_fills_canvas() {
        let map = Map::new("m", vec![tile("t", -3, 7, 6, 6)]);
        let mut source = HashMap::new();
        source.insert("t".to_string(), solid(6, 6, 0xFFABCDEF));

        let canvas = compose(&map, &source).unwrap();
        assert_eq!(canvas.width(), 6);
        assert_eq!(canvas.height(), 6);
        for &p in canvas.pixels() {
            assert_eq!(p, 0xFFABCDEF);
        }
    }
}
