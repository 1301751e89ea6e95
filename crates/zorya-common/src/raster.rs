//! Raster pixel buffers.

/// A flat, width x height buffer of 32-bit ARGB samples.
///
/// Samples are packed `0xAARRGGBB`. Row stride is always a whole pixel
/// count - row `y` starts at index `y * width`. A `Raster` exclusively owns
/// its pixel buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
}

impl Raster {
    /// Create a zeroed (fully transparent black) raster.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize],
        }
    }

    /// Create a raster from an existing pixel buffer.
    ///
    /// # Panics
    ///
    /// Panics if `pixels.len() != width * height`.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<u32>) -> Self {
        assert_eq!(pixels.len(), width as usize * height as usize);
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Raster width in pixels.
    #[inline]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Raster height in pixels.
    #[inline]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Borrow the pixel buffer, row-major.
    #[inline]
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    /// Mutably borrow the pixel buffer.
    #[inline]
    pub fn pixels_mut(&mut self) -> &mut [u32] {
        &mut self.pixels
    }

    /// Get the sample at (x, y).
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> u32 {
        self.pixels[y as usize * self.width as usize + x as usize]
    }

    /// Set the sample at (x, y).
    #[inline]
    pub fn set_pixel(&mut self, x: u32, y: u32, argb: u32) {
        self.pixels[y as usize * self.width as usize + x as usize] = argb;
    }

    /// Pack four channels into an ARGB sample.
    #[inline]
    pub const fn pack(a: u8, r: u8, g: u8, b: u8) -> u32 {
        ((a as u32) << 24) | ((r as u32) << 16) | ((g as u32) << 8) | (b as u32)
    }

    /// Unpack an ARGB sample into (a, r, g, b) channels.
    #[inline]
    pub const fn unpack(argb: u32) -> (u8, u8, u8, u8) {
        (
            (argb >> 24) as u8,
            (argb >> 16) as u8,
            (argb >> 8) as u8,
            argb as u8,
        )
    }

    /// Check whether any sample has an alpha channel below fully opaque.
    pub fn has_translucency(&self) -> bool {
        self.pixels.iter().any(|&p| (p >> 24) != 0xFF)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_unpack() {
        let argb = Raster::pack(0x12, 0x34, 0x56, 0x78);
        assert_eq!(argb, 0x12345678);
        assert_eq!(Raster::unpack(argb), (0x12, 0x34, 0x56, 0x78));
    }

    #[test]
    fn test_from_pixels() {
        let raster = Raster::from_pixels(2, 2, vec![1, 2, 3, 4]);
        assert_eq!(raster.pixel(1, 0), 2);
        assert_eq!(raster.pixel(0, 1), 3);
    }

    #[test]
    #[should_panic]
    fn test_from_pixels_length_mismatch() {
        Raster::from_pixels(2, 2, vec![1, 2, 3]);
    }

    #[test]
    fn test_pixel_indexing() {
        let mut raster = Raster::new(4, 2);
        raster.set_pixel(3, 1, 0xFF00FF00);

        assert_eq!(raster.pixel(3, 1), 0xFF00FF00);
        assert_eq!(raster.pixels()[7], 0xFF00FF00);
        assert_eq!(raster.pixel(0, 0), 0);
    }

    #[test]
    fn test_translucency() {
        let mut raster = Raster::new(2, 2);
        for p in raster.pixels_mut() {
            *p = 0xFF000000;
        }
        assert!(!raster.has_translucency());

        raster.set_pixel(1, 1, 0x80000000);
        assert!(raster.has_translucency());
    }
}
