//! DDS payload decompression.
//!
//! Every mode decodes into 32-bit ARGB rasters. Expected payload sizes are
//! computed up front; a stream that runs dry after the base level yields a
//! shortened mip chain rather than an error (a partial texture beats total
//! failure), while a dry base level is fatal.

use zorya_common::{BinaryReader, Raster};

use crate::header::{parse_header, CompressionMode, DdsHeader, HEADER_SIZE};
use crate::{Error, Result};

/// Completeness of a decoded mip chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MipChain {
    /// Every level named by the header was decoded.
    Complete,
    /// The stream ran out early; only `decoded` of `expected` levels exist.
    Truncated { decoded: usize, expected: usize },
}

/// A decoded DDS texture.
///
/// Level 0 is the base image and always present; later levels may be missing
/// when the source stream was truncated (see [`MipChain`]).
#[derive(Debug, Clone)]
pub struct DecodedImage {
    /// The parsed container header.
    pub header: DdsHeader,
    /// Compression mode of the payload, fixed at decode time.
    pub mode: CompressionMode,
    /// Mip levels, base first, each owning its pixel buffer.
    pub levels: Vec<Raster>,
    /// Whether the chain was cut short by a truncated stream.
    pub chain: MipChain,
}

impl DecodedImage {
    /// The base (level 0) raster.
    pub fn base(&self) -> &Raster {
        &self.levels[0]
    }
}

/// Decode a complete DDS byte stream into rasters.
pub fn decode(data: &[u8]) -> Result<DecodedImage> {
    let (header, classified) = parse_header(data)?;

    // The V8U8 mask signature overrides the generic 16-bit classification
    let mode = if header.pixel_format.is_v8u8() {
        CompressionMode::V8U8
    } else {
        classified
    };

    let width = header.width;
    let height = header.height;
    if width == 0 || height == 0 {
        // A zero-dimension base level would leave the image without its
        // mandatory level 0
        return Err(Error::InvalidHeader(format!(
            "zero-dimension image: {}x{}",
            width, height
        )));
    }

    let base_size = base_level_size(mode, width, height)
        .ok_or(Error::UnsupportedFourCc(header.pixel_format.four_cc))?;

    let expected = header.mip_count() as usize;
    let mut reader = BinaryReader::new(&data[HEADER_SIZE.min(data.len())..]);
    let mut levels = Vec::with_capacity(expected);
    let mut chain = MipChain::Complete;

    for level in 0..expected {
        let w = width >> level;
        let h = height >> level;
        if w == 0 || h == 0 {
            break;
        }

        // Area quarters per level
        let size = base_size >> (2 * level);
        let result = reader
            .read_bytes(size)
            .map_err(Error::from)
            .and_then(|bytes| decode_level(mode, header.pixel_format.four_cc, bytes, w, h));

        match result {
            Ok(raster) => levels.push(raster),
            Err(err) if level == 0 => {
                // A texture with no valid base image is unusable
                return Err(match err {
                    e @ (Error::UnsupportedFourCc(_) | Error::UnsupportedBitCount(_)) => e,
                    e => Error::CorruptData(format!("base mip level unreadable: {}", e)),
                });
            }
            Err(_) => {
                chain = MipChain::Truncated {
                    decoded: levels.len(),
                    expected,
                };
                break;
            }
        }
    }

    Ok(DecodedImage {
        header,
        mode,
        levels,
        chain,
    })
}

/// Byte size of the base mip level for a given mode and dimensions.
fn base_level_size(mode: CompressionMode, width: u32, height: u32) -> Option<usize> {
    if let Some(block_size) = mode.block_size() {
        let blocks_x = width.div_ceil(4) as usize;
        let blocks_y = height.div_ceil(4) as usize;
        Some(blocks_x * blocks_y * block_size)
    } else {
        let bytes_pp = mode.bits_per_pixel()?.div_ceil(8) as usize;
        Some(width as usize * height as usize * bytes_pp)
    }
}

/// Decode one mip level's payload.
fn decode_level(
    mode: CompressionMode,
    four_cc: crate::header::FourCC,
    data: &[u8],
    width: u32,
    height: u32,
) -> Result<Raster> {
    match mode {
        CompressionMode::Dxt1 => decode_dxt1(data, width, height),
        CompressionMode::Dxt2 | CompressionMode::Dxt3 => decode_dxt3(data, width, height),
        CompressionMode::Dxt4 | CompressionMode::Dxt5 => decode_dxt5(data, width, height),
        CompressionMode::V8U8 => decode_v8u8(data, width, height),
        CompressionMode::A1R5G5B5 => decode_a1r5g5b5(data, width, height),
        CompressionMode::R5G6B5 => decode_r5g6b5(data, width, height),
        CompressionMode::Rgb24 => decode_rgb24(data, width, height),
        CompressionMode::Rgb32 => decode_rgb32(data, width, height),
        CompressionMode::Unknown | CompressionMode::Dx10 => Err(Error::UnsupportedFourCc(four_cc)),
    }
}

/// Up-sample a 5-bit channel to 8 bits.
#[inline]
const fn upsample5(v: u16) -> u8 {
    ((v << 3) + (v >> 2)) as u8
}

/// Up-sample a 6-bit channel to 8 bits.
#[inline]
const fn upsample6(v: u16) -> u8 {
    ((v << 2) + (v >> 4)) as u8
}

/// Expand a packed 5:6:5 color to 8-bit (r, g, b).
#[inline]
fn expand565(c: u16) -> (u8, u8, u8) {
    (
        upsample5((c >> 11) & 0x1F),
        upsample6((c >> 5) & 0x3F),
        upsample5(c & 0x1F),
    )
}

/// Two-thirds/one-third blend with the legacy /9 rounding.
#[inline]
fn mix9(near: u8, far: u8) -> u8 {
    ((6 * near as u16 + 3 * far as u16) / 9) as u8
}

/// Two-thirds/one-third blend with /3 rounding (DXT4/5 color portion).
#[inline]
fn mix3(near: u8, far: u8) -> u8 {
    ((2 * near as u16 + far as u16) / 3) as u8
}

/// Write one block's pixels from a 2-bit-per-pixel index field.
fn write_color_block(
    raster: &mut Raster,
    block_x: u32,
    block_y: u32,
    indices: u32,
    palette: &[u32; 4],
) {
    for i in 0..16 {
        let px = block_x * 4 + (i % 4);
        let py = block_y * 4 + (i / 4);
        if px < raster.width() && py < raster.height() {
            let idx = ((indices >> (2 * i)) & 0x3) as usize;
            raster.set_pixel(px, py, palette[idx]);
        }
    }
}

fn decode_dxt1(data: &[u8], width: u32, height: u32) -> Result<Raster> {
    let mut reader = BinaryReader::new(data);
    let mut raster = Raster::new(width, height);

    for block_y in 0..height.div_ceil(4) {
        for block_x in 0..width.div_ceil(4) {
            let c1 = reader.read_u16()?;
            let c2 = reader.read_u16()?;
            let indices = reader.read_u32()?;

            let (r1, g1, b1) = expand565(c1);
            let (r2, g2, b2) = expand565(c2);

            let mut palette = [0u32; 4];
            palette[0] = Raster::pack(0xFF, r1, g1, b1);
            palette[1] = Raster::pack(0xFF, r2, g2, b2);

            // Raw 16-bit comparison selects the mode, exactly as the format
            // defines it - not a comparison of the decoded colors.
            if c1 < c2 {
                palette[2] = Raster::pack(
                    0xFF,
                    ((r1 as u16 + r2 as u16) / 2) as u8,
                    ((g1 as u16 + g2 as u16) / 2) as u8,
                    ((b1 as u16 + b2 as u16) / 2) as u8,
                );
                palette[3] = 0;
            } else {
                palette[2] = Raster::pack(0xFF, mix9(r1, r2), mix9(g1, g2), mix9(b1, b2));
                palette[3] = Raster::pack(0xFF, mix9(r2, r1), mix9(g2, g1), mix9(b2, b1));
            }

            write_color_block(&mut raster, block_x, block_y, indices, &palette);
        }
    }

    Ok(raster)
}

fn decode_dxt3(data: &[u8], width: u32, height: u32) -> Result<Raster> {
    let mut reader = BinaryReader::new(data);
    let mut raster = Raster::new(width, height);

    for block_y in 0..height.div_ceil(4) {
        for block_x in 0..width.div_ceil(4) {
            // Four u16 words of explicit 4-bit alpha, one nibble per pixel
            let alpha_bits = reader.read_u64()?;

            let c1 = reader.read_u16()?;
            let c2 = reader.read_u16()?;
            let indices = reader.read_u32()?;

            let (r1, g1, b1) = expand565(c1);
            let (r2, g2, b2) = expand565(c2);

            // Always 4-color opaque layout; alpha comes from the nibbles
            let palette = [
                Raster::pack(0, r1, g1, b1),
                Raster::pack(0, r2, g2, b2),
                Raster::pack(0, mix9(r1, r2), mix9(g1, g2), mix9(b1, b2)),
                Raster::pack(0, mix9(r2, r1), mix9(g2, g1), mix9(b2, b1)),
            ];

            for i in 0..16 {
                let px = block_x * 4 + (i % 4);
                let py = block_y * 4 + (i / 4);
                if px < width && py < height {
                    let alpha = (((alpha_bits >> (4 * i)) & 0xF) * 255 / 15) as u32;
                    let idx = ((indices >> (2 * i)) & 0x3) as usize;
                    raster.set_pixel(px, py, (alpha << 24) | palette[idx]);
                }
            }
        }
    }

    Ok(raster)
}

/// Build the 8-entry DXT4/5 alpha ramp.
fn dxt5_alpha_ramp(a0: u8, a1: u8) -> [u8; 8] {
    let (w0, w1) = (a0 as u16, a1 as u16);
    let mut ramp = [0u8; 8];
    ramp[0] = a0;
    ramp[1] = a1;

    if a0 > a1 {
        for n in 0..6 {
            ramp[2 + n] = (((6 - n as u16) * w0 + (n as u16 + 1) * w1 + 3) / 7) as u8;
        }
    } else {
        for n in 0..4 {
            ramp[2 + n] = (((4 - n as u16) * w0 + (n as u16 + 1) * w1 + 2) / 5) as u8;
        }
        ramp[6] = 0;
        ramp[7] = 255;
    }

    ramp
}

fn decode_dxt5(data: &[u8], width: u32, height: u32) -> Result<Raster> {
    let mut reader = BinaryReader::new(data);
    let mut raster = Raster::new(width, height);

    for block_y in 0..height.div_ceil(4) {
        for block_x in 0..width.div_ceil(4) {
            let a0 = reader.read_u8()?;
            let a1 = reader.read_u8()?;

            // Packed 48-bit (3 bits per pixel) alpha index field
            let idx_bytes = reader.read_bytes(6)?;
            let mut alpha_indices = 0u64;
            for (i, &b) in idx_bytes.iter().enumerate() {
                alpha_indices |= (b as u64) << (8 * i);
            }
            let ramp = dxt5_alpha_ramp(a0, a1);

            let c1 = reader.read_u16()?;
            let c2 = reader.read_u16()?;
            let indices = reader.read_u32()?;

            let (r1, g1, b1) = expand565(c1);
            let (r2, g2, b2) = expand565(c2);

            let palette = [
                Raster::pack(0, r1, g1, b1),
                Raster::pack(0, r2, g2, b2),
                Raster::pack(0, mix3(r1, r2), mix3(g1, g2), mix3(b1, b2)),
                Raster::pack(0, mix3(r2, r1), mix3(g2, g1), mix3(b2, b1)),
            ];

            for i in 0..16 {
                let px = block_x * 4 + (i % 4);
                let py = block_y * 4 + (i / 4);
                if px < width && py < height {
                    let alpha = ramp[((alpha_indices >> (3 * i)) & 0x7) as usize] as u32;
                    let idx = ((indices >> (2 * i)) & 0x3) as usize;
                    raster.set_pixel(px, py, (alpha << 24) | palette[idx]);
                }
            }
        }
    }

    Ok(raster)
}

fn decode_v8u8(data: &[u8], width: u32, height: u32) -> Result<Raster> {
    let mut reader = BinaryReader::new(data);
    let mut raster = Raster::new(width, height);

    for y in 0..height {
        for x in 0..width {
            let sample = reader.read_u16()?;
            // Legacy bit-inversion transform, truncated to the 16-bit
            // sample width before widening
            raster.set_pixel(x, y, (sample ^ 0xFFFF) as u32);
        }
    }

    Ok(raster)
}

fn decode_a1r5g5b5(data: &[u8], width: u32, height: u32) -> Result<Raster> {
    let mut reader = BinaryReader::new(data);
    let mut raster = Raster::new(width, height);

    for y in 0..height {
        for x in 0..width {
            let s = reader.read_u16()?;
            let a = ((s >> 15) & 0x1) * 255;
            let r = ((s >> 10) & 0x1F) * 255 / 31;
            let g = ((s >> 5) & 0x1F) * 255 / 31;
            let b = (s & 0x1F) * 255 / 31;
            raster.set_pixel(x, y, Raster::pack(a as u8, r as u8, g as u8, b as u8));
        }
    }

    Ok(raster)
}

fn decode_r5g6b5(data: &[u8], width: u32, height: u32) -> Result<Raster> {
    let mut reader = BinaryReader::new(data);
    let mut raster = Raster::new(width, height);

    for y in 0..height {
        for x in 0..width {
            let s = reader.read_u16()?;
            let r = ((s >> 11) & 0x1F) * 255 / 31;
            let g = ((s >> 5) & 0x3F) * 255 / 63;
            let b = (s & 0x1F) * 255 / 31;
            raster.set_pixel(x, y, Raster::pack(0xFF, r as u8, g as u8, b as u8));
        }
    }

    Ok(raster)
}

fn decode_rgb24(data: &[u8], width: u32, height: u32) -> Result<Raster> {
    let mut reader = BinaryReader::new(data);
    let mut raster = Raster::new(width, height);

    for y in 0..height {
        for x in 0..width {
            let b = reader.read_u8()?;
            let g = reader.read_u8()?;
            let r = reader.read_u8()?;
            raster.set_pixel(x, y, Raster::pack(0xFF, r, g, b));
        }
    }

    Ok(raster)
}

fn decode_rgb32(data: &[u8], width: u32, height: u32) -> Result<Raster> {
    let mut reader = BinaryReader::new(data);
    let mut raster = Raster::new(width, height);

    // Top-down rows match the raster layout, copy contiguously
    let bytes = reader.read_bytes(width as usize * height as usize * 4)?;
    for (pixel, chunk) in raster.pixels_mut().iter_mut().zip(bytes.chunks_exact(4)) {
        *pixel = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }

    Ok(raster)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{dds_header_bytes, HeaderSpec};

    fn dxt1_file(c1: u16, c2: u16, indices: u32) -> Vec<u8> {
        let mut data = dds_header_bytes(&HeaderSpec::four_cc(*b"DXT1", 4, 4, 1));
        data.extend_from_slice(&c1.to_le_bytes());
        data.extend_from_slice(&c2.to_le_bytes());
        data.extend_from_slice(&indices.to_le_bytes());
        data
    }

    #[test]
    fn test_dxt1_transparent_mode_on_raw_comparison() {
        // c1 < c2 as raw 16-bit values: 1-bit alpha mode, index 3 transparent
        let image = decode(&dxt1_file(0x0000, 0x0001, 0xFFFF_FFFF)).unwrap();

        assert_eq!(image.mode, CompressionMode::Dxt1);
        for y in 0..4 {
            for x in 0..4 {
                assert_eq!(image.base().pixel(x, y), 0);
            }
        }
    }

    #[test]
    fn test_dxt1_opaque_mode_on_raw_comparison() {
        // c1 > c2: 4-color opaque mode, every index fully opaque
        let image = decode(&dxt1_file(0x0001, 0x0000, 0xFFFF_FFFF)).unwrap();

        // index 3 = (6*c2 + 3*c1)/9 per channel; c1 = blue 8, c2 = black
        let expected = Raster::pack(0xFF, 0, 0, (3 * 8) / 9);
        assert_eq!(image.base().pixel(0, 0), expected);
    }

    #[test]
    fn test_dxt1_endpoint_selection() {
        // index 0 everywhere selects c1 directly
        let image = decode(&dxt1_file(0xF800, 0x0000, 0)).unwrap();
        assert_eq!(image.base().pixel(3, 3), 0xFFFF0000);
    }

    #[test]
    fn test_dxt3_explicit_alpha() {
        let mut data = dds_header_bytes(&HeaderSpec::four_cc(*b"DXT3", 4, 4, 1));
        // nibble 0 = 0xF (opaque), nibble 1 = 0x8, rest transparent
        data.extend_from_slice(&0x8Fu64.to_le_bytes());
        data.extend_from_slice(&0xF800u16.to_le_bytes()); // c1 = red
        data.extend_from_slice(&0x0000u16.to_le_bytes());
        data.extend_from_slice(&0u32.to_le_bytes()); // all pixels pick c1

        let image = decode(&data).unwrap();
        assert_eq!(image.base().pixel(0, 0), 0xFFFF0000);
        assert_eq!(
            image.base().pixel(1, 0),
            Raster::pack((8u32 * 255 / 15) as u8, 0xFF, 0, 0)
        );
        assert_eq!(image.base().pixel(2, 0) >> 24, 0);
    }

    #[test]
    fn test_dxt5_alpha_ramps() {
        // a0 > a1: 8-value linear ramp with +3/7 rounding
        let ramp = dxt5_alpha_ramp(255, 0);
        assert_eq!(ramp[0], 255);
        assert_eq!(ramp[1], 0);
        assert_eq!(ramp[2] as u32, (6 * 255 + 3) / 7);
        assert_eq!(ramp[7] as u32, (255 + 3) / 7);

        // a0 <= a1: 6-value ramp with 0 and 255 pinned
        let ramp = dxt5_alpha_ramp(0, 255);
        assert_eq!(ramp[2] as u32, (255 + 2) / 5);
        assert_eq!(ramp[6], 0);
        assert_eq!(ramp[7], 255);
    }

    #[test]
    fn test_dxt5_block() {
        let mut data = dds_header_bytes(&HeaderSpec::four_cc(*b"DXT5", 4, 4, 1));
        data.push(200); // a0
        data.push(100); // a1
        data.extend_from_slice(&[0u8; 6]); // all alpha indices 0 -> a0
        data.extend_from_slice(&0x0000u16.to_le_bytes()); // c1 = black
        data.extend_from_slice(&0xF800u16.to_le_bytes()); // c2 = red
        // all color indices 2 -> (2*c1 + c2)/3
        data.extend_from_slice(&0xAAAA_AAAAu32.to_le_bytes());

        let image = decode(&data).unwrap();
        let expected = Raster::pack(200, 0xFF / 3, 0, 0);
        assert_eq!(image.base().pixel(0, 0), expected);
    }

    #[test]
    fn test_v8u8_inversion_truncates() {
        let spec = HeaderSpec::linear16(2, 1, 0x00FF, 0xFF00, 0, 0);
        let mut data = dds_header_bytes(&spec);
        data.extend_from_slice(&0x1234u16.to_le_bytes());
        data.extend_from_slice(&0x0000u16.to_le_bytes());

        let image = decode(&data).unwrap();
        assert_eq!(image.mode, CompressionMode::V8U8);
        assert_eq!(image.base().pixel(0, 0), 0x0000_EDCB);
        assert_eq!(image.base().pixel(1, 0), 0x0000_FFFF);
    }

    #[test]
    fn test_r5g6b5_rescale() {
        let spec = HeaderSpec::linear16(1, 1, 0xF800, 0x07E0, 0x001F, 0);
        let mut data = dds_header_bytes(&spec);
        data.extend_from_slice(&0xFFFFu16.to_le_bytes());

        let image = decode(&data).unwrap();
        assert_eq!(image.base().pixel(0, 0), 0xFFFFFFFF);
    }

    #[test]
    fn test_a1r5g5b5_alpha_bit() {
        let spec = HeaderSpec::linear16(2, 1, 0x7C00, 0x03E0, 0x001F, 0x8000);
        let mut data = dds_header_bytes(&spec);
        data.extend_from_slice(&0xFFFFu16.to_le_bytes()); // a=1, all channels max
        data.extend_from_slice(&0x7FFFu16.to_le_bytes()); // a=0

        let image = decode(&data).unwrap();
        assert_eq!(image.base().pixel(0, 0), 0xFFFFFFFF);
        assert_eq!(image.base().pixel(1, 0), 0x00FFFFFF);
    }

    #[test]
    fn test_rgb24_channel_order() {
        let mut spec = HeaderSpec::rgb32(1, 1);
        spec.bit_count = 24;
        let mut data = dds_header_bytes(&spec);
        data.extend_from_slice(&[0x11, 0x22, 0x33]); // b, g, r on disk

        let image = decode(&data).unwrap();
        assert_eq!(image.base().pixel(0, 0), 0xFF332211);
    }

    #[test]
    fn test_rgb32_contiguous_copy() {
        let mut data = dds_header_bytes(&HeaderSpec::rgb32(2, 2));
        for sample in [0x11223344u32, 0x55667788, 0x99AABBCC, 0xDDEEFF00] {
            data.extend_from_slice(&sample.to_le_bytes());
        }

        let image = decode(&data).unwrap();
        assert_eq!(image.base().pixel(0, 0), 0x11223344);
        assert_eq!(image.base().pixel(1, 1), 0xDDEEFF00);
    }

    #[test]
    fn test_rgb24_rows_decode_top_down() {
        let data = [
            0x11, 0x22, 0x33, // row 0 on disk
            0x44, 0x55, 0x66, // row 1 on disk
        ];
        let raster = decode_rgb24(&data, 1, 2).unwrap();

        assert_eq!(raster.pixel(0, 0), 0xFF332211);
        assert_eq!(raster.pixel(0, 1), 0xFF665544);
    }

    #[test]
    fn test_truncated_level_one_shrinks_chain() {
        let mut data = dds_header_bytes(&HeaderSpec::rgb32_mipped(4, 4, 2));
        // Full base level (64 bytes), nothing for level 1
        data.extend_from_slice(&[0xAB; 64]);

        let image = decode(&data).unwrap();
        assert_eq!(image.levels.len(), 1);
        assert_eq!(
            image.chain,
            MipChain::Truncated {
                decoded: 1,
                expected: 2
            }
        );
    }

    #[test]
    fn test_complete_chain() {
        let mut data = dds_header_bytes(&HeaderSpec::rgb32_mipped(4, 4, 2));
        data.extend_from_slice(&[0xAB; 64]); // level 0
        data.extend_from_slice(&[0xCD; 16]); // level 1 (2x2)

        let image = decode(&data).unwrap();
        assert_eq!(image.levels.len(), 2);
        assert_eq!(image.chain, MipChain::Complete);
        assert_eq!(image.levels[1].width(), 2);
        assert_eq!(image.levels[1].height(), 2);
    }

    #[test]
    fn test_zero_dimension_image_is_fatal() {
        // Parseable header, but no base level could ever exist
        let data = dds_header_bytes(&HeaderSpec::rgb32(0, 0));
        assert!(matches!(decode(&data), Err(Error::InvalidHeader(_))));

        let data = dds_header_bytes(&HeaderSpec::rgb32(4, 0));
        assert!(matches!(decode(&data), Err(Error::InvalidHeader(_))));
    }

    #[test]
    fn test_truncated_base_level_is_fatal() {
        let mut data = dds_header_bytes(&HeaderSpec::rgb32(4, 4));
        data.extend_from_slice(&[0xAB; 10]); // needs 64

        assert!(matches!(decode(&data), Err(Error::CorruptData(_))));
    }
}
