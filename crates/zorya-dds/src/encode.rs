//! DDS container serialization.
//!
//! Encodes a raster into an uncompressed DDS file with a generated mip
//! chain. The entire file is assembled in memory and returned as one buffer,
//! so a failed encode can never leave a partially written file behind.

use image::imageops::FilterType;
use image::RgbaImage;
use zorya_common::Raster;

use crate::header::{CompressionMode, DdsHeader, DdsPixelFormat, DDS_MAGIC};
use crate::{Error, Result};

/// Channel layout of an uncompressed encode target.
struct TargetLayout {
    bit_count: u32,
    r_mask: u32,
    g_mask: u32,
    b_mask: u32,
    a_mask: u32,
}

impl TargetLayout {
    fn for_mode(mode: CompressionMode) -> Option<Self> {
        match mode {
            CompressionMode::A1R5G5B5 => Some(Self {
                bit_count: 16,
                r_mask: 0x7C00,
                g_mask: 0x03E0,
                b_mask: 0x001F,
                a_mask: 0x8000,
            }),
            CompressionMode::R5G6B5 => Some(Self {
                bit_count: 16,
                r_mask: 0xF800,
                g_mask: 0x07E0,
                b_mask: 0x001F,
                a_mask: 0,
            }),
            CompressionMode::Rgb24 => Some(Self {
                bit_count: 24,
                r_mask: 0xFF0000,
                g_mask: 0x00FF00,
                b_mask: 0x0000FF,
                a_mask: 0,
            }),
            CompressionMode::Rgb32 => Some(Self {
                bit_count: 32,
                r_mask: 0x00FF0000,
                g_mask: 0x0000FF00,
                b_mask: 0x000000FF,
                a_mask: 0xFF000000,
            }),
            _ => None,
        }
    }

    fn bytes_per_pixel(&self) -> u32 {
        self.bit_count / 8
    }
}

/// Quantize an 8-bit channel down to `max` steps with half-step rounding.
#[inline]
fn quantize(channel: u8, max: u32) -> u32 {
    let half_step = 255 / max / 2;
    (channel as u32 + half_step) * max / 255
}

/// Encode a raster into a complete DDS byte stream.
///
/// The target must be one of the four uncompressed encodings
/// (`A1R5G5B5`, `R5G6B5`, `Rgb24`, `Rgb32`); anything else fails before a
/// single byte is produced. A mip chain is generated by successive halving
/// until either dimension would drop below 4 pixels.
pub fn encode(raster: &Raster, target: CompressionMode) -> Result<Vec<u8>> {
    let layout = TargetLayout::for_mode(target).ok_or(Error::UnsupportedEncodeTarget(target))?;

    let tail = mip_tail(raster);
    let mip_count = 1 + tail.len() as u32;
    let has_alpha = raster.has_translucency();

    let total_pixels: usize = raster.pixels().len() + tail.iter().map(|r| r.pixels().len()).sum::<usize>();
    let mut out = Vec::with_capacity(128 + total_pixels * layout.bytes_per_pixel() as usize);

    out.extend_from_slice(DDS_MAGIC);

    // Header
    push_u32(&mut out, DdsHeader::SIZE);
    push_u32(
        &mut out,
        DdsHeader::FLAG_CAPS
            | DdsHeader::FLAG_HEIGHT
            | DdsHeader::FLAG_WIDTH
            | DdsHeader::FLAG_PITCH
            | DdsHeader::FLAG_PIXEL_FORMAT
            | DdsHeader::FLAG_MIPMAP_COUNT,
    );
    push_u32(&mut out, raster.height());
    push_u32(&mut out, raster.width());
    push_u32(&mut out, raster.width() * layout.bytes_per_pixel());
    push_u32(&mut out, 0); // depth
    push_u32(&mut out, mip_count);
    for _ in 0..11 {
        push_u32(&mut out, 0); // reserved
    }

    // Pixel format block
    push_u32(&mut out, DdsPixelFormat::SIZE);
    let mut pf_flags = DdsPixelFormat::FLAG_RGB;
    if has_alpha {
        pf_flags |= DdsPixelFormat::FLAG_ALPHA_PIXELS;
    }
    push_u32(&mut out, pf_flags);
    push_u32(&mut out, 0); // no four-character code
    push_u32(&mut out, layout.bit_count);
    push_u32(&mut out, layout.r_mask);
    push_u32(&mut out, layout.g_mask);
    push_u32(&mut out, layout.b_mask);
    push_u32(&mut out, layout.a_mask);

    // Caps
    push_u32(
        &mut out,
        DdsHeader::CAPS_COMPLEX | DdsHeader::CAPS_TEXTURE | DdsHeader::CAPS_MIPMAP,
    );
    push_u32(&mut out, 0); // caps2
    push_u32(&mut out, 0); // caps3
    push_u32(&mut out, 0); // caps4
    push_u32(&mut out, 0); // reserved2

    encode_level(&mut out, raster, target);
    for level in &tail {
        encode_level(&mut out, level, target);
    }

    Ok(out)
}

#[inline]
fn push_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}

/// Serialize one mip level in the target channel layout.
fn encode_level(out: &mut Vec<u8>, raster: &Raster, target: CompressionMode) {
    match target {
        CompressionMode::A1R5G5B5 => {
            for &p in raster.pixels() {
                let (a, r, g, b) = Raster::unpack(p);
                let word = (quantize(a, 1) << 15) as u16
                    | (quantize(r, 31) << 10) as u16
                    | (quantize(g, 31) << 5) as u16
                    | quantize(b, 31) as u16;
                out.extend_from_slice(&word.to_le_bytes());
            }
        }
        CompressionMode::R5G6B5 => {
            for &p in raster.pixels() {
                let (_, r, g, b) = Raster::unpack(p);
                let word = (quantize(r, 31) << 11) as u16
                    | (quantize(g, 63) << 5) as u16
                    | quantize(b, 31) as u16;
                out.extend_from_slice(&word.to_le_bytes());
            }
        }
        CompressionMode::Rgb24 => {
            for &p in raster.pixels() {
                let (_, r, g, b) = Raster::unpack(p);
                out.extend_from_slice(&[b, g, r]);
            }
        }
        CompressionMode::Rgb32 => {
            for &p in raster.pixels() {
                out.extend_from_slice(&p.to_le_bytes());
            }
        }
        // encode() has already rejected everything else
        _ => {}
    }
}

/// Generate the mip levels below the base by successive halving.
///
/// Halving stops once either dimension would fall below 4 pixels; a base
/// smaller than 8x8 therefore yields an empty tail. Decoders derive each
/// level's payload size by shifting the base level's, so the chain also
/// ends before an odd dimension would break that correspondence.
fn mip_tail(base: &Raster) -> Vec<Raster> {
    let mut tail = Vec::new();
    let mut current = to_rgba(base);

    loop {
        let (w, h) = (current.width(), current.height());
        if w % 2 != 0 || h % 2 != 0 || w / 2 < 4 || h / 2 < 4 {
            break;
        }
        current = image::imageops::resize(&current, w / 2, h / 2, FilterType::CatmullRom);
        tail.push(from_rgba(&current));
    }

    tail
}

fn to_rgba(raster: &Raster) -> RgbaImage {
    let mut img = RgbaImage::new(raster.width(), raster.height());
    for (x, y, px) in img.enumerate_pixels_mut() {
        let (a, r, g, b) = Raster::unpack(raster.pixel(x, y));
        *px = image::Rgba([r, g, b, a]);
    }
    img
}

fn from_rgba(img: &RgbaImage) -> Raster {
    let mut raster = Raster::new(img.width(), img.height());
    for (x, y, px) in img.enumerate_pixels() {
        let [r, g, b, a] = px.0;
        raster.set_pixel(x, y, Raster::pack(a, r, g, b));
    }
    raster
}
