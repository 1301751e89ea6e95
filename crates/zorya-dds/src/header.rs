//! DDS header structures and parsing.
//!
//! All fields are decoded sequentially in little-endian order at their fixed
//! offsets. The layout is never overlaid onto a struct - a malformed file can
//! only ever produce an error, not a misaligned read.

use zorya_common::BinaryReader;

use crate::{Error, Result};

/// DDS file magic bytes ("DDS ").
pub const DDS_MAGIC: &[u8; 4] = b"DDS ";

/// Total size of magic + header + pixel format block.
///
/// Mip-level payloads start at this offset.
pub const HEADER_SIZE: usize = 128;

/// DDS file header.
///
/// Height and width are signed on the wire but only meaningful as
/// non-negative; parsing stores their absolute values.
#[derive(Debug, Clone, Copy)]
pub struct DdsHeader {
    /// Header size (must be 124).
    pub size: u32,
    /// Header flags (DDSD_*).
    pub flags: u32,
    /// Image height.
    pub height: u32,
    /// Image width.
    pub width: u32,
    /// Pitch or linear size.
    pub pitch_or_linear_size: u32,
    /// Depth (for volume textures).
    pub depth: u32,
    /// Number of mipmap levels as written in the file.
    pub mipmap_count: u32,
    /// Pixel format.
    pub pixel_format: DdsPixelFormat,
    /// Surface capabilities.
    pub caps: u32,
    /// Surface capabilities 2.
    pub caps2: u32,
    /// Surface capabilities 3.
    pub caps3: u32,
    /// Surface capabilities 4.
    pub caps4: u32,
    /// Reserved.
    pub reserved2: u32,
}

impl DdsHeader {
    /// Expected header size.
    pub const SIZE: u32 = 124;

    /// Caps present.
    pub const FLAG_CAPS: u32 = 0x1;
    /// Height present.
    pub const FLAG_HEIGHT: u32 = 0x2;
    /// Width present.
    pub const FLAG_WIDTH: u32 = 0x4;
    /// Pitch present.
    pub const FLAG_PITCH: u32 = 0x8;
    /// Pixel format present.
    pub const FLAG_PIXEL_FORMAT: u32 = 0x1000;
    /// Mipmap count present.
    pub const FLAG_MIPMAP_COUNT: u32 = 0x20000;
    /// Linear size present.
    pub const FLAG_LINEAR_SIZE: u32 = 0x80000;
    /// Depth present.
    pub const FLAG_DEPTH: u32 = 0x800000;

    /// Complex surface (more than one surface).
    pub const CAPS_COMPLEX: u32 = 0x8;
    /// Texture surface.
    pub const CAPS_TEXTURE: u32 = 0x1000;
    /// Mipmapped surface.
    pub const CAPS_MIPMAP: u32 = 0x400000;

    /// Effective number of mip levels.
    ///
    /// Defaults to 1 when the MIPMAPCOUNT flag is absent; a flagged count of
    /// 0 is still treated as 1 (malformed writers exist).
    pub fn mip_count(&self) -> u32 {
        if self.flags & Self::FLAG_MIPMAP_COUNT != 0 {
            self.mipmap_count.max(1)
        } else {
            1
        }
    }
}

/// DDS pixel format.
#[derive(Debug, Clone, Copy)]
pub struct DdsPixelFormat {
    /// Structure size (must be 32).
    pub size: u32,
    /// Pixel format flags (DDPF_*).
    pub flags: u32,
    /// Four-character code for compression.
    pub four_cc: FourCC,
    /// Number of bits per pixel (for uncompressed).
    pub rgb_bit_count: u32,
    /// Red bit mask.
    pub r_bit_mask: u32,
    /// Green bit mask.
    pub g_bit_mask: u32,
    /// Blue bit mask.
    pub b_bit_mask: u32,
    /// Alpha bit mask.
    pub a_bit_mask: u32,
}

impl DdsPixelFormat {
    /// Expected structure size.
    pub const SIZE: u32 = 32;

    /// Alpha channel present in the pixel data.
    pub const FLAG_ALPHA_PIXELS: u32 = 0x1;
    /// Alpha-only format.
    pub const FLAG_ALPHA: u32 = 0x2;
    /// Four-character code valid.
    pub const FLAG_FOURCC: u32 = 0x4;
    /// Uncompressed RGB data.
    pub const FLAG_RGB: u32 = 0x40;
    /// YUV data.
    pub const FLAG_YUV: u32 = 0x200;
    /// Luminance data.
    pub const FLAG_LUMINANCE: u32 = 0x20000;

    fn read(reader: &mut BinaryReader<'_>) -> Result<Self> {
        Ok(Self {
            size: reader.read_u32()?,
            flags: reader.read_u32()?,
            four_cc: FourCC(reader.read_bytes(4)?.try_into().unwrap_or([0; 4])),
            rgb_bit_count: reader.read_u32()?,
            r_bit_mask: reader.read_u32()?,
            g_bit_mask: reader.read_u32()?,
            b_bit_mask: reader.read_u32()?,
            a_bit_mask: reader.read_u32()?,
        })
    }

    /// Check whether the four-character code is in use.
    pub fn has_four_cc(&self) -> bool {
        self.flags & Self::FLAG_FOURCC != 0
    }

    /// Check for the V8U8 signed bump-map signature.
    ///
    /// 16-bit data with masks R=0x00FF G=0xFF00 B=0 A=0 and no four-character
    /// code is V8U8, overriding the generic 16-bit classification. This is
    /// only consulted at decode time.
    pub fn is_v8u8(&self) -> bool {
        !self.has_four_cc()
            && self.rgb_bit_count == 16
            && self.r_bit_mask == 0x00FF
            && self.g_bit_mask == 0xFF00
            && self.b_bit_mask == 0
            && self.a_bit_mask == 0
    }
}

/// Four-character code for compression type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FourCC(pub [u8; 4]);

impl FourCC {
    /// No code (uncompressed formats).
    pub const NONE: Self = Self([0; 4]);
    /// DXT1 compression.
    pub const DXT1: Self = Self(*b"DXT1");
    /// DXT2 compression (premultiplied DXT3).
    pub const DXT2: Self = Self(*b"DXT2");
    /// DXT3 compression.
    pub const DXT3: Self = Self(*b"DXT3");
    /// DXT4 compression (premultiplied DXT5).
    pub const DXT4: Self = Self(*b"DXT4");
    /// DXT5 compression.
    pub const DXT5: Self = Self(*b"DXT5");
    /// DX10 extended header.
    pub const DX10: Self = Self(*b"DX10");
}

impl std::fmt::Display for FourCC {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0.iter().all(|b| b.is_ascii_graphic()) {
            write!(f, "{}", std::str::from_utf8(&self.0).unwrap_or("????"))
        } else {
            write!(f, "{:#010x}", u32::from_le_bytes(self.0))
        }
    }
}

/// Pixel compression of a DDS payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionMode {
    /// Unrecognized format.
    Unknown,
    /// BC1 block compression.
    Dxt1,
    /// BC2 with premultiplied alpha.
    Dxt2,
    /// BC2 block compression.
    Dxt3,
    /// BC3 with premultiplied alpha.
    Dxt4,
    /// BC3 block compression.
    Dxt5,
    /// Signed 8:8 bump map.
    V8U8,
    /// DX10 extended header (unsupported).
    Dx10,
    /// 16-bit 1:5:5:5 linear.
    A1R5G5B5,
    /// 16-bit 5:6:5 linear.
    R5G6B5,
    /// 24-bit 8:8:8 linear.
    Rgb24,
    /// 32-bit 8:8:8:8 linear.
    Rgb32,
}

impl CompressionMode {
    /// Classify a pixel format into a compression mode.
    ///
    /// Returns [`CompressionMode::Unknown`] for four-character codes outside
    /// the DXT1..DXT5/DX10 set; callers decide whether that is fatal.
    pub fn classify(pf: &DdsPixelFormat) -> Result<Self> {
        if pf.has_four_cc() {
            Ok(match pf.four_cc {
                FourCC::DXT1 => Self::Dxt1,
                FourCC::DXT2 => Self::Dxt2,
                FourCC::DXT3 => Self::Dxt3,
                FourCC::DXT4 => Self::Dxt4,
                FourCC::DXT5 => Self::Dxt5,
                FourCC::DX10 => Self::Dx10,
                _ => Self::Unknown,
            })
        } else {
            match pf.rgb_bit_count {
                16 if pf.a_bit_mask == 0 => Ok(Self::R5G6B5),
                16 => Ok(Self::A1R5G5B5),
                24 => Ok(Self::Rgb24),
                32 => Ok(Self::Rgb32),
                n => Err(Error::UnsupportedBitCount(n)),
            }
        }
    }

    /// Bytes per 4x4 block, for block-compressed modes.
    pub const fn block_size(self) -> Option<usize> {
        match self {
            Self::Dxt1 => Some(8),
            Self::Dxt2 | Self::Dxt3 | Self::Dxt4 | Self::Dxt5 => Some(16),
            _ => None,
        }
    }

    /// Bits per pixel, for linear modes.
    pub const fn bits_per_pixel(self) -> Option<u32> {
        match self {
            Self::V8U8 | Self::A1R5G5B5 | Self::R5G6B5 => Some(16),
            Self::Rgb24 => Some(24),
            Self::Rgb32 => Some(32),
            _ => None,
        }
    }
}

/// Parse the magic, header and pixel format block of a DDS byte stream.
///
/// Returns the header and the classified compression mode. The payload
/// starts at [`HEADER_SIZE`].
pub fn parse_header(data: &[u8]) -> Result<(DdsHeader, CompressionMode)> {
    let mut reader = BinaryReader::new(data);

    let magic = reader.read_bytes(4)?;
    if magic != DDS_MAGIC {
        return Err(Error::InvalidMagic(magic.try_into().unwrap_or([0; 4])));
    }

    let size = reader.read_u32()?;
    if size != DdsHeader::SIZE {
        return Err(Error::InvalidHeader(format!(
            "header size {} (expected {})",
            size,
            DdsHeader::SIZE
        )));
    }

    let flags = reader.read_u32()?;
    let height = reader.read_i32()?.unsigned_abs();
    let width = reader.read_i32()?.unsigned_abs();
    let pitch_or_linear_size = reader.read_u32()?;
    let depth = reader.read_u32()?;
    let mipmap_count = reader.read_u32()?;

    // 11 reserved words, ignored on read
    reader.advance(44);

    let pixel_format = DdsPixelFormat::read(&mut reader)?;
    if pixel_format.size != DdsPixelFormat::SIZE {
        return Err(Error::InvalidHeader(format!(
            "pixel format size {} (expected {})",
            pixel_format.size,
            DdsPixelFormat::SIZE
        )));
    }

    let header = DdsHeader {
        size,
        flags,
        height,
        width,
        pitch_or_linear_size,
        depth,
        mipmap_count,
        pixel_format,
        caps: reader.read_u32()?,
        caps2: reader.read_u32()?,
        caps3: reader.read_u32()?,
        caps4: reader.read_u32()?,
        reserved2: reader.read_u32()?,
    };

    let mode = match CompressionMode::classify(&pixel_format)? {
        // No DX10 extension header support
        CompressionMode::Dx10 | CompressionMode::Unknown => {
            return Err(Error::UnsupportedFourCc(pixel_format.four_cc));
        }
        mode => mode,
    };

    Ok((header, mode))
}
