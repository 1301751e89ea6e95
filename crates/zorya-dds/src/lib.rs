//! DDS texture container codec.
//!
//! Game map tiles ship as DDS containers in a handful of legacy encodings:
//! block-compressed DXT1..DXT5, the V8U8 signed bump-map layout, and four
//! linear pixel formats. This crate parses the container, decompresses every
//! mip level into 32-bit ARGB rasters, and re-encodes rasters back into
//! uncompressed containers with generated mip chains.
//!
//! The codec works on byte slices, never paths - locating and reading files
//! is the caller's concern.
//!
//! # Example
//!
//! ```no_run
//! use zorya_dds::{decode, encode, CompressionMode};
//!
//! let data = std::fs::read("tile.dds")?;
//! let image = decode(&data)?;
//!
//! let reencoded = encode(image.base(), CompressionMode::Rgb32)?;
//! std::fs::write("tile_out.dds", &reencoded)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod decode;
mod encode;
mod error;
pub mod header;

pub use decode::{decode, DecodedImage, MipChain};
pub use encode::encode;
pub use error::{Error, Result};
pub use header::{parse_header, CompressionMode, DdsHeader, DdsPixelFormat, FourCC, DDS_MAGIC};

#[cfg(test)]
pub(crate) mod test_util {
    //! Hand-built header fixtures for codec tests.

    use crate::header::{DdsHeader, DdsPixelFormat, DDS_MAGIC};

    pub struct HeaderSpec {
        pub width: i32,
        pub height: i32,
        pub mipmap_count: u32,
        pub mipmap_flag: bool,
        pub four_cc: [u8; 4],
        pub use_four_cc: bool,
        pub bit_count: u32,
        pub r_mask: u32,
        pub g_mask: u32,
        pub b_mask: u32,
        pub a_mask: u32,
    }

    impl HeaderSpec {
        pub fn rgb32(width: i32, height: i32) -> Self {
            Self {
                width,
                height,
                mipmap_count: 1,
                mipmap_flag: false,
                four_cc: [0; 4],
                use_four_cc: false,
                bit_count: 32,
                r_mask: 0x00FF0000,
                g_mask: 0x0000FF00,
                b_mask: 0x000000FF,
                a_mask: 0xFF000000,
            }
        }

        pub fn rgb32_mipped(width: i32, height: i32, mipmap_count: u32) -> Self {
            Self {
                mipmap_count,
                mipmap_flag: true,
                ..Self::rgb32(width, height)
            }
        }

        pub fn four_cc(code: [u8; 4], width: i32, height: i32, mipmap_count: u32) -> Self {
            Self {
                four_cc: code,
                use_four_cc: true,
                mipmap_flag: mipmap_count > 1,
                mipmap_count,
                bit_count: 0,
                r_mask: 0,
                g_mask: 0,
                b_mask: 0,
                a_mask: 0,
                ..Self::rgb32(width, height)
            }
        }

        pub fn linear16(
            width: i32,
            height: i32,
            r_mask: u32,
            g_mask: u32,
            b_mask: u32,
            a_mask: u32,
        ) -> Self {
            Self {
                bit_count: 16,
                r_mask,
                g_mask,
                b_mask,
                a_mask,
                ..Self::rgb32(width, height)
            }
        }
    }

    /// Serialize a 128-byte magic + header + pixel format block.
    pub fn dds_header_bytes(spec: &HeaderSpec) -> Vec<u8> {
        let mut out = Vec::with_capacity(128);
        let push = |out: &mut Vec<u8>, v: u32| out.extend_from_slice(&v.to_le_bytes());

        out.extend_from_slice(DDS_MAGIC);
        push(&mut out, DdsHeader::SIZE);

        let mut flags =
            DdsHeader::FLAG_CAPS | DdsHeader::FLAG_HEIGHT | DdsHeader::FLAG_WIDTH | DdsHeader::FLAG_PIXEL_FORMAT;
        if spec.mipmap_flag {
            flags |= DdsHeader::FLAG_MIPMAP_COUNT;
        }
        push(&mut out, flags);
        push(&mut out, spec.height as u32);
        push(&mut out, spec.width as u32);
        push(&mut out, 0); // pitch
        push(&mut out, 0); // depth
        push(&mut out, spec.mipmap_count);
        for _ in 0..11 {
            push(&mut out, 0);
        }

        push(&mut out, DdsPixelFormat::SIZE);
        let pf_flags = if spec.use_four_cc {
            DdsPixelFormat::FLAG_FOURCC
        } else {
            DdsPixelFormat::FLAG_RGB
        };
        push(&mut out, pf_flags);
        out.extend_from_slice(&spec.four_cc);
        push(&mut out, spec.bit_count);
        push(&mut out, spec.r_mask);
        push(&mut out, spec.g_mask);
        push(&mut out, spec.b_mask);
        push(&mut out, spec.a_mask);

        push(&mut out, DdsHeader::CAPS_TEXTURE);
        push(&mut out, 0);
        push(&mut out, 0);
        push(&mut out, 0);
        push(&mut out, 0);

        out
    }
}
