//! JPEG header inspection without decoding.
//!
//! PDF pages embed JPEG data untouched, so only the frame header (size,
//! colour components) and the JFIF density are needed.

use crate::error::{ErrorKind, Result};

/// Pixel density in dots per inch.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Density {
    pub x: f32,
    pub y: f32,
}

/// Frame information read from a JPEG header.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct JpegInfo {
    pub width: u32,
    pub height: u32,
    /// 1 = greyscale, 3 = YCbCr/RGB, 4 = CMYK/YCCK
    pub components: u8,
    /// JFIF density, when the file declares one in absolute units.
    pub density: Option<Density>,
}

/// Walk the marker segments up to the first start-of-frame.
///
/// Fails with [`ErrorKind::Decode`] when the data is not a JPEG, is
/// truncated before the frame header, or declares a zero-sized frame.
pub fn sniff(data: &[u8]) -> Result<JpegInfo> {
    if data.len() < 4 || data[0] != 0xFF || data[1] != 0xD8 {
        exn::bail!(ErrorKind::Decode);
    }
    let mut density = None;
    let mut i = 2;
    while i + 3 < data.len() {
        if data[i] != 0xFF {
            i += 1;
            continue;
        }
        let marker = data[i + 1];
        // Fill bytes, and markers without a length field (TEM, RSTn, SOI, EOI).
        if marker == 0xFF {
            i += 1;
            continue;
        }
        if marker == 0x01 || (0xD0..=0xD9).contains(&marker) {
            i += 2;
            continue;
        }
        let length = usize::from(u16::from_be_bytes([data[i + 2], data[i + 3]]));
        let segment = data.get(i + 4..i + 2 + length).unwrap_or(&[]);
        match marker {
            0xE0 if segment.starts_with(b"JFIF\0") && segment.len() >= 12 => {
                density = jfif_density(segment[7], [segment[8], segment[9]], [segment[10], segment[11]]);
            },
            // SOF0-3, SOF5-7, SOF9-11, SOF13-15 (C4 = DHT, C8 = JPG, CC = DAC)
            0xC0..=0xC3 | 0xC5..=0xC7 | 0xC9..=0xCB | 0xCD..=0xCF => {
                if segment.len() < 6 {
                    exn::bail!(ErrorKind::Decode);
                }
                let height = u32::from(u16::from_be_bytes([segment[1], segment[2]]));
                let width = u32::from(u16::from_be_bytes([segment[3], segment[4]]));
                let components = segment[5];
                if width == 0 || height == 0 || components == 0 {
                    exn::bail!(ErrorKind::Decode);
                }
                return Ok(JpegInfo { width, height, components, density });
            },
            // Start of scan before any frame header.
            0xDA => break,
            _ => {},
        }
        i += 2 + length;
    }
    exn::bail!(ErrorKind::Decode);
}

fn jfif_density(units: u8, x: [u8; 2], y: [u8; 2]) -> Option<Density> {
    let (x, y) = (f32::from(u16::from_be_bytes(x)), f32::from(u16::from_be_bytes(y)));
    if x == 0.0 || y == 0.0 {
        return None;
    }
    match units {
        1 => Some(Density { x, y }),
        2 => Some(Density { x: x * 2.54, y: y * 2.54 }),
        // 0 is an aspect ratio only
        _ => None,
    }
}
