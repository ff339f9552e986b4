//! Signature images.
//!
//! Signatures arrive as PNG, either raw or as a base64 data URL captured from
//! a canvas. They are decoded to 8-bit samples so the colour channels and the
//! alpha channel can be embedded as an image and its soft mask.
//!
//! Supported: bit depth 8, non-interlaced, greyscale, RGB, palette,
//! grey+alpha and RGBA. Anything else is reported as unsupported.

use std::io::Read;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use flate2::read::ZlibDecoder;
use thiserror::Error;

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Signatures larger than this are refused rather than inflated.
const MAX_PIXELS: u64 = 16 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum SignatureError {
    #[error("signature is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("signature is not a PNG image")]
    NotPng,

    #[error("PNG data is truncated")]
    Truncated,

    #[error("unsupported PNG format (bit depth {bit_depth}, colour type {color_type})")]
    Unsupported { bit_depth: u8, color_type: u8 },

    #[error("interlaced PNG images are not supported")]
    Interlaced,

    #[error("PNG image of {width}x{height} is too large")]
    TooLarge { width: u32, height: u32 },

    #[error("PNG image data is larger than its header declares")]
    Oversized,

    #[error("palette image without a valid PLTE chunk")]
    Palette,

    #[error("unknown PNG filter type {0}")]
    Filter(u8),

    #[error("image data could not be processed: {0}")]
    Io(#[from] std::io::Error),
}

/// Where a signature comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signature {
    /// `data:image/png;base64,...` or bare base64.
    DataUrl(String),
    /// Raw PNG file contents.
    Png(Vec<u8>),
}

impl Signature {
    pub fn decode(&self) -> Result<SignatureImage, SignatureError> {
        match self {
            Signature::DataUrl(url) => decode_png(&decode_data_url(url)?),
            Signature::Png(bytes) => decode_png(bytes),
        }
    }
}

/// Colour model of the decoded samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    Gray,
    Rgb,
}

impl ColorSpace {
    pub fn pdf_name(self) -> &'static str {
        match self {
            ColorSpace::Gray => "DeviceGray",
            ColorSpace::Rgb => "DeviceRGB",
        }
    }
}

/// Decoded signature: 8-bit samples, row-major, no padding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureImage {
    pub width: u32,
    pub height: u32,
    pub color_space: ColorSpace,
    pub samples: Vec<u8>,
    /// One byte per pixel when the image has transparency.
    pub alpha: Option<Vec<u8>>,
}

/// Strip an optional `data:` prefix and decode the base64 payload.
pub fn decode_data_url(input: &str) -> Result<Vec<u8>, SignatureError> {
    let payload = match input.find("base64,") {
        Some(idx) if input.starts_with("data:") => &input[idx + "base64,".len()..],
        _ => input,
    };
    let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    Ok(STANDARD.decode(compact)?)
}

struct Header {
    width: u32,
    height: u32,
    color_type: u8,
}

impl Header {
    fn parse(body: &[u8]) -> Result<Self, SignatureError> {
        if body.len() != 13 {
            return Err(SignatureError::Truncated);
        }
        let width = be_u32(&body[0..4]);
        let height = be_u32(&body[4..8]);
        let bit_depth = body[8];
        let color_type = body[9];

        if bit_depth != 8 || !matches!(color_type, 0 | 2 | 3 | 4 | 6) {
            return Err(SignatureError::Unsupported {
                bit_depth,
                color_type,
            });
        }
        if body[12] != 0 {
            return Err(SignatureError::Interlaced);
        }
        if width == 0 || height == 0 || u64::from(width) * u64::from(height) > MAX_PIXELS {
            return Err(SignatureError::TooLarge { width, height });
        }

        Ok(Self {
            width,
            height,
            color_type,
        })
    }

    fn channels(&self) -> usize {
        match self.color_type {
            2 => 3,
            4 => 2,
            6 => 4,
            _ => 1,
        }
    }
}

fn be_u32(bytes: &[u8]) -> u32 {
    u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

/// Decode a PNG file into 8-bit samples and an optional alpha plane.
pub fn decode_png(data: &[u8]) -> Result<SignatureImage, SignatureError> {
    let mut rest = data.strip_prefix(&PNG_SIGNATURE[..]).ok_or(SignatureError::NotPng)?;

    let mut header = None;
    let mut palette: Option<&[u8]> = None;
    let mut transparency: Option<&[u8]> = None;
    let mut compressed = Vec::new();

    while !rest.is_empty() {
        if rest.len() < 12 {
            return Err(SignatureError::Truncated);
        }
        let len = be_u32(&rest[0..4]) as usize;
        let end = len.checked_add(12).ok_or(SignatureError::Truncated)?;
        if rest.len() < end {
            return Err(SignatureError::Truncated);
        }
        let body = &rest[8..8 + len];

        match &rest[4..8] {
            b"IHDR" => header = Some(Header::parse(body)?),
            b"PLTE" => palette = Some(body),
            b"tRNS" => transparency = Some(body),
            b"IDAT" => compressed.extend_from_slice(body),
            b"IEND" => break,
            _ => {}
        }
        rest = &rest[end..];
    }

    let header = header.ok_or(SignatureError::Truncated)?;
    if compressed.is_empty() {
        return Err(SignatureError::Truncated);
    }

    let channels = header.channels();
    let stride = header.width as usize * channels;
    let height = header.height as usize;
    let expected = height * (stride + 1);

    // Inflate at most one byte past the declared size.
    let mut filtered = Vec::with_capacity(expected);
    ZlibDecoder::new(compressed.as_slice())
        .take(expected as u64 + 1)
        .read_to_end(&mut filtered)?;
    if filtered.len() > expected {
        return Err(SignatureError::Oversized);
    }
    if filtered.len() < expected {
        return Err(SignatureError::Truncated);
    }

    let pixels = unfilter(&filtered, stride, height, channels)?;
    split_channels(&header, pixels, palette, transparency)
}

/// Reverse the per-scanline PNG filters.
fn unfilter(data: &[u8], stride: usize, height: usize, bpp: usize) -> Result<Vec<u8>, SignatureError> {
    let mut out = vec![0u8; stride * height];

    for row in 0..height {
        let line = &data[row * (stride + 1)..(row + 1) * (stride + 1)];
        let (filter, src) = (line[0], &line[1..]);
        let (done, current) = out.split_at_mut(row * stride);
        let prev = if row == 0 { None } else { Some(&done[(row - 1) * stride..]) };
        let current = &mut current[..stride];

        for i in 0..stride {
            let a = if i >= bpp { current[i - bpp] } else { 0 };
            let b = prev.map_or(0, |p| p[i]);
            let c = if i >= bpp { prev.map_or(0, |p| p[i - bpp]) } else { 0 };

            current[i] = match filter {
                0 => src[i],
                1 => src[i].wrapping_add(a),
                2 => src[i].wrapping_add(b),
                3 => src[i].wrapping_add(((u16::from(a) + u16::from(b)) / 2) as u8),
                4 => src[i].wrapping_add(paeth(a, b, c)),
                other => return Err(SignatureError::Filter(other)),
            };
        }
    }

    Ok(out)
}

fn paeth(a: u8, b: u8, c: u8) -> u8 {
    let p = i16::from(a) + i16::from(b) - i16::from(c);
    let pa = (p - i16::from(a)).abs();
    let pb = (p - i16::from(b)).abs();
    let pc = (p - i16::from(c)).abs();
    if pa <= pb && pa <= pc {
        a
    } else if pb <= pc {
        b
    } else {
        c
    }
}

fn split_channels(
    header: &Header,
    pixels: Vec<u8>,
    palette: Option<&[u8]>,
    transparency: Option<&[u8]>,
) -> Result<SignatureImage, SignatureError> {
    let (color_space, samples, alpha) = match header.color_type {
        0 => (ColorSpace::Gray, pixels, None),
        2 => (ColorSpace::Rgb, pixels, None),
        4 => {
            let (gray, alpha) = deinterleave(&pixels, 1);
            (ColorSpace::Gray, gray, Some(alpha))
        }
        6 => {
            let (rgb, alpha) = deinterleave(&pixels, 3);
            (ColorSpace::Rgb, rgb, Some(alpha))
        }
        _ => {
            let palette = palette
                .filter(|p| !p.is_empty() && p.len() % 3 == 0)
                .ok_or(SignatureError::Palette)?;
            let entries = palette.len() / 3;

            let mut rgb = Vec::with_capacity(pixels.len() * 3);
            for &index in &pixels {
                let index = usize::from(index);
                if index >= entries {
                    return Err(SignatureError::Palette);
                }
                rgb.extend_from_slice(&palette[index * 3..index * 3 + 3]);
            }
            let alpha = transparency.map(|trns| {
                pixels
                    .iter()
                    .map(|&i| trns.get(usize::from(i)).copied().unwrap_or(0xFF))
                    .collect()
            });
            (ColorSpace::Rgb, rgb, alpha)
        }
    };

    Ok(SignatureImage {
        width: header.width,
        height: header.height,
        color_space,
        samples,
        alpha,
    })
}

/// Split interleaved `color + alpha` pixels.
fn deinterleave(pixels: &[u8], color_channels: usize) -> (Vec<u8>, Vec<u8>) {
    let pixel = color_channels + 1;
    let count = pixels.len() / pixel;
    let mut color = Vec::with_capacity(count * color_channels);
    let mut alpha = Vec::with_capacity(count);
    for chunk in pixels.chunks_exact(pixel) {
        color.extend_from_slice(&chunk[..color_channels]);
        alpha.push(chunk[color_channels]);
    }
    (color, alpha)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use flate2::write::ZlibEncoder;
    use flate2::Compression;
    use std::io::Write;

    fn crc32(bytes: &[u8]) -> u32 {
        let mut crc = 0xFFFF_FFFFu32;
        for &byte in bytes {
            crc ^= u32::from(byte);
            for _ in 0..8 {
                let mask = (crc & 1).wrapping_neg();
                crc = (crc >> 1) ^ (0xEDB8_8320 & mask);
            }
        }
        !crc
    }

    fn chunk(out: &mut Vec<u8>, kind: &[u8; 4], body: &[u8]) {
        out.extend_from_slice(&(body.len() as u32).to_be_bytes());
        let start = out.len();
        out.extend_from_slice(kind);
        out.extend_from_slice(body);
        let crc = crc32(&out[start..]);
        out.extend_from_slice(&crc.to_be_bytes());
    }

    /// Build a PNG from already-filtered scanlines.
    pub(crate) fn build_png(width: u32, height: u32, color_type: u8, scanlines: &[u8], extra: &[(&[u8; 4], Vec<u8>)]) -> Vec<u8> {
        let mut ihdr = Vec::new();
        ihdr.extend_from_slice(&width.to_be_bytes());
        ihdr.extend_from_slice(&height.to_be_bytes());
        ihdr.extend_from_slice(&[8, color_type, 0, 0, 0]);

        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(scanlines).unwrap();
        let idat = encoder.finish().unwrap();

        let mut png = PNG_SIGNATURE.to_vec();
        chunk(&mut png, b"IHDR", &ihdr);
        for (kind, body) in extra {
            chunk(&mut png, kind, body);
        }
        chunk(&mut png, b"IDAT", &idat);
        chunk(&mut png, b"IEND", &[]);
        png
    }

    /// A 2x2 RGBA image with a Sub-filtered second row.
    pub(crate) fn sample_rgba_png() -> Vec<u8> {
        #[rustfmt::skip]
        let scanlines = [
            0, 255, 0, 0, 255,   0, 0, 255, 128,
            1, 10, 20, 30, 0,    5, 5, 5, 255,
        ];
        build_png(2, 2, 6, &scanlines, &[])
    }

    #[test]
    fn test_decode_rgba_with_sub_filter() {
        let image = decode_png(&sample_rgba_png()).unwrap();
        assert_eq!((image.width, image.height), (2, 2));
        assert_eq!(image.color_space, ColorSpace::Rgb);
        assert_eq!(image.samples, vec![255, 0, 0, 0, 0, 255, 10, 20, 30, 15, 25, 35]);
        assert_eq!(image.alpha, Some(vec![255, 128, 0, 255]));
    }

    #[test]
    fn test_decode_gray_with_up_and_paeth() {
        #[rustfmt::skip]
        let scanlines = [
            0, 10, 20, 30,
            2, 1, 1, 1,
            4, 1, 1, 1,
        ];
        let image = decode_png(&build_png(3, 3, 0, &scanlines, &[])).unwrap();
        assert_eq!(image.color_space, ColorSpace::Gray);
        assert_eq!(&image.samples[0..6], &[10, 20, 30, 11, 21, 31]);
        // Paeth on row 3: first byte predicts from b (above) = 11.
        assert_eq!(image.samples[6], 12);
        assert_eq!(image.alpha, None);
    }

    #[test]
    fn test_decode_palette_with_transparency() {
        let scanlines = [0, 1, 0];
        let png = build_png(
            2,
            1,
            3,
            &scanlines,
            &[(b"PLTE", vec![0, 0, 0, 255, 255, 255]), (b"tRNS", vec![0])],
        );
        let image = decode_png(&png).unwrap();
        assert_eq!(image.samples, vec![255, 255, 255, 0, 0, 0]);
        assert_eq!(image.alpha, Some(vec![255, 0]));
    }

    #[test]
    fn test_data_url_is_decoded() {
        let png = sample_rgba_png();
        let url = format!("data:image/png;base64,{}", STANDARD.encode(&png));
        let image = Signature::DataUrl(url).decode().unwrap();
        assert_eq!(image.width, 2);

        let bare = Signature::DataUrl(STANDARD.encode(&png));
        assert!(bare.decode().is_ok());
    }

    #[test]
    fn test_rejects_non_png() {
        assert!(matches!(decode_png(b"GIF89a..."), Err(SignatureError::NotPng)));
        assert!(matches!(
            Signature::DataUrl("data:image/png;base64,@@@".into()).decode(),
            Err(SignatureError::Base64(_))
        ));
    }

    #[test]
    fn test_rejects_truncated_and_unsupported() {
        let png = sample_rgba_png();
        assert!(decode_png(&png[..20]).is_err());

        let mut ihdr = Vec::new();
        ihdr.extend_from_slice(&1u32.to_be_bytes());
        ihdr.extend_from_slice(&1u32.to_be_bytes());
        ihdr.extend_from_slice(&[16, 2, 0, 0, 0]);
        assert!(matches!(
            Header::parse(&ihdr),
            Err(SignatureError::Unsupported { bit_depth: 16, color_type: 2 })
        ));
    }

    #[test]
    fn test_inflation_stops_at_declared_size() {
        // 1x1 gray declares two bytes of scanline data; the stream holds 8 MiB.
        let scanlines = vec![0u8; 8 * 1024 * 1024];
        let png = build_png(1, 1, 0, &scanlines, &[]);
        assert!(png.len() < 64 * 1024);
        assert!(matches!(decode_png(&png), Err(SignatureError::Oversized)));
    }

    #[test]
    fn test_short_image_data_is_truncated() {
        let png = build_png(2, 2, 0, &[0, 1, 2], &[]);
        assert!(matches!(decode_png(&png), Err(SignatureError::Truncated)));
    }

    #[test]
    fn test_bad_filter_type() {
        let png = build_png(1, 1, 0, &[9, 0], &[]);
        assert!(matches!(decode_png(&png), Err(SignatureError::Filter(9))));
    }
}
