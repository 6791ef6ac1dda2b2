//! Image payload collaborator: sniffing, measuring and GDI pixel conversion

use crate::error::{EmfPlusError, EmfPlusResult};
use crate::metafile::{emf_bounds, wmf_bounds};
use crate::object::image::PixelFormat;
use crate::types::RectF;
use base64::{engine::general_purpose, Engine as _};
use image::{DynamicImage, ImageFormat, ImageOutputFormat, RgbaImage};
use std::io::Cursor;

/// Kind of payload handed to the loader
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    /// Uncompressed GDI+ pixel data described by `GdiBitmapInfo`
    Gdi,
    Png,
    Jpeg,
    Gif,
    Tiff,
    Bmp,
    Wmf,
    Emf,
    Unknown,
}

impl ContentType {
    /// Sniff a compressed raster format from its magic bytes
    pub fn sniff_raster(data: &[u8]) -> ContentType {
        match image::guess_format(data) {
            Ok(ImageFormat::Png) => ContentType::Png,
            Ok(ImageFormat::Jpeg) => ContentType::Jpeg,
            Ok(ImageFormat::Gif) => ContentType::Gif,
            Ok(ImageFormat::Tiff) => ContentType::Tiff,
            Ok(ImageFormat::Bmp) => ContentType::Bmp,
            _ => ContentType::Unknown,
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ContentType::Gdi | ContentType::Png => "image/png",
            ContentType::Jpeg => "image/jpeg",
            ContentType::Gif => "image/gif",
            ContentType::Tiff => "image/tiff",
            ContentType::Bmp => "image/bmp",
            ContentType::Wmf => "image/x-wmf",
            ContentType::Emf => "image/x-emf",
            ContentType::Unknown => "application/octet-stream",
        }
    }

    pub fn is_raster(self) -> bool {
        !matches!(self, ContentType::Wmf | ContentType::Emf | ContentType::Unknown)
    }
}

/// Layout of an uncompressed GDI+ bitmap
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GdiBitmapInfo {
    pub width: i32,
    pub height: i32,
    /// Bytes per row; negative for bottom-up rows
    pub stride: i32,
    pub pixel_format: Option<PixelFormat>,
}

/// Complete image payload (own bytes plus continuation fragments)
#[derive(Debug, Clone, Copy)]
pub struct ImageSource<'a> {
    pub content_type: ContentType,
    pub data: &'a [u8],
    pub gdi: Option<GdiBitmapInfo>,
}

/// Image ready for a canvas: encoded bytes plus their pixel size
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedImage {
    pub content_type: ContentType,
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl LoadedImage {
    pub fn bounds(&self) -> RectF {
        RectF::new(0.0, 0.0, f64::from(self.width), f64::from(self.height))
    }

    /// `data:` URI with base64 payload
    pub fn to_data_uri(&self) -> String {
        let encoded = general_purpose::STANDARD.encode(&self.data);
        format!("data:{};base64,{}", self.content_type.mime_type(), encoded)
    }
}

pub trait ImageLoader {
    fn load_image(&self, source: &ImageSource<'_>) -> EmfPlusResult<LoadedImage>;
}

/// Loader backed by the `image` crate; GDI pixel blobs are re-encoded as PNG
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultImageLoader;

impl ImageLoader for DefaultImageLoader {
    fn load_image(&self, source: &ImageSource<'_>) -> EmfPlusResult<LoadedImage> {
        match source.content_type {
            ContentType::Gdi => {
                let info = source
                    .gdi
                    .ok_or_else(|| EmfPlusError::Image("GDI content without bitmap layout".to_string()))?;
                let rgba = gdi_to_rgba(source.data, &info)?;
                let (width, height) = rgba.dimensions();
                let mut png = Vec::new();
                DynamicImage::ImageRgba8(rgba).write_to(&mut Cursor::new(&mut png), ImageOutputFormat::Png)?;
                Ok(LoadedImage {
                    content_type: ContentType::Gdi,
                    width,
                    height,
                    data: png,
                })
            }
            ContentType::Wmf | ContentType::Emf => {
                let bounds = if source.content_type == ContentType::Wmf {
                    wmf_bounds(source.data)?
                } else {
                    emf_bounds(source.data)?
                };
                let bounds = bounds.ok_or_else(|| EmfPlusError::Image("metafile without bounds".to_string()))?;
                Ok(LoadedImage {
                    content_type: source.content_type,
                    width: bounds.width.abs() as u32,
                    height: bounds.height.abs() as u32,
                    data: source.data.to_vec(),
                })
            }
            ContentType::Unknown => Err(EmfPlusError::Image("unrecognized image payload".to_string())),
            content_type => {
                let (width, height) = raster_dimensions(source.data)?;
                Ok(LoadedImage {
                    content_type,
                    width,
                    height,
                    data: source.data.to_vec(),
                })
            }
        }
    }
}

/// Pixel size of a compressed raster payload
pub fn raster_dimensions(data: &[u8]) -> EmfPlusResult<(u32, u32)> {
    let reader = image::io::Reader::new(Cursor::new(data)).with_guessed_format()?;
    Ok(reader.into_dimensions()?)
}

/// Convert 24/32bpp GDI+ pixel data (BGR(A) byte order) to RGBA
pub fn gdi_to_rgba(data: &[u8], info: &GdiBitmapInfo) -> EmfPlusResult<RgbaImage> {
    let bytes_per_pixel = match info.pixel_format {
        Some(PixelFormat::Rgb24) => 3,
        Some(PixelFormat::Rgb32) | Some(PixelFormat::Argb32) | Some(PixelFormat::Pargb32) => 4,
        other => {
            return Err(EmfPlusError::Image(format!("unsupported GDI pixel format {:?}", other)));
        }
    };
    if info.width <= 0 || info.height <= 0 {
        return Err(EmfPlusError::Image(format!(
            "invalid bitmap size {}x{}",
            info.width, info.height
        )));
    }

    let width = info.width as usize;
    let height = info.height as usize;
    let stride = info.stride.unsigned_abs() as usize;
    if stride < width * bytes_per_pixel || data.len() < stride * height {
        return Err(EmfPlusError::Image(format!(
            "bitmap data of {} bytes too short for {}x{} with stride {}",
            data.len(),
            width,
            height,
            info.stride
        )));
    }

    let mut rgba = Vec::with_capacity(width * height * 4);
    for y in 0..height {
        let row = if info.stride < 0 { height - 1 - y } else { y };
        let line = &data[row * stride..row * stride + width * bytes_per_pixel];
        for px in line.chunks_exact(bytes_per_pixel) {
            let (b, g, r) = (px[0], px[1], px[2]);
            let pixel = match info.pixel_format {
                Some(PixelFormat::Argb32) => [r, g, b, px[3]],
                Some(PixelFormat::Pargb32) => unpremultiply(r, g, b, px[3]),
                _ => [r, g, b, 255],
            };
            rgba.extend_from_slice(&pixel);
        }
    }

    RgbaImage::from_raw(info.width as u32, info.height as u32, rgba)
        .ok_or_else(|| EmfPlusError::Image("pixel buffer size mismatch".to_string()))
}

fn unpremultiply(r: u8, g: u8, b: u8, a: u8) -> [u8; 4] {
    if a == 0 {
        return [0, 0, 0, 0];
    }
    let scale = |c: u8| ((u32::from(c) * 255 + u32::from(a) / 2) / u32::from(a)).min(255) as u8;
    [scale(r), scale(g), scale(b), a]
}
