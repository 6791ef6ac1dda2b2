//! EmfPlusImage object

use super::{GraphicsVersion, MAX_OBJECT_SIZE};
use crate::codec::ByteReader;
use crate::error::{EmfPlusError, EmfPlusResult};
use crate::image_loader::{raster_dimensions, ContentType, GdiBitmapInfo, ImageLoader, ImageSource, LoadedImage};
use crate::metafile::{emf_bounds, wmf_bounds};
use crate::types::RectF;
use log::warn;

wire_enum! {
    pub enum ImageDataType: u32 {
        Unknown = 0,
        Bitmap = 1,
        Metafile = 2,
    }
}

wire_enum! {
    pub enum BitmapDataType: u32 {
        Pixel = 0,
        Compressed = 1,
    }
}

wire_enum! {
    pub enum PixelFormat: u32 {
        Undefined = 0x0000_0000,
        Indexed1bpp = 0x0003_0101,
        Indexed4bpp = 0x0003_0402,
        Indexed8bpp = 0x0003_0803,
        Grayscale16bpp = 0x0010_1004,
        Rgb555 = 0x0002_1005,
        Rgb565 = 0x0002_1006,
        Argb1555 = 0x0006_1007,
        Rgb24 = 0x0002_1808,
        Rgb32 = 0x0002_2009,
        Argb32 = 0x0026_200A,
        Pargb32 = 0x000E_200B,
        Rgb48 = 0x0010_300C,
        Argb64 = 0x0034_400D,
        Pargb64 = 0x001A_400E,
    }
}

wire_enum! {
    pub enum MetafileType: u32 {
        Wmf = 1,
        WmfPlaceable = 2,
        Emf = 3,
        EmfPlusOnly = 4,
        EmfPlusDual = 5,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BitmapHeader {
    pub width: i32,
    pub height: i32,
    pub stride: i32,
    /// `Undefined` unless the bitmap holds raw pixels; `None` for unknown formats
    pub pixel_format: Option<PixelFormat>,
    pub bitmap_type: BitmapDataType,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetafileHeader {
    pub metafile_type: Option<MetafileType>,
    pub declared_size: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ImageKind {
    Unknown,
    Bitmap(BitmapHeader),
    Metafile(MetafileHeader),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pub version: GraphicsVersion,
    pub kind: ImageKind,
    /// Payload carried by this record; continuation fragments are appended lazily
    pub data: Vec<u8>,
}

impl Image {
    /// Decode an image header and its payload; the window must start with a
    /// valid graphics version (continuations are split off by the caller).
    pub fn decode(data: &[u8]) -> EmfPlusResult<(Self, usize)> {
        let mut reader = ByteReader::new(data);
        let image = Self::read(&mut reader)?;
        Ok((image, reader.position()))
    }

    pub(crate) fn read(reader: &mut ByteReader<'_>) -> EmfPlusResult<Self> {
        let version = GraphicsVersion::read(reader)?;
        let tag = reader.read_u32()?;
        let data_type = ImageDataType::from_raw(tag).ok_or(EmfPlusError::UnknownTag {
            what: "image data type",
            tag,
        })?;

        let kind = match data_type {
            ImageDataType::Unknown => ImageKind::Unknown,
            ImageDataType::Bitmap => {
                let width = reader.read_i32()?;
                let height = reader.read_i32()?;
                let stride = reader.read_i32()?;
                let format = reader.read_u32()?;
                let bitmap_tag = reader.read_u32()?;
                let bitmap_type = BitmapDataType::from_raw(bitmap_tag).ok_or(EmfPlusError::UnknownTag {
                    what: "bitmap data type",
                    tag: bitmap_tag,
                })?;
                let pixel_format = match bitmap_type {
                    BitmapDataType::Pixel => {
                        let pixel_format = PixelFormat::from_raw(format);
                        if pixel_format.is_none() {
                            warn!("Unknown pixel format {:#x}", format);
                        }
                        pixel_format
                    }
                    BitmapDataType::Compressed => Some(PixelFormat::Undefined),
                };
                ImageKind::Bitmap(BitmapHeader {
                    width,
                    height,
                    stride,
                    pixel_format,
                    bitmap_type,
                })
            }
            ImageDataType::Metafile => {
                let raw = reader.read_u32()?;
                let metafile_type = MetafileType::from_raw(raw);
                if metafile_type.is_none() {
                    warn!("Unknown metafile type {:#x}", raw);
                }
                ImageKind::Metafile(MetafileHeader {
                    metafile_type,
                    declared_size: reader.read_u32()?,
                })
            }
        };

        let data = reader.read_remaining(MAX_OBJECT_SIZE)?;
        Ok(Self { version, kind, data })
    }

    /// Own payload followed by every continuation fragment, in arrival order
    pub fn raw_data(&self, fragments: &[Vec<u8>]) -> Vec<u8> {
        let mut data = Vec::with_capacity(self.data.len() + fragments.iter().map(Vec::len).sum::<usize>());
        data.extend_from_slice(&self.data);
        for fragment in fragments {
            data.extend_from_slice(fragment);
        }
        data
    }

    pub fn content_type(&self, data: &[u8]) -> ContentType {
        match self.kind {
            ImageKind::Bitmap(BitmapHeader {
                bitmap_type: BitmapDataType::Pixel,
                ..
            }) => ContentType::Gdi,
            ImageKind::Bitmap(_) => ContentType::sniff_raster(data),
            ImageKind::Metafile(MetafileHeader {
                metafile_type: Some(MetafileType::Wmf | MetafileType::WmfPlaceable),
                ..
            }) => ContentType::Wmf,
            ImageKind::Metafile(MetafileHeader {
                metafile_type: Some(_), ..
            }) => ContentType::Emf,
            _ => ContentType::Unknown,
        }
    }

    fn gdi_info(&self) -> Option<GdiBitmapInfo> {
        match self.kind {
            ImageKind::Bitmap(header) if header.bitmap_type == BitmapDataType::Pixel => Some(GdiBitmapInfo {
                width: header.width,
                height: header.height,
                stride: header.stride,
                pixel_format: header.pixel_format,
            }),
            _ => None,
        }
    }

    /// Hand the complete payload to the loader; failures degrade to `None`
    pub fn load(&self, fragments: &[Vec<u8>], loader: &dyn ImageLoader) -> Option<LoadedImage> {
        let data = self.raw_data(fragments);
        let source = ImageSource {
            content_type: self.content_type(&data),
            data: &data,
            gdi: self.gdi_info(),
        };
        match loader.load_image(&source) {
            Ok(image) => Some(image),
            Err(e) => {
                warn!("Image payload of {} bytes not loadable: {}", data.len(), e);
                None
            }
        }
    }

    /// Displayed bounds, (1,1,1,1) when they cannot be determined
    pub fn bounds(&self, fragments: &[Vec<u8>]) -> RectF {
        let fallback = RectF::new(1.0, 1.0, 1.0, 1.0);
        let bounds = match self.kind {
            ImageKind::Bitmap(header) if header.bitmap_type == BitmapDataType::Pixel => Ok(Some(RectF::new(
                0.0,
                0.0,
                f64::from(header.width),
                f64::from(header.height),
            ))),
            ImageKind::Bitmap(_) => raster_dimensions(&self.raw_data(fragments))
                .map(|(w, h)| Some(RectF::new(0.0, 0.0, f64::from(w), f64::from(h)))),
            ImageKind::Metafile(header) => match header.metafile_type {
                Some(MetafileType::Wmf | MetafileType::WmfPlaceable) => wmf_bounds(&self.raw_data(fragments)),
                Some(_) => emf_bounds(&self.raw_data(fragments)),
                None => Ok(None),
            },
            ImageKind::Unknown => Ok(None),
        };
        bounds.ok().flatten().unwrap_or(fallback)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::image_loader::DefaultImageLoader;
    use byteorder::{LittleEndian, WriteBytesExt};

    pub(crate) fn bitmap_bytes(bitmap_type: u32, format: u32, width: i32, height: i32, payload: &[u8]) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.write_u32::<LittleEndian>(0xDBC0_1002).unwrap();
        buf.write_u32::<LittleEndian>(1).unwrap();
        buf.write_i32::<LittleEndian>(width).unwrap();
        buf.write_i32::<LittleEndian>(height).unwrap();
        buf.write_i32::<LittleEndian>(width * 4).unwrap();
        buf.write_u32::<LittleEndian>(format).unwrap();
        buf.write_u32::<LittleEndian>(bitmap_type).unwrap();
        buf.extend_from_slice(payload);
        buf
    }

    #[test]
    fn test_pixel_bitmap() {
        let data = bitmap_bytes(0, 0x0026_200A, 2, 2, &[0u8; 16]);
        let (image, consumed) = Image::decode(&data).unwrap();
        assert_eq!(consumed, data.len());
        assert_eq!(image.data.len(), 16);
        assert_eq!(image.bounds(&[]), RectF::new(0.0, 0.0, 2.0, 2.0));
        assert_eq!(image.content_type(&image.data), ContentType::Gdi);
        let loaded = image.load(&[], &DefaultImageLoader).unwrap();
        assert_eq!((loaded.width, loaded.height), (2, 2));
    }

    #[test]
    fn test_compressed_bitmap_forces_undefined_format() {
        let data = bitmap_bytes(1, 0x0026_200A, 0, 0, &[1, 2, 3]);
        let (image, _) = Image::decode(&data).unwrap();
        match image.kind {
            ImageKind::Bitmap(header) => assert_eq!(header.pixel_format, Some(PixelFormat::Undefined)),
            other => panic!("unexpected kind {:?}", other),
        }
        // not a real image: degrades to the fallback bounds and no loaded image
        assert_eq!(image.bounds(&[]), RectF::new(1.0, 1.0, 1.0, 1.0));
        assert!(image.load(&[], &DefaultImageLoader).is_none());
    }

    #[test]
    fn test_unknown_pixel_format_is_kept_as_none() {
        let data = bitmap_bytes(0, 0x1234, 1, 1, &[0u8; 4]);
        let (image, _) = Image::decode(&data).unwrap();
        match image.kind {
            ImageKind::Bitmap(header) => assert_eq!(header.pixel_format, None),
            other => panic!("unexpected kind {:?}", other),
        }
    }

    #[test]
    fn test_unknown_data_type_is_fatal() {
        let mut buf = Vec::new();
        buf.write_u32::<LittleEndian>(0xDBC0_1002).unwrap();
        buf.write_u32::<LittleEndian>(7).unwrap();
        assert!(matches!(Image::decode(&buf), Err(EmfPlusError::UnknownTag { .. })));
    }

    #[test]
    fn test_metafile_with_fragments() {
        let emf = crate::metafile::tests::emf_header([0, 0, 40, 30]);
        let mut buf = Vec::new();
        buf.write_u32::<LittleEndian>(0xDBC0_1002).unwrap();
        buf.write_u32::<LittleEndian>(2).unwrap();
        buf.write_u32::<LittleEndian>(3).unwrap();
        buf.write_u32::<LittleEndian>(emf.len() as u32).unwrap();
        buf.extend_from_slice(&emf[..50]);

        let (image, _) = Image::decode(&buf).unwrap();
        let fragments = vec![emf[50..].to_vec()];
        assert_eq!(image.raw_data(&fragments), emf);
        assert_eq!(image.bounds(&fragments), RectF::new(0.0, 0.0, 40.0, 30.0));
        assert_eq!(image.content_type(&emf), ContentType::Emf);
    }
}
