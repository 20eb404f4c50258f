//! GeoTIFF decoding into an in-memory grid with per-axis coordinates.
use crate::error::ExtractError;
use anyhow::Result;
use std::io::{Read, Seek};
use tiff::decoder::{Decoder, DecodingResult};
use tiff::tags::Tag;

const GT_RASTER_TYPE_GEO_KEY: u64 = 1025;
const RASTER_PIXEL_IS_POINT: u64 = 2;

/// A read-only (band, x, y) grid. `xs` maps x-index to longitude and `ys`
/// maps y-index to latitude, both at pixel centres.
#[derive(Debug, Clone)]
pub struct Grid {
    width: usize,
    height: usize,
    bands: usize,
    // row-major, band-interleaved: ((y * width) + x) * bands + band
    samples: Vec<f64>,
    xs: Vec<f64>,
    ys: Vec<f64>,
    nodata: Option<f64>,
}

impl Grid {
    pub fn new(
        width: usize,
        height: usize,
        bands: usize,
        samples: Vec<f64>,
        xs: Vec<f64>,
        ys: Vec<f64>,
        nodata: Option<f64>,
    ) -> Result<Self, ExtractError> {
        if bands == 0 || samples.len() != width * height * bands {
            return Err(ExtractError::UnsupportedSampleFormat);
        }
        if xs.len() != width || ys.len() != height {
            return Err(ExtractError::MissingGeoreference(
                "coordinate arrays do not match grid size",
            ));
        }
        Ok(Self {
            width,
            height,
            bands,
            samples,
            xs,
            ys,
            nodata,
        })
    }

    pub fn from_geotiff<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut decoder = Decoder::new(reader)?;
        let (width, height) = decoder.dimensions()?;
        let (width, height) = (width as usize, height as usize);

        let transform = GeoTransform::read(&mut decoder)?;
        let nodata = read_nodata(&mut decoder)?;

        let image = decoder.read_image()?;
        let nodata = nodata.map(|nodata| nodata_as_sample_type(nodata, &image));
        let samples = samples_to_f64(image)?;
        let pixels = width * height;
        if pixels == 0 || samples.len() % pixels != 0 {
            return Err(ExtractError::UnsupportedSampleFormat.into());
        }
        let bands = samples.len() / pixels;

        let xs = (0..width).map(|i| transform.x(i)).collect();
        let ys = (0..height).map(|j| transform.y(j)).collect();

        Ok(Self::new(width, height, bands, samples, xs, ys, nodata)?)
    }

    pub fn width(self: &Self) -> usize {
        self.width
    }

    pub fn height(self: &Self) -> usize {
        self.height
    }

    pub fn bands(self: &Self) -> usize {
        self.bands
    }

    pub fn total_points(self: &Self) -> usize {
        self.width * self.height
    }

    pub fn nodata(self: &Self) -> Option<f64> {
        self.nodata
    }

    pub fn lon(self: &Self, x: usize) -> Option<f64> {
        self.xs.get(x).copied()
    }

    pub fn lat(self: &Self, y: usize) -> Option<f64> {
        self.ys.get(y).copied()
    }

    /// Sample at `(band, x, y)`, or `None` when the index is out of range or
    /// the cell holds no data.
    pub fn value(self: &Self, band: usize, x: usize, y: usize) -> Option<f64> {
        if band >= self.bands || x >= self.width || y >= self.height {
            return None;
        }
        let value = *self.samples.get((y * self.width + x) * self.bands + band)?;
        if value.is_nan() {
            return None;
        }
        match self.nodata {
            Some(nodata) if value == nodata => None,
            _ => Some(value),
        }
    }
}

/// North-up affine georeferencing.
#[derive(Debug, Clone, Copy, PartialEq)]
struct GeoTransform {
    origin_x: f64,
    origin_y: f64,
    pixel_width: f64,
    pixel_height: f64,
    // 0.5 for PixelIsArea, 0.0 for PixelIsPoint
    center_offset: f64,
}

impl GeoTransform {
    fn read<R: Read + Seek>(decoder: &mut Decoder<R>) -> Result<Self> {
        let center_offset = if is_pixel_is_point(decoder)? { 0.0 } else { 0.5 };

        let scale = find_f64_vec(decoder, Tag::ModelPixelScaleTag)?;
        let tiepoint = find_f64_vec(decoder, Tag::ModelTiepointTag)?;

        if let (Some(scale), Some(tiepoint)) = (scale, tiepoint) {
            if scale.len() < 2 || tiepoint.len() < 6 {
                return Err(ExtractError::MissingGeoreference("truncated scale or tiepoint tag").into());
            }
            let (i, j, x, y) = (tiepoint[0], tiepoint[1], tiepoint[3], tiepoint[4]);
            return Ok(Self {
                origin_x: x - i * scale[0],
                origin_y: y + j * scale[1],
                pixel_width: scale[0],
                pixel_height: scale[1],
                center_offset,
            });
        }

        let matrix = find_f64_vec(decoder, Tag::ModelTransformationTag)?
            .ok_or(ExtractError::MissingGeoreference("no tiepoint or transformation tag"))?;
        if matrix.len() < 16 {
            return Err(ExtractError::MissingGeoreference("truncated transformation tag").into());
        }
        if matrix[1] != 0.0 || matrix[4] != 0.0 {
            return Err(ExtractError::MissingGeoreference("rotated rasters are not supported").into());
        }
        Ok(Self {
            origin_x: matrix[3],
            origin_y: matrix[7],
            pixel_width: matrix[0],
            pixel_height: -matrix[5],
            center_offset,
        })
    }

    fn x(self: &Self, i: usize) -> f64 {
        self.origin_x + (i as f64 + self.center_offset) * self.pixel_width
    }

    fn y(self: &Self, j: usize) -> f64 {
        self.origin_y - (j as f64 + self.center_offset) * self.pixel_height
    }
}

fn find_f64_vec<R: Read + Seek>(decoder: &mut Decoder<R>, tag: Tag) -> Result<Option<Vec<f64>>> {
    match decoder.find_tag(tag)? {
        Some(value) => Ok(Some(value.into_f64_vec()?)),
        None => Ok(None),
    }
}

fn is_pixel_is_point<R: Read + Seek>(decoder: &mut Decoder<R>) -> Result<bool> {
    let keys = match decoder.find_tag(Tag::GeoKeyDirectoryTag)? {
        Some(value) => value.into_u64_vec()?,
        None => return Ok(false),
    };
    // header is [version, revision, minor, count], then 4-tuples of
    // [key id, tag location, count, value]
    let is_point = keys
        .get(4..)
        .unwrap_or_default()
        .chunks_exact(4)
        .any(|entry| entry[0] == GT_RASTER_TYPE_GEO_KEY && entry[1] == 0 && entry[3] == RASTER_PIXEL_IS_POINT);
    Ok(is_point)
}

fn read_nodata<R: Read + Seek>(decoder: &mut Decoder<R>) -> Result<Option<f64>> {
    let raw = match decoder.find_tag(Tag::GdalNodata)? {
        Some(value) => value.into_string()?,
        None => return Ok(None),
    };
    let raw = raw.trim_matches(char::from(0)).trim();
    match raw.parse::<f64>() {
        Ok(nodata) => Ok(Some(nodata)),
        Err(_) => {
            tracing::warn!("Ignoring unparseable GDAL_NODATA value: {:?}", raw);
            Ok(None)
        }
    }
}

/// No-data is matched in the band's own sample type, so a sentinel written
/// in decimal (`-9999.9`) still equals the rounded float32 samples.
fn nodata_as_sample_type(nodata: f64, image: &DecodingResult) -> f64 {
    match image {
        DecodingResult::F32(_) => nodata as f32 as f64,
        _ => nodata,
    }
}

fn samples_to_f64(result: DecodingResult) -> Result<Vec<f64>, ExtractError> {
    let samples = match result {
        DecodingResult::F32(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::F64(v) => v,
        DecodingResult::U8(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::U16(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::U32(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::I8(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::I16(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::I32(v) => v.into_iter().map(f64::from).collect(),
        _ => return Err(ExtractError::UnsupportedSampleFormat),
    };
    Ok(samples)
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::io::Cursor;
    use tiff::encoder::colortype::{self, ColorType};
    use tiff::encoder::{TiffEncoder, TiffValue};
    use tiff::tags::Tag;

    #[derive(Default)]
    pub struct GeoTags<'a> {
        pub pixel_scale: Option<[f64; 3]>,
        pub tiepoint: Option<[f64; 6]>,
        pub transformation: Option<[f64; 16]>,
        pub geo_keys: Option<&'a [u16]>,
        pub nodata: Option<&'a str>,
    }

    impl GeoTags<'_> {
        pub fn north_up(west: f64, north: f64, pixel_size: f64) -> Self {
            Self {
                pixel_scale: Some([pixel_size, pixel_size, 0.0]),
                tiepoint: Some([0.0, 0.0, 0.0, west, north, 0.0]),
                ..Default::default()
            }
        }
    }

    pub fn encode_image<C: ColorType>(
        width: u32,
        height: u32,
        data: &[C::Inner],
        tags: &GeoTags,
    ) -> Vec<u8>
    where
        [C::Inner]: TiffValue,
    {
        let mut buffer = Cursor::new(Vec::new());
        {
            let mut encoder = TiffEncoder::new(&mut buffer).unwrap();
            let mut image = encoder.new_image::<C>(width, height).unwrap();
            let directory = image.encoder();
            if let Some(scale) = &tags.pixel_scale {
                directory.write_tag(Tag::ModelPixelScaleTag, &scale[..]).unwrap();
            }
            if let Some(tiepoint) = &tags.tiepoint {
                directory.write_tag(Tag::ModelTiepointTag, &tiepoint[..]).unwrap();
            }
            if let Some(matrix) = &tags.transformation {
                directory.write_tag(Tag::ModelTransformationTag, &matrix[..]).unwrap();
            }
            if let Some(keys) = tags.geo_keys {
                directory.write_tag(Tag::GeoKeyDirectoryTag, keys).unwrap();
            }
            if let Some(nodata) = tags.nodata {
                directory.write_tag(Tag::GdalNodata, nodata).unwrap();
            }
            image.write_data(data).unwrap();
        }
        buffer.into_inner()
    }

    /// Single-band float32 GeoTIFF with its upper-left corner at
    /// `(west, north)` and square pixels of `pixel_size` degrees.
    pub fn encode_geotiff(
        width: u32,
        height: u32,
        west: f64,
        north: f64,
        pixel_size: f64,
        data: &[f32],
        nodata: Option<&str>,
    ) -> Vec<u8> {
        let tags = GeoTags {
            nodata,
            ..GeoTags::north_up(west, north, pixel_size)
        };
        encode_image::<colortype::Gray32Float>(width, height, data, &tags)
    }
}
