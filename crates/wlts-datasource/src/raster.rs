//! In-memory GeoTIFF decoding and point sampling

use std::io::Cursor;

use tiff::decoder::{Decoder, DecodingResult};
use tiff::tags::Tag;
use wlts_core::error::{Result, WltsError};

fn decode_error(e: impl std::fmt::Display) -> WltsError {
    WltsError::Serialization(format!("Invalid GeoTIFF: {}", e))
}

/// Affine map from pixel `(col, row)` to model `(x, y)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoTransform {
    pub origin_x: f64,
    pub origin_y: f64,
    pub col_x: f64,
    pub row_x: f64,
    pub col_y: f64,
    pub row_y: f64,
}

impl GeoTransform {
    /// North-up transform from a tiepoint and pixel scale
    pub fn from_tiepoint(tiepoint: &[f64], scale: &[f64]) -> Option<Self> {
        let [i, j, _, x, y, ..] = *tiepoint else { return None };
        let [sx, sy, ..] = *scale else { return None };
        if sx == 0.0 || sy == 0.0 {
            return None;
        }
        Some(Self {
            origin_x: x - i * sx,
            origin_y: y + j * sy,
            col_x: sx,
            row_x: 0.0,
            col_y: 0.0,
            row_y: -sy,
        })
    }

    /// Transform from a row-major 4x4 `ModelTransformation` matrix
    pub fn from_matrix(matrix: &[f64]) -> Option<Self> {
        if matrix.len() < 8 {
            return None;
        }
        Some(Self {
            origin_x: matrix[3],
            origin_y: matrix[7],
            col_x: matrix[0],
            row_x: matrix[1],
            col_y: matrix[4],
            row_y: matrix[5],
        })
    }

    /// Fractional pixel position of a model coordinate
    pub fn to_pixel(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let det = self.col_x * self.row_y - self.row_x * self.col_y;
        if det == 0.0 {
            return None;
        }
        let dx = x - self.origin_x;
        let dy = y - self.origin_y;
        let col = (self.row_y * dx - self.row_x * dy) / det;
        let row = (self.col_x * dy - self.col_y * dx) / det;
        Some((col, row))
    }
}

/// A decoded single-image GeoTIFF
#[derive(Debug, Clone)]
pub struct GeoRaster {
    pub width: u32,
    pub height: u32,
    pub samples_per_pixel: usize,
    pub transform: GeoTransform,
    data: Vec<f64>,
}

impl GeoRaster {
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut decoder = Decoder::new(Cursor::new(bytes)).map_err(decode_error)?;
        let (width, height) = decoder.dimensions().map_err(decode_error)?;

        let transform = match decoder.get_tag_f64_vec(Tag::ModelTransformationTag) {
            Ok(matrix) => GeoTransform::from_matrix(&matrix),
            Err(_) => {
                let tiepoint =
                    decoder.get_tag_f64_vec(Tag::ModelTiepointTag).map_err(decode_error)?;
                let scale =
                    decoder.get_tag_f64_vec(Tag::ModelPixelScaleTag).map_err(decode_error)?;
                GeoTransform::from_tiepoint(&tiepoint, &scale)
            }
        }
        .ok_or_else(|| decode_error("degenerate georeferencing"))?;

        let data = to_f64(decoder.read_image().map_err(decode_error)?);
        let pixels = width as usize * height as usize;
        if pixels == 0 || data.len() < pixels {
            return Err(decode_error("image holds no pixels"));
        }

        Ok(Self { width, height, samples_per_pixel: data.len() / pixels, transform, data })
    }

    /// First-band value at a model coordinate, `None` outside the raster
    pub fn sample(&self, x: f64, y: f64) -> Option<f64> {
        let (col, row) = self.transform.to_pixel(x, y)?;
        if !(0.0..self.width as f64).contains(&col) || !(0.0..self.height as f64).contains(&row) {
            return None;
        }
        let index = (row as usize * self.width as usize + col as usize) * self.samples_per_pixel;
        self.data.get(index).copied().filter(|v| !v.is_nan())
    }
}

fn to_f64(result: DecodingResult) -> Vec<f64> {
    match result {
        DecodingResult::U8(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::U16(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::U32(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::U64(v) => v.into_iter().map(|x| x as f64).collect(),
        DecodingResult::I8(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::I16(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::I32(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::I64(v) => v.into_iter().map(|x| x as f64).collect(),
        DecodingResult::F32(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::F64(v) => v,
    }
}

/// Text form of a sampled value: integral values print without a fraction
pub fn format_sample(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use tiff::encoder::{colortype, TiffEncoder};

    /// 4x4 Gray8 GeoTIFF, origin (-66.04, -9.08), 0.005 degree pixels.
    /// Pixel values are `row * 10 + col`.
    pub(crate) fn sample_geotiff() -> Vec<u8> {
        let mut buffer = Cursor::new(Vec::new());
        {
            let mut encoder = TiffEncoder::new(&mut buffer).unwrap();
            let mut image = encoder.new_image::<colortype::Gray8>(4, 4).unwrap();
            image
                .encoder()
                .write_tag(Tag::ModelPixelScaleTag, &[0.005f64, 0.005, 0.0][..])
                .unwrap();
            image
                .encoder()
                .write_tag(Tag::ModelTiepointTag, &[0.0f64, 0.0, 0.0, -66.04, -9.08, 0.0][..])
                .unwrap();
            let data: Vec<u8> = (0..4u8).flat_map(|row| (0..4u8).map(move |col| row * 10 + col)).collect();
            image.write_data(&data).unwrap();
        }
        buffer.into_inner()
    }

    #[test]
    fn test_decode_and_sample() {
        let raster = GeoRaster::decode(&sample_geotiff()).unwrap();
        assert_eq!((raster.width, raster.height), (4, 4));
        assert_eq!(raster.samples_per_pixel, 1);

        // Second column, third row
        assert_eq!(raster.sample(-66.0325, -9.0925), Some(21.0));
        // Upper-left corner belongs to the first pixel
        assert_eq!(raster.sample(-66.04, -9.08), Some(0.0));
        // West of the raster
        assert_eq!(raster.sample(-66.05, -9.09), None);
    }

    #[test]
    fn test_undecodable_payload() {
        let err = GeoRaster::decode(b"<ServiceExceptionReport/>").unwrap_err();
        assert!(err.to_string().contains("GeoTIFF"));
    }

    #[test]
    fn test_matrix_transform_matches_tiepoint() {
        let from_tiepoint =
            GeoTransform::from_tiepoint(&[0.0, 0.0, 0.0, 100.0, 50.0, 0.0], &[2.0, 2.0, 0.0])
                .unwrap();
        let from_matrix = GeoTransform::from_matrix(&[
            2.0, 0.0, 0.0, 100.0, 0.0, -2.0, 0.0, 50.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0,
        ])
        .unwrap();
        assert_eq!(from_tiepoint, from_matrix);
        assert_eq!(from_matrix.to_pixel(103.0, 45.0), Some((1.5, 2.5)));
    }

    #[test]
    fn test_format_sample() {
        assert_eq!(format_sample(3.0), "3");
        assert_eq!(format_sample(-1.0), "-1");
        assert_eq!(format_sample(0.25), "0.25");
    }
}
