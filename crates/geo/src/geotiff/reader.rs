use std::{
    fs::File,
    io::{BufReader, Read, Seek, SeekFrom},
    path::Path,
};

use tiff::{
    ColorType,
    decoder::{Decoder, DecodingResult},
};

use crate::{Cell, DenseRaster, Error, GeoReference, RasterSize, Result, nodata, raster::RasterWindowSource};

use super::{GdalGhostData, GeoTiffMetadata, RasterDataType, decoder};

/// Bytes inspected for the GDAL structural metadata that follows the tiff header
const GHOST_DATA_PROBE_SIZE: u64 = 1024;

fn open_file(path: &Path) -> Result<BufReader<File>> {
    match File::open(path) {
        Ok(file) => Ok(BufReader::new(file)),
        Err(err) => Err(Error::IOError(std::io::Error::new(
            err.kind(),
            format!("Failed to open '{}': {err}", path.display()),
        ))),
    }
}

fn read_ghost_data<R: Read + Seek>(stream: &mut R) -> Result<Option<GdalGhostData>> {
    let mut header = Vec::with_capacity(GHOST_DATA_PROBE_SIZE as usize);
    stream.by_ref().take(GHOST_DATA_PROBE_SIZE).read_to_end(&mut header)?;
    stream.seek(SeekFrom::Start(0))?;
    Ok(GdalGhostData::from_tiff_header_buffer(&header))
}

/// Reads the metadata of the full resolution image, the overview sizes and the COG layout information
pub fn read_metadata<R: Read + Seek>(mut stream: R) -> Result<GeoTiffMetadata> {
    let ghost_data = read_ghost_data(&mut stream)?;
    let mut meta = decoder::parse_geotiff_metadata(stream)?;
    meta.ghost_data = ghost_data;
    Ok(meta)
}

pub fn read_metadata_file(path: &Path) -> Result<GeoTiffMetadata> {
    read_metadata(open_file(path)?)
}

/// Reads the full resolution image of a single band geotiff.
/// Only the tiles or strips that intersect a requested window are decoded.
/// Cells matching the nodata value of the file are converted to NaN,
/// the georeference of the returned rasters has no nodata value.
pub struct BandReader<R: Read + Seek> {
    decoder: Decoder<R>,
    geo_reference: GeoReference,
    nodata: Option<f64>,
    data_type: RasterDataType,
}

impl BandReader<BufReader<File>> {
    pub fn open(path: &Path) -> Result<Self> {
        Self::new(open_file(path)?)
    }
}

impl<R: Read + Seek> BandReader<R> {
    pub fn new(stream: R) -> Result<Self> {
        let mut decoder = decoder::create_decoder(stream)?;
        let meta = decoder::read_image_metadata(&mut decoder)?;
        if meta.band_count != 1 {
            return Err(Error::InvalidArgument(format!(
                "Expected a single band raster, got {} bands",
                meta.band_count
            )));
        }

        let mut geo_reference = meta.geo_reference;
        let nodata = geo_reference.nodata();
        geo_reference.set_nodata(None);
        log::debug!(
            "Opened band of {} ({:?} {:?}, nodata {nodata:?})",
            geo_reference.raster_size(),
            meta.data_type,
            meta.data_layout,
        );

        Ok(BandReader {
            decoder,
            geo_reference,
            nodata,
            data_type: meta.data_type,
        })
    }

    /// Reads all cells of the image
    pub fn read(&mut self) -> Result<DenseRaster> {
        let size = self.geo_reference.raster_size();
        self.read_window(Cell::from_row_col(0, 0), size)
    }

    fn decode_chunk(&mut self, chunk_index: u32) -> Result<Vec<f64>> {
        let nodata = self.nodata;
        Ok(match self.decoder.read_chunk(chunk_index)? {
            DecodingResult::U8(v) => nodata::samples_to_f64(&v, nodata),
            DecodingResult::U16(v) => nodata::samples_to_f64(&v, nodata),
            DecodingResult::U32(v) => nodata::samples_to_f64(&v, nodata),
            DecodingResult::U64(v) => nodata::samples_to_f64(&v, nodata),
            DecodingResult::I8(v) => nodata::samples_to_f64(&v, nodata),
            DecodingResult::I16(v) => nodata::samples_to_f64(&v, nodata),
            DecodingResult::I32(v) => nodata::samples_to_f64(&v, nodata),
            DecodingResult::I64(v) => nodata::samples_to_f64(&v, nodata),
            DecodingResult::F32(v) => nodata::samples_to_f64(&v, nodata),
            DecodingResult::F64(v) => nodata::samples_to_f64(&v, nodata),
            #[allow(unreachable_patterns)]
            _ => {
                return Err(Error::InvalidArgument(format!(
                    "Unsupported raster data type: {:?}",
                    self.data_type
                )));
            }
        })
    }
}

impl<R: Read + Seek> RasterWindowSource for BandReader<R> {
    fn geo_reference(&self) -> &GeoReference {
        &self.geo_reference
    }

    fn read_window(&mut self, top_left: Cell, size: RasterSize) -> Result<DenseRaster> {
        let bottom_right = Cell::from_row_col(top_left.row + size.rows.count() - 1, top_left.col + size.cols.count() - 1);
        if size.is_empty() || !self.geo_reference.is_cell_on_map(top_left) || !self.geo_reference.is_cell_on_map(bottom_right) {
            return Err(Error::InvalidArgument(format!(
                "Window {size} at ({}, {}) is not contained in raster {}",
                top_left.row,
                top_left.col,
                self.geo_reference.raster_size()
            )));
        }

        // strips are chunks spanning the full image width
        let (chunk_width, chunk_height) = self.decoder.chunk_dimensions();
        if chunk_width == 0 || chunk_height == 0 {
            return Err(Error::Runtime("Invalid tiff chunk dimensions".into()));
        }

        let chunks_across = (self.geo_reference.columns().count() as u32).div_ceil(chunk_width);
        let rows = top_left.row as u32..bottom_right.row as u32 + 1;
        let cols = top_left.col as u32..bottom_right.col as u32 + 1;
        let window_cols = size.cols.count() as usize;

        let mut data = vec![f64::NAN; size.cell_count()];
        for chunk_row in rows.start / chunk_height..=(rows.end - 1) / chunk_height {
            for chunk_col in cols.start / chunk_width..=(cols.end - 1) / chunk_width {
                let chunk_index = chunk_row * chunks_across + chunk_col;
                let (data_width, data_height) = self.decoder.chunk_data_dimensions(chunk_index);
                let chunk = self.decode_chunk(chunk_index)?;

                let chunk_top = chunk_row * chunk_height;
                let chunk_left = chunk_col * chunk_width;
                let copy_cols = cols.start.max(chunk_left)..cols.end.min(chunk_left + data_width);
                let copy_len = copy_cols.len();

                for row in rows.start.max(chunk_top)..rows.end.min(chunk_top + data_height) {
                    let src = ((row - chunk_top) * data_width + copy_cols.start - chunk_left) as usize;
                    let dst = (row - rows.start) as usize * window_cols + (copy_cols.start - cols.start) as usize;
                    let values = chunk
                        .get(src..src + copy_len)
                        .ok_or_else(|| Error::Runtime(format!("Tiff chunk {chunk_index} is smaller than its dimensions")))?;
                    data[dst..dst + copy_len].copy_from_slice(values);
                }
            }
        }

        DenseRaster::new(self.geo_reference.sub_reference(top_left, size), data)
    }
}

/// Reads the full resolution image of an 8-bit RGBA geotiff, pixels are interleaved
pub fn read_rgba<R: Read + Seek>(stream: R) -> Result<(GeoTiffMetadata, Vec<u8>)> {
    let mut decoder = decoder::create_decoder(stream)?;
    let meta = decoder::read_image_metadata(&mut decoder)?;

    let color_type = decoder.colortype()?;
    if color_type != ColorType::RGBA(8) {
        return Err(Error::InvalidArgument(format!("Expected an RGBA image, got {color_type:?}")));
    }

    match decoder.read_image()? {
        DecodingResult::U8(pixels) => Ok((meta, pixels)),
        _ => Err(Error::InvalidArgument("Expected 8-bit RGBA samples".into())),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use approx::assert_relative_eq;
    use tiff::{
        encoder::{TiffEncoder, colortype},
        tags::Tag,
    };

    use super::*;
    use crate::{
        Point,
        geotiff::{CogWriteOptions, ProjectionInfo, RasterType, write_cog_band, write_cog_rgba},
        testutils,
    };

    #[test_log::test]
    fn read_written_band() -> Result<()> {
        let geo_ref = testutils::geo_reference(3, 2);
        let data = vec![1.0, 2.0, f64::NAN, 0.0, -5.5, 1e10];
        let tiff = write_cog_band(&geo_ref, &data, &CogWriteOptions::default())?;

        let raster = BandReader::new(Cursor::new(tiff))?.read()?;
        assert_eq!(raster.size(), geo_ref.raster_size());
        assert_relative_eq!(raster.geo_reference().geo_transform(), geo_ref.geo_transform());
        assert_eq!(raster.geo_reference().projection().and_then(|p| p.epsg()), Some(4326));
        assert!(raster.data()[2].is_nan());
        assert_eq!(raster.data()[0], 1.0);
        assert_eq!(raster.data()[4], -5.5);
        assert_eq!(raster.data()[5], 1e10);
        Ok(())
    }

    #[test_log::test]
    fn read_written_rgba() -> Result<()> {
        let geo_ref = testutils::geo_reference(1, 2);
        let pixels = vec![255, 0, 0, 255, 0, 0, 0, 0];
        let tiff = write_cog_rgba(&geo_ref, &pixels, &CogWriteOptions::default())?;

        let (meta, read_pixels) = read_rgba(Cursor::new(tiff.clone()))?;
        assert_eq!(meta.band_count, 4);
        assert_eq!(read_pixels, pixels);

        // an rgba image is not a single band raster
        assert!(BandReader::new(Cursor::new(tiff)).is_err());
        Ok(())
    }

    #[test_log::test]
    fn read_metadata_detects_cog_layout() -> Result<()> {
        let geo_ref = testutils::geo_reference(40, 33);
        let tiff = write_cog_band(&geo_ref, &vec![3.0; 40 * 33], &CogWriteOptions::default())?;

        let meta = read_metadata(Cursor::new(tiff))?;
        assert!(meta.is_cog());
        assert_eq!(meta.overviews.len(), 4);
        assert_eq!(meta.overviews[0], geo_ref.raster_size().downsampled(2));
        assert_eq!(meta.overviews[3], geo_ref.raster_size().downsampled(16));
        Ok(())
    }

    #[test_log::test]
    fn read_window_across_tiles() -> Result<()> {
        let geo_ref = testutils::geo_reference(300, 280);
        let source = DenseRaster::new(geo_ref.clone(), (0..300 * 280).map(f64::from).collect())?;
        let tiff = write_cog_band(&geo_ref, source.data(), &CogWriteOptions::default())?;

        let mut reader = BandReader::new(Cursor::new(tiff))?;
        let top_left = Cell::from_row_col(250, 240);
        let size = RasterSize::with_rows_cols(crate::Rows(40), crate::Columns(30));
        let window = reader.read_window(top_left, size)?;

        assert_eq!(window, source.window(top_left, size)?);
        assert_relative_eq!(window.geo_reference().top_left(), Point::new(310.0, -220.0));
        assert_eq!(reader.read()?, source);
        assert!(reader.read_window(Cell::from_row_col(290, 0), RasterSize::square(20)).is_err());
        Ok(())
    }

    #[test_log::test]
    fn read_striped_u8_with_nodata() -> Result<()> {
        let mut tiff = Cursor::new(Vec::new());
        {
            let mut encoder = TiffEncoder::new(&mut tiff)?;
            let mut image = encoder.new_image::<colortype::Gray8>(3, 5)?;
            image.rows_per_strip(2)?;
            image.encoder().write_tag(Tag::ModelPixelScaleTag, &[0.5, 0.5, 0.0][..])?;
            image.encoder().write_tag(Tag::ModelTiepointTag, &[0.0, 0.0, 0.0, 70.0, 30.0, 0.0][..])?;
            image.encoder().write_tag(Tag::GdalNodata, "255")?;
            image.write_data(&[1, 2, 3, 4, 5, 6, 7, 8, 255, 10, 11, 12, 13, 14, 15])?;
        }
        tiff.set_position(0);

        let mut reader = BandReader::new(tiff)?;
        assert_eq!(reader.geo_reference().nodata(), None);

        let window = reader.read_window(Cell::from_row_col(1, 1), RasterSize::with_rows_cols(crate::Rows(4), crate::Columns(2)))?;
        assert_eq!(window.data()[0], 5.0);
        assert!(window.data()[3].is_nan());
        assert_eq!(&window.data()[4..], &[11.0, 12.0, 14.0, 15.0]);
        assert_relative_eq!(window.geo_reference().top_left(), Point::new(70.5, 29.5));
        Ok(())
    }

    #[test_log::test]
    fn pixel_is_point_is_shifted_to_cell_corners() -> Result<()> {
        let mut geo_ref = testutils::geo_reference(4, 4);
        let mut projection = ProjectionInfo::geographic(4326);
        projection.geo_keys.set_raster_type(RasterType::PixelIsPoint);
        geo_ref.set_projection(Some(projection));
        let tiff = write_cog_band(&geo_ref, &[1.0; 16], &CogWriteOptions::default())?;

        let meta = read_metadata(Cursor::new(tiff))?;
        assert_relative_eq!(meta.geo_reference.top_left(), Point::new(69.5, 30.5));
        assert_relative_eq!(meta.geo_reference.cell_size(), geo_ref.cell_size());
        let keys = meta.geo_reference.projection().map(|p| p.geo_keys.raster_type());
        assert_eq!(keys, Some(RasterType::PixelIsArea));
        Ok(())
    }

    #[test]
    fn missing_file() {
        assert!(matches!(
            BandReader::open(Path::new("/this/file/does/not/exist.tif")),
            Err(Error::IOError(_))
        ));
    }
}
