use std::io::{Read, Seek};

use tiff::{decoder::Decoder, tags::Tag};

use crate::{Columns, Error, GeoReference, GeoTransform, RasterSize, Result, Rows};

use super::{
    ChunkDataLayout, Compression, GdalMetadataItem, GeoKeyDirectory, GeoTiffMetadata, ProjectionInfo, RasterDataType,
    RasterType, gdalmetadata,
};

const GDAL_METADATA_TAG: Tag = Tag::Unknown(42112);

pub fn create_decoder<R: Read + Seek>(stream: R) -> Result<Decoder<R>> {
    Ok(Decoder::new(stream)?.with_limits(tiff::decoder::Limits::unlimited()))
}

fn is_tiled<R: Read + Seek>(decoder: &mut Decoder<R>) -> bool {
    decoder.get_chunk_type() == tiff::decoder::ChunkType::Tile
}

fn read_pixel_scale<R: Read + Seek>(decoder: &mut Decoder<R>) -> Result<(f64, f64)> {
    if let Ok(values) = decoder.get_tag_f64_vec(Tag::ModelPixelScaleTag) {
        if values.len() < 2 {
            return Err(Error::Runtime("ModelPixelScale must have at least 2 values".into()));
        }

        Ok((values[0], values[1]))
    } else {
        Err(Error::Runtime("ModelPixelScale tag not found".into()))
    }
}

fn read_tie_points<R: Read + Seek>(decoder: &mut Decoder<R>) -> Result<[f64; 6]> {
    if let Ok(values) = decoder.get_tag_f64_vec(Tag::ModelTiepointTag) {
        if values.len() < 6 {
            return Err(Error::Runtime("ModelTiepoint must have 6 values".into()));
        }

        let mut tie_points = [0.0; 6];
        tie_points.copy_from_slice(&values[0..6]);
        Ok(tie_points)
    } else {
        Err(Error::Runtime("ModelTiepoint tag not found".into()))
    }
}

fn read_model_transformation<R: Read + Seek>(decoder: &mut Decoder<R>) -> Result<[f64; 8]> {
    if let Ok(values) = decoder.get_tag_f64_vec(Tag::ModelTransformationTag) {
        if values.len() < 8 {
            return Err(Error::Runtime("ModelTransformation must have 16 values".into()));
        }

        let mut transform = [0.0; 8];
        transform.copy_from_slice(&values[0..8]);
        Ok(transform)
    } else {
        Err(Error::Runtime("ModelTransformation tag not found".into()))
    }
}

fn read_geo_transform<R: Read + Seek>(decoder: &mut Decoder<R>) -> Result<GeoTransform> {
    if let Ok(transform) = read_model_transformation(decoder) {
        return Ok(GeoTransform::new([
            transform[3],
            transform[0],
            transform[1],
            transform[7],
            transform[4],
            transform[5],
        ]));
    }

    let (pixel_scale_x, pixel_scale_y) = read_pixel_scale(decoder)?;
    if pixel_scale_x == 0.0 || pixel_scale_y == 0.0 {
        return Err(Error::Runtime("No cell sizes present in geotiff".into()));
    }

    let tie_points = read_tie_points(decoder)?;
    let cell_size_y = -pixel_scale_y;
    Ok(GeoTransform::new([
        tie_points[3] - tie_points[0] * pixel_scale_x,
        pixel_scale_x,
        0.0,
        tie_points[4] - tie_points[1] * cell_size_y,
        0.0,
        cell_size_y,
    ]))
}

fn read_nodata_value<R: Read + Seek>(decoder: &mut Decoder<R>) -> Option<f64> {
    decoder
        .get_tag_ascii_string(Tag::GdalNodata)
        .ok()
        .and_then(|nodata_str| nodata_str.trim().trim_end_matches('\0').parse::<f64>().ok())
}

fn read_projection_info<R: Read + Seek>(decoder: &mut Decoder<R>) -> Result<Option<ProjectionInfo>> {
    let Ok(directory) = decoder.get_tag_u16_vec(Tag::GeoKeyDirectoryTag) else {
        return Ok(None);
    };

    let geo_keys = GeoKeyDirectory {
        directory,
        double_params: decoder.get_tag_f64_vec(Tag::GeoDoubleParamsTag).unwrap_or_default(),
        ascii_params: decoder.get_tag_ascii_string(Tag::GeoAsciiParamsTag).ok(),
    };

    if geo_keys.is_empty() {
        return Ok(None);
    }

    Ok(Some(ProjectionInfo::from_geo_keys(geo_keys)?))
}

fn read_gdal_metadata<R: Read + Seek>(decoder: &mut Decoder<R>) -> Result<Vec<GdalMetadataItem>> {
    match decoder.get_tag_ascii_string(GDAL_METADATA_TAG) {
        Ok(xml) => gdalmetadata::parse_gdal_metadata(&xml),
        Err(_) => Ok(Vec::new()),
    }
}

fn read_raster_size<R: Read + Seek>(decoder: &mut Decoder<R>) -> Result<RasterSize> {
    let (width, height) = decoder.dimensions()?;
    Ok(RasterSize::with_rows_cols(Rows(height as i32), Columns(width as i32)))
}

fn first_tag_value<R: Read + Seek>(decoder: &mut Decoder<R>, tag: Tag, default: u16) -> u16 {
    decoder
        .get_tag_u16_vec(tag)
        .ok()
        .and_then(|values| values.first().copied())
        .unwrap_or(default)
}

fn read_data_type<R: Read + Seek>(decoder: &mut Decoder<R>) -> Result<RasterDataType> {
    let bits_per_sample = first_tag_value(decoder, Tag::BitsPerSample, 1);
    let sample_format = first_tag_value(decoder, Tag::SampleFormat, 1);
    RasterDataType::from_sample_format(sample_format, bits_per_sample)
}

/// Reads the metadata of the image directory the decoder currently points to, overviews are not collected
pub fn read_image_metadata<R: Read + Seek>(decoder: &mut Decoder<R>) -> Result<GeoTiffMetadata> {
    let data_type = read_data_type(decoder)?;
    let band_count = decoder.get_tag_u32(Tag::SamplesPerPixel).unwrap_or(1);
    let compression = Compression::from_tag_value(first_tag_value(decoder, Tag::Compression, 1));

    let data_layout = if is_tiled(decoder) {
        let tile_size = decoder.get_tag_u32(Tag::TileWidth)?;
        if tile_size != decoder.get_tag_u32(Tag::TileLength)? {
            return Err(Error::InvalidArgument("Only square tiles are supported".into()));
        }

        ChunkDataLayout::Tiled(tile_size)
    } else {
        ChunkDataLayout::Striped(decoder.get_tag_u32(Tag::RowsPerStrip).unwrap_or(u32::MAX))
    };

    let raster_size = read_raster_size(decoder)?;
    let mut geo_transform = read_geo_transform(decoder)?;
    let nodata = read_nodata_value(decoder);
    let mut projection = read_projection_info(decoder)?;
    if let Some(projection) = projection.as_mut()
        && projection.geo_keys.raster_type() == RasterType::PixelIsPoint
    {
        // cell coordinates are kept as corners, derived rasters are written as pixel is area
        geo_transform = geo_transform.pixel_is_point_to_area();
        projection.geo_keys.set_raster_type(RasterType::PixelIsArea);
    }
    let gdal_metadata = read_gdal_metadata(decoder)?;

    Ok(GeoTiffMetadata {
        data_layout,
        band_count,
        data_type,
        compression,
        geo_reference: GeoReference::new(projection, raster_size, geo_transform, nodata),
        gdal_metadata,
        overviews: Vec::new(),
        ghost_data: None,
    })
}

/// Advances over the remaining image directories and returns their sizes
pub fn read_overview_sizes<R: Read + Seek>(decoder: &mut Decoder<R>) -> Result<Vec<RasterSize>> {
    let mut overviews = Vec::new();
    while decoder.more_images() {
        decoder.next_image()?;
        overviews.push(read_raster_size(decoder)?);
    }

    Ok(overviews)
}

pub fn parse_geotiff_metadata<R: Read + Seek>(stream: R) -> Result<GeoTiffMetadata> {
    let mut decoder = create_decoder(stream)?;
    let mut metadata = read_image_metadata(&mut decoder)?;
    metadata.overviews = read_overview_sizes(&mut decoder)?;
    Ok(metadata)
}
