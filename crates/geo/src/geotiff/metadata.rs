use crate::{Error, GeoReference, RasterSize, Result};

use super::{GdalGhostData, GdalMetadataItem, gdalmetadata};

/// Sample type of the raster bands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RasterDataType {
    Int8,
    Uint8,
    Int16,
    Uint16,
    Int32,
    Uint32,
    Int64,
    Uint64,
    Float32,
    Float64,
}

impl RasterDataType {
    /// Data type from the tiff SampleFormat and BitsPerSample tag values
    pub fn from_sample_format(sample_format: u16, bits_per_sample: u16) -> Result<Self> {
        Ok(match (sample_format, bits_per_sample) {
            (1, 8) => RasterDataType::Uint8,
            (1, 16) => RasterDataType::Uint16,
            (1, 32) => RasterDataType::Uint32,
            (1, 64) => RasterDataType::Uint64,
            (2, 8) => RasterDataType::Int8,
            (2, 16) => RasterDataType::Int16,
            (2, 32) => RasterDataType::Int32,
            (2, 64) => RasterDataType::Int64,
            (3, 32) => RasterDataType::Float32,
            (3, 64) => RasterDataType::Float64,
            (format, bits) => {
                return Err(Error::InvalidArgument(format!(
                    "Unsupported data type: sample format {format} with {bits} bits"
                )));
            }
        })
    }

    pub fn bits_per_sample(&self) -> u16 {
        match self {
            RasterDataType::Int8 | RasterDataType::Uint8 => 8,
            RasterDataType::Int16 | RasterDataType::Uint16 => 16,
            RasterDataType::Int32 | RasterDataType::Uint32 | RasterDataType::Float32 => 32,
            RasterDataType::Int64 | RasterDataType::Uint64 | RasterDataType::Float64 => 64,
        }
    }

    pub fn sample_format(&self) -> u16 {
        match self {
            RasterDataType::Uint8 | RasterDataType::Uint16 | RasterDataType::Uint32 | RasterDataType::Uint64 => 1,
            RasterDataType::Int8 | RasterDataType::Int16 | RasterDataType::Int32 | RasterDataType::Int64 => 2,
            RasterDataType::Float32 | RasterDataType::Float64 => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkDataLayout {
    /// Square tiles of the given size
    Tiled(u32),
    /// Strips with the given number of rows
    Striped(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    Uncompressed,
    Lzw,
    Deflate,
    Zstd,
    Other(u16),
}

impl Compression {
    pub fn from_tag_value(value: u16) -> Self {
        match value {
            1 => Compression::Uncompressed,
            5 => Compression::Lzw,
            8 | 32946 => Compression::Deflate,
            50000 => Compression::Zstd,
            other => Compression::Other(other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GeoTiffMetadata {
    pub data_layout: ChunkDataLayout,
    pub band_count: u32,
    pub data_type: RasterDataType,
    pub compression: Compression,
    pub geo_reference: GeoReference,
    pub gdal_metadata: Vec<GdalMetadataItem>,
    /// Sizes of the reduced resolution images following the main image
    pub overviews: Vec<RasterSize>,
    pub ghost_data: Option<GdalGhostData>,
}

impl GeoTiffMetadata {
    pub fn is_cog(&self) -> bool {
        self.ghost_data.as_ref().is_some_and(GdalGhostData::is_cog)
    }

    pub fn gdal_metadata_value(&self, name: &str, domain: Option<&str>) -> Option<&str> {
        gdalmetadata::metadata_value(&self.gdal_metadata, name, domain)
    }
}
