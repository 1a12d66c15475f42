//! GeoTIFF reading and cloud optimized GeoTIFF writing.

mod decoder;
mod gdalghostdata;
mod gdalmetadata;
mod metadata;
mod overview;
mod projectioninfo;
mod reader;
mod writer;

pub use gdalghostdata::{BlockLeader, BlockTrailer, CogBlockOrder, CogLayout, GdalGhostData};
pub use gdalmetadata::{GdalMetadataItem, gdal_metadata_xml, metadata_value, parse_gdal_metadata};
pub use metadata::{ChunkDataLayout, Compression, GeoTiffMetadata, RasterDataType};
pub use overview::downsample_nearest;
pub use projectioninfo::{GeoKeyDirectory, ModelType, ProjectionInfo, RasterType};
pub use reader::{BandReader, read_metadata, read_metadata_file, read_rgba};
pub use writer::{CogWriteOptions, write_cog_band, write_cog_rgba};
