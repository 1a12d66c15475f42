//! Cloud optimized GeoTIFF writing.
//!
//! The output is a classic little endian TIFF laid out the way GDAL's COG driver lays it out:
//! the header, the GDAL structural metadata ghost area, the image directories of the full resolution
//! image and its overviews, and finally the tile data with the smallest overview first.
//! Every tile is preceded by its size as a u32 and followed by a repetition of its last 4 bytes.
//!
//! # Basic Usage
//!
//! ```rust,no_run
//! use geo::{CellSize, GeoReference, Point, RasterSize};
//! use geo::geotiff::{CogWriteOptions, ProjectionInfo, write_cog_band};
//!
//! let geo_ref = GeoReference::with_top_left_origin(
//!     Some(ProjectionInfo::geographic(4326)),
//!     RasterSize::square(2),
//!     Point::new(70.0, 30.0),
//!     CellSize::square(1.0),
//!     None,
//! );
//!
//! let tiff_bytes = write_cog_band(&geo_ref, &[1.0, 2.0, f64::NAN, 4.0], &CogWriteOptions::default())?;
//! std::fs::write("output.tif", tiff_bytes)?;
//! # Ok::<(), geo::Error>(())
//! ```

use std::io::Write;

use flate2::write::ZlibEncoder;

use crate::{Error, GeoReference, RasterSize, Result};

use super::{
    Compression, GdalGhostData, GdalMetadataItem, RasterDataType,
    gdalghostdata::CLASSIC_TIFF_GHOST_DATA_OFFSET,
    gdalmetadata::gdal_metadata_xml,
    overview::downsample_nearest,
};

const TIFF_HEADER_SIZE: usize = 8;
const BLOCK_LEADER_SIZE: usize = 4;
const BLOCK_TRAILER_SIZE: usize = 4;

mod tag {
    pub const NEW_SUBFILE_TYPE: u16 = 254;
    pub const IMAGE_WIDTH: u16 = 256;
    pub const IMAGE_LENGTH: u16 = 257;
    pub const BITS_PER_SAMPLE: u16 = 258;
    pub const COMPRESSION: u16 = 259;
    pub const PHOTOMETRIC_INTERPRETATION: u16 = 262;
    pub const SAMPLES_PER_PIXEL: u16 = 277;
    pub const PLANAR_CONFIGURATION: u16 = 284;
    pub const TILE_WIDTH: u16 = 322;
    pub const TILE_LENGTH: u16 = 323;
    pub const TILE_OFFSETS: u16 = 324;
    pub const TILE_BYTE_COUNTS: u16 = 325;
    pub const EXTRA_SAMPLES: u16 = 338;
    pub const SAMPLE_FORMAT: u16 = 339;
    pub const MODEL_PIXEL_SCALE: u16 = 33550;
    pub const MODEL_TIEPOINT: u16 = 33922;
    pub const MODEL_TRANSFORMATION: u16 = 34264;
    pub const GEO_KEY_DIRECTORY: u16 = 34735;
    pub const GEO_DOUBLE_PARAMS: u16 = 34736;
    pub const GEO_ASCII_PARAMS: u16 = 34737;
    pub const GDAL_METADATA: u16 = 42112;
}

/// Options for writing cloud optimized geotiffs
#[derive(Debug, Clone)]
pub struct CogWriteOptions {
    /// Width and height of the square tiles, must be a multiple of 16
    pub tile_size: u32,
    /// Reduction factors of the overview levels
    pub overview_factors: Vec<i32>,
    /// `Deflate` or `Uncompressed`
    pub compression: Compression,
    /// Written in the GDAL_METADATA tag of the full resolution image
    pub gdal_metadata: Vec<GdalMetadataItem>,
}

impl Default for CogWriteOptions {
    fn default() -> Self {
        CogWriteOptions {
            tile_size: 256,
            overview_factors: vec![2, 4, 8, 16],
            compression: Compression::Deflate,
            gdal_metadata: vec![GdalMetadataItem::nearest_overview_resampling()],
        }
    }
}

/// Pixel type of the written image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PixelLayout {
    /// 8-bit red, green, blue and unassociated alpha samples, pixel interleaved
    Rgba8,
    /// Single band
    Band(RasterDataType),
}

impl PixelLayout {
    fn samples_per_pixel(&self) -> u16 {
        match self {
            PixelLayout::Rgba8 => 4,
            PixelLayout::Band(_) => 1,
        }
    }

    fn data_type(&self) -> RasterDataType {
        match self {
            PixelLayout::Rgba8 => RasterDataType::Uint8,
            PixelLayout::Band(data_type) => *data_type,
        }
    }

    fn bytes_per_pixel(&self) -> usize {
        self.samples_per_pixel() as usize * self.data_type().bits_per_sample() as usize / 8
    }
}

/// Writes an RGBA image (4 bytes per pixel, row major) as a cloud optimized geotiff.
/// No nodata value is written, transparency is carried by the alpha band.
pub fn write_cog_rgba(geo_reference: &GeoReference, rgba: &[u8], options: &CogWriteOptions) -> Result<Vec<u8>> {
    write_cog(geo_reference, PixelLayout::Rgba8, rgba.to_vec(), options)
}

/// Writes a single `f64` band as a cloud optimized geotiff, no nodata value is written
pub fn write_cog_band(geo_reference: &GeoReference, data: &[f64], options: &CogWriteOptions) -> Result<Vec<u8>> {
    let bytes = data.iter().flat_map(|value| value.to_le_bytes()).collect();
    write_cog(geo_reference, PixelLayout::Band(RasterDataType::Float64), bytes, options)
}

#[derive(Debug, Clone)]
enum TagData {
    Short(Vec<u16>),
    Long(Vec<u32>),
    Double(Vec<f64>),
    Ascii(String),
}

impl TagData {
    fn field_type(&self) -> u16 {
        match self {
            TagData::Ascii(_) => 2,
            TagData::Short(_) => 3,
            TagData::Long(_) => 4,
            TagData::Double(_) => 12,
        }
    }

    fn count(&self) -> usize {
        match self {
            TagData::Short(values) => values.len(),
            TagData::Long(values) => values.len(),
            TagData::Double(values) => values.len(),
            // nul terminated
            TagData::Ascii(text) => text.len() + 1,
        }
    }

    fn byte_len(&self) -> usize {
        match self {
            TagData::Short(values) => values.len() * 2,
            TagData::Long(values) => values.len() * 4,
            TagData::Double(values) => values.len() * 8,
            TagData::Ascii(text) => text.len() + 1,
        }
    }

    /// Size of the value when it does not fit in the directory entry, padded to a word boundary
    fn external_len(&self) -> usize {
        match self.byte_len() {
            len if len <= 4 => 0,
            len => len + len % 2,
        }
    }

    fn to_bytes(&self) -> Vec<u8> {
        match self {
            TagData::Short(values) => values.iter().flat_map(|v| v.to_le_bytes()).collect(),
            TagData::Long(values) => values.iter().flat_map(|v| v.to_le_bytes()).collect(),
            TagData::Double(values) => values.iter().flat_map(|v| v.to_le_bytes()).collect(),
            TagData::Ascii(text) => text.bytes().chain(std::iter::once(0)).collect(),
        }
    }
}

#[derive(Debug, Clone)]
struct IfdEntry {
    tag: u16,
    data: TagData,
}

impl IfdEntry {
    fn new(tag: u16, data: TagData) -> Self {
        IfdEntry { tag, data }
    }
}

/// An image directory with its encoded tiles
struct ImageLevel {
    size: RasterSize,
    entries: Vec<IfdEntry>,
    tiles: Vec<Vec<u8>>,
}

impl ImageLevel {
    fn ifd_byte_len(&self) -> usize {
        2 + self.entries.len() * 12 + 4 + self.entries.iter().map(|entry| entry.data.external_len()).sum::<usize>()
    }

    fn set_tile_locations(&mut self, offsets: Vec<u32>, byte_counts: Vec<u32>) {
        for entry in &mut self.entries {
            match entry.tag {
                tag::TILE_OFFSETS => entry.data = TagData::Long(offsets.clone()),
                tag::TILE_BYTE_COUNTS => entry.data = TagData::Long(byte_counts.clone()),
                _ => {}
            }
        }
    }
}

fn write_cog(geo_reference: &GeoReference, layout: PixelLayout, data: Vec<u8>, options: &CogWriteOptions) -> Result<Vec<u8>> {
    let size = geo_reference.raster_size();
    if size.is_empty() {
        return Err(Error::InvalidArgument(format!("Can not write an empty raster {size}")));
    }

    let pixel_stride = layout.bytes_per_pixel();
    if data.len() != size.cell_count() * pixel_stride {
        return Err(Error::SizeMismatch {
            size1: (size.rows.count() as usize, size.cols.count() as usize),
            size2: (data.len() / pixel_stride, 1),
        });
    }

    if options.tile_size == 0 || options.tile_size % 16 != 0 {
        return Err(Error::InvalidArgument(format!(
            "Tile size must be a multiple of 16 ({})",
            options.tile_size
        )));
    }

    let compression = match options.compression {
        Compression::Deflate => 8,
        Compression::Uncompressed => 1,
        other => {
            return Err(Error::InvalidArgument(format!("Unsupported cog compression: {other:?}")));
        }
    };

    let mut levels = Vec::with_capacity(options.overview_factors.len() + 1);
    for &factor in &options.overview_factors {
        if factor < 2 {
            return Err(Error::InvalidArgument(format!("Invalid overview factor: {factor}")));
        }

        let overview_size = size.downsampled(factor);
        let overview = downsample_nearest(&data, size, pixel_stride, overview_size);
        let tiles = encode_tiles(&overview, overview_size, pixel_stride, options)?;
        levels.push(ImageLevel {
            size: overview_size,
            entries: image_entries(overview_size, layout, compression, tiles.len(), true, options.tile_size),
            tiles,
        });
    }

    let tiles = encode_tiles(&data, size, pixel_stride, options)?;
    let mut main_entries = image_entries(size, layout, compression, tiles.len(), false, options.tile_size);
    main_entries.extend(georeference_entries(geo_reference));
    if !options.gdal_metadata.is_empty() {
        main_entries.push(IfdEntry::new(
            tag::GDAL_METADATA,
            TagData::Ascii(gdal_metadata_xml(&options.gdal_metadata)?),
        ));
    }
    main_entries.sort_by_key(|entry| entry.tag);

    levels.insert(
        0,
        ImageLevel {
            size,
            entries: main_entries,
            tiles,
        },
    );

    log::debug!(
        "Writing cog of {size} with {} overview(s): {:?}",
        levels.len() - 1,
        levels.iter().skip(1).map(|level| level.size).collect::<Vec<_>>()
    );

    assemble(levels)
}

fn image_entries(
    size: RasterSize,
    layout: PixelLayout,
    compression: u16,
    tile_count: usize,
    is_overview: bool,
    tile_size: u32,
) -> Vec<IfdEntry> {
    let samples = layout.samples_per_pixel();
    let data_type = layout.data_type();

    let mut entries = vec![
        IfdEntry::new(tag::NEW_SUBFILE_TYPE, TagData::Long(vec![u32::from(is_overview)])),
        IfdEntry::new(tag::IMAGE_WIDTH, TagData::Long(vec![size.cols.count() as u32])),
        IfdEntry::new(tag::IMAGE_LENGTH, TagData::Long(vec![size.rows.count() as u32])),
        IfdEntry::new(
            tag::BITS_PER_SAMPLE,
            TagData::Short(vec![data_type.bits_per_sample(); samples as usize]),
        ),
        IfdEntry::new(tag::COMPRESSION, TagData::Short(vec![compression])),
        IfdEntry::new(
            tag::PHOTOMETRIC_INTERPRETATION,
            TagData::Short(vec![if layout == PixelLayout::Rgba8 { 2 } else { 1 }]),
        ),
        IfdEntry::new(tag::SAMPLES_PER_PIXEL, TagData::Short(vec![samples])),
        IfdEntry::new(tag::PLANAR_CONFIGURATION, TagData::Short(vec![1])),
        IfdEntry::new(tag::TILE_WIDTH, TagData::Long(vec![tile_size])),
        IfdEntry::new(tag::TILE_LENGTH, TagData::Long(vec![tile_size])),
        IfdEntry::new(tag::TILE_OFFSETS, TagData::Long(vec![0; tile_count])),
        IfdEntry::new(tag::TILE_BYTE_COUNTS, TagData::Long(vec![0; tile_count])),
    ];

    if layout == PixelLayout::Rgba8 {
        // unassociated alpha
        entries.push(IfdEntry::new(tag::EXTRA_SAMPLES, TagData::Short(vec![2])));
    }

    entries.push(IfdEntry::new(
        tag::SAMPLE_FORMAT,
        TagData::Short(vec![data_type.sample_format(); samples as usize]),
    ));

    entries
}

fn georeference_entries(geo_reference: &GeoReference) -> Vec<IfdEntry> {
    let mut entries = Vec::new();

    let gt = geo_reference.geo_transform().coefficients();
    if geo_reference.is_north_up() {
        entries.push(IfdEntry::new(
            tag::MODEL_PIXEL_SCALE,
            TagData::Double(vec![gt[1], -gt[5], 0.0]),
        ));
        entries.push(IfdEntry::new(
            tag::MODEL_TIEPOINT,
            TagData::Double(vec![0.0, 0.0, 0.0, gt[0], gt[3], 0.0]),
        ));
    } else {
        #[rustfmt::skip]
        let transformation = vec![
            gt[1], gt[2], 0.0, gt[0],
            gt[4], gt[5], 0.0, gt[3],
            0.0, 0.0, 0.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        ];
        entries.push(IfdEntry::new(tag::MODEL_TRANSFORMATION, TagData::Double(transformation)));
    }

    if let Some(projection) = geo_reference.projection()
        && !projection.geo_keys.is_empty()
    {
        let keys = &projection.geo_keys;
        entries.push(IfdEntry::new(tag::GEO_KEY_DIRECTORY, TagData::Short(keys.directory.clone())));
        if !keys.double_params.is_empty() {
            entries.push(IfdEntry::new(tag::GEO_DOUBLE_PARAMS, TagData::Double(keys.double_params.clone())));
        }
        if let Some(ascii) = &keys.ascii_params {
            entries.push(IfdEntry::new(tag::GEO_ASCII_PARAMS, TagData::Ascii(ascii.clone())));
        }
    }

    entries
}

/// Splits the image in tiles (row major, edge tiles padded with zeros) and compresses them
fn encode_tiles(data: &[u8], size: RasterSize, pixel_stride: usize, options: &CogWriteOptions) -> Result<Vec<Vec<u8>>> {
    let tile_size = options.tile_size as usize;
    let rows = size.rows.count() as usize;
    let cols = size.cols.count() as usize;
    let tiles_down = rows.div_ceil(tile_size);
    let tiles_across = cols.div_ceil(tile_size);

    let tile_row_bytes = tile_size * pixel_stride;
    let mut tiles = Vec::with_capacity(tiles_down * tiles_across);
    for tile_row in 0..tiles_down {
        for tile_col in 0..tiles_across {
            let mut tile = vec![0u8; tile_size * tile_row_bytes];

            let first_col = tile_col * tile_size;
            let copy_cols = tile_size.min(cols - first_col);
            for row_in_tile in 0..tile_size.min(rows - tile_row * tile_size) {
                let src_start = ((tile_row * tile_size + row_in_tile) * cols + first_col) * pixel_stride;
                let dst_start = row_in_tile * tile_row_bytes;
                tile[dst_start..dst_start + copy_cols * pixel_stride]
                    .copy_from_slice(&data[src_start..src_start + copy_cols * pixel_stride]);
            }

            tiles.push(compress(tile, options.compression)?);
        }
    }

    Ok(tiles)
}

fn compress(tile: Vec<u8>, compression: Compression) -> Result<Vec<u8>> {
    match compression {
        Compression::Deflate => {
            let mut encoder = ZlibEncoder::new(Vec::with_capacity(tile.len() / 4), flate2::Compression::default());
            encoder.write_all(&tile)?;
            Ok(encoder.finish()?)
        }
        _ => Ok(tile),
    }
}

fn to_offset(value: usize) -> Result<u32> {
    u32::try_from(value).map_err(|_| Error::Runtime("Output exceeds the 4GiB limit of a classic TIFF".into()))
}

/// Lays out the directories and tiles and serializes the complete file
fn assemble(mut levels: Vec<ImageLevel>) -> Result<Vec<u8>> {
    let ghost_area = GdalGhostData::cloud_optimized().to_header_bytes();

    let first_ifd_offset = word_aligned(CLASSIC_TIFF_GHOST_DATA_OFFSET + ghost_area.len());
    let mut ifd_offsets = Vec::with_capacity(levels.len());
    let mut offset = first_ifd_offset;
    for level in &levels {
        ifd_offsets.push(offset);
        offset += level.ifd_byte_len();
    }

    // Tile data follows the directories, smallest overview first
    for level in levels.iter_mut().rev() {
        let mut offsets = Vec::with_capacity(level.tiles.len());
        let mut byte_counts = Vec::with_capacity(level.tiles.len());
        for tile in &level.tiles {
            offsets.push(to_offset(offset + BLOCK_LEADER_SIZE)?);
            byte_counts.push(to_offset(tile.len())?);
            offset += BLOCK_LEADER_SIZE + tile.len() + BLOCK_TRAILER_SIZE;
        }
        level.set_tile_locations(offsets, byte_counts);
    }
    let total_size = offset;
    to_offset(total_size)?;

    let mut out = Vec::with_capacity(total_size);
    out.extend_from_slice(b"II");
    out.extend_from_slice(&42u16.to_le_bytes());
    out.extend_from_slice(&to_offset(first_ifd_offset)?.to_le_bytes());
    debug_assert_eq!(out.len(), TIFF_HEADER_SIZE);
    out.extend_from_slice(&ghost_area);
    out.resize(first_ifd_offset, 0);

    for (index, level) in levels.iter().enumerate() {
        debug_assert_eq!(out.len(), ifd_offsets[index]);
        let next_ifd = ifd_offsets.get(index + 1).copied().unwrap_or(0);
        write_ifd(&mut out, &level.entries, to_offset(next_ifd)?)?;
    }

    for level in levels.iter().rev() {
        for tile in &level.tiles {
            out.extend_from_slice(&(tile.len() as u32).to_le_bytes());
            out.extend_from_slice(tile);
            let tail = &tile[tile.len().saturating_sub(BLOCK_TRAILER_SIZE)..];
            out.extend_from_slice(tail);
            out.extend(std::iter::repeat_n(0u8, BLOCK_TRAILER_SIZE - tail.len()));
        }
    }

    debug_assert_eq!(out.len(), total_size);
    Ok(out)
}

fn word_aligned(offset: usize) -> usize {
    offset + offset % 2
}

fn write_ifd(out: &mut Vec<u8>, entries: &[IfdEntry], next_ifd: u32) -> Result<()> {
    let ifd_offset = out.len();
    let mut external_offset = ifd_offset + 2 + entries.len() * 12 + 4;
    let mut external = Vec::new();

    out.extend_from_slice(&(entries.len() as u16).to_le_bytes());
    for entry in entries {
        out.extend_from_slice(&entry.tag.to_le_bytes());
        out.extend_from_slice(&entry.data.field_type().to_le_bytes());
        out.extend_from_slice(&to_offset(entry.data.count())?.to_le_bytes());

        let mut bytes = entry.data.to_bytes();
        if bytes.len() <= 4 {
            bytes.resize(4, 0);
            out.extend_from_slice(&bytes);
        } else {
            out.extend_from_slice(&to_offset(external_offset)?.to_le_bytes());
            if bytes.len() % 2 == 1 {
                bytes.push(0);
            }
            external_offset += bytes.len();
            external.extend_from_slice(&bytes);
        }
    }

    out.extend_from_slice(&next_ifd.to_le_bytes());
    out.extend_from_slice(&external);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutils;

    #[test]
    fn tag_data_sizes() {
        assert_eq!(TagData::Short(vec![1, 2]).external_len(), 0);
        assert_eq!(TagData::Short(vec![1, 2, 3]).external_len(), 6);
        assert_eq!(TagData::Ascii("abcd".into()).count(), 5);
        assert_eq!(TagData::Ascii("abcd".into()).external_len(), 6);
        assert_eq!(TagData::Double(vec![1.0]).external_len(), 8);
    }

    #[test]
    fn edge_tiles_are_padded() -> Result<()> {
        let options = CogWriteOptions {
            tile_size: 16,
            compression: Compression::Uncompressed,
            ..Default::default()
        };

        let data: Vec<u8> = (0..20 * 18).map(|i| (i % 251) as u8 + 1).collect();
        let size = RasterSize::with_rows_cols(crate::Rows(20), crate::Columns(18));
        let tiles = encode_tiles(&data, size, 1, &options)?;

        assert_eq!(tiles.len(), 4);
        assert!(tiles.iter().all(|tile| tile.len() == 256));
        // second tile holds columns 16 and 17 of the first 16 rows
        assert_eq!(&tiles[1][0..3], &[data[16], data[17], 0]);
        // the last tile has 4 rows of 2 columns
        assert_eq!(tiles[3][16 * 3 + 1], data[19 * 18 + 17]);
        assert_eq!(tiles[3][16 * 4], 0);
        Ok(())
    }

    #[test]
    fn directory_size_matches_serialization() -> Result<()> {
        let meta = testutils::geo_reference(3, 3);
        let mut entries = image_entries(meta.raster_size(), PixelLayout::Rgba8, 8, 1, false, 256);
        entries.extend(georeference_entries(&meta));

        let level = ImageLevel {
            size: meta.raster_size(),
            entries,
            tiles: Vec::new(),
        };

        let mut out = Vec::new();
        write_ifd(&mut out, &level.entries, 0)?;
        assert_eq!(out.len(), level.ifd_byte_len());
        Ok(())
    }

    #[test]
    fn invalid_options() {
        let meta = testutils::geo_reference(2, 2);
        let data = vec![1.0; 4];

        let options = CogWriteOptions {
            tile_size: 100,
            ..Default::default()
        };
        assert!(write_cog_band(&meta, &data, &options).is_err());

        let options = CogWriteOptions {
            compression: Compression::Lzw,
            ..Default::default()
        };
        assert!(write_cog_band(&meta, &data, &options).is_err());

        assert!(write_cog_rgba(&meta, &[0; 15], &CogWriteOptions::default()).is_err());
    }
}
