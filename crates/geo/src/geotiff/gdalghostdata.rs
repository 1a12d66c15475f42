//! The GDAL structural metadata ("ghost area") that follows the TIFF header of a cloud optimized GeoTIFF.
//! <https://gdal.org/en/stable/drivers/raster/cog.html#header-ghost-area>

// TIFF header offsets where ghost data begins
pub const CLASSIC_TIFF_GHOST_DATA_OFFSET: usize = 8;
const BIGTIFF_GHOST_DATA_OFFSET: usize = 16;
// Size of the GDAL metadata header line "GDAL_STRUCTURAL_METADATA_SIZE=XXXXXX bytes\n"
const GDAL_METADATA_HEADER_LINE_SIZE: usize = 43;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CogBlockOrder {
    RowMajor,
    ColumnMajor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CogLayout {
    IfdsBeforeData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockLeader {
    SizeAsUint4,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockTrailer {
    Last4BytesRepeated,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GdalGhostData {
    pub known_incompatible_edition: bool,
    pub layout: Option<CogLayout>,
    pub block_order: Option<CogBlockOrder>,
    pub block_leader: Option<BlockLeader>,
    pub block_trailer: Option<BlockTrailer>,
}

impl GdalGhostData {
    /// The structure written by the cog writer of this crate
    pub fn cloud_optimized() -> Self {
        GdalGhostData {
            known_incompatible_edition: false,
            layout: Some(CogLayout::IfdsBeforeData),
            block_order: Some(CogBlockOrder::RowMajor),
            block_leader: Some(BlockLeader::SizeAsUint4),
            block_trailer: Some(BlockTrailer::Last4BytesRepeated),
        }
    }

    pub fn from_tiff_header_buffer(header: &[u8]) -> Option<GdalGhostData> {
        if header.len() < 4 || (&header[0..2] != b"II" && &header[0..2] != b"MM") {
            return None;
        }

        let magic = if &header[0..2] == b"II" { header[2] } else { header[3] };
        let offset = match magic {
            0x2a => CLASSIC_TIFF_GHOST_DATA_OFFSET,
            0x2b => BIGTIFF_GHOST_DATA_OFFSET,
            _ => return None,
        };

        if header.len() < offset + GDAL_METADATA_HEADER_LINE_SIZE {
            return None;
        }

        // GDAL_STRUCTURAL_METADATA_SIZE=XXXXXX bytes\n
        let first_line = std::str::from_utf8(&header[offset..offset + GDAL_METADATA_HEADER_LINE_SIZE]).ok()?;
        if !first_line.starts_with("GDAL_STRUCTURAL_METADATA_SIZE=") {
            return None;
        }

        // The header size is at bytes 30..36 (6 bytes)
        let header_size: usize = first_line[30..36].trim().parse().ok()?;

        let metadata_start = offset + GDAL_METADATA_HEADER_LINE_SIZE;
        let metadata_end = metadata_start.checked_add(header_size)?;
        if metadata_end > header.len() {
            return None;
        }

        let header_str = String::from_utf8_lossy(&header[metadata_start..metadata_end]);
        Some(parse_ghost_metadata(&header_str))
    }

    pub fn is_cog(&self) -> bool {
        self.layout == Some(CogLayout::IfdsBeforeData)
            && !self.known_incompatible_edition
            && self.block_order == Some(CogBlockOrder::RowMajor)
            && self.block_leader == Some(BlockLeader::SizeAsUint4)
            && self.block_trailer == Some(BlockTrailer::Last4BytesRepeated)
    }

    /// The `KEY=VALUE` lines of the ghost area
    pub fn to_metadata_string(&self) -> String {
        let mut lines = String::new();
        if let Some(CogLayout::IfdsBeforeData) = self.layout {
            lines.push_str("LAYOUT=IFDS_BEFORE_DATA\n");
        }

        match self.block_order {
            Some(CogBlockOrder::RowMajor) => lines.push_str("BLOCK_ORDER=ROW_MAJOR\n"),
            Some(CogBlockOrder::ColumnMajor) => lines.push_str("BLOCK_ORDER=COLUMN_MAJOR\n"),
            None => {}
        }

        if let Some(BlockLeader::SizeAsUint4) = self.block_leader {
            lines.push_str("BLOCK_LEADER=SIZE_AS_UINT4\n");
        }

        if let Some(BlockTrailer::Last4BytesRepeated) = self.block_trailer {
            lines.push_str("BLOCK_TRAILER=LAST_4_BYTES_REPEATED\n");
        }

        lines.push_str(if self.known_incompatible_edition {
            "KNOWN_INCOMPATIBLE_EDITION=YES\n"
        } else {
            "KNOWN_INCOMPATIBLE_EDITION=NO\n"
        });

        lines
    }

    /// The complete ghost area as it is stored after the TIFF header, including the size line
    pub fn to_header_bytes(&self) -> Vec<u8> {
        let metadata = self.to_metadata_string();
        let mut bytes = format!("GDAL_STRUCTURAL_METADATA_SIZE={:06} bytes\n", metadata.len()).into_bytes();
        debug_assert_eq!(bytes.len(), GDAL_METADATA_HEADER_LINE_SIZE);
        bytes.extend_from_slice(metadata.as_bytes());
        bytes
    }
}

fn parse_ghost_metadata(header_str: &str) -> GdalGhostData {
    let mut ghost_data = GdalGhostData::default();

    header_str
        .split('\n')
        .filter_map(|s| s.split_once('='))
        .for_each(|(key, value)| match key {
            "KNOWN_INCOMPATIBLE_EDITION" => {
                ghost_data.known_incompatible_edition = value.trim() != "NO";
            }
            "LAYOUT" => {
                ghost_data.layout = match value.trim() {
                    "IFDS_BEFORE_DATA" => Some(CogLayout::IfdsBeforeData),
                    _ => None,
                };
            }
            "BLOCK_ORDER" => {
                ghost_data.block_order = match value.trim() {
                    "ROW_MAJOR" => Some(CogBlockOrder::RowMajor),
                    "COLUMN_MAJOR" => Some(CogBlockOrder::ColumnMajor),
                    _ => None,
                };
            }
            "BLOCK_LEADER" => {
                ghost_data.block_leader = match value.trim() {
                    "SIZE_AS_UINT4" => Some(BlockLeader::SizeAsUint4),
                    _ => None,
                };
            }
            "BLOCK_TRAILER" => {
                ghost_data.block_trailer = match value.trim() {
                    "LAST_4_BYTES_REPEATED" => Some(BlockTrailer::Last4BytesRepeated),
                    _ => None,
                };
            }
            _ => {}
        });

    ghost_data
}
