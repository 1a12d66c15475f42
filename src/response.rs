//! Response envelope and download naming of the layer endpoints.
//!
//! Successful responses are `{"success": 1, "data": ...}`, failures `{"success": 0, "message": ...}`.

use serde::Serialize;

use crate::{Error, RegionLabel};

pub const GEOTIFF_CONTENT_TYPE: &str = "image/tiff";

const INTERNAL_ERROR_MESSAGE: &str = "An internal error occurred while processing the request";

#[derive(Debug, Clone, Serialize)]
pub struct SuccessResponse<T> {
    pub success: u8,
    pub data: T,
}

impl<T: Serialize> SuccessResponse<T> {
    pub fn new(data: T) -> Self {
        SuccessResponse { success: 1, data }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FailureResponse {
    pub success: u8,
    pub message: String,
}

impl FailureResponse {
    pub fn new(message: impl Into<String>) -> Self {
        FailureResponse {
            success: 0,
            message: message.into(),
        }
    }

    /// Domain failures keep their message, internal errors are logged and reported with a generic message
    pub fn from_error(err: &Error) -> Self {
        if err.is_domain_failure() {
            FailureResponse::new(err.to_string())
        } else {
            log::error!("{err}");
            FailureResponse::new(INTERNAL_ERROR_MESSAGE)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputVariant {
    Colorized,
    Raw,
}

/// `{label parts joined by _}_{file name}`, with `_Raw` appended for the raw variant and spaces replaced by `_`
pub fn download_file_name(label: &RegionLabel, source_file: &str, variant: OutputVariant) -> String {
    let file_name = source_file.rsplit('/').next().unwrap_or(source_file);
    let mut name = format!("{}_{file_name}", label.file_prefix());
    if variant == OutputVariant::Raw {
        name.push_str("_Raw");
    }

    name.replace(' ', "_")
}

pub fn content_disposition(download_name: &str) -> String {
    format!("inline; filename=\"{download_name}.tif\"")
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn state_label() -> RegionLabel {
        RegionLabel::new(vec!["North Western".into(), "Sri Lanka".into()])
    }

    #[test]
    fn download_names() {
        assert_eq!(
            download_file_name(&state_label(), "hazards/drought_2050.tif", OutputVariant::Colorized),
            "North_Western_Sri_Lanka_drought_2050.tif"
        );
        assert_eq!(
            download_file_name(&RegionLabel::new(vec!["South Asia".into()]), "heat stress", OutputVariant::Raw),
            "South_Asia_heat_stress_Raw"
        );
        assert_eq!(content_disposition("South_Asia_flood"), "inline; filename=\"South_Asia_flood.tif\"");
    }

    #[test]
    fn envelope_shapes() -> crate::Result<()> {
        let success = serde_json::to_value(SuccessResponse::new(vec![1, 2]))?;
        assert_eq!(success, serde_json::json!({"success": 1, "data": [1, 2]}));

        let failure = serde_json::to_value(FailureResponse::from_error(&Error::NoDataInRegion("India".into())))?;
        assert_eq!(
            failure,
            serde_json::json!({"success": 0, "message": "No data available for the selected inputs in India"})
        );
        Ok(())
    }

    #[test]
    fn internal_errors_are_not_exposed() {
        let err = Error::IOError(std::io::Error::other("disk on fire"));
        assert_eq!(FailureResponse::from_error(&err).message, INTERNAL_ERROR_MESSAGE);

        let err = Error::RasterFileNotFound(PathBuf::from("/data/secret/path.tif"));
        assert_eq!(
            FailureResponse::from_error(&err).message,
            "The requested raster data file is unavailable"
        );
    }
}
