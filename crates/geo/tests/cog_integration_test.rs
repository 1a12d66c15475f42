use approx::assert_relative_eq;
use geo::{
    CellSize, Columns, DenseRaster, GeoReference, Point, RasterSize, Result, Rows,
    geotiff::{self, BandReader, ChunkDataLayout, CogWriteOptions, Compression, ProjectionInfo, RasterDataType},
    raster::algo::clip_to_polygons,
    vector::io::read_boundary,
};
use tempfile::TempDir;

/// 600 x 520 raster covering part of South Asia with 1/32 degree cells
fn test_raster() -> Result<DenseRaster> {
    let geo_ref = GeoReference::with_top_left_origin(
        Some(ProjectionInfo::geographic(4326)),
        RasterSize::with_rows_cols(Rows(600), Columns(520)),
        Point::new(68.0, 37.0),
        CellSize::square(0.03125),
        None,
    );

    let data = (0..600 * 520).map(|i| f64::from((i % 7) as u8)).collect();
    DenseRaster::new(geo_ref, data)
}

#[test_log::test]
fn written_cog_is_valid() -> Result<()> {
    let tmp = TempDir::new()?;
    let path = tmp.path().join("hazard.tif");

    let raster = test_raster()?;
    let tiff = geotiff::write_cog_band(raster.geo_reference(), raster.data(), &CogWriteOptions::default())?;
    std::fs::write(&path, tiff)?;

    let meta = geotiff::read_metadata_file(&path)?;
    assert!(meta.is_cog());
    assert_eq!(meta.data_layout, ChunkDataLayout::Tiled(256));
    assert_eq!(meta.compression, Compression::Deflate);
    assert_eq!(meta.data_type, RasterDataType::Float64);
    assert_eq!(meta.band_count, 1);
    assert_eq!(meta.geo_reference.nodata(), None);
    assert_eq!(meta.gdal_metadata_value("resampling", Some("rio_overview")), Some("nearest"));
    assert_eq!(
        meta.overviews,
        vec![
            RasterSize::with_rows_cols(Rows(300), Columns(260)),
            RasterSize::with_rows_cols(Rows(150), Columns(130)),
            RasterSize::with_rows_cols(Rows(75), Columns(65)),
            RasterSize::with_rows_cols(Rows(38), Columns(33)),
        ]
    );
    assert_relative_eq!(meta.geo_reference.geo_transform(), raster.geo_reference().geo_transform());

    let read_back = BandReader::open(&path)?.read()?;
    assert_eq!(read_back.data(), raster.data());
    Ok(())
}

#[test_log::test]
fn clip_raster_from_file() -> Result<()> {
    let tmp = TempDir::new()?;
    let raster_path = tmp.path().join("hazard.tif");
    let boundary_path = tmp.path().join("boundary.geojson");

    let raster = test_raster()?;
    std::fs::write(
        &raster_path,
        geotiff::write_cog_band(raster.geo_reference(), raster.data(), &CogWriteOptions::default())?,
    )?;
    std::fs::write(
        &boundary_path,
        r#"{
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": { "name": "square" },
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[70.0, 30.0], [71.0, 30.0], [71.0, 31.0], [70.0, 31.0], [70.0, 30.0]]]
                }
            }]
        }"#,
    )?;

    let boundary = read_boundary(&boundary_path)?;
    let mut hazard = BandReader::open(&raster_path)?;
    let clipped = clip_to_polygons(&mut hazard, &boundary.polygons)?.expect("boundary overlaps the raster");

    assert_eq!(clipped.size(), RasterSize::with_rows_cols(Rows(32), Columns(32)));
    assert_relative_eq!(clipped.geo_reference().top_left(), Point::new(70.0, 31.0));
    // every seventh value is zero and therefore masked
    assert!(clipped.valid_count() < 1024);
    assert!(clipped.valid_count() > 800);
    Ok(())
}
