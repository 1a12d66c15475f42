//! Reduced resolution images for the overview levels of a geotiff.

use crate::RasterSize;

/// Index of the source row or column sampled by nearest neighbour resampling
fn nearest_source_index(index: usize, ratio: f64, source_len: usize) -> usize {
    (((index as f64 + 0.5) * ratio) as usize).min(source_len.saturating_sub(1))
}

/// Downsamples pixel interleaved data with nearest neighbour resampling.
/// Every pixel occupies `pixel_stride` bytes so the same code serves any sample type and band count.
pub fn downsample_nearest(data: &[u8], size: RasterSize, pixel_stride: usize, target: RasterSize) -> Vec<u8> {
    let src_rows = size.rows.count().max(0) as usize;
    let src_cols = size.cols.count().max(0) as usize;
    let dst_rows = target.rows.count().max(0) as usize;
    let dst_cols = target.cols.count().max(0) as usize;

    debug_assert_eq!(data.len(), src_rows * src_cols * pixel_stride);

    let row_ratio = src_rows as f64 / dst_rows as f64;
    let col_ratio = src_cols as f64 / dst_cols as f64;
    let source_cols: Vec<usize> = (0..dst_cols)
        .map(|col| nearest_source_index(col, col_ratio, src_cols))
        .collect();

    let mut result = Vec::with_capacity(dst_rows * dst_cols * pixel_stride);
    for row in 0..dst_rows {
        let src_row = nearest_source_index(row, row_ratio, src_rows);
        let row_data = &data[src_row * src_cols * pixel_stride..(src_row + 1) * src_cols * pixel_stride];
        for &src_col in &source_cols {
            result.extend_from_slice(&row_data[src_col * pixel_stride..(src_col + 1) * pixel_stride]);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Columns, Rows};

    #[test]
    fn downsample_by_two() {
        // 4x4 single byte pixels
        let data: Vec<u8> = (0..16).collect();
        let result = downsample_nearest(&data, RasterSize::square(4), 1, RasterSize::square(2));

        // centers of the 2x2 blocks map to source index 1 and 3
        assert_eq!(result, vec![5, 7, 13, 15]);
    }

    #[test]
    fn downsample_multi_byte_pixels() {
        let data: Vec<u8> = (0..3 * 4).flat_map(|i| [i as u8, 100 + i as u8]).collect();
        let size = RasterSize::with_rows_cols(Rows(3), Columns(4));
        let result = downsample_nearest(&data, size, 2, size.downsampled(2));

        // 3x4 -> 2x2, rows sample 0 and 2 (ratio 1.5), columns 1 and 3
        assert_eq!(result, vec![1, 101, 3, 103, 9, 109, 11, 111]);
    }

    #[test]
    fn downsample_to_single_pixel() {
        let data: Vec<u8> = (0..9).collect();
        let result = downsample_nearest(&data, RasterSize::square(3), 1, RasterSize::square(3).downsampled(16));
        assert_eq!(result, vec![4]);
    }
}
