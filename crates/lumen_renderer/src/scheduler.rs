//! Parallel tiled rendering scheduler.
//!
//! The image is split into contiguous row bands, one per worker. Each worker
//! renders its band into a private buffer with read-only access to the scene
//! and camera, then merges the result into the shared framebuffer under a
//! single coarse lock. The same lock guards the rows-remaining counter used
//! for progress reporting.

use std::sync::Mutex;

use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;

use crate::integrator::render_pixel;
use crate::{Camera, FrameBuffer, Hittable, RenderConfig};

/// A contiguous block of image rows assigned to one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowBand {
    /// Index of this band in the partition
    pub index: usize,
    /// First image row of the band
    pub row_start: u32,
    /// Number of rows in the band
    pub row_count: u32,
}

/// Split `height` rows into one contiguous band per worker.
///
/// Integer division sizes the bands; the final band absorbs the remainder
/// and can be larger than the rest. This can unbalance load, which is a
/// known limitation, not a correctness issue.
pub fn partition_rows(height: u32, workers: usize) -> Vec<RowBand> {
    let workers = (workers.max(1) as u32).min(height.max(1));
    let base = height / workers;

    (0..workers)
        .map(|i| {
            let row_start = i * base;
            let row_count = if i == workers - 1 {
                height - row_start
            } else {
                base
            };
            RowBand {
                index: i as usize,
                row_start,
                row_count,
            }
        })
        .collect()
}

/// Render one band into a private buffer of channel sums, row-major.
///
/// Pure compute: no locks, no shared writes. The band owns its generator,
/// seeded from the config's base seed and the band index, so workers draw
/// independent sample streams.
fn render_band(
    band: &RowBand,
    camera: &Camera,
    world: &dyn Hittable,
    config: &RenderConfig,
) -> Vec<f32> {
    let mut rng = StdRng::seed_from_u64(config.seed.wrapping_add(band.index as u64));
    let mut local = Vec::with_capacity((band.row_count * camera.image_width * 3) as usize);

    for y in band.row_start..band.row_start + band.row_count {
        for x in 0..camera.image_width {
            let sum = render_pixel(camera, world, x, y, config, &mut rng);
            local.extend_from_slice(&[sum.x, sum.y, sum.z]);
        }
    }

    local
}

/// Render the scene across the rayon pool and return the merged framebuffer.
///
/// Fork-join: one task per row band, all joined before this returns. The
/// compute phase shares only `&Camera` and `&dyn Hittable`, both immutable;
/// the merge phase serializes on one mutex so framebuffer writes and the
/// progress counter never interleave. A panicking worker aborts the whole
/// render; there is no partial-failure recovery.
pub fn render(camera: &Camera, world: &dyn Hittable, config: &RenderConfig) -> FrameBuffer {
    let width = camera.image_width;
    let height = camera.image_height;
    let bands = partition_rows(height, rayon::current_num_threads());

    info!(
        "rendering {}x{} at {} spp across {} row bands",
        width,
        height,
        config.samples_per_pixel,
        bands.len()
    );

    struct Merge {
        frame: FrameBuffer,
        rows_remaining: u32,
    }

    let merge_lock = Mutex::new(Merge {
        frame: FrameBuffer::new(width, height),
        rows_remaining: height,
    });

    bands.par_iter().for_each(|band| {
        let local = render_band(band, camera, world, config);

        let mut merge = merge_lock.lock().unwrap();
        merge.frame.write_rows(band.row_start, &local);
        merge.rows_remaining -= band.row_count;
        debug!(
            "band {} merged, {} rows remaining",
            band.index, merge.rows_remaining
        );
    });

    merge_lock.into_inner().unwrap().frame
}
