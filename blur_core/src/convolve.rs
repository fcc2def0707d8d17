//! 2D box convolution over ARGB8888 planes.
//!
//! One [`convolve`] call applies a full square box kernel as a separable
//! horizontal-then-vertical sweep through a caller-provided scratch plane.
//! The scratch is sized once via [`scratch_size`], allocated by the caller,
//! and reused across iterations.
//!
//! Boundary policy is edge-extend: window samples past the plane edge reuse
//! the nearest edge pixel, and the divisor stays the full kernel width, so
//! uniform regions are exactly invariant under any number of passes.

use crate::buffer::PixelView;
use crate::error::BlurError;

/// Required scratch length in bytes for a plane of the given stride and
/// height. Pure sizing probe; call once, allocate, then reuse the scratch
/// for every pass.
pub fn scratch_size(bytes_per_row: usize, height: u32) -> Result<usize, BlurError> {
    bytes_per_row
        .checked_mul(height as usize)
        .ok_or(BlurError::Allocation(usize::MAX))
}

/// Runs one box-convolution pass from `src` into `dst`.
///
/// `box_size` must be odd; a box of 1 is an exact identity copy. `dst` uses
/// the source's stride. Only the `width * 4` pixel bytes of each scanline
/// are written; stride padding is left alone.
///
/// # Panics
///
/// Panics if `box_size` is even, or if `dst` or `scratch` is smaller than
/// [`scratch_size`] reports for the plane.
pub fn convolve(
    src: &PixelView<'_>,
    dst: &mut [u8],
    scratch: &mut [u8],
    box_size: u32,
) -> Result<(), BlurError> {
    src.check()?;
    let plane = scratch_size(src.bytes_per_row, src.height)?;
    assert!(box_size % 2 == 1, "box size must be odd");
    assert!(dst.len() >= plane, "destination smaller than probed plane size");
    assert!(scratch.len() >= plane, "scratch smaller than probed plane size");

    let width = src.width as usize;
    let height = src.height as usize;
    if width == 0 || height == 0 {
        return Ok(());
    }

    let radius = (box_size / 2) as usize;
    let stride = src.bytes_per_row;

    horizontal_pass(src.data, scratch, width, height, stride, radius);
    vertical_pass(scratch, dst, width, height, stride, radius);
    Ok(())
}

/// Rounded average of a window sum.
#[inline]
fn average(sum: u32, window: u32) -> u8 {
    ((sum + window / 2) / window) as u8
}

fn horizontal_pass(
    src: &[u8],
    dst: &mut [u8],
    width: usize,
    height: usize,
    stride: usize,
    radius: usize,
) {
    let window = (2 * radius + 1) as u32;
    let last = width - 1;

    for y in 0..height {
        let row = &src[y * stride..][..width * 4];
        let out = &mut dst[y * stride..][..width * 4];

        if radius == 0 {
            out.copy_from_slice(row);
            continue;
        }

        // Seed the window for x = 0; indices past either edge clamp to the
        // nearest pixel, keeping the divisor constant.
        let mut sum = [0u32; 4];
        for k in -(radius as isize)..=(radius as isize) {
            let i = k.clamp(0, last as isize) as usize * 4;
            for c in 0..4 {
                sum[c] += row[i + c] as u32;
            }
        }

        for x in 0..width {
            let o = x * 4;
            for c in 0..4 {
                out[o + c] = average(sum[c], window);
            }

            // Slide: the entering and leaving samples clamp independently,
            // which keeps the running sum exact at both edges.
            let add = (x + radius + 1).min(last) * 4;
            let sub = x.saturating_sub(radius) * 4;
            for c in 0..4 {
                sum[c] += row[add + c] as u32;
                sum[c] -= row[sub + c] as u32;
            }
        }
    }
}

fn vertical_pass(
    src: &[u8],
    dst: &mut [u8],
    width: usize,
    height: usize,
    stride: usize,
    radius: usize,
) {
    let window = (2 * radius + 1) as u32;
    let last = height - 1;

    if radius == 0 {
        for y in 0..height {
            dst[y * stride..][..width * 4].copy_from_slice(&src[y * stride..][..width * 4]);
        }
        return;
    }

    for x in 0..width {
        let col = x * 4;

        let mut sum = [0u32; 4];
        for k in -(radius as isize)..=(radius as isize) {
            let i = k.clamp(0, last as isize) as usize * stride + col;
            for c in 0..4 {
                sum[c] += src[i + c] as u32;
            }
        }

        for y in 0..height {
            let o = y * stride + col;
            for c in 0..4 {
                dst[o + c] = average(sum[c], window);
            }

            let add = (y + radius + 1).min(last) * stride + col;
            let sub = y.saturating_sub(radius) * stride + col;
            for c in 0..4 {
                sum[c] += src[add + c] as u32;
                sum[c] -= src[sub + c] as u32;
            }
        }
    }
}
