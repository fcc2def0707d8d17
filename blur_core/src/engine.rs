//! The blur engine: double-buffered convolution passes with a reusable
//! scratch plane and an optional blend fill over the result.

use crate::blend;
use crate::buffer::{BufferPair, PixelBuffer, PixelView, alloc_bytes};
use crate::convolve;
use crate::error::BlurError;
use crate::params::BlurParameters;

/// Blurs a canonical ARGB8888 premultiplied source into a new buffer of
/// identical width, height, and stride.
///
/// Zero iterations or a non-positive effective radius short-circuit to a
/// bit-identical copy of the source pixels; that is the intended no-op, not
/// an error. Every intermediate buffer is released on all exit paths.
pub fn blur(source: &PixelView<'_>, params: &BlurParameters) -> Result<PixelBuffer, BlurError> {
    if source.width == 0 || source.height == 0 || params.is_identity() {
        return identity_copy(source);
    }

    source.check()?;
    if !source.format.is_canonical() {
        return Err(BlurError::UnsupportedFormat(format!(
            "{:?} source must be normalized before blurring",
            source.format
        )));
    }

    let box_size = params.box_size();
    let len = source.byte_len()?;

    tracing::debug!(
        width = source.width,
        height = source.height,
        box_size,
        iterations = params.iterations,
        "running box convolution"
    );

    let mut pair = BufferPair::allocate(len)?;
    pair.front_mut().copy_from_slice(&source.data[..len]);

    // size probe first, then a single scratch allocation shared by all passes
    let scratch_len = convolve::scratch_size(source.bytes_per_row, source.height)?;
    let mut scratch = alloc_bytes(scratch_len)?;

    for _ in 0..params.iterations {
        let (front, back) = pair.split();
        convolve::convolve(&source.with_data(front), back, &mut scratch, box_size)?;
        pair.swap();
    }

    let mut out =
        PixelBuffer::from_parts(pair.into_front(), source.width, source.height, source.bytes_per_row);

    if let Some(blend) = params.blend {
        blend::fill(&mut out, blend.color, blend.mode);
    }

    Ok(out)
}

/// Owned bit-identical copy of the source pixels, stride included.
fn identity_copy(source: &PixelView<'_>) -> Result<PixelBuffer, BlurError> {
    source.check()?;
    let len = source.byte_len()?;
    let mut data = alloc_bytes(len)?;
    data.copy_from_slice(&source.data[..len]);
    Ok(PixelBuffer::from_parts(data, source.width, source.height, source.bytes_per_row))
}
