use crate::blend::div255;
use crate::buffer::{PixelBuffer, PixelFormat, PixelView};
use crate::error::BlurError;

/// Result of [`normalize`]: either the untouched source bytes (fast path)
/// or a freshly converted canonical buffer.
pub enum Normalized<'a> {
    /// The source was already canonical; same bytes, zero copy.
    Borrowed(PixelView<'a>),
    /// The source was converted into a new canonical buffer.
    Owned(PixelBuffer),
}

impl Normalized<'_> {
    /// Canonical view of the normalized pixels.
    pub fn view(&self) -> PixelView<'_> {
        match self {
            Normalized::Borrowed(view) => *view,
            Normalized::Owned(buffer) => buffer.view(),
        }
    }
}

/// Normalizes an arbitrary source bitmap into the canonical ARGB8888
/// premultiplied layout.
///
/// Sources already in the canonical layout are passed through unmodified.
/// Anything else is redrawn into a fresh `width * 4`-stride buffer:
/// channels are reordered to alpha-first, straight alpha is premultiplied,
/// and alpha-less layouts get an opaque alpha channel synthesized.
pub fn normalize<'a>(source: &PixelView<'a>) -> Result<Normalized<'a>, BlurError> {
    source.check()?;

    if source.format.is_canonical() {
        return Ok(Normalized::Borrowed(*source));
    }

    tracing::debug!(format = ?source.format, "converting source to ARGB8888");

    let width = source.width as usize;
    let bpp = source.format.bytes_per_pixel();
    let mut out = PixelBuffer::allocate(source.width, source.height, width * 4)?;

    let out_stride = out.bytes_per_row();
    let dst = out.data_mut();
    for y in 0..source.height as usize {
        let src_row = &source.data[y * source.bytes_per_row..][..width * bpp];
        let dst_row = &mut dst[y * out_stride..][..width * 4];
        for x in 0..width {
            let px = &src_row[x * bpp..][..bpp];
            let argb = match source.format {
                PixelFormat::Rgba8888 => {
                    let a = px[3] as u32;
                    [
                        px[3],
                        div255(px[0] as u32 * a) as u8,
                        div255(px[1] as u32 * a) as u8,
                        div255(px[2] as u32 * a) as u8,
                    ]
                }
                PixelFormat::Rgb888 => [255, px[0], px[1], px[2]],
                PixelFormat::Gray8 => [255, px[0], px[0], px[0]],
                // handled by the fast path above
                PixelFormat::Argb8888Premul => unreachable!(),
            };
            dst_row[x * 4..x * 4 + 4].copy_from_slice(&argb);
        }
    }

    Ok(Normalized::Owned(out))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_source_passes_through_without_copy() {
        let data = vec![42u8; 2 * 2 * 4];
        let view = PixelView::new(&data, 2, 2, 8, PixelFormat::Argb8888Premul);

        match normalize(&view).unwrap() {
            Normalized::Borrowed(out) => {
                assert!(std::ptr::eq(out.data.as_ptr(), data.as_ptr()));
                assert_eq!(out.data, &data[..]);
            }
            Normalized::Owned(_) => panic!("canonical source must not be recopied"),
        }
    }

    #[test]
    fn rgba_is_reordered_and_premultiplied() {
        // one pixel: red at half alpha
        let data = [255u8, 0, 0, 128];
        let view = PixelView::new(&data, 1, 1, 4, PixelFormat::Rgba8888);

        let Normalized::Owned(out) = normalize(&view).unwrap() else {
            panic!("straight-alpha source must be converted");
        };
        assert_eq!(out.data(), &[128, 128, 0, 0]);
        assert_eq!(out.bytes_per_row(), 4);
    }

    #[test]
    fn opaque_alpha_is_synthesized_for_rgb() {
        let data = [10u8, 20, 30];
        let view = PixelView::new(&data, 1, 1, 3, PixelFormat::Rgb888);

        let out = normalize(&view).unwrap();
        assert_eq!(out.view().data, &[255, 10, 20, 30]);
    }

    #[test]
    fn gray_expands_to_all_channels() {
        let data = [9u8, 200];
        let view = PixelView::new(&data, 2, 1, 2, PixelFormat::Gray8);

        let out = normalize(&view).unwrap();
        assert_eq!(out.view().data, &[255, 9, 9, 9, 255, 200, 200, 200]);
    }

    #[test]
    fn padded_source_stride_is_honored() {
        // 1x2 RGB rows padded to 8 bytes
        let mut data = vec![0u8; 16];
        data[0..3].copy_from_slice(&[1, 2, 3]);
        data[8..11].copy_from_slice(&[4, 5, 6]);
        let view = PixelView::new(&data, 1, 2, 8, PixelFormat::Rgb888);

        let out = normalize(&view).unwrap();
        assert_eq!(out.view().data, &[255, 1, 2, 3, 255, 4, 5, 6]);
    }

    #[test]
    fn short_source_is_rejected() {
        let data = [0u8; 3];
        let view = PixelView::new(&data, 1, 1, 4, PixelFormat::Rgba8888);
        assert!(matches!(normalize(&view), Err(BlurError::SourceUnavailable)));
    }
}
