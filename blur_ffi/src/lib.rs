use std::ffi::CStr;
use std::os::raw::c_char;

use blur_core::{
    Blend, BlendMode, BlurParameters, Color, PixelFormat, PixelView, blur, normalize,
};
use serde::Deserialize;

#[derive(Deserialize, Debug)]
struct Params {
    #[serde(default = "default_radius")]
    radius: f32,
    #[serde(default = "default_scale")]
    scale: f32,
    #[serde(default = "default_ratio")]
    ratio: f32,
    #[serde(default = "default_iterations")]
    iterations: u32,
    #[serde(default)]
    blend_color: Option<String>,
    #[serde(default)]
    blend_mode: Option<String>,
}

fn default_radius() -> f32 {
    3.0
}

fn default_scale() -> f32 {
    1.0
}

fn default_ratio() -> f32 {
    1.0
}

fn default_iterations() -> u32 {
    3
}

impl Params {
    fn to_parameters(&self) -> Option<BlurParameters> {
        let blend = match &self.blend_color {
            Some(hex) => {
                let color = Color::from_hex(hex)?;
                let mode = match self.blend_mode.as_deref() {
                    None | Some("plus-lighter") => BlendMode::PlusLighter,
                    Some("source-over") => BlendMode::SourceOver,
                    Some(_) => return None,
                };
                Some(Blend { color, mode })
            }
            None => None,
        };

        Some(BlurParameters {
            radius: self.radius,
            scale: self.scale,
            ratio: self.ratio,
            iterations: self.iterations,
            blend,
        })
    }
}

/// Blurs a straight-alpha RGBA8888 buffer in place.
///
/// `params` is a NUL-terminated TOML document (`radius`, `scale`, `ratio`,
/// `iterations`, `blend_color`, `blend_mode`); a null or empty string means
/// defaults. Returns 0 on success, 1 on failure; on failure the buffer is
/// left untouched.
#[unsafe(no_mangle)]
pub extern "C" fn blur_image(
    width: u32,
    height: u32,
    rgba_data: *mut u8,
    params: *const c_char,
) -> u32 {
    if rgba_data.is_null() {
        return 1;
    }

    let params_str = unsafe {
        if params.is_null() {
            ""
        } else {
            // SAFETY:
            // - We checked `params` is not null.
            // - FFI contract requires `params` to be a valid NUL-terminated
            //   C string that lives for the duration of this call.
            // - `from_ptr` only reads memory until the first NUL byte.
            CStr::from_ptr(params).to_str().unwrap_or("")
        }
    };

    let params: Params = match toml::from_str(params_str) {
        Ok(config) => config,
        Err(_) => {
            return 1;
        }
    };
    let Some(parameters) = params.to_parameters() else {
        return 1;
    };

    // the no-op short-circuit happens before any conversion, so the caller's
    // pixels come back bit-identical
    if parameters.is_identity() {
        return 0;
    }

    let w = width as usize;
    let h = height as usize;
    let len = w.checked_mul(h).and_then(|wh| wh.checked_mul(4));

    let Some(total_len) = len else {
        return 1;
    };

    // SAFETY:
    // - We checked `rgba_data` is not null above.
    // - FFI contract requires `rgba_data` to point to at least `total_len`
    //   writable bytes that stay valid for the duration of this call.
    // - `u8` has alignment 1, so alignment is trivially satisfied.
    // - Caller must ensure no other references to this buffer exist while
    //   this function runs (no aliasing).
    let buf = unsafe { std::slice::from_raw_parts_mut(rgba_data, total_len) };

    match blur_rgba(width, height, buf, &parameters) {
        Ok(out) => {
            write_back_rgba(buf, &out, w, h);
            0
        }
        Err(_) => 1,
    }
}

fn blur_rgba(
    width: u32,
    height: u32,
    buf: &[u8],
    parameters: &BlurParameters,
) -> Result<blur_core::PixelBuffer, blur_core::BlurError> {
    let source = PixelView::new(buf, width, height, width as usize * 4, PixelFormat::Rgba8888);
    let normalized = normalize(&source)?;
    blur(&normalized.view(), parameters)
}

/// Converts the canonical premultiplied result back into the caller's
/// straight-alpha RGBA layout.
fn write_back_rgba(buf: &mut [u8], out: &blur_core::PixelBuffer, width: usize, height: usize) {
    let stride = out.bytes_per_row();
    let data = out.data();
    for y in 0..height {
        for x in 0..width {
            let src = &data[y * stride + x * 4..][..4];
            let dst = &mut buf[(y * width + x) * 4..][..4];
            let a = src[0] as u32;
            if a == 0 {
                dst.copy_from_slice(&[0, 0, 0, 0]);
            } else {
                for c in 0..3 {
                    let pm = src[c + 1] as u32;
                    dst[c] = ((pm * 255 + a / 2) / a).min(255) as u8;
                }
                dst[3] = src[0];
            }
        }
    }
}
