use clap::Parser;
use image::{ImageBuffer, Rgba};
use std::path::{Path, PathBuf};
use std::time::Duration;

use blur_core::{
    BlurParameters, PixelBuffer, PixelFormat, PixelView, RadiusAnimation, blur, normalize,
};
use blur_tool::config::BlurConfig;
use blur_tool::error::AppError;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser, Debug)]
#[command(name = "blur_tool")]
struct Args {
    /// path to input PNG
    #[arg(long)]
    input: String,

    /// path to output PNG
    #[arg(long)]
    output: String,

    /// path to TOML params file (radius, scale, ratio, iterations, blend)
    #[arg(long)]
    params: Option<String>,

    /// blur radius, overriding the params file
    #[arg(long)]
    radius: Option<f32>,

    /// render an animated radius ramp with this many frames
    #[arg(long, requires = "target_radius")]
    frames: Option<u32>,

    /// radius the animated ramp ends at
    #[arg(long)]
    target_radius: Option<f32>,
}

fn main() -> Result<(), AppError> {
    init_tracing();

    let args = Args::parse();

    if !Path::new(&args.input).exists() {
        return Err(AppError::MissingInput(args.input));
    }

    let config = match &args.params {
        Some(path) => {
            if !Path::new(path).exists() {
                return Err(AppError::MissingParams(path.clone()));
            }
            BlurConfig::from_toml(&std::fs::read_to_string(path)?)?
        }
        None => BlurConfig::default(),
    };
    let mut params = config.into_parameters()?;
    if let Some(radius) = args.radius {
        params.radius = radius;
    }

    let img = image::open(&args.input)?;
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    let data: Vec<u8> = rgba.into_raw();

    tracing::info!(
        width,
        height,
        input_file = args.input,
        radius = params.radius,
        iterations = params.iterations,
        "blurring.."
    );

    match (args.frames, args.target_radius) {
        (Some(frames), Some(target)) if frames > 0 => {
            render_ramp(&args.output, &data, width, height, params, target, frames)
        }
        _ => {
            let pixels = render(&data, width, height, &params)?;
            save(&args.output, width, height, pixels)?;
            tracing::info!(output_file = args.output, "output file saved");
            Ok(())
        }
    }
}

/// Renders `frames` outputs ramping the radius from the configured value to
/// `target`, one PNG per frame next to the output path.
fn render_ramp(
    output: &str,
    data: &[u8],
    width: u32,
    height: u32,
    params: BlurParameters,
    target: f32,
    frames: u32,
) -> Result<(), AppError> {
    let duration = Duration::from_secs(1);
    let mut animation = RadiusAnimation::new(params.radius, target, duration);
    let step = Duration::from_secs_f32(1.0 / frames as f32);

    for index in 0..frames {
        // the final tick deliberately overshoots; the animation saturates at
        // the target, so the last frame lands on it exactly
        let radius =
            if index + 1 == frames { animation.tick(duration) } else { animation.tick(step) };
        let frame_params = BlurParameters { radius, ..params };
        let pixels = render(data, width, height, &frame_params)?;
        let path = frame_path(output, index);
        save(&path, width, height, pixels)?;
        tracing::info!(
            frame = index,
            radius = frame_params.radius,
            output_file = path.display().to_string(),
            "frame saved"
        );
    }
    Ok(())
}

/// One pass through the pipeline: normalize, blur, and convert back to the
/// straight-alpha layout the encoder expects.
fn render(
    data: &[u8],
    width: u32,
    height: u32,
    params: &BlurParameters,
) -> Result<Vec<u8>, AppError> {
    if params.is_identity() {
        return Ok(data.to_vec());
    }
    let source = PixelView::new(data, width, height, width as usize * 4, PixelFormat::Rgba8888);
    let normalized = normalize(&source)?;
    let blurred = blur(&normalized.view(), params)?;
    Ok(straight_rgba(&blurred))
}

/// Unpremultiplies the canonical result into tightly packed RGBA8.
fn straight_rgba(buffer: &PixelBuffer) -> Vec<u8> {
    let width = buffer.width() as usize;
    let height = buffer.height() as usize;
    let stride = buffer.bytes_per_row();
    let data = buffer.data();

    let mut out = vec![0u8; width * height * 4];
    for y in 0..height {
        for x in 0..width {
            let src = &data[y * stride + x * 4..][..4];
            let dst = &mut out[(y * width + x) * 4..][..4];
            let a = src[0] as u32;
            if a > 0 {
                for c in 0..3 {
                    dst[c] = ((src[c + 1] as u32 * 255 + a / 2) / a).min(255) as u8;
                }
                dst[3] = src[0];
            }
        }
    }
    out
}

fn save(path: impl AsRef<Path>, width: u32, height: u32, pixels: Vec<u8>) -> Result<(), AppError> {
    let out: ImageBuffer<Rgba<u8>, Vec<u8>> =
        ImageBuffer::from_raw(width, height, pixels).expect("Invalid RGBA buffer length");
    out.save(path)?;
    Ok(())
}

fn frame_path(output: &str, index: u32) -> PathBuf {
    let path = Path::new(output);
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("frame");
    let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("png");
    path.with_file_name(format!("{stem}-{index:03}.{ext}"))
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();
}
