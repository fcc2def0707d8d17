use crate::blend::{BlendMode, Color};

/// Color blend applied after the convolution passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Blend {
    /// Fill color.
    pub color: Color,
    /// Composite operation for the fill.
    pub mode: BlendMode,
}

/// Parameters of one blur invocation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlurParameters {
    /// Blur radius in points.
    pub radius: f32,
    /// Capture scale factor applied to the radius.
    pub scale: f32,
    /// Runtime radius attenuation in `0..=1`, used to ramp the blur without
    /// recapturing.
    pub ratio: f32,
    /// Number of convolution passes. Zero is a valid no-op.
    pub iterations: u32,
    /// Optional post-blur color blend.
    pub blend: Option<Blend>,
}

impl Default for BlurParameters {
    fn default() -> Self {
        Self { radius: 0.0, scale: 1.0, ratio: 1.0, iterations: 3, blend: None }
    }
}

impl BlurParameters {
    /// Plain radius blur with default scale, ratio, and iterations.
    pub fn with_radius(radius: f32) -> Self {
        Self { radius, ..Self::default() }
    }

    /// The effective radius after scale and attenuation.
    pub fn effective_radius(&self) -> f32 {
        self.radius * self.scale * self.ratio
    }

    /// Kernel size derived from the effective radius, forced odd so the
    /// kernel has a well-defined center.
    pub fn box_size(&self) -> u32 {
        let size = self.effective_radius() as u32;
        if size % 2 == 0 { size + 1 } else { size }
    }

    /// Whether the invocation degenerates to returning the source pixels.
    pub fn is_identity(&self) -> bool {
        self.iterations == 0 || !(self.effective_radius() > 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn box_size_is_always_odd() {
        for tenths in 0..500u32 {
            let params = BlurParameters::with_radius(tenths as f32 / 10.0);
            assert_eq!(params.box_size() % 2, 1, "radius {}", params.radius);
        }
        for scale in [1.0, 2.0, 3.0] {
            for ratio in [0.1, 0.5, 1.0] {
                let params = BlurParameters {
                    radius: 17.0,
                    scale,
                    ratio,
                    ..BlurParameters::default()
                };
                assert_eq!(params.box_size() % 2, 1);
            }
        }
    }

    #[test]
    fn fractional_radius_rounds_down_to_minimum_box() {
        assert_eq!(BlurParameters::with_radius(0.5).box_size(), 1);
        assert_eq!(BlurParameters::with_radius(3.0).box_size(), 3);
        assert_eq!(BlurParameters::with_radius(4.0).box_size(), 5);
    }

    #[test]
    fn identity_conditions() {
        assert!(BlurParameters::with_radius(0.0).is_identity());
        assert!(BlurParameters::with_radius(-2.0).is_identity());
        assert!(BlurParameters { iterations: 0, ..BlurParameters::with_radius(5.0) }.is_identity());
        assert!(BlurParameters { ratio: 0.0, ..BlurParameters::with_radius(5.0) }.is_identity());
        assert!(BlurParameters { radius: f32::NAN, ..BlurParameters::default() }.is_identity());
        assert!(!BlurParameters::with_radius(5.0).is_identity());
    }
}
