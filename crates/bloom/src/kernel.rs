use crate::BloomError;
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// Tap count used by the reference presets.
pub const DEFAULT_TAPS: usize = 15;

/// Largest tap count the shaders accept.
pub const MAX_TAPS: usize = 31;

/// Gaussian weight for a sample `n` texels from the center with spread `theta`.
pub fn gaussian(n: f32, theta: f32) -> f32 {
    (1.0 / (2.0 * PI * theta).sqrt()) * (-(n * n) / (2.0 * theta * theta)).exp()
}

/// Check that `taps` can build a symmetric kernel.
pub fn validate_taps(taps: usize) -> Result<(), BloomError> {
    if taps < 3 || taps % 2 == 0 || taps > MAX_TAPS {
        return Err(BloomError::InvalidTaps(taps));
    }
    Ok(())
}

/// Normalised, symmetric sampling kernel for one separable blur pass.
///
/// Tap 0 is the center. Taps `2i+1` and `2i+2` are a mirrored pair sitting
/// `2i + 1.5` texels out, so each bilinear fetch covers two texels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BloomKernel {
    offsets: Vec<[f32; 2]>,
    weights: Vec<f32>,
}

impl BloomKernel {
    /// Build a kernel of `taps` samples stepping `step` (texel size in UV
    /// units) along one axis.
    pub fn generate(theta: f32, taps: usize, step: [f32; 2]) -> Result<Self, BloomError> {
        validate_taps(taps)?;
        if !(theta.is_finite() && theta > 0.0) {
            return Err(BloomError::InvalidTheta(theta));
        }
        if !(step[0].is_finite() && step[1].is_finite()) {
            return Err(BloomError::InvalidStep(step));
        }

        let mut offsets = vec![[0.0_f32; 2]; taps];
        let mut weights = vec![0.0_f32; taps];

        weights[0] = gaussian(0.0, theta);
        let mut total = weights[0];

        for i in 0..taps / 2 {
            let weight = gaussian((i + 1) as f32, theta);
            weights[i * 2 + 1] = weight;
            weights[i * 2 + 2] = weight;
            total += weight * 2.0;

            let sample_offset = i as f32 * 2.0 + 1.5;
            let delta = [step[0] * sample_offset, step[1] * sample_offset];
            offsets[i * 2 + 1] = delta;
            offsets[i * 2 + 2] = [-delta[0], -delta[1]];
        }

        if !(total.is_finite() && total > 0.0) {
            return Err(BloomError::DegenerateKernel { theta, taps });
        }
        for w in &mut weights {
            *w /= total;
        }

        Ok(Self { offsets, weights })
    }

    pub fn offsets(&self) -> &[[f32; 2]] {
        &self.offsets
    }

    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn total_weight(&self) -> f32 {
        self.weights.iter().sum()
    }
}

/// The horizontal and vertical kernels for one blur configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlurKernels {
    pub horizontal: BloomKernel,
    pub vertical: BloomKernel,
}

impl BlurKernels {
    /// Kernels for a blur target of `width` x `height` texels.
    pub fn for_target(
        theta: f32,
        taps: usize,
        width: u32,
        height: u32,
    ) -> Result<Self, BloomError> {
        if width == 0 || height == 0 {
            return Err(BloomError::EmptyTarget { width, height });
        }
        let horizontal = BloomKernel::generate(theta, taps, [1.0 / width as f32, 0.0])?;
        let vertical = BloomKernel::generate(theta, taps, [0.0, 1.0 / height as f32])?;
        Ok(Self {
            horizontal,
            vertical,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn len2(v: [f32; 2]) -> f32 {
        (v[0] * v[0] + v[1] * v[1]).sqrt()
    }

    #[test]
    fn gaussian_peaks_at_zero() {
        for &theta in &[0.5_f32, 1.0, 2.0, 4.0, 8.0] {
            let peak = gaussian(0.0, theta);
            for n in 1..20 {
                assert!(gaussian(n as f32, theta) < peak);
                assert!(gaussian(n as f32, theta) <= gaussian((n - 1) as f32, theta));
            }
        }
    }

    #[test]
    fn weights_sum_to_one() {
        for &theta in &[0.25_f32, 1.0, 2.0, 3.0, 4.0, 8.0, 20.0] {
            for taps in (3..=31).step_by(2) {
                let k = BloomKernel::generate(theta, taps, [1.0 / 400.0, 0.0]).unwrap();
                assert_eq!(k.len(), taps);
                assert!(
                    (k.total_weight() - 1.0).abs() < 1e-5,
                    "theta={theta} taps={taps} sum={}",
                    k.total_weight()
                );
            }
        }
    }

    #[test]
    fn kernel_is_symmetric() {
        let k = BloomKernel::generate(4.0, 15, [1.0 / 400.0, 0.0]).unwrap();
        assert_eq!(k.offsets()[0], [0.0, 0.0]);
        for i in 0..7 {
            let a = i * 2 + 1;
            let b = i * 2 + 2;
            assert_eq!(k.weights()[a], k.weights()[b]);
            assert_eq!(k.offsets()[a][0], -k.offsets()[b][0]);
            assert_eq!(k.offsets()[a][1], -k.offsets()[b][1]);
        }
    }

    #[test]
    fn reference_kernel() {
        let dx = 1.0 / 400.0;
        let k = BloomKernel::generate(4.0, 15, [dx, 0.0]).unwrap();

        // 1 / (1 + 2 * sum_{n=1..7} exp(-n^2 / 32))
        assert!((k.weights()[0] - 0.106_115).abs() < 1e-4, "center = {}", k.weights()[0]);

        // First pair sits 1.5 texels out, last pair 13.5.
        assert!((k.offsets()[1][0] - 1.5 * dx).abs() < 1e-7);
        assert!((k.offsets()[13][0] - 13.5 * dx).abs() < 1e-7);
        assert!(k.offsets().iter().all(|o| o[1] == 0.0));

        // Magnitudes strictly increase pair by pair.
        for i in 0..6 {
            assert!(len2(k.offsets()[i * 2 + 3]) > len2(k.offsets()[i * 2 + 1]));
        }
    }

    #[test]
    fn center_weight_is_largest() {
        for &theta in &[0.5_f32, 2.0, 4.0, 10.0] {
            let k = BloomKernel::generate(theta, 21, [0.01, 0.0]).unwrap();
            let center = k.weights()[0];
            assert!(k.weights()[1..].iter().all(|&w| w < center));
            // Far taps can underflow to zero for narrow blurs.
            for i in 0..9 {
                assert!(k.weights()[i * 2 + 3] <= k.weights()[i * 2 + 1]);
            }
        }
    }

    #[test]
    fn rejects_bad_taps() {
        for taps in [0, 1, 2, 4, 14, 33] {
            assert!(matches!(
                BloomKernel::generate(4.0, taps, [0.01, 0.0]),
                Err(BloomError::InvalidTaps(_))
            ));
        }
    }

    #[test]
    fn rejects_bad_theta() {
        for theta in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            assert!(matches!(
                BloomKernel::generate(theta, 15, [0.01, 0.0]),
                Err(BloomError::InvalidTheta(_))
            ));
        }
    }

    #[test]
    fn rejects_degenerate_theta() {
        let result = BloomKernel::generate(f32::from_bits(1), 15, [0.01, 0.0]);
        assert!(matches!(result, Err(BloomError::DegenerateKernel { .. })));
    }

    #[test]
    fn blur_kernels_use_their_own_axis() {
        let k = BlurKernels::for_target(4.0, 15, 800, 450).unwrap();
        assert!(k.horizontal.offsets().iter().all(|o| o[1] == 0.0));
        assert!(k.vertical.offsets().iter().all(|o| o[0] == 0.0));
        assert!((k.horizontal.offsets()[1][0] - 1.5 / 800.0).abs() < 1e-7);
        assert!((k.vertical.offsets()[1][1] - 1.5 / 450.0).abs() < 1e-7);
        assert_eq!(k.horizontal.weights(), k.vertical.weights());
    }

    #[test]
    fn blur_kernels_reject_empty_target() {
        assert!(matches!(
            BlurKernels::for_target(4.0, 15, 0, 450),
            Err(BloomError::EmptyTarget { .. })
        ));
    }
}
