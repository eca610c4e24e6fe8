//! Easing curves for the text reveal
//!
//! All take normalized time and are clamped to `t ∈ [0, 1]`.

use std::f32::consts::{PI, TAU};

#[inline]
fn clamp01(t: f32) -> f32 {
    t.clamp(0.0, 1.0)
}

pub fn linear(t: f32) -> f32 {
    clamp01(t)
}

/// `1 - (1 - t)^(power + 1)`; power 1..4 match the usual quad..quint out curves
pub fn power_out(power: i32, t: f32) -> f32 {
    1.0 - (1.0 - clamp01(t)).powi(power + 1)
}

pub fn sine_in_out(t: f32) -> f32 {
    -((PI * clamp01(t)).cos() - 1.0) / 2.0
}

/// Overshoots past 1 before settling; `overshoot` 1.7 is a gentle pop
pub fn back_out(overshoot: f32, t: f32) -> f32 {
    let u = clamp01(t) - 1.0;
    1.0 + (overshoot + 1.0) * u.powi(3) + overshoot * u.powi(2)
}

/// Damped spring; amplitude >= 1, period in normalized time
pub fn elastic_out(amplitude: f32, period: f32, t: f32) -> f32 {
    let t = clamp01(t);
    if t == 0.0 || t == 1.0 {
        return t;
    }
    let amplitude = amplitude.max(1.0);
    let shift = period / TAU * (1.0 / amplitude).asin();
    amplitude * 2f32.powf(-10.0 * t) * ((t - shift) * TAU / period).sin() + 1.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints() {
        let curves: [fn(f32) -> f32; 5] = [
            linear,
            sine_in_out,
            |t| power_out(2, t),
            |t| back_out(1.7, t),
            |t| elastic_out(1.0, 0.5, t),
        ];
        for f in curves {
            assert!(f(0.0).abs() < 1e-5);
            assert!((f(1.0) - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_out_curves_lead_linear() {
        assert!(power_out(2, 0.3) > 0.3);
        assert!((power_out(2, 0.5) - 0.875).abs() < 1e-6);
    }

    #[test]
    fn test_back_and_elastic_overshoot() {
        assert!((0..100).any(|i| back_out(1.7, i as f32 / 100.0) > 1.0));
        assert!((0..100).any(|i| elastic_out(1.0, 0.5, i as f32 / 100.0) > 1.0));
    }

    #[test]
    fn test_clamped_outside_unit_range() {
        assert_eq!(linear(-2.0), 0.0);
        assert_eq!(power_out(3, 4.0), 1.0);
    }
}
