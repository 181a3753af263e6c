//! Per-chromosome density gradients for the `heatmap` display mode.

use crate::color::Rgb;
use rustc_hash::FxHashMap;

/// ColorBrewer OrRd 9-class sequential palette, light to dark.
const COLORBREWER_ORRD_9: [(u8, u8, u8); 9] = [
    (255, 247, 236),
    (254, 232, 200),
    (253, 212, 158),
    (253, 187, 132),
    (252, 141, 89),
    (239, 101, 72),
    (215, 48, 31),
    (179, 0, 0),
    (127, 0, 0),
];

#[derive(Debug, Clone, PartialEq)]
pub struct GradientStop {
    /// Percentage along the chromosome, 0..=100.
    pub offset: f64,
    pub color: Rgb,
}

/// Horizontal linear gradient painted over a chromosome track.
#[derive(Debug, Clone, PartialEq)]
pub struct Gradient {
    pub id: String,
    pub stops: Vec<GradientStop>,
}

/// Piecewise-linear OrRd ramp; `t` is clamped to `[0, 1]`.
pub fn interpolate_orrd(t: f64) -> Rgb {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let last = COLORBREWER_ORRD_9.len() - 1;
    let pos = t * last as f64;
    let i = (pos.floor() as usize).min(last - 1);
    let frac = pos - i as f64;
    let (a, b) = (COLORBREWER_ORRD_9[i], COLORBREWER_ORRD_9[i + 1]);
    let mix = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * frac).round() as u8;
    Rgb::new(mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
}

pub fn gradient_id(genome: &str, ordinal: u32) -> String {
    format!("grad-{}-{}", genome, ordinal)
}

/// One stop per bin, placed at the bin's right edge, colored against
/// `[0, max_density]`. `None` for an empty bin list.
pub fn density_gradient(id: &str, bins: &[f64], max_density: f64) -> Option<Gradient> {
    if bins.is_empty() {
        return None;
    }
    let n = bins.len() as f64;
    let stops = bins
        .iter()
        .enumerate()
        .map(|(i, &density)| GradientStop {
            offset: (i as f64 + 1.0) * (100.0 / n),
            color: if max_density > 0.0 {
                interpolate_orrd(density / max_density)
            } else {
                interpolate_orrd(0.0)
            },
        })
        .collect();
    Some(Gradient {
        id: id.to_string(),
        stops,
    })
}

/// Gradients for every chromosome of a genome, sharing one color domain.
pub fn genome_gradients(genome: &str, densities: &FxHashMap<u32, Vec<f64>>) -> FxHashMap<u32, Gradient> {
    let max_density = densities
        .values()
        .flatten()
        .copied()
        .filter(|d| d.is_finite())
        .fold(0.0f64, f64::max);
    densities
        .iter()
        .filter_map(|(&ordinal, bins)| {
            density_gradient(&gradient_id(genome, ordinal), bins, max_density)
                .map(|g| (ordinal, g))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn ramp_endpoints() {
        assert_eq!(interpolate_orrd(0.0), Rgb::new(255, 247, 236));
        assert_eq!(interpolate_orrd(1.0), Rgb::new(127, 0, 0));
        assert_eq!(interpolate_orrd(7.0), Rgb::new(127, 0, 0));
        assert_eq!(interpolate_orrd(f64::NAN), Rgb::new(255, 247, 236));
    }

    #[test]
    fn stops_sit_on_bin_edges() {
        let g = density_gradient("grad-a-1", &[0.0, 5.0, 10.0, 2.5], 10.0).unwrap();
        assert_eq!(g.stops.len(), 4);
        assert_relative_eq!(g.stops[0].offset, 25.0);
        assert_relative_eq!(g.stops[3].offset, 100.0);
        assert_eq!(g.stops[2].color, Rgb::new(127, 0, 0));
        assert!(density_gradient("x", &[], 1.0).is_none());
    }

    #[test]
    fn genome_gradients_share_the_maximum() {
        let mut densities = FxHashMap::default();
        densities.insert(1, vec![1.0, 2.0]);
        densities.insert(2, vec![4.0]);
        let grads = genome_gradients("a", &densities);
        assert_eq!(grads.len(), 2);
        assert_eq!(grads[&1].id, "grad-a-1");
        assert_eq!(grads[&2].stops[0].color, Rgb::new(127, 0, 0));
        assert_ne!(grads[&1].stops[1].color, Rgb::new(127, 0, 0));
    }
}
