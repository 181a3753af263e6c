use crate::error::{Result, SynError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayoutMode {
    /// Consecutive pairs cascade downwards; each query row anchors the next pair.
    #[default]
    LinearChain,
    /// All-vs-all display: one block of genome rows per chromosome.
    Stacked,
}

/// Pixel constants of the chromosome track layout.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutConfig {
    pub margin_top: f64,
    pub margin_bottom: f64,
    pub margin_left: f64,
    pub margin_right: f64,
    /// Height reserved for one ref/query pair in linear-chain mode.
    pub pair_height: f64,
    /// Horizontal gap between consecutive chromosomes.
    pub chrom_gap: f64,
    /// End-cap radius; a track is twice as tall.
    pub end_cap_radius: f64,
    /// Vertical distance between genome rows in stacked mode.
    pub row_spacing: f64,
    pub band_opacity: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        LayoutConfig {
            margin_top: 30.0,
            margin_bottom: 30.0,
            margin_left: 50.0,
            margin_right: 50.0,
            pair_height: 300.0,
            chrom_gap: 50.0,
            end_cap_radius: 5.0,
            row_spacing: 100.0,
            band_opacity: 0.5,
        }
    }
}

impl LayoutConfig {
    pub fn track_height(&self) -> f64 {
        self.end_cap_radius * 2.0
    }

    /// Ribbons leave the bottom edge of the reference track.
    pub fn ref_band_offset(&self) -> f64 {
        self.track_height()
    }

    /// Ribbons land on the top edge of the query track.
    pub fn query_band_offset(&self) -> f64 {
        0.0
    }

    fn inner_height(&self) -> f64 {
        self.pair_height - self.margin_top - self.margin_bottom
    }

    pub fn ref_row_y(&self, y_offset: f64) -> f64 {
        y_offset + self.margin_top + self.inner_height() / 4.0
    }

    pub fn query_row_y(&self, y_offset: f64) -> f64 {
        y_offset + self.margin_top + 3.0 * self.inner_height() / 4.0
    }

    /// Offset advance from one pair to the next so that the next reference
    /// row coincides with the current query row.
    pub fn pair_advance(&self) -> f64 {
        self.query_row_y(0.0) - self.ref_row_y(0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MergeConfig {
    /// Maximum gap in bp between merged fragments; `<= 0` disables merging.
    pub threshold: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub layout: LayoutConfig,
    pub merge: MergeConfig,
    pub mode: LayoutMode,
    /// Base pairs per pixel.
    pub scale: f64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            layout: LayoutConfig::default(),
            merge: MergeConfig::default(),
            mode: LayoutMode::default(),
            scale: 100_000.0,
        }
    }
}

pub fn validate_scale(scale: f64) -> Result<f64> {
    if scale.is_finite() && scale > 0.0 {
        Ok(scale)
    } else {
        Err(SynError::InvalidScale(scale))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_rows_match_drawing_constants() {
        let cfg = LayoutConfig::default();
        assert_eq!(cfg.ref_row_y(0.0), 90.0);
        assert_eq!(cfg.query_row_y(0.0), 210.0);
        assert_eq!(cfg.pair_advance(), 120.0);
        assert_eq!(cfg.ref_row_y(cfg.pair_advance()), cfg.query_row_y(0.0));
        assert_eq!(cfg.track_height(), 10.0);
    }

    #[test]
    fn scale_must_be_positive_and_finite() {
        assert!(validate_scale(1.0).is_ok());
        assert_eq!(validate_scale(0.0), Err(SynError::InvalidScale(0.0)));
        assert!(validate_scale(f64::NAN).is_err());
        assert!(validate_scale(f64::INFINITY).is_err());
    }
}
