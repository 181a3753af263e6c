//! Color and display-mode resolution.
//!
//! All overrides live in one [`DisplayStore`] owned by the session. Chromosome
//! styles resolve field by field through
//! chromosome override > genome override > all-genomes default > mode default.

use crate::error::{Result, SynError};
use crate::heatmap::Gradient;
use crate::model::{chromosome_base_name, BandId, BandType};
use log::{debug, warn};
use rustc_hash::FxHashMap;
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Rgb {
    type Err = SynError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || SynError::InvalidColor(s.to_string());
        let hex = s.strip_prefix('#').ok_or_else(invalid)?;
        if !hex.is_ascii() {
            return Err(invalid());
        }
        let channel = |h: &str| u8::from_str_radix(h, 16).map_err(|_| invalid());
        match hex.len() {
            6 => Ok(Rgb::new(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            )),
            3 => {
                let r = channel(&hex[0..1])?;
                let g = channel(&hex[1..2])?;
                let b = channel(&hex[2..3])?;
                Ok(Rgb::new(r * 17, g * 17, b * 17))
            }
            _ => Err(invalid()),
        }
    }
}

/// Color of bands whose type has no table entry.
pub const FALLBACK_BAND_COLOR: Rgb = Rgb::new(0xcc, 0xcc, 0xcc);

pub fn default_type_colors() -> FxHashMap<BandType, Rgb> {
    let mut colors = FxHashMap::default();
    colors.insert(BandType::Syn, Rgb::new(0xd3, 0xd3, 0xd3));
    colors.insert(BandType::Inv, Rgb::new(0xff, 0xa5, 0x00));
    colors.insert(BandType::InvTr, Rgb::new(0xff, 0xa5, 0x00));
    colors.insert(BandType::Trans, Rgb::new(0x00, 0x80, 0x00));
    colors.insert(BandType::Dup, Rgb::new(0x00, 0x00, 0xff));
    colors
}

/// Categorical palette for the first chromosomes in by-chromosome mode.
const CHROM_PALETTE: [(u8, u8, u8); 10] = [
    (31, 119, 180),  // blue
    (255, 127, 14),  // orange
    (44, 160, 44),   // green
    (214, 39, 40),   // red
    (148, 103, 189), // purple
    (140, 86, 75),   // brown
    (227, 119, 194), // pink
    (127, 127, 127), // grey
    (188, 189, 34),  // olive
    (23, 190, 207),  // cyan
];

fn hsl_to_rgb(h: f64, s: f64, l: f64) -> Rgb {
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let hp = (h % 360.0) / 60.0;
    let x = c * (1.0 - (hp % 2.0 - 1.0).abs());
    let (r1, g1, b1) = match hp as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = l - c / 2.0;
    let to_u8 = |v: f64| (255.0 * (v + m)).round().clamp(0.0, 255.0) as u8;
    Rgb::new(to_u8(r1), to_u8(g1), to_u8(b1))
}

/// Deterministic color of a chromosome ordinal. Ordinals past the categorical
/// palette walk the hue circle by the golden angle.
pub fn chrom_palette_color(ordinal: u32) -> Rgb {
    let idx = ordinal.saturating_sub(1) as usize;
    if let Some(&(r, g, b)) = CHROM_PALETTE.get(idx) {
        return Rgb::new(r, g, b);
    }
    hsl_to_rgb(idx as f64 * 137.508, 0.65, 0.5)
}

/// SHA-256 derived genome color, normalised and brightened so that every
/// genome gets a saturated, readable stroke.
pub fn genome_color(genome: &str) -> Rgb {
    let mut hasher = Sha256::new();
    hasher.update(genome.as_bytes());
    let digest = hasher.finalize();

    let mut r = digest[24] as f32 / 255.0;
    let mut g = digest[8] as f32 / 255.0;
    let mut b = digest[16] as f32 / 255.0;

    let sum = r + g + b;
    if sum > 0.0 {
        r /= sum;
        g /= sum;
        b /= sum;
    }

    let max_component = r.max(g).max(b);
    let f = if max_component > 0.0 {
        1.5f32.min(1.0 / max_component)
    } else {
        1.0
    };

    Rgb::new(
        (255.0 * (r * f).min(1.0)).round() as u8,
        (255.0 * (g * f).min(1.0)).round() as u8,
        (255.0 * (b * f).min(1.0)).round() as u8,
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorMode {
    #[default]
    ByType,
    ByChrom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DisplayMode {
    /// Stroke only.
    #[default]
    Outline,
    /// Fill and stroke share the color.
    Filled,
    /// Fill with the chromosome's density gradient when one is registered.
    Heatmap,
}

/// Partial override: absent fields fall through to the next level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DisplaySetting {
    pub mode: Option<DisplayMode>,
    pub color: Option<Rgb>,
}

impl DisplaySetting {
    pub fn color(color: Rgb) -> Self {
        DisplaySetting {
            mode: None,
            color: Some(color),
        }
    }

    pub fn mode(mode: DisplayMode) -> Self {
        DisplaySetting {
            mode: Some(mode),
            color: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.mode.is_none() && self.color.is_none()
    }

    fn apply(&mut self, edit: &DisplaySetting) {
        if edit.mode.is_some() {
            self.mode = edit.mode;
        }
        if edit.color.is_some() {
            self.color = edit.color;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// One chromosome; the element id may carry a `_ref`/`_query` suffix.
    Chromosome { genome: String, element_id: String },
    /// Every chromosome of one genome not overridden individually.
    Genome(String),
    /// Every genome.
    AllGenomes,
}

/// Exactly one color and mode per element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedStyle {
    pub color: Rgb,
    pub mode: DisplayMode,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ChromKey {
    genome: String,
    base_name: String,
}

#[derive(Debug, Clone)]
pub struct DisplayStore {
    color_mode: ColorMode,
    type_colors: FxHashMap<BandType, Rgb>,
    global: DisplaySetting,
    genomes: FxHashMap<String, DisplaySetting>,
    chromosomes: FxHashMap<ChromKey, DisplaySetting>,
    bands: FxHashMap<BandId, Rgb>,
    gradients: FxHashMap<(String, u32), Gradient>,
}

impl Default for DisplayStore {
    fn default() -> Self {
        DisplayStore::new()
    }
}

impl DisplayStore {
    pub fn new() -> Self {
        DisplayStore {
            color_mode: ColorMode::default(),
            type_colors: default_type_colors(),
            global: DisplaySetting::default(),
            genomes: FxHashMap::default(),
            chromosomes: FxHashMap::default(),
            bands: FxHashMap::default(),
            gradients: FxHashMap::default(),
        }
    }

    pub fn color_mode(&self) -> ColorMode {
        self.color_mode
    }

    pub fn set_color_mode(&mut self, mode: ColorMode) {
        debug!("Band color mode: {:?}", mode);
        self.color_mode = mode;
    }

    pub fn type_color(&self, band_type: &BandType) -> Rgb {
        self.type_colors
            .get(band_type)
            .copied()
            .unwrap_or(FALLBACK_BAND_COLOR)
    }

    pub fn set_type_color(&mut self, band_type: BandType, color: Rgb) {
        self.type_colors.insert(band_type, color);
    }

    pub fn reset_type_colors(&mut self) {
        self.type_colors = default_type_colors();
    }

    /// Applies a display edit at `scope`.
    ///
    /// A genome edit leaves finer chromosome overrides alone. An all-genomes
    /// edit becomes the global default and is also pushed into every existing
    /// override, but only for the fields it carries: a mode-only edit keeps
    /// every color already chosen.
    pub fn apply_override(&mut self, scope: &Scope, edit: DisplaySetting) -> Result<()> {
        match scope {
            Scope::Chromosome { genome, element_id } => {
                let base_name = chromosome_base_name(element_id);
                if base_name.is_empty() {
                    warn!(
                        "Ignoring chromosome edit for genome {}: '{}' has no base name",
                        genome, element_id
                    );
                    return Err(SynError::EmptyChromosomeName(element_id.clone()));
                }
                self.chromosomes
                    .entry(ChromKey {
                        genome: genome.clone(),
                        base_name: base_name.to_string(),
                    })
                    .or_default()
                    .apply(&edit);
            }
            Scope::Genome(genome) => {
                self.genomes.entry(genome.clone()).or_default().apply(&edit);
            }
            Scope::AllGenomes => {
                self.global.apply(&edit);
                for setting in self.genomes.values_mut() {
                    setting.apply(&edit);
                }
                for setting in self.chromosomes.values_mut() {
                    setting.apply(&edit);
                }
            }
        }
        Ok(())
    }

    pub fn chromosome_override(&self, genome: &str, name: &str) -> Option<&DisplaySetting> {
        self.chromosomes.get(&ChromKey {
            genome: genome.to_string(),
            base_name: chromosome_base_name(name).to_string(),
        })
    }

    pub fn genome_override(&self, genome: &str) -> Option<&DisplaySetting> {
        self.genomes.get(genome)
    }

    fn mode_default_color(&self, genome: &str, ordinal: u32) -> Rgb {
        match self.color_mode {
            ColorMode::ByType => genome_color(genome),
            ColorMode::ByChrom => chrom_palette_color(ordinal),
        }
    }

    pub fn resolve_chromosome(&self, genome: &str, name: &str, ordinal: u32) -> ResolvedStyle {
        let chrom = self.chromosome_override(genome, name);
        let genome_level = self.genome_override(genome);
        let levels = [chrom, genome_level, Some(&self.global)];

        let color = levels
            .iter()
            .flatten()
            .find_map(|s| s.color)
            .unwrap_or_else(|| self.mode_default_color(genome, ordinal));
        let mode = levels
            .iter()
            .flatten()
            .find_map(|s| s.mode)
            .unwrap_or_default();
        ResolvedStyle { color, mode }
    }

    /// Band fill color. A per-band color wins; otherwise by-chromosome mode
    /// follows the reference chromosome (its own override first) and by-type
    /// mode reads the type table.
    pub fn resolve_band_color(
        &self,
        id: BandId,
        band_type: &BandType,
        ref_genome: &str,
        ref_chr: &str,
        ref_ordinal: u32,
    ) -> Rgb {
        if let Some(&color) = self.bands.get(&id) {
            return color;
        }
        match self.color_mode {
            ColorMode::ByType => self.type_color(band_type),
            ColorMode::ByChrom => self
                .chromosome_override(ref_genome, ref_chr)
                .and_then(|s| s.color)
                .unwrap_or_else(|| chrom_palette_color(ref_ordinal)),
        }
    }

    pub fn set_band_color(&mut self, id: BandId, color: Rgb) {
        self.bands.insert(id, color);
    }

    pub fn band_color_override(&self, id: BandId) -> Option<Rgb> {
        self.bands.get(&id).copied()
    }

    /// Band handles are reissued on every full draw.
    pub fn clear_band_colors(&mut self) {
        self.bands.clear();
    }

    pub fn set_gradient(&mut self, genome: &str, ordinal: u32, gradient: Gradient) {
        self.gradients.insert((genome.to_string(), ordinal), gradient);
    }

    pub fn gradient(&self, genome: &str, ordinal: u32) -> Option<&Gradient> {
        self.gradients.get(&(genome.to_string(), ordinal))
    }
}
