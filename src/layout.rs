//! Pixel placement of chromosome tracks along a genome chain.
//!
//! X positions are keyed by chromosome ordinal, not by name, so that
//! orthologous chromosomes line up across every genome of the chain even when
//! their names differ. The width reserved for an ordinal is the longest
//! chromosome carrying that ordinal anywhere in the chain.

use crate::config::{LayoutConfig, LayoutMode};
use crate::model::{ChromosomeTable, TrackRole};
use crate::path::PathBuilder;
use log::{debug, error, info};
use rustc_hash::FxHashMap;

/// Anchor of one ordinal for one adjacent genome pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackPosition {
    pub ref_x: f64,
    pub ref_y: f64,
    pub query_x: f64,
    pub query_y: f64,
}

/// Positions of one adjacent pair, keyed by ordinal.
#[derive(Debug, Clone, PartialEq)]
pub struct PairLayout {
    pub ref_genome: String,
    pub query_genome: String,
    pub positions: FxHashMap<u32, TrackPosition>,
}

impl PairLayout {
    pub fn get(&self, ordinal: u32) -> Option<&TrackPosition> {
        self.positions.get(&ordinal)
    }
}

/// A drawable chromosome capsule.
#[derive(Debug, Clone, PartialEq)]
pub struct ChromosomeTrack {
    pub genome: String,
    pub ordinal: u32,
    pub name: String,
    pub role: TrackRole,
    pub x: f64,
    pub y: f64,
    /// This genome's own chromosome length in pixels.
    pub width: f64,
}

impl ChromosomeTrack {
    pub fn element_id(&self) -> String {
        format!("{}{}", self.name, self.role.suffix())
    }

    /// Rounded capsule without arms; x and width are truncated to whole
    /// pixels, the end caps sit inside the width.
    pub fn path_data(&self, radius: f64) -> String {
        let x = (self.x + radius).trunc();
        let w = (self.width - radius - radius).trunc();
        PathBuilder::new()
            .move_to(x, self.y)
            .horizontal(w)
            .arc(radius, radius, radius)
            .arc(radius, -radius, radius)
            .horizontal(-w)
            .arc(radius, -radius, -radius)
            .arc(radius, radius, -radius)
            .close()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChainLayout {
    pub mode: LayoutMode,
    pub pairs: Vec<PairLayout>,
    pub tracks: Vec<ChromosomeTrack>,
    pub width: f64,
    pub height: f64,
}

impl ChainLayout {
    pub fn pair(&self, ref_genome: &str, query_genome: &str) -> Option<&PairLayout> {
        self.pairs
            .iter()
            .find(|p| p.ref_genome == ref_genome && p.query_genome == query_genome)
    }
}

pub struct ChromosomeLayoutEngine<'a> {
    config: &'a LayoutConfig,
    scale: f64,
    mode: LayoutMode,
}

impl<'a> ChromosomeLayoutEngine<'a> {
    pub fn new(config: &'a LayoutConfig, scale: f64, mode: LayoutMode) -> Self {
        ChromosomeLayoutEngine {
            config,
            scale,
            mode,
        }
    }

    /// Longest chromosome per ordinal across the whole chain.
    pub fn max_lengths(chain: &[ChromosomeTable]) -> FxHashMap<u32, u64> {
        let mut max_lengths: FxHashMap<u32, u64> = FxHashMap::default();
        for table in chain {
            for chrom in table.iter() {
                let entry = max_lengths.entry(chrom.ordinal).or_insert(0);
                *entry = (*entry).max(chrom.length);
            }
        }
        max_lengths
    }

    /// Reserved pixel width per ordinal, in ordinal order. Ordinals whose
    /// width is not a finite positive number are logged and left out.
    fn slot_widths(&self, chain: &[ChromosomeTable]) -> Vec<(u32, f64)> {
        let max_lengths = Self::max_lengths(chain);
        let mut ordinals: Vec<u32> = max_lengths.keys().copied().collect();
        ordinals.sort_unstable();

        let mut slots = Vec::with_capacity(ordinals.len());
        for ordinal in ordinals {
            let width = max_lengths[&ordinal] as f64 / self.scale;
            if width.is_finite() && width > 0.0 {
                slots.push((ordinal, width));
            } else {
                error!(
                    "Invalid chromosome width for {}: {}",
                    chain_name(chain, ordinal),
                    width
                );
            }
        }
        slots
    }

    pub fn layout(&self, chain: &[ChromosomeTable]) -> ChainLayout {
        let layout = match self.mode {
            LayoutMode::LinearChain => self.layout_linear(chain),
            LayoutMode::Stacked => self.layout_stacked(chain),
        };
        info!(
            "Laid out {} chromosome tracks over {} genome pairs ({:.0}x{:.0} px)",
            layout.tracks.len(),
            layout.pairs.len(),
            layout.width,
            layout.height
        );
        layout
    }

    fn layout_linear(&self, chain: &[ChromosomeTable]) -> ChainLayout {
        let cfg = self.config;
        let slots = self.slot_widths(chain);

        let mut slot_x: Vec<(u32, f64)> = Vec::with_capacity(slots.len());
        let mut current_x = cfg.margin_left;
        for &(ordinal, width) in &slots {
            slot_x.push((ordinal, current_x));
            current_x += width + cfg.chrom_gap;
        }

        let mut pairs = Vec::new();
        let mut tracks = Vec::new();
        let mut y_offset = 0.0;
        let mut bottom = cfg.margin_top;

        for (pair_index, window) in chain.windows(2).enumerate() {
            let (ref_table, query_table) = (&window[0], &window[1]);
            let ref_y = cfg.ref_row_y(y_offset);
            let query_y = cfg.query_row_y(y_offset);
            let mut positions = FxHashMap::default();

            for &(ordinal, x) in &slot_x {
                let Some((ref_chrom, query_chrom)) = self.pair_members(ref_table, query_table, ordinal)
                else {
                    continue;
                };
                positions.insert(
                    ordinal,
                    TrackPosition {
                        ref_x: x,
                        ref_y,
                        query_x: x,
                        query_y,
                    },
                );
                if pair_index == 0 {
                    tracks.push(self.track(ref_table.genome(), ordinal, &ref_chrom.0, ref_chrom.1, TrackRole::Ref, x, ref_y));
                }
                tracks.push(self.track(query_table.genome(), ordinal, &query_chrom.0, query_chrom.1, TrackRole::Query, x, query_y));
            }

            debug!(
                "Pair {} vs {}: {} chromosomes placed",
                ref_table.genome(),
                query_table.genome(),
                positions.len()
            );
            pairs.push(PairLayout {
                ref_genome: ref_table.genome().to_string(),
                query_genome: query_table.genome().to_string(),
                positions,
            });
            bottom = query_y + cfg.track_height();
            y_offset += cfg.pair_advance();
        }

        let width = if slots.is_empty() {
            cfg.margin_left + cfg.margin_right
        } else {
            current_x - cfg.chrom_gap + cfg.margin_right
        };
        ChainLayout {
            mode: LayoutMode::LinearChain,
            pairs,
            tracks,
            width,
            height: bottom + cfg.margin_bottom,
        }
    }

    fn layout_stacked(&self, chain: &[ChromosomeTable]) -> ChainLayout {
        let cfg = self.config;
        let slots = self.slot_widths(chain);
        let genome_count = chain.len() as f64;
        let block_height = genome_count * cfg.row_spacing;
        let x = cfg.margin_left;

        let mut pairs = Vec::new();
        let mut tracks = Vec::new();

        for (pair_index, window) in chain.windows(2).enumerate() {
            let (ref_table, query_table) = (&window[0], &window[1]);
            let mut positions = FxHashMap::default();
            let first_row = cfg.margin_top + (pair_index as f64 + 1.0) * cfg.row_spacing;

            for (slot, &(ordinal, _)) in slots.iter().enumerate() {
                let Some((ref_chrom, query_chrom)) = self.pair_members(ref_table, query_table, ordinal)
                else {
                    continue;
                };
                let ref_y = first_row + slot as f64 * block_height;
                let query_y = ref_y + cfg.row_spacing;
                positions.insert(
                    ordinal,
                    TrackPosition {
                        ref_x: x,
                        ref_y,
                        query_x: x,
                        query_y,
                    },
                );
                if pair_index == 0 {
                    tracks.push(self.track(ref_table.genome(), ordinal, &ref_chrom.0, ref_chrom.1, TrackRole::Ref, x, ref_y));
                }
                tracks.push(self.track(query_table.genome(), ordinal, &query_chrom.0, query_chrom.1, TrackRole::Query, x, query_y));
            }

            pairs.push(PairLayout {
                ref_genome: ref_table.genome().to_string(),
                query_genome: query_table.genome().to_string(),
                positions,
            });
        }

        let widest = slots.iter().map(|&(_, w)| w).fold(0.0f64, f64::max);
        ChainLayout {
            mode: LayoutMode::Stacked,
            pairs,
            tracks,
            width: cfg.margin_left + widest + cfg.margin_right,
            height: cfg.margin_top
                + cfg.row_spacing
                + slots.len() as f64 * block_height
                + cfg.margin_bottom,
        }
    }

    /// A track needs its own finite positive width, whatever the slot holds.
    fn own_width_valid(&self, genome: &str, name: &str, length: u64) -> bool {
        let width = length as f64 / self.scale;
        if width.is_finite() && width > 0.0 {
            true
        } else {
            error!("Invalid chromosome width for {} ({}): {}", name, genome, width);
            false
        }
    }

    /// Name and length of `ordinal` in both genomes of a pair, or `None`
    /// (logged) when either side lacks it or has no drawable width.
    fn pair_members(
        &self,
        ref_table: &ChromosomeTable,
        query_table: &ChromosomeTable,
        ordinal: u32,
    ) -> Option<((String, u64), (String, u64))> {
        let Some(ref_chrom) = ref_table.get(ordinal) else {
            error!(
                "Chromosome {} missing in genome {}",
                chain_name(std::slice::from_ref(query_table), ordinal),
                ref_table.genome()
            );
            return None;
        };
        let Some(query_chrom) = query_table.get(ordinal) else {
            error!(
                "Chromosome {} missing in genome {}",
                ref_chrom.name,
                query_table.genome()
            );
            return None;
        };
        if !self.own_width_valid(ref_table.genome(), &ref_chrom.name, ref_chrom.length)
            || !self.own_width_valid(query_table.genome(), &query_chrom.name, query_chrom.length)
        {
            return None;
        }
        Some((
            (ref_chrom.name.clone(), ref_chrom.length),
            (query_chrom.name.clone(), query_chrom.length),
        ))
    }

    #[allow(clippy::too_many_arguments)]
    fn track(
        &self,
        genome: &str,
        ordinal: u32,
        name: &str,
        length: u64,
        role: TrackRole,
        x: f64,
        y: f64,
    ) -> ChromosomeTrack {
        ChromosomeTrack {
            genome: genome.to_string(),
            ordinal,
            name: name.to_string(),
            role,
            x,
            y,
            width: length as f64 / self.scale,
        }
    }
}

/// First name found for an ordinal anywhere in the chain, for log lines.
fn chain_name(chain: &[ChromosomeTable], ordinal: u32) -> String {
    chain
        .iter()
        .find_map(|t| t.get(ordinal).map(|c| c.name.clone()))
        .unwrap_or_else(|| format!("#{}", ordinal))
}
