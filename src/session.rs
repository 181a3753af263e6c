//! A visualization session: one genome chain, its records, and every piece of
//! mutable display state, driven through [`Command`]s.

use crate::color::{ColorMode, DisplaySetting, DisplayStore, Rgb, Scope};
use crate::config::{validate_scale, LayoutMode, SessionConfig};
use crate::error::{Result, SynError};
use crate::filter::{length_bounds, ChromosomeRef, FilterState, VisibilityFilter};
use crate::heatmap::genome_gradients;
use crate::layout::{ChainLayout, ChromosomeLayoutEngine};
use crate::merge::BandMerger;
use crate::model::{BandId, BandType, ChromosomeTable, PairRecords, SyntenyRecord};
use crate::registry::BandRegistry;
use crate::render::{render_track, BandMeta, BandRenderer, RenderedBand, RenderedTrack, Ribbon};
use crate::selection::{Envelope, SelectionManager};
use indexmap::IndexSet;
use log::{debug, info, warn};
use rayon::prelude::*;
use rustc_hash::FxHashMap;

/// Similarity slider maximum when the source chromosome length is unknown.
pub const DEFAULT_SIMILARITY_MAX: u64 = 10_000_000;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SetColorMode(ColorMode),
    SetTypeColor { band_type: BandType, color: Rgb },
    ResetTypeColors,
    OverrideDisplay { scope: Scope, setting: DisplaySetting },
    /// Binned feature densities per chromosome ordinal of one genome.
    SetDensities {
        genome: String,
        densities: FxHashMap<u32, Vec<f64>>,
    },
    ToggleType(BandType),
    SetChromosomeVisible {
        genome: String,
        ordinal: u32,
        visible: bool,
    },
    SetInterVisible(bool),
    SetIntraVisible(bool),
    SetLengthRange { min: i64, max: i64 },
    ResetFilters,
    SelectBand { id: BandId, multi: bool },
    SelectSimilar { id: BandId, max_distance: i64 },
    ClearSelection,
    /// Paints every selected band with one color.
    ColorSelection(Rgb),
    SetScale(f64),
    SetLayoutMode(LayoutMode),
    SetMergeThreshold(i64),
}

/// Elements a command touched. With `relayout` every band handle was
/// reissued and the host should rebuild the whole picture.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Affected {
    pub bands: Vec<BandId>,
    pub tracks: Vec<ChromosomeRef>,
    pub relayout: bool,
}

impl Affected {
    fn bands(bands: Vec<BandId>) -> Self {
        Affected {
            bands,
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bands.is_empty() && self.tracks.is_empty() && !self.relayout
    }
}

pub struct Session {
    config: SessionConfig,
    chain: Vec<ChromosomeTable>,
    pairs: Vec<PairRecords>,
    store: DisplayStore,
    filter: FilterState,
    registry: BandRegistry,
    selection: SelectionManager,
    layout: Option<ChainLayout>,
    tracks: Vec<RenderedTrack>,
    similarity_max: Option<u64>,
}

impl Session {
    /// `pairs[i]` holds the records of `chain[i]` against `chain[i + 1]`.
    pub fn new(config: SessionConfig, chain: Vec<ChromosomeTable>, pairs: Vec<PairRecords>) -> Result<Self> {
        validate_scale(config.scale)?;
        if chain.len() < 2 {
            return Err(SynError::EmptyChain(chain.len()));
        }
        if pairs.len() != chain.len() - 1 {
            return Err(SynError::GenomeCountMismatch {
                genomes: chain.len(),
                expected: chain.len() - 1,
                got: pairs.len(),
            });
        }
        for (window, pair) in chain.windows(2).zip(&pairs) {
            if pair.ref_genome != window[0].genome() {
                return Err(SynError::UnknownGenome(pair.ref_genome.clone()));
            }
            if pair.query_genome != window[1].genome() {
                return Err(SynError::UnknownGenome(pair.query_genome.clone()));
            }
        }
        debug!(
            "Session over {} genomes: {}",
            chain.len(),
            chain.iter().map(|t| t.genome()).collect::<Vec<_>>().join(" -> ")
        );
        Ok(Session {
            config,
            chain,
            pairs,
            store: DisplayStore::new(),
            filter: FilterState::default(),
            registry: BandRegistry::new(),
            selection: SelectionManager::new(),
            layout: None,
            tracks: Vec::new(),
            similarity_max: None,
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn chain(&self) -> &[ChromosomeTable] {
        &self.chain
    }

    pub fn store(&self) -> &DisplayStore {
        &self.store
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn bands(&self) -> &BandRegistry {
        &self.registry
    }

    pub fn band(&self, id: BandId) -> Option<&RenderedBand> {
        self.registry.get(id)
    }

    pub fn tracks(&self) -> &[RenderedTrack] {
        &self.tracks
    }

    pub fn layout(&self) -> Option<&ChainLayout> {
        self.layout.as_ref()
    }

    pub fn selection(&self) -> &SelectionManager {
        &self.selection
    }

    pub fn envelope(&self) -> Option<Envelope> {
        self.selection.envelope(&self.registry)
    }

    /// Upper end of the similarity distance slider: the longest chromosome
    /// sharing the last similarity source's reference ordinal.
    pub fn similarity_slider_max(&self) -> u64 {
        self.similarity_max.unwrap_or(DEFAULT_SIMILARITY_MAX)
    }

    /// Initial length filter range over the drawn bands.
    pub fn default_length_range(&self) -> Option<(i64, i64)> {
        length_bounds(self.registry.iter().map(|b| b.meta.length))
    }

    /// Full pass: layout, per-pair merge and ribbon construction, then band
    /// handles in chain order. The first draw shows every band; later draws
    /// keep applying the current filter. Returns the number of bands drawn.
    pub fn draw(&mut self) -> usize {
        let is_first_draw = self.layout.is_none();
        let layout = ChromosomeLayoutEngine::new(&self.config.layout, self.config.scale, self.config.mode)
            .layout(&self.chain);
        let merger = BandMerger::new(self.config.merge.threshold);

        let chain_ref = &self.chain;
        let layout_ref = &layout;
        let layout_config = &self.config.layout;
        let scale = self.config.scale;
        let prepared: Vec<Vec<(BandMeta, Ribbon)>> = self
            .pairs
            .par_iter()
            .enumerate()
            .map(|(i, pair)| {
                let Some(pair_layout) = layout_ref.pairs.get(i) else {
                    return Vec::new();
                };
                let drawable: Vec<SyntenyRecord> = pair
                    .records
                    .iter()
                    .filter(|r| r.band_type.is_drawn())
                    .cloned()
                    .collect();
                if drawable.len() < pair.records.len() {
                    debug!(
                        "{} vs {}: skipped {} records of undrawn types",
                        pair.ref_genome,
                        pair.query_genome,
                        pair.records.len() - drawable.len()
                    );
                }
                let renderer =
                    BandRenderer::new(&chain_ref[i], &chain_ref[i + 1], pair_layout, layout_config, scale);
                merger
                    .merge(&drawable)
                    .iter()
                    .filter_map(|r| renderer.prepare(r))
                    .collect()
            })
            .collect();

        self.selection.clear(&mut self.registry);
        self.registry.clear();
        self.store.clear_band_colors();
        self.similarity_max = None;

        let mut next_id = 0u32;
        for (i, bands) in prepared.into_iter().enumerate() {
            let Some(pair_layout) = layout.pairs.get(i) else {
                continue;
            };
            let renderer = BandRenderer::new(
                &self.chain[i],
                &self.chain[i + 1],
                pair_layout,
                &self.config.layout,
                self.config.scale,
            );
            for (meta, ribbon) in bands {
                let id = BandId(next_id);
                next_id += 1;
                let fill = self.store.resolve_band_color(
                    id,
                    &meta.band_type,
                    &meta.ref_genome,
                    &meta.ref_chr,
                    meta.ref_ordinal,
                );
                self.registry
                    .insert(renderer.finish(id, meta, ribbon, fill, is_first_draw, Some(&self.filter)));
            }
        }

        self.tracks = layout
            .tracks
            .iter()
            .map(|t| render_track(t, &self.store, &self.config.layout, Some(&self.filter)))
            .collect();
        self.layout = Some(layout);

        info!(
            "Drew {} bands ({} visible) and {} chromosome tracks",
            self.registry.len(),
            self.registry.visible_count(),
            self.tracks.len()
        );
        self.registry.len()
    }

    /// Re-evaluates colors and visibility of the existing bands and tracks.
    pub fn redraw(&mut self) -> Affected {
        let affected = Affected {
            bands: self.refresh_bands(),
            tracks: self.refresh_tracks(),
            relayout: false,
        };
        debug!(
            "Redraw touched {} bands and {} chromosomes",
            affected.bands.len(),
            affected.tracks.len()
        );
        affected
    }

    fn refresh_bands(&mut self) -> Vec<BandId> {
        let mut changed = Vec::new();
        for band in self.registry.iter_mut() {
            let fill = self.store.resolve_band_color(
                band.id,
                &band.meta.band_type,
                &band.meta.ref_genome,
                &band.meta.ref_chr,
                band.meta.ref_ordinal,
            );
            let visible = VisibilityFilter::is_visible(&band.meta, Some(&self.filter));
            if band.fill != fill || band.visible != visible {
                band.fill = fill;
                band.visible = visible;
                changed.push(band.id);
            }
        }
        changed
    }

    fn refresh_tracks(&mut self) -> Vec<ChromosomeRef> {
        let mut changed: IndexSet<ChromosomeRef> = IndexSet::new();
        for rendered in self.tracks.iter_mut() {
            let fresh = render_track(&rendered.track, &self.store, &self.config.layout, Some(&self.filter));
            if *rendered != fresh {
                changed.insert(ChromosomeRef::new(&fresh.track.genome, fresh.track.ordinal));
                *rendered = fresh;
            }
        }
        changed.into_iter().collect()
    }

    fn relayout(&mut self) -> Affected {
        if self.layout.is_some() {
            self.draw();
        }
        let tracks: IndexSet<ChromosomeRef> = self
            .tracks
            .iter()
            .map(|t| ChromosomeRef::new(&t.track.genome, t.track.ordinal))
            .collect();
        Affected {
            bands: self.registry.iter().map(|b| b.id).collect(),
            tracks: tracks.into_iter().collect(),
            relayout: true,
        }
    }

    fn check_genome(&self, genome: &str) -> Result<()> {
        if self.chain.iter().any(|t| t.genome() == genome) {
            Ok(())
        } else {
            warn!("Ignoring edit for genome {}: not part of the chain", genome);
            Err(SynError::UnknownGenome(genome.to_string()))
        }
    }

    /// Applies one command and reports what needs re-rendering. A rejected
    /// command leaves the session untouched.
    pub fn apply(&mut self, command: Command) -> Result<Affected> {
        let affected = match command {
            Command::SetColorMode(mode) => {
                self.store.set_color_mode(mode);
                self.redraw()
            }
            Command::SetTypeColor { band_type, color } => {
                self.store.set_type_color(band_type, color);
                self.redraw()
            }
            Command::ResetTypeColors => {
                self.store.reset_type_colors();
                self.redraw()
            }
            Command::OverrideDisplay { scope, setting } => {
                match &scope {
                    Scope::Chromosome { genome, .. } | Scope::Genome(genome) => self.check_genome(genome)?,
                    Scope::AllGenomes => {}
                }
                self.store.apply_override(&scope, setting)?;
                self.redraw()
            }
            Command::SetDensities { genome, densities } => {
                self.check_genome(&genome)?;
                for (ordinal, gradient) in genome_gradients(&genome, &densities) {
                    self.store.set_gradient(&genome, ordinal, gradient);
                }
                self.redraw()
            }
            Command::ToggleType(band_type) => {
                match self.filter.toggle_type(&band_type) {
                    Some(enabled) => debug!("Type {} enabled: {}", band_type, enabled),
                    None => debug!("Type {} follows its constituents, toggle ignored", band_type),
                }
                self.redraw()
            }
            Command::SetChromosomeVisible {
                genome,
                ordinal,
                visible,
            } => {
                self.check_genome(&genome)?;
                let universe: Vec<ChromosomeRef> = self
                    .chain
                    .iter()
                    .flat_map(|t| t.iter().map(|c| ChromosomeRef::new(&c.genome, c.ordinal)))
                    .collect();
                self.filter
                    .set_chromosome_visible(ChromosomeRef::new(&genome, ordinal), visible, universe);
                self.redraw()
            }
            Command::SetInterVisible(show) => {
                self.filter.show_inter = Some(show);
                self.redraw()
            }
            Command::SetIntraVisible(show) => {
                self.filter.show_intra = Some(show);
                self.redraw()
            }
            Command::SetLengthRange { min, max } => {
                self.filter.length_range = Some((min.min(max), min.max(max)));
                self.redraw()
            }
            Command::ResetFilters => {
                self.filter.reset();
                self.redraw()
            }
            Command::SelectBand { id, multi } => {
                Affected::bands(self.selection.toggle_or_replace(&mut self.registry, id, multi)?)
            }
            Command::SelectSimilar { id, max_distance } => {
                let changed = self.selection.select_similar(&mut self.registry, id, max_distance)?;
                let max_lengths = ChromosomeLayoutEngine::max_lengths(&self.chain);
                self.similarity_max = self
                    .registry
                    .get(id)
                    .and_then(|b| max_lengths.get(&b.meta.ref_ordinal))
                    .copied();
                Affected::bands(changed)
            }
            Command::ClearSelection => Affected::bands(self.selection.clear(&mut self.registry)),
            Command::ColorSelection(color) => {
                for id in self.selection.members() {
                    self.store.set_band_color(id, color);
                }
                self.redraw()
            }
            Command::SetScale(scale) => {
                self.config.scale = validate_scale(scale)?;
                self.relayout()
            }
            Command::SetLayoutMode(mode) => {
                self.config.mode = mode;
                self.relayout()
            }
            Command::SetMergeThreshold(threshold) => {
                self.config.merge.threshold = threshold;
                self.relayout()
            }
        };
        Ok(affected)
    }
}
