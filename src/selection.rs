//! Interactive band selection.

use crate::error::{Result, SynError};
use crate::model::{BandId, BandType};
use crate::registry::BandRegistry;
use crate::render::BandMeta;
use indexmap::IndexSet;
use log::{debug, warn};

/// Bounding coordinates of a non-empty selection, for the detail panel.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub ref_start: i64,
    pub ref_end: i64,
    pub query_start: i64,
    pub query_end: i64,
    pub members: Vec<BandId>,
    /// Taken from the first selected band.
    pub ref_genome: String,
    pub query_genome: String,
    pub ref_chr: String,
    pub query_chr: String,
    pub band_type: BandType,
}

/// Smallest of the two edge-to-edge distances between two intervals.
pub fn edge_distance(a_start: i64, a_end: i64, b_start: i64, b_end: i64) -> i64 {
    (a_end - b_start).abs().min((b_end - a_start).abs())
}

/// Both axes must be within `max_distance`, each measured on its own.
pub fn bands_close(a: &BandMeta, b: &BandMeta, max_distance: i64) -> bool {
    let ref_dist = edge_distance(a.ref_start, a.ref_end, b.ref_start, b.ref_end);
    let query_dist = edge_distance(a.query_start, a.query_end, b.query_start, b.query_end);
    ref_dist <= max_distance && query_dist <= max_distance
}

fn same_family(a: &BandMeta, b: &BandMeta) -> bool {
    a.band_type == b.band_type
        && a.ref_ordinal == b.ref_ordinal
        && a.query_ordinal == b.query_ordinal
        && a.ref_genome == b.ref_genome
        && a.query_genome == b.query_genome
}

#[derive(Debug, Clone, Default)]
pub struct SelectionManager {
    selected: IndexSet<BandId>,
}

impl SelectionManager {
    pub fn new() -> Self {
        SelectionManager::default()
    }

    pub fn contains(&self, id: BandId) -> bool {
        self.selected.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Members in insertion order.
    pub fn members(&self) -> Vec<BandId> {
        self.selected.iter().copied().collect()
    }

    /// Pushes the selection into the registry's flags; returns changed handles.
    fn refresh(&self, registry: &mut BandRegistry) -> Vec<BandId> {
        registry.refresh_selected(|id| self.selected.contains(&id))
    }

    fn check(registry: &BandRegistry, id: BandId) -> Result<()> {
        if registry.contains(id) {
            Ok(())
        } else {
            warn!("Selection ignored: {} is not a drawn band", id);
            Err(SynError::UnknownBand(id.0))
        }
    }

    pub fn clear(&mut self, registry: &mut BandRegistry) -> Vec<BandId> {
        self.selected.clear();
        self.refresh(registry)
    }

    /// With `multi` the band's membership flips; otherwise the selection
    /// becomes exactly this band.
    pub fn toggle_or_replace(
        &mut self,
        registry: &mut BandRegistry,
        id: BandId,
        multi: bool,
    ) -> Result<Vec<BandId>> {
        Self::check(registry, id)?;
        if multi {
            if !self.selected.shift_remove(&id) {
                self.selected.insert(id);
            }
        } else {
            self.selected.clear();
            self.selected.insert(id);
        }
        Ok(self.refresh(registry))
    }

    /// Selects `source` plus every band of the same type, chromosome pair and
    /// genome pair lying within `max_distance` of it on both axes.
    pub fn select_similar(
        &mut self,
        registry: &mut BandRegistry,
        source: BandId,
        max_distance: i64,
    ) -> Result<Vec<BandId>> {
        Self::check(registry, source)?;
        self.selected.clear();
        self.selected.insert(source);

        if let Some(src) = registry.get(source).map(|b| b.meta.clone()) {
            for band in registry.iter() {
                if band.id != source
                    && same_family(&src, &band.meta)
                    && bands_close(&src, &band.meta, max_distance)
                {
                    self.selected.insert(band.id);
                }
            }
        }
        debug!(
            "Selected {} bands similar to {} within {} bp",
            self.selected.len(),
            source,
            max_distance
        );
        Ok(self.refresh(registry))
    }

    pub fn envelope(&self, registry: &BandRegistry) -> Option<Envelope> {
        let metas: Vec<(BandId, &BandMeta)> = self
            .selected
            .iter()
            .filter_map(|&id| registry.get(id).map(|b| (id, &b.meta)))
            .collect();
        let (_, first) = metas.first()?;

        let mut envelope = Envelope {
            ref_start: i64::MAX,
            ref_end: i64::MIN,
            query_start: i64::MAX,
            query_end: i64::MIN,
            members: Vec::with_capacity(metas.len()),
            ref_genome: first.ref_genome.clone(),
            query_genome: first.query_genome.clone(),
            ref_chr: first.ref_chr.clone(),
            query_chr: first.query_chr.clone(),
            band_type: first.band_type.clone(),
        };
        for (id, meta) in &metas {
            envelope.ref_start = envelope.ref_start.min(meta.ref_start);
            envelope.ref_end = envelope.ref_end.max(meta.ref_end);
            envelope.query_start = envelope.query_start.min(meta.query_start);
            envelope.query_end = envelope.query_end.max(meta.query_end);
            envelope.members.push(*id);
        }
        Some(envelope)
    }
}
