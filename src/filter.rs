//! Visibility predicate over rendered bands and chromosome tracks.
//!
//! Every axis of [`FilterState`] is optional and an absent axis lets
//! everything through, so a session without any filter input shows all bands.

use crate::model::BandType;
use crate::render::BandMeta;
use rustc_hash::FxHashSet;

/// Margin added on both sides of the observed band lengths for the default
/// length range.
pub const LENGTH_RANGE_MARGIN: i64 = 10_000;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChromosomeRef {
    pub genome: String,
    pub ordinal: u32,
}

impl ChromosomeRef {
    pub fn new(genome: &str, ordinal: u32) -> Self {
        ChromosomeRef {
            genome: genome.to_string(),
            ordinal,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterState {
    pub enabled_types: Option<FxHashSet<BandType>>,
    pub visible_chromosomes: Option<FxHashSet<ChromosomeRef>>,
    pub show_inter: Option<bool>,
    pub show_intra: Option<bool>,
    /// Inclusive `[min, max]` band length in bp.
    pub length_range: Option<(i64, i64)>,
}

impl FilterState {
    /// Flips one primitive type; the first toggle starts from every
    /// toggleable type enabled. Returns whether the type is now enabled, or
    /// `None` for a composite type, which has no toggle of its own.
    pub fn toggle_type(&mut self, band_type: &BandType) -> Option<bool> {
        if band_type.is_composite() {
            return None;
        }
        let enabled = self
            .enabled_types
            .get_or_insert_with(|| BandType::TOGGLEABLE.iter().cloned().collect());
        if enabled.remove(band_type) {
            Some(false)
        } else {
            enabled.insert(band_type.clone());
            Some(true)
        }
    }

    /// Shows or hides one chromosome. `universe` seeds the visible set the
    /// first time a chromosome is touched.
    pub fn set_chromosome_visible<I>(&mut self, chrom: ChromosomeRef, visible: bool, universe: I)
    where
        I: IntoIterator<Item = ChromosomeRef>,
    {
        let set = self
            .visible_chromosomes
            .get_or_insert_with(|| universe.into_iter().collect());
        if visible {
            set.insert(chrom);
        } else {
            set.remove(&chrom);
        }
    }

    pub fn reset(&mut self) {
        *self = FilterState::default();
    }
}

/// Default length range: observed extremes widened by
/// [`LENGTH_RANGE_MARGIN`], never below zero.
pub fn length_bounds<I: IntoIterator<Item = i64>>(lengths: I) -> Option<(i64, i64)> {
    let mut iter = lengths.into_iter();
    let first = iter.next()?;
    let (min, max) = iter.fold((first, first), |(lo, hi), l| (lo.min(l), hi.max(l)));
    Some((
        (min - LENGTH_RANGE_MARGIN).max(0),
        max.saturating_add(LENGTH_RANGE_MARGIN),
    ))
}

pub struct VisibilityFilter;

impl VisibilityFilter {
    pub fn chromosome_visible(state: Option<&FilterState>, genome: &str, ordinal: u32) -> bool {
        match state.and_then(|s| s.visible_chromosomes.as_ref()) {
            Some(set) => set.contains(&ChromosomeRef::new(genome, ordinal)),
            None => true,
        }
    }

    /// A type shows when all its constituents are enabled; a primitive type
    /// is its own sole constituent.
    pub fn type_visible(state: Option<&FilterState>, band_type: &BandType) -> bool {
        match state.and_then(|s| s.enabled_types.as_ref()) {
            Some(enabled) => band_type
                .constituents()
                .iter()
                .all(|t| enabled.contains(t)),
            None => true,
        }
    }

    pub fn position_visible(state: Option<&FilterState>, inter: bool) -> bool {
        let Some(state) = state else {
            return true;
        };
        if inter {
            state.show_inter.unwrap_or(true)
        } else {
            state.show_intra.unwrap_or(true)
        }
    }

    pub fn length_visible(state: Option<&FilterState>, length: i64) -> bool {
        match state.and_then(|s| s.length_range) {
            Some((min, max)) => length >= min && length <= max,
            None => true,
        }
    }

    pub fn is_visible(band: &BandMeta, state: Option<&FilterState>) -> bool {
        Self::chromosome_visible(state, &band.ref_genome, band.ref_ordinal)
            && Self::chromosome_visible(state, &band.query_genome, band.query_ordinal)
            && Self::type_visible(state, &band.band_type)
            && Self::position_visible(state, band.inter)
            && Self::length_visible(state, band.length)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(band_type: BandType, ref_ordinal: u32, query_ordinal: u32, length: i64) -> BandMeta {
        BandMeta {
            band_type,
            ref_genome: "a".into(),
            query_genome: "b".into(),
            ref_chr: format!("chr{}", ref_ordinal),
            query_chr: format!("chr{}", query_ordinal),
            ref_ordinal,
            query_ordinal,
            ref_start: 0,
            ref_end: length,
            query_start: 0,
            query_end: length,
            length,
            inter: ref_ordinal != query_ordinal,
        }
    }

    #[test]
    fn missing_state_shows_everything() {
        let band = meta(BandType::InvTr, 1, 2, 500);
        assert!(VisibilityFilter::is_visible(&band, None));
        assert!(VisibilityFilter::is_visible(&band, Some(&FilterState::default())));
    }

    #[test]
    fn composite_type_needs_every_constituent() {
        let band = meta(BandType::InvTr, 1, 1, 500);
        let mut state = FilterState {
            enabled_types: Some([BandType::Inv, BandType::Trans].into_iter().collect()),
            ..Default::default()
        };
        assert!(VisibilityFilter::is_visible(&band, Some(&state)));

        state.enabled_types = Some([BandType::Inv].into_iter().collect());
        assert!(!VisibilityFilter::is_visible(&band, Some(&state)));

        // enabling the composite itself is not enough
        state.enabled_types = Some([BandType::InvTr].into_iter().collect());
        assert!(!VisibilityFilter::is_visible(&band, Some(&state)));
    }

    #[test]
    fn toggling_either_constituent_hides_the_composite() {
        let band = meta(BandType::InvTr, 1, 1, 500);
        let mut state = FilterState::default();
        assert_eq!(state.toggle_type(&BandType::Trans), Some(false));
        assert!(!VisibilityFilter::is_visible(&band, Some(&state)));

        assert_eq!(state.toggle_type(&BandType::Trans), Some(true));
        assert!(VisibilityFilter::is_visible(&band, Some(&state)));

        assert_eq!(state.toggle_type(&BandType::Inv), Some(false));
        assert!(!VisibilityFilter::is_visible(&band, Some(&state)));
        assert!(VisibilityFilter::is_visible(&meta(BandType::Trans, 1, 1, 500), Some(&state)));

        assert_eq!(state.toggle_type(&BandType::Inv), Some(true));
        assert!(VisibilityFilter::is_visible(&band, Some(&state)));
    }

    #[test]
    fn composite_types_have_no_toggle() {
        let mut state = FilterState::default();
        assert_eq!(state.toggle_type(&BandType::InvTr), None);
        assert_eq!(state, FilterState::default());
    }

    #[test]
    fn inter_intra_and_length_axes() {
        let inter = meta(BandType::Syn, 1, 2, 500);
        let intra = meta(BandType::Syn, 1, 1, 500);
        let state = FilterState {
            show_inter: Some(false),
            ..Default::default()
        };
        assert!(!VisibilityFilter::is_visible(&inter, Some(&state)));
        assert!(VisibilityFilter::is_visible(&intra, Some(&state)));

        let state = FilterState {
            length_range: Some((100, 500)),
            ..Default::default()
        };
        assert!(VisibilityFilter::is_visible(&intra, Some(&state)));
        assert!(!VisibilityFilter::is_visible(&meta(BandType::Syn, 1, 1, 501), Some(&state)));
        assert!(!VisibilityFilter::is_visible(&meta(BandType::Syn, 1, 1, 99), Some(&state)));
    }

    #[test]
    fn both_endpoint_chromosomes_must_be_visible() {
        let band = meta(BandType::Syn, 1, 2, 500);
        let universe = vec![
            ChromosomeRef::new("a", 1),
            ChromosomeRef::new("a", 2),
            ChromosomeRef::new("b", 1),
            ChromosomeRef::new("b", 2),
        ];
        let mut state = FilterState::default();
        state.set_chromosome_visible(ChromosomeRef::new("b", 2), false, universe.clone());
        assert!(!VisibilityFilter::is_visible(&band, Some(&state)));
        assert!(VisibilityFilter::chromosome_visible(Some(&state), "a", 2));

        state.set_chromosome_visible(ChromosomeRef::new("b", 2), true, universe);
        assert!(VisibilityFilter::is_visible(&band, Some(&state)));
    }

    #[test]
    fn default_length_bounds() {
        assert_eq!(length_bounds(Vec::new()), None);
        assert_eq!(length_bounds(vec![5_000, 80_000, 20_000]), Some((0, 90_000)));
        assert_eq!(length_bounds(vec![50_000]), Some((40_000, 60_000)));
    }
}
