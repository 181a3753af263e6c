//! Collapsing of fragmented translocation bands.
//!
//! Aligners often report one rearrangement as several adjacent micro-bands.
//! Neighbouring bands of a mergeable type are fused when they sit on the same
//! chromosome pair, are close on both axes, and no displayed band of a normal
//! type lies between them.

use crate::model::SyntenyRecord;
use log::{debug, info};

/// `(lo, hi)` of a possibly reversed interval.
fn span(start: i64, end: i64) -> (i64, i64) {
    (start.min(end), start.max(end))
}

/// Edge-to-edge distance between two intervals, 0 when they overlap.
fn axis_gap(a: (i64, i64), b: (i64, i64)) -> i64 {
    (a.0.max(b.0) - a.1.min(b.1)).max(0)
}

/// Open region strictly between two disjoint intervals.
fn gap_region(a: (i64, i64), b: (i64, i64)) -> Option<(i64, i64)> {
    if a.1 < b.0 {
        Some((a.1, b.0))
    } else if b.1 < a.0 {
        Some((b.1, a.0))
    } else {
        None
    }
}

fn reaches_into(n: (i64, i64), region: Option<(i64, i64)>) -> bool {
    match region {
        Some((lo, hi)) => n.0 < hi && n.1 > lo,
        None => false,
    }
}

/// Extends `(start, end)` to cover `other`, keeping its direction.
fn extend(start: i64, end: i64, other: (i64, i64)) -> (i64, i64) {
    let (lo, hi) = span(start, end);
    let lo = lo.min(other.0);
    let hi = hi.max(other.1);
    if start <= end {
        (lo, hi)
    } else {
        (hi, lo)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BandMerger {
    threshold: i64,
}

impl BandMerger {
    pub fn new(threshold: i64) -> Self {
        BandMerger { threshold }
    }

    pub fn threshold(&self) -> i64 {
        self.threshold
    }

    /// Merges the mergeable bands of `bands` and appends every other band
    /// untouched. Identity when the threshold is not positive or there is
    /// nothing to merge. Otherwise the output lists the mergeable bands
    /// first, so the order changes even when nothing fuses.
    pub fn merge(&self, bands: &[SyntenyRecord]) -> Vec<SyntenyRecord> {
        let (mergeable, rest): (Vec<SyntenyRecord>, Vec<SyntenyRecord>) = bands
            .iter()
            .cloned()
            .partition(|b| b.band_type.is_mergeable());
        if self.threshold <= 0 || mergeable.is_empty() {
            return bands.to_vec();
        }
        let normal: Vec<SyntenyRecord> = rest
            .iter()
            .filter(|b| b.band_type.is_normal())
            .cloned()
            .collect();

        let mut reduced = self.merge_partitioned(&mergeable, &normal);
        info!(
            "Merged {} mergeable bands into {} (threshold {} bp)",
            mergeable.len(),
            reduced.len(),
            self.threshold
        );
        reduced.extend(rest);
        reduced
    }

    /// Reduces `mergeable` against the blocking `normal` bands. The walk is
    /// repeated until a pass fuses nothing, so the result is a fixpoint.
    pub fn merge_partitioned(
        &self,
        mergeable: &[SyntenyRecord],
        normal: &[SyntenyRecord],
    ) -> Vec<SyntenyRecord> {
        if self.threshold <= 0 || mergeable.is_empty() {
            return mergeable.to_vec();
        }
        let mut bands = mergeable.to_vec();
        let mut passes = 0;
        loop {
            let before = bands.len();
            bands = self.pass(&bands, normal);
            passes += 1;
            if bands.len() == before {
                break;
            }
        }
        debug!("Merge reached a fixpoint after {} passes", passes);
        bands
    }

    fn pass(&self, bands: &[SyntenyRecord], normal: &[SyntenyRecord]) -> Vec<SyntenyRecord> {
        let mut merged = Vec::with_capacity(bands.len());
        let mut iter = bands.iter();
        let Some(first) = iter.next() else {
            return merged;
        };
        let mut current = first.clone();

        for next in iter {
            if self.can_merge(&current, next, normal) {
                let (ref_start, ref_end) =
                    extend(current.ref_start, current.ref_end, span(next.ref_start, next.ref_end));
                let (query_start, query_end) = extend(
                    current.query_start,
                    current.query_end,
                    span(next.query_start, next.query_end),
                );
                current.ref_start = ref_start;
                current.ref_end = ref_end;
                current.query_start = query_start;
                current.query_end = query_end;
            } else {
                merged.push(std::mem::replace(&mut current, next.clone()));
            }
        }
        merged.push(current);
        merged
    }

    fn can_merge(&self, current: &SyntenyRecord, next: &SyntenyRecord, normal: &[SyntenyRecord]) -> bool {
        if current.ref_chr != next.ref_chr
            || current.query_chr != next.query_chr
            || current.band_type != next.band_type
        {
            return false;
        }
        let cur_ref = span(current.ref_start, current.ref_end);
        let next_ref = span(next.ref_start, next.ref_end);
        let cur_query = span(current.query_start, current.query_end);
        let next_query = span(next.query_start, next.query_end);

        if axis_gap(cur_ref, next_ref) > self.threshold
            || axis_gap(cur_query, next_query) > self.threshold
        {
            return false;
        }
        !intervenes(current, cur_ref, next_ref, cur_query, next_query, normal)
    }
}

/// A normal band blocks a merge when it reaches into the gap on the ref axis
/// of the same ref chromosome, or into the gap on the query axis of the same
/// query chromosome.
fn intervenes(
    current: &SyntenyRecord,
    cur_ref: (i64, i64),
    next_ref: (i64, i64),
    cur_query: (i64, i64),
    next_query: (i64, i64),
    normal: &[SyntenyRecord],
) -> bool {
    let ref_region = gap_region(cur_ref, next_ref);
    let query_region = gap_region(cur_query, next_query);
    if ref_region.is_none() && query_region.is_none() {
        return false;
    }
    normal.iter().any(|n| {
        let on_ref = n.ref_chr == current.ref_chr
            && reaches_into(span(n.ref_start, n.ref_end), ref_region);
        let on_query = n.query_chr == current.query_chr
            && reaches_into(span(n.query_start, n.query_end), query_region);
        on_ref || on_query
    })
}
