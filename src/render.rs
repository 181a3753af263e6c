//! Ribbon geometry and presentation attributes for bands and chromosome tracks.

use crate::color::{DisplayMode, DisplayStore, ResolvedStyle, Rgb};
use crate::config::LayoutConfig;
use crate::filter::{FilterState, VisibilityFilter};
use crate::layout::{ChromosomeTrack, PairLayout};
use crate::model::{BandId, BandType, ChromosomeTable, SyntenyRecord, TrackRole};
use crate::path::{fmt_num, PathBuilder};
use log::error;

/// Descriptive facts of a drawn band, read by the filter and the selection.
#[derive(Debug, Clone, PartialEq)]
pub struct BandMeta {
    pub band_type: BandType,
    pub ref_genome: String,
    pub query_genome: String,
    pub ref_chr: String,
    pub query_chr: String,
    pub ref_ordinal: u32,
    pub query_ordinal: u32,
    pub ref_start: i64,
    pub ref_end: i64,
    pub query_start: i64,
    pub query_end: i64,
    /// `ref_end - ref_start`.
    pub length: i64,
    /// Reference and query ordinals differ.
    pub inter: bool,
}

/// Pixel corners of a ribbon. For inverted types the query corners are
/// already swapped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ribbon {
    pub ref_start_x: f64,
    pub ref_end_x: f64,
    pub query_start_x: f64,
    pub query_end_x: f64,
    pub ref_y: f64,
    pub query_y: f64,
}

impl Ribbon {
    /// Closed cubic Bezier band: down to the query start, across the query
    /// interval, back up to the reference end.
    pub fn path_data(&self) -> String {
        let mid_y = (self.ref_y + self.query_y) / 2.0;
        PathBuilder::new()
            .move_to(self.ref_start_x, self.ref_y)
            .curve_to(
                (self.ref_start_x, mid_y),
                (self.query_start_x, mid_y),
                self.query_start_x,
                self.query_y,
            )
            .line_to(self.query_end_x, self.query_y)
            .curve_to(
                (self.query_end_x, mid_y),
                (self.ref_end_x, mid_y),
                self.ref_end_x,
                self.ref_y,
            )
            .close()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedBand {
    pub id: BandId,
    pub meta: BandMeta,
    pub ribbon: Ribbon,
    pub path: String,
    pub fill: Rgb,
    pub opacity: f64,
    /// Hidden bands stay in the registry and keep their handle.
    pub visible: bool,
    pub selected: bool,
}

impl RenderedBand {
    /// Attribute bag for the SVG/DOM layer.
    pub fn attributes(&self) -> Vec<(&'static str, String)> {
        let m = &self.meta;
        let mut attrs = vec![
            ("d", self.path.clone()),
            ("fill", self.fill.to_string()),
            ("opacity", fmt_num(self.opacity)),
            (
                "class",
                if self.selected {
                    "band band-selected".to_string()
                } else {
                    "band".to_string()
                },
            ),
            ("data-band-id", self.id.0.to_string()),
            ("data-length", m.length.to_string()),
            ("data-pos", if m.inter { "inter" } else { "intra" }.to_string()),
            ("data-type", m.band_type.to_string()),
            ("data-ref-genome", m.ref_genome.clone()),
            ("data-ref", m.ref_chr.clone()),
            ("data-ref-num", m.ref_ordinal.to_string()),
            ("data-query-num", m.query_ordinal.to_string()),
            ("data-query", m.query_chr.clone()),
            ("data-query-genome", m.query_genome.clone()),
            ("data-ref-start", m.ref_start.to_string()),
            ("data-ref-end", m.ref_end.to_string()),
            ("data-query-start", m.query_start.to_string()),
            ("data-query-end", m.query_end.to_string()),
        ];
        if !self.visible {
            attrs.push(("display", "none".to_string()));
        }
        attrs
    }
}

pub struct BandRenderer<'a> {
    ref_table: &'a ChromosomeTable,
    query_table: &'a ChromosomeTable,
    pair: &'a PairLayout,
    config: &'a LayoutConfig,
    scale: f64,
}

impl<'a> BandRenderer<'a> {
    pub fn new(
        ref_table: &'a ChromosomeTable,
        query_table: &'a ChromosomeTable,
        pair: &'a PairLayout,
        config: &'a LayoutConfig,
        scale: f64,
    ) -> Self {
        BandRenderer {
            ref_table,
            query_table,
            pair,
            config,
            scale,
        }
    }

    /// Ordinals and pixel corners of a record, or `None` (logged) when a
    /// chromosome name is unknown or has no layout position.
    pub fn prepare(&self, record: &SyntenyRecord) -> Option<(BandMeta, Ribbon)> {
        let ref_ordinal = self.ref_table.ordinal_of(&record.ref_chr);
        let query_ordinal = self.query_table.ordinal_of(&record.query_chr);
        let (Some(ref_ordinal), Some(query_ordinal)) = (ref_ordinal, query_ordinal) else {
            error!(
                "Unknown chromosome for ref: {} ({}) or query: {} ({})",
                record.ref_chr,
                self.ref_table.genome(),
                record.query_chr,
                self.query_table.genome()
            );
            return None;
        };
        let (Some(ref_pos), Some(query_pos)) = (self.pair.get(ref_ordinal), self.pair.get(query_ordinal))
        else {
            error!(
                "Invalid chromosome position for ref: {} or query: {}",
                record.ref_chr, record.query_chr
            );
            return None;
        };

        let mut query_start_x = query_pos.query_x + record.query_start as f64 / self.scale;
        let mut query_end_x = query_pos.query_x + record.query_end as f64 / self.scale;
        if record.band_type.is_inverted() {
            std::mem::swap(&mut query_start_x, &mut query_end_x);
        }
        let ribbon = Ribbon {
            ref_start_x: ref_pos.ref_x + record.ref_start as f64 / self.scale,
            ref_end_x: ref_pos.ref_x + record.ref_end as f64 / self.scale,
            query_start_x,
            query_end_x,
            ref_y: ref_pos.ref_y + self.config.ref_band_offset(),
            query_y: query_pos.query_y + self.config.query_band_offset(),
        };

        let meta = BandMeta {
            band_type: record.band_type.clone(),
            ref_genome: self.ref_table.genome().to_string(),
            query_genome: self.query_table.genome().to_string(),
            ref_chr: record.ref_chr.clone(),
            query_chr: record.query_chr.clone(),
            ref_ordinal,
            query_ordinal,
            ref_start: record.ref_start,
            ref_end: record.ref_end,
            query_start: record.query_start,
            query_end: record.query_end,
            length: record.length(),
            inter: ref_ordinal != query_ordinal,
        };
        Some((meta, ribbon))
    }

    /// Completes a prepared band. On a first draw every band is shown;
    /// afterwards the filter decides, hiding rather than omitting.
    pub fn finish(
        &self,
        id: BandId,
        meta: BandMeta,
        ribbon: Ribbon,
        fill: Rgb,
        is_first_draw: bool,
        filter: Option<&FilterState>,
    ) -> RenderedBand {
        let visible = is_first_draw || VisibilityFilter::is_visible(&meta, filter);
        RenderedBand {
            id,
            path: ribbon.path_data(),
            meta,
            ribbon,
            fill,
            opacity: self.config.band_opacity,
            visible,
            selected: false,
        }
    }

    pub fn render(
        &self,
        id: BandId,
        record: &SyntenyRecord,
        store: &DisplayStore,
        is_first_draw: bool,
        filter: Option<&FilterState>,
    ) -> Option<RenderedBand> {
        let (meta, ribbon) = self.prepare(record)?;
        let fill = store.resolve_band_color(
            id,
            &meta.band_type,
            &meta.ref_genome,
            &meta.ref_chr,
            meta.ref_ordinal,
        );
        Some(self.finish(id, meta, ribbon, fill, is_first_draw, filter))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    None,
    Solid(Rgb),
    /// Reference to a registered gradient id.
    Gradient(String),
}

impl Paint {
    pub fn to_attr(&self) -> String {
        match self {
            Paint::None => "none".to_string(),
            Paint::Solid(c) => c.to_string(),
            Paint::Gradient(id) => format!("url(#{})", id),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedTrack {
    pub track: ChromosomeTrack,
    pub element_id: String,
    pub path: String,
    pub style: ResolvedStyle,
    pub stroke: Rgb,
    pub fill: Paint,
    pub visible: bool,
}

impl RenderedTrack {
    pub fn attributes(&self) -> Vec<(&'static str, String)> {
        let mut attrs = vec![
            ("d", self.path.clone()),
            ("id", self.element_id.clone()),
            ("class", "chrom".to_string()),
            ("data-genome", self.track.genome.clone()),
            ("data-chrom-num", self.track.ordinal.to_string()),
            ("stroke", self.stroke.to_string()),
            ("fill", self.fill.to_attr()),
        ];
        if !self.visible {
            attrs.push(("display", "none".to_string()));
        }
        attrs
    }
}

/// Resolves a track's style and turns the display mode into paint.
pub fn render_track(
    track: &ChromosomeTrack,
    store: &DisplayStore,
    config: &LayoutConfig,
    filter: Option<&FilterState>,
) -> RenderedTrack {
    let style = store.resolve_chromosome(&track.genome, &track.name, track.ordinal);
    let fill = match style.mode {
        DisplayMode::Outline => Paint::None,
        DisplayMode::Filled => Paint::Solid(style.color),
        // density gradients are painted on reference tracks only
        DisplayMode::Heatmap => match store.gradient(&track.genome, track.ordinal) {
            Some(g) if track.role == TrackRole::Ref => Paint::Gradient(g.id.clone()),
            _ => Paint::Solid(style.color),
        },
    };
    RenderedTrack {
        element_id: track.element_id(),
        path: track.path_data(config.end_cap_radius),
        track: track.clone(),
        style,
        stroke: style.color,
        fill,
        visible: VisibilityFilter::chromosome_visible(filter, &track.genome, track.ordinal),
    }
}
