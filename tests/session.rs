use approx::assert_relative_eq;
use synflow::color::chrom_palette_color;
use synflow::{
    BandId, BandType, ChromosomeRef, ChromosomeTable, ColorMode, Command, DisplayMode, DisplaySetting,
    LayoutMode, Paint, PairRecords, Rgb, Scope, Session, SessionConfig, SynError, SyntenyRecord, TrackRole,
};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn rec(rc: &str, rs: i64, re: i64, qc: &str, qs: i64, qe: i64, t: &str) -> SyntenyRecord {
    SyntenyRecord::new(rc, rs, re, qc, qs, qe, t.parse().unwrap())
}

fn three_genomes() -> Session {
    init_logger();
    let chain = vec![
        ChromosomeTable::new("a", [("chr1", 1_000_000), ("chr2", 500_000)]),
        ChromosomeTable::new("b", [("b1", 1_000_000), ("b2", 600_000)]),
        ChromosomeTable::new("c", [("k1", 900_000), ("k2", 400_000)]),
    ];
    let pairs = vec![
        PairRecords {
            ref_genome: "a".into(),
            query_genome: "b".into(),
            records: vec![
                rec("chr1", 0, 200_000, "b1", 0, 200_000, "SYN"),
                rec("chr2", 100_000, 200_000, "b2", 250_000, 150_000, "INV"),
                rec("chr1", 300_000, 350_000, "b2", 10_000, 60_000, "INVTR"),
                rec("chrUn", 0, 10, "b1", 0, 10, "SYN"),
            ],
        },
        PairRecords {
            ref_genome: "b".into(),
            query_genome: "c".into(),
            records: vec![
                rec("b1", 0, 100_000, "k1", 0, 100_000, "SYN"),
                rec("b2", 0, 50_000, "k1", 500_000, 550_000, "TRANS"),
                rec("b1", 200_000, 210_000, "k2", 20_000, 30_000, "DUP"),
                rec("b1", 400_000, 410_000, "k1", 400_000, 410_000, "NOTAL"),
            ],
        },
    ];
    let config = SessionConfig {
        scale: 10_000.0,
        ..Default::default()
    };
    Session::new(config, chain, pairs).unwrap()
}

#[test]
fn draw_assigns_handles_in_chain_order() {
    let mut s = three_genomes();
    // chrUn is dropped, NOTAL is not a drawn type
    assert_eq!(s.draw(), 6);

    let refs: Vec<&str> = s.bands().iter().map(|b| b.meta.ref_genome.as_str()).collect();
    assert_eq!(refs, vec!["a", "a", "a", "b", "b", "b"]);
    assert_eq!(s.band(BandId(3)).unwrap().meta.band_type, BandType::Syn);
    assert_eq!(s.band(BandId(4)).unwrap().meta.query_chr, "k1");
    assert!(s.bands().iter().all(|b| b.visible && !b.selected));
}

#[test]
fn linear_chain_cascades_rows() {
    let mut s = three_genomes();
    s.draw();
    let first = s.band(BandId(0)).unwrap().ribbon;
    let second = s.band(BandId(3)).unwrap().ribbon;
    let track_height = s.config().layout.track_height();
    // the query row of the first pair is the reference row of the next
    assert_relative_eq!(second.ref_y, first.query_y + track_height);

    let layout = s.layout().unwrap();
    assert_eq!(layout.mode, LayoutMode::LinearChain);
    let ab = layout.pair("a", "b").unwrap();
    let bc = layout.pair("b", "c").unwrap();
    assert_relative_eq!(ab.get(1).unwrap().query_y, bc.get(1).unwrap().ref_y);
    assert_relative_eq!(ab.get(2).unwrap().ref_x, bc.get(2).unwrap().query_x);

    let ref_tracks = s
        .tracks()
        .iter()
        .filter(|t| t.track.role == TrackRole::Ref)
        .count();
    assert_eq!(ref_tracks, 2);
    assert_eq!(s.tracks().len(), 6);
}

#[test]
fn hiding_a_chromosome_hides_both_sides() {
    let mut s = three_genomes();
    s.draw();
    let affected = s
        .apply(Command::SetChromosomeVisible {
            genome: "b".into(),
            ordinal: 2,
            visible: false,
        })
        .unwrap();
    assert_eq!(affected.bands, vec![BandId(1), BandId(2), BandId(4)]);
    assert_eq!(affected.tracks, vec![ChromosomeRef::new("b", 2)]);
    // hidden, still addressable
    assert_eq!(s.bands().len(), 6);
    assert_eq!(s.bands().visible_count(), 3);
    let attrs = s.band(BandId(4)).unwrap().attributes();
    assert!(attrs.contains(&("display", "none".to_string())));
}

#[test]
fn composite_types_follow_their_constituents() {
    let mut s = three_genomes();
    s.draw();
    // band 1 is INV, band 2 INVTR, band 4 TRANS
    let affected = s.apply(Command::ToggleType(BandType::Inv)).unwrap();
    assert_eq!(affected.bands, vec![BandId(1), BandId(2)]);
    assert!(!s.band(BandId(2)).unwrap().visible);

    let affected = s.apply(Command::ToggleType(BandType::Trans)).unwrap();
    assert_eq!(affected.bands, vec![BandId(4)]);

    // INV back on, TRANS still off: INVTR stays hidden
    let affected = s.apply(Command::ToggleType(BandType::Inv)).unwrap();
    assert_eq!(affected.bands, vec![BandId(1)]);
    assert!(!s.band(BandId(2)).unwrap().visible);

    let affected = s.apply(Command::ToggleType(BandType::Trans)).unwrap();
    assert_eq!(affected.bands, vec![BandId(2), BandId(4)]);
    assert!(s.bands().iter().all(|b| b.visible));

    // the composite has no toggle of its own
    assert!(s.apply(Command::ToggleType(BandType::InvTr)).unwrap().is_empty());
}

#[test]
fn length_range_and_defaults() {
    let mut s = three_genomes();
    s.draw();
    assert_eq!(s.default_length_range(), Some((0, 210_000)));

    s.apply(Command::SetLengthRange {
        min: 150_000,
        max: 60_000,
    })
    .unwrap();
    let visible: Vec<BandId> = s.bands().iter().filter(|b| b.visible).map(|b| b.id).collect();
    assert_eq!(visible, vec![BandId(1), BandId(3)]);
}

#[test]
fn selection_color_and_envelope() {
    let mut s = three_genomes();
    s.draw();
    s.apply(Command::SelectBand {
        id: BandId(0),
        multi: false,
    })
    .unwrap();
    let affected = s
        .apply(Command::SelectBand {
            id: BandId(3),
            multi: true,
        })
        .unwrap();
    assert_eq!(affected.bands, vec![BandId(3)]);

    let red: Rgb = "#ff0000".parse().unwrap();
    let affected = s.apply(Command::ColorSelection(red)).unwrap();
    assert_eq!(affected.bands, vec![BandId(0), BandId(3)]);
    assert_eq!(s.band(BandId(0)).unwrap().fill, red);

    let env = s.envelope().unwrap();
    assert_eq!((env.ref_start, env.ref_end), (0, 200_000));
    assert_eq!((env.query_start, env.query_end), (0, 200_000));
    assert_eq!(env.members, vec![BandId(0), BandId(3)]);
    assert_eq!(env.ref_genome, "a");
    assert_eq!(env.band_type, BandType::Syn);

    // a new scale reissues handles and forgets per-band colors
    let affected = s.apply(Command::SetScale(20_000.0)).unwrap();
    assert!(affected.relayout);
    assert!(s.envelope().is_none());
    assert_ne!(s.band(BandId(0)).unwrap().fill, red);
}

#[test]
fn selecting_unknown_handle_fails_without_side_effects() {
    let mut s = three_genomes();
    s.draw();
    s.apply(Command::SelectBand {
        id: BandId(1),
        multi: false,
    })
    .unwrap();
    assert_eq!(
        s.apply(Command::SelectBand {
            id: BandId(42),
            multi: false
        }),
        Err(SynError::UnknownBand(42))
    );
    assert_eq!(s.selection().members(), vec![BandId(1)]);
}

#[test]
fn chrom_color_mode_follows_reference_ordinal() {
    let mut s = three_genomes();
    s.draw();
    s.apply(Command::SetColorMode(ColorMode::ByChrom)).unwrap();
    for band in s.bands().iter() {
        assert_eq!(band.fill, chrom_palette_color(band.meta.ref_ordinal));
    }

    let teal: Rgb = "#008080".parse().unwrap();
    s.apply(Command::OverrideDisplay {
        scope: Scope::Chromosome {
            genome: "b".into(),
            element_id: "b2_query".into(),
        },
        setting: DisplaySetting::color(teal),
    })
    .unwrap();
    // only band 4 starts on b2
    assert_eq!(s.band(BandId(4)).unwrap().fill, teal);
    assert_ne!(s.band(BandId(1)).unwrap().fill, teal);
}

#[test]
fn empty_chromosome_scope_is_rejected() {
    let mut s = three_genomes();
    s.draw();
    let before: Vec<Paint> = s.tracks().iter().map(|t| t.fill.clone()).collect();
    let result = s.apply(Command::OverrideDisplay {
        scope: Scope::Chromosome {
            genome: "a".into(),
            element_id: "_ref".into(),
        },
        setting: DisplaySetting::mode(DisplayMode::Filled),
    });
    assert_eq!(result, Err(SynError::EmptyChromosomeName("_ref".into())));
    let after: Vec<Paint> = s.tracks().iter().map(|t| t.fill.clone()).collect();
    assert_eq!(before, after);
}

#[test]
fn heatmap_tracks_use_registered_gradients() {
    let mut s = three_genomes();
    s.draw();
    s.apply(Command::SetDensities {
        genome: "a".into(),
        densities: [(1, vec![1.0, 4.0, 2.0, 0.0])].into_iter().collect(),
    })
    .unwrap();
    s.apply(Command::OverrideDisplay {
        scope: Scope::Genome("a".into()),
        setting: DisplaySetting::mode(DisplayMode::Heatmap),
    })
    .unwrap();

    let fill_of = |ordinal: u32| {
        s.tracks()
            .iter()
            .find(|t| t.track.genome == "a" && t.track.ordinal == ordinal)
            .map(|t| t.fill.clone())
            .unwrap()
    };
    assert_eq!(fill_of(1), Paint::Gradient("grad-a-1".into()));
    assert!(matches!(fill_of(2), Paint::Solid(_)));

    assert_eq!(
        s.apply(Command::SetDensities {
            genome: "nope".into(),
            densities: Default::default(),
        }),
        Err(SynError::UnknownGenome("nope".into()))
    );
}

#[test]
fn stacked_mode_aligns_every_track_on_the_left_margin() {
    let mut s = three_genomes();
    s.draw();
    let affected = s.apply(Command::SetLayoutMode(LayoutMode::Stacked)).unwrap();
    assert!(affected.relayout);
    assert_eq!(s.layout().unwrap().mode, LayoutMode::Stacked);
    let margin = s.config().layout.margin_left;
    for track in s.tracks() {
        assert_relative_eq!(track.track.x, margin);
    }
    assert_eq!(s.bands().len(), 6);
}
