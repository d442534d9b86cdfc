use proptest::prelude::*;
use stitchkit_camtools::embroidery::{EmbroideryGenerator, EmbroideryParameters, MachineContext};
use stitchkit_core::{StitchEvent, StitchKind, StitchPattern};

fn unit_generator() -> EmbroideryGenerator {
    EmbroideryGenerator::new(EmbroideryParameters {
        scaling_factor: 1.0,
        ..Default::default()
    })
    .unwrap()
}

#[test]
fn test_two_stitch_pattern() {
    let events = vec![
        StitchEvent::new(0, 0.0, 0.0, StitchKind::Jump),
        StitchEvent::new(1, 10.0, 10.0, StitchKind::Stitch),
        StitchEvent::new(2, 20.0, 10.0, StitchKind::Stitch),
        StitchEvent::new(3, 0.0, 0.0, StitchKind::End),
    ];

    let lines = unit_generator().generate(&events).unwrap();
    assert_eq!(
        lines,
        vec![
            "M17",
            "M73 P0",
            "G4 P500",
            "G0 X0.00 Y0.00 F3000",
            "G4 P500",
            "M0 C1",
            "G0 X0.00 Y0.00 F3000",
            "M73 P25",
            "G0 X10.00 Y10.00 F3000",
            "M0 C100",
            "M42",
            "G4 P500",
            "G1 X10.00 Y10.00 F800",
            "M3 S200 I1",
            "M73 P50",
            "G1 X20.00 Y10.00 F800",
            "M3 S200 I1",
            "M73 P75",
            "M5",
            "M41",
            "G4 P500",
            "G0 X0.00 Y0.00 F3000",
            "M5",
            "M18",
        ]
    );
}

#[test]
fn test_empty_pattern_writes_header_and_footer() {
    let events: Vec<StitchEvent> = Vec::new();
    let mut lines: Vec<String> = Vec::new();
    let summary = unit_generator().generate_into(&events, &mut lines).unwrap();

    assert_eq!(
        lines,
        vec!["M17", "M73 P0", "G4 P500", "G0 X0.00 Y0.00 F3000", "G4 P500", "M0 C1", "M5", "M18"]
    );
    assert_eq!(summary.line_count, 8);
    assert_eq!(summary.color_count, 1);
    assert_eq!(summary.stitch_count, 0);
    assert!(summary.bounds.is_none());
}

#[test]
fn test_corners_skipped_without_stitches() {
    let gen = EmbroideryGenerator::new(EmbroideryParameters {
        visit_corners: true,
        ..Default::default()
    })
    .unwrap();
    let events: Vec<StitchEvent> = Vec::new();
    let lines = gen.generate(&events).unwrap();
    assert_eq!(lines.iter().filter(|l| l.starts_with("G0")).count(), 1);
}

#[test]
fn test_named_pattern_writes_comment() {
    let pattern = StitchPattern::new(
        Some("Rose".to_string()),
        vec![StitchEvent::new(0, 5.0, 5.0, StitchKind::Stitch)],
    )
    .unwrap();
    let lines = unit_generator().generate(&pattern).unwrap();
    assert_eq!(lines[0], "; rose");
}

#[test]
fn test_scaling_divides_coordinates() {
    let gen = EmbroideryGenerator::new(EmbroideryParameters {
        scaling_factor: 10.0,
        ..Default::default()
    })
    .unwrap();
    let events = vec![StitchEvent::new(0, 125.0, -33.0, StitchKind::Stitch)];
    let lines = gen.generate(&events).unwrap();
    assert!(lines.contains(&"G1 X12.50 Y-3.30 F800".to_string()));
}

#[test]
fn test_thread_inserted_once_per_segment() {
    let events = vec![
        StitchEvent::new(0, 1.0, 1.0, StitchKind::Stitch),
        StitchEvent::new(1, 2.0, 1.0, StitchKind::Stitch),
        StitchEvent::new(2, 2.0, 1.0, StitchKind::Trim),
        StitchEvent::new(3, 5.0, 5.0, StitchKind::Stitch),
        StitchEvent::new(4, 6.0, 5.0, StitchKind::Stitch),
        StitchEvent::new(5, 6.0, 5.0, StitchKind::ColorChange),
        StitchEvent::new(6, 9.0, 9.0, StitchKind::Stitch),
    ];

    let lines = unit_generator().generate(&events).unwrap();
    assert_eq!(lines.iter().filter(|l| *l == "M0 C100").count(), 3);
    assert!(lines.contains(&"M0 C2".to_string()));

    let trim = lines.iter().position(|l| l == "G0 X2.00 Y1.00 F3000").unwrap();
    let insert = trim + lines[trim..].iter().position(|l| l == "M0 C100").unwrap();
    let sew = trim + lines[trim..].iter().position(|l| l.starts_with("G1")).unwrap();
    assert!(insert < sew);
}

#[test]
fn test_detailed_preset_reports_every_percent() {
    let gen = EmbroideryGenerator::new(EmbroideryParameters {
        scaling_factor: 1.0,
        ..EmbroideryParameters::detailed()
    })
    .unwrap();
    let events: Vec<StitchEvent> = (0..10)
        .map(|i| StitchEvent::new(i, i as f64, 0.0, StitchKind::Jump))
        .collect();
    let lines = gen.generate(&events).unwrap();
    let progress: Vec<&String> = lines.iter().filter(|l| l.starts_with("M73")).collect();
    // M73 P0 in the header, then 10, 20, ... 90
    assert_eq!(progress.len(), 10);
    assert!(lines.iter().any(|l| l.starts_with("M201")));
}

fn kind_strategy() -> impl Strategy<Value = StitchKind> {
    prop_oneof![
        6 => Just(StitchKind::Stitch),
        1 => Just(StitchKind::Jump),
        1 => Just(StitchKind::Trim),
        1 => Just(StitchKind::ColorChange),
    ]
}

fn pattern_strategy() -> impl Strategy<Value = Vec<StitchEvent>> {
    prop::collection::vec((-500.0f64..500.0, -500.0f64..500.0, kind_strategy()), 0..60).prop_map(
        |items| {
            items
                .into_iter()
                .enumerate()
                .map(|(i, (x, y, kind))| StitchEvent::new(i as u64, x, y, kind))
                .collect()
        },
    )
}

proptest! {
    #[test]
    fn generation_is_deterministic(events in pattern_strategy(), clearance in 0.0f64..5.0) {
        let gen = EmbroideryGenerator::new(EmbroideryParameters {
            clearance: Some(clearance),
            ..EmbroideryParameters::detailed()
        }).unwrap();
        prop_assert_eq!(gen.generate(&events).unwrap(), gen.generate(&events).unwrap());
    }

    #[test]
    fn every_controlled_move_follows_thread_insertion(events in pattern_strategy()) {
        let lines = unit_generator().generate(&events).unwrap();
        let mut inserted = false;
        for line in &lines {
            if line == "M0 C100" {
                inserted = true;
            } else if line.starts_with("M0 C") && line != "M0 C101" {
                inserted = false;
            } else if line.starts_with("G1") {
                prop_assert!(inserted, "controlled move before insertion: {:?}", lines);
            }
        }
    }

    #[test]
    fn close_stitch_is_not_sewn(
        x in 1.0f64..100.0,
        y in 1.0f64..100.0,
        dx in -0.4f64..0.4,
        dy in -0.4f64..0.4,
    ) {
        let gen = EmbroideryGenerator::new(EmbroideryParameters {
            scaling_factor: 1.0,
            clearance: Some(1.0),
            ..Default::default()
        }).unwrap();

        let first = StitchEvent::new(0, x, y, StitchKind::Stitch);
        let second = StitchEvent::new(1, x + dx, y + dy, StitchKind::Stitch);

        let (ctx, _) = gen.step(MachineContext::new(), &first, 0);
        let (next, out) = gen.step(ctx, &second, 0);

        prop_assert_eq!(out.len(), 1);
        prop_assert!(out[0].to_string().starts_with("G0"));
        prop_assert_eq!(next.stitch_run_counter, ctx.stitch_run_counter);
    }
}
