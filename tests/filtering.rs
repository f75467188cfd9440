mod common;

use std::collections::BTreeSet;

use abp_terminal::filter::{self, Dimension, FilterSpec, time_bucket_options};
use abp_terminal::table::{Field, TimeBucket};

fn halves(values: &[&str]) -> BTreeSet<String> {
    values.iter().map(|v| v.to_string()).collect()
}

#[test]
fn unrestricted_spec_keeps_every_row() {
    let table = common::liga();
    let filtered = filter::apply(&table, &FilterSpec::new());
    assert_eq!(filtered, table);
}

#[test]
fn dimensions_combine_as_a_conjunction() {
    let table = common::liga();
    let spec = FilterSpec::new()
        .with_values(Dimension::AttackingTeam, ["FCB"])
        .with_values(Dimension::SetPieceType, ["Córner"]);
    let filtered = filter::apply(&table, &spec);

    assert_eq!(filtered.len(), 2);
    for row in filtered.rows() {
        assert_eq!(row.attacking_team.as_deref(), Some("FCB"));
        assert_eq!(row.set_piece_type.as_deref(), Some("Córner"));
    }
}

#[test]
fn filtered_rows_are_a_subsequence_of_the_table() {
    let table = common::liga();
    let spec = FilterSpec::new().with_values(Dimension::MatchHalf, ["Primera"]);
    let filtered = filter::apply(&table, &spec);

    let mut cursor = 0;
    for row in filtered.rows() {
        let pos = table.rows()[cursor..]
            .iter()
            .position(|candidate| candidate == row)
            .expect("filtered row comes from the table");
        cursor += pos + 1;
    }
    assert_eq!(filtered.len(), 3);
    assert_eq!(filtered.columns(), table.columns());
}

#[test]
fn empty_selection_matches_nothing() {
    let table = common::liga();
    let spec = FilterSpec::new().with_values(Dimension::Season, Vec::<String>::new());
    assert!(filter::apply(&table, &spec).is_empty());
}

#[test]
fn omitted_dimension_equals_selecting_every_value() {
    let table = common::liga();
    let every_team = table.distinct_values(Field::AttackingTeam);
    let spec = FilterSpec::new().with_values(Dimension::AttackingTeam, every_team);
    assert_eq!(
        filter::apply(&table, &spec),
        filter::apply(&table, &FilterSpec::new())
    );
}

#[test]
fn matchday_range_is_inclusive() {
    let table = common::liga();
    let spec = FilterSpec::new().with_matchdays(2, 3);
    let filtered = filter::apply(&table, &spec);
    assert_eq!(filtered.len(), 3);
    assert!(filtered.rows().iter().all(|r| matches!(r.matchday, Some(2..=3))));
}

#[test]
fn rows_without_matchday_never_match_a_range() {
    let csv = "\
temporada,jornada,abp_tipo,jugador_ejecutor,equipo_atacante,equipo_defensor,tiro
2024/25,J1,Córner,Pedri,FCB,RMA,SI
2024/25,4,Córner,Pedri,FCB,RMA,SI
";
    let table = abp_terminal::loader::load_csv_reader(csv.as_bytes()).unwrap();
    let filtered = filter::apply(&table, &FilterSpec::new().with_matchdays(1, 38));
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered.rows()[0].matchday, Some(4));
}

#[test]
fn selection_on_absent_optional_column_is_skipped() {
    let table = common::minimal();
    let spec = FilterSpec::new().with_values(Dimension::TargetPlayer, ["Araujo"]);
    assert_eq!(filter::apply(&table, &spec).len(), table.len());
}

#[test]
fn time_bucket_options_follow_the_half_selection() {
    let table = common::liga();

    assert_eq!(
        time_bucket_options(&table, Some(&halves(&["Primera"]))),
        vec![TimeBucket::Min0To15, TimeBucket::Min16To30, TimeBucket::FirstHalfExtra]
    );
    assert_eq!(
        time_bucket_options(&table, Some(&halves(&["Segunda"]))),
        vec![TimeBucket::Min61To75, TimeBucket::Min76To90]
    );

    let everything = vec![
        TimeBucket::Min0To15,
        TimeBucket::Min16To30,
        TimeBucket::FirstHalfExtra,
        TimeBucket::Min61To75,
        TimeBucket::Min76To90,
    ];
    assert_eq!(
        time_bucket_options(&table, Some(&halves(&["Primera", "Segunda"]))),
        everything
    );
    assert_eq!(time_bucket_options(&table, None), everything);
}

#[test]
fn bucket_ruled_out_by_half_is_not_accepted() {
    let table = common::liga();
    let spec = FilterSpec::new()
        .with_values(Dimension::MatchHalf, ["Primera"])
        .with_values(Dimension::TimeBucket, ["0-15", "76-90"]);
    let filtered = filter::apply(&table, &spec);
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered.rows()[0].time_bucket, Some(TimeBucket::Min0To15));
}

#[test]
fn filter_spec_loads_from_json() {
    let raw = r#"{
        "selections": { "attacking_team": ["RMA"], "ends_in_shot": ["NO"] },
        "matchdays": { "min": 1, "max": 1 }
    }"#;
    let spec: FilterSpec = serde_json::from_str(raw).unwrap();
    let filtered = filter::apply(&common::liga(), &spec);
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered.rows()[0].executing_player.as_deref(), Some("Modric"));
}

#[test]
fn selecting_every_target_keeps_rows_without_target() {
    let table = common::liga();
    let every_target = table.distinct_values(Field::TargetPlayer);
    let spec = FilterSpec::new().with_values(Dimension::TargetPlayer, every_target);

    let filtered = filter::apply(&table, &spec);
    assert_eq!(filtered.len(), 5);
    assert_eq!(filtered, filter::apply(&table, &FilterSpec::new()));
}

#[test]
fn partial_target_selection_still_drops_blank_targets() {
    let table = common::liga();
    let spec = FilterSpec::new().with_values(Dimension::TargetPlayer, ["Araujo", "Rudiger"]);
    let filtered = filter::apply(&table, &spec);
    assert_eq!(filtered.len(), 2);
    assert!(filtered.rows().iter().all(|r| r.target_player.is_some()));
}

#[test]
fn selecting_every_bucket_keeps_rows_without_bucket() {
    let csv = "\
temporada,jornada,abp_tipo,jugador_ejecutor,equipo_atacante,equipo_defensor,tiro,momento_rango
2024/25,1,Córner,Pedri,FCB,RMA,SI,0-15
2024/25,2,Córner,Pedri,FCB,RMA,NO,
2024/25,3,Córner,Pedri,FCB,RMA,NO,76-90
";
    let table = abp_terminal::loader::load_csv_reader(csv.as_bytes()).unwrap();
    let every_bucket = FilterSpec::new().with_values(Dimension::TimeBucket, ["0-15", "76-90"]);
    assert_eq!(filter::apply(&table, &every_bucket).len(), 3);

    let one_bucket = FilterSpec::new().with_values(Dimension::TimeBucket, ["0-15"]);
    assert_eq!(filter::apply(&table, &one_bucket).len(), 1);
}
