mod common;

use abp_terminal::aggregate::{
    self, NumericStat, ViewInput, ViewRequest, ViewResult, count_by, cumulative_xg,
    defensive_ranking, grouped_numeric, kpis, team_comparison,
};
use abp_terminal::error::ViewError;
use abp_terminal::filter::{self, Dimension, FilterSpec};
use abp_terminal::table::{EventRecord, Field, Table};

fn xg_view(table: &Table, spec: &FilterSpec) -> Vec<aggregate::XgPoint> {
    let filtered = filter::apply(table, spec);
    let input = ViewInput {
        full: table,
        filtered: &filtered,
        spec,
    };
    match aggregate::compute(&input, &ViewRequest::CumulativeXg) {
        Ok(ViewResult::Xg(points)) => points,
        other => panic!("unexpected xg view: {other:?}"),
    }
}

#[test]
fn kpis_count_filtered_actions() {
    let table = common::liga();
    let spec = FilterSpec::new().with_values(Dimension::Season, ["2024/25"]);
    let filtered = filter::apply(&table, &spec);
    let k = kpis(&table, &filtered);

    assert_eq!(k.total_actions, 5);
    assert_eq!(k.filtered_actions, 4);
    assert_eq!(k.attacking_teams, 3);
    assert_eq!(k.defending_teams, 3);
    assert_eq!(k.shots, 2);
    assert_eq!(k.goals, Some(1));
    assert!((k.shot_pct - 50.0).abs() < 1e-9);
}

#[test]
fn kpis_on_empty_subset_do_not_divide_by_zero() {
    let table = common::minimal();
    let empty = filter::apply(
        &table,
        &FilterSpec::new().with_values(Dimension::Season, Vec::<String>::new()),
    );
    let k = kpis(&table, &empty);
    assert_eq!(k.filtered_actions, 0);
    assert_eq!(k.shot_pct, 0.0);
    assert_eq!(k.goals, None);
}

#[test]
fn distribution_ties_keep_first_appearance() {
    let rows = count_by(&common::liga(), Field::SetPieceType).unwrap();
    let keys = rows.iter().map(|r| r.key.as_str()).collect::<Vec<_>>();
    assert_eq!(keys, vec!["Córner", "Falta lateral", "Saque de banda"]);
    assert_eq!(rows[0].count, 3);
}

#[test]
fn top_n_truncates_the_distribution() {
    let table = common::liga();
    let spec = FilterSpec::new();
    let input = ViewInput {
        full: &table,
        filtered: &table,
        spec: &spec,
    };
    let request = ViewRequest::TopN {
        dimension: Dimension::ExecutingPlayer,
        n: 2,
    };
    let Ok(ViewResult::Counts(rows)) = aggregate::compute(&input, &request) else {
        panic!("top executors view failed");
    };
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].key, "Pedri");
    assert_eq!(rows[1].key, "Modric");
}

#[test]
fn view_over_missing_column_reports_the_column() {
    let table = common::minimal();
    let spec = FilterSpec::new();
    let input = ViewInput {
        full: &table,
        filtered: &table,
        spec: &spec,
    };
    let request = ViewRequest::Distribution {
        dimension: Dimension::TargetPlayer,
    };
    assert_eq!(
        aggregate::compute(&input, &request),
        Err(ViewError::MissingDimension("jugador_objetivo"))
    );
    // Other views keep working on the same input.
    assert!(aggregate::compute(&input, &ViewRequest::MatchdaySeries).is_ok());
}

#[test]
fn matchday_series_is_ascending() {
    let series = aggregate::matchday_series(&common::liga());
    let pairs = series
        .iter()
        .map(|p| (p.matchday, p.count))
        .collect::<Vec<_>>();
    assert_eq!(pairs, vec![(1, 2), (2, 1), (3, 2)]);
}

#[test]
fn season_series_groups_by_season() {
    let rows = aggregate::matchday_series_by(&common::liga(), Field::Season).unwrap();
    let triples = rows
        .iter()
        .map(|r| (r.group.as_str(), r.matchday, r.count))
        .collect::<Vec<_>>();
    assert_eq!(
        triples,
        vec![
            ("2023/24", 3, 1),
            ("2024/25", 1, 2),
            ("2024/25", 2, 1),
            ("2024/25", 3, 1),
        ]
    );
}

#[test]
fn cumulative_xg_covers_every_team_and_matchday() {
    let table = common::liga();
    let points = xg_view(&table, &FilterSpec::new());
    // ATM, FCB, RMA over matchdays 1..=3.
    assert_eq!(points.len(), 3 * 3);

    let fcb = points
        .iter()
        .filter(|p| p.team == "FCB")
        .map(|p| (p.matchday, p.xg, p.cumulative_xg))
        .collect::<Vec<_>>();
    assert_eq!(fcb.len(), 3);
    assert!((fcb[0].1 - 0.12).abs() < 1e-9);
    assert!((fcb[1].2 - 0.52).abs() < 1e-9);
    assert!((fcb[2].1).abs() < 1e-9);
    assert!((fcb[2].2 - 0.52).abs() < 1e-9);
}

#[test]
fn selected_team_with_no_rows_left_is_zero_filled() {
    let table = common::liga();
    let spec = FilterSpec::new()
        .with_values(Dimension::AttackingTeam, ["FCB", "ATM"])
        .with_values(Dimension::Season, ["2023/24"]);
    let points = xg_view(&table, &spec);

    assert_eq!(points.len(), 2 * 3);
    assert!(points.iter().all(|p| p.xg == 0.0 && p.cumulative_xg == 0.0));
    let teams = points.iter().map(|p| p.team.as_str()).collect::<Vec<_>>();
    assert_eq!(teams, vec!["ATM", "ATM", "ATM", "FCB", "FCB", "FCB"]);
}

#[test]
fn cumulative_xg_needs_the_xg_column() {
    let table = common::minimal();
    assert_eq!(
        cumulative_xg(&table, &["FCB".to_string()], &[1, 2]),
        Err(ViewError::MissingDimension("xg_tiro"))
    );
}

#[test]
fn mean_xg_ignores_actions_without_xg() {
    let rows = grouped_numeric(
        &common::liga(),
        Field::SetPieceType,
        Field::ExpectedGoals,
        NumericStat::Mean,
    )
    .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].key, "Córner");
    assert_eq!(rows[0].observations, 2);
    assert!((rows[0].value - 0.26).abs() < 1e-9);
}

fn defence_rows(team: &str, actions: usize, shots: usize) -> Vec<EventRecord> {
    (0..actions)
        .map(|idx| EventRecord {
            season: Some("2024/25".to_string()),
            matchday: Some(1),
            set_piece_type: Some("Córner".to_string()),
            executing_player: Some("X".to_string()),
            attacking_team: Some("ATT".to_string()),
            defending_team: Some(team.to_string()),
            ends_in_shot: Some(if idx < shots { "SI" } else { "NO" }.to_string()),
            ..EventRecord::default()
        })
        .collect()
}

#[test]
fn defensive_ranking_puts_fewest_shots_per_action_first() {
    let mut rows = defence_rows("B", 4, 2);
    rows.extend(defence_rows("A", 10, 2));
    let fields = [
        Field::Season,
        Field::Matchday,
        Field::SetPieceType,
        Field::ExecutingPlayer,
        Field::AttackingTeam,
        Field::DefendingTeam,
        Field::EndsInShot,
    ];
    let table = Table::with_fields(&fields, rows);

    let ranking = defensive_ranking(&table, 1).unwrap();
    assert_eq!(ranking.entries.len(), 2);
    assert_eq!(ranking.entries[0].team, "A");
    assert!((ranking.entries[0].shots_per_action - 0.2).abs() < 1e-9);
    assert_eq!(ranking.entries[1].team, "B");
    assert!((ranking.entries[1].shots_per_action - 0.5).abs() < 1e-9);
    // No goal column, so no goal figures.
    assert_eq!(ranking.entries[0].goals_received, None);
    assert_eq!(ranking.top().len(), 1);
}

#[test]
fn defensive_ranking_ties_fall_back_to_team_name() {
    let mut rows = defence_rows("D", 4, 2);
    rows.extend(defence_rows("C", 2, 1));
    let table = Table::with_fields(
        &[Field::DefendingTeam, Field::EndsInShot, Field::EndsInGoal],
        rows,
    );
    let ranking = defensive_ranking(&table, 10).unwrap();
    let order = ranking
        .entries
        .iter()
        .map(|e| (e.team.as_str(), e.actions))
        .collect::<Vec<_>>();
    assert_eq!(order, vec![("C", 2), ("D", 4)]);
    assert_eq!(ranking.entries[0].goals_per_action, Some(0.0));
}

#[test]
fn defensive_ranking_on_fixture() {
    let ranking = defensive_ranking(&common::liga(), 10).unwrap();
    let order = ranking
        .entries
        .iter()
        .map(|e| (e.team.as_str(), e.actions, e.shots_received))
        .collect::<Vec<_>>();
    assert_eq!(order, vec![("FCB", 2, 0), ("ATM", 2, 1), ("RMA", 1, 1)]);
    assert_eq!(ranking.entries[2].goals_received, Some(0));
}

#[test]
fn team_comparison_outer_joins_matchdays() {
    let table = common::liga();
    let cmp = team_comparison(&table, "FCB", "RMA");
    assert_eq!(cmp.team_a.actions, 2);
    assert_eq!(cmp.team_a.shots, 2);
    assert_eq!(cmp.team_a.goals, Some(1));
    assert_eq!(cmp.team_b.actions, 2);
    assert_eq!(cmp.per_matchday, vec![(1, 1, 1), (2, 1, 0), (3, 0, 1)]);
}

#[test]
fn team_comparison_view_uses_the_filtered_input() {
    let table = common::liga();
    let spec = FilterSpec::new().with_values(Dimension::SetPieceType, ["Córner"]);
    let filtered = filter::apply(&table, &spec);
    let input = ViewInput {
        full: &table,
        filtered: &filtered,
        spec: &spec,
    };
    let request = ViewRequest::TeamComparison {
        team_a: "FCB".to_string(),
        team_b: "RMA".to_string(),
    };
    let Ok(ViewResult::Comparison(cmp)) = aggregate::compute(&input, &request) else {
        panic!("team comparison view failed");
    };
    assert_eq!(cmp.team_a.actions, 2);
    assert_eq!(cmp.team_b.actions, 0);
    assert_eq!(cmp.per_matchday, vec![(1, 1, 0), (2, 1, 0)]);
}
