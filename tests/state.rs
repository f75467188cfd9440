mod common;

use abp_terminal::filter::Dimension;
use abp_terminal::state::{AppState, Page};

fn cursor_for(state: &AppState, dimension: Dimension) -> usize {
    state
        .filters
        .iter()
        .position(|e| e.dimension == dimension)
        .expect("dimension in sidebar")
        + 1
}

fn options_of(state: &AppState, dimension: Dimension) -> Vec<String> {
    state
        .filters
        .iter()
        .find(|e| e.dimension == dimension)
        .map(|e| e.options.clone())
        .unwrap_or_default()
}

#[test]
fn fresh_state_is_unrestricted() {
    let state = AppState::new(common::liga());
    assert!(state.filter_spec().is_unrestricted());
    assert_eq!(state.filtered().len(), 5);
    assert_eq!(state.matchday_label(), "1-3");
    assert_eq!(state.filters.last().map(|e| e.dimension), Some(Dimension::TimeBucket));
}

#[test]
fn sidebar_skips_columns_missing_from_data() {
    let state = AppState::new(common::minimal());
    assert!(state.filters.iter().all(|e| e.dimension != Dimension::TargetPlayer));
    assert!(state.filters.iter().all(|e| e.dimension != Dimension::TimeBucket));
}

#[test]
fn deselecting_every_team_empties_the_view() {
    let mut state = AppState::new(common::liga());
    state.filter_cursor = cursor_for(&state, Dimension::AttackingTeam);
    state.toggle_current_all();

    let spec = state.filter_spec();
    assert!(spec.selection(Dimension::AttackingTeam).is_some_and(|s| s.is_empty()));
    assert!(state.filtered().is_empty());
}

#[test]
fn choosing_first_half_narrows_time_buckets() {
    let mut state = AppState::new(common::liga());
    assert_eq!(options_of(&state, Dimension::TimeBucket).len(), 5);

    state.filter_cursor = cursor_for(&state, Dimension::MatchHalf);
    state.toggle_current_all();
    state.toggle_expanded();
    // Options are sorted: Primera, Segunda.
    state.toggle_current_option();

    assert_eq!(
        options_of(&state, Dimension::TimeBucket),
        vec!["0-15", "16-30", "EXTRA 1"]
    );
    assert_eq!(state.filtered().len(), 3);
}

#[test]
fn narrowing_matchdays_adds_a_range() {
    let mut state = AppState::new(common::liga());
    state.shift_matchday(false, 1);
    assert_eq!(state.matchday_label(), "2-3");
    assert_eq!(state.filtered().len(), 3);

    // The lower end cannot pass the upper one.
    state.shift_matchday(false, 5);
    assert_eq!(state.matchday_label(), "3-3");
    state.shift_matchday(true, -1);
    assert_eq!(state.matchday_label(), "3-3");
}

#[test]
fn reset_restores_every_filter() {
    let mut state = AppState::new(common::liga());
    state.filter_cursor = cursor_for(&state, Dimension::Season);
    state.toggle_current_all();
    state.shift_matchday(true, -1);
    assert!(!state.filter_spec().is_unrestricted());

    state.reset_filters();
    assert!(state.filter_spec().is_unrestricted());
    assert_eq!(state.logs.back().map(String::as_str), Some("[INFO] Filters reset"));
}

#[test]
fn compared_teams_cycle_through_attackers() {
    let mut state = AppState::new(common::liga());
    assert_eq!(
        state.compared_teams(),
        Some(("ATM".to_string(), "FCB".to_string()))
    );
    state.cycle_compare(true, true);
    assert_eq!(
        state.compared_teams(),
        Some(("ATM".to_string(), "RMA".to_string()))
    );
    state.cycle_compare(false, false);
    assert_eq!(
        state.compared_teams(),
        Some(("RMA".to_string(), "RMA".to_string()))
    );
}

#[test]
fn pages_wrap_around() {
    assert_eq!(Page::Dashboard.prev(), Page::Network);
    assert_eq!(Page::Network.next(), Page::Dashboard);
    assert_eq!(Page::ALL.len(), 7);
}

#[test]
fn console_log_is_bounded() {
    let mut state = AppState::new(common::minimal());
    for idx in 0..250 {
        state.push_log(format!("[INFO] line {idx}"));
    }
    assert_eq!(state.logs.len(), 200);
    assert_eq!(state.logs.front().map(String::as_str), Some("[INFO] line 50"));
}
