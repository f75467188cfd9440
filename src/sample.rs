use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::table::{
    EventRecord, FIRST_HALF_LABEL, Field, SECOND_HALF_LABEL, Table, TimeBucket,
};

const SEASONS: &[&str] = &["2023/24", "2024/25"];
const SET_PIECES: &[&str] = &["Córner", "Falta lateral", "Falta frontal", "Saque de banda"];
const EXECUTIONS: &[&str] = &["Directo", "Corto", "Jugada ensayada"];
const RESULT_PHASES: &[&str] = &["Ganando", "Empatando", "Perdiendo"];
const NUMERIC_SITUATIONS: &[&str] = &["Igualdad", "Superioridad", "Inferioridad"];

const TEAMS: &[(&str, &str, &[&str])] = &[
    ("Girona", "Gazzaniga", &["Tsygankov", "Miguel", "Blind", "Stuani", "Juanpe"]),
    ("Betis", "Rui Silva", &["Isco", "Fornals", "Bartra", "Bakambu", "Llorente"]),
    ("Celta", "Guaita", &["Aspas", "Beltrán", "Starfelt", "Larsen", "Mingueza"]),
    ("Osasuna", "Herrera", &["Moncayola", "Budimir", "Catena", "Rubén García", "Areso"]),
    ("Getafe", "Soria", &["Arambarri", "Mayoral", "Djené", "Milla", "Alderete"]),
    ("Valencia", "Mamardashvili", &["Pepelu", "Duro", "Mosquera", "Rioja", "Gayà"]),
];

/// Every column the dashboard understands, in sheet order.
pub fn full_layout() -> Vec<Field> {
    Field::ALL.to_vec()
}

/// Seeded synthetic season of dead-ball actions.
pub fn sample_table(seed: u64, rows: usize) -> Table {
    let mut rng = StdRng::seed_from_u64(seed);
    let records = (0..rows).map(|_| sample_record(&mut rng)).collect();
    Table::with_fields(&full_layout(), records)
}

fn pick<'a>(rng: &mut StdRng, values: &[&'a str]) -> &'a str {
    values.choose(rng).copied().unwrap_or_default()
}

fn sample_record(rng: &mut StdRng) -> EventRecord {
    let attack = rng.gen_range(0..TEAMS.len());
    let mut defend = rng.gen_range(0..TEAMS.len() - 1);
    if defend >= attack {
        defend += 1;
    }
    let (att_team, att_keeper, att_players) = TEAMS[attack];
    let (def_team, def_keeper, _) = TEAMS[defend];

    let executor = pick(rng, att_players);
    let target = if rng.gen_bool(0.8) {
        att_players
            .iter()
            .copied()
            .filter(|p| *p != executor)
            .collect::<Vec<_>>()
            .choose(rng)
            .map(|p| p.to_string())
    } else {
        None
    };

    let first_half = rng.gen_bool(0.5);
    let buckets: &[TimeBucket] = if first_half {
        &TimeBucket::FIRST_HALF
    } else {
        &TimeBucket::SECOND_HALF
    };
    let bucket = *buckets.choose(rng).unwrap_or(&TimeBucket::Min0To15);

    let shot = rng.gen_bool(0.3);
    let goal = shot && rng.gen_bool(0.15);
    let set_piece = pick(rng, SET_PIECES);
    let (x, y) = if set_piece == "Córner" {
        let x = if rng.gen_bool(0.5) { 0.5 } else { 119.5 };
        let y = if rng.gen_bool(0.5) { 0.5 } else { 79.5 };
        (x, y)
    } else {
        (rng.gen_range(40.0..110.0), rng.gen_range(0.0..80.0))
    };

    EventRecord {
        season: Some(pick(rng, SEASONS).to_string()),
        matchday: Some(rng.gen_range(1..=38)),
        set_piece_type: Some(set_piece.to_string()),
        execution_type: Some(pick(rng, EXECUTIONS).to_string()),
        executing_player: Some(executor.to_string()),
        target_player: target,
        defending_goalkeeper: Some(def_keeper.to_string()),
        attacking_goalkeeper: Some(att_keeper.to_string()),
        attacking_team: Some(att_team.to_string()),
        defending_team: Some(def_team.to_string()),
        ends_in_shot: Some(if shot { "SI" } else { "NO" }.to_string()),
        ends_in_goal: Some(if goal { "SI" } else { "NO" }.to_string()),
        match_half: Some(if first_half { FIRST_HALF_LABEL } else { SECOND_HALF_LABEL }.to_string()),
        time_bucket: Some(bucket),
        attacker_result_phase: Some(pick(rng, RESULT_PHASES).to_string()),
        defender_result_phase: Some(pick(rng, RESULT_PHASES).to_string()),
        numeric_superiority_attacker: Some(pick(rng, NUMERIC_SITUATIONS).to_string()),
        numeric_superiority_defender: Some(pick(rng, NUMERIC_SITUATIONS).to_string()),
        execution_x: Some((x * 10.0_f64).round() / 10.0),
        execution_y: Some((y * 10.0_f64).round() / 10.0),
        expected_goals: shot.then(|| (rng.gen_range(0.02..0.6_f64) * 100.0).round() / 100.0),
        ..EventRecord::default()
    }
}
