use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::ViewError;

/// Label the shot/goal columns use for "yes". Compared after uppercasing.
pub const AFFIRMATIVE_TOKEN: &str = "SI";

pub const FIRST_HALF_LABEL: &str = "Primera";
pub const SECOND_HALF_LABEL: &str = "Segunda";

pub fn is_affirmative(raw: &str) -> bool {
    raw.trim().to_uppercase() == AFFIRMATIVE_TOKEN
}

/// Every column of an event sheet the analysis understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Field {
    Season,
    Matchday,
    SetPieceType,
    ExecutionType,
    ExecutingPlayer,
    TargetPlayer,
    DefendingGoalkeeper,
    AttackingGoalkeeper,
    AttackingTeam,
    DefendingTeam,
    EndsInShot,
    EndsInGoal,
    MatchHalf,
    TimeBucket,
    AttackerResultPhase,
    DefenderResultPhase,
    NumericSuperiorityAttacker,
    NumericSuperiorityDefender,
    ExecutionX,
    ExecutionY,
    ExpectedGoals,
}

impl Field {
    pub const ALL: [Field; 21] = [
        Field::Season,
        Field::Matchday,
        Field::SetPieceType,
        Field::ExecutionType,
        Field::ExecutingPlayer,
        Field::TargetPlayer,
        Field::DefendingGoalkeeper,
        Field::AttackingGoalkeeper,
        Field::AttackingTeam,
        Field::DefendingTeam,
        Field::EndsInShot,
        Field::EndsInGoal,
        Field::MatchHalf,
        Field::TimeBucket,
        Field::AttackerResultPhase,
        Field::DefenderResultPhase,
        Field::NumericSuperiorityAttacker,
        Field::NumericSuperiorityDefender,
        Field::ExecutionX,
        Field::ExecutionY,
        Field::ExpectedGoals,
    ];

    /// Header used by the scouting spreadsheets (and by exports).
    pub fn header(self) -> &'static str {
        match self {
            Field::Season => "temporada",
            Field::Matchday => "jornada",
            Field::SetPieceType => "abp_tipo",
            Field::ExecutionType => "ejecucion_tipo",
            Field::ExecutingPlayer => "jugador_ejecutor",
            Field::TargetPlayer => "jugador_objetivo",
            Field::DefendingGoalkeeper => "portero_defensor",
            Field::AttackingGoalkeeper => "portero_ataca",
            Field::AttackingTeam => "equipo_atacante",
            Field::DefendingTeam => "equipo_defensor",
            Field::EndsInShot => "tiro",
            Field::EndsInGoal => "gol",
            Field::MatchHalf => "momento_mitad",
            Field::TimeBucket => "momento_rango",
            Field::AttackerResultPhase => "momento_resultado_atacante",
            Field::DefenderResultPhase => "momento_resultado_defensor",
            Field::NumericSuperiorityAttacker => "situacion_numerica_atacante",
            Field::NumericSuperiorityDefender => "situacion_numerica_defensor",
            Field::ExecutionX => "x_ejecucion",
            Field::ExecutionY => "y_ejecucion",
            Field::ExpectedGoals => "xg_tiro",
        }
    }

    pub fn alias(self) -> &'static str {
        match self {
            Field::Season => "season",
            Field::Matchday => "matchday",
            Field::SetPieceType => "set_piece_type",
            Field::ExecutionType => "execution_type",
            Field::ExecutingPlayer => "executing_player",
            Field::TargetPlayer => "target_player",
            Field::DefendingGoalkeeper => "defending_goalkeeper",
            Field::AttackingGoalkeeper => "attacking_goalkeeper",
            Field::AttackingTeam => "attacking_team",
            Field::DefendingTeam => "defending_team",
            Field::EndsInShot => "ends_in_shot",
            Field::EndsInGoal => "ends_in_goal",
            Field::MatchHalf => "match_half",
            Field::TimeBucket => "time_bucket",
            Field::AttackerResultPhase => "attacker_result_phase",
            Field::DefenderResultPhase => "defender_result_phase",
            Field::NumericSuperiorityAttacker => "numeric_superiority_attacker",
            Field::NumericSuperiorityDefender => "numeric_superiority_defender",
            Field::ExecutionX => "execution_x",
            Field::ExecutionY => "execution_y",
            Field::ExpectedGoals => "expected_goals",
        }
    }

    /// Case-insensitive lookup accepting both the sheet header and the English alias.
    pub fn from_header(raw: &str) -> Option<Field> {
        let key = raw.trim().to_lowercase();
        Field::ALL
            .into_iter()
            .find(|f| f.header() == key || f.alias() == key)
    }

    pub fn is_required(self) -> bool {
        matches!(
            self,
            Field::Season
                | Field::Matchday
                | Field::SetPieceType
                | Field::ExecutingPlayer
                | Field::AttackingTeam
                | Field::DefendingTeam
                | Field::EndsInShot
        )
    }

    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            Field::Matchday | Field::ExecutionX | Field::ExecutionY | Field::ExpectedGoals
        )
    }
}

/// Minute ranges recorded per action, in match order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TimeBucket {
    Min0To15,
    Min16To30,
    Min31To45,
    FirstHalfExtra,
    Min45To60,
    Min61To75,
    Min76To90,
    SecondHalfExtra,
}

impl TimeBucket {
    pub const VOCABULARY: [TimeBucket; 8] = [
        TimeBucket::Min0To15,
        TimeBucket::Min16To30,
        TimeBucket::Min31To45,
        TimeBucket::FirstHalfExtra,
        TimeBucket::Min45To60,
        TimeBucket::Min61To75,
        TimeBucket::Min76To90,
        TimeBucket::SecondHalfExtra,
    ];

    pub const FIRST_HALF: [TimeBucket; 4] = [
        TimeBucket::Min0To15,
        TimeBucket::Min16To30,
        TimeBucket::Min31To45,
        TimeBucket::FirstHalfExtra,
    ];

    pub const SECOND_HALF: [TimeBucket; 4] = [
        TimeBucket::Min45To60,
        TimeBucket::Min61To75,
        TimeBucket::Min76To90,
        TimeBucket::SecondHalfExtra,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TimeBucket::Min0To15 => "0-15",
            TimeBucket::Min16To30 => "16-30",
            TimeBucket::Min31To45 => "31-45",
            TimeBucket::FirstHalfExtra => "EXTRA 1",
            TimeBucket::Min45To60 => "45-60",
            TimeBucket::Min61To75 => "61-75",
            TimeBucket::Min76To90 => "76-90",
            TimeBucket::SecondHalfExtra => "EXTRA 2",
        }
    }

    pub fn parse(raw: &str) -> Option<TimeBucket> {
        let key = raw.trim().to_uppercase();
        TimeBucket::VOCABULARY
            .into_iter()
            .find(|b| b.label() == key)
    }

    pub fn is_first_half(self) -> bool {
        TimeBucket::FIRST_HALF.contains(&self)
    }
}

/// One dead-ball action.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventRecord {
    pub season: Option<String>,
    pub matchday: Option<i64>,
    pub set_piece_type: Option<String>,
    pub execution_type: Option<String>,
    pub executing_player: Option<String>,
    pub target_player: Option<String>,
    pub defending_goalkeeper: Option<String>,
    pub attacking_goalkeeper: Option<String>,
    pub attacking_team: Option<String>,
    pub defending_team: Option<String>,
    pub ends_in_shot: Option<String>,
    pub ends_in_goal: Option<String>,
    pub match_half: Option<String>,
    pub time_bucket: Option<TimeBucket>,
    pub attacker_result_phase: Option<String>,
    pub defender_result_phase: Option<String>,
    pub numeric_superiority_attacker: Option<String>,
    pub numeric_superiority_defender: Option<String>,
    pub execution_x: Option<f64>,
    pub execution_y: Option<f64>,
    pub expected_goals: Option<f64>,
    /// Normalised from `ends_in_shot` when the row is built.
    pub shot: bool,
    /// Normalised from `ends_in_goal` when the row is built.
    pub goal: bool,
    /// Cells of unrecognised columns, aligned with `Table::extra_columns`.
    pub extras: Vec<Option<String>>,
}

impl EventRecord {
    /// Recompute the shot/goal flags from their raw labels.
    pub fn normalize_flags(&mut self) {
        self.shot = self.ends_in_shot.as_deref().is_some_and(is_affirmative);
        self.goal = self.ends_in_goal.as_deref().is_some_and(is_affirmative);
    }

    pub fn categorical(&self, field: Field) -> Option<&str> {
        let value = match field {
            Field::Season => &self.season,
            Field::SetPieceType => &self.set_piece_type,
            Field::ExecutionType => &self.execution_type,
            Field::ExecutingPlayer => &self.executing_player,
            Field::TargetPlayer => &self.target_player,
            Field::DefendingGoalkeeper => &self.defending_goalkeeper,
            Field::AttackingGoalkeeper => &self.attacking_goalkeeper,
            Field::AttackingTeam => &self.attacking_team,
            Field::DefendingTeam => &self.defending_team,
            Field::EndsInShot => &self.ends_in_shot,
            Field::EndsInGoal => &self.ends_in_goal,
            Field::MatchHalf => &self.match_half,
            Field::AttackerResultPhase => &self.attacker_result_phase,
            Field::DefenderResultPhase => &self.defender_result_phase,
            Field::NumericSuperiorityAttacker => &self.numeric_superiority_attacker,
            Field::NumericSuperiorityDefender => &self.numeric_superiority_defender,
            Field::TimeBucket => return self.time_bucket.map(TimeBucket::label),
            Field::Matchday | Field::ExecutionX | Field::ExecutionY | Field::ExpectedGoals => {
                return None;
            }
        };
        value.as_deref()
    }

    pub fn numeric(&self, field: Field) -> Option<f64> {
        match field {
            Field::Matchday => self.matchday.map(|m| m as f64),
            Field::ExecutionX => self.execution_x,
            Field::ExecutionY => self.execution_y,
            Field::ExpectedGoals => self.expected_goals,
            _ => None,
        }
    }

    /// Text form of a cell, as written by exports and read back by the loader.
    pub fn text(&self, field: Field) -> Option<String> {
        match field {
            Field::Matchday => self.matchday.map(|m| m.to_string()),
            Field::ExecutionX | Field::ExecutionY | Field::ExpectedGoals => {
                self.numeric(field).map(|v| v.to_string())
            }
            _ => self.categorical(field).map(str::to_string),
        }
    }

    /// Stores a raw cell. Numeric columns parse leniently; empty text is absent.
    /// Returns the rejected text when a time bucket is outside the vocabulary.
    pub fn set_text(&mut self, field: Field, raw: Option<&str>) -> Result<(), String> {
        let value = raw.map(str::trim).filter(|s| !s.is_empty());
        let owned = value.map(str::to_string);
        match field {
            Field::Season => self.season = owned,
            Field::Matchday => self.matchday = value.and_then(parse_matchday),
            Field::SetPieceType => self.set_piece_type = owned,
            Field::ExecutionType => self.execution_type = owned,
            Field::ExecutingPlayer => self.executing_player = owned,
            Field::TargetPlayer => self.target_player = owned,
            Field::DefendingGoalkeeper => self.defending_goalkeeper = owned,
            Field::AttackingGoalkeeper => self.attacking_goalkeeper = owned,
            Field::AttackingTeam => self.attacking_team = owned,
            Field::DefendingTeam => self.defending_team = owned,
            Field::EndsInShot => self.ends_in_shot = owned,
            Field::EndsInGoal => self.ends_in_goal = owned,
            Field::MatchHalf => self.match_half = owned,
            Field::TimeBucket => {
                self.time_bucket = match value {
                    Some(raw) => Some(TimeBucket::parse(raw).ok_or_else(|| raw.to_string())?),
                    None => None,
                }
            }
            Field::AttackerResultPhase => self.attacker_result_phase = owned,
            Field::DefenderResultPhase => self.defender_result_phase = owned,
            Field::NumericSuperiorityAttacker => self.numeric_superiority_attacker = owned,
            Field::NumericSuperiorityDefender => self.numeric_superiority_defender = owned,
            Field::ExecutionX => self.execution_x = value.and_then(parse_number),
            Field::ExecutionY => self.execution_y = value.and_then(parse_number),
            Field::ExpectedGoals => self.expected_goals = value.and_then(parse_number),
        }
        Ok(())
    }
}

/// Accepts `7`, `7.0` and comma decimals; anything else is treated as missing.
pub fn parse_matchday(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if let Ok(v) = trimmed.parse::<i64>() {
        return Some(v);
    }
    let v = parse_number(trimmed)?;
    if v.fract() == 0.0 && v.abs() < i64::MAX as f64 {
        Some(v as i64)
    } else {
        None
    }
}

pub fn parse_number(raw: &str) -> Option<f64> {
    let cleaned = raw.trim().replace(',', ".");
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Column {
    Known(Field),
    Extra(String),
}

impl Column {
    pub fn name(&self) -> &str {
        match self {
            Column::Known(field) => field.header(),
            Column::Extra(name) => name,
        }
    }
}

/// Row-oriented event table. Read-only once loaded; filters produce new tables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    rows: Vec<EventRecord>,
}

impl Table {
    pub fn new(columns: Vec<Column>, mut rows: Vec<EventRecord>) -> Self {
        for row in &mut rows {
            row.normalize_flags();
        }
        Self { columns, rows }
    }

    /// Table with exactly the given known columns, in the given order.
    pub fn with_fields(fields: &[Field], rows: Vec<EventRecord>) -> Self {
        let columns = fields.iter().copied().map(Column::Known).collect();
        Self::new(columns, rows)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn rows(&self) -> &[EventRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, field: Field) -> bool {
        self.columns.contains(&Column::Known(field))
    }

    pub fn require(&self, field: Field) -> Result<(), ViewError> {
        if self.has_column(field) {
            Ok(())
        } else {
            Err(ViewError::MissingDimension(field.header()))
        }
    }

    pub fn extra_columns(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().filter_map(|c| match c {
            Column::Extra(name) => Some(name.as_str()),
            Column::Known(_) => None,
        })
    }

    /// Rows at `indices` (in that order) with the same column layout.
    pub fn subset(&self, indices: impl IntoIterator<Item = usize>) -> Table {
        let rows = indices
            .into_iter()
            .filter_map(|idx| self.rows.get(idx).cloned())
            .collect();
        Table {
            columns: self.columns.clone(),
            rows,
        }
    }

    pub fn retain(&self, mut keep: impl FnMut(&EventRecord) -> bool) -> Table {
        Table {
            columns: self.columns.clone(),
            rows: self.rows.iter().filter(|r| keep(r)).cloned().collect(),
        }
    }

    /// Cell text at column `position`, used by the export layer. Extra cells are
    /// addressed by how many extra columns precede `position`, so repeated
    /// extra headers keep their own values.
    pub fn cell_text(&self, row: &EventRecord, position: usize) -> Option<String> {
        match self.columns.get(position)? {
            Column::Known(field) => row.text(*field),
            Column::Extra(_) => {
                let extra_idx = self.columns[..position]
                    .iter()
                    .filter(|c| matches!(c, Column::Extra(_)))
                    .count();
                row.extras.get(extra_idx).cloned().flatten()
            }
        }
    }

    /// Sorted distinct values of a categorical column, ignoring blanks.
    pub fn distinct_values(&self, field: Field) -> Vec<String> {
        if !self.has_column(field) {
            return Vec::new();
        }
        let set: BTreeSet<&str> = self
            .rows
            .iter()
            .filter_map(|r| r.categorical(field))
            .collect();
        set.into_iter().map(str::to_string).collect()
    }

    pub fn time_buckets_present(&self) -> HashSet<TimeBucket> {
        self.rows.iter().filter_map(|r| r.time_bucket).collect()
    }

    /// Sorted distinct matchdays.
    pub fn matchday_domain(&self) -> Vec<i64> {
        let set: BTreeSet<i64> = self.rows.iter().filter_map(|r| r.matchday).collect();
        set.into_iter().collect()
    }

    pub fn matchday_bounds(&self) -> Option<(i64, i64)> {
        let domain = self.matchday_domain();
        Some((*domain.first()?, *domain.last()?))
    }

    pub fn shots(&self) -> usize {
        self.rows.iter().filter(|r| r.shot).count()
    }

    pub fn goals(&self) -> usize {
        self.rows.iter().filter(|r| r.goal).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_lookup_is_case_insensitive() {
        assert_eq!(Field::from_header("Equipo_Atacante"), Some(Field::AttackingTeam));
        assert_eq!(Field::from_header(" XG_TIRO "), Some(Field::ExpectedGoals));
        assert_eq!(Field::from_header("matchday"), Some(Field::Matchday));
        assert_eq!(Field::from_header("comentario"), None);
    }

    #[test]
    fn matchday_parsing_is_lenient() {
        assert_eq!(parse_matchday("7"), Some(7));
        assert_eq!(parse_matchday("7.0"), Some(7));
        assert_eq!(parse_matchday(" 12 "), Some(12));
        assert_eq!(parse_matchday("J7"), None);
        assert_eq!(parse_matchday("7.5"), None);
    }

    #[test]
    fn affirmative_flag_ignores_case() {
        assert!(is_affirmative("si"));
        assert!(is_affirmative("SI"));
        assert!(is_affirmative(" Si "));
        assert!(!is_affirmative("NO"));
        assert!(!is_affirmative("sí no"));
    }

    #[test]
    fn time_bucket_vocabulary_is_ordered() {
        let labels: Vec<_> = TimeBucket::VOCABULARY.iter().map(|b| b.label()).collect();
        assert_eq!(
            labels,
            ["0-15", "16-30", "31-45", "EXTRA 1", "45-60", "61-75", "76-90", "EXTRA 2"]
        );
        assert_eq!(TimeBucket::parse("extra 2"), Some(TimeBucket::SecondHalfExtra));
        assert!(TimeBucket::FirstHalfExtra.is_first_half());
        assert!(!TimeBucket::Min45To60.is_first_half());
    }
}
