use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::table::{EventRecord, FIRST_HALF_LABEL, Field, SECOND_HALF_LABEL, Table, TimeBucket};

/// Categorical dimensions a user can restrict, in sidebar order.
/// The time bucket comes last because its options depend on the match half.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Season,
    SetPieceType,
    ExecutionType,
    MatchHalf,
    AttackingTeam,
    DefendingTeam,
    ExecutingPlayer,
    TargetPlayer,
    DefendingGoalkeeper,
    AttackingGoalkeeper,
    EndsInShot,
    EndsInGoal,
    AttackerResultPhase,
    DefenderResultPhase,
    NumericSuperiorityAttacker,
    NumericSuperiorityDefender,
    TimeBucket,
}

impl Dimension {
    pub const ALL: [Dimension; 17] = [
        Dimension::Season,
        Dimension::SetPieceType,
        Dimension::ExecutionType,
        Dimension::MatchHalf,
        Dimension::AttackingTeam,
        Dimension::DefendingTeam,
        Dimension::ExecutingPlayer,
        Dimension::TargetPlayer,
        Dimension::DefendingGoalkeeper,
        Dimension::AttackingGoalkeeper,
        Dimension::EndsInShot,
        Dimension::EndsInGoal,
        Dimension::AttackerResultPhase,
        Dimension::DefenderResultPhase,
        Dimension::NumericSuperiorityAttacker,
        Dimension::NumericSuperiorityDefender,
        Dimension::TimeBucket,
    ];

    pub fn field(self) -> Field {
        match self {
            Dimension::Season => Field::Season,
            Dimension::SetPieceType => Field::SetPieceType,
            Dimension::ExecutionType => Field::ExecutionType,
            Dimension::MatchHalf => Field::MatchHalf,
            Dimension::AttackingTeam => Field::AttackingTeam,
            Dimension::DefendingTeam => Field::DefendingTeam,
            Dimension::ExecutingPlayer => Field::ExecutingPlayer,
            Dimension::TargetPlayer => Field::TargetPlayer,
            Dimension::DefendingGoalkeeper => Field::DefendingGoalkeeper,
            Dimension::AttackingGoalkeeper => Field::AttackingGoalkeeper,
            Dimension::EndsInShot => Field::EndsInShot,
            Dimension::EndsInGoal => Field::EndsInGoal,
            Dimension::AttackerResultPhase => Field::AttackerResultPhase,
            Dimension::DefenderResultPhase => Field::DefenderResultPhase,
            Dimension::NumericSuperiorityAttacker => Field::NumericSuperiorityAttacker,
            Dimension::NumericSuperiorityDefender => Field::NumericSuperiorityDefender,
            Dimension::TimeBucket => Field::TimeBucket,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Dimension::Season => "Season",
            Dimension::SetPieceType => "Set-piece type",
            Dimension::ExecutionType => "Execution type",
            Dimension::MatchHalf => "Match half",
            Dimension::AttackingTeam => "Attacking team",
            Dimension::DefendingTeam => "Defending team",
            Dimension::ExecutingPlayer => "Executing player",
            Dimension::TargetPlayer => "Target player",
            Dimension::DefendingGoalkeeper => "Defending keeper",
            Dimension::AttackingGoalkeeper => "Attacking keeper",
            Dimension::EndsInShot => "Ends in shot?",
            Dimension::EndsInGoal => "Ends in goal?",
            Dimension::AttackerResultPhase => "Attacker result",
            Dimension::DefenderResultPhase => "Defender result",
            Dimension::NumericSuperiorityAttacker => "Numeric sit. (att)",
            Dimension::NumericSuperiorityDefender => "Numeric sit. (def)",
            Dimension::TimeBucket => "Time bucket",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchdayRange {
    pub min: i64,
    pub max: i64,
}

impl MatchdayRange {
    pub fn new(a: i64, b: i64) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Absent matchdays never match.
    pub fn contains(&self, matchday: Option<i64>) -> bool {
        matchday.is_some_and(|m| m >= self.min && m <= self.max)
    }
}

/// The predicate set of one interaction.
///
/// A dimension missing from `selections` is unrestricted; a dimension mapped
/// to an empty set accepts nothing. A selection holding every value present
/// in the column is unrestricted too, so blank cells pass it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSpec {
    #[serde(default)]
    selections: BTreeMap<Dimension, BTreeSet<String>>,
    #[serde(default)]
    matchdays: Option<MatchdayRange>,
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_values<I, S>(mut self, dimension: Dimension, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selections
            .insert(dimension, values.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_matchdays(mut self, min: i64, max: i64) -> Self {
        self.matchdays = Some(MatchdayRange::new(min, max));
        self
    }

    pub fn selection(&self, dimension: Dimension) -> Option<&BTreeSet<String>> {
        self.selections.get(&dimension)
    }

    pub fn selections(&self) -> impl Iterator<Item = (Dimension, &BTreeSet<String>)> {
        self.selections.iter().map(|(d, v)| (*d, v))
    }

    pub fn matchdays(&self) -> Option<MatchdayRange> {
        self.matchdays
    }

    pub fn is_unrestricted(&self) -> bool {
        self.selections.is_empty() && self.matchdays.is_none()
    }
}

/// Time buckets selectable given the chosen match halves, in vocabulary order
/// and limited to buckets present in `table`.
pub fn time_bucket_options(table: &Table, halves: Option<&BTreeSet<String>>) -> Vec<TimeBucket> {
    if !table.has_column(Field::TimeBucket) {
        return Vec::new();
    }
    let present = table.time_buckets_present();
    let only = |label: &str| halves.is_some_and(|h| h.len() == 1 && h.contains(label));
    let candidates: &[TimeBucket] = if only(FIRST_HALF_LABEL) {
        &TimeBucket::FIRST_HALF
    } else if only(SECOND_HALF_LABEL) {
        &TimeBucket::SECOND_HALF
    } else {
        &TimeBucket::VOCABULARY
    };
    candidates
        .iter()
        .copied()
        .filter(|b| present.contains(b))
        .collect()
}

enum Predicate {
    Members {
        field: Field,
        accepted: HashSet<String>,
    },
    Buckets(HashSet<TimeBucket>),
    Matchdays(MatchdayRange),
}

impl Predicate {
    fn matches(&self, row: &EventRecord) -> bool {
        match self {
            Predicate::Members { field, accepted } => row
                .categorical(*field)
                .is_some_and(|v| accepted.contains(v)),
            Predicate::Buckets(accepted) => row.time_bucket.is_some_and(|b| accepted.contains(&b)),
            Predicate::Matchdays(range) => range.contains(row.matchday),
        }
    }
}

fn compile(table: &Table, spec: &FilterSpec) -> Vec<Predicate> {
    let mut predicates = Vec::new();
    if let Some(range) = spec.matchdays
        && table.has_column(Field::Matchday)
    {
        predicates.push(Predicate::Matchdays(range));
    }
    for (dimension, values) in &spec.selections {
        let field = dimension.field();
        if !table.has_column(field) {
            debug!(column = field.header(), "filter skipped, column not in data");
            continue;
        }
        if *dimension == Dimension::TimeBucket {
            // Options first: a bucket the half selection rules out is never accepted.
            let options = time_bucket_options(table, spec.selection(Dimension::MatchHalf));
            let accepted: HashSet<TimeBucket> = values
                .iter()
                .filter_map(|v| TimeBucket::parse(v))
                .filter(|b| options.contains(b))
                .collect();
            let covers_all = !accepted.is_empty()
                && table.time_buckets_present().iter().all(|b| accepted.contains(b));
            if covers_all {
                debug!(column = field.header(), "selection covers every value, not filtering");
                continue;
            }
            predicates.push(Predicate::Buckets(accepted));
        } else {
            let accepted: HashSet<String> = values.iter().cloned().collect();
            let covers_all = !accepted.is_empty()
                && table
                    .rows()
                    .iter()
                    .filter_map(|r| r.categorical(field))
                    .all(|v| accepted.contains(v));
            if covers_all {
                debug!(column = field.header(), "selection covers every value, not filtering");
                continue;
            }
            predicates.push(Predicate::Members { field, accepted });
        }
    }
    predicates
}

/// Rows of `table` satisfying every predicate of `spec`, in table order.
pub fn apply(table: &Table, spec: &FilterSpec) -> Table {
    let predicates = compile(table, spec);
    if predicates.is_empty() {
        return table.clone();
    }
    table.retain(|row| predicates.iter().all(|p| p.matches(row)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_normalises_endpoints() {
        let range = MatchdayRange::new(9, 3);
        assert_eq!(range, MatchdayRange { min: 3, max: 9 });
        assert!(range.contains(Some(3)));
        assert!(range.contains(Some(9)));
        assert!(!range.contains(Some(10)));
        assert!(!range.contains(None));
    }

    #[test]
    fn spec_round_trips_through_json() {
        let spec = FilterSpec::new()
            .with_values(Dimension::AttackingTeam, ["FCB"])
            .with_values(Dimension::TimeBucket, Vec::<String>::new())
            .with_matchdays(1, 5);
        let raw = serde_json::to_string(&spec).unwrap();
        let back: FilterSpec = serde_json::from_str(&raw).unwrap();
        assert_eq!(back, spec);
        assert!(back.selection(Dimension::TimeBucket).unwrap().is_empty());
    }
}
