use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use tracing::debug;

use crate::error::ViewError;
use crate::filter::{Dimension, FilterSpec};
use crate::table::{Field, Table};

pub const DEFAULT_TOP_N: usize = 10;

/// Ratio with a zero denominator reported as 0.0.
pub fn safe_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountRow {
    pub key: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchdayCount {
    pub matchday: i64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupedMatchdayCount {
    pub group: String,
    pub matchday: i64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct XgPoint {
    pub team: String,
    pub matchday: i64,
    pub xg: f64,
    pub cumulative_xg: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericRow {
    pub key: String,
    pub value: f64,
    pub observations: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NumericStat {
    Sum,
    Mean,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DefensiveRankingEntry {
    pub team: String,
    pub actions: usize,
    pub shots_received: usize,
    /// `None` when the data has no goal column.
    pub goals_received: Option<usize>,
    pub shots_per_action: f64,
    pub goals_per_action: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DefensiveRanking {
    /// Every defending team, best (fewest shots per action) first.
    pub entries: Vec<DefensiveRankingEntry>,
    pub top_n: usize,
}

impl DefensiveRanking {
    pub fn top(&self) -> &[DefensiveRankingEntry] {
        &self.entries[..self.top_n.min(self.entries.len())]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Kpis {
    pub total_actions: usize,
    pub filtered_actions: usize,
    pub attacking_teams: usize,
    pub defending_teams: usize,
    pub shots: usize,
    pub goals: Option<usize>,
    /// Percentage of filtered actions ending in a shot.
    pub shot_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamLine {
    pub team: String,
    pub actions: usize,
    pub shots: usize,
    pub goals: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamComparison {
    pub team_a: TeamLine,
    pub team_b: TeamLine,
    /// (matchday, actions of team a, actions of team b), zero-filled.
    pub per_matchday: Vec<(i64, usize, usize)>,
}

/// One report view over the filtered table.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewRequest {
    Kpis,
    Distribution { dimension: Dimension },
    TopN { dimension: Dimension, n: usize },
    MatchdaySeries,
    MatchdaySeriesBy { dimension: Dimension },
    /// xG per attacking team and matchday. Teams come from the attacking-team
    /// selection, or every attacking team when that dimension is unrestricted.
    CumulativeXg,
    GroupedXg { group: Dimension, stat: NumericStat },
    DefensiveRanking { top_n: usize },
    TeamComparison { team_a: String, team_b: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ViewResult {
    Kpis(Kpis),
    Counts(Vec<CountRow>),
    Matchdays(Vec<MatchdayCount>),
    GroupedMatchdays(Vec<GroupedMatchdayCount>),
    Xg(Vec<XgPoint>),
    Numeric(Vec<NumericRow>),
    Ranking(DefensiveRanking),
    Comparison(TeamComparison),
}

/// Everything a view may need: the unfiltered table (for domains), the
/// filtered subset and the `FilterSpec` that produced it.
#[derive(Debug, Clone, Copy)]
pub struct ViewInput<'a> {
    pub full: &'a Table,
    pub filtered: &'a Table,
    pub spec: &'a FilterSpec,
}

pub fn compute(input: &ViewInput<'_>, request: &ViewRequest) -> Result<ViewResult, ViewError> {
    dispatch(input, request).inspect_err(|err| debug!(?request, %err, "view unavailable"))
}

fn dispatch(input: &ViewInput<'_>, request: &ViewRequest) -> Result<ViewResult, ViewError> {
    let filtered = input.filtered;
    match request {
        ViewRequest::Kpis => Ok(ViewResult::Kpis(kpis(input.full, filtered))),
        ViewRequest::Distribution { dimension } => {
            count_by(filtered, dimension.field()).map(ViewResult::Counts)
        }
        ViewRequest::TopN { dimension, n } => {
            top_n(filtered, dimension.field(), *n).map(ViewResult::Counts)
        }
        ViewRequest::MatchdaySeries => Ok(ViewResult::Matchdays(matchday_series(filtered))),
        ViewRequest::MatchdaySeriesBy { dimension } => {
            matchday_series_by(filtered, dimension.field()).map(ViewResult::GroupedMatchdays)
        }
        ViewRequest::CumulativeXg => {
            let teams: Vec<String> = match input.spec.selection(Dimension::AttackingTeam) {
                Some(selected) => selected.iter().cloned().collect(),
                None => input.full.distinct_values(Field::AttackingTeam),
            };
            let domain = input.full.matchday_domain();
            cumulative_xg(filtered, &teams, &domain).map(ViewResult::Xg)
        }
        ViewRequest::GroupedXg { group, stat } => {
            grouped_numeric(filtered, group.field(), Field::ExpectedGoals, *stat)
                .map(ViewResult::Numeric)
        }
        ViewRequest::DefensiveRanking { top_n } => {
            defensive_ranking(filtered, *top_n).map(ViewResult::Ranking)
        }
        ViewRequest::TeamComparison { team_a, team_b } => Ok(ViewResult::Comparison(
            team_comparison(filtered, team_a, team_b),
        )),
    }
}

/// Rows per distinct value, most frequent first. Equal counts keep the order
/// in which the values first appear in `table`.
pub fn count_by(table: &Table, field: Field) -> Result<Vec<CountRow>, ViewError> {
    table.require(field)?;
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut rows: Vec<CountRow> = Vec::new();
    for value in table.rows().iter().filter_map(|r| r.categorical(field)) {
        match index.get(value) {
            Some(&pos) => rows[pos].count += 1,
            None => {
                index.insert(value, rows.len());
                rows.push(CountRow {
                    key: value.to_string(),
                    count: 1,
                });
            }
        }
    }
    // Stable sort keeps first-appearance order among ties.
    rows.sort_by(|a, b| b.count.cmp(&a.count));
    Ok(rows)
}

pub fn top_n(table: &Table, field: Field, n: usize) -> Result<Vec<CountRow>, ViewError> {
    let mut rows = count_by(table, field)?;
    rows.truncate(n);
    Ok(rows)
}

/// Actions per matchday, ascending. Rows without a matchday are left out.
pub fn matchday_series(table: &Table) -> Vec<MatchdayCount> {
    let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
    for matchday in table.rows().iter().filter_map(|r| r.matchday) {
        *counts.entry(matchday).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(matchday, count)| MatchdayCount { matchday, count })
        .collect()
}

/// Actions per (group, matchday), groups ascending then matchdays ascending.
pub fn matchday_series_by(
    table: &Table,
    field: Field,
) -> Result<Vec<GroupedMatchdayCount>, ViewError> {
    table.require(field)?;
    let mut counts: BTreeMap<(&str, i64), usize> = BTreeMap::new();
    for row in table.rows() {
        let (Some(group), Some(matchday)) = (row.categorical(field), row.matchday) else {
            continue;
        };
        *counts.entry((group, matchday)).or_default() += 1;
    }
    Ok(counts
        .into_iter()
        .map(|((group, matchday), count)| GroupedMatchdayCount {
            group: group.to_string(),
            matchday,
            count,
        })
        .collect())
}

/// xG summed per (team, matchday) over `table`, reindexed on
/// `teams` × `matchdays` with zeros so every series has the same x axis.
pub fn cumulative_xg(
    table: &Table,
    teams: &[String],
    matchdays: &[i64],
) -> Result<Vec<XgPoint>, ViewError> {
    table.require(Field::ExpectedGoals)?;
    let mut sums: HashMap<(&str, i64), f64> = HashMap::new();
    for row in table.rows() {
        let (Some(team), Some(matchday)) = (row.attacking_team.as_deref(), row.matchday) else {
            continue;
        };
        *sums.entry((team, matchday)).or_default() += row.expected_goals.unwrap_or(0.0);
    }

    let mut points = Vec::with_capacity(teams.len() * matchdays.len());
    for team in teams {
        let mut running = 0.0;
        for &matchday in matchdays {
            let xg = sums.get(&(team.as_str(), matchday)).copied().unwrap_or(0.0);
            running += xg;
            points.push(XgPoint {
                team: team.clone(),
                matchday,
                xg,
                cumulative_xg: running,
            });
        }
    }
    Ok(points)
}

/// Sum or mean of `value` per `group`, keys ascending. Groups without any
/// observation of `value` produce no row.
pub fn grouped_numeric(
    table: &Table,
    group: Field,
    value: Field,
    stat: NumericStat,
) -> Result<Vec<NumericRow>, ViewError> {
    table.require(group)?;
    table.require(value)?;
    let mut acc: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for row in table.rows() {
        let (Some(key), Some(v)) = (row.categorical(group), row.numeric(value)) else {
            continue;
        };
        let slot = acc.entry(key).or_insert((0.0, 0));
        slot.0 += v;
        slot.1 += 1;
    }
    Ok(acc
        .into_iter()
        .map(|(key, (sum, n))| NumericRow {
            key: key.to_string(),
            value: match stat {
                NumericStat::Sum => sum,
                NumericStat::Mean => safe_ratio(sum, n as f64),
            },
            observations: n,
        })
        .collect())
}

/// Defending teams ordered by shots received per action, lowest first.
/// Ties fall back to the team name.
pub fn defensive_ranking(table: &Table, top_n: usize) -> Result<DefensiveRanking, ViewError> {
    table.require(Field::DefendingTeam)?;
    table.require(Field::EndsInShot)?;
    let with_goals = table.has_column(Field::EndsInGoal);

    let mut acc: HashMap<&str, (usize, usize, usize)> = HashMap::new();
    for row in table.rows() {
        let Some(team) = row.defending_team.as_deref() else {
            continue;
        };
        let slot = acc.entry(team).or_default();
        slot.0 += 1;
        slot.1 += usize::from(row.shot);
        slot.2 += usize::from(row.goal);
    }

    let mut entries: Vec<DefensiveRankingEntry> = acc
        .into_iter()
        .map(|(team, (actions, shots, goals))| DefensiveRankingEntry {
            team: team.to_string(),
            actions,
            shots_received: shots,
            goals_received: with_goals.then_some(goals),
            shots_per_action: safe_ratio(shots as f64, actions as f64),
            goals_per_action: with_goals.then(|| safe_ratio(goals as f64, actions as f64)),
        })
        .collect();

    entries.sort_by(|a, b| match a.shots_per_action.total_cmp(&b.shots_per_action) {
        Ordering::Equal => a.team.cmp(&b.team),
        other => other,
    });

    Ok(DefensiveRanking { entries, top_n })
}

pub fn kpis(full: &Table, filtered: &Table) -> Kpis {
    let shots = filtered.shots();
    Kpis {
        total_actions: full.len(),
        filtered_actions: filtered.len(),
        attacking_teams: filtered.distinct_values(Field::AttackingTeam).len(),
        defending_teams: filtered.distinct_values(Field::DefendingTeam).len(),
        shots,
        goals: filtered
            .has_column(Field::EndsInGoal)
            .then(|| filtered.goals()),
        shot_pct: safe_ratio(shots as f64, filtered.len() as f64) * 100.0,
    }
}

/// Head-to-head of two attacking teams over an already filtered table.
pub fn team_comparison(filtered: &Table, team_a: &str, team_b: &str) -> TeamComparison {
    let side = |team: &str| filtered.retain(|r| r.attacking_team.as_deref() == Some(team));
    let rows_a = side(team_a);
    let rows_b = side(team_b);

    let mut per_matchday: BTreeMap<i64, (usize, usize)> = BTreeMap::new();
    for point in matchday_series(&rows_a) {
        per_matchday.entry(point.matchday).or_default().0 = point.count;
    }
    for point in matchday_series(&rows_b) {
        per_matchday.entry(point.matchday).or_default().1 = point.count;
    }

    let line = |team: &str, rows: &Table| TeamLine {
        team: team.to_string(),
        actions: rows.len(),
        shots: rows.shots(),
        goals: rows.has_column(Field::EndsInGoal).then(|| rows.goals()),
    };

    TeamComparison {
        team_a: line(team_a, &rows_a),
        team_b: line(team_b, &rows_b),
        per_matchday: per_matchday
            .into_iter()
            .map(|(m, (a, b))| (m, a, b))
            .collect(),
    }
}
