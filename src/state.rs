use std::collections::{BTreeSet, VecDeque};
use std::time::Instant;

use tracing::{info, warn};

use crate::filter::{self, Dimension, FilterSpec};
use crate::table::{Field, Table};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Dashboard,
    Attacking,
    Defending,
    TeamComparison,
    DefensiveRanking,
    SeasonComparison,
    Network,
}

impl Page {
    pub const ALL: [Page; 7] = [
        Page::Dashboard,
        Page::Attacking,
        Page::Defending,
        Page::TeamComparison,
        Page::DefensiveRanking,
        Page::SeasonComparison,
        Page::Network,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Page::Dashboard => "General dashboard",
            Page::Attacking => "Attacking teams",
            Page::Defending => "Defending teams",
            Page::TeamComparison => "Team comparison",
            Page::DefensiveRanking => "Defensive ranking",
            Page::SeasonComparison => "Season comparison",
            Page::Network => "Connections map",
        }
    }

    fn position(self) -> usize {
        Page::ALL.iter().position(|p| *p == self).unwrap_or(0)
    }

    pub fn next(self) -> Page {
        Page::ALL[(self.position() + 1) % Page::ALL.len()]
    }

    pub fn prev(self) -> Page {
        let len = Page::ALL.len();
        Page::ALL[(self.position() + len - 1) % len]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Filters,
    Page,
}

/// Sidebar multiselect with a "select all" switch.
#[derive(Debug, Clone)]
pub struct FilterEntry {
    pub dimension: Dimension,
    pub options: Vec<String>,
    pub selected: BTreeSet<String>,
    pub all: bool,
}

impl FilterEntry {
    fn new(dimension: Dimension, options: Vec<String>) -> Self {
        Self {
            dimension,
            selected: options.iter().cloned().collect(),
            options,
            all: true,
        }
    }

    pub fn summary(&self) -> String {
        if self.all {
            format!("all ({})", self.options.len())
        } else {
            format!("{}/{}", self.selected.len(), self.options.len())
        }
    }

    fn toggle_all(&mut self) {
        self.all = !self.all;
        self.selected = if self.all {
            self.options.iter().cloned().collect()
        } else {
            BTreeSet::new()
        };
    }

    fn toggle(&mut self, value: &str) {
        if !self.selected.remove(value) {
            self.selected.insert(value.to_string());
        }
        self.all = self.selected.len() == self.options.len();
    }

    fn set_options(&mut self, options: Vec<String>) {
        self.selected.retain(|v| options.contains(v));
        if self.all {
            self.selected = options.iter().cloned().collect();
        }
        self.options = options;
    }
}

#[derive(Debug, Clone, Default)]
pub struct ExportState {
    pub message: Option<String>,
    pub failed: bool,
    pub last_updated: Option<Instant>,
}

impl ExportState {
    pub fn finish(&mut self, message: impl Into<String>, failed: bool, now: Instant) {
        self.message = Some(message.into());
        self.failed = failed;
        self.last_updated = Some(now);
    }

    pub fn clear_if_done_for(&mut self, now: Instant, keep_secs: u64) {
        let Some(last) = self.last_updated else {
            return;
        };
        if now.duration_since(last).as_secs() >= keep_secs {
            *self = Self::default();
        }
    }
}

/// Session state of the terminal dashboard. The loaded table never changes;
/// every interaction derives a fresh `FilterSpec` from the widgets.
#[derive(Debug, Clone)]
pub struct AppState {
    pub table: Table,
    pub page: Page,
    pub focus: Focus,
    pub filters: Vec<FilterEntry>,
    pub matchday_bounds: Option<(i64, i64)>,
    pub matchday_range: Option<(i64, i64)>,
    /// Row in the filter panel; 0 is the matchday range.
    pub filter_cursor: usize,
    pub option_cursor: usize,
    pub expanded: bool,
    pub attacking_teams: Vec<String>,
    pub compare_a: usize,
    pub compare_b: usize,
    pub rows_scroll: usize,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
    pub export: ExportState,
}

impl AppState {
    pub fn new(table: Table) -> Self {
        let mut filters = Vec::new();
        for dimension in Dimension::ALL {
            if dimension == Dimension::TimeBucket {
                continue;
            }
            let field = dimension.field();
            if !table.has_column(field) {
                continue;
            }
            let options = table.distinct_values(field);
            if options.is_empty() && !field.is_required() {
                continue;
            }
            filters.push(FilterEntry::new(dimension, options));
        }
        if table.has_column(Field::TimeBucket) {
            let options = bucket_labels(&table, None);
            if !options.is_empty() {
                filters.push(FilterEntry::new(Dimension::TimeBucket, options));
            }
        }

        let matchday_bounds = table.matchday_bounds();
        let attacking_teams = table.distinct_values(Field::AttackingTeam);
        let compare_b = usize::from(attacking_teams.len() > 1);

        Self {
            page: Page::Dashboard,
            focus: Focus::Filters,
            filters,
            matchday_bounds,
            matchday_range: matchday_bounds,
            filter_cursor: 0,
            option_cursor: 0,
            expanded: false,
            attacking_teams,
            compare_a: 0,
            compare_b,
            rows_scroll: 0,
            logs: VecDeque::with_capacity(200),
            help_overlay: false,
            export: ExportState::default(),
            table,
        }
    }

    /// The immutable predicate set for the current widget state.
    /// "Select all" leaves a dimension out; a fully narrowed matchday range too.
    pub fn filter_spec(&self) -> FilterSpec {
        let mut spec = FilterSpec::new();
        if let (Some((lo, hi)), Some(bounds)) = (self.matchday_range, self.matchday_bounds)
            && (lo, hi) != bounds
        {
            spec = spec.with_matchdays(lo, hi);
        }
        for entry in &self.filters {
            if entry.all {
                continue;
            }
            spec = spec.with_values(entry.dimension, entry.selected.iter().cloned());
        }
        spec
    }

    pub fn filtered(&self) -> Table {
        filter::apply(&self.table, &self.filter_spec())
    }

    pub fn reset_filters(&mut self) {
        for entry in &mut self.filters {
            entry.all = true;
            entry.selected = entry.options.iter().cloned().collect();
        }
        self.matchday_range = self.matchday_bounds;
        self.refresh_time_buckets();
        self.rows_scroll = 0;
        self.push_log("[INFO] Filters reset");
    }

    /// Re-derive time-bucket options from the match-half selection.
    pub fn refresh_time_buckets(&mut self) {
        let halves = self
            .filters
            .iter()
            .find(|e| e.dimension == Dimension::MatchHalf)
            .map(|e| e.selected.clone());
        let options = bucket_labels(&self.table, halves.as_ref());
        if let Some(entry) = self
            .filters
            .iter_mut()
            .find(|e| e.dimension == Dimension::TimeBucket)
        {
            entry.set_options(options);
        }
    }

    pub fn panel_len(&self) -> usize {
        self.filters.len() + 1
    }

    pub fn current_filter(&self) -> Option<&FilterEntry> {
        self.filter_cursor
            .checked_sub(1)
            .and_then(|idx| self.filters.get(idx))
    }

    fn current_filter_mut(&mut self) -> Option<&mut FilterEntry> {
        let idx = self.filter_cursor.checked_sub(1)?;
        self.filters.get_mut(idx)
    }

    pub fn cursor_down(&mut self) {
        if self.expanded {
            let len = self.current_filter().map(|e| e.options.len()).unwrap_or(0);
            if len > 0 {
                self.option_cursor = (self.option_cursor + 1) % len;
            }
            return;
        }
        self.filter_cursor = (self.filter_cursor + 1) % self.panel_len();
    }

    pub fn cursor_up(&mut self) {
        if self.expanded {
            let len = self.current_filter().map(|e| e.options.len()).unwrap_or(0);
            if len > 0 {
                self.option_cursor = (self.option_cursor + len - 1) % len;
            }
            return;
        }
        let len = self.panel_len();
        self.filter_cursor = (self.filter_cursor + len - 1) % len;
    }

    pub fn toggle_expanded(&mut self) {
        if self.current_filter().is_some() {
            self.expanded = !self.expanded;
            self.option_cursor = 0;
        }
    }

    pub fn toggle_current_option(&mut self) {
        let cursor = self.option_cursor;
        let Some(entry) = self.current_filter_mut() else {
            return;
        };
        let Some(value) = entry.options.get(cursor).cloned() else {
            return;
        };
        entry.toggle(&value);
        self.after_filter_change();
    }

    pub fn toggle_current_all(&mut self) {
        let Some(entry) = self.current_filter_mut() else {
            return;
        };
        entry.toggle_all();
        self.after_filter_change();
    }

    fn after_filter_change(&mut self) {
        if self
            .current_filter()
            .is_some_and(|e| e.dimension == Dimension::MatchHalf)
        {
            self.refresh_time_buckets();
        }
        self.rows_scroll = 0;
    }

    /// Move one end of the matchday range, staying inside the data bounds.
    pub fn shift_matchday(&mut self, upper: bool, delta: i64) {
        let (Some((lo, hi)), Some((min, max))) = (self.matchday_range, self.matchday_bounds) else {
            return;
        };
        let (lo, hi) = if upper {
            (lo, (hi + delta).clamp(lo, max))
        } else {
            ((lo + delta).clamp(min, hi), hi)
        };
        self.matchday_range = Some((lo, hi));
        self.rows_scroll = 0;
    }

    pub fn matchday_label(&self) -> String {
        match self.matchday_range {
            Some((lo, hi)) => format!("{lo}-{hi}"),
            None => "n/a".to_string(),
        }
    }

    pub fn cycle_compare(&mut self, second: bool, forward: bool) {
        let len = self.attacking_teams.len();
        if len == 0 {
            return;
        }
        let slot = if second {
            &mut self.compare_b
        } else {
            &mut self.compare_a
        };
        *slot = if forward {
            (*slot + 1) % len
        } else {
            (*slot + len - 1) % len
        };
    }

    pub fn compared_teams(&self) -> Option<(String, String)> {
        let a = self.attacking_teams.get(self.compare_a)?;
        let b = self.attacking_teams.get(self.compare_b)?;
        Some((a.clone(), b.clone()))
    }

    /// Console line, mirrored to the tracing log.
    pub fn push_log(&mut self, msg: impl Into<String>) {
        const MAX_LOGS: usize = 200;
        let msg = msg.into();
        match msg.strip_prefix("[WARN] ") {
            Some(rest) => warn!(target: "console", "{rest}"),
            None => info!(target: "console", "{}", msg.trim_start_matches("[INFO] ")),
        }
        self.logs.push_back(msg);
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }
}

fn bucket_labels(table: &Table, halves: Option<&BTreeSet<String>>) -> Vec<String> {
    filter::time_bucket_options(table, halves)
        .into_iter()
        .map(|b| b.label().to_string())
        .collect()
}
