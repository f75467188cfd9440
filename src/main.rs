use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::Context;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::canvas::{Canvas, Circle, Line as CanvasLine, Points, Rectangle};
use ratatui::widgets::{
    Axis, Bar, BarChart, BarGroup, Block, Borders, Cell, Chart, Clear, Dataset, GraphType,
    Paragraph, Row, Table as TableWidget, Wrap,
};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use abp_terminal::aggregate::{self, NumericStat, ViewInput, ViewRequest, ViewResult};
use abp_terminal::config::{Config, has_flag};
use abp_terminal::error::ViewError;
use abp_terminal::export;
use abp_terminal::filter::{self, Dimension, FilterSpec};
use abp_terminal::loader;
use abp_terminal::network::{self, GraphLayout, SpringLayout};
use abp_terminal::pitch::{self, PITCH_LENGTH, PITCH_WIDTH};
use abp_terminal::sample;
use abp_terminal::state::{AppState, Focus, Page};
use abp_terminal::table::{Field, Table};

const DEMO_ROWS: usize = 600;

const PALETTE: [Color; 8] = [
    Color::Cyan,
    Color::Yellow,
    Color::Magenta,
    Color::Green,
    Color::Red,
    Color::Blue,
    Color::LightCyan,
    Color::LightRed,
];

struct App {
    state: AppState,
    config: Config,
    spec: FilterSpec,
    filtered: Table,
    should_quit: bool,
}

impl App {
    fn new(table: Table, config: Config) -> Self {
        let state = AppState::new(table);
        let spec = state.filter_spec();
        let filtered = filter::apply(&state.table, &spec);
        Self {
            state,
            config,
            spec,
            filtered,
            should_quit: false,
        }
    }

    /// One full recomputation per interaction.
    fn refresh(&mut self) {
        self.spec = self.state.filter_spec();
        self.filtered = filter::apply(&self.state.table, &self.spec);
    }

    fn view_input(&self) -> ViewInput<'_> {
        ViewInput {
            full: &self.state.table,
            filtered: &self.filtered,
            spec: &self.spec,
        }
    }

    fn compute(&self, request: &ViewRequest) -> Result<ViewResult, ViewError> {
        aggregate::compute(&self.view_input(), request)
    }

    fn on_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            KeyCode::Tab => {
                self.state.focus = match self.state.focus {
                    Focus::Filters => Focus::Page,
                    Focus::Page => Focus::Filters,
                };
                self.state.expanded = false;
            }
            KeyCode::Char(c @ '1'..='7') => {
                let idx = c as usize - '1' as usize;
                self.state.page = Page::ALL[idx];
            }
            KeyCode::Char('n') => self.state.page = self.state.page.next(),
            KeyCode::Char('p') => self.state.page = self.state.page.prev(),
            KeyCode::Char('r') => self.state.reset_filters(),
            KeyCode::Char('e') => self.export(),
            _ => match self.state.focus {
                Focus::Filters => self.on_filter_key(key),
                Focus::Page => self.on_page_key(key),
            },
        }
        self.refresh();
    }

    fn on_filter_key(&mut self, key: KeyEvent) {
        let on_matchday = self.state.filter_cursor == 0;
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.state.cursor_down(),
            KeyCode::Char('k') | KeyCode::Up => self.state.cursor_up(),
            KeyCode::Enter => self.state.toggle_expanded(),
            KeyCode::Esc => self.state.expanded = false,
            KeyCode::Char(' ') if self.state.expanded => self.state.toggle_current_option(),
            KeyCode::Char(' ') | KeyCode::Char('a') => self.state.toggle_current_all(),
            KeyCode::Char('h') | KeyCode::Left if on_matchday => self.state.shift_matchday(false, -1),
            KeyCode::Char('l') | KeyCode::Right if on_matchday => self.state.shift_matchday(false, 1),
            KeyCode::Char('H') if on_matchday => self.state.shift_matchday(true, -1),
            KeyCode::Char('L') if on_matchday => self.state.shift_matchday(true, 1),
            _ => {}
        }
    }

    fn on_page_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                let max = self.filtered.len().saturating_sub(1);
                self.state.rows_scroll = (self.state.rows_scroll + 1).min(max);
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.state.rows_scroll = self.state.rows_scroll.saturating_sub(1);
            }
            KeyCode::Left => self.state.page = self.state.page.prev(),
            KeyCode::Right => self.state.page = self.state.page.next(),
            KeyCode::Char('[') => self.state.cycle_compare(false, false),
            KeyCode::Char(']') => self.state.cycle_compare(false, true),
            KeyCode::Char('{') => self.state.cycle_compare(true, false),
            KeyCode::Char('}') => self.state.cycle_compare(true, true),
            _ => {}
        }
    }

    fn export(&mut self) {
        let now = Instant::now();
        match export::export_filtered(&self.config.export_dir, &self.filtered) {
            Ok(report) => {
                let msg = format!(
                    "Exported {} rows to {} and {}",
                    report.rows,
                    report.csv_path.display(),
                    report.xlsx_path.display()
                );
                self.state.push_log(format!("[INFO] {msg}"));
                self.state.export.finish(msg, false, now);
            }
            Err(err) => {
                warn!(error = %err, "export failed");
                self.state.push_log(format!("[WARN] Export failed: {err}"));
                self.state.export.finish(format!("Export failed: {err}"), true, now);
            }
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let mut config = Config::from_env();
    config.apply_args(&args);
    init_logging(&config.log_file)?;

    let table = if has_flag(&args, "--demo") {
        info!(rows = DEMO_ROWS, "using synthetic demo dataset");
        sample::sample_table(config.layout_seed, DEMO_ROWS)
    } else {
        match loader::load_default(&config) {
            Ok(table) => table,
            Err(err) => {
                error!(error = %err, "dataset unavailable");
                eprintln!("error: {err}");
                return Err(err.into());
            }
        }
    };

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let mut app = App::new(table, config);
    app.state.push_log(format!(
        "[INFO] Loaded {} actions",
        app.state.table.len()
    ));
    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn init_logging(path: &Path) -> anyhow::Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed opening log file {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        app.state.export.clear_if_done_for(Instant::now(), 8);

        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            app.on_key(key);
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(app))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(34), Constraint::Min(40)])
        .split(chunks[1]);
    render_sidebar(frame, body[0], &app.state);

    let main = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(4)])
        .split(body[1]);
    render_page(frame, main[0], app);
    render_console(frame, main[1], &app.state);

    let footer = Paragraph::new(footer_text(&app.state));
    frame.render_widget(footer, chunks[2]);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(app: &App) -> String {
    let title = format!(
        "ABP TERMINAL | {} | {} of {} actions",
        app.state.page.title(),
        app.filtered.len(),
        app.state.table.len()
    );
    let line1 = format!("  .-.  {title}");
    let line2 = match &app.state.export.message {
        Some(msg) => format!(" /___\\ {msg}"),
        None => " /___\\".to_string(),
    };
    let line3 = "  |_|".to_string();
    format!("{line1}\n{line2}\n{line3}")
}

fn footer_text(state: &AppState) -> String {
    match state.focus {
        Focus::Filters => {
            "Tab Page | j/k Move | Enter Open | Space Toggle | a All | h/l H/L Matchdays | r Reset | e Export | 1-7 Pages | ? Help | q Quit".to_string()
        }
        Focus::Page => {
            "Tab Filters | ←/→ n/p Page | j/k Scroll | [ ] { } Compare teams | r Reset | e Export | ? Help | q Quit".to_string()
        }
    }
}

fn render_sidebar(frame: &mut Frame, area: Rect, state: &AppState) {
    let focused = state.focus == Focus::Filters;
    let cursor_style = if focused {
        Style::default().fg(Color::White).bg(Color::DarkGray)
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    };

    let mut lines: Vec<Line> = Vec::new();
    let matchday = format!("Matchday: {}", state.matchday_label());
    lines.push(if state.filter_cursor == 0 {
        Line::styled(matchday, cursor_style)
    } else {
        Line::raw(matchday)
    });

    for (idx, entry) in state.filters.iter().enumerate() {
        let text = format!("{}: {}", entry.dimension.label(), entry.summary());
        let is_cursor = state.filter_cursor == idx + 1;
        lines.push(if is_cursor {
            Line::styled(text, cursor_style)
        } else {
            Line::raw(text)
        });
        if is_cursor && state.expanded {
            for (opt_idx, option) in entry.options.iter().enumerate() {
                let mark = if entry.selected.contains(option) { "[x]" } else { "[ ]" };
                let style = if opt_idx == state.option_cursor {
                    Style::default().fg(Color::Yellow)
                } else {
                    Style::default().fg(Color::Gray)
                };
                lines.push(Line::styled(format!("   {mark} {option}"), style));
            }
        }
    }

    // Keep the cursor row on screen.
    let inner_height = area.height.saturating_sub(2) as usize;
    let cursor_line = state.filter_cursor + if state.expanded { state.option_cursor + 1 } else { 0 };
    let scroll = cursor_line.saturating_sub(inner_height.saturating_sub(1));

    let title = if focused { "Filters *" } else { "Filters" };
    let panel = Paragraph::new(lines)
        .scroll((scroll as u16, 0))
        .block(Block::default().title(title).borders(Borders::ALL));
    frame.render_widget(panel, area);
}

fn render_console(frame: &mut Frame, area: Rect, state: &AppState) {
    let text = if state.logs.is_empty() {
        "No alerts yet".to_string()
    } else {
        state
            .logs
            .iter()
            .rev()
            .take(2)
            .cloned()
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect::<Vec<_>>()
            .join("\n")
    };
    let console = Paragraph::new(text)
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, area);
}

fn render_page(frame: &mut Frame, area: Rect, app: &App) {
    match app.state.page {
        Page::Dashboard => render_dashboard(frame, area, app),
        Page::Attacking => render_team_page(frame, area, app, Dimension::AttackingTeam),
        Page::Defending => render_team_page(frame, area, app, Dimension::DefendingTeam),
        Page::TeamComparison => render_comparison(frame, area, app),
        Page::DefensiveRanking => render_ranking(frame, area, app),
        Page::SeasonComparison => render_seasons(frame, area, app),
        Page::Network => render_network(frame, area, app),
    }
}

fn split(area: Rect, direction: Direction, percents: &[u16]) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(direction)
        .constraints(percents.iter().map(|p| Constraint::Percentage(*p)))
        .split(area)
}

fn render_dashboard(frame: &mut Frame, area: Rect, app: &App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Percentage(45),
            Constraint::Min(8),
        ])
        .split(area);
    render_kpis(frame, rows[0], app, "General KPIs");

    let middle = split(rows[1], Direction::Horizontal, &[60, 40]);
    render_rows(frame, middle[0], app);
    render_counts(
        frame,
        middle[1],
        app,
        &ViewRequest::Distribution {
            dimension: Dimension::SetPieceType,
        },
        "Actions by set-piece type",
    );

    let bottom = split(rows[2], Direction::Horizontal, &[25, 25, 25, 25]);
    render_matchday_line(frame, bottom[0], app);
    render_pitch(frame, bottom[1], app);
    render_top_executors(frame, bottom[2], app);
    render_xg(frame, bottom[3], app);
}

fn render_team_page(frame: &mut Frame, area: Rect, app: &App, side: Dimension) {
    let attacking = side == Dimension::AttackingTeam;
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Percentage(45),
            Constraint::Min(8),
        ])
        .split(area);
    let heading = if attacking { "Attacking KPIs" } else { "Defending KPIs" };
    render_kpis(frame, rows[0], app, heading);

    let middle = split(rows[1], Direction::Horizontal, &[40, 30, 30]);
    render_rows(frame, middle[0], app);
    render_counts(
        frame,
        middle[1],
        app,
        &ViewRequest::Distribution {
            dimension: Dimension::SetPieceType,
        },
        "Actions by set-piece type",
    );
    let by_team = if attacking {
        "Actions by attacking team"
    } else {
        "Actions by defending team"
    };
    render_counts(
        frame,
        middle[2],
        app,
        &ViewRequest::Distribution { dimension: side },
        by_team,
    );

    let bottom = split(rows[2], Direction::Horizontal, &[20, 20, 20, 20, 20]);
    render_matchday_line(frame, bottom[0], app);
    render_pitch(frame, bottom[1], app);
    render_top_executors(frame, bottom[2], app);
    if attacking {
        render_xg(frame, bottom[3], app);
    } else {
        let note = Paragraph::new(
            "Cumulative xG is always per attacking team. Use the attacking page to compare xG.",
        )
        .wrap(Wrap { trim: true })
        .block(Block::default().title("xG").borders(Borders::ALL));
        frame.render_widget(note, bottom[3]);
    }

    let effectiveness = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(4)])
        .split(bottom[4]);
    render_shot_rate(frame, effectiveness[0], app, attacking);
    render_mean_xg(frame, effectiveness[1], app);
}

fn render_kpis(frame: &mut Frame, area: Rect, app: &App, heading: &str) {
    let text = match app.compute(&ViewRequest::Kpis) {
        Ok(ViewResult::Kpis(k)) => {
            let goals = k
                .goals
                .map(|g| g.to_string())
                .unwrap_or_else(|| "—".to_string());
            format!(
                "Total actions: {}  |  Filtered: {}  |  Attacking teams: {}  |  Defending teams: {}\nShots: {}  |  Goals: {}",
                k.total_actions,
                k.filtered_actions,
                k.attacking_teams,
                k.defending_teams,
                k.shots,
                goals
            )
        }
        Ok(_) => String::new(),
        Err(err) => err.to_string(),
    };
    let kpis = Paragraph::new(text).block(Block::default().title(heading).borders(Borders::ALL));
    frame.render_widget(kpis, area);
}

fn render_unavailable(frame: &mut Frame, area: Rect, title: &str, message: &str) {
    let paragraph = Paragraph::new(message.to_string())
        .style(Style::default().fg(Color::DarkGray))
        .wrap(Wrap { trim: true })
        .block(Block::default().title(title.to_string()).borders(Borders::ALL));
    frame.render_widget(paragraph, area);
}

const ROW_FIELDS: [Field; 9] = [
    Field::Matchday,
    Field::AttackingTeam,
    Field::DefendingTeam,
    Field::SetPieceType,
    Field::ExecutingPlayer,
    Field::TargetPlayer,
    Field::EndsInShot,
    Field::EndsInGoal,
    Field::ExpectedGoals,
];

fn render_rows(frame: &mut Frame, area: Rect, app: &App) {
    let fields: Vec<Field> = ROW_FIELDS
        .into_iter()
        .filter(|f| app.filtered.has_column(*f))
        .collect();
    let header = Row::new(
        fields
            .iter()
            .map(|f| Cell::from(f.header().to_string()))
            .collect::<Vec<_>>(),
    )
    .style(Style::default().add_modifier(Modifier::BOLD));

    let visible = area.height.saturating_sub(3) as usize;
    let rows = app
        .filtered
        .rows()
        .iter()
        .skip(app.state.rows_scroll)
        .take(visible)
        .map(|record| {
            Row::new(
                fields
                    .iter()
                    .map(|f| Cell::from(record.text(*f).unwrap_or_default()))
                    .collect::<Vec<_>>(),
            )
        });
    let widths = fields.iter().map(|f| match f {
        Field::Matchday | Field::EndsInShot | Field::EndsInGoal | Field::ExpectedGoals => {
            Constraint::Length(8)
        }
        _ => Constraint::Min(10),
    });

    let title = format!(
        "Actions {}-{} of {}",
        (app.state.rows_scroll + 1).min(app.filtered.len()),
        (app.state.rows_scroll + visible).min(app.filtered.len()),
        app.filtered.len()
    );
    let table = TableWidget::new(rows, widths)
        .header(header)
        .block(Block::default().title(title).borders(Borders::ALL));
    frame.render_widget(table, area);
}

fn count_bars(rows: &[aggregate::CountRow]) -> Vec<Bar<'static>> {
    rows.iter()
        .enumerate()
        .map(|(idx, row)| {
            Bar::default()
                .value(row.count as u64)
                .label(Line::from(row.key.clone()))
                .text_value(row.count.to_string())
                .style(Style::default().fg(PALETTE[idx % PALETTE.len()]))
        })
        .collect()
}

fn horizontal_bars<'a>(bars: &'a [Bar<'a>], title: &str) -> BarChart<'a> {
    BarChart::default()
        .block(Block::default().title(title.to_string()).borders(Borders::ALL))
        .data(BarGroup::default().bars(bars))
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(0)
}

fn render_counts(frame: &mut Frame, area: Rect, app: &App, request: &ViewRequest, title: &str) {
    match app.compute(request) {
        Ok(ViewResult::Counts(rows)) if !rows.is_empty() => {
            let bars = count_bars(&rows);
            frame.render_widget(horizontal_bars(&bars, title), area);
        }
        Ok(_) => render_unavailable(frame, area, title, "No actions for these filters"),
        Err(err) => render_unavailable(frame, area, title, &err.to_string()),
    }
}

fn render_top_executors(frame: &mut Frame, area: Rect, app: &App) {
    let request = ViewRequest::TopN {
        dimension: Dimension::ExecutingPlayer,
        n: app.config.top_n,
    };
    render_counts(frame, area, app, &request, "Top executors");
}

fn render_line_chart(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    x_title: &str,
    series: &[(String, Vec<(f64, f64)>)],
) {
    let points = series.iter().flat_map(|(_, pts)| pts.iter());
    let (mut x_min, mut x_max, mut y_max) = (f64::MAX, f64::MIN, 0.0_f64);
    for (x, y) in points {
        x_min = x_min.min(*x);
        x_max = x_max.max(*x);
        y_max = y_max.max(*y);
    }
    if x_min > x_max {
        render_unavailable(frame, area, title, "No data for these filters");
        return;
    }
    if x_min == x_max {
        x_max = x_min + 1.0;
    }
    let y_top = if y_max > 0.0 { y_max * 1.1 } else { 1.0 };

    let datasets = series
        .iter()
        .enumerate()
        .map(|(idx, (name, pts))| {
            Dataset::default()
                .name(name.clone())
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(PALETTE[idx % PALETTE.len()]))
                .data(pts)
        })
        .collect::<Vec<_>>();

    let x_labels = vec![
        Span::raw(format!("{x_min:.0}")),
        Span::raw(format!("{:.0}", (x_min + x_max) / 2.0)),
        Span::raw(format!("{x_max:.0}")),
    ];
    let y_labels = vec![
        Span::raw("0"),
        Span::raw(format!("{:.1}", y_top / 2.0)),
        Span::raw(format!("{y_top:.1}")),
    ];

    let chart = Chart::new(datasets)
        .block(Block::default().title(title.to_string()).borders(Borders::ALL))
        .x_axis(
            Axis::default()
                .title(x_title.to_string())
                .bounds([x_min, x_max])
                .labels(x_labels),
        )
        .y_axis(Axis::default().bounds([0.0, y_top]).labels(y_labels));
    frame.render_widget(chart, area);
}

fn render_matchday_line(frame: &mut Frame, area: Rect, app: &App) {
    let title = "Actions per matchday";
    match app.compute(&ViewRequest::MatchdaySeries) {
        Ok(ViewResult::Matchdays(points)) => {
            let series = vec![(
                "Actions".to_string(),
                points
                    .iter()
                    .map(|p| (p.matchday as f64, p.count as f64))
                    .collect::<Vec<_>>(),
            )];
            render_line_chart(frame, area, title, "Matchday", &series);
        }
        Ok(_) => {}
        Err(err) => render_unavailable(frame, area, title, &err.to_string()),
    }
}

fn render_xg(frame: &mut Frame, area: Rect, app: &App) {
    let title = "Cumulative xG per matchday";
    if app.filtered.is_empty() {
        render_unavailable(frame, area, title, "No actions for these filters");
        return;
    }
    match app.compute(&ViewRequest::CumulativeXg) {
        Ok(ViewResult::Xg(points)) => {
            let mut series: Vec<(String, Vec<(f64, f64)>)> = Vec::new();
            for point in points {
                if series.last().is_none_or(|(team, _)| *team != point.team) {
                    series.push((point.team.clone(), Vec::new()));
                }
                if let Some((_, pts)) = series.last_mut() {
                    pts.push((point.matchday as f64, point.cumulative_xg));
                }
            }
            render_line_chart(frame, area, title, "Matchday", &series);
        }
        Ok(_) => {}
        Err(err) => render_unavailable(frame, area, title, &err.to_string()),
    }
}

fn render_shot_rate(frame: &mut Frame, area: Rect, app: &App, attacking: bool) {
    let text = match app.compute(&ViewRequest::Kpis) {
        Ok(ViewResult::Kpis(k)) if attacking => {
            format!("{:.1}% of actions end in a shot.", k.shot_pct)
        }
        Ok(ViewResult::Kpis(k)) => format!("{:.1}% of actions concede a shot.", k.shot_pct),
        Ok(_) => String::new(),
        Err(err) => err.to_string(),
    };
    let title = if attacking { "Effectiveness" } else { "Defensive effectiveness" };
    let paragraph = Paragraph::new(text)
        .wrap(Wrap { trim: true })
        .block(Block::default().title(title).borders(Borders::ALL));
    frame.render_widget(paragraph, area);
}

fn render_mean_xg(frame: &mut Frame, area: Rect, app: &App) {
    let title = "Mean xG by set-piece type";
    let request = ViewRequest::GroupedXg {
        group: Dimension::SetPieceType,
        stat: NumericStat::Mean,
    };
    match app.compute(&request) {
        Ok(ViewResult::Numeric(rows)) if !rows.is_empty() => {
            let bars = rows
                .iter()
                .enumerate()
                .map(|(idx, row)| {
                    Bar::default()
                        .value((row.value * 1000.0).round() as u64)
                        .label(Line::from(row.key.clone()))
                        .text_value(format!("{:.3}", row.value))
                        .style(Style::default().fg(PALETTE[idx % PALETTE.len()]))
                })
                .collect::<Vec<_>>();
            frame.render_widget(horizontal_bars(&bars, title), area);
        }
        Ok(_) => render_unavailable(frame, area, title, "No xG recorded for these filters"),
        Err(err) => render_unavailable(frame, area, title, &err.to_string()),
    }
}

fn render_pitch(frame: &mut Frame, area: Rect, app: &App) {
    let title = "Execution zones";
    let series = match pitch::pitch_points(&app.filtered, Some(Field::SetPieceType)) {
        Ok(series) => series,
        Err(_) => {
            render_unavailable(frame, area, title, "No execution coordinate columns");
            return;
        }
    };
    if series.iter().all(|s| s.points.is_empty()) {
        render_unavailable(frame, area, title, "No executions to show on the pitch");
        return;
    }

    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(area);

    let canvas = Canvas::default()
        .block(Block::default().title(title).borders(Borders::ALL))
        .x_bounds([-5.0, PITCH_LENGTH + 5.0])
        .y_bounds([-5.0, PITCH_WIDTH + 5.0])
        .paint(|ctx| {
            draw_pitch_lines(ctx);
            ctx.layer();
            for (idx, s) in series.iter().enumerate() {
                ctx.draw(&Points {
                    coords: &s.points,
                    color: PALETTE[idx % PALETTE.len()],
                });
            }
        });
    frame.render_widget(canvas, parts[0]);

    let legend = Line::from(
        series
            .iter()
            .enumerate()
            .flat_map(|(idx, s)| {
                [
                    Span::styled("● ", Style::default().fg(PALETTE[idx % PALETTE.len()])),
                    Span::raw(format!("{}  ", s.label)),
                ]
            })
            .collect::<Vec<_>>(),
    );
    frame.render_widget(Paragraph::new(legend), parts[1]);
}

fn draw_pitch_lines(ctx: &mut ratatui::widgets::canvas::Context<'_>) {
    let line_color = Color::DarkGray;
    ctx.draw(&Rectangle {
        x: 0.0,
        y: 0.0,
        width: PITCH_LENGTH,
        height: PITCH_WIDTH,
        color: line_color,
    });
    ctx.draw(&CanvasLine {
        x1: PITCH_LENGTH / 2.0,
        y1: 0.0,
        x2: PITCH_LENGTH / 2.0,
        y2: PITCH_WIDTH,
        color: line_color,
    });
    ctx.draw(&Circle {
        x: PITCH_LENGTH / 2.0,
        y: PITCH_WIDTH / 2.0,
        radius: 10.0,
        color: line_color,
    });
    for x in [0.0, PITCH_LENGTH - 18.0] {
        ctx.draw(&Rectangle {
            x,
            y: 18.0,
            width: 18.0,
            height: 44.0,
            color: line_color,
        });
    }
}

fn render_comparison(frame: &mut Frame, area: Rect, app: &App) {
    let title = "Team comparison";
    let Some((team_a, team_b)) = app.state.compared_teams() else {
        render_unavailable(frame, area, title, "No attacking teams in the data");
        return;
    };
    let request = ViewRequest::TeamComparison { team_a, team_b };
    let Ok(ViewResult::Comparison(cmp)) = app.compute(&request) else {
        render_unavailable(frame, area, title, "Comparison unavailable");
        return;
    };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(6), Constraint::Min(6)])
        .split(area);
    let cols = split(rows[0], Direction::Horizontal, &[50, 50]);
    for (side, (line, hint)) in [(&cmp.team_a, "[ ]"), (&cmp.team_b, "{ }")].into_iter().enumerate() {
        let goals = line
            .goals
            .map(|g| g.to_string())
            .unwrap_or_else(|| "—".to_string());
        let text = format!(
            "Actions: {}\nShots: {}\nGoals: {}",
            line.actions, line.shots, goals
        );
        let block_title = format!("Team {}: {} ({hint} to change)", side + 1, line.team);
        let paragraph =
            Paragraph::new(text).block(Block::default().title(block_title).borders(Borders::ALL));
        frame.render_widget(paragraph, cols[side]);
    }

    if cmp.team_a.actions == 0 || cmp.team_b.actions == 0 {
        render_unavailable(frame, rows[1], "Actions per matchday", "Not enough data for the comparison");
        return;
    }
    let series = vec![
        (
            cmp.team_a.team.clone(),
            cmp.per_matchday
                .iter()
                .map(|(m, a, _)| (*m as f64, *a as f64))
                .collect::<Vec<_>>(),
        ),
        (
            cmp.team_b.team.clone(),
            cmp.per_matchday
                .iter()
                .map(|(m, _, b)| (*m as f64, *b as f64))
                .collect::<Vec<_>>(),
        ),
    ];
    render_line_chart(frame, rows[1], "Actions per matchday", "Matchday", &series);
}

fn render_ranking(frame: &mut Frame, area: Rect, app: &App) {
    let title = "Defensive ranking (fewest shots conceded per action)";
    let ranking = match app.compute(&ViewRequest::DefensiveRanking {
        top_n: app.config.top_n,
    }) {
        Ok(ViewResult::Ranking(ranking)) => ranking,
        Ok(_) => return,
        Err(err) => {
            render_unavailable(frame, area, title, &err.to_string());
            return;
        }
    };
    if ranking.entries.is_empty() {
        render_unavailable(frame, area, title, "No actions for these filters");
        return;
    }

    let cols = split(area, Direction::Horizontal, &[60, 40]);
    let header = Row::new(vec![
        "Team", "Actions", "Shots rec.", "Goals rec.", "Shots/ABP", "Goals/ABP",
    ])
    .style(Style::default().add_modifier(Modifier::BOLD));
    let rows = ranking.entries.iter().map(|e| {
        Row::new(vec![
            e.team.clone(),
            e.actions.to_string(),
            e.shots_received.to_string(),
            e.goals_received.map(|g| g.to_string()).unwrap_or_default(),
            format!("{:.3}", e.shots_per_action),
            e.goals_per_action
                .map(|g| format!("{g:.3}"))
                .unwrap_or_default(),
        ])
    });
    let widths = [
        Constraint::Min(14),
        Constraint::Length(8),
        Constraint::Length(11),
        Constraint::Length(11),
        Constraint::Length(10),
        Constraint::Length(10),
    ];
    let table = TableWidget::new(rows, widths)
        .header(header)
        .block(Block::default().title(title).borders(Borders::ALL));
    frame.render_widget(table, cols[0]);

    let bars = ranking
        .top()
        .iter()
        .enumerate()
        .map(|(idx, e)| {
            Bar::default()
                .value((e.shots_per_action * 1000.0).round() as u64)
                .label(Line::from(e.team.clone()))
                .text_value(format!("{:.3}", e.shots_per_action))
                .style(Style::default().fg(PALETTE[idx % PALETTE.len()]))
        })
        .collect::<Vec<_>>();
    frame.render_widget(horizontal_bars(&bars, "Top defences (shots per action)"), cols[1]);
}

fn render_seasons(frame: &mut Frame, area: Rect, app: &App) {
    let title = "Actions per matchday and season";
    let request = ViewRequest::MatchdaySeriesBy {
        dimension: Dimension::Season,
    };
    match app.compute(&request) {
        Ok(ViewResult::GroupedMatchdays(points)) if !points.is_empty() => {
            let mut series: Vec<(String, Vec<(f64, f64)>)> = Vec::new();
            for point in points {
                if series.last().is_none_or(|(season, _)| *season != point.group) {
                    series.push((point.group.clone(), Vec::new()));
                }
                if let Some((_, pts)) = series.last_mut() {
                    pts.push((point.matchday as f64, point.count as f64));
                }
            }
            render_line_chart(frame, area, title, "Matchday", &series);
        }
        Ok(_) => render_unavailable(frame, area, title, "No data for the season comparison"),
        Err(err) => render_unavailable(frame, area, title, &err.to_string()),
    }
}

fn render_network(frame: &mut Frame, area: Rect, app: &App) {
    let title = "Executor → target network";
    let graph = match network::build_actor_graph(&app.filtered) {
        Ok(graph) => graph,
        Err(_) => {
            render_unavailable(
                frame,
                area,
                title,
                "No target-player column to build the connections map",
            );
            return;
        }
    };
    if graph.is_empty() {
        render_unavailable(frame, area, title, "No executor/target pairs for these filters");
        return;
    }

    let layout = SpringLayout {
        seed: app.config.layout_seed,
        ..SpringLayout::default()
    };
    let positions = layout.layout(&graph);
    let block_title = format!(
        "{title} ({} players, {} links)",
        graph.nodes.len(),
        graph.edges.len()
    );

    let canvas = Canvas::default()
        .block(Block::default().title(block_title).borders(Borders::ALL))
        .x_bounds([-1.3, 1.3])
        .y_bounds([-1.3, 1.3])
        .paint(|ctx| {
            for &(a, b) in &graph.edges {
                let (x1, y1) = positions[a];
                let (x2, y2) = positions[b];
                ctx.draw(&CanvasLine {
                    x1,
                    y1,
                    x2,
                    y2,
                    color: Color::DarkGray,
                });
            }
            ctx.layer();
            ctx.draw(&Points {
                coords: &positions,
                color: Color::LightBlue,
            });
            for (name, (x, y)) in graph.nodes.iter().zip(&positions) {
                ctx.print(*x, *y - 0.08, Line::styled(name.clone(), Style::default().fg(Color::White)));
            }
        });
    frame.render_widget(canvas, area);
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 70, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "ABP Terminal - Help",
        "",
        "Global:",
        "  1-7 / n / p  Pages",
        "  Tab          Switch filters / page focus",
        "  r            Reset all filters",
        "  e            Export filtered actions (CSV + XLSX)",
        "  ?            Toggle help",
        "  q            Quit",
        "",
        "Filters:",
        "  j/k or ↑/↓   Move",
        "  Enter        Open / close a filter",
        "  Space        Toggle option (open) or select all",
        "  a            Select all / none",
        "  h/l          Matchday from -/+",
        "  H/L          Matchday to -/+",
        "",
        "Page:",
        "  j/k          Scroll actions",
        "  [ ] / { }    Change compared teams",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
