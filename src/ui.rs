use std::error::Error;
use std::fmt::Write as _;
use std::io;
use std::time::Duration as StdDuration;

use chrono::{Local, NaiveDate};
use crossterm::event::{self, Event as CEvent, KeyCode, KeyEventKind};
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use crossterm::{ExecutableCommand, execute};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Tabs};
use ratatui::{Frame, Terminal};

use crate::calendar::{CalendarState, DayCell, GRID_CELLS, MonthGrid, PageDirection, WEEK_LEN};
use crate::config::{ColorScheme, Config, ConfigError};
use crate::navigation::{Tab, icon_glyph};

const WEEKDAY_LABELS: [&str; WEEK_LEN] = ["Su", "Mo", "Tu", "We", "Th", "Fr", "Sa"];
const CELL_WIDTH: u16 = 4;
const ADJACENT_DAY_COLOR: Color = Color::DarkGray;

pub fn run_shell(config: &Config) -> Result<(), Box<dyn Error>> {
	let theme = Theme::from_config(config)?;
	let mut app = App::new(config.initial_tab, Local::now().date_naive());

	enable_raw_mode()?;
	let mut terminal = restore_on_error(enter_terminal(), || {
		let mut stdout = io::stdout();
		let _ = execute!(stdout, LeaveAlternateScreen);
		let _ = disable_raw_mode();
	})?;

	log::info!("shell started on {:?} tab", app.tab);
	let result = run_event_loop(&mut terminal, &mut app, &theme, config.poll_interval());

	disable_raw_mode()?;
	execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
	terminal.show_cursor()?;
	log::info!("shell closed");

	result
}

fn enter_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>, Box<dyn Error>> {
	let mut stdout = io::stdout();
	stdout.execute(EnterAlternateScreen)?;
	let backend = CrosstermBackend::new(stdout);
	Ok(Terminal::new(backend)?)
}

/// Runs `restore` before handing back a failed setup step.
fn restore_on_error<T, E>(result: Result<T, E>, restore: impl FnOnce()) -> Result<T, E> {
	if result.is_err() {
		restore();
	}
	result
}

fn run_event_loop(
	terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
	app: &mut App,
	theme: &Theme,
	poll_interval: StdDuration,
) -> Result<(), Box<dyn Error>> {
	loop {
		let today = Local::now().date_naive();
		terminal.draw(|frame| draw_shell(frame, app, theme, today))?;

		if event::poll(poll_interval)? {
			if let CEvent::Key(key) = event::read()? {
				if key.kind != KeyEventKind::Press {
					continue;
				}

				if handle_key(app, key.code, today) {
					break;
				}
			}
		}
	}

	Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
	pub active: Color,
	pub inactive: Color,
	pub foreground: Color,
	pub background: Color,
}

impl Theme {
	pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
		let (foreground, background) = match config.resolved_color_scheme() {
			ColorScheme::Light => (Color::Black, Color::White),
			ColorScheme::Dark => (Color::White, Color::Black),
		};
		Ok(Self {
			active: config.active_color()?,
			inactive: config.inactive_color()?,
			foreground,
			background,
		})
	}

	fn base(&self) -> Style {
		Style::default().fg(self.foreground).bg(self.background)
	}
}

fn draw_shell(frame: &mut Frame, app: &App, theme: &Theme, today: NaiveDate) {
	frame.render_widget(Block::default().style(theme.base()), frame.area());

	let layout = Layout::default()
		.direction(Direction::Vertical)
		.constraints([Constraint::Min(12), Constraint::Length(3), Constraint::Length(3)])
		.split(frame.area());

	match app.tab {
		Tab::Calendar => render_calendar_screen(frame, layout[0], app, theme, today),
		tab => render_stub_screen(frame, layout[0], tab, theme),
	}
	render_footer(frame, layout[1], app, theme);
	render_tab_bar(frame, layout[2], app.tab, theme);
}

fn render_tab_bar(frame: &mut Frame, area: Rect, current: Tab, theme: &Theme) {
	let titles = Tab::ALL
		.iter()
		.map(|tab| {
			let icon = tab.icon().name(*tab == current);
			Line::from(format!("{} {}", icon_glyph(icon), tab.label()))
		})
		.collect::<Vec<_>>();

	let tabs = Tabs::new(titles)
		.block(
			Block::default()
				.borders(Borders::TOP)
				.border_style(Style::default().fg(theme.inactive)),
		)
		.style(Style::default().fg(theme.inactive))
		.highlight_style(Style::default().fg(theme.active).add_modifier(Modifier::BOLD))
		.select(current.index());
	frame.render_widget(tabs, area);
}

fn render_stub_screen(frame: &mut Frame, area: Rect, tab: Tab, theme: &Theme) {
	let rows = Layout::default()
		.direction(Direction::Vertical)
		.constraints([Constraint::Fill(1), Constraint::Length(1), Constraint::Fill(1)])
		.split(area);

	let title = Paragraph::new(Line::from(Span::styled(
		tab.label(),
		theme.base().add_modifier(Modifier::BOLD),
	)))
	.centered();
	frame.render_widget(title, rows[1]);
}

fn render_calendar_screen(frame: &mut Frame, area: Rect, app: &App, theme: &Theme, today: NaiveDate) {
	let grid = app.calendar.grid(today);

	let mut lines = Vec::new();
	lines.push(Line::from(Span::styled(
		format!("‹  {}  ›", grid.month.title()),
		theme.base().add_modifier(Modifier::BOLD),
	)));
	lines.push(Line::from(""));
	lines.push(Line::from(
		WEEKDAY_LABELS
			.iter()
			.map(|label| Span::styled(format!(" {label} "), Style::default().fg(theme.inactive)))
			.collect::<Vec<_>>(),
	));

	for (row_index, row) in grid.rows().enumerate() {
		let spans = row
			.iter()
			.enumerate()
			.map(|(column, cell)| {
				let index = row_index * WEEK_LEN + column;
				let is_highlighted = grid.is_highlighted(index);
				let mut style = if is_highlighted {
					Style::default()
						.fg(theme.background)
						.bg(theme.active)
						.add_modifier(Modifier::BOLD)
				} else if cell.is_current_month() {
					Style::default().fg(theme.foreground)
				} else {
					Style::default().fg(ADJACENT_DAY_COLOR)
				};
				if index == app.cursor {
					style = style.add_modifier(Modifier::REVERSED);
				}
				Span::styled(cell_text(cell, is_highlighted), style)
			})
			.collect::<Vec<_>>();
		lines.push(Line::from(spans));
	}

	let columns = Layout::default()
		.direction(Direction::Horizontal)
		.constraints([
			Constraint::Fill(1),
			Constraint::Length(CELL_WIDTH * WEEK_LEN as u16 + 2),
			Constraint::Fill(1),
		])
		.split(area);
	let rows = Layout::default()
		.direction(Direction::Vertical)
		.constraints([Constraint::Fill(1), Constraint::Length(lines.len() as u16 + 2), Constraint::Fill(1)])
		.split(columns[1]);

	let calendar = Paragraph::new(lines)
		.centered()
		.block(
			Block::default()
				.borders(Borders::ALL)
				.title("Calendar")
				.border_style(Style::default().fg(theme.inactive)),
		);
	frame.render_widget(calendar, rows[1]);
}

fn render_footer(frame: &mut Frame, area: Rect, app: &App, theme: &Theme) {
	let hints = match app.tab {
		Tab::Calendar => "arrows/hjkl move | Enter select | [/p ]/n month | t today | Tab/1-4 switch | q quit",
		_ => "Tab/Shift-Tab switch | 1-4 jump | q quit",
	};
	let footer = Paragraph::new(vec![
		Line::from(Span::styled(hints, Style::default().fg(theme.inactive))),
		Line::from(app.status.clone()),
	])
	.style(theme.base());
	frame.render_widget(footer, area);
}

fn cell_text(cell: &DayCell, is_highlighted: bool) -> String {
	if is_highlighted {
		format!("({:>2})", cell.day_number)
	} else if cell.is_current_month() {
		format!(" {:>2} ", cell.day_number)
	} else {
		format!("·{:>2} ", cell.day_number)
	}
}

/// Plain-text rendering of a month grid for non-interactive output.
pub fn format_month(grid: &MonthGrid) -> String {
	let mut out = String::new();
	let _ = writeln!(out, "{}", grid.month.title());
	for label in WEEKDAY_LABELS {
		let _ = write!(out, " {label} ");
	}
	out.push('\n');

	for (row_index, row) in grid.rows().enumerate() {
		for (column, cell) in row.iter().enumerate() {
			let index = row_index * WEEK_LEN + column;
			out.push_str(&cell_text(cell, grid.is_highlighted(index)));
		}
		out.push('\n');
	}
	out
}

fn handle_key(app: &mut App, code: KeyCode, today: NaiveDate) -> bool {
	match code {
		KeyCode::Char('q') => return true,
		KeyCode::Tab => app.switch_tab(app.tab.next()),
		KeyCode::BackTab => app.switch_tab(app.tab.prev()),
		KeyCode::Char(digit @ '1'..='9') => {
			let position = digit.to_digit(10).unwrap_or(0) as usize;
			if let Some(tab) = Tab::from_position(position) {
				app.switch_tab(tab);
			}
		}
		_ if app.tab == Tab::Calendar => handle_calendar_key(app, code, today),
		_ => {}
	}
	false
}

fn handle_calendar_key(app: &mut App, code: KeyCode, today: NaiveDate) {
	match code {
		KeyCode::Left | KeyCode::Char('h') => app.move_cursor(-1),
		KeyCode::Right | KeyCode::Char('l') => app.move_cursor(1),
		KeyCode::Up | KeyCode::Char('k') => app.move_cursor(-(WEEK_LEN as i32)),
		KeyCode::Down | KeyCode::Char('j') => app.move_cursor(WEEK_LEN as i32),
		KeyCode::Enter | KeyCode::Char(' ') => app.press_cursor(today),
		KeyCode::Char('[') | KeyCode::Char('p') => app.page(PageDirection::Previous, today),
		KeyCode::Char(']') | KeyCode::Char('n') => app.page(PageDirection::Next, today),
		KeyCode::Char('t') => {
			app.calendar.jump_to_today(today);
			app.cursor = cursor_home(&app.calendar.grid(today));
			app.status = format!("Back to {}", app.calendar.month.title());
		}
		_ => {}
	}
}

/// Today's cell when it is visible, else the first day of the month.
fn cursor_home(grid: &MonthGrid) -> usize {
	grid.cells
		.iter()
		.position(|cell| cell.is_today)
		.unwrap_or_else(|| grid.first_current_index())
}

#[derive(Debug, Clone)]
struct App {
	tab: Tab,
	calendar: CalendarState,
	cursor: usize,
	status: String,
}

impl App {
	fn new(tab: Tab, today: NaiveDate) -> Self {
		let calendar = CalendarState::new(today);
		let cursor = cursor_home(&calendar.grid(today));
		Self {
			tab,
			calendar,
			cursor,
			status: "Ready".to_string(),
		}
	}

	fn switch_tab(&mut self, tab: Tab) {
		if tab == self.tab {
			return;
		}
		log::debug!("switching tab {:?} -> {:?}", self.tab, tab);
		self.tab = tab;
		self.status = match tab {
			Tab::Calendar => format!(
				"{} | {}",
				self.calendar.month.title(),
				selection_text(self.calendar.selected)
			),
			_ => tab.label().to_string(),
		};
	}

	fn move_cursor(&mut self, delta: i32) {
		let target = self.cursor as i32 + delta;
		self.cursor = target.clamp(0, GRID_CELLS as i32 - 1) as usize;
	}

	fn page(&mut self, direction: PageDirection, today: NaiveDate) {
		self.calendar.page(direction);
		let grid = self.calendar.grid(today);
		self.cursor = grid.first_current_index();
		log::debug!("paged {direction:?} to {}", grid.month.title());
		self.status = grid.month.title();
	}

	fn press_cursor(&mut self, today: NaiveDate) {
		if self.calendar.press(self.cursor, today) {
			log::debug!("selected {:?}", self.calendar.selected);
			self.status = selection_text(self.calendar.selected);
			return;
		}

		let grid = self.calendar.grid(today);
		let is_current = grid.cell(self.cursor).is_some_and(DayCell::is_current_month);
		if is_current {
			self.status = selection_text(self.calendar.selected);
			return;
		}
		self.status = match grid.date_at(self.cursor) {
			Some(date) => format!(
				"Only days in {} can be selected, not {}",
				grid.month.title(),
				date.format("%d %B %Y")
			),
			None => format!("Only days in {} can be selected", grid.month.title()),
		};
	}
}

fn selection_text(selected: Option<NaiveDate>) -> String {
	match selected {
		Some(date) => format!("Selected {}", date.format("%A, %d %B %Y")),
		None => "No date selected".to_string(),
	}
}
