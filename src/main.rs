use std::error::Error;
use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use flexi_logger::{FileSpec, Logger};

use calendar_shell::calendar::{CalendarMonth, compute_grid};
use calendar_shell::config::{Config, load_config, resolve_config_path, save_config};
use calendar_shell::navigation::icon_name;
use calendar_shell::ui::{format_month, run_shell};

const DEFAULT_LOG_LEVEL: &str = if cfg!(debug_assertions) { "debug" } else { "info" };

#[derive(Debug, Parser)]
#[command(name = "calendar-shell", about = "Tabbed terminal shell with a month calendar")]
struct Cli {
	#[arg(long)]
	config: Option<PathBuf>,
	#[arg(long)]
	log_file: Option<PathBuf>,
	#[command(subcommand)]
	command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
	Shell,
	Month {
		/// Month to show as YYYY-MM, defaults to the current month
		#[arg(long)]
		month: Option<String>,
		#[arg(long)]
		selected: Option<String>,
		#[arg(long)]
		today: Option<String>,
		#[arg(long)]
		json: bool,
	},
	Icon {
		route: String,
		#[arg(long)]
		focused: bool,
	},
	InitConfig,
}

fn main() {
	if let Err(err) = run() {
		eprintln!("error: {err}");
		std::process::exit(1);
	}
}

fn run() -> Result<(), Box<dyn Error>> {
	let cli = Cli::parse();
	let command = cli.command.unwrap_or(Command::Shell);

	// the shell owns the terminal, so it only logs when a file is given
	let interactive = matches!(command, Command::Shell);
	let _logger = if cli.log_file.is_some() || !interactive {
		let mut logger = Logger::try_with_env_or_str(DEFAULT_LOG_LEVEL)?;
		if let Some(log_file) = cli.log_file {
			logger = logger.log_to_file(FileSpec::try_from(log_file)?);
		}
		Some(logger.start()?)
	} else {
		None
	};

	dispatch(command, cli.config)
}

fn dispatch(command: Command, config_path: Option<PathBuf>) -> Result<(), Box<dyn Error>> {
	let config_path = resolve_config_path(config_path);

	match command {
		Command::Shell => {
			let config = load_config(&config_path)?;
			run_shell(&config)?;
		}
		Command::Month {
			month,
			selected,
			today,
			json,
		} => {
			let month = match month.as_deref() {
				Some(raw) => parse_month(raw)?,
				None => CalendarMonth::current(),
			};
			let selected = selected.as_deref().map(parse_day).transpose()?;
			let today = match today.as_deref() {
				Some(raw) => parse_day(raw)?,
				None => Local::now().date_naive(),
			};

			let grid = compute_grid(month.first_day(), selected, today);
			if json {
				println!("{}", serde_json::to_string_pretty(&grid)?);
			} else {
				print!("{}", format_month(&grid));
			}
		}
		Command::Icon { route, focused } => {
			println!("{}", icon_name(&route, focused));
		}
		Command::InitConfig => {
			save_config(&config_path, &Config::default())?;
			println!("wrote default config to {}", config_path.display());
		}
	}

	Ok(())
}

fn parse_day(input: &str) -> Result<NaiveDate, Box<dyn Error>> {
	Ok(NaiveDate::parse_from_str(input, "%Y-%m-%d")?)
}

fn parse_month(input: &str) -> Result<CalendarMonth, Box<dyn Error>> {
	let (year, month) = input
		.split_once('-')
		.ok_or_else(|| format!("month must look like YYYY-MM: {input}"))?;
	CalendarMonth::new(year.parse()?, month.parse()?)
		.ok_or_else(|| format!("month out of range: {input}").into())
}
