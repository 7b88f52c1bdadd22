use std::env;
use std::ffi::OsString;
use std::fmt::{Display, Formatter};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use ratatui::style::Color;
use serde::{Deserialize, Serialize};

use crate::navigation::Tab;

const APP_DIR: &str = "calendar_shell";
const CONFIG_FILE: &str = "config.toml";
const CONFIG_PATH_ENV_VAR: &str = "CALENDAR_SHELL_CONFIG";

#[derive(Debug)]
pub enum ConfigError {
	Io(std::io::Error),
	TomlDecode(toml::de::Error),
	TomlEncode(toml::ser::Error),
	InvalidColor { field: &'static str, value: String },
}

impl Display for ConfigError {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			ConfigError::Io(err) => write!(f, "io error: {err}"),
			ConfigError::TomlDecode(err) => write!(f, "failed to parse config: {err}"),
			ConfigError::TomlEncode(err) => write!(f, "failed to encode config: {err}"),
			ConfigError::InvalidColor { field, value } => {
				write!(f, "invalid color for {field}: {value:?}")
			}
		}
	}
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorSchemePreference {
	#[default]
	Auto,
	Light,
	Dark,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorScheme {
	Light,
	Dark,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
	pub color_scheme: ColorSchemePreference,
	pub active_tint: String,
	pub inactive_tint: String,
	pub initial_tab: Tab,
	pub poll_interval_ms: u64,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			color_scheme: ColorSchemePreference::Auto,
			active_tint: "#007AFF".to_string(),
			inactive_tint: "gray".to_string(),
			initial_tab: Tab::Home,
			poll_interval_ms: 250,
		}
	}
}

impl Config {
	pub fn poll_interval(&self) -> Duration {
		Duration::from_millis(self.poll_interval_ms.max(10))
	}

	pub fn active_color(&self) -> Result<Color, ConfigError> {
		parse_color(&self.active_tint).ok_or_else(|| ConfigError::InvalidColor {
			field: "active_tint",
			value: self.active_tint.clone(),
		})
	}

	pub fn inactive_color(&self) -> Result<Color, ConfigError> {
		parse_color(&self.inactive_tint).ok_or_else(|| ConfigError::InvalidColor {
			field: "inactive_tint",
			value: self.inactive_tint.clone(),
		})
	}

	pub fn resolved_color_scheme(&self) -> ColorScheme {
		match self.color_scheme {
			ColorSchemePreference::Light => ColorScheme::Light,
			ColorSchemePreference::Dark => ColorScheme::Dark,
			ColorSchemePreference::Auto => {
				detect_color_scheme(env::var("COLORFGBG").ok().as_deref())
			}
		}
	}
}

pub fn parse_config(raw: &str) -> Result<Config, ConfigError> {
	let config: Config = toml::from_str(raw).map_err(ConfigError::TomlDecode)?;
	config.active_color()?;
	config.inactive_color()?;
	Ok(config)
}

pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
	let raw = match fs::read_to_string(path) {
		Ok(content) => content,
		Err(err) if err.kind() == ErrorKind::NotFound => {
			log::debug!("no config at {}, using defaults", path.display());
			return Ok(Config::default());
		}
		Err(err) => return Err(ConfigError::Io(err)),
	};

	let config = parse_config(&raw)?;
	log::info!("loaded config from {}", path.display());
	Ok(config)
}

pub fn save_config(path: &Path, config: &Config) -> Result<(), ConfigError> {
	if let Some(parent) = path.parent() {
		if !parent.as_os_str().is_empty() {
			fs::create_dir_all(parent).map_err(ConfigError::Io)?;
		}
	}

	let raw = toml::to_string_pretty(config).map_err(ConfigError::TomlEncode)?;
	fs::write(path, raw).map_err(ConfigError::Io)
}

pub fn resolve_config_path(cli_path: Option<PathBuf>) -> PathBuf {
	resolve_config_path_with(cli_path, |key| env::var_os(key))
}

fn resolve_config_path_with(
	cli_path: Option<PathBuf>,
	lookup: impl Fn(&str) -> Option<OsString>,
) -> PathBuf {
	if let Some(path) = cli_path {
		return path;
	}

	let non_empty = |key: &str| lookup(key).filter(|value| !value.is_empty());

	if let Some(path) = non_empty(CONFIG_PATH_ENV_VAR) {
		return PathBuf::from(path);
	}

	if let Some(path) = non_empty("XDG_CONFIG_HOME") {
		return PathBuf::from(path).join(APP_DIR).join(CONFIG_FILE);
	}

	if let Some(path) = non_empty("HOME") {
		return PathBuf::from(path)
			.join(".config")
			.join(APP_DIR)
			.join(CONFIG_FILE);
	}

	PathBuf::from(format!(".{APP_DIR}.toml"))
}

/// Guesses the terminal background from a `COLORFGBG` value such as `15;0`.
pub fn detect_color_scheme(colorfgbg: Option<&str>) -> ColorScheme {
	let background = colorfgbg
		.and_then(|value| value.rsplit(';').next())
		.and_then(|value| value.trim().parse::<u8>().ok());

	match background {
		Some(0..=6) | Some(8) | None => ColorScheme::Dark,
		Some(_) => ColorScheme::Light,
	}
}

/// Accepts `#RRGGBB` or one of the terminal color names.
pub fn parse_color(value: &str) -> Option<Color> {
	if let Some(hex) = value.strip_prefix('#') {
		if hex.len() != 6 || !hex.is_ascii() {
			return None;
		}
		let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
		return Some(Color::Rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?));
	}

	match value {
		"black" => Some(Color::Black),
		"red" => Some(Color::Red),
		"green" => Some(Color::Green),
		"yellow" => Some(Color::Yellow),
		"blue" => Some(Color::Blue),
		"magenta" => Some(Color::Magenta),
		"cyan" => Some(Color::Cyan),
		"gray" => Some(Color::Gray),
		"dark_gray" => Some(Color::DarkGray),
		"light_red" => Some(Color::LightRed),
		"light_green" => Some(Color::LightGreen),
		"light_yellow" => Some(Color::LightYellow),
		"light_blue" => Some(Color::LightBlue),
		"light_magenta" => Some(Color::LightMagenta),
		"light_cyan" => Some(Color::LightCyan),
		"white" => Some(Color::White),
		_ => None,
	}
}

#[cfg(test)]
mod tests {
	use std::ffi::OsString;
	use std::fs;
	use std::path::PathBuf;

	use ratatui::style::Color;

	use crate::navigation::Tab;

	use super::{
		ColorScheme, ColorSchemePreference, Config, ConfigError, detect_color_scheme, load_config,
		parse_color, parse_config, resolve_config_path_with, save_config,
	};

	#[test]
	fn empty_config_uses_defaults() {
		let config = parse_config("").expect("empty config should parse");
		assert_eq!(config, Config::default());
		assert_eq!(config.active_color().expect("default tint"), Color::Rgb(0, 122, 255));
		assert_eq!(config.inactive_color().expect("default tint"), Color::Gray);
	}

	#[test]
	fn partial_config_overrides_fields() {
		let config = parse_config(
			"color_scheme = \"light\"\ninitial_tab = \"Calendar\"\nactive_tint = \"cyan\"\n",
		)
		.expect("config should parse");
		assert_eq!(config.color_scheme, ColorSchemePreference::Light);
		assert_eq!(config.resolved_color_scheme(), ColorScheme::Light);
		assert_eq!(config.initial_tab, Tab::Calendar);
		assert_eq!(config.active_color().expect("cyan"), Color::Cyan);
		assert_eq!(config.poll_interval_ms, 250);
	}

	#[test]
	fn rejects_bad_colors_and_tabs() {
		let err = parse_config("inactive_tint = \"#12345\"").expect_err("short hex");
		assert!(matches!(err, ConfigError::InvalidColor { field: "inactive_tint", .. }));

		let err = parse_config("initial_tab = \"Settings\"").expect_err("unknown tab");
		assert!(matches!(err, ConfigError::TomlDecode(_)));
	}

	#[test]
	fn parses_hex_and_named_colors() {
		assert_eq!(parse_color("#007AFF"), Some(Color::Rgb(0, 122, 255)));
		assert_eq!(parse_color("#e0e0e0"), Some(Color::Rgb(224, 224, 224)));
		assert_eq!(parse_color("dark_gray"), Some(Color::DarkGray));
		assert_eq!(parse_color("#zzzzzz"), None);
		assert_eq!(parse_color("#ééé"), None);
		assert_eq!(parse_color("mauve"), None);
	}

	#[test]
	fn detects_color_scheme_from_background_index() {
		assert_eq!(detect_color_scheme(Some("15;0")), ColorScheme::Dark);
		assert_eq!(detect_color_scheme(Some("0;15")), ColorScheme::Light);
		assert_eq!(detect_color_scheme(Some("default;default;7")), ColorScheme::Light);
		assert_eq!(detect_color_scheme(Some("garbage")), ColorScheme::Dark);
		assert_eq!(detect_color_scheme(None), ColorScheme::Dark);
	}

	fn env(
		pairs: &'static [(&'static str, &'static str)],
	) -> impl Fn(&str) -> Option<OsString> {
		move |key: &str| {
			pairs
				.iter()
				.find(|(name, _)| *name == key)
				.map(|(_, value)| OsString::from(value))
		}
	}

	#[test]
	fn config_path_resolution_order() {
		let cli = resolve_config_path_with(Some(PathBuf::from("/tmp/cli.toml")), env(&[
			("CALENDAR_SHELL_CONFIG", "/tmp/env.toml"),
		]));
		assert_eq!(cli, PathBuf::from("/tmp/cli.toml"));

		let explicit = resolve_config_path_with(None, env(&[
			("CALENDAR_SHELL_CONFIG", "/tmp/env.toml"),
			("HOME", "/home/me"),
		]));
		assert_eq!(explicit, PathBuf::from("/tmp/env.toml"));

		let xdg = resolve_config_path_with(None, env(&[
			("CALENDAR_SHELL_CONFIG", ""),
			("XDG_CONFIG_HOME", "/xdg"),
			("HOME", "/home/me"),
		]));
		assert_eq!(xdg, PathBuf::from("/xdg/calendar_shell/config.toml"));

		let home = resolve_config_path_with(None, env(&[("HOME", "/home/me")]));
		assert_eq!(home, PathBuf::from("/home/me/.config/calendar_shell/config.toml"));

		let fallback = resolve_config_path_with(None, env(&[]));
		assert_eq!(fallback, PathBuf::from(".calendar_shell.toml"));
	}

	#[test]
	fn saved_config_loads_back_and_missing_file_is_default() {
		let path = temp_file("calendar_shell_config.toml");
		let missing = load_config(&path).expect("missing config is not an error");
		assert_eq!(missing, Config::default());

		let config = Config {
			color_scheme: ColorSchemePreference::Dark,
			initial_tab: Tab::Library,
			..Config::default()
		};
		save_config(&path, &config).expect("save should succeed");
		let loaded = load_config(&path).expect("load should succeed");
		assert_eq!(loaded, config);
		let _ = fs::remove_file(&path);

		save_config(&path, &Config::default()).expect("save should succeed");
		let raw = fs::read_to_string(&path).expect("written config should be readable");
		assert!(raw.contains("active_tint = \"#007AFF\""));
		assert_eq!(parse_config(&raw).expect("default config parses"), Config::default());
		let _ = fs::remove_file(path);
	}

	fn temp_file(name: &str) -> PathBuf {
		let mut path = std::env::temp_dir();
		path.push(format!("{}_{}", std::process::id(), name));
		path
	}
}
