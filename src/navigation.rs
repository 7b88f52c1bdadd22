use serde::{Deserialize, Serialize};

pub const FALLBACK_ICON: &str = "help-outline";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Tab {
    #[default]
    Home,
    Calendar,
    Library,
    MyPage,
}

/// Icon names for a tab, as (focused, unfocused).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TabIcon {
    pub focused: &'static str,
    pub unfocused: &'static str,
}

impl TabIcon {
    pub fn name(&self, focused: bool) -> &'static str {
        if focused { self.focused } else { self.unfocused }
    }
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Home, Tab::Calendar, Tab::Library, Tab::MyPage];

    pub fn route_name(self) -> &'static str {
        match self {
            Tab::Home => "Home",
            Tab::Calendar => "Calendar",
            Tab::Library => "Library",
            Tab::MyPage => "MyPage",
        }
    }

    pub fn label(self) -> &'static str {
        self.route_name()
    }

    pub fn icon(self) -> TabIcon {
        let (focused, unfocused) = match self {
            Tab::Home => ("home", "home-outline"),
            Tab::Calendar => ("calendar", "calendar-outline"),
            Tab::Library => ("library", "library-outline"),
            Tab::MyPage => ("person", "person-outline"),
        };
        TabIcon { focused, unfocused }
    }

    pub fn from_route_name(name: &str) -> Option<Tab> {
        Tab::ALL.into_iter().find(|tab| tab.route_name() == name)
    }

    /// Tab at a 1-based position in the bar.
    pub fn from_position(position: usize) -> Option<Tab> {
        position.checked_sub(1).and_then(|index| Tab::ALL.get(index).copied())
    }

    pub fn index(self) -> usize {
        match self {
            Tab::Home => 0,
            Tab::Calendar => 1,
            Tab::Library => 2,
            Tab::MyPage => 3,
        }
    }

    pub fn next(self) -> Self {
        Tab::ALL[(self.index() + 1) % Tab::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Tab::ALL[(self.index() + Tab::ALL.len() - 1) % Tab::ALL.len()]
    }
}

/// Icon for a route name. Unknown routes get [`FALLBACK_ICON`].
pub fn icon_name(route: &str, focused: bool) -> &'static str {
    Tab::from_route_name(route)
        .map(|tab| tab.icon().name(focused))
        .unwrap_or(FALLBACK_ICON)
}

/// Terminal stand-in for an icon name.
pub fn icon_glyph(icon: &str) -> &'static str {
    match icon {
        "home" => "⌂",
        "home-outline" => "⌂",
        "calendar" => "▦",
        "calendar-outline" => "▢",
        "library" => "▤",
        "library-outline" => "☰",
        "person" => "●",
        "person-outline" => "○",
        _ => "?",
    }
}
