//! # Theme System
//!
//! Colors for the panel, grouped by semantic role. Rendering code reads
//! theme fields instead of hardcoding `ratatui::style::Color` values. The
//! theme is chosen by name from the config file or `--theme`.
//!
//! ## Built-in Themes
//!
//! - **Catppuccin Mocha** (default)
//! - **Catppuccin Macchiato**
//! - **Catppuccin Frappe**
//! - **Dracula**
//! - **Nord**
//! - **Gruvbox Dark**

use ratatui::style::Color;

/// All colors used by the panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    /// Name used in the config file and on the command line.
    pub name: &'static str,

    /// Panel and modal background.
    pub bg: Color,
    /// Background of the focused form field.
    pub field_bg: Color,

    /// Primary text.
    pub fg: Color,
    /// Labels, hints, placeholders and the footer.
    pub fg_dim: Color,

    /// Branding and focused borders.
    pub accent: Color,
    /// Selected dropdown values and the command preview.
    pub secondary: Color,

    /// Succeeded runs.
    pub success: Color,
    /// Failed runs and error messages.
    pub error: Color,
    /// Running and cancelled runs.
    pub warning: Color,
}

impl Theme {
    /// All built-in themes, in display order.
    pub fn all() -> &'static [Theme] {
        &BUILT_IN_THEMES
    }

    /// Find a built-in theme by name (case-insensitive).
    pub fn by_name(name: &str) -> Option<&'static Theme> {
        BUILT_IN_THEMES
            .iter()
            .find(|t| t.name.eq_ignore_ascii_case(name))
    }

    pub fn default_theme() -> &'static Theme {
        &BUILT_IN_THEMES[0]
    }
}

static BUILT_IN_THEMES: [Theme; 6] = [
    Theme {
        name: "Catppuccin Mocha",
        bg: Color::Rgb(30, 30, 46),          // base
        field_bg: Color::Rgb(49, 50, 68),    // surface0
        fg: Color::Rgb(205, 214, 244),       // text
        fg_dim: Color::Rgb(108, 112, 134),   // overlay0
        accent: Color::Rgb(137, 180, 250),   // blue
        secondary: Color::Rgb(249, 226, 175), // yellow
        success: Color::Rgb(166, 227, 161),  // green
        error: Color::Rgb(243, 139, 168),    // red
        warning: Color::Rgb(250, 179, 135),  // peach
    },
    Theme {
        name: "Catppuccin Macchiato",
        bg: Color::Rgb(36, 39, 58),
        field_bg: Color::Rgb(54, 58, 79),
        fg: Color::Rgb(202, 211, 245),
        fg_dim: Color::Rgb(110, 115, 141),
        accent: Color::Rgb(138, 173, 244),
        secondary: Color::Rgb(238, 212, 159),
        success: Color::Rgb(166, 218, 149),
        error: Color::Rgb(237, 135, 150),
        warning: Color::Rgb(245, 169, 127),
    },
    Theme {
        name: "Catppuccin Frappe",
        bg: Color::Rgb(48, 52, 70),
        field_bg: Color::Rgb(65, 69, 89),
        fg: Color::Rgb(198, 208, 245),
        fg_dim: Color::Rgb(115, 121, 148),
        accent: Color::Rgb(140, 170, 238),
        secondary: Color::Rgb(229, 200, 144),
        success: Color::Rgb(166, 209, 137),
        error: Color::Rgb(231, 130, 132),
        warning: Color::Rgb(239, 159, 118),
    },
    Theme {
        name: "Dracula",
        bg: Color::Rgb(40, 42, 54),
        field_bg: Color::Rgb(68, 71, 90),
        fg: Color::Rgb(248, 248, 242),
        fg_dim: Color::Rgb(98, 114, 164),
        accent: Color::Rgb(139, 233, 253),
        secondary: Color::Rgb(241, 250, 140),
        success: Color::Rgb(80, 250, 123),
        error: Color::Rgb(255, 85, 85),
        warning: Color::Rgb(255, 184, 108),
    },
    Theme {
        name: "Nord",
        bg: Color::Rgb(46, 52, 64),
        field_bg: Color::Rgb(59, 66, 82),
        fg: Color::Rgb(216, 222, 233),
        fg_dim: Color::Rgb(76, 86, 106),
        accent: Color::Rgb(136, 192, 208),
        secondary: Color::Rgb(235, 203, 139),
        success: Color::Rgb(163, 190, 140),
        error: Color::Rgb(191, 97, 106),
        warning: Color::Rgb(208, 135, 112),
    },
    Theme {
        name: "Gruvbox Dark",
        bg: Color::Rgb(40, 40, 40),
        field_bg: Color::Rgb(60, 56, 54),
        fg: Color::Rgb(235, 219, 178),
        fg_dim: Color::Rgb(146, 131, 116),
        accent: Color::Rgb(131, 165, 152),
        secondary: Color::Rgb(250, 189, 47),
        success: Color::Rgb(184, 187, 38),
        error: Color::Rgb(251, 73, 52),
        warning: Color::Rgb(254, 128, 25),
    },
];
