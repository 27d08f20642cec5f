//! Color palettes for the built-in and bundled themes
//!
//! Each palette carries the semantic color slots the component layer styles
//! against (background, foreground, primary, destructive, ...). Colors are
//! hex strings; `parse_hex_color` / `rgb_to_hex` convert to and from RGB
//! components.

use serde::{Deserialize, Serialize};

/// A color represented as an RGB hex string (e.g., "#FFFFFF")
pub type Color = String;

/// Parse a hex color string to RGB components
pub fn parse_hex_color(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.trim_start_matches('#');
    if hex.len() < 6 {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some((r, g, b))
}

/// Convert RGB to hex string
pub fn rgb_to_hex(r: u8, g: u8, b: u8) -> String {
    format!("#{:02X}{:02X}{:02X}", r, g, b)
}

/// Semantic color slots for one theme
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Palette {
    /// Theme token this palette belongs to
    pub token: String,
    /// Whether the palette reads as dark overall
    pub dark_scheme: bool,
    /// Main surface color
    pub background: Color,
    /// Primary text color
    pub foreground: Color,
    /// Divider and outline color
    pub border: Color,
    /// Primary action color
    pub primary: Color,
    /// Text color on primary surfaces
    pub primary_foreground: Color,
    /// Secondary action color
    pub secondary: Color,
    /// Text color on secondary surfaces
    pub secondary_foreground: Color,
    /// Danger/error color
    pub destructive: Color,
    /// Text color on destructive surfaces
    pub destructive_foreground: Color,
    /// Success accent color
    pub success: Color,
    /// Filled success surface color
    pub success_fill: Color,
    /// Muted/disabled text color
    pub muted: Color,
}

impl Palette {
    /// All color slots, for validation and bulk application.
    pub fn slots(&self) -> [(&'static str, &Color); 12] {
        [
            ("background", &self.background),
            ("foreground", &self.foreground),
            ("border", &self.border),
            ("primary", &self.primary),
            ("primary-foreground", &self.primary_foreground),
            ("secondary", &self.secondary),
            ("secondary-foreground", &self.secondary_foreground),
            ("destructive", &self.destructive),
            ("destructive-foreground", &self.destructive_foreground),
            ("success", &self.success),
            ("success-fill", &self.success_fill),
            ("muted", &self.muted),
        ]
    }
}

/// Create the light palette
pub fn light_palette() -> Palette {
    Palette {
        token: "light".to_string(),
        dark_scheme: false,
        background: "#FFFFFF".to_string(),
        foreground: "#18181B".to_string(),
        border: "#E4E4E7".to_string(),
        primary: "#2563EB".to_string(),
        primary_foreground: "#FFFFFF".to_string(),
        secondary: "#F4F4F5".to_string(),
        secondary_foreground: "#27272A".to_string(),
        destructive: "#DC2626".to_string(),
        destructive_foreground: "#FFFFFF".to_string(),
        success: "#16A34A".to_string(),
        success_fill: "#DCFCE7".to_string(),
        muted: "#71717A".to_string(),
    }
}

/// Create the dark palette
pub fn dark_palette() -> Palette {
    Palette {
        token: "dark".to_string(),
        dark_scheme: true,
        background: "#09090B".to_string(),
        foreground: "#FAFAFA".to_string(),
        border: "#27272A".to_string(),
        primary: "#3B82F6".to_string(),
        primary_foreground: "#FFFFFF".to_string(),
        secondary: "#27272A".to_string(),
        secondary_foreground: "#E4E4E7".to_string(),
        destructive: "#EF4444".to_string(),
        destructive_foreground: "#FFFFFF".to_string(),
        success: "#22C55E".to_string(),
        success_fill: "#14532D".to_string(),
        muted: "#A1A1AA".to_string(),
    }
}

/// Create the bundled "ocean" palette (cool blue-green, dark)
pub fn ocean_palette() -> Palette {
    Palette {
        token: "ocean".to_string(),
        dark_scheme: true,
        background: "#0B1B2B".to_string(),
        foreground: "#E0F2FE".to_string(),
        border: "#1E3A52".to_string(),
        primary: "#0EA5E9".to_string(),
        primary_foreground: "#06121E".to_string(),
        secondary: "#13314A".to_string(),
        secondary_foreground: "#BAE6FD".to_string(),
        destructive: "#F87171".to_string(),
        destructive_foreground: "#06121E".to_string(),
        success: "#2DD4BF".to_string(),
        success_fill: "#134E4A".to_string(),
        muted: "#7FA8C9".to_string(),
    }
}

/// Create the bundled "forest" palette (warm green, light)
pub fn forest_palette() -> Palette {
    Palette {
        token: "forest".to_string(),
        dark_scheme: false,
        background: "#F6F8F4".to_string(),
        foreground: "#1A2E1A".to_string(),
        border: "#D3E0CE".to_string(),
        primary: "#2F6B2F".to_string(),
        primary_foreground: "#F6F8F4".to_string(),
        secondary: "#E4EDDF".to_string(),
        secondary_foreground: "#2C452C".to_string(),
        destructive: "#B91C1C".to_string(),
        destructive_foreground: "#FEF2F2".to_string(),
        success: "#3F8F3F".to_string(),
        success_fill: "#DCEEDC".to_string(),
        muted: "#6B7D68".to_string(),
    }
}

/// Look up a bundled palette by its theme token
pub fn builtin_palette(token: &str) -> Option<Palette> {
    match token {
        "light" => Some(light_palette()),
        "dark" => Some(dark_palette()),
        "ocean" => Some(ocean_palette()),
        "forest" => Some(forest_palette()),
        _ => None,
    }
}

/// All bundled palettes
pub fn builtin_palettes() -> Vec<Palette> {
    vec![light_palette(), dark_palette(), ocean_palette(), forest_palette()]
}
