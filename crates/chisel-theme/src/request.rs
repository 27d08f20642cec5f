//! Theme request and effective-theme types
//!
//! A [`ThemeRequest`] is what the user asked for, including `auto`. An
//! [`EffectiveTheme`] is what actually gets rendered and is never `auto`:
//! resolution against the "prefers dark" signal happens in
//! [`ThemeRequest::effective`].

use thiserror::Error;

/// Theme error types
#[derive(Debug, Error)]
pub enum ThemeError {
    /// A request token that is neither built-in nor a registered palette
    #[error("Unknown theme request: {0}")]
    UnknownRequest(String),
}

/// Result type for theme operations
pub type Result<T> = std::result::Result<T, ThemeError>;

/// The theme mode the user or application asked for.
///
/// Exactly one request is active per resolver. The string form is the
/// lowercase token (`"light"`, `"dark"`, `"auto"`, or the custom palette
/// token itself), which is also the persisted representation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ThemeRequest {
    /// The built-in light palette
    Light,
    /// The built-in dark palette
    Dark,
    /// A custom palette registered by the application (e.g. "ocean")
    Named(String),
    /// Follow the system light/dark preference
    Auto,
}

impl ThemeRequest {
    /// The string token for this request.
    pub fn as_str(&self) -> &str {
        match self {
            ThemeRequest::Light => "light",
            ThemeRequest::Dark => "dark",
            ThemeRequest::Named(token) => token,
            ThemeRequest::Auto => "auto",
        }
    }

    /// Whether this request tracks the system preference.
    pub fn is_auto(&self) -> bool {
        matches!(self, ThemeRequest::Auto)
    }

    /// Resolve this request against the current "prefers dark" value.
    ///
    /// Non-auto requests pass through; `Auto` maps to dark when the signal
    /// is true and light otherwise.
    pub fn effective(&self, prefers_dark: bool) -> EffectiveTheme {
        match self {
            ThemeRequest::Light => EffectiveTheme::Light,
            ThemeRequest::Dark => EffectiveTheme::Dark,
            ThemeRequest::Named(token) => EffectiveTheme::Named(token.clone()),
            ThemeRequest::Auto => {
                if prefers_dark {
                    EffectiveTheme::Dark
                } else {
                    EffectiveTheme::Light
                }
            }
        }
    }
}

impl std::fmt::Display for ThemeRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The concrete palette actually rendered. Never `auto`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EffectiveTheme {
    /// The built-in light palette
    Light,
    /// The built-in dark palette
    Dark,
    /// A custom palette registered by the application
    Named(String),
}

impl EffectiveTheme {
    /// The string token for this theme.
    pub fn as_str(&self) -> &str {
        match self {
            EffectiveTheme::Light => "light",
            EffectiveTheme::Dark => "dark",
            EffectiveTheme::Named(token) => token,
        }
    }
}

impl std::fmt::Display for EffectiveTheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Resolver configuration
#[derive(Debug, Clone)]
pub struct ThemeOptions {
    /// Fallback request when nothing valid is stored
    pub default_request: ThemeRequest,
    /// Key for the persisted preference
    pub storage_key: String,
    /// Whether request changes are written to the preference store
    pub persistence: bool,
    /// Custom palette tokens the application registered
    pub named_palettes: Vec<String>,
}

impl Default for ThemeOptions {
    fn default() -> Self {
        Self {
            default_request: ThemeRequest::Light,
            storage_key: "theme-preference".to_string(),
            persistence: true,
            named_palettes: Vec::new(),
        }
    }
}

impl ThemeOptions {
    /// Create options with the given fallback request
    pub fn new(default_request: ThemeRequest) -> Self {
        Self { default_request, ..Default::default() }
    }

    /// Set the persistence key
    pub fn storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    /// Enable or disable persistence
    pub fn persistence(mut self, enabled: bool) -> Self {
        self.persistence = enabled;
        self
    }

    /// Register a custom palette token
    pub fn named_palette(mut self, token: impl Into<String>) -> Self {
        self.named_palettes.push(token.into());
        self
    }

    /// Whether a request is recognized under these options.
    pub fn is_valid(&self, request: &ThemeRequest) -> bool {
        match request {
            ThemeRequest::Named(token) => {
                self.named_palettes.iter().any(|t| t == token)
            }
            _ => true,
        }
    }

    /// Parse a stored token into a request, if recognized.
    pub fn parse_request(&self, token: &str) -> Option<ThemeRequest> {
        match token {
            "light" => Some(ThemeRequest::Light),
            "dark" => Some(ThemeRequest::Dark),
            "auto" => Some(ThemeRequest::Auto),
            other if self.named_palettes.iter().any(|t| t == other) => {
                Some(ThemeRequest::Named(other.to_string()))
            }
            _ => None,
        }
    }
}
