//! Typed system-config values round-tripped through occ.

use std::fmt;

/// A system config value in one of the domains occ stores natively.
///
/// `config:system:set` tags writes with a `--type` flag so the platform
/// stores booleans and numbers typed rather than as text; reads come back
/// as bare text and are re-inferred by [`ConfigValue::parse`].
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl ConfigValue {
    /// occ `--type` flag selecting the stored type.
    pub fn type_flag(&self) -> &'static str {
        match self {
            ConfigValue::Bool(_) => "boolean",
            ConfigValue::Int(_) => "integer",
            ConfigValue::Float(_) => "double",
            ConfigValue::Str(_) => "string",
        }
    }

    /// Text form passed to `--value=`.
    pub fn to_cli_text(&self) -> String {
        match self {
            ConfigValue::Bool(true) => "true".to_string(),
            ConfigValue::Bool(false) => "false".to_string(),
            ConfigValue::Int(value) => value.to_string(),
            // Whole doubles keep a fractional digit so they stay doubles on
            // the way back in.
            ConfigValue::Float(value) if value.fract() == 0.0 && value.is_finite() => {
                format!("{value:.1}")
            }
            ConfigValue::Float(value) => value.to_string(),
            ConfigValue::Str(value) => value.clone(),
        }
    }

    /// Re-infer the domain of a bare-text `config:system:get` value.
    ///
    /// Values written with a type flag print canonically and parse back into
    /// the domain they were set with. A plain string that merely looks
    /// numeric cannot be told apart; that loss is inherent to the text
    /// protocol.
    pub fn parse(text: &str) -> ConfigValue {
        match text {
            "true" => return ConfigValue::Bool(true),
            "false" => return ConfigValue::Bool(false),
            _ => {}
        }
        if text.bytes().any(|b| b.is_ascii_digit()) {
            if let Ok(value) = text.parse::<i64>() {
                return ConfigValue::Int(value);
            }
            if let Ok(value) = text.parse::<f64>() {
                return ConfigValue::Float(value);
            }
        }
        ConfigValue::Str(text.to_string())
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_cli_text())
    }
}

impl From<bool> for ConfigValue {
    fn from(value: bool) -> Self {
        ConfigValue::Bool(value)
    }
}

impl From<i64> for ConfigValue {
    fn from(value: i64) -> Self {
        ConfigValue::Int(value)
    }
}

impl From<f64> for ConfigValue {
    fn from(value: f64) -> Self {
        ConfigValue::Float(value)
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        ConfigValue::Str(value.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(value: String) -> Self {
        ConfigValue::Str(value)
    }
}
