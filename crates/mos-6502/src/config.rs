//! Core configuration.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// When deferred register writes become visible.
///
/// The NMOS core latches A, X, Y and S on the phase after the microcode step
/// that computed them. Some well-known trace logs (nestest) were recorded by
/// emulators that show the new value at the end of the step instead.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum CompatibilityMode {
    /// Register writes land one phase later, like the silicon.
    #[default]
    Normal,
    /// Register writes are visible at the end of the step that made them.
    NesTest,
}

impl fmt::Display for CompatibilityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompatibilityMode::Normal => write!(f, "normal"),
            CompatibilityMode::NesTest => write!(f, "nestest"),
        }
    }
}

impl FromStr for CompatibilityMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "normal" => Ok(CompatibilityMode::Normal),
            "nestest" => Ok(CompatibilityMode::NesTest),
            _ => Err(ConfigError::UnknownCompatibilityMode(s.to_string())),
        }
    }
}

/// Errors parsing core configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("unknown compatibility mode `{0}` (expected `normal` or `nestest`)")]
    UnknownCompatibilityMode(String),
    #[error("unknown core `{0}` (expected `6502` or `2a03`)")]
    UnknownCore(String),
}

/// Construction-time options for [`crate::Mos6502`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    /// Honour the D flag in ADC/SBC. The 2A03 has the decimal adder cut out.
    pub decimal_enabled: bool,
    pub compatibility: CompatibilityMode,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            decimal_enabled: true,
            compatibility: CompatibilityMode::Normal,
        }
    }
}

impl Options {
    /// Options for the core inside the NES 2A03: no decimal mode.
    #[must_use]
    pub const fn nes() -> Self {
        Self {
            decimal_enabled: false,
            compatibility: CompatibilityMode::Normal,
        }
    }

    #[must_use]
    pub const fn with_compatibility(mut self, compatibility: CompatibilityMode) -> Self {
        self.compatibility = compatibility;
        self
    }
}

/// Parses `<core>[:<compatibility>]`, e.g. `6502`, `2a03` or `2a03:nestest`.
impl FromStr for Options {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (core, compatibility) = match s.split_once(':') {
            Some((core, mode)) => (core, mode.parse()?),
            None => (s, CompatibilityMode::Normal),
        };
        let options = match core.to_ascii_lowercase().as_str() {
            "6502" | "nmos" => Options::default(),
            "2a03" | "nes" => Options::nes(),
            _ => return Err(ConfigError::UnknownCore(core.to_string())),
        };
        Ok(options.with_compatibility(compatibility))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_decimal_normal() {
        let options = Options::default();
        assert!(options.decimal_enabled);
        assert_eq!(options.compatibility, CompatibilityMode::Normal);
        assert!(!Options::nes().decimal_enabled);
    }

    #[test]
    fn parse_compatibility_mode() {
        assert_eq!("nestest".parse(), Ok(CompatibilityMode::NesTest));
        assert_eq!("Normal".parse(), Ok(CompatibilityMode::Normal));
        assert_eq!(
            "cmos".parse::<CompatibilityMode>(),
            Err(ConfigError::UnknownCompatibilityMode("cmos".to_string()))
        );
        assert_eq!(CompatibilityMode::NesTest.to_string(), "nestest");
    }

    #[test]
    fn parse_options() {
        assert_eq!("6502".parse(), Ok(Options::default()));
        assert_eq!("2A03".parse(), Ok(Options::nes()));
        assert_eq!(
            "nes:nestest".parse(),
            Ok(Options::nes().with_compatibility(CompatibilityMode::NesTest))
        );
        assert_eq!(
            "65c02".parse::<Options>(),
            Err(ConfigError::UnknownCore("65c02".to_string()))
        );
        assert!(matches!(
            "6502:fast".parse::<Options>(),
            Err(ConfigError::UnknownCompatibilityMode(_))
        ));
    }
}
