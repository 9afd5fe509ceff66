//! Writer options that a host program can load from its own configuration.

use serde::{Deserialize, Serialize};

/// Which STL encoding to produce.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Binary,
    Text,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Binary => f.write_str("binary"),
            Mode::Text => f.write_str("text"),
        }
    }
}

/// Options for [`StlFile::create_with_config`](crate::writer::StlFile::create_with_config).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriterConfig {
    /// Output encoding.
    pub mode: Mode,
    /// Written after `solid` in text mode. In binary mode it fills the header as
    /// `binary STL: <name>` when `header` is empty.
    pub model_name: String,
    /// Binary header text, truncated or zero-padded to 80 bytes. Ignored by text output.
    pub header: String,
}

impl WriterConfig {
    /// Binary output with a blank header.
    pub fn binary() -> Self {
        Self::default()
    }

    /// Text output with an empty model name.
    pub fn text() -> Self {
        Self {
            mode: Mode::Text,
            ..Self::default()
        }
    }

    pub fn with_model_name(mut self, name: impl Into<String>) -> Self {
        self.model_name = name.into();
        self
    }

    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = header.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_blank_binary() {
        let cfg = WriterConfig::default();
        assert_eq!(cfg.mode, Mode::Binary);
        assert!(cfg.model_name.is_empty());
        assert!(cfg.header.is_empty());
    }

    #[test]
    fn loads_partial_json() {
        let cfg: WriterConfig =
            serde_json::from_str(r#"{ "mode": "text", "model_name": "bracket" }"#).unwrap();
        assert_eq!(cfg, WriterConfig::text().with_model_name("bracket"));
    }

    #[test]
    fn rejects_unknown_mode() {
        let res: Result<WriterConfig, _> = serde_json::from_str(r#"{ "mode": "ascii" }"#);
        assert!(res.is_err());
    }

    #[test]
    fn mode_display_matches_serde_name() {
        assert_eq!(Mode::Text.to_string(), "text");
        assert_eq!(serde_json::to_string(&Mode::Binary).unwrap(), "\"binary\"");
    }
}
