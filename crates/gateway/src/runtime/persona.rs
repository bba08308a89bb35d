//! Persona instruction block loaded from disk.

use std::path::Path;

use guru_domain::error::{Error, Result};

const BUNDLED: &str = include_str!("../../../../persona/guru.md");

/// The style/voice instructions placed first in every reply prompt.
///
/// Loaded once at startup; identical for every turn of every session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Persona {
    text: String,
}

impl Persona {
    pub fn new(text: impl Into<String>) -> Result<Self> {
        let text = text.into().trim().to_owned();
        if text.is_empty() {
            return Err(Error::Config("persona text must not be empty".into()));
        }
        Ok(Self { text })
    }

    /// Read the persona from `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::new(raw)
    }

    /// Read `path` if it exists, otherwise fall back to the persona that
    /// ships with the binary.
    pub fn load_or_bundled(path: &Path) -> Result<Self> {
        if path.exists() {
            let persona = Self::load(path)?;
            tracing::info!(path = %path.display(), chars = persona.text.len(), "persona loaded");
            Ok(persona)
        } else {
            tracing::warn!(path = %path.display(), "persona file not found, using bundled persona");
            Ok(Self::bundled())
        }
    }

    pub fn bundled() -> Self {
        Self {
            text: BUNDLED.trim().to_owned(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn bundled_persona_is_present() {
        let persona = Persona::bundled();
        assert!(persona.text().contains("The Guru"));
    }

    #[test]
    fn load_trims_file_contents() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "\n  Be kind and brief.  \n").unwrap();
        let persona = Persona::load(file.path()).unwrap();
        assert_eq!(persona.text(), "Be kind and brief.");
    }

    #[test]
    fn blank_file_is_config_error() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let err = Persona::load(file.path()).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn missing_file_falls_back_to_bundled() {
        let dir = tempfile::tempdir().unwrap();
        let persona = Persona::load_or_bundled(&dir.path().join("absent.md")).unwrap();
        assert_eq!(persona, Persona::bundled());
    }
}
