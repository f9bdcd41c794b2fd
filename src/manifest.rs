//! Package manifest version read/write (`Cargo.toml`, `package.json`)

use crate::error::{ReleaseError, Result};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const CARGO_MANIFEST: &str = "Cargo.toml";
const NPM_MANIFEST: &str = "package.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestKind {
    Cargo,
    Npm,
}

impl fmt::Display for ManifestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ManifestKind::Cargo => f.write_str(CARGO_MANIFEST),
            ManifestKind::Npm => f.write_str(NPM_MANIFEST),
        }
    }
}

enum Document {
    Cargo(toml_edit::DocumentMut),
    Npm(serde_json::Value),
}

/// A loaded manifest; edits stay in memory until [`Manifest::write`]
pub struct Manifest {
    path: PathBuf,
    document: Document,
}

impl Manifest {
    /// Find the manifest in `dir`.
    ///
    /// A configured path (relative to `dir`) must exist. Otherwise
    /// `Cargo.toml` then `package.json` are tried; `Ok(None)` when neither
    /// exists.
    pub fn detect(dir: &Path, configured: Option<&str>) -> Result<Option<Self>> {
        if let Some(configured) = configured {
            let path = dir.join(configured);
            if !path.is_file() {
                return Err(ReleaseError::manifest(format!(
                    "Configured manifest not found: {}",
                    path.display()
                )));
            }
            return Manifest::load(&path).map(Some);
        }

        for name in [CARGO_MANIFEST, NPM_MANIFEST] {
            let path = dir.join(name);
            if path.is_file() {
                return Manifest::load(&path).map(Some);
            }
        }

        debug!(dir = %dir.display(), "no manifest found");
        Ok(None)
    }

    /// Load a manifest; the kind follows from the file name
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            ReleaseError::manifest(format!("Cannot read {}: {}", path.display(), e))
        })?;

        let document = match kind_of(path)? {
            ManifestKind::Cargo => Document::Cargo(content.parse().map_err(
                |e: toml_edit::TomlError| {
                    ReleaseError::manifest(format!("Invalid {}: {}", path.display(), e))
                },
            )?),
            ManifestKind::Npm => Document::Npm(serde_json::from_str(&content).map_err(|e| {
                ReleaseError::manifest(format!("Invalid {}: {}", path.display(), e))
            })?),
        };

        Ok(Manifest {
            path: path.to_path_buf(),
            document,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kind(&self) -> ManifestKind {
        match self.document {
            Document::Cargo(_) => ManifestKind::Cargo,
            Document::Npm(_) => ManifestKind::Npm,
        }
    }

    /// The package version string
    ///
    /// # Errors
    /// * `ReleaseError::Manifest` - version missing, inherited from a workspace, or not a string
    pub fn version(&self) -> Result<String> {
        let version = match &self.document {
            Document::Cargo(doc) => {
                let item = doc
                    .get("package")
                    .and_then(|package| package.get("version"))
                    .ok_or_else(|| self.error("no [package] version"))?;
                if item.is_table_like() {
                    return Err(self.error("version is inherited from the workspace"));
                }
                item.as_str()
            }
            Document::Npm(value) => value.get("version").and_then(|v| v.as_str()),
        };

        version
            .map(str::to_string)
            .ok_or_else(|| self.error("version is not a string"))
    }

    /// Set the package version in memory, keeping everything else intact
    pub fn set_version(&mut self, version: &str) -> Result<()> {
        self.version()?;

        match &mut self.document {
            Document::Cargo(doc) => {
                if let Some(package) = doc
                    .get_mut("package")
                    .and_then(|package| package.as_table_like_mut())
                {
                    package.insert("version", toml_edit::value(version));
                }
            }
            Document::Npm(value) => {
                if let Some(object) = value.as_object_mut() {
                    object.insert(
                        "version".to_string(),
                        serde_json::Value::String(version.to_string()),
                    );
                }
            }
        }

        debug!(path = %self.path.display(), version, "manifest version set");
        Ok(())
    }

    /// Write the manifest back to disk
    pub fn write(&self) -> Result<()> {
        let content = match &self.document {
            Document::Cargo(doc) => doc.to_string(),
            Document::Npm(value) => {
                let mut content = serde_json::to_string_pretty(value).map_err(|e| {
                    ReleaseError::manifest(format!("Cannot serialize {}: {}", self.path.display(), e))
                })?;
                content.push('\n');
                content
            }
        };

        fs::write(&self.path, content)?;
        info!(path = %self.path.display(), "manifest written");
        Ok(())
    }

    fn error(&self, message: &str) -> ReleaseError {
        ReleaseError::manifest(format!("{}: {}", self.path.display(), message))
    }
}

fn kind_of(path: &Path) -> Result<ManifestKind> {
    match path.file_name().and_then(|name| name.to_str()) {
        Some(CARGO_MANIFEST) => Ok(ManifestKind::Cargo),
        Some(NPM_MANIFEST) => Ok(ManifestKind::Npm),
        _ => match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(ManifestKind::Cargo),
            Some("json") => Ok(ManifestKind::Npm),
            _ => Err(ReleaseError::manifest(format!(
                "Unsupported manifest: {}",
                path.display()
            ))),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const CARGO: &str = r#"# the crate
[package]
name = "widgets"   # keep me
version = "1.2.3"
edition = "2021"

[dependencies]
serde = { version = "1.0", features = ["derive"] }
"#;

    const PACKAGE_JSON: &str = r#"{
  "name": "widgets",
  "version": "1.2.3",
  "dependencies": {
    "left-pad": "^1.0.0"
  },
  "author": "acme"
}
"#;

    #[test]
    fn test_cargo_version_round_trip() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("Cargo.toml"), CARGO).unwrap();

        let mut manifest = Manifest::detect(dir.path(), None).unwrap().unwrap();
        assert_eq!(manifest.kind(), ManifestKind::Cargo);
        assert_eq!(manifest.version().unwrap(), "1.2.3");

        manifest.set_version("1.3.0").unwrap();
        manifest.write().unwrap();

        let written = fs::read_to_string(dir.path().join("Cargo.toml")).unwrap();
        assert_eq!(written, CARGO.replace("version = \"1.2.3\"", "version = \"1.3.0\""));
    }

    #[test]
    fn test_workspace_version_rejected() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("Cargo.toml"),
            "[package]\nname = \"member\"\nversion.workspace = true\n",
        )
        .unwrap();

        let manifest = Manifest::detect(dir.path(), None).unwrap().unwrap();
        assert!(matches!(manifest.version(), Err(ReleaseError::Manifest(_))));
    }

    #[test]
    fn test_package_json_keeps_key_order() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("package.json"), PACKAGE_JSON).unwrap();

        let mut manifest = Manifest::detect(dir.path(), None).unwrap().unwrap();
        assert_eq!(manifest.kind(), ManifestKind::Npm);
        manifest.set_version("2.0.0-beta.0").unwrap();
        manifest.write().unwrap();

        let written = fs::read_to_string(dir.path().join("package.json")).unwrap();
        assert_eq!(written, PACKAGE_JSON.replace("1.2.3", "2.0.0-beta.0"));
    }

    #[test]
    fn test_cargo_preferred_over_package_json() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("Cargo.toml"), CARGO).unwrap();
        fs::write(dir.path().join("package.json"), PACKAGE_JSON).unwrap();

        let manifest = Manifest::detect(dir.path(), None).unwrap().unwrap();
        assert_eq!(manifest.kind(), ManifestKind::Cargo);

        let manifest = Manifest::detect(dir.path(), Some("package.json"))
            .unwrap()
            .unwrap();
        assert_eq!(manifest.kind(), ManifestKind::Npm);
    }

    #[test]
    fn test_detect_nothing() {
        let dir = TempDir::new().unwrap();
        assert!(Manifest::detect(dir.path(), None).unwrap().is_none());
    }

    #[test]
    fn test_configured_manifest_missing() {
        let dir = TempDir::new().unwrap();
        let result = Manifest::detect(dir.path(), Some("crates/core/Cargo.toml"));
        assert!(matches!(result, Err(ReleaseError::Manifest(_))));
    }

    #[test]
    fn test_unsupported_manifest() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("setup.py"), "").unwrap();
        let result = Manifest::detect(dir.path(), Some("setup.py"));
        assert!(matches!(result, Err(ReleaseError::Manifest(_))));
    }
}
