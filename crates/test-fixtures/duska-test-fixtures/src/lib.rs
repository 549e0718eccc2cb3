//! Shared JSON scenes for Duska tests, listed in `fixtures/manifest.json`.
//!
//! A scene is a host description (objects, targets, curves, frame) plus an optional
//! animator snapshot holding the key lists of those objects.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Deserialize;

static MANIFEST: Lazy<Manifest> = Lazy::new(|| {
    let raw = include_str!("../../../../fixtures/manifest.json");
    serde_json::from_str(raw).expect("fixtures manifest should parse")
});

#[derive(Debug, Deserialize)]
struct Manifest {
    scenes: BTreeMap<String, SceneEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SceneEntry {
    Host(String),
    Detailed {
        host: String,
        #[serde(default)]
        animator: Option<String>,
    },
}

impl SceneEntry {
    fn host(&self) -> &str {
        match self {
            SceneEntry::Host(path) => path,
            SceneEntry::Detailed { host, .. } => host,
        }
    }

    fn animator(&self) -> Option<&str> {
        match self {
            SceneEntry::Host(_) => None,
            SceneEntry::Detailed { animator, .. } => animator.as_deref(),
        }
    }
}

fn fixtures_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../../fixtures")
}

fn resolve_path(rel: &str) -> PathBuf {
    fixtures_root().join(rel)
}

fn read_to_string(rel: &str) -> Result<String> {
    let path = resolve_path(rel);
    fs::read_to_string(&path)
        .with_context(|| format!("failed to read fixture at {}", path.display()))
}

fn load_json<T: DeserializeOwned>(rel: &str) -> Result<T> {
    let text = read_to_string(rel)?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse JSON fixture {rel}"))
}

fn lookup(name: &str) -> Result<&'static SceneEntry> {
    MANIFEST
        .scenes
        .get(name)
        .ok_or_else(|| anyhow!("unknown scene fixture '{name}'"))
}

pub mod scenes {
    use super::*;

    /// Scene names in manifest order (sorted).
    pub fn keys() -> Vec<String> {
        MANIFEST.scenes.keys().cloned().collect()
    }

    pub fn host_json(name: &str) -> Result<String> {
        read_to_string(lookup(name)?.host())
    }

    /// Animator snapshot of the scene, if it has one.
    pub fn animator_json(name: &str) -> Result<Option<String>> {
        match lookup(name)?.animator() {
            Some(rel) => read_to_string(rel).map(Some),
            None => Ok(None),
        }
    }

    /// Animator snapshot deserialized into `T`, if the scene has one.
    pub fn animator<T: DeserializeOwned>(name: &str) -> Result<Option<T>> {
        match lookup(name)?.animator() {
            Some(rel) => load_json(rel).map(Some),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_manifest_entry_is_readable() {
        for name in scenes::keys() {
            let host = scenes::host_json(&name).unwrap();
            assert!(!host.is_empty(), "{name}");
            scenes::animator_json(&name).unwrap();
        }
    }

    #[test]
    fn unknown_scene_is_an_error() {
        assert!(scenes::host_json("no-such-scene").is_err());
    }
}
