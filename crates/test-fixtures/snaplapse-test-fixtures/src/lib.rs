use std::collections::HashMap;
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
    tours: HashMap<String, TourEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TourEntry {
    Path(String),
    Detailed {
        path: String,
        #[serde(default)]
        expect_keyframes: Option<usize>,
    },
}

impl TourEntry {
    fn as_path(&self) -> &str {
        match self {
            TourEntry::Path(path) => path,
            TourEntry::Detailed { path, .. } => path,
        }
    }

    fn expected_keyframes(&self) -> Option<usize> {
        match self {
            TourEntry::Path(_) => None,
            TourEntry::Detailed {
                expect_keyframes, ..
            } => *expect_keyframes,
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

fn lookup<'a, T>(map: &'a HashMap<String, T>, kind: &str, name: &str) -> Result<&'a T> {
    map.get(name)
        .ok_or_else(|| anyhow!("unknown {kind} fixture '{name}'"))
}

pub mod tours {
    use super::*;

    pub fn keys() -> Vec<String> {
        let mut keys: Vec<String> = MANIFEST.tours.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Raw document text. Some tour fixtures are deliberately not valid JSON.
    pub fn json(name: &str) -> Result<String> {
        let entry = lookup(&MANIFEST.tours, "tour", name)?;
        read_to_string(entry.as_path())
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        let entry = lookup(&MANIFEST.tours, "tour", name)?;
        super::load_json(entry.as_path())
    }

    pub fn path(name: &str) -> Result<PathBuf> {
        let entry = lookup(&MANIFEST.tours, "tour", name)?;
        Ok(resolve_path(entry.as_path()))
    }

    /// Number of keyframes an import of this fixture should accept, when the manifest records it.
    pub fn expected_keyframes(name: &str) -> Result<Option<usize>> {
        let entry = lookup(&MANIFEST.tours, "tour", name)?;
        Ok(entry.expected_keyframes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_paths_resolve() {
        for key in tours::keys() {
            let path = tours::path(&key).unwrap();
            assert!(path.exists(), "missing fixture file for {key}");
        }
    }
}
