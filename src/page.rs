//! Gallery pages: the document the gallery indexes.
//!
//! A page is either a `gallery.toml` manifest listing image elements with
//! their attributes, or a plain image directory from which one element per
//! file is synthesized.

use crate::gallery::controls::ControlDecls;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// File name looked up inside a directory before falling back to a scan.
pub const MANIFEST_FILE: &str = "gallery.toml";

#[derive(Debug, Error)]
pub enum PageError {
    #[error("gallery page not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed manifest {}: {source}", path.display())]
    Manifest {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Opaque handle to one rendered image element (and its card).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub usize);

/// One image element as it appears in the page, attributes unparsed.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageElement {
    pub handle: ElementId,
    pub src: PathBuf,
    pub alt: Option<String>,
    pub data_tags: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PageSource {
    Manifest(PathBuf),
    Directory(PathBuf),
}

#[derive(Debug, Clone)]
pub struct Page {
    pub source: PageSource,
    pub title: String,
    pub images: Vec<ImageElement>,
    pub controls: ControlDecls,
}

/// On-disk manifest format.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Manifest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, rename = "image")]
    pub images: Vec<ManifestImage>,
    #[serde(default, skip_serializing_if = "ControlDecls::is_empty")]
    pub controls: ControlDecls,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ManifestImage {
    pub src: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    /// Comma-separated tag list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
}

impl Page {
    /// Load a page from a manifest file or a directory.
    pub fn load(path: &Path, recursive: bool) -> Result<Self, PageError> {
        if !path.exists() {
            return Err(PageError::NotFound(path.to_path_buf()));
        }

        if path.is_file() {
            return Self::from_manifest(path);
        }

        let manifest_path = path.join(MANIFEST_FILE);
        if manifest_path.is_file() {
            return Self::from_manifest(&manifest_path);
        }

        Self::from_directory(path, recursive)
    }

    pub fn from_manifest(path: &Path) -> Result<Self, PageError> {
        let data = fs::read_to_string(path).map_err(|source| PageError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let manifest: Manifest = toml::from_str(&data).map_err(|source| PageError::Manifest {
            path: path.to_path_buf(),
            source,
        })?;

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        let page = manifest.into_page(base, PageSource::Manifest(path.to_path_buf()));
        tracing::info!(
            manifest = %path.display(),
            images = page.images.len(),
            "loaded gallery manifest"
        );
        Ok(page)
    }

    pub fn from_directory(dir: &Path, recursive: bool) -> Result<Self, PageError> {
        let manifest = Manifest::skeleton(dir, recursive)?;
        let page = manifest.into_page(dir, PageSource::Directory(dir.to_path_buf()));
        tracing::info!(
            directory = %dir.display(),
            recursive,
            images = page.images.len(),
            "scanned gallery directory"
        );
        Ok(page)
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

impl Manifest {
    /// Build a manifest describing every image below `dir`.
    ///
    /// `alt` is the file stem; in recursive mode the sub-directory chain
    /// becomes the tag list.
    pub fn skeleton(dir: &Path, recursive: bool) -> Result<Self, PageError> {
        let paths = scan_image_paths(dir, recursive)?;

        let images = paths
            .into_iter()
            .map(|path| {
                let rel = path.strip_prefix(dir).unwrap_or(&path).to_path_buf();
                let alt = rel.file_stem().and_then(|s| s.to_str()).map(String::from);
                let tags = if recursive {
                    directory_tags(&rel)
                } else {
                    None
                };
                ManifestImage {
                    src: rel,
                    alt,
                    tags,
                }
            })
            .collect();

        Ok(Self {
            title: None,
            images,
            controls: ControlDecls::default(),
        })
    }

    fn into_page(self, base: &Path, source: PageSource) -> Page {
        let title = self.title.unwrap_or_else(|| {
            base.file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("gallery")
                .to_string()
        });

        let images = self
            .images
            .into_iter()
            .enumerate()
            .map(|(i, img)| ImageElement {
                handle: ElementId(i),
                src: if img.src.is_absolute() {
                    img.src
                } else {
                    base.join(img.src)
                },
                alt: img.alt,
                data_tags: img.tags,
            })
            .collect();

        Page {
            source,
            title,
            images,
            controls: self.controls,
        }
    }
}

/// All supported images below `dir`, sorted by path.
pub fn scan_image_paths(dir: &Path, recursive: bool) -> Result<Vec<PathBuf>, PageError> {
    let mut entries: Vec<PathBuf> = if recursive {
        WalkDir::new(dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
            .map(|e| e.path().to_path_buf())
            .filter(|p| p.is_file() && crate::utils::is_image_file(p))
            .collect()
    } else {
        fs::read_dir(dir)
            .map_err(|source| PageError::Io {
                path: dir.to_path_buf(),
                source,
            })?
            .flatten()
            .map(|e| e.path())
            .filter(|p| p.is_file() && crate::utils::is_image_file(p))
            .collect()
    };

    entries.sort();
    Ok(entries)
}

fn directory_tags(rel: &Path) -> Option<String> {
    let parts: Vec<String> = rel
        .parent()
        .map(|parent| {
            parent
                .components()
                .filter_map(|c| c.as_os_str().to_str())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, b"fake").unwrap();
    }

    #[test]
    fn manifest_keeps_document_order_and_attributes() {
        let tmp = tempfile::tempdir().unwrap();
        let manifest = tmp.path().join(MANIFEST_FILE);
        fs::write(
            &manifest,
            r#"
title = "Trip"

[[image]]
src = "z-desert.jpg"
alt = "Desert"
tags = "sand, sunset"

[[image]]
src = "a-ocean.jpg"

[controls.size]
min = 150
max = 300
value = 180
"#,
        )
        .unwrap();

        let page = Page::load(tmp.path(), false).unwrap();
        assert_eq!(page.title, "Trip");
        assert_eq!(page.images.len(), 2);
        assert_eq!(page.images[0].handle, ElementId(0));
        assert_eq!(page.images[0].src, tmp.path().join("z-desert.jpg"));
        assert_eq!(page.images[0].alt.as_deref(), Some("Desert"));
        assert_eq!(page.images[0].data_tags.as_deref(), Some("sand, sunset"));
        assert_eq!(page.images[1].alt, None);
        assert_eq!(page.images[1].data_tags, None);
        assert_eq!(page.controls.size.as_ref().and_then(|s| s.value), Some(180));
        assert!(matches!(page.source, PageSource::Manifest(_)));
    }

    #[test]
    fn directory_scan_is_sorted_and_uses_stems() {
        let tmp = tempfile::tempdir().unwrap();
        touch(&tmp.path().join("b.png"));
        touch(&tmp.path().join("a.jpg"));
        touch(&tmp.path().join("readme.txt"));

        let page = Page::load(tmp.path(), false).unwrap();
        let alts: Vec<_> = page.images.iter().map(|e| e.alt.clone()).collect();
        assert_eq!(alts, vec![Some("a".to_string()), Some("b".to_string())]);
        assert!(page.images.iter().all(|e| e.data_tags.is_none()));
    }

    #[test]
    fn recursive_scan_tags_by_sub_directory() {
        let tmp = tempfile::tempdir().unwrap();
        touch(&tmp.path().join("2020/holidays/beach.jpg"));
        touch(&tmp.path().join("top.jpg"));

        let page = Page::load(tmp.path(), true).unwrap();
        assert_eq!(page.images.len(), 2);
        assert_eq!(page.images[0].data_tags.as_deref(), Some("2020,holidays"));
        assert_eq!(page.images[1].data_tags, None);
    }

    #[test]
    fn empty_directory_is_an_empty_page() {
        let tmp = tempfile::tempdir().unwrap();
        let page = Page::load(tmp.path(), false).unwrap();
        assert!(page.is_empty());
    }

    #[test]
    fn missing_path_and_bad_manifest_are_errors() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("nope");
        assert!(matches!(
            Page::load(&missing, false),
            Err(PageError::NotFound(_))
        ));

        let bad = tmp.path().join("broken.toml");
        fs::write(&bad, "[[image]]\nalt = 3").unwrap();
        assert!(matches!(
            Page::load(&bad, false),
            Err(PageError::Manifest { .. })
        ));
    }

    #[test]
    fn skeleton_round_trips_through_toml() {
        let tmp = tempfile::tempdir().unwrap();
        touch(&tmp.path().join("one.jpg"));

        let skeleton = Manifest::skeleton(tmp.path(), false).unwrap();
        let text = toml::to_string_pretty(&skeleton).unwrap();
        assert!(text.contains("[[image]]"));
        assert!(!text.contains("[controls"));

        let parsed: Manifest = toml::from_str(&text).unwrap();
        assert_eq!(parsed, skeleton);
    }
}
