use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::{Cli, Commands};
use crate::app::{self, LaunchOptions};
use crate::gallery::filter::FilteredView;
use crate::gallery::item::ItemIndex;
use crate::logging;
use crate::page::{Manifest, Page, MANIFEST_FILE};
use crate::utils::truncate_label;

pub(crate) async fn run() -> Result<()> {
    let cli = Cli::parse();

    let config = app::Config::load()?;

    match cli.command {
        Some(Commands::List {
            page,
            query,
            json,
            recursive,
        }) => {
            logging::init_stderr_tracing(&config.logging.level);
            let path = page.unwrap_or_else(|| config.gallery_dir());
            cmd_list(&path, &query, json, recursive || config.gallery.recursive)?;
        }
        Some(Commands::Manifest {
            dir,
            output,
            recursive,
            force,
        }) => {
            logging::init_stderr_tracing(&config.logging.level);
            cmd_manifest(&dir, output, recursive, force)?;
        }
        None => {
            // TUI mode
            if let Err(e) = logging::init_tracing(&config) {
                eprintln!("Warning: logging disabled: {:#}", e);
            }
            let path = cli.page.unwrap_or_else(|| config.gallery_dir());
            let page = Page::load(&path, cli.recursive || config.gallery.recursive)
                .with_context(|| format!("Failed to load gallery: {}", path.display()))?;
            let launch = LaunchOptions {
                size: cli.size,
                interval: cli.interval.map(Duration::from_millis),
                autoplay: cli.autoplay,
                fullscreen: cli.fullscreen,
            };
            app::run_tui(page, config, launch).await?;
        }
    }

    Ok(())
}

#[derive(Debug, Serialize)]
struct ListedItem<'a> {
    index: usize,
    caption: &'a str,
    tags: &'a [String],
    source: &'a Path,
}

fn cmd_list(path: &Path, query: &str, json: bool, recursive: bool) -> Result<()> {
    let page = Page::load(path, recursive)
        .with_context(|| format!("Failed to load gallery: {}", path.display()))?;
    let index = ItemIndex::scan(&page.images);
    let view = FilteredView::compute(&index, query);

    let listed: Vec<ListedItem> = view
        .members()
        .iter()
        .filter_map(|&i| index.get(i))
        .map(|item| ListedItem {
            index: item.index,
            caption: &item.caption,
            tags: &item.tags,
            source: &item.source,
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&listed)?);
        return Ok(());
    }

    if listed.is_empty() {
        eprintln!("No matching photos in: {}", path.display());
        return Ok(());
    }

    println!("{:>5}  {:<28}  {:<24}  SOURCE", "#", "CAPTION", "TAGS");
    for item in &listed {
        println!(
            "{:>5}  {:<28}  {:<24}  {}",
            item.index,
            truncate_label(item.caption, 28),
            truncate_label(&item.tags.join(", "), 24),
            item.source.display()
        );
    }
    eprintln!("{} of {} photos", listed.len(), index.len());

    Ok(())
}

fn cmd_manifest(dir: &Path, output: Option<PathBuf>, recursive: bool, force: bool) -> Result<()> {
    if !dir.is_dir() {
        bail!("Not a directory: {}", dir.display());
    }

    let output = output.unwrap_or_else(|| dir.join(MANIFEST_FILE));
    if output.exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            output.display()
        );
    }

    let mut manifest = Manifest::skeleton(dir, recursive)
        .with_context(|| format!("Failed to scan: {}", dir.display()))?;
    manifest.title = dir
        .canonicalize()
        .ok()
        .and_then(|d| d.file_name().and_then(|n| n.to_str()).map(str::to_string));

    let data = toml::to_string_pretty(&manifest)?;
    fs::write(&output, data)
        .with_context(|| format!("Failed to write manifest: {}", output.display()))?;

    println!(
        "Wrote {} images to {}",
        manifest.images.len(),
        output.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn manifest_refuses_to_overwrite_without_force() {
        let tmp = tempdir().unwrap();
        fs::write(tmp.path().join("a.jpg"), b"").unwrap();
        fs::write(tmp.path().join(MANIFEST_FILE), "title = \"mine\"\n").unwrap();

        assert!(cmd_manifest(tmp.path(), None, false, false).is_err());
        let kept = fs::read_to_string(tmp.path().join(MANIFEST_FILE)).unwrap();
        assert_eq!(kept, "title = \"mine\"\n");

        cmd_manifest(tmp.path(), None, false, true).unwrap();
        let page = Page::load(tmp.path(), false).unwrap();
        assert_eq!(page.images.len(), 1);
        assert_eq!(page.images[0].alt.as_deref(), Some("a"));
    }

    #[test]
    fn manifest_rejects_missing_directory() {
        let tmp = tempdir().unwrap();
        let missing = tmp.path().join("nope");
        assert!(cmd_manifest(&missing, None, false, false).is_err());
    }

    #[test]
    fn list_fails_for_missing_page() {
        let tmp = tempdir().unwrap();
        let missing = tmp.path().join("nope");
        assert!(cmd_list(&missing, "", false, false).is_err());
    }
}
