//! Renders every registered scene's thumbnail to a directory, plus a
//! `gallery.json` manifest describing them.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Parser;
use serde::Serialize;
use vitrine_engine::logging::{LoggingConfig, init_logging};
use vitrine_thumbs::{
    ImageHandle, SceneDescriptor, SceneEntry, SceneRegistry, ThumbnailConfig, ThumbnailManager,
    collect_scene_data,
};

const MANIFEST: &str = "gallery.json";

#[derive(Parser, Debug)]
#[command(author, version, about = "Render Vitrine scene thumbnails to PNG files")]
struct Args {
    /// Output directory; created if missing.
    #[arg(long, default_value = "thumbnails")]
    out: PathBuf,
    /// Only render these scene ids (repeatable). Renders everything if none given.
    #[arg(long = "scene")]
    scenes: Vec<String>,
    /// Thumbnail edge length in pixels.
    #[arg(long, default_value_t = 200)]
    size: u32,
}

#[derive(Debug, Serialize)]
struct Manifest<'a> {
    width: u32,
    height: u32,
    scenes: Vec<ManifestEntry<'a>>,
}

#[derive(Debug, Serialize)]
struct ManifestEntry<'a> {
    id: &'a str,
    title: &'a str,
    description: &'a str,
    categories: &'a [String],
    /// `None` when generation failed; the gallery shows a placeholder.
    file: Option<String>,
}

/// Narrows `all` to the requested ids. Unknown ids are an error.
fn select(all: Vec<SceneDescriptor>, wanted: &[String]) -> Result<SceneRegistry> {
    if wanted.is_empty() {
        return Ok(all.into_iter().collect());
    }
    let known: Vec<&str> = all.iter().map(|d| d.id()).collect();
    let unknown: Vec<&str> = wanted
        .iter()
        .map(String::as_str)
        .filter(|id| !known.contains(id))
        .collect();
    if !unknown.is_empty() {
        bail!("unknown scene id(s): {}", unknown.join(", "));
    }
    Ok(all
        .into_iter()
        .filter(|d| wanted.iter().any(|w| w == d.id()))
        .collect())
}

fn png_name(id: &str) -> String {
    format!("{id}.png")
}

fn write_png(
    manager: &ThumbnailManager,
    out: &Path,
    id: &str,
    handle: &ImageHandle,
) -> Result<String> {
    let bytes = manager
        .images()
        .resolve(handle)
        .with_context(|| format!("thumbnail for scene {id} was revoked before export"))?;
    let name = png_name(id);
    let path = out.join(&name);
    std::fs::write(&path, &bytes[..]).with_context(|| format!("writing {}", path.display()))?;
    log::info!("scene {id} -> {}", path.display());
    Ok(name)
}

async fn export(args: &Args) -> Result<usize> {
    let registry = select(vitrine_scenes::descriptors(), &args.scenes)?;
    std::fs::create_dir_all(&args.out)
        .with_context(|| format!("creating output directory {}", args.out.display()))?;

    let manager = ThumbnailManager::new(ThumbnailConfig::square(args.size));
    let entries = collect_scene_data(&registry, &manager);

    // Every entry is requested up front; the queue serializes the renders.
    let handles: Vec<_> = entries
        .iter()
        .cloned()
        .map(|entry: SceneEntry| tokio::spawn(async move { entry.load_thumbnail().await }))
        .collect();

    let mut scenes = Vec::with_capacity(entries.len());
    let mut written = 0;
    for (entry, handle) in entries.iter().zip(handles) {
        let image = handle
            .await
            .with_context(|| format!("thumbnail task for scene {} panicked", entry.id()))?;
        let file = match image {
            Some(image) => {
                written += 1;
                Some(write_png(&manager, &args.out, entry.id(), &image)?)
            }
            None => None,
        };
        let meta = entry.metadata();
        scenes.push(ManifestEntry {
            id: &meta.id,
            title: &meta.title,
            description: &meta.description,
            categories: &meta.categories,
            file,
        });
    }

    let config = manager.config();
    let manifest = Manifest {
        width: config.width,
        height: config.height,
        scenes,
    };
    let path = args.out.join(MANIFEST);
    let json = serde_json::to_string_pretty(&manifest).context("serializing gallery manifest")?;
    std::fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;

    manager.shutdown().await;
    Ok(written)
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging(LoggingConfig::default());
    let args = Args::parse();
    if args.size == 0 {
        bail!("--size must be at least 1");
    }

    let written = export(&args).await?;
    log::info!("wrote {written} thumbnail(s) to {}", args.out.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(registry: &SceneRegistry) -> Vec<String> {
        registry.ids().map(str::to_owned).collect()
    }

    // ── scene selection ───────────────────────────────────────────────────

    #[test]
    fn empty_filter_keeps_every_scene() {
        let all = vitrine_scenes::descriptors();
        let count = all.len();
        assert_eq!(select(all, &[]).unwrap().len(), count);
    }

    #[test]
    fn filter_keeps_only_requested_ids() {
        let wanted = vec!["019".to_owned(), "001".to_owned()];
        let registry = select(vitrine_scenes::descriptors(), &wanted).unwrap();
        let mut got = ids(&registry);
        got.sort();
        assert_eq!(got, ["001", "019"]);
    }

    #[test]
    fn unknown_ids_are_reported() {
        let err = select(vitrine_scenes::descriptors(), &["404".to_owned()]).unwrap_err();
        assert!(err.to_string().contains("404"), "{err}");
    }

    // ── export ────────────────────────────────────────────────────────────

    #[tokio::test(flavor = "multi_thread")]
    async fn export_writes_pngs_and_manifest() {
        let scratch = tempfile::tempdir().unwrap();
        let out = scratch.path().join("thumbs");
        let args = Args {
            out: out.clone(),
            scenes: vec!["001".to_owned(), "018".to_owned()],
            size: 32,
        };

        assert_eq!(export(&args).await.unwrap(), 2);
        assert!(out.join("001.png").is_file());
        assert!(out.join("018.png").is_file());

        let manifest: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(out.join(MANIFEST)).unwrap()).unwrap();
        assert_eq!(manifest["width"], 32);
        // Newest first.
        assert_eq!(manifest["scenes"][0]["id"], "018");
        assert_eq!(manifest["scenes"][1]["file"], "001.png");
    }
}
