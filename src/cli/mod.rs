//! Command implementations.

pub mod args;

pub use args::{Cli, Commands};

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};

use crate::config::PublishConfig;
use crate::log;
use crate::publish::PublishingTarget;
use crate::resource::{ContentPointer, Resource, ResourceStore};

/// Starter configuration written by `repub init`.
const DEFAULT_CONFIG: &str = r#"# repub configuration

[publish]
root = "public/_resources"   # publishing root (Static/ and Persistent/ live here)
mirror_mode = "copy"         # "copy" | "link"
exclude = ["php"]
# base_uri = "https://cdn.example.com/_resources/"

[store]
root = ".repub/store"

[web]
root = "public"
# request_uri = "http://localhost:8080/"
"#;

/// Dispatch the parsed command line.
pub fn run(cli: &Cli) -> Result<()> {
    if matches!(cli.command, Commands::Init) {
        return init(&cli.config);
    }

    let config = PublishConfig::load(&cli.config)?;
    let engine = PublishingTarget::new(&config);

    match &cli.command {
        Commands::Init => unreachable!("handled above"),
        Commands::Static { source, package } => publish_static(&engine, source, package),
        Commands::Publish { file } => publish_file(&config, &engine, file),
        Commands::Unpublish { hash, extension } => {
            unpublish(&engine, hash, extension.as_deref())
        }
        Commands::Uri {
            hash,
            extension,
            filename,
        } => uri(&engine, hash, extension.as_deref(), filename.as_deref()),
    }
}

/// Write a starter config when none exists, then set up the directories.
fn init(config_path: &Path) -> Result<()> {
    if !config_path.exists() {
        fs::write(config_path, DEFAULT_CONFIG)
            .with_context(|| format!("failed to write {}", config_path.display()))?;
        log!("init"; "wrote starter config {}", config_path.display());
    }

    let config = PublishConfig::load(config_path)?;
    let engine = PublishingTarget::new(&config);
    engine.initialize()?;
    fs::create_dir_all(&config.store.root)
        .with_context(|| format!("failed to create {}", config.store.root.display()))?;

    log!("init"; "publishing root ready at {}", config.publish.root.display());
    Ok(())
}

fn publish_static(engine: &PublishingTarget, source: &Path, package: &str) -> Result<()> {
    if !engine.publish_static_resources(source, package)? {
        bail!(
            "source directory {} does not exist or is not readable",
            source.display()
        );
    }

    // URI generation needs a base URI; publishing alone does not.
    match engine.static_resources_base_uri() {
        Ok(base) => log!("static"; "published {} as {base}{package}/", source.display()),
        Err(_) => log!("static"; "published {} under package {package}", source.display()),
    }
    Ok(())
}

fn publish_file(config: &PublishConfig, engine: &PublishingTarget, file: &Path) -> Result<()> {
    let store = ResourceStore::new(config.store.root.clone());
    let resource = store.import(file)?;
    log!("store"; "imported {} as {}", file.display(), resource.pointer());

    match engine.publish_persistent_resource(&resource)? {
        Some(uri) => {
            println!("{uri}");
            Ok(())
        }
        None => bail!("stored blob for {} went missing", resource.pointer()),
    }
}

fn unpublish(engine: &PublishingTarget, hash: &str, extension: Option<&str>) -> Result<()> {
    let resource = Resource::new(
        ContentPointer::parse(hash)?,
        None,
        extension.map(str::to_owned),
    );
    engine.unpublish_persistent_resource(&resource)?;
    log!("publish"; "unpublished {}", resource.publish_name());
    Ok(())
}

fn uri(
    engine: &PublishingTarget,
    hash: &str,
    extension: Option<&str>,
    filename: Option<&str>,
) -> Result<()> {
    let resource = Resource::new(
        ContentPointer::parse(hash)?,
        filename.map(str::to_owned),
        extension.map(str::to_owned),
    );

    match engine.persistent_resource_uri(&resource)? {
        Some(uri) => {
            println!("{uri}");
            Ok(())
        }
        None => bail!("no stored source for {}", resource.publish_name()),
    }
}
