use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use firemark::batch::{reveal_folder, BatchExporter, DiskSaver};
use firemark::config::AppConfig;
use firemark::persistence::{
    delete_preset, list_presets, load_preset, load_settings, FileStore, MemoryStore, SettingsStore,
};
use firemark::state::AppState;
use firemark::watermark::{
    enumerate_font_families, filter_icons, font_menu, parse_icon_catalog, FontBook, Settings,
};
use std::path::{Path, PathBuf};

/// Firemark - batch watermarking with text, logo, icon, tile, pattern and frame layers
#[derive(Parser, Debug)]
#[command(name = "firemark")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "firemark.yaml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Watermark images into an output directory
    Export {
        /// Output directory
        #[arg(short, long)]
        output: PathBuf,

        /// Settings JSON file
        #[arg(short, long, conflicts_with = "preset")]
        settings: Option<PathBuf>,

        /// Saved preset name
        #[arg(short, long)]
        preset: Option<String>,

        /// Open the output directory when done
        #[arg(long)]
        reveal: bool,

        /// Source images
        #[arg(required = true)]
        images: Vec<PathBuf>,
    },

    /// List available font families
    Fonts,

    /// List icons from an icon-font stylesheet
    Icons {
        /// Stylesheet with `.fa-<name>::before` rules
        stylesheet: PathBuf,

        /// Case-insensitive name filter
        query: Option<String>,
    },

    /// Manage saved presets
    Presets {
        #[command(subcommand)]
        action: PresetAction,
    },
}

#[derive(Subcommand, Debug)]
enum PresetAction {
    List,
    Delete { name: String },
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = AppConfig::load_or_default(&args.config)
        .with_context(|| format!("Failed to load configuration from {}", args.config.display()))?;
    config.validate().context("Invalid configuration")?;

    firemark::logging::init_subscriber(&config.logging)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    tracing::info!(
        config_file = %args.config.display(),
        store = ?config.storage.dir,
        font_overrides = config.fonts.files.len(),
        "Configuration loaded"
    );

    let store = open_store(&config)?;

    match args.command {
        Command::Export {
            output,
            settings,
            preset,
            reveal,
            images,
        } => {
            let settings = resolve_settings(store.as_ref(), settings.as_deref(), preset.as_deref())?;
            export(&config, settings, output, images, reveal)
        }
        Command::Fonts => {
            for family in font_menu(enumerate_font_families()) {
                println!("{}", family);
            }
            Ok(())
        }
        Command::Icons { stylesheet, query } => {
            let css = std::fs::read_to_string(&stylesheet)
                .with_context(|| format!("Failed to read {}", stylesheet.display()))?;
            let catalog = parse_icon_catalog(&css);
            for icon in filter_icons(&catalog, query.as_deref().unwrap_or_default()) {
                println!("{}\t{}", icon.name, icon.class);
            }
            Ok(())
        }
        Command::Presets { action } => match action {
            PresetAction::List => {
                for name in list_presets(store.as_ref())? {
                    println!("{}", name);
                }
                Ok(())
            }
            PresetAction::Delete { name } => {
                if !delete_preset(store.as_ref(), &name)? {
                    bail!("No preset named '{}'", name.trim());
                }
                Ok(())
            }
        },
    }
}

fn open_store(config: &AppConfig) -> anyhow::Result<Box<dyn SettingsStore>> {
    match &config.storage.dir {
        Some(dir) => Ok(Box::new(FileStore::open(dir).with_context(|| {
            format!("Failed to open settings store at {}", dir.display())
        })?)),
        None => {
            tracing::warn!("No storage.dir configured; settings and presets will not persist");
            Ok(Box::new(MemoryStore::new()))
        }
    }
}

fn resolve_settings(
    store: &dyn SettingsStore,
    file: Option<&Path>,
    preset: Option<&str>,
) -> anyhow::Result<Settings> {
    if let Some(file) = file {
        let json = std::fs::read_to_string(file)
            .with_context(|| format!("Failed to read settings file {}", file.display()))?;
        return serde_json::from_str(&json)
            .with_context(|| format!("Invalid settings file {}", file.display()));
    }
    if let Some(name) = preset {
        return load_preset(store, name)?.with_context(|| format!("No preset named '{}'", name));
    }
    Ok(load_settings(store))
}

fn export(
    config: &AppConfig,
    settings: Settings,
    output: PathBuf,
    images: Vec<PathBuf>,
    reveal: bool,
) -> anyhow::Result<()> {
    let mut fonts = FontBook::new();
    if let Some(family) = &config.fonts.fallback_family {
        fonts = fonts.with_fallback_family(family.clone());
    }
    for (family, file) in &config.fonts.files {
        fonts.register_file(family.clone(), file.clone());
    }

    let (accepted, rejected): (Vec<_>, Vec<_>) =
        images.into_iter().partition(|p| config.export.accepts(p));
    for path in &rejected {
        tracing::warn!(path = %path.display(), "Skipping file with unsupported extension");
    }

    let mut state = AppState::with_settings(settings);
    state.add_images(&accepted);

    std::fs::create_dir_all(&output)
        .with_context(|| format!("Failed to create output directory {}", output.display()))?;
    state.output_dir = Some(output.clone());

    let saver = DiskSaver;
    let report = BatchExporter::new(&saver).run(&mut state, &fonts, |progress| {
        println!("[{:>3}%] {}", progress.percent(), progress.image);
    })?;

    println!(
        "Exported {} of {} images to {}",
        report.saved.len(),
        report.total(),
        output.display()
    );
    for failure in report.skipped.iter().chain(&report.failed) {
        println!("  failed: {} ({})", failure.image, failure.reason);
    }

    if reveal {
        reveal_folder(&output);
    }
    Ok(())
}
