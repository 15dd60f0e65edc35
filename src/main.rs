mod descriptions;
mod importer;
mod parser;
mod render;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{error, info};

use descriptions::ComponentDescriptions;

#[derive(Parser)]
#[command(name = "talend_doc", about = "Talend HTML documentation → markdown reports")]
struct Cli {
    #[command(flatten)]
    dirs: Dirs,
    #[command(subcommand)]
    command: Commands,
}

/// Working locations, passed explicitly so nothing depends on ambient
/// process state.
#[derive(Args)]
struct Dirs {
    /// Folder holding zip archives to stage
    #[arg(long, default_value = "zips")]
    zips_dir: PathBuf,
    /// Folder holding staged HTML exports
    #[arg(long, default_value = "documentations")]
    docs_dir: PathBuf,
    /// Folder receiving the generated markdown reports
    #[arg(long, default_value = "markdowns")]
    out_dir: PathBuf,
    /// Folder receiving consumed zips and HTML files
    #[arg(long, default_value = "archives")]
    archives_dir: PathBuf,
    /// Component description lookup file
    #[arg(long, default_value = "composants.yaml")]
    descriptions: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Stage HTML exports out of zip archives
    Import,
    /// Generate one markdown report per staged HTML export
    Generate,
    /// Import + generate in one pipeline
    Run,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    match cli.command {
        Commands::Import => {
            let stats =
                importer::import_zips(&cli.dirs.zips_dir, &cli.dirs.docs_dir, &cli.dirs.archives_dir)?;
            stats.print();
        }
        Commands::Generate => {
            let stats = generate_all(&cli.dirs)?;
            stats.print();
        }
        Commands::Run => {
            let import_stats =
                importer::import_zips(&cli.dirs.zips_dir, &cli.dirs.docs_dir, &cli.dirs.archives_dir)?;
            import_stats.print();
            let stats = generate_all(&cli.dirs)?;
            stats.print();
        }
    }

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {:.1}s", elapsed.as_secs_f64());
    }

    Ok(())
}

struct GenerateStats {
    total: usize,
    ok: usize,
    errors: usize,
}

impl GenerateStats {
    fn print(&self) {
        println!(
            "Generated {} of {} documents ({} errors).",
            self.ok, self.total, self.errors
        );
    }
}

/// Walk the documentations directory in sorted order and run the pipeline
/// once per HTML file. One document failing never stops the others.
fn generate_all(dirs: &Dirs) -> Result<GenerateStats> {
    fs::create_dir_all(&dirs.out_dir)
        .with_context(|| format!("creating {}", dirs.out_dir.display()))?;
    fs::create_dir_all(&dirs.archives_dir)
        .with_context(|| format!("creating {}", dirs.archives_dir.display()))?;

    let mut stats = GenerateStats {
        total: 0,
        ok: 0,
        errors: 0,
    };

    let mut html_paths = importer::list_files_with_extension(&dirs.docs_dir, "html")?;
    html_paths.sort();
    if html_paths.is_empty() {
        info!(
            "no .html file found in {}, nothing generated",
            dirs.docs_dir.display()
        );
        return Ok(stats);
    }

    let descriptions = ComponentDescriptions::load(&dirs.descriptions);

    let pb = (html_paths.len() > 1).then(|| {
        let pb = ProgressBar::new(html_paths.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len}")
                .unwrap()
                .progress_chars("#>-"),
        );
        pb
    });

    for path in html_paths {
        stats.total += 1;
        match generate_one(&path, dirs, &descriptions) {
            Ok(out_path) => {
                info!("generated {} from {}", out_path.display(), path.display());
                stats.ok += 1;
                if let Some(file_name) = path.file_name() {
                    if let Err(e) = importer::move_file(&path, &dirs.archives_dir.join(file_name)) {
                        error!("failed to archive {}: {:#}", path.display(), e);
                    }
                }
            }
            Err(e) => {
                error!("failed on {}: {:#}", path.display(), e);
                stats.errors += 1;
            }
        }
        if let Some(pb) = &pb {
            pb.inc(1);
        }
    }

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }
    Ok(stats)
}

fn generate_one(path: &Path, dirs: &Dirs, descriptions: &ComponentDescriptions) -> Result<PathBuf> {
    let html = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let extracted = parser::process_document(&html);
    let markdown = render::render(&extracted, descriptions);

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".into());
    let out_path = dirs.out_dir.join(format!("doc_{}.md", stem));
    fs::write(&out_path, markdown).with_context(|| format!("writing {}", out_path.display()))?;
    Ok(out_path)
}
