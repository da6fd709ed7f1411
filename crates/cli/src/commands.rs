// FILE: crates/cli/src/commands.rs

use anyhow::{bail, Context, Result};
use chaptercast_config::{Config, ConfigManager};
use chaptercast_core::{
    format_timestamp, sort_chapters, CatalogProvider, ChapterEntry, LibraryEntry, MetadataProvider,
};
use chaptercast_library::{DirectoryCatalog, LoftyMetadataProvider};
use console::style;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// List books and series under the library root
pub async fn list_library(config: &Config) -> Result<()> {
    let root = &config.library.root;
    let entries = scan(config).await?;

    if entries.is_empty() {
        println!("No audiobooks under {}. Expected Author/Book/chapter files.", root.display());
        return Ok(());
    }

    println!("\n{} entries in {}", style(entries.len()).bold().cyan(), root.display());
    println!("{}", "=".repeat(80));
    for line in library_lines(&entries) {
        println!("{}", line);
    }

    Ok(())
}

/// List the chapters of one book in play order
pub async fn list_chapters(config: &Config, book: &Path) -> Result<()> {
    if !book.is_dir() {
        bail!("Not a book directory: {}", book.display());
    }

    let catalog = DirectoryCatalog::from_config(&config.library);
    let files = catalog
        .list_chapters(book)
        .await
        .with_context(|| format!("Failed to list chapters of {}", book.display()))?;

    let metadata = LoftyMetadataProvider::new();
    let mut chapters = Vec::with_capacity(files.len());
    let mut durations = Vec::with_capacity(files.len());
    for file in files {
        let tags = metadata.probe(&file).await;
        durations.push((file.clone(), tags.duration));
        chapters.push(ChapterEntry::new(file, tags.title, tags.track));
    }
    sort_chapters(&mut chapters);

    if chapters.is_empty() {
        println!("No chapter files in {}", book.display());
        return Ok(());
    }

    println!("\n{} chapters", style(chapters.len()).bold().cyan());
    println!("{}", "=".repeat(80));
    for (index, chapter) in chapters.iter().enumerate() {
        let duration = durations
            .iter()
            .find(|(path, _)| path == &chapter.path)
            .map(|(_, d)| *d)
            .unwrap_or(Duration::ZERO);
        println!("{}", chapter_line(index, chapter, duration));
    }

    Ok(())
}

/// Print the effective configuration as TOML
pub fn show_config(manager: &ConfigManager, config: &Config) -> Result<()> {
    let text = toml::to_string_pretty(config).context("Failed to serialize configuration")?;
    println!("# {}", manager.config_path().display());
    print!("{}", text);
    Ok(())
}

/// Write a default config file unless one exists
pub fn init_config(manager: &ConfigManager) -> Result<()> {
    let created = manager.initialize().context("Failed to create config file")?;
    if created {
        println!("{} Created {}", style("✓").green().bold(), manager.config_path().display());
    } else {
        println!("Config already exists at {}", manager.config_path().display());
    }
    Ok(())
}

pub async fn scan(config: &Config) -> Result<Vec<LibraryEntry>> {
    let catalog = DirectoryCatalog::from_config(&config.library);
    catalog
        .scan(&config.library.root)
        .await
        .with_context(|| format!("Failed to scan library at {}", config.library.root.display()))
}

/// One line per book; series books are numbered `series.book`
pub fn library_lines(entries: &[LibraryEntry]) -> Vec<String> {
    let mut lines = Vec::new();
    for (i, entry) in entries.iter().enumerate() {
        match entry {
            LibraryEntry::Book(book) => {
                lines.push(format!("{:>3}. {} {}", i + 1, book.title, style(format!("({})", book.author)).dim()));
            }
            LibraryEntry::Series(series) => {
                lines.push(format!(
                    "{:>3}. {} {} {}",
                    i + 1,
                    series.title,
                    style(format!("({})", series.author)).dim(),
                    style("[series]").magenta()
                ));
                for (j, book) in series.books.iter().enumerate() {
                    lines.push(format!("     {}.{} {}", i + 1, j + 1, book.title));
                }
            }
        }
    }
    lines
}

pub fn chapter_line(index: usize, chapter: &ChapterEntry, duration: Duration) -> String {
    format!(
        "{:>3}. {} {}",
        index + 1,
        chapter.title,
        style(format!("[{}]", format_timestamp(duration))).dim()
    )
}

/// Resolves a 1-based `N` or `N.M` selection to a book directory
pub fn resolve_book(entries: &[LibraryEntry], selection: &str) -> Option<PathBuf> {
    let mut parts = selection.trim().splitn(2, '.');
    let first: usize = parts.next()?.parse().ok()?;
    let entry = entries.get(first.checked_sub(1)?)?;

    match (entry, parts.next()) {
        (LibraryEntry::Book(book), None) => Some(book.path.clone()),
        (LibraryEntry::Series(series), Some(second)) => {
            let second: usize = second.parse().ok()?;
            series.books.get(second.checked_sub(1)?).map(|b| b.path.clone())
        }
        _ => None,
    }
}
