//! tag-sync - keeps a static site's `tag_map` in step with the tags its posts use
//!
//! Tags that are not mapped yet get a URL slug: Chinese tags are translated to
//! English first, everything else is lowercased and hyphenated. New entries are
//! appended to `_config.tag_map.yml` (or the `tag_map` block of `_config.yml`)
//! without disturbing what is already there.

mod collector;
mod commands;
mod constants;
mod document;
mod error;
mod loader;
mod logging;
mod models;
mod resolver;
mod settings;
mod site;
mod slug;
mod store;
mod sync;
mod translate;

use clap::{Parser, Subcommand};
use error::Result;
use models::SlugSource;
use settings::{SyncSettings, TargetKind};
use std::path::PathBuf;
use sync::SyncReport;
use translate::MyMemory;

#[derive(Parser, Debug)]
#[command(
    name = "tag-sync",
    version,
    about = "Sync post tags into the site's tag_map"
)]
struct Cli {
    /// Site root containing _config.yml
    #[arg(short = 'C', long = "base-dir", default_value = ".", global = true)]
    base_dir: PathBuf,

    /// Where the tag map is stored (overrides tag_sync.toml)
    #[arg(short = 't', long = "target", value_enum, global = true)]
    target: Option<TargetKind>,

    /// Concurrent translation requests
    #[arg(long = "concurrency", global = true)]
    concurrency: Option<usize>,

    /// Per-request translation timeout in seconds
    #[arg(long = "timeout", global = true)]
    timeout: Option<u64>,

    /// Give up on remaining translations after this many seconds
    #[arg(long = "deadline", global = true)]
    deadline: Option<u64>,

    /// Enable debug logging
    #[arg(short = 'v', long = "verbose", global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Reload posts from disk and add missing tags to the tag map
    SyncTags,
    /// Sync the tag map, then run the site generator command
    Generate {
        /// Generator command line, e.g. `-- hexo generate`
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        generator: Vec<String>,
    },
}

impl Cli {
    fn settings(&self) -> Result<SyncSettings> {
        let mut settings = SyncSettings::load(&self.base_dir)?;
        if let Some(target) = self.target {
            settings.target = target;
        }
        if let Some(concurrency) = self.concurrency {
            settings.concurrency = concurrency;
        }
        if let Some(timeout) = self.timeout {
            settings.timeout_secs = timeout;
        }
        if self.deadline.is_some() {
            settings.deadline_secs = self.deadline;
        }
        Ok(settings)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let settings = cli.settings()?;
    let translator = MyMemory::new(settings.endpoint.clone(), settings.langpair.clone());

    println!("Site root: {}", cli.base_dir.display());

    match &cli.command {
        Command::SyncTags => {
            let report = commands::sync_tags_command(&cli.base_dir, &settings, &translator).await;
            print_summary(report.as_ref());
        }
        Command::Generate { generator } => {
            match commands::load_site(&cli.base_dir, &settings) {
                Ok(mut site) => {
                    let report =
                        commands::before_generate(&mut site, &settings, &translator).await;
                    print_summary(report.as_ref());
                }
                Err(e) => {
                    tracing::error!("Failed to load site, skipping tag sync: {}", e);
                    print_summary(None);
                }
            }

            if let Some((program, args)) = generator.split_first() {
                println!("Running {}", generator.join(" "));
                let status = tokio::process::Command::new(program)
                    .args(args)
                    .current_dir(&cli.base_dir)
                    .status()
                    .await?;
                if !status.success() {
                    std::process::exit(status.code().unwrap_or(1));
                }
            }
        }
    }

    Ok(())
}

fn print_summary(report: Option<&SyncReport>) {
    match report {
        Some(SyncReport {
            added,
            written: Some(path),
        }) => {
            println!("✓ Added {} tags to {}", added.len(), path.display());
            for r in added {
                let note = match r.source {
                    SlugSource::Fallback => " (translation failed)",
                    SlugSource::Translated | SlugSource::Plain => "",
                };
                println!("  {} -> {}{}", r.tag, r.slug, note);
            }
        }
        Some(_) => println!("✓ Tag map already up to date"),
        None => println!("✗ Tag sync skipped, see log above"),
    }
}
