use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use inkstone::build::SiteBuilder;
use inkstone::config::Config;
use inkstone::post::Post;
use inkstone::queue::Queue;
use inkstone::repo::{MemoryRepository, Repository};
use inkstone::site::Site;
use inkstone::tasks::Event;
use inkstone::user::User;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Parser)]
#[command(
    name = "inkstone",
    about = "Rebuild static artifacts for hosted blog sites"
)]
struct Cli {
    /// Pipeline configuration file.
    #[arg(short, long, default_value = "inkstone.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load a content fixture and rebuild site artifacts end to end.
    Rebuild {
        /// YAML file holding users, sites, and posts.
        #[arg(long)]
        data: PathBuf,

        /// Rebuild only this site; defaults to every site in the fixture.
        #[arg(long)]
        site: Option<Uuid>,
    },
}

/// On-disk stand-in for the record store, for one-shot rebuilds and local
/// theme development.
#[derive(Deserialize)]
struct Fixture {
    #[serde(default)]
    users: Vec<User>,

    #[serde(default)]
    sites: Vec<Site>,

    #[serde(default)]
    posts: Vec<Post>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = Config::from_file(&cli.config)?;

    match cli.command {
        Command::Rebuild { data, site } => rebuild(&config, &data, site),
    }
}

fn rebuild(config: &Config, data: &Path, site: Option<Uuid>) -> Result<()> {
    let file = std::fs::File::open(data)
        .with_context(|| format!("opening fixture '{}'", data.display()))?;
    let fixture: Fixture = serde_yaml::from_reader(file)?;

    let repo = Arc::new(MemoryRepository::new());
    for user in fixture.users {
        repo.insert_user(user)?;
    }
    let all_sites: Vec<Uuid> = fixture.sites.iter().map(|s| s.uuid).collect();
    for s in fixture.sites {
        repo.insert_site(s)?;
    }
    for post in fixture.posts {
        repo.insert_post(post)?;
    }

    let targets = match site {
        Some(id) => vec![id],
        None => all_sites,
    };

    let builder = Arc::new(SiteBuilder::new(repo, config));
    let queue = Queue::start(builder, config.workers, config.max_task_retries);
    for id in &targets {
        queue.schedule_event(&Event::SiteCreated { site: *id });
    }
    queue.shutdown();
    Ok(())
}
