use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Deserialize)]
struct PageSize(usize);
impl Default for PageSize {
    fn default() -> Self {
        PageSize(10)
    }
}

#[derive(Deserialize)]
struct FeedLimit(usize);
impl Default for FeedLimit {
    fn default() -> Self {
        FeedLimit(20)
    }
}

#[derive(Deserialize)]
struct Workers(usize);
impl Default for Workers {
    fn default() -> Self {
        Workers(4)
    }
}

#[derive(Deserialize)]
struct MaxRetries(u32);
impl Default for MaxRetries {
    fn default() -> Self {
        MaxRetries(3)
    }
}

#[derive(Deserialize)]
struct RawConfig {
    output_root: PathBuf,

    #[serde(default)]
    page_size: PageSize,

    #[serde(default)]
    feed_limit: FeedLimit,

    #[serde(default)]
    workers: Workers,

    #[serde(default)]
    max_task_retries: MaxRetries,
}

/// Pipeline configuration. The original spread this across environment
/// variables and module-level constants; here everything the components need
/// arrives through one explicit struct.
#[derive(Clone, Debug)]
pub struct Config {
    /// Root of the output tree; the `sites/id` and `sites/domain` trees live
    /// underneath it.
    pub output_root: PathBuf,

    /// Posts per listing page.
    pub page_size: usize,

    /// Most-recent-post window for the RSS feed.
    pub feed_limit: usize,

    /// Worker threads for the in-process queue.
    pub workers: usize,

    /// How many times the queue retries a failed task before giving up.
    pub max_task_retries: u32,
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Config> {
        let file = std::fs::File::open(path).map_err(|err| Error::Open {
            path: path.to_owned(),
            err,
        })?;
        let raw: RawConfig = serde_yaml::from_reader(file)?;
        if raw.page_size.0 == 0 {
            return Err(Error::ZeroPageSize);
        }
        Ok(Config {
            output_root: raw.output_root,
            page_size: raw.page_size.0,
            feed_limit: raw.feed_limit.0,
            workers: raw.workers.0,
            max_task_retries: raw.max_task_retries.0,
        })
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("opening config file '{path}': {err}")]
    Open {
        path: PathBuf,
        #[source]
        err: std::io::Error,
    },

    #[error("parsing config file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("page_size must be positive")]
    ZeroPageSize,
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Write;

    fn config_file(contents: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inkstone.yaml");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        (dir, path)
    }

    #[test]
    fn test_defaults() {
        let (_dir, path) = config_file("output_root: /srv/out\n");
        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.output_root, PathBuf::from("/srv/out"));
        assert_eq!(config.page_size, 10);
        assert_eq!(config.feed_limit, 20);
        assert_eq!(config.workers, 4);
        assert_eq!(config.max_task_retries, 3);
    }

    #[test]
    fn test_explicit_values() {
        let (_dir, path) = config_file(
            "output_root: /srv/out\npage_size: 5\nfeed_limit: 7\nworkers: 2\nmax_task_retries: 1\n",
        );
        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.page_size, 5);
        assert_eq!(config.feed_limit, 7);
        assert_eq!(config.workers, 2);
        assert_eq!(config.max_task_retries, 1);
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let (_dir, path) = config_file("output_root: /srv/out\npage_size: 0\n");
        assert!(matches!(
            Config::from_file(&path),
            Err(Error::ZeroPageSize)
        ));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Config::from_file(&dir.path().join("missing.yaml")),
            Err(Error::Open { .. })
        ));
    }
}
