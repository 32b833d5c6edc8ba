use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use rocket::serde::json::serde_json::{self, Value};
use rocket::tokio::{fs, sync::RwLock};

use super::{ElectionDataSet, ElectionSummary};
use crate::error::{Error, Result};

/// Every loaded election, keyed by election id.
///
/// Datasets are shared out as `Arc`s, so readers never hold the lock while
/// building a response.
#[derive(Debug, Default)]
pub struct ElectionStore {
    elections: RwLock<BTreeMap<String, Arc<ElectionDataSet>>>,
}

impl ElectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_datasets(datasets: impl IntoIterator<Item = ElectionDataSet>) -> Self {
        let elections = datasets
            .into_iter()
            .map(|d| (d.election_id.clone(), Arc::new(d)))
            .collect();
        Self {
            elections: RwLock::new(elections),
        }
    }

    pub async fn get(&self, election_id: &str) -> Result<Arc<ElectionDataSet>> {
        self.elections
            .read()
            .await
            .get(election_id)
            .cloned()
            .ok_or_else(|| Error::not_found("Election", election_id))
    }

    /// Summaries of all elections, ordered by the id they are registered under.
    pub async fn list(&self) -> Vec<ElectionSummary> {
        self.elections
            .read()
            .await
            .iter()
            .map(|(id, dataset)| ElectionSummary {
                id: id.clone(),
                ..ElectionSummary::from(dataset.as_ref())
            })
            .collect()
    }

    /// Register a dataset under the given id, replacing any previous one.
    pub async fn insert(&self, election_id: String, dataset: ElectionDataSet) {
        self.elections
            .write()
            .await
            .insert(election_id, Arc::new(dataset));
    }

    /// Load every `*.json` file in `dir`, in filename order, keyed by the
    /// election id inside each file. Files that cannot be read or parsed are
    /// logged and skipped. Returns the number of datasets loaded.
    pub async fn load_dir(&self, dir: &Path) -> usize {
        let mut entries = match fs::read_dir(dir).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Elections directory {} not readable: {e}", dir.display());
                return 0;
            }
        };

        let mut paths: Vec<PathBuf> = Vec::new();
        loop {
            match entries.next_entry().await {
                Ok(Some(entry)) => {
                    let path = entry.path();
                    if path.extension().map_or(false, |ext| ext == "json") {
                        paths.push(path);
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    warn!("Error listing {}: {e}", dir.display());
                    break;
                }
            }
        }
        paths.sort();

        let mut loaded = 0;
        for path in paths {
            match read_dataset(&path).await {
                Ok(dataset) => {
                    debug!("Loaded election data: {}", dataset.election_id);
                    self.insert(dataset.election_id.clone(), dataset).await;
                    loaded += 1;
                }
                Err(e) => error!("Skipping election file {}: {e}", path.display()),
            }
        }
        loaded
    }

    /// Load a dataset from an arbitrary file and register it under `election_id`.
    pub async fn import_file(&self, path: &Path, election_id: &str) -> Result<()> {
        let path = normalize(path);
        if path.to_string_lossy().contains("..") {
            return Err(Error::bad_request("Invalid file path"));
        }

        let raw = match fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::not_found("File", path.display()));
            }
            Err(e) => return Err(e.into()),
        };
        let value: Value =
            serde_json::from_str(&raw).map_err(|_| Error::bad_request("Invalid JSON file"))?;
        let dataset: ElectionDataSet = serde_json::from_value(value)
            .map_err(|e| Error::bad_request(format!("Invalid election data structure: {e}")))?;

        info!(
            "Imported election {} from {} as {election_id}",
            dataset.election_id,
            path.display()
        );
        self.insert(election_id.to_string(), dataset).await;
        Ok(())
    }
}

/// Resolve `.` and `name/..` lexically. A `..` that climbs above the start
/// of a relative path is kept.
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match normalized.components().next_back() {
                Some(Component::Normal(_)) => {
                    normalized.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => normalized.push(".."),
            },
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

async fn read_dataset(path: &Path) -> Result<ElectionDataSet> {
    let raw = fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&raw)?)
}

#[cfg(test)]
impl ElectionStore {
    pub fn example() -> Self {
        Self::with_datasets([ElectionDataSet::example()])
    }
}

#[cfg(test)]
mod tests {
    use log4rs_test_utils::test_logging::init_logging_once_for;

    use super::*;

    fn data_dir() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("data")
    }

    #[rocket::async_test]
    async fn load_dir_reads_json_files() {
        init_logging_once_for(["civic_backend"], None, None);

        let store = ElectionStore::new();
        let loaded = store.load_dir(&data_dir().join("elections")).await;
        assert_eq!(loaded, 1);
        let dataset = store.get("2022-parliament").await.unwrap();
        assert_eq!(dataset.region_results.len(), 3);
        assert!(matches!(
            store.get("1990-parliament").await,
            Err(Error::NotFound(_))
        ));
    }

    #[rocket::async_test]
    async fn load_dir_skips_unparseable_files() {
        init_logging_once_for(["civic_backend"], None, None);

        // The seed directory holds JSON that is not election data.
        let store = ElectionStore::new();
        assert_eq!(store.load_dir(&data_dir().join("seed")).await, 0);
        assert_eq!(store.load_dir(&data_dir().join("missing")).await, 0);
        assert!(store.list().await.is_empty());
    }

    #[rocket::async_test]
    async fn import_rules() {
        let store = ElectionStore::new();

        let traversal = Path::new("../data/elections/2022-parliament.json");
        assert!(matches!(
            store.import_file(traversal, "x").await,
            Err(Error::BadRequest(_))
        ));
        // Any `..` left after normalizing is refused, even inside a file name.
        let dotted = data_dir().join("elections/2022..parliament.json");
        assert!(matches!(
            store.import_file(&dotted, "x").await,
            Err(Error::BadRequest(_))
        ));

        let missing = data_dir().join("elections/2026-parliament.json");
        assert!(matches!(
            store.import_file(&missing, "x").await,
            Err(Error::NotFound(_))
        ));

        let not_election = data_dir().join("seed/votes.json");
        assert!(matches!(
            store.import_file(&not_election, "x").await,
            Err(Error::BadRequest(_))
        ));

        let good = data_dir().join("elections/2022-parliament.json");
        store.import_file(&good, "2022-copy").await.unwrap();
        let list = store.list().await;
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].id, "2022-copy");
        assert!(store.get("2022-copy").await.is_ok());

        // A `..` that resolves within the path is harmless.
        let roundabout = data_dir().join("elections/../elections/./2022-parliament.json");
        store.import_file(&roundabout, "2022-roundabout").await.unwrap();
        assert_eq!(store.list().await.len(), 2);
    }

    #[test]
    fn normalize_resolves_lexically() {
        assert_eq!(normalize(Path::new("/a/b/../c/./d.json")), Path::new("/a/c/d.json"));
        assert_eq!(normalize(Path::new("a/../../b")), Path::new("../b"));
        assert_eq!(normalize(Path::new("/../etc")), Path::new("/etc"));
    }
}
