//! File-based storage backend.
//!
//! A key `{namespace}:{id}` lives at `{root}/{namespace}/{id}.json`, so each
//! entity type gets its own directory. Characters that are not path-safe in
//! an id (chain-scoped ids contain `:`) are replaced by `_`.

use crate::{StorageError, StorageInterface};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

const DEFAULT_ROOT: &str = "./data/storage";

/// Entity store persisted as one JSON file per key.
pub struct FileStorage {
	root: PathBuf,
}

impl FileStorage {
	pub fn new(root: impl Into<PathBuf>) -> Self {
		Self { root: root.into() }
	}

	pub fn root(&self) -> &Path {
		&self.root
	}

	fn path_for(&self, key: &str) -> PathBuf {
		let (namespace, id) = key.split_once(':').unwrap_or(("default", key));
		let file_name: String = id
			.chars()
			.map(|c| if matches!(c, '/' | '\\' | ':') { '_' } else { c })
			.collect();
		self.root.join(namespace).join(format!("{}.json", file_name))
	}
}

fn backend_error(e: std::io::Error) -> StorageError {
	StorageError::Backend(e.to_string())
}

#[async_trait]
impl StorageInterface for FileStorage {
	async fn get_bytes(&self, key: &str) -> Result<Vec<u8>, StorageError> {
		fs::read(self.path_for(key)).await.map_err(|e| match e.kind() {
			ErrorKind::NotFound => StorageError::NotFound,
			_ => backend_error(e),
		})
	}

	async fn set_bytes(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
		let target = self.path_for(key);
		let Some(dir) = target.parent() else {
			return Err(StorageError::Backend(format!("no directory for key '{}'", key)));
		};
		fs::create_dir_all(dir).await.map_err(backend_error)?;

		// Readers never observe a half-written entity.
		let staging = target.with_extension("json.partial");
		fs::write(&staging, value).await.map_err(backend_error)?;
		fs::rename(&staging, &target).await.map_err(backend_error)
	}

	async fn exists(&self, key: &str) -> Result<bool, StorageError> {
		fs::try_exists(self.path_for(key)).await.map_err(backend_error)
	}
}

/// Builds a [`FileStorage`] rooted at `storage_path` (default `./data/storage`).
pub fn create_storage(config: &toml::Value) -> Box<dyn StorageInterface> {
	let root = config
		.get("storage_path")
		.and_then(|v| v.as_str())
		.unwrap_or(DEFAULT_ROOT);
	Box::new(FileStorage::new(root))
}
