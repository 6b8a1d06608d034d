//! Entity store for the intent indexer.
//!
//! This module provides the keyed load/upsert surface the reconciliation
//! handlers rely on. Writes are last-write-wins and there are no transactions
//! spanning more than one key, so callers order their writes themselves.

use async_trait::async_trait;
use indexer_types::Entity;
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod file;
	pub mod memory;
}

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
	/// Error that occurs when a requested item is not found.
	#[error("Not found")]
	NotFound,
	/// Error that occurs during serialization/deserialization.
	#[error("Serialization error: {0}")]
	Serialization(String),
	/// Error that occurs in the storage backend.
	#[error("Backend error: {0}")]
	Backend(String),
}

/// Trait defining the low-level interface for storage backends.
///
/// Backends store opaque bytes under string keys. A write must be visible to
/// the next read of the same key.
#[async_trait]
pub trait StorageInterface: Send + Sync {
	/// Retrieves raw bytes for the given key.
	async fn get_bytes(&self, key: &str) -> Result<Vec<u8>, StorageError>;

	/// Stores raw bytes, replacing any previous value.
	async fn set_bytes(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError>;

	/// Checks if a key exists in storage.
	async fn exists(&self, key: &str) -> Result<bool, StorageError>;
}

/// Typed entity store on top of a [`StorageInterface`] backend.
///
/// Entities are serialized to JSON and stored under `{namespace}:{id}`.
pub struct StorageService {
	/// The underlying storage backend implementation.
	backend: Box<dyn StorageInterface>,
}

impl StorageService {
	/// Creates a new StorageService with the specified backend.
	pub fn new(backend: Box<dyn StorageInterface>) -> Self {
		Self { backend }
	}

	fn key<E: Entity>(id: &str) -> String {
		format!("{}:{}", E::NAMESPACE, id)
	}

	/// Loads an entity by id. Absence is `Ok(None)`, not an error.
	pub async fn load<E: Entity>(&self, id: &str) -> Result<Option<E>, StorageError> {
		match self.backend.get_bytes(&Self::key::<E>(id)).await {
			Ok(bytes) => serde_json::from_slice(&bytes)
				.map(Some)
				.map_err(|e| StorageError::Serialization(e.to_string())),
			Err(StorageError::NotFound) => Ok(None),
			Err(e) => Err(e),
		}
	}

	/// Writes an entity under its own id, replacing any previous version.
	pub async fn upsert<E: Entity>(&self, entity: &E) -> Result<(), StorageError> {
		let bytes =
			serde_json::to_vec(entity).map_err(|e| StorageError::Serialization(e.to_string()))?;
		self.backend
			.set_bytes(&Self::key::<E>(entity.id()), bytes)
			.await
	}

	/// Checks whether an entity with this id has been stored.
	pub async fn exists<E: Entity>(&self, id: &str) -> Result<bool, StorageError> {
		self.backend.exists(&Self::key::<E>(id)).await
	}
}
