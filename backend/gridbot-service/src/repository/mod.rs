//! Document store adapters and the typed like repository on top of them

pub mod document_store;
pub mod likes;
pub mod memory;
pub mod postgres;

pub use document_store::{document_id, DocumentStore, StoreError};
pub use likes::LikeRepository;
pub use memory::MemoryDocumentStore;
pub use postgres::PgDocumentStore;
