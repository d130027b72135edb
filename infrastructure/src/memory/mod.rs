//! In-memory storage adapters.

mod repository;

pub use repository::InMemoryPollRepository;
