//! Database Backend Abstractions
//!
//! The fetch strategies talk to a store only through `DatabasePool` and
//! `DatabaseTransaction`. PostgreSQL is the production backend; the in-memory
//! backend evaluates the same structured queries against snapshot tables.

pub mod core;
pub mod memory;
pub mod postgres;

// Re-export core traits and types
pub use core::*;
pub use memory::MemoryPool;
pub use postgres::{PostgresBackend, PostgresPool};

/// Database backend type enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatabaseBackendType {
    PostgreSQL,
    Memory,
}

impl std::fmt::Display for DatabaseBackendType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatabaseBackendType::PostgreSQL => write!(f, "postgresql"),
            DatabaseBackendType::Memory => write!(f, "memory"),
        }
    }
}

impl std::str::FromStr for DatabaseBackendType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "postgresql" | "postgres" => Ok(DatabaseBackendType::PostgreSQL),
            "memory" | "mem" => Ok(DatabaseBackendType::Memory),
            _ => Err(format!("Unsupported database backend: {}", s)),
        }
    }
}
