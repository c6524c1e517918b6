//! Core error types for tickerwatch.
//!
//! This module defines database-agnostic error types. Storage-specific errors
//! (from Diesel, the Postgres driver, etc.) are converted to these types by the
//! storage layer.

use std::path::PathBuf;
use thiserror::Error;
use tickerwatch_market_data::MarketDataError;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the service.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database lifecycle failed: {0}")]
    DatabaseLifecycle(#[from] LifecycleError),

    #[error("Market data operation failed: {0}")]
    MarketData(#[from] MarketDataError),

    #[error("Database operation failed: {0}")]
    Database(#[from] DatabaseError),

    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Errors raised while loading, validating or persisting configuration.
///
/// All of these are fatal at startup.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path}: {message}")]
    Read { path: PathBuf, message: String },

    #[error("Failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Failed to write {path}: {message}")]
    Write { path: PathBuf, message: String },

    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

impl ConfigError {
    pub fn invalid(key: impl Into<String>, message: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            key: key.into(),
            message: message.into(),
        }
    }
}

/// Errors raised while bringing the database server up.
#[derive(Error, Debug)]
pub enum LifecycleError {
    #[error("Invalid PostgreSQL mode '{0}' (expected 'startup' or 'load')")]
    InvalidMode(String),

    #[error("Missing PostgreSQL setting '{0}'")]
    MissingSetting(&'static str),

    #[error("Command `{command}` failed: {message}")]
    Command { command: String, message: String },

    #[error("Database still unreachable after {attempts} probe attempts: {message}")]
    Unreachable { attempts: u32, message: String },

    #[error("Failed to persist configuration: {0}")]
    Persist(#[from] ConfigError),
}

/// Database-agnostic error type for storage operations.
///
/// This enum uses `String` for all error details, allowing the storage layer
/// to convert driver-specific errors into this format.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to establish a database connection.
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Failed to create or configure the connection pool.
    #[error("Failed to create database pool: {0}")]
    PoolCreationFailed(String),

    /// A database query failed to execute.
    #[error("Database query failed: {0}")]
    QueryFailed(String),

    /// The requested record was not found.
    #[error("Record not found: {0}")]
    NotFound(String),

    /// Database migration failed.
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// Internal/unexpected database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

/// Validation errors for user input.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Required field '{0}' is missing")]
    MissingField(String),
}

impl Error {
    /// True for errors caused by the caller's input rather than by a backend.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::Validation(_) | Error::MarketData(MarketDataError::InvalidSymbol(_))
        )
    }
}
