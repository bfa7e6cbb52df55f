//! CLI configuration management.
//!
//! ```text
//! Cli
//! ├── storage: StorageConfig   # Credentials, region, endpoint, default bucket
//! └── command: Command         # upload | delete | url
//! ```
//!
//! Storage settings can be provided via CLI arguments or environment
//! variables. Use `--help` to see all available options.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use stowage_storage::{Destination, ObjectRef, StorageConfig};

use crate::{TRACING_TARGET_CONFIG, TRACING_TARGET_STARTUP};

/// Complete CLI configuration.
#[derive(Debug, Clone, Parser)]
#[command(name = "stowage")]
#[command(about = "Upload, delete and locate objects in S3-compatible storage")]
#[command(version)]
pub struct Cli {
    /// Object store credentials and defaults.
    #[clap(flatten)]
    pub storage: StorageConfig,

    /// Operation to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Storage operations.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Upload a local file, or stdin when FILE is `-`
    Upload {
        /// Path of the file to upload
        file: PathBuf,

        /// Object key in the target bucket
        #[arg(long, short = 'n')]
        name: String,

        /// Bucket to upload into (defaults to --bucket)
        #[arg(long)]
        target_bucket: Option<String>,
    },

    /// Delete an object
    Delete {
        /// Object key
        key: String,

        /// Bucket holding the object (defaults to --bucket)
        #[arg(long)]
        target_bucket: Option<String>,
    },

    /// Print the public URL of an object
    Url {
        /// Object key
        key: String,

        /// Bucket holding the object (defaults to --bucket)
        #[arg(long)]
        target_bucket: Option<String>,
    },
}

impl Command {
    /// Returns the subcommand name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Upload { .. } => "upload",
            Self::Delete { .. } => "delete",
            Self::Url { .. } => "url",
        }
    }

    /// Builds the upload destination for [`Command::Upload`].
    pub fn destination(&self) -> Option<Destination> {
        match self {
            Self::Upload {
                name,
                target_bucket,
                ..
            } => Some(Destination {
                bucket: target_bucket.clone(),
                name: Some(name.clone()),
            }),
            _ => None,
        }
    }

    /// Builds the object reference for [`Command::Delete`] and [`Command::Url`].
    pub fn object(&self) -> Option<ObjectRef> {
        match self {
            Self::Delete { key, target_bucket } | Self::Url { key, target_bucket } => {
                Some(ObjectRef {
                    bucket: target_bucket.clone(),
                    key: key.clone(),
                })
            }
            Self::Upload { .. } => None,
        }
    }
}

impl Cli {
    /// Loads environment variables from .env file (if enabled) and parses CLI arguments.
    ///
    /// The .env file is loaded before clap parses arguments, so its values
    /// act as defaults for `env`-backed flags.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    /// Loads environment variables from .env file if the dotenv feature is enabled.
    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("Warning: failed to load .env file: {err}");
        }
    }

    /// No-op when dotenv feature is disabled.
    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}

    /// Logs build information and configuration (no sensitive information).
    pub fn log(&self) {
        tracing::debug!(
            target: TRACING_TARGET_STARTUP,
            version = env!("CARGO_PKG_VERSION"),
            pid = process::id(),
            arch = std::env::consts::ARCH,
            os = std::env::consts::OS,
            features = ?Self::enabled_features(),
            "Build information"
        );

        self.storage.log();

        tracing::debug!(
            target: TRACING_TARGET_CONFIG,
            command = self.command.name(),
            "Command selected"
        );
    }

    /// Returns a list of enabled compile-time features.
    fn enabled_features() -> Vec<&'static str> {
        [
            cfg!(feature = "dotenv").then_some("dotenv"),
            cfg!(feature = "json").then_some("json"),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}
