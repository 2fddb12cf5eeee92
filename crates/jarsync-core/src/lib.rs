//! Jarsync Core - find and fetch the latest builds of server plugins.
//!
//! Given plugin jars and Paper server jars on disk, the library reads their
//! identity, looks them up in Modrinth, Spiget and the PaperMC build API, and
//! downloads newer builds into an output directory. It has no UI of its own;
//! callers drive it through [`WorkingSet`] and [`Updater`] and may listen to
//! [`ProgressEvent`]s.
//!
//! # Example
//!
//! ```rust,ignore
//! use jarsync_core::{CancellationToken, Updater, UpdaterConfig, WorkingSet};
//!
//! #[tokio::main]
//! async fn main() -> jarsync_core::Result<()> {
//!     let mut set = WorkingSet::new();
//!     set.ingest(["/srv/minecraft/plugins"]);
//!
//!     let config = UpdaterConfig::builder().output_dir("/tmp/updates").build();
//!     let updater = Updater::new(config)?;
//!     let outcomes = updater.run(&mut set, &CancellationToken::new(), None).await?;
//!
//!     for outcome in &outcomes {
//!         println!("{} {} -> {}", outcome.artifact_name, outcome.status, outcome.resolved_version);
//!     }
//!     Ok(())
//! }
//! ```

pub mod artifact;
pub mod cancel;
pub mod config;
pub mod error;
pub mod matching;
pub mod models;
pub mod network;
pub mod providers;
pub mod updater;

pub use artifact::{read_artifact, IngestReport, WorkingSet};
pub use cancel::CancellationToken;
pub use config::{CatalogEndpoints, UpdaterConfig, UpdaterConfigBuilder};
pub use error::{JarsyncError, Result};
pub use models::{
    ArtifactDescriptor, ArtifactKind, LookupResult, RunSummary, UpdateOutcome, UpdateStatus,
};
pub use providers::{CatalogProvider, DynProvider};
pub use updater::{is_same_version, ProgressEvent, Updater};
