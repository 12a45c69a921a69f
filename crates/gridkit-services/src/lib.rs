//! gridkit Services Layer
//!
//! This crate sits between a grid host and the remote column-definition
//! service. It persists per-page grid configuration and reconciles the
//! configured columns with the live database table behind them.
//!
//! # Architecture
//!
//! ```text
//! Host (gridkit-app)
//!     ↓
//! Service Layer (gridkit-services) ← This crate
//!     ↓
//! Transport (ColumnDefTransport / HttpTransport)
//!     ↓
//! Remote `col-def` resource
//! ```
//!
//! # Services
//!
//! - [`ColumnConfigStore`] - load, save, existence check, batch add, delete and sync
//! - [`ColumnConfigDraft`] - the configuration dialog workflow on top of the store
//!
//! # Design Principles
//!
//! 1. **No engine dependencies** - Services know columns and forms, never grid state
//! 2. **Loads are best-effort** - A failed load leaves the host on its defaults
//! 3. **Destructive changes need confirmation** - Live deletes go through a token
//! 4. **Protected fields stay put** - `id`, `created_at` and `updated_at` are never dropped

mod column_config_draft;
mod column_config_service;
mod error;
mod transport;
mod view_models;

pub use column_config_draft::{ColumnConfigDraft, DbDeleteConfirmation, DeleteRequest};
pub use column_config_service::{ColumnConfigStore, PROTECTED_FIELDS, is_protected};
pub use error::{ServiceError, ServiceResult};
pub use transport::{ColumnDefTransport, HttpTransport};
pub use view_models::{
    AddColumnsOutcome, ColumnConfig, ColumnConfigRecord, ColumnSpec, DbColumn, DbColumnStatus,
    DeleteResponse, FailedColumn, Presence, SaveConfigRequest, infer_column_type,
};
