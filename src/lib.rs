//! morse - invariant-maintenance rules for persistent, validatable records
//!
//! Record types opt into rules from a fixed catalog (foreign-key existence,
//! blank normalization, exclusive and default flags, integer defaults,
//! mandatory booleans, attachment promotion, destroy guards). A
//! [`ValidationPipeline`] runs them at the right lifecycle points against a
//! shared [`RecordStore`].
//!
//! ```ignore
//! use std::sync::Arc;
//! use morse::{FieldKind, InMemoryRecordStore, PipelineConfig, RecordType, Registry, Rule,
//!     ValidationPipeline};
//!
//! let registry = Registry::new().with(
//!     RecordType::new("land")
//!         .field("default_land", FieldKind::Bool)
//!         .rule(Rule::there_must_be_one("default_land"))
//!         .rule(Rule::there_can_be_only_one("default_land")),
//! )?;
//! let pipeline = ValidationPipeline::new(
//!     registry,
//!     Arc::new(InMemoryRecordStore::new()),
//!     PipelineConfig::default(),
//! )?;
//!
//! let mut land = pipeline.new_record("land")?;
//! pipeline.save(&mut land)?;
//! ```

pub mod observability;
pub mod pipeline;
pub mod record;
pub mod registry;
pub mod rules;
pub mod store;
pub mod validation;

pub use pipeline::{PipelineConfig, PipelineError, PipelineResult, ValidationPipeline};
pub use record::{Accessor, Record, RecordId, Upload, Value};
pub use registry::{FieldKind, RecordType, Registry, RegistryError, RegistryLoader};
pub use rules::{AttachmentConfig, Lifecycle, RecordSaver, Rule, RuleContext};
pub use store::{InMemoryRecordStore, RecordStore, StoreError, StoreResult};
pub use validation::{ErrorCollection, RuleOutcome};
