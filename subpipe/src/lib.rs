//! Compile line-oriented transform scripts and apply them to JSON records
//!
//! ```no_run
//! use serde_json::json;
//! use subpipe::{Pipeline, Record};
//!
//! let pipeline = Pipeline::from_script(r#"
//!     split($.data, separator="|")
//!     print()
//! "#)?;
//! let records = pipeline.apply(vec![Record::new(json!({"data": "a|b|c"}))])?;
//! assert_eq!(records.len(), 3);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod ops;
pub mod path;
pub mod script;
pub mod types;

pub use config::{Config, ConfigError};
pub use engine::{Pipeline, apply};
pub use error::{Error, OperationError};
pub use ops::{Factory, Operation};
pub use path::{Path, PathError, Root};
pub use script::{SyntaxError, SyntaxErrorKind, compile};
pub use types::{FieldValue, OperationDescriptor, OperationKind, Record, Value};
