//! Core types shared by the script compiler and the pipeline

mod descriptor;
mod record;
mod value;

pub use descriptor::*;
pub use record::*;
pub use value::*;
