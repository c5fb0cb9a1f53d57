// payguard-core/src/domain/dataset/mod.rs

pub mod profile;
pub mod table;

pub use profile::{ColumnProfile, Profile};
pub use table::{Column, ColumnData, ColumnKind, Dataset};
