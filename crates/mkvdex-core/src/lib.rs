//! Mkvdex Core - Probe record model, field extraction and formatting helpers.

mod error;
mod extract;
pub mod format;
mod record;
mod schema;
mod types;

pub use error::{Error, Result};
pub use extract::{extract_fields, NormalizedMediaFields, ACCEPTED_VIDEO_CODEC, NULL_MARKER};
pub use format::{
    coalesce, convert_bitrate, duration_millis, format_duration, format_file_size,
    is_4k_resolution, BitrateUnit,
};
pub use record::{RawMediaRecord, Track, TrackKind};
pub use schema::{
    validate_identifier, ColumnDef, SchemaDescriptor, DEFAULT_SUMMARY_TABLE, MEDIA_INFO_TABLE,
};
pub use types::*;
