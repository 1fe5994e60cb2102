//! Normalization of a probe record into the catalogue's display fields.

use crate::error::{Error, Result};
use crate::format::{
    convert_bitrate, format_duration, format_file_size, parse_integer, strip_luminance_unit,
    BitrateUnit,
};
use crate::record::{RawMediaRecord, TrackKind};

/// The only video codec that produces a catalogue entry.
pub const ACCEPTED_VIDEO_CODEC: &str = "HEVC";

/// Marker written in place of an absent value in delimited dumps.
pub const NULL_MARKER: &str = "None";

/// Normalized fields of one accepted media file, in dump order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedMediaFields {
    pub title: Option<String>,
    pub duration: Option<String>,
    pub file_size: Option<String>,
    pub overall_bit_rate: Option<String>,
    pub video_codec: Option<String>,
    pub video_bit_rate: Option<String>,
    pub frame_rate: Option<String>,
    pub hdr_format: Option<String>,
    pub mastering_display_color_primaries: Option<String>,
    pub mastering_display_luminance: Option<String>,
    pub max_fall: Option<String>,
    pub max_cll: Option<String>,
}

impl NormalizedMediaFields {
    /// Field names in dump order.
    pub const FIELD_NAMES: [&'static str; 12] = [
        "Title",
        "Duration",
        "File_size",
        "OverallBitRate",
        "Video_Codec",
        "Video_Bit_Rate",
        "FrameRate",
        "HDR_Format",
        "MasteringDisplay_ColorPrimaries",
        "MasteringDisplay_Luminance",
        "MaxFALL",
        "MaxCLL",
    ];

    /// Values in dump order.
    pub fn values(&self) -> [Option<&str>; 12] {
        [
            self.title.as_deref(),
            self.duration.as_deref(),
            self.file_size.as_deref(),
            self.overall_bit_rate.as_deref(),
            self.video_codec.as_deref(),
            self.video_bit_rate.as_deref(),
            self.frame_rate.as_deref(),
            self.hdr_format.as_deref(),
            self.mastering_display_color_primaries.as_deref(),
            self.mastering_display_luminance.as_deref(),
            self.max_fall.as_deref(),
            self.max_cll.as_deref(),
        ]
    }

    /// Join all twelve values with `delimiter`, writing [`NULL_MARKER`] for absent ones.
    pub fn to_delimited(&self, delimiter: &str) -> String {
        self.values()
            .iter()
            .map(|v| v.unwrap_or(NULL_MARKER))
            .collect::<Vec<_>>()
            .join(delimiter)
    }

    /// Names of the fields whose value contains `delimiter`.
    ///
    /// A line holding any of them has too many fields to load back.
    pub fn fields_containing(&self, delimiter: &str) -> Vec<&'static str> {
        Self::FIELD_NAMES
            .iter()
            .zip(self.values())
            .filter(|(_, v)| v.is_some_and(|v| v.contains(delimiter)))
            .map(|(name, _)| *name)
            .collect()
    }
}

fn integer_field(field: &str, raw: Option<String>) -> Result<Option<i64>> {
    match raw {
        None => Ok(None),
        Some(value) => parse_integer(&value).map(Some).ok_or(Error::InvalidField {
            field: field.to_string(),
            value,
        }),
    }
}

/// Extract the catalogue fields from a probe record.
///
/// Returns `Ok(None)` when the first video track is not HEVC. A record without
/// any video track is kept with only its general fields filled in.
pub fn extract_fields(record: &RawMediaRecord) -> Result<Option<NormalizedMediaFields>> {
    let mut fields = NormalizedMediaFields {
        title: Some(record.file_name().to_string()),
        ..Default::default()
    };

    if let Some(general) = record.track(TrackKind::General) {
        fields.duration = general.text("Duration").and_then(|d| format_duration(&d));

        let file_size = integer_field("FileSize", general.text("FileSize"))?;
        fields.file_size = file_size.map(|bytes| format_file_size(bytes.max(0) as u64));

        let overall = integer_field("OverallBitRate", general.text("OverallBitRate"))?;
        fields.overall_bit_rate = convert_bitrate(overall, BitrateUnit::Mbps);
    }

    if let Some(video) = record.track(TrackKind::Video) {
        let codec = video.text("Format");
        if codec.as_deref() != Some(ACCEPTED_VIDEO_CODEC) {
            return Ok(None);
        }
        fields.video_codec = codec;

        let bit_rate = integer_field("BitRate", video.text("BitRate"))?;
        fields.video_bit_rate = convert_bitrate(bit_rate, BitrateUnit::Mbps);
        fields.frame_rate = video.text("FrameRate");
        fields.hdr_format = video.text("HDR_Format");
        fields.mastering_display_color_primaries = video.text("MasteringDisplay_ColorPrimaries");
        fields.mastering_display_luminance = video.text("MasteringDisplay_Luminance");
        fields.max_fall = video.text("MaxFALL").map(|v| strip_luminance_unit(&v));
        fields.max_cll = video.text("MaxCLL").map(|v| strip_luminance_unit(&v));
    }

    Ok(Some(fields))
}
