//! Core domain types for mkvdex.

use crate::format::{
    convert_bitrate, duration_millis, format_duration, format_file_size, is_4k_resolution,
    parse_integer, strip_luminance_unit, BitrateUnit,
};
use crate::record::{RawMediaRecord, TrackKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One row of the `media_info` table, keyed on `(volume, file_name)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaInfoRow {
    pub volume: String,
    pub file_name: String,
    /// Milliseconds, derived the same way as [`format_duration`].
    pub duration: Option<i64>,
    pub formatted_duration: Option<String>,
    pub file_size: Option<i64>,
    pub formatted_file_size: Option<String>,
    pub overall_bit_rate: Option<i64>,
    pub formatted_overall_bit_rate: Option<String>,
    pub video_format: Option<String>,
    pub width: Option<i64>,
    pub height: Option<i64>,
    pub video_bit_rate: Option<i64>,
    pub formatted_video_bit_rate: Option<String>,
    pub frame_rate: Option<f64>,
    pub hdr_format: Option<String>,
    pub color_primaries: Option<String>,
    pub mastering_display_color_primaries: Option<String>,
    pub mastering_display_luminance: Option<String>,
    pub max_fall: Option<i64>,
    pub max_cll: Option<i64>,
    /// The probe JSON, including the `volume` key.
    pub full_json: String,
}

impl MediaInfoRow {
    /// Map a probe record onto the upsert columns.
    ///
    /// Unlike [`crate::extract_fields`] there is no codec filter here, and
    /// unparseable numbers become `None` instead of failing the record.
    pub fn from_record(volume: &str, record: &RawMediaRecord) -> Self {
        let general = |name: &str| record.field(TrackKind::General, name);
        let video = |name: &str| record.field(TrackKind::Video, name);
        let integer = |value: Option<String>| value.and_then(|v| parse_integer(&v));
        let luminance = |value: Option<String>| {
            value.and_then(|v| parse_integer(&strip_luminance_unit(&v)))
        };

        let raw_duration = general("Duration");
        let file_size = integer(general("FileSize"));
        let overall_bit_rate = integer(general("OverallBitRate"));
        let video_bit_rate = integer(video("BitRate"));

        Self {
            volume: volume.to_string(),
            file_name: record.file_name().to_string(),
            duration: raw_duration.as_deref().and_then(duration_millis),
            formatted_duration: raw_duration.as_deref().and_then(format_duration),
            file_size,
            formatted_file_size: file_size.map(|bytes| format_file_size(bytes.max(0) as u64)),
            overall_bit_rate,
            formatted_overall_bit_rate: convert_bitrate(overall_bit_rate, BitrateUnit::Mbps),
            video_format: video("Format"),
            width: integer(video("Width")),
            height: integer(video("Height")),
            video_bit_rate,
            formatted_video_bit_rate: convert_bitrate(video_bit_rate, BitrateUnit::Mbps),
            frame_rate: video("FrameRate").and_then(|v| v.trim().parse::<f64>().ok()),
            hdr_format: video("HDR_Format"),
            color_primaries: video("colour_primaries"),
            mastering_display_color_primaries: video("MasteringDisplay_ColorPrimaries"),
            mastering_display_luminance: video("MasteringDisplay_Luminance"),
            max_fall: luminance(video("MaxFALL")),
            max_cll: luminance(video("MaxCLL")),
            full_json: record.to_json_line(),
        }
    }

    pub fn is_4k(&self) -> bool {
        let dimension = |v: Option<i64>| v.and_then(|v| u32::try_from(v).ok());
        match (dimension(self.width), dimension(self.height)) {
            (Some(w), Some(h)) => is_4k_resolution(w, h),
            _ => false,
        }
    }
}

/// A nearest-neighbour hit from the semantic index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarMedia {
    pub media_id: i64,
    pub volume: String,
    pub file_name: String,
    /// Euclidean distance to the query vector; smaller is closer.
    pub distance: f32,
}

/// Statistics about the catalogue database.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogStats {
    pub total_media: i64,
    pub media_by_volume: BTreeMap<String, i64>,
    pub hevc_media: i64,
    pub uhd_media: i64,
    pub hdr_media: i64,
    pub summary_rows: i64,
    pub embedded_media: i64,
    pub database_size_bytes: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn probe(video: serde_json::Value) -> RawMediaRecord {
        let mut record = RawMediaRecord::from_value(json!({
            "media": {
                "@ref": "/mnt/wd8a/Blade Runner 2049/Blade Runner 2049.mkv",
                "track": [
                    {
                        "@type": "General",
                        "Duration": "9827.136",
                        "FileSize": "72351234567",
                        "OverallBitRate": "58899882"
                    },
                    video
                ]
            }
        }))
        .unwrap();
        record.set_volume("WD8A");
        record
    }

    #[test]
    fn test_from_record_maps_every_column() {
        let record = probe(json!({
            "@type": "Video",
            "Format": "HEVC",
            "Width": "3840",
            "Height": "2160",
            "BitRate": "51234000",
            "FrameRate": "23.976",
            "HDR_Format": "SMPTE ST 2094 App 4",
            "colour_primaries": "BT.2020",
            "MasteringDisplay_ColorPrimaries": "Display P3",
            "MasteringDisplay_Luminance": "min: 0.0001 cd/m2, max: 1000 cd/m2",
            "MaxFALL": "181 cd/m2",
            "MaxCLL": "1000 cd/m2"
        }));

        let row = MediaInfoRow::from_record("WD8A", &record);
        assert_eq!(row.volume, "WD8A");
        assert_eq!(row.file_name, "Blade Runner 2049.mkv");
        assert_eq!(row.duration, Some(9827136));
        assert_eq!(row.formatted_duration.as_deref(), Some("02:43:47"));
        assert_eq!(row.file_size, Some(72351234567));
        assert_eq!(row.formatted_file_size.as_deref(), Some("67.38 GB"));
        assert_eq!(row.formatted_overall_bit_rate.as_deref(), Some("58.90 Mbps"));
        assert_eq!(row.video_format.as_deref(), Some("HEVC"));
        assert_eq!(row.formatted_video_bit_rate.as_deref(), Some("51.23 Mbps"));
        assert_eq!(row.frame_rate, Some(23.976));
        assert_eq!(row.color_primaries.as_deref(), Some("BT.2020"));
        assert_eq!(row.max_fall, Some(181));
        assert_eq!(row.max_cll, Some(1000));
        assert!(row.is_4k());
        assert!(row.full_json.contains("\"volume\":\"WD8A\""));
    }

    #[test]
    fn test_from_record_keeps_non_hevc_and_tolerates_bad_numbers() {
        let record = probe(json!({
            "@type": "Video",
            "Format": "AVC",
            "Width": "1920",
            "Height": "1080",
            "BitRate": "variable",
            "FrameRate": ""
        }));

        let row = MediaInfoRow::from_record("WD8A", &record);
        assert_eq!(row.video_format.as_deref(), Some("AVC"));
        assert_eq!(row.video_bit_rate, None);
        assert_eq!(row.formatted_video_bit_rate, None);
        assert_eq!(row.frame_rate, None);
        assert_eq!(row.max_fall, None);
        assert!(!row.is_4k());
    }
}
