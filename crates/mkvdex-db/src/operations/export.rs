//! Read side of the CSV export.

use crate::database::Database;
use crate::error::DbResult;
use crate::operations::value_to_text;

/// `(column, header)` pairs of the export projection, in output order.
pub const EXPORT_COLUMNS: [(&str, &str); 12] = [
    ("volume", "Volume"),
    ("file_name", "Title"),
    ("formatted_duration", "Duration"),
    ("formatted_file_size", "File_Size"),
    ("video_format", "Video_Format"),
    ("formatted_video_bit_rate", "Video_BitRate"),
    ("frame_rate", "Frame_Rate"),
    ("hdr_format", "HDR_Format"),
    ("mastering_display_color_primaries", "Mastering_Display_Color_Primaries"),
    ("mastering_display_luminance", "Mastering_Display_Luminance"),
    ("max_fall", "MAX_FALL"),
    ("max_cll", "MAX_CLL"),
];

impl Database {
    /// Visit every `media_info` row's export projection, ordered by volume then id.
    ///
    /// Returns the number of rows visited.
    pub fn for_each_export_row<F>(&self, mut visit: F) -> DbResult<usize>
    where
        F: FnMut(&[Option<String>]) -> std::io::Result<()>,
    {
        let conn = self.conn()?;
        let columns = EXPORT_COLUMNS
            .iter()
            .map(|(column, _)| *column)
            .collect::<Vec<_>>()
            .join(", ");
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM media_info ORDER BY volume, id",
            columns
        ))?;

        let mut rows = stmt.query([])?;
        let mut count = 0;
        let mut values = Vec::with_capacity(EXPORT_COLUMNS.len());

        while let Some(row) = rows.next()? {
            values.clear();
            for idx in 0..EXPORT_COLUMNS.len() {
                values.push(value_to_text(row.get_ref(idx)?));
            }
            visit(&values)?;
            count += 1;
        }

        Ok(count)
    }
}
