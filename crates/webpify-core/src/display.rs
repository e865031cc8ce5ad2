//! Text shown next to the image list.

/// Size in megabytes with two decimals, e.g. `"1.50 MB"`.
pub fn size_label(bytes: u64) -> String {
    format!("{:.2} MB", bytes as f64 / 1024.0 / 1024.0)
}

/// Caption for the upload button.
pub fn upload_label(count: usize) -> String {
    let noun = if count == 1 { "Image" } else { "Images" };
    format!("Upload {count} WebP {noun}")
}
