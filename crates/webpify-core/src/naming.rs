//! Output file naming.

/// Extension given to every converted file.
pub const WEBP_EXTENSION: &str = ".webp";

/// Derive the output name for a converted file.
///
/// The last extension is the final `.` followed by one or more characters
/// that are neither `.` nor `/`. It is replaced with `.webp`. Names without
/// such an extension (`README`, `photo.`, `v1.0/raw`) get `.webp` appended.
///
/// Only the last segment is stripped: `my.photo.tar` becomes `my.photo.webp`.
pub fn webp_file_name(name: &str) -> String {
    let stem = match name.rfind('.') {
        Some(dot) => {
            let ext = &name[dot + 1..];
            if ext.is_empty() || ext.contains('/') {
                name
            } else {
                &name[..dot]
            }
        }
        None => name,
    };

    let mut out = String::with_capacity(stem.len() + WEBP_EXTENSION.len());
    out.push_str(stem);
    out.push_str(WEBP_EXTENSION);
    out
}
