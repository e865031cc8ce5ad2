//! Batch driver and owner of the image list.
//!
//! Files from one selection are converted one after another. Failures become
//! [`Notice`]s and the batch carries on; successes are appended in input
//! order once the whole batch has settled.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::codec::{ImageCodec, NativeCodec};
use crate::converter::{ConvertedImage, EncodedBlob, ImageConverter};
use crate::display;
use crate::error::Notice;
use crate::list::ImageList;
use crate::reference::{MemoryReferenceStore, ReferenceStore};
use crate::source::SourceFile;
use crate::ConverterConfig;

/// Result of one [`UploadController::add_files`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Number of images appended to the list.
    pub added: usize,
    /// One notice per file that was skipped, in input order.
    pub notices: Vec<Notice>,
}

/// Result of one [`UploadController::upload`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadReport {
    /// Files handed to the sink successfully.
    pub delivered: usize,
    /// `(file name, cause)` for each delivery the sink rejected.
    pub failed: Vec<(String, String)>,
}

/// One file handed to a [`DownloadSink`].
#[derive(Debug)]
pub struct Download<'a, H> {
    /// Transient reference to the encoded blob; released after the call.
    pub reference: &'a H,
    /// Name to save the file under.
    pub file_name: &'a str,
    pub blob: &'a EncodedBlob,
}

/// Destination for uploaded files (a synthetic browser download today).
pub trait DownloadSink<H> {
    fn deliver(&mut self, download: Download<'_, H>) -> Result<(), String>;
}

/// One `(name, bytes)` pair of an upload request body.
#[derive(Debug, Serialize)]
pub struct UploadItem<'a> {
    pub name: &'a str,
    pub media_type: &'a str,
    pub bytes: &'a [u8],
}

/// What a server endpoint would receive for the current list.
#[derive(Debug, Serialize)]
pub struct UploadPayload<'a> {
    pub files: Vec<UploadItem<'a>>,
}

/// Owns the converter, the reference store and the image list.
///
/// Every entry in the list holds exactly one preview reference from the
/// store. It is released when the entry is removed, uploaded, or when the
/// controller is dropped.
pub struct UploadController<C: ImageCodec, S: ReferenceStore> {
    converter: ImageConverter<C>,
    store: S,
    images: ImageList<S::Handle>,
}

impl UploadController<NativeCodec, MemoryReferenceStore> {
    /// Controller with the native codec and an in-memory store.
    pub fn in_memory(config: ConverterConfig) -> Self {
        Self::new(ImageConverter::native(config), MemoryReferenceStore::new())
    }
}

impl<C: ImageCodec, S: ReferenceStore> UploadController<C, S> {
    pub fn new(converter: ImageConverter<C>, store: S) -> Self {
        Self {
            converter,
            store,
            images: ImageList::new(),
        }
    }

    /// Convert a batch of files sequentially and append the successes.
    ///
    /// File N+1 is not started until file N has settled. The list is only
    /// touched once, after the last file, so it never shows a partial batch.
    pub async fn add_files<F, I>(&mut self, files: I) -> BatchReport
    where
        F: SourceFile,
        I: IntoIterator<Item = F>,
    {
        let mut converted = Vec::new();
        let mut notices = Vec::new();

        for file in files {
            match self.converter.convert(&file, &mut self.store).await {
                Ok(image) => converted.push(image),
                Err(e) => {
                    warn!("Skipping file: {}", e);
                    notices.push(e.notice());
                }
            }
        }

        let added = converted.len();
        self.images.extend(converted);
        info!(
            "Batch finished: {} added, {} skipped, {} in list",
            added,
            notices.len(),
            self.images.len()
        );

        BatchReport { added, notices }
    }

    /// Remove the entry at `index` and release its preview.
    ///
    /// Returns `false` (and does nothing) if `index` is out of range.
    pub fn remove(&mut self, index: usize) -> bool {
        match self.images.remove(index) {
            Some(image) => {
                debug!("Removed {} at {}", image.derived_name, index);
                self.store.release(image.preview);
                true
            }
            None => false,
        }
    }

    /// Hand every entry to `sink`, then clear the list.
    ///
    /// Each entry gets its own transient reference to the encoded blob, which
    /// is released right after the sink returns, whether or not it succeeded.
    /// An empty list is a no-op and the sink is never called.
    pub fn upload<K: DownloadSink<S::Handle>>(&mut self, sink: &mut K) -> UploadReport {
        let mut report = UploadReport::default();
        if self.images.is_empty() {
            return report;
        }

        info!("Uploading {} WebP file(s)", self.images.len());

        for image in self.images.iter() {
            let name = image.derived_name.as_str();
            let reference = match self.store.create(&image.blob.bytes, &image.blob.media_type) {
                Ok(reference) => reference,
                Err(e) => {
                    warn!("No download reference for {}: {}", name, e);
                    report.failed.push((name.to_string(), e.to_string()));
                    continue;
                }
            };

            let result = sink.deliver(Download {
                reference: &reference,
                file_name: name,
                blob: &image.blob,
            });
            self.store.release(reference);

            match result {
                Ok(()) => report.delivered += 1,
                Err(cause) => {
                    warn!("Delivery of {} failed: {}", name, cause);
                    report.failed.push((name.to_string(), cause));
                }
            }
        }

        self.clear();
        report
    }

    /// Remove every entry and release all previews.
    pub fn clear(&mut self) {
        for image in self.images.drain() {
            self.store.release(image.preview);
        }
    }

    /// Request body a real upload endpoint would receive.
    pub fn payload(&self) -> UploadPayload<'_> {
        UploadPayload {
            files: self
                .images
                .iter()
                .map(|image| UploadItem {
                    name: &image.derived_name,
                    media_type: &image.blob.media_type,
                    bytes: &image.blob.bytes,
                })
                .collect(),
        }
    }

    pub fn images(&self) -> &ImageList<S::Handle> {
        &self.images
    }

    pub fn get(&self, index: usize) -> Option<&ConvertedImage<S::Handle>> {
        self.images.get(index)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Upload is only offered when there is something to upload.
    pub fn can_upload(&self) -> bool {
        !self.images.is_empty()
    }

    pub fn upload_label(&self) -> String {
        display::upload_label(self.images.len())
    }

    /// Encoded size of everything in the list, e.g. `"1.37 MB"`.
    pub fn total_size_label(&self) -> String {
        display::size_label(self.images.total_bytes())
    }

    pub fn config(&self) -> &ConverterConfig {
        self.converter.config()
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<C: ImageCodec, S: ReferenceStore> Drop for UploadController<C, S> {
    fn drop(&mut self) {
        self.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::is_webp;
    use crate::reference::ReferenceId;
    use crate::source::MemoryFile;
    use image::codecs::png::PngEncoder;
    use image::{ExtendedColorType, ImageEncoder};
    use pollster::block_on;

    fn png_file(name: &str, side: u32) -> MemoryFile {
        let pixels = vec![200u8; (side * side * 4) as usize];
        let mut out = Vec::new();
        PngEncoder::new(&mut out)
            .write_image(&pixels, side, side, ExtendedColorType::Rgba8)
            .unwrap();
        MemoryFile::new(name, "image/png", out)
    }

    fn text_file(name: &str) -> MemoryFile {
        MemoryFile::new(name, "text/plain", b"hello".to_vec())
    }

    /// Records each delivery and optionally rejects some names.
    #[derive(Default)]
    struct RecordingSink {
        delivered: Vec<(String, u64, Vec<u8>)>,
        reject: Vec<String>,
    }

    impl DownloadSink<ReferenceId> for RecordingSink {
        fn deliver(&mut self, download: Download<'_, ReferenceId>) -> Result<(), String> {
            if self.reject.iter().any(|n| n == download.file_name) {
                return Err("disk full".to_string());
            }
            self.delivered.push((
                download.file_name.to_string(),
                download.reference.get(),
                download.blob.bytes.clone(),
            ));
            Ok(())
        }
    }

    fn controller() -> UploadController<NativeCodec, MemoryReferenceStore> {
        UploadController::in_memory(ConverterConfig::default())
    }

    fn names(ctl: &UploadController<NativeCodec, MemoryReferenceStore>) -> Vec<String> {
        ctl.images()
            .iter()
            .map(|img| img.derived_name.clone())
            .collect()
    }

    #[test]
    fn test_failures_skipped_order_kept() {
        let mut ctl = controller();
        let files = vec![png_file("A.png", 4), text_file("B.txt"), png_file("C.gif.png", 2)];

        let report = block_on(ctl.add_files(files));

        assert_eq!(report.added, 2);
        assert_eq!(
            report.notices,
            vec![Notice::NotAnImage {
                file_name: "B.txt".to_string()
            }]
        );
        assert_eq!(names(&ctl), ["A.webp", "C.gif.webp"]);
        assert_eq!(ctl.store().live_count(), 2);
    }

    #[test]
    fn test_batches_append() {
        let mut ctl = controller();
        block_on(ctl.add_files(vec![png_file("one.png", 2)]));
        block_on(ctl.add_files(vec![png_file("two.png", 2), png_file("three.png", 2)]));

        assert_eq!(names(&ctl), ["one.webp", "two.webp", "three.webp"]);
    }

    #[test]
    fn test_one_notice_per_failing_file() {
        let mut ctl = controller();
        let limit = ctl.config().max_file_size as usize;
        let files = vec![
            text_file("a.txt"),
            MemoryFile::new("huge.png", "image/png", vec![0u8; limit + 1]),
            MemoryFile::new("broken.png", "image/png", b"\x89PNG garbage".to_vec()),
        ];

        let report = block_on(ctl.add_files(files));
        let messages: Vec<String> = report.notices.iter().map(|n| n.to_string()).collect();

        assert_eq!(report.added, 0);
        assert_eq!(
            messages,
            [
                "File a.txt is not an image.",
                "File huge.png is larger than 5MB.",
                "Error processing broken.png",
            ]
        );
        assert!(ctl.is_empty());
        assert_eq!(ctl.store().created_count(), 0);
    }

    #[test]
    fn test_empty_batch() {
        let mut ctl = controller();
        let report = block_on(ctl.add_files(Vec::<MemoryFile>::new()));
        assert_eq!(report, BatchReport::default());
        assert!(!ctl.can_upload());
    }

    #[test]
    fn test_remove_releases_preview() {
        let mut ctl = controller();
        block_on(ctl.add_files(vec![
            png_file("a.png", 2),
            png_file("b.png", 2),
            png_file("c.png", 2),
        ]));

        assert!(ctl.remove(1));
        assert_eq!(names(&ctl), ["a.webp", "c.webp"]);
        assert_eq!(ctl.store().live_count(), 2);
        assert_eq!(ctl.store().released_count(), 1);
    }

    #[test]
    fn test_remove_out_of_range_is_noop() {
        let mut ctl = controller();
        block_on(ctl.add_files(vec![png_file("a.png", 2)]));

        assert!(!ctl.remove(5));
        assert_eq!(ctl.len(), 1);
        assert_eq!(ctl.store().released_count(), 0);
    }

    #[test]
    fn test_upload_delivers_and_clears() {
        let mut ctl = controller();
        block_on(ctl.add_files(vec![png_file("a.png", 3), png_file("b.jpeg.png", 3)]));
        let mut sink = RecordingSink::default();

        let report = ctl.upload(&mut sink);

        assert_eq!(report.delivered, 2);
        assert!(report.failed.is_empty());
        let delivered: Vec<&str> = sink.delivered.iter().map(|d| d.0.as_str()).collect();
        assert_eq!(delivered, ["a.webp", "b.jpeg.webp"]);
        assert!(sink.delivered.iter().all(|d| is_webp(&d.2)));

        assert!(ctl.is_empty());
        assert!(!ctl.can_upload());
        // 2 previews + 2 transient download references, all released
        assert_eq!(ctl.store().created_count(), 4);
        assert_eq!(ctl.store().live_count(), 0);
    }

    #[test]
    fn test_upload_uses_fresh_transient_references() {
        let mut ctl = controller();
        block_on(ctl.add_files(vec![png_file("a.png", 2)]));
        let preview_id = ctl.get(0).unwrap().preview.get();
        let mut sink = RecordingSink::default();

        ctl.upload(&mut sink);

        assert_ne!(sink.delivered[0].1, preview_id);
    }

    #[test]
    fn test_upload_empty_is_noop() {
        let mut ctl = controller();
        let mut sink = RecordingSink::default();

        let report = ctl.upload(&mut sink);

        assert_eq!(report, UploadReport::default());
        assert!(sink.delivered.is_empty());
        assert_eq!(ctl.store().created_count(), 0);
    }

    #[test]
    fn test_upload_sink_failure_still_releases_and_clears() {
        let mut ctl = controller();
        block_on(ctl.add_files(vec![png_file("a.png", 2), png_file("b.png", 2)]));
        let mut sink = RecordingSink {
            reject: vec!["a.webp".to_string()],
            ..Default::default()
        };

        let report = ctl.upload(&mut sink);

        assert_eq!(report.delivered, 1);
        assert_eq!(
            report.failed,
            vec![("a.webp".to_string(), "disk full".to_string())]
        );
        assert!(ctl.is_empty());
        assert_eq!(ctl.store().live_count(), 0);
    }

    #[test]
    fn test_payload_shape() {
        let mut ctl = controller();
        block_on(ctl.add_files(vec![png_file("x.png", 2), png_file("y.png", 2)]));

        let payload = ctl.payload();
        let names: Vec<&str> = payload.files.iter().map(|f| f.name).collect();
        assert_eq!(names, ["x.webp", "y.webp"]);
        assert!(payload.files.iter().all(|f| f.media_type == "image/webp"));
        assert!(payload.files.iter().all(|f| is_webp(f.bytes)));
    }

    #[test]
    fn test_upload_label_tracks_list() {
        let mut ctl = controller();
        assert_eq!(ctl.upload_label(), "Upload 0 WebP Images");
        block_on(ctl.add_files(vec![png_file("a.png", 2)]));
        assert_eq!(ctl.upload_label(), "Upload 1 WebP Image");
    }

    #[test]
    fn test_total_size_label_sums_entries() {
        let mut ctl = controller();
        assert_eq!(ctl.total_size_label(), "0.00 MB");
        block_on(ctl.add_files(vec![png_file("a.png", 2), png_file("b.png", 2)]));

        let total: u64 = ctl.images().iter().map(|img| img.size_bytes).sum();
        assert!(total > 0);
        assert_eq!(ctl.images().total_bytes(), total);
        assert_eq!(ctl.total_size_label(), display::size_label(total));
    }

    #[test]
    fn test_clear_releases_everything() {
        let mut ctl = controller();
        block_on(ctl.add_files(vec![png_file("a.png", 2), png_file("b.png", 2)]));

        ctl.clear();
        assert!(ctl.is_empty());
        assert_eq!(ctl.store().live_count(), 0);
    }

    /// Store whose counters outlive the controller that owns it.
    #[derive(Default, Clone)]
    struct SharedStore(std::rc::Rc<std::cell::RefCell<MemoryReferenceStore>>);

    impl ReferenceStore for SharedStore {
        type Handle = ReferenceId;

        fn create(
            &mut self,
            bytes: &[u8],
            media_type: &str,
        ) -> Result<ReferenceId, crate::reference::ReferenceError> {
            self.0.borrow_mut().create(bytes, media_type)
        }

        fn release(&mut self, handle: ReferenceId) {
            self.0.borrow_mut().release(handle)
        }
    }

    /// Store that refuses to create more than `allow` references in total.
    struct LimitedStore {
        inner: MemoryReferenceStore,
        allow: u64,
    }

    impl LimitedStore {
        fn new(allow: u64) -> Self {
            Self {
                inner: MemoryReferenceStore::new(),
                allow,
            }
        }
    }

    impl ReferenceStore for LimitedStore {
        type Handle = ReferenceId;

        fn create(
            &mut self,
            bytes: &[u8],
            media_type: &str,
        ) -> Result<ReferenceId, crate::reference::ReferenceError> {
            if self.inner.created_count() >= self.allow {
                return Err(crate::reference::ReferenceError::CreateFailed(
                    "out of object URLs".to_string(),
                ));
            }
            self.inner.create(bytes, media_type)
        }

        fn release(&mut self, handle: ReferenceId) {
            self.inner.release(handle)
        }
    }

    fn limited_controller(allow: u64) -> UploadController<NativeCodec, LimitedStore> {
        UploadController::new(
            ImageConverter::native(ConverterConfig::default()),
            LimitedStore::new(allow),
        )
    }

    #[test]
    fn test_preview_failure_becomes_processing_notice() {
        let mut ctl = limited_controller(1);

        let report = block_on(ctl.add_files(vec![png_file("a.png", 2), png_file("b.png", 2)]));

        assert_eq!(report.added, 1);
        let messages: Vec<String> = report.notices.iter().map(|n| n.to_string()).collect();
        assert_eq!(messages, ["Error processing b.png"]);
        assert_eq!(ctl.len(), 1);
        assert_eq!(ctl.store().inner.live_count(), 1);
    }

    #[test]
    fn test_preview_failure_leaves_no_reference() {
        let mut ctl = limited_controller(0);

        let report = block_on(ctl.add_files(vec![png_file("a.png", 2)]));

        assert_eq!(report.added, 0);
        assert_eq!(
            report.notices,
            vec![Notice::ProcessingFailed {
                file_name: "a.png".to_string()
            }]
        );
        assert!(ctl.is_empty());
        assert_eq!(ctl.store().inner.live_count(), 0);
    }

    #[test]
    fn test_upload_without_download_reference_still_clears() {
        // Two previews fit, the transient download references do not
        let mut ctl = limited_controller(2);
        block_on(ctl.add_files(vec![png_file("a.png", 2), png_file("b.png", 2)]));
        assert_eq!(ctl.len(), 2);

        let mut sink = RecordingSink::default();
        let report = ctl.upload(&mut sink);

        assert_eq!(report.delivered, 0);
        let failed: Vec<&str> = report.failed.iter().map(|f| f.0.as_str()).collect();
        assert_eq!(failed, ["a.webp", "b.webp"]);
        assert!(report.failed.iter().all(|f| f.1.contains("out of object URLs")));
        assert!(sink.delivered.is_empty());

        assert!(ctl.is_empty());
        assert_eq!(ctl.store().inner.live_count(), 0);
        assert_eq!(ctl.store().inner.released_count(), 2);
    }

    #[test]
    fn test_drop_releases_previews() {
        let store = SharedStore::default();
        {
            let mut ctl = UploadController::new(
                ImageConverter::native(ConverterConfig::default()),
                store.clone(),
            );
            block_on(ctl.add_files(vec![png_file("a.png", 2), png_file("b.png", 2)]));
            assert_eq!(store.0.borrow().live_count(), 2);
        }
        assert_eq!(store.0.borrow().live_count(), 0);
        assert_eq!(store.0.borrow().released_count(), 2);
    }
}
