//! Browser implementations of the core platform traits.
//!
//! - [`BrowserFile`] reads a picked `File` through `Blob.arrayBuffer()`
//! - [`ObjectUrlStore`] hands out `blob:` URLs and revokes them
//! - [`AnchorDownload`] saves a file with a synthetic `<a download>` click

use std::future::Future;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Blob, BlobPropertyBag, File, FileList, HtmlAnchorElement, Url};
use webpify_core::{Download, DownloadSink, ReferenceError, ReferenceStore, SourceFile};

/// A file from an `<input type="file">` selection.
pub struct BrowserFile {
    file: File,
    name: String,
    media_type: String,
}

impl BrowserFile {
    pub fn new(file: File) -> Self {
        let name = file.name();
        let media_type = file.type_();
        Self {
            file,
            name,
            media_type,
        }
    }
}

impl SourceFile for BrowserFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn media_type(&self) -> &str {
        &self.media_type
    }

    fn size(&self) -> u64 {
        self.file.size() as u64
    }

    fn read(&self) -> impl Future<Output = Result<Vec<u8>, String>> {
        read_blob_bytes(self.file.clone().into())
    }
}

async fn read_blob_bytes(blob: Blob) -> Result<Vec<u8>, String> {
    let value = JsFuture::from(blob.array_buffer())
        .await
        .map_err(|e| js_error_text(&e, "file: read failed"))?;

    let buf = value
        .dyn_into::<js_sys::ArrayBuffer>()
        .map_err(|_| "file: expected ArrayBuffer".to_string())?;
    Ok(js_sys::Uint8Array::new(&buf).to_vec())
}

/// Collect a `FileList` into [`BrowserFile`]s, in selection order.
pub fn browser_files(list: &FileList) -> Vec<BrowserFile> {
    (0..list.length())
        .filter_map(|i| list.get(i))
        .map(BrowserFile::new)
        .collect()
}

/// A live `blob:` URL. Only [`ObjectUrlStore::release`] consumes it.
#[derive(Debug, PartialEq, Eq)]
pub struct ObjectUrl(String);

impl ObjectUrl {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// [`ReferenceStore`] backed by `URL.createObjectURL`.
#[derive(Debug, Default)]
pub struct ObjectUrlStore;

impl ReferenceStore for ObjectUrlStore {
    type Handle = ObjectUrl;

    fn create(&mut self, bytes: &[u8], media_type: &str) -> Result<ObjectUrl, ReferenceError> {
        let blob = make_blob(bytes, media_type)
            .map_err(|e| ReferenceError::CreateFailed(js_error_text(&e, "blob: failed to create")))?;
        Url::create_object_url_with_blob(&blob)
            .map(ObjectUrl)
            .map_err(|e| {
                ReferenceError::CreateFailed(js_error_text(&e, "url: create_object_url failed"))
            })
    }

    fn release(&mut self, handle: ObjectUrl) {
        if let Err(e) = Url::revoke_object_url(&handle.0) {
            tracing::warn!("Could not revoke {}: {}", handle.0, js_error_text(&e, "unknown"));
        }
    }
}

fn make_blob(bytes: &[u8], media_type: &str) -> Result<Blob, JsValue> {
    let array = js_sys::Uint8Array::from(bytes);
    let parts = js_sys::Array::new();
    parts.push(&array);

    let options = BlobPropertyBag::new();
    options.set_type(media_type);
    Blob::new_with_u8_array_sequence_and_options(&parts, &options)
}

/// [`DownloadSink`] that clicks a temporary `<a download>` element.
#[derive(Debug, Default)]
pub struct AnchorDownload;

impl DownloadSink<ObjectUrl> for AnchorDownload {
    fn deliver(&mut self, download: Download<'_, ObjectUrl>) -> Result<(), String> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or("no document".to_string())?;
        let body = document.body().ok_or("document: no body".to_string())?;

        let a = document
            .create_element("a")
            .map_err(|_| "document: create_element failed".to_string())?
            .dyn_into::<HtmlAnchorElement>()
            .map_err(|_| "document: anchor cast failed".to_string())?;

        a.set_href(download.reference.as_str());
        a.set_download(download.file_name);

        body.append_child(&a)
            .map_err(|_| "document: append_child failed".to_string())?;
        a.click();
        if let Err(e) = body.remove_child(&a) {
            tracing::warn!(
                "Could not remove download anchor for {}: {}",
                download.file_name,
                js_error_text(&e, "unknown")
            );
        }
        Ok(())
    }
}

/// Show a blocking notice to the user.
pub fn alert(message: &str) {
    match web_sys::window() {
        Some(window) => {
            if window.alert_with_message(message).is_err() {
                tracing::warn!("alert failed: {}", message);
            }
        }
        None => tracing::warn!("{}", message),
    }
}

/// Best-effort text for a thrown JS value.
pub(crate) fn js_error_text(value: &JsValue, fallback: &str) -> String {
    value
        .as_string()
        .or_else(|| {
            value
                .dyn_ref::<js_sys::Error>()
                .map(|e| String::from(e.message()))
        })
        .unwrap_or_else(|| fallback.to_string())
}
