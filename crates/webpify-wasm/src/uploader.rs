//! The upload widget state, exported to JavaScript as `WebpUploader`.
//!
//! The host page renders the list and wires buttons to these methods.
//!
//! # Example
//!
//! ```typescript
//! import init, { WebpUploader } from '@webpify/wasm';
//!
//! await init();
//! const uploader = new WebpUploader({ maxFileSize: 5 * 1024 * 1024 });
//!
//! input.addEventListener('change', async () => {
//!   await uploader.addFiles(input.files);
//!   for (let i = 0; i < uploader.count(); i++) {
//!     render(uploader.previewUrl(i), uploader.sizeLabel(i));
//!   }
//!   button.textContent = uploader.uploadLabel();
//!   button.disabled = !uploader.canUpload();
//! });
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;
use web_sys::FileList;
use webpify_core::{display, ConvertedImage, ConverterConfig, NativeCodec, UploadController};

use crate::browser::{alert, browser_files, AnchorDownload, ObjectUrl, ObjectUrlStore};

type BrowserController = UploadController<NativeCodec, ObjectUrlStore>;

const BUSY: &str = "A batch of files is still being converted";

/// Parse an optional JS config object; `undefined`/`null` means defaults.
fn config_from_js(value: JsValue) -> Result<ConverterConfig, JsValue> {
    if value.is_undefined() || value.is_null() {
        return Ok(ConverterConfig::default());
    }
    serde_wasm_bindgen::from_value(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Image list plus the actions on it.
///
/// While `addFiles` is running the controller is moved into the pending
/// batch, so every other method fails with a "busy" error until it settles.
#[wasm_bindgen]
pub struct WebpUploader {
    inner: Rc<RefCell<Option<BrowserController>>>,
}

impl WebpUploader {
    fn with<R>(&self, f: impl FnOnce(&BrowserController) -> R) -> Result<R, JsValue> {
        self.inner
            .borrow()
            .as_ref()
            .map(f)
            .ok_or_else(|| JsValue::from_str(BUSY))
    }

    fn with_mut<R>(&self, f: impl FnOnce(&mut BrowserController) -> R) -> Result<R, JsValue> {
        self.inner
            .borrow_mut()
            .as_mut()
            .map(f)
            .ok_or_else(|| JsValue::from_str(BUSY))
    }

    fn with_image<R>(
        &self,
        index: usize,
        f: impl FnOnce(&ConvertedImage<ObjectUrl>) -> R,
    ) -> Result<Option<R>, JsValue> {
        self.with(|c| c.get(index).map(f))
    }
}

#[wasm_bindgen]
impl WebpUploader {
    /// Create an uploader. `config` is optional: `{ maxFileSize, mediaTypePrefix }`.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<WebpUploader, JsValue> {
        let config = config_from_js(config)?;
        let controller = UploadController::new(
            webpify_core::ImageConverter::native(config),
            ObjectUrlStore,
        );
        Ok(WebpUploader {
            inner: Rc::new(RefCell::new(Some(controller))),
        })
    }

    /// Convert the selected files one by one and append the successes.
    ///
    /// Shows one alert per skipped file. Resolves to the number of images
    /// added.
    #[wasm_bindgen(js_name = addFiles)]
    pub fn add_files(&self, files: &FileList) -> Result<js_sys::Promise, JsValue> {
        let mut controller = self
            .inner
            .borrow_mut()
            .take()
            .ok_or_else(|| JsValue::from_str(BUSY))?;
        let files = browser_files(files);
        let slot = Rc::clone(&self.inner);

        Ok(future_to_promise(async move {
            let report = controller.add_files(files).await;
            *slot.borrow_mut() = Some(controller);

            for notice in &report.notices {
                alert(&notice.to_string());
            }
            Ok(JsValue::from(report.added as u32))
        }))
    }

    /// Number of converted images.
    pub fn count(&self) -> Result<usize, JsValue> {
        self.with(|c| c.len())
    }

    /// `blob:` URL of the original file, for the preview thumbnail.
    #[wasm_bindgen(js_name = previewUrl)]
    pub fn preview_url(&self, index: usize) -> Result<Option<String>, JsValue> {
        self.with_image(index, |img| img.preview.as_str().to_string())
    }

    /// Name the converted file will be saved under.
    #[wasm_bindgen(js_name = fileName)]
    pub fn file_name(&self, index: usize) -> Result<Option<String>, JsValue> {
        self.with_image(index, |img| img.derived_name.clone())
    }

    #[wasm_bindgen(js_name = originalName)]
    pub fn original_name(&self, index: usize) -> Result<Option<String>, JsValue> {
        self.with_image(index, |img| img.original_name.clone())
    }

    /// Converted size, e.g. `"0.42 MB"`.
    #[wasm_bindgen(js_name = sizeLabel)]
    pub fn size_label(&self, index: usize) -> Result<Option<String>, JsValue> {
        self.with_image(index, |img| display::size_label(img.size_bytes))
    }

    #[wasm_bindgen(js_name = uploadLabel)]
    pub fn upload_label(&self) -> Result<String, JsValue> {
        self.with(|c| c.upload_label())
    }

    /// Combined converted size of the list, e.g. `"1.37 MB"`.
    #[wasm_bindgen(js_name = totalSizeLabel)]
    pub fn total_size_label(&self) -> Result<String, JsValue> {
        self.with(|c| c.total_size_label())
    }

    #[wasm_bindgen(js_name = canUpload)]
    pub fn can_upload(&self) -> Result<bool, JsValue> {
        self.with(|c| c.can_upload())
    }

    /// Remove one image and revoke its preview URL.
    pub fn remove(&self, index: usize) -> Result<bool, JsValue> {
        self.with_mut(|c| c.remove(index))
    }

    /// Download every converted image, then clear the list.
    ///
    /// Resolves to the number of files handed to the browser. An empty list
    /// is a no-op.
    pub fn upload(&self) -> Result<usize, JsValue> {
        self.with_mut(|c| c.upload(&mut AnchorDownload).delivered)
    }

    /// `{ files: [{ name, mediaType, bytes }] }` for a server upload.
    pub fn payload(&self) -> Result<JsValue, JsValue> {
        let value = self.with(|c| serde_wasm_bindgen::to_value(&c.payload()))?;
        value.map_err(|e| JsValue::from_str(&e.to_string()))
    }
}
