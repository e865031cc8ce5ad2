//! Ordered list of converted images.

use crate::converter::ConvertedImage;

/// Converted images in display order (the order they were processed).
///
/// The list only holds entries; releasing their preview references is the
/// job of whoever removes them (see [`crate::UploadController`]).
#[derive(Debug)]
pub struct ImageList<H> {
    entries: Vec<ConvertedImage<H>>,
}

impl<H> Default for ImageList<H> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<H> ImageList<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a batch, keeping its order.
    pub fn extend(&mut self, batch: impl IntoIterator<Item = ConvertedImage<H>>) {
        self.entries.extend(batch);
    }

    /// Remove the entry at `index`, shifting later entries down.
    ///
    /// Returns `None` if `index` is out of range.
    pub fn remove(&mut self, index: usize) -> Option<ConvertedImage<H>> {
        (index < self.entries.len()).then(|| self.entries.remove(index))
    }

    /// Take every entry out, leaving the list empty.
    pub fn drain(&mut self) -> impl Iterator<Item = ConvertedImage<H>> + '_ {
        self.entries.drain(..)
    }

    pub fn get(&self, index: usize) -> Option<&ConvertedImage<H>> {
        self.entries.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ConvertedImage<H>> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of the encoded sizes of all entries.
    pub fn total_bytes(&self) -> u64 {
        self.entries.iter().map(|img| img.size_bytes).sum()
    }
}

impl<'a, H> IntoIterator for &'a ImageList<H> {
    type Item = &'a ConvertedImage<H>;
    type IntoIter = std::slice::Iter<'a, ConvertedImage<H>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
