//! Staging list of images attached to a product form before submission.

use crate::types::ImageHandle;

/// Ordered, unvalidated list of draft images.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DraftImageBuffer {
    images: Vec<ImageHandle>,
}

impl DraftImageBuffer {
    /// Empty buffer.
    #[must_use]
    pub const fn new() -> Self {
        Self { images: Vec::new() }
    }

    /// Append an image.
    pub fn attach(&mut self, image: ImageHandle) {
        self.images.push(image);
    }

    /// Remove the image at `index`. Out-of-range indexes are ignored.
    ///
    /// Returns the removed image, if any.
    pub fn detach(&mut self, index: usize) -> Option<ImageHandle> {
        (index < self.images.len()).then(|| self.images.remove(index))
    }

    /// Remove every image.
    pub fn reset(&mut self) {
        self.images.clear();
    }

    /// Attached images, in attach order.
    #[must_use]
    pub fn images(&self) -> &[ImageHandle] {
        &self.images
    }

    /// Number of attached images.
    #[must_use]
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Whether no image is attached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}
