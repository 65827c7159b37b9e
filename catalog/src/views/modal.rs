/// A dialog that is either closed or showing its content
#[derive(Clone, Debug, PartialEq)]
pub struct Modal<T> {
    content: Option<T>,
}

impl<T> Modal<T> {
    /// A closed modal
    #[must_use]
    pub const fn closed() -> Self {
        Self { content: None }
    }

    /// Show `content`, replacing whatever was shown
    pub fn open(&mut self, content: T) {
        self.content = Some(content);
    }

    /// Hide the modal and hand back its content
    pub fn close(&mut self) -> Option<T> {
        self.content.take()
    }

    /// Whether the modal is showing
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.content.is_some()
    }

    /// The shown content
    #[must_use]
    pub const fn content(&self) -> Option<&T> {
        self.content.as_ref()
    }

    /// The shown content, mutably
    pub fn content_mut(&mut self) -> Option<&mut T> {
        self.content.as_mut()
    }
}

impl<T> Default for Modal<T> {
    fn default() -> Self {
        Self::closed()
    }
}
