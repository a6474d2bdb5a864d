//! Item editor controller: owns the draft options while a create/edit
//! dialog is open and decides when they may be submitted.

use shared::{ContentOptions, EditorMode, ItemId, ItemKind, TextOptions};

/// A draft accepted by [`ItemEditorController::submit`]
pub struct Submission {
    pub mode: EditorMode,
    /// Target item when updating an existing one
    pub item_id: Option<ItemId>,
    pub options: ContentOptions,
}

/// Dialog state for the text/image editors. One controller serves both
/// kinds; the draft's variant tells them apart.
pub struct ItemEditorController {
    draft: Option<ContentOptions>,
    mode: EditorMode,
    item_id: Option<ItemId>,
}

impl Default for ItemEditorController {
    fn default() -> Self {
        Self {
            draft: None,
            mode: EditorMode::Create,
            item_id: None,
        }
    }
}

impl ItemEditorController {
    /// Open a create dialog with default options for the kind
    pub fn open_create(&mut self, kind: ItemKind) {
        self.mode = EditorMode::Create;
        self.item_id = None;
        self.draft = Some(match kind {
            ItemKind::Text => ContentOptions::Text(TextOptions::default()),
            ItemKind::Image => ContentOptions::Image(shared::ImageOptions::new(
                shared::ImageData::solid(1, 1, [255, 255, 255, 255]),
            )),
        });
    }

    /// Open an edit dialog seeded with an existing item's options
    pub fn open_update(&mut self, item_id: ItemId, options: ContentOptions) {
        self.mode = EditorMode::Update;
        self.item_id = Some(item_id);
        self.draft = Some(options);
    }

    pub fn is_open(&self) -> bool {
        self.draft.is_some()
    }

    pub fn mode(&self) -> EditorMode {
        self.mode
    }

    pub fn kind(&self) -> Option<ItemKind> {
        self.draft.as_ref().map(ContentOptions::kind)
    }

    pub fn draft_mut(&mut self) -> Option<&mut ContentOptions> {
        self.draft.as_mut()
    }

    /// Whether the current draft is submittable: text items need
    /// non-whitespace content, image items need real pixels.
    pub fn can_submit(&self) -> bool {
        match &self.draft {
            Some(ContentOptions::Text(t)) => !t.text.trim().is_empty(),
            Some(ContentOptions::Image(i)) => {
                i.source.width > 1 || i.source.height > 1
            }
            None => false,
        }
    }

    /// Take the draft out as a submission and close the dialog.
    /// Returns None (dialog stays open) when the draft is incomplete.
    pub fn submit(&mut self) -> Option<Submission> {
        if !self.can_submit() {
            return None;
        }
        let options = self.draft.take()?;
        Some(Submission {
            mode: self.mode,
            item_id: self.item_id.take(),
            options,
        })
    }

    /// Put a submission back and reopen the dialog, e.g. after the
    /// studio failed to act on it
    pub fn restore(&mut self, submission: Submission) {
        self.mode = submission.mode;
        self.item_id = submission.item_id;
        self.draft = Some(submission.options);
    }

    /// Discard the draft and close the dialog
    pub fn cancel(&mut self) {
        self.draft = None;
        self.item_id = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{ImageData, ImageOptions};

    #[test]
    fn test_empty_text_cannot_submit() {
        let mut editor = ItemEditorController::default();
        editor.open_create(ItemKind::Text);
        assert!(editor.is_open());
        assert!(!editor.can_submit());
        assert!(editor.submit().is_none());
        // Dialog stays open with the draft intact
        assert!(editor.is_open());

        if let Some(ContentOptions::Text(t)) = editor.draft_mut() {
            t.text = "Hello".to_string();
        }
        let submission = editor.submit().unwrap();
        assert_eq!(submission.mode, EditorMode::Create);
        assert!(submission.item_id.is_none());
        assert!(!editor.is_open());
    }

    #[test]
    fn test_whitespace_only_text_cannot_submit() {
        let mut editor = ItemEditorController::default();
        editor.open_create(ItemKind::Text);
        if let Some(ContentOptions::Text(t)) = editor.draft_mut() {
            t.text = "  \t ".to_string();
        }
        assert!(!editor.can_submit());
    }

    #[test]
    fn test_placeholder_image_cannot_submit() {
        let mut editor = ItemEditorController::default();
        editor.open_create(ItemKind::Image);
        assert!(!editor.can_submit());

        if let Some(ContentOptions::Image(i)) = editor.draft_mut() {
            i.source = ImageData::solid(16, 16, [5, 5, 5, 255]);
        }
        assert!(editor.can_submit());
    }

    #[test]
    fn test_update_carries_target_id() {
        let mut editor = ItemEditorController::default();
        let options = ContentOptions::Image(ImageOptions::new(ImageData::solid(
            8,
            8,
            [0, 0, 0, 255],
        )));
        editor.open_update("item-1".to_string(), options);
        assert_eq!(editor.mode(), EditorMode::Update);
        assert_eq!(editor.kind(), Some(ItemKind::Image));

        let submission = editor.submit().unwrap();
        assert_eq!(submission.item_id.as_deref(), Some("item-1"));
    }

    #[test]
    fn test_cancel_discards_draft() {
        let mut editor = ItemEditorController::default();
        editor.open_create(ItemKind::Text);
        editor.cancel();
        assert!(!editor.is_open());
        assert!(editor.submit().is_none());
    }
}
