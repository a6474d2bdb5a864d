//! Application mode state machine. Transitions are pure so they can be
//! tested without any UI; the app shell feeds events in and renders
//! whatever mode comes out.

pub mod editor;

use tracing::debug;

/// What the studio is currently doing with pointer input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    /// Idle: hover highlights items, click opens their editor
    Select,
    /// A preview item follows the cursor; click commits it
    Place,
    TextCreate,
    TextEdit,
    ImageCreate,
    ImageEdit,
    /// Export dialog is open; viewport input is ignored
    Export,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    NewText,
    NewImage,
    EditText,
    EditImage,
    EditorSubmitted,
    EditorCancelled,
    PlacementCommitted,
    PlacementCancelled,
    ExportRequested,
    ExportFinished,
}

/// Next mode for an event in the current mode. Events that make no
/// sense in the current mode leave it unchanged.
pub fn transition(mode: AppMode, event: AppEvent) -> AppMode {
    use AppEvent::*;
    use AppMode::*;

    let next = match (mode, event) {
        (Select, NewText) => TextCreate,
        (Select, NewImage) => ImageCreate,
        (Select, EditText) => TextEdit,
        (Select, EditImage) => ImageEdit,
        (Select, ExportRequested) => Export,

        // Create dialogs hand off to placement on submit
        (TextCreate | ImageCreate, EditorSubmitted) => Place,
        (TextCreate | ImageCreate, EditorCancelled) => Select,

        // Edit dialogs apply in place; no re-placement
        (TextEdit | ImageEdit, EditorSubmitted | EditorCancelled) => Select,

        (Place, PlacementCommitted | PlacementCancelled) => Select,

        (Export, ExportFinished) => Select,

        (mode, _) => mode,
    };

    if next != mode {
        debug!(?mode, ?event, ?next, "mode transition");
    }
    next
}
