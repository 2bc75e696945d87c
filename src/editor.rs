//! Client side of the document editor: talks to the document API, keeps the
//! host's editing surface loaded, and autosaves edits after a quiet period.

mod api;
mod content;
mod debounce;
mod session;
mod view;

pub use api::{ClientError, DocumentApi, HttpDocumentApi};
pub use content::{
    letter_template, resolve_content, sort_newest_first, word_export, LOAD_ERROR_HTML,
    PLACEHOLDER_HTML,
};
pub use debounce::Debouncer;
pub use session::{
    EditorSession, SaveState, SessionState, STATUS_LOADED, STATUS_LOADING, STATUS_LOAD_FAILED,
    STATUS_SAVED, STATUS_SAVE_FAILED, STATUS_SAVING, STATUS_UNSAVED,
};
pub use view::{EditorView, ExportedFile, FormatCommand};
