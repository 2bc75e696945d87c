use std::{
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use chrono::Local;
use serde_json::json;

use super::{
    api::{ClientError, DocumentApi, HttpDocumentApi},
    content::{letter_template, resolve_content, sort_newest_first, word_export, LOAD_ERROR_HTML},
    debounce::Debouncer,
    view::{EditorView, FormatCommand},
};
use crate::{
    configuration::EditorSettings,
    document::{Document, DocumentChanges},
};

pub const STATUS_LOADING: &str = "Loading...";
pub const STATUS_LOADED: &str = "Loaded";
pub const STATUS_LOAD_FAILED: &str = "Error loading document";
pub const STATUS_UNSAVED: &str = "Unsaved changes...";
pub const STATUS_SAVING: &str = "Saving...";
pub const STATUS_SAVED: &str = "All changes saved";
pub const STATUS_SAVE_FAILED: &str = "Error saving!";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SaveState {
    #[default]
    NoDocument,
    Clean,
    Dirty,
    Saving,
    Failed,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub active_document_id: Option<String>,
    pub save_state: SaveState,
}

struct Shared<A, V> {
    api: A,
    view: Mutex<V>,
    state: Mutex<SessionState>,
}

impl<A: DocumentApi, V: EditorView> Shared<A, V> {
    fn view(&self) -> MutexGuard<'_, V> {
        self.view.lock().expect("editor view lock")
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().expect("session state lock")
    }

    fn transition(&self, save_state: SaveState, status: &str) {
        self.state().save_state = save_state;
        self.view().set_status(status);
    }

    async fn refresh_list(&self) {
        match self.api.list().await {
            Ok(mut documents) => {
                sort_newest_first(&mut documents);
                let active = self.state().active_document_id.clone();
                self.view().render_list(&documents, active.as_deref());
            }
            Err(error) => {
                tracing::warn!(?error, "failed to fetch document list");
                self.view().show_list_error("Offline / Server Error");
            }
        }
    }

    /// Pushes the title and surface content of the active document. A
    /// response landing after newer edits still marks the session clean.
    async fn save(&self) -> Result<Option<Document>, ClientError> {
        let Some(id) = self.state().active_document_id.clone() else {
            return Ok(None);
        };

        let changes = {
            let view = self.view();
            DocumentChanges {
                title: Some(view.title()),
                content: Some(json!({ "html": view.html() })),
            }
        };

        self.transition(SaveState::Saving, STATUS_SAVING);
        match self.api.update(&id, changes).await {
            Ok(document) => {
                tracing::debug!(%id, "document saved");
                self.transition(SaveState::Clean, STATUS_SAVED);
                Ok(Some(document))
            }
            Err(error) => {
                tracing::warn!(%id, ?error, "failed to save document");
                self.transition(SaveState::Failed, STATUS_SAVE_FAILED);
                Err(error)
            }
        }
    }
}

/// Editor state threaded through the UI event handlers: the active document,
/// the pending autosave and whether there are unsaved edits.
pub struct EditorSession<A, V> {
    shared: Arc<Shared<A, V>>,
    autosave: Debouncer,
}

impl<V: EditorView> EditorSession<HttpDocumentApi, V> {
    pub fn from_settings(settings: &EditorSettings, view: V) -> Result<Self, ClientError> {
        let api = HttpDocumentApi::new(&settings.api_url)?;
        Ok(Self::new(api, view, settings.autosave_debounce()))
    }
}

impl<A: DocumentApi, V: EditorView> EditorSession<A, V> {
    pub fn new(api: A, view: V, autosave_delay: Duration) -> Self {
        Self {
            shared: Arc::new(Shared {
                api,
                view: Mutex::new(view),
                state: Mutex::new(SessionState::default()),
            }),
            autosave: Debouncer::new(autosave_delay),
        }
    }

    pub fn state(&self) -> SessionState {
        self.shared.state().clone()
    }

    pub fn is_dirty(&self) -> bool {
        matches!(
            self.shared.state().save_state,
            SaveState::Dirty | SaveState::Failed
        )
    }

    pub fn autosave_pending(&self) -> bool {
        self.autosave.is_pending()
    }

    /// Runs `f` against the view, e.g. to apply user input before `edit`.
    pub fn with_view<R>(&self, f: impl FnOnce(&mut V) -> R) -> R {
        f(&mut self.shared.view())
    }

    pub async fn start(&self) {
        self.shared.refresh_list().await;
    }

    pub async fn refresh_list(&self) {
        self.shared.refresh_list().await;
    }

    /// Loads `id` into the surface. Loading the active document again does
    /// nothing. When the fetch fails no document stays active, so edits to
    /// the error placeholder are never saved and the same id can be retried.
    pub async fn load(&mut self, id: &str) {
        {
            let mut state = self.shared.state();
            if state.active_document_id.as_deref() == Some(id) {
                return;
            }
            state.active_document_id = Some(id.to_string());
        }
        self.shared.view().set_status(STATUS_LOADING);
        self.shared.refresh_list().await;

        match self.shared.api.get(id).await {
            Ok(document) => {
                {
                    let mut view = self.shared.view();
                    view.set_title(&document.title);
                    view.set_html(&resolve_content(&document.content));
                }
                self.shared.transition(SaveState::Clean, STATUS_LOADED);
                tracing::debug!(%id, "document loaded");
            }
            Err(error) => {
                tracing::warn!(%id, ?error, "failed to load document");
                self.shared.state().active_document_id = None;
                self.shared.view().set_html(LOAD_ERROR_HTML);
                self.shared.transition(SaveState::NoDocument, STATUS_LOAD_FAILED);
            }
        }
    }

    /// Records an edit to the title or surface and rearms the autosave.
    /// Without an active document there is nothing to save.
    pub fn edit(&mut self) {
        if self.shared.state().active_document_id.is_none() {
            return;
        }
        self.shared.transition(SaveState::Dirty, STATUS_UNSAVED);

        let shared = self.shared.clone();
        self.autosave.schedule(async move {
            let _ = shared.save().await;
        });
    }

    /// Saves right away. A pending autosave stays armed.
    pub async fn save_now(&self) -> Result<Option<Document>, ClientError> {
        self.shared.save().await
    }

    pub async fn create(&mut self) {
        match self.shared.api.create().await {
            Ok(document) => {
                tracing::info!(id = %document.id, "document created");
                self.shared.refresh_list().await;
                self.load(document.id.as_str()).await;
            }
            Err(error) => {
                tracing::warn!(?error, "failed to create document");
                self.shared.view().alert("Failed to create document");
            }
        }
    }

    /// Runs a toolbar command on the surface; like typing, it counts as an edit.
    pub fn format(&mut self, command: FormatCommand) {
        {
            let (name, value) = command.as_command();
            self.shared.view().exec_command(name, value);
        }
        self.edit();
    }

    pub fn insert_template(&mut self) {
        let html = letter_template(Local::now().date_naive());
        self.format(FormatCommand::InsertHtml(html));
    }

    pub fn export_pdf(&self) {
        self.shared.view().print();
    }

    pub fn export_word(&self) {
        let mut view = self.shared.view();
        let file = word_export(&view.title(), &view.html());
        view.download(file);
    }
}
