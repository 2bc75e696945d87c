use std::{
    path::PathBuf,
    sync::{Arc, Mutex, MutexGuard},
};

use docstore::configuration::get_configuration;
use docstore::document::DocumentSummary;
use docstore::editor::{EditorView, ExportedFile};
use docstore::startup::Application;
use docstore::telemetry::{get_subscriber, init_subscriber};
use once_cell::sync::Lazy;
use serde_json::Value;
use uuid::Uuid;

static TRACING: Lazy<()> = Lazy::new(|| {
    if std::env::var("TEST_LOG").is_ok() {
        let subscriber = get_subscriber("docstore=debug");
        init_subscriber(subscriber);
    }
});

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub data_dir: PathBuf,
    pub api_client: reqwest::Client,
}

impl TestApp {
    pub fn documents_url(&self) -> String {
        format!("{}/api/documents", self.address)
    }

    pub async fn list_documents(&self) -> reqwest::Response {
        self.api_client
            .get(self.documents_url())
            .send()
            .await
            .expect("list request sent")
    }

    pub async fn get_document(&self, id: &str) -> reqwest::Response {
        self.api_client
            .get(format!("{}/{}", self.documents_url(), id))
            .send()
            .await
            .expect("get request sent")
    }

    pub async fn create_document(&self) -> Value {
        self.api_client
            .post(self.documents_url())
            .json(&serde_json::json!({}))
            .send()
            .await
            .expect("create request sent")
            .json()
            .await
            .expect("created document decoded")
    }

    pub async fn put_document(&self, id: &str, body: &Value) -> reqwest::Response {
        self.api_client
            .put(format!("{}/{}", self.documents_url(), id))
            .json(body)
            .send()
            .await
            .expect("update request sent")
    }

    pub fn write_raw_record(&self, id: &str, contents: &str) {
        std::fs::write(self.data_dir.join(format!("{id}.json")), contents)
            .expect("raw record written");
    }
}

pub async fn spawn_app() -> TestApp {
    // Only initialize tracer once instead of every test
    Lazy::force(&TRACING);

    let settings = {
        let mut c = get_configuration().expect("configuration fetched");
        c.storage.data_dir = std::env::temp_dir().join(format!("docstore-{}", Uuid::new_v4()));
        c.application.port = 0;
        c
    };

    let application = Application::build(settings.clone())
        .await
        .expect("application built");
    let application_port = application.port();
    let _ = tokio::spawn(application.run_until_stopped());

    TestApp {
        address: format!("http://127.0.0.1:{}", application_port),
        port: application_port,
        data_dir: settings.storage.data_dir,
        api_client: reqwest::Client::new(),
    }
}

/// Everything the editor session pushed into the host. Shared, so the test
/// can keep inspecting it after the view moved into the session.
#[derive(Debug, Default)]
pub struct Surface {
    pub title: String,
    pub html: String,
    pub status: String,
    pub listed: Vec<DocumentSummary>,
    pub active: Option<String>,
    pub alerts: Vec<String>,
}

#[derive(Clone, Default)]
pub struct TestView(pub Arc<Mutex<Surface>>);

impl TestView {
    pub fn surface(&self) -> MutexGuard<'_, Surface> {
        self.0.lock().unwrap()
    }
}

impl EditorView for TestView {
    fn title(&self) -> String {
        self.surface().title.clone()
    }

    fn set_title(&mut self, title: &str) {
        self.surface().title = title.to_string();
    }

    fn html(&self) -> String {
        self.surface().html.clone()
    }

    fn set_html(&mut self, html: &str) {
        self.surface().html = html.to_string();
    }

    fn exec_command(&mut self, _command: &str, _value: Option<&str>) {}

    fn set_status(&mut self, status: &str) {
        self.surface().status = status.to_string();
    }

    fn render_list(&mut self, documents: &[DocumentSummary], active: Option<&str>) {
        let mut surface = self.surface();
        surface.listed = documents.to_vec();
        surface.active = active.map(String::from);
    }

    fn show_list_error(&mut self, message: &str) {
        self.surface().status = message.to_string();
    }

    fn alert(&mut self, message: &str) {
        self.surface().alerts.push(message.to_string());
    }

    fn print(&mut self) {}

    fn download(&mut self, _file: ExportedFile) {}
}
