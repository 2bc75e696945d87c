use crate::document::DocumentSummary;

/// Toolbar commands handed to the rich-text surface. Their effect on the
/// document is up to the host's editing engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatCommand {
    Bold,
    Italic,
    Underline,
    StrikeThrough,
    InsertOrderedList,
    InsertUnorderedList,
    JustifyLeft,
    JustifyCenter,
    JustifyRight,
    FormatBlock(String),
    Undo,
    Redo,
    InsertHtml(String),
}

impl FormatCommand {
    /// Command name and argument, in execute-command form.
    pub fn as_command(&self) -> (&'static str, Option<&str>) {
        match self {
            Self::Bold => ("bold", None),
            Self::Italic => ("italic", None),
            Self::Underline => ("underline", None),
            Self::StrikeThrough => ("strikeThrough", None),
            Self::InsertOrderedList => ("insertOrderedList", None),
            Self::InsertUnorderedList => ("insertUnorderedList", None),
            Self::JustifyLeft => ("justifyLeft", None),
            Self::JustifyCenter => ("justifyCenter", None),
            Self::JustifyRight => ("justifyRight", None),
            Self::FormatBlock(tag) => ("formatBlock", Some(tag.as_str())),
            Self::Undo => ("undo", None),
            Self::Redo => ("redo", None),
            Self::InsertHtml(html) => ("insertHTML", Some(html.as_str())),
        }
    }
}

/// A file handed to the host for download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFile {
    pub file_name: String,
    pub mime_type: &'static str,
    pub contents: String,
}

/// The host environment the editor session drives: a title field, a
/// rich-text surface with execute-command semantics, a status line and the
/// document list.
pub trait EditorView: Send + 'static {
    fn title(&self) -> String;
    fn set_title(&mut self, title: &str);

    fn html(&self) -> String;
    fn set_html(&mut self, html: &str);
    fn exec_command(&mut self, command: &str, value: Option<&str>);

    fn set_status(&mut self, status: &str);

    fn render_list(&mut self, documents: &[DocumentSummary], active: Option<&str>);
    fn show_list_error(&mut self, message: &str);

    fn alert(&mut self, message: &str);
    fn print(&mut self);
    fn download(&mut self, file: ExportedFile);
}
