use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Notice {
    StyleSelectionRequired,
    ScriptSelectionRequired,
    LinkSelectionRequired,
}

impl Notice {
    pub fn message(self) -> &'static str {
        match self {
            Notice::StyleSelectionRequired => "Select some text",
            Notice::ScriptSelectionRequired => {
                "Select some text to apply superscript or subscript"
            }
            Notice::LinkSelectionRequired => "Select some text before inserting a link",
        }
    }
}

pub trait Notifier {
    fn notify(&mut self, notice: Notice);
}

impl<F> Notifier for F
where
    F: FnMut(Notice),
{
    fn notify(&mut self, notice: Notice) {
        self(notice)
    }
}

#[derive(Debug, Default, Clone)]
pub struct NoticeLog {
    notices: Vec<Notice>,
}

impl NoticeLog {
    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }
}

impl Notifier for NoticeLog {
    fn notify(&mut self, notice: Notice) {
        tracing::debug!(text = notice.message(), "notice raised");
        self.notices.push(notice);
    }
}
