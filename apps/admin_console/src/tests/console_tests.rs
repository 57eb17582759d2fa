use super::*;

use std::sync::atomic::{AtomicBool, Ordering};

use client_core::{
    dialog::DialogRequest,
    notifications::NotificationOptions,
    NotificationToaster,
};
use pretty_assertions::assert_eq;

#[derive(Clone, Default)]
struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl SharedBuf {
    fn text(&self) -> String {
        String::from_utf8(self.0.lock().expect("buffer").clone()).expect("utf8")
    }
}

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().expect("buffer").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn console() -> (SharedBuf, Arc<ConsoleSurface>) {
    let buf = SharedBuf::default();
    (buf.clone(), ConsoleSurface::with_writer(buf))
}

#[test]
fn notifications_print_variant_and_message() {
    let (buf, surface) = console();
    let toaster = NotificationToaster::new(surface);

    toaster.success("Category saved successfully", NotificationOptions::sticky());

    assert_eq!(buf.text(), "[success] Category saved successfully\n");
}

#[test]
fn confirm_dialog_lists_both_buttons() {
    let (buf, surface) = console();
    let dialogs = DialogController::new(surface);

    dialogs
        .confirm(DialogRequest::new("Delete category", "Are you sure?").confirm_label("Delete"))
        .expect("confirm");

    assert_eq!(
        buf.text(),
        "== Delete category (confirm) ==\nAre you sure?\n[Delete] / [Close]\n"
    );
}

#[test]
fn prompt_confirms_only_on_yes() {
    for (answer, expected) in [("yes\n", true), ("Y\n", true), ("n\n", false), ("", false)] {
        let (_buf, surface) = console();
        let dialogs = DialogController::new(surface);
        let confirmed = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&confirmed);
        dialogs
            .confirm(DialogRequest::new("Delete", "Sure?").on_confirm(move || {
                flag.store(true, Ordering::SeqCst);
            }))
            .expect("confirm");

        PromptResponder::new(answer.as_bytes()).respond(&dialogs);

        assert_eq!(confirmed.load(Ordering::SeqCst), expected, "answer {answer:?}");
        assert!(!dialogs.is_open());
    }
}

#[test]
fn auto_confirm_dismisses_informational_dialogs() {
    let (_buf, surface) = console();
    let dialogs = DialogController::new(surface);
    dialogs
        .success(DialogRequest::new("Deleted", "Gone"))
        .expect("success");

    AutoConfirm.respond(&dialogs);

    assert!(!dialogs.is_open());
}
