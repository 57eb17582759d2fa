use std::sync::atomic::{AtomicUsize, Ordering};

use pretty_assertions::assert_eq;

use super::*;
use crate::test_support::{finishes_in_time, RecordingSurface, SurfaceEvent};

fn controller() -> (Arc<RecordingSurface>, Arc<DialogController>) {
    let surface = RecordingSurface::new();
    let controller = DialogController::new(surface.clone());
    (surface, controller)
}

/// Shared log of callback names in the order they ran.
fn call_log() -> Arc<Mutex<Vec<&'static str>>> {
    Arc::new(Mutex::new(Vec::new()))
}

fn record(
    log: &Arc<Mutex<Vec<&'static str>>>,
    name: &'static str,
) -> impl FnOnce() + Send + 'static {
    let log = Arc::clone(log);
    move || log.lock().expect("log").push(name)
}

#[test]
fn superseding_discards_previous_callbacks() {
    let (surface, controller) = controller();
    let log = call_log();

    controller
        .info(DialogRequest::new("First", "one").on_close(record(&log, "first-close")))
        .expect("info");
    controller
        .error(DialogRequest::new("Second", "two").on_close(record(&log, "second-close")))
        .expect("error");

    assert_eq!(controller.state(), DialogState::Open(DialogVariant::Error));
    assert!(log.lock().expect("log").is_empty());
    assert!(surface
        .events()
        .contains(&SurfaceEvent::DialogConcealed(DialogVariant::Info)));

    controller.hide();
    assert_eq!(*log.lock().expect("log"), vec!["second-close"]);
}

#[test]
fn confirm_runs_confirm_then_close_once() {
    let (_surface, controller) = controller();
    let log = call_log();

    controller
        .confirm(
            DialogRequest::new("Delete category", "Are you sure?")
                .on_confirm(record(&log, "confirm"))
                .on_close(record(&log, "close")),
        )
        .expect("confirm");

    assert!(controller.handle_input(DialogInput::ConfirmClicked));
    assert!(!controller.handle_input(DialogInput::ConfirmClicked));

    assert_eq!(*log.lock().expect("log"), vec!["confirm", "close"]);
    assert_eq!(controller.state(), DialogState::Closed);
}

#[test]
fn confirm_callback_may_open_the_next_dialog() {
    let (_surface, controller) = controller();
    let log = call_log();
    let chained = Arc::clone(&controller);
    let success_close = record(&log, "success-close");

    controller
        .confirm(
            DialogRequest::new("Delete", "Sure?")
                .on_confirm(move || {
                    chained
                        .success(DialogRequest::new("Deleted", "Gone").on_close(success_close))
                        .expect("success");
                })
                .on_close(record(&log, "confirm-close")),
        )
        .expect("confirm");

    controller.handle_input(DialogInput::ConfirmClicked);

    assert_eq!(controller.state(), DialogState::Open(DialogVariant::Success));
    assert!(log.lock().expect("log").is_empty());

    controller.handle_input(DialogInput::CloseClicked);
    assert_eq!(*log.lock().expect("log"), vec!["success-close"]);
}

#[test]
fn hide_twice_runs_close_callback_once() {
    let (surface, controller) = controller();
    let closes = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&closes);

    controller
        .warning(DialogRequest::new("Heads up", "Low stock").on_close(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }))
        .expect("warning");
    controller.hide();
    controller.hide();

    assert_eq!(closes.load(Ordering::SeqCst), 1);
    assert_eq!(
        surface.count(|event| matches!(event, SurfaceEvent::DialogConcealed(_))),
        1
    );
}

#[test]
fn escape_and_backdrop_close_but_inner_clicks_do_not() {
    let (_surface, controller) = controller();

    controller.info(DialogRequest::new("Info", "text")).expect("info");
    assert!(!controller.handle_input(DialogInput::Clicked(ClickTarget::Dialog)));
    assert!(!controller.handle_input(DialogInput::KeyPressed("Enter".into())));
    assert!(controller.is_open());
    assert!(controller.handle_input(DialogInput::KeyPressed(CANCEL_KEY.into())));
    assert!(!controller.is_open());

    controller.info(DialogRequest::new("Info", "text")).expect("info");
    assert!(controller.handle_input(DialogInput::Clicked(ClickTarget::Backdrop)));
    assert!(!controller.is_open());
}

#[test]
fn cancel_does_not_run_confirm_callback() {
    let (_surface, controller) = controller();
    let log = call_log();

    controller
        .confirm(
            DialogRequest::new("Delete", "Sure?")
                .on_confirm(record(&log, "confirm"))
                .on_close(record(&log, "close")),
        )
        .expect("confirm");
    controller.handle_input(DialogInput::CancelClicked);

    assert_eq!(*log.lock().expect("log"), vec!["close"]);
}

#[test]
fn missing_template_leaves_current_dialog_open() {
    let surface = RecordingSurface::without_templates(&[DialogVariant::Warning]);
    let controller = DialogController::new(surface.clone());

    controller.info(DialogRequest::new("Info", "kept")).expect("info");
    let err = controller
        .warning(DialogRequest::new("Warning", "lost"))
        .expect_err("template missing");

    assert_eq!(err, DialogError::TemplateMissing(DialogVariant::Warning));
    assert_eq!(controller.state(), DialogState::Open(DialogVariant::Info));
    assert!(!surface
        .events()
        .contains(&SurfaceEvent::DialogConcealed(DialogVariant::Info)));
}

#[test]
fn show_named_rejects_unknown_kinds() {
    let (surface, controller) = controller();

    let err = controller
        .show_named("fancy", DialogRequest::new("?", "?"))
        .expect_err("unknown variant");

    assert_eq!(err, DialogError::UnknownVariant("fancy".into()));
    assert!(surface.events().is_empty());

    controller
        .show_named("success", DialogRequest::new("Saved", "ok"))
        .expect("success");
    assert_eq!(controller.state(), DialogState::Open(DialogVariant::Success));
}

#[test]
fn content_uses_configured_labels_and_confirm_label_only_for_confirm() {
    let (surface, controller) = controller();

    controller.info(DialogRequest::new("Info", "body")).expect("info");
    controller
        .confirm(DialogRequest::new("Delete", "Sure?").confirm_label("Delete"))
        .expect("confirm");

    let rendered: Vec<_> = surface
        .events()
        .into_iter()
        .filter_map(|event| match event {
            SurfaceEvent::DialogRendered(_, content) => Some(content),
            _ => None,
        })
        .collect();
    assert_eq!(
        rendered,
        vec![
            DialogContent {
                title: "Info".into(),
                message: "body".into(),
                close_label: "Close".into(),
                confirm_label: None,
            },
            DialogContent {
                title: "Delete".into(),
                message: "Sure?".into(),
                close_label: "Close".into(),
                confirm_label: Some("Delete".into()),
            },
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn primary_control_is_focused_after_delay() {
    let (surface, controller) = controller();
    controller
        .confirm(DialogRequest::new("Delete", "Sure?"))
        .expect("confirm");

    let focused = |surface: &RecordingSurface| {
        surface.count(|event| matches!(event, SurfaceEvent::DialogFocused(..)))
    };
    assert_eq!(focused(&surface), 0);

    tokio::time::sleep(Duration::from_millis(101)).await;
    assert!(surface.events().contains(&SurfaceEvent::DialogFocused(
        DialogVariant::Confirm,
        DialogControl::Cancel
    )));
}

#[tokio::test(start_paused = true)]
async fn focus_is_skipped_once_the_dialog_closed() {
    let (surface, controller) = controller();
    controller.info(DialogRequest::new("Info", "quick")).expect("info");
    controller.hide();

    tokio::time::sleep(Duration::from_millis(200)).await;

    assert_eq!(
        surface.count(|event| matches!(event, SurfaceEvent::DialogFocused(..))),
        0
    );
}

#[test]
fn reset_closes_without_callbacks() {
    let (_surface, controller) = controller();
    let log = call_log();

    controller
        .info(DialogRequest::new("Info", "text").on_close(record(&log, "close")))
        .expect("info");
    controller.reset();

    assert_eq!(controller.state(), DialogState::Closed);
    assert!(log.lock().expect("log").is_empty());
}

#[test]
fn variants_round_trip_through_names() {
    for variant in DialogVariant::ALL {
        assert_eq!(variant.to_string().parse::<DialogVariant>(), Ok(variant));
    }
}

#[test]
fn surface_may_read_dialog_state_while_revealing_and_concealing() {
    let (surface, controller) = controller();
    let states = Arc::new(Mutex::new(Vec::new()));
    {
        let controller = Arc::downgrade(&controller);
        let states = Arc::clone(&states);
        surface.on_event(move |event| {
            let Some(controller) = controller.upgrade() else {
                return;
            };
            match event {
                SurfaceEvent::DialogRevealed(_) | SurfaceEvent::DialogConcealed(_) => {
                    states
                        .lock()
                        .expect("states")
                        .push((event.clone(), controller.state()));
                }
                _ => {}
            }
        });
    }

    let worker = Arc::clone(&controller);
    finishes_in_time(move || {
        worker
            .confirm(DialogRequest::new("Remove", "Sure?"))
            .expect("confirm");
        worker.handle_input(DialogInput::ConfirmClicked);
    });

    assert_eq!(
        *states.lock().expect("states"),
        vec![
            (
                SurfaceEvent::DialogRevealed(DialogVariant::Confirm),
                DialogState::Open(DialogVariant::Confirm)
            ),
            (
                SurfaceEvent::DialogConcealed(DialogVariant::Confirm),
                DialogState::Closed
            ),
        ]
    );
}
