use std::{panic::AssertUnwindSafe, time::Duration};

use futures::FutureExt;
use pretty_assertions::assert_eq;

use super::*;
use crate::test_support::{finishes_in_time, RecordingSurface, SurfaceEvent};

fn indicator() -> (Arc<RecordingSurface>, Arc<LoadingIndicator>) {
    let surface = RecordingSurface::new();
    let indicator = LoadingIndicator::new(surface.clone());
    (surface, indicator)
}

fn mounts(surface: &RecordingSurface) -> usize {
    surface.count(|event| matches!(event, SurfaceEvent::OverlayMounted { .. }))
}

#[test]
fn visibility_tracks_running_balance() {
    let (_surface, indicator) = indicator();
    // true = show, false = hide
    let script = [
        true, true, false, true, false, false, false, false, true, false, true, true, false,
    ];
    let mut balance: usize = 0;

    for step in script {
        let depth = if step {
            balance += 1;
            indicator.show(LoadingOptions::default())
        } else {
            balance = balance.saturating_sub(1);
            indicator.hide()
        };
        assert_eq!(depth, balance);
        assert_eq!(indicator.is_visible(), balance > 0);
    }
}

#[test]
fn nested_shows_share_one_overlay() {
    let (surface, indicator) = indicator();

    indicator.show(LoadingOptions::message("Saving category..."));
    indicator.show(LoadingOptions::message("ignored"));
    indicator.hide();

    assert_eq!(mounts(&surface), 1);
    assert_eq!(
        surface.events(),
        vec![SurfaceEvent::OverlayMounted {
            id: 1,
            message: "Saving category...".into()
        }]
    );
}

#[test]
fn hide_at_zero_touches_nothing() {
    let (surface, indicator) = indicator();

    assert_eq!(indicator.hide(), 0);
    assert_eq!(indicator.hide(), 0);
    assert!(surface.events().is_empty());
}

#[test]
fn default_message_comes_from_config() {
    let (surface, indicator) = indicator();
    indicator.show(LoadingOptions::default());

    assert_eq!(
        surface.events()[0],
        SurfaceEvent::OverlayMounted {
            id: 1,
            message: "Loading...".into()
        }
    );
}

#[tokio::test(start_paused = true)]
async fn overlay_detaches_after_fade_out() {
    let (surface, indicator) = indicator();
    indicator.show(LoadingOptions::default());
    indicator.hide();

    assert_eq!(
        surface.events().last(),
        Some(&SurfaceEvent::OverlayDeactivated(1))
    );

    tokio::time::sleep(Duration::from_millis(301)).await;
    assert_eq!(
        surface.events().last(),
        Some(&SurfaceEvent::OverlayDetached(1))
    );
}

#[tokio::test(start_paused = true)]
async fn late_detach_leaves_newer_overlay_alone() {
    let (surface, indicator) = indicator();
    indicator.show(LoadingOptions::default());
    indicator.hide();
    indicator.show(LoadingOptions::default());

    tokio::time::sleep(Duration::from_millis(301)).await;

    assert_eq!(
        surface.count(|event| matches!(event, SurfaceEvent::OverlayDetached(_))),
        1
    );
    assert!(surface
        .events()
        .contains(&SurfaceEvent::OverlayDetached(1)));
    assert!(!surface
        .events()
        .contains(&SurfaceEvent::OverlayDetached(2)));
    assert!(indicator.is_visible());
}

#[tokio::test]
async fn wrap_restores_balance_on_success_and_failure() {
    let (_surface, indicator) = indicator();
    indicator.show(LoadingOptions::default());

    let ok = indicator.wrap(|| async { Ok::<_, String>(7) }, LoadingOptions::default());
    assert_eq!(ok().await, Ok(7));
    assert_eq!(indicator.depth(), 1);

    let failing = indicator.wrap(
        || async { Err::<u32, _>("backend down".to_string()) },
        LoadingOptions::default(),
    );
    assert!(failing().await.is_err());
    assert_eq!(indicator.depth(), 1);
}

#[tokio::test]
async fn wrapped_operation_runs_with_overlay_shown() {
    let (_surface, indicator) = indicator();
    let observer = Arc::clone(&indicator);

    let wrapped = indicator.wrap(
        move || async move { observer.depth() },
        LoadingOptions::message("Deleting product..."),
    );

    assert_eq!(wrapped().await, 1);
    assert_eq!(indicator.depth(), 0);
}

#[tokio::test]
async fn run_hides_when_the_future_panics() {
    let (_surface, indicator) = indicator();

    let outcome = AssertUnwindSafe(indicator.run(LoadingOptions::default(), async {
        panic!("handler exploded");
    }))
    .catch_unwind()
    .await;

    assert!(outcome.is_err());
    assert_eq!(indicator.depth(), 0);
}

#[tokio::test(start_paused = true)]
async fn run_hides_when_the_future_is_dropped() {
    let (_surface, indicator) = indicator();

    let timed_out = tokio::time::timeout(
        Duration::from_millis(50),
        indicator.run(LoadingOptions::default(), std::future::pending::<()>()),
    )
    .await;

    assert!(timed_out.is_err());
    assert_eq!(indicator.depth(), 0);
}

#[test]
fn reset_drops_outstanding_shows() {
    let (surface, indicator) = indicator();
    indicator.show(LoadingOptions::default());
    indicator.show(LoadingOptions::default());

    indicator.reset();

    assert_eq!(indicator.depth(), 0);
    assert_eq!(
        surface.events()[1..],
        [
            SurfaceEvent::OverlayDeactivated(1),
            SurfaceEvent::OverlayDetached(1)
        ]
    );
}

#[test]
fn overlay_markup_escapes_message() {
    let overlay = LoadingOverlay {
        id: OverlayId(1),
        message: "<img src=x onerror=alert(1)>".into(),
        spinner: false,
        backdrop: true,
        target: MountTarget::Body,
    };
    let html = overlay.to_html();

    assert!(html.contains("&lt;img src=x onerror=alert(1)&gt;"));
    assert!(html.contains("loading-backdrop"));
    assert!(!html.contains("loading-spinner"));
    assert!(html.contains(OVERLAY_DOM_ID));
}

#[test]
fn surface_may_read_indicator_state_while_mounting() {
    let (surface, indicator) = indicator();
    let seen = Arc::new(Mutex::new(Vec::new()));
    {
        let indicator = Arc::downgrade(&indicator);
        let seen = Arc::clone(&seen);
        surface.on_event(move |event| {
            if let Some(indicator) = indicator.upgrade() {
                let visible = indicator.is_visible();
                seen.lock().expect("seen").push((event.clone(), visible));
            }
        });
    }

    let worker = Arc::clone(&indicator);
    let depths = finishes_in_time(move || {
        let shown = worker.show(LoadingOptions::message("Saving..."));
        let hidden = worker.hide();
        (shown, hidden)
    });

    assert_eq!(depths, (1, 0));
    let seen = seen.lock().expect("seen").clone();
    assert_eq!(
        seen.first(),
        Some(&(
            SurfaceEvent::OverlayMounted {
                id: 1,
                message: "Saving...".into()
            },
            true
        ))
    );
    assert!(seen.contains(&(SurfaceEvent::OverlayDeactivated(1), false)));
}
