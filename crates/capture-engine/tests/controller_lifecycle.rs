use std::time::Duration;

use tokio::sync::broadcast::error::TryRecvError;
use tokio::sync::watch;
use tokio::time::Instant;
use wakesight_capture_engine::backend::synthetic::ScriptedRead;
use wakesight_capture_engine::{
    MotionController, Session, SessionConfig, SessionState, SyntheticSource,
};
use wakesight_common::error::AcquisitionKind;
use wakesight_motion_model::{MotionDirection, PixelBuffer, Sensitivity};

const WIDTH: u32 = 320;
const HEIGHT: u32 = 240;
const GREY: [u8; 4] = [80, 80, 80, 255];

fn config(sensitivity: Sensitivity, auto_wake_enabled: bool) -> SessionConfig {
    SessionConfig {
        sensitivity,
        auto_wake_enabled,
        ..SessionConfig::default()
    }
}

/// Top third brightened by 20 red and 20 green: per-pixel diff of 40.
fn top_third_lit() -> PixelBuffer {
    PixelBuffer::from_fn(WIDTH, HEIGHT, |_, y| {
        if 3 * y < HEIGHT {
            [100, 100, 80, 255]
        } else {
            GREY
        }
    })
}

fn grey() -> PixelBuffer {
    PixelBuffer::filled(WIDTH, HEIGHT, GREY)
}

async fn next_update(rx: &mut watch::Receiver<Session>) -> Session {
    tokio::time::timeout(Duration::from_secs(10), rx.changed())
        .await
        .expect("session update within timeout")
        .expect("controller still alive");
    rx.borrow_and_update().clone()
}

async fn started(controller: &mut MotionController) -> watch::Receiver<Session> {
    let mut rx = controller.subscribe();
    controller.start().await.expect("start succeeds");
    rx.borrow_and_update();
    rx
}

#[tokio::test(start_paused = true)]
async fn first_tick_reports_zero_motion() {
    let source = SyntheticSource::from_frames(vec![grey(), top_third_lit()]);
    let mut controller = MotionController::new(config(Sensitivity::High, true), Box::new(source));
    let mut rx = started(&mut controller).await;

    let first = next_update(&mut rx).await;
    assert!(first.is_active);
    assert_eq!(first.stats.ticks_processed, 1);
    assert!(!first.current_motion.is_motion_detected);
    assert_eq!(first.current_motion.motion_intensity, 0.0);
    assert_eq!(first.current_motion.motion_direction, MotionDirection::None);
    assert_eq!(first.current_motion.last_motion_time, None);

    controller.stop().await;
}

#[tokio::test(start_paused = true)]
async fn upward_motion_triggers_auto_wake() {
    let source = SyntheticSource::from_frames(vec![grey(), top_third_lit()]);
    let mut controller = MotionController::new(config(Sensitivity::High, true), Box::new(source));
    let mut wake_rx = controller.subscribe_auto_wake();
    let mut rx = started(&mut controller).await;

    next_update(&mut rx).await;
    let second = next_update(&mut rx).await;
    let motion = second.current_motion;
    assert!(motion.is_motion_detected);
    assert_eq!(motion.motion_direction, MotionDirection::Up);
    assert!((motion.motion_intensity - 0.4).abs() < 1e-12);
    assert!((motion.confidence_level - 0.8).abs() < 1e-12);
    assert!(motion.last_motion_time.is_some());

    let event = wake_rx.try_recv().expect("auto-wake event");
    assert_eq!(event.motion, motion);
    assert_eq!(event.raw_intensity, 40.0);
    assert_eq!(event.threshold, 15);
    assert_eq!(second.stats.auto_wake_events, 1);

    controller.stop().await;
}

#[tokio::test(start_paused = true)]
async fn disabled_auto_wake_emits_nothing() {
    let source = SyntheticSource::from_frames(vec![grey(), top_third_lit()]);
    let mut controller = MotionController::new(config(Sensitivity::High, false), Box::new(source));
    let mut wake_rx = controller.subscribe_auto_wake();
    let mut rx = started(&mut controller).await;

    next_update(&mut rx).await;
    let second = next_update(&mut rx).await;
    assert!(second.current_motion.is_motion_detected);
    assert_eq!(wake_rx.try_recv().unwrap_err(), TryRecvError::Empty);
    assert_eq!(second.stats.auto_wake_events, 0);

    controller.stop().await;
}

#[tokio::test(start_paused = true)]
async fn motion_below_double_threshold_does_not_wake() {
    // Medium threshold is 30: a diff of 40 is motion but not above 60.
    let source = SyntheticSource::from_frames(vec![grey(), top_third_lit()]);
    let mut controller =
        MotionController::new(config(Sensitivity::Medium, true), Box::new(source));
    let mut wake_rx = controller.subscribe_auto_wake();
    let mut rx = started(&mut controller).await;

    next_update(&mut rx).await;
    let second = next_update(&mut rx).await;
    assert!(second.current_motion.is_motion_detected);
    assert_eq!(wake_rx.try_recv().unwrap_err(), TryRecvError::Empty);

    controller.stop().await;
}

#[tokio::test(start_paused = true)]
async fn failed_start_reports_error_and_can_be_retried() {
    let source = SyntheticSource::still(WIDTH, HEIGHT, GREY)
        .fail_opens(AcquisitionKind::PermissionDenied, 1);
    let counters = source.counters();
    let mut controller = MotionController::new(SessionConfig::default(), Box::new(source));

    let err = controller.start().await.unwrap_err();
    assert_eq!(err.acquisition_kind(), Some(AcquisitionKind::PermissionDenied));

    let snapshot = controller.snapshot();
    assert_eq!(snapshot.state, SessionState::Error);
    assert!(!snapshot.is_active);
    assert!(snapshot.error.is_some());
    assert!(!counters.is_open());

    controller.start().await.expect("second start succeeds");
    let snapshot = controller.snapshot();
    assert_eq!(snapshot.state, SessionState::Active);
    assert!(snapshot.error.is_none());

    controller.stop().await;
}

#[tokio::test(start_paused = true)]
async fn start_suspends_until_source_is_ready() {
    let source =
        SyntheticSource::still(WIDTH, HEIGHT, GREY).with_open_delay(Duration::from_secs(2));
    let mut controller = MotionController::new(SessionConfig::default(), Box::new(source));

    let began = Instant::now();
    controller.start().await.unwrap();
    assert!(began.elapsed() >= Duration::from_secs(2));
    assert!(controller.is_active());

    controller.stop().await;
}

#[tokio::test(start_paused = true)]
async fn start_while_active_is_rejected() {
    let source = SyntheticSource::still(WIDTH, HEIGHT, GREY);
    let mut controller = MotionController::new(SessionConfig::default(), Box::new(source));
    controller.start().await.unwrap();

    assert!(controller.start().await.is_err());
    assert!(controller.is_active());

    controller.stop().await;
}

#[tokio::test(start_paused = true)]
async fn stop_releases_source_and_freezes_state() {
    let source = SyntheticSource::sweeping_block(WIDTH, HEIGHT);
    let counters = source.counters();
    let mut controller = MotionController::new(SessionConfig::default(), Box::new(source));
    let mut rx = started(&mut controller).await;

    next_update(&mut rx).await;
    next_update(&mut rx).await;
    controller.stop().await;

    assert!(!counters.is_open());
    assert_eq!(counters.closes(), 1);
    let stopped = rx.borrow_and_update().clone();
    assert_eq!(stopped.state, SessionState::Stopped);
    assert!(!stopped.is_active);

    let reads = counters.reads();
    let later = tokio::time::timeout(Duration::from_secs(5), rx.changed()).await;
    assert!(later.is_err(), "no updates after stop");
    assert_eq!(counters.reads(), reads);
    assert_eq!(controller.snapshot().current_motion, stopped.current_motion);
}

#[tokio::test(start_paused = true)]
async fn stop_is_idempotent() {
    let source = SyntheticSource::still(WIDTH, HEIGHT, GREY);
    let counters = source.counters();
    let mut controller = MotionController::new(SessionConfig::default(), Box::new(source));

    controller.stop().await;
    assert_eq!(controller.snapshot().state, SessionState::Stopped);

    controller.start().await.unwrap();
    controller.stop().await;
    controller.stop().await;
    assert_eq!(controller.snapshot().state, SessionState::Stopped);
    assert_eq!(counters.closes(), 1);
}

#[tokio::test(start_paused = true)]
async fn failed_reads_skip_the_tick_silently() {
    let source = SyntheticSource::scripted(vec![
        ScriptedRead::Frame(grey()),
        ScriptedRead::Fail("usb hiccup".into()),
        ScriptedRead::Frame(grey()),
    ]);
    let mut controller = MotionController::new(SessionConfig::default(), Box::new(source));
    let mut rx = started(&mut controller).await;

    let first = next_update(&mut rx).await;
    let first_at = Instant::now();
    let second = next_update(&mut rx).await;

    // The failed read in between published nothing.
    assert!(first_at.elapsed() >= 2 * SessionConfig::default().tick_interval);
    assert_eq!(first.stats.ticks_processed, 1);
    assert_eq!(second.stats.ticks_processed, 2);
    assert_eq!(second.stats.ticks_skipped, 1);
    assert!(second.error.is_none());
    assert!(second.is_active);

    controller.stop().await;
}

#[tokio::test(start_paused = true)]
async fn sensitivity_change_applies_to_later_ticks() {
    let source = SyntheticSource::from_frames(vec![
        grey(),
        top_third_lit(),
        grey(),
    ]);
    let mut controller = MotionController::new(config(Sensitivity::Low, false), Box::new(source));
    let mut rx = started(&mut controller).await;

    next_update(&mut rx).await;
    let at_low = next_update(&mut rx).await;
    assert!(!at_low.current_motion.is_motion_detected);

    controller.set_sensitivity(Sensitivity::High);
    let changed = rx.borrow_and_update().clone();
    assert_eq!(changed.sensitivity, Sensitivity::High);
    assert_eq!(changed.current_motion, at_low.current_motion);

    let at_high = next_update(&mut rx).await;
    assert!(at_high.current_motion.is_motion_detected);
    assert_eq!(at_high.current_motion.motion_direction, MotionDirection::Up);

    controller.stop().await;
}

#[tokio::test(start_paused = true)]
async fn auto_wake_toggle_is_prospective() {
    let source = SyntheticSource::from_frames(vec![grey(), top_third_lit(), grey()]);
    let mut controller = MotionController::new(config(Sensitivity::High, false), Box::new(source));
    let mut wake_rx = controller.subscribe_auto_wake();
    let mut rx = started(&mut controller).await;

    next_update(&mut rx).await;
    next_update(&mut rx).await;
    controller.set_auto_wake_enabled(true);
    rx.borrow_and_update();
    assert_eq!(wake_rx.try_recv().unwrap_err(), TryRecvError::Empty);

    next_update(&mut rx).await;
    let event = wake_rx.try_recv().expect("wake on the tick after enabling");
    assert_eq!(event.motion.motion_direction, MotionDirection::Up);

    controller.stop().await;
}

#[tokio::test(start_paused = true)]
async fn last_motion_time_never_decreases() {
    let source = SyntheticSource::sweeping_block(WIDTH, HEIGHT);
    let mut controller = MotionController::new(config(Sensitivity::High, false), Box::new(source));
    let mut rx = started(&mut controller).await;

    let mut previous = None;
    for _ in 0..12 {
        let sample = next_update(&mut rx).await.current_motion;
        if let (Some(before), Some(now)) = (previous, sample.last_motion_time) {
            assert!(now >= before);
        }
        if previous.is_some() {
            assert!(sample.last_motion_time.is_some());
        }
        previous = sample.last_motion_time.or(previous);
    }
    assert!(previous.is_some());

    controller.stop().await;
}

#[tokio::test(start_paused = true)]
async fn restart_begins_with_a_fresh_baseline() {
    let source = SyntheticSource::sweeping_block(WIDTH, HEIGHT);
    let mut controller = MotionController::new(config(Sensitivity::High, false), Box::new(source));
    let mut rx = started(&mut controller).await;

    next_update(&mut rx).await;
    let moving = next_update(&mut rx).await;
    assert!(moving.current_motion.is_motion_detected);
    controller.stop().await;

    controller.start().await.unwrap();
    rx.borrow_and_update();
    let first_again = next_update(&mut rx).await;
    assert!(!first_again.current_motion.is_motion_detected);
    assert_eq!(
        first_again.current_motion.last_motion_time,
        moving.current_motion.last_motion_time
    );

    controller.stop().await;
}

#[tokio::test(start_paused = true)]
async fn start_after_a_crashed_session_reports_error() {
    let source = SyntheticSource::scripted(vec![
        ScriptedRead::Frame(grey()),
        ScriptedRead::Panic("sensor fault".into()),
    ]);
    let mut controller = MotionController::new(config(Sensitivity::Medium, true), Box::new(source));
    let mut rx = started(&mut controller).await;

    next_update(&mut rx).await;
    // The second read panics and takes the sampling task and its source with it.
    tokio::time::sleep(Duration::from_secs(1)).await;
    controller.stop().await;
    assert_eq!(controller.snapshot().state, SessionState::Stopped);

    let err = controller.start().await.unwrap_err();
    assert_eq!(err.acquisition_kind(), Some(AcquisitionKind::Unavailable));

    let session = controller.snapshot();
    assert_eq!(session.state, SessionState::Error);
    assert!(!session.is_active);
    assert!(session.error.is_some());
}
