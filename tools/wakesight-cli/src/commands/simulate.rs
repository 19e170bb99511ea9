//! Run the detection engine against a synthetic moving block.

use std::time::Duration;

use tokio::sync::broadcast::error::TryRecvError;
use wakesight_capture_engine::{MotionController, SessionConfig, SyntheticSource};
use wakesight_motion_model::Sensitivity;

pub async fn run(
    frames: u64,
    sensitivity: Sensitivity,
    interval_ms: u64,
    json: bool,
) -> anyhow::Result<()> {
    let config = SessionConfig {
        sensitivity,
        tick_interval: Duration::from_millis(interval_ms.max(1)),
        ..SessionConfig::default()
    };
    let source = SyntheticSource::sweeping_block(
        config.constraints.max_width,
        config.constraints.max_height,
    );

    if !json {
        println!(
            "Simulating {frames} samples at {sensitivity} sensitivity ({}x{} synthetic source)",
            source.geometry().width,
            source.geometry().height
        );
        println!();
    }

    let mut controller = MotionController::new(config, Box::new(source));
    let mut state_rx = controller.subscribe();
    let mut wake_rx = controller.subscribe_auto_wake();

    controller.start().await?;
    state_rx.borrow_and_update();

    loop {
        let processed = state_rx.borrow().stats.ticks_processed;
        if processed >= frames {
            break;
        }
        if state_rx.changed().await.is_err() {
            break;
        }
        let session = state_rx.borrow_and_update().clone();
        super::print_sample(&session, json)?;
        loop {
            match wake_rx.try_recv() {
                Ok(event) => super::print_auto_wake(&event, json)?,
                Err(TryRecvError::Lagged(missed)) => {
                    tracing::warn!(missed, "Auto-wake events dropped");
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            }
        }
    }

    controller.stop().await;
    super::print_summary(&controller.snapshot(), json)?;
    Ok(())
}
