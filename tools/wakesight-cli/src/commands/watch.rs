//! Run a live detection session.

use std::future::Future;
use std::time::Duration;

use anyhow::Context;
use tokio::sync::broadcast::error::RecvError;
use wakesight_capture_engine::{MotionController, SessionConfig};
use wakesight_common::config::AppConfig;
use wakesight_motion_model::Sensitivity;

/// Command-line settings that take precedence over the config file.
#[derive(Debug, Default)]
pub struct Overrides {
    pub device: Option<String>,
    pub sensitivity: Option<Sensitivity>,
    pub auto_wake: Option<bool>,
    pub interval_ms: Option<u64>,
}

impl Overrides {
    fn apply(self, config: &mut SessionConfig) {
        if let Some(device) = self.device {
            config.constraints.device = Some(device);
        }
        if let Some(sensitivity) = self.sensitivity {
            config.sensitivity = sensitivity;
        }
        if let Some(auto_wake) = self.auto_wake {
            config.auto_wake_enabled = auto_wake;
        }
        if let Some(ms) = self.interval_ms {
            config.tick_interval = Duration::from_millis(ms.max(1));
        }
    }
}

pub async fn run(app: &AppConfig, overrides: Overrides, json: bool) -> anyhow::Result<()> {
    let mut config = SessionConfig::from_defaults(&app.detection)
        .context("Invalid detection settings in config file")?;
    overrides.apply(&mut config);

    if !json {
        println!("Wakesight: watching for motion");
        println!(
            "  Device: {}",
            config.constraints.device.as_deref().unwrap_or("auto")
        );
        println!("  Sensitivity: {}", config.sensitivity);
        println!("  Auto-wake: {}", config.auto_wake_enabled);
        println!("  Interval: {}ms", config.tick_interval.as_millis());
        println!();
    }

    let mut controller = MotionController::with_default_source(config)?;
    controller
        .start()
        .await
        .context("Could not start the camera")?;

    if !json {
        println!("Press Ctrl+C to stop...");
        println!();
    }

    watch_until(&mut controller, json, tokio::signal::ctrl_c()).await?;

    controller.stop().await;
    super::print_summary(&controller.snapshot(), json)?;
    Ok(())
}

/// Print samples and auto-wake events until `shutdown` resolves or the
/// session ends. Returns how many samples were printed.
///
/// `shutdown` is polled in place across iterations so a signal that fires
/// while output is being written is still seen.
async fn watch_until<F: Future>(
    controller: &mut MotionController,
    json: bool,
    shutdown: F,
) -> anyhow::Result<u64> {
    let mut state_rx = controller.subscribe();
    let mut wake_rx = controller.subscribe_auto_wake();
    state_rx.borrow_and_update();
    tokio::pin!(shutdown);

    let mut last_tick = controller.snapshot().stats.ticks_processed;
    let mut printed = 0;
    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            changed = state_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let session = state_rx.borrow_and_update().clone();
                if session.stats.ticks_processed != last_tick {
                    last_tick = session.stats.ticks_processed;
                    super::print_sample(&session, json)?;
                    printed += 1;
                }
            }
            event = wake_rx.recv() => match event {
                Ok(event) => super::print_auto_wake(&event, json)?,
                Err(RecvError::Lagged(missed)) => {
                    tracing::warn!(missed, "Auto-wake events dropped by a slow consumer");
                }
                Err(RecvError::Closed) => break,
            },
        }
    }
    Ok(printed)
}
