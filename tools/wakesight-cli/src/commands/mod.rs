pub mod check;
pub mod simulate;
pub mod watch;

use wakesight_capture_engine::{AutoWakeEvent, Session};

/// Print the current motion sample of `session`.
pub fn print_sample(session: &Session, json: bool) -> anyhow::Result<()> {
    let motion = &session.current_motion;
    if json {
        println!(
            "{}",
            serde_json::json!({ "type": "sample", "tick": session.stats.ticks_processed, "motion": motion })
        );
        return Ok(());
    }

    let marker = if motion.is_motion_detected { "*" } else { " " };
    println!(
        "{marker} tick {:>5}  intensity {:.2}  confidence {:.2}  direction {:<5}  sensitivity {}",
        session.stats.ticks_processed,
        motion.motion_intensity,
        motion.confidence_level,
        motion.motion_direction.as_str(),
        session.sensitivity,
    );
    Ok(())
}

pub fn print_auto_wake(event: &AutoWakeEvent, json: bool) -> anyhow::Result<()> {
    if json {
        let mut value = serde_json::to_value(event)?;
        if let Some(map) = value.as_object_mut() {
            map.insert("type".to_string(), "auto_wake".into());
        }
        println!("{value}");
        return Ok(());
    }
    println!(
        "! AUTO-WAKE  raw intensity {:.1} > {} (threshold {} at {})",
        event.raw_intensity,
        2 * event.threshold,
        event.threshold,
        event.sensitivity
    );
    Ok(())
}

/// Print the end-of-session counters.
pub fn print_summary(session: &Session, json: bool) -> anyhow::Result<()> {
    if json {
        println!(
            "{}",
            serde_json::json!({ "type": "summary", "state": session.state, "stats": session.stats })
        );
        return Ok(());
    }
    let stats = &session.stats;
    println!();
    println!(
        "Samples: {}  skipped: {}  with motion: {}  auto-wake events: {}",
        stats.ticks_processed, stats.ticks_skipped, stats.motion_ticks, stats.auto_wake_events
    );
    Ok(())
}
