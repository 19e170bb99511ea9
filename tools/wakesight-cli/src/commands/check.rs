//! Check camera capabilities.

#[cfg(target_os = "linux")]
pub fn run() -> anyhow::Result<()> {
    use wakesight_platform_linux::permissions::{
        all_required_available, check_capabilities, print_capability_report,
    };

    println!("Wakesight System Check");
    println!("{}", "=".repeat(50));

    let cameras = wakesight_platform_linux::detect_cameras()?;
    if cameras.is_empty() {
        println!("[WARN] No video devices found");
    } else {
        println!("[OK] Video devices detected: {}", cameras.len());
    }
    let preferred = wakesight_platform_linux::detect_default_camera();
    for camera in &cameras {
        let selected = preferred
            .as_ref()
            .is_some_and(|p| p.device == camera.device);
        println!(
            "     {} {} (priority {}{}){}",
            camera.device,
            camera.name,
            camera.priority,
            if camera.accessible { "" } else { ", no access" },
            if selected { " <- selected" } else { "" }
        );
    }

    let capabilities = check_capabilities();
    println!();
    print_capability_report(&capabilities);

    println!();
    if all_required_available(&capabilities) {
        println!("All required capabilities are available. Wakesight is ready.");
    } else {
        println!("Some required capabilities are missing. See above for fixes.");
    }

    Ok(())
}

#[cfg(not(target_os = "linux"))]
pub fn run() -> anyhow::Result<()> {
    println!("Wakesight System Check");
    println!("{}", "=".repeat(50));
    println!(
        "[INFO] Platform: {:?}. Camera access is negotiated by the OS on first use;",
        wakesight_platform_core::Platform::current()
    );
    println!("       run `wakesight watch` to trigger the consent prompt.");
    Ok(())
}
