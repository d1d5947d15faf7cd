//! Wildland Survivor headless runner
//!
//! Plays an autopilot session for a number of simulated seconds against a
//! file-backed store, then prints the debug snapshot.
//!
//! Usage: `wildland-survivor [seconds] [save-dir] [seed]`

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use wildland_survivor::Session;
    use wildland_survivor::persistence::FileStore;
    use wildland_survivor::platform;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Wildland Survivor (headless) starting...");

    let mut args = std::env::args().skip(1);
    let seconds: f64 = args
        .next()
        .and_then(|s| s.parse().ok())
        .filter(|s: &f64| s.is_finite() && *s > 0.0)
        .unwrap_or(120.0);
    let dir = args.next().unwrap_or_else(|| "saves".to_string());
    let now = platform::now_ms();
    let seed = args
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or(now as u64);

    let mut session = Session::new(FileStore::new(dir), seed, None, now);
    session.input_mut().idle_mode = true;

    let steps = session.advance_time(seconds * 1000.0);
    for event in session.take_events() {
        log::debug!("{:?}", event);
    }
    log::info!("Ran {} sub-steps", steps);

    match session.debug_snapshot().to_json() {
        Ok(json) => println!("{json}"),
        Err(e) => log::error!("Snapshot failed: {}", e),
    }
    session.shutdown();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is `web::WebGame`, this is just to satisfy the compiler
}
