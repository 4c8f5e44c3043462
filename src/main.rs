/*
 *  main.rs
 *
 *  MicScope - hear it, see it
 *  (c) 2020-26 Stuart Hunter
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use log::{error, info, warn};
use tokio::signal::unix::{signal, SignalKind};

use micscope::audio::{CaptureSource, PcmStreamSource, PcmWriterSink, SyntheticSource};
use micscope::config::{self, Cli, Config};
use micscope::constants::SYNTHETIC_SOURCE;
use micscope::display::DisplayDriverFactory;
use micscope::{Monitor, MonitorSettings};

include!(concat!(env!("OUT_DIR"), "/build_info.rs"));

/// Waits for a SIGINT, SIGTERM, or SIGHUP signal and logs which one arrived.
async fn signal_handler() -> std::io::Result<()> {
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sighup = signal(SignalKind::hangup())?;

    tokio::select! {
        _ = sigint.recv() => {
            info!("SIGINT received. Initiating graceful shutdown.");
        }
        _ = sigterm.recv() => {
            info!("SIGTERM received. Initiating graceful shutdown.");
        }
        _ = sighup.recv() => {
            info!("SIGHUP received. Initiating graceful shutdown.");
        }
    }
    Ok(())
}

/// Open and initialize the hardware; any failure here is fatal.
fn build_monitor(cfg: &Config) -> anyhow::Result<Monitor> {
    let display_cfg = cfg.display_or_default();
    let mut display = DisplayDriverFactory::create_from_config(&display_cfg)
        .context("opening display")?;
    display.init()
        .context("display did not acknowledge initialization")?;

    let capture_cfg = cfg.capture_or_default();
    let capture: Box<dyn CaptureSource> = match capture_cfg.source() {
        SYNTHETIC_SOURCE => {
            info!("Using synthetic test tone at {} Hz sample rate", capture_cfg.sample_rate_hz());
            Box::new(SyntheticSource::new(capture_cfg.sample_rate_hz(), rand::random()))
        }
        path => Box::new(
            PcmStreamSource::open(path)
                .with_context(|| format!("opening capture source {}", path))?,
        ),
    };

    let mut monitor = Monitor::new(display, capture, MonitorSettings::from(cfg));

    if let Some(path) = cfg.playback.as_ref().and_then(|p| p.path.as_deref()) {
        match PcmWriterSink::open(path) {
            Ok(sink) => monitor = monitor.with_playback(Box::new(sink)),
            Err(e) => warn!("Playback to {} disabled: {}", path, e),
        }
    }

    Ok(monitor)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cfg = match config::load(&cli) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("micscope: {}", e);
            std::process::exit(1);
        }
    };

    if cli.dump_config {
        print!("{}", config::dump(&cfg)?);
        return Ok(());
    }

    let level = cfg.log_level.clone().unwrap_or_else(|| "info".to_string());
    env_logger::Builder::from_env(Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();

    info!("This is {}, hear it, see it", env!("CARGO_PKG_NAME"));
    info!("v.{} built {}", env!("CARGO_PKG_VERSION"), BUILD_DATE);

    let mut monitor = match build_monitor(&cfg) {
        Ok(m) => m,
        Err(e) => {
            error!("Initialization failed: {:#}", e);
            std::process::exit(1);
        }
    };

    let stop = Arc::new(AtomicBool::new(false));
    let worker_stop = stop.clone();
    let splash = cfg.splash();

    // capture blocks, so the cycle loop lives on its own thread
    let mut worker = tokio::task::spawn_blocking(move || {
        if !splash.is_zero() {
            if let Err(e) = monitor.splash(splash) {
                warn!("Splash screen failed: {}", e);
            }
        }
        monitor.run(worker_stop)
    });

    tokio::select! {
        res = signal_handler() => {
            if let Err(e) = res {
                error!("Signal handling unavailable, stopping: {}", e);
            }
        }
        res = &mut worker => {
            let cycles = res.context("monitor task failed")?.context("display shutdown failed")?;
            info!("Monitor stopped on its own after {} cycles", cycles);
            return Ok(());
        }
    }

    stop.store(true, Ordering::Relaxed);
    let cycles = worker.await
        .context("monitor task failed")?
        .context("display shutdown failed")?;

    info!("Main application exiting after {} cycles. Display is off.", cycles);
    Ok(())
}
