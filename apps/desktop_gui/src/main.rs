//! Desktop GUI entry point: wires the egui shell to the backend worker.

mod backend_bridge;
mod controller;
mod ui;

use clap::Parser;
use crossbeam_channel::bounded;

use ui::{AppPaths, PortalGuiApp, StartupConfig};

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt().init();
    let startup = StartupConfig::parse();
    let paths = match AppPaths::from_startup(&startup) {
        Ok(paths) => paths,
        Err(err) => {
            eprintln!("startup error: {err}");
            std::process::exit(2);
        }
    };

    let (cmd_tx, cmd_rx) = bounded(64);
    let (ui_tx, ui_rx) = bounded(256);
    backend_bridge::runtime::launch(startup, paths, cmd_rx, ui_tx);

    let options = eframe::NativeOptions::default();
    eframe::run_native(
        "Campus Portal",
        options,
        Box::new(move |_cc| Ok(Box::new(PortalGuiApp::new(cmd_tx, ui_rx)))),
    )
}
