use std::path::PathBuf;

use clap::Parser;
use crossbeam_channel::bounded;
use eframe::egui;

mod backend_bridge;
mod config;
mod controller;
mod ui;

use backend_bridge::commands::BackendCommand;
use controller::events::UiEvent;
use controller::rotation::UpdateStrategy;
use ui::{DialApp, PREFS_STORAGE_KEY};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum StrategyArg {
    Immediate,
    Debounced,
    Session,
}

impl From<StrategyArg> for UpdateStrategy {
    fn from(value: StrategyArg) -> Self {
        match value {
            StrategyArg::Immediate => UpdateStrategy::Immediate,
            StrategyArg::Debounced => UpdateStrategy::Debounced,
            StrategyArg::Session => UpdateStrategy::Session,
        }
    }
}

#[derive(Parser)]
#[command(name = "dial_gui", about = "Rotation dial for virtual-tabletop tokens")]
struct Cli {
    /// Path to a settings file (defaults to ./dial.toml).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the configured update strategy.
    #[arg(long, value_enum)]
    strategy: Option<StrategyArg>,

    /// Tracing filter, e.g. "info" or "dial_gui=debug".
    #[arg(long, default_value = "info")]
    log_filter: String,
}

fn main() -> eframe::Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_env_filter(cli.log_filter.as_str())
        .init();

    let mut settings = config::load_settings(cli.config.as_deref());
    if let Some(strategy) = cli.strategy {
        settings.update_strategy = strategy.into();
    }
    tracing::info!(
        strategy = settings.update_strategy.label(),
        debounce_ms = settings.debounce_window.as_millis() as u64,
        "dial settings loaded"
    );

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(256);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(2048);
    backend_bridge::runtime::launch(cmd_rx, ui_tx);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Token Dial")
            .with_inner_size([380.0, 480.0])
            .with_min_inner_size([320.0, 400.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Token Dial",
        options,
        Box::new(move |cc| {
            let prefs = cc.storage.and_then(|storage| {
                storage
                    .get_string(PREFS_STORAGE_KEY)
                    .and_then(|text| serde_json::from_str(&text).ok())
            });
            Ok(Box::new(DialApp::new(cmd_tx, ui_rx, settings, prefs)))
        }),
    )
}
