mod app;

use std::sync::Arc;

use eframe::{egui, NativeOptions};
use reqwest::{redirect, ClientBuilder};
use tokio::runtime::Runtime;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;
use watch_core::{AppConfig, GithubClient};

use crate::app::{AppInit, WatchApp};

fn main() -> eframe::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let runtime = Arc::new(Runtime::new().expect("failed to initialise Tokio runtime"));
    let (events_tx, events_rx) = mpsc::channel(64);
    let http = ClientBuilder::new()
        .redirect(redirect::Policy::limited(5))
        .user_agent("OrgWatch/0.1")
        .build()
        .expect("failed to build HTTP client");
    let client = GithubClient::new(http, &config.api.endpoint, config.api.resolve_token())
        .expect("invalid GraphQL endpoint in configuration");

    let window_size = [config.ui.window_width, config.ui.window_height];
    let init = AppInit {
        runtime,
        client,
        config,
        events: events_rx,
        events_tx,
    };

    eframe::run_native(
        "OrgWatch",
        NativeOptions {
            viewport: egui::ViewportBuilder::default()
                .with_inner_size(window_size)
                .with_min_inner_size([360.0, 400.0]),
            ..Default::default()
        },
        Box::new(move |_cc| Box::new(WatchApp::new(init))),
    )
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
