use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use eframe::egui::{self, Color32, RichText};
use tokio::runtime::Runtime;
use tokio::sync::mpsc;
use tracing::warn;
use watch_core::{
    load_repositories, submit_subscription, AppConfig, Event, GithubClient, RepoCache,
    WatchController,
};

pub struct AppInit {
    pub runtime: Arc<Runtime>,
    pub client: GithubClient,
    pub config: AppConfig,
    pub events: mpsc::Receiver<Event>,
    pub events_tx: mpsc::Sender<Event>,
}

pub struct WatchApp {
    runtime: Arc<Runtime>,
    client: GithubClient,
    config: AppConfig,
    events: mpsc::Receiver<Event>,
    events_tx: mpsc::Sender<Event>,
    cache: RepoCache,
    controller: WatchController,
    // Row order from the query; the cache itself is unordered.
    rows: Vec<String>,
    loading: bool,
    refreshed_at: Option<DateTime<Utc>>,
    mutation_feedback: Option<String>,
}

impl WatchApp {
    pub fn new(init: AppInit) -> Self {
        let mut app = Self {
            runtime: init.runtime,
            client: init.client,
            config: init.config,
            events: init.events,
            events_tx: init.events_tx,
            cache: RepoCache::new(),
            controller: WatchController::new(),
            rows: Vec::new(),
            loading: true,
            refreshed_at: None,
            mutation_feedback: None,
        };
        app.request_repositories();
        app
    }

    fn request_repositories(&mut self) {
        if self.rows.is_empty() {
            self.loading = true;
        }
        let client = self.client.clone();
        let login = self.config.api.organization.clone();
        let tx = self.events_tx.clone();
        self.runtime.spawn(load_repositories(client, login, tx));
    }

    fn drain_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            match event {
                Event::RepositoriesLoaded(repositories) => {
                    self.rows = repositories.iter().map(|r| r.id.clone()).collect();
                    self.cache.populate(repositories);
                    self.loading = false;
                    self.refreshed_at = Some(Utc::now());
                }
                Event::SubscriptionSettled(change) => {
                    if let Err(error) = self.controller.settle(&mut self.cache, &change) {
                        warn!(%error, "failed to commit subscription update");
                    }
                }
                Event::SubscriptionFailed {
                    repository_id,
                    error,
                } => {
                    self.controller.fail(&mut self.cache, &repository_id);
                    self.mutation_feedback = Some(error.to_string());
                }
            }
        }
    }

    fn toggle_watch(&mut self, repository_id: &str) {
        self.mutation_feedback = None;
        match self.controller.begin_toggle(&mut self.cache, repository_id) {
            Ok(change) => {
                let client = self.client.clone();
                let tx = self.events_tx.clone();
                self.runtime.spawn(submit_subscription(client, change, tx));
            }
            Err(error) => warn!(%error, "could not start watch toggle"),
        }
    }

    fn draw_header(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.heading(RichText::new("OrgWatch").size(18.0));
            ui.label(RichText::new(self.config.api.organization.clone()).weak());
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("Refresh").clicked() {
                    self.request_repositories();
                }
                if let Some(at) = self.refreshed_at {
                    ui.label(
                        RichText::new(format!("updated {}", at.format("%H:%M:%S")))
                            .weak()
                            .size(12.0),
                    );
                }
            });
        });
    }

    fn draw_repository_list(&mut self, ui: &mut egui::Ui) {
        let font_size = self.config.ui.font_size;
        let mut toggle_clicked: Option<String> = None;
        let mut open_url: Option<String> = None;

        egui::ScrollArea::vertical()
            .auto_shrink([false; 2])
            .show(ui, |ui| {
                for id in &self.rows {
                    let Some(repository) = self.cache.read_entry(id) else {
                        continue;
                    };
                    let pending = self.controller.is_pending(id);

                    ui.horizontal(|ui| {
                        let name = ui
                            .link(RichText::new(&repository.name).strong().size(font_size))
                            .on_hover_text(&repository.url);
                        if name.clicked() {
                            open_url = Some(repository.url.clone());
                        }
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            let caption = format!(
                                "{} {}",
                                repository.watcher_count,
                                repository.viewer_subscription.action_label()
                            );
                            let button =
                                egui::Button::new(RichText::new(caption).size(font_size));
                            if ui.add_enabled(!pending, button).clicked() {
                                toggle_clicked = Some(repository.id.clone());
                            }
                        });
                    });
                    ui.separator();
                }
            });

        if let Some(url) = open_url {
            if let Err(error) = webbrowser::open(&url) {
                warn!(%error, %url, "failed to open repository page");
            }
        }
        if let Some(id) = toggle_clicked {
            self.toggle_watch(&id);
        }
    }
}

impl eframe::App for WatchApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_events();

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            self.draw_header(ui);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            if self.loading {
                ui.label("Loading ...");
            } else {
                self.draw_repository_list(ui);
            }

            if let Some(message) = self.mutation_feedback.clone() {
                ui.add_space(4.0);
                ui.label(
                    RichText::new(message)
                        .color(Color32::from_rgb(229, 57, 53))
                        .size(13.0),
                );
            }
        });

        // Completion events arrive from spawned tasks; poll the channel
        // even while the pointer is idle.
        ctx.request_repaint_after(Duration::from_millis(200));
    }
}
