pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod repo;
pub mod watch;

pub use cache::{apply_subscription_update, RepoCache};
pub use client::{load_repositories, submit_subscription, Event, GithubClient, REPOSITORY_PAGE};
pub use config::{ApiConfig, AppConfig, UiConfig};
pub use error::WatchError;
pub use repo::{Repository, SubscriptionChange, SubscriptionState};
pub use watch::WatchController;
