use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::mpsc;
use tracing::{info, warn};
use url::Url;

use crate::error::WatchError;
use crate::repo::{Repository, SubscriptionChange, SubscriptionState};

/// Fixed page size of the organization listing. No pagination: the view
/// is a flat pass-through of the first page.
pub const REPOSITORY_PAGE: i64 = 20;

const REPOSITORY_FIELDS: &str = r#"
fragment repositoryFields on Repository {
  id
  name
  url
  watchers {
    totalCount
  }
  viewerSubscription
}
"#;

const ORGANIZATION_REPOSITORIES: &str = r#"
query($login: String!, $first: Int!) {
  organization(login: $login) {
    repositories(first: $first) {
      edges {
        node {
          ...repositoryFields
        }
      }
    }
  }
}
"#;

const UPDATE_SUBSCRIPTION: &str = r#"
mutation($id: ID!, $state: SubscriptionState!) {
  updateSubscription(input: { state: $state, subscribableId: $id }) {
    subscribable {
      id
      viewerSubscription
    }
  }
}
"#;

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct OrganizationData {
    organization: Option<OrganizationNode>,
}

#[derive(Debug, Deserialize)]
struct OrganizationNode {
    repositories: RepositoryConnection,
}

#[derive(Debug, Deserialize)]
struct RepositoryConnection {
    edges: Vec<RepositoryEdge>,
}

#[derive(Debug, Deserialize)]
struct RepositoryEdge {
    node: RepositoryNode,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RepositoryNode {
    id: String,
    name: String,
    url: String,
    watchers: WatcherConnection,
    viewer_subscription: SubscriptionState,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WatcherConnection {
    total_count: i64,
}

#[derive(Debug, Deserialize)]
struct UpdateSubscriptionData {
    #[serde(rename = "updateSubscription")]
    update_subscription: UpdateSubscriptionPayload,
}

#[derive(Debug, Deserialize)]
struct UpdateSubscriptionPayload {
    subscribable: SubscribableNode,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubscribableNode {
    id: String,
    viewer_subscription: SubscriptionState,
}

impl From<RepositoryNode> for Repository {
    fn from(node: RepositoryNode) -> Self {
        Self {
            id: node.id,
            name: node.name,
            url: node.url,
            watcher_count: node.watchers.total_count,
            viewer_subscription: node.viewer_subscription,
        }
    }
}

/// Thin GraphQL transport against the GitHub API. Query planning, cache
/// normalization and re-render scheduling live elsewhere; this only posts
/// documents and decodes responses.
#[derive(Debug, Clone)]
pub struct GithubClient {
    http: Client,
    endpoint: Url,
    token: Option<String>,
}

impl GithubClient {
    pub fn new(http: Client, endpoint: &str, token: Option<String>) -> Result<Self, WatchError> {
        let endpoint = Url::parse(endpoint)?;
        Ok(Self {
            http,
            endpoint,
            token,
        })
    }

    /// Fetch the first [`REPOSITORY_PAGE`] repositories of an organization.
    pub async fn organization_repositories(
        &self,
        login: &str,
    ) -> Result<Vec<Repository>, WatchError> {
        let body = json!({
            "query": format!("{ORGANIZATION_REPOSITORIES}\n{REPOSITORY_FIELDS}"),
            "variables": { "login": login, "first": REPOSITORY_PAGE },
        });
        let data: OrganizationData = self.execute(&body).await?;
        let organization = data
            .organization
            .ok_or(WatchError::MissingData("organization"))?;

        Ok(organization
            .repositories
            .edges
            .into_iter()
            .map(|edge| edge.node.into())
            .collect())
    }

    /// Set the viewer's subscription on a repository. Returns the
    /// authoritative state echoed by the server.
    pub async fn update_subscription(
        &self,
        change: &SubscriptionChange,
    ) -> Result<SubscriptionChange, WatchError> {
        let body = json!({
            "query": UPDATE_SUBSCRIPTION,
            "variables": { "id": change.repository_id, "state": change.state },
        });
        let data: UpdateSubscriptionData = self.execute(&body).await?;
        let subscribable = data.update_subscription.subscribable;

        Ok(SubscriptionChange {
            repository_id: subscribable.id,
            state: subscribable.viewer_subscription,
        })
    }

    async fn execute<T: DeserializeOwned>(&self, body: &serde_json::Value) -> Result<T, WatchError> {
        let mut request = self.http.post(self.endpoint.clone()).json(body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?.error_for_status()?;
        let payload: GraphQlResponse<T> = response.json().await?;

        if let Some(errors) = payload.errors.filter(|errors| !errors.is_empty()) {
            let messages = errors
                .into_iter()
                .map(|error| error.message)
                .collect::<Vec<_>>()
                .join("; ");
            return Err(WatchError::Api(messages));
        }

        payload.data.ok_or(WatchError::MissingData("data"))
    }
}

/// Completion events delivered to the GUI event loop.
#[derive(Debug)]
pub enum Event {
    RepositoriesLoaded(Vec<Repository>),
    SubscriptionSettled(SubscriptionChange),
    SubscriptionFailed {
        repository_id: String,
        error: WatchError,
    },
}

/// Run the organization query and report the result as an event.
///
/// A failed query emits nothing: the view keeps its loading placeholder
/// and the failure is only logged.
pub async fn load_repositories(client: GithubClient, login: String, tx: mpsc::Sender<Event>) {
    match client.organization_repositories(&login).await {
        Ok(repositories) => {
            info!(organization = %login, count = repositories.len(), "loaded repositories");
            if tx.send(Event::RepositoriesLoaded(repositories)).await.is_err() {
                warn!("event receiver dropped");
            }
        }
        Err(error) => {
            warn!(organization = %login, error = %error, "failed to load repositories");
        }
    }
}

/// Run the subscription mutation and report completion as an event.
pub async fn submit_subscription(
    client: GithubClient,
    change: SubscriptionChange,
    tx: mpsc::Sender<Event>,
) {
    let repository_id = change.repository_id.clone();
    let event = match client.update_subscription(&change).await {
        Ok(settled) => Event::SubscriptionSettled(settled),
        Err(error) => {
            warn!(repository = %repository_id, error = %error, "subscription mutation failed");
            Event::SubscriptionFailed {
                repository_id,
                error,
            }
        }
    };
    if tx.send(event).await.is_err() {
        warn!("event receiver dropped");
    }
}
