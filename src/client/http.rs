use super::{ClientError, ClientResult, TaskApi};
use crate::types::{DeleteResponse, NewTask, Task, TaskFilter, TaskPatch};
use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;

/// [`TaskApi`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpTaskApi {
    client: Client,
    base_url: String,
}

/// Error body returned by the server.
#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

impl HttpTaskApi {
    /// `base_url` is the server root, e.g. `http://127.0.0.1:3000`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `/tasks/{id}` with the id percent-encoded as a single path segment.
    fn task_url(&self, id: &str) -> ClientResult<Url> {
        let invalid = || ClientError::Validation(format!("Invalid server URL: {}", self.base_url));
        let mut url = Url::parse(&self.url("/tasks")).map_err(|_| invalid())?;
        url.path_segments_mut().map_err(|_| invalid())?.push(id);
        Ok(url)
    }
}

/// Decode a success body, or turn the server's error body into [`ClientError::Api`].
async fn read_json<T: DeserializeOwned>(res: Response) -> ClientResult<T> {
    let status = res.status();
    if status.is_success() {
        return Ok(res.json::<T>().await?);
    }

    let text = res.text().await?;
    let message = serde_json::from_str::<ErrorBody>(&text)
        .map(|body| body.error)
        .unwrap_or_else(|_| {
            if text.is_empty() {
                status.to_string()
            } else {
                text
            }
        });
    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl TaskApi for HttpTaskApi {
    async fn list_tasks(&self, filter: &TaskFilter) -> ClientResult<Vec<Task>> {
        let res = self
            .client
            .get(self.url("/tasks"))
            .query(filter)
            .send()
            .await?;
        read_json(res).await
    }

    async fn create_task(&self, input: &NewTask) -> ClientResult<Task> {
        let res = self
            .client
            .post(self.url("/tasks"))
            .json(input)
            .send()
            .await?;
        read_json(res).await
    }

    async fn update_task(&self, id: &str, patch: &TaskPatch) -> ClientResult<Task> {
        let res = self
            .client
            .put(self.task_url(id)?)
            .json(patch)
            .send()
            .await?;
        read_json(res).await
    }

    async fn delete_task(&self, id: &str) -> ClientResult<Task> {
        let res = self
            .client
            .delete(self.task_url(id)?)
            .send()
            .await?;
        let body: DeleteResponse = read_json(res).await?;
        Ok(body.deleted_task)
    }

    async fn list_statuses(&self) -> ClientResult<Vec<String>> {
        let res = self.client.get(self.url("/api/statuses")).send().await?;
        read_json(res).await
    }
}
