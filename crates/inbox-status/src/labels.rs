//! Gmail label listing.

use inbox_status_oauth::AuthorizedClient;
use serde::Deserialize;
use url::Url;

/// Gmail REST API root.
pub const GMAIL_API_BASE: &str = "https://gmail.googleapis.com/gmail/v1/";

/// A mailbox label.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Label {
    /// Label id.
    pub id: String,
    /// Display name.
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct ListLabelsResponse {
    #[serde(default)]
    labels: Vec<Label>,
}

/// Lists the labels of the authenticated user.
///
/// # Errors
///
/// Returns an error if the request fails or the token cannot be refreshed.
pub async fn list_labels(
    client: &AuthorizedClient,
    api_base: &Url,
) -> inbox_status_oauth::Result<Vec<Label>> {
    let url = api_base.join("users/me/labels")?;
    let response: ListLabelsResponse = client.get_json(url).await?;
    Ok(response.labels)
}

/// Renders labels the way the CLI prints them.
#[must_use]
pub fn render(labels: &[Label]) -> String {
    if labels.is_empty() {
        return "No labels found.\n".to_string();
    }

    let mut out = String::from("Labels:\n");
    for label in labels {
        out.push_str("- ");
        out.push_str(&label.name);
        out.push('\n');
    }
    out
}
