//! Todo resource (`/todos`).

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::clients::{ApiClient, ApiError};
use crate::resources::validation::{self, ValidationError};

/// Maximum title length.
pub const MAX_TITLE_CHARS: usize = 100;
/// Maximum description length.
pub const MAX_DESCRIPTION_CHARS: usize = 500;
/// Maximum number of tags.
pub const MAX_TAGS: usize = 10;
/// Maximum length of each tag.
pub const MAX_TAG_CHARS: usize = 20;

/// Todo priority. Missing or null values decode as [`Priority::Low`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Low priority.
    #[default]
    Low,
    /// Medium priority.
    Medium,
    /// High priority.
    High,
}

/// A todo item as returned by the backend.
///
/// Missing `priority`, `is_completed` and `tags` are normalized to their
/// defaults.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    /// Unique identifier.
    pub id: String,
    /// Title.
    pub title: String,
    /// Optional description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Optional due date in `YYYY-MM-DD` form.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    /// Whether the todo is done.
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_completed: bool,
    /// Priority.
    #[serde(default, deserialize_with = "null_as_default")]
    pub priority: Priority,
    /// Tags.
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
}

impl Todo {
    /// Returns the due date, if present and well-formed.
    #[must_use]
    pub fn due(&self) -> Option<NaiveDate> {
        self.due_date
            .as_deref()
            .and_then(|d| validation::date("due_date", d).ok())
    }

    /// Returns `true` if the todo carries `tag`.
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// Returns the todos carrying `tag`, in their original order.
#[must_use]
pub fn filter_by_tag<'a>(todos: &'a [Todo], tag: &str) -> Vec<&'a Todo> {
    todos.iter().filter(|todo| todo.has_tag(tag)).collect()
}

/// Returns every distinct tag used across `todos`, sorted.
#[must_use]
pub fn all_tags(todos: &[Todo]) -> BTreeSet<String> {
    todos.iter().flat_map(|todo| todo.tags.iter().cloned()).collect()
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Payload for creating a todo.
///
/// # Example
///
/// ```rust
/// use console_session::resources::{Priority, TodoDraft};
///
/// let draft = TodoDraft::new("Write report")
///     .due_date("2025-03-31")
///     .priority(Priority::High)
///     .tag("work");
/// assert!(draft.validate().is_ok());
/// assert!(TodoDraft::new("").validate().is_err());
/// assert!(TodoDraft::new("No date").validate().is_err());
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TodoDraft {
    /// Title, 1 to 100 characters.
    pub title: String,
    /// Description, at most 500 characters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Due date in `YYYY-MM-DD` form, required.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    /// Priority.
    pub priority: Priority,
    /// At most 10 tags of at most 20 characters.
    pub tags: Vec<String>,
}

impl TodoDraft {
    /// Creates a draft with the given title.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the due date.
    #[must_use]
    pub fn due_date(mut self, due_date: impl Into<String>) -> Self {
        self.due_date = Some(due_date.into());
        self
    }

    /// Sets the priority.
    #[must_use]
    pub const fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Adds a tag.
    #[must_use]
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Checks the draft against the form rules.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validation::required("title", &self.title)?;
        validation::max_chars("title", &self.title, MAX_TITLE_CHARS)?;
        let due_date = self.due_date.as_deref().unwrap_or_default();
        validation::required("due_date", due_date)?;
        validate_optional(self.description.as_deref(), Some(due_date))?;
        validate_tags(&self.tags)
    }
}

/// Partial update of a todo. Only set fields are sent.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TodoUpdate {
    /// New title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New due date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    /// New completion state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_completed: Option<bool>,
    /// New priority.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    /// Replacement tags.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl TodoUpdate {
    /// Checks the set fields against the form rules.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(title) = &self.title {
            validation::required("title", title)?;
            validation::max_chars("title", title, MAX_TITLE_CHARS)?;
        }
        validate_optional(self.description.as_deref(), self.due_date.as_deref())?;
        self.tags.as_deref().map_or(Ok(()), validate_tags)
    }
}

fn validate_optional(
    description: Option<&str>,
    due_date: Option<&str>,
) -> Result<(), ValidationError> {
    if let Some(description) = description {
        validation::max_chars("description", description, MAX_DESCRIPTION_CHARS)?;
    }
    if let Some(due_date) = due_date {
        validation::required("due_date", due_date)?;
        validation::date("due_date", due_date)?;
    }
    Ok(())
}

fn validate_tags(tags: &[String]) -> Result<(), ValidationError> {
    validation::max_items("tags", tags, MAX_TAGS)?;
    for tag in tags {
        validation::max_chars("tag", tag, MAX_TAG_CHARS)?;
    }
    Ok(())
}

/// Typed access to the todo endpoints.
#[derive(Clone, Debug)]
pub struct TodoApi {
    client: ApiClient,
}

impl TodoApi {
    /// Creates the resource over `client`.
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Lists every todo.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails.
    pub async fn list(&self) -> Result<Vec<Todo>, ApiError> {
        self.client.get("/todos").await
    }

    /// Fetches one todo.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails.
    pub async fn get(&self, id: &str) -> Result<Todo, ApiError> {
        self.client.get(&todo_path(id)).await
    }

    /// Validates and creates a todo.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] without sending anything if the draft
    /// is invalid, otherwise any request failure.
    pub async fn create(&self, draft: &TodoDraft) -> Result<Todo, ApiError> {
        draft.validate()?;
        self.client.post("/todos", draft).await
    }

    /// Validates and applies a partial update.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] without sending anything if the update
    /// is invalid, otherwise any request failure.
    pub async fn update(&self, id: &str, update: &TodoUpdate) -> Result<Todo, ApiError> {
        update.validate()?;
        self.client.put(&todo_path(id), update).await
    }

    /// Deletes a todo.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails.
    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        let _: Option<serde_json::Value> = self.client.delete(&todo_path(id)).await?;
        Ok(())
    }
}

fn todo_path(id: &str) -> String {
    format!("/todos/{}", urlencoding::encode(id))
}
