//! Typed resources for the console's REST backends.
//!
//! Each resource wraps an [`ApiClient`](crate::clients::ApiClient) and
//! validates payloads locally before sending them:
//!
//! - [`TodoApi`]: `/todos` list, get, create, update, delete
//! - [`TroubleApi`]: `/troubles` paginated list and create
//! - [`CommentApi`]: `/comments` list and create on the comments backend
//! - [`UserApi`]: `/users` list and create
//! - [`RoleApi`]: `/roles` list and create
//!
//! # Example
//!
//! ```rust,ignore
//! use console_session::resources::{TodoApi, TodoDraft};
//!
//! let todos = TodoApi::new(context.api_client()?);
//! let created = todos
//!     .create(&TodoDraft::new("Write report").due_date("2025-03-31"))
//!     .await?;
//! ```

mod comments;
mod roles;
mod todos;
mod troubles;
mod users;
mod validation;

pub use comments::{CommentApi, CommentItem, NewComment};
pub use roles::{NewRole, RoleApi, RoleItem};
pub use todos::{
    all_tags, filter_by_tag, Priority, Todo, TodoApi, TodoDraft, TodoUpdate,
    MAX_DESCRIPTION_CHARS, MAX_TAGS, MAX_TAG_CHARS, MAX_TITLE_CHARS,
};
pub use troubles::{CreatedTrouble, NewTrouble, TroubleApi, TroubleItem, TroublePage};
pub use users::{NewUser, UserApi, UserItem};
pub use validation::{parse_tags, ValidationError};
