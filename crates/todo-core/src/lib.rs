pub mod attachment;
pub mod error;
pub mod response;
pub mod task;
pub mod user;

pub use attachment::{AttachmentLink, AttachmentUpload};
pub use error::ValidationError;
pub use response::{ApiResponse, ResponseStatus};
pub use task::{NewTask, Task, TaskChanges, TaskFilter, TaskRequest, TaskStatus, TaskView};
pub use user::{User, UserView};
