mod attachment;
mod error;
mod tasks;
mod users;

pub use attachment::{extension_of, AttachmentPolicy};
pub use error::ServiceError;
pub use tasks::TaskService;
pub use users::UserService;
