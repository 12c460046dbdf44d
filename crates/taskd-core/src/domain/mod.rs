//! Domain model (IDs, task and user records, status, callers, pagination, errors).

pub mod caller;
pub mod errors;
pub mod ids;
pub mod page;
pub mod state;
pub mod task;
pub mod user;

pub use self::caller::{Caller, Role};
pub use self::errors::{ErrorKind, TaskdError};
pub use self::ids::{TaskId, UserId};
pub use self::page::{
    ListQuery, PageRequest, PageWindow, TaskPage, parse_status_filter, total_pages,
};
pub use self::state::TaskStatus;
pub use self::task::{NewTask, Task, TaskDraft};
pub use self::user::{Credentials, Registration, User, UserDraft, email_key};
