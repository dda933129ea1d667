pub mod task;
pub mod user;

pub use task::{sort_newest_first, Filter, Task, TaskId, TaskInput};
pub use user::{LoginInput, LoginResponse, RegisterInput, Session, User};
