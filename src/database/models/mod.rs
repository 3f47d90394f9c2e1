pub mod animal;
pub mod cage;
pub mod manager;
pub mod task;
pub mod user;
pub mod zookeeper;

pub use animal::Animal;
pub use cage::Cage;
pub use manager::Manager;
pub use task::{InvalidTaskStatus, TaskStatus, TaskView};
pub use user::User;
pub use zookeeper::Zookeeper;
