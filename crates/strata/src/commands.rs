mod delete;
pub use delete::DeleteCommand;

mod save;
pub use save::SaveCommand;
