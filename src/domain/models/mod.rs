mod answer;
mod backend;
mod error;
mod event;
mod file_entry;
mod message;
mod prompt;
mod report;
mod response;
mod role;
mod schema;
mod session;
mod settings;

pub use answer::*;
pub use backend::*;
pub use error::*;
pub use event::*;
pub use file_entry::*;
pub use message::*;
pub use prompt::*;
pub use report::*;
pub use response::*;
pub use role::*;
pub use schema::*;
pub use session::*;
pub use settings::*;
