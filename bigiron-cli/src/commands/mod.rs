//! CLI subcommand implementations.

mod create;
mod destroy;
mod images;
mod list;

pub use create::create;
pub use destroy::destroy;
pub use images::images;
pub use list::list;
