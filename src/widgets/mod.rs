//! Basic widgets.

mod container;
mod label;
mod table;
mod text_field;

pub use container::Container;
pub use label::Label;
pub use table::Table;
pub use text_field::{ChangeListener, TextField};
