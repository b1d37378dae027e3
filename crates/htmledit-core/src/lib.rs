mod block;
mod config;
mod context;
mod dom;
mod editor;
mod error;
mod inline;
mod link;
mod locate;
pub mod markup;
mod normalize;
mod notify;
mod plugin;
mod range;
mod selection;

pub use crate::block::*;
pub use crate::config::*;
pub use crate::context::*;
pub use crate::dom::*;
pub use crate::editor::*;
pub use crate::error::*;
pub use crate::inline::*;
pub use crate::link::*;
pub use crate::locate::*;
pub use crate::normalize::*;
pub use crate::notify::*;
pub use crate::plugin::*;
pub use crate::range::*;
pub use crate::selection::*;
