//! Domain models for the server.

pub mod product;
pub mod selection;
pub mod user;

pub use product::{Product, StaticAsset};
pub use selection::{SelectionEvent, SelectionSnapshot};
pub use user::WechatUser;
