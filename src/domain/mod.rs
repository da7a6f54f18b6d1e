mod entry;
mod filter;
mod money;
mod user;

pub use entry::*;
pub use filter::*;
pub use money::*;
pub use user::*;
