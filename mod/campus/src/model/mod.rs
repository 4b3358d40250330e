mod batch;
mod company;
mod session;
mod user;

pub use batch::*;
pub use company::*;
pub use session::*;
pub use user::*;
