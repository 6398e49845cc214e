pub mod catchers;
pub mod comments;
pub mod health;
pub mod video;

pub use catchers::*;
pub use comments::*;
pub use health::*;
pub use video::*;
