pub mod cart;
pub mod order;
pub mod product;
pub mod promotions;
pub mod user;

pub use cart::*;
pub use order::*;
pub use product::*;
pub use promotions::*;
pub use user::*;
