pub mod algorithms;
pub mod client;
pub mod expression;
pub mod session;

pub use client::EarthEngineCollect;
pub use expression::{Expression, Node};
pub use session::{Credentials, Session};
