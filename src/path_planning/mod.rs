// Path Planning algorithms module

pub mod tree;
pub mod rrt;
pub mod report;

pub use tree::*;
pub use rrt::*;
pub use report::*;
