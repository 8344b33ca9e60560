pub mod dispatch;
pub mod run;
pub mod visualize;

pub use dispatch::dispatch;
