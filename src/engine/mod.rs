pub mod countdown;
pub mod pool;
pub mod reveal;
pub mod selector;
pub mod timer;

pub use pool::{PoolFilter, TypeFilter};
