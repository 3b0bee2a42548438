pub mod dispatch;

pub use dispatch::{Action, Concern, DispatchContext, KeyDispatch};
