pub mod category;
pub mod common;
pub mod expense;
pub mod window;

pub use category::{CategoryRule, CategoryTable};
pub use common::Displayable;
pub use expense::{Expense, NewExpense};
pub use window::{Period, TimeWindow};
