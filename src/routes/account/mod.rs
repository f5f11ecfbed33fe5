mod handler;
mod model;

pub use handler::{account, account_data};
pub use model::AccountOverview;
