mod handler;
mod model;

pub use handler::place_option_trade;
pub use model::{OptionOrder, PlaceOptionTradeRequest, PlaceOptionTradeResponse};
