pub mod deals;
pub mod home;
pub mod meetings;
pub mod prices;

pub use deals::{deals_page, DealsVm};
pub use home::home_page;
pub use meetings::{meetings_page, MeetingsVm};
pub use prices::{prices_page, quote_card, suggestions, PricesVm};
