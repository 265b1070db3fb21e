//! Lottery business logic on top of the repository traits.
//!
//! Every function takes `now` explicitly; callers read the clock once per
//! request and thread the same instant through the draw and the view.

pub mod admin;
pub mod draw;
pub mod overview;
pub mod registration;

pub use admin::{clear_window, remove_registrations, remove_result, search_registrations, search_results};
pub use draw::{perform_weekly_draw, perform_weekly_draw_with};
pub use overview::{weekly_overview, WeeklyOverview};
pub use registration::{register, validate_form, RegistrationError};
