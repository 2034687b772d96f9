/// iced views for the property detail panel
///
/// Views only render what the state layer already decided: badge kinds,
/// formatted timestamps and the image slot's loading state.

pub mod badge;
pub mod card;
pub mod history;
