//! User interface components which are reused between pages.

pub mod actions;
pub mod alert;
pub mod badge;
