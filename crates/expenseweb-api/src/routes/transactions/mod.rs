//! Transaction form routes - add and edit modals
//!
//! Structure:
//! - api.rs: open, category change, submit, close
//! - page.rs: modal and field rendering

pub mod api;
pub mod page;

pub use api::{
    htmx_add_form, htmx_category_change, htmx_edit_form, htmx_form_close, htmx_form_submit,
};
