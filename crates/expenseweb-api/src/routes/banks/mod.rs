//! Bank routes - link an account, refresh link status, import transactions

pub mod api;
pub mod page;

pub use api::{
    htmx_import_form, htmx_import_submit, htmx_link_form, htmx_link_submit, htmx_refresh_link,
};
