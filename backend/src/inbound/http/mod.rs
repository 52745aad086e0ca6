//! HTTP inbound adapter: server-rendered listing pages and account forms.

pub mod error;
pub mod flash;
pub mod guards;
pub mod health;
pub mod listing_form;
pub mod listings;
pub mod pages;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub mod views;

use actix_web::web;

pub use error::ApiResult;

/// Register every page route plus the not-found fallback.
///
/// Session, trace and method-override middleware are applied by the caller.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(pages::root)
        .service(pages::get_cookies)
        .service(pages::map_script)
        .configure(listings::configure)
        .configure(users::configure)
        .default_service(web::to(pages::not_found));
}
