//! Landing page handler.

use axum::{
    Json,
    response::{IntoResponse, Redirect, Response},
};
use serde::Serialize;

use saverspot_core::PrincipalKind;

use crate::middleware::OptionalPrincipal;

/// Landing page body: the entry points into both sides of the marketplace.
#[derive(Debug, Serialize)]
pub struct LandingPage {
    pub name: &'static str,
    pub tagline: &'static str,
    pub offers: &'static str,
    pub user_signup: &'static str,
    pub user_login: &'static str,
    pub merchant_signup: &'static str,
    pub merchant_login: &'static str,
}

impl Default for LandingPage {
    fn default() -> Self {
        Self {
            name: "SaverSpot",
            tagline: "Discover and save with local offers",
            offers: "/user/offers",
            user_signup: "/user/signup",
            user_login: "/user/login",
            merchant_signup: "/merchant/signup",
            merchant_login: "/merchant/login",
        }
    }
}

/// Display the landing page.
///
/// Signed-in principals skip it and land on their own surface.
pub async fn home(OptionalPrincipal(principal): OptionalPrincipal) -> Response {
    match principal.map(|p| p.kind) {
        Some(PrincipalKind::User) => Redirect::to("/user/profile").into_response(),
        Some(PrincipalKind::Merchant) => Redirect::to("/merchant/dashboard").into_response(),
        None => Json(LandingPage::default()).into_response(),
    }
}
