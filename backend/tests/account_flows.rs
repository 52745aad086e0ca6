//! Sign-up, login and site-wide page behaviour over the full stack.

mod support;

use actix_web::http::StatusCode;
use actix_web::test::TestRequest;
use rstest::rstest;
use support::browser::{Backends, Browser, app};
use wanderlust::domain::TRACE_ID_HEADER;

#[actix_web::test]
async fn signup_logs_the_new_user_in() {
    let backends = Backends::default();
    let mut browser = Browser::new(app(&backends).await);

    let signup = browser.signup("ada").await;
    assert_eq!(signup.redirect_target(), "/listings");

    let index = browser.get("/listings").await;
    assert!(index.body.contains("Welcome to Wanderlust!"));
    assert!(index.body.contains("ada"));
    assert!(index.body.contains("Log out"));

    let again = browser.get("/listings").await;
    assert!(!again.body.contains("Welcome to Wanderlust!"));
}

#[actix_web::test]
async fn taken_usernames_return_to_the_signup_form() {
    let backends = Backends::default();
    let mut first = Browser::new(app(&backends).await);
    first.signup("ada").await;

    let mut second = Browser::new(app(&backends).await);
    let duplicate = second.signup("ada").await;
    assert_eq!(duplicate.redirect_target(), "/signup");

    let form = second.get("/signup").await;
    assert!(form.body.contains("already registered"));
    assert!(form.body.contains("Sign up"));
}

#[rstest]
#[case("a", "ada@example.com", "correct horse battery")]
#[case("ada", "not-an-email", "correct horse battery")]
#[case("ada", "ada@example.com", "short")]
#[actix_web::test]
async fn invalid_signups_flash_the_reason(
    #[case] username: &str,
    #[case] email: &str,
    #[case] password: &str,
) {
    let backends = Backends::default();
    let mut browser = Browser::new(app(&backends).await);

    let page = browser
        .post_form(
            "/signup",
            &[
                ("username", username),
                ("email", email),
                ("password", password),
            ],
        )
        .await;
    assert_eq!(page.redirect_target(), "/signup");

    let form = browser.get("/signup").await;
    assert!(form.body.contains("alert"));
    assert!(!form.body.contains("Log out"));
}

#[actix_web::test]
async fn login_checks_the_password() {
    let backends = Backends::default();
    let mut browser = Browser::new(app(&backends).await);
    browser.signup("ada").await;
    browser.get("/logout").await;

    let wrong = browser.login("ada", "not the password").await;
    assert_eq!(wrong.redirect_target(), "/login");
    let form = browser.get("/login").await;
    assert!(form.body.contains("Invalid username or password"));

    let unknown = browser.login("nobody", "correct horse battery").await;
    assert_eq!(unknown.redirect_target(), "/login");

    let right = browser.login("ada", "correct horse battery").await;
    assert_eq!(right.redirect_target(), "/listings");
    let index = browser.get("/listings").await;
    assert!(index.body.contains("Welcome back to Wanderlust!"));
}

#[actix_web::test]
async fn logout_forgets_the_user() {
    let backends = Backends::default();
    let mut browser = Browser::new(app(&backends).await);
    browser.signup("ada").await;

    let logout = browser.get("/logout").await;
    assert_eq!(logout.redirect_target(), "/listings");
    let index = browser.get("/listings").await;
    assert!(index.body.contains("You are logged out!"));
    assert!(!index.body.contains("Log out"));
    assert_eq!(browser.get("/listings/new").await.redirect_target(), "/login");
}

#[actix_web::test]
async fn stolen_sessions_do_not_survive_a_fresh_browser() {
    let backends = Backends::default();
    let mut browser = Browser::new(app(&backends).await);
    browser.signup("ada").await;
    browser.clear_cookies();

    assert_eq!(browser.get("/listings/new").await.redirect_target(), "/login");
}

#[actix_web::test]
async fn unknown_paths_render_the_not_found_page() {
    let backends = Backends::default();
    let mut browser = Browser::new(app(&backends).await);

    let page = browser.get("/nowhere/to/be/found").await;
    assert_eq!(page.status, StatusCode::NOT_FOUND);
    assert!(page.body.contains("Page Not Found!"));
}

#[actix_web::test]
async fn every_response_carries_a_trace_id() {
    let backends = Backends::default();
    let service = app(&backends).await;

    for uri in ["/", "/listings", "/nowhere"] {
        let response =
            actix_web::test::call_service(&service, TestRequest::get().uri(uri).to_request())
                .await;
        let header = response
            .headers()
            .get(TRACE_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .expect("trace id header");
        assert!(uuid::Uuid::parse_str(header).is_ok(), "{uri}: {header}");
    }
}

#[actix_web::test]
async fn static_and_health_routes_respond() {
    let backends = Backends::default();
    let mut browser = Browser::new(app(&backends).await);

    assert_eq!(browser.get("/").await.body, "Hi, I am root");
    let script = browser.get("/js/map.js").await;
    assert_eq!(script.status, StatusCode::OK);
    assert!(script.body.contains("mapboxgl.Marker"));

    assert_eq!(browser.get("/health/live").await.status, StatusCode::OK);
    assert_eq!(
        browser.get("/health/ready").await.status,
        StatusCode::SERVICE_UNAVAILABLE
    );
}
