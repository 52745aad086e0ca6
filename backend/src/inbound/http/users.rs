//! Sign-up, login and logout.
//!
//! Rejected submissions flash the reason and send the browser back to the
//! form rather than rendering an error page.

use actix_web::{HttpResponse, web};
use minijinja::context;
use serde::Deserialize;
use tracing::info;

use crate::domain::{
    ErrorCode, INVALID_LOGIN_MESSAGE, LoginCredentials, Password, SignupForm,
};

use super::ApiResult;
use super::flash::FlashKind;
use super::guards::redirect;
use super::session::SessionContext;
use super::state::HttpState;
use super::views::render_page;

/// Notice after registering.
pub const WELCOME_MESSAGE: &str = "Welcome to Wanderlust!";
/// Notice after logging in.
pub const WELCOME_BACK_MESSAGE: &str = "Welcome back to Wanderlust!";
/// Notice after logging out.
pub const LOGGED_OUT_MESSAGE: &str = "You are logged out!";

/// URL-encoded sign-up form. Missing fields are left blank for validation to
/// report.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SignupRequest {
    /// Requested login name.
    pub username: String,
    /// Contact email.
    pub email: String,
    /// Chosen password.
    pub password: String,
}

/// URL-encoded login form.
#[derive(Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    /// Login name.
    pub username: String,
    /// Password.
    pub password: String,
}

/// Register the account routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/signup")
            .route(web::get().to(signup_form))
            .route(web::post().to(signup)),
    )
    .service(
        web::resource("/login")
            .route(web::get().to(login_form))
            .route(web::post().to(login)),
    )
    .service(web::resource("/logout").route(web::get().to(logout)));
}

async fn signup_form(session: SessionContext) -> ApiResult<HttpResponse> {
    render_page(&session, "users/signup.html", context! {})
}

async fn signup(
    state: web::Data<HttpState>,
    session: SessionContext,
    form: web::Form<SignupRequest>,
) -> ApiResult<HttpResponse> {
    let SignupRequest {
        username,
        email,
        password,
    } = form.into_inner();
    let registered = state
        .accounts
        .register(SignupForm {
            username,
            email,
            password,
        })
        .await;

    match registered {
        Ok(user) => {
            session.persist_user(&user)?;
            session.flash(FlashKind::Success, WELCOME_MESSAGE)?;
            Ok(redirect("/listings"))
        }
        Err(err) if matches!(err.code(), ErrorCode::InvalidRequest | ErrorCode::Conflict) => {
            session.flash(FlashKind::Error, err.message())?;
            Ok(redirect("/signup"))
        }
        Err(err) => Err(err),
    }
}

async fn login_form(session: SessionContext) -> ApiResult<HttpResponse> {
    render_page(&session, "users/login.html", context! {})
}

async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    form: web::Form<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let LoginRequest { username, password } = form.into_inner();
    let credentials = LoginCredentials {
        username,
        password: Password::new(password),
    };

    match state.accounts.login(&credentials).await {
        Ok(user) => {
            let target = session.take_return_to();
            session.persist_user(&user)?;
            session.flash(FlashKind::Success, WELCOME_BACK_MESSAGE)?;
            info!(user_id = %user.id, "user logged in");
            Ok(redirect(target.as_deref().unwrap_or("/listings")))
        }
        Err(err) if err.code() == ErrorCode::Unauthorized => {
            session.flash(FlashKind::Error, INVALID_LOGIN_MESSAGE)?;
            Ok(redirect("/login"))
        }
        Err(err) => Err(err),
    }
}

async fn logout(session: SessionContext) -> ApiResult<HttpResponse> {
    session.clear_user();
    session.flash(FlashKind::Success, LOGGED_OUT_MESSAGE)?;
    Ok(redirect("/listings"))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::domain::ports::{MockAccountService, MockListingCommand, MockListingQuery};
    use crate::domain::{Email, Error, User, UserId, Username};
    use crate::inbound::http::session::RETURN_TO_KEY;
    use crate::inbound::http::test_utils::{session_cookie, test_session_middleware};
    use actix_session::Session;
    use actix_web::dev::ServiceResponse;
    use actix_web::http::StatusCode;
    use actix_web::http::header::LOCATION;
    use actix_web::{App, test};
    use rstest::rstest;

    fn ada() -> User {
        User {
            id: UserId::random(),
            username: Username::new("ada").expect("username"),
            email: Email::new("ada@example.com").expect("email"),
        }
    }

    async fn call(
        accounts: MockAccountService,
        prime_return_to: Option<&'static str>,
        request: test::TestRequest,
    ) -> ServiceResponse {
        let state = HttpState::new(
            Arc::new(MockListingCommand::new()),
            Arc::new(MockListingQuery::new()),
            Arc::new(accounts),
        );
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .wrap(test_session_middleware())
                .route(
                    "/test/prime",
                    web::get().to(move |session: Session| async move {
                        if let Some(target) = prime_return_to {
                            session.insert(RETURN_TO_KEY, target).expect("insert");
                        }
                        session.insert("primed", true).expect("insert");
                        HttpResponse::Ok().finish()
                    }),
                )
                .configure(configure),
        )
        .await;
        let primed = test::call_service(
            &app,
            test::TestRequest::get().uri("/test/prime").to_request(),
        )
        .await;
        let cookie = session_cookie(&primed);
        test::call_service(&app, request.cookie(cookie).to_request()).await
    }

    fn location(res: &ServiceResponse) -> String {
        res.headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_owned()
    }

    fn signup_request() -> test::TestRequest {
        test::TestRequest::post().uri("/signup").set_form([
            ("username", "ada"),
            ("email", "ada@example.com"),
            ("password", "analytical engine"),
        ])
    }

    #[actix_web::test]
    async fn signup_logs_the_new_user_in() {
        let mut accounts = MockAccountService::new();
        accounts
            .expect_register()
            .withf(|form| form.username == "ada" && form.password == "analytical engine")
            .times(1)
            .returning(|_| Ok(ada()));

        let res = call(accounts, None, signup_request()).await;
        assert_eq!(res.status(), StatusCode::FOUND);
        assert_eq!(location(&res), "/listings");
    }

    #[rstest]
    #[case(Error::conflict("A user with the given username is already registered"))]
    #[case(Error::invalid_request("\"email\" must be a valid email"))]
    #[actix_web::test]
    async fn rejected_signups_return_to_the_form(#[case] error: Error) {
        let mut accounts = MockAccountService::new();
        accounts
            .expect_register()
            .returning(move |_| Err(error.clone()));

        let res = call(accounts, None, signup_request()).await;
        assert_eq!(res.status(), StatusCode::FOUND);
        assert_eq!(location(&res), "/signup");
    }

    #[actix_web::test]
    async fn signup_outages_render_an_error_page() {
        let mut accounts = MockAccountService::new();
        accounts
            .expect_register()
            .returning(|_| Err(Error::service_unavailable("database down")));

        let res = call(accounts, None, signup_request()).await;
        assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[rstest]
    #[case(None, "/listings")]
    #[case(Some("/listings/new"), "/listings/new")]
    #[actix_web::test]
    async fn login_follows_the_return_target(
        #[case] stored: Option<&'static str>,
        #[case] expected: &str,
    ) {
        let mut accounts = MockAccountService::new();
        accounts
            .expect_login()
            .withf(|credentials| {
                credentials.username == "ada"
                    && credentials.password.expose() == "analytical engine"
            })
            .returning(|_| Ok(ada()));

        let request = test::TestRequest::post()
            .uri("/login")
            .set_form([("username", "ada"), ("password", "analytical engine")]);
        let res = call(accounts, stored, request).await;
        assert_eq!(res.status(), StatusCode::FOUND);
        assert_eq!(location(&res), expected);
    }

    #[actix_web::test]
    async fn failed_login_returns_to_the_form() {
        let mut accounts = MockAccountService::new();
        accounts
            .expect_login()
            .returning(|_| Err(Error::unauthorized(INVALID_LOGIN_MESSAGE)));

        let request = test::TestRequest::post()
            .uri("/login")
            .set_form([("username", "ada"), ("password", "wrong password")]);
        let res = call(accounts, None, request).await;
        assert_eq!(res.status(), StatusCode::FOUND);
        assert_eq!(location(&res), "/login");
    }

    #[actix_web::test]
    async fn logout_redirects_to_the_index() {
        let res = call(
            MockAccountService::new(),
            None,
            test::TestRequest::get().uri("/logout"),
        )
        .await;
        assert_eq!(res.status(), StatusCode::FOUND);
        assert_eq!(location(&res), "/listings");
    }

    #[actix_web::test]
    async fn forms_render() {
        for uri in ["/signup", "/login"] {
            let res =
                call(MockAccountService::new(), None, test::TestRequest::get().uri(uri)).await;
            assert_eq!(res.status(), StatusCode::OK, "{uri}");
        }
    }
}
