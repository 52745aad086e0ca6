//! Root greeting, demo cookie, the embedded map script and the fallback
//! for unknown routes.

use actix_web::cookie::Cookie;
use actix_web::http::header::{self, ContentType};
use actix_web::{HttpResponse, get};

use crate::domain::Error;

const MAP_SCRIPT: &str = include_str!("../../../static/js/map.js");

/// Message for unknown routes.
pub const PAGE_NOT_FOUND_MESSAGE: &str = "Page Not Found!";

/// `GET /`.
#[get("/")]
pub async fn root() -> HttpResponse {
    HttpResponse::Ok()
        .content_type(ContentType::plaintext())
        .body("Hi, I am root")
}

/// `GET /getcookies`: sets `greet=hello`.
#[get("/getcookies")]
pub async fn get_cookies() -> HttpResponse {
    HttpResponse::Ok()
        .cookie(Cookie::build("greet", "hello").path("/").finish())
        .content_type(ContentType::plaintext())
        .body("you send some cookies")
}

/// `GET /js/map.js`.
#[get("/js/map.js")]
pub async fn map_script() -> HttpResponse {
    HttpResponse::Ok()
        .insert_header((header::CONTENT_TYPE, "text/javascript; charset=utf-8"))
        .insert_header((header::CACHE_CONTROL, "public, max-age=3600"))
        .body(MAP_SCRIPT)
}

/// Default service: a 404 error page.
pub async fn not_found() -> Result<HttpResponse, Error> {
    Err(Error::not_found(PAGE_NOT_FOUND_MESSAGE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, test, web};

    async fn get(uri: &str) -> actix_web::dev::ServiceResponse {
        let app = test::init_service(
            App::new()
                .service(root)
                .service(get_cookies)
                .service(map_script)
                .default_service(web::to(not_found)),
        )
        .await;
        test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await
    }

    #[actix_web::test]
    async fn root_greets() {
        let res = get("/").await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(test::read_body(res).await, "Hi, I am root");
    }

    #[actix_web::test]
    async fn demo_route_sets_greeting_cookie() {
        let res = get("/getcookies").await;
        let cookie = res
            .response()
            .cookies()
            .find(|cookie| cookie.name() == "greet")
            .map(|cookie| cookie.value().to_owned());
        assert_eq!(cookie.as_deref(), Some("hello"));
        assert_eq!(test::read_body(res).await, "you send some cookies");
    }

    #[actix_web::test]
    async fn serves_the_map_script() {
        let res = get("/js/map.js").await;
        assert_eq!(res.status(), StatusCode::OK);
        let body = test::read_body(res).await;
        assert!(String::from_utf8_lossy(&body).contains("mapboxgl.Marker"));
    }

    #[actix_web::test]
    async fn unknown_routes_render_not_found() {
        let res = get("/nowhere").await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        let body = test::read_body(res).await;
        assert!(String::from_utf8_lossy(&body).contains(PAGE_NOT_FOUND_MESSAGE));
    }
}
