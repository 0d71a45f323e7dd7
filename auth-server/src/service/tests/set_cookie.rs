//! Cookie endpoint tests

use actix_web::cookie::{Cookie, SameSite};
use actix_web::cookie::time::Duration;
use actix_web::http::StatusCode;
use actix_web::{App, test};
use assert_json_diff::assert_json_eq;
use serde_json::{Value, json};

use crate::service::tests::{refresh_cookie, settings};
use crate::service::{self, CookieSettings};

const ENDPOINT: &str = "/api/auth/set-cookie";

#[actix_web::test]
async fn stores_refresh_token() {
    let app = test::init_service(App::new().configure(service::configure(settings()))).await;

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(ENDPOINT)
            .set_json(json!({ "refreshToken": "abc" }))
            .to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::OK);

    let cookie = refresh_cookie(&resp).unwrap();
    assert_eq!(cookie.value(), "abc");
    assert_eq!(cookie.http_only(), Some(true));
    assert_eq!(cookie.same_site(), Some(SameSite::Strict));
    assert_eq!(cookie.path(), Some("/"));
    assert_eq!(cookie.max_age(), Some(Duration::days(7)));
    assert_ne!(cookie.secure(), Some(true));

    let body: Value = test::read_body_json(resp).await;
    assert_json_eq!(
        body,
        json!({ "success": true, "message": "Refresh token stored in cookie" })
    );
}

#[actix_web::test]
async fn rejects_missing_refresh_token() {
    let app = test::init_service(App::new().configure(service::configure(settings()))).await;

    for payload in [
        json!({}),
        json!({ "refreshToken": null }),
        json!({ "refreshToken": "" }),
        json!({ "somethingElse": "abc" }),
    ] {
        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri(ENDPOINT)
                .set_json(&payload)
                .to_request(),
        )
        .await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{payload}");
        assert!(refresh_cookie(&resp).is_none(), "{payload}");

        let body: Value = test::read_body_json(resp).await;
        assert_json_eq!(body, json!({ "error": "Refresh token is required" }));
    }
}

#[actix_web::test]
async fn malformed_body_fails() {
    let app = test::init_service(App::new().configure(service::configure(settings()))).await;

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(ENDPOINT)
            .insert_header(("content-type", "application/json"))
            .set_payload("{ refreshToken: ")
            .to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(refresh_cookie(&resp).is_none());

    let body: Value = test::read_body_json(resp).await;
    assert_json_eq!(body, json!({ "error": "Failed to set refresh token" }));
}

#[actix_web::test]
async fn refresh_token_cannot_add_cookie_attributes() {
    let app = test::init_service(App::new().configure(service::configure(settings()))).await;

    for (token, encoded) in [
        (
            "abc; Domain=evil.example; SameSite=None",
            "abc%3B%20Domain%3Devil.example%3B%20SameSite%3DNone",
        ),
        ("a\nb", "a%0Ab"),
        ("a\r\nSet-Cookie: x=1", "a%0D%0ASet-Cookie%3A%20x%3D1"),
    ] {
        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri(ENDPOINT)
                .set_json(json!({ "refreshToken": token }))
                .to_request(),
        )
        .await;

        assert_eq!(resp.status(), StatusCode::OK, "{token:?}");
        assert_eq!(resp.headers().get_all("set-cookie").count(), 1);

        let cookie = refresh_cookie(&resp).unwrap();
        assert_eq!(cookie.value(), encoded);
        assert_eq!(cookie.domain(), None);
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));

        let body: Value = test::read_body_json(resp).await;
        assert_json_eq!(
            body,
            json!({ "success": true, "message": "Refresh token stored in cookie" })
        );
    }
}

#[actix_web::test]
async fn requires_json_content_type() {
    let app = test::init_service(App::new().configure(service::configure(settings()))).await;

    for content_type in [None, Some("text/plain"), Some("application/x-www-form-urlencoded")] {
        let mut req = test::TestRequest::post()
            .uri(ENDPOINT)
            .set_payload(r#"{ "refreshToken": "abc" }"#);
        if let Some(content_type) = content_type {
            req = req.insert_header(("content-type", content_type));
        }

        let resp = test::call_service(&app, req.to_request()).await;

        assert_eq!(
            resp.status(),
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "{content_type:?}"
        );
        assert!(refresh_cookie(&resp).is_none());

        let body: Value = test::read_body_json(resp).await;
        assert_json_eq!(
            body,
            json!({ "error": "Content-Type must be application/json" })
        );
    }

    // Parameters after the media type are fine
    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(ENDPOINT)
            .insert_header(("content-type", "application/json; charset=utf-8"))
            .set_payload(r#"{ "refreshToken": "abc" }"#)
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(refresh_cookie(&resp).unwrap().value(), "abc");
}

#[actix_web::test]
async fn secure_cookie_in_production() {
    let settings = CookieSettings::new("refreshToken", Duration::days(7), true);
    let app = test::init_service(App::new().configure(service::configure(settings))).await;

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(ENDPOINT)
            .set_json(json!({ "refreshToken": "abc" }))
            .to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(refresh_cookie(&resp).unwrap().secure(), Some(true));
}

#[actix_web::test]
async fn removes_refresh_token() {
    let app = test::init_service(App::new().configure(service::configure(settings()))).await;

    // Removing works the same whether the cookie was there or not
    for cookie in [None, Some("abc")] {
        let mut req = test::TestRequest::delete().uri(ENDPOINT);
        if let Some(value) = cookie {
            req = req.cookie(Cookie::new("refreshToken", value));
        }

        let resp = test::call_service(&app, req.to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let cookie = refresh_cookie(&resp).unwrap();
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(Duration::ZERO));

        let body: Value = test::read_body_json(resp).await;
        assert_json_eq!(
            body,
            json!({ "success": true, "message": "Refresh token removed" })
        );
    }
}

#[actix_web::test]
async fn health() {
    let app = test::init_service(App::new().configure(service::configure(settings()))).await;

    let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
}
