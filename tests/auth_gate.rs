//! Integration tests for the session gate in front of site pages.

use reqwest::{Response, StatusCode};

mod common;

const NO_BACKEND: &str = "http://127.0.0.1:9";

async fn get(gateway: &common::TestGateway, path: &str, token: Option<&str>) -> Response {
    let mut req = common::client().get(gateway.url(path));
    if let Some(token) = token {
        req = req.header("cookie", common::session_cookie(token));
    }
    req.send().await.unwrap()
}

fn assert_redirects_to_login(res: &Response) {
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(res.headers()["location"], "/");
}

#[tokio::test]
async fn test_public_pages_need_no_session() {
    let gateway = common::start_gateway(NO_BACKEND).await;

    let res = get(&gateway, "/", None).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await.unwrap(), "login page");

    let res = get(&gateway, "/_astro/app.js", None).await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_missing_cookie_redirects() {
    let gateway = common::start_gateway(NO_BACKEND).await;

    let res = get(&gateway, "/perfil/", None).await;
    assert_redirects_to_login(&res);
    assert!(res.headers().get("set-cookie").is_none());
}

#[tokio::test]
async fn test_admin_reaches_admin_pages() {
    let gateway = common::start_gateway(NO_BACKEND).await;

    let res = get(&gateway, "/configuracion/", Some(&common::token_for_role(2))).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await.unwrap(), "configuracion page");
}

#[tokio::test]
async fn test_employee_denied_admin_pages() {
    let gateway = common::start_gateway(NO_BACKEND).await;

    let res = get(&gateway, "/configuracion/", Some(&common::token_for_role(3))).await;
    assert_redirects_to_login(&res);
    assert!(res.headers().get("set-cookie").is_none());
}

#[tokio::test]
async fn test_employee_reaches_staff_pages() {
    let gateway = common::start_gateway(NO_BACKEND).await;

    let res = get(&gateway, "/dashboardEmpleado/", Some(&common::token_for_role(3))).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await.unwrap(), "employee dashboard");
}

#[tokio::test]
async fn test_patient_limited_to_protected_pages() {
    let gateway = common::start_gateway(NO_BACKEND).await;
    let patient = common::token_for_role(4);

    let res = get(&gateway, "/perfil/", Some(&patient)).await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = get(&gateway, "/dashboardEmpleado/", Some(&patient)).await;
    assert_redirects_to_login(&res);
}

#[tokio::test]
async fn test_encoded_admin_path_is_still_gated() {
    let gateway = common::start_gateway(NO_BACKEND).await;
    let employee = common::token_for_role(3);

    for path in ["/%63onfiguracion/", "//configuracion/", "/%2Fconfiguracion/"] {
        let res = get(&gateway, path, Some(&employee)).await;
        assert_redirects_to_login(&res);
    }

    let res = get(&gateway, "/%63onfiguracion/", Some(&common::token_for_role(2))).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await.unwrap(), "configuracion page");
}

#[tokio::test]
async fn test_double_slash_staff_path_is_still_gated() {
    let gateway = common::start_gateway(NO_BACKEND).await;

    let res = get(&gateway, "//dashboardEmpleado/", Some(&common::token_for_role(4))).await;
    assert_redirects_to_login(&res);
}

#[tokio::test]
async fn test_expired_token_clears_cookie() {
    let gateway = common::start_gateway(NO_BACKEND).await;

    let res = get(&gateway, "/perfil/", Some(&common::expired_token(1))).await;
    assert_redirects_to_login(&res);

    let cookie = res.headers()["set-cookie"].to_str().unwrap();
    assert!(cookie.starts_with("auth_token=;"), "{cookie}");
    assert!(cookie.contains("Path=/"), "{cookie}");
    assert!(cookie.contains("Max-Age=0"), "{cookie}");
}

#[tokio::test]
async fn test_tampered_token_clears_cookie() {
    let gateway = common::start_gateway(NO_BACKEND).await;

    let mut token = common::token_for_role(1);
    token.push('x');
    let res = get(&gateway, "/configuracion/", Some(&token)).await;
    assert_redirects_to_login(&res);
    assert!(res.headers().get("set-cookie").is_some());
}

#[tokio::test]
async fn test_custom_login_path() {
    let gateway = common::start_gateway_with(NO_BACKEND, |config| {
        config.auth.login_path = "/LogPaciente".into();
    })
    .await;

    let res = get(&gateway, "/perfil/", None).await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(res.headers()["location"], "/LogPaciente");
}
