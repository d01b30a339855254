mod common;

use anyhow::Result;
use reqwest::{header, StatusCode};
use serde_json::{json, Value};

fn location(res: &reqwest::Response) -> Option<String> {
    res.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

#[tokio::test]
async fn anonymous_dashboard_requests_redirect_to_login() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = common::client();

    for path in [
        "/dashboard",
        "/dashboard/lawyer",
        "/dashboard/admin",
        "/dashboard/admin/lawyers",
        "/dashboard/admin/requests",
    ] {
        let res = client.get(server.url(path)).send().await?;
        assert_eq!(res.status(), StatusCode::SEE_OTHER, "{path}");

        let target = location(&res).unwrap_or_default();
        let encoded = path.replace('/', "%2F");
        assert_eq!(target, format!("/login?redirectedFrom={}", encoded));
    }

    Ok(())
}

#[tokio::test]
async fn public_pages_are_reachable_without_session() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = common::client();

    let res = client.get(server.url("/")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .get(server.url("/login?redirectedFrom=%2Fdashboard%2Fadmin"))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["data"]["redirectedFrom"], "/dashboard/admin");

    Ok(())
}

#[tokio::test]
async fn session_cookie_drives_the_guard() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = common::client();

    let res = client
        .post(server.url("/api/auth/login"))
        .json(&json!({ "email": common::ADMIN_EMAIL, "password": common::ADMIN_PASSWORD }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let set_cookie = res
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(set_cookie.contains("HttpOnly"), "{set_cookie}");
    let cookie = set_cookie.split(';').next().unwrap_or_default().to_string();

    let res = client.get(server.url("/login")).header(header::COOKIE, &cookie).send().await?;
    assert_eq!(location(&res).as_deref(), Some("/dashboard"));

    let res = client.get(server.url("/dashboard")).header(header::COOKIE, &cookie).send().await?;
    assert_eq!(location(&res).as_deref(), Some("/dashboard/admin"));

    let res = client
        .get(server.url("/dashboard/lawyer"))
        .header(header::COOKIE, &cookie)
        .send()
        .await?;
    assert_eq!(location(&res).as_deref(), Some("/dashboard/admin"));

    let res = client
        .get(server.url("/dashboard/admin"))
        .header(header::COOKIE, &cookie)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn lawyer_is_confined_to_lawyer_area() -> Result<()> {
    let server = common::ensure_server().await?;
    let admin = common::admin_token(server).await?;
    let lawyer = common::create_lawyer(server, &admin, "Marta Fuentes", "San Fernando").await?;
    let email = lawyer["email"].as_str().unwrap_or_default();
    let token = common::login(server, email, common::LAWYER_PASSWORD).await?;
    let client = common::client();

    for path in ["/dashboard", "/dashboard/admin", "/dashboard/admin/requests"] {
        let res = client.get(server.url(path)).bearer_auth(&token).send().await?;
        assert_eq!(res.status(), StatusCode::SEE_OTHER, "{path}");
        assert_eq!(location(&res).as_deref(), Some("/dashboard/lawyer"), "{path}");
    }

    let res = client.get(server.url("/dashboard/lawyer")).bearer_auth(&token).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["data"]["lawyer"]["id"], lawyer["id"]);

    Ok(())
}

#[tokio::test]
async fn client_guard_endpoint_reports_the_same_decision() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = common::client();

    let res = client
        .get(server.url("/api/auth/route?path=%2Fdashboard%2Fadmin"))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["data"]["action"], "redirect_to_login");
    assert_eq!(body["data"]["location"], "/login?redirectedFrom=%2Fdashboard%2Fadmin");

    let edge = client.get(server.url("/dashboard/admin")).send().await?;
    assert_eq!(location(&edge).as_deref(), body["data"]["location"].as_str());

    Ok(())
}

#[tokio::test]
async fn deleted_account_session_is_cleared() -> Result<()> {
    let server = common::ensure_server().await?;
    let admin = common::admin_token(server).await?;
    let lawyer = common::create_lawyer(server, &admin, "Jorge Muñoz", "Rengo").await?;
    let email = lawyer["email"].as_str().unwrap_or_default();
    let token = common::login(server, email, common::LAWYER_PASSWORD).await?;
    let client = common::client();

    let res = client
        .delete(server.url(&format!("/api/admin/lawyers/{}", lawyer["id"].as_str().unwrap_or_default())))
        .bearer_auth(&admin)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = client.get(server.url("/dashboard/lawyer")).bearer_auth(&token).send().await?;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res).as_deref(), Some("/login"));
    let cleared = res
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert!(cleared.contains("Max-Age=0"), "{cleared}");

    Ok(())
}
