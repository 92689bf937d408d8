use actix_web::{
    body::MessageBody,
    http::StatusCode,
    test,
    test::TestRequest,
    web::ServiceConfig,
    App,
};

/// Runs one request against an app configured by `configure` and returns the status and
/// body. Headers are (name, value) pairs; a POST is issued when a body is supplied.
pub async fn send_request(
    method_body: Option<(&str, &str)>,
    path: &str,
    headers: &[(&str, &str)],
    configure: fn(&mut ServiceConfig),
) -> (StatusCode, String) {
    let mut req = match method_body {
        Some((body, content_type)) => {
            TestRequest::post().uri(path).insert_header(("Content-Type", content_type)).set_payload(body.to_string())
        },
        None => TestRequest::get().uri(path),
    };
    for (name, value) in headers {
        req = req.insert_header((*name, *value));
    }
    let app = App::new().configure(configure);
    let service = test::init_service(app).await;
    let res = test::call_service(&service, req.to_request()).await;
    let status = res.status();
    let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
    (status, body)
}

pub async fn get(path: &str, headers: &[(&str, &str)], configure: fn(&mut ServiceConfig)) -> (StatusCode, String) {
    send_request(None, path, headers, configure).await
}

pub async fn post_json(
    path: &str,
    body: &str,
    headers: &[(&str, &str)],
    configure: fn(&mut ServiceConfig),
) -> (StatusCode, String) {
    send_request(Some((body, "application/json")), path, headers, configure).await
}

pub async fn post_form(
    path: &str,
    body: &str,
    headers: &[(&str, &str)],
    configure: fn(&mut ServiceConfig),
) -> (StatusCode, String) {
    send_request(Some((body, "application/x-www-form-urlencoded")), path, headers, configure).await
}
