use actix_web::HttpRequest;

use crate::errors::ServerError;

/// The authenticated caller's user id, forwarded by the auth layer in the `x-user-id`
/// header.
pub fn acting_user_id(req: &HttpRequest) -> Result<i64, ServerError> {
    let header = req
        .headers()
        .get("x-user-id")
        .ok_or_else(|| ServerError::Unauthenticated("the x-user-id header is missing".to_string()))?;
    header
        .to_str()
        .ok()
        .and_then(|s| s.trim().parse::<i64>().ok())
        .ok_or_else(|| ServerError::Unauthenticated("the x-user-id header is not a valid user id".to_string()))
}

#[cfg(test)]
mod test {
    use actix_web::test::TestRequest;

    use super::*;

    #[test]
    fn user_id_header_is_required_and_numeric() {
        let req = TestRequest::get().to_http_request();
        assert!(matches!(acting_user_id(&req), Err(ServerError::Unauthenticated(_))));
        let req = TestRequest::get().insert_header(("x-user-id", "not-a-number")).to_http_request();
        assert!(matches!(acting_user_id(&req), Err(ServerError::Unauthenticated(_))));
        let req = TestRequest::get().insert_header(("x-user-id", " 42 ")).to_http_request();
        assert_eq!(acting_user_id(&req).unwrap(), 42);
    }
}
