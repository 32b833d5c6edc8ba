use rocket::{http::Status, serde::json::Json, Catcher, Request, Route};

use crate::model::{api::ErrorBody, caller::GuardFailure};

mod elections;
mod health;
mod marketplace;
mod votes;

pub fn routes() -> Vec<Route> {
    let mut routes = Vec::new();
    routes.extend(elections::routes());
    routes.extend(votes::routes());
    routes.extend(marketplace::routes());
    routes.extend(health::routes());
    routes
}

pub fn catchers() -> Vec<Catcher> {
    catchers![
        bad_request,
        forbidden,
        not_found,
        unprocessable_entity,
        internal_error,
        any_error
    ]
}

/// Errors raised by Rocket itself (unmatched routes, failed guards, bad
/// bodies) get the same body shape as our own.
fn error_body(status: Status, req: &Request<'_>) -> (Status, Json<ErrorBody>) {
    let guard_failure = req.local_cache(GuardFailure::default).0.clone();
    let message = match (guard_failure, status.code) {
        (Some(reason), _) => reason,
        (None, 404) => format!("No route for {} {}", req.method(), req.uri()),
        (None, 422) => "Request body is not valid for this route".to_string(),
        (None, _) => status.reason_lossy().to_string(),
    };
    (status, Json(ErrorBody::new(message)))
}

#[catch(400)]
fn bad_request(req: &Request<'_>) -> (Status, Json<ErrorBody>) {
    error_body(Status::BadRequest, req)
}

#[catch(403)]
fn forbidden(req: &Request<'_>) -> (Status, Json<ErrorBody>) {
    error_body(Status::Forbidden, req)
}

#[catch(404)]
fn not_found(req: &Request<'_>) -> (Status, Json<ErrorBody>) {
    error_body(Status::NotFound, req)
}

#[catch(422)]
fn unprocessable_entity(req: &Request<'_>) -> (Status, Json<ErrorBody>) {
    error_body(Status::UnprocessableEntity, req)
}

#[catch(500)]
fn internal_error(req: &Request<'_>) -> (Status, Json<ErrorBody>) {
    error_body(Status::InternalServerError, req)
}

#[catch(default)]
fn any_error(status: Status, req: &Request<'_>) -> (Status, Json<ErrorBody>) {
    error_body(status, req)
}

#[cfg(test)]
mod tests {
    use rocket::{
        http::{ContentType, Header, Status},
        local::asynchronous::Client,
    };

    use crate::model::api::ErrorBody;

    #[backend_test(empty)]
    async fn unknown_route_is_json(client: Client) {
        let response = client.get("/api/nothing-here").dispatch().await;
        assert_eq!(response.status(), Status::NotFound);
        let body = response.into_json::<ErrorBody>().await.unwrap();
        assert!(!body.success);
        assert!(body.error.contains("/api/nothing-here"));
    }

    #[backend_test]
    async fn malformed_badges_header(client: Client) {
        let response = client
            .get("/api/votes")
            .header(Header::new("x-user-badges", "not json"))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::BadRequest);
        let body = response.into_json::<ErrorBody>().await.unwrap();
        assert!(body.error.contains("x-user-badges"));
    }

    #[backend_test]
    async fn unparseable_body(client: Client) {
        let response = client
            .post("/api/marketplace/transactions")
            .header(ContentType::JSON)
            .body(r#"{"listingId": "listing-001", "quantity": "lots"}"#)
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::UnprocessableEntity);
        let body = response.into_json::<ErrorBody>().await.unwrap();
        assert!(!body.success);
    }
}
