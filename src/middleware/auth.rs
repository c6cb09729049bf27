use crate::config::JwtSettings;
use crate::database::CalendarStore;
use crate::models::AuthenticatedUser;
use crate::services::auth_service;
use crate::utils::AppError;
use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, HttpMessage,
};
use futures::future::LocalBoxFuture;
use std::future::{ready, Ready};
use std::rc::Rc;

/// Verifies the bearer token, loads the user and attaches an
/// [`AuthenticatedUser`] to the request. Handlers behind it read the
/// user with `web::ReqData<AuthenticatedUser>`.
pub struct AuthMiddleware {
    settings: Rc<JwtSettings>,
}

impl AuthMiddleware {
    pub fn new(settings: JwtSettings) -> Self {
        Self {
            settings: Rc::new(settings),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
            settings: Rc::clone(&self.settings),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
    settings: Rc<JwtSettings>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let settings = Rc::clone(&self.settings);

        Box::pin(async move {
            let result = authenticate(&req, &settings).await;

            match result {
                Ok(user) => {
                    req.extensions_mut().insert(user);
                    let res = service.call(req).await?;
                    Ok(res.map_into_left_body())
                }
                Err(e) => Ok(req.error_response(e).map_into_right_body()),
            }
        })
    }
}

fn bearer_token(req: &ServiceRequest) -> Result<&str, AppError> {
    let header = req
        .headers()
        .get("Authorization")
        .ok_or_else(|| AppError::Unauthenticated("Missing authorization token".to_string()))?;

    header
        .to_str()
        .ok()
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::Unauthenticated("Invalid token format".to_string()))
}

async fn authenticate(req: &ServiceRequest, settings: &JwtSettings) -> Result<AuthenticatedUser, AppError> {
    let token = bearer_token(req)?;
    let claims = auth_service::verify_token(token, settings)?;

    let store = req
        .app_data::<web::Data<dyn CalendarStore>>()
        .ok_or_else(|| AppError::Config("Calendar store is not registered".to_string()))?;

    auth_service::resolve_user(store.get_ref(), &claims).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use crate::models::User;
    use crate::services::auth_service::{issue_token, test_settings};
    use actix_web::{http::StatusCode, test, App, HttpResponse};
    use mongodb::bson::oid::ObjectId;
    use std::sync::Arc;

    async fn whoami(user: web::ReqData<AuthenticatedUser>) -> HttpResponse {
        HttpResponse::Ok().body(user.id.to_hex())
    }

    async fn store_with(user_id: ObjectId) -> web::Data<dyn CalendarStore> {
        let store = MemoryStore::new();
        store
            .insert_user(User { id: user_id, email: "a@example.com".into(), name: None, starred_events: vec![] })
            .await;
        let store: Arc<dyn CalendarStore> = Arc::new(store);
        web::Data::from(store)
    }

    #[actix_rt::test]
    async fn test_known_user_reaches_handler() {
        let user_id = ObjectId::new();
        let app = test::init_service(
            App::new()
                .app_data(store_with(user_id).await)
                .wrap(AuthMiddleware::new(test_settings()))
                .route("/whoami", web::get().to(whoami)),
        )
        .await;

        let token = issue_token(&user_id.to_hex(), &test_settings());
        let req = test::TestRequest::get()
            .uri("/whoami")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();
        let body = test::call_and_read_body(&app, req).await;
        assert_eq!(body, user_id.to_hex().as_bytes());
    }

    #[actix_rt::test]
    async fn test_rejects_missing_header_and_unknown_user() {
        let app = test::init_service(
            App::new()
                .app_data(store_with(ObjectId::new()).await)
                .wrap(AuthMiddleware::new(test_settings()))
                .route("/whoami", web::get().to(whoami)),
        )
        .await;

        let req = test::TestRequest::get().uri("/whoami").to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

        let req = test::TestRequest::get()
            .uri("/whoami")
            .insert_header(("Authorization", "Token abc"))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

        let stranger = issue_token(&ObjectId::new().to_hex(), &test_settings());
        let req = test::TestRequest::get()
            .uri("/whoami")
            .insert_header(("Authorization", format!("Bearer {}", stranger)))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["statusCode"], 401);
        assert_eq!(body["name"], "Unauthenticated");
    }
}
