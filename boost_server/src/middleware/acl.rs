//! Access control list middleware for the Boost Market server.
//! This middleware can be placed on any route or service.
//!
//! It checks the incoming request for a valid access token, and then checks the roles in the token's claims against
//! the roles the route requires. If the token is valid and carries every required role, the claims are stored in the
//! request extensions and the request continues. Otherwise a 401 or 403 error is returned.

use std::{future::Future, pin::Pin, rc::Rc};

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web,
    Error,
    HttpMessage,
};
use boost_engine::db_types::Role;
use futures::future::{ok, Ready};
use log::*;

use crate::{
    auth::{verify_headers, JwtClaims, TokenVerifier},
    errors::ServerError,
};

pub struct AclMiddlewareFactory {
    required_roles: Vec<Role>,
}

impl AclMiddlewareFactory {
    pub fn new(required_roles: &[Role]) -> Self {
        AclMiddlewareFactory { required_roles: required_roles.to_vec() }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AclMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AclMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(AclMiddlewareService { required_roles: self.required_roles.clone(), service: Rc::new(service) })
    }
}

pub struct AclMiddlewareService<S> {
    required_roles: Vec<Role>,
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AclMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let required_roles = self.required_roles.clone();
        Box::pin(async move {
            let claims = claims_for_request(&req)?;
            if let Some(missing) = required_roles.iter().find(|role| !claims.has_role(**role)) {
                warn!("💻️ {} tried to access {} without the {missing} role", claims.sub, req.path());
                return Err(ServerError::InsufficientPermissions(format!("The {missing} role is required")).into());
            }
            service.call(req).await
        })
    }
}

fn claims_for_request(req: &ServiceRequest) -> Result<JwtClaims, ServerError> {
    if let Some(claims) = req.extensions().get::<JwtClaims>().cloned() {
        return Ok(claims);
    }
    let claims = verify_headers(req.app_data::<web::Data<TokenVerifier>>(), req.headers())?;
    req.extensions_mut().insert(claims.clone());
    Ok(claims)
}
