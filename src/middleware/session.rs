use actix_web::{
    cookie::{Cookie, SameSite},
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage,
};
use chrono::Utc;
use futures::future::{ready, LocalBoxFuture, Ready};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use log::{debug, error};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use crate::config::SESSION_COOKIE;
use crate::db::session_store::SessionStore;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SessionClaims {
    pub sid: String, // session id in the store
    pub iat: usize,
    pub exp: usize,
}

/// Session id for the current request. Empty until a handler first writes
/// session state, at which point the store allocates one.
#[derive(Debug, Clone, Default)]
pub struct SessionSlot(Rc<RefCell<Option<String>>>);

impl SessionSlot {
    pub fn new(id: Option<String>) -> Self {
        Self(Rc::new(RefCell::new(id)))
    }

    pub fn get(&self) -> Option<String> {
        self.0.borrow().clone()
    }

    pub fn get_or_create(&self, store: &SessionStore) -> String {
        self.0
            .borrow_mut()
            .get_or_insert_with(|| store.create())
            .clone()
    }
}

pub fn sign_session(sid: &str, secret: &str, store: &SessionStore) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let claims = SessionClaims {
        sid: sid.to_string(),
        iat: now.timestamp() as usize,
        exp: (now + store.lifetime()).timestamp() as usize,
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

pub fn verify_session(token: &str, secret: &str) -> Option<SessionClaims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.set_required_spec_claims(&["exp"]);

    match decode::<SessionClaims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation) {
        Ok(data) => Some(data.claims),
        Err(err) => {
            debug!("Rejecting session cookie: {:?}", err);
            None
        }
    }
}

/// Resolves the signed session cookie into a [`SessionSlot`]. Requests
/// without a valid cookie get an empty slot; the cookie is only issued when
/// the handler ends up creating a session.
pub struct SessionMiddleware {
    store: Arc<SessionStore>,
    secret: Rc<str>,
}

impl SessionMiddleware {
    pub fn new(store: Arc<SessionStore>, secret: &str) -> Self {
        Self {
            store,
            secret: Rc::from(secret),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for SessionMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = SessionMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SessionMiddlewareService {
            service,
            store: self.store.clone(),
            secret: self.secret.clone(),
        }))
    }
}

pub struct SessionMiddlewareService<S> {
    service: S,
    store: Arc<SessionStore>,
    secret: Rc<str>,
}

impl<S, B> Service<ServiceRequest> for SessionMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let existing = req
            .cookie(SESSION_COOKIE)
            .and_then(|cookie| verify_session(cookie.value(), &self.secret))
            .map(|claims| claims.sid)
            .filter(|sid| self.store.contains(sid));

        let had_session = existing.is_some();
        let slot = SessionSlot::new(existing);
        req.extensions_mut().insert(slot.clone());

        let store = self.store.clone();
        let secret = self.secret.clone();
        let fut = self.service.call(req);

        Box::pin(async move {
            let mut res = fut.await?;
            if had_session {
                return Ok(res);
            }
            if let Some(sid) = slot.get() {
                match sign_session(&sid, &secret, &store) {
                    Ok(token) => {
                        let cookie = Cookie::build(SESSION_COOKIE, token)
                            .path("/")
                            .http_only(true)
                            .same_site(SameSite::Lax)
                            .finish();
                        res.response_mut().add_cookie(&cookie)?;
                    }
                    Err(err) => error!("Failed to sign session cookie: {:?}", err),
                }
            }
            Ok(res)
        })
    }
}
