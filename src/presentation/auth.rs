use crate::domain::user::Role;
use crate::presentation::error::ApiError;
use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpMessage, HttpRequest};
use std::future::{Ready, ready};
use std::marker::PhantomData;

/// Identity decoded from the bearer token by `JwtAuthMiddleware`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub id: i64,
    pub scope: Role,
}

impl FromRequest for AuthenticatedUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let user = req.extensions().get::<AuthenticatedUser>().copied();
        ready(user.ok_or_else(|| ApiError::Unauthorized("Missing authentication".to_string())))
    }
}

/// Set of scopes allowed through a [`Scoped`] guard.
pub trait ScopePolicy {
    const ALLOWED: &'static [Role];
}

pub struct UserOrAdmin;

impl ScopePolicy for UserOrAdmin {
    const ALLOWED: &'static [Role] = &[Role::User, Role::Admin];
}

pub struct AdminOnly;

impl ScopePolicy for AdminOnly {
    const ALLOWED: &'static [Role] = &[Role::Admin];
}

/// Authenticated caller whose scope satisfies `P`.
///
/// No identity gives 401, an identity outside `P::ALLOWED` gives 403.
pub struct Scoped<P: ScopePolicy> {
    pub user: AuthenticatedUser,
    _policy: PhantomData<P>,
}

impl<P: ScopePolicy> Scoped<P> {
    pub fn id(&self) -> i64 {
        self.user.id
    }
}

impl<P: ScopePolicy> FromRequest for Scoped<P> {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let result = match req.extensions().get::<AuthenticatedUser>().copied() {
            None => Err(ApiError::Unauthorized("Missing authentication".to_string())),
            Some(user) if P::ALLOWED.contains(&user.scope) => Ok(Scoped {
                user,
                _policy: PhantomData,
            }),
            Some(user) => Err(ApiError::Forbidden(format!(
                "Insufficient scope: \"{}\"",
                user.scope
            ))),
        };
        ready(result)
    }
}
