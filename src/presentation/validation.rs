//! [`Valid`] deserializes a JSON body and checks it against its [`Validate`]
//! rules before the handler body runs.

use crate::domain::validation::Validate;
use crate::presentation::error::ApiError;
use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest, web};
use serde::de::DeserializeOwned;
use std::future::Future;
use std::ops::Deref;
use std::pin::Pin;

/// JSON body that passed both deserialization and [`Validate`].
#[derive(Debug)]
pub struct Valid<T>(pub T);

impl<T> Valid<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for Valid<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> FromRequest for Valid<T>
where
    T: DeserializeOwned + Validate + 'static,
{
    type Error = ApiError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let json = web::Json::<T>::from_request(req, payload);
        Box::pin(async move {
            let value = json
                .await
                .map_err(|e| ApiError::Validation(e.to_string()))?
                .into_inner();
            value.validate().map_err(ApiError::Validation)?;
            Ok(Valid(value))
        })
    }
}
