use crate::errors::ServiceError;
use serde::de::DeserializeOwned;

/// Wraps client input until it has been checked.
///
/// Handlers extract `Json<Validator<T>>` or `Query<Validator<T>>` and can only
/// reach the inner value through [`Validator::validate`].
#[derive(Deserialize, Debug)]
#[serde(transparent)]
pub struct Validator<T>(T);

/// Checks client input and turns it into the form the store layer works with
pub trait Validate {
    type Output;

    fn validate(self) -> Result<Self::Output, ServiceError>;
}

impl<T> Validator<T> {
    #[allow(dead_code)]
    pub fn new(i: T) -> Validator<T> {
        Validator::<T>(i)
    }
}

impl<T> Validator<T>
where
    T: Validate,
    T: DeserializeOwned,
{
    pub fn validate(self) -> Result<T::Output, ServiceError> {
        self.0.validate()
    }
}
