//! Pending results returned by asynchronous host functions.

use std::fmt;
use std::future::Future;

use futures::future::{FutureExt, LocalBoxFuture, Shared};

use crate::{JsError, Value};

/// A value that will be available later.
///
/// Host functions return `Value::Deferred` to make the executor suspend at
/// the call site until the future settles. The future is shared, so clones
/// of the same deferred value observe one computation.
///
/// # Examples
///
/// ```
/// use core_types::{Deferred, Value};
///
/// let deferred = Deferred::new(async { Ok(Value::Number(7.0)) });
/// let value = futures::executor::block_on(deferred.settle()).unwrap();
/// assert_eq!(value, Value::Number(7.0));
/// ```
#[derive(Clone)]
pub struct Deferred(Shared<LocalBoxFuture<'static, Result<Value, JsError>>>);

impl Deferred {
    /// Wraps a future.
    pub fn new<F>(future: F) -> Self
    where
        F: Future<Output = Result<Value, JsError>> + 'static,
    {
        Deferred(future.boxed_local().shared())
    }

    /// Creates an already-settled deferred value.
    pub fn resolved(value: Value) -> Self {
        Deferred::new(futures::future::ready(Ok(value)))
    }

    /// Creates an already-failed deferred value.
    pub fn rejected(error: JsError) -> Self {
        Deferred::new(futures::future::ready(Err(error)))
    }

    /// Waits for the result. A deferred that resolves to another deferred
    /// is followed until a plain value is reached.
    pub async fn settle(self) -> Result<Value, JsError> {
        let mut current = self;
        loop {
            match current.0.await? {
                Value::Deferred(next) => current = next,
                value => return Ok(value),
            }
        }
    }
}

impl fmt::Debug for Deferred {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Deferred { <pending> }")
    }
}
