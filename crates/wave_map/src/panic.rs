//! Panic containment for game logic callbacks
//!
//! Map code is user code. A panic inside a factory, `initialize`, `update`
//! or `draw` must never take the host process down with it.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

/// Extract a readable message from a panic payload
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

/// Run a closure, converting a panic into an error message
pub fn catch_panic<F, R>(f: F) -> Result<R, String>
where
    F: FnOnce() -> R,
{
    panic::catch_unwind(AssertUnwindSafe(f)).map_err(|payload| panic_message(payload.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catch_panic_ok() {
        assert_eq!(catch_panic(|| 7), Ok(7));
    }

    #[test]
    fn test_catch_panic_messages() {
        let err = catch_panic(|| panic!("static message")).unwrap_err();
        assert_eq!(err, "static message");

        let value = 3;
        let err = catch_panic(|| panic!("formatted {}", value)).unwrap_err();
        assert_eq!(err, "formatted 3");
    }
}
