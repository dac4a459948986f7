//! Flat C ABI over the Rust API
//!
//! Every object crosses the boundary as an opaque pointer to the matching Rust
//! type (`*mut ResourceHandle`, `*mut Graph`, `*mut PathsResult`, ...). Objects
//! returned through an out-parameter are owned by the caller and released
//! with the matching `tg_*_free` function.
//!
//! Fallible calls share one shape:
//!
//! ```text
//! tg_call(inputs..., *mut *mut Output, *mut *mut ErrorObject) -> StatusCode
//! ```
//!
//! On success the output is set and the error is null. On failure the output
//! is null and the error holds a message the caller must release with
//! [`tg_error_free`]. Panics never unwind into C: they are caught and reported
//! as [`StatusCode::ThrownException`].

use crate::error::{Error, Result, StatusCode};
use std::any::Any;
use std::ffi::CString;
use std::os::raw::c_char;
use std::panic::{self, AssertUnwindSafe};
use std::ptr;

pub mod algorithms;
pub mod array;
pub mod convert;
pub mod graph;
pub mod options;
pub mod resource;
pub mod results;

pub use algorithms::*;
pub use array::*;
pub use graph::*;
pub use options::*;
pub use resource::*;
pub use results::*;

/// C boolean
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bool {
    /// false
    False = 0,
    /// true
    True = 1,
}

impl From<Bool> for bool {
    fn from(value: Bool) -> Self {
        matches!(value, Bool::True)
    }
}

impl From<bool> for Bool {
    fn from(value: bool) -> Self {
        if value {
            Self::True
        } else {
            Self::False
        }
    }
}

/// Failure description handed to C callers
#[derive(Debug)]
pub struct ErrorObject {
    code: StatusCode,
    message: CString,
}

impl ErrorObject {
    fn new(error: &Error) -> Self {
        let text = error.to_string().replace('\0', " ");
        Self {
            code: error.code(),
            message: CString::new(text).unwrap_or_default(),
        }
    }

    /// Status the failing call returned
    #[must_use]
    pub const fn code(&self) -> StatusCode {
        self.code
    }

    /// Message text
    #[must_use]
    pub fn message(&self) -> &str {
        self.message.to_str().unwrap_or_default()
    }
}

#[no_mangle]
/// Message of an error object
///
/// # Safety
/// `error` must be null or a pointer returned by a `tg_` call and not yet
/// freed. The returned string lives as long as the error object.
pub unsafe extern "C" fn tg_error_message(error: *const ErrorObject) -> *const c_char {
    if error.is_null() {
        return ptr::null();
    }
    let error = unsafe { &*error };
    error.message.as_ptr()
}

#[no_mangle]
/// Status code stored in an error object (`SUCCESS` for null)
///
/// # Safety
/// `error` must be null or a live error object.
pub unsafe extern "C" fn tg_error_code(error: *const ErrorObject) -> StatusCode {
    if error.is_null() {
        return StatusCode::Success;
    }
    unsafe { (*error).code }
}

#[no_mangle]
/// Release an error object; null is accepted
///
/// # Safety
/// `error` must be null or a live error object, freed at most once.
pub unsafe extern "C" fn tg_error_free(error: *mut ErrorObject) {
    if !error.is_null() {
        drop(unsafe { Box::from_raw(error) });
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "panic with a non-string payload".to_string()
    }
}

/// Run `call`, translating its outcome into a status and error object
///
/// # Safety
/// `error` must be null or valid for writes.
pub(crate) unsafe fn ffi_entry<F>(name: &'static str, error: *mut *mut ErrorObject, call: F) -> StatusCode
where
    F: FnOnce() -> Result<()>,
{
    if !error.is_null() {
        unsafe { *error = ptr::null_mut() };
    }
    let outcome = panic::catch_unwind(AssertUnwindSafe(call))
        .unwrap_or_else(|payload| Err(Error::ThrownException(panic_message(payload.as_ref()))));
    match outcome {
        Ok(()) => StatusCode::Success,
        Err(err) => {
            let code = err.code();
            tracing::debug!(call = name, %code, error = %err, "C call failed");
            if !error.is_null() {
                unsafe { *error = Box::into_raw(Box::new(ErrorObject::new(&err))) };
            }
            code
        }
    }
}

/// Run `call` and hand its value to the caller through `out`
///
/// # Safety
/// `out` and `error` must each be null or valid for writes.
pub(crate) unsafe fn ffi_create<T, F>(
    name: &'static str,
    out: *mut *mut T,
    error: *mut *mut ErrorObject,
    call: F,
) -> StatusCode
where
    F: FnOnce() -> Result<T>,
{
    if !out.is_null() {
        unsafe { *out = ptr::null_mut() };
    }
    unsafe {
        ffi_entry(name, error, || {
            if out.is_null() {
                return Err(Error::InvalidPointer(format!("{name}: null output pointer")));
            }
            let value = call()?;
            *out = Box::into_raw(Box::new(value));
            Ok(())
        })
    }
}

/// Borrow a required object
///
/// # Safety
/// `ptr` must be null or point to a live `T` for the returned lifetime.
pub(crate) unsafe fn required<'a, T>(ptr: *const T, what: &str) -> Result<&'a T> {
    unsafe { ptr.as_ref() }.ok_or_else(|| Error::InvalidPointer(format!("{what} is null")))
}

/// Borrow an optional object
///
/// # Safety
/// Same as [`required`].
pub(crate) unsafe fn optional<'a, T>(ptr: *const T) -> Option<&'a T> {
    unsafe { ptr.as_ref() }
}

/// Borrow `len` objects from an array of pointers, none of them null
///
/// # Safety
/// `ptrs` must be null or valid for `len` reads; every element must point to
/// a live `T` for the returned lifetime.
pub(crate) unsafe fn required_list<'a, T>(ptrs: *const *const T, len: usize, what: &str) -> Result<Vec<&'a T>> {
    if len == 0 {
        return Ok(Vec::new());
    }
    if ptrs.is_null() {
        return Err(Error::InvalidPointer(format!("{what} is null")));
    }
    unsafe { std::slice::from_raw_parts(ptrs, len) }
        .iter()
        .map(|&p| unsafe { required(p, what) })
        .collect()
}

/// Release a boxed object; null is accepted
///
/// # Safety
/// `ptr` must be null or returned by a `tg_` call and not yet freed.
pub(crate) unsafe fn release<T>(ptr: *mut T) {
    if !ptr.is_null() {
        drop(unsafe { Box::from_raw(ptr) });
    }
}
