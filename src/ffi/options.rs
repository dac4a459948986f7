//! Neighbor sampling options object

use super::convert::{compression_type, prior_sources_behavior};
use super::{ffi_create, ffi_entry, release, Bool, ErrorObject};
use crate::error::{Error, StatusCode};
use crate::options::SamplingOptions;
use std::os::raw::c_int;

#[no_mangle]
/// Create sampling options with default settings
///
/// # Safety
/// `options` and `error` must be valid for writes.
pub unsafe extern "C" fn tg_sampling_options_create(
    options: *mut *mut SamplingOptions,
    error: *mut *mut ErrorObject,
) -> StatusCode {
    unsafe { ffi_create("tg_sampling_options_create", options, error, || Ok(SamplingOptions::new())) }
}

#[no_mangle]
/// Release sampling options
///
/// # Safety
/// `options` must be null or live, freed at most once.
pub unsafe extern "C" fn tg_sampling_options_free(options: *mut SamplingOptions) {
    unsafe { release(options) }
}

#[no_mangle]
/// Sample with replacement
///
/// # Safety
/// `options` must be null or live.
pub unsafe extern "C" fn tg_sampling_set_with_replacement(options: *mut SamplingOptions, value: Bool) {
    if let Some(options) = unsafe { options.as_mut() } {
        options.set_with_replacement(value.into());
    }
}

#[no_mangle]
/// Report the hop of every sampled edge
///
/// # Safety
/// `options` must be null or live.
pub unsafe extern "C" fn tg_sampling_set_return_hops(options: *mut SamplingOptions, value: Bool) {
    if let Some(options) = unsafe { options.as_mut() } {
        options.set_return_hops(value.into());
    }
}

#[no_mangle]
/// Deduplicate every frontier
///
/// # Safety
/// `options` must be null or live.
pub unsafe extern "C" fn tg_sampling_set_dedupe_sources(options: *mut SamplingOptions, value: Bool) {
    if let Some(options) = unsafe { options.as_mut() } {
        options.set_dedupe_sources(value.into());
    }
}

#[no_mangle]
/// Renumber sampled vertices per label
///
/// # Safety
/// `options` must be null or live.
pub unsafe extern "C" fn tg_sampling_set_renumber_results(options: *mut SamplingOptions, value: Bool) {
    if let Some(options) = unsafe { options.as_mut() } {
        options.set_renumber_results(value.into());
    }
}

#[no_mangle]
/// Compress every hop separately
///
/// # Safety
/// `options` must be null or live.
pub unsafe extern "C" fn tg_sampling_set_compress_per_hop(options: *mut SamplingOptions, value: Bool) {
    if let Some(options) = unsafe { options.as_mut() } {
        options.set_compress_per_hop(value.into());
    }
}

#[no_mangle]
/// Policy for earlier sources, by raw id (0 default, 1 carry-over, 2 exclude)
///
/// # Safety
/// `options` must be live; `error` must be null or valid for writes.
pub unsafe extern "C" fn tg_sampling_set_prior_sources_behavior(
    options: *mut SamplingOptions,
    value: c_int,
    error: *mut *mut ErrorObject,
) -> StatusCode {
    unsafe {
        ffi_entry("tg_sampling_set_prior_sources_behavior", error, || {
            let options = options
                .as_mut()
                .ok_or_else(|| Error::InvalidPointer("sampling options are null".to_string()))?;
            options.set_prior_sources_behavior(prior_sources_behavior(value)?);
            Ok(())
        })
    }
}

#[no_mangle]
/// Output layout, by raw id (0 COO, 1 CSR, 2 CSC, 3 DCSR, 4 DCSC)
///
/// # Safety
/// `options` must be live; `error` must be null or valid for writes.
pub unsafe extern "C" fn tg_sampling_set_compression_type(
    options: *mut SamplingOptions,
    value: c_int,
    error: *mut *mut ErrorObject,
) -> StatusCode {
    unsafe {
        ffi_entry("tg_sampling_set_compression_type", error, || {
            let options = options
                .as_mut()
                .ok_or_else(|| Error::InvalidPointer("sampling options are null".to_string()))?;
            options.set_compression_type(compression_type(value)?);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{CompressionType, PriorSourcesBehavior};
    use crate::ffi::tg_error_free;
    use std::ptr;

    #[test]
    fn test_setters() {
        unsafe {
            let mut options = ptr::null_mut();
            let mut error = ptr::null_mut();
            assert_eq!(tg_sampling_options_create(&mut options, &mut error), StatusCode::Success);
            tg_sampling_set_return_hops(options, Bool::True);
            tg_sampling_set_renumber_results(options, Bool::True);
            assert_eq!(tg_sampling_set_compression_type(options, 3, &mut error), StatusCode::Success);
            assert_eq!(
                tg_sampling_set_prior_sources_behavior(options, 2, &mut error),
                StatusCode::Success
            );

            let read = &*options;
            assert!(read.return_hops());
            assert!(read.renumber_results());
            assert_eq!(read.compression_type(), CompressionType::Dcsr);
            assert_eq!(read.prior_sources_behavior(), PriorSourcesBehavior::Exclude);

            assert_eq!(tg_sampling_set_compression_type(options, 9, &mut error), StatusCode::InvalidValue);
            tg_error_free(error);
            tg_sampling_options_free(options);
        }
    }
}
