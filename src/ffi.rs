//! FFI bindings for Phenomind Analytics
//!
//! This module provides C-compatible functions for calling the analytics
//! pipeline from other languages. All functions take and return null-terminated
//! JSON strings; returned strings must be freed with `phenomind_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::error::AnalyticsError;
use crate::pipeline::{patient_analytics, population_analytics, AnalyticsProcessor};

thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Read a caller-owned C string
unsafe fn cstr_to_string(ptr: *const c_char, what: &str) -> Result<String, AnalyticsError> {
    if ptr.is_null() {
        return Err(AnalyticsError::InvalidInput(format!("Null {what} pointer")));
    }
    CStr::from_ptr(ptr)
        .to_str()
        .map(str::to_string)
        .map_err(|_| AnalyticsError::InvalidInput(format!("{what} is not valid UTF-8")))
}

/// Hand a string to the caller (caller must free)
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => {
            set_last_error("Output contains an interior NUL byte");
            ptr::null_mut()
        }
    }
}

/// Convert a pipeline result into an owned C string, recording failures
fn into_cstr(result: Result<String, AnalyticsError>) -> *mut c_char {
    match result {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Stateless API
// ============================================================================

/// Compute patient analytics for a JSON request.
///
/// # Safety
/// - `request_json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `phenomind_free_string`.
/// - Returns NULL on error; call `phenomind_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn phenomind_patient_analytics(request_json: *const c_char) -> *mut c_char {
    clear_last_error();
    into_cstr(cstr_to_string(request_json, "request JSON").and_then(patient_analytics))
}

/// Compute population analytics for a JSON array of patient records.
///
/// # Safety
/// - `members_json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `phenomind_free_string`.
/// - Returns NULL on error; call `phenomind_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn phenomind_population_analytics(
    members_json: *const c_char,
) -> *mut c_char {
    clear_last_error();
    into_cstr(cstr_to_string(members_json, "members JSON").and_then(population_analytics))
}

// ============================================================================
// Processor API
// ============================================================================

/// Opaque handle to an AnalyticsProcessor
pub struct PhenomindProcessorHandle {
    processor: AnalyticsProcessor,
}

/// Create a processor with default thresholds.
///
/// # Safety
/// - Returns a pointer to a newly allocated processor.
/// - Must be freed with `phenomind_processor_free`.
#[no_mangle]
pub unsafe extern "C" fn phenomind_processor_new() -> *mut PhenomindProcessorHandle {
    clear_last_error();
    Box::into_raw(Box::new(PhenomindProcessorHandle {
        processor: AnalyticsProcessor::new(),
    }))
}

/// Create a processor from a JSON configuration document.
///
/// # Safety
/// - `config_json` must be a valid null-terminated C string.
/// - Must be freed with `phenomind_processor_free`.
/// - Returns NULL if the configuration is invalid; call `phenomind_last_error`.
#[no_mangle]
pub unsafe extern "C" fn phenomind_processor_new_with_config(
    config_json: *const c_char,
) -> *mut PhenomindProcessorHandle {
    clear_last_error();

    let processor = cstr_to_string(config_json, "config JSON")
        .and_then(|json| AnalyticsProcessor::from_config_json(&json));

    match processor {
        Ok(processor) => Box::into_raw(Box::new(PhenomindProcessorHandle { processor })),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Compute patient analytics with a configured processor.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `phenomind_processor_new*`.
/// - `request_json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `phenomind_free_string`.
/// - Returns NULL on error; call `phenomind_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn phenomind_processor_analyze(
    processor: *const PhenomindProcessorHandle,
    request_json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    if processor.is_null() {
        set_last_error("Null processor pointer");
        return ptr::null_mut();
    }

    let handle = &*processor;
    into_cstr(
        cstr_to_string(request_json, "request JSON")
            .and_then(|json| handle.processor.process_patient(&json)),
    )
}

/// Free a processor.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `phenomind_processor_new*`, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn phenomind_processor_free(processor: *mut PhenomindProcessorHandle) {
    if !processor.is_null() {
        drop(Box::from_raw(processor));
    }
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by a Phenomind function.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by a Phenomind function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn phenomind_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Get the last error message.
///
/// # Safety
/// - Returns a pointer to a thread-local error string.
/// - The returned pointer is valid until the next Phenomind call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn phenomind_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

// ============================================================================
// Version Information
// ============================================================================

/// Get the library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn phenomind_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_request() -> CString {
        CString::new(
            r#"{
            "patient": {
                "riskScore": 80,
                "disorder": "GAD",
                "disorderFull": "Generalized Anxiety Disorder",
                "wearable": { "hrvBaseline": 55 }
            },
            "series": [
                { "day": "2024-05-01", "mood": 5, "sleep": 6.4, "hrv": 39, "activity": 7400 },
                { "day": "2024-05-02", "mood": 4, "sleep": 6.1, "hrv": 37, "activity": 6900 },
                { "day": "2024-05-03", "mood": 5, "sleep": 6.6, "hrv": 41, "activity": 7100 }
            ]
        }"#,
        )
        .unwrap()
    }

    unsafe fn take_string(ptr: *mut c_char) -> String {
        assert!(!ptr.is_null());
        let s = CStr::from_ptr(ptr).to_str().unwrap().to_string();
        phenomind_free_string(ptr);
        s
    }

    #[test]
    fn test_ffi_patient_analytics() {
        let request = sample_request();

        unsafe {
            let json = take_string(phenomind_patient_analytics(request.as_ptr()));
            let report: serde_json::Value = serde_json::from_str(&json).unwrap();

            assert_eq!(report["riskScore"], 80.0);
            assert_eq!(report["recommendations"][0]["action"], "urgent_evaluation");
            assert!(phenomind_last_error().is_null());
        }
    }

    #[test]
    fn test_ffi_population_analytics() {
        let members = CString::new(r#"[{ "riskScore": 70, "disorderFull": "PTSD" }]"#).unwrap();

        unsafe {
            let json = take_string(phenomind_population_analytics(members.as_ptr()));
            let report: serde_json::Value = serde_json::from_str(&json).unwrap();
            assert_eq!(report["summary"]["highRiskPercentage"], 100.0);
        }
    }

    #[test]
    fn test_ffi_processor_lifecycle() {
        let config = CString::new(r#"{ "engine": { "max_recommendations": 2 } }"#).unwrap();
        let request = sample_request();

        unsafe {
            let processor = phenomind_processor_new_with_config(config.as_ptr());
            assert!(!processor.is_null());

            let json = take_string(phenomind_processor_analyze(processor, request.as_ptr()));
            let report: serde_json::Value = serde_json::from_str(&json).unwrap();
            assert_eq!(report["recommendations"].as_array().unwrap().len(), 2);

            let default_processor = phenomind_processor_new();
            let json = take_string(phenomind_processor_analyze(
                default_processor,
                request.as_ptr(),
            ));
            assert!(json.contains("biomarkerDrivers"));

            phenomind_processor_free(processor);
            phenomind_processor_free(default_processor);
            phenomind_processor_free(ptr::null_mut());
        }
    }

    #[test]
    fn test_ffi_invalid_config() {
        let config = CString::new(r#"{ "engine": { "max_recommendations": 0 } }"#).unwrap();

        unsafe {
            let processor = phenomind_processor_new_with_config(config.as_ptr());
            assert!(processor.is_null());

            let error = CStr::from_ptr(phenomind_last_error()).to_str().unwrap();
            assert!(error.contains("max_recommendations"));
        }
    }

    #[test]
    fn test_ffi_error_handling() {
        let invalid = CString::new("not json").unwrap();

        unsafe {
            let result = phenomind_patient_analytics(invalid.as_ptr());
            assert!(result.is_null());

            let error = phenomind_last_error();
            assert!(!error.is_null());
            let error_str = CStr::from_ptr(error).to_str().unwrap();
            assert!(error_str.starts_with("Invalid JSON"));

            assert!(phenomind_patient_analytics(ptr::null()).is_null());
            let error_str = CStr::from_ptr(phenomind_last_error()).to_str().unwrap();
            assert!(error_str.contains("Null request JSON pointer"));

            let result = phenomind_processor_analyze(ptr::null(), invalid.as_ptr());
            assert!(result.is_null());
        }
    }

    #[test]
    fn test_ffi_version() {
        unsafe {
            let version = phenomind_version();
            assert!(!version.is_null());

            let version_str = CStr::from_ptr(version).to_str().unwrap();
            assert_eq!(version_str, crate::PHENOMIND_VERSION);
        }
    }
}
