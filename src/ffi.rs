//! C-ABI FFI bindings for cross-language integration.
//!
//! Documents travel as byte buffers; the margin and fill configuration as
//! the same JSON documents the serde types accept, for example
//! `{"sides": ["right"], "width": 25}` and `{"type": "solid", "color": "#ffffff"}`.
//! A null configuration pointer selects the default.

use std::ffi::{c_char, CStr, CString};
use std::ptr;

use crate::model::{FillSpec, MarginConfig};
use crate::{export_document, generate_preview, inspect_document};

/// Byte buffer returned by [`notepdf_export`].
#[repr(C)]
pub struct NotepdfBuffer {
    /// Whether the operation succeeded.
    pub success: bool,
    /// Output bytes (null if failed). Must be freed with `notepdf_free_buffer`.
    pub data: *mut u8,
    /// Length of `data`.
    pub len: usize,
    /// Error message (null if succeeded). Must be freed with `notepdf_free_string`.
    pub error: *mut c_char,
}

impl NotepdfBuffer {
    fn success(bytes: Vec<u8>) -> Self {
        let (data, len) = into_raw_buffer(bytes);
        Self {
            success: true,
            data,
            len,
            error: ptr::null_mut(),
        }
    }

    fn error(message: String) -> Self {
        Self {
            success: false,
            data: ptr::null_mut(),
            len: 0,
            error: into_raw_string(message),
        }
    }
}

/// Preview buffers returned by [`notepdf_preview`].
#[repr(C)]
pub struct NotepdfPreview {
    /// Whether the operation succeeded.
    pub success: bool,
    /// Unmodified first pages. Must be freed with `notepdf_free_buffer`.
    pub original: *mut u8,
    /// Length of `original`.
    pub original_len: usize,
    /// First pages with margins. Must be freed with `notepdf_free_buffer`.
    pub transformed: *mut u8,
    /// Length of `transformed`.
    pub transformed_len: usize,
    /// Page count of the whole source document, -1 on error.
    pub total_page_count: i64,
    /// Error message (null if succeeded). Must be freed with `notepdf_free_string`.
    pub error: *mut c_char,
}

impl NotepdfPreview {
    fn error(message: String) -> Self {
        Self {
            success: false,
            original: ptr::null_mut(),
            original_len: 0,
            transformed: ptr::null_mut(),
            transformed_len: 0,
            total_page_count: -1,
            error: into_raw_string(message),
        }
    }
}

fn into_raw_buffer(bytes: Vec<u8>) -> (*mut u8, usize) {
    let boxed = bytes.into_boxed_slice();
    let len = boxed.len();
    (Box::into_raw(boxed) as *mut u8, len)
}

fn into_raw_string(message: String) -> *mut c_char {
    CString::new(message).unwrap_or_default().into_raw()
}

unsafe fn input_bytes<'a>(data: *const u8, len: usize) -> Result<&'a [u8], String> {
    if data.is_null() {
        return Err("Input buffer cannot be null".to_string());
    }
    Ok(std::slice::from_raw_parts(data, len))
}

unsafe fn parse_config<T>(json: *const c_char, what: &str) -> Result<T, String>
where
    T: serde::de::DeserializeOwned + Default,
{
    if json.is_null() {
        return Ok(T::default());
    }
    let text = CStr::from_ptr(json)
        .to_str()
        .map_err(|_| format!("Invalid UTF-8 {} configuration", what))?;
    serde_json::from_str(text).map_err(|e| format!("Invalid {} configuration: {}", what, e))
}

/// Add margins to every page of a PDF held in memory.
///
/// # Safety
///
/// `data` must point to `len` readable bytes. `margin_json` and `fill_json`
/// must be null or valid null-terminated UTF-8 strings.
/// The returned buffer and error must be freed with `notepdf_free_buffer`
/// and `notepdf_free_string`.
#[no_mangle]
pub unsafe extern "C" fn notepdf_export(
    data: *const u8,
    len: usize,
    margin_json: *const c_char,
    fill_json: *const c_char,
) -> NotepdfBuffer {
    let input = match input_bytes(data, len) {
        Ok(input) => input,
        Err(e) => return NotepdfBuffer::error(e),
    };
    let margin: MarginConfig = match parse_config(margin_json, "margin") {
        Ok(margin) => margin,
        Err(e) => return NotepdfBuffer::error(e),
    };
    let fill: FillSpec = match parse_config(fill_json, "fill") {
        Ok(fill) => fill,
        Err(e) => return NotepdfBuffer::error(e),
    };

    match export_document(input, &margin, &fill) {
        Ok(bytes) => NotepdfBuffer::success(bytes),
        Err(e) => NotepdfBuffer::error(e.to_string()),
    }
}

/// Build original and transformed previews of the first pages.
///
/// # Safety
///
/// Same requirements as [`notepdf_export`]. Both returned buffers must be
/// freed with `notepdf_free_buffer`, the error with `notepdf_free_string`.
#[no_mangle]
pub unsafe extern "C" fn notepdf_preview(
    data: *const u8,
    len: usize,
    margin_json: *const c_char,
    fill_json: *const c_char,
) -> NotepdfPreview {
    let input = match input_bytes(data, len) {
        Ok(input) => input,
        Err(e) => return NotepdfPreview::error(e),
    };
    let margin: MarginConfig = match parse_config(margin_json, "margin") {
        Ok(margin) => margin,
        Err(e) => return NotepdfPreview::error(e),
    };
    let fill: FillSpec = match parse_config(fill_json, "fill") {
        Ok(fill) => fill,
        Err(e) => return NotepdfPreview::error(e),
    };

    match generate_preview(input, &margin, &fill) {
        Ok(preview) => {
            let (original, original_len) = into_raw_buffer(preview.original);
            let (transformed, transformed_len) = into_raw_buffer(preview.transformed);
            NotepdfPreview {
                success: true,
                original,
                original_len,
                transformed,
                transformed_len,
                total_page_count: preview.total_page_count as i64,
                error: ptr::null_mut(),
            }
        }
        Err(e) => NotepdfPreview::error(e.to_string()),
    }
}

/// Get the page count of a PDF held in memory.
///
/// # Safety
///
/// `data` must point to `len` readable bytes.
/// Returns -1 on error.
#[no_mangle]
pub unsafe extern "C" fn notepdf_page_count(data: *const u8, len: usize) -> i64 {
    let input = match input_bytes(data, len) {
        Ok(input) => input,
        Err(_) => return -1,
    };
    match inspect_document(input) {
        Ok(info) => info.page_count as i64,
        Err(_) => -1,
    }
}

/// Free a byte buffer allocated by notepdf.
///
/// # Safety
///
/// `data` and `len` must come from a notepdf result.
/// This function should only be called once per buffer.
#[no_mangle]
pub unsafe extern "C" fn notepdf_free_buffer(data: *mut u8, len: usize) {
    if !data.is_null() {
        drop(Box::from_raw(ptr::slice_from_raw_parts_mut(data, len)));
    }
}

/// Free a string allocated by notepdf.
///
/// # Safety
///
/// The `ptr` must have been allocated by notepdf.
/// This function should only be called once per pointer.
#[no_mangle]
pub unsafe extern "C" fn notepdf_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

/// Get the version of the notepdf library.
///
/// # Safety
///
/// The returned string is statically allocated and should not be freed.
#[no_mangle]
pub extern "C" fn notepdf_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}
