//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type but uses C-compatible representations:
//! `*mut c_char` instead of `String`, raw pointers instead of `Vec`, tagged
//! enums with explicit discriminants, and a `has_*` flag next to optional
//! numbers. Absent optional strings are null pointers. Conversion functions
//! live here to keep `lib.rs` focused on the `extern "C"` surface.

use std::ffi::CString;
use std::os::raw::c_char;

use experts_core::{
    ApiError, Expert, ExpertRow, HttpMethod, QueryState, TransportError, TransportErrorKind,
};

/// Opaque handle to an `ExpertsClient`.
pub struct FfiExpertsClient {
    pub(crate) inner: experts_core::ExpertsClient,
}

/// Opaque handle to an `ExpertsScreen`.
pub struct FfiExpertsScreen {
    pub(crate) inner: experts_core::ExpertsScreen,
}

/// Convert to an owned C string, dropping interior NUL bytes.
pub(crate) fn c_string(s: String) -> *mut c_char {
    let bytes: Vec<u8> = s.into_bytes().into_iter().filter(|b| *b != 0).collect();
    CString::new(bytes).unwrap_or_default().into_raw()
}

pub(crate) fn opt_c_string(s: Option<String>) -> *mut c_char {
    s.map_or(std::ptr::null_mut(), c_string)
}

/// Free a string produced by `c_string`. Null is ignored.
pub(crate) fn free_c_string(s: *mut c_char) {
    if !s.is_null() {
        drop(unsafe { CString::from_raw(s) });
    }
}

/// Hand a vector to C as pointer + length. Empty vectors become null.
pub(crate) fn into_raw_parts<T>(items: Vec<T>) -> (*mut T, u32) {
    let len = items.len() as u32;
    if items.is_empty() {
        return (std::ptr::null_mut(), 0);
    }
    let mut boxed = items.into_boxed_slice();
    let ptr = boxed.as_mut_ptr();
    std::mem::forget(boxed);
    (ptr, len)
}

/// Reclaim a vector handed out by `into_raw_parts`.
pub(crate) unsafe fn from_raw_parts<T>(ptr: *mut T, len: u32) -> Vec<T> {
    if ptr.is_null() || len == 0 {
        return Vec::new();
    }
    let slice = std::ptr::slice_from_raw_parts_mut(ptr, len as usize);
    unsafe { Box::from_raw(slice) }.into_vec()
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// HTTP method as a C enum.
#[repr(C)]
pub enum FfiHttpMethod {
    Post = 1,
}

impl From<HttpMethod> for FfiHttpMethod {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Post => FfiHttpMethod::Post,
        }
    }
}

/// A single HTTP header as a key-value pair of C strings.
#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// An HTTP request described as C-compatible plain data.
///
/// `timeout_ms` is 0 when the host should apply its own default.
#[repr(C)]
pub struct FfiHttpRequest {
    pub method: FfiHttpMethod,
    pub url: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
    pub body: *mut c_char,
    pub timeout_ms: u32,
}

impl FfiHttpRequest {
    /// Convert a core `HttpRequest` into a heap-allocated `FfiHttpRequest`.
    pub(crate) fn from_core(req: experts_core::HttpRequest) -> *mut Self {
        let headers: Vec<FfiHeader> = req
            .headers
            .into_iter()
            .map(|(k, v)| FfiHeader {
                key: c_string(k),
                value: c_string(v),
            })
            .collect();
        let (headers, headers_len) = into_raw_parts(headers);
        let timeout_ms = req
            .timeout
            .map_or(0, |t| u32::try_from(t.as_millis()).unwrap_or(u32::MAX));

        Box::into_raw(Box::new(FfiHttpRequest {
            method: req.method.into(),
            url: c_string(req.url),
            headers,
            headers_len,
            body: opt_c_string(req.body),
            timeout_ms,
        }))
    }
}

// ---------------------------------------------------------------------------
// Response input (caller-provided, not heap-allocated by us)
// ---------------------------------------------------------------------------

/// An HTTP response described as C-compatible plain data.
///
/// The C caller constructs this on the stack after executing a request. The
/// FFI layer reads but does not free these fields.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub body: *const c_char,
}

/// Why a round-trip produced no response.
#[repr(C)]
#[derive(Clone, Copy)]
pub enum FfiTransportErrorKind {
    Timeout = 0,
    Connect = 1,
    Tls = 2,
    Other = 3,
}

impl FfiTransportErrorKind {
    pub(crate) fn into_core(self, message: String) -> TransportError {
        let kind = match self {
            FfiTransportErrorKind::Timeout => TransportErrorKind::Timeout,
            FfiTransportErrorKind::Connect => TransportErrorKind::Connect,
            FfiTransportErrorKind::Tls => TransportErrorKind::Tls,
            FfiTransportErrorKind::Other => TransportErrorKind::Other,
        };
        TransportError::new(kind, message)
    }
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Error codes returned in `FfiExpertsResult`.
#[repr(C)]
pub enum FfiErrorCode {
    Ok = 0,
    Graphql = 1,
    Transport = 2,
    Http = 3,
    Deserialization = 4,
    Serialization = 5,
    Panic = 6,
    NullArg = 7,
}

/// Tag that tells `experts_free_result` what `FfiExpertsResult::data` points to.
#[repr(C)]
pub enum FfiDataTag {
    None = 0,
    ExpertList = 1,
}

/// A single expert exposed to C.
#[repr(C)]
pub struct FfiExpert {
    pub expert_id: i64,
    pub first_name: *mut c_char,
    pub last_name: *mut c_char,
    pub personal_id: *mut c_char,
    pub birth_date: *mut c_char,
    pub address_id: i64,
    pub has_address_id: bool,
    pub contact_id: i64,
    pub has_contact_id: bool,
    pub email: *mut c_char,
    pub specialization: *mut c_char,
    pub market_hourly_rate: f64,
    pub market_daily_rate: f64,
    pub education_level: *mut c_char,
    pub seniority_level_id: i64,
    pub created_at: *mut c_char,
}

impl From<Expert> for FfiExpert {
    fn from(e: Expert) -> Self {
        FfiExpert {
            expert_id: e.expert_id,
            first_name: c_string(e.first_name),
            last_name: c_string(e.last_name),
            personal_id: opt_c_string(e.personal_id),
            birth_date: opt_c_string(e.birth_date),
            address_id: e.address_id.unwrap_or(0),
            has_address_id: e.address_id.is_some(),
            contact_id: e.contact_id.unwrap_or(0),
            has_contact_id: e.contact_id.is_some(),
            email: c_string(e.email),
            specialization: opt_c_string(e.specialization),
            market_hourly_rate: e.market_hourly_rate,
            market_daily_rate: e.market_daily_rate,
            education_level: opt_c_string(e.education_level),
            seniority_level_id: e.seniority_level_id,
            created_at: c_string(e.created_at),
        }
    }
}

impl FfiExpert {
    /// Free the C-string fields (but not the struct itself).
    pub(crate) fn free_fields(&self) {
        for s in [
            self.first_name,
            self.last_name,
            self.personal_id,
            self.birth_date,
            self.email,
            self.specialization,
            self.education_level,
            self.created_at,
        ] {
            free_c_string(s);
        }
    }
}

/// A list of experts exposed to C.
#[repr(C)]
pub struct FfiExpertList {
    pub items: *mut FfiExpert,
    pub len: u32,
}

/// Result envelope for parse and failure operations.
///
/// On success `error_code` is `Ok`, `error_message` is null, and `data`
/// points to the parsed payload (tagged by `data_tag`). On failure
/// `error_code` describes the category, `error_message` is the text the
/// screen would show after its prefix, and `data` is null.
#[repr(C)]
pub struct FfiExpertsResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub http_status: u16,
    pub data_tag: FfiDataTag,
    pub data: *mut std::ffi::c_void,
}

impl FfiExpertsResult {
    fn boxed(
        error_code: FfiErrorCode,
        error_message: *mut c_char,
        http_status: u16,
        data_tag: FfiDataTag,
        data: *mut std::ffi::c_void,
    ) -> *mut Self {
        Box::into_raw(Box::new(FfiExpertsResult {
            error_code,
            error_message,
            http_status,
            data_tag,
            data,
        }))
    }

    /// Build a success result carrying an `FfiExpertList`.
    pub(crate) fn ok_experts(experts: Vec<Expert>) -> *mut Self {
        let items: Vec<FfiExpert> = experts.into_iter().map(FfiExpert::from).collect();
        let (items, len) = into_raw_parts(items);
        let list = Box::new(FfiExpertList { items, len });
        Self::boxed(
            FfiErrorCode::Ok,
            std::ptr::null_mut(),
            0,
            FfiDataTag::ExpertList,
            Box::into_raw(list) as *mut std::ffi::c_void,
        )
    }

    /// Build an error result from an `ApiError`.
    pub(crate) fn from_error(err: ApiError) -> *mut Self {
        let (error_code, http_status) = match &err {
            ApiError::Graphql { .. } => (FfiErrorCode::Graphql, 0),
            ApiError::Transport(_) => (FfiErrorCode::Transport, 0),
            ApiError::HttpError { status, .. } => (FfiErrorCode::Http, *status),
            ApiError::DeserializationError(_) => (FfiErrorCode::Deserialization, 0),
            ApiError::SerializationError(_) => (FfiErrorCode::Serialization, 0),
        };
        Self::boxed(
            error_code,
            c_string(err.to_string()),
            http_status,
            FfiDataTag::None,
            std::ptr::null_mut(),
        )
    }

    /// Build an error result for a null argument.
    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::boxed(
            FfiErrorCode::NullArg,
            c_string(format!("null argument: {name}")),
            0,
            FfiDataTag::None,
            std::ptr::null_mut(),
        )
    }

    /// Build an error result for a caught panic.
    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::boxed(
            FfiErrorCode::Panic,
            c_string(msg.to_string()),
            0,
            FfiDataTag::None,
            std::ptr::null_mut(),
        )
    }
}

// ---------------------------------------------------------------------------
// Screen types
// ---------------------------------------------------------------------------

/// Which of the three views the host should draw.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiScreenState {
    Loading = 0,
    Error = 1,
    Success = 2,
}

impl From<&QueryState> for FfiScreenState {
    fn from(state: &QueryState) -> Self {
        match state {
            QueryState::Loading => FfiScreenState::Loading,
            QueryState::Error { .. } => FfiScreenState::Error,
            QueryState::Success { .. } => FfiScreenState::Success,
        }
    }
}

/// One rendered list row: key, title and detail lines.
#[repr(C)]
pub struct FfiExpertRow {
    pub key: *mut c_char,
    pub title: *mut c_char,
    pub details: *mut *mut c_char,
    pub details_len: u32,
}

impl FfiExpertRow {
    pub(crate) fn from_core(row: ExpertRow) -> *mut Self {
        let details: Vec<*mut c_char> = row.details.into_iter().map(c_string).collect();
        let (details, details_len) = into_raw_parts(details);
        Box::into_raw(Box::new(FfiExpertRow {
            key: c_string(row.key),
            title: c_string(row.title),
            details,
            details_len,
        }))
    }
}
