//! C-ABI wrapper around `experts-core`.
//!
//! # Overview
//! Exposes the experts client and list screen through `extern "C"`
//! functions so the mobile host can build GraphQL requests, execute them on
//! its own network stack, and feed the outcome back without linking to serde
//! or tracing directly.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - A single `FfiExpertsResult` envelope with `FfiDataTag` + `void* data`
//!   conveys success payloads and errors uniformly.
//! - The C caller owns all returned pointers and must call the matching
//!   `experts_free_*` function to release them.

pub mod types;

use std::ffi::CStr;
use std::net::IpAddr;
use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};

use experts_core::{
    ClientSettings, ExpertsClient, ExpertsScreen, GatewayDiscovery, HttpResponse,
    PinnedCertificate, QueryState, RouteTableDiscovery, StaticDiscovery,
};
use tracing::{error, warn};

use types::*;

/// Borrow a C string as UTF-8. Invalid UTF-8 reads as empty.
fn str_arg<'a>(s: *const c_char) -> &'a str {
    unsafe { CStr::from_ptr(s) }.to_str().unwrap_or("")
}

fn optional_str_arg(s: *const c_char) -> Option<String> {
    if s.is_null() {
        None
    } else {
        Some(str_arg(s).to_string())
    }
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

/// Install a `fmt` subscriber filtered by `RUST_LOG` (default
/// `experts_core=info`). Returns false if a subscriber was already set.
#[unsafe(no_mangle)]
pub extern "C" fn experts_init_logging() -> bool {
    catch_unwind(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "experts_core=info".into()),
            )
            .try_init()
            .is_ok()
    })
    .unwrap_or(false)
}

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a client from JSON settings.
///
/// `settings_json` may be null or empty for defaults. `certificate` points
/// to the bundled pinning credential (PEM or DER) and may be null for the
/// basic variant. `gateway` is the host's own gateway discovery result; when
/// null, the route table is consulted instead. Discovery only matters for
/// the discovered variant.
///
/// Returns null on invalid settings, an unreadable certificate, or a panic.
/// The caller must free the returned pointer with `experts_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn experts_client_new(
    settings_json: *const c_char,
    certificate: *const u8,
    certificate_len: usize,
    gateway: *const c_char,
) -> *mut FfiExpertsClient {
    catch_unwind(|| {
        let json = optional_str_arg(settings_json).unwrap_or_default();
        let settings = match ClientSettings::from_json(&json) {
            Ok(s) => s,
            Err(e) => {
                error!(error = %e, "invalid client settings");
                return std::ptr::null_mut();
            }
        };

        let pin = if certificate.is_null() || certificate_len == 0 {
            None
        } else {
            let bytes = unsafe { std::slice::from_raw_parts(certificate, certificate_len) };
            match PinnedCertificate::from_bytes(&settings.certificate_name, bytes) {
                Ok(pin) => Some(pin),
                Err(e) => {
                    error!(error = %e, "cannot load pinned certificate");
                    return std::ptr::null_mut();
                }
            }
        };

        let discovery: Box<dyn GatewayDiscovery> = match optional_str_arg(gateway) {
            Some(addr) => match addr.parse::<IpAddr>() {
                Ok(ip) => Box::new(StaticDiscovery(Some(ip))),
                Err(_) => {
                    warn!(gateway = %addr, "ignoring unparsable gateway address");
                    Box::new(StaticDiscovery(None))
                }
            },
            None => Box::new(RouteTableDiscovery::default()),
        };

        match ExpertsClient::from_settings(&settings, discovery.as_ref(), pin) {
            Ok(client) => Box::into_raw(Box::new(FfiExpertsClient { inner: client })),
            Err(e) => {
                error!(error = %e, "cannot build client");
                std::ptr::null_mut()
            }
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a client created by `experts_client_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn experts_client_free(client: *mut FfiExpertsClient) {
    if !client.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            drop(unsafe { Box::from_raw(client) });
        }));
    }
}

/// The resolved endpoint URL. Free with `experts_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn experts_client_endpoint(client: *const FfiExpertsClient) -> *mut c_char {
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        c_string(client.inner.endpoint().url())
    }))
    .unwrap_or(std::ptr::null_mut())
}

/// Check the server's leaf certificate (DER) against the pin.
///
/// Unpinned clients accept any certificate. On false the host must abort the
/// connection and report a `Tls` transport failure.
#[unsafe(no_mangle)]
pub extern "C" fn experts_verify_certificate(
    client: *const FfiExpertsClient,
    der: *const u8,
    der_len: usize,
) -> bool {
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() || der.is_null() {
            return false;
        }
        let client = unsafe { &*client };
        let der = unsafe { std::slice::from_raw_parts(der, der_len) };
        client.inner.verify_peer_certificate(der).is_ok()
    }))
    .unwrap_or(false)
}

// ---------------------------------------------------------------------------
// GetExperts
// ---------------------------------------------------------------------------

/// Build the `GetExperts` request.
///
/// Returns null if `client` is null or serialization fails.
/// The caller must free the returned pointer with `experts_free_request`.
#[unsafe(no_mangle)]
pub extern "C" fn experts_build_get_experts(client: *const FfiExpertsClient) -> *mut FfiHttpRequest {
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        match client.inner.build_get_experts() {
            Ok(req) => FfiHttpRequest::from_core(req),
            Err(_) => std::ptr::null_mut(),
        }
    }))
    .unwrap_or(std::ptr::null_mut())
}

/// Convert an `FfiHttpResponse` to a core `HttpResponse`. A null body reads
/// as empty.
fn ffi_response_to_core(resp: &FfiHttpResponse) -> HttpResponse {
    let body = if resp.body.is_null() {
        String::new()
    } else {
        str_arg(resp.body).to_string()
    };
    HttpResponse {
        status: resp.status,
        headers: Vec::new(),
        body,
    }
}

/// Parse the response to a `GetExperts` request.
///
/// Returns a result with `data_tag = ExpertList` on success.
#[unsafe(no_mangle)]
pub extern "C" fn experts_parse_get_experts(
    client: *const FfiExpertsClient,
    response: *const FfiHttpResponse,
) -> *mut FfiExpertsResult {
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return FfiExpertsResult::null_arg("client");
        }
        if response.is_null() {
            return FfiExpertsResult::null_arg("response");
        }
        let client = unsafe { &*client };
        let resp = unsafe { &*response };
        match client.inner.parse_get_experts(ffi_response_to_core(resp)) {
            Ok(data) => FfiExpertsResult::ok_experts(data.experts),
            Err(e) => FfiExpertsResult::from_error(e),
        }
    }))
    .unwrap_or_else(|_| FfiExpertsResult::panic("panic in experts_parse_get_experts"))
}

/// Report that a `GetExperts` request never got a response.
///
/// Always returns an error result with code `Transport`.
#[unsafe(no_mangle)]
pub extern "C" fn experts_fail_get_experts(
    client: *const FfiExpertsClient,
    kind: FfiTransportErrorKind,
    message: *const c_char,
) -> *mut FfiExpertsResult {
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return FfiExpertsResult::null_arg("client");
        }
        let client = unsafe { &*client };
        let err = kind.into_core(optional_str_arg(message).unwrap_or_default());
        FfiExpertsResult::from_error(client.inner.fail_get_experts(err))
    }))
    .unwrap_or_else(|_| FfiExpertsResult::panic("panic in experts_fail_get_experts"))
}

// ---------------------------------------------------------------------------
// Screen
// ---------------------------------------------------------------------------

/// Create a list screen in the loading state. Free with `experts_screen_free`.
#[unsafe(no_mangle)]
pub extern "C" fn experts_screen_new() -> *mut FfiExpertsScreen {
    catch_unwind(|| {
        Box::into_raw(Box::new(FfiExpertsScreen {
            inner: ExpertsScreen::new(),
        }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a screen created by `experts_screen_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn experts_screen_free(screen: *mut FfiExpertsScreen) {
    if !screen.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            drop(unsafe { Box::from_raw(screen) });
        }));
    }
}

/// Start the screen's query.
///
/// Returns the request to execute, or null when there is nothing to execute
/// (served from cache, already in flight, or failed; check the state).
#[unsafe(no_mangle)]
pub extern "C" fn experts_screen_mount(
    screen: *mut FfiExpertsScreen,
    client: *const FfiExpertsClient,
) -> *mut FfiHttpRequest {
    catch_unwind(AssertUnwindSafe(|| {
        if screen.is_null() || client.is_null() {
            return std::ptr::null_mut();
        }
        let screen = unsafe { &mut *screen };
        let client = unsafe { &*client };
        screen
            .inner
            .mount(&client.inner)
            .map_or(std::ptr::null_mut(), FfiHttpRequest::from_core)
    }))
    .unwrap_or(std::ptr::null_mut())
}

/// Deliver the response to the request returned by `experts_screen_mount`.
#[unsafe(no_mangle)]
pub extern "C" fn experts_screen_receive(
    screen: *mut FfiExpertsScreen,
    client: *const FfiExpertsClient,
    response: *const FfiHttpResponse,
) -> FfiScreenState {
    catch_unwind(AssertUnwindSafe(|| {
        if screen.is_null() || client.is_null() || response.is_null() {
            return FfiScreenState::Error;
        }
        let screen = unsafe { &mut *screen };
        let client = unsafe { &*client };
        let resp = unsafe { &*response };
        screen.inner.receive(&client.inner, ffi_response_to_core(resp));
        FfiScreenState::from(screen.inner.state())
    }))
    .unwrap_or(FfiScreenState::Error)
}

/// Report that the request returned by `experts_screen_mount` failed.
#[unsafe(no_mangle)]
pub extern "C" fn experts_screen_fail(
    screen: *mut FfiExpertsScreen,
    client: *const FfiExpertsClient,
    kind: FfiTransportErrorKind,
    message: *const c_char,
) -> FfiScreenState {
    catch_unwind(AssertUnwindSafe(|| {
        if screen.is_null() || client.is_null() {
            return FfiScreenState::Error;
        }
        let screen = unsafe { &mut *screen };
        let client = unsafe { &*client };
        let err = kind.into_core(optional_str_arg(message).unwrap_or_default());
        screen.inner.fail(&client.inner, err);
        FfiScreenState::from(screen.inner.state())
    }))
    .unwrap_or(FfiScreenState::Error)
}

#[unsafe(no_mangle)]
pub extern "C" fn experts_screen_state(screen: *const FfiExpertsScreen) -> FfiScreenState {
    catch_unwind(AssertUnwindSafe(|| {
        if screen.is_null() {
            return FfiScreenState::Error;
        }
        let screen = unsafe { &*screen };
        FfiScreenState::from(screen.inner.state())
    }))
    .unwrap_or(FfiScreenState::Error)
}

/// The list title (`Seznam expertů`). Free with `experts_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn experts_screen_title() -> *mut c_char {
    catch_unwind(|| c_string(experts_core::screen::SCREEN_TITLE.to_string()))
        .unwrap_or(std::ptr::null_mut())
}

/// The full error text (`Chyba: ...`), or null outside the error state.
/// Free with `experts_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn experts_screen_error_text(screen: *const FfiExpertsScreen) -> *mut c_char {
    catch_unwind(AssertUnwindSafe(|| {
        if screen.is_null() {
            return std::ptr::null_mut();
        }
        let screen = unsafe { &*screen };
        match screen.inner.render() {
            experts_core::View::ErrorText(text) => c_string(text),
            _ => std::ptr::null_mut(),
        }
    }))
    .unwrap_or(std::ptr::null_mut())
}

#[unsafe(no_mangle)]
pub extern "C" fn experts_screen_row_count(screen: *const FfiExpertsScreen) -> u32 {
    catch_unwind(AssertUnwindSafe(|| {
        if screen.is_null() {
            return 0;
        }
        let screen = unsafe { &*screen };
        match screen.inner.state() {
            QueryState::Success { experts } => experts.len() as u32,
            QueryState::Loading | QueryState::Error { .. } => 0,
        }
    }))
    .unwrap_or(0)
}

/// Row `index` of the list, or null when out of range.
/// Free with `experts_free_row`.
#[unsafe(no_mangle)]
pub extern "C" fn experts_screen_row(screen: *const FfiExpertsScreen, index: u32) -> *mut FfiExpertRow {
    catch_unwind(AssertUnwindSafe(|| {
        if screen.is_null() {
            return std::ptr::null_mut();
        }
        let screen = unsafe { &*screen };
        match screen.inner.state() {
            QueryState::Success { experts } => experts
                .get(index as usize)
                .map_or(std::ptr::null_mut(), |e| {
                    FfiExpertRow::from_core(experts_core::ExpertRow::from(e))
                }),
            QueryState::Loading | QueryState::Error { .. } => std::ptr::null_mut(),
        }
    }))
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free an `FfiHttpRequest`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn experts_free_request(req: *mut FfiHttpRequest) {
    if req.is_null() {
        return;
    }
    let _ = catch_unwind(AssertUnwindSafe(|| {
        let req = unsafe { Box::from_raw(req) };
        free_c_string(req.url);
        free_c_string(req.body);
        for h in unsafe { from_raw_parts(req.headers, req.headers_len) } {
            free_c_string(h.key);
            free_c_string(h.value);
        }
    }));
}

/// Free an `FfiExpertsResult`. Safe to call with null. Uses `data_tag` to
/// determine what `data` points to.
#[unsafe(no_mangle)]
pub extern "C" fn experts_free_result(result: *mut FfiExpertsResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(AssertUnwindSafe(|| {
        let result = unsafe { Box::from_raw(result) };
        free_c_string(result.error_message);
        if result.data.is_null() {
            return;
        }
        match result.data_tag {
            FfiDataTag::ExpertList => {
                let list = unsafe { Box::from_raw(result.data as *mut FfiExpertList) };
                for item in unsafe { from_raw_parts(list.items, list.len) } {
                    item.free_fields();
                }
            }
            FfiDataTag::None => {}
        }
    }));
}

/// Free an `FfiExpertRow`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn experts_free_row(row: *mut FfiExpertRow) {
    if row.is_null() {
        return;
    }
    let _ = catch_unwind(AssertUnwindSafe(|| {
        let row = unsafe { Box::from_raw(row) };
        free_c_string(row.key);
        free_c_string(row.title);
        for line in unsafe { from_raw_parts(row.details, row.details_len) } {
            free_c_string(line);
        }
    }));
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn experts_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| free_c_string(s)));
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
