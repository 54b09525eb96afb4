#![allow(unreachable_pub)]

pub mod bridge;

#[allow(unsafe_code)]
#[allow(clippy::non_send_fields_in_send_ty)]
// SAFETY: the C++ session wrapper is owned by the controller and only ever
// touched while its mutex is held; it is never shared concurrently.
unsafe impl Send for bridge::ffi::Session {}
