pub mod nmcli;
pub mod utils;

#[cfg(any(test, feature = "backend_mock"))]
pub mod mock;
