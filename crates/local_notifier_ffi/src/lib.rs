//! Flutter bridge crate for the `local_notifier` plugin.
//!
//! `api` holds the FRB-exported functions; generated glue is produced by
//! `flutter_rust_bridge_codegen` on the Dart side of the plugin.

pub mod api;
