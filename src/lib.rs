//! Book journal client for a Supabase-compatible backend.
//!
//! Three layers: resolved [`config`] settings, the typed remote client in
//! [`supabase`], and the [`store`] state containers the UI-facing binary
//! drives. Every operation is a thin pass-through to the backend; on
//! success local state is patched to reflect the change, on failure the
//! error propagates as a [`supabase::ApiError`] and prior state stays
//! intact.

pub mod config;
pub mod store;
pub mod supabase;
