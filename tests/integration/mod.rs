//! Integration Tests Module
//!
//! End-to-end tests over the public API: template engine properties,
//! adapter selection, the insertion fallback chain against the mock DOM,
//! the offline-first data services with background reconciliation, and the
//! messaging bridge.

// Variable engine property tests
mod template_test;

// Adapter registry and selector chain tests
mod adapter_test;

// Insertion engine fallback chain tests
mod insertion_test;

// Offline-first data service and sync queue tests
mod data_service_test;

// Messaging bridge dispatch tests
mod bridge_test;
