//! Coursegate - Payment Webhook Fulfillment Service
//!
//! This crate receives Omise payment webhooks, verifies each event against
//! the provider API, and fulfills paid course orders by provisioning
//! accounts, sending welcome emails and enrolling buyers on Open edX.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
