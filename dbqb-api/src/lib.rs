#![crate_name = "dbqb_api"]
#![crate_type = "lib"]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! # dbqb API
//!
//! This crate exposes the types shared between the dbqb engine, its callers and the relational
//! drivers: scalar values, generic records, connection descriptors, raw table metadata, read
//! plans and the [`driver::Driver`] / [`driver::Connection`] traits a driver implements.

#![doc(html_playground_url = "https://play.rust-lang.org")]

pub mod connection;
pub mod dbms;
pub mod driver;
pub mod error;
pub mod prelude;
