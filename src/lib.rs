//! Core library for the neotass-dimensional command line application.
//!
//! The library turns the NEOTASS opportunity registry and sell-out ledger into
//! a star schema and saves it as a workbook. Source readers and the workbook
//! writer live under [`neotass::dimensional::io`], the row types inside
//! [`neotass::dimensional::model`], dimension and fact construction in
//! [`neotass::dimensional::transform`], the relational contract in
//! [`neotass::dimensional::schema`], and the orchestration under
//! [`neotass::dimensional::pipeline`].

pub mod neotass;

pub use neotass::dimensional::{
    EtlError, Result, config, error, io, logging, model, pipeline, schema, tabulate, transform,
};
