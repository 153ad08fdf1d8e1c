#![forbid(unsafe_code)]

//! `kingraph` is a headless family relationship graph engine.
//!
//! It turns people with embedded relation records into a deduplicated graph
//! ([`kingraph_core`]), lays it out deterministically, and reconciles that layout with positions
//! saved in a remote store and a local cache ([`store`]). [`GraphViewController`] sequences the
//! whole flow for one view.
//!
//! The engine is runtime agnostic: loads and saves are plain futures that any executor (or
//! `futures::executor::block_on`) can drive.

pub use kingraph_core::*;

pub mod controller;
pub mod error;
pub mod store;

pub use controller::{
    GraphViewController, ListenerId, Phase, PositionSource, RequestToken, Resolution, SaveFuture,
    ViewEvent, ViewSnapshot,
};
pub use error::{SaveError, StoreError};
pub use store::{
    DirectoryCache, DirectoryRemote, Layout, LayoutCache, LayoutOrigin, MemoryCache, MemoryRemote,
    NoRemote, PositionRecord, PositionStore, RemoteLayoutStore, StoredLayout, TreeLayoutRecord,
    layout_key, merge_positions,
};
