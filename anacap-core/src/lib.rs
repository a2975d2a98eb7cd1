//! # Anacap Core
//!
//! Core types and utilities for the anacap analog capture pipeline.
//!
//! This crate provides the building blocks shared by the synchronizer and
//! the frame-rate converter:
//! - Error handling types
//! - Exact rational arithmetic for frame rates
//! - Frame geometry, field parity and packed frame buffers
//! - The frame storage collaborator trait and an in-memory store

pub mod error;
pub mod frame;
pub mod rational;
pub mod storage;

pub use error::{Error, Result};
pub use frame::{Field, FieldOrder, FieldSet, FrameBuffer, FrameGeometry, PixelFormat};
pub use rational::Rational;
pub use storage::{FrameStorage, FrameStore};
