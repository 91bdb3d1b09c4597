//! Core storage engine for a single-user filesystem backed by a fixed-size
//! memory-mapped image file.
//!
//! This crate has no knowledge of FUSE, mount points, or process lifetime —
//! it is a pure library over one image, built bottom-up: [`bitmap`] is the
//! block/inode allocator, [`path`] splits path strings, [`inode`] is the
//! on-disk record shape, [`layout`] owns the memory map and the regions
//! within it, and [`storage`] composes all of those into the operations a
//! caller actually wants (`mknod`, `read`, `write`, `rename`, ...).

pub mod bitmap;
pub mod error;
pub mod inode;
pub mod layout;
pub mod path;
pub mod storage;

pub use error::{FsError, FsResult};
pub use inode::Inode;
pub use layout::{BITMAP_SIZE, BLOCK_COUNT, BLOCK_SIZE, DIRECT_BLOCK_COUNT, DISK_SPACE};
pub use storage::{Attr, Storage};
