//! The core's error channel.
//!
//! Every public entry point returns `FsResult<T>` instead of a raw negative
//! integer. `FsError::to_errno` is the only place a POSIX `errno` value is
//! produced, at the boundary to whatever dispatcher calls the engine.

/// Failure taxonomy for storage engine operations.
///
/// Each variant corresponds to one negated POSIX code the original program
/// returned through its `int` channel (see `storage.c`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FsError {
	/// Path resolution failed at some segment.
	#[error("no such entry")]
	NoSuchEntry,
	/// A non-terminal segment, or a declared-directory target, lacks the
	/// directory bit.
	#[error("not a directory")]
	NotADirectory,
	/// Truncation targeted a directory.
	#[error("is a directory")]
	IsADirectory,
	/// A required permission bit is missing.
	#[error("permission denied")]
	PermissionDenied,
	/// No free inode, no free block, or no directory record space.
	#[error("disk quota exceeded")]
	DiskQuotaExceeded,
}

impl FsError {
	/// Projects this error onto the negative `errno` value a FUSE-style
	/// dispatcher expects.
	pub fn to_errno(self) -> i32 {
		-(match self {
			FsError::NoSuchEntry => libc::ENOENT,
			FsError::NotADirectory => libc::ENOTDIR,
			FsError::IsADirectory => libc::EISDIR,
			FsError::PermissionDenied => libc::EACCES,
			FsError::DiskQuotaExceeded => libc::EDQUOT,
		})
	}

	/// The positive `errno` value, as `fuser`'s `reply.error(..)` expects.
	pub fn to_positive_errno(self) -> i32 {
		-self.to_errno()
	}
}

/// Result type used throughout the storage engine.
pub type FsResult<T> = Result<T, FsError>;
