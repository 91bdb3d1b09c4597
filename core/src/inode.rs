//! The on-disk inode record and its direct/indirect addressing table.

use crate::layout::DIRECT_BLOCK_COUNT;

/// Fixed-size metadata record describing one filesystem object.
///
/// Field order is explicit (`#[repr(C)]`) and every field is read/written
/// through its own accessor; the whole struct is never reinterpreted across
/// a raw byte boundary, so compiler-inserted padding is harmless (the image
/// is host-local, not meant to be read by a foreign-language reader that
/// assumes C's layout rules exactly).
#[repr(C)]
#[derive(Clone, Copy)]
pub struct Inode {
	/// POSIX-style type-and-permission bits.
	pub mode: u32,
	/// Number of hard links.
	pub links: u32,
	/// Byte length of user data (always `BLOCK_SIZE` for directories).
	pub size: u32,
	/// Number of data blocks currently owned.
	pub block_count: u8,
	/// Direct block pointers.
	pub d_blocks: [u8; DIRECT_BLOCK_COUNT],
	/// Single indirect-pointer block index; 0 means unused.
	pub i_block: u8,
	/// Last access time, seconds since the Unix epoch.
	pub a_time: i64,
	/// Last modification time, seconds since the Unix epoch.
	pub m_time: i64,
}

impl Inode {
	/// Returns a fully zeroed inode: unused, not a directory, no blocks.
	pub const fn zeroed() -> Self {
		Inode {
			mode: 0,
			links: 0,
			size: 0,
			block_count: 0,
			d_blocks: [0; DIRECT_BLOCK_COUNT],
			i_block: 0,
			a_time: 0,
			m_time: 0,
		}
	}

	/// Whether the mode bits mark this inode as a directory.
	pub fn is_dir(&self) -> bool {
		(self.mode & libc::S_IFMT as u32) == libc::S_IFDIR as u32
	}

	/// Whether the owner-execute (search) permission bit is set.
	pub fn is_searchable(&self) -> bool {
		(self.mode & libc::S_IXUSR as u32) != 0
	}

	/// Whether the owner-write permission bit is set.
	pub fn is_writable(&self) -> bool {
		(self.mode & libc::S_IWUSR as u32) != 0
	}

	/// Whether this inode currently addresses its blocks through the
	/// indirect block rather than `d_blocks` directly.
	pub fn uses_indirect(&self) -> bool {
		self.block_count as usize > DIRECT_BLOCK_COUNT
	}
}
