//! Owns the memory-mapped image and publishes typed accessors over it.
//!
//! Mirrors `storage_init`/`get_inode`/`get_blocks`/`get_block` from the
//! original: a single owned struct replaces the original's collection of
//! global base pointers, since there is no concurrent access to guard
//! against (§5 of the design).

use std::fs::{File, OpenOptions};
use std::mem::size_of;
use std::path::Path;
use std::slice;

use memmap2::MmapMut;

use crate::inode::Inode;

/// Bytes per data block.
pub const BLOCK_SIZE: usize = 4096;
/// Total blocks in the image.
pub const BLOCK_COUNT: usize = 256;
/// Total size of the backing image file.
pub const DISK_SPACE: usize = BLOCK_SIZE * BLOCK_COUNT;
/// Number of addressable inodes, and of addressable data blocks.
pub const BITMAP_SIZE: usize = 253;
/// Bytes needed to hold `BITMAP_SIZE` bits.
pub const BITMAP_BYTES: usize = (BITMAP_SIZE + 7) / 8;
/// Direct block pointers per inode.
pub const DIRECT_BLOCK_COUNT: usize = 8;

/// Marks an image as already initialized; any other byte at offset 0
/// triggers root initialization on open.
const INIT_FLAG: u8 = 0x99;

const INIT_FLAG_OFFSET: usize = 0;
const BLOCK_BITMAP_OFFSET: usize = INIT_FLAG_OFFSET + 1;
const INODE_BITMAP_OFFSET: usize = BLOCK_BITMAP_OFFSET + BITMAP_BYTES;
const INODE_TABLE_OFFSET: usize = INODE_BITMAP_OFFSET + BITMAP_BYTES;

const fn align_up(value: usize, align: usize) -> usize {
	(value + align - 1) / align * align
}

fn block_region_offset() -> usize {
	align_up(INODE_TABLE_OFFSET + BITMAP_SIZE * size_of::<Inode>(), BLOCK_SIZE)
}

/// The memory-mapped disk image, plus typed accessors over its regions.
pub struct Image {
	_file: File,
	mmap: MmapMut,
}

impl Image {
	/// Opens `path` as the backing image, creating and zero-filling it at
	/// exactly [`DISK_SPACE`] bytes if it does not already exist, then
	/// performing root initialization if the init flag is unset.
	pub fn open(path: &Path) -> std::io::Result<Self> {
		let file = OpenOptions::new()
			.read(true)
			.write(true)
			.create(true)
			.open(path)?;
		file.set_len(DISK_SPACE as u64)?;

		let mmap = unsafe { MmapMut::map_mut(&file)? };
		debug_assert!(block_region_offset() + BITMAP_SIZE * BLOCK_SIZE <= DISK_SPACE);

		let mut image = Image { _file: file, mmap };
		if image.mmap[INIT_FLAG_OFFSET] != INIT_FLAG {
			image.root_init();
		}
		Ok(image)
	}

	/// Performs root initialization: allocates inode 0 and block 0 as the
	/// empty root directory and writes the init flag.
	fn root_init(&mut self) {
		let block_offset = crate::bitmap::find_first_clear(self.block_bitmap())
			.expect("fresh image must have free blocks");
		assert_eq!(block_offset, 0, "root data block must be block 0");
		let inode_offset = crate::bitmap::find_first_clear(self.inode_bitmap())
			.expect("fresh image must have free inodes");
		assert_eq!(inode_offset, 0, "root inode must be inode 0");

		crate::bitmap::set_bit(self.block_bitmap_mut(), block_offset, true);
		crate::bitmap::set_bit(self.inode_bitmap_mut(), inode_offset, true);

		let root_mode = libc::S_IFDIR
			| libc::S_IRWXU
			| libc::S_IRGRP
			| libc::S_IXGRP
			| libc::S_IROTH
			| libc::S_IXOTH;
		let root = self.inode_by_index_mut(0);
		*root = Inode::zeroed();
		root.mode = root_mode as u32;
		root.links = 1;
		root.size = BLOCK_SIZE as u32;
		root.block_count = 1;
		root.d_blocks[0] = 0;

		self.block_by_index_mut(0)[0] = 0;
		self.mmap[INIT_FLAG_OFFSET] = INIT_FLAG;
	}

	/// Mutable access to the block allocation bitmap.
	pub fn block_bitmap_mut(&mut self) -> &mut [u8] {
		&mut self.mmap[BLOCK_BITMAP_OFFSET..BLOCK_BITMAP_OFFSET + BITMAP_BYTES]
	}

	/// Read-only access to the block allocation bitmap.
	pub fn block_bitmap(&self) -> &[u8] {
		&self.mmap[BLOCK_BITMAP_OFFSET..BLOCK_BITMAP_OFFSET + BITMAP_BYTES]
	}

	/// Mutable access to the inode allocation bitmap.
	pub fn inode_bitmap_mut(&mut self) -> &mut [u8] {
		&mut self.mmap[INODE_BITMAP_OFFSET..INODE_BITMAP_OFFSET + BITMAP_BYTES]
	}

	/// Read-only access to the inode allocation bitmap.
	pub fn inode_bitmap(&self) -> &[u8] {
		&self.mmap[INODE_BITMAP_OFFSET..INODE_BITMAP_OFFSET + BITMAP_BYTES]
	}

	fn inode_offset(i: u8) -> usize {
		debug_assert!((i as usize) < BITMAP_SIZE);
		INODE_TABLE_OFFSET + i as usize * size_of::<Inode>()
	}

	/// Returns the inode record at index `i`.
	///
	/// # Panics
	/// Panics (debug builds) if `i >= BITMAP_SIZE`.
	pub fn inode_by_index(&self, i: u8) -> &Inode {
		let off = Self::inode_offset(i);
		unsafe { &*(self.mmap.as_ptr().add(off) as *const Inode) }
	}

	/// Returns a mutable reference to the inode record at index `i`.
	pub fn inode_by_index_mut(&mut self, i: u8) -> &mut Inode {
		let off = Self::inode_offset(i);
		unsafe { &mut *(self.mmap.as_mut_ptr().add(off) as *mut Inode) }
	}

	fn block_offset(i: u8) -> usize {
		debug_assert!((i as usize) < BITMAP_SIZE);
		block_region_offset() + i as usize * BLOCK_SIZE
	}

	/// Returns the `BLOCK_SIZE` bytes of block `i`.
	pub fn block_by_index(&self, i: u8) -> &[u8] {
		let off = Self::block_offset(i);
		unsafe { slice::from_raw_parts(self.mmap.as_ptr().add(off), BLOCK_SIZE) }
	}

	/// Returns a mutable view of the `BLOCK_SIZE` bytes of block `i`.
	pub fn block_by_index_mut(&mut self, i: u8) -> &mut [u8] {
		let off = Self::block_offset(i);
		unsafe { slice::from_raw_parts_mut(self.mmap.as_mut_ptr().add(off), BLOCK_SIZE) }
	}

	/// Returns the addressing table of `inode_i` as a single logical view:
	/// either its direct pointers, or the first `block_count` bytes of its
	/// indirect block, according to the addressing rule.
	pub fn blocks_of(&self, inode_i: u8) -> Vec<u8> {
		let inode = self.inode_by_index(inode_i);
		if inode.uses_indirect() {
			self.block_by_index(inode.i_block)[..inode.block_count as usize].to_vec()
		} else {
			inode.d_blocks[..inode.block_count as usize].to_vec()
		}
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use tempfile::NamedTempFile;

	fn fresh_image() -> Image {
		let file = NamedTempFile::new().unwrap();
		Image::open(file.path()).unwrap()
	}

	#[test]
	fn fresh_image_has_root_directory() {
		let image = fresh_image();
		let root = image.inode_by_index(0);
		assert!(root.is_dir());
		assert_eq!(root.links, 1);
		assert_eq!(root.block_count, 1);
		assert_eq!(root.d_blocks[0], 0);
		assert_eq!(root.size, BLOCK_SIZE as u32);
		assert_eq!(image.block_by_index(0)[0], 0);
	}

	#[test]
	fn reopen_preserves_state() {
		let file = NamedTempFile::new().unwrap();
		{
			let mut image = Image::open(file.path()).unwrap();
			image.inode_by_index_mut(0).links = 7;
		}
		let image = Image::open(file.path()).unwrap();
		assert_eq!(image.inode_by_index(0).links, 7);
	}

	#[test]
	fn blocks_of_direct_matches_d_blocks() {
		let mut image = fresh_image();
		image.inode_by_index_mut(0).block_count = 2;
		image.inode_by_index_mut(0).d_blocks[1] = 5;
		assert_eq!(image.blocks_of(0), vec![0, 5]);
	}
}
