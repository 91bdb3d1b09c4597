//! Concrete end-to-end scenarios driven directly against the storage
//! engine, each starting from a freshly initialized empty image.

use nufs_core::{FsError, Storage, BLOCK_SIZE};
use tempfile::NamedTempFile;

fn fresh() -> Storage {
	let file = NamedTempFile::new().unwrap();
	Storage::open(file.path()).unwrap()
}

const FILE_MODE: u32 = (libc::S_IFREG | libc::S_IRWXU) as u32;
const DIR_MODE: u32 = (libc::S_IFDIR | libc::S_IRWXU) as u32;

#[test]
fn mkdir_rmdir_empty() {
	let mut fs = fresh();
	fs.mknod("/a", DIR_MODE).unwrap();
	assert!(fs.readdir(0).unwrap().iter().any(|(name, _)| name == "a"));

	fs.unlink("/a").unwrap();
	assert!(!fs.readdir(0).unwrap().iter().any(|(name, _)| name == "a"));
	assert_eq!(fs.access("/a"), Err(FsError::NoSuchEntry));
}

#[test]
fn write_read_under_one_block() {
	let mut fs = fresh();
	fs.mknod("/f", FILE_MODE).unwrap();
	assert_eq!(fs.write("/f", b"hello", 0).unwrap(), 5);

	let mut buf = [0u8; 5];
	assert_eq!(fs.read("/f", &mut buf, 0).unwrap(), 5);
	assert_eq!(&buf, b"hello");

	let i = fs.access("/f").unwrap();
	let attr = fs.getattr(i);
	assert_eq!(attr.size, 5);
	assert_eq!(attr.block_count, 1);
}

#[test]
fn cross_block_write() {
	let mut fs = fresh();
	fs.mknod("/g", FILE_MODE).unwrap();
	let data = vec![0xAAu8; 5000];
	fs.write("/g", &data, 0).unwrap();

	let i = fs.access("/g").unwrap();
	let attr = fs.getattr(i);
	assert_eq!(attr.block_count, 2);
	assert_eq!(attr.size, 5000);

	let mut buf = vec![0u8; 5000];
	fs.read("/g", &mut buf, 0).unwrap();
	assert!(buf.iter().all(|&b| b == 0xAA));
}

#[test]
fn promotion_to_indirect_addressing() {
	let mut fs = fresh();
	fs.mknod("/h", FILE_MODE).unwrap();
	let data = vec![0x42u8; BLOCK_SIZE * 9];
	fs.write("/h", &data, 0).unwrap();

	let i = fs.access("/h").unwrap();
	assert_eq!(fs.getattr(i).block_count, 9);

	let mut buf = vec![0u8; BLOCK_SIZE * 9];
	fs.read("/h", &mut buf, 0).unwrap();
	assert_eq!(buf, data);
}

#[test]
fn hard_link_survives_original_unlink() {
	let mut fs = fresh();
	fs.mknod("/x", FILE_MODE).unwrap();
	fs.write("/x", b"v", 0).unwrap();
	fs.link("/x", "/y").unwrap();

	let mut buf = [0u8; 1];
	assert_eq!(fs.read("/y", &mut buf, 0).unwrap(), 1);
	assert_eq!(buf[0], b'v');

	fs.unlink("/x").unwrap();
	let mut buf = [0u8; 1];
	assert_eq!(fs.read("/y", &mut buf, 0).unwrap(), 1);
	assert_eq!(buf[0], b'v');
}

#[test]
fn rename_preserves_inode() {
	let mut fs = fresh();
	let i = fs.mknod("/r", FILE_MODE).unwrap();
	fs.rename("/r", "/s").unwrap();
	assert_eq!(fs.access("/r"), Err(FsError::NoSuchEntry));
	assert_eq!(fs.access("/s").unwrap(), i);
}

#[test]
fn freed_inode_index_is_reused() {
	let mut fs = fresh();
	let i = fs.mknod("/a", DIR_MODE).unwrap();
	fs.unlink("/a").unwrap();
	let j = fs.mknod("/b", DIR_MODE).unwrap();
	assert_eq!(i, j);
}

#[test]
fn boundary_truncation_rounds_up_by_one_block() {
	let mut fs = fresh();
	let i = fs.mknod("/t", FILE_MODE).unwrap();
	fs.truncate(i, (BLOCK_SIZE * 3) as u32).unwrap();
	assert_eq!(fs.getattr(i).block_count, 3);

	fs.truncate(i, (BLOCK_SIZE * 3 + 1) as u32).unwrap();
	assert_eq!(fs.getattr(i).block_count, 4);
}

#[test]
fn readdir_on_regular_file_is_rejected() {
	let mut fs = fresh();
	let i = fs.mknod("/f", FILE_MODE).unwrap();
	assert_eq!(fs.readdir(i), Err(FsError::NotADirectory));
}

#[test]
fn mknod_under_non_searchable_directory_is_rejected() {
	let mut fs = fresh();
	let mode = (libc::S_IFDIR | libc::S_IRUSR | libc::S_IWUSR) as u32;
	fs.mknod("/locked", mode).unwrap();
	assert_eq!(fs.mknod("/locked/child", FILE_MODE), Err(FsError::PermissionDenied));
}

#[test]
fn promotion_and_demotion_allocate_and_free_exactly_two_blocks() {
	let mut fs = fresh();
	let i = fs.mknod("/p", FILE_MODE).unwrap();
	fs.truncate(i, (BLOCK_SIZE * 8) as u32).unwrap();
	assert_eq!(fs.getattr(i).block_count, 8);

	fs.truncate(i, (BLOCK_SIZE * 9) as u32).unwrap();
	assert_eq!(fs.getattr(i).block_count, 9);

	fs.truncate(i, (BLOCK_SIZE * 8) as u32).unwrap();
	assert_eq!(fs.getattr(i).block_count, 8);
}
