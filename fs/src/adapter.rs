//! Thin `fuser::Filesystem` adapter over the storage engine.
//!
//! `fuser`'s low-level API addresses objects by a numeric inode (`ino`); the
//! core addresses them by path string, the same way the original program's
//! path-based `fuse_operations` did. This module bridges the two by keeping
//! a small `ino -> path` table: the core's own inode index is stable across
//! renames (only directory records move, never the inode itself), so a
//! `fuser` ino of `core_index + 1` is valid for the object's whole lifetime;
//! `1` is reserved for the root by `fuser`'s convention, matching the core's
//! root inode index of `0`.

use std::collections::HashMap;
use std::ffi::OsStr;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use fuser::{
	FileAttr, FileType, Filesystem, ReplyAttr, ReplyData, ReplyDirectory, ReplyEmpty, ReplyEntry,
	ReplyOpen, ReplyWrite, Request, TimeOrNow,
};
use nufs_core::{Attr, FsError, Storage, BLOCK_SIZE};

/// How long the kernel may cache an entry or its attributes before
/// re-validating with another call. The engine has no concurrent writers
/// other than this one process, so a short, fixed TTL is simplest.
const ATTR_TTL: Duration = Duration::from_secs(1);

fn to_errno(err: FsError) -> i32 {
	err.to_positive_errno()
}

fn to_file_attr(ino: u64, attr: Attr) -> FileAttr {
	let kind = if (attr.mode & libc::S_IFMT as u32) == libc::S_IFDIR as u32 {
		FileType::Directory
	} else {
		FileType::RegularFile
	};
	let secs_to_time = |secs: i64| {
		if secs >= 0 {
			UNIX_EPOCH + Duration::from_secs(secs as u64)
		} else {
			UNIX_EPOCH
		}
	};
	FileAttr {
		ino,
		size: attr.size as u64,
		blocks: attr.block_count as u64,
		atime: secs_to_time(attr.a_time),
		mtime: secs_to_time(attr.m_time),
		ctime: secs_to_time(attr.m_time),
		crtime: UNIX_EPOCH,
		kind,
		perm: (attr.mode & 0o7777) as u16,
		nlink: attr.links,
		uid: unsafe { libc::getuid() },
		gid: unsafe { libc::getgid() },
		rdev: 0,
		blksize: BLOCK_SIZE as u32,
		flags: 0,
	}
}

fn now_secs() -> i64 {
	SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.map(|d| d.as_secs() as i64)
		.unwrap_or(0)
}

fn time_or_now_secs(t: TimeOrNow) -> i64 {
	match t {
		TimeOrNow::Now => now_secs(),
		TimeOrNow::SpecificTime(t) => t
			.duration_since(UNIX_EPOCH)
			.map(|d| d.as_secs() as i64)
			.unwrap_or(0),
	}
}

fn join(parent: &str, name: &str) -> String {
	if parent.is_empty() {
		format!("/{name}")
	} else {
		format!("{parent}/{name}")
	}
}

/// Adapts [`Storage`] to `fuser`'s `Filesystem` trait.
pub struct Adapter {
	storage: Storage,
	paths: HashMap<u64, String>,
}

impl Adapter {
	pub fn new(storage: Storage) -> Self {
		let mut paths = HashMap::new();
		paths.insert(1, String::new());
		Adapter { storage, paths }
	}

	fn path_of(&self, ino: u64) -> Option<&str> {
		self.paths.get(&ino).map(String::as_str)
	}

	fn ino_of(&self, path: &str) -> Result<u64, FsError> {
		self.storage.access(path).map(|i| i as u64 + 1)
	}
}

impl Filesystem for Adapter {
	fn lookup(&mut self, _req: &Request, parent: u64, name: &OsStr, reply: ReplyEntry) {
		let Some(parent_path) = self.path_of(parent) else {
			reply.error(libc::ENOENT);
			return;
		};
		let path = join(parent_path, &name.to_string_lossy());
		match self.storage.access(&path) {
			Ok(inode_i) => {
				let ino = inode_i as u64 + 1;
				self.paths.entry(ino).or_insert(path);
				let attr = self.storage.getattr(inode_i);
				reply.entry(&ATTR_TTL, &to_file_attr(ino, attr), 0);
			}
			Err(e) => reply.error(to_errno(e)),
		}
	}

	fn getattr(&mut self, _req: &Request, ino: u64, reply: ReplyAttr) {
		let Some(path) = self.path_of(ino).map(str::to_owned) else {
			reply.error(libc::ENOENT);
			return;
		};
		match self.storage.access(&path) {
			Ok(inode_i) => reply.attr(&ATTR_TTL, &to_file_attr(ino, self.storage.getattr(inode_i))),
			Err(e) => reply.error(to_errno(e)),
		}
	}

	fn setattr(
		&mut self,
		_req: &Request,
		ino: u64,
		_mode: Option<u32>,
		_uid: Option<u32>,
		_gid: Option<u32>,
		size: Option<u64>,
		atime: Option<TimeOrNow>,
		mtime: Option<TimeOrNow>,
		_fh: Option<u64>,
		_crtime: Option<SystemTime>,
		_chgtime: Option<SystemTime>,
		_bkuptime: Option<SystemTime>,
		_flags: Option<u32>,
		reply: ReplyAttr,
	) {
		let Some(path) = self.path_of(ino).map(str::to_owned) else {
			reply.error(libc::ENOENT);
			return;
		};
		let inode_i = match self.storage.access(&path) {
			Ok(i) => i,
			Err(e) => {
				reply.error(to_errno(e));
				return;
			}
		};
		if let Some(mode) = _mode {
			if let Err(e) = self.storage.chmod(&path, mode) {
				reply.error(to_errno(e));
				return;
			}
		}
		if let Some(size) = size {
			if self.storage.is_dir(inode_i) {
				reply.error(to_errno(FsError::IsADirectory));
				return;
			}
			if !self.storage.is_writable(inode_i) {
				reply.error(to_errno(FsError::PermissionDenied));
				return;
			}
			if let Err(e) = self.storage.truncate(inode_i, size as u32) {
				reply.error(to_errno(e));
				return;
			}
		}
		if atime.is_some() || mtime.is_some() {
			let attr = self.storage.getattr(inode_i);
			let a = atime.map(time_or_now_secs).unwrap_or(attr.a_time);
			let m = mtime.map(time_or_now_secs).unwrap_or(attr.m_time);
			if let Err(e) = self.storage.utimens(&path, a, m) {
				reply.error(to_errno(e));
				return;
			}
		}
		reply.attr(&ATTR_TTL, &to_file_attr(ino, self.storage.getattr(inode_i)));
	}

	fn readdir(
		&mut self,
		_req: &Request,
		ino: u64,
		_fh: u64,
		offset: i64,
		mut reply: ReplyDirectory,
	) {
		let Some(path) = self.path_of(ino).map(str::to_owned) else {
			reply.error(libc::ENOENT);
			return;
		};
		let inode_i = match self.storage.access(&path) {
			Ok(i) => i,
			Err(e) => {
				reply.error(to_errno(e));
				return;
			}
		};
		let entries = match self.storage.readdir(inode_i) {
			Ok(e) => e,
			Err(e) => {
				reply.error(to_errno(e));
				return;
			}
		};

		let parent_path = nufs_core::path::parent_of(&path);
		let parent_ino = self.ino_of(&parent_path).unwrap_or(1);

		let dir_kind = FileType::Directory;
		let mut all = vec![(".".to_owned(), ino, dir_kind), ("..".to_owned(), parent_ino, dir_kind)];
		for (name, child_i) in entries {
			let child_ino = child_i as u64 + 1;
			self.paths.entry(child_ino).or_insert_with(|| join(&path, &name));
			let kind = if self.storage.getattr(child_i).mode & libc::S_IFMT as u32 == libc::S_IFDIR as u32 {
				FileType::Directory
			} else {
				FileType::RegularFile
			};
			all.push((name, child_ino, kind));
		}

		for (i, (name, child_ino, kind)) in all.into_iter().enumerate().skip(offset as usize) {
			if reply.add(child_ino, (i + 1) as i64, kind, &name) {
				break;
			}
		}
		reply.ok();
	}

	fn mknod(
		&mut self,
		_req: &Request,
		parent: u64,
		name: &OsStr,
		mode: u32,
		_umask: u32,
		_rdev: u32,
		reply: ReplyEntry,
	) {
		self.create_entry(parent, name, mode, reply)
	}

	fn mkdir(
		&mut self,
		_req: &Request,
		parent: u64,
		name: &OsStr,
		mode: u32,
		_umask: u32,
		reply: ReplyEntry,
	) {
		self.create_entry(parent, name, mode | libc::S_IFDIR as u32, reply)
	}

	fn unlink(&mut self, _req: &Request, parent: u64, name: &OsStr, reply: ReplyEmpty) {
		self.remove_entry(parent, name, reply)
	}

	fn rmdir(&mut self, _req: &Request, parent: u64, name: &OsStr, reply: ReplyEmpty) {
		self.remove_entry(parent, name, reply)
	}

	fn link(
		&mut self,
		_req: &Request,
		ino: u64,
		new_parent: u64,
		new_name: &OsStr,
		reply: ReplyEntry,
	) {
		let (Some(from), Some(new_parent_path)) =
			(self.path_of(ino).map(str::to_owned), self.path_of(new_parent).map(str::to_owned))
		else {
			reply.error(libc::ENOENT);
			return;
		};
		let to = join(&new_parent_path, &new_name.to_string_lossy());
		match self.storage.link(&from, &to) {
			Ok(()) => {
				self.paths.entry(ino).or_insert_with(|| to.clone());
				let attr = self.storage.getattr((ino - 1) as u8);
				reply.entry(&ATTR_TTL, &to_file_attr(ino, attr), 0);
			}
			Err(e) => reply.error(to_errno(e)),
		}
	}

	fn rename(
		&mut self,
		_req: &Request,
		parent: u64,
		name: &OsStr,
		new_parent: u64,
		new_name: &OsStr,
		_flags: u32,
		reply: ReplyEmpty,
	) {
		let (Some(parent_path), Some(new_parent_path)) =
			(self.path_of(parent).map(str::to_owned), self.path_of(new_parent).map(str::to_owned))
		else {
			reply.error(libc::ENOENT);
			return;
		};
		let from = join(&parent_path, &name.to_string_lossy());
		let to = join(&new_parent_path, &new_name.to_string_lossy());
		match self.storage.rename(&from, &to) {
			Ok(()) => {
				for path in self.paths.values_mut() {
					if *path == from {
						*path = to.clone();
					} else if let Some(rest) = path.strip_prefix(&format!("{from}/")) {
						*path = format!("{to}/{rest}");
					}
				}
				reply.ok();
			}
			Err(e) => reply.error(to_errno(e)),
		}
	}

	fn open(&mut self, _req: &Request, ino: u64, _flags: i32, reply: ReplyOpen) {
		let Some(path) = self.path_of(ino).map(str::to_owned) else {
			reply.error(libc::ENOENT);
			return;
		};
		match self.storage.access(&path) {
			Ok(inode_i) => {
				let attr = self.storage.getattr(inode_i);
				let _ = self.storage.utimens(&path, now_secs(), attr.m_time);
				reply.opened(0, 0);
			}
			Err(e) => reply.error(to_errno(e)),
		}
	}

	fn read(
		&mut self,
		_req: &Request,
		ino: u64,
		_fh: u64,
		offset: i64,
		size: u32,
		_flags: i32,
		_lock_owner: Option<u64>,
		reply: ReplyData,
	) {
		let Some(path) = self.path_of(ino).map(str::to_owned) else {
			reply.error(libc::ENOENT);
			return;
		};
		let mut buf = vec![0u8; size as usize];
		match self.storage.read(&path, &mut buf, offset as u64) {
			Ok(n) => reply.data(&buf[..n]),
			Err(e) => reply.error(to_errno(e)),
		}
	}

	fn write(
		&mut self,
		_req: &Request,
		ino: u64,
		_fh: u64,
		offset: i64,
		data: &[u8],
		_write_flags: u32,
		_flags: i32,
		_lock_owner: Option<u64>,
		reply: ReplyWrite,
	) {
		let Some(path) = self.path_of(ino).map(str::to_owned) else {
			reply.error(libc::ENOENT);
			return;
		};
		match self.storage.write(&path, data, offset as u64) {
			Ok(n) => {
				let now = now_secs();
				let _ = self.storage.utimens(&path, now, now);
				reply.written(n as u32);
			}
			Err(e) => reply.error(to_errno(e)),
		}
	}
}

impl Adapter {
	fn create_entry(&mut self, parent: u64, name: &OsStr, mode: u32, reply: ReplyEntry) {
		let Some(parent_path) = self.path_of(parent).map(str::to_owned) else {
			reply.error(libc::ENOENT);
			return;
		};
		let path = join(&parent_path, &name.to_string_lossy());
		match self.storage.mknod(&path, mode) {
			Ok(inode_i) => {
				let now = now_secs();
				let _ = self.storage.utimens(&path, now, now);
				let ino = inode_i as u64 + 1;
				self.paths.insert(ino, path);
				let attr = self.storage.getattr(inode_i);
				reply.entry(&ATTR_TTL, &to_file_attr(ino, attr), 0);
			}
			Err(e) => reply.error(to_errno(e)),
		}
	}

	fn remove_entry(&mut self, parent: u64, name: &OsStr, reply: ReplyEmpty) {
		let Some(parent_path) = self.path_of(parent).map(str::to_owned) else {
			reply.error(libc::ENOENT);
			return;
		};
		let path = join(&parent_path, &name.to_string_lossy());
		match self.storage.unlink(&path) {
			Ok(()) => reply.ok(),
			Err(e) => reply.error(to_errno(e)),
		}
	}
}
