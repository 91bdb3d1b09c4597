//! `nufs`: mounts a filesystem image at a host mount point.
//!
//! Command line: any number of FUSE mount options and the mountpoint, in any
//! order libfuse's own `-o` convention allows, followed by the image file as
//! the final argument. Mirrors the original's `assert(argc > 2 && argc < 6)`
//! constraint on argument count.

mod adapter;

use std::env;
use std::path::PathBuf;
use std::process::exit;

use fuser::MountOption;
use nufs_core::Storage;

struct Args {
	prog: String,
	mount_options: Vec<MountOption>,
	mountpoint: PathBuf,
	image_path: PathBuf,
}

fn parse_args() -> Args {
	let mut argv: Vec<String> = env::args().collect();
	let prog = argv.remove(0);

	if argv.len() < 2 || argv.len() > 4 {
		eprintln!("{prog}: usage: {prog} [options] <mountpoint> <image>");
		exit(1);
	}

	let image_path = PathBuf::from(argv.pop().unwrap());

	let mut mount_options = Vec::new();
	let mut mountpoint = None;
	for arg in argv {
		if let Some(opt) = arg.strip_prefix("-o") {
			mount_options.push(MountOption::CUSTOM(opt.to_owned()));
		} else {
			mountpoint = Some(PathBuf::from(arg));
		}
	}

	let mountpoint = mountpoint.unwrap_or_else(|| {
		eprintln!("{prog}: specify a mountpoint");
		exit(1);
	});

	Args { prog, mount_options, mountpoint, image_path }
}

fn main() {
	let args = parse_args();

	let storage = Storage::open(&args.image_path).unwrap_or_else(|e| {
		eprintln!("{}: {}: {}", args.prog, args.image_path.display(), e);
		exit(1);
	});

	let mut options = vec![MountOption::FSName("nufs".to_owned())];
	options.extend(args.mount_options);

	if let Err(e) = fuser::mount2(adapter::Adapter::new(storage), &args.mountpoint, &options) {
		eprintln!("{}: {}: {}", args.prog, args.mountpoint.display(), e);
		exit(1);
	}
}
