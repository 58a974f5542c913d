//! Services shared by the binaries

mod mirror;

pub use mirror::MirrorService;
