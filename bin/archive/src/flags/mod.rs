//! CLI flags.

mod globals;
pub(crate) use globals::GlobalArgs;

mod archive;
pub(crate) use archive::ArchiveArgs;
