//! # Storage Layer
//!
//! Notes are plain markdown files and the files are the only truth: there is no
//! cache or index beside them. The [`NoteBackend`] trait abstracts raw text I/O
//! so the document model and the orchestrator can run against real files
//! ([`FsBackend`]) or an in-memory map ([`MemBackend`], for tests).
//!
//! ## Write Discipline
//!
//! Every write replaces the whole note atomically (temp file in the same
//! directory, then rename). Header and body are never written separately, and a
//! crash leaves either the old or the new file, never a torn one.

pub mod backend;
pub mod fs_backend;
pub mod mem_backend;

pub use backend::NoteBackend;
pub use fs_backend::FsBackend;
pub use mem_backend::MemBackend;
