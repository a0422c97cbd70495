//! The interface a front end implements to plug into the core.
//!
//! Mirrors the teacher's `VMBinding` trait (the seam at which the GC core
//! is generic over the language binding it serves), narrowed to the one
//! callback this crate's allocator needs from the front end: translating
//! a tag and a payload size hint into the number of bytes to reserve.

use crate::ir::IrNode;
use crate::obj::Tag;

pub trait LangBinding: Sized + 'static {
    /// The front end's IR node type, walked by [`crate::analysis::annotate`].
    type Ir: IrNode;

    /// Bytes to allocate for an object of `tag`, given `payload_hint`
    /// (e.g. a vector's declared length, a string's byte length). Must
    /// include the [`crate::obj::Obj`] header.
    fn object_size(tag: Tag, payload_hint: usize) -> usize;
}
