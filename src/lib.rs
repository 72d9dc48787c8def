//! Karaoke-style phrase captions from word-level speech timestamps.
//!
//! Words come from a [`transcribe::WordSource`], are grouped and highlighted
//! by [`captions`], and are written out as an ASS script by [`subtitle`].

pub mod captions;
pub mod subtitle;
pub mod transcribe;
