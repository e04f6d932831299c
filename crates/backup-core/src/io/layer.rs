//! Stream layer teardown.
//!
//! The output stream is a stack of writers (tar formatter, counter,
//! compressor, cipher, fan-out). Each layer must be finalized before the
//! one beneath it, and a failure in one layer must not stop the others from
//! finalizing. Layers therefore expose their successor explicitly and
//! [`close_chain`] walks the stack top to bottom.

use std::io;

/// One transform in the output chain.
pub trait StreamLayer {
    /// Writes any trailer this layer owes and flushes it into the next
    /// layer. Must be safe to call once even if earlier writes failed.
    ///
    /// # Errors
    ///
    /// Returns the error from writing the trailer or flushing.
    fn finalize(&mut self) -> io::Result<()>;

    /// The layer this one writes into, if any.
    fn inner_layer(&mut self) -> Option<&mut dyn StreamLayer>;
}

/// Finalizes `layer` and every layer beneath it, in order.
///
/// Every layer is finalized even when an earlier one fails; the first error
/// is returned.
///
/// # Errors
///
/// Returns the first error reported by any layer.
///
/// # Examples
///
/// ```
/// use backup_core::io::CountingWriter;
/// use backup_core::io::FanOut;
/// use backup_core::io::close_chain;
/// use std::io::Write;
///
/// let mut stack = CountingWriter::new(FanOut::new().with_sink("null", std::io::sink()));
/// stack.write_all(b"data")?;
/// close_chain(&mut stack)?;
/// # Ok::<(), std::io::Error>(())
/// ```
pub fn close_chain(layer: &mut dyn StreamLayer) -> io::Result<()> {
    let own = layer.finalize();
    let rest = match layer.inner_layer() {
        Some(inner) => close_chain(inner),
        None => Ok(()),
    };
    own.and(rest)
}
