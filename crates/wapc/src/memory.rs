//! A thin, checked wrapper over an engine's linear memory.
//!
//! This is the only place in the core that validates a guest-supplied
//! `(offset, len)` pair and converts raw bytes to text. Every engine crate
//! hands this module a plain `&[u8]` snapshot of the instance's current
//! linear memory (e.g. `wasmtime::Memory::data(&store)`); what engine
//! produced it is irrelevant here.

/// Reads `len` bytes starting at `offset` out of `mem`.
///
/// `field_name` is used only for the panic message below; it identifies
/// which ABI argument this read was servicing (`"guest_req"`, `"bind"`, ...).
///
/// # Panics
///
/// Panics if `[offset, offset + len)` falls outside `mem`. An out-of-bounds
/// request here is a broken guest or a broken engine adapter, not a
/// recoverable runtime condition: a programming error in the guest ABI
/// implementation, so there is no partial read and no bounds-relaxation,
/// only a fatal, diagnosable stop.
#[must_use]
pub fn read(mem: &[u8], field_name: &str, offset: u32, len: u32) -> Vec<u8> {
  let start = offset as usize;
  let end = start + len as usize;
  mem
    .get(start..end)
    .unwrap_or_else(|| {
      panic!(
        "wapc: out-of-bounds guest memory access reading `{field_name}`: requested {start}..{end}, memory is {} bytes",
        mem.len()
      )
    })
    .to_vec()
}

/// Reads `len` bytes starting at `offset` and interprets them as UTF-8 text.
///
/// Uses the same bounds check and fatal-panic behavior as [`read`]. Invalid
/// UTF-8 is replaced with the Unicode replacement character rather than
/// treated as a separate failure mode: the core performs no encoding
/// validation beyond treating bytes as opaque.
#[must_use]
pub fn read_text(mem: &[u8], field_name: &str, offset: u32, len: u32) -> String {
  String::from_utf8_lossy(&read(mem, field_name, offset, len)).into_owned()
}
