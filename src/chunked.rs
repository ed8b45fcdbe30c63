//! Chunked transfer of large backing blobs.
//!
//! Replies to a single query are bounded by the advertised packet size, so
//! a large logical blob (memory-map XML, register descriptions, ...) is
//! served in pages. The client asks for `offset,length` windows and the
//! stub tags each page:
//!
//! ```text
//! m<bytes>   more data remains past this page
//! l<bytes>   final page (possibly empty)
//! ```
//!
//! The thread-id list uses the same `m`/`l` tagging with its own `,`
//! separated hex payload.

use crate::protocol::wire;

/// Reply tag: more data remains.
const TAG_MORE: u8 = b'm';

/// Reply tag: final chunk.
const TAG_LAST: u8 = b'l';

/// One requested window into a backing blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkRequest {
    /// Byte offset into the blob.
    pub offset: usize,
    /// Requested page length; capped by the server to the packet size.
    pub length: usize,
}

impl ChunkRequest {
    /// Parses the `<offset>,<length>` hex tail of a transfer query.
    pub fn parse(args: &[u8]) -> Option<Self> {
        let comma = args.iter().position(|&b| b == b',')?;
        let offset = wire::parse_hex(&args[..comma])?;
        let length = wire::parse_hex(&args[comma + 1..])?;
        Some(Self {
            offset: usize::try_from(offset).ok()?,
            length: usize::try_from(length).ok()?,
        })
    }
}

/// Slice one page out of `blob` and build the tagged reply payload.
///
/// The requested length is capped to `max_page`; the window is clamped to
/// the blob, never indexing past its end. The page is tagged `m` when
/// `offset + length` (after capping) still falls short of the blob, `l`
/// otherwise. An offset at or past the end yields an empty `l` reply —
/// the valid end-of-data signal, not an error.
pub fn page(blob: &[u8], request: ChunkRequest, max_page: usize) -> Vec<u8> {
    let length = request.length.min(max_page);
    let start = request.offset.min(blob.len());
    let end = request.offset.saturating_add(length).min(blob.len());
    let tag = if request.offset.saturating_add(length) < blob.len() {
        TAG_MORE
    } else {
        TAG_LAST
    };
    let mut reply = Vec::with_capacity(1 + end - start);
    reply.push(tag);
    reply.extend_from_slice(&blob[start..end]);
    reply
}

/// Builds a thread-id-list reply: `m<hex>,<hex>,...`, or `l` for an empty
/// list.
pub fn thread_list_reply(ids: &[u64]) -> Vec<u8> {
    if ids.is_empty() {
        return end_of_list_reply();
    }
    let mut reply = vec![TAG_MORE];
    for (index, id) in ids.iter().enumerate() {
        if index > 0 {
            reply.push(b',');
        }
        reply.extend_from_slice(format!("{id:x}").as_bytes());
    }
    reply
}

/// Builds the end-of-list reply that terminates thread-id paging.
pub fn end_of_list_reply() -> Vec<u8> {
    vec![TAG_LAST]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_chunk_request() {
        assert_eq!(
            ChunkRequest::parse(b"0,fff"),
            Some(ChunkRequest {
                offset: 0,
                length: 0xfff
            })
        );
        assert_eq!(
            ChunkRequest::parse(b"4000,100"),
            Some(ChunkRequest {
                offset: 0x4000,
                length: 0x100
            })
        );
        assert_eq!(ChunkRequest::parse(b"4000"), None);
        assert_eq!(ChunkRequest::parse(b",100"), None);
        assert_eq!(ChunkRequest::parse(b"zz,100"), None);
    }

    #[test]
    fn test_paging_sequence_over_small_blob() {
        let blob = b"0123456789";

        let first = page(blob, ChunkRequest { offset: 0, length: 4 }, 4096);
        let second = page(blob, ChunkRequest { offset: 4, length: 4 }, 4096);
        let last = page(blob, ChunkRequest { offset: 8, length: 4 }, 4096);

        assert_eq!(first, b"m0123");
        assert_eq!(second, b"m4567");
        assert_eq!(last, b"l89");
    }

    #[test]
    fn test_offset_at_end_yields_empty_last_chunk() {
        let blob = b"0123456789";
        assert_eq!(page(blob, ChunkRequest { offset: 10, length: 4 }, 4096), b"l");
        assert_eq!(page(blob, ChunkRequest { offset: 99, length: 4 }, 4096), b"l");
    }

    #[test]
    fn test_exact_fit_is_final() {
        let blob = b"0123456789";
        assert_eq!(
            page(blob, ChunkRequest { offset: 0, length: 10 }, 4096),
            b"l0123456789"
        );
    }

    #[test]
    fn test_length_capped_to_max_page() {
        let blob = b"0123456789";
        // client asks for everything, server pages at 4
        assert_eq!(page(blob, ChunkRequest { offset: 0, length: 100 }, 4), b"m0123");
    }

    #[test]
    fn test_empty_blob() {
        assert_eq!(page(b"", ChunkRequest { offset: 0, length: 16 }, 4096), b"l");
    }

    #[test]
    fn test_thread_list_reply() {
        assert_eq!(thread_list_reply(&[]), b"l");
        assert_eq!(thread_list_reply(&[1]), b"m1");
        assert_eq!(thread_list_reply(&[1, 10, 0x1337]), b"m1,a,1337");
        assert_eq!(end_of_list_reply(), b"l");
    }
}
