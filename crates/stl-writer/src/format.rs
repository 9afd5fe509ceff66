//! The two STL encodings.
//!
//! Binary STL layout (little-endian):
//! - 80 bytes: header (arbitrary, zero-padded)
//! - 4 bytes: u32 triangle count
//! - Per triangle (50 bytes each):
//!   - 12 bytes: normal vector (3 × f32)
//!   - 36 bytes: 3 vertices (3 × 3 × f32)
//!   - 2 bytes: attribute byte count (0u16)
//!
//! Text STL is `solid <name>`, one `facet` stanza per triangle, then `endsolid`.

use std::io::{self, Seek, SeekFrom, Write};

use crate::config::Mode;
use crate::geometry::{Facet, Vec3};

/// Size of the binary header field.
pub const HEADER_LEN: usize = 80;
/// Byte offset of the binary triangle count.
pub const COUNT_OFFSET: u64 = HEADER_LEN as u64;
/// Size of everything before the first binary record.
pub const PREAMBLE_LEN: u64 = COUNT_OFFSET + 4;
/// Size of one binary triangle record.
pub const RECORD_LEN: u64 = 50;

/// Framing and record encoding for one STL variant.
///
/// The variant is picked once, as a type parameter of
/// [`StlWriter`](crate::writer::StlWriter). Binary output needs a seekable sink to
/// backfill the triangle count, so [`Binary`] only implements this for `W: Write + Seek`.
pub trait StlFormat<W: Write> {
    const MODE: Mode;

    /// Most facets one stream of this encoding can describe.
    const MAX_FACETS: u64;

    fn write_header(&mut self, sink: &mut W, model_name: &str) -> io::Result<()>;

    fn write_facet(&self, sink: &mut W, facet: &Facet) -> io::Result<()>;

    fn write_trailer(&self, sink: &mut W, triangle_count: u64) -> io::Result<()>;
}

/// Compact little-endian encoding.
///
/// The stream may start anywhere in the sink: the header records its own position and the
/// count field is patched relative to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binary {
    header: [u8; HEADER_LEN],
    origin: u64,
}

impl Default for Binary {
    fn default() -> Self {
        Self {
            header: [0u8; HEADER_LEN],
            origin: 0,
        }
    }
}

impl Binary {
    /// Binary encoding with `text` in the header, truncated or zero-padded to 80 bytes.
    pub fn with_header(text: &str) -> Self {
        let bytes = text.as_bytes();
        let len = bytes.len().min(HEADER_LEN);
        let mut header = [0u8; HEADER_LEN];
        header[..len].copy_from_slice(&bytes[..len]);
        if bytes.starts_with(b"solid") {
            tracing::warn!("binary STL header starts with \"solid\"; readers may take it for text STL");
        }
        Self { header, origin: 0 }
    }

    pub fn header(&self) -> &[u8; HEADER_LEN] {
        &self.header
    }

    /// Sink position the header was written at.
    pub fn origin(&self) -> u64 {
        self.origin
    }

    /// Overwrite the count field 80 bytes past [`origin`](Binary::origin), then seek back
    /// to where the sink was.
    pub fn patch_count<W: Write + Seek>(
        &self,
        sink: &mut W,
        triangle_count: u64,
    ) -> io::Result<()> {
        let count = u32::try_from(triangle_count).map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{triangle_count} triangles do not fit the binary STL count field"),
            )
        })?;
        let resume = sink.stream_position()?;
        sink.seek(SeekFrom::Start(self.origin + COUNT_OFFSET))?;
        sink.write_all(&count.to_le_bytes())?;
        sink.seek(SeekFrom::Start(resume))?;
        Ok(())
    }
}

fn write_vec3_le<W: Write>(sink: &mut W, v: &Vec3) -> io::Result<()> {
    for c in v.to_array() {
        sink.write_all(&c.to_le_bytes())?;
    }
    Ok(())
}

impl<W: Write + Seek> StlFormat<W> for Binary {
    const MODE: Mode = Mode::Binary;
    const MAX_FACETS: u64 = u32::MAX as u64;

    fn write_header(&mut self, sink: &mut W, _model_name: &str) -> io::Result<()> {
        self.origin = sink.stream_position()?;
        sink.write_all(&self.header)?;
        // Placeholder, patched by the trailer.
        sink.write_all(&0u32.to_le_bytes())
    }

    fn write_facet(&self, sink: &mut W, facet: &Facet) -> io::Result<()> {
        write_vec3_le(sink, &facet.normal)?;
        for v in &facet.triangle.vertices {
            write_vec3_le(sink, v)?;
        }
        sink.write_all(&0u16.to_le_bytes())
    }

    fn write_trailer(&self, sink: &mut W, triangle_count: u64) -> io::Result<()> {
        self.patch_count(sink, triangle_count)
    }
}

/// Human-readable encoding with 3-decimal fixed-point numbers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Text;

impl<W: Write> StlFormat<W> for Text {
    const MODE: Mode = Mode::Text;
    // No count field; the limit is the writer's own counter.
    const MAX_FACETS: u64 = u64::MAX;

    fn write_header(&mut self, sink: &mut W, model_name: &str) -> io::Result<()> {
        writeln!(sink, "solid {}", model_name)
    }

    fn write_facet(&self, sink: &mut W, facet: &Facet) -> io::Result<()> {
        let n = facet.normal;
        writeln!(sink, "  facet normal {:.3} {:.3} {:.3}", n.x, n.y, n.z)?;
        writeln!(sink, "    outer loop")?;
        for v in &facet.triangle.vertices {
            writeln!(sink, "      vertex {:.3} {:.3} {:.3}", v.x, v.y, v.z)?;
        }
        writeln!(sink, "    endloop")?;
        writeln!(sink, "  endfacet")
    }

    fn write_trailer(&self, sink: &mut W, _triangle_count: u64) -> io::Result<()> {
        writeln!(sink, "endsolid")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Triangle;
    use std::io::Cursor;

    fn facet() -> Facet {
        Facet {
            normal: Vec3::new(0.0, 0.0, 1.0),
            triangle: Triangle::new([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        }
    }

    #[test]
    fn binary_header_is_padded() {
        let b = Binary::with_header("demo");
        assert_eq!(&b.header()[..4], b"demo");
        assert!(b.header()[4..].iter().all(|&c| c == 0));
    }

    #[test]
    fn binary_header_is_truncated() {
        let long = "x".repeat(120);
        let b = Binary::with_header(&long);
        assert_eq!(b.header().len(), HEADER_LEN);
        assert!(b.header().iter().all(|&c| c == b'x'));
    }

    #[test]
    fn binary_preamble_has_zero_placeholder() {
        let mut cur = Cursor::new(Vec::new());
        Binary::default().write_header(&mut cur, "ignored").unwrap();
        let buf = cur.into_inner();
        assert_eq!(buf.len() as u64, PREAMBLE_LEN);
        assert!(buf.iter().all(|&c| c == 0));
    }

    #[test]
    fn binary_record_layout() {
        let mut cur = Cursor::new(Vec::new());
        Binary::default().write_facet(&mut cur, &facet()).unwrap();
        let buf = cur.into_inner();
        assert_eq!(buf.len() as u64, RECORD_LEN);
        let f = |i: usize| f32::from_le_bytes(buf[i * 4..i * 4 + 4].try_into().unwrap());
        assert_eq!(f(2), 1.0); // nz
        assert_eq!(f(6), 1.0); // v1.x
        assert_eq!(f(10), 1.0); // v2.y
        assert_eq!(&buf[48..50], &[0, 0]);
    }

    #[test]
    fn patch_count_returns_to_end() {
        let mut cur = Cursor::new(Vec::new());
        let mut bin = Binary::default();
        bin.write_header(&mut cur, "").unwrap();
        bin.write_facet(&mut cur, &facet()).unwrap();
        bin.patch_count(&mut cur, 7).unwrap();
        assert_eq!(cur.position(), PREAMBLE_LEN + RECORD_LEN);
        let buf = cur.into_inner();
        assert_eq!(u32::from_le_bytes([buf[80], buf[81], buf[82], buf[83]]), 7);
    }

    #[test]
    fn patch_count_is_relative_to_stream_start() {
        let mut cur = Cursor::new(b"prefix".to_vec());
        cur.seek(SeekFrom::End(0)).unwrap();
        let mut bin = Binary::with_header("after prefix");
        bin.write_header(&mut cur, "").unwrap();
        assert_eq!(bin.origin(), 6);
        bin.write_facet(&mut cur, &facet()).unwrap();
        bin.write_trailer(&mut cur, 1).unwrap();
        assert_eq!(cur.position(), 6 + PREAMBLE_LEN + RECORD_LEN);
        let buf = cur.into_inner();
        assert_eq!(&buf[..6], b"prefix");
        assert!(buf[6..].starts_with(b"after prefix"));
        assert_eq!(u32::from_le_bytes([buf[86], buf[87], buf[88], buf[89]]), 1);
        assert_eq!(&buf[80..84], &[0, 0, 0, 0]);
    }

    #[test]
    fn binary_count_field_rejects_overflow() {
        let mut cur = Cursor::new(Vec::new());
        let mut bin = Binary::default();
        bin.write_header(&mut cur, "").unwrap();
        let err = bin.write_trailer(&mut cur, u32::MAX as u64 + 1).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        assert!(cur.into_inner().iter().all(|&b| b == 0));
    }

    #[test]
    fn facet_limits_per_encoding() {
        assert_eq!(<Binary as StlFormat<Cursor<Vec<u8>>>>::MAX_FACETS, u32::MAX as u64);
        assert_eq!(<Text as StlFormat<Vec<u8>>>::MAX_FACETS, u64::MAX);
    }

    #[test]
    fn text_stanza() {
        let mut out = Vec::new();
        Text.write_facet(&mut out, &facet()).unwrap();
        let expected = "  facet normal 0.000 0.000 1.000\n\
                        \x20   outer loop\n\
                        \x20     vertex 0.000 0.000 0.000\n\
                        \x20     vertex 1.000 0.000 0.000\n\
                        \x20     vertex 0.000 1.000 0.000\n\
                        \x20   endloop\n\
                        \x20 endfacet\n";
        assert_eq!(String::from_utf8(out).unwrap(), expected);
    }

    #[test]
    fn text_rounds_to_three_decimals() {
        let mut out = Vec::new();
        let f = Facet {
            normal: Vec3::new(0.12345, -2.5, 10.0),
            triangle: Triangle::new([1.0, 2.0, 3.0], [1.0, 2.0, 3.0], [1.0, 2.0, 3.0]),
        };
        Text.write_facet(&mut out, &f).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("  facet normal 0.123 -2.500 10.000\n"));
    }

    #[test]
    fn text_framing() {
        let mut out = Vec::new();
        Text.write_header(&mut out, "part").unwrap();
        Text.write_trailer(&mut out, 0).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "solid part\nendsolid\n");
    }
}
