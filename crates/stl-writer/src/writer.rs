//! The STL writer and its file-backed front door.
//!
//! A writer writes the header as soon as it is created and the trailer exactly once, either
//! from [`StlWriter::finish`] or, on any other exit path, from `Drop`. If an I/O error stops
//! a binary stream before the trailer lands, the count field keeps its placeholder `0` and
//! the file is not valid STL; callers should treat such a file as garbage.
//!
//! Both encodings count facets. Only binary output stores the count, so only binary output
//! caps it at `u32::MAX`.

use std::fs::File;
use std::io::{BufWriter, Seek, Write};
use std::path::Path;

use tracing::{debug, info, instrument, trace, warn};

use crate::config::{Mode, WriterConfig};
use crate::errors::{Result, StlError};
use crate::format::{Binary, StlFormat, Text};
use crate::geometry::Facet;
use crate::shapes::MeshSink;

fn validate_model_name(mode: Mode, name: &str) -> Result<()> {
    if mode == Mode::Text && name.contains(|c: char| c == '\n' || c == '\r') {
        return Err(StlError::InvalidModelName {
            name: name.to_string(),
        });
    }
    Ok(())
}

/// Streams facets to `W` in the encoding `F`. Nothing is buffered beyond what `W` buffers.
pub struct StlWriter<W: Write, F: StlFormat<W>> {
    sink: Option<W>,
    format: F,
    model_name: String,
    triangle_count: u64,
    trailer_written: bool,
}

impl<W: Write, F: StlFormat<W>> StlWriter<W, F> {
    /// Take ownership of `sink` and write the header at its current position.
    pub fn new(mut sink: W, mut format: F, model_name: &str) -> Result<Self> {
        validate_model_name(F::MODE, model_name)?;
        format.write_header(&mut sink, model_name)?;
        let mode = F::MODE;
        debug!(%mode, model_name, "wrote STL header");
        Ok(Self {
            sink: Some(sink),
            format,
            model_name: model_name.to_string(),
            triangle_count: 0,
            trailer_written: false,
        })
    }

    pub fn mode(&self) -> Mode {
        F::MODE
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Number of facets written so far.
    pub fn triangle_count(&self) -> u64 {
        self.triangle_count
    }

    pub fn trailer_written(&self) -> bool {
        self.trailer_written
    }

    pub fn get_ref(&self) -> Option<&W> {
        self.sink.as_ref()
    }

    /// Write the trailer. Later calls are no-ops.
    pub fn write_trailer(&mut self) -> Result<()> {
        if self.trailer_written {
            debug!("STL trailer already written, skipping");
            return Ok(());
        }
        // Flag first so a failed trailer is never retried into a half-written stream.
        self.trailer_written = true;
        let count = self.triangle_count;
        let sink = self.sink.as_mut().ok_or(StlError::SinkReleased)?;
        self.format.write_trailer(sink, count)?;
        debug!(mode = %self.mode(), triangles = count, "wrote STL trailer");
        Ok(())
    }

    /// Write the trailer if needed, flush, and hand the sink back.
    pub fn finish(mut self) -> Result<W> {
        self.write_trailer()?;
        let mut sink = self.sink.take().ok_or(StlError::SinkReleased)?;
        sink.flush()?;
        info!(mode = %self.mode(), triangles = self.triangle_count, "finished STL stream");
        Ok(sink)
    }
}

impl<W: Write, F: StlFormat<W>> MeshSink for StlWriter<W, F> {
    fn add_facet(&mut self, facet: Facet) -> Result<()> {
        if self.trailer_written {
            return Err(StlError::TrailerWritten);
        }
        if self.triangle_count >= F::MAX_FACETS {
            return Err(StlError::TooManyTriangles {
                mode: F::MODE,
                limit: F::MAX_FACETS,
            });
        }
        let next = self.triangle_count + 1;
        let sink = self.sink.as_mut().ok_or(StlError::SinkReleased)?;
        self.format.write_facet(sink, &facet)?;
        self.triangle_count = next;
        trace!(index = next - 1, normal = ?facet.normal, "wrote facet");
        Ok(())
    }
}

impl<W: Write, F: StlFormat<W>> Drop for StlWriter<W, F> {
    fn drop(&mut self) {
        if self.sink.is_none() {
            return;
        }
        if let Err(e) = self.write_trailer() {
            warn!(error = %e, "failed to write STL trailer on drop");
        }
        if let Some(sink) = self.sink.as_mut() {
            if let Err(e) = sink.flush() {
                warn!(error = %e, "failed to flush STL sink on drop");
            }
        }
    }
}

impl<W: Write + Seek> StlWriter<W, Binary> {
    /// Binary writer with `header` truncated or zero-padded to 80 bytes.
    pub fn binary(sink: W, header: &str) -> Result<Self> {
        Self::new(sink, Binary::with_header(header), "")
    }

    /// Patch the count field with the number of facets written so far.
    ///
    /// The trailer does this too; calling it earlier leaves a valid file on disk
    /// even if the process dies before the trailer.
    pub fn write_triangle_count(&mut self) -> Result<()> {
        let count = self.triangle_count;
        let sink = self.sink.as_mut().ok_or(StlError::SinkReleased)?;
        self.format.patch_count(sink, count)?;
        Ok(())
    }
}

impl<W: Write> StlWriter<W, Text> {
    pub fn text(sink: W, model_name: &str) -> Result<Self> {
        Self::new(sink, Text, model_name)
    }
}

/// Binary header text for `config`: the configured header, or `binary STL: <name>` when
/// only a model name is set.
fn binary_header(config: &WriterConfig) -> String {
    if config.header.is_empty() && !config.model_name.is_empty() {
        format!("binary STL: {}", config.model_name)
    } else {
        config.header.clone()
    }
}

/// Buffered file sink used by [`StlFile`].
pub type FileSink = BufWriter<File>;

/// An STL file on disk whose encoding is chosen at runtime.
pub enum StlFile {
    Binary(StlWriter<FileSink, Binary>),
    Text(StlWriter<FileSink, Text>),
}

impl StlFile {
    /// Create (or truncate) `path` and write the header for `mode`.
    pub fn create(path: impl AsRef<Path>, mode: Mode, model_name: &str) -> Result<Self> {
        let config = WriterConfig {
            mode,
            model_name: model_name.to_string(),
            ..WriterConfig::default()
        };
        Self::create_with_config(path, &config)
    }

    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn create_with_config(path: impl AsRef<Path>, config: &WriterConfig) -> Result<Self> {
        let path = path.as_ref();
        validate_model_name(config.mode, &config.model_name)?;
        let file = File::create(path).map_err(|source| StlError::Create {
            path: path.to_path_buf(),
            source,
        })?;
        let sink = BufWriter::new(file);
        let stl = match config.mode {
            Mode::Binary => {
                let header = binary_header(config);
                StlFile::Binary(StlWriter::new(
                    sink,
                    Binary::with_header(&header),
                    &config.model_name,
                )?)
            }
            Mode::Text => StlFile::Text(StlWriter::text(sink, &config.model_name)?),
        };
        info!(mode = %config.mode, model_name = %config.model_name, "opened STL file");
        Ok(stl)
    }

    pub fn mode(&self) -> Mode {
        match self {
            StlFile::Binary(_) => Mode::Binary,
            StlFile::Text(_) => Mode::Text,
        }
    }

    pub fn model_name(&self) -> &str {
        match self {
            StlFile::Binary(w) => w.model_name(),
            StlFile::Text(w) => w.model_name(),
        }
    }

    pub fn triangle_count(&self) -> u64 {
        match self {
            StlFile::Binary(w) => w.triangle_count(),
            StlFile::Text(w) => w.triangle_count(),
        }
    }

    /// Write the trailer if needed, flush, and close the file.
    pub fn finish(self) -> Result<()> {
        match self {
            StlFile::Binary(w) => w.finish().map(drop),
            StlFile::Text(w) => w.finish().map(drop),
        }
    }
}

impl MeshSink for StlFile {
    fn add_facet(&mut self, facet: Facet) -> Result<()> {
        match self {
            StlFile::Binary(w) => w.add_facet(facet),
            StlFile::Text(w) => w.add_facet(facet),
        }
    }
}

/// Create `path`, run `build` against it, and always finish the file.
///
/// The trailer is written whether `build` succeeds or not, so a binary file's count
/// matches every facet `build` managed to add. An error from `build` takes precedence
/// over an error from finishing.
pub fn write_stl_file<T>(
    path: impl AsRef<Path>,
    mode: Mode,
    model_name: &str,
    build: impl FnOnce(&mut StlFile) -> Result<T>,
) -> Result<T> {
    let config = WriterConfig {
        mode,
        model_name: model_name.to_string(),
        ..WriterConfig::default()
    };
    write_stl_file_with_config(path, &config, build)
}

pub fn write_stl_file_with_config<T>(
    path: impl AsRef<Path>,
    config: &WriterConfig,
    build: impl FnOnce(&mut StlFile) -> Result<T>,
) -> Result<T> {
    let mut stl = StlFile::create_with_config(path, config)?;
    let outcome = build(&mut stl);
    let finished = stl.finish();
    let value = outcome?;
    finished?;
    Ok(value)
}
