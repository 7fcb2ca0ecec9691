use std::error::Error;
use std::fmt::{self, Display};
use std::fs;
use std::io;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use elsa::FrozenVec;
use serde::Serialize;
use tracing::debug;

pub mod settings;

pub use self::settings::{HeaderError, HeaderErrorKind, SourceSettings};

use self::settings::{parse_header, Header};

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceId(NonZeroUsize);

#[derive(Default)]
pub struct SourceBuffer(FrozenVec<Vec<u8>>);

impl SourceBuffer {
    pub fn new() -> Self {
        Self(FrozenVec::new())
    }
}

#[derive(Debug)]
pub enum SourceError {
    Io(io::Error),
    Header(HeaderError),
}

impl Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "could not read the file: {}", e),
            Self::Header(e) => write!(f, "{}", e),
        }
    }
}

impl Error for SourceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Header(e) => Some(e),
        }
    }
}

impl From<io::Error> for SourceError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<HeaderError> for SourceError {
    fn from(e: HeaderError) -> Self {
        Self::Header(e)
    }
}

pub struct Source<'buf> {
    buf: &'buf SourceBuffer,
    files: Vec<SourceFile<'buf>>,
    defaults: SourceSettings,
}

#[derive(Debug)]
pub struct SourceFile<'buf> {
    id: SourceId,
    path: PathBuf,
    name: Rc<str>,
    buf: &'buf [u8],
    settings: SourceSettings,
    body_offset: usize,
    body_line: usize,
}

impl<'buf> Source<'buf> {
    pub fn new(buf: &'buf mut SourceBuffer) -> Self {
        // take a &mut to ensure exclusivity of the borrow

        Self {
            buf: &*buf,
            files: Vec::new(),
            defaults: Default::default(),
        }
    }

    /// Sets the settings used for files whose header does not override them.
    pub fn set_defaults(&mut self, defaults: SourceSettings) {
        self.defaults = defaults;
    }

    pub fn load_from_string(
        &mut self,
        path: PathBuf,
        buf: Vec<u8>,
    ) -> Result<SourceId, HeaderError> {
        let Header {
            settings,
            body_offset,
            body_line,
        } = parse_header(&buf, self.defaults.clone())?;

        let idx = self.files.len();
        assert_eq!(self.buf.0.len(), idx);
        let id = SourceId(NonZeroUsize::MIN.saturating_add(idx));

        self.buf.0.push(buf);
        let buf: &'buf [u8] = &self.buf.0[idx];

        let name: Rc<str> = match &settings.source_name {
            Some(name) => name.as_str().into(),
            None => path.display().to_string().into(),
        };

        debug!(?path, %name, tab_size = settings.tab_size, "loaded a source file");

        self.files.push(SourceFile {
            id,
            path,
            name,
            buf,
            settings,
            body_offset,
            body_line,
        });

        Ok(id)
    }

    pub fn load(&mut self, path: PathBuf) -> Result<SourceId, SourceError> {
        let buf = fs::read(&path)?;

        Ok(self.load_from_string(path, buf)?)
    }

    pub fn get(&self, id: SourceId) -> Option<&SourceFile<'buf>> {
        self.files.get(usize::from(id.0) - 1)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SourceFile<'buf>> {
        self.files.iter()
    }
}

impl<'buf> SourceFile<'buf> {
    pub fn id(&self) -> SourceId {
        self.id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The name reported in diagnostics.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn shared_name(&self) -> Rc<str> {
        self.name.clone()
    }

    pub fn buf(&self) -> &'buf [u8] {
        self.buf
    }

    pub fn settings(&self) -> &SourceSettings {
        &self.settings
    }

    pub fn body_offset(&self) -> usize {
        self.body_offset
    }

    pub fn body_line(&self) -> usize {
        self.body_line
    }
}
