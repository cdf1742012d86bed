//! Read version selection and codec configuration
//!
//! A [`ReadConfig`] is built once, before any reads are touched, and handed
//! to every [`ReadData`](crate::ReadData) that is created. It carries the
//! version returned by calls that do not name one explicitly and the library
//! default quality value used for reads stored without per-base qualities.

/// The default quality value used when no library supplies one.
pub const DEFAULT_QUALITY_VALUE: u8 = 20;

/// Which variant of a read's data to return
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum ReadVersion {
    /// The trimmed read if it exists, else the corrected read if it exists, else the raw read
    #[default]
    Latest = 0x00,
    Raw = 0x01,
    Corrected = 0x02,
    /// The clear range of the corrected read
    Trimmed = 0x03,
}
impl ReadVersion {
    /// Resolves `Latest` using the existence flags of a read; other versions are returned as is.
    #[must_use]
    pub fn resolve(self, corrected_exists: bool, trimmed_exists: bool) -> Self {
        match self {
            Self::Latest if trimmed_exists => Self::Trimmed,
            Self::Latest if corrected_exists => Self::Corrected,
            Self::Latest => Self::Raw,
            other => other,
        }
    }
}

/// Configuration shared by all reads handled by one store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadConfig {
    /// Version used when a caller does not ask for one
    pub default_version: ReadVersion,

    /// Quality value given to every base of a read stored without qualities
    pub default_qv: u8,
}
impl Default for ReadConfig {
    fn default() -> Self {
        Self {
            default_version: ReadVersion::default(),
            default_qv: DEFAULT_QUALITY_VALUE,
        }
    }
}
impl ReadConfig {
    /// Length of `read` in the default version of this configuration.
    #[must_use]
    pub fn sequence_length(&self, read: &crate::ReadDescriptor) -> u32 {
        read.sequence_length(self.default_version)
    }
}

/// Builder for [`ReadConfig`]
///
/// # Examples
///
/// ```
/// use sqread::{ReadConfigBuilder, ReadVersion};
///
/// let config = ReadConfigBuilder::new()
///     .default_version(ReadVersion::Corrected)
///     .default_qv(30)
///     .build();
/// assert_eq!(config.default_version, ReadVersion::Corrected);
/// ```
#[derive(Debug, Default)]
pub struct ReadConfigBuilder {
    default_version: Option<ReadVersion>,
    default_qv: Option<u8>,
}
impl ReadConfigBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn default_version(mut self, version: ReadVersion) -> Self {
        self.default_version = Some(version);
        self
    }

    #[must_use]
    pub fn default_qv(mut self, qv: u8) -> Self {
        self.default_qv = Some(qv);
        self
    }

    #[must_use]
    pub fn build(self) -> ReadConfig {
        ReadConfig {
            default_version: self.default_version.unwrap_or_default(),
            default_qv: self.default_qv.unwrap_or(DEFAULT_QUALITY_VALUE),
        }
    }
}
