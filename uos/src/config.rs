//! Configuration for the UOS decoder

/// Largest frame count a multipart sequence may declare.
pub const MAX_FRAME_COUNT: u16 = 50;

/// Extrinsic bodies longer than this many bytes are signed by hash.
pub const INLINE_SIGNING_LIMIT: usize = 256;

/// Decoder limits
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecoderConfig {
    /// Sequences declaring more frames than this are rejected
    pub max_frame_count: u16,

    /// Mortal/immortal extrinsic bodies above this size are replaced by
    /// their blake2b-256 hash
    pub inline_signing_limit: usize,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl DecoderConfig {
    /// Create a configuration with the protocol defaults
    pub fn new() -> Self {
        Self {
            max_frame_count: MAX_FRAME_COUNT,
            inline_signing_limit: INLINE_SIGNING_LIMIT,
        }
    }

    /// Set the maximum frame count. Values below 1 are raised to 1.
    pub fn with_max_frame_count(mut self, max_frame_count: u16) -> Self {
        self.max_frame_count = max_frame_count.max(1);
        self
    }

    /// Set the inline signing limit
    pub fn with_inline_signing_limit(mut self, limit: usize) -> Self {
        self.inline_signing_limit = limit;
        self
    }
}

/// Builder for DecoderConfig
pub struct DecoderConfigBuilder {
    max_frame_count: u16,
    inline_signing_limit: usize,
}

impl Default for DecoderConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DecoderConfigBuilder {
    /// Create a new builder with defaults
    pub fn new() -> Self {
        Self {
            max_frame_count: MAX_FRAME_COUNT,
            inline_signing_limit: INLINE_SIGNING_LIMIT,
        }
    }

    /// Set the maximum frame count
    pub fn max_frame_count(mut self, max: u16) -> Self {
        self.max_frame_count = max;
        self
    }

    /// Set the inline signing limit
    pub fn inline_signing_limit(mut self, limit: usize) -> Self {
        self.inline_signing_limit = limit;
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<DecoderConfig, &'static str> {
        if self.max_frame_count == 0 {
            return Err("max_frame_count must be at least 1");
        }

        Ok(DecoderConfig {
            max_frame_count: self.max_frame_count,
            inline_signing_limit: self.inline_signing_limit,
        })
    }
}
