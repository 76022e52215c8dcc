use hexpipe_fs::DEFAULT_PERM;

/// Configuration for one download.
///
/// # Examples
///
/// ```
/// use hexpipe_fetch::FetchOptions;
///
/// let options = FetchOptions::default()
///     .header("Authorization", "Bearer token")
///     .perm(0o600);
/// ```
#[derive(Clone, Debug)]
pub struct FetchOptions {
    /// Extra request headers, sent in order.
    ///
    /// Default: empty
    pub headers: Vec<(String, String)>,

    /// Mode bits of the committed file (Unix only).
    ///
    /// Default: `0o644`
    pub perm: u32,

    /// Create missing parent directories of the destination.
    ///
    /// Default: false
    pub mk_dirs: bool,
}

impl Default for FetchOptions {
    fn default() -> Self { Self { headers: Vec::new(), perm: DEFAULT_PERM, mk_dirs: false } }
}

impl FetchOptions {
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    pub fn perm(mut self, perm: u32) -> Self {
        self.perm = perm;
        self
    }

    pub fn mk_dirs(mut self, mk_dirs: bool) -> Self {
        self.mk_dirs = mk_dirs;
        self
    }
}
