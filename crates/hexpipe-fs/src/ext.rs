use std::path::Path;

/// Layers implied by a file name, outermost compression first.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Layout {
    pub gzip: usize,
    pub tar:  bool,
}

/// Peels extensions right to left: `.gz` adds gzip and continues, `.tgz`
/// adds gzip and tar, `.tar` adds tar. Anything else stops.
pub(crate) fn layout_of(path: &Path) -> Layout {
    let mut layout = Layout::default();
    let Some(name) = path.file_name() else { return layout };
    let mut name = name.to_string_lossy().to_lowercase();
    loop {
        if let Some(rest) = name.strip_suffix(".gz") {
            layout.gzip += 1;
            name = rest.to_string();
        } else if name.ends_with(".tgz") {
            layout.gzip += 1;
            layout.tar = true;
            return layout;
        } else {
            layout.tar = name.ends_with(".tar");
            return layout;
        }
    }
}
